// Frameworks: environment configuration and the runtime that drives a game.

pub mod config;
pub mod runtime;
