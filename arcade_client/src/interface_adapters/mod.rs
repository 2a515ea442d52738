// Interface adapters: wire protocol, network connection, terminal input and rendering.

pub mod input;
pub mod net;
pub mod protocol;
pub mod render;
