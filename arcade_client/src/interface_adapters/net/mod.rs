// WebSocket client connection. One task per connection, talking to the loop over channels.

pub mod connection;

pub use connection::{ConnectionHandle, ConnectionSettings, NetError, spawn_connection};
