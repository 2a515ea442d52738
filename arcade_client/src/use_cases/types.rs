// Use-case level inputs/outputs for the client loop.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    DemoFallback,
}

/// Which side owns authoritative entity fields this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    Local,
    Remote,
}

impl ConnectionState {
    pub fn authority(self) -> Authority {
        match self {
            ConnectionState::Connected => Authority::Remote,
            ConnectionState::Disconnected
            | ConnectionState::Connecting
            | ConnectionState::DemoFallback => Authority::Local,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "offline",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "online",
            ConnectionState::DemoFallback => "demo",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Connection lifecycle as seen by the loop, carrying decoded inbound messages.
#[derive(Debug, Clone, PartialEq)]
pub enum NetEvent<M> {
    Opened,
    Message(M),
    /// The socket never opened.
    Failed { reason: String },
    /// An open socket closed.
    Closed { reason: Option<String> },
    /// No frame arrived within the idle timeout; the socket was closed.
    Stalled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_connected_then_remote_owns_state_otherwise_local() {
        assert_eq!(ConnectionState::Connected.authority(), Authority::Remote);
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::DemoFallback,
        ] {
            assert_eq!(state.authority(), Authority::Local);
        }
    }
}
