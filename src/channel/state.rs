use std::fmt;

/// Lifecycle of a message channel.
///
/// `Idle` until the inbound loop is started, `Listening` while it runs, and
/// `Closed` once teardown has happened. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Connection accepted, inbound loop not started yet. Sends are allowed.
    Idle,

    /// Inbound loop is running.
    Listening,

    /// Connection released. No more deliveries, every send fails.
    Closed,
}

impl ChannelState {
    pub fn is_closed(&self) -> bool {
        matches!(self, ChannelState::Closed)
    }
}

/// What triggered the teardown. Recorded once, by whoever ran it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Peer closed its side (end of stream).
    PeerClosed,

    /// Reading from the peer failed.
    ReadFailed,

    /// Writing or flushing a frame failed.
    SendFailed,

    /// Explicit shutdown by the host.
    Shutdown,
}

impl CloseReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CloseReason::PeerClosed => "peer closed",
            CloseReason::ReadFailed => "read failed",
            CloseReason::SendFailed => "send failed",
            CloseReason::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
