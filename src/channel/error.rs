use thiserror::Error;

use crate::message::FramingError;

/// Errors surfaced by [`MessageChannel`](super::MessageChannel).
///
/// I/O details never leave the channel; they are logged where they happen and
/// the caller only learns that the channel is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("send failed: channel closed")]
    SendFailed,

    #[error("message contains a line delimiter at byte {offset}")]
    EmbeddedDelimiter { offset: usize },

    #[error("inbound loop already started")]
    AlreadyReceiving,

    #[error("channel closed")]
    Closed,
}

impl From<FramingError> for ChannelError {
    fn from(e: FramingError) -> Self {
        match e {
            FramingError::EmbeddedDelimiter { offset } => {
                ChannelError::EmbeddedDelimiter { offset }
            }
        }
    }
}
