#[allow(clippy::module_inception)]
pub mod channel;
pub mod delivery;
pub mod error;
pub mod state;

pub use channel::MessageChannel;
pub use delivery::{Delivery, Inbox, QueueDelivery, inbox};
pub use error::ChannelError;
pub use state::{ChannelState, CloseReason};
