pub mod channel;
pub mod config;
pub mod console;
pub mod errors;
pub mod message;
pub mod net;

pub use channel::{ChannelError, ChannelState, CloseReason, Delivery, Inbox, MessageChannel, inbox};
pub use config::Config;
pub use console::{Console, ConsoleExit};
pub use errors::{Error, Result};
pub use message::Message;
pub use net::{Connection, ConnectionEndpoint, EndpointError};
