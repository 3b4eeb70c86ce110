// net/mod.rs
//! Networking layer: the listening endpoint and newline framing over the
//! accepted stream. Nothing in here knows about channel state.

pub mod endpoint;
pub mod line_codec;

pub use endpoint::{Connection, ConnectionEndpoint, EndpointError};
pub use line_codec::{LineReader, LineWriter, encode_line};
