use thiserror::Error;

use crate::{channel::ChannelError, config::ConfigError, net::EndpointError};

// -----------------------------------------------------------------------------
// ----- Error -----------------------------------------------------------------

/// Everything that can end the process early.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("console i/o failed: {0}")]
    Console(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
