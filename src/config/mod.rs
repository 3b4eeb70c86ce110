pub mod cli;
#[allow(clippy::module_inception)]
pub mod config;
pub mod file;
pub mod types;

use std::path::PathBuf;
use thiserror::Error;

pub use config::Config;
pub use types::LogLevel;

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config already initialized")]
    AlreadyInitialized,

    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("read error for {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("toml parse error in {path:?}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}
