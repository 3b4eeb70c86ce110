use serde::Deserialize;
use std::{net::IpAddr, path::Path};
use tokio::fs;

use super::{ConfigError, types::LogLevel};

// -----------------------------------------------------------------------------
// ----- ConfigFile ------------------------------------------------------------

/// On-disk settings (`pairchat.toml`). Every key is optional.
///
/// ```toml
/// host = "127.0.0.1"
/// port = 1234
/// log_level = "debug"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub host: Option<IpAddr>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub log_level: Option<LogLevel>,
}

// -----------------------------------------------------------------------------
// ----- ConfigFile: Static ----------------------------------------------------

impl ConfigFile {
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).await.map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&raw).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
