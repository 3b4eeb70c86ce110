use clap::{Parser, error::ErrorKind};
use std::{
    ffi::OsString,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    sync::OnceLock,
};

use super::{ConfigError, cli::Args, file::ConfigFile, types::LogLevel};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_PORT: u16 = 1234;

// -----------------------------------------------------------------------------
// ----- Global Singleton ------------------------------------------------------

static ROOT_CONFIG: OnceLock<Config> = OnceLock::new();

// -----------------------------------------------------------------------------
// ----- Config ----------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: LogLevel,
    pub config_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(DEFAULT_HOST, DEFAULT_PORT),
            log_level: LogLevel::default(),
            config_file: None,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Config: Static --------------------------------------------------------

impl Config {
    /// Parse CLI/ENV, load the config file if one is named, and freeze the
    /// result for the rest of the process.
    pub async fn init() -> Result<(), ConfigError> {
        let args = Self::parse_args(std::env::args_os())?;

        let file = match args.config_file.as_deref() {
            Some(path) => Some(ConfigFile::load(path).await?),
            None => None,
        };

        let config = Self::resolve(&args, file.as_ref());

        ROOT_CONFIG
            .set(config)
            .map_err(|_| ConfigError::AlreadyInitialized)
    }

    /// `--help` and `--version` print and exit here; any other bad CLI/ENV
    /// input comes back as [`ConfigError::Cli`].
    pub fn parse_args<I, T>(argv: I) -> Result<Args, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Args::try_parse_from(argv) {
            Ok(args) => Ok(args),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
            Err(e) => Err(e.into()),
        }
    }

    pub fn snapshot() -> Config {
        ROOT_CONFIG
            .get()
            .expect("Config not initialized; call Config::init().await first")
            .clone()
    }

    /// CLI/ENV wins over the file, the file wins over defaults.
    pub fn resolve(args: &Args, file: Option<&ConfigFile>) -> Config {
        let defaults = Config::default();

        let host = args
            .host
            .or_else(|| file.and_then(|f| f.host))
            .unwrap_or(defaults.listen_addr.ip());

        let port = args
            .port
            .or_else(|| file.and_then(|f| f.port))
            .unwrap_or(defaults.listen_addr.port());

        let log_level = args
            .log_level
            .or_else(|| file.and_then(|f| f.log_level))
            .unwrap_or(defaults.log_level);

        Config {
            listen_addr: SocketAddr::new(host, port),
            log_level,
            config_file: args.config_file.clone(),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
