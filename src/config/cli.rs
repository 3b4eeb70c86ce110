use clap::Parser;
use std::{net::IpAddr, path::PathBuf};

use super::types::LogLevel;

// -----------------------------------------------------------------------------
// ----- Args ------------------------------------------------------------------

/// Command line / environment layer. Every field is optional so the config
/// file and built-in defaults can fill the gaps.
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(
    name = "pairchat",
    version,
    about = "Two-party line chat over a single TCP connection"
)]
pub struct Args {
    // IPv4 or IPv6 literal (e.g., 0.0.0.0, 127.0.0.1, ::, ::1).
    #[arg(long = "host", short = 'H', env = "PAIRCHAT_HOST")]
    pub host: Option<IpAddr>,

    #[arg(long = "port", short = 'p', env = "PAIRCHAT_PORT")]
    pub port: Option<u16>,

    #[arg(long = "log", env = "PAIRCHAT_LOG")]
    pub log_level: Option<LogLevel>,

    // Must exist when given.
    #[arg(long = "config", env = "PAIRCHAT_CONFIG")]
    pub config_file: Option<PathBuf>,
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
