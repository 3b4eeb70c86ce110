use std::process::ExitCode;

use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use pairchat::{Config, Console, ConsoleExit, ConnectionEndpoint, MessageChannel, inbox};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const APP_NAME: &str = "🦀 pairchat";

// -----------------------------------------------------------------------------
// ----- Main ------------------------------------------------------------------

fn main() -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{APP_NAME}: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(async_main());

    // The blocking stdin read cannot be cancelled; don't wait for it.
    runtime.shutdown_background();
    code
}

async fn async_main() -> ExitCode {
    if let Err(e) = setup().await {
        eprintln!("{APP_NAME}: {e}");
        return ExitCode::FAILURE;
    }

    match run_session().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{} exiting: {e}", APP_NAME);
            ExitCode::FAILURE
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Setup -----------------------------------------------------------------

async fn setup() -> pairchat::Result<()> {
    // This has to be the first thing we do, because it initializes the config
    Config::init().await?;

    init_tracing();
    Ok(())
}

fn init_tracing() {
    let config = Config::snapshot();
    let filter = EnvFilter::new(config.log_level.as_str());

    // stdout belongs to the console
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// -----------------------------------------------------------------------------
// ----- Run -------------------------------------------------------------------

async fn run_session() -> pairchat::Result<()> {
    let config = Config::snapshot();

    let mut endpoint = ConnectionEndpoint::bind(config.listen_addr)?;
    info!("{} listening on {}", APP_NAME, endpoint.local_addr());

    let connection = tokio::select! {
        _ = signal::ctrl_c() => {
            info!("{} shutting down before a peer connected", APP_NAME);
            return Ok(());
        }

        accepted = endpoint.accept() => accepted?,
    };

    let channel = MessageChannel::new(connection);
    let (delivery, inbox) = inbox();
    channel.start_receiving(delivery)?;

    let mut console = Console::stdio();

    let outcome: pairchat::Result<()> = tokio::select! {
        _ = signal::ctrl_c() => {
            info!("{} shutting down", APP_NAME);
            Ok(())
        }

        exit = console.run(&channel, inbox) => match exit {
            Ok(ConsoleExit::InputClosed) => {
                info!("input closed; hanging up on {}", channel.peer_addr());
                Ok(())
            }
            Ok(ConsoleExit::ChannelClosed) => Ok(()),
            Err(e) => Err(e.into()),
        },
    };

    channel.shutdown().await;

    if let Some(reason) = channel.close_reason() {
        info!("session with {} ended: {reason}", channel.peer_addr());
    }

    // The endpoint never accepts again; it goes away with the process.
    drop(endpoint);

    outcome
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
