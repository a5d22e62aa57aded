//! Oil & Rope chat entry point.
//!
//! # Usage
//!
//! ```bash
//! oilandrope-chat --api-url http://localhost:8000 \
//!     --session http://localhost:8000/roleplay/session/42/ \
//!     --user-id 1 --username alice --token "$OILANDROPE_TOKEN"
//! ```

use std::{fs::File, sync::Mutex};

use clap::Parser;
use oilandrope_client::{SystemEnv, api::ApiClient, transport::TransportConfig};
use oilandrope_tui::{Args, Runtime, TerminalDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = args.validate()?;

    // The terminal belongs to the UI, so logs go to a file
    let log_file = File::create(&args.log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(log_file)).with_ansi(false))
        .with(filter)
        .init();

    tracing::info!(
        session = %config.session,
        socket = %config.socket_url,
        "oilandrope chat starting"
    );

    let api = ApiClient::new(config.api_origin.clone(), config.user.token.clone());
    let transport =
        TransportConfig { connect_timeout: config.connect_timeout, ..TransportConfig::default() };
    let driver = TerminalDriver::new(api, transport)?;

    Runtime::new(driver, SystemEnv::new(), config.runtime_config()).run().await?;

    tracing::info!("oilandrope chat stopped");
    Ok(())
}
