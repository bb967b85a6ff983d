//! # Server Binary Entry Point
//!
//! Thin wrapper that loads configuration and runs the Mirage HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin server -- --config config/mirage.toml
//! ```
//!
//! Without `--config` the built-in defaults are used.

use clap::Parser;
use log::info;

use mirage::common::config::MirageConfig;
use mirage::common::logging::init_logger;

/// Command-line arguments for the server binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the server configuration file (TOML format)
    ///
    /// Example: config/mirage.toml
    #[arg(short, long)]
    config: Option<String>,

    /// Override the listen address from the configuration
    #[arg(short, long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();

    let mut config = MirageConfig::load(args.config.as_deref())?;
    if let Some(address) = args.address {
        config.server.address = address;
    }

    info!("🚀 Initializing Mirage server...");

    mirage::server::run(config).await
}
