//! Campus View Web Server Binary
//!
//! This binary starts the Campus View web server that provides a REST API
//! for reading and editing the site's ticker and popup banners.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (port 3001, content under the config directory)
//! campus-view-web
//!
//! # Listen on all interfaces
//! campus-view-web --host 0.0.0.0 --port 8080
//! ```

use std::net::SocketAddr;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_view::config::Config;
use campus_view::web;

/// Campus View Web Server - REST API for site content
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Using default configuration: {:#}", e);
            Config::default()
        }
    };
    info!("Content directory: {}", config.storage_dir()?.display());

    // Build socket address
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    // Start the server
    web::run_server(config, addr).await
}
