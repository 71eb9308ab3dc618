//! Scanpost Echo Server
//!
//! Local stand-in for the endpoint scans are posted to, so a device or the
//! terminal scanner can be exercised without the public placeholder API.

mod qr;
mod server;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use clap::Parser;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::server::EchoServer;

/// Scanpost Echo Server - development endpoint for scanned payloads
#[derive(Parser, Debug)]
#[command(name = "echo_server")]
#[command(author = "Scanpost Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Development endpoint for Scanpost scans", long_about = None)]
struct Args {
    /// Bind address
    #[arg(short, long, default_value = "0.0.0.0:3721")]
    bind: String,

    /// Answer every POST with this HTTP status instead of echoing
    #[arg(long)]
    fail_status: Option<u16>,

    /// Print this payload as a terminal QR code and exit
    #[arg(long)]
    qr: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(payload) = args.qr {
        println!("{}", qr::render_terminal(&payload)?);
        println!("Payload: {}", payload);
        return Ok(());
    }

    setup_logging(&args.log_level)?;

    info!("Starting Scanpost Echo Server v{}", env!("CARGO_PKG_VERSION"));

    let bind_addr: SocketAddr = args
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", args.bind))?;

    let fail_status = args
        .fail_status
        .map(StatusCode::from_u16)
        .transpose()
        .context("Invalid --fail-status")?;

    let server = EchoServer::new(fail_status);
    let (addr, server_handle) = server.start(bind_addr).await?;

    println!("============================================");
    println!("Endpoint: http://{}/posts", addr);
    if let Some(status) = fail_status {
        println!("Every POST answers {}", status);
    }
    println!("Run the scanner with --endpoint pointing here");
    println!("============================================");

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        result = server_handle => {
            if let Err(e) = result {
                error!("Server task failed: {}", e);
            }
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Setup logging with tracing
fn setup_logging(level: &str) -> Result<()> {
    let log_level = level.parse::<Level>().unwrap_or(Level::INFO);

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
