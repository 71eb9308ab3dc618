//! Terminal host for the Scanpost scan screen
//!
//! Plays the phone's part: the home screen / scan screen navigation, the
//! camera (decodes are typed as `scan ...` commands) and the display.

mod commands;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{parse_command, Command, HELP};
use scanpost_core::{
    ChannelNavigator, DecodeEvent, FacingDirection, HttpSubmitter, NavigationRequest,
    ScanController, ScanScreen, ScannerConfig, SimulatedCamera, DEFAULT_ENDPOINT,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Scanpost scanner - scan barcodes and forward them to an endpoint
#[derive(Parser, Debug)]
#[command(name = "scanner_cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal host for the Scanpost scan screen", long_about = None)]
struct Args {
    /// Endpoint receiving POST {"scannedData": ...}
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Submission timeout in seconds
    #[arg(short, long, default_value_t = 10)]
    timeout: u64,

    /// Camera used when the scan screen opens (front, back)
    #[arg(short, long, default_value = "back")]
    facing: FacingDirection,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Refuse the first camera permission prompt
    #[arg(long, default_value_t = false)]
    deny_permission: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args.log_level)?;

    let config = ScannerConfig::with_endpoint(args.endpoint)
        .with_timeout(Duration::from_secs(args.timeout))
        .with_facing(args.facing);
    let submitter = Arc::new(HttpSubmitter::new(&config).context("Invalid endpoint")?);
    info!("Submitting scans to {}", submitter.endpoint());

    let (navigator, mut navigation) = ChannelNavigator::new();
    let (handle, controller_task) = ScanController::spawn(&config, submitter, navigator);
    let camera = SimulatedCamera::new(!args.deny_permission);
    let injector = camera.injector();
    let mut screen = ScanScreen::new(camera, handle.clone(), config.symbologies.clone());

    // Redraw on every published change
    let mut updates = handle.subscribe();
    let render_task = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            println!("{}", render::format_snapshot(&snapshot));
        }
    });

    println!("Scanpost scanner v{}", env!("CARGO_PKG_VERSION"));
    println!("Endpoint: {}", config.endpoint);
    println!("{}", HELP);
    println!();

    let mut on_scan_screen = open_scan_screen(&mut screen).await;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                let command = match parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                match command {
                    Command::Quit => break,
                    Command::Help => println!("{}", HELP),
                    Command::Status => println!("{}", render::format_snapshot(&handle.snapshot())),
                    Command::Focus => {
                        on_scan_screen = open_scan_screen(&mut screen).await;
                    }
                    Command::Grant => {
                        screen.camera_mut().set_grant_on_request(true);
                        match screen.retry_permission().await {
                            Ok(()) => on_scan_screen = true,
                            Err(e) => println!("{}", e),
                        }
                    }
                    _ if !on_scan_screen => println!("Not on the scan screen (type 'focus')"),
                    Command::Scan { symbology, payload } => {
                        if !injector.inject(DecodeEvent::new(symbology, payload)) {
                            println!("Camera is not running");
                        }
                    }
                    Command::Again => screen.rescan().await?,
                    Command::Flip => {
                        if let Err(e) = screen.toggle_facing().await {
                            warn!("Camera flip failed: {}", e);
                        }
                    }
                    Command::Back => screen.exit().await?,
                }
            }
            Some(request) = navigation.recv() => {
                if request == NavigationRequest::Back {
                    on_scan_screen = false;
                    println!("<- Home (type 'focus' to open the scanner again)");
                }
            }
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    handle.shutdown().await.ok();
    controller_task.await.context("Controller task failed")?;
    render_task.abort();
    Ok(())
}

/// Show the scan screen; `false` while the permission is refused
async fn open_scan_screen(screen: &mut ScanScreen<SimulatedCamera>) -> bool {
    match screen.activate().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Scan screen not started: {}", e);
            false
        }
    }
}

/// Setup logging with tracing
fn setup_logging(level: &str) -> Result<()> {
    let log_level = level.parse::<Level>().unwrap_or(Level::WARN);

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
