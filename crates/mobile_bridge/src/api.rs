//! Flutter Rust Bridge API
//!
//! FFI-safe functions for Dart integration. Each scan screen activation
//! creates its own `MobileScanner`; there is no global scanner state.

use flutter_rust_bridge::frb;
use scanpost_core::{
    ChannelNavigator, DecodeEvent, HttpSubmitter, NavigationRequest, PermissionState,
    ScanController, ScannerConfig, ScannerEvent, ScannerHandle, SessionSnapshot, Symbology,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, watch, Mutex as AsyncMutex};
use tracing::{debug, info};

use crate::view::{navigation_target, ScanView};

/// One scan screen: controller task, its runtime and the navigation queue
pub struct MobileScanner {
    runtime: Runtime,
    handle: ScannerHandle,
    snapshots: AsyncMutex<watch::Receiver<SessionSnapshot>>,
    navigation: Mutex<mpsc::UnboundedReceiver<NavigationRequest>>,
}

impl MobileScanner {
    fn send(&self, event: ScannerEvent) -> Result<(), String> {
        self.handle.try_send(event).map_err(|e| e.to_string())
    }
}

/// Create a scanner for a newly shown scan screen
///
/// # Arguments
/// * `endpoint` - Submission URL; the placeholder endpoint when `None`
/// * `timeout_ms` - Per-submission timeout; 10 s when `None`
#[frb(sync)]
pub fn create_scanner(
    endpoint: Option<String>,
    timeout_ms: Option<u64>,
) -> Result<MobileScanner, String> {
    let mut config = match endpoint {
        Some(endpoint) => ScannerConfig::with_endpoint(endpoint),
        None => ScannerConfig::default(),
    };
    if let Some(ms) = timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }

    let submitter = Arc::new(HttpSubmitter::new(&config).map_err(|e| e.to_string())?);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("scanpost-scanner")
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to build scanner runtime: {}", e))?;
    let (navigator, navigation) = ChannelNavigator::new();
    let (controller, handle) = ScanController::new(&config, submitter, navigator);
    runtime.spawn(controller.run());
    info!("Scanner created for {}", config.endpoint);

    Ok(MobileScanner {
        runtime,
        snapshots: AsyncMutex::new(handle.subscribe()),
        handle,
        navigation: Mutex::new(navigation),
    })
}

/// Screen gained focus (call on every focus, not only the first)
#[frb(sync)]
pub fn scanner_focused(scanner: &MobileScanner) -> Result<(), String> {
    scanner.send(ScannerEvent::ScreenFocused)
}

/// Camera widget decoded a barcode
///
/// # Arguments
/// * `symbology` - One of "qr", "pdf417", "ean13", "code128"
/// * `payload` - Decoded text
#[frb(sync)]
pub fn scanner_decoded(
    scanner: &MobileScanner,
    symbology: String,
    payload: String,
) -> Result<(), String> {
    let symbology = symbology
        .parse::<Symbology>()
        .map_err(|e| e.to_string())?;
    scanner.send(ScannerEvent::Decoded(DecodeEvent::new(symbology, payload)))
}

/// "Scan Again" pressed
#[frb(sync)]
pub fn scanner_rescan(scanner: &MobileScanner) -> Result<(), String> {
    scanner.send(ScannerEvent::RescanRequested)
}

/// "Flip Camera" pressed
#[frb(sync)]
pub fn scanner_toggle_facing(scanner: &MobileScanner) -> Result<(), String> {
    scanner.send(ScannerEvent::FacingToggled)
}

/// "Back" pressed; a "back" navigation request follows
#[frb(sync)]
pub fn scanner_exit(scanner: &MobileScanner) -> Result<(), String> {
    scanner.send(ScannerEvent::ExitRequested)
}

/// Result of the platform camera permission prompt
#[frb(sync)]
pub fn scanner_set_permission(scanner: &MobileScanner, granted: bool) -> Result<(), String> {
    let state = if granted {
        PermissionState::Granted
    } else {
        PermissionState::Denied
    };
    scanner.send(ScannerEvent::PermissionChanged(state))
}

/// Latest screen state
#[frb(sync)]
pub fn scanner_snapshot(scanner: &MobileScanner) -> ScanView {
    ScanView::from(scanner.handle.snapshot())
}

/// Wait for the next screen state change
///
/// # Errors
/// Returns an error once the scanner has been disposed.
#[frb]
pub async fn scanner_next_snapshot(scanner: &MobileScanner) -> Result<ScanView, String> {
    let mut updates = scanner.snapshots.lock().await;
    updates
        .changed()
        .await
        .map_err(|_| "Scanner disposed".to_string())?;
    let snapshot = updates.borrow_and_update().clone();
    Ok(ScanView::from(snapshot))
}

/// Pop the next pending navigation request ("back", "/", "/scanner")
#[frb(sync)]
pub fn scanner_take_navigation(scanner: &MobileScanner) -> Option<String> {
    let mut navigation = scanner.navigation.lock().ok()?;
    navigation.try_recv().ok().map(navigation_target)
}

/// Names accepted by `scanner_decoded`
#[frb(sync)]
pub fn supported_symbologies() -> Vec<String> {
    Symbology::SUPPORTED
        .iter()
        .map(|s| s.as_str().to_string())
        .collect()
}

/// Stop the controller and release the runtime
#[frb(sync)]
pub fn scanner_dispose(scanner: MobileScanner) {
    if let Err(e) = scanner.send(ScannerEvent::Shutdown) {
        debug!("Shutdown not delivered ({}), stopping runtime anyway", e);
    }
    scanner.runtime.shutdown_background();
    info!("Scanner disposed");
}
