//! Terminal rendering of the scan screen

use scanpost_core::{PermissionState, SessionSnapshot};

/// Text version of what the phone screen shows
pub fn format_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();

    match snapshot.permission {
        PermissionState::Undetermined => {
            out.push_str("Loading permissions...");
            return out;
        }
        PermissionState::Denied => {
            out.push_str("We need camera and barcode scanner permissions (type 'grant')");
            return out;
        }
        PermissionState::Granted => {}
    }

    out.push_str(&format!(
        "[camera: {}{}]",
        snapshot.facing,
        if snapshot.locked { " | locked" } else { "" }
    ));
    if !snapshot.last_payload.is_empty() {
        out.push_str("\nScanned QR Code: ");
        out.push_str(&snapshot.last_payload);
    }
    if !snapshot.status_message.is_empty() {
        out.push_str("\n>> ");
        out.push_str(&snapshot.status_message);
    }
    out
}
