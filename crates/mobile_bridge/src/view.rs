//! Dart-friendly views of core types

use flutter_rust_bridge::frb;
use scanpost_core::{NavigationRequest, Route, SessionSnapshot};
use serde::Serialize;

/// What the scan screen renders
#[frb(sync)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanView {
    /// "front" or "back"
    pub facing: String,
    pub locked: bool,
    /// Empty hides the result panel
    pub scanned_data: String,
    /// Empty hides the status banner
    pub message: String,
    /// "undetermined", "granted" or "denied"
    pub permission: String,
}

impl From<SessionSnapshot> for ScanView {
    fn from(snapshot: SessionSnapshot) -> Self {
        let permission = match snapshot.permission {
            scanpost_core::PermissionState::Undetermined => "undetermined",
            scanpost_core::PermissionState::Granted => "granted",
            scanpost_core::PermissionState::Denied => "denied",
        };
        Self {
            facing: snapshot.facing.to_string(),
            locked: snapshot.locked,
            scanned_data: snapshot.last_payload,
            message: snapshot.status_message,
            permission: permission.to_string(),
        }
    }
}

impl ScanView {
    pub fn needs_permission_prompt(&self) -> bool {
        self.permission == "denied"
    }
}

/// Route name the Dart router understands
pub fn navigation_target(request: NavigationRequest) -> String {
    match request {
        NavigationRequest::Back => "back".to_string(),
        NavigationRequest::NavigateTo(Route::Home) => "/".to_string(),
        NavigationRequest::NavigateTo(Route::Scanner) => "/scanner".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanpost_core::{FacingDirection, PermissionState, ScanSession};

    #[test]
    fn test_view_from_snapshot() {
        let mut session = ScanSession::new(FacingDirection::Front);
        session.lock_with("ABC123");
        let view = ScanView::from(session.snapshot(PermissionState::Granted));

        assert_eq!(view.facing, "front");
        assert!(view.locked);
        assert_eq!(view.scanned_data, "ABC123");
        assert_eq!(view.message, "");
        assert_eq!(view.permission, "granted");
        assert!(!view.needs_permission_prompt());
    }

    #[test]
    fn test_denied_needs_prompt() {
        let view = ScanView::from(ScanSession::default().snapshot(PermissionState::Denied));
        assert!(view.needs_permission_prompt());
        assert_eq!(view.scanned_data, "");
    }

    #[test]
    fn test_navigation_targets() {
        assert_eq!(navigation_target(NavigationRequest::Back), "back");
        assert_eq!(navigation_target(NavigationRequest::NavigateTo(Route::Home)), "/");
        assert_eq!(
            navigation_target(NavigationRequest::NavigateTo(Route::Scanner)),
            "/scanner"
        );
    }
}
