//! Navigation host abstraction

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::debug;

/// Screens the host can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Home,
    Scanner,
}

/// Request issued to the navigation host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigationRequest {
    NavigateTo(Route),
    Back,
}

/// Switches the visible screen
///
/// Called from the controller loop, so implementations must not block.
pub trait Navigator: Send + Sync + 'static {
    fn navigate_to(&self, route: Route);
    fn navigate_back(&self);
}

/// Forwards requests to the host over a channel
#[derive(Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<NavigationRequest>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NavigationRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, request: NavigationRequest) {
        if self.tx.send(request).is_err() {
            debug!("Navigation host gone, dropping {:?}", request);
        }
    }
}

impl Navigator for ChannelNavigator {
    fn navigate_to(&self, route: Route) {
        self.forward(NavigationRequest::NavigateTo(route));
    }

    fn navigate_back(&self) {
        self.forward(NavigationRequest::Back);
    }
}

/// Records requests for assertions
#[derive(Clone, Default)]
pub struct RecordingNavigator {
    requests: Arc<Mutex<Vec<NavigationRequest>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<NavigationRequest> {
        self.requests.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn record(&self, request: NavigationRequest) {
        self.requests
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(request);
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, route: Route) {
        self.record(NavigationRequest::NavigateTo(route));
    }

    fn navigate_back(&self) {
        self.record(NavigationRequest::Back);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_navigator_forwards() {
        let (nav, mut rx) = ChannelNavigator::new();
        nav.navigate_to(Route::Scanner);
        nav.navigate_back();

        assert_eq!(rx.recv().await, Some(NavigationRequest::NavigateTo(Route::Scanner)));
        assert_eq!(rx.recv().await, Some(NavigationRequest::Back));
    }

    #[test]
    fn test_channel_navigator_without_host() {
        let (nav, rx) = ChannelNavigator::new();
        drop(rx);
        nav.navigate_back();
    }

    #[test]
    fn test_recording_navigator() {
        let nav = RecordingNavigator::new();
        let shared = nav.clone();
        nav.navigate_back();
        assert_eq!(shared.requests(), vec![NavigationRequest::Back]);
    }
}
