//! In-process camera whose frames are injected by the host

use super::traits::{CameraCapability, PermissionState};
use crate::error::{CoreError, Result};
use crate::streaming::DecodeStream;
use crate::types::{DecodeEvent, FacingDirection, Symbology};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::debug;

struct ActiveFeed {
    stream: DecodeStream,
    enabled: Vec<Symbology>,
}

type SharedFeed = Arc<Mutex<Option<ActiveFeed>>>;

fn lock_feed(feed: &SharedFeed) -> MutexGuard<'_, Option<ActiveFeed>> {
    feed.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Camera driven by a `DecodeInjector` instead of real frames
pub struct SimulatedCamera {
    permission: PermissionState,
    grant_on_request: bool,
    facing: FacingDirection,
    capacity: usize,
    feed: SharedFeed,
}

impl SimulatedCamera {
    /// Create camera; `grant_on_request` is what the user answers to the prompt
    pub fn new(grant_on_request: bool) -> Self {
        Self {
            permission: PermissionState::Undetermined,
            grant_on_request,
            facing: FacingDirection::default(),
            capacity: 16,
            feed: Arc::new(Mutex::new(None)),
        }
    }

    /// Start with permission already granted
    pub fn granted() -> Self {
        let mut camera = Self::new(true);
        camera.permission = PermissionState::Granted;
        camera
    }

    /// Set decode buffer capacity used on activation
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Change the answer to the next permission prompt
    pub fn set_grant_on_request(&mut self, grant: bool) {
        self.grant_on_request = grant;
    }

    pub fn facing(&self) -> FacingDirection {
        self.facing
    }

    /// Handle for feeding frames into the active preview
    pub fn injector(&self) -> DecodeInjector {
        DecodeInjector {
            feed: self.feed.clone(),
        }
    }
}

#[async_trait]
impl CameraCapability for SimulatedCamera {
    async fn permission(&self) -> Result<PermissionState> {
        Ok(self.permission)
    }

    async fn request_permission(&mut self) -> Result<PermissionState> {
        if !self.permission.is_granted() {
            self.permission = if self.grant_on_request {
                PermissionState::Granted
            } else {
                PermissionState::Denied
            };
        }
        Ok(self.permission)
    }

    async fn activate(
        &mut self,
        facing: FacingDirection,
        symbologies: &[Symbology],
    ) -> Result<mpsc::Receiver<DecodeEvent>> {
        if !self.permission.is_granted() {
            return Err(CoreError::PermissionDenied);
        }
        let (stream, rx) = DecodeStream::new(self.capacity);
        self.facing = facing;
        *lock_feed(&self.feed) = Some(ActiveFeed {
            stream,
            enabled: symbologies.to_vec(),
        });
        debug!("Simulated camera active ({} facing)", facing);
        Ok(rx)
    }

    fn set_facing(&mut self, facing: FacingDirection) -> Result<()> {
        if !self.is_active() {
            return Err(CoreError::CameraInactive);
        }
        self.facing = facing;
        Ok(())
    }

    async fn deactivate(&mut self) -> Result<()> {
        lock_feed(&self.feed).take();
        Ok(())
    }

    fn is_active(&self) -> bool {
        lock_feed(&self.feed).is_some()
    }
}

/// Feeds decode events into a `SimulatedCamera`
#[derive(Clone)]
pub struct DecodeInjector {
    feed: SharedFeed,
}

impl DecodeInjector {
    /// Deliver one frame's decode result.
    ///
    /// Returns `false` if the camera is inactive, the symbology is not
    /// enabled, or the frame was dropped.
    pub fn inject(&self, event: DecodeEvent) -> bool {
        let guard = lock_feed(&self.feed);
        let Some(feed) = guard.as_ref() else {
            debug!("Camera inactive, frame discarded");
            return false;
        };
        if !feed.enabled.contains(&event.symbology) {
            debug!("Symbology {} not enabled, frame discarded", event.symbology);
            return false;
        }
        feed.stream.push(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_permission_prompt() {
        let mut camera = SimulatedCamera::new(false);
        assert_eq!(camera.permission().await.unwrap(), PermissionState::Undetermined);
        assert_eq!(camera.request_permission().await.unwrap(), PermissionState::Denied);

        camera.set_grant_on_request(true);
        assert_eq!(camera.request_permission().await.unwrap(), PermissionState::Granted);
    }

    #[tokio::test]
    async fn test_activate_requires_permission() {
        let mut camera = SimulatedCamera::new(false);
        let result = camera.activate(FacingDirection::Back, &Symbology::SUPPORTED).await;
        assert!(matches!(result, Err(CoreError::PermissionDenied)));
        assert!(!camera.is_active());
    }

    #[tokio::test]
    async fn test_injected_frames_reach_stream() {
        let mut camera = SimulatedCamera::granted();
        let injector = camera.injector();
        assert!(!injector.inject(DecodeEvent::qr("early")));

        let mut rx = camera
            .activate(FacingDirection::Back, &Symbology::SUPPORTED)
            .await
            .unwrap();
        assert!(injector.inject(DecodeEvent::new(Symbology::Ean13, "4006381333931")));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.symbology, Symbology::Ean13);
        assert_eq!(event.payload, "4006381333931");
    }

    #[tokio::test]
    async fn test_disabled_symbology_filtered() {
        let mut camera = SimulatedCamera::granted();
        let injector = camera.injector();
        let mut rx = camera
            .activate(FacingDirection::Back, &[Symbology::Qr])
            .await
            .unwrap();

        assert!(!injector.inject(DecodeEvent::new(Symbology::Code128, "C128")));
        assert!(injector.inject(DecodeEvent::qr("QR")));
        assert_eq!(rx.recv().await.unwrap().payload, "QR");
    }

    #[tokio::test]
    async fn test_deactivate_closes_stream() {
        let mut camera = SimulatedCamera::granted();
        let mut rx = camera
            .activate(FacingDirection::Front, &Symbology::SUPPORTED)
            .await
            .unwrap();
        assert_eq!(camera.facing(), FacingDirection::Front);

        camera.deactivate().await.unwrap();
        assert!(!camera.is_active());
        assert!(rx.recv().await.is_none());
        assert!(camera.set_facing(FacingDirection::Back).is_err());
    }
}
