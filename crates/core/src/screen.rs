//! Scan screen mediator
//!
//! Wires a camera capability to a running controller: acquires permission,
//! starts the preview, pumps decode events into the controller and keeps the
//! camera facing in step with the session.

use crate::camera::{CameraCapability, PermissionState};
use crate::controller::ScannerHandle;
use crate::error::{CoreError, Result};
use crate::types::{FacingDirection, Symbology};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// How long `toggle_facing` waits for the controller to publish the flip
const FACING_SYNC_TIMEOUT: Duration = Duration::from_secs(2);

/// Owns the camera for one scan screen
pub struct ScanScreen<C: CameraCapability> {
    camera: C,
    handle: ScannerHandle,
    symbologies: Vec<Symbology>,
    pump: Option<JoinHandle<()>>,
}

impl<C: CameraCapability> ScanScreen<C> {
    pub fn new(camera: C, handle: ScannerHandle, symbologies: Vec<Symbology>) -> Self {
        Self {
            camera,
            handle,
            symbologies,
            pump: None,
        }
    }

    pub fn handle(&self) -> &ScannerHandle {
        &self.handle
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    /// Screen became visible: ensure permission, start the camera, focus.
    ///
    /// Returns `CoreError::PermissionDenied` when the user refused; the
    /// screen then shows the permission prompt and `retry_permission` is the
    /// way forward.
    pub async fn activate(&mut self) -> Result<()> {
        let permission = self.acquire_permission().await?;
        if !permission.is_granted() {
            warn!("Camera permission not granted");
            return Err(CoreError::PermissionDenied);
        }

        if !self.camera.is_active() {
            let facing = self.handle.snapshot().facing;
            let mut decodes = self.camera.activate(facing, &self.symbologies).await?;
            let handle = self.handle.clone();
            self.pump = Some(tokio::spawn(async move {
                while let Some(event) = decodes.recv().await {
                    if handle.decoded(event).await.is_err() {
                        break;
                    }
                }
                debug!("Decode pump finished");
            }));
            info!("Camera active ({} facing)", facing);
        }

        self.handle.focus().await
    }

    /// Ask for permission again after a refusal
    pub async fn retry_permission(&mut self) -> Result<()> {
        let state = self.camera.request_permission().await?;
        self.handle.set_permission(state).await?;
        self.activate().await
    }

    /// Flip the camera and wait until the session reflects it.
    ///
    /// Fails with `CoreError::InvalidState` if the screen is left before the
    /// flip is published or nothing is published within `FACING_SYNC_TIMEOUT`.
    pub async fn toggle_facing(&mut self) -> Result<FacingDirection> {
        let mut updates = self.handle.subscribe();
        let (before, epoch) = {
            let current = updates.borrow_and_update();
            (current.facing, current.epoch)
        };
        self.handle.toggle_facing().await?;

        let (facing, seen_epoch) = timeout(
            FACING_SYNC_TIMEOUT,
            updates.wait_for(|s| s.facing != before || s.epoch != epoch),
        )
        .await
        .map_err(|_| CoreError::InvalidState("camera flip was not acknowledged".to_string()))?
        .map(|s| (s.facing, s.epoch))
        .map_err(|_| CoreError::ChannelClosed)?;
        if seen_epoch != epoch {
            return Err(CoreError::InvalidState(
                "scan screen left during camera flip".to_string(),
            ));
        }

        if self.camera.is_active() {
            self.camera.set_facing(facing)?;
        }
        Ok(facing)
    }

    pub async fn rescan(&self) -> Result<()> {
        self.handle.rescan().await
    }

    /// Stop the camera, then let the controller reset and navigate back
    pub async fn exit(&mut self) -> Result<()> {
        self.camera.deactivate().await?;
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.handle.exit().await
    }

    async fn acquire_permission(&mut self) -> Result<PermissionState> {
        let mut state = self.camera.permission().await?;
        if state == PermissionState::Undetermined {
            state = self.camera.request_permission().await?;
        }
        self.handle.set_permission(state).await?;
        Ok(state)
    }
}
