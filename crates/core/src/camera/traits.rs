//! Camera capability trait

use crate::error::Result;
use crate::types::{DecodeEvent, FacingDirection, Symbology};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Camera permission as reported by the platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Not asked yet (permissions still loading)
    #[default]
    Undetermined,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Camera that yields decode events for the enabled symbologies
#[async_trait]
pub trait CameraCapability: Send + Sync {
    /// Current permission without prompting
    async fn permission(&self) -> Result<PermissionState>;

    /// Prompt for permission (no-op if already granted)
    async fn request_permission(&mut self) -> Result<PermissionState>;

    /// Start the preview and return the decode event stream.
    ///
    /// Fails with `CoreError::PermissionDenied` unless permission is granted.
    async fn activate(
        &mut self,
        facing: FacingDirection,
        symbologies: &[Symbology],
    ) -> Result<mpsc::Receiver<DecodeEvent>>;

    /// Switch between front and back camera
    fn set_facing(&mut self, facing: FacingDirection) -> Result<()>;

    /// Stop the preview; the decode stream closes
    async fn deactivate(&mut self) -> Result<()>;

    fn is_active(&self) -> bool;
}
