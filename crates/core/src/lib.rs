//! Scanpost Core - Scan session logic for the barcode scanner screen
//!
//! This crate provides:
//! - Domain types (facing, decode events, session, submission outcomes)
//! - Camera capability trait and an in-process simulated camera
//! - Payload submission over HTTP
//! - The scan controller (single writer of the session) and screen mediator
//! - Navigation host abstraction
//! - Error types

pub mod camera;
pub mod config;
pub mod controller;
pub mod error;
pub mod navigation;
pub mod screen;
pub mod streaming;
pub mod submit;
pub mod types;

// Re-export common types
pub use camera::{CameraCapability, DecodeInjector, PermissionState, SimulatedCamera};
pub use config::{ScannerConfig, DEFAULT_ENDPOINT};
pub use controller::{DecodeOutcome, IgnoreReason, ScanController, ScannerEvent, ScannerHandle};
pub use error::{CoreError, Result};
pub use navigation::{ChannelNavigator, NavigationRequest, Navigator, RecordingNavigator, Route};
pub use screen::ScanScreen;
pub use streaming::DecodeStream;
pub use submit::{HttpSubmitter, MockSubmitter, Submitter};
pub use types::{
    DecodeEvent, FacingDirection, FailureKind, ScanSession, SessionSnapshot, SubmissionResult,
    SubmissionTicket, Symbology,
};
