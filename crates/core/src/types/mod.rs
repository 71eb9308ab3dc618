//! Domain types for the scan screen

mod decode;
mod facing;
mod session;
mod submission;

pub use decode::{DecodeEvent, Symbology};
pub use facing::FacingDirection;
pub use session::{ScanSession, SessionSnapshot, SubmissionTicket};
pub use submission::{FailureKind, SubmissionResult, SubmitRequest, SubmitResponse};
