//! Scan session state
//!
//! The session is a two-state machine (UNLOCKED -> LOCKED) plus the
//! payload/status shown on screen. Two counters guard late submission
//! results:
//!
//! - `epoch` identifies one visit to the screen and only changes on exit.
//! - `sequence` identifies one scan and changes on every lock and rescan.
//!
//! A submission carries both in a [`SubmissionTicket`]; its result is applied
//! only while both still match.

use super::facing::FacingDirection;
use super::submission::SubmissionResult;
use crate::camera::PermissionState;
use serde::Serialize;

/// Identifies the scan a submission belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionTicket {
    pub epoch: u64,
    pub sequence: u64,
}

/// Mutable state of one active scan screen
#[derive(Debug, Clone)]
pub struct ScanSession {
    initial_facing: FacingDirection,
    facing: FacingDirection,
    locked: bool,
    last_payload: String,
    status_message: String,
    epoch: u64,
    sequence: u64,
}

impl ScanSession {
    pub fn new(facing: FacingDirection) -> Self {
        Self {
            initial_facing: facing,
            facing,
            locked: false,
            last_payload: String::new(),
            status_message: String::new(),
            epoch: 0,
            sequence: 0,
        }
    }

    pub fn facing(&self) -> FacingDirection {
        self.facing
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn last_payload(&self) -> &str {
        &self.last_payload
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn ticket(&self) -> SubmissionTicket {
        SubmissionTicket {
            epoch: self.epoch,
            sequence: self.sequence,
        }
    }

    /// Screen regained visibility. The status line is left alone and a
    /// pending submission may still land.
    pub fn reset_for_focus(&mut self) {
        self.locked = false;
        self.last_payload.clear();
    }

    /// User asked to scan again
    pub fn reset_for_rescan(&mut self) {
        self.locked = false;
        self.last_payload.clear();
        self.status_message.clear();
        self.sequence += 1;
    }

    /// Leaving the screen: every field back to its initial value
    pub fn reset_all(&mut self) {
        self.facing = self.initial_facing;
        self.locked = false;
        self.last_payload.clear();
        self.status_message.clear();
        self.epoch += 1;
        self.sequence += 1;
    }

    /// Lock on a decoded payload.
    ///
    /// Returns the ticket the submission must carry, or `None` when the
    /// session was already locked (the event is dropped).
    pub fn lock_with(&mut self, payload: &str) -> Option<SubmissionTicket> {
        if self.locked {
            return None;
        }
        self.locked = true;
        self.last_payload = payload.to_string();
        self.sequence += 1;
        Some(self.ticket())
    }

    pub fn toggle_facing(&mut self) -> FacingDirection {
        self.facing = self.facing.toggled();
        self.facing
    }

    /// Apply a submission outcome; results for an older scan or visit are rejected.
    pub fn apply_result(&mut self, ticket: SubmissionTicket, result: &SubmissionResult) -> bool {
        if ticket != self.ticket() {
            return false;
        }
        self.status_message = result.status_message();
        true
    }

    pub fn snapshot(&self, permission: PermissionState) -> SessionSnapshot {
        SessionSnapshot {
            facing: self.facing,
            locked: self.locked,
            last_payload: self.last_payload.clone(),
            status_message: self.status_message.clone(),
            epoch: self.epoch,
            permission,
        }
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new(FacingDirection::default())
    }
}

/// Read-only view of the session published to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub facing: FacingDirection,
    pub locked: bool,
    pub last_payload: String,
    pub status_message: String,
    pub epoch: u64,
    pub permission: PermissionState,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        ScanSession::default().snapshot(PermissionState::Undetermined)
    }
}
