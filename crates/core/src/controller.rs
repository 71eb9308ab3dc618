//! Scan session controller
//!
//! The controller is the only writer of the `ScanSession`. Host input
//! (focus, decode, rescan, flip, exit, permission) and submission completions
//! are both delivered as `ScannerEvent`s and handled one at a time on the
//! controller task. Observers read the session through `watch` snapshots.
//!
//! A submission runs on its own task and reports back with the ticket issued
//! when its payload was locked. Results whose ticket no longer matches (the
//! user rescanned, scanned something newer or left) are dropped. A refocus
//! alone keeps the ticket, so a pending result still lands.

use crate::camera::PermissionState;
use crate::config::ScannerConfig;
use crate::error::{CoreError, Result};
use crate::navigation::Navigator;
use crate::submit::Submitter;
use crate::types::{
    DecodeEvent, FacingDirection, ScanSession, SessionSnapshot, SubmissionResult, SubmissionTicket,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Input to the controller loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerEvent {
    ScreenFocused,
    Decoded(DecodeEvent),
    RescanRequested,
    FacingToggled,
    ExitRequested,
    PermissionChanged(PermissionState),
    SubmissionFinished {
        ticket: SubmissionTicket,
        result: SubmissionResult,
    },
    Shutdown,
}

/// Why a decode event had no effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A payload is already locked in; rescan to unlock
    Locked,
    /// Screen is not visible
    ScreenInactive,
    PermissionNotGranted,
}

/// What the controller did with a decode event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Locked and submitted under this ticket
    Accepted { ticket: SubmissionTicket },
    Ignored(IgnoreReason),
}

/// Owns the scan session and mediates between decode events and submission
pub struct ScanController<S: Submitter, N: Navigator> {
    session: ScanSession,
    permission: PermissionState,
    active: bool,
    submitter: Arc<S>,
    navigator: N,
    events_rx: mpsc::Receiver<ScannerEvent>,
    completions_tx: mpsc::UnboundedSender<ScannerEvent>,
    completions_rx: mpsc::UnboundedReceiver<ScannerEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl<S: Submitter, N: Navigator> ScanController<S, N> {
    /// Create controller and the handle the host drives it with
    pub fn new(config: &ScannerConfig, submitter: Arc<S>, navigator: N) -> (Self, ScannerHandle) {
        let session = ScanSession::new(config.initial_facing);
        let permission = PermissionState::Undetermined;
        let (events_tx, events_rx) = mpsc::channel(config.event_capacity.max(1));
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot(permission));

        let controller = Self {
            session,
            permission,
            active: false,
            submitter,
            navigator,
            events_rx,
            completions_tx,
            completions_rx,
            snapshot_tx,
        };
        let handle = ScannerHandle {
            events: events_tx,
            snapshots: snapshot_rx,
        };
        (controller, handle)
    }

    /// Create controller and run it on a new task
    pub fn spawn(config: &ScannerConfig, submitter: Arc<S>, navigator: N) -> (ScannerHandle, JoinHandle<()>) {
        let (controller, handle) = Self::new(config, submitter, navigator);
        let task = tokio::spawn(controller.run());
        (handle, task)
    }

    /// Process events until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        info!("Scan controller started");
        while self.step().await {}
        info!("Scan controller stopped");
    }

    /// Wait for and handle one event; `false` once the loop should stop
    pub async fn step(&mut self) -> bool {
        let event = tokio::select! {
            biased;
            Some(event) = self.completions_rx.recv() => event,
            event = self.events_rx.recv() => match event {
                Some(event) => event,
                None => return false,
            },
        };
        self.handle_event(event)
    }

    pub fn handle_event(&mut self, event: ScannerEvent) -> bool {
        match event {
            ScannerEvent::ScreenFocused => self.on_screen_focused(),
            ScannerEvent::Decoded(event) => {
                self.on_decode_event(event);
            }
            ScannerEvent::RescanRequested => self.request_rescan(),
            ScannerEvent::FacingToggled => {
                self.toggle_facing();
            }
            ScannerEvent::ExitRequested => self.on_exit(),
            ScannerEvent::PermissionChanged(state) => self.on_permission_changed(state),
            ScannerEvent::SubmissionFinished { ticket, result } => {
                self.on_submission_finished(ticket, result);
            }
            ScannerEvent::Shutdown => return false,
        }
        true
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    /// Screen became visible (first mount or return)
    pub fn on_screen_focused(&mut self) {
        self.active = true;
        self.session.reset_for_focus();
        debug!("Screen focused (epoch {})", self.session.ticket().epoch);
        self.publish();
    }

    pub fn on_decode_event(&mut self, event: DecodeEvent) -> DecodeOutcome {
        if !self.permission.is_granted() {
            debug!("Decode ignored: camera permission {:?}", self.permission);
            return DecodeOutcome::Ignored(IgnoreReason::PermissionNotGranted);
        }
        if !self.active {
            debug!("Decode ignored: screen inactive");
            return DecodeOutcome::Ignored(IgnoreReason::ScreenInactive);
        }
        let Some(ticket) = self.session.lock_with(&event.payload) else {
            debug!("Decode ignored: session locked");
            return DecodeOutcome::Ignored(IgnoreReason::Locked);
        };

        info!("Scanned {} code ({} chars)", event.symbology, event.payload.len());
        self.submit(ticket, &event.payload);
        DecodeOutcome::Accepted { ticket }
    }

    /// Unlock without waiting for a pending submission
    pub fn request_rescan(&mut self) {
        self.session.reset_for_rescan();
        debug!("Rescan requested (scan {})", self.session.ticket().sequence);
        self.publish();
    }

    /// Show "Sending..." and POST the payload on a separate task
    pub fn submit(&mut self, ticket: SubmissionTicket, payload: &str) {
        self.session.apply_result(ticket, &SubmissionResult::Pending);
        self.publish();

        let submitter = self.submitter.clone();
        let completions = self.completions_tx.clone();
        let payload = payload.to_string();
        tokio::spawn(async move {
            let result = submitter.submit(&payload).await;
            if completions
                .send(ScannerEvent::SubmissionFinished { ticket, result })
                .is_err()
            {
                debug!("Controller gone, submission result dropped");
            }
        });
    }

    pub fn toggle_facing(&mut self) -> FacingDirection {
        let facing = self.session.toggle_facing();
        debug!("Camera facing {}", facing);
        self.publish();
        facing
    }

    /// Reset everything and hand control back to the navigation host
    pub fn on_exit(&mut self) {
        self.active = false;
        self.session.reset_all();
        info!("Leaving scan screen");
        self.publish();
        self.navigator.navigate_back();
    }

    pub fn on_permission_changed(&mut self, state: PermissionState) {
        if state != self.permission {
            info!("Camera permission {:?}", state);
            self.permission = state;
            self.publish();
        }
    }

    /// Apply a completed submission if its session is still current
    pub fn on_submission_finished(&mut self, ticket: SubmissionTicket, result: SubmissionResult) -> bool {
        let applied = self.session.apply_result(ticket, &result);
        if applied {
            self.publish();
        } else {
            debug!(
                "Stale submission result dropped ({:?} != {:?})",
                ticket,
                self.session.ticket()
            );
        }
        applied
    }

    /// Current snapshot without going through the watch channel
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot(self.permission)
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

/// Host-side handle to a running controller
#[derive(Clone)]
pub struct ScannerHandle {
    events: mpsc::Sender<ScannerEvent>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl ScannerHandle {
    pub async fn send(&self, event: ScannerEvent) -> Result<()> {
        self.events.send(event).await?;
        Ok(())
    }

    /// Send without waiting (for synchronous hosts)
    pub fn try_send(&self, event: ScannerEvent) -> Result<()> {
        self.events.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                CoreError::InvalidState("scanner event queue is full".to_string())
            }
            mpsc::error::TrySendError::Closed(_) => CoreError::ChannelClosed,
        })
    }

    pub async fn focus(&self) -> Result<()> {
        self.send(ScannerEvent::ScreenFocused).await
    }

    pub async fn decoded(&self, event: DecodeEvent) -> Result<()> {
        self.send(ScannerEvent::Decoded(event)).await
    }

    pub async fn rescan(&self) -> Result<()> {
        self.send(ScannerEvent::RescanRequested).await
    }

    pub async fn toggle_facing(&self) -> Result<()> {
        self.send(ScannerEvent::FacingToggled).await
    }

    pub async fn exit(&self) -> Result<()> {
        self.send(ScannerEvent::ExitRequested).await
    }

    pub async fn set_permission(&self, state: PermissionState) -> Result<()> {
        self.send(ScannerEvent::PermissionChanged(state)).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(ScannerEvent::Shutdown).await
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Independent receiver for snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}
