//! Channel-based decode event delivery
//!
//! Camera frames arrive far faster than the controller needs them. The
//! bounded channel between camera and controller drops frames instead of
//! stalling the camera: the same code is decoded again on the next frame.

use crate::types::DecodeEvent;
use tokio::sync::mpsc;
use tracing::debug;

/// Bounded channel for decode events
#[derive(Clone)]
pub struct DecodeStream {
    tx: mpsc::Sender<DecodeEvent>,
}

impl DecodeStream {
    /// Create new stream with specified buffer capacity
    ///
    /// # Returns
    /// * `(DecodeStream, mpsc::Receiver<DecodeEvent>)` - Sender and receiver halves
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<DecodeEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Push a frame's decode result without waiting.
    ///
    /// Returns `false` when the frame was dropped (buffer full or receiver gone).
    pub fn push(&self, event: DecodeEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                debug!("Decode buffer full, dropping {} frame", event.symbology);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Send, waiting for buffer space
    pub async fn send(&self, event: DecodeEvent) -> Result<(), mpsc::error::SendError<DecodeEvent>> {
        self.tx.send(event).await
    }

    /// Get current free capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    /// Check if the consumer went away
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
