//! Flutter bridge for the scan screen
//!
//! The Flutter side owns the camera widget and the permission prompt; it
//! forwards decode callbacks and lifecycle changes here and renders the
//! snapshots it gets back.

pub mod api;
pub mod view;
