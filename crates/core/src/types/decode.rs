//! Decode events delivered by the camera capability

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Barcode formats the scanner recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbology {
    Qr,
    Pdf417,
    Ean13,
    Code128,
}

impl Symbology {
    /// Every format enabled on the camera by default
    pub const SUPPORTED: [Symbology; 4] = [Self::Qr, Self::Pdf417, Self::Ean13, Self::Code128];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qr => "qr",
            Self::Pdf417 => "pdf417",
            Self::Ean13 => "ean13",
            Self::Code128 => "code128",
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbology {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        Self::SUPPORTED
            .into_iter()
            .find(|sym| sym.as_str() == name)
            .ok_or(CoreError::UnsupportedSymbology(name))
    }
}

/// A barcode recognized in the current camera frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeEvent {
    pub symbology: Symbology,
    pub payload: String,
}

impl DecodeEvent {
    pub fn new(symbology: Symbology, payload: impl Into<String>) -> Self {
        Self {
            symbology,
            payload: payload.into(),
        }
    }

    /// Shorthand for a QR code event
    pub fn qr(payload: impl Into<String>) -> Self {
        Self::new(Symbology::Qr, payload)
    }
}
