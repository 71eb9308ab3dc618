//! Terminal QR codes for pointing a device at test payloads

use anyhow::{Context, Result};
use qrcode::render::unicode;
use qrcode::QrCode;

/// Render `payload` as a QR code made of Unicode half blocks
///
/// Uses the Dense1x2 renderer: two modules per character cell keeps the
/// code small enough to scan off a terminal.
pub fn render_terminal(payload: &str) -> Result<String> {
    let code = QrCode::new(payload.as_bytes()).context("Payload too large for a QR code")?;

    // Dark on terminal = Light char, Light background = Dark char
    let image = code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build();

    Ok(image)
}
