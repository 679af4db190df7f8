//! Scannable Code Encoding
//!
//! Encodes an opaque payload as a QR code and renders it as SVG.
//! Same input bytes always give the same code.

use qrcode::render::svg;
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode};
use thiserror::Error;

/// Largest rendered side length in SVG user units, quiet zone included
const MAX_DIMENSION: u32 = 240;

/// Errors raised by the QR encoder
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("payload of {len} bytes exceeds QR code capacity")]
    PayloadTooLong { len: usize },

    #[error("QR encoder failed: {0}")]
    Encoder(QrError),
}

/// A QR code: the rendered SVG plus the module matrix it was drawn from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCode {
    svg: String,
    width: usize,
    modules: Vec<bool>,
}

impl EncodedCode {
    /// Full SVG document, including the XML prolog
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// The `<svg>` element alone, for embedding in another document
    pub fn svg_element(&self) -> &str {
        self.svg
            .find("<svg")
            .map_or(self.svg.as_str(), |start| &self.svg[start..])
    }

    /// Number of modules per side
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at column `x`, row `y` is dark
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }
}

/// Encode `payload` as a QR code (error correction level M)
pub fn encode_qr(payload: &[u8]) -> Result<EncodedCode, EncodingError> {
    let code = QrCode::with_error_correction_level(payload, EcLevel::M).map_err(|e| match e {
        QrError::DataTooLong => EncodingError::PayloadTooLong { len: payload.len() },
        other => EncodingError::Encoder(other),
    })?;

    let svg = code
        .render::<svg::Color<'_>>()
        .max_dimensions(MAX_DIMENSION, MAX_DIMENSION)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();

    let modules = code
        .to_colors()
        .into_iter()
        .map(|color| color == Color::Dark)
        .collect();

    Ok(EncodedCode {
        svg,
        width: code.width(),
        modules,
    })
}
