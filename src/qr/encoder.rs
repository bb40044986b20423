//! Encoder contract
//!
//! Implementations turn a payload plus options into image bytes (PNG,
//! SVG, ...). They must reject empty payloads and invalid options.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use super::{ErrorCorrectionLevel, SymbolError};

/// Options the external encoder consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeOptions {
    /// Output width in pixels
    pub width: u32,
    /// Quiet zone in modules
    pub margin: u32,
    /// Module color (`#rrggbb`)
    pub dark_color: String,
    /// Background color (`#rrggbb`)
    pub light_color: String,
    pub error_correction_level: ErrorCorrectionLevel,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            width: 256,
            margin: 4,
            dark_color: "#000000".to_string(),
            light_color: "#ffffff".to_string(),
            error_correction_level: ErrorCorrectionLevel::M,
        }
    }
}

/// Encoded image returned by the encoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolImage {
    /// e.g. `image/png`, `image/svg+xml`
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SymbolImage {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// `data:<mime>;base64,<bytes>` for embedding or download links
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.bytes))
    }
}

/// External matrix-symbol encoder
pub trait SymbolEncoder {
    fn encode(&self, payload: &str, options: &EncodeOptions) -> Result<SymbolImage, SymbolError>;
}

impl<E: SymbolEncoder + ?Sized> SymbolEncoder for &E {
    fn encode(&self, payload: &str, options: &EncodeOptions) -> Result<SymbolImage, SymbolError> {
        (**self).encode(payload, options)
    }
}

/// Reject payloads a single symbol cannot hold at `level`
pub fn check_capacity(payload: &str, level: ErrorCorrectionLevel) -> Result<(), SymbolError> {
    if payload.trim().is_empty() {
        return Err(SymbolError::EmptyPayload);
    }

    let max = level.max_bytes();
    if payload.len() > max {
        return Err(SymbolError::PayloadTooLarge(payload.len(), max));
    }

    Ok(())
}
