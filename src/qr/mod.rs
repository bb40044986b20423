//! Symbol Encoder Boundary
//!
//! The bit-level QR encoder is an external collaborator. This module
//! defines what we hand it (`EncodeOptions`), what we get back
//! (`SymbolImage`), and the capacity limits we check before calling it.
//!
//! # Usage
//! ```rust,ignore
//! use qr_studio::qr::{SymbolEncoder, EncodeOptions};
//!
//! let image = encoder.encode("tel:+1234567890", &EncodeOptions::default())?;
//! let data_url = image.to_data_url();
//! ```

pub mod encoder;

pub use encoder::{check_capacity, EncodeOptions, SymbolEncoder, SymbolImage};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Encoder-side errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("Payload is empty")]
    EmptyPayload,

    #[error("Payload too large for single QR code: {0} bytes (max {1})")]
    PayloadTooLarge(usize, usize),

    #[error("Invalid encoder options: {0}")]
    InvalidOptions(String),

    #[error("Encoder failure: {0}")]
    Backend(String),
}

/// Maximum bytes for a single QR code at error correction level L
pub const MAX_QR_BYTES_L: usize = 2953;
/// Maximum bytes for a single QR code at error correction level M
pub const MAX_QR_BYTES_M: usize = 2331;
/// Maximum bytes for a single QR code at error correction level Q
pub const MAX_QR_BYTES_Q: usize = 1663;
/// Maximum bytes for a single QR code at error correction level H
pub const MAX_QR_BYTES_H: usize = 1273;

/// QR code error correction level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCorrectionLevel {
    /// Low (~7% recovery)
    L,
    /// Medium (~15% recovery)
    #[default]
    M,
    /// Quartile (~25% recovery)
    Q,
    /// High (~30% recovery)
    H,
}

impl ErrorCorrectionLevel {
    /// Maximum bytes for this error correction level
    pub fn max_bytes(&self) -> usize {
        match self {
            ErrorCorrectionLevel::L => MAX_QR_BYTES_L,
            ErrorCorrectionLevel::M => MAX_QR_BYTES_M,
            ErrorCorrectionLevel::Q => MAX_QR_BYTES_Q,
            ErrorCorrectionLevel::H => MAX_QR_BYTES_H,
        }
    }

    /// Approximate share of damaged modules the symbol survives
    pub fn recovery_percent(&self) -> u8 {
        match self {
            ErrorCorrectionLevel::L => 7,
            ErrorCorrectionLevel::M => 15,
            ErrorCorrectionLevel::Q => 25,
            ErrorCorrectionLevel::H => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCorrectionLevel::L => "L",
            ErrorCorrectionLevel::M => "M",
            ErrorCorrectionLevel::Q => "Q",
            ErrorCorrectionLevel::H => "H",
        }
    }
}

impl fmt::Display for ErrorCorrectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCorrectionLevel {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(ErrorCorrectionLevel::L),
            "M" => Ok(ErrorCorrectionLevel::M),
            "Q" => Ok(ErrorCorrectionLevel::Q),
            "H" => Ok(ErrorCorrectionLevel::H),
            other => Err(SymbolError::InvalidOptions(format!(
                "unknown error correction level: {}",
                other
            ))),
        }
    }
}
