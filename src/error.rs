//! Unified error types for QR Studio
//!
//! The formatter and style resolver are total and never produce these.
//! Everything fallible (service orchestration, encoder, history store,
//! configuration, FFI input) reports through `StudioError`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all fallible QR Studio operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl StudioError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn empty_content(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::EmptyContent, msg)
    }

    pub fn encoder_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::EncoderFailed, msg)
    }

    pub fn persistence_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::PersistenceFailed, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for StudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StudioError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidInput,
    EmptyContent,
    PayloadTooLarge,

    // Collaborator errors
    EncoderFailed,
    PersistenceFailed,
    NotFound,

    // Parse errors
    ParseError,
    JsonError,

    // Setup
    ConfigError,

    // Internal
    Internal,
}

/// Result type alias for QR Studio operations
pub type StudioResult<T> = Result<T, StudioError>;

// Conversions from common error types

impl From<serde_json::Error> for StudioError {
    fn from(e: serde_json::Error) -> Self {
        StudioError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<std::io::Error> for StudioError {
    fn from(e: std::io::Error) -> Self {
        StudioError::new(ErrorCode::Internal, e.to_string())
    }
}

impl From<crate::qr::SymbolError> for StudioError {
    fn from(e: crate::qr::SymbolError) -> Self {
        use crate::qr::SymbolError;

        match e {
            SymbolError::EmptyPayload => StudioError::empty_content(e.to_string()),
            SymbolError::PayloadTooLarge(..) => {
                StudioError::new(ErrorCode::PayloadTooLarge, e.to_string())
            }
            SymbolError::InvalidOptions(_) | SymbolError::Backend(_) => {
                StudioError::encoder_failed(e.to_string())
            }
        }
    }
}
