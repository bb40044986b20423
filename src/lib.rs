//! QR Studio Core Library
//!
//! Payload formatting and style resolution for QR code generation.
//!
//! # Architecture
//!
//! This crate provides:
//! - **content**: Build and parse payloads for text, URL, email, phone,
//!   SMS, WiFi and vCard content
//! - **style**: Fill sparse style settings with defaults and bounds
//! - **qr**: Error correction levels, capacity checks, encoder contract
//! - **history**: Generation history and scan analytics store
//! - **service**: Generation orchestration with best-effort history saving
//! - **ffi**: C-ABI exports for native front ends
//!
//! # FFI Usage
//!
//! All public FFI functions are in the `ffi` module and follow this pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `qrstudio_free_string`)
//!
//! # Example
//!
//! ```rust
//! use qr_studio::{field_map, ContentFormatter, ContentKind};
//!
//! let fields = field_map([("ssid", "Cafe"), ("password", "latte"), ("security", "WPA")]);
//! let payload = ContentFormatter::new().format(ContentKind::Wifi, &fields);
//! assert_eq!(payload, "WIFI:T:WPA;S:Cafe;P:latte;H:false;;");
//! ```

pub mod content;
pub mod error;
pub mod ffi;
pub mod history;
pub mod qr;
pub mod service;
pub mod style;
pub mod types;
pub mod utils;

// Re-export key types for convenience
pub use content::{
    detect_kind, format_content, parse_content, ContentFields, ContentFormatter, Escaping,
};
pub use error::{ErrorCode, StudioError, StudioResult};
pub use history::{HistoryStore, InMemoryHistoryStore};
pub use qr::{ErrorCorrectionLevel, SymbolEncoder, SymbolImage};
pub use service::{GenerateRequest, GenerationResult, IdentityProvider, QrService, StaticIdentity};
pub use style::{resolve_style, PartialStyle, StyleConfig, StyleResolver};
pub use types::{field_map, ContentKind, FieldMap, FieldValue, UserId};
