//! Content Formatting
//!
//! Converts structured user input into the exact payload string encoded
//! in a symbol, and parses payloads back into fields.
//!
//! # Formats
//! - Text / URL: the field value as-is
//! - Email: `mailto:addr?subject=..&body=..`
//! - Phone: `tel:number`
//! - SMS: `sms:number?body=..`
//! - WiFi: `WIFI:T:WPA;S:ssid;P:password;H:false;;`
//! - vCard 3.0: `BEGIN:VCARD` .. `END:VCARD`
//!
//! Formatting is total: missing fields become empty segments. Parsing is
//! best-effort and never fails either.
//!
//! # Usage
//! ```rust,ignore
//! use qr_studio::content::{format_content, parse_content};
//! use qr_studio::types::{field_map, ContentKind};
//!
//! let payload = format_content(ContentKind::Phone, &field_map([("phone", "+1234567890")]));
//! assert_eq!(payload, "tel:+1234567890");
//! let fields = parse_content(ContentKind::Phone, &payload);
//! ```

mod escape;
mod fields;
mod format;
mod parse;

pub use fields::{
    ContentFields, EmailFields, SmsFields, VCardFields, WifiFields, WifiSecurity,
};

use crate::types::{ContentKind, FieldMap};
use escape::strip_prefix_ignore_case;
use serde::{Deserialize, Serialize};

/// How delimiter characters inside WiFi and vCard values are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Escaping {
    /// Values are embedded verbatim, byte-compatible with existing generators
    #[default]
    None,
    /// Backslash-escape `; , : "` (WiFi) and `; ,` plus newlines (vCard)
    Standard,
}

/// Formats and parses payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentFormatter {
    escaping: Escaping,
}

impl ContentFormatter {
    /// Formatter that embeds values verbatim
    pub fn new() -> Self {
        Self::default()
    }

    /// Formatter that escapes WiFi / vCard delimiters
    pub fn with_escaping(escaping: Escaping) -> Self {
        Self { escaping }
    }

    pub fn escaping(&self) -> Escaping {
        self.escaping
    }

    /// Build the payload for `kind` from a loose field map
    pub fn format(&self, kind: ContentKind, fields: &FieldMap) -> String {
        self.format_fields(&ContentFields::from_map(kind, fields))
    }

    /// Build the payload from a typed field record
    pub fn format_fields(&self, fields: &ContentFields) -> String {
        format::write_payload(fields, self.escaping)
    }

    /// Recover the field map for `kind` from a payload
    pub fn parse(&self, kind: ContentKind, payload: &str) -> FieldMap {
        self.parse_fields(kind, payload).to_map()
    }

    /// Recover a typed field record for `kind` from a payload
    pub fn parse_fields(&self, kind: ContentKind, payload: &str) -> ContentFields {
        parse::read_payload(kind, payload, self.escaping)
    }
}

/// Guess the content kind of a payload from its scheme prefix
pub fn detect_kind(payload: &str) -> ContentKind {
    let trimmed = payload.trim_start();
    let has = |prefix: &str| strip_prefix_ignore_case(trimmed, prefix).is_some();

    if has("mailto:") {
        ContentKind::Email
    } else if has("tel:") {
        ContentKind::Phone
    } else if has("sms:") || has("smsto:") {
        ContentKind::Sms
    } else if has("WIFI:") {
        ContentKind::Wifi
    } else if has("BEGIN:VCARD") {
        ContentKind::VCard
    } else if has("http://") || has("https://") {
        ContentKind::Url
    } else {
        ContentKind::Text
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Format with verbatim values
pub fn format_content(kind: ContentKind, fields: &FieldMap) -> String {
    ContentFormatter::new().format(kind, fields)
}

/// Parse with verbatim values
pub fn parse_content(kind: ContentKind, payload: &str) -> FieldMap {
    ContentFormatter::new().parse(kind, payload)
}
