//! Shared types for QR Studio
//!
//! All data structures that cross module boundaries are defined here
//! for consistent serialization and FFI compatibility.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::StudioError;

// =============================================================================
// Content Kinds
// =============================================================================

/// Semantic category of the data encoded into a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentKind {
    Text,
    Url,
    Email,
    Phone,
    Sms,
    Wifi,
    VCard,
}

impl ContentKind {
    pub const ALL: [ContentKind; 7] = [
        ContentKind::Text,
        ContentKind::Url,
        ContentKind::Email,
        ContentKind::Phone,
        ContentKind::Sms,
        ContentKind::Wifi,
        ContentKind::VCard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "TEXT",
            ContentKind::Url => "URL",
            ContentKind::Email => "EMAIL",
            ContentKind::Phone => "PHONE",
            ContentKind::Sms => "SMS",
            ContentKind::Wifi => "WIFI",
            ContentKind::VCard => "VCARD",
        }
    }

    /// Human-readable label for pickers
    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Text => "Text",
            ContentKind::Url => "Website URL",
            ContentKind::Email => "Email",
            ContentKind::Phone => "Phone Number",
            ContentKind::Sms => "SMS Message",
            ContentKind::Wifi => "WiFi Network",
            ContentKind::VCard => "Contact Card",
        }
    }

    /// Field names this kind reads, in payload order
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            ContentKind::Text => &["text"],
            ContentKind::Url => &["url"],
            ContentKind::Email => &["email", "subject", "body"],
            ContentKind::Phone => &["phone"],
            ContentKind::Sms => &["phone", "message"],
            ContentKind::Wifi => &["ssid", "password", "security", "hidden"],
            ContentKind::VCard => &["name", "organization", "phone", "email", "website", "note"],
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        ContentKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == upper)
            .ok_or_else(|| StudioError::invalid_input(format!("Unknown content kind: {}", s)))
    }
}

// =============================================================================
// Field Maps
// =============================================================================

/// A loosely typed form value as collected by a UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    /// Text view of the value; flags render as `true` / `false`
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Flag(b) => b.to_string(),
        }
    }

    /// Flag view of the value; text is true only when it reads `true`
    pub fn as_flag(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().eq_ignore_ascii_case("true"),
            FieldValue::Flag(b) => *b,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

/// Field name to value mapping
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Read a text field, treating an absent key as empty
pub fn text_field(fields: &FieldMap, key: &str) -> String {
    fields.get(key).map(FieldValue::as_text).unwrap_or_default()
}

/// Read a presence-gated text field; a `false` flag counts as absent
pub fn truthy_text(fields: &FieldMap, key: &str) -> String {
    match fields.get(key) {
        Some(FieldValue::Flag(false)) | None => String::new(),
        Some(value) => value.as_text(),
    }
}

/// Read a flag field, treating an absent key as false
pub fn flag_field(fields: &FieldMap, key: &str) -> bool {
    fields.get(key).map(FieldValue::as_flag).unwrap_or(false)
}

/// Build a field map from `(key, value)` pairs
pub fn field_map<K, V, I>(pairs: I) -> FieldMap
where
    K: Into<String>,
    V: Into<FieldValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

// =============================================================================
// Identity
// =============================================================================

/// Opaque user identifier handed out by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// API Response Wrapper
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<StudioError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: StudioError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"code":"internal","message":"Serialization failed"}}"#.to_string()
        })
    }
}
