//! Typed per-kind field records
//!
//! UIs hand us a loose `FieldMap`; formatting works on these records so
//! every field access is checked at compile time. Conversion in both
//! directions is lossless for the fields a kind knows about.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{flag_field, text_field, truthy_text, ContentKind, FieldMap, FieldValue};

/// Email composition fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailFields {
    pub email: String,
    pub subject: String,
    pub body: String,
}

/// SMS composition fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsFields {
    pub phone: String,
    pub message: String,
}

/// WiFi authentication type
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WifiSecurity {
    #[default]
    Wpa,
    Wep,
    NoPass,
    /// Any other value a scanner might understand (e.g. `WPA2-EAP`), kept verbatim
    Other(String),
}

impl WifiSecurity {
    pub fn as_str(&self) -> &str {
        match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::NoPass => "nopass",
            WifiSecurity::Other(s) => s,
        }
    }

    /// Parse a security label; empty means "not set"
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" => None,
            "WPA" => Some(WifiSecurity::Wpa),
            "WEP" => Some(WifiSecurity::Wep),
            "nopass" => Some(WifiSecurity::NoPass),
            other => Some(WifiSecurity::Other(other.to_string())),
        }
    }
}

impl fmt::Display for WifiSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for WifiSecurity {
    fn from(s: String) -> Self {
        WifiSecurity::parse(&s).unwrap_or_default()
    }
}

impl From<WifiSecurity> for String {
    fn from(s: WifiSecurity) -> Self {
        s.as_str().to_string()
    }
}

/// WiFi network credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiFields {
    pub ssid: String,
    pub password: String,
    /// `None` renders as WPA
    pub security: Option<WifiSecurity>,
    pub hidden: bool,
}

impl WifiFields {
    pub fn effective_security(&self) -> WifiSecurity {
        self.security.clone().unwrap_or_default()
    }
}

/// Contact card fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VCardFields {
    pub name: String,
    pub organization: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub note: String,
}

/// Field record for one content kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum ContentFields {
    Text {
        #[serde(default)]
        text: String,
    },
    Url {
        #[serde(default)]
        url: String,
    },
    Email(EmailFields),
    Phone {
        #[serde(default)]
        phone: String,
    },
    Sms(SmsFields),
    Wifi(WifiFields),
    VCard(VCardFields),
}

impl ContentFields {
    /// Empty record for a kind
    pub fn empty(kind: ContentKind) -> Self {
        Self::from_map(kind, &FieldMap::new())
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentFields::Text { .. } => ContentKind::Text,
            ContentFields::Url { .. } => ContentKind::Url,
            ContentFields::Email(_) => ContentKind::Email,
            ContentFields::Phone { .. } => ContentKind::Phone,
            ContentFields::Sms(_) => ContentKind::Sms,
            ContentFields::Wifi(_) => ContentKind::Wifi,
            ContentFields::VCard(_) => ContentKind::VCard,
        }
    }

    /// Pick the fields `kind` reads out of a loose map; unknown keys are ignored
    pub fn from_map(kind: ContentKind, fields: &FieldMap) -> Self {
        let text = |key: &str| text_field(fields, key);
        // Optional parts are emitted only for truthy values
        let optional = |key: &str| truthy_text(fields, key);

        match kind {
            ContentKind::Text => ContentFields::Text { text: text("text") },
            ContentKind::Url => ContentFields::Url { url: text("url") },
            ContentKind::Email => ContentFields::Email(EmailFields {
                email: text("email"),
                subject: optional("subject"),
                body: optional("body"),
            }),
            ContentKind::Phone => ContentFields::Phone { phone: text("phone") },
            ContentKind::Sms => ContentFields::Sms(SmsFields {
                phone: text("phone"),
                message: optional("message"),
            }),
            ContentKind::Wifi => ContentFields::Wifi(WifiFields {
                ssid: text("ssid"),
                password: text("password"),
                security: WifiSecurity::parse(&optional("security")),
                hidden: flag_field(fields, "hidden"),
            }),
            ContentKind::VCard => ContentFields::VCard(VCardFields {
                name: text("name"),
                organization: optional("organization"),
                phone: optional("phone"),
                email: optional("email"),
                website: optional("website"),
                note: optional("note"),
            }),
        }
    }

    /// Loose map with every field of the kind; unset fields are `""` / `false`
    pub fn to_map(&self) -> FieldMap {
        let mut map = FieldMap::new();
        let mut put = |key: &str, value: FieldValue| {
            map.insert(key.to_string(), value);
        };

        match self {
            ContentFields::Text { text } => put("text", text.as_str().into()),
            ContentFields::Url { url } => put("url", url.as_str().into()),
            ContentFields::Email(f) => {
                put("email", f.email.as_str().into());
                put("subject", f.subject.as_str().into());
                put("body", f.body.as_str().into());
            }
            ContentFields::Phone { phone } => put("phone", phone.as_str().into()),
            ContentFields::Sms(f) => {
                put("phone", f.phone.as_str().into());
                put("message", f.message.as_str().into());
            }
            ContentFields::Wifi(f) => {
                put("ssid", f.ssid.as_str().into());
                put("password", f.password.as_str().into());
                let security = f.security.as_ref().map(WifiSecurity::as_str).unwrap_or("");
                put("security", security.into());
                put("hidden", f.hidden.into());
            }
            ContentFields::VCard(f) => {
                put("name", f.name.as_str().into());
                put("organization", f.organization.as_str().into());
                put("phone", f.phone.as_str().into());
                put("email", f.email.as_str().into());
                put("website", f.website.as_str().into());
                put("note", f.note.as_str().into());
            }
        }

        map
    }
}
