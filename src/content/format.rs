//! Payload builders, one per content kind

use super::escape::{backslash_escape, percent_encode, vcard_escape, WIFI_SPECIAL};
use super::fields::{ContentFields, EmailFields, SmsFields, VCardFields, WifiFields};
use super::Escaping;

pub(crate) fn write_payload(fields: &ContentFields, escaping: Escaping) -> String {
    match fields {
        ContentFields::Text { text } => text.clone(),
        ContentFields::Url { url } => url.clone(),
        ContentFields::Email(f) => email(f),
        ContentFields::Phone { phone } => format!("tel:{}", phone),
        ContentFields::Sms(f) => sms(f),
        ContentFields::Wifi(f) => wifi(f, escaping),
        ContentFields::VCard(f) => vcard(f, escaping),
    }
}

fn email(f: &EmailFields) -> String {
    let mut params = Vec::new();

    if !f.subject.is_empty() {
        params.push(format!("subject={}", percent_encode(&f.subject)));
    }

    if !f.body.is_empty() {
        params.push(format!("body={}", percent_encode(&f.body)));
    }

    let mut uri = format!("mailto:{}", f.email);
    if !params.is_empty() {
        uri = format!("{}?{}", uri, params.join("&"));
    }
    uri
}

fn sms(f: &SmsFields) -> String {
    if f.message.is_empty() {
        format!("sms:{}", f.phone)
    } else {
        format!("sms:{}?body={}", f.phone, percent_encode(&f.message))
    }
}

fn wifi(f: &WifiFields, escaping: Escaping) -> String {
    let security = f.effective_security();
    let value = |raw: &str| match escaping {
        Escaping::None => raw.to_string(),
        Escaping::Standard => backslash_escape(raw, WIFI_SPECIAL),
    };

    format!(
        "WIFI:T:{};S:{};P:{};H:{};;",
        value(security.as_str()),
        value(&f.ssid),
        value(&f.password),
        f.hidden
    )
}

fn vcard(f: &VCardFields, escaping: Escaping) -> String {
    let value = |raw: &str| match escaping {
        Escaping::None => raw.to_string(),
        Escaping::Standard => vcard_escape(raw),
    };

    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("FN:{}", value(&f.name)),
    ];

    let optional = [
        ("ORG", &f.organization),
        ("TEL", &f.phone),
        ("EMAIL", &f.email),
        ("URL", &f.website),
        ("NOTE", &f.note),
    ];
    for (property, field) in optional {
        if !field.is_empty() {
            lines.push(format!("{}:{}", property, value(field)));
        }
    }

    lines.push("END:VCARD".to_string());
    lines.join("\n")
}
