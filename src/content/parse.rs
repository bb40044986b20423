//! Best-effort payload parsers
//!
//! These never fail. Anything that does not match the expected shape
//! leaves the corresponding field empty.

use super::escape::{
    backslash_unescape, percent_decode, query_pairs, split_fields, strip_prefix_ignore_case,
};
use super::fields::{ContentFields, EmailFields, SmsFields, VCardFields, WifiFields, WifiSecurity};
use super::Escaping;
use crate::types::ContentKind;

pub(crate) fn read_payload(kind: ContentKind, payload: &str, escaping: Escaping) -> ContentFields {
    match kind {
        ContentKind::Text => ContentFields::Text {
            text: payload.to_string(),
        },
        ContentKind::Url => ContentFields::Url {
            url: payload.to_string(),
        },
        ContentKind::Email => ContentFields::Email(email(payload)),
        ContentKind::Phone => ContentFields::Phone {
            phone: strip_prefix_ignore_case(payload, "tel:")
                .unwrap_or(payload)
                .to_string(),
        },
        ContentKind::Sms => ContentFields::Sms(sms(payload)),
        ContentKind::Wifi => ContentFields::Wifi(wifi(payload, escaping)),
        ContentKind::VCard => ContentFields::VCard(vcard(payload, escaping)),
    }
}

fn email(payload: &str) -> EmailFields {
    let mut fields = EmailFields::default();
    let Some(rest) = strip_prefix_ignore_case(payload, "mailto:") else {
        return fields;
    };

    let (address, query) = rest.split_once('?').unwrap_or((rest, ""));
    fields.email = address.to_string();

    for (key, value) in query_pairs(query) {
        if key.eq_ignore_ascii_case("subject") && fields.subject.is_empty() {
            fields.subject = percent_decode(value);
        } else if key.eq_ignore_ascii_case("body") && fields.body.is_empty() {
            fields.body = percent_decode(value);
        }
    }

    fields
}

fn sms(payload: &str) -> SmsFields {
    let mut fields = SmsFields::default();

    // SMSTO:<number>:<message> as written by some generators
    if let Some(rest) = strip_prefix_ignore_case(payload, "smsto:") {
        let (phone, message) = rest.split_once(':').unwrap_or((rest, ""));
        fields.phone = phone.to_string();
        fields.message = message.to_string();
        return fields;
    }

    let Some(rest) = strip_prefix_ignore_case(payload, "sms:") else {
        return fields;
    };

    let (phone, query) = rest.split_once('?').unwrap_or((rest, ""));
    fields.phone = phone.to_string();

    if let Some((_, body)) = query_pairs(query)
        .into_iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("body"))
    {
        fields.message = percent_decode(body);
    }

    fields
}

fn wifi(payload: &str, escaping: Escaping) -> WifiFields {
    let escaped = escaping == Escaping::Standard;
    let body = strip_prefix_ignore_case(payload, "WIFI:").unwrap_or(payload);
    let value = |raw: &str| {
        if escaped {
            backslash_unescape(raw, false)
        } else {
            raw.to_string()
        }
    };

    let mut security = None;
    let mut ssid = None;
    let mut password = None;
    let mut hidden = None;

    for segment in split_fields(body, ';', escaped) {
        let Some((key, raw)) = segment.split_once(':') else {
            continue;
        };
        let slot = match key.trim() {
            "T" | "t" => &mut security,
            "S" | "s" => &mut ssid,
            "P" | "p" => &mut password,
            "H" | "h" => &mut hidden,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value(raw));
        }
    }

    WifiFields {
        ssid: ssid.unwrap_or_default(),
        password: password.unwrap_or_default(),
        security: security.as_deref().and_then(WifiSecurity::parse),
        hidden: hidden.as_deref() == Some("true"),
    }
}

fn vcard(payload: &str, escaping: Escaping) -> VCardFields {
    let mut fields = VCardFields::default();

    for line in unfold_lines(payload) {
        let Some((name, raw)) = line.split_once(':') else {
            continue;
        };
        // TEL;TYPE=CELL:... carries parameters after the property name
        let property = name.split(';').next().unwrap_or("").trim().to_ascii_uppercase();
        let value = match escaping {
            Escaping::None => raw.to_string(),
            Escaping::Standard => backslash_unescape(raw, true),
        };

        match property.as_str() {
            "FN" => fields.name = value,
            "ORG" => fields.organization = value,
            "TEL" => fields.phone = value,
            "EMAIL" => fields.email = value,
            "URL" => fields.website = value,
            "NOTE" => fields.note = value,
            _ => {}
        }
    }

    fields
}

/// Join folded continuation lines (leading space or tab) onto the previous line
fn unfold_lines(payload: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for line in payload.lines() {
        match (line.strip_prefix([' ', '\t']), lines.last_mut()) {
            (Some(continuation), Some(previous)) => previous.push_str(continuation),
            _ => lines.push(line.to_string()),
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfold_lines() {
        let lines = unfold_lines("NOTE:first\r\n  second\nFN:x");
        assert_eq!(lines, vec!["NOTE:first second", "FN:x"]);
    }

    #[test]
    fn test_wifi_segments_any_order() {
        let wifi = wifi("WIFI:S:Net;H:true;T:WEP;P:pw;;", Escaping::None);
        assert_eq!(wifi.ssid, "Net");
        assert_eq!(wifi.password, "pw");
        assert_eq!(wifi.security, Some(WifiSecurity::Wep));
        assert!(wifi.hidden);
    }

    #[test]
    fn test_wifi_first_segment_wins() {
        let wifi = wifi("WIFI:S:one;S:two;;", Escaping::None);
        assert_eq!(wifi.ssid, "one");
    }

    #[test]
    fn test_email_without_scheme_is_empty() {
        assert_eq!(email("someone@example.com"), EmailFields::default());
    }

    #[test]
    fn test_sms_smsto_form() {
        let sms = sms("SMSTO:+15550100:Running late");
        assert_eq!(sms.phone, "+15550100");
        assert_eq!(sms.message, "Running late");
    }

    #[test]
    fn test_vcard_parameters_and_case() {
        let card = vcard(
            "BEGIN:VCARD\r\nVERSION:3.0\r\nfn:Jane\r\nTEL;TYPE=CELL:+1555\r\nEND:VCARD",
            Escaping::None,
        );
        assert_eq!(card.name, "Jane");
        assert_eq!(card.phone, "+1555");
    }
}
