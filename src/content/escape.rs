//! Escaping helpers shared by the formatter and parser

use std::borrow::Cow;

/// Characters escaped inside WiFi `T`/`S`/`P` values
pub(crate) const WIFI_SPECIAL: &[char] = &['\\', ';', ',', ':', '"'];

/// Characters escaped inside vCard text values (newline handled separately)
pub(crate) const VCARD_SPECIAL: &[char] = &['\\', ',', ';'];

/// Percent-encode a query value; only RFC 3986 unreserved characters pass through
pub(crate) fn percent_encode(value: &str) -> Cow<'_, str> {
    // Also escapes `! * ' ( )`, which browser encodeURIComponent leaves bare
    urlencoding::encode(value)
}

/// Percent-decode a query value, keeping the raw text when it is not valid UTF-8
pub(crate) fn percent_decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// Backslash-escape every char in `special`
pub(crate) fn backslash_escape(value: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// vCard text escaping: `\ , ;` get a backslash, newlines become `\n`
pub(crate) fn vcard_escape(value: &str) -> String {
    let normalized = value.replace("\r\n", "\n");
    backslash_escape(&normalized, VCARD_SPECIAL).replace('\n', "\\n")
}

/// Undo backslash escaping; `\n` / `\N` become a newline when `newlines` is set
pub(crate) fn backslash_unescape(value: &str, newlines: bool) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') if newlines => out.push('\n'),
            Some(next) => out.push(next),
            // Dangling backslash at the end
            None => out.push('\\'),
        }
    }
    out
}

/// Split on `delim`, ignoring delimiters preceded by a backslash when `escaped` is set
pub(crate) fn split_fields(value: &str, delim: char, escaped: bool) -> Vec<&str> {
    if !escaped {
        return value.split(delim).collect();
    }

    let mut parts = Vec::new();
    let mut start = 0;
    let mut after_backslash = false;
    for (i, c) in value.char_indices() {
        if after_backslash {
            after_backslash = false;
            continue;
        }
        if c == '\\' {
            after_backslash = true;
        } else if c == delim {
            parts.push(&value[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&value[start..]);
    parts
}

/// Strip an ASCII prefix ignoring case
pub(crate) fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}

/// Split a `k=v&k=v` query into pairs; values stay encoded
pub(crate) fn query_pairs(query: &str) -> Vec<(&str, &str)> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_encode_space() {
        assert_eq!(percent_encode("Hi there"), "Hi%20there");
        assert_eq!(percent_encode("a&b=c"), "a%26b%3Dc");
        assert_eq!(percent_encode("plain-text_1.0~"), "plain-text_1.0~");
    }

    #[test]
    fn test_percent_decode_tolerates_garbage() {
        assert_eq!(percent_decode("Hi%20there"), "Hi there");
        assert_eq!(percent_decode("caf%C3%A9"), "café");
        assert_eq!(percent_decode("%FF%FE"), "%FF%FE");
    }

    #[test]
    fn test_backslash_roundtrip() {
        let raw = r#"a;b,c:d\e"f"#;
        let escaped = backslash_escape(raw, WIFI_SPECIAL);
        assert_eq!(escaped, r#"a\;b\,c\:d\\e\"f"#);
        assert_eq!(backslash_unescape(&escaped, false), raw);
    }

    #[test]
    fn test_vcard_escape_newlines() {
        let escaped = vcard_escape("line one,\r\nline two");
        assert_eq!(escaped, "line one\\,\\nline two");
        assert_eq!(backslash_unescape(&escaped, true), "line one,\nline two");
    }

    #[test]
    fn test_split_fields_respects_escapes() {
        assert_eq!(split_fields(r"S:a\;b;P:c", ';', true), vec![r"S:a\;b", "P:c"]);
        assert_eq!(split_fields(r"S:a\;b;P:c", ';', false), vec![r"S:a\", "b", "P:c"]);
    }

    #[test]
    fn test_strip_prefix_ignore_case() {
        assert_eq!(strip_prefix_ignore_case("MAILTO:x@y", "mailto:"), Some("x@y"));
        assert_eq!(strip_prefix_ignore_case("mail", "mailto:"), None);
        assert_eq!(strip_prefix_ignore_case("é", "mailto:"), None);
    }

    #[test]
    fn test_query_pairs() {
        assert_eq!(
            query_pairs("subject=Hi&body=&flag"),
            vec![("subject", "Hi"), ("body", ""), ("flag", "")]
        );
    }
}
