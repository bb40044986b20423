//! FFI Layer for QR Studio
//!
//! All C-ABI exports are defined here. Every function follows one pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `qrstudio_free_string`)
//!
//! Error handling: All functions return JSON with a `success` field.
//! On error, `success: false` and the `error` object is populated.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use serde::{Deserialize, Serialize};

use crate::content::{detect_kind, ContentFormatter, Escaping};
use crate::error::StudioError;
use crate::qr::{check_capacity, ErrorCorrectionLevel};
use crate::style::{resolve_style, PartialStyle};
use crate::types::{ApiResponse, ContentKind, FieldMap};

// =============================================================================
// Memory Management
// =============================================================================

/// Free a string returned by any qrstudio_* function
///
/// # Safety
/// The pointer must have been returned by a qrstudio_* function
#[unsafe(no_mangle)]
pub extern "C" fn qrstudio_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(s);
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Convert C string to Rust string, returning error JSON if invalid
fn parse_input<'a>(input: *const c_char) -> Result<&'a str, *mut c_char> {
    if input.is_null() {
        return Err(error_response(StudioError::invalid_input("Null input pointer")));
    }

    let c_str = unsafe { CStr::from_ptr(input) };
    c_str
        .to_str()
        .map_err(|_| error_response(StudioError::invalid_input("Invalid UTF-8 string")))
}

/// Parse the JSON request body
fn parse_request<T: for<'de> Deserialize<'de>>(input: *const c_char) -> Result<T, *mut c_char> {
    let json_str = parse_input(input)?;
    serde_json::from_str(json_str)
        .map_err(|e| error_response(StudioError::parse_error(format!("Invalid JSON: {}", e))))
}

/// Create a success response JSON string
fn success_response<T: Serialize>(data: T) -> *mut c_char {
    let response = ApiResponse::ok(data);
    string_to_ptr(response.to_json())
}

/// Create an error response JSON string
fn error_response(error: StudioError) -> *mut c_char {
    let response: ApiResponse<()> = ApiResponse::err(error);
    string_to_ptr(response.to_json())
}

/// Convert Rust string to C string pointer
fn string_to_ptr(s: String) -> *mut c_char {
    const FALLBACK: &[u8] =
        b"{\"success\":false,\"error\":{\"code\":\"internal\",\"message\":\"String conversion failed\"}}\0";

    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => match CStr::from_bytes_with_nul(FALLBACK) {
            Ok(fallback) => fallback.to_owned().into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
    }
}

// =============================================================================
// Content Operations
// =============================================================================

#[derive(Deserialize)]
struct FormatRequest {
    kind: ContentKind,
    #[serde(default)]
    fields: FieldMap,
    #[serde(default)]
    escaping: Escaping,
}

#[derive(Serialize)]
struct FormatResponse {
    kind: ContentKind,
    payload: String,
}

/// Build the encodable payload for a content kind
///
/// # Input
/// ```json
/// { "kind": "WIFI", "fields": { "ssid": "Net", "password": "pw" }, "escaping": "none" }
/// ```
///
/// # Output
/// ```json
/// { "success": true, "data": { "kind": "WIFI", "payload": "WIFI:T:WPA;S:Net;P:pw;H:false;;" } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn qrstudio_format_content(input: *const c_char) -> *mut c_char {
    let request: FormatRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    let payload =
        ContentFormatter::with_escaping(request.escaping).format(request.kind, &request.fields);
    success_response(FormatResponse {
        kind: request.kind,
        payload,
    })
}

#[derive(Deserialize)]
struct ParseRequest {
    /// Detected from the payload when absent
    kind: Option<ContentKind>,
    payload: String,
    #[serde(default)]
    escaping: Escaping,
}

#[derive(Serialize)]
struct ParseResponse {
    kind: ContentKind,
    fields: FieldMap,
}

/// Recover fields from a payload
///
/// # Input
/// ```json
/// { "payload": "tel:+15551234" }
/// ```
///
/// # Output
/// ```json
/// { "success": true, "data": { "kind": "PHONE", "fields": { "phone": "+15551234" } } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn qrstudio_parse_content(input: *const c_char) -> *mut c_char {
    let request: ParseRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    let kind = request.kind.unwrap_or_else(|| detect_kind(&request.payload));
    let fields = ContentFormatter::with_escaping(request.escaping).parse(kind, &request.payload);
    success_response(ParseResponse { kind, fields })
}

#[derive(Deserialize)]
struct DetectRequest {
    payload: String,
}

/// Guess the content kind of a payload
///
/// # Input
/// ```json
/// { "payload": "mailto:a@b.c" }
/// ```
///
/// # Output
/// ```json
/// { "success": true, "data": "EMAIL" }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn qrstudio_detect_kind(input: *const c_char) -> *mut c_char {
    let request: DetectRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    success_response(detect_kind(&request.payload))
}

#[derive(Serialize)]
struct KindInfo {
    kind: ContentKind,
    label: &'static str,
    fields: &'static [&'static str],
}

/// List supported content kinds with their field names
///
/// # Output
/// ```json
/// { "success": true, "data": [ { "kind": "TEXT", "label": "Text", "fields": ["text"] }, ... ] }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn qrstudio_content_kinds() -> *mut c_char {
    let kinds: Vec<KindInfo> = ContentKind::ALL
        .iter()
        .map(|kind| KindInfo {
            kind: *kind,
            label: kind.label(),
            fields: kind.field_names(),
        })
        .collect();

    success_response(kinds)
}

// =============================================================================
// Style Operations
// =============================================================================

/// Fill a sparse style with defaults and clamp it into bounds
///
/// # Input
/// ```json
/// { "size": 1000, "foregroundColor": "#F00" }
/// ```
///
/// # Output
/// ```json
/// { "success": true, "data": { "foregroundColor": "#ff0000", "size": 512, ... } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn qrstudio_resolve_style(input: *const c_char) -> *mut c_char {
    let partial: PartialStyle = match parse_request(input) {
        Ok(p) => p,
        Err(ptr) => return ptr,
    };

    success_response(resolve_style(&partial))
}

#[derive(Deserialize)]
struct CapacityRequest {
    payload: String,
    #[serde(default)]
    level: ErrorCorrectionLevel,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CapacityResponse {
    bytes: usize,
    max_bytes: usize,
}

/// Check that a payload fits one symbol at the given error correction level
///
/// # Input
/// ```json
/// { "payload": "https://example.com", "level": "H" }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn qrstudio_check_capacity(input: *const c_char) -> *mut c_char {
    let request: CapacityRequest = match parse_request(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };

    match check_capacity(&request.payload, request.level) {
        Ok(()) => success_response(CapacityResponse {
            bytes: request.payload.len(),
            max_bytes: request.level.max_bytes(),
        }),
        Err(e) => error_response(e.into()),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: extern "C" fn(*const c_char) -> *mut c_char, input: &str) -> serde_json::Value {
        let input = CString::new(input).unwrap();
        let ptr = f(input.as_ptr());
        let output = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        qrstudio_free_string(ptr);
        serde_json::from_str(&output).unwrap()
    }

    #[test]
    fn test_format_content() {
        let value = call(
            qrstudio_format_content,
            r#"{"kind":"WIFI","fields":{"ssid":"Net","password":"pw"}}"#,
        );
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["payload"], "WIFI:T:WPA;S:Net;P:pw;H:false;;");
    }

    #[test]
    fn test_parse_content_detects_kind() {
        let value = call(qrstudio_parse_content, r#"{"payload":"tel:+15551234"}"#);
        assert_eq!(value["data"]["kind"], "PHONE");
        assert_eq!(value["data"]["fields"]["phone"], "+15551234");
    }

    #[test]
    fn test_detect_kind() {
        let value = call(qrstudio_detect_kind, r#"{"payload":"BEGIN:VCARD\nEND:VCARD"}"#);
        assert_eq!(value["data"], "VCARD");
    }

    #[test]
    fn test_resolve_style() {
        let value = call(qrstudio_resolve_style, r##"{"size":1000,"foregroundColor":"#F00"}"##);
        assert_eq!(value["data"]["size"], 512);
        assert_eq!(value["data"]["foregroundColor"], "#ff0000");
        assert_eq!(value["data"]["margin"], 4);
    }

    #[test]
    fn test_check_capacity() {
        let ok = call(qrstudio_check_capacity, r#"{"payload":"hello","level":"H"}"#);
        assert_eq!(ok["data"]["maxBytes"], 1273);

        let payload = "x".repeat(3000);
        let err = call(qrstudio_check_capacity, &format!(r#"{{"payload":"{}"}}"#, payload));
        assert_eq!(err["success"], false);
        assert_eq!(err["error"]["code"], "payload_too_large");
    }

    #[test]
    fn test_content_kinds() {
        let ptr = qrstudio_content_kinds();
        let output = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        qrstudio_free_string(ptr);

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["data"].as_array().unwrap().len(), 7);
        assert_eq!(value["data"][4]["fields"][1], "message");
    }

    #[test]
    fn test_invalid_input() {
        let value = call(qrstudio_format_content, "not json");
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "parse_error");

        let ptr = qrstudio_detect_kind(std::ptr::null());
        let output = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        qrstudio_free_string(ptr);
        assert!(output.contains("invalid_input"));
    }
}
