//! FFI layer for WebView and mobile hosts.
//!
//! This module provides C-compatible functions. All structured data crosses
//! the boundary as JSON strings using the same serde shapes as the Rust API.
//!
//! # Memory Management
//!
//! - Strings returned by `calcvault_*` functions are allocated by Rust
//! - Caller must free them with `calcvault_string_free`
//! - Calculator pointers must be freed with `calcvault_calculator_free`
//! - Workspace pointers must be freed with `calcvault_workspace_free`
//!
//! # Error Handling
//!
//! Functions return JSON with either:
//! - `{"ok": <result>}` on success
//! - `{"error": "<message>"}` on failure

use crate::format::format_result;
use crate::{AngleMode, Calculator, Input, Snapshot, Timestamp, Vault, Workspace};
use std::ffi::{c_char, CStr, CString};
use std::ptr;

/// Result wrapper for FFI responses.
#[derive(serde::Serialize)]
#[serde(untagged)]
enum FfiResult<T: serde::Serialize> {
    Ok { ok: T },
    Err { error: String },
}

impl<T: serde::Serialize> FfiResult<T> {
    fn ok(value: T) -> Self {
        FfiResult::Ok { ok: value }
    }

    fn err(message: impl Into<String>) -> Self {
        FfiResult::Err {
            error: message.into(),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization failed: {}"}}"#, e))
    }
}

/// Convert a Rust string to a C string pointer.
/// Caller must free with `calcvault_string_free`.
fn to_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        Err(_) => CString::new(r#"{"error":"string contained null bytes"}"#)
            .map(CString::into_raw)
            .unwrap_or(ptr::null_mut()),
    }
}

fn error_json(message: impl Into<String>) -> *mut c_char {
    to_c_string(FfiResult::<()>::err(message).to_json())
}

/// Convert a C string pointer to a Rust string.
/// Returns None if pointer is null or invalid UTF-8.
unsafe fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

unsafe fn parse_input(input_json: *const c_char) -> Result<Input, String> {
    let text = from_c_string(input_json).ok_or_else(|| "invalid input JSON".to_string())?;
    serde_json::from_str(&text).map_err(|e| format!("parse error: {}", e))
}

// ============================================================================
// Calculator
// ============================================================================

/// Create a calculator seeded from the operating system.
///
/// `degrees` selects the initial angle mode.
///
/// # Safety
/// Caller must free the returned pointer with `calcvault_calculator_free`.
#[no_mangle]
pub extern "C" fn calcvault_calculator_new(degrees: bool) -> *mut Calculator {
    let mode = if degrees {
        AngleMode::Degrees
    } else {
        AngleMode::Radians
    };
    Box::into_raw(Box::new(Calculator::new().with_angle_mode(mode)))
}

/// Create a calculator with a deterministic random source.
#[no_mangle]
pub extern "C" fn calcvault_calculator_new_seeded(seed: u64) -> *mut Calculator {
    Box::into_raw(Box::new(Calculator::seeded(seed)))
}

/// Free a calculator.
///
/// # Safety
/// - `calc` must be a valid pointer from `calcvault_calculator_new*`
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn calcvault_calculator_free(calc: *mut Calculator) {
    if !calc.is_null() {
        drop(Box::from_raw(calc));
    }
}

/// Apply one input to the calculator.
///
/// # Arguments
/// - `input_json`: JSON string of Input, e.g. `{"type":"digit","digit":7}`
///
/// # Returns
/// JSON string: `{"ok": [Event]}` or `{"error": "message"}`
///
/// # Safety
/// - `calc` must be a valid pointer from `calcvault_calculator_new*` or null
/// - `input_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `calcvault_string_free`
#[no_mangle]
pub unsafe extern "C" fn calcvault_calculator_apply(
    calc: *mut Calculator,
    input_json: *const c_char,
) -> *mut c_char {
    let calc = match calc.as_mut() {
        Some(c) => c,
        None => return error_json("null calculator pointer"),
    };

    match parse_input(input_json) {
        Ok(input) => to_c_string(FfiResult::ok(calc.apply(input)).to_json()),
        Err(e) => error_json(e),
    }
}

/// Get the full calculator state.
///
/// # Returns
/// JSON string: `{"ok": CalculatorState}` or `{"error": "message"}`
///
/// # Safety
/// - `calc` must be a valid pointer from `calcvault_calculator_new*` or null
/// - Caller must free the returned string with `calcvault_string_free`
#[no_mangle]
pub unsafe extern "C" fn calcvault_calculator_state(calc: *const Calculator) -> *mut c_char {
    match calc.as_ref() {
        Some(c) => to_c_string(FfiResult::ok(c.state()).to_json()),
        None => error_json("null calculator pointer"),
    }
}

// ============================================================================
// Workspace
// ============================================================================

/// Create an empty workspace.
///
/// # Arguments
/// - `fallback_password`: password always accepted by the vault, or null
///
/// # Safety
/// - `fallback_password` must be a valid null-terminated C string or null
/// - Caller must free the returned pointer with `calcvault_workspace_free`
#[no_mangle]
pub unsafe extern "C" fn calcvault_workspace_new(fallback_password: *const c_char) -> *mut Workspace {
    let vault = Vault::new().with_fallback_password(from_c_string(fallback_password));
    Box::into_raw(Box::new(Workspace::new(Calculator::new(), vault)))
}

/// Free a workspace.
///
/// # Safety
/// - `ws` must be a valid pointer from `calcvault_workspace_new`
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn calcvault_workspace_free(ws: *mut Workspace) {
    if !ws.is_null() {
        drop(Box::from_raw(ws));
    }
}

/// Apply an input through the workspace, recording history.
///
/// # Returns
/// JSON string: `{"ok": [Event]}` or `{"error": "message"}`
///
/// # Safety
/// - `ws` must be a valid pointer from `calcvault_workspace_new` or null
/// - `input_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `calcvault_string_free`
#[no_mangle]
pub unsafe extern "C" fn calcvault_workspace_press(
    ws: *mut Workspace,
    input_json: *const c_char,
    now: Timestamp,
) -> *mut c_char {
    let ws = match ws.as_mut() {
        Some(w) => w,
        None => return error_json("null workspace pointer"),
    };

    match parse_input(input_json) {
        Ok(input) => to_c_string(FfiResult::ok(ws.press(input, now)).to_json()),
        Err(e) => error_json(e),
    }
}

/// Export the persisted state as a snapshot.
///
/// # Returns
/// JSON string: `{"ok": Snapshot}` or `{"error": "message"}`
///
/// # Safety
/// - `ws` must be a valid pointer from `calcvault_workspace_new` or null
/// - Caller must free the returned string with `calcvault_string_free`
#[no_mangle]
pub unsafe extern "C" fn calcvault_workspace_export(ws: *const Workspace) -> *mut c_char {
    match ws.as_ref() {
        Some(w) => to_c_string(FfiResult::ok(w.export_state()).to_json()),
        None => error_json("null workspace pointer"),
    }
}

/// Import state from a snapshot.
///
/// # Returns
/// JSON string: `{"ok": null}` or `{"error": "message"}`
///
/// # Safety
/// - `ws` must be a valid pointer from `calcvault_workspace_new` or null
/// - `snapshot_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `calcvault_string_free`
#[no_mangle]
pub unsafe extern "C" fn calcvault_workspace_import(
    ws: *mut Workspace,
    snapshot_json: *const c_char,
) -> *mut c_char {
    let ws = match ws.as_mut() {
        Some(w) => w,
        None => return error_json("null workspace pointer"),
    };

    let snapshot_str = match from_c_string(snapshot_json) {
        Some(s) => s,
        None => return error_json("invalid snapshot JSON"),
    };

    match Snapshot::from_json(&snapshot_str).and_then(|s| ws.import_state(s)) {
        Ok(()) => to_c_string(FfiResult::ok(()).to_json()),
        Err(e) => error_json(e.to_string()),
    }
}

// ============================================================================
// Utility
// ============================================================================

/// Format a number the way the calculator displays it.
///
/// # Safety
/// Caller must free the returned string with `calcvault_string_free`.
#[no_mangle]
pub extern "C" fn calcvault_format_result(value: f64) -> *mut c_char {
    to_c_string(format_result(value))
}

/// Free a string allocated by the engine.
///
/// # Safety
/// - `s` must be a valid pointer from a `calcvault_*` function
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn calcvault_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Get the engine version.
///
/// # Returns
/// Static string pointer (do not free)
#[no_mangle]
pub extern "C" fn calcvault_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

/// Get the snapshot format version.
#[no_mangle]
pub extern "C" fn calcvault_snapshot_format_version() -> u32 {
    crate::SNAPSHOT_FORMAT_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn take(s: *mut c_char) -> String {
        let text = CStr::from_ptr(s).to_str().unwrap().to_string();
        calcvault_string_free(s);
        text
    }

    unsafe fn apply(calc: *mut Calculator, json: &str) -> String {
        let input = CString::new(json).unwrap();
        take(calcvault_calculator_apply(calc, input.as_ptr()))
    }

    #[test]
    fn ffi_calculator_lifecycle() {
        let calc = calcvault_calculator_new(false);
        assert!(!calc.is_null());
        unsafe { calcvault_calculator_free(calc) };
    }

    #[test]
    fn ffi_calculator_apply() {
        unsafe {
            let calc = calcvault_calculator_new_seeded(3);

            apply(calc, r#"{"type":"digit","digit":6}"#);
            apply(calc, r#"{"type":"operator","operator":"mul"}"#);
            apply(calc, r#"{"type":"digit","digit":7}"#);
            let result = apply(calc, r#"{"type":"calculate"}"#);

            assert!(result.starts_with(r#"{"ok":["#));
            assert!(result.contains(r#"{"type":"calculationRecorded","calculation":"6 × 7 = 42"}"#));
            assert!(result.contains(r#"{"type":"display","text":"42"}"#));

            let state = take(calcvault_calculator_state(calc));
            assert!(state.contains(r#""currentOperand":"42""#));

            calcvault_calculator_free(calc);
        }
    }

    #[test]
    fn ffi_error_handling() {
        unsafe {
            let calc = calcvault_calculator_new_seeded(3);

            let result = apply(calc, r#"{"type":"launch"}"#);
            assert!(result.contains("\"error\""));

            let result = take(calcvault_calculator_apply(ptr::null_mut(), ptr::null()));
            assert_eq!(result, r#"{"error":"null calculator pointer"}"#);

            let result = take(calcvault_calculator_apply(calc, ptr::null()));
            assert_eq!(result, r#"{"error":"invalid input JSON"}"#);

            let result = take(calcvault_calculator_state(ptr::null()));
            assert!(result.contains("\"error\""));

            calcvault_calculator_free(calc);
        }
    }

    #[test]
    fn ffi_workspace_export_import() {
        unsafe {
            let fallback = CString::new("master").unwrap();
            let ws = calcvault_workspace_new(fallback.as_ptr());

            for json in [
                r#"{"type":"digit","digit":2}"#,
                r#"{"type":"operator","operator":"add"}"#,
                r#"{"type":"digit","digit":2}"#,
                r#"{"type":"calculate"}"#,
            ] {
                let input = CString::new(json).unwrap();
                take(calcvault_workspace_press(ws, input.as_ptr(), 1000));
            }

            let exported = take(calcvault_workspace_export(ws));
            assert!(exported.contains("2 + 2 = 4"));

            let other = calcvault_workspace_new(ptr::null());
            let snapshot: serde_json::Value = serde_json::from_str(&exported).unwrap();
            let snapshot_json = CString::new(snapshot["ok"].to_string()).unwrap();
            let result = take(calcvault_workspace_import(other, snapshot_json.as_ptr()));
            assert_eq!(result, r#"{"ok":null}"#);

            let bad = CString::new(r#"{"formatVersion":99}"#).unwrap();
            let result = take(calcvault_workspace_import(other, bad.as_ptr()));
            assert!(result.contains("\"error\""));

            calcvault_workspace_free(ws);
            calcvault_workspace_free(other);
        }
    }

    #[test]
    fn ffi_format_result() {
        unsafe {
            assert_eq!(take(calcvault_format_result(1.5e11)), "1.500000e+11");
            assert_eq!(take(calcvault_format_result(5e-11)), "0");
        }
    }

    #[test]
    fn ffi_version() {
        unsafe {
            let version = CStr::from_ptr(calcvault_version()).to_str().unwrap();
            assert_eq!(version, env!("CARGO_PKG_VERSION"));
        }
        assert_eq!(calcvault_snapshot_format_version(), 1);
    }
}
