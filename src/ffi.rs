//! FFI bindings for Synheart Rhythm
//!
//! This module provides C-compatible functions so a host UI layer can record a
//! session and fetch its report. All functions use C strings (null-terminated)
//! and return allocated memory that must be freed by the caller using
//! `rhythm_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error::RhythmError;
use crate::pipeline::analyze_session_json;
use crate::session::SessionHandle;
use crate::types::KeystrokeKind;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Map a fallible call to the 0 / -1 status convention
fn status(result: Result<(), RhythmError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Analyze a recorded session log JSON and return report JSON.
///
/// # Safety
/// - `log_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `rhythm_free_string`.
/// - Returns NULL on error; call `rhythm_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn rhythm_analyze_log(log_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(log_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match analyze_session_json(json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Session Lifecycle API
// ============================================================================

/// Opaque handle to a recording session
pub struct RhythmSessionHandle {
    session: SessionHandle,
}

/// Begin a monitoring session timestamped by the system clock.
///
/// # Safety
/// - Returns a pointer to a newly allocated session.
/// - Must be freed with `rhythm_session_free`.
#[no_mangle]
pub unsafe extern "C" fn rhythm_session_begin() -> *mut RhythmSessionHandle {
    clear_last_error();
    let handle = Box::new(RhythmSessionHandle {
        session: SessionHandle::begin(),
    });
    Box::into_raw(handle)
}

/// Free a session.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `rhythm_session_begin`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn rhythm_session_free(handle: *mut RhythmSessionHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Record a keystroke event timestamped now.
///
/// `kind` is one of `type`, `backspace`, `delete`, `composition`,
/// `composition_delete`, `composition_confirm`. `ch` may be NULL for deletions.
///
/// # Safety
/// - `handle` must be a valid session pointer.
/// - `kind` must be a valid null-terminated C string; `ch` must be one or NULL.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn rhythm_session_record(
    handle: *mut RhythmSessionHandle,
    kind: *const c_char,
    ch: *const c_char,
    is_ime: bool,
) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null session handle");
        return -1;
    }
    let handle = &mut *handle;

    let kind = match cstr_to_string(kind) {
        Some(s) => s,
        None => {
            set_last_error("Invalid kind string pointer");
            return -1;
        }
    };
    let ch = cstr_to_string(ch).unwrap_or_default();

    status(
        kind.parse::<KeystrokeKind>()
            .and_then(|kind| handle.session.record_event(kind, &ch, is_ime)),
    )
}

/// Feed the current IME composition buffer.
///
/// # Safety
/// - `handle` must be a valid session pointer.
/// - `buffer` must be a valid null-terminated C string.
/// - Returns the number of events recorded, or -1 on error.
#[no_mangle]
pub unsafe extern "C" fn rhythm_session_update_composition(
    handle: *mut RhythmSessionHandle,
    buffer: *const c_char,
) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null session handle");
        return -1;
    }
    let handle = &mut *handle;

    let buffer = match cstr_to_string(buffer) {
        Some(s) => s,
        None => {
            set_last_error("Invalid buffer string pointer");
            return -1;
        }
    };

    match handle.session.update_composition(&buffer) {
        Ok(count) => count as i32,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Commit the IME composition.
///
/// # Safety
/// - `handle` must be a valid session pointer.
/// - `committed` must be a valid null-terminated C string.
/// - Returns the number of events recorded, or -1 on error.
#[no_mangle]
pub unsafe extern "C" fn rhythm_session_commit_composition(
    handle: *mut RhythmSessionHandle,
    committed: *const c_char,
) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null session handle");
        return -1;
    }
    let handle = &mut *handle;

    let committed = match cstr_to_string(committed) {
        Some(s) => s,
        None => {
            set_last_error("Invalid committed string pointer");
            return -1;
        }
    };

    match handle.session.commit_composition(&committed) {
        Ok(count) => count as i32,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Finish the session and return report JSON.
///
/// On insufficient input the session stays open and NULL is returned.
///
/// # Safety
/// - `handle` must be a valid session pointer.
/// - `final_text` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `rhythm_free_string`.
/// - Returns NULL on error; call `rhythm_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn rhythm_session_finish(
    handle: *mut RhythmSessionHandle,
    final_text: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null session handle");
        return ptr::null_mut();
    }
    let handle = &mut *handle;

    let text = match cstr_to_string(final_text) {
        Some(s) => s,
        None => {
            set_last_error("Invalid final text string pointer");
            return ptr::null_mut();
        }
    };

    let result = handle
        .session
        .finish(&text)
        .and_then(|report| serde_json::to_string(&report).map_err(RhythmError::JsonError));

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Rhythm functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Rhythm function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn rhythm_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Rhythm function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn rhythm_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Rhythm library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn rhythm_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
