use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::sync::{Mutex, MutexGuard};

use lazy_static::lazy_static;
use log::debug;
use serde::Serialize;
use serde_json::{json, Value};

use crate::ast::SchemaFacts;
use crate::error::ModelError;
use crate::model::SchemaModel;

lazy_static! {
    static ref CACHED_MODEL: Mutex<Option<SchemaModel>> = Mutex::new(None);
}

/// Result code for FFI functions
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelgenResult {
    Ok = 0,
    InvalidInput = 1,
    ValidationError = 2,
    InternalError = 3,
}

/// Structured validation error for JSON output
#[derive(Serialize)]
struct ValidationErrorJson {
    kind: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    table: Option<String>,
}

/// Structured validation result for JSON output
#[derive(Serialize)]
struct ValidationResultJson {
    valid: bool,
    errors: Vec<ValidationErrorJson>,
}

/// Build the schema model from a facts JSON document and return the
/// generator view as JSON
///
/// # Safety
/// - `facts_json` must be a valid null-terminated C string
/// - Caller must free the returned string with `relgen_free_string`
/// - Returns NULL on error, check `error_out` for a `{"kind","data"}` object
#[no_mangle]
pub unsafe extern "C" fn relgen_build_model(
    facts_json: *const c_char,
    error_out: *mut *mut c_char,
) -> *mut c_char {
    let model = match read_input(facts_json).and_then(build_model) {
        Ok(m) => m,
        Err(e) => {
            set_error(error_out, &e.to_string());
            return ptr::null_mut();
        }
    };

    match serde_json::to_string_pretty(&model.view()) {
        Ok(json) => into_c_string(json),
        Err(e) => {
            let err = input_error(&format!("JSON serialization error: {}", e));
            set_error(error_out, &err.to_string());
            ptr::null_mut()
        }
    }
}

/// Validate a facts JSON document (duplicates, unknown columns, unresolved
/// references). `out` always receives `{"valid":bool,"errors":[...]}`.
///
/// # Safety
/// - `facts_json` must be a valid null-terminated C string
/// - Caller must free `*out` with `relgen_free_string`
#[no_mangle]
pub unsafe extern "C" fn relgen_validate_schema(
    facts_json: *const c_char,
    out: *mut *mut c_char,
) -> RelgenResult {
    let parsed = read_str(facts_json).and_then(|input| {
        serde_json::from_str::<SchemaFacts>(input).map_err(|e| e.to_string())
    });

    let (code, errors) = match parsed {
        Err(message) => (
            RelgenResult::InvalidInput,
            vec![ValidationErrorJson {
                kind: "InvalidInput".to_string(),
                message,
                table: None,
            }],
        ),
        Ok(facts) => match SchemaModel::from_facts(facts) {
            Ok(_) => (RelgenResult::Ok, vec![]),
            Err(e) => (
                RelgenResult::ValidationError,
                vec![ValidationErrorJson {
                    kind: error_kind(&e),
                    message: e.to_string(),
                    table: Some(e.table().to_string()),
                }],
            ),
        },
    };

    let result = ValidationResultJson {
        valid: errors.is_empty(),
        errors,
    };

    match serde_json::to_string(&result) {
        Ok(json) => {
            set_error(out, &json);
            code
        }
        Err(_) => RelgenResult::InternalError,
    }
}

/// Build a model once and keep it for `relgen_table_relationships` calls
///
/// # Safety
/// - `facts_json` must be a valid null-terminated C string
/// - Caller must free the returned string with `relgen_free_string`
#[no_mangle]
pub unsafe extern "C" fn relgen_set_model_cache(facts_json: *const c_char) -> *mut c_char {
    let result = match read_input(facts_json).and_then(build_model) {
        Ok(model) => {
            *cache() = Some(model);
            json!({"valid": true})
        }
        Err(e) => json!({"valid": false, "error": e}),
    };

    into_c_string(result.to_string())
}

/// Drop the cached model
/// Caller must free the returned string with `relgen_free_string`
#[no_mangle]
pub extern "C" fn relgen_clear_model_cache() -> *mut c_char {
    *cache() = None;
    into_c_string(json!({"valid": true}).to_string())
}

/// Outgoing, incoming and many-to-many edges of one table in the cached model
///
/// # Safety
/// - `table_name` must be a valid null-terminated C string
/// - Caller must free the returned string with `relgen_free_string`
/// - Returns NULL on error, check `error_out`
#[no_mangle]
pub unsafe extern "C" fn relgen_table_relationships(
    table_name: *const c_char,
    error_out: *mut *mut c_char,
) -> *mut c_char {
    let name = match read_input(table_name) {
        Ok(s) => s,
        Err(e) => {
            set_error(error_out, &e.to_string());
            return ptr::null_mut();
        }
    };

    let guard = cache();
    let model = match guard.as_ref() {
        Some(m) => m,
        None => {
            let err = input_error("No cached model. Call relgen_set_model_cache() first.");
            set_error(error_out, &err.to_string());
            return ptr::null_mut();
        }
    };

    let relationships = match model.relationships_for_table(name) {
        Some(r) => r,
        None => {
            let err = ModelError::UnknownTable {
                table: name.to_string(),
            };
            set_error(error_out, &error_json(&err).to_string());
            return ptr::null_mut();
        }
    };

    match serde_json::to_string(relationships) {
        Ok(json) => into_c_string(json),
        Err(e) => {
            let err = input_error(&format!("JSON serialization error: {}", e));
            set_error(error_out, &err.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a string allocated by Rust
///
/// # Safety
/// `s` must be NULL or a pointer previously returned by this library
#[no_mangle]
pub unsafe extern "C" fn relgen_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Get the version of the library
#[no_mangle]
pub extern "C" fn relgen_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}

// ============================================================
// HELPERS
// ============================================================

fn cache() -> MutexGuard<'static, Option<SchemaModel>> {
    // The cached model is only ever replaced wholesale, so a poisoned lock
    // still holds a consistent value
    CACHED_MODEL.lock().unwrap_or_else(|e| e.into_inner())
}

unsafe fn read_str<'a>(input: *const c_char) -> Result<&'a str, String> {
    if input.is_null() {
        return Err("Input string is null".to_string());
    }
    CStr::from_ptr(input)
        .to_str()
        .map_err(|e| format!("Invalid UTF-8: {}", e))
}

unsafe fn read_input<'a>(input: *const c_char) -> Result<&'a str, Value> {
    read_str(input).map_err(|message| input_error(&message))
}

fn build_model(input: &str) -> Result<SchemaModel, Value> {
    let facts: SchemaFacts = serde_json::from_str(input)
        .map_err(|e| input_error(&format!("Schema facts deserialization error: {}", e)))?;
    debug!("ffi: building model from {} tables", facts.tables.len());
    SchemaModel::from_facts(facts).map_err(|e| error_json(&e))
}

fn error_kind(err: &ModelError) -> String {
    serde_json::to_value(err)
        .ok()
        .and_then(|v| v.get("kind").and_then(|k| k.as_str()).map(str::to_string))
        .unwrap_or_else(|| "ValidationError".to_string())
}

fn error_json(err: &ModelError) -> Value {
    serde_json::to_value(err).unwrap_or_else(|_| {
        json!({"kind": "InternalError", "data": {"message": "Failed to serialize error"}})
    })
}

fn input_error(message: &str) -> Value {
    json!({"kind": "InvalidInput", "data": {"message": message}})
}

fn into_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

unsafe fn set_error(error_out: *mut *mut c_char, message: &str) {
    if !error_out.is_null() {
        if let Ok(c_str) = CString::new(message) {
            *error_out = c_str.into_raw();
        }
    }
}
