//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length pairs for bytes, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use japi_core::{ApiError, ApiRequest, ApiResult, HttpMethod, RequestPipeline};

/// Opaque handle to a `RequestPipeline`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiApiClient {
    pub(crate) inner: RequestPipeline,
}

/// Opaque, mutable API request under construction.
pub struct FfiApiRequest {
    pub(crate) inner: ApiRequest,
}

/// Convert a Rust string into an owned C string, dropping interior NULs.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

/// Leak a byte buffer to C. Returns null for an empty buffer.
pub(crate) fn to_c_bytes(bytes: Vec<u8>) -> (*mut u8, usize) {
    if bytes.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = bytes.len();
    (Box::into_raw(bytes.into_boxed_slice()) as *mut u8, len)
}

/// Reclaim a buffer produced by `to_c_bytes`.
///
/// # Safety
/// `ptr` and `len` must come from a single `to_c_bytes` call.
pub(crate) unsafe fn free_c_bytes(ptr: *mut u8, len: usize) {
    if !ptr.is_null() && len > 0 {
        drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)));
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
    Head = 5,
    Options = 6,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Head => FfiHttpMethod::Head,
            HttpMethod::Options => FfiHttpMethod::Options,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A resolved HTTP request described as C-compatible plain data.
///
/// Built by `japi_resolve_request`. The C caller executes the request with
/// its own HTTP stack and passes the outcome back through
/// `japi_interpret_response` or `japi_transport_failed`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    /// Null when no url could be resolved.
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    /// Null when the request has no body.
    pub body: *mut u8,
    pub body_len: usize,
    pub timeout_ms: u64,
    pub cellular: bool,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: japi_core::HttpRequest) -> *mut Self {
        let url = match req.url {
            Some(u) => to_c_string(u),
            None => std::ptr::null_mut(),
        };
        let (body, body_len) = to_c_bytes(req.body.unwrap_or_default());

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Vec<FfiHeader> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers.into_boxed_slice()) as *mut FfiHeader
        };

        let ffi_req = Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
            body_len,
            timeout_ms: u64::try_from(req.timeout.as_millis()).unwrap_or(u64::MAX),
            cellular: req.cellular,
        });
        Box::into_raw(ffi_req)
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request, then
/// passes a pointer to `japi_interpret_response`. The FFI layer reads but
/// does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const u8,
    pub body_len: usize,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiApiResult`. `Transport`, `Status` and
/// `Decode` share their values with the core `ErrorKind`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Transport = 1,
    Status = 2,
    Decode = 3,
    Panic = 4,
    NullArg = 5,
}

/// Result envelope for `japi_interpret_response` and `japi_transport_failed`.
///
/// On success `error_code` is `Ok` and `json` holds the decoded object
/// re-serialized as a JSON string. On failure `json` is null, `error_code`
/// names the domain, `error_detail` carries the domain-specific code (the
/// HTTP status for `Status`), `error_message` is human-readable, and
/// `payload` holds the raw response body when one was received.
#[repr(C)]
pub struct FfiApiResult {
    pub error_code: FfiErrorCode,
    pub error_detail: i64,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub json: *mut c_char,
    pub payload: *mut u8,
    pub payload_len: usize,
}

impl FfiApiResult {
    pub(crate) fn from_core(result: ApiResult) -> *mut Self {
        match result {
            Ok(object) => Self::ok(serde_json::Value::Object(object).to_string()),
            Err(err) => Self::from_error(err),
        }
    }

    fn ok(json: String) -> *mut Self {
        Box::into_raw(Box::new(FfiApiResult {
            error_code: FfiErrorCode::Ok,
            error_detail: 0,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            json: to_c_string(json),
            payload: std::ptr::null_mut(),
            payload_len: 0,
        }))
    }

    fn from_error(err: ApiError) -> *mut Self {
        let error_detail = err.code();
        let msg = err.to_string();
        let (error_code, http_status, body) = match err {
            ApiError::Transport(_) => (FfiErrorCode::Transport, 0, Vec::new()),
            ApiError::Status { status, body } => (FfiErrorCode::Status, status, body),
            ApiError::Decode { body, .. } => (FfiErrorCode::Decode, 0, body),
        };
        let (payload, payload_len) = to_c_bytes(body);

        Box::into_raw(Box::new(FfiApiResult {
            error_code,
            error_detail,
            error_message: to_c_string(msg),
            http_status,
            json: std::ptr::null_mut(),
            payload,
            payload_len,
        }))
    }

    fn failure(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiApiResult {
            error_code,
            error_detail: 0,
            error_message: to_c_string(msg),
            http_status: 0,
            json: std::ptr::null_mut(),
            payload: std::ptr::null_mut(),
            payload_len: 0,
        }))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string())
    }
}
