//! C-ABI wrapper around `japi-core`.
//!
//! # Overview
//! Exposes the I/O-free half of the JSON API pipeline through `extern "C"`
//! functions: a host builds a request, asks for it to be resolved into a
//! plain HTTP request, executes it with its own networking stack, then hands
//! the status and body (or its transport failure) back for interpretation.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Setters return `false` instead of failing loudly on null or non-UTF-8
//!   arguments.
//! - A single `FfiApiResult` envelope conveys decoded objects and errors
//!   uniformly; exactly one of `json` and `error_message` is non-null.
//! - The C caller owns all returned pointers and must call the matching
//!   `japi_*_free` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use japi_core::{AnySuccess, ApiRequest, HttpMethod, HttpResponse, PathUrl, RequestPipeline, TransportError, TransportErrorKind};

use types::*;

/// Read a borrowed C string. Returns `None` for null or non-UTF-8 input.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(str::to_string)
}

/// Read a borrowed byte buffer. A null pointer reads as empty.
///
/// # Safety
/// `ptr` must be null or valid for `len` bytes.
unsafe fn read_bytes(ptr: *const u8, len: usize) -> Vec<u8> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    std::slice::from_raw_parts(ptr, len).to_vec()
}

/// Run `f` on the request behind `req`, reporting `false` for null or panic.
fn with_request(req: *mut FfiApiRequest, f: impl FnOnce(&mut ApiRequest) -> bool) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if req.is_null() {
            return false;
        }
        let req = unsafe { &mut *req };
        f(&mut req.inner)
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client.
///
/// With a null `base_url` the request's own url is used verbatim. Otherwise
/// urls are built as `{base_url}/{api}/{version}/{action}`.
/// The caller must free the returned pointer with `japi_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn japi_client_new(base_url: *const c_char) -> *mut FfiApiClient {
    catch_unwind(|| {
        let mut pipeline = RequestPipeline::new();
        if let Some(base) = unsafe { read_str(base_url) } {
            pipeline = pipeline.with_url_resolver(PathUrl::new(&base));
        }
        Box::into_raw(Box::new(FfiApiClient { inner: pipeline }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Accept every 2xx status instead of only 200. Returns `false` for null.
#[unsafe(no_mangle)]
pub extern "C" fn japi_client_accept_any_success(client: *mut FfiApiClient) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return false;
        }
        let client = unsafe { &mut *client };
        client.inner = client.inner.clone().with_status_policy(AnySuccess);
        true
    }))
    .unwrap_or(false)
}

/// Free a client created by `japi_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn japi_client_free(client: *mut FfiApiClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Request construction
// ---------------------------------------------------------------------------

/// Create a request. `url` may be null when the client builds urls from the
/// endpoint. Returns null if `method` is null or not a known HTTP method.
/// The caller must free the returned pointer with `japi_request_free`.
#[unsafe(no_mangle)]
pub extern "C" fn japi_request_new(method: *const c_char, url: *const c_char) -> *mut FfiApiRequest {
    catch_unwind(|| {
        let method = match unsafe { read_str(method) }.map(|m| m.parse::<HttpMethod>()) {
            Some(Ok(m)) => m,
            _ => return std::ptr::null_mut(),
        };
        let mut inner = ApiRequest::new(method);
        inner.url = unsafe { read_str(url) };
        Box::into_raw(Box::new(FfiApiRequest { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Set `api`, `version` and `action`. Null arguments leave the field empty.
#[unsafe(no_mangle)]
pub extern "C" fn japi_request_set_endpoint(
    req: *mut FfiApiRequest,
    api: *const c_char,
    version: *const c_char,
    action: *const c_char,
) -> bool {
    with_request(req, |r| {
        r.api = unsafe { read_str(api) }.unwrap_or_default();
        r.version = unsafe { read_str(version) }.unwrap_or_default();
        r.action = unsafe { read_str(action) }.unwrap_or_default();
        true
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn japi_request_set_header(
    req: *mut FfiApiRequest,
    name: *const c_char,
    value: *const c_char,
) -> bool {
    with_request(req, |r| match unsafe { (read_str(name), read_str(value)) } {
        (Some(name), Some(value)) => {
            r.headers.insert(name, value);
            true
        }
        _ => false,
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn japi_request_set_query(
    req: *mut FfiApiRequest,
    key: *const c_char,
    value: *const c_char,
) -> bool {
    with_request(req, |r| match unsafe { (read_str(key), read_str(value)) } {
        (Some(key), Some(value)) => {
            r.query.insert(key, value);
            true
        }
        _ => false,
    })
}

/// Set an explicit body, which takes precedence over query parameters.
/// A null `body` clears it.
#[unsafe(no_mangle)]
pub extern "C" fn japi_request_set_body(req: *mut FfiApiRequest, body: *const u8, len: usize) -> bool {
    with_request(req, |r| {
        r.body = (!body.is_null()).then(|| unsafe { read_bytes(body, len) });
        true
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn japi_request_set_timeout_ms(req: *mut FfiApiRequest, timeout_ms: u64) -> bool {
    with_request(req, |r| {
        r.timeout = Duration::from_millis(timeout_ms);
        true
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn japi_request_set_cellular(req: *mut FfiApiRequest, cellular: bool) -> bool {
    with_request(req, |r| {
        r.cellular = cellular;
        true
    })
}

/// Free a request created by `japi_request_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn japi_request_free(req: *mut FfiApiRequest) {
    if !req.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(req) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Resolution and interpretation
// ---------------------------------------------------------------------------

/// Resolve `req` into the plain HTTP request the host should execute.
///
/// Returns null if either argument is null.
/// The caller must free the returned pointer with `japi_http_request_free`.
#[unsafe(no_mangle)]
pub extern "C" fn japi_resolve_request(
    client: *const FfiApiClient,
    req: *const FfiApiRequest,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || req.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let req = unsafe { &*req };
        FfiHttpRequest::from_core(client.inner.resolve_request(&req.inner))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Interpret a response the host received.
#[unsafe(no_mangle)]
pub extern "C" fn japi_interpret_response(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiApiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiApiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiApiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let core_resp = HttpResponse::new(resp.status, unsafe { read_bytes(resp.body, resp.body_len) });
        FfiApiResult::from_core(client.inner.interpret_response(Ok(core_resp)))
    }))
    .unwrap_or_else(|_| FfiApiResult::panic("panic in japi_interpret_response"))
}

/// Report that the host's transport failed before a response arrived.
/// `timed_out` selects the `TimedOut` kind over a generic I/O failure.
#[unsafe(no_mangle)]
pub extern "C" fn japi_transport_failed(
    client: *const FfiApiClient,
    message: *const c_char,
    timed_out: bool,
) -> *mut FfiApiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiApiResult::null_arg("client");
        }
        let client = unsafe { &*client };
        let kind = if timed_out {
            TransportErrorKind::TimedOut
        } else {
            TransportErrorKind::Io
        };
        let message = unsafe { read_str(message) }.unwrap_or_else(|| "transport failed".to_string());
        FfiApiResult::from_core(client.inner.interpret_response(Err(TransportError::new(kind, message))))
    }))
    .unwrap_or_else(|_| FfiApiResult::panic("panic in japi_transport_failed"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `japi_resolve_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn japi_http_request_free(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        unsafe { free_c_bytes(req.body, req.body_len) };
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.into_vec() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    }));
}

/// Free an `FfiApiResult`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn japi_result_free(result: *mut FfiApiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.json.is_null() {
            drop(unsafe { CString::from_raw(result.json) });
        }
        unsafe { free_c_bytes(result.payload, result.payload_len) };
    }));
}
