//! C-ABI wrapper around `todo-core`.
//!
//! # Overview
//! Exposes the todo client and the list screen state through `extern "C"`
//! functions, so a mobile host can build and parse HTTP requests, and keep
//! its list in sync, without linking to Rust's serde or HTTP stacks.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core client 1:1.
//! - A single `FfiTodoResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The list state is an opaque handle. The host asks it for a refresh
//!   ticket, executes the list request, and hands the response back with the
//!   ticket; responses for superseded tickets are dropped.
//! - The C caller owns all returned pointers and must call the matching
//!   `todo_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use chrono::DateTime;
use todo_core::error::ApiError;
use todo_core::http::HttpResponse;
use todo_core::list::{ListState, RefreshTicket};
use todo_core::store::read_asset;
use todo_core::types::{ImageRef, NewTodo, TodoPatch};
use todo_core::TodoClient;
use tracing::warn;
use uuid::Uuid;

use types::*;

/// Borrow a C string as UTF-8. Null or invalid UTF-8 yields `None`.
fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

fn read_id(ptr: *const c_char) -> Option<Uuid> {
    read_str(ptr).and_then(|s| Uuid::parse_str(s).ok())
}

fn read_owned(ptr: *const c_char) -> Option<String> {
    read_str(ptr).map(str::to_string)
}

fn response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse::new(resp.status, read_str(resp.body).unwrap_or(""))
}

/// Shared body of the `todo_parse_*` functions.
fn parse_with<T>(
    client: *const FfiTodoClient,
    response: *const FfiHttpResponse,
    parse: impl FnOnce(&TodoClient, HttpResponse) -> Result<T, ApiError>,
    wrap: impl FnOnce(T) -> *mut FfiTodoResult,
) -> *mut FfiTodoResult {
    if client.is_null() {
        return FfiTodoResult::null_arg("client");
    }
    if response.is_null() {
        return FfiTodoResult::null_arg("response");
    }
    let client = unsafe { &*client };
    let resp = response_to_core(unsafe { &*response });
    match parse(&client.inner, resp) {
        Ok(value) => wrap(value),
        Err(e) => FfiTodoResult::from_error(e),
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `TodoClient` bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `todo_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_client_new(base_url: *const c_char) -> *mut FfiTodoClient {
    catch_unwind(|| match read_str(base_url) {
        Some(url) => Box::into_raw(Box::new(FfiTodoClient {
            inner: TodoClient::new(url),
        })),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a `TodoClient` created by `todo_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_client_free(client: *mut FfiTodoClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build the request listing all todos, newest first.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `todo_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_build_list_todos(client: *const FfiTodoClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_list_todos())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request fetching one todo.
///
/// Returns null if `client` or `id` is null, or if `id` is not a valid UUID.
#[unsafe(no_mangle)]
pub extern "C" fn todo_build_get_todo(
    client: *const FfiTodoClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match read_id(id) {
            Some(id) => FfiHttpRequest::from_core(client.inner.build_get_todo(id)),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request creating a todo.
///
/// `description` and `image_uri` may be null; they are sent as empty strings.
/// `created_at_ms` is milliseconds since the Unix epoch.
/// Returns null if `client` or `title` is null, or `created_at_ms` is out of
/// range.
#[unsafe(no_mangle)]
pub extern "C" fn todo_build_create_todo(
    client: *const FfiTodoClient,
    title: *const c_char,
    description: *const c_char,
    image_uri: *const c_char,
    is_completed: bool,
    created_at_ms: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let (Some(title), Some(created_at)) =
            (read_owned(title), DateTime::from_timestamp_millis(created_at_ms))
        else {
            return std::ptr::null_mut();
        };
        let input = NewTodo {
            title,
            description: read_owned(description).unwrap_or_default(),
            image_uri: read_owned(image_uri).unwrap_or_default(),
            is_completed,
            created_at,
        };
        match client.inner.build_create_todo(&input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request updating a todo.
///
/// Null `title`, `description` or `image_uri` leave that field untouched.
/// `is_completed` uses tri-state: -1 = skip, 0 = false, 1 = true.
/// Returns null if `client` or `id` is null, or if `id` is not a valid UUID.
#[unsafe(no_mangle)]
pub extern "C" fn todo_build_update_todo(
    client: *const FfiTodoClient,
    id: *const c_char,
    title: *const c_char,
    description: *const c_char,
    image_uri: *const c_char,
    is_completed: i32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(id) = read_id(id) else {
            return std::ptr::null_mut();
        };
        let patch = TodoPatch {
            title: read_owned(title),
            description: read_owned(description),
            is_completed: match is_completed {
                0 => Some(false),
                1 => Some(true),
                _ => None,
            },
            image_uri: read_owned(image_uri),
        };
        match client.inner.build_update_todo(id, &patch) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request deleting a todo.
///
/// Returns null if `client` or `id` is null, or if `id` is not a valid UUID.
#[unsafe(no_mangle)]
pub extern "C" fn todo_build_delete_todo(
    client: *const FfiTodoClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match read_id(id) {
            Some(id) => FfiHttpRequest::from_core(client.inner.build_delete_todo(id)),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request uploading a device file to asset storage.
///
/// `local_uri` is a plain path or a `file://` URI. The file is read and
/// base64-encoded here. Returns null if an argument is null or the file
/// cannot be read.
#[unsafe(no_mangle)]
pub extern "C" fn todo_build_upload_asset(
    client: *const FfiTodoClient,
    local_uri: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(local_uri) = read_str(local_uri) else {
            return std::ptr::null_mut();
        };
        let req = read_asset(local_uri).and_then(|upload| client.inner.build_upload_asset(&upload));
        match req {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(e) => {
                warn!(error = %e, "cannot build asset upload");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Parse the response to a list request. `data_tag = TodoList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn todo_parse_list_todos(
    client: *const FfiTodoClient,
    response: *const FfiHttpResponse,
) -> *mut FfiTodoResult {
    catch_unwind(|| {
        parse_with(client, response, TodoClient::parse_list_todos, FfiTodoResult::ok_todo_list)
    })
    .unwrap_or_else(|_| FfiTodoResult::panic("panic in todo_parse_list_todos"))
}

/// Parse the response to a get request. `data_tag = Todo` on success.
#[unsafe(no_mangle)]
pub extern "C" fn todo_parse_get_todo(
    client: *const FfiTodoClient,
    response: *const FfiHttpResponse,
) -> *mut FfiTodoResult {
    catch_unwind(|| parse_with(client, response, TodoClient::parse_get_todo, FfiTodoResult::ok_todo))
        .unwrap_or_else(|_| FfiTodoResult::panic("panic in todo_parse_get_todo"))
}

/// Parse the response to a create request (status 201).
#[unsafe(no_mangle)]
pub extern "C" fn todo_parse_create_todo(
    client: *const FfiTodoClient,
    response: *const FfiHttpResponse,
) -> *mut FfiTodoResult {
    catch_unwind(|| {
        parse_with(client, response, TodoClient::parse_create_todo, FfiTodoResult::ok_todo)
    })
    .unwrap_or_else(|_| FfiTodoResult::panic("panic in todo_parse_create_todo"))
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_parse_update_todo(
    client: *const FfiTodoClient,
    response: *const FfiHttpResponse,
) -> *mut FfiTodoResult {
    catch_unwind(|| {
        parse_with(client, response, TodoClient::parse_update_todo, FfiTodoResult::ok_todo)
    })
    .unwrap_or_else(|_| FfiTodoResult::panic("panic in todo_parse_update_todo"))
}

/// Parse the response to a delete request (status 204). `data_tag = None`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_parse_delete_todo(
    client: *const FfiTodoClient,
    response: *const FfiHttpResponse,
) -> *mut FfiTodoResult {
    catch_unwind(|| {
        parse_with(client, response, TodoClient::parse_delete_todo, |()| {
            FfiTodoResult::ok_empty()
        })
    })
    .unwrap_or_else(|_| FfiTodoResult::panic("panic in todo_parse_delete_todo"))
}

/// Parse the response to an asset upload. `data_tag = Url` on success.
#[unsafe(no_mangle)]
pub extern "C" fn todo_parse_upload_asset(
    client: *const FfiTodoClient,
    response: *const FfiHttpResponse,
) -> *mut FfiTodoResult {
    catch_unwind(|| {
        parse_with(client, response, TodoClient::parse_upload_asset, FfiTodoResult::ok_url)
    })
    .unwrap_or_else(|_| FfiTodoResult::panic("panic in todo_parse_upload_asset"))
}

/// True when `uri` points at remote storage, false for local or empty URIs.
/// The host uses this to decide whether an image must be uploaded first.
#[unsafe(no_mangle)]
pub extern "C" fn todo_image_is_remote(uri: *const c_char) -> bool {
    catch_unwind(|| {
        matches!(read_str(uri).and_then(ImageRef::classify), Some(ImageRef::Remote(_)))
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// List state
// ---------------------------------------------------------------------------

/// Create an empty list with both filters enabled.
/// The caller must free the returned pointer with `todo_list_free`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_list_new() -> *mut FfiListState {
    catch_unwind(|| Box::into_raw(Box::new(FfiListState { inner: ListState::new() })))
        .unwrap_or(std::ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_list_free(list: *mut FfiListState) {
    if !list.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(list) });
        });
    }
}

/// Start a refresh and return its ticket. Earlier tickets become stale.
/// Returns 0, never a valid ticket, if `list` is null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_list_begin_refresh(list: *mut FfiListState) -> u64 {
    catch_unwind(|| {
        if list.is_null() {
            return 0;
        }
        let list = unsafe { &mut *list };
        list.inner.begin_refresh().get()
    })
    .unwrap_or(0)
}

/// Hand back the response to the list request issued for `ticket`.
///
/// A null `response` means the host could not execute the request; the
/// refresh completes as failed and the previous items are kept. A null
/// `client` fails the refresh the same way. Only a null `list` yields
/// `NullArg`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_list_complete_refresh(
    list: *mut FfiListState,
    client: *const FfiTodoClient,
    ticket: u64,
    response: *const FfiHttpResponse,
) -> FfiRefreshOutcome {
    catch_unwind(|| {
        if list.is_null() {
            return FfiRefreshOutcome::NullArg;
        }
        let list = unsafe { &mut *list };
        let result = if client.is_null() {
            Err(ApiError::Transport("no client to parse the response".to_string()))
        } else if response.is_null() {
            Err(ApiError::Transport("no response from host".to_string()))
        } else {
            let client = unsafe { &*client };
            client.inner.parse_list_todos(response_to_core(unsafe { &*response }))
        };
        list.inner
            .complete_refresh(RefreshTicket::from_raw(ticket), result)
            .into()
    })
    .unwrap_or(FfiRefreshOutcome::Failed)
}

/// True while the latest refresh has not completed.
#[unsafe(no_mangle)]
pub extern "C" fn todo_list_is_loading(list: *const FfiListState) -> bool {
    catch_unwind(|| !list.is_null() && unsafe { &*list }.inner.is_loading()).unwrap_or(false)
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_list_set_filter(list: *mut FfiListState, kind: FfiFilterKind, enabled: bool) {
    if list.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let list = unsafe { &mut *list };
        list.inner.set_filter(kind.into(), enabled);
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_list_filter(list: *const FfiListState, kind: FfiFilterKind) -> bool {
    catch_unwind(|| !list.is_null() && unsafe { &*list }.inner.filter(kind.into())).unwrap_or(false)
}

/// Snapshot of the filtered items. `data_tag = TodoList`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_list_visible_items(list: *const FfiListState) -> *mut FfiTodoResult {
    catch_unwind(|| {
        if list.is_null() {
            return FfiTodoResult::null_arg("list");
        }
        let list = unsafe { &*list };
        let items = list.inner.visible_items().into_iter().cloned().collect();
        FfiTodoResult::ok_todo_list(items)
    })
    .unwrap_or_else(|_| FfiTodoResult::panic("panic in todo_list_visible_items"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free an `FfiHttpRequest` returned by any `todo_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let len = req.headers_len as usize;
            let headers = unsafe { Vec::from_raw_parts(req.headers, len, len) };
            for h in headers {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiTodoResult`. Safe to call with null. Uses `data_tag` to
/// determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_result(result: *mut FfiTodoResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Todo => {
                let todo = unsafe { Box::from_raw(result.data as *mut FfiTodo) };
                free_ffi_todo_fields(&todo);
            }
            FfiDataTag::TodoList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiTodoList) };
                if !list.items.is_null() && list.len > 0 {
                    let len = list.len as usize;
                    let items = unsafe { Vec::from_raw_parts(list.items, len, len) };
                    items.iter().for_each(free_ffi_todo_fields);
                }
            }
            FfiDataTag::Url => free_c_string(result.data as *mut c_char),
            FfiDataTag::None => {}
        }
    });
}

/// Free the C-string fields of an `FfiTodo` (but not the struct itself).
fn free_ffi_todo_fields(todo: &FfiTodo) {
    free_c_string(todo.id);
    free_c_string(todo.title);
    free_c_string(todo.description);
    free_c_string(todo.image_uri);
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
