//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`,
//! milliseconds since the Unix epoch instead of `DateTime`, and tagged enums
//! with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CString, c_void};
use std::os::raw::c_char;

use todo_core::error::ApiError;
use todo_core::http::HttpMethod;
use todo_core::list::{FilterKind, ListState, RefreshOutcome};
use todo_core::types::TodoItem;

/// Opaque handle to a `TodoClient`.
pub struct FfiTodoClient {
    pub(crate) inner: todo_core::TodoClient,
}

/// Opaque handle to the list screen state.
pub struct FfiListState {
    pub(crate) inner: ListState,
}

/// Allocate a C string. Interior NULs yield an empty string.
pub(crate) fn to_c(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

fn opt_to_c(s: Option<String>) -> *mut c_char {
    s.map(to_c).unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request for the host to execute.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: todo_core::HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Vec<FfiHeader> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c(k),
                    value: to_c(v),
                })
                .collect();
            Box::into_raw(ffi_headers.into_boxed_slice()) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: to_c(req.path),
            headers,
            headers_len,
            body: opt_to_c(req.body),
        }))
    }
}

/// Response filled in by the host after executing a request. Read, never
/// freed, by this library.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// List state enums
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Clone, Copy)]
pub enum FfiFilterKind {
    Completed = 0,
    Incomplete = 1,
}

impl From<FfiFilterKind> for FilterKind {
    fn from(kind: FfiFilterKind) -> Self {
        match kind {
            FfiFilterKind::Completed => FilterKind::Completed,
            FfiFilterKind::Incomplete => FilterKind::Incomplete,
        }
    }
}

#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiRefreshOutcome {
    Applied = 0,
    Stale = 1,
    Failed = 2,
    NullArg = 3,
}

impl From<RefreshOutcome> for FfiRefreshOutcome {
    fn from(outcome: RefreshOutcome) -> Self {
        match outcome {
            RefreshOutcome::Applied => FfiRefreshOutcome::Applied,
            RefreshOutcome::Stale => FfiRefreshOutcome::Stale,
            RefreshOutcome::Failed => FfiRefreshOutcome::Failed,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Deserialization = 3,
    Serialization = 4,
    Panic = 5,
    NullArg = 6,
    Transport = 7,
    Asset = 8,
}

/// Tells `todo_free_result` what `FfiTodoResult::data` points to.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Todo = 1,
    TodoList = 2,
    /// `data` is a `char*` holding a URL.
    Url = 3,
}

/// A todo exposed to C. `description` and `image_uri` are null when absent.
#[repr(C)]
pub struct FfiTodo {
    pub id: *mut c_char,
    pub title: *mut c_char,
    pub description: *mut c_char,
    pub is_completed: bool,
    pub created_at_ms: i64,
    pub image_uri: *mut c_char,
}

impl FfiTodo {
    pub(crate) fn from_core(todo: TodoItem) -> Self {
        FfiTodo {
            id: to_c(todo.id.to_string()),
            title: to_c(todo.title),
            description: opt_to_c(todo.description),
            is_completed: todo.is_completed,
            created_at_ms: todo.created_at.timestamp_millis(),
            image_uri: opt_to_c(todo.image_uri),
        }
    }
}

#[repr(C)]
pub struct FfiTodoList {
    pub items: *mut FfiTodo,
    pub len: u32,
}

/// Result envelope for parse and query operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload tagged by `data_tag`. On failure `data` is null and
/// `error_message` is a human-readable C string.
#[repr(C)]
pub struct FfiTodoResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiTodoResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiTodoResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn err(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiTodoResult {
            error_code,
            error_message: to_c(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn ok_todo(todo: TodoItem) -> *mut Self {
        let ffi_todo = Box::new(FfiTodo::from_core(todo));
        Self::ok(FfiDataTag::Todo, Box::into_raw(ffi_todo) as *mut c_void)
    }

    pub(crate) fn ok_todo_list(todos: Vec<TodoItem>) -> *mut Self {
        let len = todos.len() as u32;
        let items = if todos.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_todos: Vec<FfiTodo> = todos.into_iter().map(FfiTodo::from_core).collect();
            Box::into_raw(ffi_todos.into_boxed_slice()) as *mut FfiTodo
        };
        let ffi_list = Box::new(FfiTodoList { items, len });
        Self::ok(FfiDataTag::TodoList, Box::into_raw(ffi_list) as *mut c_void)
    }

    pub(crate) fn ok_url(url: String) -> *mut Self {
        Self::ok(FfiDataTag::Url, to_c(url) as *mut c_void)
    }

    pub(crate) fn ok_empty() -> *mut Self {
        Self::ok(FfiDataTag::None, std::ptr::null_mut())
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (code, status) = match &err {
            ApiError::NotFound => (FfiErrorCode::NotFound, 404),
            ApiError::HttpError { status, .. } => (FfiErrorCode::Http, *status),
            ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, 0),
            ApiError::SerializationError(_) => (FfiErrorCode::Serialization, 0),
            ApiError::Transport(_) => (FfiErrorCode::Transport, 0),
            ApiError::Asset { .. } => (FfiErrorCode::Asset, 0),
        };
        Self::err(code, status, err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::err(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::err(FfiErrorCode::Panic, 0, msg.to_string())
    }
}
