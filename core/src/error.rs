//! Error types for the todo core.
//!
//! # Design
//! `ApiError` covers everything that can go wrong talking to the remote
//! store. `NotFound` gets a dedicated variant because callers distinguish
//! "the todo does not exist" from "the server returned an unexpected status."
//! All other non-2xx responses land in `HttpError` with the raw status code
//! and body for debugging.
//!
//! View-model and platform errors live next to it so the FFI layer and hosts
//! can match on one module.

use thiserror::Error;

/// Errors from the remote store: HTTP, payload, transport or local file.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404; the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A local asset could not be read before upload.
    #[error("cannot read asset {path}: {reason}")]
    Asset { path: String, reason: String },
}

/// Errors from the device's platform services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The user refused access to contacts.
    #[error("permission denied")]
    PermissionDenied,

    /// The device cannot send SMS.
    #[error("SMS is not available on this device")]
    SmsUnavailable,

    /// The platform service reported a failure.
    #[error("platform service failed: {0}")]
    Service(String),
}

/// Errors returned by `FormViewModel` operations.
#[derive(Debug, Error)]
pub enum FormError {
    /// The title trims to empty; nothing was sent.
    #[error("validation failed: {0}")]
    Validation(&'static str),

    /// A submit or delete is already running for this form.
    #[error("a submission is already in flight")]
    InFlight,

    /// The form already saved or deleted its todo; the host should leave it.
    #[error("form already completed")]
    Finished,

    /// Delete was called on a form that has no persisted todo.
    #[error("todo has not been saved yet")]
    NotPersisted,

    /// Upload, create, update, delete or load failed.
    #[error("remote operation failed: {0}")]
    Remote(#[from] ApiError),
}

/// Errors returned by `ShareFlow` operations.
#[derive(Debug, Error)]
pub enum ShareError {
    /// `send_to` was called without a successful `open_channel`.
    #[error("no share in progress")]
    NotOpen,

    /// Contact access was refused.
    #[error("contact access denied")]
    PermissionDenied,

    /// The chosen channel cannot be used on this device.
    #[error("channel unavailable: {0}")]
    ChannelUnavailable(&'static str),

    /// The todo could not be fetched.
    #[error("remote operation failed: {0}")]
    Remote(#[from] ApiError),

    /// The dispatcher ran but reported failure.
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_message_includes_status_and_body() {
        let err = ApiError::HttpError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn api_error_converts_into_form_error() {
        let err: FormError = ApiError::NotFound.into();
        assert!(matches!(err, FormError::Remote(ApiError::NotFound)));
    }
}
