//! Domain DTOs for the todo store.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch any drift between the two crates. Field names are
//! camelCase on the wire (`isCompleted`, `createdAt`, `imageUri`).
//!
//! The store treats an empty `imageUri` as "no image", so `TodoItem` reads it
//! back as `None` while the write payloads always send a string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// URL schemes that mark an image reference as already uploaded.
pub const REMOTE_SCHEMES: [&str; 2] = ["http://", "https://"];

/// A single persisted todo as returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: Uuid,
    pub title: String,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    /// Only ever read as a flag by the edit form.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Payload for creating a todo. The store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_uri: String,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial update for an existing todo. Only the fields present in the JSON
/// are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
}

/// Request payload for `POST /assets`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpload {
    pub file_name: String,
    pub content_base64: String,
}

/// Response payload for `POST /assets`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedAsset {
    pub url: String,
}

/// Where an image reference currently points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRef<'a> {
    /// Already hosted by the store.
    Remote(&'a str),
    /// A device file that still has to be uploaded.
    Local(&'a str),
}

impl<'a> ImageRef<'a> {
    /// Classify a non-empty image reference. Empty strings mean "no image".
    pub fn classify(uri: &'a str) -> Option<Self> {
        if uri.is_empty() {
            None
        } else if REMOTE_SCHEMES.iter().any(|scheme| uri.starts_with(scheme)) {
            Some(ImageRef::Remote(uri))
        } else {
            Some(ImageRef::Local(uri))
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
