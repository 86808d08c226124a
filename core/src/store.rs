//! The remote store seam and its HTTP implementation.
//!
//! # Design
//! View-models never talk to HTTP directly. They receive a `RemoteStore` at
//! construction and call it synchronously; every call is one atomic document
//! operation on the other side. `HttpStore` is the production
//! implementation: it pairs the stateless `TodoClient` with a `Transport`
//! that performs the round-trip. `MemoryStore` (see `memory`) stands in for
//! tests and demos.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;
use uuid::Uuid;

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::Transport;
use crate::types::{AssetUpload, NewTodo, TodoItem, TodoPatch};

/// Document CRUD plus blob upload, as consumed by the view-models.
pub trait RemoteStore {
    /// Persist a new todo. The store assigns the id.
    fn create(&self, item: &NewTodo) -> Result<TodoItem, ApiError>;

    /// Apply the present fields of `patch` to the todo `id`.
    fn update(&self, id: Uuid, patch: &TodoPatch) -> Result<TodoItem, ApiError>;

    fn delete(&self, id: Uuid) -> Result<(), ApiError>;

    /// All todos, newest `created_at` first.
    fn get_all(&self) -> Result<Vec<TodoItem>, ApiError>;

    fn get_by_id(&self, id: Uuid) -> Result<TodoItem, ApiError>;

    /// Upload the file behind `local_uri` and return its remote URL.
    fn upload_asset(&self, local_uri: &str) -> Result<String, ApiError>;
}

impl<S: RemoteStore + ?Sized> RemoteStore for &S {
    fn create(&self, item: &NewTodo) -> Result<TodoItem, ApiError> {
        (**self).create(item)
    }

    fn update(&self, id: Uuid, patch: &TodoPatch) -> Result<TodoItem, ApiError> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        (**self).delete(id)
    }

    fn get_all(&self) -> Result<Vec<TodoItem>, ApiError> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: Uuid) -> Result<TodoItem, ApiError> {
        (**self).get_by_id(id)
    }

    fn upload_asset(&self, local_uri: &str) -> Result<String, ApiError> {
        (**self).upload_asset(local_uri)
    }
}

/// `RemoteStore` over the JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpStore<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> HttpStore<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }
}

impl<T: Transport> RemoteStore for HttpStore<T> {
    fn create(&self, item: &NewTodo) -> Result<TodoItem, ApiError> {
        let req = self.client.build_create_todo(item)?;
        self.client.parse_create_todo(self.transport.execute(req)?)
    }

    fn update(&self, id: Uuid, patch: &TodoPatch) -> Result<TodoItem, ApiError> {
        let req = self.client.build_update_todo(id, patch)?;
        self.client.parse_update_todo(self.transport.execute(req)?)
    }

    fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let req = self.client.build_delete_todo(id);
        self.client.parse_delete_todo(self.transport.execute(req)?)
    }

    fn get_all(&self) -> Result<Vec<TodoItem>, ApiError> {
        let req = self.client.build_list_todos();
        self.client.parse_list_todos(self.transport.execute(req)?)
    }

    fn get_by_id(&self, id: Uuid) -> Result<TodoItem, ApiError> {
        let req = self.client.build_get_todo(id);
        self.client.parse_get_todo(self.transport.execute(req)?)
    }

    fn upload_asset(&self, local_uri: &str) -> Result<String, ApiError> {
        let upload = read_asset(local_uri)?;
        debug!(file_name = %upload.file_name, "uploading asset");
        let req = self.client.build_upload_asset(&upload)?;
        self.client.parse_upload_asset(self.transport.execute(req)?)
    }
}

/// Load a device file (plain path or `file://` URI) into an upload payload
/// named after its last path segment.
pub fn read_asset(local_uri: &str) -> Result<AssetUpload, ApiError> {
    let path = local_uri.strip_prefix("file://").unwrap_or(local_uri);
    let bytes = std::fs::read(path).map_err(|e| ApiError::Asset {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    let file_name = match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "asset".to_string(),
    };
    Ok(AssetUpload {
        file_name,
        content_base64: STANDARD.encode(bytes),
    })
}
