//! In-memory `RemoteStore` for tests, demos and previews.
//!
//! Keeps todos in a `Vec`, records every operation in call order, and can be
//! told to fail a given operation so error paths can be driven without a
//! server.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::error::ApiError;
use crate::store::RemoteStore;
use crate::types::{NewTodo, TodoItem, TodoPatch};

/// Base for URLs handed out by `upload_asset`.
const ASSET_BASE: &str = "http://memory.local/assets";

/// One `RemoteStore` operation, as recorded in the call history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Create,
    Update,
    Delete,
    GetAll,
    GetById,
    UploadAsset,
}

#[derive(Debug, Default)]
struct Inner {
    todos: Vec<TodoItem>,
    history: Vec<StoreOp>,
    created: Vec<NewTodo>,
    patches: Vec<(Uuid, TodoPatch)>,
    uploads: Vec<String>,
    failing: HashSet<StoreOp>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_todos(todos: Vec<TodoItem>) -> Self {
        let store = Self::new();
        store.lock().todos = todos;
        store
    }

    /// Make every later call of `op` fail with a transport error.
    pub fn fail(&self, op: StoreOp) {
        self.lock().failing.insert(op);
    }

    pub fn recover(&self, op: StoreOp) {
        self.lock().failing.remove(&op);
    }

    /// Every operation attempted so far, failed ones included.
    pub fn history(&self) -> Vec<StoreOp> {
        self.lock().history.clone()
    }

    pub fn calls(&self, op: StoreOp) -> usize {
        self.lock().history.iter().filter(|o| **o == op).count()
    }

    /// Payloads of successful creates.
    pub fn created(&self) -> Vec<NewTodo> {
        self.lock().created.clone()
    }

    /// Patches of successful updates.
    pub fn patches(&self) -> Vec<(Uuid, TodoPatch)> {
        self.lock().patches.clone()
    }

    /// Local URIs of successful uploads.
    pub fn uploads(&self) -> Vec<String> {
        self.lock().uploads.clone()
    }

    pub fn snapshot(&self) -> Vec<TodoItem> {
        self.lock().todos.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `op` and fail it if it was marked failing.
    fn enter(&self, op: StoreOp) -> Result<MutexGuard<'_, Inner>, ApiError> {
        let mut inner = self.lock();
        inner.history.push(op);
        if inner.failing.contains(&op) {
            return Err(ApiError::Transport(format!("{op:?} failed (injected)")));
        }
        Ok(inner)
    }
}

impl RemoteStore for MemoryStore {
    fn create(&self, item: &NewTodo) -> Result<TodoItem, ApiError> {
        let mut inner = self.enter(StoreOp::Create)?;
        let todo = TodoItem {
            id: Uuid::new_v4(),
            title: item.title.clone(),
            description: Some(item.description.clone()).filter(|d| !d.is_empty()),
            is_completed: item.is_completed,
            created_at: item.created_at,
            image_uri: Some(item.image_uri.clone()).filter(|u| !u.is_empty()),
            location: None,
        };
        inner.created.push(item.clone());
        inner.todos.push(todo.clone());
        Ok(todo)
    }

    fn update(&self, id: Uuid, patch: &TodoPatch) -> Result<TodoItem, ApiError> {
        let mut inner = self.enter(StoreOp::Update)?;
        let todo = inner
            .todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ApiError::NotFound)?;
        if let Some(title) = &patch.title {
            todo.title = title.clone();
        }
        if let Some(description) = &patch.description {
            todo.description = Some(description.clone()).filter(|d| !d.is_empty());
        }
        if let Some(done) = patch.is_completed {
            todo.is_completed = done;
        }
        if let Some(uri) = &patch.image_uri {
            todo.image_uri = Some(uri.clone()).filter(|u| !u.is_empty());
        }
        let updated = todo.clone();
        inner.patches.push((id, patch.clone()));
        Ok(updated)
    }

    fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let mut inner = self.enter(StoreOp::Delete)?;
        let before = inner.todos.len();
        inner.todos.retain(|t| t.id != id);
        if inner.todos.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<TodoItem>, ApiError> {
        let inner = self.enter(StoreOp::GetAll)?;
        let mut todos = inner.todos.clone();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    fn get_by_id(&self, id: Uuid) -> Result<TodoItem, ApiError> {
        let inner = self.enter(StoreOp::GetById)?;
        inner
            .todos
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    fn upload_asset(&self, local_uri: &str) -> Result<String, ApiError> {
        let mut inner = self.enter(StoreOp::UploadAsset)?;
        inner.uploads.push(local_uri.to_string());
        let name = local_uri.rsplit('/').next().unwrap_or("asset");
        Ok(format!("{ASSET_BASE}/{}/{name}", inner.uploads.len()))
    }
}
