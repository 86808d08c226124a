//! Add/edit form state machine.
//!
//! `Idle → Editing → Submitting → Succeeded`, with any failure dropping back
//! to `Editing` and leaving a message in `error_message()`. The same type
//! backs both screens; `FormMode` decides whether submit creates or updates
//! and whether delete is available.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, FormError};
use crate::platform::Notifier;
use crate::store::RemoteStore;
use crate::types::{ImageRef, NewTodo, TodoItem, TodoPatch};

pub const ADD_VALIDATION: &str = "Please enter a complete title and description.";
pub const EDIT_VALIDATION: &str = "Please enter a complete title.";
pub const ADD_SUCCEEDED: &str = "Add todo successfully";
pub const ADD_FAILED: &str = "Add todo failed";
pub const UPDATE_SUCCEEDED: &str = "Todo updated successfully";
pub const UPDATE_FAILED: &str = "Failed to update todo";
pub const DELETE_SUCCEEDED: &str = "Todo deleted successfully";
pub const DELETE_FAILED: &str = "Failed to delete todo";
pub const FETCH_FAILED: &str = "Failed to fetch todo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Editing,
    Submitting,
    /// The host should navigate back to the list.
    Succeeded,
}

/// One edit to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Title(String),
    Description(String),
    /// Remote URL or local file reference; `None` clears the image.
    Image(Option<String>),
    Completed(bool),
    /// Display-only toggle; never persisted.
    ShareLocation(bool),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub title: String,
    pub description: String,
    pub image_uri: Option<String>,
    pub is_completed: bool,
    pub share_location: bool,
}

impl FormFields {
    fn from_todo(todo: &TodoItem) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
            image_uri: todo.image_uri.clone(),
            is_completed: todo.is_completed,
            share_location: todo.location.is_some(),
        }
    }
}

pub struct FormViewModel<S, N> {
    store: S,
    notifier: N,
    mode: FormMode,
    fields: FormFields,
    phase: FormPhase,
    error: Option<String>,
}

impl<S: RemoteStore, N: Notifier> FormViewModel<S, N> {
    /// Empty form for the add screen.
    pub fn create(store: S, notifier: N) -> Self {
        Self::with_mode(store, notifier, FormMode::Create)
    }

    /// Form for the edit screen. Call `load` before showing it.
    pub fn edit(store: S, notifier: N, id: Uuid) -> Self {
        Self::with_mode(store, notifier, FormMode::Edit(id))
    }

    fn with_mode(store: S, notifier: N, mode: FormMode) -> Self {
        Self {
            store,
            notifier,
            mode,
            fields: FormFields::default(),
            phase: FormPhase::Idle,
            error: None,
        }
    }

    /// Populate the fields from the stored todo.
    ///
    /// On failure the user is notified and the host is expected to navigate
    /// back.
    pub fn load(&mut self) -> Result<(), FormError> {
        let FormMode::Edit(id) = self.mode else {
            return Err(FormError::NotPersisted);
        };
        match self.store.get_by_id(id) {
            Ok(todo) => {
                self.fields = FormFields::from_todo(&todo);
                self.phase = FormPhase::Editing;
                self.error = None;
                debug!(%id, "edit form loaded");
                Ok(())
            }
            Err(err) => {
                warn!(%id, error = %err, "failed to load todo");
                self.notifier.notify(FETCH_FAILED);
                Err(err.into())
            }
        }
    }

    pub fn set_field(&mut self, field: FormField) {
        let touches_text = matches!(field, FormField::Title(_) | FormField::Description(_));
        match field {
            FormField::Title(title) => self.fields.title = title,
            FormField::Description(description) => self.fields.description = description,
            FormField::Image(uri) => self.fields.image_uri = uri.filter(|u| !u.is_empty()),
            FormField::Completed(done) => self.fields.is_completed = done,
            FormField::ShareLocation(on) => self.fields.share_location = on,
        }
        if touches_text && (!self.fields.title.is_empty() || !self.fields.description.is_empty()) {
            self.error = None;
        }
        if self.phase != FormPhase::Submitting {
            self.phase = FormPhase::Editing;
        }
    }

    /// Validate, upload a pending local image, then create or update.
    ///
    /// Returns the todo as the store saved it. Nothing is written when
    /// validation or the upload fails.
    pub fn submit(&mut self) -> Result<TodoItem, FormError> {
        self.ensure_open()?;
        if self.fields.title.trim().is_empty() {
            let message = self.validation_message();
            debug!(mode = ?self.mode, "submit rejected: empty title");
            self.error = Some(message.to_string());
            self.phase = FormPhase::Editing;
            return Err(FormError::Validation(message));
        }

        self.error = None;
        self.phase = FormPhase::Submitting;
        match self.persist() {
            Ok(todo) => {
                info!(id = %todo.id, mode = ?self.mode, "todo saved");
                self.phase = FormPhase::Succeeded;
                self.notifier.notify(self.success_message());
                Ok(todo)
            }
            Err(err) => {
                warn!(mode = ?self.mode, error = %err, "saving todo failed");
                let message = self.failure_message();
                self.error = Some(message.to_string());
                self.phase = FormPhase::Editing;
                self.notifier.notify(message);
                Err(err.into())
            }
        }
    }

    /// Delete the todo being edited.
    pub fn delete(&mut self) -> Result<(), FormError> {
        let FormMode::Edit(id) = self.mode else {
            return Err(FormError::NotPersisted);
        };
        self.ensure_open()?;

        self.phase = FormPhase::Submitting;
        match self.store.delete(id) {
            Ok(()) => {
                info!(%id, "todo deleted");
                self.phase = FormPhase::Succeeded;
                self.notifier.notify(DELETE_SUCCEEDED);
                Ok(())
            }
            Err(err) => {
                warn!(%id, error = %err, "deleting todo failed");
                self.phase = FormPhase::Editing;
                self.notifier.notify(DELETE_FAILED);
                Err(err.into())
            }
        }
    }

    /// `Succeeded` is terminal; only an idle or editing form accepts work.
    fn ensure_open(&self) -> Result<(), FormError> {
        match self.phase {
            FormPhase::Submitting => Err(FormError::InFlight),
            FormPhase::Succeeded => Err(FormError::Finished),
            FormPhase::Idle | FormPhase::Editing => Ok(()),
        }
    }

    fn persist(&self) -> Result<TodoItem, ApiError> {
        let image_uri = match self.fields.image_uri.as_deref().and_then(ImageRef::classify) {
            None => String::new(),
            Some(ImageRef::Remote(url)) => url.to_string(),
            Some(ImageRef::Local(path)) => self.store.upload_asset(path)?,
        };
        match self.mode {
            FormMode::Create => self.store.create(&NewTodo {
                title: self.fields.title.clone(),
                description: self.fields.description.clone(),
                image_uri,
                is_completed: self.fields.is_completed,
                created_at: Utc::now(),
            }),
            FormMode::Edit(id) => self.store.update(
                id,
                &TodoPatch {
                    title: Some(self.fields.title.clone()),
                    description: Some(self.fields.description.clone()),
                    is_completed: Some(self.fields.is_completed),
                    image_uri: Some(image_uri),
                },
            ),
        }
    }

    fn validation_message(&self) -> &'static str {
        match self.mode {
            FormMode::Create => ADD_VALIDATION,
            FormMode::Edit(_) => EDIT_VALIDATION,
        }
    }

    fn success_message(&self) -> &'static str {
        match self.mode {
            FormMode::Create => ADD_SUCCEEDED,
            FormMode::Edit(_) => UPDATE_SUCCEEDED,
        }
    }

    fn failure_message(&self) -> &'static str {
        match self.mode {
            FormMode::Create => ADD_FAILED,
            FormMode::Edit(_) => UPDATE_FAILED,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }
}
