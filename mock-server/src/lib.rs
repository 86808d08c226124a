use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub image_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub image_uri: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
    pub image_uri: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadAsset {
    pub file_name: String,
    pub content_base64: String,
}

#[derive(Serialize, Deserialize)]
pub struct AssetCreated {
    pub url: String,
}

struct StoredAsset {
    file_name: String,
    bytes: Vec<u8>,
}

/// Listener settings read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Base of the URLs handed out for uploaded assets.
    pub public_url: String,
}

impl ServerConfig {
    pub const DEFAULT_PORT: u16 = 3000;

    /// `PORT` (default 3000) and `PUBLIC_URL` (default `http://127.0.0.1:<port>`).
    pub fn from_env() -> Self {
        Self::from_vars(std::env::var("PORT").ok(), std::env::var("PUBLIC_URL").ok())
    }

    fn from_vars(port: Option<String>, public_url: Option<String>) -> Self {
        let port = port
            .and_then(|p| p.parse().ok())
            .unwrap_or(Self::DEFAULT_PORT);
        let public_url = public_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("http://127.0.0.1:{port}"));
        Self {
            port,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}

#[derive(Clone)]
pub struct AppState {
    todos: Arc<RwLock<HashMap<Uuid, Todo>>>,
    assets: Arc<RwLock<HashMap<Uuid, StoredAsset>>>,
    public_url: Arc<str>,
}

impl AppState {
    pub fn new(public_url: &str) -> Self {
        Self {
            todos: Arc::default(),
            assets: Arc::default(),
            public_url: Arc::from(public_url.trim_end_matches('/')),
        }
    }
}

pub fn app() -> Router {
    router(AppState::new("http://127.0.0.1:3000"))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/assets", post(upload_asset))
        .route("/assets/{id}/{name}", get(download_asset))
        .with_state(state)
}

/// Serve on `listener`, handing out asset URLs rooted at its local address.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let public_url = format!("http://{}", listener.local_addr()?);
    serve(listener, &public_url).await
}

pub async fn serve(listener: TcpListener, public_url: &str) -> Result<(), std::io::Error> {
    info!(addr = %listener.local_addr()?, public_url, "mock store listening");
    axum::serve(listener, router(AppState::new(public_url))).await
}

async fn list_todos(State(state): State<AppState>) -> Json<Vec<Todo>> {
    let todos = state.todos.read().await;
    let mut all: Vec<Todo> = todos.values().cloned().collect();
    all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(all)
}

async fn create_todo(
    State(state): State<AppState>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), StatusCode> {
    if input.title.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let todo = Todo {
        id: Uuid::new_v4(),
        title: input.title,
        description: input.description,
        is_completed: input.is_completed,
        created_at: input.created_at,
        image_uri: input.image_uri,
        location: None,
    };
    state.todos.write().await.insert(todo.id, todo.clone());
    info!(id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Todo>, StatusCode> {
    let todos = state.todos.read().await;
    todos.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, StatusCode> {
    let mut todos = state.todos.write().await;
    let todo = todos.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = input.title {
        if title.trim().is_empty() {
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
        todo.title = title;
    }
    if let Some(description) = input.description {
        todo.description = description;
    }
    if let Some(done) = input.is_completed {
        todo.is_completed = done;
    }
    if let Some(uri) = input.image_uri {
        todo.image_uri = uri;
    }
    debug!(%id, "todo updated");
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let mut todos = state.todos.write().await;
    let removed = todos.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    info!(id = %removed.id, "todo deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_asset(
    State(state): State<AppState>,
    Json(input): Json<UploadAsset>,
) -> Result<(StatusCode, Json<AssetCreated>), StatusCode> {
    let bytes = STANDARD
        .decode(input.content_base64.as_bytes())
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    let file_name = match input.file_name.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "asset".to_string(),
    };
    let id = Uuid::new_v4();
    let url = format!("{}/assets/{id}/{file_name}", state.public_url);
    info!(%id, size = bytes.len(), "asset stored");
    state
        .assets
        .write()
        .await
        .insert(id, StoredAsset { file_name, bytes });
    Ok((StatusCode::CREATED, Json(AssetCreated { url })))
}

async fn download_asset(
    State(state): State<AppState>,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, StatusCode> {
    let assets = state.assets.read().await;
    let asset = assets
        .get(&id)
        .filter(|a| a.file_name == name)
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        asset.bytes.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_camel_case() {
        let todo = Todo {
            id: Uuid::nil(),
            title: "Test".to_string(),
            description: String::new(),
            is_completed: false,
            created_at: "2024-05-01T10:00:00Z".parse().unwrap(),
            image_uri: String::new(),
            location: None,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["isCompleted"], false);
        assert_eq!(json["createdAt"], "2024-05-01T10:00:00Z");
        assert!(json.get("location").is_none());
    }

    #[test]
    fn create_todo_defaults_optional_fields() {
        let input: CreateTodo =
            serde_json::from_str(r#"{"title":"Bare","createdAt":"2024-05-01T10:00:00Z"}"#).unwrap();
        assert_eq!(input.title, "Bare");
        assert!(!input.is_completed);
        assert!(input.image_uri.is_empty());
        assert!(input.description.is_empty());
    }

    #[test]
    fn create_todo_rejects_missing_created_at() {
        let result: Result<CreateTodo, _> = serde_json::from_str(r#"{"title":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_todo_all_fields_optional() {
        let input: UpdateTodo = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.title.is_none());
        assert!(input.is_completed.is_none());
        assert!(input.image_uri.is_none());
    }

    #[test]
    fn config_defaults() {
        let config = ServerConfig::from_vars(None, None);
        assert_eq!(config.port, 3000);
        assert_eq!(config.public_url, "http://127.0.0.1:3000");
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn config_reads_overrides() {
        let config = ServerConfig::from_vars(
            Some("8080".to_string()),
            Some("https://store.example/".to_string()),
        );
        assert_eq!(config.port, 8080);
        assert_eq!(config.public_url, "https://store.example");
    }

    #[test]
    fn config_ignores_bad_port() {
        let config = ServerConfig::from_vars(Some("nope".to_string()), None);
        assert_eq!(config.port, ServerConfig::DEFAULT_PORT);
    }
}
