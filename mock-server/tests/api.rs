use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, router, AppState, AssetCreated, Todo};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn create_body(title: &str, created_at: &str) -> String {
    format!(r#"{{"title":"{title}","createdAt":"{created_at}"}}"#)
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let resp = app().oneshot(get("/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn list_todos_newest_first() {
    let app = app();
    for (title, at) in [
        ("first", "2024-05-01T10:00:00Z"),
        ("third", "2024-05-03T10:00:00Z"),
        ("second", "2024-05-02T10:00:00Z"),
    ] {
        let resp = app
            .clone()
            .oneshot(json_request("POST", "/todos", &create_body(title, at)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = app.oneshot(get("/todos")).await.unwrap();
    let todos: Vec<Todo> = body_json(resp).await;
    let titles: Vec<_> = todos.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["third", "second", "first"]);
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/todos",
            r#"{"title":"Buy milk","description":"","imageUri":"","isCompleted":false,"createdAt":"2024-05-01T10:00:00Z"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.title, "Buy milk");
    assert!(!todo.is_completed);
    assert!(todo.image_uri.is_empty());
}

#[tokio::test]
async fn create_todo_blank_title_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", &create_body("  ", "2024-05-01T10:00:00Z")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_todo_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"not_title":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- get ---

#[tokio::test]
async fn get_todo_not_found() {
    let resp = app()
        .oneshot(get("/todos/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_todo_bad_uuid_returns_400() {
    let resp = app().oneshot(get("/todos/not-a-uuid")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update / delete ---

#[tokio::test]
async fn update_todo_not_found() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/todos/00000000-0000-0000-0000-000000000000",
            r#"{"title":"Nope"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_todo_not_found() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/todos/00000000-0000-0000-0000-000000000000")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- assets ---

#[tokio::test]
async fn uploaded_asset_is_served_back() {
    let app = router(AppState::new("http://files.test/"));
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/assets",
            r#"{"fileName":"photo.jpg","contentBase64":"aGVsbG8="}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: AssetCreated = body_json(resp).await;
    assert!(created.url.starts_with("http://files.test/assets/"));
    assert!(created.url.ends_with("/photo.jpg"));

    let path = created.url.trim_start_matches("http://files.test");
    let resp = app.oneshot(get(path)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"hello");
}

#[tokio::test]
async fn upload_rejects_bad_base64() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/assets",
            r#"{"fileName":"photo.jpg","contentBase64":"***"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/todos",
            &create_body("Walk dog", "2024-05-01T10:00:00Z"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Todo = body_json(resp).await;
    let id = created.id;

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Todo = body_json(resp).await;
    assert_eq!(fetched.title, "Walk dog");

    // update: only completion
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/todos/{id}"),
            r#"{"isCompleted":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk dog"); // unchanged
    assert!(updated.is_completed);
    assert_eq!(updated.created_at, created.created_at);

    // update: full field set as the edit form sends it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/todos/{id}"),
            r#"{"title":"Walk cat","description":"evening","isCompleted":false,"imageUri":"http://cdn/cat.jpg"}"#,
        ))
        .await
        .unwrap();
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk cat");
    assert_eq!(updated.image_uri, "http://cdn/cat.jpg");
    assert!(!updated.is_completed);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/todos/{id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
