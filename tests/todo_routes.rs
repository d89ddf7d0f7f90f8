use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use todo_api::application::todo_service::TodoServiceImpl;
use todo_api::domain::repository::TodoRepository;
use todo_api::domain::todo::{Todo, TodoId, TodoPatch};
use todo_api::http::routing::{self, todos};
use tower::ServiceExt;

/// Store double: answers with canned records and records what it was asked to do.
#[derive(Clone, Default)]
struct StubRepo {
    all: Vec<Todo>,
    by_id: HashMap<TodoId, Todo>,
    added: Arc<Mutex<Vec<Todo>>>,
    deleted: Arc<Mutex<Vec<TodoId>>>,
    offline: bool,
}

impl StubRepo {
    fn when_get_all(mut self, todos: Vec<Todo>) -> Self { self.all = todos; self }
    fn when_find_by_id(mut self, todo: Todo) -> Self { self.by_id.insert(todo.id, todo); self }
    fn offline(mut self) -> Self { self.offline = true; self }
}

#[async_trait]
impl TodoRepository for StubRepo {
    async fn init(&self) -> Result<()> { Ok(()) }
    async fn get_all(&self) -> Result<Vec<Todo>> {
        if self.offline { anyhow::bail!("database is locked"); }
        Ok(self.all.clone())
    }
    async fn find_by_id(&self, id: TodoId) -> Result<Option<Todo>> {
        if self.offline { anyhow::bail!("database is locked"); }
        Ok(self.by_id.get(&id).cloned())
    }
    async fn add(&self, todo: Todo) -> Result<bool> {
        if self.offline { anyhow::bail!("database is locked"); }
        self.added.lock().unwrap().push(todo);
        Ok(true)
    }
    async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Option<Todo>> {
        Ok(self.by_id.get(&id).cloned().map(|mut t| { t.apply(patch); t }))
    }
    async fn delete_by_id(&self, id: TodoId) -> Result<bool> { self.deleted.lock().unwrap().push(id); Ok(true) }
}

fn app(repo: StubRepo) -> Router {
    routing::app(todos::router(todos::AppState { service: TodoServiceImpl::new(repo) }))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
    let req = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => req.header("content-type", "application/json").body(Body::from(b.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    (status, to_bytes(res.into_body(), 1024 * 1024).await.unwrap().to_vec())
}

fn json_of(bytes: &[u8]) -> Value { serde_json::from_slice(bytes).unwrap() }

#[tokio::test]
async fn should_get_all_todos() {
    let repo = StubRepo::default().when_get_all(vec![Todo::new(1, "Sample Test", false, 5)]);

    let (status, body) = send(app(repo), Method::GET, "/todos", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = json_of(&body);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], 1);
    assert_eq!(body[0]["title"], "Sample Test");
    assert_eq!(body[0]["completed"], false);
    assert_eq!(body[0]["order"], 5);
}

#[tokio::test]
async fn should_get_empty_list() {
    let (status, body) = send(app(StubRepo::default()), Method::GET, "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!([]));
}

#[tokio::test]
async fn should_get_todo_by_id() {
    let repo = StubRepo::default()
        .when_find_by_id(Todo::new(1, "Sample Test", false, 5))
        .when_find_by_id(Todo::new(2, "New Sample Test", false, 6));

    let (status, body) = send(app(repo), Method::GET, "/todos/2", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!({ "id": 2, "title": "New Sample Test", "completed": false, "order": 6 }));
}

#[tokio::test]
async fn should_save_todo() {
    let repo = StubRepo::default();
    let added = repo.added.clone();

    let (status, body) = send(app(repo), Method::POST, "/todos", Some(r#"{"id":1,"title":"Sample Test","completed":false,"order":5}"#)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json_of(&body), json!({ "id": 1, "title": "Sample Test", "completed": false, "order": 5 }));
    assert_eq!(*added.lock().unwrap(), vec![Todo::new(1, "Sample Test", false, 5)]);
}

#[tokio::test]
async fn should_delete_todo() {
    let repo = StubRepo::default().when_find_by_id(Todo::new(1, "Sample Test", false, 5));
    let deleted = repo.deleted.clone();

    let (status, body) = send(app(repo), Method::DELETE, "/todos/1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(*deleted.lock().unwrap(), vec![TodoId(1)]);
}

#[tokio::test]
async fn should_patch_only_supplied_fields() {
    let repo = StubRepo::default().when_find_by_id(Todo::new(1, "Sample Test", false, 5));

    let (status, body) = send(app(repo), Method::PATCH, "/todos/1", Some(r#"{"title":"Renamed"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!({ "id": 1, "title": "Renamed", "completed": false, "order": 5 }));
}

#[tokio::test]
async fn missing_todo_is_404() {
    for method in [Method::GET, Method::DELETE] {
        let repo = StubRepo::default();
        let deleted = repo.deleted.clone();
        let (status, body) = send(app(repo), method, "/todos/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_of(&body)["message"], "todo 42 not found");
        assert!(deleted.lock().unwrap().is_empty());
    }

    let (status, _) = send(app(StubRepo::default()), Method::PATCH, "/todos/42", Some("{}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_id_is_400() {
    let (status, body) = send(app(StubRepo::default()), Method::GET, "/todos/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_of(&body)["message"], "invalid id");
}

#[tokio::test]
async fn malformed_body_is_400() {
    let repo = StubRepo::default();
    let added = repo.added.clone();

    let (status, body) = send(app(repo.clone()), Method::POST, "/todos", Some(r#"{"id":1,"title":"x"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_of(&body)["message"].is_string());

    let (status, _) = send(app(repo), Method::POST, "/todos", Some("not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(added.lock().unwrap().is_empty());
}

#[tokio::test]
async fn store_failure_is_500() {
    let (status, body) = send(app(StubRepo::default().offline()), Method::GET, "/todos", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_of(&body)["message"], "database is locked");

    let (status, body) = send(app(StubRepo::default().offline()), Method::POST, "/todos", Some(r#"{"id":1,"title":"x","completed":false,"order":1}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_of(&body)["message"].is_string());

    let (status, _) = send(app(StubRepo::default().offline()), Method::DELETE, "/todos/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
