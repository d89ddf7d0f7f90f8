use axum::{extract::{rejection::JsonRejection, Path, State}, routing::get, Router, Json};
use axum::http::StatusCode;

use crate::{
    application::todo_service::TodoService,
    domain::todo::{Todo, TodoId, TodoPatch},
    http::types::ApiError,
};

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

pub fn router<S: TodoService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/todos", get(list_todos::<S>).post(create_todo::<S>))
        .route("/todos/:id", get(get_todo::<S>).patch(update_todo::<S>).delete(delete_todo::<S>))
        .with_state(state)
}

async fn list_todos<S: TodoService + Clone>(State(state): State<AppState<S>>) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(state.service.list().await?))
}

async fn get_todo<S: TodoService + Clone>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.get(id).await?))
}

async fn create_todo<S: TodoService + Clone>(State(state): State<AppState<S>>, payload: Result<Json<Todo>, JsonRejection>) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(todo) = payload.map_err(bad_body)?;
    let created = state.service.create(todo).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_todo<S: TodoService + Clone>(State(state): State<AppState<S>>, Path(id): Path<String>, payload: Result<Json<TodoPatch>, JsonRejection>) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    let Json(patch) = payload.map_err(bad_body)?;
    Ok(Json(state.service.update(id, patch).await?))
}

async fn delete_todo<S: TodoService + Clone>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;
    Ok(StatusCode::OK)
}

fn parse_id(s: &str) -> Result<TodoId, ApiError> { s.parse::<i64>().map(TodoId).map_err(|_| ApiError::bad_request("invalid id")) }

fn bad_body(rejection: JsonRejection) -> ApiError { ApiError::bad_request(rejection.body_text()) }
