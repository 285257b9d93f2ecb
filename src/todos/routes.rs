//! REST endpoints for todos and departments.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use super::model::{NewTodo, TodoUpdate};
use super::store::TodoStore;
use crate::error::ApiResult;

/// Shared state for todo routes.
#[derive(Clone)]
pub struct TodoRouteState {
    pub store: Arc<TodoStore>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    department: Option<String>,
}

/// GET /api/departments
async fn list_departments(State(state): State<TodoRouteState>) -> ApiResult<Json<Value>> {
    let departments = state.store.departments().await?;
    Ok(Json(json!({ "departments": departments })))
}

/// GET /api/todos?department=<name>
async fn list_todos(
    State(state): State<TodoRouteState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let todos = state.store.list(query.department.as_deref()).await?;
    Ok(Json(json!({ "todos": todos })))
}

/// POST /api/todos
async fn create_todo(
    State(state): State<TodoRouteState>,
    body: Result<Json<NewTodo>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(new) = body?;
    let todo = state.store.create(new).await?;
    Ok(Json(json!({
        "message": "Todo created successfully",
        "todo": todo,
    })))
}

/// GET /api/todos/{id}
///
/// Returns `{todo}`, or 404 `{"detail": "Todo not found"}`.
async fn get_todo(
    State(state): State<TodoRouteState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    let todo = state.store.get(id).await?;
    Ok(Json(json!({ "todo": todo })))
}

/// PUT /api/todos/{id}
async fn update_todo(
    State(state): State<TodoRouteState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<TodoUpdate>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    let Json(update) = body?;
    let todo = state.store.update(id, update).await?;
    Ok(Json(json!({
        "message": "Todo updated successfully",
        "todo": todo,
    })))
}

/// DELETE /api/todos/{id}
async fn delete_todo(
    State(state): State<TodoRouteState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    let todo = state.store.delete(id).await?;
    Ok(Json(json!({
        "message": "Todo deleted successfully",
        "todo": todo,
    })))
}

/// Build the todo REST routes.
pub fn todo_routes(state: TodoRouteState) -> Router {
    Router::new()
        .route("/api/departments", get(list_departments))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(state)
}
