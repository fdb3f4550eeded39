use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    db::entities::todo::{self, Priority},
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    routes::API_PREFIX,
    services::{
        ServiceContext,
        todo_service::{self, NewTodo, TodoChanges, TodoCounts},
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub cancelled: bool,
}

/// Absent keys are left alone; an explicit `null` clears `description` or
/// `due_date`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<String>>,
    pub priority: Option<String>,
    pub completed: Option<bool>,
    pub cancelled: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TodoResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub priority_label: &'static str,
    pub completed: bool,
    pub cancelled: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: i32,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/todos", get(list_active).post(create_todo))
        .route("/todos/resolved", get(list_resolved))
        .route("/todos/cancelled", get(list_cancelled))
        .route("/todos/expired", get(list_expired))
        .route("/todos/priority/{code}", get(list_by_priority))
        .route("/todos/counts", get(counts))
        .route(
            "/todos/{id}",
            get(get_todo)
                .put(update_todo)
                .patch(update_todo)
                .delete(delete_todo),
        )
        .route("/todos/{id}/resolve", post(toggle_resolved))
        .route("/todos/{id}/cancel", post(toggle_cancelled))
        .with_state(state)
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTodoRequest>,
) -> ApiResult<TodoResponse> {
    let due_date = match body.due_date.as_deref() {
        Some(raw) => todo_service::parse_due_date(raw)?,
        None => None,
    };
    let priority = body
        .priority
        .as_deref()
        .map(todo_service::parse_priority)
        .transpose()?
        .unwrap_or_default();

    let service = todo_service_from_state(state.as_ref());
    let todo = service
        .create(NewTodo {
            title: body.title,
            description: body.description,
            due_date,
            priority,
            completed: body.completed,
            cancelled: body.cancelled,
        })
        .await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "created", todo.into())
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<TodoResponse> {
    let service = todo_service_from_state(state.as_ref());
    JsonApiResponse::ok(service.get(id).await?.into())
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateTodoRequest>,
) -> ApiResult<TodoResponse> {
    let changes = body.into_changes()?;
    let service = todo_service_from_state(state.as_ref());
    JsonApiResponse::ok(service.update(id, changes).await?.into())
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<DeletedResponse> {
    let service = todo_service_from_state(state.as_ref());
    service.delete(id).await?;
    JsonApiResponse::with_status(StatusCode::OK, "deleted", DeletedResponse { id })
}

async fn toggle_resolved(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let service = todo_service_from_state(state.as_ref());
    service.toggle_resolved(id).await?;
    Ok(Redirect::to(&active_list_path()))
}

async fn toggle_cancelled(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let service = todo_service_from_state(state.as_ref());
    service.toggle_cancelled(id).await?;
    Ok(Redirect::to(&active_list_path()))
}

async fn list_active(State(state): State<Arc<AppState>>) -> ApiResult<Vec<TodoResponse>> {
    let service = todo_service_from_state(state.as_ref());
    respond_list(service.list_active(today()).await?)
}

async fn list_resolved(State(state): State<Arc<AppState>>) -> ApiResult<Vec<TodoResponse>> {
    let service = todo_service_from_state(state.as_ref());
    respond_list(service.list_resolved().await?)
}

async fn list_cancelled(State(state): State<Arc<AppState>>) -> ApiResult<Vec<TodoResponse>> {
    let service = todo_service_from_state(state.as_ref());
    respond_list(service.list_cancelled().await?)
}

async fn list_expired(State(state): State<Arc<AppState>>) -> ApiResult<Vec<TodoResponse>> {
    let service = todo_service_from_state(state.as_ref());
    respond_list(service.list_expired(today()).await?)
}

async fn list_by_priority(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> ApiResult<Vec<TodoResponse>> {
    let priority = todo_service::parse_priority(&code)?;
    let service = todo_service_from_state(state.as_ref());
    respond_list(service.list_by_priority(priority).await?)
}

async fn counts(State(state): State<Arc<AppState>>) -> ApiResult<TodoCounts> {
    let service = todo_service_from_state(state.as_ref());
    JsonApiResponse::ok(service.counts(today()).await?)
}

impl UpdateTodoRequest {
    fn into_changes(self) -> Result<TodoChanges, AppError> {
        let due_date = match self.due_date {
            Some(Some(raw)) => Some(todo_service::parse_due_date(&raw)?),
            Some(None) => Some(None),
            None => None,
        };
        let priority = self
            .priority
            .as_deref()
            .map(todo_service::parse_priority)
            .transpose()?;

        Ok(TodoChanges {
            title: self.title,
            description: self.description,
            due_date,
            priority,
            completed: self.completed,
            cancelled: self.cancelled,
        })
    }
}

impl From<todo::Model> for TodoResponse {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            due_date: model.due_date,
            priority: model.priority,
            priority_label: model.priority.label(),
            completed: model.completed,
            cancelled: model.cancelled,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn respond_list(todos: Vec<todo::Model>) -> ApiResult<Vec<TodoResponse>> {
    JsonApiResponse::ok(todos.into_iter().map(TodoResponse::from).collect())
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn active_list_path() -> String {
    format!("{API_PREFIX}/todos")
}

fn todo_service_from_state(state: &AppState) -> todo_service::TodoService {
    ServiceContext::from_state(state).todo()
}
