use chrono::NaiveDate;
use sea_orm::Set;
use serde::Serialize;

use crate::{
    db::dao::{TodoBucket, TodoDao, TodoFlag},
    db::entities::todo::{self, Priority, TITLE_MAX_CHARS},
    error::AppError,
    services::crud_service::{CrudErrors, CrudService},
};

/// Input for [`TodoService::create`]. Unset fields take the model defaults.
#[derive(Debug, Clone, Default)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub completed: bool,
    pub cancelled: bool,
}

impl NewTodo {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update. `None` leaves a field untouched; for the nullable fields
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub cancelled: Option<bool>,
}

impl TodoChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
            && self.cancelled.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TodoCounts {
    pub active: u64,
    pub resolved: u64,
    pub cancelled: u64,
    pub expired: u64,
}

#[derive(Clone)]
pub struct TodoService {
    todo_dao: TodoDao,
}

impl TodoService {
    pub fn new(todo_dao: TodoDao) -> Self {
        Self { todo_dao }
    }

    pub async fn create(&self, input: NewTodo) -> Result<todo::Model, AppError> {
        let title = validate_title(&input.title)?;
        let model = todo::ActiveModel {
            title: Set(title),
            description: Set(normalize_description(input.description)),
            due_date: Set(input.due_date),
            priority: Set(input.priority),
            completed: Set(input.completed),
            cancelled: Set(input.cancelled),
            ..Default::default()
        };

        let created = CrudService::create(self, model).await?;
        tracing::info!(todo_id = created.id, priority = %created.priority, "todo created");
        Ok(created)
    }

    pub async fn get(&self, id: i32) -> Result<todo::Model, AppError> {
        CrudService::find_by_id(self, id).await
    }

    pub async fn update(&self, id: i32, changes: TodoChanges) -> Result<todo::Model, AppError> {
        if changes.is_empty() {
            return Err(AppError::bad_request("No fields to update"));
        }
        let title = changes.title.as_deref().map(validate_title).transpose()?;

        let updated = CrudService::update(self, id, move |active| {
            if let Some(title) = title {
                active.title = Set(title);
            }
            if let Some(description) = changes.description {
                active.description = Set(normalize_description(description));
            }
            if let Some(due_date) = changes.due_date {
                active.due_date = Set(due_date);
            }
            if let Some(priority) = changes.priority {
                active.priority = Set(priority);
            }
            if let Some(completed) = changes.completed {
                active.completed = Set(completed);
            }
            if let Some(cancelled) = changes.cancelled {
                active.cancelled = Set(cancelled);
            }
        })
        .await?;
        tracing::info!(todo_id = id, "todo updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        CrudService::delete(self, id).await?;
        tracing::info!(todo_id = id, "todo deleted");
        Ok(())
    }

    pub async fn toggle_resolved(&self, id: i32) -> Result<todo::Model, AppError> {
        let todo = self.todo_dao.toggle(id, TodoFlag::Completed).await?;
        tracing::info!(todo_id = id, completed = todo.completed, "todo resolution toggled");
        Ok(todo)
    }

    pub async fn toggle_cancelled(&self, id: i32) -> Result<todo::Model, AppError> {
        let todo = self.todo_dao.toggle(id, TodoFlag::Cancelled).await?;
        tracing::info!(todo_id = id, cancelled = todo.cancelled, "todo cancellation toggled");
        Ok(todo)
    }

    pub async fn list_active(&self, today: NaiveDate) -> Result<Vec<todo::Model>, AppError> {
        Ok(self.todo_dao.list_bucket(TodoBucket::Active(today)).await?)
    }

    pub async fn list_resolved(&self) -> Result<Vec<todo::Model>, AppError> {
        Ok(self.todo_dao.list_bucket(TodoBucket::Resolved).await?)
    }

    pub async fn list_cancelled(&self) -> Result<Vec<todo::Model>, AppError> {
        Ok(self.todo_dao.list_bucket(TodoBucket::Cancelled).await?)
    }

    pub async fn list_expired(&self, today: NaiveDate) -> Result<Vec<todo::Model>, AppError> {
        Ok(self.todo_dao.list_bucket(TodoBucket::Expired(today)).await?)
    }

    /// Open todos of one priority, whatever their due date.
    pub async fn list_by_priority(&self, priority: Priority) -> Result<Vec<todo::Model>, AppError> {
        Ok(self.todo_dao.list_open_by_priority(priority).await?)
    }

    pub async fn counts(&self, today: NaiveDate) -> Result<TodoCounts, AppError> {
        let (active, resolved, cancelled, expired) = tokio::try_join!(
            self.todo_dao.count_bucket(TodoBucket::Active(today)),
            self.todo_dao.count_bucket(TodoBucket::Resolved),
            self.todo_dao.count_bucket(TodoBucket::Cancelled),
            self.todo_dao.count_bucket(TodoBucket::Expired(today)),
        )?;
        Ok(TodoCounts {
            active,
            resolved,
            cancelled,
            expired,
        })
    }

    pub async fn count_all(&self) -> Result<u64, AppError> {
        Ok(self.todo_dao.count_all().await?)
    }
}

impl CrudService for TodoService {
    type Dao = TodoDao;

    fn dao(&self) -> &Self::Dao {
        &self.todo_dao
    }

    fn errors(&self) -> CrudErrors {
        CrudErrors {
            create_failed: "Failed to create todo",
            find_failed: "Failed to load todo",
            update_failed: "Failed to update todo",
            delete_failed: "Failed to delete todo",
        }
    }
}

/// Trims the title and enforces the 1..=200 character bound.
pub fn validate_title(raw: &str) -> Result<String, AppError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::bad_request("Title required"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::bad_request(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

/// Parses an ISO `YYYY-MM-DD` date; a blank value means "no due date".
pub fn parse_due_date(raw: &str) -> Result<Option<NaiveDate>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| AppError::bad_request(format!("Invalid due date '{raw}', expected YYYY-MM-DD")))
}

pub fn parse_priority(raw: &str) -> Result<Priority, AppError> {
    Ok(raw.parse::<Priority>()?)
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|text| !text.trim().is_empty())
}
