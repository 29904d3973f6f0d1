/// Task endpoints
///
/// | Method | Path | Auth |
/// |---|---|---|
/// | `GET` | `/api/tasks` | optional |
/// | `POST` | `/api/tasks` | optional |
/// | `GET` | `/api/tasks/:id` | none |
/// | `PUT` | `/api/tasks/:id` | none |
/// | `DELETE` | `/api/tasks/:id` | none |
///
/// Listing is scoped: an authenticated caller sees their own tasks plus
/// anonymous ones, everyone else sees anonymous tasks only. Tasks created with
/// a valid token are owned by that user; without one they are anonymous.
///
/// Fetching, updating and deleting by id are not scoped to the owner. Any
/// caller that knows an id can act on the task.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    response::ApiResponse,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use taskhub_shared::{
    auth::middleware::AuthContext,
    models::{
        task::{CreateTask, Task, TaskStatus, UpdateTask},
        task_query::{parse_status_filter, TaskQuery, TaskSort, Visibility},
    },
};

const MAX_TITLE_CHARS: usize = 255;

/// Query string for `GET /api/tasks`
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksParams {
    /// `pending`, `in-progress`, `completed` or `all`
    pub status: Option<String>,

    /// Case-insensitive substring of title or description
    pub search: Option<String>,

    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,

    pub order: Option<String>,
}

impl ListTasksParams {
    /// Builds the store query for a caller
    ///
    /// # Errors
    ///
    /// `BadRequest` for an unrecognised status. Unknown sort values fall back
    /// to newest first instead of failing.
    pub fn into_query(self, visibility: Visibility) -> ApiResult<TaskQuery> {
        let status = parse_status_filter(self.status.as_deref())?;
        let sort = TaskSort::from_params(self.sort_by.as_deref(), self.order.as_deref());

        Ok(TaskQuery::new(visibility)
            .status(status)
            .search(self.search.unwrap_or_default())
            .sort(sort))
    }
}

/// Body for creating or replacing a task
#[derive(Debug, Default, Deserialize)]
pub struct TaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

struct ValidTask {
    title: String,
    description: String,
    status: Option<TaskStatus>,
}

impl TaskRequest {
    /// Checks the title and parses the status; an empty status counts as absent
    fn validate(self) -> ApiResult<ValidTask> {
        let title = self
            .title
            .filter(|title| !title.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("Title is required".to_string()))?;

        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(ApiError::BadRequest(format!(
                "Title must be at most {} characters",
                MAX_TITLE_CHARS
            )));
        }

        let status = match self.status.as_deref() {
            None | Some("") => None,
            Some(status) => Some(status.parse::<TaskStatus>()?),
        };

        Ok(ValidTask {
            title,
            description: self.description.unwrap_or_default(),
            status,
        })
    }
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

/// List tasks visible to the caller
///
/// ```text
/// GET /api/tasks?status=pending&search=milk&sortBy=title&order=asc
/// ```
///
/// ```json
/// { "success": true, "data": [ ... ], "count": 2 }
/// ```
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    ApiQuery(params): ApiQuery<ListTasksParams>,
) -> ApiResult<Json<ApiResponse<Vec<Task>>>> {
    let visibility = Visibility::from_user(auth.map(|Extension(auth)| auth.user_id));
    let query = params.into_query(visibility)?;

    let tasks = Task::list(&state.db, &query).await?;

    tracing::debug!(?visibility, count = tasks.len(), "Listed tasks");

    Ok(Json(ApiResponse::list(tasks)))
}

/// Fetch one task by id
pub async fn get_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    let task = Task::find_by_id(&state.db, id).await?.ok_or_else(task_not_found)?;
    Ok(Json(ApiResponse::data(task)))
}

/// Create a task, owned by the caller when a valid token is present
///
/// ```text
/// POST /api/tasks
///
/// { "title": "Buy milk", "description": "2 litres", "status": "pending" }
/// ```
///
/// Responds 201 with the stored task. `description` defaults to `""` and
/// `status` to `pending`.
pub async fn create_task(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Task>>)> {
    let valid = req.validate()?;
    let user_id = auth.map(|Extension(auth)| auth.user_id);

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id,
            title: valid.title,
            description: valid.description,
            status: valid.status.unwrap_or_default(),
        },
    )
    .await?;

    tracing::info!(task_id = task.id, user_id = ?task.user_id, "Task created");

    Ok((StatusCode::CREATED, Json(ApiResponse::data(task))))
}

/// Replace a task's title and description, and its status when given
///
/// A missing `description` clears it; a missing `status` keeps the current one.
pub async fn update_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    let valid = req.validate()?;

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            title: valid.title,
            description: valid.description,
            status: valid.status,
        },
    )
    .await?
    .ok_or_else(task_not_found)?;

    tracing::info!(task_id = task.id, status = %task.status, "Task updated");

    Ok(Json(ApiResponse::data(task)))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<ApiResponse<()>>> {
    if !Task::delete(&state.db, id).await? {
        return Err(task_not_found());
    }

    tracing::info!(task_id = id, "Task deleted");

    Ok(Json(ApiResponse::message("Task deleted successfully")))
}
