use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use phasetrack_core::task::{TaskPatch, TaskRecord};
use phasetrack_core::types::TaskStatus;
use serde::Deserialize;

use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub phase: Option<u32>,
}

/// GET /api/tasks: merged task list plus load warnings.
pub async fn list_tasks(
    State(app): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tracker = app.tracker.clone();
    let set = blocking(move || Ok(tracker.load_tasks())).await?;

    let status = query.status.map(TaskStatus::from);
    let tasks: Vec<_> = set
        .tasks
        .iter()
        .filter(|t| status.as_ref().map_or(true, |s| t.status() == s))
        .filter(|t| query.phase.map_or(true, |p| t.phase == p))
        .collect();

    Ok(Json(serde_json::json!({
        "tasks": tasks,
        "warnings": set.warnings,
    })))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(app): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tracker = app.tracker.clone();
    let task = blocking(move || tracker.find(&task_id)).await?;
    Ok(Json(serde_json::json!(task)))
}

#[derive(Debug, Deserialize)]
pub struct AddTaskBody {
    pub phase: u32,
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub output: Option<String>,
    #[serde(default)]
    pub context: Vec<String>,
    pub tests: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
}

/// POST /api/tasks: append a new task to a phase file.
pub async fn create_task(
    State(app): State<AppState>,
    Json(body): Json<AddTaskBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let mut record = TaskRecord::new(body.id, body.description);
    record.output = body.output;
    record.context = body.context;
    record.tests = body.tests;
    record.depends_on = body.depends_on;
    record.acceptance_criteria = body.acceptance_criteria;

    let _guard = app.write_lock.lock().await;
    let tracker = app.tracker.clone();
    let task = blocking(move || tracker.add_task(body.phase, record)).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!(task))))
}

/// PATCH /api/tasks/{id}: shallow field update.
pub async fn update_task(
    State(app): State<AppState>,
    Path(task_id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    if patch.is_empty() {
        return Err(AppError::bad_request("patch body has no fields"));
    }
    let _guard = app.write_lock.lock().await;
    let tracker = app.tracker.clone();
    let task = blocking(move || tracker.edit(&task_id, patch)).await?;
    Ok(Json(serde_json::json!(task)))
}

/// POST /api/tasks/{id}/start: mark in-progress and write the context document.
pub async fn start_task(
    State(app): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _guard = app.write_lock.lock().await;
    let tracker = app.tracker.clone();
    let outcome = blocking(move || tracker.start(&task_id)).await?;
    Ok(Json(serde_json::json!(outcome)))
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteBody {
    pub message: Option<String>,
}

/// POST /api/tasks/{id}/complete: mark completed and remove the context
/// document. The body (`{"message": ...}`) is optional. No git commit is made.
pub async fn complete_task(
    State(app): State<AppState>,
    Path(task_id): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let body: CompleteBody = optional_json(&body)?;
    let _guard = app.write_lock.lock().await;
    let tracker = app.tracker.clone();
    let outcome = blocking(move || tracker.commit(&task_id, body.message.as_deref())).await?;
    Ok(Json(serde_json::json!(outcome)))
}

#[derive(Debug, Deserialize)]
pub struct BlockBody {
    #[serde(default)]
    pub reason: String,
}

/// POST /api/tasks/{id}/block
pub async fn block_task(
    State(app): State<AppState>,
    Path(task_id): Path<String>,
    Json(body): Json<BlockBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let reason = body.reason.trim().to_string();
    if reason.is_empty() {
        return Err(AppError::bad_request("reason is required"));
    }
    let _guard = app.write_lock.lock().await;
    let tracker = app.tracker.clone();
    let task = blocking(move || tracker.block(&task_id, &reason)).await?;
    Ok(Json(serde_json::json!(task)))
}

/// GET /api/tasks/{id}/context: render the context document without writing it.
pub async fn preview_context(
    State(app): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tracker = app.tracker.clone();
    let preview = blocking(move || {
        let task = tracker.find(&task_id)?;
        let contexts = tracker.contexts();
        Ok(serde_json::json!({
            "task_id": task_id,
            "path": contexts.context_path(task.phase, task.id()),
            "exists": contexts.existing_context(task.id(), task.phase).is_some(),
            "content": contexts.render_context(&task),
        }))
    })
    .await?;
    Ok(Json(preview))
}

fn optional_json<T>(bytes: &[u8]) -> Result<T, AppError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(bytes).map_err(|e| AppError::bad_request(format!("invalid JSON body: {e}")))
}
