use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use phasetrack_core::progress;
use serde::Deserialize;

use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

/// GET /api/phases: phase metadata with per-phase progress.
pub async fn list_phases(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tracker = app.tracker.clone();
    let set = blocking(move || Ok(tracker.load_tasks())).await?;
    let per_phase = progress::phase_progress(&set);

    let phases: Vec<serde_json::Value> = per_phase
        .iter()
        .map(|(id, p)| {
            let info = set.phases.get(id);
            serde_json::json!({
                "id": id,
                "name": p.name,
                "description": info.map(|i| i.description.as_str()).unwrap_or(""),
                "file": info.map(|i| i.file.as_str()),
                "task_count": p.total,
                "progress": p,
            })
        })
        .collect();
    Ok(Json(serde_json::json!(phases)))
}

#[derive(Debug, Deserialize)]
pub struct CreatePhaseBody {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// POST /api/phases: write a new, empty phase file.
pub async fn create_phase(
    State(app): State<AppState>,
    Json(body): Json<CreatePhaseBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::bad_request("name is required"));
    }
    let _guard = app.write_lock.lock().await;
    let tracker = app.tracker.clone();
    let info = blocking(move || tracker.create_phase(body.id, &body.name, &body.description)).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!(info))))
}

/// GET /api/progress: per-phase progress keyed by phase id, plus the rollup.
pub async fn get_progress(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tracker = app.tracker.clone();
    let per_phase = blocking(move || Ok(tracker.phase_progress())).await?;
    let overall = progress::overall(&per_phase);
    Ok(Json(serde_json::json!({
        "phases": per_phase,
        "overall": overall,
    })))
}
