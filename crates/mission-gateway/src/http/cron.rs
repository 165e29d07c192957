//! Schedule endpoints: GET/POST /api/cron, DELETE /api/cron/{id}
//!
//! GET merges externally listed jobs with locally stored tasks. POST and
//! DELETE only ever touch the local `scheduled_tasks` table.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use mission_scheduler::{LocalTask, NewLocalTask};
use serde::Serialize;
use serde_json::{json, Value};

use super::ApiError;
use crate::aggregate::ScheduleView;
use crate::app::AppState;

#[derive(Serialize)]
pub struct CreatedTask {
    pub success: bool,
    pub task: LocalTask,
}

pub async fn list_handler(State(state): State<Arc<AppState>>) -> Json<ScheduleView> {
    Json(state.aggregator.schedule(Utc::now()).await)
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewLocalTask>,
) -> Result<Json<CreatedTask>, ApiError> {
    let agg = &state.aggregator;
    let task = agg.tasks.add_task(new, Utc::now(), &agg.tz)?;
    Ok(Json(CreatedTask {
        success: true,
        task,
    }))
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::invalid(format!("task id must be an integer, got {id:?}")))?;
    state.aggregator.tasks.remove_task(id)?;
    Ok(Json(json!({ "success": true })))
}
