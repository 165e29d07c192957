//! Activity log endpoints: GET/POST /api/activities
//!
//! Query: `?type=email&limit=50&offset=0`
//! Response: `{ "activities": [...] }`, newest first.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use mission_activity::{Activity, NewActivity};
use serde::Serialize;

use super::{parse_param, ApiError};
use crate::app::AppState;

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 500;

#[derive(Serialize)]
pub struct ActivitiesResponse {
    pub activities: Vec<Activity>,
}

#[derive(Serialize)]
pub struct Appended {
    pub success: bool,
    pub id: i64,
}

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ActivitiesResponse>, ApiError> {
    let limit = parse_param::<u32>(params.get("limit").map(String::as_str), "limit")?
        .unwrap_or(DEFAULT_LIMIT)
        .min(MAX_LIMIT);
    let offset = parse_param::<u32>(params.get("offset").map(String::as_str), "offset")?.unwrap_or(0);
    let kind = params
        .get("type")
        .map(|t| t.trim())
        .filter(|t| !t.is_empty());

    let activities = state.aggregator.activity.query(kind, limit, offset)?;
    Ok(Json(ActivitiesResponse { activities }))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewActivity>,
) -> Result<Json<Appended>, ApiError> {
    let id = state.aggregator.activity.append(&new)?;
    Ok(Json(Appended { success: true, id }))
}
