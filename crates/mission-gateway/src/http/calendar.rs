use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use mission_core::CalendarItem;
use serde::Serialize;

use super::{parse_param, ApiError};
use crate::app::AppState;

/// Longest look-ahead a caller may request.
const MAX_DAYS: u32 = 366;

#[derive(Serialize)]
pub struct CalendarResponse {
    pub events: Vec<CalendarItem>,
}

/// GET /api/calendar?days=N: events from today through today + N.
pub async fn calendar_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CalendarResponse>, ApiError> {
    let days = parse_param::<u32>(params.get("days").map(String::as_str), "days")?
        .unwrap_or(state.config.schedule.default_days);
    if days > MAX_DAYS {
        return Err(ApiError::invalid(format!("`days` must be at most {MAX_DAYS}")));
    }
    let fetched = state.aggregator.calendar(Utc::now(), days).await;
    Ok(Json(CalendarResponse {
        events: fetched.items,
    }))
}
