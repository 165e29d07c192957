use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use mission_scheduler::DayWindow;

use super::{parse_param, ApiError};
use crate::aggregate::Overview;
use crate::app::AppState;

const MAX_DAYS: u32 = 62;

/// GET /api/overview?week=YYYY-MM-DD | ?days=N
///
/// With neither parameter the current week is returned.
pub async fn overview_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Overview>, ApiError> {
    let now = Utc::now();
    let today = now.with_timezone(&state.aggregator.tz).date_naive();

    let window = match (params.get("week"), params.get("days")) {
        (Some(_), Some(_)) => return Err(ApiError::invalid("pass either `week` or `days`, not both")),
        (Some(week), None) => DayWindow::Week {
            anchor: NaiveDate::parse_from_str(week.trim(), "%Y-%m-%d")
                .map_err(|_| ApiError::invalid(format!("`week` must be YYYY-MM-DD, got {week:?}")))?,
        },
        (None, Some(days)) => {
            let days = parse_param::<u32>(Some(days.as_str()), "days")?.unwrap_or(state.config.schedule.default_days);
            if days == 0 || days > MAX_DAYS {
                return Err(ApiError::invalid(format!("`days` must be between 1 and {MAX_DAYS}")));
            }
            DayWindow::Forward { start: today, days }
        }
        (None, None) => DayWindow::Week { anchor: today },
    };

    Ok(Json(state.aggregator.overview(window, now).await))
}
