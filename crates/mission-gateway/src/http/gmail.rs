use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use mission_sources::MailMessage;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{parse_param, ApiError};
use crate::app::AppState;

#[derive(Serialize)]
pub struct EmailsResponse {
    pub emails: Vec<MailMessage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkRequest {
    #[serde(default)]
    pub message_id: String,
    #[serde(default = "default_mark_as_read")]
    pub mark_as_read: bool,
}

fn default_mark_as_read() -> bool {
    true
}

/// GET /api/gmail?q=&max=: defaults to unread mail, 20 messages.
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<EmailsResponse>, ApiError> {
    let max = parse_param::<u32>(params.get("max").map(String::as_str), "max")?;
    let fetched = state.mail.search(params.get("q").map(String::as_str), max).await;
    Ok(Json(EmailsResponse {
        emails: fetched.items,
    }))
}

/// PATCH /api/gmail: `{ "messageId": "...", "markAsRead": true }`.
pub async fn mark_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MarkRequest>,
) -> Result<Json<Value>, ApiError> {
    state.mail.set_read(req.message_id.trim(), req.mark_as_read).await?;
    Ok(Json(json!({ "success": true })))
}
