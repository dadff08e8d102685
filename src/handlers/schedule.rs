use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::ScheduledEvent;
use crate::services::planner::{self, ScheduleOutcome, ScheduleRequest};
use crate::state::AppState;

/// Bearer check. An empty configured token disables it.
fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    if expected_token.is_empty() {
        return Ok(());
    }

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

#[derive(Serialize)]
pub struct ScheduleResponse {
    success: bool,
    event_id: String,
    scheduled: ScheduledEvent,
}

// POST /api/schedule
pub async fn schedule_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    match planner::schedule(&state, &req).await? {
        ScheduleOutcome::Scheduled(event) => Ok(Json(ScheduleResponse {
            success: true,
            event_id: event.calendar_event_id.clone(),
            scheduled: event,
        })),
        ScheduleOutcome::Conflict(conflicts) => Err(AppError::Conflict(conflicts)),
    }
}

// GET /api/scheduled
#[derive(Deserialize)]
pub struct ScheduledQuery {
    pub limit: Option<i64>,
}

pub async fn list_scheduled(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ScheduledQuery>,
) -> Result<Json<Vec<ScheduledEvent>>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let limit = query.limit.unwrap_or(50);
    let db = state.db.lock().unwrap();
    let events = queries::list_scheduled_events(&db, limit).map_err(AppError::database)?;
    Ok(Json(events))
}
