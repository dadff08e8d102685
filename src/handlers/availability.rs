use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{AvailabilityWindow, BusyInterval, Candidate, ConflictReport, FreeSlot};
use crate::services::planner::{self, DayAvailability};
use crate::services::scheduling;
use crate::state::AppState;

// POST /api/availability/free
#[derive(Deserialize)]
pub struct FreeSlotsRequest {
    #[serde(default)]
    pub busy: Vec<BusyInterval>,
    pub window: AvailabilityWindow,
    pub min_free_minutes: Option<i64>,
}

pub async fn free_slots(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FreeSlotsRequest>,
) -> Result<Json<Vec<FreeSlot>>, AppError> {
    let min_free = req.min_free_minutes.unwrap_or(state.config.min_free_minutes);
    let slots = scheduling::free_slots(&req.busy, &req.window, min_free)?;
    Ok(Json(slots))
}

// POST /api/availability/conflicts
#[derive(Deserialize)]
pub struct ConflictRequest {
    pub candidate: Candidate,
    #[serde(default)]
    pub busy: Vec<BusyInterval>,
}

pub async fn conflicts(Json(req): Json<ConflictRequest>) -> Result<Json<ConflictReport>, AppError> {
    if req.candidate.end <= req.candidate.start {
        return Err(AppError::BadRequest(
            "candidate end must be after its start".to_string(),
        ));
    }
    Ok(Json(scheduling::has_conflict(&req.candidate, &req.busy)))
}

// GET /api/calendar/free?date=YYYY-MM-DD&min_minutes=N
#[derive(Deserialize)]
pub struct CalendarFreeQuery {
    pub date: Option<String>,
    pub min_minutes: Option<i64>,
}

pub async fn calendar_free(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CalendarFreeQuery>,
) -> Result<Json<DayAvailability>, AppError> {
    let date = match query.date.as_deref() {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::BadRequest(format!("invalid date '{s}', expected YYYY-MM-DD")))?,
        None => planner::local_today(&state),
    };
    let min_minutes = query.min_minutes.unwrap_or(state.config.min_free_minutes);

    let availability = planner::free_for_day(&state, date, min_minutes).await?;
    Ok(Json(availability))
}
