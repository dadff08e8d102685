use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    AvailabilityWindow, BusyInterval, CalendarEvent, Candidate, FreeSlot, Intent, NumberedResult,
    ScheduledEvent, WeatherAnalysis, WeatherConditions,
};
use crate::services::parser::coordinates_for;
use crate::services::scheduling;
use crate::services::weather::analyze_for_events;
use crate::state::AppState;

const DEFAULT_DURATION_MINUTES: i64 = 150;
const SMS_RESULTS: usize = 3;

/// Everything a natural-language search produced.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub search_id: String,
    pub search_terms: String,
    pub intent: Intent,
    pub events: Vec<NumberedResult>,
    pub weather: Option<WeatherConditions>,
    pub weather_analysis: Option<WeatherAnalysis>,
    pub calendar_events: Option<Vec<CalendarEvent>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub search_id: Option<String>,
    /// 1-based position in the stored search.
    #[serde(default)]
    pub event_number: Option<usize>,
    pub start: DateTime<Utc>,
    #[serde(default = "default_duration")]
    pub duration_minutes: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub force: bool,
}

fn default_duration() -> i64 {
    DEFAULT_DURATION_MINUTES
}

#[derive(Debug, Clone)]
pub enum ScheduleOutcome {
    Scheduled(ScheduledEvent),
    Conflict(Vec<BusyInterval>),
}

#[derive(Debug, Clone, Serialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub window: AvailabilityWindow,
    pub busy: Vec<BusyInterval>,
    pub free_slots: Vec<FreeSlot>,
}

/// Today's date in the configured local offset.
pub fn local_today(state: &AppState) -> NaiveDate {
    (Utc::now() + Duration::minutes(state.config.utc_offset_minutes as i64)).date_naive()
}

/// Whole local days `first..=last` as one UTC span.
fn day_span(
    state: &AppState,
    first: NaiveDate,
    last: NaiveDate,
) -> anyhow::Result<(DateTime<Utc>, DateTime<Utc>)> {
    let offset = state.config.utc_offset_minutes;
    let start = AvailabilityWindow::for_day(first, 0, 24, offset)?.day_start;
    let end = AvailabilityWindow::for_day(last, 0, 24, offset)?.day_end;
    Ok((start, end))
}

fn busy_intervals(events: &[CalendarEvent]) -> Vec<BusyInterval> {
    events.iter().filter_map(CalendarEvent::busy_interval).collect()
}

pub async fn search_natural_language(
    state: &AppState,
    query: &str,
    count: usize,
) -> Result<Plan, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest("query must not be empty".to_string()));
    }

    let intent = state.parser.parse(query);
    let search_terms = intent.search_terms();

    let results = state
        .search
        .search(&search_terms, count)
        .await
        .map_err(AppError::upstream)?;

    tracing::info!(
        terms = %search_terms,
        category = intent.event_type.as_str(),
        location = %intent.location,
        results = results.len(),
        "natural language search"
    );

    let weather = match state
        .weather
        .current_conditions(coordinates_for(&intent.location))
        .await
    {
        Ok(conditions) => Some(conditions),
        Err(e) => {
            tracing::warn!(error = %e, location = %intent.location, "weather unavailable");
            None
        }
    };
    let weather_analysis = weather.as_ref().map(analyze_for_events);

    let calendar_events = if intent.check_conflicts {
        let (first, last) = intent.time_constraint.date_range(local_today(state));
        let listed = match day_span(state, first, last) {
            Ok((time_min, time_max)) => state.calendar.list_events(time_min, time_max).await,
            Err(e) => Err(e),
        };
        match listed {
            Ok(events) => Some(events),
            Err(e) => {
                tracing::warn!(error = %e, "calendar unavailable, skipping conflict check");
                None
            }
        }
    } else {
        None
    };

    let search_id = uuid::Uuid::new_v4().to_string();
    {
        let db = state.db.lock().unwrap();
        queries::save_search(&db, &search_id, query, &intent, &results)
            .map_err(AppError::database)?;
    }

    let events = results
        .into_iter()
        .enumerate()
        .map(|(i, result)| NumberedResult {
            number: i + 1,
            result,
        })
        .collect();

    Ok(Plan {
        search_id,
        search_terms,
        intent,
        events,
        weather,
        weather_analysis,
        calendar_events,
    })
}

/// Title and default description for the event being scheduled.
fn resolve_title(state: &AppState, request: &ScheduleRequest) -> Result<(String, String), AppError> {
    if let Some(title) = request.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        return Ok((title.to_string(), String::new()));
    }

    let (Some(search_id), Some(number)) = (request.search_id.as_deref(), request.event_number)
    else {
        return Err(AppError::BadRequest(
            "either title or search_id with event_number is required".to_string(),
        ));
    };

    let db = state.db.lock().unwrap();
    let search = queries::get_search(&db, search_id)
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound(format!("search {search_id}")))?;
    let result = queries::get_search_result(&db, search_id, number)
        .map_err(AppError::database)?
        .ok_or_else(|| {
            AppError::NotFound(format!("event {number} in search {search_id}"))
        })?;

    let description = format!(
        "Found via event search.\nOriginal search: {}\n{}",
        search.query, result.url
    );
    Ok((result.title, description))
}

pub async fn schedule(
    state: &AppState,
    request: &ScheduleRequest,
) -> Result<ScheduleOutcome, AppError> {
    if request.duration_minutes <= 0 {
        return Err(AppError::BadRequest(format!(
            "duration_minutes must be positive, got {}",
            request.duration_minutes
        )));
    }

    let end = Duration::try_minutes(request.duration_minutes)
        .and_then(|d| request.start.checked_add_signed(d))
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "duration_minutes {} is out of range",
                request.duration_minutes
            ))
        })?;

    let (summary, found_description) = resolve_title(state, request)?;
    let candidate = Candidate {
        start: request.start,
        end,
    };

    let events = state
        .calendar
        .list_events(candidate.start, candidate.end)
        .await
        .map_err(AppError::upstream)?;
    let report = scheduling::has_conflict(&candidate, &busy_intervals(&events));

    if !report.available && !request.force {
        tracing::info!(%summary, conflicts = report.conflicts.len(), "schedule blocked by conflicts");
        return Ok(ScheduleOutcome::Conflict(report.conflicts));
    }

    let mut description = request.description.clone().unwrap_or(found_description);
    if !description.is_empty() {
        description.push('\n');
    }
    description.push_str(&format!("Duration: {} minutes", request.duration_minutes));

    let calendar_event_id = state
        .calendar
        .create_event(&summary, candidate.start, candidate.end, &description)
        .await
        .map_err(AppError::upstream)?;

    let event = ScheduledEvent {
        id: uuid::Uuid::new_v4().to_string(),
        calendar_event_id,
        summary,
        start: candidate.start,
        end: candidate.end,
        search_id: request.search_id.clone(),
        created_at: Utc::now().naive_utc(),
    };

    {
        let db = state.db.lock().unwrap();
        queries::insert_scheduled_event(&db, &event).map_err(AppError::database)?;
    }

    tracing::info!(
        id = %event.id,
        calendar_event_id = %event.calendar_event_id,
        forced = !report.available,
        "scheduled event"
    );

    if !state.config.notify_phone.is_empty() {
        let text = confirmation_text(&event, state.config.utc_offset_minutes);
        if let Err(e) = state
            .messaging
            .send_message(&state.config.notify_phone, &text)
            .await
        {
            tracing::error!(error = %e, "failed to send schedule confirmation");
        }
    }

    Ok(ScheduleOutcome::Scheduled(event))
}

pub async fn free_for_day(
    state: &AppState,
    date: NaiveDate,
    min_minutes: i64,
) -> Result<DayAvailability, AppError> {
    let config = &state.config;
    let window = AvailabilityWindow::for_day(
        date,
        config.day_start_hour,
        config.day_end_hour,
        config.utc_offset_minutes,
    )
    .map_err(|e| AppError::BadRequest(format!("{e:#}")))?;

    let events = state
        .calendar
        .list_events(window.day_start, window.day_end)
        .await
        .map_err(AppError::upstream)?;
    let busy = busy_intervals(&events);
    let free_slots = scheduling::free_slots(&busy, &window, min_minutes)?;

    Ok(DayAvailability {
        date,
        window,
        busy,
        free_slots,
    })
}

fn local_time(dt: DateTime<Utc>, utc_offset_minutes: i32) -> NaiveDateTime {
    dt.naive_utc() + Duration::minutes(utc_offset_minutes as i64)
}

fn confirmation_text(event: &ScheduledEvent, utc_offset_minutes: i32) -> String {
    let start = local_time(event.start, utc_offset_minutes);
    let end = local_time(event.end, utc_offset_minutes);
    format!(
        "Scheduled: {} on {} from {} to {}",
        event.summary,
        start.format("%a %b %-d"),
        start.format("%-I:%M %p"),
        end.format("%-I:%M %p"),
    )
}

/// Short text-message rendering of a plan.
pub fn sms_summary(plan: &Plan) -> String {
    if plan.events.is_empty() {
        return format!("No events found for \"{}\".", plan.search_terms);
    }

    let mut lines = vec![format!("Top picks for \"{}\":", plan.search_terms)];
    for numbered in plan.events.iter().take(SMS_RESULTS) {
        lines.push(format!(
            "{}. {} ({})",
            numbered.number, numbered.result.title, numbered.result.source
        ));
    }

    if let Some(analysis) = &plan.weather_analysis {
        let verdict = if analysis.is_outdoor_friendly {
            "good for outdoor events"
        } else {
            "better for indoor events"
        };
        lines.push(format!(
            "Weather: {}, {} - {verdict}",
            analysis.summary.temperature, analysis.summary.conditions
        ));
    }

    if let Some(events) = &plan.calendar_events {
        lines.push(format!("You have {} calendar event(s) in that window.", events.len()));
    }

    lines.push(format!("Search id: {}", plan.search_id));
    lines.join("\n")
}
