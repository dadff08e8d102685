use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::BusyInterval;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    AllDay(NaiveDate),
}

/// Raw event record as returned by the calendar collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
}

impl CalendarEvent {
    /// Timed events become busy intervals; all-day events are listed but never block time.
    pub fn busy_interval(&self) -> Option<BusyInterval> {
        match (self.start, self.end) {
            (EventTime::DateTime(start), EventTime::DateTime(end)) => Some(BusyInterval {
                start,
                end,
                label: self.summary.clone(),
            }),
            _ => None,
        }
    }
}
