pub mod google;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::CalendarEvent;

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> anyhow::Result<Vec<CalendarEvent>>;

    /// Returns the created event's identifier.
    async fn create_event(
        &self,
        summary: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        description: &str,
    ) -> anyhow::Result<String>;
}
