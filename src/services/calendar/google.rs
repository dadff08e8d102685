use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use super::CalendarProvider;
use crate::models::{CalendarEvent, EventTime};
use crate::services::scheduling::parse_timestamp;

const API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const MAX_RESULTS: &str = "250";

pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

pub struct GoogleCalendarProvider {
    calendar_id: String,
    access_token: String,
    credentials: Option<OAuthCredentials>,
    cached_token: Mutex<Option<(String, Instant)>>,
    client: reqwest::Client,
}

impl GoogleCalendarProvider {
    pub fn new(
        calendar_id: String,
        access_token: String,
        credentials: Option<OAuthCredentials>,
    ) -> Self {
        Self {
            calendar_id,
            access_token,
            credentials,
            cached_token: Mutex::new(None),
            client: reqwest::Client::new(),
        }
    }

    fn events_url(&self) -> anyhow::Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(API_BASE)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("calendar API base cannot hold a path"))?
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }

    async fn token(&self) -> anyhow::Result<String> {
        let Some(creds) = &self.credentials else {
            anyhow::ensure!(
                !self.access_token.is_empty(),
                "no Google Calendar credentials configured"
            );
            return Ok(self.access_token.clone());
        };

        let mut cached = self.cached_token.lock().await;
        if let Some((token, expires_at)) = cached.as_ref() {
            if Instant::now() < *expires_at {
                return Ok(token.clone());
            }
        }

        let resp = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("refresh_token", creds.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .context("failed to call Google OAuth token endpoint")?
            .error_for_status()
            .context("Google OAuth token endpoint returned error")?;

        let token: TokenResponse = resp.json().await.context("failed to parse token response")?;
        // Refresh a minute early
        let lifetime = Duration::from_secs(token.expires_in.saturating_sub(60));
        *cached = Some((token.access_token.clone(), Instant::now() + lifetime));

        tracing::info!("refreshed Google Calendar access token");
        Ok(token.access_token)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Deserialize)]
struct GoogleEvent {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    start: GoogleEventTime,
    end: GoogleEventTime,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventTime {
    date_time: Option<String>,
    date: Option<String>,
}

impl GoogleEventTime {
    fn to_event_time(&self) -> anyhow::Result<EventTime> {
        if let Some(dt) = &self.date_time {
            return Ok(EventTime::DateTime(parse_timestamp(dt)?));
        }
        if let Some(d) = &self.date {
            let date = NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .with_context(|| format!("invalid all-day date: {d}"))?;
            return Ok(EventTime::AllDay(date));
        }
        anyhow::bail!("event time has neither dateTime nor date")
    }
}

fn to_calendar_events(list: EventList) -> Vec<CalendarEvent> {
    list.items
        .into_iter()
        .filter_map(|item| {
            let times = item
                .start
                .to_event_time()
                .and_then(|start| Ok((start, item.end.to_event_time()?)));
            match times {
                Ok((start, end)) => Some(CalendarEvent {
                    id: item.id,
                    summary: item.summary.unwrap_or_else(|| "Untitled event".to_string()),
                    start,
                    end,
                }),
                Err(e) => {
                    tracing::warn!(event_id = %item.id, error = %e, "skipping unreadable calendar event");
                    None
                }
            }
        })
        .collect()
}

fn rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> anyhow::Result<Vec<CalendarEvent>> {
        let token = self.token().await?;
        let (time_min, time_max) = (rfc3339(time_min), rfc3339(time_max));

        let resp = self
            .client
            .get(self.events_url()?)
            .bearer_auth(token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", MAX_RESULTS),
            ])
            .send()
            .await
            .context("failed to call Google Calendar API")?
            .error_for_status()
            .context("Google Calendar API returned error")?;

        let list: EventList = resp.json().await.context("failed to parse calendar events")?;
        let events = to_calendar_events(list);

        tracing::info!(%time_min, %time_max, count = events.len(), "listed calendar events");
        Ok(events)
    }

    async fn create_event(
        &self,
        summary: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        description: &str,
    ) -> anyhow::Result<String> {
        let token = self.token().await?;

        let body = json!({
            "summary": summary,
            "description": description,
            "start": { "dateTime": rfc3339(start) },
            "end": { "dateTime": rfc3339(end) },
        });

        let resp = self
            .client
            .post(self.events_url()?)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .context("failed to create calendar event")?
            .error_for_status()
            .context("Google Calendar API rejected event")?;

        let data: serde_json::Value = resp.json().await.context("failed to parse created event")?;

        data["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing id in created event"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_maps_timed_and_all_day_events() {
        let json = r#"{"items":[
            {"id":"a","summary":"Standup","start":{"dateTime":"2025-06-16T09:00:00-04:00"},"end":{"dateTime":"2025-06-16T09:30:00-04:00"}},
            {"id":"b","start":{"date":"2025-06-16"},"end":{"date":"2025-06-17"}},
            {"id":"c","summary":"Broken","start":{"dateTime":"yesterday"},"end":{"dateTime":"2025-06-16T10:00:00Z"}}
        ]}"#;
        let list: EventList = serde_json::from_str(json).unwrap();
        let events = to_calendar_events(list);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].summary, "Standup");
        assert_eq!(
            events[0].start,
            EventTime::DateTime(Utc.with_ymd_and_hms(2025, 6, 16, 13, 0, 0).unwrap())
        );
        assert_eq!(events[1].summary, "Untitled event");
        assert_eq!(
            events[1].start,
            EventTime::AllDay(NaiveDate::from_ymd_opt(2025, 6, 16).unwrap())
        );
    }

    #[test]
    fn test_events_url_escapes_calendar_id() {
        let provider =
            GoogleCalendarProvider::new("me@example.com".to_string(), "tok".to_string(), None);
        let url = provider.events_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/me@example.com/events"
        );

        let provider = GoogleCalendarProvider::new("a/b".to_string(), "tok".to_string(), None);
        assert!(provider.events_url().unwrap().as_str().ends_with("/calendars/a%2Fb/events"));
    }

    #[tokio::test]
    async fn test_static_token() {
        let provider = GoogleCalendarProvider::new("primary".to_string(), "tok".to_string(), None);
        assert_eq!(provider.token().await.unwrap(), "tok");

        let provider = GoogleCalendarProvider::new("primary".to_string(), String::new(), None);
        assert!(provider.token().await.is_err());
    }
}
