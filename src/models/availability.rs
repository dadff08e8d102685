use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One calendar event's occupied span.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FreeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl FreeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            duration_minutes: (end - start).num_minutes(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityWindow {
    pub day_start: DateTime<Utc>,
    pub day_end: DateTime<Utc>,
}

impl AvailabilityWindow {
    /// Window from `start_hour` to `end_hour` on `date`, in a fixed UTC offset.
    pub fn for_day(
        date: NaiveDate,
        start_hour: u32,
        end_hour: u32,
        utc_offset_minutes: i32,
    ) -> anyhow::Result<Self> {
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
            .ok_or_else(|| anyhow::anyhow!("invalid utc offset: {utc_offset_minutes} minutes"))?;

        let local = |hour: u32| -> anyhow::Result<DateTime<Utc>> {
            // 24 means midnight at the end of the day
            let naive = if hour == 24 {
                date.and_hms_opt(0, 0, 0).map(|dt| dt + Duration::days(1))
            } else {
                date.and_hms_opt(hour, 0, 0)
            }
            .ok_or_else(|| anyhow::anyhow!("invalid hour: {hour}"))?;

            offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| anyhow::anyhow!("ambiguous local time for hour {hour}"))
        };

        Ok(Self {
            day_start: local(start_hour)?,
            day_end: local(end_hour)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConflictReport {
    pub available: bool,
    pub conflicts: Vec<BusyInterval>,
}
