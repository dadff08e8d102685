use chrono::{DateTime, Utc};

use crate::models::{AvailabilityWindow, BusyInterval, Candidate, ConflictReport, FreeSlot};

/// Malformed input handed to the availability engine. These are caller bugs.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("window end {end} is not after window start {start}")]
    EmptyWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("busy interval '{label}' ends at {end}, not after its start {start}")]
    MalformedInterval {
        label: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("negative free-time threshold: {0} minutes")]
    NegativeThreshold(i64),

    #[error("invalid timestamp '{0}': expected ISO-8601 with an explicit offset")]
    InvalidTimestamp(String),
}

/// Parse an ISO-8601 timestamp that carries an explicit offset or `Z`.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp(s.to_string()))
}

fn validate_busy(busy: &[BusyInterval]) -> Result<(), ValidationError> {
    match busy.iter().find(|b| b.end <= b.start) {
        Some(b) => Err(ValidationError::MalformedInterval {
            label: b.label.clone(),
            start: b.start,
            end: b.end,
        }),
        None => Ok(()),
    }
}

/// Free windows inside `window` that are at least `min_free_minutes` long.
///
/// Busy intervals may arrive in any order and may overlap or nest. The cursor
/// only ever moves forward, so overlapping spans are absorbed and no emitted
/// slot overlaps a busy interval. Gaps are clipped to the window.
pub fn free_slots(
    busy: &[BusyInterval],
    window: &AvailabilityWindow,
    min_free_minutes: i64,
) -> Result<Vec<FreeSlot>, ValidationError> {
    if window.day_end <= window.day_start {
        return Err(ValidationError::EmptyWindow {
            start: window.day_start,
            end: window.day_end,
        });
    }
    if min_free_minutes < 0 {
        return Err(ValidationError::NegativeThreshold(min_free_minutes));
    }
    validate_busy(busy)?;

    // Stable: equal starts keep caller order
    let mut sorted: Vec<&BusyInterval> = busy.iter().collect();
    sorted.sort_by_key(|b| b.start);

    let mut slots = Vec::new();
    let mut cursor = window.day_start;

    for interval in sorted {
        if cursor >= window.day_end {
            break;
        }
        if cursor < interval.start {
            let gap_end = interval.start.min(window.day_end);
            if (gap_end - cursor).num_minutes() >= min_free_minutes {
                slots.push(FreeSlot::new(cursor, gap_end));
            }
        }
        cursor = cursor.max(interval.end);
    }

    if cursor < window.day_end && (window.day_end - cursor).num_minutes() >= min_free_minutes {
        slots.push(FreeSlot::new(cursor, window.day_end));
    }

    tracing::debug!(busy = busy.len(), slots = slots.len(), "computed free slots");
    Ok(slots)
}

/// Every busy interval overlapping `candidate`, in input order.
/// Half-open overlap: touching intervals do not conflict.
pub fn has_conflict(candidate: &Candidate, busy: &[BusyInterval]) -> ConflictReport {
    let conflicts: Vec<BusyInterval> = busy
        .iter()
        .filter(|b| candidate.start < b.end && candidate.end > b.start)
        .cloned()
        .collect();

    ConflictReport {
        available: conflicts.is_empty(),
        conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        parse_timestamp(&format!("2025-06-16T{s}:00Z")).unwrap()
    }

    fn busy(start: &str, end: &str, label: &str) -> BusyInterval {
        BusyInterval {
            start: ts(start),
            end: ts(end),
            label: label.to_string(),
        }
    }

    fn window(start: &str, end: &str) -> AvailabilityWindow {
        AvailabilityWindow {
            day_start: ts(start),
            day_end: ts(end),
        }
    }

    fn spans(slots: &[FreeSlot]) -> Vec<(String, String, i64)> {
        slots
            .iter()
            .map(|s| {
                (
                    s.start.format("%H:%M").to_string(),
                    s.end.format("%H:%M").to_string(),
                    s.duration_minutes,
                )
            })
            .collect()
    }

    fn span(start: &str, end: &str, minutes: i64) -> (String, String, i64) {
        (start.to_string(), end.to_string(), minutes)
    }

    #[test]
    fn test_standup_and_lunch() {
        let busy = vec![busy("09:00", "10:00", "Standup"), busy("13:00", "14:00", "Lunch")];
        let slots = free_slots(&busy, &window("09:00", "17:00"), 30).unwrap();
        assert_eq!(
            spans(&slots),
            vec![span("10:00", "13:00", 180), span("14:00", "17:00", 180)]
        );
    }

    #[test]
    fn test_empty_busy_spans_window() {
        let slots = free_slots(&[], &window("09:00", "21:00"), 30).unwrap();
        assert_eq!(spans(&slots), vec![span("09:00", "21:00", 720)]);
    }

    #[test]
    fn test_window_shorter_than_threshold() {
        let slots = free_slots(&[], &window("09:00", "09:20"), 30).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let busy = vec![busy("13:00", "14:00", "Lunch"), busy("09:00", "10:00", "Standup")];
        let slots = free_slots(&busy, &window("09:00", "17:00"), 30).unwrap();
        assert_eq!(
            spans(&slots),
            vec![span("10:00", "13:00", 180), span("14:00", "17:00", 180)]
        );
    }

    #[test]
    fn test_short_gaps_filtered() {
        let busy = vec![busy("09:30", "10:00", "A"), busy("10:20", "11:00", "B")];
        let slots = free_slots(&busy, &window("09:00", "12:00"), 30).unwrap();
        assert_eq!(
            spans(&slots),
            vec![span("09:00", "09:30", 30), span("11:00", "12:00", 60)]
        );
    }

    #[test]
    fn test_nested_and_overlapping_intervals() {
        let busy = vec![
            busy("10:00", "13:00", "Workshop"),
            busy("11:00", "12:00", "Nested"),
            busy("12:30", "14:00", "Overlap"),
        ];
        let slots = free_slots(&busy, &window("09:00", "17:00"), 30).unwrap();
        assert_eq!(
            spans(&slots),
            vec![span("09:00", "10:00", 60), span("14:00", "17:00", 180)]
        );
    }

    #[test]
    fn test_intervals_outside_window_are_clipped() {
        let busy = vec![
            busy("07:00", "09:30", "Early"),
            busy("16:00", "19:00", "Late"),
            busy("20:00", "21:00", "After"),
        ];
        let slots = free_slots(&busy, &window("09:00", "17:00"), 30).unwrap();
        assert_eq!(spans(&slots), vec![span("09:30", "16:00", 390)]);
    }

    #[test]
    fn test_interval_starting_after_window_caps_gap() {
        let busy = vec![busy("18:00", "19:00", "Dinner")];
        let slots = free_slots(&busy, &window("09:00", "17:00"), 30).unwrap();
        assert_eq!(spans(&slots), vec![span("09:00", "17:00", 480)]);
    }

    #[test]
    fn test_zero_threshold_never_emits_empty_slots() {
        let touching = vec![busy("09:00", "10:00", "A"), busy("10:00", "17:00", "B")];
        let slots = free_slots(&touching, &window("09:00", "17:00"), 0).unwrap();
        assert!(slots.is_empty());

        let gapped = vec![busy("09:00", "10:00", "A"), busy("10:05", "17:00", "B")];
        let slots = free_slots(&gapped, &window("09:00", "17:00"), 0).unwrap();
        assert_eq!(spans(&slots), vec![span("10:00", "10:05", 5)]);
    }

    #[test]
    fn test_huge_threshold_yields_no_slots() {
        let gapped = vec![busy("10:00", "11:00", "A")];
        let slots = free_slots(&gapped, &window("09:00", "17:00"), i64::MAX).unwrap();
        assert!(slots.is_empty());
        assert!(free_slots(&[], &window("09:00", "17:00"), i64::MAX).unwrap().is_empty());
    }

    #[test]
    fn test_idempotent() {
        let busy = vec![busy("11:00", "12:00", "A"), busy("09:15", "10:00", "B")];
        let w = window("09:00", "17:00");
        assert_eq!(free_slots(&busy, &w, 30).unwrap(), free_slots(&busy, &w, 30).unwrap());
    }

    #[test]
    fn test_slots_and_busy_cover_window() {
        let busy = vec![
            busy("15:00", "16:00", "C"),
            busy("09:00", "09:45", "A"),
            busy("11:00", "12:30", "B"),
        ];
        let w = window("09:00", "17:00");
        let slots = free_slots(&busy, &w, 0).unwrap();

        let mut pieces: Vec<(DateTime<Utc>, DateTime<Utc>)> = slots
            .iter()
            .map(|s| (s.start, s.end))
            .chain(
                busy.iter()
                    .map(|b| (b.start.max(w.day_start), b.end.min(w.day_end))),
            )
            .collect();
        pieces.sort();

        assert_eq!(pieces.first().unwrap().0, w.day_start);
        assert_eq!(pieces.last().unwrap().1, w.day_end);
        for pair in pieces.windows(2) {
            assert_eq!(pair[0].1, pair[1].0, "gap or overlap between pieces");
        }
    }

    #[test]
    fn test_empty_window_rejected() {
        let err = free_slots(&[], &window("17:00", "09:00"), 30).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyWindow { .. }));
        assert!(free_slots(&[], &window("09:00", "09:00"), 30).is_err());
    }

    #[test]
    fn test_malformed_interval_rejected() {
        let busy = vec![busy("10:00", "10:00", "Zero")];
        let err = free_slots(&busy, &window("09:00", "17:00"), 30).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MalformedInterval {
                label: "Zero".to_string(),
                start: ts("10:00"),
                end: ts("10:00"),
            }
        );
    }

    #[test]
    fn test_negative_threshold_rejected() {
        assert_eq!(
            free_slots(&[], &window("09:00", "17:00"), -5).unwrap_err(),
            ValidationError::NegativeThreshold(-5)
        );
    }

    #[test]
    fn test_touching_does_not_conflict() {
        let candidate = Candidate {
            start: ts("10:00"),
            end: ts("11:00"),
        };
        let report = has_conflict(&candidate, &[busy("11:00", "12:00", "Next")]);
        assert!(report.available);
        assert!(report.conflicts.is_empty());

        let report = has_conflict(&candidate, &[busy("09:00", "10:00", "Prev")]);
        assert!(report.available);
    }

    #[test]
    fn test_conflicts_in_input_order() {
        let candidate = Candidate {
            start: ts("10:00"),
            end: ts("12:00"),
        };
        let busy = vec![
            busy("11:30", "13:00", "Late"),
            busy("08:00", "09:00", "Early"),
            busy("09:30", "10:30", "Overlap"),
            busy("10:15", "10:45", "Inside"),
        ];
        let report = has_conflict(&candidate, &busy);
        assert!(!report.available);
        let labels: Vec<&str> = report.conflicts.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Late", "Overlap", "Inside"]);
    }

    #[test]
    fn test_empty_busy_is_available() {
        let candidate = Candidate {
            start: ts("10:00"),
            end: ts("11:00"),
        };
        assert!(has_conflict(&candidate, &[]).available);
    }

    #[test]
    fn test_parse_timestamp_requires_offset() {
        assert!(parse_timestamp("2025-06-16T09:00:00Z").is_ok());
        assert_eq!(
            parse_timestamp("2025-06-16T09:00:00+02:00").unwrap(),
            ts("07:00")
        );
        assert!(matches!(
            parse_timestamp("2025-06-16T09:00:00"),
            Err(ValidationError::InvalidTimestamp(_))
        ));
    }
}
