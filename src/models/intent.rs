use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Vintage,
    Food,
    Art,
    Music,
    Fitness,
    Culture,
    #[default]
    Events,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Vintage => "vintage",
            EventCategory::Food => "food",
            EventCategory::Art => "art",
            EventCategory::Music => "music",
            EventCategory::Fitness => "fitness",
            EventCategory::Culture => "culture",
            EventCategory::Events => "events",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeConstraint {
    Today,
    Tomorrow,
    ThisWeek,
    NextWeek,
    ThisWeekend,
    NextWeekend,
    #[default]
    Unspecified,
}

impl TimeConstraint {
    pub fn as_phrase(&self) -> &'static str {
        match self {
            TimeConstraint::Today => "today",
            TimeConstraint::Tomorrow => "tomorrow",
            TimeConstraint::ThisWeek => "this week",
            TimeConstraint::NextWeek => "next week",
            TimeConstraint::ThisWeekend => "this weekend",
            TimeConstraint::NextWeekend => "next weekend",
            TimeConstraint::Unspecified => "",
        }
    }

    /// Inclusive range of calendar dates the constraint refers to, relative to `today`.
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let weekday = today.weekday().num_days_from_monday() as i64;
        // Saturday of the weekend `today` belongs to (yesterday when today is Sunday)
        let saturday = today + Duration::days(5 - weekday);

        match self {
            TimeConstraint::Today => (today, today),
            TimeConstraint::Tomorrow => {
                let tomorrow = today + Duration::days(1);
                (tomorrow, tomorrow)
            }
            TimeConstraint::ThisWeek => (today, today + Duration::days(6 - weekday)),
            TimeConstraint::NextWeek => {
                let monday = today + Duration::days(7 - weekday);
                (monday, monday + Duration::days(6))
            }
            TimeConstraint::ThisWeekend => (saturday.max(today), saturday + Duration::days(1)),
            TimeConstraint::NextWeekend => {
                let next = saturday + Duration::days(7);
                (next, next + Duration::days(1))
            }
            TimeConstraint::Unspecified => (today, today + Duration::days(7)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    #[default]
    Transit,
    Walking,
    Bicycling,
    Driving,
}

impl TransportMode {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "train" | "subway" | "bus" | "transit" => Some(TransportMode::Transit),
            "walking" | "foot" | "walk" => Some(TransportMode::Walking),
            "bike" | "bicycle" | "biking" | "cycling" | "bicycling" => {
                Some(TransportMode::Bicycling)
            }
            "car" | "driving" | "drive" => Some(TransportMode::Driving),
            _ => None,
        }
    }
}

/// Structured request extracted from a free-text query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Intent {
    pub event_type: EventCategory,
    pub event_phrase: Option<String>,
    pub location: String,
    pub time_constraint: TimeConstraint,
    pub starting_point: Option<String>,
    pub max_travel_minutes: Option<u32>,
    pub transport_mode: TransportMode,
    pub check_conflicts: bool,
    pub original_query: String,
}

impl Intent {
    /// Terms handed to the search collaborator.
    pub fn search_terms(&self) -> String {
        let subject = self
            .event_phrase
            .as_deref()
            .unwrap_or_else(|| self.event_type.as_str());

        [subject, self.location.as_str(), self.time_constraint.as_phrase()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}
