pub mod availability;
pub mod calendar;
pub mod intent;
pub mod scheduled;
pub mod search;
pub mod weather;

pub use availability::{AvailabilityWindow, BusyInterval, Candidate, ConflictReport, FreeSlot};
pub use calendar::{CalendarEvent, EventTime};
pub use intent::{EventCategory, Intent, TimeConstraint, TransportMode};
pub use scheduled::ScheduledEvent;
pub use search::{NumberedResult, SearchResult, StoredSearch};
pub use weather::{WeatherAnalysis, WeatherConditions, WeatherSummary};
