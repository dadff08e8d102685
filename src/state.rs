use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::calendar::CalendarProvider;
use crate::services::messaging::MessagingProvider;
use crate::services::parser::QueryParser;
use crate::services::search::SearchProvider;
use crate::services::weather::WeatherProvider;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub parser: QueryParser,
    pub search: Box<dyn SearchProvider>,
    pub calendar: Box<dyn CalendarProvider>,
    pub weather: Box<dyn WeatherProvider>,
    pub messaging: Box<dyn MessagingProvider>,
}
