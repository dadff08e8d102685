use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub api_token: String,
    pub exa_api_key: String,
    pub exa_base_url: String,
    pub google_calendar_id: String,
    pub google_access_token: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_refresh_token: String,
    pub weather_user_agent: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_phone_number: String,
    pub notify_phone: String,
    pub default_location: String,
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    pub utc_offset_minutes: i32,
    pub min_free_minutes: i64,
    pub search_results: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parsed_var("PORT", 3000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "eventplanner.db".to_string()),
            api_token: env::var("API_TOKEN").unwrap_or_default(),
            exa_api_key: env::var("EXA_API_KEY").unwrap_or_default(),
            exa_base_url: env::var("EXA_BASE_URL")
                .unwrap_or_else(|_| "https://api.exa.ai".to_string()),
            google_calendar_id: env::var("GOOGLE_CALENDAR_ID")
                .unwrap_or_else(|_| "primary".to_string()),
            google_access_token: env::var("GOOGLE_ACCESS_TOKEN").unwrap_or_default(),
            google_client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            google_refresh_token: env::var("GOOGLE_REFRESH_TOKEN").unwrap_or_default(),
            weather_user_agent: env::var("WEATHER_USER_AGENT")
                .unwrap_or_else(|_| "eventplanner (contact@example.com)".to_string()),
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
            twilio_phone_number: env::var("TWILIO_PHONE_NUMBER").unwrap_or_default(),
            notify_phone: env::var("NOTIFY_PHONE").unwrap_or_default(),
            default_location: env::var("DEFAULT_LOCATION").unwrap_or_else(|_| "nyc".to_string()),
            day_start_hour: parsed_var("DAY_START_HOUR", 9),
            day_end_hour: parsed_var("DAY_END_HOUR", 21),
            utc_offset_minutes: parsed_var("UTC_OFFSET_MINUTES", 0),
            min_free_minutes: parsed_var("MIN_FREE_MINUTES", 30),
            search_results: parsed_var("SEARCH_RESULTS", 10),
        }
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
