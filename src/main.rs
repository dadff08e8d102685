use std::sync::{Arc, Mutex};

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use eventplanner::config::AppConfig;
use eventplanner::db;
use eventplanner::handlers;
use eventplanner::services::calendar::google::{GoogleCalendarProvider, OAuthCredentials};
use eventplanner::services::messaging::twilio::TwilioSmsProvider;
use eventplanner::services::parser::QueryParser;
use eventplanner::services::search::exa::ExaSearchProvider;
use eventplanner::services::weather::nws::NwsWeatherProvider;
use eventplanner::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    if config.exa_api_key.is_empty() {
        tracing::warn!("EXA_API_KEY not set, searches will fail");
    }
    let search = ExaSearchProvider::new(config.exa_api_key.clone(), config.exa_base_url.clone());

    let credentials = (!config.google_refresh_token.is_empty()).then(|| OAuthCredentials {
        client_id: config.google_client_id.clone(),
        client_secret: config.google_client_secret.clone(),
        refresh_token: config.google_refresh_token.clone(),
    });
    if credentials.is_none() && config.google_access_token.is_empty() {
        tracing::warn!("no Google Calendar credentials, calendar features are disabled");
    }
    let calendar = GoogleCalendarProvider::new(
        config.google_calendar_id.clone(),
        config.google_access_token.clone(),
        credentials,
    );

    let weather = NwsWeatherProvider::new(config.weather_user_agent.clone());

    let messaging = TwilioSmsProvider::new(
        config.twilio_account_sid.clone(),
        config.twilio_auth_token.clone(),
        config.twilio_phone_number.clone(),
    );
    if !messaging.is_configured() {
        tracing::warn!("Twilio not configured, SMS replies will be dropped");
    }

    let parser = QueryParser::new(&config.default_location);
    tracing::info!(default_location = parser.default_location(), "query parser ready");

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        parser,
        search: Box::new(search),
        calendar: Box::new(calendar),
        weather: Box::new(weather),
        messaging: Box::new(messaging),
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(Any);

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/parse", post(handlers::parse::parse_query))
        .route("/api/availability/free", post(handlers::availability::free_slots))
        .route(
            "/api/availability/conflicts",
            post(handlers::availability::conflicts),
        )
        .route("/api/calendar/free", get(handlers::availability::calendar_free))
        .route("/api/web_search", post(handlers::search::web_search))
        .route("/api/search", post(handlers::search::natural_search))
        .route("/api/searches/:id", get(handlers::search::get_search))
        .route("/api/schedule", post(handlers::schedule::schedule_event))
        .route("/api/scheduled", get(handlers::schedule::list_scheduled))
        .route("/webhook/sms", post(handlers::webhook::sms_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
