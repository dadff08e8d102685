pub mod nws;

use async_trait::async_trait;

use crate::models::{WeatherAnalysis, WeatherConditions, WeatherSummary};

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Latest observed conditions at `coordinates` ("lat,lon").
    async fn current_conditions(&self, coordinates: &str) -> anyhow::Result<WeatherConditions>;
}

const BAD_CONDITIONS: &[&str] = &["Rain", "Snow", "Storm", "Thunder", "Fog", "Haze"];
const MIN_OUTDOOR_F: f64 = 40.0;
const MAX_OUTDOOR_F: f64 = 95.0;
const MAX_WIND_MPH: f64 = 20.0;
const HUMID_PERCENT: f64 = 80.0;

/// Judge whether current conditions suit outdoor events.
pub fn analyze_for_events(weather: &WeatherConditions) -> WeatherAnalysis {
    let summary = WeatherSummary {
        temperature: format!(
            "{:.0}°F ({:.0}°C)",
            weather.temperature_f, weather.temperature_c
        ),
        conditions: weather.conditions.clone(),
        wind_speed: format!("{:.0} mph", weather.wind_mph),
        humidity: format!("{:.0}%", weather.humidity),
    };

    let mut is_outdoor_friendly = true;
    let mut outdoor_reasons = Vec::new();
    let mut indoor_reasons = Vec::new();

    if weather.temperature_f < MIN_OUTDOOR_F || weather.temperature_f > MAX_OUTDOOR_F {
        is_outdoor_friendly = false;
        indoor_reasons.push(format!("Temperature is {}", summary.temperature));
    }

    if BAD_CONDITIONS.iter().any(|c| weather.conditions.contains(c)) {
        is_outdoor_friendly = false;
        indoor_reasons.push(format!("Weather conditions: {}", weather.conditions));
    }

    // Wind and humidity are notes on the outdoor side
    if weather.wind_mph > MAX_WIND_MPH {
        is_outdoor_friendly = false;
        outdoor_reasons.push(format!("High winds: {}", summary.wind_speed));
    }

    if weather.humidity > HUMID_PERCENT {
        outdoor_reasons.push(format!("High humidity: {}", summary.humidity));
    }

    if is_outdoor_friendly {
        outdoor_reasons = vec![
            format!("Temperature: {}", summary.temperature),
            format!("Conditions: {}", summary.conditions),
            format!("Wind: {}", summary.wind_speed),
            format!("Humidity: {}", summary.humidity),
        ];
    }

    WeatherAnalysis {
        is_outdoor_friendly,
        outdoor_reasons,
        indoor_reasons,
        summary,
    }
}
