use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherConditions {
    pub temperature_f: f64,
    pub temperature_c: f64,
    pub conditions: String,
    pub humidity: f64,
    pub wind_mph: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSummary {
    pub temperature: String,
    pub conditions: String,
    pub wind_speed: String,
    pub humidity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherAnalysis {
    pub is_outdoor_friendly: bool,
    pub outdoor_reasons: Vec<String>,
    pub indoor_reasons: Vec<String>,
    pub summary: WeatherSummary,
}
