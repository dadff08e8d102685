use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::WeatherProvider;
use crate::models::WeatherConditions;

const API_BASE: &str = "https://api.weather.gov";
const KMH_TO_MPH: f64 = 0.621371;

/// National Weather Service observations. The API requires a User-Agent.
pub struct NwsWeatherProvider {
    user_agent: String,
    client: reqwest::Client,
}

impl NwsWeatherProvider {
    pub fn new(user_agent: String) -> Self {
        Self {
            user_agent,
            client: reqwest::Client::new(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> anyhow::Result<T> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT, "application/geo+json")
            .send()
            .await
            .with_context(|| format!("failed to call weather API: {url}"))?
            .error_for_status()
            .context("weather API returned error")?;

        resp.json().await.context("failed to parse weather response")
    }
}

#[derive(Deserialize)]
struct Feature<P> {
    properties: P,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointProperties {
    observation_stations: String,
}

#[derive(Deserialize)]
struct StationCollection {
    #[serde(default)]
    features: Vec<Feature<StationProperties>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationProperties {
    station_identifier: String,
}

#[derive(Deserialize)]
struct Measurement {
    value: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObservationProperties {
    #[serde(default)]
    text_description: String,
    temperature: Measurement,
    relative_humidity: Measurement,
    wind_speed: Measurement,
}

impl TryFrom<ObservationProperties> for WeatherConditions {
    type Error = anyhow::Error;

    fn try_from(obs: ObservationProperties) -> anyhow::Result<Self> {
        let celsius = obs
            .temperature
            .value
            .ok_or_else(|| anyhow::anyhow!("observation has no temperature"))?;

        let conditions = if obs.text_description.is_empty() {
            "Unknown".to_string()
        } else {
            obs.text_description
        };

        Ok(WeatherConditions {
            temperature_f: celsius * 9.0 / 5.0 + 32.0,
            temperature_c: celsius,
            conditions,
            humidity: obs.relative_humidity.value.unwrap_or(0.0),
            wind_mph: obs.wind_speed.value.unwrap_or(0.0) * KMH_TO_MPH,
        })
    }
}

#[async_trait]
impl WeatherProvider for NwsWeatherProvider {
    async fn current_conditions(&self, coordinates: &str) -> anyhow::Result<WeatherConditions> {
        let point: Feature<PointProperties> =
            self.get(&format!("{API_BASE}/points/{coordinates}")).await?;

        let stations: StationCollection = self.get(&point.properties.observation_stations).await?;
        let station = stations
            .features
            .into_iter()
            .next()
            .map(|f| f.properties.station_identifier)
            .ok_or_else(|| anyhow::anyhow!("no observation stations near {coordinates}"))?;

        let observation: Feature<ObservationProperties> = self
            .get(&format!("{API_BASE}/stations/{station}/observations/latest"))
            .await?;

        let conditions = WeatherConditions::try_from(observation.properties)?;
        tracing::info!(%coordinates, %station, conditions = %conditions.conditions, "fetched weather");
        Ok(conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_converts_units() {
        let json = r#"{"properties":{
            "textDescription":"Partly Cloudy",
            "temperature":{"unitCode":"wmoUnit:degC","value":20.0},
            "relativeHumidity":{"value":55.5},
            "windSpeed":{"value":16.09344}
        }}"#;
        let obs: Feature<ObservationProperties> = serde_json::from_str(json).unwrap();
        let conditions = WeatherConditions::try_from(obs.properties).unwrap();

        assert!((conditions.temperature_f - 68.0).abs() < 1e-9);
        assert!((conditions.wind_mph - 10.0).abs() < 1e-3);
        assert_eq!(conditions.humidity, 55.5);
        assert_eq!(conditions.conditions, "Partly Cloudy");
    }

    #[test]
    fn test_missing_temperature_is_error() {
        let json = r#"{"properties":{
            "textDescription":"",
            "temperature":{"value":null},
            "relativeHumidity":{"value":null},
            "windSpeed":{"value":null}
        }}"#;
        let obs: Feature<ObservationProperties> = serde_json::from_str(json).unwrap();
        assert!(WeatherConditions::try_from(obs.properties).is_err());
    }

    #[test]
    fn test_station_list_parses() {
        let json = r#"{"features":[{"properties":{"stationIdentifier":"KNYC","name":"Central Park"}}]}"#;
        let stations: StationCollection = serde_json::from_str(json).unwrap();
        assert_eq!(stations.features[0].properties.station_identifier, "KNYC");
    }
}
