//! OpenWeather-style current-weather client.

use crate::error::TesterError;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// How to identify the city in a weather request.
#[derive(Debug, Clone, PartialEq)]
pub enum CityQuery {
    /// By display name, e.g. "London"
    Name(String),
    /// By stable city id
    Id(u64),
    /// By coordinates
    Coords { lat: f64, lon: f64 },
}

impl CityQuery {
    /// Query parameters this variant contributes to the request.
    fn params(&self) -> Vec<(String, String)> {
        match self {
            CityQuery::Name(name) => vec![("q".to_string(), name.clone())],
            CityQuery::Id(id) => vec![("id".to_string(), id.to_string())],
            CityQuery::Coords { lat, lon } => vec![
                ("lat".to_string(), lat.to_string()),
                ("lon".to_string(), lon.to_string()),
            ],
        }
    }
}

/// Numeric fields of the response's `main` object, metric units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherReading {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
}

impl WeatherReading {
    /// Midpoint of the day's min and max, rounded to two decimals.
    pub fn average_temperature(&self) -> f64 {
        ((self.temp_min + self.temp_max) / 2.0 * 100.0).round() / 100.0
    }
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: WeatherReading,
}

/// Seam for the weather source so scenarios can run against a stub.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, query: &CityQuery) -> Result<WeatherReading>;
}

/// HTTP client for the weather API.
pub struct WeatherApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApi {
    /// GET the current weather for `query`.
    ///
    /// Non-200 statuses surface as [`TesterError::HttpFailure`]; there is no
    /// retry.
    async fn current_weather(&self, query: &CityQuery) -> Result<WeatherReading> {
        let mut params = vec![
            ("appid".to_string(), self.api_key.clone()),
            ("units".to_string(), "metric".to_string()),
        ];
        params.extend(query.params());

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(TesterError::HttpFailure {
                status: status.as_u16(),
            }
            .into());
        }

        let body: WeatherResponse = response.json().await?;
        Ok(body.main)
    }
}
