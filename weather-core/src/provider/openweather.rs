use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::ProviderError,
    model::{WeatherPayload, WeatherRequest},
    units::to_provider_units,
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: Option<i64>,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(
        &self,
        request: &WeatherRequest,
    ) -> Result<WeatherPayload, ProviderError> {
        let url = format!("{}/weather", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", request.city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", to_provider_units(request.units)),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        parse_current(&body)
    }
}

fn parse_current(body: &str) -> Result<WeatherPayload, ProviderError> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    let weather = parsed
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Malformed("empty `weather` array".to_string()))?;

    Ok(WeatherPayload {
        name: parsed.name,
        temperature: parsed.main.temp,
        humidity: parsed.main.humidity,
        description: weather.description,
        icon: weather.icon,
        wind_speed: parsed.wind.speed,
        observed_at: parsed.dt.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
