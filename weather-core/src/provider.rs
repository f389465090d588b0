use crate::{
    Config, WeatherPayload, WeatherRequest, error::ProviderError,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, request: &WeatherRequest)
    -> Result<WeatherPayload, ProviderError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
             Hint: run `weather configure` and enter your OpenWeather API key, \
             or set the WEATHER_API_KEY environment variable."
        )
    })?;

    let provider = OpenWeatherProvider::with_base_url(api_key, config.base_url());
    Ok(Box::new(provider))
}
