use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Measurement convention used for temperature and wind speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn toggle(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    pub fn temperature_symbol(self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn wind_speed_unit(self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    /// Scale name as shown on the unit toggle ("Switch to Fahrenheit").
    pub fn scale_name(self) -> &'static str {
        match self {
            UnitSystem::Metric => "Celsius",
            UnitSystem::Imperial => "Fahrenheit",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(crate::units::to_provider_units(*self))
    }
}

/// One lookup as sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherRequest {
    pub city: String,
    pub units: UnitSystem,
}

/// Provider output, already normalized away from the wire format but not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPayload {
    pub name: String,
    pub temperature: f64,
    pub humidity: f64,
    pub description: String,
    pub icon: String,
    pub wind_speed: f64,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Result of one successful query, handed by value to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city_label: String,
    pub temperature: f64,
    pub unit_system: UnitSystem,
    pub description: String,
    pub icon_code: String,
    pub humidity_percent: u8,
    pub wind_speed: f64,
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherSnapshot {
    /// Builds a snapshot stamped with the unit system of the originating request.
    ///
    /// Humidity outside `0..=100`, negative wind speed, or non-finite numbers are
    /// treated as a malformed payload.
    pub fn from_payload(payload: WeatherPayload, units: UnitSystem) -> Result<Self, ProviderError> {
        if !payload.temperature.is_finite() {
            return Err(ProviderError::Malformed(format!(
                "temperature is not a finite number: {}",
                payload.temperature
            )));
        }

        if !(0.0..=100.0).contains(&payload.humidity) {
            return Err(ProviderError::Malformed(format!(
                "humidity out of range: {}",
                payload.humidity
            )));
        }

        if !payload.wind_speed.is_finite() || payload.wind_speed < 0.0 {
            return Err(ProviderError::Malformed(format!(
                "wind speed out of range: {}",
                payload.wind_speed
            )));
        }

        Ok(Self {
            city_label: payload.name,
            temperature: payload.temperature,
            unit_system: units,
            description: payload.description,
            icon_code: payload.icon,
            humidity_percent: payload.humidity.round() as u8,
            wind_speed: payload.wind_speed,
            observed_at: payload.observed_at,
        })
    }

    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon_code)
    }

    pub fn temperature_label(&self) -> String {
        format!("{}{}", self.temperature, self.unit_system.temperature_symbol())
    }

    pub fn wind_speed_label(&self) -> String {
        format!("{} {}", self.wind_speed, self.unit_system.wind_speed_unit())
    }
}
