//! Mapping between [`UnitSystem`] and the provider's `units` query parameter.

use anyhow::anyhow;

use crate::model::UnitSystem;

pub fn to_provider_units(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "metric",
        UnitSystem::Imperial => "imperial",
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow!(
                "Unknown unit system '{value}'. Supported unit systems: metric, imperial."
            )),
        }
    }
}
