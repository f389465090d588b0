//! Plain-text rendering of what the core hands over.

use std::fmt::Write;

use weather_core::{QueryView, WeatherSnapshot};

/// Main screen: loading indicator, error line, or a short weather card.
pub fn summary(view: &QueryView) -> String {
    if view.loading {
        return "Loading...".to_string();
    }

    if let Some(error) = &view.error {
        return format!("Error: {error}");
    }

    match &view.snapshot {
        Some(snap) => format!(
            "{}\n  {}\n  {}\n  icon: {}",
            snap.city_label,
            snap.temperature_label(),
            snap.description,
            snap.icon_url(),
        ),
        None => String::new(),
    }
}

/// Details screen for one snapshot.
pub fn details(snap: &WeatherSnapshot) -> String {
    let mut out = String::from("Weather Details\n");
    let _ = writeln!(out, "  City: {}", snap.city_label);
    let _ = writeln!(out, "  Temperature: {}", snap.temperature_label());
    let _ = writeln!(out, "  Description: {}", snap.description);
    let _ = writeln!(out, "  Humidity: {}%", snap.humidity_percent);
    let _ = write!(out, "  Wind Speed: {}", snap.wind_speed_label());

    if let Some(observed) = snap.observed_at {
        let _ = write!(out, "\n  Observed: {}", observed.format("%Y-%m-%d %H:%M UTC"));
    }

    out
}

pub fn recent(cities: &[String]) -> String {
    if cities.is_empty() {
        return "No recent searches yet.".to_string();
    }

    let mut out = String::from("Recently Searched Cities:");
    for city in cities {
        let _ = write!(out, "\n  {city}");
    }
    out
}
