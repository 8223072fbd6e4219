//! open-meteo fallback: current conditions by coordinates, no key needed.
//! The request asks for wind in m/s, so values arrive already in the units
//! the dashboard displays.

use reqwest::Client;
use serde::Deserialize;

use crate::error::WeatherError;
use crate::model::{Coord, WeatherReport};

use super::{ProviderId, get_json};

const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

pub(crate) async fn current(
    http: &Client,
    lat: f64,
    lon: f64,
) -> Result<WeatherReport, WeatherError> {
    let url = format!(
        "{OPEN_METEO_URL}?latitude={lat}&longitude={lon}&current_weather=true&windspeed_unit=ms"
    );
    let parsed: OmResponse = get_json(http, &url).await?;
    Ok(normalize_current(parsed, lat, lon))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OmCurrentWeather {
    #[serde(default)]
    temperature: f64,
    windspeed: Option<f64>,
    #[serde(default, rename = "weathercode")]
    weather_code: i64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OmResponse {
    #[serde(default)]
    current_weather: OmCurrentWeather,
}

/// The provider neither geocodes back to a place name nor echoes the
/// queried position, so the report carries the coordinates the caller
/// asked for and a synthesized weather-code description.
pub(crate) fn normalize_current(raw: OmResponse, lat: f64, lon: f64) -> WeatherReport {
    WeatherReport {
        provider: ProviderId::OpenMeteo.to_string(),
        name: String::new(),
        country: String::new(),
        description: format!("Weather code {}", raw.current_weather.weather_code),
        icon: String::new(),
        temperature_c: raw.current_weather.temperature,
        humidity_pct: None,
        wind_speed_mps: raw.current_weather.windspeed,
        coord: Some(Coord { lat, lon }),
    }
}
