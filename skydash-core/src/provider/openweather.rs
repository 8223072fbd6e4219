//! Keyed OpenWeatherMap endpoints: current conditions, the 5-day/3-hour
//! forecast, and the One Call daily forecast. Requests ask for metric units,
//! so normalization is a straight field renaming.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::error::WeatherError;
use crate::model::{Coord, Forecast, ForecastEntry, WeatherReport};

use super::{ProviderId, get_json};

pub(crate) async fn current(http: &Client, url: &str) -> Result<WeatherReport, WeatherError> {
    let parsed: OwCurrentResponse = get_json(http, url).await?;
    Ok(normalize_current(parsed))
}

pub(crate) async fn forecast(http: &Client, url: &str) -> Result<Forecast, WeatherError> {
    let parsed: OwForecastResponse = get_json(http, url).await?;
    Ok(normalize_forecast(parsed))
}

pub(crate) async fn weekly(http: &Client, url: &str) -> Result<Forecast, WeatherError> {
    let parsed: OwOneCallResponse = get_json(http, url).await?;
    Ok(normalize_weekly(parsed))
}

// Every field is defaulted: a response that drifts from the documented shape
// degrades to empty/zero values instead of failing the whole fetch.

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OwMain {
    #[serde(default)]
    temp: f64,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwWeather {
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    sys: OwSys,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    main: OwMain,
    wind: Option<OwWind>,
    coord: Option<OwCoord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwForecastEntry {
    dt: i64,
    #[serde(default)]
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OwForecastResponse {
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OwDailyTemp {
    #[serde(default)]
    min: f64,
    #[serde(default)]
    max: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwDailyEntry {
    dt: i64,
    #[serde(default)]
    temp: OwDailyTemp,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OwOneCallResponse {
    #[serde(default)]
    daily: Vec<OwDailyEntry>,
}

pub(crate) fn normalize_current(raw: OwCurrentResponse) -> WeatherReport {
    let (description, icon) = first_condition(&raw.weather);

    WeatherReport {
        provider: ProviderId::OpenWeather.to_string(),
        name: raw.name,
        country: raw.sys.country,
        description,
        icon,
        temperature_c: raw.main.temp,
        humidity_pct: raw.main.humidity,
        wind_speed_mps: raw.wind.and_then(|w| w.speed),
        coord: raw.coord.map(|c| Coord { lat: c.lat, lon: c.lon }),
    }
}

pub(crate) fn normalize_forecast(raw: OwForecastResponse) -> Forecast {
    let entries = raw
        .list
        .into_iter()
        .filter_map(|entry| {
            let time = unix_to_utc(entry.dt)?;
            let (description, icon) = first_condition(&entry.weather);
            Some(ForecastEntry {
                time,
                temp_min_c: entry.main.temp_min.unwrap_or(entry.main.temp),
                temp_max_c: entry.main.temp_max.unwrap_or(entry.main.temp),
                description,
                icon,
            })
        })
        .collect();

    Forecast { provider: ProviderId::OpenWeather.to_string(), entries }
}

pub(crate) fn normalize_weekly(raw: OwOneCallResponse) -> Forecast {
    let entries = raw
        .daily
        .into_iter()
        .filter_map(|day| {
            let time = unix_to_utc(day.dt)?;
            let (description, icon) = first_condition(&day.weather);
            Some(ForecastEntry {
                time,
                temp_min_c: day.temp.min,
                temp_max_c: day.temp.max,
                description,
                icon,
            })
        })
        .collect();

    Forecast { provider: ProviderId::OpenWeather.to_string(), entries }
}

fn first_condition(weather: &[OwWeather]) -> (String, String) {
    weather.first().map(|w| (w.description.clone(), w.icon.clone())).unwrap_or_default()
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}
