//! wttr.in `format=j1` fallback: current conditions by city name, plus a
//! best-effort daily forecast derived from its per-day summaries. Every
//! numeric field arrives as a string; temperatures may only be available in
//! Fahrenheit and wind only in km/h.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::error::WeatherError;
use crate::model::{Forecast, ForecastEntry, WeatherReport};

use super::{ProviderId, get_json};

const WTTR_URL: &str = "https://wttr.in";

/// Days worth of derived entries when no credential is available.
const FORECAST_DAYS: usize = 5;

fn city_url(city: &str) -> String {
    format!("{WTTR_URL}/{}?format=j1", urlencoding::encode(city))
}

pub(crate) async fn current(http: &Client, city: &str) -> Result<WeatherReport, WeatherError> {
    let parsed: WttrResponse = get_json(http, &city_url(city)).await?;
    Ok(normalize_current(parsed))
}

pub(crate) async fn forecast(http: &Client, city: &str) -> Result<Forecast, WeatherError> {
    let parsed: WttrResponse = get_json(http, &city_url(city)).await?;
    Ok(normalize_forecast(parsed))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WttrValue {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WttrCurrent {
    #[serde(default, rename = "temp_C")]
    temp_c: Option<String>,
    #[serde(default, rename = "temp_F")]
    temp_f: Option<String>,
    #[serde(default)]
    humidity: Option<String>,
    #[serde(default, rename = "windspeedKmph")]
    windspeed_kmph: Option<String>,
    #[serde(default, rename = "weatherDesc")]
    weather_desc: Vec<WttrValue>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WttrArea {
    #[serde(default, rename = "areaName")]
    area_name: Vec<WttrValue>,
    #[serde(default)]
    country: Vec<WttrValue>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WttrHour {
    #[serde(default)]
    time: String,
    #[serde(default, rename = "tempC")]
    temp_c: Option<String>,
    #[serde(default, rename = "weatherDesc")]
    weather_desc: Vec<WttrValue>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WttrDay {
    #[serde(default)]
    date: String,
    #[serde(default, rename = "maxtempC")]
    max_temp_c: Option<String>,
    #[serde(default, rename = "mintempC")]
    min_temp_c: Option<String>,
    #[serde(default)]
    hourly: Vec<WttrHour>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WttrResponse {
    #[serde(default)]
    current_condition: Vec<WttrCurrent>,
    #[serde(default)]
    nearest_area: Vec<WttrArea>,
    #[serde(default)]
    weather: Vec<WttrDay>,
}

pub(crate) fn normalize_current(raw: WttrResponse) -> WeatherReport {
    let cur = raw.current_condition.into_iter().next().unwrap_or_default();
    let area = raw.nearest_area.into_iter().next().unwrap_or_default();

    let temperature_c = parse_num(cur.temp_c.as_deref())
        .or_else(|| parse_num(cur.temp_f.as_deref()).map(fahrenheit_to_celsius))
        .unwrap_or(0.0);

    WeatherReport {
        provider: ProviderId::Wttr.to_string(),
        name: first_value(&area.area_name),
        country: first_value(&area.country),
        description: first_value(&cur.weather_desc),
        // no icon vocabulary on this provider
        icon: String::new(),
        temperature_c,
        humidity_pct: parse_num(cur.humidity.as_deref()),
        wind_speed_mps: parse_num(cur.windspeed_kmph.as_deref()).map(|kmh| kmh / 3.6),
        // coordinates are never echoed back
        coord: None,
    }
}

pub(crate) fn normalize_forecast(raw: WttrResponse) -> Forecast {
    let entries = raw.weather.iter().take(FORECAST_DAYS).filter_map(day_entry).collect();
    Forecast { provider: ProviderId::Wttr.to_string(), entries }
}

/// One derived entry per day: the day's midday timestamp, its min/max
/// temperatures (falling back to the representative hour's temperature),
/// and the representative hour's description.
fn day_entry(day: &WttrDay) -> Option<ForecastEntry> {
    let time = midday(&day.date)?;
    let rep = representative_hour(&day.hourly);

    let rep_temp = rep.and_then(|hour| parse_num(hour.temp_c.as_deref()));
    let temp_min_c = parse_num(day.min_temp_c.as_deref()).or(rep_temp).unwrap_or(0.0);
    let temp_max_c = parse_num(day.max_temp_c.as_deref()).or(rep_temp).unwrap_or(0.0);

    Some(ForecastEntry {
        time,
        temp_min_c,
        temp_max_c,
        description: rep.map(|hour| first_value(&hour.weather_desc)).unwrap_or_default(),
        icon: String::new(),
    })
}

/// The hourly bucket at noon when present, else the middle of whatever the
/// day has.
fn representative_hour(hourly: &[WttrHour]) -> Option<&WttrHour> {
    hourly.iter().find(|hour| hour.time == "1200").or_else(|| hourly.get(hourly.len() / 2))
}

fn midday(date: &str) -> Option<DateTime<Utc>> {
    let noon = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?.and_hms_opt(12, 0, 0)?;
    Some(noon.and_utc())
}

pub(crate) fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

fn parse_num(field: Option<&str>) -> Option<f64> {
    field.and_then(|s| s.trim().parse().ok())
}

fn first_value(values: &[WttrValue]) -> String {
    values.first().map(|v| v.value.clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT_FIXTURE: &str = r#"{
        "current_condition": [{
            "temp_C": "21",
            "temp_F": "70",
            "humidity": "52",
            "windspeedKmph": "18",
            "weatherDesc": [{"value": "Partly cloudy"}]
        }],
        "nearest_area": [{
            "areaName": [{"value": "Lyon"}],
            "country": [{"value": "France"}]
        }]
    }"#;

    #[test]
    fn current_parses_stringly_numbers_and_converts_wind() {
        let raw: WttrResponse = serde_json::from_str(CURRENT_FIXTURE).unwrap();
        let report = normalize_current(raw);

        assert_eq!(report.provider, "wttr.in");
        assert_eq!(report.name, "Lyon");
        assert_eq!(report.country, "France");
        assert_eq!(report.description, "Partly cloudy");
        assert_eq!(report.temperature_c, 21.0);
        assert_eq!(report.humidity_pct, Some(52.0));
        // 18 km/h becomes 5 m/s
        assert!((report.wind_speed_mps.unwrap() - 5.0).abs() < 1e-9);
        // structurally unavailable on this provider
        assert_eq!(report.icon, "");
        assert!(report.coord.is_none());
    }

    #[test]
    fn fahrenheit_is_used_when_celsius_is_absent() {
        let fixture = r#"{
            "current_condition": [{"temp_F": "70", "weatherDesc": [{"value": "Sunny"}]}]
        }"#;
        let raw: WttrResponse = serde_json::from_str(fixture).unwrap();
        let report = normalize_current(raw);

        assert!((report.temperature_c - 21.1).abs() < 0.1);
        // humidity missing entirely: absent, not zero
        assert_eq!(report.humidity_pct, None);
        assert_eq!(report.name, "");
    }

    #[test]
    fn empty_response_degrades_to_defaults() {
        let raw: WttrResponse = serde_json::from_str("{}").unwrap();
        let report = normalize_current(raw);

        assert_eq!(report.temperature_c, 0.0);
        assert_eq!(report.description, "");
        assert_eq!(report.wind_speed_mps, None);
    }

    fn forecast_fixture() -> &'static str {
        r#"{
            "weather": [
                {"date": "2026-08-06", "maxtempC": "27", "mintempC": "16",
                 "hourly": [
                    {"time": "0", "tempC": "17", "weatherDesc": [{"value": "Clear"}]},
                    {"time": "1200", "tempC": "25", "weatherDesc": [{"value": "Sunny"}]},
                    {"time": "2100", "tempC": "20", "weatherDesc": [{"value": "Cloudy"}]}
                 ]},
                {"date": "2026-08-07",
                 "hourly": [
                    {"time": "600", "tempC": "14", "weatherDesc": [{"value": "Mist"}]},
                    {"time": "1800", "tempC": "22", "weatherDesc": [{"value": "Rain"}]}
                 ]},
                {"date": "not-a-date", "maxtempC": "1", "mintempC": "0", "hourly": []}
            ]
        }"#
    }

    #[test]
    fn derived_forecast_uses_midday_and_day_ranges() {
        let raw: WttrResponse = serde_json::from_str(forecast_fixture()).unwrap();
        let forecast = normalize_forecast(raw);

        // the unparseable date is dropped
        assert_eq!(forecast.entries.len(), 2);

        let first = &forecast.entries[0];
        let noon = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap().and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(first.time, noon.and_utc());
        assert_eq!(first.temp_min_c, 16.0);
        assert_eq!(first.temp_max_c, 27.0);
        assert_eq!(first.description, "Sunny");
        assert_eq!(first.icon, "");

        // No min/max fields: the representative hour's temperature stands in,
        // and with no 1200 bucket the middle entry is representative.
        let second = &forecast.entries[1];
        assert_eq!(second.temp_min_c, 22.0);
        assert_eq!(second.temp_max_c, 22.0);
        assert_eq!(second.description, "Rain");
    }

    #[test]
    fn derived_forecast_caps_at_five_days() {
        let days: Vec<String> = (1..=7)
            .map(|d| format!(r#"{{"date": "2026-08-{d:02}", "maxtempC": "20", "mintempC": "10", "hourly": []}}"#))
            .collect();
        let fixture = format!(r#"{{"weather": [{}]}}"#, days.join(","));
        let raw: WttrResponse = serde_json::from_str(&fixture).unwrap();

        assert_eq!(normalize_forecast(raw).entries.len(), 5);
    }

    #[test]
    fn conversion_formula() {
        assert!((fahrenheit_to_celsius(70.0) - 21.111).abs() < 0.001);
        assert_eq!(fahrenheit_to_celsius(32.0), 0.0);
    }
}
