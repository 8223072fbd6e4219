//! Request-URL construction for every configuration the dashboard supports:
//! a literal OpenWeatherMap key, a user-supplied URL template, or no key at
//! all (in which case [`WeatherError::NoCredential`] tells the adapter to go
//! through a public provider instead).
//!
//! Template placeholders: `{lat}`, `{lon}`, `{city}`, and the credential
//! token `{API key}` / `{API_key}`. Coordinates and city are substituted
//! first so a credential token left over after substitution is always
//! detected.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::{self, KeyClass};
use crate::error::WeatherError;
use crate::model::RequestIntent;

const OWM_CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const OWM_FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";
const OWM_ONECALL_URL: &str = "https://api.openweathermap.org/data/2.5/onecall";

/// `{API key}` or `{API_key}`, case-insensitive, whitespace tolerated
/// inside the braces.
static CREDENTIAL_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{\s*API[ _]key\s*\}").unwrap());

static HAS_APPID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)appid=").unwrap());

/// Turn an intent plus the resolved configuration value into a request URL.
///
/// `Err(NoCredential)` is the fallback trigger for city/coords/forecast
/// intents; only the weekly intent treats it as a final failure.
pub fn build(intent: &RequestIntent, key: &str) -> Result<String, WeatherError> {
    match config::classify(key) {
        KeyClass::Empty | KeyClass::Placeholder => Err(WeatherError::NoCredential),
        KeyClass::Template => expand_template(key, intent),
        KeyClass::LiteralKey => Ok(keyed_url(intent, key)),
    }
}

fn expand_template(template: &str, intent: &RequestIntent) -> Result<String, WeatherError> {
    let mut url = template.to_string();

    if let Some((lat, lon)) = intent.coords() {
        url = url.replace("{lat}", &urlencoding::encode(&lat.to_string()));
        url = url.replace("{lon}", &urlencoding::encode(&lon.to_string()));
    }

    if url.contains("{city}") {
        match intent.city() {
            Some(city) => url = url.replace("{city}", &urlencoding::encode(city)),
            None => return Err(WeatherError::MissingParameter("city name")),
        }
    }

    if CREDENTIAL_PLACEHOLDER.is_match(&url) {
        return Err(WeatherError::IncompleteConfiguration(
            "the URL template still contains an {API key} placeholder; supply a real key"
                .to_string(),
        ));
    }

    if HAS_APPID.is_match(&url) {
        // Pre-authorized template; never append a second credential.
        return Ok(url);
    }

    let sep = if url.contains('?') { '&' } else { '?' };
    Ok(format!("{url}{sep}appid={}", urlencoding::encode(template)))
}

fn keyed_url(intent: &RequestIntent, key: &str) -> String {
    let key = urlencoding::encode(key);
    match intent {
        RequestIntent::ByCity(city) => {
            format!("{OWM_CURRENT_URL}?q={}&units=metric&appid={key}", urlencoding::encode(city))
        }
        RequestIntent::ByCoords { lat, lon } => {
            format!("{OWM_CURRENT_URL}?lat={lat}&lon={lon}&units=metric&appid={key}")
        }
        RequestIntent::ForecastByCity(city) => {
            format!("{OWM_FORECAST_URL}?q={}&units=metric&appid={key}", urlencoding::encode(city))
        }
        RequestIntent::WeeklyByCoords { lat, lon } => format!(
            "{OWM_ONECALL_URL}?lat={lat}&lon={lon}&exclude=minutely,hourly,alerts&units=metric&appid={key}"
        ),
    }
}
