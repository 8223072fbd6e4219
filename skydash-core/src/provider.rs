use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config;
use crate::error::WeatherError;
use crate::model::{FetchOutcome, RequestIntent};
use crate::url;

pub mod openmeteo;
pub mod openweather;
pub mod wttr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    Wttr,
    OpenMeteo,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::Wttr => "wttr.in",
            ProviderId::OpenMeteo => "open-meteo",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weather fetcher for one resolved configuration value.
///
/// Keeps the single last-result slot: each successful fetch overwrites it in
/// completion order, whatever order the requests were issued in. There is no
/// dedup or cancellation; one call, one attempt.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    key: String,
    last: Option<FetchOutcome>,
}

impl WeatherClient {
    pub fn new(key: String) -> Self {
        debug!(key = %config::masked(&key), "weather client ready");
        Self { http: Client::new(), key, last: None }
    }

    /// Most recent successful result, if any.
    pub fn last(&self) -> Option<&FetchOutcome> {
        self.last.as_ref()
    }

    pub async fn fetch(&mut self, intent: &RequestIntent) -> Result<FetchOutcome, WeatherError> {
        let outcome = self.dispatch(intent).await?;
        self.last = Some(outcome.clone());
        Ok(outcome)
    }

    async fn dispatch(&self, intent: &RequestIntent) -> Result<FetchOutcome, WeatherError> {
        match url::build(intent, &self.key) {
            Ok(url) => self.fetch_keyed(intent, &url).await,
            Err(WeatherError::NoCredential) => self.fetch_fallback(intent).await,
            Err(err) => Err(err),
        }
    }

    async fn fetch_keyed(
        &self,
        intent: &RequestIntent,
        url: &str,
    ) -> Result<FetchOutcome, WeatherError> {
        match intent {
            RequestIntent::ByCity(_) | RequestIntent::ByCoords { .. } => {
                Ok(FetchOutcome::Current(openweather::current(&self.http, url).await?))
            }
            RequestIntent::ForecastByCity(_) => {
                Ok(FetchOutcome::Forecast(openweather::forecast(&self.http, url).await?))
            }
            RequestIntent::WeeklyByCoords { .. } => {
                Ok(FetchOutcome::Forecast(openweather::weekly(&self.http, url).await?))
            }
        }
    }

    async fn fetch_fallback(&self, intent: &RequestIntent) -> Result<FetchOutcome, WeatherError> {
        match intent {
            RequestIntent::ByCity(city) => {
                warn!(provider = %ProviderId::Wttr, "no usable API key; using public fallback");
                Ok(FetchOutcome::Current(wttr::current(&self.http, city).await?))
            }
            RequestIntent::ByCoords { lat, lon } => {
                warn!(provider = %ProviderId::OpenMeteo, "no usable API key; using public fallback");
                Ok(FetchOutcome::Current(openmeteo::current(&self.http, *lat, *lon).await?))
            }
            RequestIntent::ForecastByCity(city) => {
                warn!(provider = %ProviderId::Wttr, "no usable API key; deriving forecast from public data");
                Ok(FetchOutcome::Forecast(wttr::forecast(&self.http, city).await?))
            }
            // One Call has no public equivalent; the caller gets the signal.
            RequestIntent::WeeklyByCoords { .. } => Err(WeatherError::NoCredential),
        }
    }
}

/// One GET, one attempt. Non-success responses become [`WeatherError::Provider`]
/// with a reason extracted from the body; a success body that is not valid
/// JSON does too.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    url: &str,
) -> Result<T, WeatherError> {
    let res = http.get(url).send().await?;
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(WeatherError::Provider {
            status: status.as_u16(),
            message: failure_reason(status, &body),
        });
    }

    serde_json::from_str(&body).map_err(|err| WeatherError::Provider {
        status: status.as_u16(),
        message: format!("response body was not valid JSON: {err}"),
    })
}

/// Human-readable reason for a non-success response: the JSON body's
/// `message` field when present, else the HTTP status text.
fn failure_reason(status: StatusCode, body: &str) -> String {
    #[derive(Debug, Default, Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        message: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .message
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_labels() {
        assert_eq!(ProviderId::OpenWeather.as_str(), "openweather");
        assert_eq!(ProviderId::Wttr.to_string(), "wttr.in");
        assert_eq!(ProviderId::OpenMeteo.to_string(), "open-meteo");
    }

    #[test]
    fn failure_reason_prefers_body_message() {
        let reason = failure_reason(StatusCode::NOT_FOUND, r#"{"cod":"404","message":"city not found"}"#);
        assert_eq!(reason, "city not found");
    }

    #[test]
    fn failure_reason_falls_back_to_status_text() {
        // Not JSON at all: tolerated, status text wins.
        assert_eq!(failure_reason(StatusCode::NOT_FOUND, "<html>nope</html>"), "Not Found");
        // JSON with an empty message field.
        assert_eq!(failure_reason(StatusCode::UNAUTHORIZED, r#"{"message":""}"#), "Unauthorized");
    }

    #[test]
    fn providers_agree_on_equivalent_conditions() {
        // The same real-world conditions through the keyed provider and the
        // city fallback: all numeric fields agree in units, and only the
        // structurally unavailable fields differ.
        let keyed: openweather::OwCurrentResponse = serde_json::from_str(
            r#"{
                "coord": {"lon": 4.84, "lat": 45.76},
                "weather": [{"description": "partly cloudy", "icon": "02d"}],
                "main": {"temp": 21.0, "humidity": 52},
                "wind": {"speed": 5.0},
                "sys": {"country": "FR"},
                "name": "Lyon"
            }"#,
        )
        .unwrap();
        let fallback: wttr::WttrResponse = serde_json::from_str(
            r#"{
                "current_condition": [{
                    "temp_C": "21", "humidity": "52", "windspeedKmph": "18",
                    "weatherDesc": [{"value": "Partly cloudy"}]
                }],
                "nearest_area": [{"areaName": [{"value": "Lyon"}], "country": [{"value": "France"}]}]
            }"#,
        )
        .unwrap();

        let keyed = openweather::normalize_current(keyed);
        let fallback = wttr::normalize_current(fallback);

        assert_eq!(keyed.temperature_c, fallback.temperature_c);
        assert_eq!(keyed.humidity_pct, fallback.humidity_pct);
        assert!((keyed.wind_speed_mps.unwrap() - fallback.wind_speed_mps.unwrap()).abs() < 1e-9);
        assert_eq!(keyed.name, fallback.name);
        assert!(!keyed.description.is_empty() && !fallback.description.is_empty());

        // what only the keyed provider can supply
        assert!(!keyed.icon.is_empty() && fallback.icon.is_empty());
        assert!(keyed.coord.is_some() && fallback.coord.is_none());
    }

    #[test]
    fn last_slot_starts_empty() {
        let client = WeatherClient::new("abc123".to_string());
        assert!(client.last().is_none());
    }

    #[tokio::test]
    async fn weekly_without_credential_surfaces_instead_of_falling_back() {
        let mut client = WeatherClient::new(String::new());
        let err = client
            .fetch(&RequestIntent::WeeklyByCoords { lat: 48.85, lon: 2.35 })
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::NoCredential));
        assert!(client.last().is_none());
    }

    #[tokio::test]
    async fn incomplete_template_fails_before_any_request() {
        let mut client =
            WeatherClient::new("https://proxy.example/w?lat={lat}&lon={lon}&appid={API key}".to_string());
        let err = client
            .fetch(&RequestIntent::ByCoords { lat: 10.0, lon: 20.0 })
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::IncompleteConfiguration(_)));
    }
}
