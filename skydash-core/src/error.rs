use thiserror::Error;

/// Failure taxonomy for the weather core.
///
/// `NoCredential` doubles as a routing signal: for current-weather and
/// forecast intents the adapter answers it by switching to a public no-key
/// provider, while for the weekly (one-call) intent it reaches the caller
/// unchanged, since that endpoint has no public equivalent.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// A required intent field was absent for the chosen template/endpoint.
    #[error("request is missing a required {0}")]
    MissingParameter(&'static str),

    /// A URL template could not be completed into a usable request URL.
    #[error("weather configuration is incomplete: {0}")]
    IncompleteConfiguration(String),

    /// No usable API key is configured; not fatal for intents with a
    /// public fallback.
    #[error("no usable API key is configured")]
    NoCredential,

    /// The fetch itself failed before a response arrived.
    #[error("network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status, or with a body
    /// that was not JSON at all.
    #[error("provider returned {status}: {message}")]
    Provider { status: u16, message: String },
}
