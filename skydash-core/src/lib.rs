//! Core library for the `skydash` weather dashboard.
//!
//! This crate defines:
//! - API-key resolution and classification (real key / URL template / none)
//! - Request-URL construction, including the template mini-language
//! - Provider adapters that normalize every response into one shape
//!
//! It is used by `skydash-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod url;

pub use config::{KeyClass, KeySources, StoredConfig, classify};
pub use error::WeatherError;
pub use model::{Coord, FetchOutcome, Forecast, ForecastEntry, RequestIntent, WeatherReport};
pub use provider::{ProviderId, WeatherClient};
