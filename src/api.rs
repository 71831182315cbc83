//! Backend client for the route/weather aggregation service
//!
//! The service exposes two JSON endpoints: one resolving a route together with
//! the destination weather, one handing out the mapping SDK key. Both are
//! reached through the [`RouteWeatherBackend`] trait so the controller can be
//! driven by an in-memory backend in tests.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::BackendConfig;
use crate::models::{ResponseBundle, SearchParams};
use crate::{Result, RouteWeatherError};

/// Shown when a failed response carries no `error` field
pub const GENERIC_FAILURE: &str = "Failed to fetch route and weather data";

/// Capability the controller needs from the backend
#[async_trait]
pub trait RouteWeatherBackend: Send + Sync {
    /// Resolve the route and the weather at its destination
    async fn route_weather(&self, params: &SearchParams) -> Result<ResponseBundle>;

    /// Fetch the mapping SDK key. `None` when the backend has no key configured.
    async fn maps_key(&self) -> Result<Option<String>>;
}

/// Failure body `{error}` of the route-weather endpoint
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Body `{key}` of the key endpoint
#[derive(Debug, Deserialize)]
struct KeyBody {
    #[serde(default)]
    key: Option<String>,
}

/// reqwest implementation of [`RouteWeatherBackend`]
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    route_weather_url: String,
    google_key_url: String,
}

impl HttpBackend {
    /// Create a client for the endpoints named in `config`
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds.into()));
        }
        let client = builder.build().map_err(|e| {
            RouteWeatherError::config(format!("Failed to create HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            route_weather_url: config.route_weather_url(),
            google_key_url: config.google_key_url(),
        })
    }
}

#[async_trait]
impl RouteWeatherBackend for HttpBackend {
    #[instrument(skip(self), fields(mode = %params.mode))]
    async fn route_weather(&self, params: &SearchParams) -> Result<ResponseBundle> {
        debug!("Requesting route and weather from {}", self.route_weather_url);
        let response = self
            .client
            .post(&self.route_weather_url)
            .json(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            warn!(%status, "Route weather request failed: {}", message);
            return Err(RouteWeatherError::api(message));
        }

        serde_json::from_slice(&body).map_err(|e| {
            warn!("Route weather response could not be parsed: {}", e);
            RouteWeatherError::api(format!("Invalid response from route service: {e}"))
        })
    }

    #[instrument(skip(self))]
    async fn maps_key(&self) -> Result<Option<String>> {
        let response = self.client.get(&self.google_key_url).send().await?;
        let body: KeyBody = response.json().await?;
        Ok(body.key.filter(|k| !k.is_empty()))
    }
}
