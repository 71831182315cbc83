//! Configuration management for the route/weather controller
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::RouteWeatherError;
use crate::models::DEFAULT_ICON_URL_TEMPLATE;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteWeatherConfig {
    /// Backend endpoint configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Mapping SDK configuration
    #[serde(default)]
    pub maps: MapsConfig,
    /// Weather rendering configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Controller behaviour
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Origin the API paths are resolved against
    #[serde(default = "default_backend_base_url")]
    pub base_url: String,
    #[serde(default = "default_route_weather_path")]
    pub route_weather_path: String,
    #[serde(default = "default_google_key_path")]
    pub google_key_path: String,
    /// Request timeout in seconds. Unset means requests may hang indefinitely.
    #[serde(default)]
    pub timeout_seconds: Option<u32>,
}

/// Mapping SDK settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    /// Script URL of the mapping SDK, without query string
    #[serde(default = "default_maps_sdk_url")]
    pub sdk_url: String,
    /// Name of the global ready callback the SDK invokes once loaded
    #[serde(default = "default_maps_callback")]
    pub callback_name: String,
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,
    #[serde(default = "default_center_lng")]
    pub center_lng: f64,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_water_color")]
    pub water_color: String,
    #[serde(default = "default_landscape_color")]
    pub landscape_color: String,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    #[serde(default = "default_stroke_weight")]
    pub stroke_weight: u8,
}

/// Weather rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Icon URL template; `{icon}` is replaced by the icon code
    #[serde(default = "default_icon_url_template")]
    pub icon_url_template: String,
}

/// How overlapping searches are resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleResponsePolicy {
    /// Whichever response resolves last is rendered
    #[default]
    LastResolved,
    /// Only the response to the most recent trigger is rendered
    LatestRequest,
}

/// Controller behaviour settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub stale_responses: StaleResponsePolicy,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_backend_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_route_weather_path() -> String {
    "/api/route-weather".to_string()
}

fn default_google_key_path() -> String {
    "/api/get-google-key".to_string()
}

fn default_maps_sdk_url() -> String {
    "https://maps.googleapis.com/maps/api/js".to_string()
}

fn default_maps_callback() -> String {
    "initMap".to_string()
}

fn default_center_lat() -> f64 {
    40.7128
}

fn default_center_lng() -> f64 {
    -74.0060
}

fn default_zoom() -> u8 {
    7
}

fn default_water_color() -> String {
    "#a2daf2".to_string()
}

fn default_landscape_color() -> String {
    "#f5f5f5".to_string()
}

fn default_stroke_color() -> String {
    "#667eea".to_string()
}

fn default_stroke_weight() -> u8 {
    5
}

fn default_icon_url_template() -> String {
    DEFAULT_ICON_URL_TEMPLATE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_base_url(),
            route_weather_path: default_route_weather_path(),
            google_key_path: default_google_key_path(),
            timeout_seconds: None,
        }
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            sdk_url: default_maps_sdk_url(),
            callback_name: default_maps_callback(),
            center_lat: default_center_lat(),
            center_lng: default_center_lng(),
            zoom: default_zoom(),
            water_color: default_water_color(),
            landscape_color: default_landscape_color(),
            stroke_color: default_stroke_color(),
            stroke_weight: default_stroke_weight(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            icon_url_template: default_icon_url_template(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl BackendConfig {
    /// Absolute URL of the route-weather endpoint
    #[must_use]
    pub fn route_weather_url(&self) -> String {
        join_url(&self.base_url, &self.route_weather_path)
    }

    /// Absolute URL of the map key endpoint
    #[must_use]
    pub fn google_key_url(&self) -> String {
        join_url(&self.base_url, &self.google_key_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

impl RouteWeatherConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // ROUTE_WEATHER_BACKEND__BASE_URL=... overrides backend.base_url
        builder = builder.add_source(
            Environment::with_prefix("ROUTE_WEATHER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: RouteWeatherConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("route-weather").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.backend.base_url.is_empty() {
            self.backend.base_url = default_backend_base_url();
        }
        if self.backend.route_weather_path.is_empty() {
            self.backend.route_weather_path = default_route_weather_path();
        }
        if self.backend.google_key_path.is_empty() {
            self.backend.google_key_path = default_google_key_path();
        }
        if self.maps.sdk_url.is_empty() {
            self.maps.sdk_url = default_maps_sdk_url();
        }
        if self.maps.callback_name.is_empty() {
            self.maps.callback_name = default_maps_callback();
        }
        if self.maps.zoom == 0 {
            self.maps.zoom = default_zoom();
        }
        if self.maps.stroke_weight == 0 {
            self.maps.stroke_weight = default_stroke_weight();
        }
        if self.weather.icon_url_template.is_empty() {
            self.weather.icon_url_template = default_icon_url_template();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_urls()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_urls(&self) -> Result<()> {
        for (name, url) in [
            ("Backend base URL", &self.backend.base_url),
            ("Maps SDK URL", &self.maps.sdk_url),
            ("Weather icon URL template", &self.weather.icon_url_template),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(RouteWeatherError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        for (name, path) in [
            ("Route weather path", &self.backend.route_weather_path),
            ("Google key path", &self.backend.google_key_path),
        ] {
            if !path.starts_with('/') {
                return Err(
                    RouteWeatherError::config(format!("{name} must start with '/'")).into(),
                );
            }
        }

        if !self.weather.icon_url_template.contains("{icon}") {
            return Err(RouteWeatherError::config(
                "Weather icon URL template must contain the {icon} placeholder",
            )
            .into());
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if let Some(timeout) = self.backend.timeout_seconds {
            if timeout == 0 || timeout > 300 {
                return Err(RouteWeatherError::config(
                    "Backend timeout must be between 1 and 300 seconds",
                )
                .into());
            }
        }

        if self.maps.zoom > 21 {
            return Err(RouteWeatherError::config("Map zoom cannot exceed 21").into());
        }

        if !(-90.0..=90.0).contains(&self.maps.center_lat)
            || !(-180.0..=180.0).contains(&self.maps.center_lng)
        {
            return Err(RouteWeatherError::config(
                "Map centre must be a valid latitude/longitude pair",
            )
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(RouteWeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(RouteWeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if self.maps.callback_name.contains(|c: char| !c.is_ascii_alphanumeric() && c != '_') {
            return Err(RouteWeatherError::config(
                "Maps callback name must be a plain identifier",
            )
            .into());
        }

        Ok(())
    }
}
