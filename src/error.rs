//! Error types and handling for the route/weather controller

use thiserror::Error;

/// Main error type for the route/weather controller
#[derive(Error, Debug)]
pub enum RouteWeatherError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Backend communication errors. The message is shown to the user verbatim.
    #[error("{message}")]
    Api { message: String },

    /// Input validation errors
    #[error("{message}")]
    Validation { message: String },
}

impl RouteWeatherError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get the message shown in the error panel
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            RouteWeatherError::Config { .. } => {
                "Configuration error. Please check your config file and backend URL.".to_string()
            }
            RouteWeatherError::Api { message } | RouteWeatherError::Validation { message } => {
                message.clone()
            }
        }
    }
}

impl From<reqwest::Error> for RouteWeatherError {
    fn from(err: reqwest::Error) -> Self {
        Self::api(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = RouteWeatherError::config("missing base url");
        assert!(matches!(config_err, RouteWeatherError::Config { .. }));

        let api_err = RouteWeatherError::api("Invalid travel mode");
        assert!(matches!(api_err, RouteWeatherError::Api { .. }));

        let validation_err = RouteWeatherError::validation("empty origin");
        assert!(matches!(validation_err, RouteWeatherError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = RouteWeatherError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let api_err = RouteWeatherError::api("Origin and destination are required");
        assert_eq!(api_err.user_message(), "Origin and destination are required");

        let validation_err = RouteWeatherError::validation("test input");
        assert_eq!(validation_err.user_message(), "test input");
    }

    #[test]
    fn test_api_error_displays_verbatim() {
        let err = RouteWeatherError::api("Weather API error: city not found");
        assert_eq!(err.to_string(), "Weather API error: city not found");
    }
}
