//! Data models exchanged with the route/weather backend
//!
//! - Route: travel modes, search parameters, route summary and transit legs
//! - Weather: destination weather readings

pub mod route;
pub mod weather;

use serde::{Deserialize, Serialize};

pub use route::{RouteResult, SearchParams, TransitStep, TravelMode};
pub use weather::{DEFAULT_ICON_URL_TEMPLATE, WeatherResult};

/// Successful response body of the route-weather endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBundle {
    pub route: RouteResult,
    pub weather: WeatherResult,
}
