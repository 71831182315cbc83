//! Route and destination weather controller
//!
//! This library provides the controller behind the route/weather page: it
//! validates the search form, queries the route/weather backend, renders the
//! route summary, transit legs and destination weather, and draws the route
//! on an embedded map once the mapping SDK has loaded.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod maps;
pub mod models;
pub mod sdk_loader;
pub mod view;

// Re-export core types for public API
pub use api::{HttpBackend, RouteWeatherBackend};
pub use config::{RouteWeatherConfig, StaleResponsePolicy};
pub use controller::{MapOutcome, RouteWeatherController, SearchOutcome};
pub use error::RouteWeatherError;
pub use maps::{DirectionsRequest, DirectionsStatus, MapSdk, SdkTravelMode};
pub use models::{ResponseBundle, RouteResult, SearchParams, TransitStep, TravelMode, WeatherResult};
pub use sdk_loader::{Provisioning, ScriptInjector, ScriptTag, provision_maps_sdk};
pub use view::{ElementId, MemoryView, Panel, View, VisibilityState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, RouteWeatherError>;
