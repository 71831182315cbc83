//! Route model: travel modes, search parameters and the resolved route

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RouteWeatherError;

/// Travel mode offered by the mode selector
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Transit,
    Walking,
    Bicycling,
}

impl TravelMode {
    /// Every mode, in the order the selector shows them
    pub const ALL: [TravelMode; 4] = [
        TravelMode::Driving,
        TravelMode::Transit,
        TravelMode::Walking,
        TravelMode::Bicycling,
    ];

    /// Wire name, also used as the `data-mode` attribute value
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Transit => "transit",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = RouteWeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driving" => Ok(TravelMode::Driving),
            "transit" => Ok(TravelMode::Transit),
            "walking" => Ok(TravelMode::Walking),
            "bicycling" => Ok(TravelMode::Bicycling),
            other => Err(RouteWeatherError::validation(format!(
                "Invalid travel mode '{other}'. Must be one of: {}",
                TravelMode::ALL.map(TravelMode::as_str).join(", ")
            ))),
        }
    }
}

/// Parameters of a single search, built fresh on every trigger.
///
/// Serializes to the backend request body `{origin, destination, mode}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub origin: String,
    pub destination: String,
    pub mode: TravelMode,
}

impl SearchParams {
    pub const MISSING_LOCATION: &'static str =
        "Please enter both starting location and destination";

    /// Trim both locations and reject the pair when either ends up empty
    pub fn new(origin: &str, destination: &str, mode: TravelMode) -> crate::Result<Self> {
        let origin = origin.trim();
        let destination = destination.trim();
        if origin.is_empty() || destination.is_empty() {
            return Err(RouteWeatherError::validation(Self::MISSING_LOCATION));
        }
        Ok(Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            mode,
        })
    }
}

/// One public-transit leg of a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitStep {
    /// Vehicle type, e.g. "Bus" or "Subway"
    pub vehicle: String,
    /// Line short name, or the full name when no short name exists
    pub line: String,
    /// Departure stop name
    pub departure: String,
    /// Arrival stop name
    pub arrival: String,
    pub num_stops: u32,
}

impl TransitStep {
    /// "Bus: M15"
    #[must_use]
    pub fn headline(&self) -> String {
        format!("{}: {}", self.vehicle, self.line)
    }

    /// "Penn Station → Back Bay"
    #[must_use]
    pub fn stops_summary(&self) -> String {
        format!("{} → {}", self.departure, self.arrival)
    }

    #[must_use]
    pub fn stop_count(&self) -> String {
        format!("{} stops", self.num_stops)
    }
}

/// Route summary resolved by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteResult {
    pub start_address: String,
    pub end_address: String,
    pub distance: String,
    pub duration: String,
    /// Transit legs; only present for transit routes
    #[serde(default)]
    pub transit_details: Vec<TransitStep>,
    /// Mode echoed by the backend. Kept raw: unknown values must not fail parsing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Encoded overview polyline of the route
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview_polyline: Option<String>,
}

impl RouteResult {
    #[must_use]
    pub fn has_transit(&self) -> bool {
        !self.transit_details.is_empty()
    }
}
