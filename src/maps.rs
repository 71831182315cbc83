//! Mapping SDK integration
//!
//! The SDK is consumed through [`MapSdk`]: build a map with a directions
//! renderer attached, ask the directions service for a route, hand the result
//! to the renderer. [`MapDisplay`] owns the SDK once its ready callback fired
//! and builds the map lazily.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::config::MapsConfig;
use crate::view::ElementId;

/// Travel mode constants of the mapping SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkTravelMode {
    Driving,
    Transit,
    Walking,
    Bicycling,
}

impl SdkTravelMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SdkTravelMode::Driving => "DRIVING",
            SdkTravelMode::Transit => "TRANSIT",
            SdkTravelMode::Walking => "WALKING",
            SdkTravelMode::Bicycling => "BICYCLING",
        }
    }

    /// Translate the mode echoed by the backend. Anything unrecognised,
    /// including a missing mode, draws a driving route.
    #[must_use]
    pub fn from_route_mode(mode: Option<&str>) -> Self {
        match mode {
            Some("driving") => SdkTravelMode::Driving,
            Some("transit") => SdkTravelMode::Transit,
            Some("walking") => SdkTravelMode::Walking,
            Some("bicycling") => SdkTravelMode::Bicycling,
            _ => SdkTravelMode::Driving,
        }
    }
}

/// Status reported by the directions service when no route is returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectionsStatus {
    NotFound,
    ZeroResults,
    MaxWaypointsExceeded,
    MaxRouteLengthExceeded,
    InvalidRequest,
    OverQueryLimit,
    RequestDenied,
    UnknownError,
    Other(String),
}

impl DirectionsStatus {
    /// Map a status code string of the SDK
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "NOT_FOUND" => DirectionsStatus::NotFound,
            "ZERO_RESULTS" => DirectionsStatus::ZeroResults,
            "MAX_WAYPOINTS_EXCEEDED" => DirectionsStatus::MaxWaypointsExceeded,
            "MAX_ROUTE_LENGTH_EXCEEDED" => DirectionsStatus::MaxRouteLengthExceeded,
            "INVALID_REQUEST" => DirectionsStatus::InvalidRequest,
            "OVER_QUERY_LIMIT" => DirectionsStatus::OverQueryLimit,
            "REQUEST_DENIED" => DirectionsStatus::RequestDenied,
            "UNKNOWN_ERROR" => DirectionsStatus::UnknownError,
            other => DirectionsStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DirectionsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            DirectionsStatus::NotFound => "NOT_FOUND",
            DirectionsStatus::ZeroResults => "ZERO_RESULTS",
            DirectionsStatus::MaxWaypointsExceeded => "MAX_WAYPOINTS_EXCEEDED",
            DirectionsStatus::MaxRouteLengthExceeded => "MAX_ROUTE_LENGTH_EXCEEDED",
            DirectionsStatus::InvalidRequest => "INVALID_REQUEST",
            DirectionsStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            DirectionsStatus::RequestDenied => "REQUEST_DENIED",
            DirectionsStatus::UnknownError => "UNKNOWN_ERROR",
            DirectionsStatus::Other(code) => code,
        };
        f.write_str(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// One entry of the map's style list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapStyle {
    pub feature_type: String,
    pub element_type: String,
    pub color: String,
}

/// Initial view of the map
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: u8,
    pub styles: Vec<MapStyle>,
}

/// Look of the route drawn by the directions renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererOptions {
    pub suppress_markers: bool,
    pub stroke_color: String,
    pub stroke_weight: u8,
}

impl MapOptions {
    #[must_use]
    pub fn from_config(config: &MapsConfig) -> Self {
        let style = |feature_type: &str, color: &str| MapStyle {
            feature_type: feature_type.to_string(),
            element_type: "geometry".to_string(),
            color: color.to_string(),
        };
        Self {
            center: LatLng {
                lat: config.center_lat,
                lng: config.center_lng,
            },
            zoom: config.zoom,
            styles: vec![
                style("water", &config.water_color),
                style("landscape", &config.landscape_color),
            ],
        }
    }
}

impl RendererOptions {
    #[must_use]
    pub fn from_config(config: &MapsConfig) -> Self {
        Self {
            suppress_markers: false,
            stroke_color: config.stroke_color.clone(),
            stroke_weight: config.stroke_weight,
        }
    }
}

/// Directions lookup between two resolved addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionsRequest {
    pub origin: String,
    pub destination: String,
    pub travel_mode: SdkTravelMode,
}

/// Capabilities of the mapping SDK used by the controller
#[async_trait]
pub trait MapSdk: Send + Sync + 'static {
    /// Map widget together with its attached directions renderer
    type Map: Send;
    /// Directions result as returned by the SDK
    type Directions: Send;

    /// Build the map inside `container` and attach a directions renderer
    fn construct_map(
        &self,
        container: ElementId,
        options: &MapOptions,
        renderer: &RendererOptions,
    ) -> Self::Map;

    async fn request_directions(
        &self,
        request: &DirectionsRequest,
    ) -> std::result::Result<Self::Directions, DirectionsStatus>;

    /// Replace the route currently drawn by the map's renderer
    fn render_directions(&self, map: &mut Self::Map, directions: Self::Directions);
}

/// The map widget of the page.
///
/// Unavailable until the SDK reports ready; after that the map is built once
/// and reused for every route.
pub struct MapDisplay<S: MapSdk> {
    sdk: Option<Arc<S>>,
    map: Option<S::Map>,
    options: MapOptions,
    renderer: RendererOptions,
}

impl<S: MapSdk> MapDisplay<S> {
    #[must_use]
    pub fn new(config: &MapsConfig) -> Self {
        Self {
            sdk: None,
            map: None,
            options: MapOptions::from_config(config),
            renderer: RendererOptions::from_config(config),
        }
    }

    /// Ready callback: keep the SDK and build the map right away
    pub fn attach(&mut self, sdk: S) {
        self.sdk = Some(Arc::new(sdk));
        self.map = None;
        self.ensure_map();
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.sdk.is_some()
    }

    /// Build the map if needed and hand out the SDK for a directions request.
    /// `None` while the SDK is not loaded.
    pub fn ensure_map(&mut self) -> Option<Arc<S>> {
        let sdk = self.sdk.clone()?;
        if self.map.is_none() {
            tracing::debug!("Constructing map widget");
            self.map = Some(sdk.construct_map(ElementId::Map, &self.options, &self.renderer));
        }
        Some(sdk)
    }

    /// Draw `directions` on the existing map
    pub fn render(&mut self, directions: S::Directions) {
        if let (Some(sdk), Some(map)) = (self.sdk.as_ref(), self.map.as_mut()) {
            sdk.render_directions(map, directions);
        }
    }
}
