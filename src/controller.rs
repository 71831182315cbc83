//! The route/weather page controller
//!
//! Reads the search form, queries the backend and projects the response onto
//! the results panel and the map. Every operation takes `&self` so event
//! handlers can run concurrently; state lives behind short-lived locks that
//! are never held across an `.await`.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::api::RouteWeatherBackend;
use crate::config::{RouteWeatherConfig, StaleResponsePolicy};
use crate::maps::{DirectionsRequest, DirectionsStatus, MapDisplay, MapSdk, SdkTravelMode};
use crate::models::{ResponseBundle, RouteResult, SearchParams, TravelMode};
use crate::view::{ElementId, Panel, View, VisibilityState};

/// How a search trigger ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results panel populated; the map step ended as reported
    Rendered(MapOutcome),
    /// Validation failed, no request was sent
    Rejected(String),
    /// Backend request failed; the message is shown in the error panel
    Failed(String),
    /// A newer search was issued meanwhile and this response was dropped
    Superseded,
}

/// How drawing a route on the map ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOutcome {
    Drawn,
    /// Mapping SDK not loaded (no key, or script still loading)
    Unavailable,
    /// Directions service returned no route; logged only
    Failed(DirectionsStatus),
    /// Route belonged to a superseded search
    Superseded,
}

#[derive(Debug, Default)]
struct ControllerState {
    selected_mode: TravelMode,
    has_searched: bool,
    latest_request: u64,
    in_flight: usize,
}

struct Page<V> {
    view: V,
    visibility: VisibilityState,
}

/// Counts a search as in flight until dropped. The last one out clears
/// loading and busy, also when the search future is cancelled mid-request.
struct InFlight<'a, V: View> {
    state: &'a Mutex<ControllerState>,
    page: &'a Mutex<Page<V>>,
}

impl<'a, V: View> InFlight<'a, V> {
    fn enter(state: &'a Mutex<ControllerState>, page: &'a Mutex<Page<V>>) -> (Self, u64) {
        let request_id = {
            let mut state = state.lock();
            state.latest_request += 1;
            state.in_flight += 1;
            state.latest_request
        };
        (Self { state, page }, request_id)
    }
}

impl<V: View> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        let idle = {
            let mut state = self.state.lock();
            state.in_flight -= 1;
            state.in_flight == 0
        };
        if idle {
            let mut page = self.page.lock();
            page.set_panel(Panel::Loading, false);
            page.view.set_busy(false);
        }
    }
}

impl<V: View> Page<V> {
    fn set_panel(&mut self, panel: Panel, visible: bool) {
        self.visibility.set(panel, visible);
        self.view.set_panel_visible(panel, visible);
    }

    fn show_error(&mut self, message: &str) {
        self.view.set_text(ElementId::Error, message);
        self.set_panel(Panel::Error, true);
    }
}

/// Controller of the route/weather page, created once per page load
pub struct RouteWeatherController<B, S, V>
where
    B: RouteWeatherBackend,
    S: MapSdk,
    V: View,
{
    backend: B,
    page: Mutex<Page<V>>,
    map: Mutex<MapDisplay<S>>,
    state: Mutex<ControllerState>,
    icon_url_template: String,
    stale_responses: StaleResponsePolicy,
}

impl<B, S, V> RouteWeatherController<B, S, V>
where
    B: RouteWeatherBackend,
    S: MapSdk,
    V: View,
{
    /// Bind the controller to `view`. The default travel mode is marked active.
    pub fn new(backend: B, mut view: V, config: &RouteWeatherConfig) -> Self {
        let state = ControllerState::default();
        view.set_active_mode(state.selected_mode);

        Self {
            backend,
            page: Mutex::new(Page {
                view,
                visibility: VisibilityState::default(),
            }),
            map: Mutex::new(MapDisplay::new(&config.maps)),
            state: Mutex::new(state),
            icon_url_template: config.weather.icon_url_template.clone(),
            stale_responses: config.controller.stale_responses,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run `f` against the page, e.g. to type into the inputs
    pub fn with_view<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        f(&mut self.page.lock().view)
    }

    #[must_use]
    pub fn visibility(&self) -> VisibilityState {
        self.page.lock().visibility
    }

    #[must_use]
    pub fn selected_mode(&self) -> TravelMode {
        self.state.lock().selected_mode
    }

    /// Whether a search has succeeded at least once
    #[must_use]
    pub fn has_searched(&self) -> bool {
        self.state.lock().has_searched
    }

    #[must_use]
    pub fn map_ready(&self) -> bool {
        self.map.lock().is_ready()
    }

    /// Ready callback of the mapping SDK
    pub fn on_maps_ready(&self, sdk: S) {
        info!("Mapping SDK loaded");
        self.map.lock().attach(sdk);
    }

    /// Key press in one of the location inputs; Enter searches
    pub async fn on_key_press(&self, key: &str) -> Option<SearchOutcome> {
        if key == "Enter" {
            Some(self.search_route().await)
        } else {
            None
        }
    }

    /// Mode selector click. Re-runs the search once a search has succeeded.
    pub async fn select_mode(&self, mode: TravelMode) -> Option<SearchOutcome> {
        let rerun = {
            let mut state = self.state.lock();
            state.selected_mode = mode;
            state.has_searched
        };
        self.page.lock().view.set_active_mode(mode);
        debug!(%mode, rerun, "Travel mode selected");

        if rerun {
            Some(self.search_route().await)
        } else {
            None
        }
    }

    /// Search button handler
    #[instrument(skip(self))]
    pub async fn search_route(&self) -> SearchOutcome {
        let (origin, destination) = {
            let page = self.page.lock();
            (
                page.view.input_value(ElementId::Origin),
                page.view.input_value(ElementId::Destination),
            )
        };
        let mode = self.state.lock().selected_mode;

        let params = match SearchParams::new(&origin, &destination, mode) {
            Ok(params) => params,
            Err(e) => {
                let message = e.user_message();
                self.page.lock().show_error(&message);
                return SearchOutcome::Rejected(message);
            }
        };

        let (in_flight, request_id) = InFlight::enter(&self.state, &self.page);
        {
            let mut page = self.page.lock();
            page.view.set_busy(true);
            page.set_panel(Panel::Loading, true);
            page.set_panel(Panel::Error, false);
            page.set_panel(Panel::Results, false);
        }

        info!(
            request_id,
            origin = %params.origin,
            destination = %params.destination,
            mode = %params.mode,
            "Searching route"
        );
        let result = self.backend.route_weather(&params).await;

        let stale = self.is_stale(&self.state.lock(), request_id);

        let mut directions = None;
        let outcome = if stale {
            debug!(request_id, "Dropping response of superseded search");
            SearchOutcome::Superseded
        } else {
            match result {
                Ok(bundle) => {
                    self.display_results(&bundle);
                    directions = self.prepare_directions(&bundle.route);
                    self.state.lock().has_searched = true;
                    SearchOutcome::Rendered(MapOutcome::Unavailable)
                }
                Err(e) => {
                    let message = e.user_message();
                    {
                        let mut page = self.page.lock();
                        page.set_panel(Panel::Results, false);
                        page.show_error(&message);
                    }
                    SearchOutcome::Failed(message)
                }
            }
        };

        drop(in_flight);

        match directions {
            Some((sdk, request)) => SearchOutcome::Rendered(
                self.finish_directions(sdk, request, Some(request_id)).await,
            ),
            None => outcome,
        }
    }

    /// Project a response onto the results panel
    pub fn display_results(&self, bundle: &ResponseBundle) {
        let route = &bundle.route;
        let weather = &bundle.weather;
        let mut page = self.page.lock();

        page.view.set_text(ElementId::StartAddress, &route.start_address);
        page.view.set_text(ElementId::EndAddress, &route.end_address);
        page.view.set_text(ElementId::Distance, &route.distance);
        page.view.set_text(ElementId::Duration, &route.duration);

        if route.has_transit() {
            page.view.render_transit_steps(&route.transit_details);
            page.set_panel(Panel::TransitDetails, true);
        } else {
            page.set_panel(Panel::TransitDetails, false);
        }

        page.view.set_text(ElementId::Temperature, &weather.temperature);
        page.view.set_text(ElementId::FeelsLike, &weather.feels_like);
        page.view
            .set_text(ElementId::WeatherDescription, &weather.description);
        page.view.set_text(ElementId::Humidity, &weather.humidity);
        page.view.set_text(ElementId::WindSpeed, &weather.wind_speed);
        page.view.set_image(
            ElementId::WeatherIcon,
            &weather.icon_url(&self.icon_url_template),
            &weather.description,
        );

        page.set_panel(Panel::Error, false);
        page.set_panel(Panel::Results, true);
    }

    /// Draw `route` on the map, building the map first if needed
    pub async fn display_map(&self, route: &RouteResult) -> MapOutcome {
        match self.prepare_directions(route) {
            Some((sdk, request)) => self.finish_directions(sdk, request, None).await,
            None => MapOutcome::Unavailable,
        }
    }

    fn is_stale(&self, state: &ControllerState, request_id: u64) -> bool {
        self.stale_responses == StaleResponsePolicy::LatestRequest
            && request_id != state.latest_request
    }

    fn prepare_directions(&self, route: &RouteResult) -> Option<(Arc<S>, DirectionsRequest)> {
        let Some(sdk) = self.map.lock().ensure_map() else {
            warn!("Mapping SDK not loaded, route not drawn");
            return None;
        };

        let request = DirectionsRequest {
            origin: route.start_address.clone(),
            destination: route.end_address.clone(),
            travel_mode: SdkTravelMode::from_route_mode(route.mode.as_deref()),
        };
        Some((sdk, request))
    }

    async fn finish_directions(
        &self,
        sdk: Arc<S>,
        request: DirectionsRequest,
        request_id: Option<u64>,
    ) -> MapOutcome {
        debug!(travel_mode = request.travel_mode.as_str(), "Requesting directions");
        match sdk.request_directions(&request).await {
            Ok(directions) => {
                if let Some(id) = request_id {
                    if self.is_stale(&self.state.lock(), id) {
                        return MapOutcome::Superseded;
                    }
                }
                self.map.lock().render(directions);
                MapOutcome::Drawn
            }
            Err(status) => {
                error!("Directions request failed: {}", status);
                MapOutcome::Failed(status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransitStep, WeatherResult};
    use crate::view::MemoryView;
    use crate::{Result, RouteWeatherError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bundle(end: &str, transit: Vec<TransitStep>) -> ResponseBundle {
        ResponseBundle {
            route: RouteResult {
                start_address: "New York, NY".to_string(),
                end_address: end.to_string(),
                distance: "215 mi".to_string(),
                duration: "3 hr 45 min".to_string(),
                transit_details: transit,
                mode: Some("driving".to_string()),
                overview_polyline: None,
            },
            weather: WeatherResult {
                temperature: "72°F".to_string(),
                feels_like: "70°F".to_string(),
                description: "Clear".to_string(),
                humidity: "40%".to_string(),
                wind_speed: "5 mph".to_string(),
                icon: "01d".to_string(),
            },
        }
    }

    struct StaticBackend {
        response: std::result::Result<ResponseBundle, String>,
        calls: AtomicUsize,
        hang_first: bool,
    }

    impl StaticBackend {
        fn ok(bundle: ResponseBundle) -> Self {
            Self {
                response: Ok(bundle),
                calls: AtomicUsize::new(0),
                hang_first: false,
            }
        }

        /// First request never answers, later ones return `bundle`
        fn hanging_once(bundle: ResponseBundle) -> Self {
            Self {
                hang_first: true,
                ..Self::ok(bundle)
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                calls: AtomicUsize::new(0),
                hang_first: false,
            }
        }
    }

    #[async_trait]
    impl RouteWeatherBackend for StaticBackend {
        async fn route_weather(&self, _: &SearchParams) -> Result<ResponseBundle> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang_first && call == 0 {
                std::future::pending::<()>().await;
            }
            self.response.clone().map_err(RouteWeatherError::api)
        }

        async fn maps_key(&self) -> Result<Option<String>> {
            Ok(None)
        }
    }

    struct NoSdk;

    #[async_trait]
    impl MapSdk for NoSdk {
        type Map = ();
        type Directions = ();

        fn construct_map(&self, _: ElementId, _: &crate::maps::MapOptions, _: &crate::maps::RendererOptions) {}

        async fn request_directions(
            &self,
            _: &DirectionsRequest,
        ) -> std::result::Result<(), DirectionsStatus> {
            Err(DirectionsStatus::UnknownError)
        }

        fn render_directions(&self, _: &mut (), _: ()) {}
    }

    fn controller(backend: StaticBackend) -> RouteWeatherController<StaticBackend, NoSdk, MemoryView> {
        RouteWeatherController::new(backend, MemoryView::new(), &RouteWeatherConfig::default())
    }

    fn type_locations<Bk: RouteWeatherBackend>(
        c: &RouteWeatherController<Bk, NoSdk, MemoryView>,
        origin: &str,
        destination: &str,
    ) {
        c.with_view(|v| {
            v.set_input(ElementId::Origin, origin);
            v.set_input(ElementId::Destination, destination);
        });
    }

    #[tokio::test]
    async fn test_blank_input_rejected_without_request() {
        let c = controller(StaticBackend::ok(bundle("Boston, MA", vec![])));
        type_locations(&c, "   ", "Boston");

        let outcome = c.search_route().await;

        assert_eq!(
            outcome,
            SearchOutcome::Rejected(SearchParams::MISSING_LOCATION.to_string())
        );
        assert_eq!(c.backend().calls.load(Ordering::SeqCst), 0);
        assert!(c.visibility().error);
        assert!(!c.visibility().loading);
        c.with_view(|v| {
            assert_eq!(v.text(ElementId::Error), Some(SearchParams::MISSING_LOCATION));
        });
    }

    #[tokio::test]
    async fn test_success_without_sdk_renders_text_only() {
        let c = controller(StaticBackend::ok(bundle("Boston, MA", vec![])));
        type_locations(&c, "New York", "Boston");

        let outcome = c.search_route().await;

        assert_eq!(outcome, SearchOutcome::Rendered(MapOutcome::Unavailable));
        assert!(c.has_searched());
        let visibility = c.visibility();
        assert!(visibility.results);
        assert!(!visibility.loading);
        assert!(!visibility.error);
        assert!(!visibility.transit_details);
        c.with_view(|v| assert!(!v.is_busy()));
    }

    #[tokio::test]
    async fn test_failure_shows_backend_message() {
        let c = controller(StaticBackend::failing("Invalid travel mode"));
        type_locations(&c, "New York", "Boston");

        let outcome = c.search_route().await;

        assert_eq!(outcome, SearchOutcome::Failed("Invalid travel mode".to_string()));
        assert!(!c.has_searched());
        let visibility = c.visibility();
        assert!(visibility.error);
        assert!(!visibility.results);
        assert!(!visibility.loading);
    }

    #[tokio::test]
    async fn test_mode_change_before_first_search_does_not_search() {
        let c = controller(StaticBackend::ok(bundle("Boston, MA", vec![])));
        type_locations(&c, "New York", "Boston");

        assert!(c.select_mode(TravelMode::Walking).await.is_none());
        assert_eq!(c.selected_mode(), TravelMode::Walking);
        assert_eq!(c.backend().calls.load(Ordering::SeqCst), 0);
        c.with_view(|v| assert_eq!(v.active_mode(), Some(TravelMode::Walking)));
    }

    #[tokio::test]
    async fn test_mode_change_after_search_reruns() {
        let c = controller(StaticBackend::ok(bundle("Boston, MA", vec![])));
        type_locations(&c, "New York", "Boston");
        c.search_route().await;

        let outcome = c.select_mode(TravelMode::Transit).await;

        assert!(matches!(outcome, Some(SearchOutcome::Rendered(_))));
        assert_eq!(c.backend().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_enter_key_triggers_search() {
        let c = controller(StaticBackend::ok(bundle("Boston, MA", vec![])));
        type_locations(&c, "New York", "Boston");

        assert!(c.on_key_press("a").await.is_none());
        assert!(c.on_key_press("Enter").await.is_some());
        assert_eq!(c.backend().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_transit_hides_section_regardless_of_prior_state() {
        let step = TransitStep {
            vehicle: "Bus".to_string(),
            line: "M15".to_string(),
            departure: "1st Ave".to_string(),
            arrival: "Houston St".to_string(),
            num_stops: 12,
        };
        let c = controller(StaticBackend::ok(bundle("Boston, MA", vec![])));

        c.display_results(&bundle("Boston, MA", vec![step]));
        assert!(c.visibility().transit_details);
        c.with_view(|v| assert_eq!(v.transit_lines()[0], "Bus: M15"));

        c.display_results(&bundle("Boston, MA", vec![]));
        assert!(!c.visibility().transit_details);
    }

    #[tokio::test]
    async fn test_display_map_without_sdk_is_unavailable() {
        let c = controller(StaticBackend::ok(bundle("Boston, MA", vec![])));
        let route = bundle("Boston, MA", vec![]).route;
        assert_eq!(c.display_map(&route).await, MapOutcome::Unavailable);
    }

    #[tokio::test]
    async fn test_directions_failure_is_not_user_visible() {
        let c = controller(StaticBackend::ok(bundle("Boston, MA", vec![])));
        c.on_maps_ready(NoSdk);
        type_locations(&c, "New York", "Boston");

        let outcome = c.search_route().await;

        assert_eq!(
            outcome,
            SearchOutcome::Rendered(MapOutcome::Failed(DirectionsStatus::UnknownError))
        );
        assert!(!c.visibility().error);
        assert!(c.visibility().results);
    }

    #[tokio::test]
    async fn test_cancelled_search_clears_loading() {
        let c = controller(StaticBackend::hanging_once(bundle("Boston, MA", vec![])));
        type_locations(&c, "New York", "Boston");

        let cancelled =
            tokio::time::timeout(std::time::Duration::from_millis(50), c.search_route()).await;
        assert!(cancelled.is_err());
        assert!(!c.visibility().loading);
        c.with_view(|v| assert!(!v.is_busy()));

        let outcome = c.search_route().await;

        assert_eq!(outcome, SearchOutcome::Rendered(MapOutcome::Unavailable));
        assert_eq!(c.backend().calls.load(Ordering::SeqCst), 2);
        assert!(!c.visibility().loading);
        assert!(c.visibility().results);
        c.with_view(|v| assert!(!v.is_busy()));
    }
}
