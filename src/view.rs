//! Rendering target of the controller
//!
//! [`View`] is the page contract: the element ids the controller writes to,
//! the four toggleable panels and the mode selector. A browser host maps it
//! onto the DOM; [`MemoryView`] keeps everything in memory for the CLI and
//! tests.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::models::{TransitStep, TravelMode};

/// Element ids of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    Origin,
    Destination,
    SearchBtn,
    Map,
    Loading,
    Error,
    Results,
    StartAddress,
    EndAddress,
    Distance,
    Duration,
    TransitDetails,
    Temperature,
    FeelsLike,
    WeatherDescription,
    Humidity,
    WindSpeed,
    WeatherIcon,
}

impl ElementId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ElementId::Origin => "origin",
            ElementId::Destination => "destination",
            ElementId::SearchBtn => "searchBtn",
            ElementId::Map => "map",
            ElementId::Loading => "loading",
            ElementId::Error => "error",
            ElementId::Results => "results",
            ElementId::StartAddress => "startAddress",
            ElementId::EndAddress => "endAddress",
            ElementId::Distance => "distance",
            ElementId::Duration => "duration",
            ElementId::TransitDetails => "transitDetails",
            ElementId::Temperature => "temperature",
            ElementId::FeelsLike => "feelsLike",
            ElementId::WeatherDescription => "weatherDescription",
            ElementId::Humidity => "humidity",
            ElementId::WindSpeed => "windSpeed",
            ElementId::WeatherIcon => "weatherIcon",
        }
    }
}

/// Sections whose visibility the controller toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Loading,
    Error,
    Results,
    TransitDetails,
}

/// Visibility of the four panels as last set by the controller.
/// Everything starts hidden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityState {
    pub loading: bool,
    pub error: bool,
    pub results: bool,
    pub transit_details: bool,
}

impl VisibilityState {
    #[must_use]
    pub fn is_visible(&self, panel: Panel) -> bool {
        match panel {
            Panel::Loading => self.loading,
            Panel::Error => self.error,
            Panel::Results => self.results,
            Panel::TransitDetails => self.transit_details,
        }
    }

    pub fn set(&mut self, panel: Panel, visible: bool) {
        let flag = match panel {
            Panel::Loading => &mut self.loading,
            Panel::Error => &mut self.error,
            Panel::Results => &mut self.results,
            Panel::TransitDetails => &mut self.transit_details,
        };
        *flag = visible;
    }
}

/// The page as seen by the controller
pub trait View: Send {
    /// Current raw value of a text input
    fn input_value(&self, id: ElementId) -> String;

    /// Assign text content of an element
    fn set_text(&mut self, id: ElementId, text: &str);

    fn set_panel_visible(&mut self, panel: Panel, visible: bool);

    /// Toggle the busy marker on the search button
    fn set_busy(&mut self, busy: bool);

    fn set_image(&mut self, id: ElementId, src: &str, alt: &str);

    /// Replace the content of the transit section with one entry per step
    fn render_transit_steps(&mut self, steps: &[TransitStep]);

    /// Mark `mode`'s selector control active and every other one inactive
    fn set_active_mode(&mut self, mode: TravelMode);
}

/// In-memory page
#[derive(Debug, Default, Clone)]
pub struct MemoryView {
    inputs: HashMap<ElementId, String>,
    texts: HashMap<ElementId, String>,
    images: HashMap<ElementId, (String, String)>,
    panels: VisibilityState,
    busy: bool,
    active_mode: Option<TravelMode>,
    transit_lines: Vec<String>,
}

impl MemoryView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Type into a text input
    pub fn set_input(&mut self, id: ElementId, value: impl Into<String>) {
        self.inputs.insert(id, value.into());
    }

    #[must_use]
    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.texts.get(&id).map(String::as_str)
    }

    /// `(src, alt)` of an image element
    #[must_use]
    pub fn image(&self, id: ElementId) -> Option<(&str, &str)> {
        self.images
            .get(&id)
            .map(|(src, alt)| (src.as_str(), alt.as_str()))
    }

    #[must_use]
    pub fn is_visible(&self, panel: Panel) -> bool {
        self.panels.is_visible(panel)
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    #[must_use]
    pub fn active_mode(&self) -> Option<TravelMode> {
        self.active_mode
    }

    /// Rendered transit entries, three lines per step
    #[must_use]
    pub fn transit_lines(&self) -> &[String] {
        &self.transit_lines
    }

    /// Plain-text rendering of every visible panel
    #[must_use]
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let text = move |id| self.text(id).unwrap_or_default();

        if self.is_visible(Panel::Error) {
            let _ = writeln!(out, "Error: {}", text(ElementId::Error));
        }

        if self.is_visible(Panel::Results) {
            let _ = writeln!(out, "From:        {}", text(ElementId::StartAddress));
            let _ = writeln!(out, "To:          {}", text(ElementId::EndAddress));
            let _ = writeln!(out, "Distance:    {}", text(ElementId::Distance));
            let _ = writeln!(out, "Duration:    {}", text(ElementId::Duration));

            if self.is_visible(Panel::TransitDetails) {
                let _ = writeln!(out, "Transit Details");
                for line in &self.transit_lines {
                    let _ = writeln!(out, "  {line}");
                }
            }

            let _ = writeln!(
                out,
                "Weather:     {} (feels like {})",
                text(ElementId::Temperature),
                text(ElementId::FeelsLike)
            );
            let _ = writeln!(out, "Conditions:  {}", text(ElementId::WeatherDescription));
            let _ = writeln!(out, "Humidity:    {}", text(ElementId::Humidity));
            let _ = writeln!(out, "Wind:        {}", text(ElementId::WindSpeed));
            if let Some((src, _)) = self.image(ElementId::WeatherIcon) {
                let _ = writeln!(out, "Icon:        {src}");
            }
        }

        out
    }
}

impl View for MemoryView {
    fn input_value(&self, id: ElementId) -> String {
        self.inputs.get(&id).cloned().unwrap_or_default()
    }

    fn set_text(&mut self, id: ElementId, text: &str) {
        self.texts.insert(id, text.to_string());
    }

    fn set_panel_visible(&mut self, panel: Panel, visible: bool) {
        self.panels.set(panel, visible);
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    fn set_image(&mut self, id: ElementId, src: &str, alt: &str) {
        self.images.insert(id, (src.to_string(), alt.to_string()));
    }

    fn render_transit_steps(&mut self, steps: &[TransitStep]) {
        self.transit_lines = steps
            .iter()
            .flat_map(|step| [step.headline(), step.stops_summary(), step.stop_count()])
            .collect();
    }

    fn set_active_mode(&mut self, mode: TravelMode) {
        self.active_mode = Some(mode);
    }
}
