use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;

use route_weather::maps::{MapOptions, RendererOptions};
use route_weather::sdk_loader::LoggingScriptInjector;
use route_weather::{
    DirectionsRequest, DirectionsStatus, ElementId, HttpBackend, MapSdk, MemoryView,
    Provisioning, RouteWeatherConfig, RouteWeatherController, SearchOutcome, TravelMode, logging,
    provision_maps_sdk,
};

/// Route and destination weather lookup
#[derive(Debug, Parser)]
#[command(name = "route-weather", version, about)]
struct Cli {
    /// Starting location
    #[arg(long)]
    origin: String,

    /// Destination
    #[arg(long)]
    destination: String,

    /// Travel mode: driving, transit, walking or bicycling
    #[arg(long, default_value_t = TravelMode::Driving)]
    mode: TravelMode,

    /// Configuration file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also ask the backend for the mapping SDK key
    #[arg(long)]
    check_map_key: bool,

    #[arg(short, long)]
    verbose: bool,
}

/// A terminal has no map widget; the SDK never becomes ready.
enum NoMap {}

#[async_trait]
impl MapSdk for NoMap {
    type Map = ();
    type Directions = ();

    fn construct_map(&self, _: ElementId, _: &MapOptions, _: &RendererOptions) {
        match *self {}
    }

    async fn request_directions(
        &self,
        _: &DirectionsRequest,
    ) -> std::result::Result<(), DirectionsStatus> {
        match *self {}
    }

    fn render_directions(&self, _: &mut (), _: ()) {
        match *self {}
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = RouteWeatherConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;

    let backend = HttpBackend::new(&config.backend)?;

    if cli.check_map_key {
        match provision_maps_sdk(&backend, &LoggingScriptInjector, &config.maps).await {
            Provisioning::Injected(script) => println!("Map SDK: {}", script.src),
            Provisioning::KeyUnavailable => println!("Map SDK: no key configured"),
            Provisioning::Failed(message) => println!("Map SDK: key request failed ({message})"),
        }
    }

    let mut view = MemoryView::new();
    view.set_input(ElementId::Origin, cli.origin);
    view.set_input(ElementId::Destination, cli.destination);

    let controller: RouteWeatherController<_, NoMap, _> =
        RouteWeatherController::new(backend, view, &config);
    controller.select_mode(cli.mode).await;

    let outcome = controller.search_route().await;
    print!("{}", controller.with_view(|v| v.render_summary()));

    Ok(match outcome {
        SearchOutcome::Rendered(_) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[], TravelMode::Driving)]
    #[case(&["--mode", "transit"], TravelMode::Transit)]
    #[case(&["--mode", "Bicycling"], TravelMode::Bicycling)]
    fn test_cli_mode(#[case] extra: &[&str], #[case] expected: TravelMode) {
        let args = ["route-weather", "--origin", "New York", "--destination", "Boston"];
        let cli = Cli::try_parse_from(args.iter().chain(extra)).unwrap();
        assert_eq!(cli.mode, expected);
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        let err = Cli::try_parse_from([
            "route-weather",
            "--origin",
            "New York",
            "--destination",
            "Boston",
            "--mode",
            "flying",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("Invalid travel mode 'flying'"));
    }
}
