//! Mapping SDK key provisioning
//!
//! On page load the key is fetched from the backend and, when one is
//! configured, the SDK script is injected with the ready callback name in its
//! query string. A missing key or a failed key request only logs: the page
//! stays usable without the map.

use crate::api::RouteWeatherBackend;
use crate::config::MapsConfig;

/// Script element to append to the document head
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: String,
    pub async_load: bool,
    pub defer: bool,
}

/// Appends script elements to the page
pub trait ScriptInjector {
    fn inject(&self, script: ScriptTag);
}

/// Result of the load-time key provisioning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioning {
    /// Script injected; the SDK will invoke the ready callback once loaded
    Injected(ScriptTag),
    /// Backend has no key configured
    KeyUnavailable,
    /// Key request failed
    Failed(String),
}

/// SDK script URL for `key`, invoking `callback` once loaded
#[must_use]
pub fn maps_script_url(sdk_url: &str, key: &str, callback: &str) -> String {
    format!(
        "{sdk_url}?key={}&callback={}",
        urlencoding::encode(key),
        urlencoding::encode(callback)
    )
}

/// Load handler: fetch the key and inject the SDK script when there is one
#[tracing::instrument(skip_all)]
pub async fn provision_maps_sdk<B, I>(backend: &B, injector: &I, config: &MapsConfig) -> Provisioning
where
    B: RouteWeatherBackend + ?Sized,
    I: ScriptInjector + ?Sized,
{
    match backend.maps_key().await {
        Ok(Some(key)) => {
            let script = ScriptTag {
                src: maps_script_url(&config.sdk_url, &key, &config.callback_name),
                async_load: true,
                defer: true,
            };
            tracing::debug!("Injecting mapping SDK script");
            injector.inject(script.clone());
            Provisioning::Injected(script)
        }
        Ok(None) => {
            tracing::error!("Google API key not available");
            Provisioning::KeyUnavailable
        }
        Err(e) => {
            tracing::error!("Error loading Google Maps API key: {}", e);
            Provisioning::Failed(e.to_string())
        }
    }
}

/// Injector for hosts without a document: records the script in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingScriptInjector;

impl ScriptInjector for LoggingScriptInjector {
    fn inject(&self, script: ScriptTag) {
        tracing::info!(src = %script.src, "Mapping SDK script ready to load");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_url() {
        assert_eq!(
            maps_script_url("https://maps.googleapis.com/maps/api/js", "AIzaTest123", "initMap"),
            "https://maps.googleapis.com/maps/api/js?key=AIzaTest123&callback=initMap"
        );
    }

    #[test]
    fn test_script_url_escapes_key() {
        let url = maps_script_url("https://maps.example.com/js", "a&b=c", "initMap");
        assert_eq!(url, "https://maps.example.com/js?key=a%26b%3Dc&callback=initMap");
    }
}
