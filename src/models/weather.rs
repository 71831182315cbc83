//! Destination weather model

use serde::{Deserialize, Deserializer, Serialize};

/// Icon URL template of the weather icon CDN
pub const DEFAULT_ICON_URL_TEMPLATE: &str = "https://openweathermap.org/img/wn/{icon}@2x.png";

/// Current weather at the destination, already formatted for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherResult {
    #[serde(deserialize_with = "display_text")]
    pub temperature: String,
    #[serde(deserialize_with = "display_text")]
    pub feels_like: String,
    pub description: String,
    #[serde(deserialize_with = "display_text")]
    pub humidity: String,
    #[serde(deserialize_with = "display_text")]
    pub wind_speed: String,
    /// Icon code, e.g. "01d"
    pub icon: String,
}

impl WeatherResult {
    /// Icon URL built from `template` by substituting the icon code verbatim
    #[must_use]
    pub fn icon_url(&self, template: &str) -> String {
        template.replace("{icon}", &self.icon)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Text {
    Str(String),
    Int(i64),
    Float(f64),
}

/// The backend sends rounded numbers for most readings; accept either form.
fn display_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Text::deserialize(deserializer)? {
        Text::Str(s) => s,
        Text::Int(n) => n.to_string(),
        Text::Float(n) => n.to_string(),
    })
}
