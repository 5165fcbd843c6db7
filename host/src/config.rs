//! Host configuration.
//!
//! Every field has a default, so an empty JSON object (or no config at all)
//! gives a working host.

use serde::{Deserialize, Serialize};

/// Name of the structured log endpoint used when none is configured.
pub const DEFAULT_LOG_ENDPOINT: &str = "circuit_logs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostConfig {
    /// Temperatures strictly above this turn the external input on
    pub temperature_threshold: f64,
    /// Label stored with every weather sample
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Buffered events per subscriber before slow viewers start lagging
    pub broadcast_capacity: usize,
    /// Structured log endpoint name
    pub log_endpoint: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            temperature_threshold: 25.0,
            location: "Default Location".to_string(),
            latitude: 40.0,
            longitude: 0.0,
            broadcast_capacity: 64,
            log_endpoint: DEFAULT_LOG_ENDPOINT.to_string(),
        }
    }
}

impl HostConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The forecast URL an embedding host should fetch for current weather.
    pub fn weather_url(&self) -> String {
        format!(
            "https://api.open-meteo.com/v1/forecast?latitude={}&longitude={}&current_weather=true",
            self.latitude, self.longitude
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = HostConfig::from_json("{}").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.temperature_threshold, 25.0);
        assert_eq!(config.log_endpoint, "circuit_logs");
    }

    #[test]
    fn test_partial_config() {
        let config =
            HostConfig::from_json(r#"{"temperatureThreshold": 18.5, "location": "Lisbon"}"#)
                .unwrap();
        assert_eq!(config.temperature_threshold, 18.5);
        assert_eq!(config.location, "Lisbon");
        assert_eq!(config.broadcast_capacity, 64);
    }

    #[test]
    fn test_weather_url() {
        let url = HostConfig::default().weather_url();
        assert!(url.contains("latitude=40"));
        assert!(url.contains("longitude=0"));
        assert!(url.ends_with("current_weather=true"));
    }
}
