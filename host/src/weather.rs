//! External input source.
//!
//! The circuit only ever sees one boolean. Here that boolean comes from a
//! temperature reading compared against a threshold.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single weather sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature: f64,
    pub condition: String,
    pub location: String,
}

/// A stored weather sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub id: u64,
    #[serde(flatten)]
    pub reading: WeatherReading,
    pub timestamp: DateTime<Utc>,
}

/// What viewers are told about the latest reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    #[serde(flatten)]
    pub reading: WeatherReading,
    pub logic_state: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("No weather reading available")]
    NoReading,
    #[error("Weather response missing field: {0}")]
    MissingField(&'static str),
    #[error("Weather response parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Supplies the external boolean for an evaluation pass.
pub trait InputSource {
    fn fetch_current_input(&self) -> Result<bool, InputError>;
}

/// Always returns the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedInput(pub bool);

impl InputSource for FixedInput {
    fn fetch_current_input(&self) -> Result<bool, InputError> {
        Ok(self.0)
    }
}

/// Thresholds a reading (typically the latest stored sample).
#[derive(Debug, Clone)]
pub struct ReadingInput {
    pub reading: Option<WeatherReading>,
    pub threshold: f64,
}

impl InputSource for ReadingInput {
    fn fetch_current_input(&self) -> Result<bool, InputError> {
        self.reading
            .as_ref()
            .map(|r| r.logic_state(self.threshold))
            .ok_or(InputError::NoReading)
    }
}

impl WeatherReading {
    /// True when the temperature is strictly above the threshold.
    pub fn logic_state(&self, threshold: f64) -> bool {
        self.temperature > threshold
    }

    pub fn report(self, threshold: f64) -> WeatherReport {
        let logic_state = self.logic_state(threshold);
        WeatherReport {
            reading: self,
            logic_state,
        }
    }
}

#[derive(Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeather>,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature: Option<f64>,
    weathercode: Option<u32>,
}

/// Parses an Open-Meteo `current_weather` response.
///
/// Weather codes below 3 (clear to partly cloudy) read as "Clear", anything
/// else as "Cloudy".
pub fn parse_open_meteo(json: &str, location: &str) -> Result<WeatherReading, InputError> {
    let response: ForecastResponse = serde_json::from_str(json)?;
    let current = response
        .current_weather
        .ok_or(InputError::MissingField("current_weather"))?;
    let temperature = current
        .temperature
        .ok_or(InputError::MissingField("current_weather.temperature"))?;
    let code = current
        .weathercode
        .ok_or(InputError::MissingField("current_weather.weathercode"))?;

    Ok(WeatherReading {
        temperature,
        condition: if code < 3 { "Clear" } else { "Cloudy" }.to_string(),
        location: location.to_string(),
    })
}
