//! Weather lookup tool — current conditions via Open-Meteo.
//!
//! No API key required. The city name is resolved to coordinates through
//! the Open-Meteo geocoding API (first match only), then current weather
//! is fetched from the forecast API. Every failure is rendered as
//! display-ready text.

use async_trait::async_trait;
use infoagent_core::error::ToolError;
use infoagent_core::tool::{Tool, ToolResult};
use serde::Deserialize;
use tracing::debug;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

pub struct WeatherLookupTool {
    client: reqwest::Client,
}

impl WeatherLookupTool {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// Resolve a city name to a location. Any failure collapses to `None`.
    async fn geocode(&self, city: &str) -> Option<GeoResult> {
        debug!(city, "Resolving city to coordinates");
        let response = self
            .client
            .get(GEOCODING_URL)
            .query(&[
                ("name", city),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?;

        let body: GeoResponse = response.json().await.ok()?;
        body.results.into_iter().next()
    }

    async fn fetch_forecast(&self, location: &GeoResult) -> Result<ForecastResponse, reqwest::Error> {
        let response = self
            .client
            .get(FORECAST_URL)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("current_weather", "true".to_string()),
                ("hourly", "relative_humidity_2m".to_string()),
                ("forecast_days", "1".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        response.json().await
    }
}

impl Default for WeatherLookupTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WeatherLookupTool {
    fn name(&self) -> &str {
        "weather_lookup"
    }

    fn description(&self) -> &str {
        "Get the current weather for any city worldwide. Returns condition, temperature, \
         wind speed, and humidity as plain text."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "City name, e.g. 'London', 'Karachi', 'New York'"
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let city = arguments["city"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'city' argument".into()))?;

        let location = match self.geocode(city).await {
            Some(location) => location,
            None => {
                return Ok(ToolResult::error(format!(
                    "Could not find location data for '{city}'. Please check the spelling."
                )));
            }
        };

        let forecast = match self.fetch_forecast(&location).await {
            Ok(forecast) => forecast,
            Err(e) => return Ok(ToolResult::error(format!("Weather service error: {e}"))),
        };

        let Some(current) = forecast.current_weather else {
            return Ok(ToolResult::error(format!(
                "Weather data unavailable for '{city}'."
            )));
        };

        Ok(ToolResult::ok(format_report(
            &location,
            &current,
            &forecast.hourly,
        )))
    }
}

// --- Open-Meteo wire types ---

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    results: Vec<GeoResult>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    #[serde(default)]
    country: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeather>,
    #[serde(default)]
    hourly: Hourly,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    #[serde(default)]
    weathercode: Option<i64>,
    #[serde(default)]
    time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Hourly {
    #[serde(default)]
    relative_humidity_2m: Vec<f64>,
}

// --- Formatting ---

fn format_report(location: &GeoResult, current: &CurrentWeather, hourly: &Hourly) -> String {
    let temp_c = current.temperature;
    let temp_f = round1(temp_c * 9.0 / 5.0 + 32.0);
    let wind_kph = round1(current.windspeed);
    let wind_mph = round1(wind_kph * 0.621371);
    let condition = describe_weather_code(current.weathercode);
    let obs_time = current.time.as_deref().unwrap_or("N/A");

    // Best-effort humidity (first hourly value)
    let humidity = hourly
        .relative_humidity_2m
        .first()
        .map(|h| format!("\nHumidity:     {h}%"))
        .unwrap_or_default();

    format!(
        "Location:     {}, {}\n\
         Condition:    {}\n\
         Temperature:  {}C / {}F\n\
         Wind Speed:   {} km/h ({} mph){}\n\
         Observed at:  {}",
        location.name, location.country, condition, temp_c, temp_f, wind_kph, wind_mph, humidity,
        obs_time
    )
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round_ties_even() / 10.0
}

/// WMO weather code → human-readable description.
fn describe_weather_code(code: Option<i64>) -> &'static str {
    match code {
        Some(0) => "Clear sky",
        Some(1) => "Mainly clear",
        Some(2) => "Partly cloudy",
        Some(3) => "Overcast",
        Some(45) => "Foggy",
        Some(48) => "Icy fog",
        Some(51) => "Light drizzle",
        Some(53) => "Drizzle",
        Some(55) => "Heavy drizzle",
        Some(61) => "Light rain",
        Some(63) => "Rain",
        Some(65) => "Heavy rain",
        Some(71) => "Light snow",
        Some(73) => "Snow",
        Some(75) => "Heavy snow",
        Some(77) => "Snow grains",
        Some(80) => "Light showers",
        Some(81) => "Showers",
        Some(82) => "Violent showers",
        Some(85) => "Snow showers",
        Some(86) => "Heavy snow showers",
        Some(95) => "Thunderstorm",
        Some(96) => "Thunderstorm with hail",
        Some(99) => "Heavy thunderstorm with hail",
        _ => "Unknown",
    }
}
