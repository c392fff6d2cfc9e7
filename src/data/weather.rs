//! WeatherAPI forecast client
//!
//! This module fetches the three-day forecast for a coordinate from
//! weatherapi.com and parses it into our `WeatherSnapshot` structure.

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{http_client, Coordinate, FetchError, ForecastDay, WeatherSnapshot};
use crate::config::Settings;

/// Number of forecast days requested
const FORECAST_DAYS: u8 = 3;

/// Message used when the provider gives no usable error body
const GENERIC_FAILURE: &str = "Failed to get weather data";

/// Client for fetching forecasts from the WeatherAPI service
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherClient {
    /// Create a new WeatherClient against the public endpoint
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: Settings::default().weather_base_url,
            api_key,
        }
    }

    /// Create a WeatherClient from application settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            client: http_client(settings.request_timeout()),
            base_url: settings.weather_base_url.clone(),
            api_key: settings.weather_api_key.clone(),
        }
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds the forecast request URL for a coordinate
    fn forecast_url(&self, at: Coordinate, api_key: &str) -> String {
        format!(
            "{}/forecast.json?key={}&q={:.6},{:.6}&days={}&aqi=no&alerts=yes",
            self.base_url.trim_end_matches('/'),
            api_key,
            at.latitude(),
            at.longitude(),
            FORECAST_DAYS
        )
    }

    /// Fetch the daily forecast for the given coordinate
    ///
    /// # Returns
    /// * `Ok(WeatherSnapshot)` - Location name and daily forecast entries
    /// * `Err(FetchError)` - If no API key is configured, the request fails,
    ///   or the provider rejects the query
    pub async fn fetch_forecast(&self, at: Coordinate) -> Result<WeatherSnapshot, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| FetchError::unavailable("no weather API key configured"))?;

        debug!(%at, "fetching weather forecast");
        let url = self.forecast_url(at, api_key);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::status(status, provider_error_message(&text)));
        }

        let api_response: ForecastResponse = serde_json::from_str(&text)?;
        parse_response(api_response)
    }
}

/// Parse the WeatherAPI response into a WeatherSnapshot
fn parse_response(response: ForecastResponse) -> Result<WeatherSnapshot, FetchError> {
    let days = response
        .forecast
        .forecastday
        .into_iter()
        .map(parse_day)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WeatherSnapshot {
        location_name: response.location.name,
        country: response.location.country,
        days,
    })
}

fn parse_day(entry: ForecastDayEntry) -> Result<ForecastDay, FetchError> {
    let date = NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d")
        .map_err(|_| FetchError::InvalidField(format!("forecast date '{}'", entry.date)))?;
    let day = entry.day;

    Ok(ForecastDay {
        date,
        condition: day.condition.text,
        icon: absolute_icon_url(&day.condition.icon),
        avg_temp_c: day.avgtemp_c,
        avg_temp_f: day.avgtemp_f,
        max_temp_c: day.maxtemp_c,
        min_temp_c: day.mintemp_c,
        avg_humidity: day.avghumidity,
        max_wind_kph: day.maxwind_kph,
        total_precip_mm: day.totalprecip_mm,
    })
}

/// The provider returns protocol-relative icon URLs ("//cdn...")
fn absolute_icon_url(icon: &str) -> String {
    if icon.starts_with("//") {
        format!("https:{}", icon)
    } else {
        icon.to_string()
    }
}

/// Extracts `error.message` from an error body, if present
fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| GENERIC_FAILURE.to_string())
}

/// WeatherAPI forecast response structure
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    location: LocationInfo,
    forecast: Forecast,
}

#[derive(Debug, Deserialize)]
struct LocationInfo {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    forecastday: Vec<ForecastDayEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastDayEntry {
    date: String,
    day: DaySummary,
}

/// Per-day aggregate values from WeatherAPI
#[derive(Debug, Deserialize)]
struct DaySummary {
    maxtemp_c: f64,
    mintemp_c: f64,
    avgtemp_c: f64,
    avgtemp_f: f64,
    maxwind_kph: f64,
    totalprecip_mm: f64,
    avghumidity: f64,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Trimmed WeatherAPI forecast response
    const VALID_RESPONSE: &str = r#"{
        "location": {
            "name": "Kamakura",
            "region": "Kanagawa",
            "country": "Japan",
            "lat": 35.32,
            "lon": 139.55,
            "tz_id": "Asia/Tokyo"
        },
        "current": {
            "temp_c": 27.0,
            "condition": { "text": "Light rain", "icon": "//cdn.weatherapi.com/weather/64x64/day/296.png", "code": 1183 }
        },
        "forecast": {
            "forecastday": [
                {
                    "date": "2024-07-15",
                    "date_epoch": 1721001600,
                    "day": {
                        "maxtemp_c": 29.4,
                        "mintemp_c": 23.1,
                        "avgtemp_c": 25.8,
                        "avgtemp_f": 78.4,
                        "maxwind_kph": 21.6,
                        "totalprecip_mm": 18.4,
                        "avghumidity": 84,
                        "condition": { "text": "Moderate rain", "icon": "//cdn.weatherapi.com/weather/64x64/day/302.png", "code": 1189 }
                    }
                },
                {
                    "date": "2024-07-16",
                    "date_epoch": 1721088000,
                    "day": {
                        "maxtemp_c": 30.2,
                        "mintemp_c": 24.0,
                        "avgtemp_c": 26.9,
                        "avgtemp_f": 80.4,
                        "maxwind_kph": 14.4,
                        "totalprecip_mm": 0.0,
                        "avghumidity": 71,
                        "condition": { "text": "Sunny", "icon": "//cdn.weatherapi.com/weather/64x64/day/113.png", "code": 1000 }
                    }
                },
                {
                    "date": "2024-07-17",
                    "date_epoch": 1721174400,
                    "day": {
                        "maxtemp_c": 31.0,
                        "mintemp_c": 24.5,
                        "avgtemp_c": 27.3,
                        "avgtemp_f": 81.1,
                        "maxwind_kph": 12.2,
                        "totalprecip_mm": 2.1,
                        "avghumidity": 75,
                        "condition": { "text": "Patchy rain possible", "icon": "//cdn.weatherapi.com/weather/64x64/day/176.png", "code": 1063 }
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn test_parse_valid_response() {
        let response: ForecastResponse =
            serde_json::from_str(VALID_RESPONSE).expect("Failed to parse valid response");
        let snapshot = parse_response(response).expect("Failed to parse snapshot");

        assert_eq!(snapshot.location_name, "Kamakura");
        assert_eq!(snapshot.country, "Japan");
        assert_eq!(snapshot.days.len(), 3);

        let today = &snapshot.days[0];
        assert_eq!(today.date, NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
        assert_eq!(today.condition, "Moderate rain");
        assert!((today.avg_temp_c - 25.8).abs() < 0.01);
        assert!((today.avg_temp_f - 78.4).abs() < 0.01);
        assert!((today.max_temp_c - 29.4).abs() < 0.01);
        assert!((today.min_temp_c - 23.1).abs() < 0.01);
        assert!((today.avg_humidity - 84.0).abs() < 0.01);
        assert!((today.max_wind_kph - 21.6).abs() < 0.01);
        assert!((snapshot.rainfall_today_mm() - 18.4).abs() < 0.01);
    }

    #[test]
    fn test_icon_urls_are_absolute() {
        let response: ForecastResponse = serde_json::from_str(VALID_RESPONSE).unwrap();
        let snapshot = parse_response(response).unwrap();
        assert_eq!(
            snapshot.days[1].icon,
            "https://cdn.weatherapi.com/weather/64x64/day/113.png"
        );
        assert_eq!(absolute_icon_url("https://x/y.png"), "https://x/y.png");
    }

    #[test]
    fn test_parse_invalid_date() {
        let body = VALID_RESPONSE.replace("2024-07-16", "16/07/2024");
        let response: ForecastResponse = serde_json::from_str(&body).unwrap();
        match parse_response(response) {
            Err(FetchError::InvalidField(msg)) => assert!(msg.contains("16/07/2024")),
            other => panic!("Expected InvalidField error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_forecast() {
        let missing = r#"{ "location": { "name": "X", "country": "Y" } }"#;
        let result: Result<ForecastResponse, _> = serde_json::from_str(missing);
        assert!(result.is_err());
    }

    #[test]
    fn test_provider_error_message() {
        let body = r#"{"error":{"code":1006,"message":"No matching location found."}}"#;
        assert_eq!(provider_error_message(body), "No matching location found.");
        assert_eq!(provider_error_message("<html>"), GENERIC_FAILURE);
    }

    #[test]
    fn test_forecast_url() {
        let client = WeatherClient::new(Some("k".to_string())).with_base_url("http://localhost:9/v1/");
        let at = Coordinate::new(35.3192, 139.5467).unwrap();
        assert_eq!(
            client.forecast_url(at, "k"),
            "http://localhost:9/v1/forecast.json?key=k&q=35.319200,139.546700&days=3&aqi=no&alerts=yes"
        );
    }

    #[tokio::test]
    async fn test_fetch_without_api_key_is_unavailable() {
        let client = WeatherClient::new(None);
        let at = Coordinate::new(0.0, 0.0).unwrap();
        let err = client.fetch_forecast(at).await.unwrap_err();
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("API key"));
    }

    #[tokio::test]
    async fn test_fetch_with_blank_api_key_is_unavailable() {
        let client = WeatherClient::new(Some("   ".to_string()));
        let at = Coordinate::new(0.0, 0.0).unwrap();
        assert!(client.fetch_forecast(at).await.unwrap_err().is_unavailable());
    }
}
