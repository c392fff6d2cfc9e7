//! Core data models for the geohazard dashboard
//!
//! This module contains the data types shared by the provider clients, the
//! risk scorer and the renderers: coordinates, weather forecasts, elevation
//! samples and seismic events.

pub mod elevation;
pub mod error;
pub mod geolocation;
pub mod seismic;
pub mod weather;

pub use elevation::ElevationClient;
pub use error::FetchError;
pub use geolocation::{GeolocationClient, GeolocationError};
pub use seismic::{SeismicClient, SeismicQuery};
pub use weather::WeatherClient;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use reqwest::Client;
use thiserror::Error;

/// Number of decimal places carried by a selected coordinate
pub const COORDINATE_PRECISION: i32 = 6;

/// Errors raised when constructing a coordinate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude or longitude is NaN or infinite
    #[error("coordinates must be finite numbers")]
    NotFinite,

    /// Latitude outside [-90, 90]
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180]
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A point on Earth in decimal degrees
///
/// Always finite, with latitude in [-90, 90] and longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Creates a coordinate by clamping into the valid range
    ///
    /// Non-finite components become 0.
    pub fn clamped(latitude: f64, longitude: f64) -> Self {
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            latitude: finite_or_zero(latitude).clamp(-90.0, 90.0),
            longitude: finite_or_zero(longitude).clamp(-180.0, 180.0),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Rounds both components to six decimal places
    pub fn rounded(self) -> Self {
        let factor = 10f64.powi(COORDINATE_PRECISION);
        Self {
            latitude: (self.latitude * factor).round() / factor,
            longitude: (self.longitude * factor).round() / factor,
        }
    }

    /// Query parameters carried to the details view (`lat=..&lng=..`)
    pub fn query_string(&self) -> String {
        format!("lat={:.6}&lng={:.6}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Weather report for a location: where it is and a short daily forecast
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Nearest named place reported by the provider
    pub location_name: String,
    /// Country of the named place
    pub country: String,
    /// Daily forecast entries, today first
    pub days: Vec<ForecastDay>,
}

impl WeatherSnapshot {
    /// Today's total precipitation in mm, or 0 when no days were returned
    pub fn rainfall_today_mm(&self) -> f64 {
        self.days
            .first()
            .map(|day| day.total_precip_mm)
            .unwrap_or(0.0)
    }
}

/// A single day of forecast
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    /// Condition text, e.g. "Patchy rain possible"
    pub condition: String,
    /// Condition icon URL as given by the provider
    pub icon: String,
    /// Average temperature in Celsius
    pub avg_temp_c: f64,
    /// Average temperature in Fahrenheit
    pub avg_temp_f: f64,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    /// Average relative humidity percentage (0-100)
    pub avg_humidity: f64,
    /// Maximum wind speed in km/h
    pub max_wind_kph: f64,
    /// Total precipitation in mm
    pub total_precip_mm: f64,
}

/// A recorded earthquake
#[derive(Debug, Clone, PartialEq)]
pub struct SeismicEvent {
    pub magnitude: f64,
    /// Human-readable place description
    pub place: String,
    /// Event time (ms since epoch)
    pub time_ms: i64,
    /// Depth in kilometers
    pub depth_km: f64,
    /// Number of "Did You Feel It?" reports
    pub felt: Option<i64>,
    /// Significance score
    pub significance: i64,
    pub latitude: f64,
    pub longitude: f64,
}

impl SeismicEvent {
    /// Event time as a `DateTime<Utc>`
    pub fn time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.time_ms).single()
    }

    /// Display severity bucket for the details list
    pub fn severity(&self) -> Severity {
        Severity::from_magnitude(self.magnitude)
    }

    /// Marker color for the map overview
    pub fn marker_color(&self) -> MarkerColor {
        MarkerColor::from_magnitude(self.magnitude)
    }

    /// Epicenter as a coordinate, if the feed gave a valid one
    pub fn epicenter(&self) -> Option<Coordinate> {
        Coordinate::new(self.latitude, self.longitude).ok()
    }
}

/// Sorts events so the most recent comes first
pub fn sort_newest_first(events: &mut [SeismicEvent]) {
    events.sort_by(|a, b| b.time_ms.cmp(&a.time_ms));
}

/// Severity of an earthquake in the details list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Magnitude 6 and above
    Severe,
    /// Magnitude 4.5 and above
    Moderate,
    Minor,
}

impl Severity {
    pub fn from_magnitude(magnitude: f64) -> Self {
        if magnitude >= 6.0 {
            Severity::Severe
        } else if magnitude >= 4.5 {
            Severity::Moderate
        } else {
            Severity::Minor
        }
    }

    /// Class name used when rendering
    pub fn class(&self) -> &'static str {
        match self {
            Severity::Severe => "severe",
            Severity::Moderate => "moderate",
            Severity::Minor => "minor",
        }
    }
}

/// Map marker color for an earthquake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerColor {
    Red,
    Orange,
    Yellow,
    Green,
}

impl MarkerColor {
    pub fn from_magnitude(magnitude: f64) -> Self {
        if magnitude >= 6.0 {
            MarkerColor::Red
        } else if magnitude >= 5.0 {
            MarkerColor::Orange
        } else if magnitude >= 4.5 {
            MarkerColor::Yellow
        } else {
            MarkerColor::Green
        }
    }
}

/// Builds the shared HTTP client with a request timeout
pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default HTTP client");
        Client::new()
    })
}
