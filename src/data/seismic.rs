//! USGS earthquake catalog client
//!
//! Queries the FDSN event service for earthquakes recorded in the last 30 days
//! within a radius of a coordinate. Responses are GeoJSON feature collections.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{http_client, sort_newest_first, Coordinate, FetchError, SeismicEvent};
use crate::config::Settings;

/// How far back a query looks
pub const WINDOW_DAYS: i64 = 30;

/// A radius query against the earthquake catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeismicQuery {
    pub center: Coordinate,
    pub radius_km: f64,
    /// Only return events at or above this magnitude
    pub min_magnitude: Option<f64>,
}

impl SeismicQuery {
    pub fn around(center: Coordinate, radius_km: f64) -> Self {
        Self {
            center,
            radius_km,
            min_magnitude: None,
        }
    }

    pub fn with_min_magnitude(mut self, min_magnitude: Option<f64>) -> Self {
        self.min_magnitude = min_magnitude;
        self
    }
}

/// Client for the USGS FDSN event web service
#[derive(Debug, Clone)]
pub struct SeismicClient {
    http_client: Client,
    base_url: String,
}

impl SeismicClient {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            http_client: http_client(settings.request_timeout()),
            base_url: settings.seismic_base_url.clone(),
        }
    }

    /// Creates a new SeismicClient with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Builds the query URL for a window ending at `now`
    fn query_url(&self, query: &SeismicQuery, now: DateTime<Utc>) -> String {
        let start = now - Duration::days(WINDOW_DAYS);
        let mut url = format!(
            "{}/query?format=geojson&starttime={}&endtime={}&latitude={:.6}&longitude={:.6}&maxradiuskm={}",
            self.base_url.trim_end_matches('/'),
            start.to_rfc3339_opts(SecondsFormat::Millis, true),
            now.to_rfc3339_opts(SecondsFormat::Millis, true),
            query.center.latitude(),
            query.center.longitude(),
            query.radius_km
        );
        if let Some(min) = query.min_magnitude {
            url.push_str(&format!("&minmagnitude={}", min));
        }
        url
    }

    /// Fetches events matching the query, most recent first
    ///
    /// An empty catalog answer is `Ok` with no events, not an error.
    pub async fn fetch_events(&self, query: &SeismicQuery) -> Result<Vec<SeismicEvent>, FetchError> {
        let url = self.query_url(query, Utc::now());
        debug!(%url, "fetching earthquakes");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(status, "Failed to get earthquake data"));
        }

        let text = response.text().await?;
        let collection: FeatureCollection = serde_json::from_str(&text)?;
        Ok(parse_collection(collection))
    }
}

/// Converts GeoJSON features into events sorted newest first
fn parse_collection(collection: FeatureCollection) -> Vec<SeismicEvent> {
    let mut events: Vec<SeismicEvent> = collection
        .features
        .into_iter()
        .map(|feature| {
            let coords = &feature.geometry.coordinates;
            let props = feature.properties;
            SeismicEvent {
                magnitude: props.mag.unwrap_or(0.0),
                place: props.place.unwrap_or_else(|| "Unknown location".to_string()),
                time_ms: props.time,
                depth_km: coords.get(2).copied().unwrap_or(0.0),
                felt: props.felt,
                significance: props.sig.unwrap_or(0),
                longitude: coords.first().copied().unwrap_or(0.0),
                latitude: coords.get(1).copied().unwrap_or(0.0),
            }
        })
        .collect();

    sort_newest_first(&mut events);
    events
}

/// Top-level GeoJSON response
#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Properties,
    geometry: Geometry,
}

/// Coordinates: [longitude, latitude, depth_km]
#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    mag: Option<f64>,
    place: Option<String>,
    time: i64,
    felt: Option<i64>,
    sig: Option<i64>,
}
