//! Open-Elevation API client
//!
//! Looks up the ground elevation in meters above sea level for a coordinate.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{http_client, Coordinate, FetchError};
use crate::config::Settings;

/// Message shown when the provider has no sample for the point
const NO_ELEVATION: &str = "Failed to get elevation data";

/// Response from the Open-Elevation lookup endpoint
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    elevation: Option<f64>,
}

/// Client for the Open-Elevation lookup API
#[derive(Debug, Clone)]
pub struct ElevationClient {
    http_client: Client,
    /// Base URL for the API (allows override for testing)
    base_url: String,
}

impl ElevationClient {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            http_client: http_client(settings.request_timeout()),
            base_url: settings.elevation_base_url.clone(),
        }
    }

    /// Creates a new ElevationClient with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn lookup_url(&self, at: Coordinate) -> String {
        format!(
            "{}/lookup?locations={:.6},{:.6}",
            self.base_url.trim_end_matches('/'),
            at.latitude(),
            at.longitude()
        )
    }

    /// Fetches the elevation in meters for the given coordinate
    ///
    /// An empty result set is reported as `FetchError::Unavailable`.
    pub async fn fetch_elevation(&self, at: Coordinate) -> Result<f64, FetchError> {
        let url = self.lookup_url(at);
        debug!(%url, "fetching elevation");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(status, NO_ELEVATION));
        }

        let text = response.text().await?;
        let lookup: LookupResponse = serde_json::from_str(&text)?;
        parse_lookup(lookup)
    }
}

/// Takes the first sample of a lookup response
fn parse_lookup(lookup: LookupResponse) -> Result<f64, FetchError> {
    lookup
        .results
        .first()
        .and_then(|r| r.elevation)
        .filter(|e| e.is_finite())
        .ok_or_else(|| FetchError::unavailable(NO_ELEVATION))
}
