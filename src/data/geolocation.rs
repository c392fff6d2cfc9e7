//! Startup location lookup
//!
//! Resolves the user's approximate position from their public IP address.
//! The lookup can be declined, in which case no request is made.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::{http_client, Coordinate};
use crate::config::Settings;

/// Errors that can occur while locating the user
#[derive(Debug, Error)]
pub enum GeolocationError {
    /// The user declined the lookup
    #[error("location lookup was declined")]
    Denied,

    /// The service could not provide a position
    #[error("location lookup is unavailable: {0}")]
    Unsupported(String),

    /// HTTP request failed
    #[error("location request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Response body of the IP geolocation service
#[derive(Debug, Deserialize)]
struct IpLocation {
    latitude: Option<f64>,
    longitude: Option<f64>,
    /// Present when the service refuses the request
    reason: Option<String>,
}

/// Client for the IP geolocation service
#[derive(Debug, Clone)]
pub struct GeolocationClient {
    http_client: Client,
    url: String,
    /// Whether the user allowed the lookup
    enabled: bool,
}

impl GeolocationClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            url: url.into(),
            enabled: true,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            http_client: http_client(settings.request_timeout()),
            url: settings.geolocation_url.clone(),
            enabled: true,
        }
    }

    /// Marks the lookup as declined; `locate` will fail with `Denied`
    pub fn declined(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Looks up the current position
    pub async fn locate(&self) -> Result<Coordinate, GeolocationError> {
        if !self.enabled {
            return Err(GeolocationError::Denied);
        }

        debug!(url = %self.url, "locating user");
        let location = self
            .http_client
            .get(&self.url)
            .send()
            .await?
            .json::<IpLocation>()
            .await?;

        parse_location(location)
    }
}

fn parse_location(location: IpLocation) -> Result<Coordinate, GeolocationError> {
    if let Some(reason) = location.reason {
        return Err(GeolocationError::Unsupported(reason));
    }

    match (location.latitude, location.longitude) {
        (Some(lat), Some(lng)) => Coordinate::new(lat, lng)
            .map_err(|e| GeolocationError::Unsupported(e.to_string())),
        _ => Err(GeolocationError::Unsupported(
            "no position in response".to_string(),
        )),
    }
}
