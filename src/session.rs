//! Background fetching for selections and the startup overview
//!
//! Each selection runs its weather, elevation and earthquake fetches on one
//! spawned task and reports every section over a tokio channel as soon as it
//! completes. The risk scorer runs once weather and elevation have both
//! settled, successfully or not. Messages carry the id of the selection that
//! produced them so the app can drop results for points it no longer shows.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::data::{
    Coordinate, ElevationClient, FetchError, GeolocationClient, GeolocationError, SeismicClient,
    SeismicEvent, SeismicQuery, WeatherClient, WeatherSnapshot,
};
use crate::risk::{self, RiskAssessment, RiskInputs};

/// Data sources used by a session
#[async_trait]
pub trait Providers: Send + Sync {
    async fn weather(&self, at: Coordinate) -> Result<WeatherSnapshot, FetchError>;
    async fn elevation(&self, at: Coordinate) -> Result<f64, FetchError>;
    async fn earthquakes(&self, query: &SeismicQuery) -> Result<Vec<SeismicEvent>, FetchError>;
    async fn locate(&self) -> Result<Coordinate, GeolocationError>;
}

/// Providers backed by the public HTTP services
#[derive(Debug, Clone)]
pub struct HttpProviders {
    weather: WeatherClient,
    elevation: ElevationClient,
    seismic: SeismicClient,
    geolocation: GeolocationClient,
}

impl HttpProviders {
    pub fn from_settings(settings: &Settings, locate: bool) -> Self {
        let geolocation = GeolocationClient::from_settings(settings);
        Self {
            weather: WeatherClient::from_settings(settings),
            elevation: ElevationClient::from_settings(settings),
            seismic: SeismicClient::from_settings(settings),
            geolocation: if locate {
                geolocation
            } else {
                geolocation.declined()
            },
        }
    }
}

#[async_trait]
impl Providers for HttpProviders {
    async fn weather(&self, at: Coordinate) -> Result<WeatherSnapshot, FetchError> {
        self.weather.fetch_forecast(at).await
    }

    async fn elevation(&self, at: Coordinate) -> Result<f64, FetchError> {
        self.elevation.fetch_elevation(at).await
    }

    async fn earthquakes(&self, query: &SeismicQuery) -> Result<Vec<SeismicEvent>, FetchError> {
        self.seismic.fetch_events(query).await
    }

    async fn locate(&self) -> Result<Coordinate, GeolocationError> {
        self.geolocation.locate().await
    }
}

/// One finished section of a selection
#[derive(Debug)]
pub enum SectionUpdate {
    Weather(Result<WeatherSnapshot, FetchError>),
    Elevation(Result<f64, FetchError>),
    Earthquakes(Result<Vec<SeismicEvent>, FetchError>),
    Risk(RiskAssessment),
}

/// Messages sent from background tasks to the app
#[derive(Debug)]
pub enum SessionMessage {
    /// Outcome of the startup location lookup
    Located(Result<Coordinate, GeolocationError>),
    /// Significant earthquakes around the user's location
    OverviewQuakes(Result<Vec<SeismicEvent>, FetchError>),
    /// A section of the given selection is ready
    Section { selection: u64, update: SectionUpdate },
}

/// Transport and provider errors are warnings; missing data is routine
fn log_failure(selection: u64, section: &'static str, error: &FetchError) {
    if error.is_network_failure() {
        warn!(selection, section, %error, "fetch failed");
    } else {
        info!(selection, section, %error, "no data");
    }
}

/// Fetches every section for one selected point
///
/// Sends four messages in completion order: weather, elevation and
/// earthquakes as they finish, and risk once both weather and elevation
/// are done. Send failures are ignored; the app may have quit.
pub async fn run_selection(
    providers: &dyn Providers,
    selection: u64,
    at: Coordinate,
    query: SeismicQuery,
    tx: &mpsc::Sender<SessionMessage>,
) {
    info!(selection, %at, "loading selection");
    let send = |update: SectionUpdate| async move {
        let _ = tx.send(SessionMessage::Section { selection, update }).await;
    };

    let weather_and_elevation = async {
        let (weather, elevation) = futures::join!(
            async {
                let result = providers.weather(at).await;
                if let Err(e) = &result {
                    log_failure(selection, "weather", e);
                }
                let rainfall = result.as_ref().ok().map(|w| w.rainfall_today_mm());
                send(SectionUpdate::Weather(result)).await;
                rainfall
            },
            async {
                let result = providers.elevation(at).await;
                if let Err(e) = &result {
                    log_failure(selection, "elevation", e);
                }
                let elevation = result.as_ref().ok().copied();
                send(SectionUpdate::Elevation(result)).await;
                elevation
            }
        );

        let assessment = risk::assess(&RiskInputs::at(at, weather, elevation));
        send(SectionUpdate::Risk(assessment)).await;
    };

    let earthquakes = async {
        let result = providers.earthquakes(&query).await;
        match &result {
            Ok(events) => info!(selection, count = events.len(), "earthquakes loaded"),
            Err(e) => log_failure(selection, "earthquakes", e),
        }
        send(SectionUpdate::Earthquakes(result)).await;
    };

    futures::join!(weather_and_elevation, earthquakes);
}

/// Locates the user and, on success, loads nearby significant earthquakes
pub async fn run_overview(
    providers: &dyn Providers,
    radius_km: f64,
    min_magnitude: f64,
    tx: &mpsc::Sender<SessionMessage>,
) {
    let located = providers.locate().await;
    let center = match &located {
        Ok(center) => Some(*center),
        Err(e) => {
            warn!(error = %e, "could not locate user");
            None
        }
    };
    if tx.send(SessionMessage::Located(located)).await.is_err() {
        return;
    }

    if let Some(center) = center {
        let query = SeismicQuery::around(center, radius_km).with_min_magnitude(Some(min_magnitude));
        let result = providers.earthquakes(&query).await;
        let _ = tx.send(SessionMessage::OverviewQuakes(result)).await;
    }
}

/// Handle for spawning session tasks and receiving their messages
pub struct SessionHandle {
    providers: Arc<dyn Providers>,
    settings: Settings,
    sender: mpsc::Sender<SessionMessage>,
    /// Channel for receiving session messages
    pub receiver: mpsc::Receiver<SessionMessage>,
}

impl SessionHandle {
    pub fn new(providers: Arc<dyn Providers>, settings: Settings) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        Self {
            providers,
            settings,
            sender,
            receiver,
        }
    }

    /// The earthquake query used for a selected point
    pub fn details_query(&self, at: Coordinate) -> SeismicQuery {
        SeismicQuery::around(at, self.settings.details_radius_km)
            .with_min_magnitude(self.settings.details_min_magnitude)
    }

    /// Spawns the fetches for a selection
    pub fn start_selection(&self, selection: u64, at: Coordinate) {
        let providers = Arc::clone(&self.providers);
        let tx = self.sender.clone();
        let query = self.details_query(at);
        tokio::spawn(async move {
            run_selection(providers.as_ref(), selection, at, query, &tx).await;
        });
    }

    /// Spawns the startup location lookup and overview query
    pub fn start_overview(&self) {
        let providers = Arc::clone(&self.providers);
        let tx = self.sender.clone();
        let radius_km = self.settings.overview_radius_km;
        let min_magnitude = self.settings.overview_min_magnitude;
        tokio::spawn(async move {
            run_overview(providers.as_ref(), radius_km, min_magnitude, &tx).await;
        });
    }

    /// Checks for a pending message without blocking
    pub fn try_recv(&mut self) -> Option<SessionMessage> {
        self.receiver.try_recv().ok()
    }
}
