//! Application settings
//!
//! Settings come from built-in defaults, an optional JSON file in the
//! platform config directory (`~/.config/geohazard/settings.json` on Linux),
//! the environment and finally command-line flags. Later layers win.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::{Cli, MAX_RADIUS_KM};

/// Name of the settings file inside the config directory
const SETTINGS_FILE: &str = "settings.json";

/// Longest time a map message may stay on screen
const MAX_INFO_MESSAGE_SECS: u64 = 3600;

/// Errors that can occur while loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file exists but could not be read
    #[error("could not read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The settings file is not valid JSON for `Settings`
    #[error("malformed settings file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A setting is out of its accepted range
    #[error("invalid setting {field}: {value}")]
    Invalid { field: &'static str, value: String },
}

/// Runtime settings shared by the providers and the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub weather_base_url: String,
    /// WeatherAPI key; weather is unavailable without one
    pub weather_api_key: Option<String>,
    pub elevation_base_url: String,
    pub seismic_base_url: String,
    pub geolocation_url: String,
    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: u64,
    /// Earthquake search radius for a selected point
    pub details_radius_km: f64,
    pub details_min_magnitude: Option<f64>,
    /// Earthquake search radius around the user's location
    pub overview_radius_km: f64,
    pub overview_min_magnitude: f64,
    /// How long transient map messages stay visible
    pub info_message_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weather_base_url: "https://api.weatherapi.com/v1".to_string(),
            weather_api_key: None,
            elevation_base_url: "https://api.open-elevation.com/api/v1".to_string(),
            seismic_base_url: "https://earthquake.usgs.gov/fdsnws/event/1".to_string(),
            geolocation_url: "https://ipapi.co/json/".to_string(),
            request_timeout_secs: 15,
            details_radius_km: 100.0,
            details_min_magnitude: None,
            overview_radius_km: 500.0,
            overview_min_magnitude: 4.5,
            info_message_secs: 5,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn info_message_duration(&self) -> Duration {
        Duration::from_secs(self.info_message_secs)
    }

    /// Applies command-line overrides on top of the loaded settings
    ///
    /// `--weather-key` also picks up `WEATHERAPI_KEY` through clap, so the
    /// environment layer is folded in here as well.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(key) = &cli.weather_key {
            self.weather_api_key = Some(key.clone());
        }
        if let Some(radius) = cli.radius {
            self.details_radius_km = radius;
        }
        if cli.min_magnitude.is_some() {
            self.details_min_magnitude = cli.min_magnitude;
        }
    }

    /// Rejects values the providers or the UI cannot work with
    ///
    /// Runs after every layer is applied, so the file gets the same checks
    /// as the command line.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, value: &dyn std::fmt::Display| ConfigError::Invalid {
            field,
            value: value.to_string(),
        };
        let radius_ok = |radius: f64| radius > 0.0 && radius <= MAX_RADIUS_KM;

        if !radius_ok(self.details_radius_km) {
            return Err(invalid("details_radius_km", &self.details_radius_km));
        }
        if !radius_ok(self.overview_radius_km) {
            return Err(invalid("overview_radius_km", &self.overview_radius_km));
        }
        if let Some(magnitude) = self.details_min_magnitude {
            if !magnitude.is_finite() {
                return Err(invalid("details_min_magnitude", &magnitude));
            }
        }
        if !self.overview_min_magnitude.is_finite() {
            return Err(invalid("overview_min_magnitude", &self.overview_min_magnitude));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", &self.request_timeout_secs));
        }
        if self.info_message_secs > MAX_INFO_MESSAGE_SECS {
            return Err(invalid("info_message_secs", &self.info_message_secs));
        }
        Ok(())
    }
}

/// Location of the settings file on disk
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    /// The settings file in the platform config directory
    ///
    /// Returns `None` if the directory cannot be determined (e.g., no home
    /// directory).
    pub fn default_location() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "geohazard")?;
        Some(Self {
            path: project_dirs.config_dir().join(SETTINGS_FILE),
        })
    }

    /// A settings file at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the settings file
    ///
    /// A missing file yields the defaults. Keys absent from the file keep
    /// their default values.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Malformed {
            path: self.path.clone(),
            source,
        })
    }
}

/// Loads settings for a run: file layer first, then CLI and environment
pub fn load(cli: &Cli) -> Result<Settings, ConfigError> {
    let file = match &cli.config {
        Some(path) => Some(SettingsFile::at(path)),
        None => SettingsFile::default_location(),
    };

    let mut settings = match file {
        Some(file) => file.load()?,
        None => Settings::default(),
    };
    settings.apply_cli(cli);
    settings.validate()?;
    Ok(settings)
}
