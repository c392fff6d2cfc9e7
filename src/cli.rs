//! Command-line interface parsing for geohazard
//!
//! This module handles parsing of CLI arguments using clap. A coordinate
//! given with `--lat`/`--lng` opens the details view for that point directly,
//! and `--report` prints the details as plain text instead of starting the TUI.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::data::{Coordinate, CoordinateError};

/// Longest meaningful search radius: half the Earth's circumference
pub const MAX_RADIUS_KM: f64 = 20_001.6;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The coordinate given with --lat/--lng is out of range
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),

    /// The search radius is not a positive distance on Earth
    #[error("invalid radius: {0} km (expected a value in (0, 20001.6])")]
    InvalidRadius(f64),

    /// The minimum magnitude is not a finite number
    #[error("invalid minimum magnitude: {0}")]
    InvalidMagnitude(f64),
}

/// geohazard - Weather, elevation and earthquake data with a rough disaster risk summary
#[derive(Parser, Debug)]
#[command(name = "geohazard")]
#[command(about = "Weather, elevation and earthquake data for any point on Earth, with a rough disaster risk summary")]
#[command(version)]
pub struct Cli {
    /// Latitude of the point to inspect (requires --lng)
    #[arg(long, value_name = "DEG", allow_negative_numbers = true, requires = "lng")]
    pub lat: Option<f64>,

    /// Longitude of the point to inspect (requires --lat)
    #[arg(long, value_name = "DEG", allow_negative_numbers = true, requires = "lat")]
    pub lng: Option<f64>,

    /// Do not look up the current location at startup
    #[arg(long)]
    pub no_locate: bool,

    /// Print the details for --lat/--lng as plain text and exit
    ///
    /// Example:
    ///   geohazard --lat 35.3 --lng 139.5 --report
    #[arg(long, requires = "lat")]
    pub report: bool,

    /// Earthquake search radius around the selected point, in km
    #[arg(long, value_name = "KM", allow_negative_numbers = true)]
    pub radius: Option<f64>,

    /// Only list earthquakes at or above this magnitude
    #[arg(long, value_name = "M", allow_negative_numbers = true)]
    pub min_magnitude: Option<f64>,

    /// WeatherAPI key
    #[arg(long, value_name = "KEY", env = "WEATHERAPI_KEY", hide_env_values = true)]
    pub weather_key: Option<String>,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StartupConfig {
    /// Point to open the details view for, rounded to six decimals
    pub initial_selection: Option<Coordinate>,
    /// Whether to look up the user's location
    pub locate: bool,
    /// Whether to print a plain-text report instead of running the TUI
    pub report: bool,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if the coordinate, radius or magnitude is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if let Some(radius) = cli.radius {
            if !(radius > 0.0 && radius <= MAX_RADIUS_KM) {
                return Err(CliError::InvalidRadius(radius));
            }
        }
        if let Some(magnitude) = cli.min_magnitude {
            if !magnitude.is_finite() {
                return Err(CliError::InvalidMagnitude(magnitude));
            }
        }

        let initial_selection = match (cli.lat, cli.lng) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)?.rounded()),
            _ => None,
        };

        Ok(StartupConfig {
            initial_selection,
            locate: !cli.no_locate && !cli.report,
            report: cli.report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["geohazard"]);
        assert!(cli.lat.is_none());
        assert!(cli.lng.is_none());
        assert!(!cli.no_locate);
        assert!(!cli.report);
    }

    #[test]
    fn test_cli_parse_negative_coordinate() {
        let cli = Cli::parse_from(["geohazard", "--lat", "-33.87", "--lng", "-151.21"]);
        assert_eq!(cli.lat, Some(-33.87));
        assert_eq!(cli.lng, Some(-151.21));
    }

    #[test]
    fn test_cli_lat_requires_lng() {
        assert!(Cli::try_parse_from(["geohazard", "--lat", "10"]).is_err());
        assert!(Cli::try_parse_from(["geohazard", "--lng", "10"]).is_err());
    }

    #[test]
    fn test_cli_report_requires_coordinate() {
        assert!(Cli::try_parse_from(["geohazard", "--report"]).is_err());
        assert!(Cli::try_parse_from(["geohazard", "--report", "--lat", "1", "--lng", "2"]).is_ok());
    }

    #[test]
    fn test_startup_config_default() {
        let cli = Cli::parse_from(["geohazard"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert!(config.initial_selection.is_none());
        assert!(config.locate);
        assert!(!config.report);
    }

    #[test]
    fn test_startup_config_no_locate() {
        let cli = Cli::parse_from(["geohazard", "--no-locate"]);
        assert!(!StartupConfig::from_cli(&cli).unwrap().locate);
    }

    #[test]
    fn test_startup_config_coordinate_is_rounded() {
        let cli = Cli::parse_from(["geohazard", "--lat", "35.12345678", "--lng", "139.98765432"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        let selection = config.initial_selection.unwrap();
        assert_eq!(selection.to_string(), "35.123457, 139.987654");
    }

    #[test]
    fn test_startup_config_report_skips_locate() {
        let cli = Cli::parse_from(["geohazard", "--lat", "1", "--lng", "2", "--report"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert!(config.report);
        assert!(!config.locate);
    }

    #[test]
    fn test_startup_config_out_of_range_latitude() {
        let cli = Cli::parse_from(["geohazard", "--lat", "95", "--lng", "0"]);
        let err = StartupConfig::from_cli(&cli).unwrap_err();
        assert!(matches!(err, CliError::InvalidCoordinate(_)));
        assert!(err.to_string().contains("latitude"));
    }

    #[test]
    fn test_startup_config_invalid_radius() {
        for radius in ["0", "-5", "30000"] {
            let cli = Cli::parse_from(["geohazard", "--radius", radius]);
            assert!(matches!(
                StartupConfig::from_cli(&cli),
                Err(CliError::InvalidRadius(_))
            ));
        }
    }

    #[test]
    fn test_startup_config_valid_radius() {
        let cli = Cli::parse_from(["geohazard", "--radius", "250"]);
        assert!(StartupConfig::from_cli(&cli).is_ok());
    }
}
