//! Per-selection details and their text rendering
//!
//! A `LocationReport` collects the four sections of a selected point as
//! session updates arrive. Each section is loading, ready or failed on its
//! own. The line formatting here is shared by the details view and the
//! plain-text `--report` output.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::data::{Coordinate, ForecastDay, SeismicEvent, WeatherSnapshot};
use crate::risk::{Hazard, RiskAssessment};
use crate::session::SectionUpdate;

/// Title used until the weather provider names the place
pub const DEFAULT_TITLE: &str = "Location Details";

pub const ELEVATION_UNAVAILABLE: &str = "Elevation: Data unavailable";

/// Load state of one section
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Loading,
    Ready(T),
    /// Inline message shown in place of the section
    Failed(String),
}

impl<T> Section<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Section::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Everything known about one selected point
#[derive(Debug, Clone, PartialEq)]
pub struct LocationReport {
    pub coordinate: Coordinate,
    /// Earthquake search radius, for the empty-state message
    pub radius_km: f64,
    pub weather: Section<WeatherSnapshot>,
    pub elevation: Section<f64>,
    pub earthquakes: Section<Vec<SeismicEvent>>,
    pub risk: Section<RiskAssessment>,
}

impl LocationReport {
    /// A report with every section still loading
    pub fn loading(coordinate: Coordinate, radius_km: f64) -> Self {
        Self {
            coordinate,
            radius_km,
            weather: Section::Loading,
            elevation: Section::Loading,
            earthquakes: Section::Loading,
            risk: Section::Loading,
        }
    }

    /// "Place, Country" once weather is in, otherwise a generic title
    pub fn title(&self) -> String {
        match &self.weather {
            Section::Ready(w) => format!("{}, {}", w.location_name, w.country),
            _ => DEFAULT_TITLE.to_string(),
        }
    }

    pub fn coordinates_line(&self) -> String {
        format!("Coordinates: {}", self.coordinate)
    }

    pub fn elevation_line(&self) -> String {
        match &self.elevation {
            Section::Loading => "Elevation: Loading...".to_string(),
            Section::Ready(meters) => format!("Elevation: {} meters", meters),
            Section::Failed(message) => message.clone(),
        }
    }

    pub fn empty_earthquakes_message(&self) -> String {
        format!("No recent earthquakes found within {} km.", self.radius_km)
    }

    /// Folds a finished section into the report
    pub fn apply(&mut self, update: SectionUpdate) {
        match update {
            SectionUpdate::Weather(result) => {
                self.weather = match result {
                    Ok(snapshot) => Section::Ready(snapshot),
                    Err(e) => Section::Failed(format!("Failed to load weather data. {}", e)),
                };
            }
            SectionUpdate::Elevation(result) => {
                self.elevation = match result {
                    Ok(meters) => Section::Ready(meters),
                    Err(_) => Section::Failed(ELEVATION_UNAVAILABLE.to_string()),
                };
            }
            SectionUpdate::Earthquakes(result) => {
                self.earthquakes = match result {
                    Ok(events) => Section::Ready(events),
                    Err(e) => Section::Failed(format!("Failed to load earthquake data. {}", e)),
                };
            }
            SectionUpdate::Risk(assessment) => {
                self.risk = Section::Ready(assessment);
            }
        }
    }

    /// Whether every section has settled
    pub fn is_complete(&self) -> bool {
        !self.weather.is_loading()
            && !self.elevation.is_loading()
            && !self.earthquakes.is_loading()
            && !self.risk.is_loading()
    }
}

/// Header line for a forecast day, e.g. "Mon, 2024-07-15"
pub fn day_heading(day: &ForecastDay) -> String {
    day.date.format("%a, %Y-%m-%d").to_string()
}

/// Detail lines for a forecast day
pub fn day_lines(day: &ForecastDay) -> Vec<String> {
    vec![
        format!("Temp: {}°C ({}°F)", day.avg_temp_c, day.avg_temp_f),
        format!("Max: {}°C | Min: {}°C", day.max_temp_c, day.min_temp_c),
        format!("Humidity: {}%", day.avg_humidity),
        format!("Wind: {} km/h", day.max_wind_kph),
        format!("Rain: {} mm", day.total_precip_mm),
    ]
}

/// "Flood Risk: Moderate (3/5)"
pub fn risk_line(hazard: Hazard, assessment: &RiskAssessment) -> String {
    let level = assessment.level(hazard);
    format!(
        "{} Risk: {} ({}/5)",
        hazard.label(),
        level.label(),
        level.value()
    )
}

pub fn quake_time(event: &SeismicEvent) -> String {
    event
        .time()
        .map(format_time)
        .unwrap_or_else(|| "Unknown time".to_string())
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn quake_heading(event: &SeismicEvent) -> String {
    format!("Magnitude {}", event.magnitude)
}

/// Summary lines shown in the earthquake list
pub fn quake_lines(event: &SeismicEvent) -> Vec<String> {
    vec![
        format!("Location: {}", event.place),
        format!("Time: {}", quake_time(event)),
        format!("Depth: {} km", event.depth_km),
    ]
}

/// Lines of the earthquake details popup
pub fn quake_detail_lines(event: &SeismicEvent) -> Vec<String> {
    let felt = event
        .felt
        .filter(|count| *count > 0)
        .map(|count| count.to_string())
        .unwrap_or_else(|| "None".to_string());

    vec![
        format!("Magnitude: {}", event.magnitude),
        format!("Location: {}", event.place),
        format!("Time: {}", quake_time(event)),
        format!("Depth: {} km", event.depth_km),
        format!("Felt Reports: {}", felt),
        format!("Significance: {}", event.significance),
    ]
}

/// Renders a report as plain text for `--report`
pub fn render_plain(report: &LocationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.title());
    let _ = writeln!(out, "{}", report.coordinates_line());
    let _ = writeln!(out, "{}", report.elevation_line());

    let _ = writeln!(out, "\nWeather Forecast");
    match &report.weather {
        Section::Loading => {
            let _ = writeln!(out, "  Loading weather data...");
        }
        Section::Failed(message) => {
            let _ = writeln!(out, "  {}", message);
        }
        Section::Ready(snapshot) => {
            for day in &snapshot.days {
                let _ = writeln!(out, "  {}  {}", day_heading(day), day.condition);
                for line in day_lines(day) {
                    let _ = writeln!(out, "    {}", line);
                }
            }
        }
    }

    let _ = writeln!(out, "\nDisaster Risk Assessment");
    match &report.risk {
        Section::Ready(assessment) => {
            for hazard in Hazard::all() {
                let _ = writeln!(out, "  {}", risk_line(*hazard, assessment));
            }
        }
        Section::Loading => {
            let _ = writeln!(out, "  Calculating risk...");
        }
        Section::Failed(message) => {
            let _ = writeln!(out, "  {}", message);
        }
    }

    let _ = writeln!(out, "\nRecent Earthquakes (last 30 days)");
    match &report.earthquakes {
        Section::Loading => {
            let _ = writeln!(out, "  Loading earthquake data...");
        }
        Section::Failed(message) => {
            let _ = writeln!(out, "  {}", message);
        }
        Section::Ready(events) if events.is_empty() => {
            let _ = writeln!(out, "  {}", report.empty_earthquakes_message());
        }
        Section::Ready(events) => {
            for event in events {
                let _ = writeln!(
                    out,
                    "  {} [{}]",
                    quake_heading(event),
                    event.severity().class()
                );
                for line in quake_detail_lines(event).into_iter().skip(1) {
                    let _ = writeln!(out, "    {}", line);
                }
            }
        }
    }

    out
}
