//! Application state management for geohazard
//!
//! This module contains the main application state: the world map view, the
//! details report for the current selection, transient info messages and the
//! keyboard handling that moves between them.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, info};

use crate::cli::StartupConfig;
use crate::config::Settings;
use crate::data::{Coordinate, SeismicEvent};
use crate::report::{LocationReport, Section};
use crate::session::SessionMessage;

/// Where the map opens when no location is known
pub const DEFAULT_CENTER: (f64, f64) = (20.0, 0.0);

pub const LOCATED_MESSAGE: &str =
    "Map centered on your current location. Select anywhere to get disaster information.";

/// Crosshair step sizes in degrees, selectable with +/-
const STEPS: [f64; 6] = [0.1, 0.5, 1.0, 2.0, 5.0, 10.0];
const DEFAULT_STEP: usize = 2;

/// Longitude span of the visible map per zoom level; latitude span is half
const ZOOM_SPANS: [f64; 6] = [360.0, 180.0, 90.0, 45.0, 20.0, 10.0];

/// Application state enum representing the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// World map with a movable crosshair
    Map,
    /// Weather, elevation, risk and earthquakes for the selected point
    Details,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// A transient message shown over the map
#[derive(Debug, Clone, PartialEq)]
pub struct InfoMessage {
    pub text: String,
    pub kind: MessageKind,
    expires_at: Instant,
}

/// State of the world map
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    /// Crosshair position
    pub cursor: Coordinate,
    step_index: usize,
    zoom_index: usize,
    /// Position found by the startup lookup
    pub user_location: Option<Coordinate>,
    /// Significant earthquakes around the user's location
    pub quakes: Vec<SeismicEvent>,
    /// Index into `quakes` of the marker whose popup is open
    pub focused_quake: Option<usize>,
    /// Last point opened in the details view
    pub selected: Option<Coordinate>,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            cursor: Coordinate::clamped(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            step_index: DEFAULT_STEP,
            zoom_index: 0,
            user_location: None,
            quakes: Vec::new(),
            focused_quake: None,
            selected: None,
        }
    }
}

impl MapView {
    /// Current crosshair step in degrees
    pub fn step(&self) -> f64 {
        STEPS[self.step_index]
    }

    pub fn increase_step(&mut self) {
        self.step_index = (self.step_index + 1).min(STEPS.len() - 1);
    }

    pub fn decrease_step(&mut self) {
        self.step_index = self.step_index.saturating_sub(1);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_index = (self.zoom_index + 1).min(ZOOM_SPANS.len() - 1);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_index = self.zoom_index.saturating_sub(1);
    }

    pub fn zoom_level(&self) -> usize {
        self.zoom_index
    }

    /// Moves the crosshair; latitude stops at the poles, longitude wraps
    pub fn move_by(&mut self, d_lat: f64, d_lng: f64) {
        let mut lng = self.cursor.longitude() + d_lng;
        if lng > 180.0 {
            lng -= 360.0;
        } else if lng < -180.0 {
            lng += 360.0;
        }
        self.cursor = Coordinate::clamped(self.cursor.latitude() + d_lat, lng);
        self.focused_quake = None;
    }

    /// Visible (longitude, latitude) ranges, centered on the crosshair where
    /// the world edge allows
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let lng_span = ZOOM_SPANS[self.zoom_index];
        let lat_span = lng_span / 2.0;
        (
            centered_range(self.cursor.longitude(), lng_span, 180.0),
            centered_range(self.cursor.latitude(), lat_span, 90.0),
        )
    }

    /// Recenters on a point and zooms all the way in
    pub fn center_on(&mut self, at: Coordinate) {
        self.cursor = at;
        self.zoom_index = ZOOM_SPANS.len() - 1;
    }

    /// Cycles the open popup through the earthquake markers
    pub fn focus_next_quake(&mut self) {
        if self.quakes.is_empty() {
            return;
        }
        let next = match self.focused_quake {
            Some(i) => (i + 1) % self.quakes.len(),
            None => 0,
        };
        self.focus_quake(next);
    }

    pub fn focus_previous_quake(&mut self) {
        if self.quakes.is_empty() {
            return;
        }
        let previous = match self.focused_quake {
            Some(0) | None => self.quakes.len() - 1,
            Some(i) => i - 1,
        };
        self.focus_quake(previous);
    }

    fn focus_quake(&mut self, index: usize) {
        if let Some(epicenter) = self.quakes.get(index).and_then(|q| q.epicenter()) {
            self.cursor = epicenter;
        }
        self.focused_quake = Some(index);
    }

    pub fn focused(&self) -> Option<&SeismicEvent> {
        self.focused_quake.and_then(|i| self.quakes.get(i))
    }
}

fn centered_range(center: f64, span: f64, limit: f64) -> [f64; 2] {
    if span >= 2.0 * limit {
        return [-limit, limit];
    }
    let half = span / 2.0;
    let low = (center - half).clamp(-limit, limit - span);
    [low, low + span]
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    pub map: MapView,
    /// Details for the current selection
    pub report: Option<LocationReport>,
    /// Highlighted row in the earthquake list
    pub quake_cursor: usize,
    /// Whether the details popup for the highlighted earthquake is open
    pub quake_popup: bool,
    pub info: Option<InfoMessage>,
    /// Id of the current selection; updates for other ids are stale
    selection: u64,
    /// Selection waiting for its fetches to be started
    pending_selection: Option<(u64, Coordinate)>,
    info_duration: Duration,
    details_radius_km: f64,
    overview_radius_km: f64,
}

impl App {
    /// Creates a new App instance on the map view
    pub fn new(settings: &Settings) -> Self {
        Self {
            state: AppState::Map,
            should_quit: false,
            show_help: false,
            map: MapView::default(),
            report: None,
            quake_cursor: 0,
            quake_popup: false,
            info: None,
            selection: 0,
            pending_selection: None,
            info_duration: settings.info_message_duration(),
            details_radius_km: settings.details_radius_km,
            overview_radius_km: settings.overview_radius_km,
        }
    }

    /// Creates a new App instance with the given startup configuration.
    ///
    /// A coordinate from the command line opens the details view directly.
    pub fn with_startup_config(config: StartupConfig, settings: &Settings) -> Self {
        let mut app = Self::new(settings);
        if let Some(at) = config.initial_selection {
            app.map.center_on(at);
            app.select(at);
        }
        app
    }

    /// Opens the details view for a point and queues its fetches
    pub fn select(&mut self, at: Coordinate) {
        let at = at.rounded();
        self.selection += 1;
        info!(selection = self.selection, query = %at.query_string(), "selected location");

        self.map.selected = Some(at);
        self.report = Some(LocationReport::loading(at, self.details_radius_km));
        self.quake_cursor = 0;
        self.quake_popup = false;
        self.pending_selection = Some((self.selection, at));
        self.state = AppState::Details;
    }

    /// Hands the queued selection to the caller, which starts its fetches
    pub fn take_pending_selection(&mut self) -> Option<(u64, Coordinate)> {
        self.pending_selection.take()
    }

    pub fn current_selection(&self) -> u64 {
        self.selection
    }

    pub fn show_message(&mut self, text: impl Into<String>, kind: MessageKind, now: Instant) {
        self.info = Some(InfoMessage {
            text: text.into(),
            kind,
            // Unvalidated durations can overflow; such a message lasts one frame
            expires_at: now.checked_add(self.info_duration).unwrap_or(now),
        });
    }

    /// Drops the info message once its time is up
    pub fn tick(&mut self, now: Instant) {
        if self.info.as_ref().is_some_and(|m| now >= m.expires_at) {
            self.info = None;
        }
    }

    /// Applies a message from a background task
    pub fn apply_message(&mut self, message: SessionMessage, now: Instant) {
        match message {
            SessionMessage::Located(Ok(at)) => {
                self.map.user_location = Some(at);
                if self.state == AppState::Map {
                    self.map.center_on(at);
                }
                self.show_message(LOCATED_MESSAGE, MessageKind::Info, now);
            }
            SessionMessage::Located(Err(e)) => {
                self.show_message(
                    format!("Could not get your location. {}", e),
                    MessageKind::Error,
                    now,
                );
            }
            SessionMessage::OverviewQuakes(Ok(events)) => {
                if !events.is_empty() {
                    self.show_message(
                        format!(
                            "Found {} significant earthquakes in the last 30 days within {}km.",
                            events.len(),
                            self.overview_radius_km
                        ),
                        MessageKind::Info,
                        now,
                    );
                }
                self.map.quakes = events;
                self.map.focused_quake = None;
            }
            SessionMessage::OverviewQuakes(Err(e)) => {
                debug!(error = %e, "overview earthquakes unavailable");
            }
            SessionMessage::Section { selection, update } => {
                if selection != self.selection {
                    debug!(selection, current = self.selection, "discarding stale update");
                    return;
                }
                if let Some(report) = self.report.as_mut() {
                    report.apply(update);
                }
            }
        }
    }

    /// Number of earthquakes listed in the details view
    pub fn quake_count(&self) -> usize {
        self.report
            .as_ref()
            .and_then(|r| r.earthquakes.ready())
            .map(|events| events.len())
            .unwrap_or(0)
    }

    /// The highlighted earthquake in the details list
    pub fn highlighted_quake(&self) -> Option<&SeismicEvent> {
        match &self.report.as_ref()?.earthquakes {
            Section::Ready(events) => events.get(self.quake_cursor),
            _ => None,
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit the application
    /// - `?`: Toggle help
    /// - Map: arrows/`hjkl` move the crosshair, `+`/`-` change the step,
    ///   `]`/`[` zoom, `n`/`N` cycle earthquake markers, `c` jump to your
    ///   location, `Enter` open details for the crosshair
    /// - Details: `j`/`k` move through earthquakes, `Enter` toggle the
    ///   earthquake popup, `r` reload, `Esc` back to the map
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.state {
            AppState::Map => self.handle_map_key(key_event),
            AppState::Details => self.handle_details_key(key_event),
        }
    }

    fn handle_map_key(&mut self, key_event: KeyEvent) {
        let step = self.map.step();
        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                if self.map.focused_quake.is_some() {
                    self.map.focused_quake = None;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.map.move_by(step, 0.0),
            KeyCode::Down | KeyCode::Char('j') => self.map.move_by(-step, 0.0),
            KeyCode::Left | KeyCode::Char('h') => self.map.move_by(0.0, -step),
            KeyCode::Right | KeyCode::Char('l') => self.map.move_by(0.0, step),
            KeyCode::Char('+') | KeyCode::Char('=') => self.map.increase_step(),
            KeyCode::Char('-') => self.map.decrease_step(),
            KeyCode::Char(']') => self.map.zoom_in(),
            KeyCode::Char('[') => self.map.zoom_out(),
            KeyCode::Char('n') => self.map.focus_next_quake(),
            KeyCode::Char('N') => self.map.focus_previous_quake(),
            KeyCode::Char('c') => {
                if let Some(home) = self.map.user_location {
                    self.map.center_on(home);
                    self.map.focused_quake = None;
                }
            }
            KeyCode::Enter => {
                let at = self.map.cursor;
                self.select(at);
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    fn handle_details_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc | KeyCode::Backspace => {
                if self.quake_popup {
                    self.quake_popup = false;
                } else {
                    self.state = AppState::Map;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let count = self.quake_count();
                if count > 0 && self.quake_cursor + 1 < count {
                    self.quake_cursor += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.quake_cursor = self.quake_cursor.saturating_sub(1);
            }
            KeyCode::Enter => {
                if self.highlighted_quake().is_some() {
                    self.quake_popup = !self.quake_popup;
                }
            }
            KeyCode::Char('r') => {
                if let Some(at) = self.report.as_ref().map(|r| r.coordinate) {
                    self.select(at);
                }
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }
}
