//! geohazard - Weather, elevation and earthquake data for any point on Earth
//!
//! A terminal UI application: pick a point on the world map to see its
//! forecast, elevation, recent earthquakes and a rough disaster risk summary.
//! With `--report` the same details are printed as plain text.

use std::io;
use std::panic;
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::info;

use geohazard::app::{App, AppState};
use geohazard::cli::{Cli, StartupConfig};
use geohazard::config::{self, Settings};
use geohazard::data::{Coordinate, SeismicQuery};
use geohazard::logging::{self, LogTarget};
use geohazard::report::{render_plain, LocationReport};
use geohazard::session::{run_selection, HttpProviders, Providers, SessionHandle, SessionMessage};
use geohazard::ui;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match app.state {
        AppState::Map => ui::render_world_map(frame, app),
        AppState::Details => ui::render_details(frame, app),
    }
    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Fetches every section for one point and prints it
async fn run_report(at: Coordinate, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let providers = HttpProviders::from_settings(settings, false);
    let query = SeismicQuery::around(at, settings.details_radius_km)
        .with_min_magnitude(settings.details_min_magnitude);

    // Room for all four section updates, so the sender never waits
    let (tx, mut rx) = mpsc::channel(8);
    run_selection(&providers, 1, at, query, &tx).await;
    drop(tx);

    let mut report = LocationReport::loading(at, settings.details_radius_km);
    while !report.is_complete() {
        match rx.recv().await {
            Some(SessionMessage::Section { update, .. }) => report.apply(update),
            Some(_) => {}
            None => break,
        }
    }

    print!("{}", render_plain(&report));
    Ok(())
}

async fn run_tui(startup: StartupConfig, settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let providers: Arc<dyn Providers> =
        Arc::new(HttpProviders::from_settings(&settings, startup.locate));
    let mut session = SessionHandle::new(providers, settings.clone());
    let mut app = App::with_startup_config(startup, &settings);

    // A declined lookup still reports back, so the map shows why it is not centered
    session.start_overview();

    // Main event loop
    loop {
        if let Some((selection, at)) = app.take_pending_selection() {
            session.start_selection(selection, at);
        }
        while let Some(message) = session.try_recv() {
            app.apply_message(message, Instant::now());
        }
        app.tick(Instant::now());

        terminal.draw(|f| render_ui(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    info!("exiting");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let startup = match StartupConfig::from_cli(&cli) {
        Ok(startup) => startup,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };
    let settings = match config::load(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    // clap ties --report to --lat/--lng, so a report always has a point
    if let Some(at) = startup.initial_selection.filter(|_| startup.report) {
        logging::init(LogTarget::Stderr);
        return run_report(at, &settings).await;
    }

    logging::init(LogTarget::File);
    info!(version = env!("CARGO_PKG_VERSION"), "starting");
    run_tui(startup, settings).await
}
