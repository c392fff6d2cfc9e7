//! Location details screen UI
//!
//! Renders the selected point's weather forecast, elevation, disaster risk
//! summary and recent earthquakes. Each section shows its own loading or
//! failure message until its data arrives.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::help_overlay::centered_rect;
use super::widgets::{risk_color, RiskChart};
use crate::app::App;
use crate::data::{SeismicEvent, Severity, WeatherSnapshot};
use crate::report::{
    day_heading, day_lines, quake_detail_lines, quake_heading, quake_lines, risk_line,
    LocationReport, Section,
};
use crate::risk::{Hazard, RiskAssessment};

/// Color scheme for the details screen
mod colors {
    use ratatui::style::Color;

    pub const HEADER: Color = Color::Cyan;
    pub const PRIMARY: Color = Color::White;
    pub const SECONDARY: Color = Color::Gray;
    pub const LOADING: Color = Color::DarkGray;
    pub const FAILED: Color = Color::Red;
    pub const HIGHLIGHT: Color = Color::Yellow;
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Severe => Color::Red,
        Severity::Moderate => Color::Rgb(255, 165, 0),
        Severity::Minor => Color::Green,
    }
}

/// Renders the details screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let Some(report) = &app.report else {
        frame.render_widget(
            Paragraph::new("No location selected. Press Esc to return to the map.")
                .style(Style::default().fg(colors::SECONDARY)),
            area,
        );
        return;
    };

    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER))
        .title(Span::styled(
            format!(" {} ", report.title()),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = main_block.inner(area);
    frame.render_widget(main_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),  // coordinates + elevation
            Constraint::Length(9),  // weather
            Constraint::Length(10), // risk
            Constraint::Min(4),     // earthquakes
            Constraint::Length(1),  // help
        ])
        .split(inner);

    let header = vec![
        Line::from(Span::styled(
            report.coordinates_line(),
            Style::default().fg(colors::SECONDARY),
        )),
        Line::from(elevation_span(report)),
    ];
    frame.render_widget(Paragraph::new(header), chunks[0]);

    render_weather(frame, chunks[1], &report.weather);
    render_risk(frame, chunks[2], &report.risk);
    render_earthquakes(frame, chunks[3], report, app.quake_cursor);

    let help = Paragraph::new(Line::from(Span::styled(
        "[j/k] earthquakes  [Enter] details  [r] reload  [Esc] map  [?] help  [q] quit",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(help, chunks[4]);

    if app.quake_popup {
        if let Some(quake) = app.highlighted_quake() {
            render_quake_popup(frame, area, quake);
        }
    }
}

fn elevation_span(report: &LocationReport) -> Span<'static> {
    let style = match &report.elevation {
        Section::Loading => Style::default().fg(colors::LOADING),
        Section::Ready(_) => Style::default().fg(colors::PRIMARY),
        Section::Failed(_) => Style::default().fg(colors::FAILED),
    };
    Span::styled(report.elevation_line(), style)
}

fn section_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(colors::HEADER))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(colors::HEADER)
                .add_modifier(Modifier::BOLD),
        ))
}

fn status_message(text: &str, color: Color) -> Paragraph<'static> {
    Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
}

fn render_weather(frame: &mut Frame, area: Rect, weather: &Section<WeatherSnapshot>) {
    let block = section_block("WEATHER FORECAST");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let snapshot = match weather {
        Section::Loading => {
            frame.render_widget(status_message("Loading weather data...", colors::LOADING), inner);
            return;
        }
        Section::Failed(message) => {
            frame.render_widget(status_message(message, colors::FAILED), inner);
            return;
        }
        Section::Ready(snapshot) => snapshot,
    };

    if snapshot.days.is_empty() {
        frame.render_widget(
            status_message("No forecast days returned.", colors::SECONDARY),
            inner,
        );
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Ratio(1, snapshot.days.len() as u32);
            snapshot.days.len()
        ])
        .split(inner);

    for (day, column) in snapshot.days.iter().zip(columns.iter()) {
        let mut lines = vec![
            Line::from(Span::styled(
                day_heading(day),
                Style::default()
                    .fg(colors::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                day.condition.clone(),
                Style::default().fg(colors::HIGHLIGHT),
            )),
        ];
        lines.extend(day_lines(day).into_iter().map(Line::from));
        frame.render_widget(Paragraph::new(lines), *column);
    }
}

fn render_risk(frame: &mut Frame, area: Rect, risk: &Section<RiskAssessment>) {
    let block = section_block("DISASTER RISK ASSESSMENT");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let assessment = match risk {
        Section::Ready(assessment) => assessment,
        Section::Loading => {
            frame.render_widget(status_message("Calculating risk...", colors::LOADING), inner);
            return;
        }
        Section::Failed(message) => {
            frame.render_widget(status_message(message, colors::FAILED), inner);
            return;
        }
    };

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(inner);

    let mut lines: Vec<Line> = Hazard::all()
        .iter()
        .map(|hazard| {
            Line::from(Span::styled(
                risk_line(*hazard, assessment),
                Style::default().fg(risk_color(assessment.level(*hazard))),
            ))
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Rough indicators from rainfall, elevation and a coarse coastal check.",
        Style::default().fg(colors::LOADING),
    )));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), halves[0]);

    frame.render_widget(RiskChart::new(assessment), halves[1]);
}

fn render_earthquakes(frame: &mut Frame, area: Rect, report: &LocationReport, cursor: usize) {
    let block = section_block("RECENT EARTHQUAKES (30 DAYS)");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let events = match &report.earthquakes {
        Section::Loading => {
            frame.render_widget(
                status_message("Loading earthquake data...", colors::LOADING),
                inner,
            );
            return;
        }
        Section::Failed(message) => {
            frame.render_widget(status_message(message, colors::FAILED), inner);
            return;
        }
        Section::Ready(events) => events,
    };

    if events.is_empty() {
        let lines = vec![
            Line::from(report.empty_earthquakes_message()),
            Line::from(Span::styled(
                "This is good news!",
                Style::default().fg(Color::Green),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
        return;
    }

    let items: Vec<ListItem> = events.iter().map(quake_item).collect();
    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(cursor.min(events.len() - 1)));
    frame.render_stateful_widget(list, inner, &mut state);
}

fn quake_item(event: &SeismicEvent) -> ListItem<'static> {
    let severity = event.severity();
    let mut lines = vec![Line::from(vec![
        Span::styled(
            quake_heading(event),
            Style::default()
                .fg(severity_color(severity))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", severity.class()),
            Style::default().fg(colors::SECONDARY),
        ),
    ])];
    lines.extend(
        quake_lines(event)
            .into_iter()
            .map(|line| Line::from(format!("  {}", line))),
    );
    ListItem::new(lines)
}

fn render_quake_popup(frame: &mut Frame, area: Rect, event: &SeismicEvent) {
    let mut lines: Vec<Line> = quake_detail_lines(event)
        .into_iter()
        .map(Line::from)
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Esc or Enter to close",
        Style::default().fg(Color::DarkGray),
    )));

    let popup = centered_rect(60, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .title(" Earthquake Details ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(severity_color(event.severity()))),
        ),
        popup,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::data::{Coordinate, FetchError};
    use crate::risk::{assess, RiskInputs};
    use crate::session::tests::{quake, snapshot};
    use crate::session::{SectionUpdate, SessionMessage};
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Instant;

    fn selected_app() -> App {
        let mut app = App::new(&Settings::default());
        app.select(Coordinate::new(35.3, 139.5).unwrap());
        app
    }

    fn deliver(app: &mut App, update: SectionUpdate) {
        let selection = app.current_selection();
        app.apply_message(SessionMessage::Section { selection, update }, Instant::now());
    }

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(120, 48);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_loading_sections() {
        let app = selected_app();
        let content = draw(&app);
        assert!(content.contains("Location Details"));
        assert!(content.contains("Coordinates: 35.300000, 139.500000"));
        assert!(content.contains("Loading weather data..."));
        assert!(content.contains("Calculating risk..."));
        assert!(content.contains("Loading earthquake data..."));
    }

    #[test]
    fn test_ready_sections() {
        let mut app = selected_app();
        deliver(&mut app, SectionUpdate::Weather(Ok(snapshot(18.4))));
        deliver(&mut app, SectionUpdate::Elevation(Ok(12.0)));
        deliver(
            &mut app,
            SectionUpdate::Risk(assess(&RiskInputs {
                rainfall_mm: 18.4,
                elevation_m: 12.0,
                is_coastal: true,
            })),
        );
        deliver(
            &mut app,
            SectionUpdate::Earthquakes(Ok(vec![quake(6.1, 1_720_900_000_000)])),
        );

        let content = draw(&app);
        assert!(content.contains("Kamakura, Japan"));
        assert!(content.contains("Elevation: 12 meters"));
        assert!(content.contains("Temp: 25.8°C (78.4°F)"));
        assert!(content.contains("Flood Risk: Very High (5/5)"));
        assert!(content.contains("Magnitude 6.1"));
        assert!(content.contains("severe"));
    }

    #[test]
    fn test_failed_sections_render_inline() {
        let mut app = selected_app();
        deliver(
            &mut app,
            SectionUpdate::Weather(Err(FetchError::Unavailable(
                "no weather API key configured".to_string(),
            ))),
        );
        deliver(
            &mut app,
            SectionUpdate::Elevation(Err(FetchError::Unavailable("x".to_string()))),
        );
        deliver(
            &mut app,
            SectionUpdate::Earthquakes(Err(FetchError::Unavailable("timeout".to_string()))),
        );

        let content = draw(&app);
        assert!(content.contains("Failed to load weather data. no weather API key configured"));
        assert!(content.contains("Elevation: Data unavailable"));
        assert!(content.contains("Failed to load earthquake data. timeout"));
    }

    #[test]
    fn test_empty_earthquakes_message() {
        let mut app = selected_app();
        deliver(&mut app, SectionUpdate::Earthquakes(Ok(Vec::new())));
        let content = draw(&app);
        assert!(content.contains("No recent earthquakes found within 100 km."));
    }

    #[test]
    fn test_quake_popup() {
        let mut app = selected_app();
        deliver(
            &mut app,
            SectionUpdate::Earthquakes(Ok(vec![quake(4.6, 1_720_000_000_000)])),
        );
        app.quake_popup = true;

        let content = draw(&app);
        assert!(content.contains("Earthquake Details"));
        assert!(content.contains("Felt Reports: None"));
        assert!(content.contains("Significance: 100"));
    }

    #[test]
    fn test_no_report_placeholder() {
        let app = App::new(&Settings::default());
        let content = draw(&app);
        assert!(content.contains("No location selected"));
    }
}
