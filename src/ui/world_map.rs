//! World map screen UI
//!
//! Draws the world outline with a crosshair, the user's location, the last
//! selected point and significant earthquakes near the user. A status bar
//! shows the crosshair position and the active step.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution},
        Block, Borders, Clear, Paragraph, Wrap,
    },
    Frame,
};

use super::help_overlay::centered_rect;
use crate::app::{App, MessageKind};
use crate::data::MarkerColor;
use crate::report::{quake_heading, quake_lines};

mod colors {
    use ratatui::style::Color;

    pub const COASTLINE: Color = Color::DarkGray;
    pub const CROSSHAIR: Color = Color::White;
    pub const USER: Color = Color::Blue;
    pub const SELECTED: Color = Color::Magenta;
    pub const HEADER: Color = Color::Cyan;
    pub const SECONDARY: Color = Color::Gray;
}

fn marker_color(color: MarkerColor) -> Color {
    match color {
        MarkerColor::Red => Color::Red,
        MarkerColor::Orange => Color::Rgb(255, 165, 0),
        MarkerColor::Yellow => Color::Yellow,
        MarkerColor::Green => Color::Green,
    }
}

/// Renders the map screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(2)])
        .split(area);

    render_map(frame, chunks[0], app);
    render_status(frame, chunks[1], app);

    if let Some(quake) = app.map.focused() {
        let mut lines = vec![Line::from(Span::styled(
            quake_heading(quake),
            Style::default()
                .fg(marker_color(quake.marker_color()))
                .add_modifier(Modifier::BOLD),
        ))];
        lines.extend(quake_lines(quake).into_iter().map(Line::from));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter: View details for this location",
            Style::default().fg(colors::SECONDARY),
        )));
        render_popup(frame, chunks[0], " Earthquake ", lines);
    }

    if let Some(message) = &app.info {
        render_info_message(frame, chunks[0], &message.text, message.kind);
    }
}

fn render_map(frame: &mut Frame, area: Rect, app: &App) {
    let (x_bounds, y_bounds) = app.map.bounds();
    let cursor = app.map.cursor;

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors::HEADER))
                .title(Span::styled(
                    " geohazard ",
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )),
        )
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            ctx.draw(&Map {
                color: colors::COASTLINE,
                resolution: MapResolution::High,
            });
            ctx.layer();

            for quake in &app.map.quakes {
                ctx.print(
                    quake.longitude,
                    quake.latitude,
                    Span::styled("●", Style::default().fg(marker_color(quake.marker_color()))),
                );
            }
            if let Some(home) = app.map.user_location {
                ctx.print(
                    home.longitude(),
                    home.latitude(),
                    Span::styled("◆", Style::default().fg(colors::USER)),
                );
            }
            if let Some(selected) = app.map.selected {
                ctx.print(
                    selected.longitude(),
                    selected.latitude(),
                    Span::styled("✕", Style::default().fg(colors::SELECTED)),
                );
            }
            ctx.print(
                cursor.longitude(),
                cursor.latitude(),
                Span::styled(
                    "+",
                    Style::default()
                        .fg(colors::CROSSHAIR)
                        .add_modifier(Modifier::BOLD),
                ),
            );
        });

    frame.render_widget(canvas, area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let cursor = app.map.cursor;
    let position = Line::from(vec![
        Span::styled("Lat ", Style::default().fg(colors::SECONDARY)),
        Span::raw(format!("{:.6}", cursor.latitude())),
        Span::styled("  Lng ", Style::default().fg(colors::SECONDARY)),
        Span::raw(format!("{:.6}", cursor.longitude())),
        Span::styled("  Step ", Style::default().fg(colors::SECONDARY)),
        Span::raw(format!("{}°", app.map.step())),
        Span::styled("  Zoom ", Style::default().fg(colors::SECONDARY)),
        Span::raw(format!("{}", app.map.zoom_level())),
    ]);
    let hints = Line::from(Span::styled(
        "[hjkl] move  [+/-] step  [[/]] zoom  [Enter] details  [n] quakes  [c] me  [?] help  [q] quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(vec![position, hints]), area);
}

fn render_popup(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let height = lines.len() as u16 + 2;
    let popup = centered_rect(56, height, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors::HEADER)),
        ),
        popup,
    );
}

/// Draws the transient message along the top of the map
fn render_info_message(frame: &mut Frame, area: Rect, text: &str, kind: MessageKind) {
    let color = match kind {
        MessageKind::Info => Color::Cyan,
        MessageKind::Error => Color::Red,
    };
    let width = area.width.saturating_sub(4);
    let message_area = Rect {
        x: area.x + 2,
        y: area.y + 1,
        width,
        height: 3.min(area.height.saturating_sub(1)),
    };

    frame.render_widget(Clear, message_area);
    frame.render_widget(
        Paragraph::new(text.to_string())
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            ),
        message_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::data::Coordinate;
    use crate::session::tests::quake;
    use crate::session::SessionMessage;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Instant;

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_shows_cursor_position() {
        let app = App::new(&Settings::default());
        let content = draw(&app);
        assert!(content.contains("geohazard"));
        assert!(content.contains("20.000000"));
        assert!(content.contains("Step"));
    }

    #[test]
    fn test_render_info_message() {
        let mut app = App::new(&Settings::default());
        app.apply_message(
            SessionMessage::Located(Ok(Coordinate::new(49.28, -123.12).unwrap())),
            Instant::now(),
        );
        let content = draw(&app);
        assert!(content.contains("Map centered on your current location."));
    }

    #[test]
    fn test_render_focused_quake_popup() {
        let mut app = App::new(&Settings::default());
        app.map.quakes = vec![quake(6.2, 1_720_000_000_000)];
        app.map.focus_next_quake();

        let content = draw(&app);
        assert!(content.contains("Magnitude 6.2"));
        assert!(content.contains("View details for this location"));
    }

    #[test]
    fn test_render_tiny_terminal_does_not_panic() {
        let app = App::new(&Settings::default());
        let backend = TestBackend::new(10, 4);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();
    }
}
