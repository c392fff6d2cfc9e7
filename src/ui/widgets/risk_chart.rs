//! Bar chart of the four risk levels

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Widget},
};

use crate::risk::{Hazard, RiskAssessment, RiskLevel};

/// Text color for a risk level, green through red
pub fn risk_color(level: RiskLevel) -> Color {
    match level.value() {
        1 => Color::Green,
        2 => Color::LightGreen,
        3 => Color::Yellow,
        4 => Color::LightRed,
        _ => Color::Red,
    }
}

/// Bar color per hazard
fn hazard_color(hazard: Hazard) -> Color {
    match hazard {
        Hazard::Flood => Color::Rgb(54, 162, 235),
        Hazard::HeavyRain => Color::Rgb(75, 192, 192),
        Hazard::Landslide => Color::Rgb(153, 102, 255),
        Hazard::Tsunami => Color::Rgb(255, 99, 132),
    }
}

/// Vertical bars for flood, heavy rain, landslide and tsunami
///
/// The axis runs from the assessment's chart floor to 5, so a bar at the
/// floor is empty unless every level is at the minimum.
pub struct RiskChart<'a> {
    assessment: &'a RiskAssessment,
    block: Option<Block<'a>>,
}

impl<'a> RiskChart<'a> {
    pub fn new(assessment: &'a RiskAssessment) -> Self {
        Self {
            assessment,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Bar heights relative to the chart floor
    fn bar_values(&self) -> Vec<(Hazard, RiskLevel, u64)> {
        let floor = self.assessment.chart_floor();
        self.assessment
            .levels()
            .into_iter()
            .map(|(hazard, level)| (hazard, level, u64::from(level.value() - floor)))
            .collect()
    }
}

impl<'a> Widget for RiskChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let floor = self.assessment.chart_floor();
        let bars: Vec<Bar> = self
            .bar_values()
            .into_iter()
            .map(|(hazard, level, value)| {
                Bar::default()
                    .value(value)
                    .text_value(format!("{}/5", level.value()))
                    .label(Line::from(hazard.label()))
                    .style(Style::default().fg(hazard_color(hazard)))
                    .value_style(
                        Style::default()
                            .fg(Color::Black)
                            .bg(hazard_color(hazard))
                            .add_modifier(Modifier::BOLD),
                    )
            })
            .collect();

        // Fit four bars with single gaps
        let inner_width = self
            .block
            .as_ref()
            .map(|b| b.inner(area).width)
            .unwrap_or(area.width);
        let bar_width = (inner_width.saturating_sub(3) / 4).clamp(3, 12);

        let mut chart = BarChart::default()
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width)
            .bar_gap(1)
            .max(u64::from(RiskLevel::MAX - floor));
        if let Some(block) = self.block {
            chart = chart.block(block);
        }
        chart.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::{assess, RiskInputs};

    fn assessment(rainfall_mm: f64, elevation_m: f64) -> RiskAssessment {
        assess(&RiskInputs {
            rainfall_mm,
            elevation_m,
            is_coastal: false,
        })
    }

    #[test]
    fn test_bar_values_relative_to_floor() {
        let risk = assessment(100.0, 5.0);
        let values: Vec<u64> = RiskChart::new(&risk)
            .bar_values()
            .into_iter()
            .map(|(_, _, v)| v)
            .collect();
        // flood 5, rain 5, landslide 1, tsunami 1 over a floor of 1
        assert_eq!(values, vec![4, 4, 0, 0]);
    }

    #[test]
    fn test_all_minimum_bars_stay_visible() {
        let risk = assessment(0.0, 50.0);
        assert!(RiskChart::new(&risk)
            .bar_values()
            .iter()
            .all(|(_, _, v)| *v == 1));
    }

    #[test]
    fn test_renders_labels() {
        let risk = assessment(10.0, 5.0);
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        RiskChart::new(&risk).render(area, &mut buf);

        let content: String = buf.content().iter().map(|cell| cell.symbol()).collect();
        assert!(content.contains("Flood"));
        assert!(content.contains("Tsunami"));
    }

    #[test]
    fn test_risk_color_scale() {
        assert_eq!(risk_color(RiskLevel::new(1)), Color::Green);
        assert_eq!(risk_color(RiskLevel::new(3)), Color::Yellow);
        assert_eq!(risk_color(RiskLevel::new(5)), Color::Red);
    }

    #[test]
    fn test_zero_area_is_noop() {
        let risk = assessment(0.0, 0.0);
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 10));
        RiskChart::new(&risk).render(Rect::new(0, 0, 0, 0), &mut buf);
    }
}
