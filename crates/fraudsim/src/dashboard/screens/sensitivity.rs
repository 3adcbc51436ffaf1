use crossterm::event::KeyEvent;
use fraudsim_core::Tornado;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::Screen;
use super::results::render_no_results;
use crate::dashboard::components::{Component, EventResult};
use crate::dashboard::state::AppState;
use crate::util::format::{format_currency_delta, format_currency_short, format_percentage};

/// Width reserved for the driver name column
const LABEL_WIDTH: usize = 18;
/// Width reserved for the numeric low/high column
const VALUES_WIDTH: usize = 24;

pub struct SensitivityScreen;

impl SensitivityScreen {
    pub fn new() -> Self {
        Self
    }

    fn tornado_lines(tornado: &Tornado, width: usize) -> Vec<Line<'static>> {
        let half = width.saturating_sub(LABEL_WIDTH + VALUES_WIDTH + 1) / 2;
        let max_impact = tornado
            .bars
            .iter()
            .map(|b| b.impact())
            .fold(0.0_f64, f64::max);
        let scale = |v: f64| -> usize {
            if max_impact > 0.0 {
                (((v.abs() / max_impact) * half as f64).round() as usize).min(half)
            } else {
                0
            }
        };

        let mut lines = vec![
            Line::from(Span::styled(
                format!(
                    "Δ {} vs baseline {} for ±{} moves",
                    tornado.metric.label(),
                    format_currency_short(tornado.base),
                    format_percentage(tornado.perturbation)
                ),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        for bar in &tornado.bars {
            let left = scale(bar.low.min(bar.high).min(0.0));
            let right = scale(bar.low.max(bar.high).max(0.0));
            lines.push(Line::from(vec![
                Span::raw(format!("{:<LABEL_WIDTH$}", bar.driver.key())),
                Span::raw(" ".repeat(half - left)),
                Span::styled("█".repeat(left), Style::default().fg(Color::Green)),
                Span::styled("│", Style::default().fg(Color::DarkGray)),
                Span::styled("█".repeat(right), Style::default().fg(Color::Red)),
                Span::raw(" ".repeat(half - right)),
                Span::styled(
                    format!(
                        " {} / {}",
                        format_currency_delta(bar.low),
                        format_currency_delta(bar.high)
                    ),
                    Style::default().fg(Color::Cyan),
                ),
            ]));
            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled(
            "Green: lower than baseline | Red: higher | values are low / high moves",
            Style::default().fg(Color::DarkGray),
        )));
        lines
    }
}

impl Screen for SensitivityScreen {
    fn title(&self) -> &str {
        "Sensitivity"
    }
}

impl Component for SensitivityScreen {
    fn handle_key(&mut self, _key: KeyEvent, _state: &mut AppState) -> EventResult {
        EventResult::NotHandled
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let Some(artifacts) = &state.results else {
            render_no_results(frame, area, self.title());
            return;
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.title()));
        let width = block.inner(area).width as usize;
        let paragraph = Paragraph::new(Self::tornado_lines(&artifacts.tornado, width)).block(block);
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudsim_core::{Driver, TornadoBar, TornadoMetric};

    #[test]
    fn test_bars_fit_width() {
        let tornado = Tornado {
            metric: TornadoMetric::MeanLoss,
            perturbation: 0.2,
            base: 500.0,
            bars: vec![TornadoBar {
                driver: Driver::SevSigma,
                low: -100.0,
                high: 300.0,
            }],
        };
        let lines = SensitivityScreen::tornado_lines(&tornado, 82);
        let bar_line = &lines[2];
        let text: String = bar_line.spans.iter().map(|s| s.content.as_ref()).collect();

        // half = (82 - 18 - 24 - 1) / 2 = 19
        assert_eq!(text.matches('█').count(), 19 + 6);
        assert!(text.contains("-$100 / +$300"));
    }
}
