use crossterm::event::KeyEvent;
use fraudsim_core::Histogram;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::Screen;
use crate::dashboard::components::{Component, EventResult};
use crate::dashboard::state::AppState;
use crate::pipeline::RunArtifacts;
use crate::report::charts::bar_rows;
use crate::util::format::{format_compact_currency, format_number, format_percentage, title_case};

pub struct ResultsScreen;

impl ResultsScreen {
    pub fn new() -> Self {
        Self
    }

    fn render_kpis(&self, frame: &mut Frame, area: Rect, artifacts: &RunArtifacts) {
        let mut lines = vec![
            Line::from(vec![
                Span::styled(
                    format!("{:<22}", "KPI"),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:>16}{:>16}", "Baseline", "Stress"),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
        ];

        let stress = artifacts.stress_kpis.entries();
        for ((key, base), (_, stressed)) in artifacts.baseline_kpis.entries().into_iter().zip(stress)
        {
            let (base_text, stress_text) = if key == "breach_prob" {
                (format_percentage(base), format_percentage(stressed))
            } else {
                (format_number(base), format_number(stressed))
            };
            let stress_style = if stressed > base {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Green)
            };
            lines.push(Line::from(vec![
                Span::raw(format!("{:<22}", title_case(key))),
                Span::styled(format!("{base_text:>16}"), Style::default().fg(Color::Cyan)),
                Span::styled(format!("{stress_text:>16}"), stress_style),
            ]));
        }

        let result = &artifacts.baseline_result;
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "  Frauds {:.1} | undetected {:.1} | false positives {:.1} (mean per path)",
                result.n_fraud_mean, result.n_undetected_mean, result.n_false_positive_mean
            ),
            Style::default().fg(Color::DarkGray),
        )));

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", self.title())),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_histogram(&self, frame: &mut Frame, area: Rect, artifacts: &RunArtifacts) {
        let budget = artifacts.baseline.horizon_budget();
        let block = Block::default().borders(Borders::ALL).title(format!(
            " LOSS DISTRIBUTION ({} paths, budget {}) ",
            artifacts.baseline_result.n_paths(),
            format_compact_currency(budget)
        ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let num_bins = (inner.width as usize).saturating_sub(2).max(10);
        let height = inner.height.saturating_sub(1) as usize;
        if height < 3 || inner.width < 20 {
            let msg = Paragraph::new("Area too small").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(msg, inner);
            return;
        }

        let hist = Histogram::from_values(&artifacts.baseline_result.losses, num_bins);
        // Bins past the loss budget are breaches
        let colors: Vec<Color> = (0..hist.counts.len())
            .map(|i| {
                if hist.bin_start(i) + hist.bin_width() > budget {
                    Color::Red
                } else {
                    Color::Cyan
                }
            })
            .collect();

        let mut lines: Vec<Line> = bar_rows(&hist.counts, height)
            .into_iter()
            .map(|glyphs| {
                let mut spans = vec![Span::raw(" ")];
                spans.extend(
                    glyphs
                        .into_iter()
                        .zip(&colors)
                        .map(|(ch, &color)| Span::styled(ch, Style::default().fg(color))),
                );
                Line::from(spans)
            })
            .collect();

        let lo = format_compact_currency(hist.min);
        let hi = format_compact_currency(hist.max);
        let gap = num_bins.saturating_sub(lo.len() + hi.len());
        lines.push(Line::from(Span::styled(
            format!(" {lo}{}{hi}", " ".repeat(gap)),
            Style::default().fg(Color::DarkGray),
        )));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Screen for ResultsScreen {
    fn title(&self) -> &str {
        "Results"
    }
}

impl Component for ResultsScreen {
    fn handle_key(&mut self, _key: KeyEvent, _state: &mut AppState) -> EventResult {
        EventResult::NotHandled
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let Some(artifacts) = &state.results else {
            render_no_results(frame, area, self.title());
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(13), Constraint::Min(6)])
            .split(area);

        self.render_kpis(frame, chunks[0], artifacts);
        self.render_histogram(frame, chunks[1], artifacts);
    }
}

/// Placeholder shown before the first run
pub fn render_no_results(frame: &mut Frame, area: Rect, title: &str) {
    let content = vec![
        Line::from(""),
        Line::from("No simulation results available."),
        Line::from(""),
        Line::from("Press r to run the analysis with the current inputs."),
    ];
    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} ")),
    );
    frame.render_widget(paragraph, area);
}
