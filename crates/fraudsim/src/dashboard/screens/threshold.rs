use crossterm::event::{KeyCode, KeyEvent};
use fraudsim_core::ThresholdCurve;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
};

use super::Screen;
use super::results::render_no_results;
use crate::dashboard::components::{Component, EventResult};
use crate::dashboard::state::AppState;
use crate::util::format::{format_currency_delta, format_number, format_percentage};

pub struct ThresholdScreen;

impl ThresholdScreen {
    pub fn new() -> Self {
        Self
    }

    fn render_table(&self, frame: &mut Frame, area: Rect, curve: &ThresholdCurve, selected: usize) {
        let optimal = curve.optimal().map(|p| p.threshold);

        let header = Row::new([
            "Threshold",
            "Detection",
            "FPR",
            "Exp. Loss",
            "Net Impact",
            "VaR 95",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = curve
            .points
            .iter()
            .map(|p| {
                let is_optimal = Some(p.threshold) == optimal;
                let marker = if is_optimal { " *" } else { "" };
                let row = Row::new([
                    format!("{:.2}{marker}", p.threshold),
                    format_percentage(p.detection_rate),
                    format_percentage(p.false_positive_rate),
                    format_number(p.expected_loss),
                    format_number(p.expected_net_impact),
                    format_number(p.var_95),
                ]);
                if is_optimal {
                    row.style(Style::default().fg(Color::Green))
                } else {
                    row
                }
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Length(14),
                Constraint::Length(14),
                Constraint::Length(14),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} (AUC {:.3}) ", self.title(), curve.auc)),
        )
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

        let mut table_state = TableState::default().with_selected(Some(selected));
        frame.render_stateful_widget(table, area, &mut table_state);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, curve: &ThresholdCurve, selected: usize) {
        let (Some(point), Some(best)) = (curve.points.get(selected), curve.optimal()) else {
            return;
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("Optimal threshold ", Style::default().fg(Color::Green)),
                Span::raw(format!(
                    "{:.2}: net impact {}",
                    best.threshold,
                    format_number(best.expected_net_impact)
                )),
            ]),
            Line::from(format!(
                "Selected {:.2}: {} vs optimal | detection {} | FPR {}",
                point.threshold,
                format_currency_delta(point.expected_net_impact - best.expected_net_impact),
                format_percentage(point.detection_rate),
                format_percentage(point.false_positive_rate),
            )),
        ];
        let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
    }
}

impl Screen for ThresholdScreen {
    fn title(&self) -> &str {
        "Threshold Curve"
    }
}

impl Component for ThresholdScreen {
    fn handle_key(&mut self, key: KeyEvent, state: &mut AppState) -> EventResult {
        let len = state
            .results
            .as_ref()
            .and_then(|r| r.threshold.as_ref())
            .map_or(0, |c| c.points.len());
        if len == 0 {
            return EventResult::NotHandled;
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                state.selected_threshold = (state.selected_threshold + 1).min(len - 1);
                EventResult::Handled
            }
            KeyCode::Char('k') | KeyCode::Up => {
                state.selected_threshold = state.selected_threshold.saturating_sub(1);
                EventResult::Handled
            }
            _ => EventResult::NotHandled,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let Some(artifacts) = &state.results else {
            render_no_results(frame, area, self.title());
            return;
        };

        let Some(curve) = &artifacts.threshold else {
            let content = vec![
                Line::from(""),
                Line::from("The threshold curve needs a model quality."),
                Line::from(""),
                Line::from("Enable \"Use model quality\" on the Inputs tab and re-run."),
            ];
            let paragraph = Paragraph::new(content).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", self.title())),
            );
            frame.render_widget(paragraph, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(4)])
            .split(area);

        let selected = state.selected_threshold.min(curve.points.len().saturating_sub(1));
        self.render_table(frame, chunks[0], curve, selected);
        self.render_detail(frame, chunks[1], curve, selected);
    }
}
