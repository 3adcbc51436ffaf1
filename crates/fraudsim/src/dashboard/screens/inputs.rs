use crossterm::event::{KeyCode, KeyEvent};
use fraudsim_core::{ModelQuality, make_baseline};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::Screen;
use crate::dashboard::components::{Component, EventResult};
use crate::dashboard::state::{AppState, InputField};
use crate::util::format::{format_number, format_percentage};

pub struct InputsScreen;

impl InputsScreen {
    pub fn new() -> Self {
        Self
    }

    fn render_fields(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let items: Vec<ListItem> = InputField::ALL
            .iter()
            .map(|field| {
                let active = field.is_active(&state.inputs);
                let value_style = if active {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(Line::from(vec![
                    Span::raw(format!("  {:<22}", field.label())),
                    Span::styled(field.display(&state.inputs), value_style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", self.title())),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut list_state = ListState::default().with_selected(Some(state.selected_input));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    /// Derived scenario figures for the current inputs
    fn render_summary(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let config = state.inputs.to_config();
        let months = f64::from(config.horizon_months);
        let expected_frauds = config.n_transactions as f64 * config.base_fraud_rate * months;

        let mut lines = vec![
            Line::from(Span::styled(
                "SCENARIO",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!(
                "  Expected frauds:    {}",
                format_number(expected_frauds)
            )),
            Line::from(format!(
                "  Mean severity:      {}",
                format_number((config.sev_mu + config.sev_sigma.powi(2) / 2.0).exp())
            )),
            Line::from(format!(
                "  Horizon budget:     {}",
                format_number(config.monthly_loss_budget * months)
            )),
        ];

        // Operating point only matters when the model drives detection
        if let Some(quality) = config.model_quality {
            lines.push(Line::from(""));
            lines.extend(Self::operating_point_lines(&quality));
        }

        match make_baseline(&config) {
            Ok(params) => {
                lines.push(Line::from(""));
                lines.push(Line::from(format!(
                    "  Effective detection: {}",
                    format_percentage(params.detection_rate)
                )));
                lines.push(Line::from(format!(
                    "  Effective FPR:       {}",
                    format_percentage(params.false_positive_rate)
                )));
            }
            Err(e) => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("  {e}"),
                    Style::default().fg(Color::Red),
                )));
            }
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[r] Run analysis",
            Style::default().fg(Color::DarkGray),
        )));

        let paragraph =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Summary "));
        frame.render_widget(paragraph, area);
    }

    fn operating_point_lines(quality: &ModelQuality) -> Vec<Line<'static>> {
        match quality.operating_point() {
            Ok(point) => vec![Line::from(format!(
                "  Model @ t={:.2}: TPR {} / FPR {}",
                point.threshold,
                format_percentage(point.detection_rate),
                format_percentage(point.false_positive_rate)
            ))],
            Err(e) => vec![Line::from(Span::styled(
                format!("  {e}"),
                Style::default().fg(Color::Red),
            ))],
        }
    }
}

impl Screen for InputsScreen {
    fn title(&self) -> &str {
        "Inputs"
    }
}

impl Component for InputsScreen {
    fn handle_key(&mut self, key: KeyEvent, state: &mut AppState) -> EventResult {
        let last = InputField::ALL.len() - 1;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                state.selected_input = (state.selected_input + 1).min(last);
                EventResult::Handled
            }
            KeyCode::Char('k') | KeyCode::Up => {
                state.selected_input = state.selected_input.saturating_sub(1);
                EventResult::Handled
            }
            KeyCode::Char('l') | KeyCode::Char('+') | KeyCode::Right => {
                state.adjust_selected(1);
                EventResult::Handled
            }
            KeyCode::Char('h') | KeyCode::Char('-') | KeyCode::Left => {
                state.adjust_selected(-1);
                EventResult::Handled
            }
            KeyCode::Char(' ') | KeyCode::Enter
                if state.selected_field() == InputField::UseModel =>
            {
                state.adjust_selected(1);
                EventResult::Handled
            }
            _ => EventResult::NotHandled,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        self.render_fields(frame, chunks[0], state);
        self.render_summary(frame, chunks[1], state);
    }
}
