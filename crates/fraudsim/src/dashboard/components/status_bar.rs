use super::{Component, EventResult};
use crate::dashboard::state::{AppState, SimulationStatus, TabId};
use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Width of the text progress bar
const PROGRESS_WIDTH: usize = 20;

pub struct StatusBar;

impl StatusBar {
    pub fn new() -> Self {
        Self
    }

    fn get_help_text(state: &AppState) -> &'static str {
        match state.active_tab {
            TabId::Inputs => "1-4: tabs | j/k: select | h/l or -/+: adjust | r: run | q: quit",
            TabId::Results | TabId::Sensitivity => "1-4: tabs | r: run | q: quit",
            TabId::Threshold => "1-4: tabs | j/k: select threshold | r: run | q: quit",
        }
    }

    fn progress_line(stage: &str, current: usize, total: usize) -> Line<'static> {
        let fraction = if total > 0 {
            (current as f64 / total as f64).min(1.0)
        } else {
            0.0
        };
        let filled = (fraction * PROGRESS_WIDTH as f64).round() as usize;
        Line::from(vec![
            Span::styled(
                format!("Running {stage} "),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("█".repeat(filled), Style::default().fg(Color::Cyan)),
            Span::styled(
                "░".repeat(PROGRESS_WIDTH - filled),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw(format!(" {current}/{total} paths | c: cancel")),
        ])
    }
}

impl Component for StatusBar {
    fn handle_key(&mut self, _key: KeyEvent, _state: &mut AppState) -> EventResult {
        EventResult::NotHandled
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let content = if let Some(error) = &state.error_message {
            Line::from(vec![
                Span::styled("Error: ", Style::default().fg(Color::Red)),
                Span::raw(error.clone()),
                Span::styled("  (Esc to dismiss)", Style::default().fg(Color::DarkGray)),
            ])
        } else if let SimulationStatus::Running {
            stage,
            current,
            total,
        } = state.simulation_status
        {
            Self::progress_line(stage.label(), current, total)
        } else if state.results_stale {
            Line::from(vec![
                Span::styled("Inputs changed", Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!(" - press r to re-run | {}", Self::get_help_text(state)),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        } else {
            Line::from(Span::styled(
                Self::get_help_text(state),
                Style::default().fg(Color::DarkGray),
            ))
        };

        let paragraph = Paragraph::new(content).block(Block::default().borders(Borders::TOP));

        frame.render_widget(paragraph, area);
    }
}
