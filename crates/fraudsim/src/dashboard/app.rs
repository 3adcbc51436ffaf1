use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use fraudsim_core::SimConfig;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use super::components::{Component, EventResult, status_bar::StatusBar, tab_bar::TabBar};
use super::screens::{
    inputs::InputsScreen, results::ResultsScreen, sensitivity::SensitivityScreen,
    threshold::ThresholdScreen,
};
use super::state::{AppState, SimulationStatus, TabId};
use super::worker::{SimulationRequest, SimulationResponse, SimulationWorker};
use crate::pipeline::{Stage, total_paths};

/// Redraw interval while waiting for input, so worker progress stays visible
const TICK: Duration = Duration::from_millis(100);

pub struct App {
    state: AppState,
    worker: SimulationWorker,
    tab_bar: TabBar,
    status_bar: StatusBar,
    inputs_screen: InputsScreen,
    results_screen: ResultsScreen,
    sensitivity_screen: SensitivityScreen,
    threshold_screen: ThresholdScreen,
}

impl App {
    pub fn new(config: SimConfig) -> Self {
        Self {
            state: AppState::new(config),
            worker: SimulationWorker::new(),
            tab_bar: TabBar::new(),
            status_bar: StatusBar::new(),
            inputs_screen: InputsScreen::new(),
            results_screen: ResultsScreen::new(),
            sensitivity_screen: SensitivityScreen::new(),
            threshold_screen: ThresholdScreen::new(),
        }
    }

    /// runs the application's main loop until the user quits
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        while !self.state.exit {
            self.process_worker_responses();
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }

        if self.state.is_running() {
            self.worker.cancel();
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        // Create main layout: tab bar, content, status bar
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Tab bar
                Constraint::Min(0),    // Content
                Constraint::Length(2), // Status bar
            ])
            .split(frame.area());

        self.tab_bar.render(frame, chunks[0], &self.state);
        self.render_active_screen(frame, chunks[1]);
        self.status_bar.render(frame, chunks[2], &self.state);
    }

    fn render_active_screen(&mut self, frame: &mut Frame, area: Rect) {
        match self.state.active_tab {
            TabId::Inputs => self.inputs_screen.render(frame, area, &self.state),
            TabId::Results => self.results_screen.render(frame, area, &self.state),
            TabId::Sensitivity => self.sensitivity_screen.render(frame, area, &self.state),
            TabId::Threshold => self.threshold_screen.render(frame, area, &self.state),
        }
    }

    fn handle_events(&mut self) -> io::Result<()> {
        if !event::poll(TICK)? {
            return Ok(());
        }
        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.handle_key_event(key_event)
            }
            _ => {}
        };
        Ok(())
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        // Global key bindings
        match key_event.code {
            KeyCode::Char('q') if key_event.modifiers.is_empty() => {
                self.state.exit = true;
                return;
            }
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.exit = true;
                return;
            }
            KeyCode::Char('c') => {
                self.cancel_simulation();
                return;
            }
            KeyCode::Char('r') => {
                self.start_simulation();
                return;
            }
            KeyCode::Esc => {
                self.state.clear_error();
                return;
            }
            _ => {}
        }

        // Try tab bar first
        let result = self.tab_bar.handle_key(key_event, &mut self.state);
        if result != EventResult::NotHandled {
            return;
        }

        // Then try active screen
        let result = match self.state.active_tab {
            TabId::Inputs => self.inputs_screen.handle_key(key_event, &mut self.state),
            TabId::Results => self.results_screen.handle_key(key_event, &mut self.state),
            TabId::Sensitivity => self
                .sensitivity_screen
                .handle_key(key_event, &mut self.state),
            TabId::Threshold => self.threshold_screen.handle_key(key_event, &mut self.state),
        };

        if result == EventResult::Exit {
            self.state.exit = true
        }
    }

    fn start_simulation(&mut self) {
        if self.state.is_running() {
            return;
        }
        let config = self.state.inputs.to_config();
        if let Err(e) = config.validate() {
            self.state.set_error(e.to_string());
            return;
        }

        self.state.clear_error();
        let total = total_paths(&config, 0);
        if self.worker.send(SimulationRequest::Analysis { config }) {
            self.state.simulation_status = SimulationStatus::Running {
                stage: Stage::Baseline,
                current: 0,
                total,
            };
        } else {
            self.state
                .set_error("Simulation worker is not running".to_string());
        }
    }

    fn cancel_simulation(&mut self) {
        if self.state.is_running() {
            tracing::info!("Cancelling dashboard analysis");
            self.worker.cancel();
        }
    }

    /// Process worker responses.
    fn process_worker_responses(&mut self) {
        while let Some(response) = self.worker.try_recv() {
            match response {
                SimulationResponse::Stage(stage) => {
                    if let SimulationStatus::Running { stage: current, .. } =
                        &mut self.state.simulation_status
                    {
                        *current = stage;
                    }
                }
                SimulationResponse::Complete(artifacts) => {
                    self.state.set_results(*artifacts);
                    if self.state.active_tab == TabId::Inputs {
                        self.state.switch_tab(TabId::Results);
                    }
                }
                SimulationResponse::Cancelled => {
                    self.state.simulation_status = SimulationStatus::Idle;
                }
                SimulationResponse::Error(msg) => {
                    self.state.simulation_status = SimulationStatus::Idle;
                    self.state.set_error(msg);
                }
            }
        }

        let progress = self.worker.get_progress();
        if let SimulationStatus::Running { current, .. } = &mut self.state.simulation_status {
            *current = progress;
        }
    }
}
