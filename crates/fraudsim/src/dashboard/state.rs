use fraudsim_core::{ModelQuality, SimConfig};

use crate::pipeline::{RunArtifacts, Stage};
use crate::util::format::{format_number, format_percentage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabId {
    #[default]
    Inputs,
    Results,
    Sensitivity,
    Threshold,
}

impl TabId {
    pub const ALL: [TabId; 4] = [
        TabId::Inputs,
        TabId::Results,
        TabId::Sensitivity,
        TabId::Threshold,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TabId::Inputs => "Inputs",
            TabId::Results => "Results",
            TabId::Sensitivity => "Sensitivity",
            TabId::Threshold => "Threshold",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            TabId::Inputs => 0,
            TabId::Results => 1,
            TabId::Sensitivity => 2,
            TabId::Threshold => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        TabId::ALL.get(index).copied()
    }
}

/// Editable knob on the Inputs tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    NTransactions,
    AvgTicket,
    BaseFraudRate,
    DetectionRate,
    FalsePositiveRate,
    SevMu,
    SevSigma,
    MonthlyLossBudget,
    NPaths,
    Seed,
    HorizonMonths,
    UseModel,
    Auc,
    Threshold,
}

impl InputField {
    pub const ALL: [InputField; 14] = [
        InputField::NTransactions,
        InputField::AvgTicket,
        InputField::BaseFraudRate,
        InputField::DetectionRate,
        InputField::FalsePositiveRate,
        InputField::SevMu,
        InputField::SevSigma,
        InputField::MonthlyLossBudget,
        InputField::NPaths,
        InputField::Seed,
        InputField::HorizonMonths,
        InputField::UseModel,
        InputField::Auc,
        InputField::Threshold,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InputField::NTransactions => "Transactions / month",
            InputField::AvgTicket => "Average ticket",
            InputField::BaseFraudRate => "Base fraud rate",
            InputField::DetectionRate => "Detection rate",
            InputField::FalsePositiveRate => "False positive rate",
            InputField::SevMu => "Severity mu (log)",
            InputField::SevSigma => "Severity sigma (log)",
            InputField::MonthlyLossBudget => "Monthly loss budget",
            InputField::NPaths => "Monte Carlo paths",
            InputField::Seed => "Seed",
            InputField::HorizonMonths => "Horizon (months)",
            InputField::UseModel => "Use model quality",
            InputField::Auc => "Model AUC",
            InputField::Threshold => "Model threshold",
        }
    }

    /// Detection and false-positive rates are ignored while the model is enabled
    pub fn is_active(&self, inputs: &Inputs) -> bool {
        match self {
            InputField::DetectionRate | InputField::FalsePositiveRate => !inputs.use_model,
            InputField::Auc | InputField::Threshold => inputs.use_model,
            _ => true,
        }
    }

    pub fn display(&self, inputs: &Inputs) -> String {
        let c = &inputs.config;
        match self {
            InputField::NTransactions => format_number(c.n_transactions as f64)
                .trim_end_matches(".00")
                .to_string(),
            InputField::AvgTicket => format_number(c.avg_ticket),
            InputField::BaseFraudRate => format!("{:.3}%", c.base_fraud_rate * 100.0),
            InputField::DetectionRate => format_percentage(c.detection_rate),
            InputField::FalsePositiveRate => format_percentage(c.false_positive_rate),
            InputField::SevMu => format!("{:.2}", c.sev_mu),
            InputField::SevSigma => format!("{:.2}", c.sev_sigma),
            InputField::MonthlyLossBudget => format_number(c.monthly_loss_budget),
            InputField::NPaths => c.n_paths.to_string(),
            InputField::Seed => c.seed.to_string(),
            InputField::HorizonMonths => c.horizon_months.to_string(),
            InputField::UseModel => (if inputs.use_model { "yes" } else { "no" }).to_string(),
            InputField::Auc => format!("{:.3}", inputs.model.auc),
            InputField::Threshold => format!("{:.2}", inputs.model.threshold),
        }
    }

    /// Move the field by `steps` increments (negative to decrease)
    pub fn adjust(&self, inputs: &mut Inputs, steps: i32) {
        let s = f64::from(steps);
        let c = &mut inputs.config;
        match self {
            InputField::NTransactions => {
                let delta = 100_000 * i64::from(steps);
                c.n_transactions = (c.n_transactions as i64 + delta).max(0) as u64;
            }
            InputField::AvgTicket => c.avg_ticket = (c.avg_ticket + 5.0 * s).max(0.0),
            InputField::BaseFraudRate => {
                c.base_fraud_rate = snap(c.base_fraud_rate + 0.0005 * s, 0.0005).clamp(0.0, 1.0)
            }
            InputField::DetectionRate => {
                c.detection_rate = snap(c.detection_rate + 0.01 * s, 0.01).clamp(0.0, 1.0)
            }
            InputField::FalsePositiveRate => {
                c.false_positive_rate =
                    snap(c.false_positive_rate + 0.001 * s, 0.001).clamp(0.0, 1.0)
            }
            InputField::SevMu => c.sev_mu = snap(c.sev_mu + 0.1 * s, 0.1),
            InputField::SevSigma => c.sev_sigma = snap(c.sev_sigma + 0.05 * s, 0.05).max(0.0),
            InputField::MonthlyLossBudget => {
                c.monthly_loss_budget = (c.monthly_loss_budget + 25_000.0 * s).max(0.0)
            }
            InputField::NPaths => {
                let delta = 1_000 * i64::from(steps);
                c.n_paths = (c.n_paths as i64 + delta).max(1_000) as usize;
            }
            InputField::Seed => c.seed = c.seed.wrapping_add_signed(i64::from(steps)),
            InputField::HorizonMonths => {
                c.horizon_months = c.horizon_months.saturating_add_signed(steps).max(1)
            }
            InputField::UseModel => {
                if steps != 0 {
                    inputs.use_model = !inputs.use_model;
                }
            }
            InputField::Auc => {
                inputs.model.auc = snap(inputs.model.auc + 0.01 * s, 0.01).clamp(0.5, 0.99)
            }
            InputField::Threshold => {
                inputs.model.threshold = snap(inputs.model.threshold + 0.25 * s, 0.25)
            }
        }
    }
}

/// Round to the nearest multiple of `step` so repeated nudges don't drift
fn snap(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

/// Values edited on the Inputs tab
#[derive(Debug, Clone, PartialEq)]
pub struct Inputs {
    pub config: SimConfig,
    pub use_model: bool,
    /// Kept while the model is disabled so toggling back restores it
    pub model: ModelQuality,
}

impl Inputs {
    pub fn from_config(config: SimConfig) -> Self {
        let use_model = config.model_quality.is_some();
        let model = config.model_quality.unwrap_or_default();
        Self {
            config,
            use_model,
            model,
        }
    }

    /// Configuration to simulate
    pub fn to_config(&self) -> SimConfig {
        SimConfig {
            model_quality: self.use_model.then_some(self.model),
            ..self.config.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SimulationStatus {
    #[default]
    Idle,
    Running {
        stage: Stage,
        current: usize,
        total: usize,
    },
}

pub struct AppState {
    pub active_tab: TabId,
    pub inputs: Inputs,
    pub selected_input: usize,
    pub results: Option<RunArtifacts>,
    /// Inputs changed since the displayed results were produced
    pub results_stale: bool,
    pub selected_threshold: usize,
    pub simulation_status: SimulationStatus,
    pub error_message: Option<String>,
    pub exit: bool,
}

impl AppState {
    pub fn new(config: SimConfig) -> Self {
        Self {
            active_tab: TabId::default(),
            inputs: Inputs::from_config(config),
            selected_input: 0,
            results: None,
            results_stale: false,
            selected_threshold: 0,
            simulation_status: SimulationStatus::Idle,
            error_message: None,
            exit: false,
        }
    }

    pub fn switch_tab(&mut self, tab: TabId) {
        self.active_tab = tab;
    }

    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    pub fn selected_field(&self) -> InputField {
        InputField::ALL[self.selected_input.min(InputField::ALL.len() - 1)]
    }

    pub fn is_running(&self) -> bool {
        matches!(self.simulation_status, SimulationStatus::Running { .. })
    }

    pub fn adjust_selected(&mut self, steps: i32) {
        let field = self.selected_field();
        if !field.is_active(&self.inputs) {
            return;
        }
        field.adjust(&mut self.inputs, steps);
        if self.results.is_some() {
            self.results_stale = true;
        }
    }

    pub fn set_results(&mut self, artifacts: RunArtifacts) {
        self.selected_threshold = artifacts
            .threshold
            .as_ref()
            .and_then(|curve| {
                let best = curve.optimal()?.threshold;
                curve.points.iter().position(|p| p.threshold == best)
            })
            .unwrap_or(0);
        self.results = Some(artifacts);
        self.results_stale = false;
        self.simulation_status = SimulationStatus::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_index_round_trip() {
        for tab in TabId::ALL {
            assert_eq!(TabId::from_index(tab.index()), Some(tab));
        }
        assert_eq!(TabId::from_index(4), None);
    }

    #[test]
    fn test_adjust_clamps_probabilities() {
        let mut inputs = Inputs::from_config(SimConfig::default());
        InputField::DetectionRate.adjust(&mut inputs, 100);
        assert_eq!(inputs.config.detection_rate, 1.0);
        InputField::BaseFraudRate.adjust(&mut inputs, -100);
        assert_eq!(inputs.config.base_fraud_rate, 0.0);
        InputField::HorizonMonths.adjust(&mut inputs, -5);
        assert_eq!(inputs.config.horizon_months, 1);
    }

    #[test]
    fn test_model_toggle_round_trip() {
        let mut inputs = Inputs::from_config(SimConfig::default());
        assert!(inputs.to_config().model_quality.is_none());

        InputField::UseModel.adjust(&mut inputs, 1);
        InputField::Threshold.adjust(&mut inputs, 2);
        let quality = inputs.to_config().model_quality.unwrap();
        assert_eq!(quality.threshold, 1.5);

        InputField::UseModel.adjust(&mut inputs, -1);
        assert!(inputs.to_config().model_quality.is_none());
        assert_eq!(inputs.model.threshold, 1.5);
    }

    #[test]
    fn test_inactive_field_not_adjusted() {
        let mut state = AppState::new(SimConfig {
            model_quality: Some(ModelQuality::default()),
            ..Default::default()
        });
        state.selected_input = InputField::ALL
            .iter()
            .position(|f| *f == InputField::DetectionRate)
            .unwrap();
        let before = state.inputs.config.detection_rate;
        state.adjust_selected(3);
        assert_eq!(state.inputs.config.detection_rate, before);
    }
}
