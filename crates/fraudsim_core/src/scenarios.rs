//! Scenario construction: baseline, stress, and Latin-hypercube parameter samples.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::{CostModel, SimConfig};
use crate::error::{Result, SimError};

/// Resolved parameter set consumed by the simulation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub n_transactions: u64,
    pub avg_ticket: f64,
    pub base_fraud_rate: f64,
    pub detection_rate: f64,
    pub false_positive_rate: f64,
    pub sev_mu: f64,
    pub sev_sigma: f64,
    pub monthly_loss_budget: f64,
    pub horizon_months: u32,
    pub costs: CostModel,
    pub stochastic_detection: bool,
}

impl ScenarioParams {
    /// Loss budget over the whole horizon
    #[must_use]
    pub fn horizon_budget(&self) -> f64 {
        self.monthly_loss_budget * f64::from(self.horizon_months)
    }

    /// Ordered (name, value) pairs for reports
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("n_transactions", self.n_transactions.to_string()),
            ("avg_ticket", self.avg_ticket.to_string()),
            ("base_fraud_rate", self.base_fraud_rate.to_string()),
            ("detection_rate", format!("{:.4}", self.detection_rate)),
            ("false_positive_rate", format!("{:.4}", self.false_positive_rate)),
            ("sev_mu", self.sev_mu.to_string()),
            ("sev_sigma", self.sev_sigma.to_string()),
            ("monthly_loss_budget", self.monthly_loss_budget.to_string()),
            ("horizon_months", self.horizon_months.to_string()),
            ("alert_review_cost", self.costs.alert_review_cost.to_string()),
            (
                "false_positive_friction",
                self.costs.false_positive_friction.to_string(),
            ),
            ("chargeback_fee", self.costs.chargeback_fee.to_string()),
            ("stochastic_detection", self.stochastic_detection.to_string()),
        ]
    }
}

/// Baseline scenario taken straight from the configuration.
///
/// Detection and false-positive rates come from the model-quality operating point
/// when one is configured.
pub fn make_baseline(cfg: &SimConfig) -> Result<ScenarioParams> {
    let (detection_rate, false_positive_rate) = match &cfg.model_quality {
        Some(quality) => {
            let point = quality.operating_point()?;
            (point.detection_rate, point.false_positive_rate)
        }
        None => (cfg.detection_rate, cfg.false_positive_rate),
    };

    Ok(ScenarioParams {
        n_transactions: cfg.n_transactions,
        avg_ticket: cfg.avg_ticket,
        base_fraud_rate: cfg.base_fraud_rate,
        detection_rate,
        false_positive_rate,
        sev_mu: cfg.sev_mu,
        sev_sigma: cfg.sev_sigma,
        monthly_loss_budget: cfg.monthly_loss_budget,
        horizon_months: cfg.horizon_months,
        costs: cfg.costs,
        stochastic_detection: cfg.stochastic_detection,
    })
}

/// Multipliers applied by [`make_stress`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressFactors {
    pub fraud_uplift: f64,
    pub detection_drop: f64,
    pub sigma_uplift: f64,
}

impl Default for StressFactors {
    fn default() -> Self {
        Self {
            fraud_uplift: 1.5,
            detection_drop: 0.9,
            sigma_uplift: 1.1,
        }
    }
}

/// Stress scenario that increases fraud rate and severity and reduces detection
pub fn make_stress(cfg: &SimConfig, factors: StressFactors) -> Result<ScenarioParams> {
    let mut s = make_baseline(cfg)?;
    let fraud_rate = s.base_fraud_rate * factors.fraud_uplift;
    let detection_rate = s.detection_rate * factors.detection_drop;
    let sev_sigma = s.sev_sigma * factors.sigma_uplift;
    Driver::BaseFraudRate.set(&mut s, fraud_rate);
    Driver::DetectionRate.set(&mut s, detection_rate);
    Driver::SevSigma.set(&mut s, sev_sigma);
    Ok(s)
}

/// A scalar scenario parameter that sensitivity and uncertainty analyses can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    BaseFraudRate,
    DetectionRate,
    FalsePositiveRate,
    SevMu,
    SevSigma,
    AvgTicket,
}

impl Driver {
    pub const ALL: [Driver; 6] = [
        Driver::BaseFraudRate,
        Driver::DetectionRate,
        Driver::FalsePositiveRate,
        Driver::SevMu,
        Driver::SevSigma,
        Driver::AvgTicket,
    ];

    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Driver::BaseFraudRate => "base_fraud_rate",
            Driver::DetectionRate => "detection_rate",
            Driver::FalsePositiveRate => "false_positive_rate",
            Driver::SevMu => "sev_mu",
            Driver::SevSigma => "sev_sigma",
            Driver::AvgTicket => "avg_ticket",
        }
    }

    /// Whether the driver is a rate confined to [0, 1]
    #[must_use]
    pub fn is_probability(&self) -> bool {
        matches!(
            self,
            Driver::BaseFraudRate | Driver::DetectionRate | Driver::FalsePositiveRate
        )
    }

    #[must_use]
    pub fn get(&self, params: &ScenarioParams) -> f64 {
        match self {
            Driver::BaseFraudRate => params.base_fraud_rate,
            Driver::DetectionRate => params.detection_rate,
            Driver::FalsePositiveRate => params.false_positive_rate,
            Driver::SevMu => params.sev_mu,
            Driver::SevSigma => params.sev_sigma,
            Driver::AvgTicket => params.avg_ticket,
        }
    }

    /// Set the driver's value; rates clamp to [0, 1], sigma and ticket to >= 0
    pub fn set(&self, params: &mut ScenarioParams, value: f64) {
        match self {
            Driver::BaseFraudRate => params.base_fraud_rate = value.clamp(0.0, 1.0),
            Driver::DetectionRate => params.detection_rate = value.clamp(0.0, 1.0),
            Driver::FalsePositiveRate => params.false_positive_rate = value.clamp(0.0, 1.0),
            Driver::SevMu => params.sev_mu = value,
            Driver::SevSigma => params.sev_sigma = value.max(0.0),
            Driver::AvgTicket => params.avg_ticket = value.max(0.0),
        }
    }

    /// Copy of `params` with this driver set to `value`
    #[must_use]
    pub fn with_value(&self, params: &ScenarioParams, value: f64) -> ScenarioParams {
        let mut p = params.clone();
        self.set(&mut p, value);
        p
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Closed interval a driver is sampled from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub driver: Driver,
    pub low: f64,
    pub high: f64,
}

impl ParamRange {
    pub fn new(driver: Driver, low: f64, high: f64) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(SimError::config(
                "param_range",
                format!("{driver}: expected finite low <= high, got [{low}, {high}]"),
            ));
        }
        Ok(Self { driver, low, high })
    }
}

/// One record produced by [`lhs_samples`]: a value per sampled driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LhsSample {
    pub values: Vec<(Driver, f64)>,
}

impl LhsSample {
    /// Apply every sampled value to a copy of `params`
    #[must_use]
    pub fn apply(&self, params: &ScenarioParams) -> ScenarioParams {
        let mut p = params.clone();
        for (driver, value) in &self.values {
            driver.set(&mut p, *value);
        }
        p
    }
}

/// Latin-hypercube-like sampler on independent ranges.
///
/// Each dimension uses the `n` stratum midpoints `(i + 0.5) / n`, shuffled
/// independently, so every stratum is hit exactly once per dimension.
#[must_use]
pub fn lhs_samples(ranges: &[ParamRange], n: usize, seed: u64) -> Vec<LhsSample> {
    let mut rng = SmallRng::seed_from_u64(seed);

    let columns: Vec<Vec<f64>> = ranges
        .iter()
        .map(|range| {
            let mut u: Vec<f64> = (0..n).map(|i| (i as f64 + 0.5) / n as f64).collect();
            u.shuffle(&mut rng);
            u.into_iter()
                .map(|u| range.low + u * (range.high - range.low))
                .collect()
        })
        .collect();

    (0..n)
        .map(|j| LhsSample {
            values: ranges
                .iter()
                .zip(&columns)
                .map(|(range, column)| (range.driver, column[j]))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelQuality;

    #[test]
    fn test_baseline_copies_config() {
        let cfg = SimConfig::default();
        let params = make_baseline(&cfg).unwrap();
        assert_eq!(params.n_transactions, 1_000_000);
        assert_eq!(params.detection_rate, 0.72);
        assert_eq!(params.false_positive_rate, 0.01);
        assert_eq!(params.horizon_budget(), 350_000.0);
    }

    #[test]
    fn test_baseline_uses_model_quality() {
        let cfg = SimConfig {
            model_quality: Some(ModelQuality {
                auc: 0.9,
                threshold: 0.0,
            }),
            ..Default::default()
        };
        let params = make_baseline(&cfg).unwrap();
        assert!((params.false_positive_rate - 0.5).abs() < 1e-9);
        assert_ne!(params.detection_rate, cfg.detection_rate);
    }

    #[test]
    fn test_stress_applies_factors() {
        let cfg = SimConfig::default();
        let s = make_stress(&cfg, StressFactors::default()).unwrap();
        assert!((s.base_fraud_rate - 0.006).abs() < 1e-12);
        assert!((s.detection_rate - 0.648).abs() < 1e-12);
        assert!((s.sev_sigma - 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_driver_set_clamps_rates() {
        let mut params = make_baseline(&SimConfig::default()).unwrap();
        Driver::DetectionRate.set(&mut params, 1.4);
        assert_eq!(params.detection_rate, 1.0);
        Driver::SevSigma.set(&mut params, -0.5);
        assert_eq!(params.sev_sigma, 0.0);
        Driver::SevMu.set(&mut params, -1.0);
        assert_eq!(params.sev_mu, -1.0);
    }

    #[test]
    fn test_lhs_hits_every_stratum_once() {
        let ranges = [
            ParamRange::new(Driver::BaseFraudRate, 0.002, 0.006).unwrap(),
            ParamRange::new(Driver::SevSigma, 0.5, 1.5).unwrap(),
        ];
        let n = 20;
        let samples = lhs_samples(&ranges, n, 7);
        assert_eq!(samples.len(), n);

        for (dim, range) in ranges.iter().enumerate() {
            let mut strata: Vec<usize> = samples
                .iter()
                .map(|s| {
                    let u = (s.values[dim].1 - range.low) / (range.high - range.low);
                    (u * n as f64).floor() as usize
                })
                .collect();
            strata.sort_unstable();
            assert_eq!(strata, (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_lhs_is_seeded() {
        let ranges = [ParamRange::new(Driver::SevMu, 3.0, 5.0).unwrap()];
        assert_eq!(lhs_samples(&ranges, 10, 1), lhs_samples(&ranges, 10, 1));
        assert_ne!(lhs_samples(&ranges, 10, 1), lhs_samples(&ranges, 10, 2));
        assert!(lhs_samples(&ranges, 0, 1).is_empty());
    }

    #[test]
    fn test_param_range_rejects_inverted_bounds() {
        assert!(ParamRange::new(Driver::SevMu, 2.0, 1.0).is_err());
    }
}
