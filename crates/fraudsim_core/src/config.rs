//! Simulation configuration
//!
//! `SimConfig` holds every knob the simulator exposes. All fields have defaults so a
//! partially specified settings file deserializes into a complete configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Fraud model described by its separation quality and alerting threshold.
///
/// When present on a [`SimConfig`], detection and false-positive rates are derived
/// from the binormal operating point instead of being taken literally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelQuality {
    /// Area under the ROC curve, strictly between 0 and 1
    pub auc: f64,
    /// Score threshold on the legitimate-score scale (standard normal)
    pub threshold: f64,
}

impl Default for ModelQuality {
    fn default() -> Self {
        Self {
            auc: 0.90,
            threshold: 1.0,
        }
    }
}

/// Operating costs attached to running the fraud model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    /// Manual review cost per alert (true or false positive)
    pub alert_review_cost: f64,
    /// Share of the average ticket lost to customer friction per false positive
    pub false_positive_friction: f64,
    /// Fee charged per undetected fraud (chargeback handling)
    pub chargeback_fee: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            alert_review_cost: 2.0,
            false_positive_friction: 0.05,
            chargeback_fee: 15.0,
        }
    }
}

impl CostModel {
    /// Costs disabled; net impact equals fraud loss
    #[must_use]
    pub fn zero() -> Self {
        Self {
            alert_review_cost: 0.0,
            false_positive_friction: 0.0,
            chargeback_fee: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // Portfolio/traffic
    pub n_transactions: u64,
    pub avg_ticket: f64,

    // Fraud model
    pub base_fraud_rate: f64,
    pub detection_rate: f64,
    pub false_positive_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_quality: Option<ModelQuality>,
    pub stochastic_detection: bool,

    // Loss severity (lognormal, log-space parameters)
    pub sev_mu: f64,
    pub sev_sigma: f64,

    // Controls/budget
    pub monthly_loss_budget: f64,
    pub horizon_months: u32,
    pub costs: CostModel,

    // Run sizing
    pub n_paths: usize,
    pub sensitivity_paths: usize,
    pub perturbation: f64,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            n_transactions: 1_000_000,
            avg_ticket: 85.0,
            base_fraud_rate: 0.004,
            detection_rate: 0.72,
            false_positive_rate: 0.01,
            model_quality: None,
            stochastic_detection: false,
            sev_mu: 4.2,
            sev_sigma: 0.9,
            monthly_loss_budget: 350_000.0,
            horizon_months: 1,
            costs: CostModel::default(),
            n_paths: 20_000,
            sensitivity_paths: 15_000,
            perturbation: 0.2,
            seed: 42,
        }
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::config(field, format!("must be finite, got {value}")))
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<()> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(SimError::config(
            field,
            format!("must be non-negative, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn check_probability(field: &'static str, value: f64) -> Result<()> {
    check_finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(SimError::config(
            field,
            format!("must be within [0, 1], got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn check_auc(auc: f64) -> Result<()> {
    check_finite("model_quality.auc", auc)?;
    if auc <= 0.0 || auc >= 1.0 {
        return Err(SimError::config(
            "model_quality.auc",
            format!("must be strictly between 0 and 1, got {auc}"),
        ));
    }
    Ok(())
}

impl SimConfig {
    /// Check every field for a usable value.
    ///
    /// Called after settings files and CLI overrides are merged, before any
    /// scenario is built.
    pub fn validate(&self) -> Result<()> {
        check_non_negative("avg_ticket", self.avg_ticket)?;
        check_probability("base_fraud_rate", self.base_fraud_rate)?;
        check_probability("detection_rate", self.detection_rate)?;
        check_probability("false_positive_rate", self.false_positive_rate)?;
        if let Some(quality) = &self.model_quality {
            check_auc(quality.auc)?;
            check_finite("model_quality.threshold", quality.threshold)?;
        }
        check_finite("sev_mu", self.sev_mu)?;
        check_non_negative("sev_sigma", self.sev_sigma)?;
        check_non_negative("monthly_loss_budget", self.monthly_loss_budget)?;
        check_non_negative("costs.alert_review_cost", self.costs.alert_review_cost)?;
        check_non_negative(
            "costs.false_positive_friction",
            self.costs.false_positive_friction,
        )?;
        check_non_negative("costs.chargeback_fee", self.costs.chargeback_fee)?;

        if self.horizon_months == 0 {
            return Err(SimError::config("horizon_months", "must be at least 1"));
        }
        if self.n_paths == 0 {
            return Err(SimError::config("n_paths", "must be at least 1"));
        }
        if self.sensitivity_paths == 0 {
            return Err(SimError::config("sensitivity_paths", "must be at least 1"));
        }
        check_finite("perturbation", self.perturbation)?;
        if !(0.0..1.0).contains(&self.perturbation) {
            return Err(SimError::config(
                "perturbation",
                format!("must be within [0, 1), got {}", self.perturbation),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_probability_out_of_range() {
        let cfg = SimConfig {
            detection_rate: 1.2,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidConfig {
                field: "detection_rate",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_degenerate_auc() {
        for auc in [0.0, 1.0, f64::NAN] {
            let cfg = SimConfig {
                model_quality: Some(ModelQuality {
                    auc,
                    threshold: 0.5,
                }),
                ..Default::default()
            };
            assert!(cfg.validate().is_err(), "auc {auc} should be rejected");
        }
    }

    #[test]
    fn test_rejects_zero_sizes() {
        let cfg = SimConfig {
            n_paths: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SimConfig {
            horizon_months: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_full_perturbation() {
        let cfg = SimConfig {
            perturbation: 1.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
