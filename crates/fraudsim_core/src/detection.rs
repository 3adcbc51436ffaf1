//! Binormal detection model.
//!
//! Legitimate transaction scores follow N(0, 1) and fraudulent scores N(d', 1) with
//! `d' = sqrt(2) * Phi^-1(AUC)`. A threshold `t` flags every score above it, so
//! `TPR = 1 - Phi(t - d')` and `FPR = 1 - Phi(t)`.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::config::{ModelQuality, check_auc};
use crate::error::{Result, SimError};

/// Detection and false-positive rates at a given threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    pub threshold: f64,
    pub detection_rate: f64,
    pub false_positive_rate: f64,
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| SimError::InvalidDistribution {
        distribution: "standard normal",
        reason: e.to_string(),
    })
}

/// Separation between fraud and legitimate score means implied by an AUC
pub fn separation(auc: f64) -> Result<f64> {
    check_auc(auc)?;
    Ok(std::f64::consts::SQRT_2 * standard_normal()?.inverse_cdf(auc))
}

/// Operating point for a model of the given AUC at `threshold`
pub fn operating_point(auc: f64, threshold: f64) -> Result<OperatingPoint> {
    if !threshold.is_finite() {
        return Err(SimError::config(
            "model_quality.threshold",
            format!("must be finite, got {threshold}"),
        ));
    }
    let d_prime = separation(auc)?;
    let phi = standard_normal()?;

    Ok(OperatingPoint {
        threshold,
        detection_rate: (1.0 - phi.cdf(threshold - d_prime)).clamp(0.0, 1.0),
        false_positive_rate: (1.0 - phi.cdf(threshold)).clamp(0.0, 1.0),
    })
}

impl ModelQuality {
    pub fn operating_point(&self) -> Result<OperatingPoint> {
        operating_point(self.auc, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_flip_model_has_equal_rates() {
        let point = operating_point(0.5, 0.3).unwrap();
        assert!((point.detection_rate - point.false_positive_rate).abs() < 1e-9);
    }

    #[test]
    fn test_zero_threshold_flags_half_of_legit_traffic() {
        let point = operating_point(0.9, 0.0).unwrap();
        assert!((point.false_positive_rate - 0.5).abs() < 1e-9);
        assert!(point.detection_rate > 0.5);
    }

    #[test]
    fn test_rates_fall_as_threshold_rises() {
        let mut last = operating_point(0.85, -2.0).unwrap();
        for step in 1..=16 {
            let t = -2.0 + step as f64 * 0.25;
            let point = operating_point(0.85, t).unwrap();
            assert!(point.detection_rate <= last.detection_rate);
            assert!(point.false_positive_rate <= last.false_positive_rate);
            last = point;
        }
    }

    #[test]
    fn test_better_model_detects_more_at_same_threshold() {
        let weak = operating_point(0.70, 1.0).unwrap();
        let strong = operating_point(0.95, 1.0).unwrap();
        assert!(strong.detection_rate > weak.detection_rate);
        assert!((strong.false_positive_rate - weak.false_positive_rate).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(operating_point(1.0, 0.0).is_err());
        assert!(operating_point(0.8, f64::INFINITY).is_err());
    }
}
