//! Threshold curve: expected outcomes across alerting thresholds for a model of
//! fixed quality.

use serde::{Deserialize, Serialize};

use crate::detection::operating_point;
use crate::error::{Result, SimError};
use crate::scenarios::ScenarioParams;
use crate::simulation::{SimulationProgress, run_monte_carlo_inner};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPoint {
    pub threshold: f64,
    pub detection_rate: f64,
    pub false_positive_rate: f64,
    pub expected_loss: f64,
    pub expected_net_impact: f64,
    pub var_95: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCurve {
    pub auc: f64,
    pub points: Vec<ThresholdPoint>,
}

impl ThresholdCurve {
    /// Point with the lowest expected net impact
    #[must_use]
    pub fn optimal(&self) -> Option<&ThresholdPoint> {
        self.points
            .iter()
            .min_by(|a, b| a.expected_net_impact.total_cmp(&b.expected_net_impact))
    }
}

/// Thresholds from -1.0 to 3.0 in steps of 0.25
#[must_use]
pub fn default_thresholds() -> Vec<f64> {
    (0..=16).map(|i| -1.0 + 0.25 * f64::from(i)).collect()
}

/// Simulate `params` at each threshold's operating point.
///
/// Detection and false-positive rates in `params` are replaced by the binormal
/// operating point for `auc`; everything else is held fixed and every threshold
/// reuses `seed`.
pub fn threshold_curve(
    params: &ScenarioParams,
    auc: f64,
    thresholds: &[f64],
    seed: u64,
    n_paths: usize,
) -> Result<ThresholdCurve> {
    threshold_curve_inner(params, auc, thresholds, seed, n_paths, None)
}

/// [`threshold_curve`] counting `thresholds.len() * n_paths` paths in `progress`
pub fn threshold_curve_with_progress(
    params: &ScenarioParams,
    auc: f64,
    thresholds: &[f64],
    seed: u64,
    n_paths: usize,
    progress: &SimulationProgress,
) -> Result<ThresholdCurve> {
    threshold_curve_inner(params, auc, thresholds, seed, n_paths, Some(progress))
}

fn threshold_curve_inner(
    params: &ScenarioParams,
    auc: f64,
    thresholds: &[f64],
    seed: u64,
    n_paths: usize,
    progress: Option<&SimulationProgress>,
) -> Result<ThresholdCurve> {
    if thresholds.is_empty() {
        return Err(SimError::EmptyThresholds);
    }

    let points = thresholds
        .iter()
        .map(|&threshold| {
            let point = operating_point(auc, threshold)?;
            let scenario = ScenarioParams {
                detection_rate: point.detection_rate,
                false_positive_rate: point.false_positive_rate,
                ..params.clone()
            };
            let result = run_monte_carlo_inner(&scenario, seed, n_paths, progress)?;

            Ok(ThresholdPoint {
                threshold,
                detection_rate: point.detection_rate,
                false_positive_rate: point.false_positive_rate,
                expected_loss: result.mean_loss,
                expected_net_impact: result.mean_net_impact,
                var_95: result.var_95,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let curve = ThresholdCurve { auc, points };
    if let Some(best) = curve.optimal() {
        tracing::info!(
            auc,
            threshold = best.threshold,
            net_impact = best.expected_net_impact,
            "threshold curve optimum"
        );
    }
    Ok(curve)
}
