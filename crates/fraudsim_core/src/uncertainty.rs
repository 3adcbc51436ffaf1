//! Parameter uncertainty: run the simulation over Latin-hypercube samples of
//! uncertain drivers and summarise how the expected loss moves.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::quantile;
use crate::scenarios::{Driver, LhsSample, ParamRange, ScenarioParams, lhs_samples};
use crate::simulation::{SimulationProgress, run_monte_carlo_inner};

/// Relative half-width of the default uncertainty ranges
const DEFAULT_SPREAD: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintySample {
    pub sample: LhsSample,
    pub expected_loss: f64,
    pub var_95: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyResult {
    pub ranges: Vec<ParamRange>,
    pub samples: Vec<UncertaintySample>,
    /// Expected loss across samples: (percentile as 0-1, value)
    pub expected_loss_percentiles: Vec<(f64, f64)>,
}

/// ±25 % ranges around the baseline fraud rate, detection rate and severity sigma
pub fn default_ranges(params: &ScenarioParams) -> Result<Vec<ParamRange>> {
    [Driver::BaseFraudRate, Driver::DetectionRate, Driver::SevSigma]
        .into_iter()
        .map(|driver| {
            let value = driver.get(params);
            let (mut low, mut high) = (
                value * (1.0 - DEFAULT_SPREAD),
                value * (1.0 + DEFAULT_SPREAD),
            );
            if driver.is_probability() {
                low = low.clamp(0.0, 1.0);
                high = high.clamp(0.0, 1.0);
            }
            ParamRange::new(driver, low.min(high), low.max(high))
        })
        .collect()
}

/// Simulate each LHS sample with the same seed and collect expected-loss spread
pub fn run_uncertainty(
    params: &ScenarioParams,
    ranges: &[ParamRange],
    n_samples: usize,
    n_paths: usize,
    seed: u64,
) -> Result<UncertaintyResult> {
    uncertainty_inner(params, ranges, n_samples, n_paths, seed, None)
}

/// [`run_uncertainty`] counting `n_samples * n_paths` paths in `progress`
pub fn run_uncertainty_with_progress(
    params: &ScenarioParams,
    ranges: &[ParamRange],
    n_samples: usize,
    n_paths: usize,
    seed: u64,
    progress: &SimulationProgress,
) -> Result<UncertaintyResult> {
    uncertainty_inner(params, ranges, n_samples, n_paths, seed, Some(progress))
}

fn uncertainty_inner(
    params: &ScenarioParams,
    ranges: &[ParamRange],
    n_samples: usize,
    n_paths: usize,
    seed: u64,
    progress: Option<&SimulationProgress>,
) -> Result<UncertaintyResult> {
    let samples = lhs_samples(ranges, n_samples, seed)
        .into_iter()
        .map(|sample| {
            let result = run_monte_carlo_inner(&sample.apply(params), seed, n_paths, progress)?;
            Ok(UncertaintySample {
                sample,
                expected_loss: result.mean_loss,
                var_95: result.var_95,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let expected_losses: Vec<f64> = samples.iter().map(|s| s.expected_loss).collect();
    let expected_loss_percentiles = if expected_losses.is_empty() {
        Vec::new()
    } else {
        [0.05, 0.50, 0.95]
            .into_iter()
            .map(|p| (p, quantile(&expected_losses, p)))
            .collect()
    };

    tracing::info!(n_samples, n_paths, "uncertainty analysis complete");

    Ok(UncertaintyResult {
        ranges: ranges.to_vec(),
        samples,
        expected_loss_percentiles,
    })
}
