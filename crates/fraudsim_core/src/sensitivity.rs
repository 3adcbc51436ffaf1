//! One-at-a-time sensitivity analysis (tornado chart data).

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::scenarios::{Driver, ScenarioParams};
use crate::simulation::{SimulationProgress, SimulationResult, run_monte_carlo_inner};

/// Drivers perturbed when the caller does not choose any
pub const DEFAULT_DRIVERS: [Driver; 3] = [
    Driver::BaseFraudRate,
    Driver::DetectionRate,
    Driver::SevSigma,
];

/// KPI measured for each perturbation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TornadoMetric {
    #[default]
    MeanLoss,
    MeanNetImpact,
}

impl TornadoMetric {
    fn of(&self, result: &SimulationResult) -> f64 {
        match self {
            TornadoMetric::MeanLoss => result.mean_loss,
            TornadoMetric::MeanNetImpact => result.mean_net_impact,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            TornadoMetric::MeanLoss => "mean loss",
            TornadoMetric::MeanNetImpact => "mean net impact",
        }
    }
}

/// Change in the metric when a driver moves down (`low`) or up (`high`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TornadoBar {
    pub driver: Driver,
    pub low: f64,
    pub high: f64,
}

impl TornadoBar {
    /// Largest absolute change in either direction
    #[must_use]
    pub fn impact(&self) -> f64 {
        self.low.abs().max(self.high.abs())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tornado {
    pub metric: TornadoMetric,
    pub perturbation: f64,
    /// Metric value of the unperturbed scenario
    pub base: f64,
    /// Bars ordered by absolute impact, largest first
    pub bars: Vec<TornadoBar>,
}

/// Low/high metric deltas for `drivers` under a ±`perturb` relative perturbation.
///
/// Every evaluation reuses `seed`, so differences come from the parameters and not
/// from sampling noise.
pub fn tornado_data(
    params: &ScenarioParams,
    seed: u64,
    n_paths: usize,
    perturb: f64,
    drivers: &[Driver],
    metric: TornadoMetric,
) -> Result<Tornado> {
    tornado_inner(params, seed, n_paths, perturb, drivers, metric, None)
}

/// [`tornado_data`] counting simulated paths in `progress` and stopping on cancel.
///
/// Adds `(1 + 2 * drivers.len()) * n_paths` paths when it completes.
pub fn tornado_data_with_progress(
    params: &ScenarioParams,
    seed: u64,
    n_paths: usize,
    perturb: f64,
    drivers: &[Driver],
    metric: TornadoMetric,
    progress: &SimulationProgress,
) -> Result<Tornado> {
    tornado_inner(params, seed, n_paths, perturb, drivers, metric, Some(progress))
}

fn tornado_inner(
    params: &ScenarioParams,
    seed: u64,
    n_paths: usize,
    perturb: f64,
    drivers: &[Driver],
    metric: TornadoMetric,
    progress: Option<&SimulationProgress>,
) -> Result<Tornado> {
    if !perturb.is_finite() || !(0.0..1.0).contains(&perturb) {
        return Err(SimError::config(
            "perturbation",
            format!("must be within [0, 1), got {perturb}"),
        ));
    }

    let base = metric.of(&run_monte_carlo_inner(params, seed, n_paths, progress)?);

    let mut bars = drivers
        .iter()
        .map(|&driver| {
            let value = driver.get(params);
            let p_lo = driver.with_value(params, value * (1.0 - perturb));
            let p_hi = driver.with_value(params, value * (1.0 + perturb));

            let lo = metric.of(&run_monte_carlo_inner(&p_lo, seed, n_paths, progress)?);
            let hi = metric.of(&run_monte_carlo_inner(&p_hi, seed, n_paths, progress)?);
            tracing::debug!(%driver, lo, hi, base, "tornado driver evaluated");

            Ok(TornadoBar {
                driver,
                low: lo - base,
                high: hi - base,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    bars.sort_by(|a, b| b.impact().total_cmp(&a.impact()));

    Ok(Tornado {
        metric,
        perturbation: perturb,
        base,
        bars,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::scenarios::make_baseline;

    #[test]
    fn test_bars_sorted_by_impact() {
        let params = make_baseline(&SimConfig::default()).unwrap();
        let tornado = tornado_data(
            &params,
            42,
            2_000,
            0.2,
            &DEFAULT_DRIVERS,
            TornadoMetric::MeanLoss,
        )
        .unwrap();

        assert_eq!(tornado.bars.len(), 3);
        for pair in tornado.bars.windows(2) {
            assert!(pair[0].impact() >= pair[1].impact());
        }
    }

    #[test]
    fn test_rejects_bad_perturbation() {
        let params = make_baseline(&SimConfig::default()).unwrap();
        let result = tornado_data(&params, 1, 100, 1.5, &DEFAULT_DRIVERS, TornadoMetric::MeanLoss);
        assert!(result.is_err());
    }

    #[test]
    fn test_progress_counts_all_evaluations() {
        let params = make_baseline(&SimConfig::default()).unwrap();
        let progress = SimulationProgress::new();
        let tracked = tornado_data_with_progress(
            &params,
            42,
            300,
            0.2,
            &DEFAULT_DRIVERS,
            TornadoMetric::MeanLoss,
            &progress,
        )
        .unwrap();

        assert_eq!(progress.completed(), (1 + 2 * DEFAULT_DRIVERS.len()) * 300);
        let plain =
            tornado_data(&params, 42, 300, 0.2, &DEFAULT_DRIVERS, TornadoMetric::MeanLoss).unwrap();
        assert_eq!(tracked, plain);
    }

    #[test]
    fn test_cancelled_tornado_stops() {
        let params = make_baseline(&SimConfig::default()).unwrap();
        let progress = SimulationProgress::new();
        progress.cancel();
        let err = tornado_data_with_progress(
            &params,
            42,
            300,
            0.2,
            &DEFAULT_DRIVERS,
            TornadoMetric::MeanLoss,
            &progress,
        )
        .unwrap_err();
        assert_eq!(err, SimError::Cancelled);
        assert_eq!(progress.completed(), 0);
    }
}
