//! End-to-end analysis run shared by the `run` command and the dashboard.

use fraudsim_core::error::Result;
use fraudsim_core::{
    DEFAULT_DRIVERS, Kpis, ScenarioParams, SimConfig, SimError, SimulationProgress,
    SimulationResult, StressFactors, ThresholdCurve, Tornado, TornadoMetric, UncertaintyResult,
    default_ranges, default_thresholds, kpis, make_baseline, make_stress,
    run_monte_carlo_with_progress, run_uncertainty_with_progress, threshold_curve_with_progress,
    tornado_data_with_progress,
};

/// Step of the analysis currently executing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Baseline,
    Stress,
    Sensitivity,
    Threshold,
    Uncertainty,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Baseline => "baseline",
            Stage::Stress => "stress scenario",
            Stage::Sensitivity => "sensitivity",
            Stage::Threshold => "threshold curve",
            Stage::Uncertainty => "parameter uncertainty",
        }
    }
}

/// Everything produced by one analysis run
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub config: SimConfig,
    pub baseline: ScenarioParams,
    pub baseline_result: SimulationResult,
    pub baseline_kpis: Kpis,
    pub stress: ScenarioParams,
    pub stress_kpis: Kpis,
    pub tornado: Tornado,
    /// Present when the configuration carries a model quality
    pub threshold: Option<ThresholdCurve>,
    /// Present when LHS samples were requested
    pub uncertainty: Option<UncertaintyResult>,
}

/// Run the full analysis without progress reporting
pub fn run_pipeline(config: &SimConfig, lhs_samples: usize) -> Result<RunArtifacts> {
    run_pipeline_with_progress(config, lhs_samples, &SimulationProgress::new(), |_| {})
}

/// Paths simulated by [`run_pipeline_with_progress`] for `config`
pub fn total_paths(config: &SimConfig, lhs_samples: usize) -> usize {
    let tornado_runs = 1 + 2 * DEFAULT_DRIVERS.len();
    let threshold_runs = if config.model_quality.is_some() {
        default_thresholds().len()
    } else {
        0
    };
    2 * config.n_paths + (tornado_runs + threshold_runs + lhs_samples) * config.sensitivity_paths
}

/// Run baseline, stress, tornado and the optional threshold and uncertainty analyses.
///
/// `progress` counts every simulated path, [`total_paths`] in all. Cancellation is
/// checked inside each Monte Carlo run and once more before returning.
pub fn run_pipeline_with_progress(
    config: &SimConfig,
    lhs_samples: usize,
    progress: &SimulationProgress,
    mut on_stage: impl FnMut(Stage),
) -> Result<RunArtifacts> {
    config.validate()?;
    let seed = config.seed;

    let mut enter = |stage: Stage| -> Result<()> {
        if progress.is_cancelled() {
            return Err(SimError::Cancelled);
        }
        tracing::info!(stage = stage.label(), "analysis stage started");
        on_stage(stage);
        Ok(())
    };

    enter(Stage::Baseline)?;
    let baseline = make_baseline(config)?;
    let baseline_result = run_monte_carlo_with_progress(&baseline, seed, config.n_paths, progress)?;
    let baseline_kpis = kpis(&baseline_result, baseline.horizon_budget());

    enter(Stage::Stress)?;
    let stress = make_stress(config, StressFactors::default())?;
    let stress_result = run_monte_carlo_with_progress(&stress, seed, config.n_paths, progress)?;
    let stress_kpis = kpis(&stress_result, stress.horizon_budget());

    enter(Stage::Sensitivity)?;
    let tornado = tornado_data_with_progress(
        &baseline,
        seed,
        config.sensitivity_paths,
        config.perturbation,
        &DEFAULT_DRIVERS,
        TornadoMetric::MeanLoss,
        progress,
    )?;

    let threshold = match config.model_quality {
        Some(quality) => {
            enter(Stage::Threshold)?;
            Some(threshold_curve_with_progress(
                &baseline,
                quality.auc,
                &default_thresholds(),
                seed,
                config.sensitivity_paths,
                progress,
            )?)
        }
        None => None,
    };

    let uncertainty = if lhs_samples > 0 {
        enter(Stage::Uncertainty)?;
        let ranges = default_ranges(&baseline)?;
        Some(run_uncertainty_with_progress(
            &baseline,
            &ranges,
            lhs_samples,
            config.sensitivity_paths,
            seed,
            progress,
        )?)
    } else {
        None
    };

    // A cancel that lands after the last batch still wins over the results
    if progress.is_cancelled() {
        return Err(SimError::Cancelled);
    }

    tracing::info!(
        expected_loss = baseline_kpis.expected_loss,
        var_95 = baseline_kpis.var_95,
        breach_prob = baseline_kpis.breach_prob,
        "analysis complete"
    );

    Ok(RunArtifacts {
        config: config.clone(),
        baseline,
        baseline_result,
        baseline_kpis,
        stress,
        stress_kpis,
        tornado,
        threshold,
        uncertainty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudsim_core::ModelQuality;

    fn small_config() -> SimConfig {
        SimConfig {
            n_paths: 400,
            sensitivity_paths: 200,
            ..Default::default()
        }
    }

    #[test]
    fn test_pipeline_without_optional_stages() {
        let mut stages = Vec::new();
        let artifacts = run_pipeline_with_progress(
            &small_config(),
            0,
            &SimulationProgress::new(),
            |s| stages.push(s),
        )
        .unwrap();

        assert_eq!(stages, [Stage::Baseline, Stage::Stress, Stage::Sensitivity]);
        assert!(artifacts.threshold.is_none());
        assert!(artifacts.uncertainty.is_none());
        assert_eq!(artifacts.baseline_result.n_paths(), 400);
        assert!(artifacts.stress_kpis.expected_loss > artifacts.baseline_kpis.expected_loss);
    }

    #[test]
    fn test_pipeline_with_model_quality_and_lhs() {
        let config = SimConfig {
            model_quality: Some(ModelQuality::default()),
            ..small_config()
        };
        let artifacts = run_pipeline(&config, 4).unwrap();

        let curve = artifacts.threshold.unwrap();
        assert_eq!(curve.points.len(), default_thresholds().len());
        assert_eq!(artifacts.uncertainty.unwrap().samples.len(), 4);
    }

    #[test]
    fn test_cancelled_before_start() {
        let progress = SimulationProgress::new();
        progress.cancel();
        let err = run_pipeline_with_progress(&small_config(), 0, &progress, |_| {}).unwrap_err();
        assert_eq!(err, SimError::Cancelled);
    }

    #[test]
    fn test_cancel_during_sensitivity() {
        let progress = SimulationProgress::new();
        let err = run_pipeline_with_progress(&small_config(), 0, &progress, |stage| {
            if stage == Stage::Sensitivity {
                progress.cancel();
            }
        })
        .unwrap_err();
        assert_eq!(err, SimError::Cancelled);
        assert_eq!(progress.completed(), 2 * small_config().n_paths);
    }

    #[test]
    fn test_progress_reaches_total_paths() {
        let config = SimConfig {
            model_quality: Some(ModelQuality::default()),
            ..small_config()
        };
        let progress = SimulationProgress::new();
        run_pipeline_with_progress(&config, 2, &progress, |_| {}).unwrap();
        assert_eq!(progress.completed(), total_paths(&config, 2));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimConfig {
            base_fraud_rate: 1.5,
            ..small_config()
        };
        assert!(matches!(
            run_pipeline(&config, 0),
            Err(SimError::InvalidConfig { .. })
        ));
    }
}
