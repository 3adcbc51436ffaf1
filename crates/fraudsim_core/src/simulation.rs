//! Monte Carlo engine.
//!
//! Each path draws a fraud count, thins it by the detection rate, sums lognormal
//! severities over the undetected frauds and prices the operating cost of alerts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::{Binomial, Distribution, LogNormal, Poisson};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::{Result, SimError};
use crate::metrics::RiskMeasures;
use crate::scenarios::ScenarioParams;

/// Paths simulated per seeded batch
const MAX_BATCH_SIZE: usize = 100;

/// Outcome of a single simulated path
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PathOutcome {
    pub n_fraud: u64,
    pub n_undetected: u64,
    pub n_false_positives: u64,
    pub loss: f64,
    pub net_impact: f64,
}

/// Aggregated results of a Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Fraud loss per path, in path order
    pub losses: Vec<f64>,
    /// Loss plus operating costs per path, in path order
    pub net_impacts: Vec<f64>,
    pub mean_loss: f64,
    pub var_95: f64,
    pub cvar_95: f64,
    pub mean_net_impact: f64,
    pub n_fraud_mean: f64,
    pub n_undetected_mean: f64,
    pub n_false_positive_mean: f64,
}

impl SimulationResult {
    fn from_outcomes(outcomes: &[PathOutcome]) -> Self {
        let n = outcomes.len().max(1) as f64;
        let losses: Vec<f64> = outcomes.iter().map(|o| o.loss).collect();
        let net_impacts: Vec<f64> = outcomes.iter().map(|o| o.net_impact).collect();

        let mean = |f: fn(&PathOutcome) -> f64| outcomes.iter().map(f).sum::<f64>() / n;
        let risk = RiskMeasures::at(&losses, 0.95);

        Self {
            mean_loss: mean(|o| o.loss),
            var_95: risk.var,
            cvar_95: risk.cvar,
            mean_net_impact: mean(|o| o.net_impact),
            n_fraud_mean: mean(|o| o.n_fraud as f64),
            n_undetected_mean: mean(|o| o.n_undetected as f64),
            n_false_positive_mean: mean(|o| o.n_false_positives as f64),
            losses,
            net_impacts,
        }
    }

    #[must_use]
    pub fn n_paths(&self) -> usize {
        self.losses.len()
    }
}

/// Progress tracking and cancellation shared with a running simulation
#[derive(Debug, Clone, Default)]
pub struct SimulationProgress {
    completed: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl SimulationProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from existing atomics (for dashboard integration)
    pub fn from_atomics(completed: Arc<AtomicUsize>, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            completed,
            cancelled,
        }
    }

    /// Number of completed paths
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    fn add(&self, paths: usize) {
        self.completed.fetch_add(paths, Ordering::Relaxed);
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Distributions shared by every path of a run
struct PathSampler {
    fraud_count: Option<Poisson<f64>>,
    false_positives: Option<Poisson<f64>>,
    severity: LogNormal<f64>,
    undetected_share: f64,
    stochastic_detection: bool,
    alert_review_cost: f64,
    false_positive_cost: f64,
    chargeback_fee: f64,
}

fn poisson(lambda: f64, what: &'static str) -> Result<Option<Poisson<f64>>> {
    if lambda <= 0.0 {
        return Ok(None);
    }
    Poisson::new(lambda)
        .map(Some)
        .map_err(|e| SimError::InvalidDistribution {
            distribution: what,
            reason: format!("lambda={lambda}: {e}"),
        })
}

impl PathSampler {
    fn new(params: &ScenarioParams) -> Result<Self> {
        let months = f64::from(params.horizon_months);
        let volume = params.n_transactions as f64 * months;
        let fraud_lambda = volume * params.base_fraud_rate;
        let legit_lambda = volume * (1.0 - params.base_fraud_rate) * params.false_positive_rate;

        let severity = LogNormal::new(params.sev_mu, params.sev_sigma).map_err(|e| {
            SimError::InvalidDistribution {
                distribution: "lognormal severity",
                reason: format!("mu={}, sigma={}: {e}", params.sev_mu, params.sev_sigma),
            }
        })?;

        Ok(Self {
            fraud_count: poisson(fraud_lambda, "Poisson fraud count")?,
            false_positives: poisson(legit_lambda, "Poisson false positives")?,
            severity,
            undetected_share: (1.0 - params.detection_rate).clamp(0.0, 1.0),
            stochastic_detection: params.stochastic_detection,
            alert_review_cost: params.costs.alert_review_cost,
            false_positive_cost: params.costs.false_positive_friction * params.avg_ticket,
            chargeback_fee: params.costs.chargeback_fee,
        })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<PathOutcome> {
        let n_fraud = self
            .fraud_count
            .as_ref()
            .map_or(0, |d| d.sample(rng) as u64);

        let n_undetected = if self.stochastic_detection {
            if n_fraud == 0 {
                0
            } else {
                Binomial::new(n_fraud, self.undetected_share)
                    .map_err(|e| SimError::InvalidDistribution {
                        distribution: "binomial detection",
                        reason: e.to_string(),
                    })?
                    .sample(rng)
            }
        } else {
            (n_fraud as f64 * self.undetected_share) as u64
        };

        let loss: f64 = (0..n_undetected).map(|_| self.severity.sample(rng)).sum();

        let n_false_positives = self
            .false_positives
            .as_ref()
            .map_or(0, |d| d.sample(rng) as u64);

        let detected = n_fraud - n_undetected;
        let net_impact = loss
            + self.chargeback_fee * n_undetected as f64
            + self.alert_review_cost * (detected + n_false_positives) as f64
            + self.false_positive_cost * n_false_positives as f64;

        Ok(PathOutcome {
            n_fraud,
            n_undetected,
            n_false_positives,
            loss,
            net_impact,
        })
    }
}

fn run_batch(
    sampler: &PathSampler,
    batch_seed: u64,
    batch_size: usize,
    progress: Option<&SimulationProgress>,
) -> Result<Vec<PathOutcome>> {
    if progress.is_some_and(SimulationProgress::is_cancelled) {
        return Err(SimError::Cancelled);
    }

    let mut batch_rng = SmallRng::seed_from_u64(batch_seed);
    let outcomes = (0..batch_size)
        .map(|_| {
            let mut path_rng = SmallRng::seed_from_u64(batch_rng.next_u64());
            sampler.sample(&mut path_rng)
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(progress) = progress {
        progress.add(batch_size);
    }
    Ok(outcomes)
}

/// Run `n_paths` Monte Carlo paths for `params`.
///
/// The result depends only on `params`, `seed` and `n_paths`; it is identical with
/// or without the `parallel` feature.
pub fn run_monte_carlo(
    params: &ScenarioParams,
    seed: u64,
    n_paths: usize,
) -> Result<SimulationResult> {
    run_monte_carlo_inner(params, seed, n_paths, None)
}

/// [`run_monte_carlo`] reporting completed paths and honouring cancellation
pub fn run_monte_carlo_with_progress(
    params: &ScenarioParams,
    seed: u64,
    n_paths: usize,
    progress: &SimulationProgress,
) -> Result<SimulationResult> {
    run_monte_carlo_inner(params, seed, n_paths, Some(progress))
}

pub(crate) fn run_monte_carlo_inner(
    params: &ScenarioParams,
    seed: u64,
    n_paths: usize,
    progress: Option<&SimulationProgress>,
) -> Result<SimulationResult> {
    if n_paths == 0 {
        return Err(SimError::config("n_paths", "must be at least 1"));
    }
    let sampler = PathSampler::new(params)?;

    let num_batches = n_paths.div_ceil(MAX_BATCH_SIZE);
    let mut master = SmallRng::seed_from_u64(seed);
    let batch_seeds: Vec<u64> = (0..num_batches).map(|_| master.next_u64()).collect();
    let batch_size = |i: usize| {
        if i == num_batches - 1 {
            n_paths - i * MAX_BATCH_SIZE
        } else {
            MAX_BATCH_SIZE
        }
    };

    tracing::debug!(n_paths, num_batches, seed, "running monte carlo");

    #[cfg(feature = "parallel")]
    let batches: Vec<Vec<PathOutcome>> = (0..num_batches)
        .into_par_iter()
        .map(|i| run_batch(&sampler, batch_seeds[i], batch_size(i), progress))
        .collect::<Result<_>>()?;

    #[cfg(not(feature = "parallel"))]
    let batches: Vec<Vec<PathOutcome>> = (0..num_batches)
        .map(|i| run_batch(&sampler, batch_seeds[i], batch_size(i), progress))
        .collect::<Result<_>>()?;

    let outcomes: Vec<PathOutcome> = batches.into_iter().flatten().collect();
    let result = SimulationResult::from_outcomes(&outcomes);

    tracing::debug!(
        mean_loss = result.mean_loss,
        var_95 = result.var_95,
        "monte carlo complete"
    );
    Ok(result)
}
