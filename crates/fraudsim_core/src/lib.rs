//! Fraud risk simulation library
//!
//! This crate provides a Monte Carlo engine estimating the financial outcome of a
//! fraud-detection programme. It supports:
//! - Poisson fraud arrivals with lognormal loss severity
//! - Detection given as fixed rates or derived from model quality (AUC) and a threshold
//! - Operating costs of alerts, false positives and chargebacks (net impact)
//! - Expected loss, VaR/CVaR at 95% and 99%, budget breach probability
//! - Baseline and stress scenarios
//! - Tornado sensitivity, threshold curves and Latin-hypercube uncertainty analysis
//!
//! # Example
//!
//! ```ignore
//! use fraudsim_core::{SimConfig, make_baseline, run_monte_carlo, kpis};
//!
//! let cfg = SimConfig::default();
//! let params = make_baseline(&cfg)?;
//! let result = run_monte_carlo(&params, cfg.seed, cfg.n_paths)?;
//! let k = kpis(&result, params.horizon_budget());
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod detection;
pub mod error;
pub mod metrics;
pub mod sensitivity;
pub mod simulation;
pub mod threshold;
pub mod uncertainty;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod scenarios;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{CostModel, ModelQuality, SimConfig};
pub use error::SimError;
pub use metrics::{Histogram, Kpis, RiskMeasures, kpis};
pub use scenarios::{
    Driver, LhsSample, ParamRange, ScenarioParams, StressFactors, lhs_samples, make_baseline,
    make_stress,
};
pub use sensitivity::{
    DEFAULT_DRIVERS, Tornado, TornadoBar, TornadoMetric, tornado_data, tornado_data_with_progress,
};
pub use simulation::{
    SimulationProgress, SimulationResult, run_monte_carlo, run_monte_carlo_with_progress,
};
pub use threshold::{
    ThresholdCurve, ThresholdPoint, default_thresholds, threshold_curve,
    threshold_curve_with_progress,
};
pub use uncertainty::{
    UncertaintyResult, default_ranges, run_uncertainty, run_uncertainty_with_progress,
};
