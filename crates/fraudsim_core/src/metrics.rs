//! Risk measures and KPIs computed from simulated loss distributions.

use serde::{Deserialize, Serialize};

use crate::simulation::SimulationResult;

/// Quantile of `values` using linear interpolation between order statistics.
///
/// Returns 0.0 for an empty slice. `q` is clamped to [0, 1].
#[must_use]
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, q)
}

/// [`quantile`] on data that is already sorted ascending
#[must_use]
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Mean of the values at or above `threshold`; 0.0 when none qualify
#[must_use]
pub fn tail_mean(values: &[f64], threshold: f64) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|&&v| v >= threshold)
        .fold((0.0, 0usize), |(s, c), &v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// VaR and CVaR of a loss distribution at one confidence level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMeasures {
    pub confidence: f64,
    pub var: f64,
    pub cvar: f64,
}

impl RiskMeasures {
    #[must_use]
    pub fn at(losses: &[f64], confidence: f64) -> Self {
        let var = quantile(losses, confidence);
        Self {
            confidence,
            var,
            cvar: tail_mean(losses, var),
        }
    }
}

/// Headline indicators of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub expected_loss: f64,
    pub var_95: f64,
    pub cvar_95: f64,
    pub breach_prob: f64,
    pub var_99: f64,
    pub cvar_99: f64,
    pub expected_net_impact: f64,
}

impl Kpis {
    /// Ordered (key, value) pairs, loss measures first
    #[must_use]
    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("expected_loss", self.expected_loss),
            ("var_95", self.var_95),
            ("cvar_95", self.cvar_95),
            ("breach_prob", self.breach_prob),
            ("var_99", self.var_99),
            ("cvar_99", self.cvar_99),
            ("expected_net_impact", self.expected_net_impact),
        ]
    }
}

/// Compute KPIs for a run against a loss budget covering the whole horizon
#[must_use]
pub fn kpis(result: &SimulationResult, loss_budget: f64) -> Kpis {
    let losses = &result.losses;
    let breaches = losses.iter().filter(|&&l| l > loss_budget).count();
    let breach_prob = if losses.is_empty() {
        0.0
    } else {
        breaches as f64 / losses.len() as f64
    };
    let tail_99 = RiskMeasures::at(losses, 0.99);

    Kpis {
        expected_loss: result.mean_loss,
        var_95: result.var_95,
        cvar_95: result.cvar_95,
        breach_prob,
        var_99: tail_99.var,
        cvar_99: tail_99.cvar,
        expected_net_impact: result.mean_net_impact,
    }
}

/// Equal-width histogram over [min, max]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width buckets.
    ///
    /// A degenerate range (all values equal) puts everything in the first bin.
    #[must_use]
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let mut counts = vec![0; bins];
        if values.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                counts,
            };
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = (max - min) / bins as f64;

        for &v in values {
            let idx = if width > 0.0 {
                (((v - min) / width) as usize).min(bins - 1)
            } else {
                0
            };
            counts[idx] += 1;
        }

        Self { min, max, counts }
    }

    #[must_use]
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.counts.len() as f64
    }

    /// Lower edge of bin `i`
    #[must_use]
    pub fn bin_start(&self, i: usize) -> f64 {
        self.min + i as f64 * self.bin_width()
    }

    #[must_use]
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_matches_linear_interpolation() {
        let values = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(quantile(&values, 0.0), 1.0);
        assert_eq!(quantile(&values, 0.5), 3.0);
        assert_eq!(quantile(&values, 1.0), 5.0);
        // pos = 0.95 * 4 = 3.8 -> 4 + 0.8 * (5 - 4)
        assert!((quantile(&values, 0.95) - 4.8).abs() < 1e-12);
        assert!((quantile(&[10.0, 20.0], 0.25) - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_empty_is_zero() {
        assert_eq!(quantile(&[], 0.95), 0.0);
    }

    #[test]
    fn test_tail_mean() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(tail_mean(&values, 3.0), 3.5);
        assert_eq!(tail_mean(&values, 10.0), 0.0);
    }

    #[test]
    fn test_risk_measures_ordering() {
        let losses: Vec<f64> = (0..1000).map(|i| (i as f64).powf(1.3)).collect();
        let r95 = RiskMeasures::at(&losses, 0.95);
        let r99 = RiskMeasures::at(&losses, 0.99);
        assert!(r95.cvar >= r95.var);
        assert!(r99.var >= r95.var);
        assert!(r99.cvar >= r95.cvar);
    }

    #[test]
    fn test_kpis_breach_is_strict() {
        let result = SimulationResult {
            losses: vec![100.0, 200.0, 300.0, 400.0],
            net_impacts: vec![110.0, 210.0, 310.0, 410.0],
            mean_loss: 250.0,
            var_95: 385.0,
            cvar_95: 400.0,
            mean_net_impact: 260.0,
            n_fraud_mean: 0.0,
            n_undetected_mean: 0.0,
            n_false_positive_mean: 0.0,
        };
        let k = kpis(&result, 300.0);
        assert_eq!(k.breach_prob, 0.25);
        assert_eq!(k.expected_loss, 250.0);
        assert_eq!(k.expected_net_impact, 260.0);
        assert_eq!(k.entries()[0], ("expected_loss", 250.0));
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let hist = Histogram::from_values(&values, 10);
        assert_eq!(hist.counts, vec![10; 10]);
        assert_eq!(hist.total(), 100);
        assert_eq!(hist.bin_start(0), 0.0);
    }

    #[test]
    fn test_histogram_degenerate_range() {
        let hist = Histogram::from_values(&[5.0; 8], 4);
        assert_eq!(hist.counts, vec![8, 0, 0, 0]);
        let empty = Histogram::from_values(&[], 4);
        assert_eq!(empty.total(), 0);
    }
}
