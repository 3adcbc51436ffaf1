//! Tests for operating cost accounting in the net impact

use crate::config::{CostModel, SimConfig};
use crate::scenarios::{ScenarioParams, make_baseline};
use crate::simulation::run_monte_carlo;

fn baseline() -> ScenarioParams {
    make_baseline(&SimConfig::default()).unwrap()
}

#[test]
fn test_zero_costs_net_impact_equals_loss() {
    let params = ScenarioParams {
        costs: CostModel::zero(),
        ..baseline()
    };
    let result = run_monte_carlo(&params, 42, 1_000).unwrap();

    assert_eq!(result.losses, result.net_impacts);
    assert_eq!(result.mean_loss, result.mean_net_impact);
}

#[test]
fn test_costs_add_to_loss() {
    let result = run_monte_carlo(&baseline(), 42, 1_000).unwrap();
    for (loss, net) in result.losses.iter().zip(&result.net_impacts) {
        assert!(net >= loss);
    }
    assert!(result.mean_net_impact > result.mean_loss);
}

#[test]
fn test_false_positive_volume() {
    let params = baseline();
    let result = run_monte_carlo(&params, 42, 2_000).unwrap();

    let expected = params.n_transactions as f64
        * (1.0 - params.base_fraud_rate)
        * params.false_positive_rate;
    assert!((result.n_false_positive_mean - expected).abs() / expected < 0.01);
}

#[test]
fn test_chargeback_fee_only() {
    let costs = CostModel {
        alert_review_cost: 0.0,
        false_positive_friction: 0.0,
        chargeback_fee: 10.0,
    };
    let params = ScenarioParams {
        costs,
        ..baseline()
    };
    let result = run_monte_carlo(&params, 5, 500).unwrap();

    let expected = result.mean_loss + 10.0 * result.n_undetected_mean;
    assert!((result.mean_net_impact - expected).abs() < 1e-6 * expected);
}
