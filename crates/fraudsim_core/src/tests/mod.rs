//! Integration tests for the fraud simulation engine
//!
//! Tests are organized by topic:
//! - `loss_distribution` - Statistical properties of simulated losses and KPIs
//! - `net_impact` - Operating cost accounting
//! - `scenario_pipeline` - Baseline/stress scenarios flowing through sensitivity analysis

mod net_impact;
