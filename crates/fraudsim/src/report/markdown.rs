//! Markdown report rendering.

use std::fmt::Write;

use fraudsim_core::{Kpis, ThresholdCurve, UncertaintyResult};

use crate::pipeline::RunArtifacts;
use crate::util::format::{format_number, format_percentage, title_case};

/// Render the full report. `histogram` and `tornado` are the text charts.
pub fn render_markdown(artifacts: &RunArtifacts, histogram: &str, tornado: &str) -> String {
    let mut md = String::new();

    md.push_str("# Fraud Risk Simulation Report\n\n");

    md.push_str("## Key Performance Indicators\n\n");
    push_kpis(&mut md, &artifacts.baseline_kpis);

    md.push_str("\n## Distribution\n\n");
    push_code_block(&mut md, histogram);

    md.push_str("\n## Stress Scenario\n\n");
    push_stress_table(&mut md, &artifacts.baseline_kpis, &artifacts.stress_kpis);

    md.push_str("\n## Sensitivity\n\n");
    push_code_block(&mut md, tornado);

    if let Some(curve) = &artifacts.threshold {
        md.push_str("\n## Threshold Curve\n\n");
        push_threshold_table(&mut md, curve);
    }

    if let Some(uncertainty) = &artifacts.uncertainty {
        md.push_str("\n## Parameter Uncertainty\n\n");
        push_uncertainty(&mut md, uncertainty);
    }

    md.push_str("\n## Inputs\n\n");
    for (key, value) in artifacts.baseline.entries() {
        let _ = writeln!(md, "- {key}: {value}");
    }
    let _ = writeln!(md, "- n_paths: {}", artifacts.config.n_paths);
    let _ = writeln!(md, "- seed: {}", artifacts.config.seed);
    if let Some(quality) = &artifacts.config.model_quality {
        let _ = writeln!(md, "- model_auc: {}", quality.auc);
        let _ = writeln!(md, "- model_threshold: {}", quality.threshold);
    }

    md
}

fn push_kpis(md: &mut String, kpis: &Kpis) {
    for (key, value) in kpis.entries() {
        let _ = writeln!(md, "- **{}**: {}", title_case(key), format_number(value));
    }
}

fn push_code_block(md: &mut String, body: &str) {
    md.push_str("```text\n");
    md.push_str(body);
    if !body.ends_with('\n') {
        md.push('\n');
    }
    md.push_str("```\n");
}

fn push_stress_table(md: &mut String, baseline: &Kpis, stress: &Kpis) {
    md.push_str("| KPI | Baseline | Stress | Change |\n");
    md.push_str("|-----|---------:|-------:|-------:|\n");
    for ((key, base), (_, stressed)) in baseline.entries().into_iter().zip(stress.entries()) {
        let change = if base != 0.0 {
            format_percentage(stressed / base - 1.0)
        } else {
            "n/a".to_string()
        };
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} |",
            title_case(key),
            format_number(base),
            format_number(stressed),
            change
        );
    }
}

fn push_threshold_table(md: &mut String, curve: &ThresholdCurve) {
    let _ = writeln!(md, "Model AUC {:.3}.\n", curve.auc);
    md.push_str(
        "| Threshold | Detection | False Positives | Expected Loss | Net Impact | VaR 95 |\n",
    );
    md.push_str("|----------:|----------:|----------------:|--------------:|-----------:|-------:|\n");

    let optimal = curve.optimal().map(|p| p.threshold);
    for point in &curve.points {
        let marker = if Some(point.threshold) == optimal {
            " **(optimal)**"
        } else {
            ""
        };
        let _ = writeln!(
            md,
            "| {:.2}{} | {} | {} | {} | {} | {} |",
            point.threshold,
            marker,
            format_percentage(point.detection_rate),
            format_percentage(point.false_positive_rate),
            format_number(point.expected_loss),
            format_number(point.expected_net_impact),
            format_number(point.var_95),
        );
    }
}

fn push_uncertainty(md: &mut String, result: &UncertaintyResult) {
    let _ = writeln!(
        md,
        "{} Latin-hypercube samples over:\n",
        result.samples.len()
    );
    for range in &result.ranges {
        let _ = writeln!(
            md,
            "- {}: {} to {}",
            range.driver.key(),
            range.low,
            range.high
        );
    }
    md.push('\n');
    for (p, value) in &result.expected_loss_percentiles {
        let _ = writeln!(
            md,
            "- **Expected Loss P{:.0}**: {}",
            p * 100.0,
            format_number(*value)
        );
    }
}
