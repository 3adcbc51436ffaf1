//! Report artifacts written by `fraudsim run`.
//!
//! - `report.md` - KPIs, charts, stress comparison, sensitivity and inputs
//! - `loss_hist.txt` / `tornado.txt` - the text charts on their own
//! - `losses.csv` - per-path loss and net impact
//! - `summary.json` - machine-readable KPIs, tornado and threshold curve

pub mod charts;
pub mod markdown;

use std::fs;
use std::path::{Path, PathBuf};

use fraudsim_core::{Kpis, ThresholdCurve, Tornado};
use serde::Serialize;

use crate::pipeline::RunArtifacts;

pub use charts::{HISTOGRAM_BINS, text_histogram, text_tornado};
pub use markdown::render_markdown;

pub const REPORT_FILE: &str = "report.md";
pub const HISTOGRAM_FILE: &str = "loss_hist.txt";
pub const TORNADO_FILE: &str = "tornado.txt";
pub const LOSSES_FILE: &str = "losses.csv";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        ReportError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Serialization(err.to_string())
    }
}

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Serialize)]
struct LossRecord {
    path: usize,
    loss: f64,
    net_impact: f64,
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    n_paths: usize,
    seed: u64,
    kpis: &'a Kpis,
    stress_kpis: &'a Kpis,
    tornado: &'a Tornado,
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold_curve: Option<&'a ThresholdCurve>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_loss_percentiles: Option<&'a [(f64, f64)]>,
}

fn write_file(path: &Path, contents: &str) -> ReportResult<()> {
    fs::write(path, contents).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Per-path losses as CSV with a `path,loss,net_impact` header
pub fn write_losses_csv(path: &Path, artifacts: &RunArtifacts) -> ReportResult<()> {
    let result = &artifacts.baseline_result;
    let mut wtr = csv::Writer::from_path(path)?;
    for (i, (&loss, &net_impact)) in result.losses.iter().zip(&result.net_impacts).enumerate() {
        wtr.serialize(LossRecord {
            path: i,
            loss,
            net_impact,
        })?;
    }
    wtr.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

pub fn write_summary_json(path: &Path, artifacts: &RunArtifacts) -> ReportResult<()> {
    let summary = Summary {
        n_paths: artifacts.baseline_result.n_paths(),
        seed: artifacts.config.seed,
        kpis: &artifacts.baseline_kpis,
        stress_kpis: &artifacts.stress_kpis,
        tornado: &artifacts.tornado,
        threshold_curve: artifacts.threshold.as_ref(),
        expected_loss_percentiles: artifacts
            .uncertainty
            .as_ref()
            .map(|u| u.expected_loss_percentiles.as_slice()),
    };
    write_file(path, &serde_json::to_string_pretty(&summary)?)
}

/// Write every artifact into `out_dir`, creating it if needed.
///
/// Returns the path of the Markdown report.
pub fn write_report(artifacts: &RunArtifacts, out_dir: &Path) -> ReportResult<PathBuf> {
    fs::create_dir_all(out_dir).map_err(|source| ReportError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let histogram = text_histogram(
        &artifacts.baseline_result.losses,
        HISTOGRAM_BINS,
        "Loss distribution",
    );
    let tornado = text_tornado(&artifacts.tornado);

    write_file(&out_dir.join(HISTOGRAM_FILE), &histogram)?;
    write_file(&out_dir.join(TORNADO_FILE), &tornado)?;
    write_losses_csv(&out_dir.join(LOSSES_FILE), artifacts)?;
    write_summary_json(&out_dir.join(SUMMARY_FILE), artifacts)?;

    let report_path = out_dir.join(REPORT_FILE);
    write_file(
        &report_path,
        &render_markdown(artifacts, &histogram, &tornado),
    )?;

    tracing::info!(out_dir = %out_dir.display(), "report written");
    Ok(report_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run_pipeline;
    use fraudsim_core::{ModelQuality, SimConfig};

    fn small_artifacts(config: SimConfig, lhs_samples: usize) -> RunArtifacts {
        let config = SimConfig {
            n_paths: 300,
            sensitivity_paths: 150,
            ..config
        };
        run_pipeline(&config, lhs_samples).unwrap()
    }

    #[test]
    fn test_report_sections_in_order() {
        let artifacts = small_artifacts(SimConfig::default(), 0);
        let md = render_markdown(&artifacts, "hist\n", "tornado\n");

        let sections = [
            "# Fraud Risk Simulation Report",
            "## Key Performance Indicators",
            "## Distribution",
            "## Stress Scenario",
            "## Sensitivity",
            "## Inputs",
        ];
        let positions: Vec<usize> = sections
            .iter()
            .map(|s| md.find(s).unwrap_or_else(|| panic!("missing section {s}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(!md.contains("## Threshold Curve"));
        assert!(!md.contains("## Parameter Uncertainty"));
        assert!(md.contains("- **Expected Loss**: "));
        assert!(md.contains("- **Breach Prob**: "));
        assert!(md.contains("- base_fraud_rate: 0.004"));
    }

    #[test]
    fn test_optional_sections_present() {
        let config = SimConfig {
            model_quality: Some(ModelQuality::default()),
            ..Default::default()
        };
        let artifacts = small_artifacts(config, 3);
        let md = render_markdown(&artifacts, "", "");

        assert!(md.contains("## Threshold Curve"));
        assert_eq!(md.matches("**(optimal)**").count(), 1);
        assert!(md.contains("## Parameter Uncertainty"));
        assert!(md.contains("- **Expected Loss P50**: "));
    }

    #[test]
    fn test_write_report_creates_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let artifacts = small_artifacts(SimConfig::default(), 0);

        let report_path = write_report(&artifacts, &out_dir).unwrap();
        assert_eq!(report_path, out_dir.join(REPORT_FILE));

        for file in [REPORT_FILE, HISTOGRAM_FILE, TORNADO_FILE, LOSSES_FILE, SUMMARY_FILE] {
            assert!(out_dir.join(file).exists(), "{file} not written");
        }

        let csv = fs::read_to_string(out_dir.join(LOSSES_FILE)).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("path,loss,net_impact"));
        assert_eq!(lines.count(), 300);

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out_dir.join(SUMMARY_FILE)).unwrap())
                .unwrap();
        assert_eq!(summary["n_paths"], 300);
        assert!(summary["kpis"]["expected_loss"].as_f64().unwrap() > 0.0);
        assert_eq!(summary["tornado"]["bars"].as_array().unwrap().len(), 3);
        assert!(summary.get("threshold_curve").is_none());
    }
}
