//! Fraud risk simulator front end
//!
//! Wraps `fraudsim_core` with:
//! - YAML settings files and command-line overrides
//! - The end-to-end analysis pipeline (baseline, stress, sensitivity, threshold, LHS)
//! - Report artifacts (Markdown, text charts, CSV, JSON)
//! - A terminal dashboard

// ============================================================================
// Modules
// ============================================================================

pub mod dashboard;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod settings;
pub mod util;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use logging::init_logging;
pub use pipeline::{RunArtifacts, Stage, run_pipeline, run_pipeline_with_progress, total_paths};
pub use report::{ReportError, write_report};
pub use settings::{Overrides, SettingsError, default_data_dir, default_settings_path};
