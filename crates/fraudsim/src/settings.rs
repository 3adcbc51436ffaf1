//! Settings file handling.
//!
//! A settings file is a YAML document holding a [`SimConfig`]. Missing fields fall
//! back to their defaults, so a file may contain only the knobs that differ:
//!
//! ```yaml
//! base_fraud_rate: 0.006
//! model_quality:
//!   auc: 0.92
//!   threshold: 1.25
//! costs:
//!   chargeback_fee: 20.0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use fraudsim_core::SimConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize settings: {0}")]
    Serialize(String),
}

/// Default settings file location (~/.fraudsim/settings.yaml)
pub fn default_settings_path() -> PathBuf {
    default_data_dir().join("settings.yaml")
}

/// Default data directory (~/.fraudsim/)
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fraudsim")
}

pub fn from_yaml(yaml: &str) -> Result<SimConfig, serde_saphyr::Error> {
    serde_saphyr::from_str(yaml)
}

pub fn to_yaml(config: &SimConfig) -> Result<String, SettingsError> {
    serde_saphyr::to_string(config).map_err(|e| SettingsError::Serialize(e.to_string()))
}

/// Load a settings file
pub fn load_settings(path: &Path) -> Result<SimConfig, SettingsError> {
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = from_yaml(&content).map_err(|e| SettingsError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    tracing::info!(path = %path.display(), "loaded settings");
    Ok(config)
}

/// Write `config` as YAML, creating parent directories as needed
pub fn save_settings(path: &Path, config: &SimConfig) -> Result<(), SettingsError> {
    let io_err = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, to_yaml(config)?).map_err(io_err)?;
    tracing::info!(path = %path.display(), "saved settings");
    Ok(())
}

/// Command-line overrides layered on top of a settings file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub n_paths: Option<usize>,
    pub seed: Option<u64>,
    pub base_fraud_rate: Option<f64>,
    pub detection_rate: Option<f64>,
    pub auc: Option<f64>,
    pub threshold: Option<f64>,
    pub horizon_months: Option<u32>,
}

impl Overrides {
    pub fn apply(&self, config: &mut SimConfig) {
        if let Some(n) = self.n_paths {
            config.n_paths = n;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(rate) = self.base_fraud_rate {
            config.base_fraud_rate = rate;
        }
        if let Some(rate) = self.detection_rate {
            config.detection_rate = rate;
        }
        if let Some(months) = self.horizon_months {
            config.horizon_months = months;
        }

        // Either model-quality knob enables the scored detection model
        if self.auc.is_some() || self.threshold.is_some() {
            let mut quality = config.model_quality.unwrap_or_default();
            if let Some(auc) = self.auc {
                quality.auc = auc;
            }
            if let Some(threshold) = self.threshold {
                quality.threshold = threshold;
            }
            config.model_quality = Some(quality);
        }
    }
}

/// Load the settings file if one is given, then apply overrides
pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<SimConfig, SettingsError> {
    let mut config = match path {
        Some(path) => load_settings(path)?,
        None => SimConfig::default(),
    };
    overrides.apply(&mut config);
    Ok(config)
}
