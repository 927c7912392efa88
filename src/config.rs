//! Application configuration. Artifacts are produced by `train` and read once at startup.

use crate::error::{InsightError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding classifier, scaler, difficulty table and manifest
    pub artifacts_dir: PathBuf,
    /// Completion classifier backend
    pub model: ModelConfig,
    /// Training pipeline parameters
    pub training: TrainingConfig,
    /// Synthetic data generator parameters
    pub synthetic: SyntheticConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    Logistic,
    Onnx,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub kind: ClassifierKind,
    /// Classifier file name inside `artifacts_dir`
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Share of students held out for evaluation, in [0, 1)
    pub test_fraction: f64,
    /// Seed for the train/test shuffle
    pub seed: u64,
    pub learning_rate: f64,
    pub epochs: usize,
    /// L2 penalty strength
    pub l2: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub students: u32,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("models"),
            model: ModelConfig::default(),
            training: TrainingConfig::default(),
            synthetic: SyntheticConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::Logistic,
            file: "completion_model.json".to_string(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            learning_rate: 0.1,
            epochs: 2000,
            l2: 1.0,
        }
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            students: 1000,
            seed: 42,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file if present; otherwise return defaults.
    /// A file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&data)
            .map_err(|e| InsightError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.training;
        if !(0.0..1.0).contains(&t.test_fraction) {
            return Err(InsightError::Config(format!(
                "training.test_fraction must be in [0, 1), got {}",
                t.test_fraction
            )));
        }
        if t.epochs == 0 {
            return Err(InsightError::Config("training.epochs must be > 0".into()));
        }
        if !(t.learning_rate > 0.0) {
            return Err(InsightError::Config(
                "training.learning_rate must be > 0".into(),
            ));
        }
        if !(t.l2 >= 0.0) {
            return Err(InsightError::Config("training.l2 must be >= 0".into()));
        }
        Ok(())
    }

    pub fn model_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.model.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let c = AppConfig::load(Path::new("does-not-exist.json")).unwrap();
        assert_eq!(c.model.kind, ClassifierKind::Logistic);
        assert_eq!(c.training.seed, 42);
        assert_eq!(c.model_path(), PathBuf::from("models/completion_model.json"));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"artifacts_dir":"out","log":{"json":false}}"#).unwrap();
        let c = AppConfig::load(&path).unwrap();
        assert_eq!(c.artifacts_dir, PathBuf::from("out"));
        assert!(!c.log.json);
        assert_eq!(c.log.level, "info");
        assert_eq!(c.training.epochs, 2000);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, InsightError::Config(_)));
    }

    #[test]
    fn rejects_out_of_range_test_fraction() {
        let mut c = AppConfig::default();
        c.training.test_fraction = 1.0;
        assert!(c.validate().is_err());
    }
}
