//! On-disk artifact layout with a SHA-256 manifest.

use crate::config::ClassifierKind;
use crate::difficulty::{self, DifficultyRecord};
use crate::error::{InsightError, Result};
use crate::features::{hex, FEATURE_SCHEMA};
use crate::scaler::ScalerParams;
use crate::training::EvaluationReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SCALER_FILE: &str = "scaler.json";
pub const DIFFICULTY_FILE: &str = "difficulty_stats.csv";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Written last by training; describes what was produced and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,
    pub schema_fingerprint: String,
    pub features: Vec<String>,
    pub model_kind: ClassifierKind,
    pub trained_at: DateTime<Utc>,
    /// File name → SHA-256 (hex)
    pub checksums: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<EvaluationReport>,
}

impl Manifest {
    pub fn new(model_kind: ClassifierKind, report: Option<EvaluationReport>) -> Self {
        Self {
            schema_version: FEATURE_SCHEMA.version,
            schema_fingerprint: FEATURE_SCHEMA.fingerprint(),
            features: FEATURE_SCHEMA.names().into_iter().map(String::from).collect(),
            model_kind,
            trained_at: Utc::now(),
            checksums: BTreeMap::new(),
            report,
        }
    }
}

pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    pub fn create_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn checksum(&self, file: &str) -> Result<String> {
        let bytes = std::fs::read(self.path(file))?;
        Ok(hex(&Sha256::digest(&bytes)))
    }

    /// Compare a file against the manifest; files the manifest does not list pass.
    pub fn verify(&self, manifest: &Manifest, file: &str) -> Result<()> {
        let Some(expected) = manifest.checksums.get(file) else {
            return Ok(());
        };
        if !self.path(file).exists() {
            return Err(InsightError::unavailable(
                "artifact",
                format!("{} not found", self.path(file).display()),
            ));
        }
        let actual = self.checksum(file)?;
        if &actual != expected {
            return Err(InsightError::unavailable(
                "artifact",
                format!("{} checksum mismatch (manifest {}, file {})", file, expected, actual),
            ));
        }
        Ok(())
    }

    pub fn save_scaler(&self, params: &ScalerParams) -> Result<()> {
        std::fs::write(self.path(SCALER_FILE), serde_json::to_string_pretty(params)?)?;
        Ok(())
    }

    pub fn load_scaler(&self) -> Result<ScalerParams> {
        let path = self.path(SCALER_FILE);
        if !path.exists() {
            return Err(InsightError::unavailable("scaler", format!("{} not found", path.display())));
        }
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }

    pub fn save_difficulty(&self, records: &[DifficultyRecord]) -> Result<()> {
        difficulty::write_table(records, std::fs::File::create(self.path(DIFFICULTY_FILE))?)
    }

    pub fn load_difficulty(&self) -> Result<Vec<DifficultyRecord>> {
        let path = self.path(DIFFICULTY_FILE);
        if !path.exists() {
            return Err(InsightError::unavailable(
                "difficulty table",
                format!("{} not found", path.display()),
            ));
        }
        difficulty::read_table(std::fs::File::open(path)?)
    }

    pub fn save_manifest(&self, manifest: &Manifest) -> Result<()> {
        std::fs::write(self.path(MANIFEST_FILE), serde_json::to_string_pretty(manifest)?)?;
        Ok(())
    }

    /// `Ok(None)` when no manifest was written (artifacts placed by hand).
    pub fn load_manifest(&self) -> Result<Option<Manifest>> {
        let path = self.path(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&std::fs::read_to_string(path)?)?))
    }
}
