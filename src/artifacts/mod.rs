//! Trained artifacts: classifier, scaler params, difficulty lookup table.
//!
//! Each is loaded once at startup into an [`Artifact`] slot. A slot that failed to
//! load keeps its reason, so every operation fails independently and predictably
//! instead of the process refusing to start.

mod slot;
mod store;

pub use slot::Artifact;
pub use store::{ArtifactStore, Manifest, DIFFICULTY_FILE, MANIFEST_FILE, SCALER_FILE};

use crate::config::AppConfig;
use crate::difficulty::DifficultyRecord;
use crate::error::{InsightError, Result};
use crate::features::FEATURE_SCHEMA;
use crate::model::{self, CompletionClassifier};
use crate::scaler::ScalerParams;

/// Process-wide, read-only after construction.
pub struct ArtifactSet {
    pub classifier: Artifact<Box<dyn CompletionClassifier>>,
    pub scaler: Artifact<ScalerParams>,
    pub difficulty: Artifact<Vec<DifficultyRecord>>,
    pub manifest: Option<Manifest>,
}

impl ArtifactSet {
    /// Never fails: each artifact that cannot be loaded is recorded as unavailable.
    pub fn load(config: &AppConfig) -> Self {
        let store = ArtifactStore::new(&config.artifacts_dir);
        let manifest = store.load_manifest();
        let verify = |file: &str| -> Result<()> {
            match &manifest {
                Ok(Some(m)) => store.verify(m, file),
                Ok(None) => Ok(()),
                Err(e) => Err(InsightError::Config(format!("manifest unreadable: {}", e))),
            }
        };

        let classifier = Artifact::from_result(
            "classifier",
            verify(&config.model.file).and_then(|_| model::load_classifier(config)),
        );
        let scaler = Artifact::from_result(
            "scaler",
            verify(SCALER_FILE).and_then(|_| {
                let params = store.load_scaler()?;
                params
                    .check_schema(&FEATURE_SCHEMA)
                    .map_err(|e| InsightError::unavailable("scaler", e.to_string()))?;
                Ok(params)
            }),
        );
        let difficulty = Artifact::from_result(
            "difficulty table",
            verify(DIFFICULTY_FILE).and_then(|_| store.load_difficulty()),
        );

        Self {
            classifier,
            scaler,
            difficulty,
            manifest: manifest.ok().flatten(),
        }
    }

    /// Build from values already in memory (tests, freshly trained models).
    pub fn from_parts(
        classifier: Box<dyn CompletionClassifier>,
        scaler: ScalerParams,
        difficulty: Vec<DifficultyRecord>,
    ) -> Self {
        Self {
            classifier: Artifact::ready("classifier", classifier),
            scaler: Artifact::ready("scaler", scaler),
            difficulty: Artifact::ready("difficulty table", difficulty),
            manifest: None,
        }
    }

    pub fn empty(reason: &str) -> Self {
        Self {
            classifier: Artifact::unavailable("classifier", reason),
            scaler: Artifact::unavailable("scaler", reason),
            difficulty: Artifact::unavailable("difficulty table", reason),
            manifest: None,
        }
    }
}
