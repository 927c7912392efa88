//! labelled events → features → split → scaler → classifier → evaluation,
//! plus the difficulty table over the full batch.

use super::metrics::{evaluate, EvaluatedOn, EvaluationReport};
use super::split::train_test_split;
use crate::artifacts::{ArtifactStore, Manifest, DIFFICULTY_FILE, SCALER_FILE};
use crate::config::{AppConfig, ClassifierKind, TrainingConfig};
use crate::difficulty::{self, DifficultyRecord};
use crate::error::{InsightError, Result};
use crate::events::{Event, LabelledEvent};
use crate::features::{FeatureMatrix, FEATURE_SCHEMA};
use crate::model::{CompletionClassifier, LogisticClassifier, LogisticTrainer};
use crate::scaler::{ScalerParams, StandardScaler};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub students: usize,
    pub train_students: usize,
    pub test_students: usize,
    pub completed_share: f64,
    pub difficulty_records: usize,
    pub evaluation: EvaluationReport,
}

pub struct TrainedArtifacts {
    pub classifier: LogisticClassifier,
    pub scaler: ScalerParams,
    pub difficulty: Vec<DifficultyRecord>,
    pub report: TrainingReport,
}

/// Label of each student is the `completed` value on its first row.
fn student_labels(rows: &[LabelledEvent]) -> BTreeMap<i64, bool> {
    let mut labels = BTreeMap::new();
    for r in rows {
        labels.entry(r.event.student_id).or_insert(r.completed);
    }
    labels
}

pub fn train(rows: &[LabelledEvent], config: &TrainingConfig) -> Result<TrainedArtifacts> {
    if rows.is_empty() {
        return Err(InsightError::schema("training batch contains no rows"));
    }
    let events: Vec<Event> = rows.iter().map(|r| r.event.clone()).collect();
    let matrix = FeatureMatrix::from_events(&events, &FEATURE_SCHEMA)?;
    let labels = student_labels(rows);
    let y: Vec<bool> = matrix.student_ids.iter().map(|id| labels[id]).collect();
    info!(
        rows = rows.len(),
        students = matrix.n_rows(),
        features = FEATURE_SCHEMA.len(),
        "aggregated training features"
    );

    let (train_idx, test_idx) = train_test_split(matrix.n_rows(), config.test_fraction, config.seed);
    let train_m = matrix.select(&train_idx);
    let train_y: Vec<bool> = train_idx.iter().map(|&i| y[i]).collect();

    let scaler = StandardScaler::fit(train_m.values.view(), &FEATURE_SCHEMA)?;
    let train_x = scaler.transform(train_m.values.view())?;

    let classifier = LogisticTrainer::from(config).fit(train_x.view(), &train_y, &FEATURE_SCHEMA)?;
    info!(
        epochs = config.epochs,
        intercept = classifier.intercept,
        "completion classifier trained"
    );

    let (eval_x, eval_y, evaluated_on) = if test_idx.is_empty() {
        (train_x, train_y.clone(), EvaluatedOn::Train)
    } else {
        let test_m = matrix.select(&test_idx);
        let test_y = test_idx.iter().map(|&i| y[i]).collect();
        (scaler.transform(test_m.values.view())?, test_y, EvaluatedOn::Test)
    };
    let predicted = classifier.predict(eval_x.view())?;
    let evaluation = evaluate(&eval_y, &predicted.labels, evaluated_on);
    info!(accuracy = evaluation.accuracy, evaluated_on = ?evaluated_on, "completion classifier evaluated");

    let difficulty = difficulty::score(&events);
    info!(records = difficulty.len(), "chapter difficulty computed");

    let report = TrainingReport {
        students: matrix.n_rows(),
        train_students: train_idx.len(),
        test_students: test_idx.len(),
        completed_share: y.iter().filter(|&&c| c).count() as f64 / y.len() as f64,
        difficulty_records: difficulty.len(),
        evaluation,
    };
    Ok(TrainedArtifacts {
        classifier,
        scaler,
        difficulty,
        report,
    })
}

/// Write classifier, scaler, difficulty table and manifest into `artifacts_dir`.
pub fn persist(trained: &TrainedArtifacts, config: &AppConfig) -> Result<Manifest> {
    if config.model.kind != ClassifierKind::Logistic {
        return Err(InsightError::Config(
            "training produces logistic models; set model.kind to \"logistic\"".into(),
        ));
    }
    let store = ArtifactStore::new(&config.artifacts_dir);
    store.create_dir()?;

    trained.classifier.save(&config.model_path())?;
    store.save_scaler(&trained.scaler)?;
    store.save_difficulty(&trained.difficulty)?;

    let mut manifest = Manifest::new(config.model.kind, Some(trained.report.evaluation.clone()));
    for file in [config.model.file.as_str(), SCALER_FILE, DIFFICULTY_FILE] {
        manifest.checksums.insert(file.to_string(), store.checksum(file)?);
    }
    store.save_manifest(&manifest)?;
    info!(dir = %store.dir().display(), "artifacts saved");
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyntheticConfig;
    use crate::events::generate;

    fn quick() -> TrainingConfig {
        TrainingConfig {
            epochs: 300,
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn trains_on_synthetic_cohort() {
        let rows = generate(&SyntheticConfig { students: 200, seed: 42 });
        let trained = train(&rows, &quick()).unwrap();
        let r = &trained.report;
        assert_eq!(r.students, 200);
        assert_eq!(r.train_students + r.test_students, 200);
        assert_eq!(r.test_students, 40);
        assert_eq!(r.evaluation.evaluated_on, EvaluatedOn::Test);
        assert!(r.evaluation.accuracy > 0.7, "accuracy {}", r.evaluation.accuracy);
        assert_eq!(trained.scaler.n_features(), FEATURE_SCHEMA.len());
        assert_eq!(r.difficulty_records, trained.difficulty.len());
        // score_mean drives completion in the generator
        assert!(trained.classifier.weights[0] > 0.0);
    }

    #[test]
    fn first_row_label_wins() {
        let rows = vec![
            LabelledEvent { event: Event::new(1, "C101", 1, 5.0, 50.0), completed: true },
            LabelledEvent { event: Event::new(1, "C101", 2, 5.0, 50.0), completed: false },
        ];
        assert_eq!(student_labels(&rows)[&1], true);
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert!(matches!(train(&[], &quick()), Err(InsightError::Schema(_))));
    }

    #[test]
    fn no_holdout_evaluates_on_train() {
        let rows = generate(&SyntheticConfig { students: 20, seed: 3 });
        let config = TrainingConfig { test_fraction: 0.0, ..quick() };
        let trained = train(&rows, &config).unwrap();
        assert_eq!(trained.report.test_students, 0);
        assert_eq!(trained.report.evaluation.evaluated_on, EvaluatedOn::Train);
    }

    #[test]
    fn persist_writes_checksummed_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            artifacts_dir: dir.path().join("models"),
            ..AppConfig::default()
        };
        let rows = generate(&SyntheticConfig { students: 30, seed: 9 });
        let trained = train(&rows, &quick()).unwrap();
        let manifest = persist(&trained, &config).unwrap();
        assert_eq!(manifest.checksums.len(), 3);
        assert_eq!(manifest.schema_fingerprint, FEATURE_SCHEMA.fingerprint());
        let store = ArtifactStore::new(&config.artifacts_dir);
        for file in manifest.checksums.keys() {
            store.verify(&manifest, file).unwrap();
        }
    }
}
