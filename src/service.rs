//! Request-level operations over the process-wide artifacts.
//!
//! Every call is a pure function of its input and the read-only [`ArtifactSet`];
//! the service can be shared across threads behind an `Arc` without locking.

use crate::artifacts::ArtifactSet;
use crate::config::AppConfig;
use crate::difficulty::DifficultyRecord;
use crate::error::{InsightError, Result};
use crate::events::Event;
use crate::features::{FeatureMatrix, FEATURE_SCHEMA};
use crate::risk::{PredictionResult, RiskEngine};
use serde::Serialize;
use tracing::{debug, info_span};
use uuid::Uuid;

/// Readiness and model description; always available.
#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub message: String,
    pub model_type: String,
    pub features_used: Vec<&'static str>,
    pub schema_version: u32,
    pub version: &'static str,
    pub predict_ready: bool,
    pub difficulty_ready: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<String>,
}

pub struct InsightService {
    artifacts: ArtifactSet,
}

impl InsightService {
    pub fn new(artifacts: ArtifactSet) -> Self {
        Self { artifacts }
    }

    /// Load artifacts from `config.artifacts_dir`; missing ones leave the service degraded.
    pub fn load(config: &AppConfig) -> Self {
        Self::new(ArtifactSet::load(config))
    }

    pub fn artifacts(&self) -> &ArtifactSet {
        &self.artifacts
    }

    /// One result per distinct student, ascending `student_id`.
    pub fn predict(&self, events: &[Event]) -> Result<Vec<PredictionResult>> {
        let span = info_span!("predict", batch_id = %Uuid::new_v4(), rows = events.len());
        let _enter = span.enter();

        let classifier = self.artifacts.classifier.get_or_fail()?;
        let scaler = self.artifacts.scaler.get_or_fail()?;

        let matrix = FeatureMatrix::from_events(events, &FEATURE_SCHEMA)?;
        if matrix.is_empty() {
            return Ok(Vec::new());
        }
        let scaled = scaler.transform(matrix.values.view())?;
        let predictions = classifier.predict(scaled.view())?;
        if predictions.len() != matrix.n_rows() {
            return Err(InsightError::computation(format!(
                "{} predictions for {} students",
                predictions.len(),
                matrix.n_rows()
            )));
        }

        let results: Vec<PredictionResult> = matrix
            .student_ids
            .iter()
            .zip(predictions.labels.iter().zip(&predictions.probabilities))
            .map(|(&id, (&label, &p))| RiskEngine::assess(id, p, label))
            .collect();
        debug!(students = results.len(), "batch scored");
        Ok(results)
    }

    /// Precomputed difficulty table; independent of the classifier.
    pub fn difficulty(&self) -> Result<&[DifficultyRecord]> {
        Ok(self.artifacts.difficulty.get_or_fail()?.as_slice())
    }

    pub fn insights(&self) -> Insights {
        let a = &self.artifacts;
        let model_type = match a.classifier.get_or_fail() {
            Ok(c) => c.kind().to_string(),
            Err(_) => "unavailable".to_string(),
        };
        let unavailable = [
            (a.classifier.name(), a.classifier.reason()),
            (a.scaler.name(), a.scaler.reason()),
            (a.difficulty.name(), a.difficulty.reason()),
        ]
        .into_iter()
        .filter_map(|(name, reason)| reason.map(|r| format!("{}: {}", name, r)))
        .collect();

        Insights {
            message: "Learning intelligence service is active.".to_string(),
            model_type,
            features_used: FEATURE_SCHEMA.names(),
            schema_version: FEATURE_SCHEMA.version,
            version: env!("CARGO_PKG_VERSION"),
            predict_ready: a.classifier.is_ready() && a.scaler.is_ready(),
            difficulty_ready: a.difficulty.is_ready(),
            unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogisticClassifier;
    use crate::risk::RiskLevel;
    use crate::scaler::StandardScaler;

    fn scenario() -> Vec<Event> {
        vec![
            Event::new(2, "C101", 1, 5.0, 40.0),
            Event::new(1, "C101", 1, 10.0, 80.0),
            Event::new(1, "C101", 2, 12.0, 85.0),
            Event::new(1, "C101", 3, 11.0, 90.0),
        ]
    }

    fn service() -> InsightService {
        let matrix = FeatureMatrix::from_events(&scenario(), &FEATURE_SCHEMA).unwrap();
        let scaler = StandardScaler::fit(matrix.values.view(), &FEATURE_SCHEMA).unwrap();
        let mut weights = vec![0.0; FEATURE_SCHEMA.len()];
        weights[0] = 1.5;
        let classifier = LogisticClassifier::new(weights, 0.0, &FEATURE_SCHEMA);
        InsightService::new(ArtifactSet::from_parts(Box::new(classifier), scaler, Vec::new()))
    }

    #[test]
    fn predicts_one_result_per_student_in_id_order() {
        let results = service().predict(&scenario()).unwrap();
        assert_eq!(results.iter().map(|r| r.student_id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(results[0].completion_probability >= results[1].completion_probability);
        assert_eq!(results[0].risk_level, RiskLevel::Low);
        assert_eq!(results[1].risk_level, RiskLevel::High);
        assert!(results[0].predicted_completion);
        assert!(!results[1].predicted_completion);
    }

    #[test]
    fn empty_batch_yields_no_results() {
        assert!(service().predict(&[]).unwrap().is_empty());
    }

    #[test]
    fn degraded_service_fails_each_operation_independently() {
        let s = InsightService::new(ArtifactSet::empty("not trained"));
        let err = s.predict(&scenario()).unwrap_err();
        assert_eq!(err.status_code(), 503);
        assert_eq!(s.difficulty().unwrap_err().status_code(), 503);
        let insights = s.insights();
        assert_eq!(insights.model_type, "unavailable");
        assert!(!insights.predict_ready);
        assert_eq!(insights.unavailable.len(), 3);
    }

    #[test]
    fn difficulty_available_without_classifier() {
        use crate::artifacts::Artifact;
        let mut artifacts = ArtifactSet::empty("not trained");
        artifacts.difficulty = Artifact::ready(
            "difficulty table",
            crate::difficulty::score(&scenario()),
        );
        let s = InsightService::new(artifacts);
        assert_eq!(s.difficulty().unwrap().len(), 3);
        assert!(s.predict(&scenario()).is_err());
        assert!(s.insights().difficulty_ready);
    }

    #[test]
    fn service_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InsightService>();

        let shared = std::sync::Arc::new(service());
        let expected = shared.predict(&scenario()).unwrap();
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let s = std::sync::Arc::clone(&shared);
                std::thread::spawn(move || s.predict(&scenario()).unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    }

    #[test]
    fn bad_input_is_client_error() {
        let bad = vec![Event::new(1, "C101", 1, -3.0, 50.0)];
        assert_eq!(service().predict(&bad).unwrap_err().status_code(), 400);
    }
}
