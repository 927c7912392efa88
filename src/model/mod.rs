//! Completion classifier adapters. The core only relies on the
//! [`CompletionClassifier`] contract; the algorithm behind it is opaque.

mod logistic;
#[cfg(feature = "onnx")]
mod onnx;

pub use logistic::{LogisticClassifier, LogisticTrainer};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

use crate::config::{AppConfig, ClassifierKind};
use crate::error::{InsightError, Result};
use ndarray::ArrayView2;

/// Labels and class-1 probabilities, one per input row, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Predictions {
    pub labels: Vec<bool>,
    pub probabilities: Vec<f64>,
}

impl Predictions {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Pre-trained binary classifier over scaled feature rows.
///
/// Implementations must be deterministic for identical input, total over any
/// well-formed row, and never mutate themselves while predicting.
pub trait CompletionClassifier: Send + Sync {
    /// Short name reported by the insights operation.
    fn kind(&self) -> &'static str;

    /// Number of feature columns expected.
    fn n_features(&self) -> usize;

    fn predict(&self, scaled: ArrayView2<'_, f64>) -> Result<Predictions>;
}

/// Checks shared by all adapters before and after delegating.
pub(crate) fn check_width(classifier: &dyn CompletionClassifier, scaled: &ArrayView2<'_, f64>) -> Result<()> {
    if scaled.ncols() != classifier.n_features() {
        return Err(InsightError::schema(format!(
            "{} expects {} features, got {}",
            classifier.kind(),
            classifier.n_features(),
            scaled.ncols()
        )));
    }
    Ok(())
}

pub(crate) fn check_output(predictions: &Predictions, rows: usize) -> Result<()> {
    if predictions.labels.len() != rows || predictions.probabilities.len() != rows {
        return Err(InsightError::computation(format!(
            "classifier returned {} labels / {} probabilities for {} rows",
            predictions.labels.len(),
            predictions.probabilities.len(),
            rows
        )));
    }
    if let Some(p) = predictions
        .probabilities
        .iter()
        .find(|p| !p.is_finite() || !(0.0..=1.0).contains(*p))
    {
        return Err(InsightError::computation(format!("probability {} outside [0, 1]", p)));
    }
    Ok(())
}

/// Load the configured classifier backend.
pub fn load_classifier(config: &AppConfig) -> Result<Box<dyn CompletionClassifier>> {
    let path = config.model_path();
    if !path.exists() {
        return Err(InsightError::unavailable(
            "classifier",
            format!("{} not found", path.display()),
        ));
    }
    match config.model.kind {
        ClassifierKind::Logistic => Ok(Box::new(LogisticClassifier::load(&path)?)),
        #[cfg(feature = "onnx")]
        ClassifierKind::Onnx => Ok(Box::new(OnnxClassifier::load(
            &path,
            crate::features::FEATURE_SCHEMA.len(),
        )?)),
        #[cfg(not(feature = "onnx"))]
        ClassifierKind::Onnx => Err(InsightError::unavailable(
            "classifier",
            "built without the `onnx` feature",
        )),
    }
}
