//! ONNX Runtime adapter for classifiers exported from other toolchains.
//! Input: [n, feature_dim] f32. Outputs: `label` (int64, [n]) and
//! `probabilities` (float, [n, 2]); column 1 is the completion probability.

use super::{check_output, check_width, CompletionClassifier, Predictions};
use crate::error::{InsightError, Result};
use ndarray::{ArrayView2, CowArray, Ix2};
use ort::{Environment, GraphOptimizationLevel, Session, SessionBuilder, Value};
use std::path::Path;
use std::sync::{Arc, OnceLock};

static ORT_ENV: OnceLock<Arc<Environment>> = OnceLock::new();

fn environment() -> Result<Arc<Environment>> {
    if let Some(env) = ORT_ENV.get() {
        return Ok(env.clone());
    }
    let env = Environment::builder()
        .with_name("learning-intel")
        .build()
        .map_err(|e| InsightError::unavailable("classifier", format!("ONNX runtime: {}", e)))?
        .into_arc();
    Ok(ORT_ENV.get_or_init(|| env).clone())
}

pub struct OnnxClassifier {
    session: Session,
    feature_dim: usize,
}

impl OnnxClassifier {
    pub fn load(path: &Path, feature_dim: usize) -> Result<Self> {
        let env = environment()?;
        let session = SessionBuilder::new(&env)
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level1))
            .and_then(|b| b.with_model_from_file(path))
            .map_err(|e| {
                InsightError::unavailable("classifier", format!("{}: {}", path.display(), e))
            })?;
        if session.outputs.len() < 2 {
            return Err(InsightError::unavailable(
                "classifier",
                format!(
                    "{} exposes {} outputs, expected label and probabilities",
                    path.display(),
                    session.outputs.len()
                ),
            ));
        }
        tracing::info!(path = %path.display(), feature_dim, "ONNX classifier loaded");
        Ok(Self {
            session,
            feature_dim,
        })
    }
}

impl CompletionClassifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "ONNX Classifier"
    }

    fn n_features(&self) -> usize {
        self.feature_dim
    }

    fn predict(&self, scaled: ArrayView2<'_, f64>) -> Result<Predictions> {
        check_width(self, &scaled)?;
        let rows = scaled.nrows();
        if rows == 0 {
            return Ok(Predictions {
                labels: Vec::new(),
                probabilities: Vec::new(),
            });
        }
        let run_err = |e: ort::OrtError| InsightError::computation(format!("ONNX inference: {}", e));

        let input = CowArray::from(scaled.mapv(|v| v as f32).into_dyn());
        let value = Value::from_array(self.session.allocator(), &input).map_err(run_err)?;
        let outputs = self.session.run(vec![value]).map_err(run_err)?;

        let labels = outputs[0].try_extract::<i64>().map_err(run_err)?;
        let probabilities = outputs[1].try_extract::<f32>().map_err(run_err)?;
        let labels = labels.view();
        let probabilities = probabilities.view();
        let shape = probabilities.shape().to_vec();
        let probabilities = probabilities
            .into_dimensionality::<Ix2>()
            .ok()
            .filter(|p| p.ncols() >= 2)
            .ok_or_else(|| {
                InsightError::computation(format!("unexpected probabilities shape {:?}", shape))
            })?;

        let predictions = Predictions {
            labels: labels.iter().map(|&l| l == 1).collect(),
            probabilities: probabilities.column(1).iter().map(|&p| f64::from(p)).collect(),
        };
        check_output(&predictions, rows)?;
        Ok(predictions)
    }
}
