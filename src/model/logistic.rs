//! L2-regularised logistic regression, trained by batch gradient descent.
//! Persisted as JSON alongside the schema fingerprint it was trained under.

use super::{check_output, check_width, CompletionClassifier, Predictions};
use crate::config::TrainingConfig;
use crate::error::{InsightError, Result};
use crate::features::FeatureSchema;
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DECISION_THRESHOLD: f64 = 0.5;

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    pub schema_fingerprint: String,
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LogisticClassifier {
    pub fn new(weights: Vec<f64>, intercept: f64, schema: &FeatureSchema) -> Self {
        Self {
            schema_fingerprint: schema.fingerprint(),
            weights,
            intercept,
        }
    }

    /// Load from JSON; rejects weights trained under a different feature schema.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&data)?;
        let schema = crate::features::FEATURE_SCHEMA;
        if model.schema_fingerprint != schema.fingerprint() || model.weights.len() != schema.len() {
            return Err(InsightError::unavailable(
                "classifier",
                format!(
                    "{} was trained under feature schema {}, expected v{} ({})",
                    path.display(),
                    model.schema_fingerprint,
                    schema.version,
                    schema.fingerprint()
                ),
            ));
        }
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn probability(&self, row: ArrayView1<'_, f64>) -> f64 {
        let z = row
            .iter()
            .zip(&self.weights)
            .fold(self.intercept, |acc, (x, w)| acc + x * w);
        sigmoid(z)
    }
}

impl CompletionClassifier for LogisticClassifier {
    fn kind(&self) -> &'static str {
        "Logistic Regression"
    }

    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn predict(&self, scaled: ArrayView2<'_, f64>) -> Result<Predictions> {
        check_width(self, &scaled)?;
        let probabilities: Vec<f64> = scaled.rows().into_iter().map(|r| self.probability(r)).collect();
        let predictions = Predictions {
            labels: probabilities.iter().map(|&p| p >= DECISION_THRESHOLD).collect(),
            probabilities,
        };
        check_output(&predictions, scaled.nrows())?;
        Ok(predictions)
    }
}

/// Gradient-descent trainer. Deterministic: weights start at zero.
#[derive(Debug, Clone)]
pub struct LogisticTrainer {
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2: f64,
}

impl From<&TrainingConfig> for LogisticTrainer {
    fn from(c: &TrainingConfig) -> Self {
        Self {
            learning_rate: c.learning_rate,
            epochs: c.epochs,
            l2: c.l2,
        }
    }
}

impl LogisticTrainer {
    pub fn fit(
        &self,
        x: ArrayView2<'_, f64>,
        y: &[bool],
        schema: &FeatureSchema,
    ) -> Result<LogisticClassifier> {
        let (n, d) = x.dim();
        if n == 0 {
            return Err(InsightError::computation("cannot train on zero rows"));
        }
        if y.len() != n {
            return Err(InsightError::computation(format!(
                "{} labels for {} rows",
                y.len(),
                n
            )));
        }
        if d != schema.len() {
            return Err(InsightError::schema(format!(
                "training matrix has {} columns, schema has {}",
                d,
                schema.len()
            )));
        }

        let target: Array1<f64> = y.iter().map(|&c| if c { 1.0 } else { 0.0 }).collect();
        let n_f = n as f64;
        let mut w = Array1::<f64>::zeros(d);
        let mut b = 0.0;

        for _ in 0..self.epochs {
            let z = x.dot(&w) + b;
            let err = z.mapv(sigmoid) - &target;
            let grad_w = x.t().dot(&err) / n_f + &w * (self.l2 / n_f);
            let grad_b = err.sum() / n_f;
            w = w - grad_w * self.learning_rate;
            b -= grad_b * self.learning_rate;
        }

        if !b.is_finite() || w.iter().any(|v| !v.is_finite()) {
            return Err(InsightError::computation("training diverged"));
        }
        Ok(LogisticClassifier::new(w.to_vec(), b, schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_SCHEMA;
    use ndarray::Array2;

    /// Class is decided by the sign of column 0.
    fn separable() -> (Array2<f64>, Vec<bool>) {
        let xs = [-2.0, -1.5, -1.0, -0.5, 0.5, 1.0, 1.5, 2.0];
        let x = Array2::from_shape_fn((xs.len(), FEATURE_SCHEMA.len()), |(i, j)| {
            if j == 0 { xs[i] } else { 0.0 }
        });
        let y = xs.iter().map(|&v| v > 0.0).collect();
        (x, y)
    }

    fn trainer() -> LogisticTrainer {
        LogisticTrainer { learning_rate: 0.5, epochs: 500, l2: 0.1 }
    }

    #[test]
    fn learns_separable_data() {
        let (x, y) = separable();
        let model = trainer().fit(x.view(), &y, &FEATURE_SCHEMA).unwrap();
        assert!(model.weights[0] > 0.0);
        let p = model.predict(x.view()).unwrap();
        assert_eq!(p.labels, y);
        assert!(p.probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn training_is_deterministic() {
        let (x, y) = separable();
        let a = trainer().fit(x.view(), &y, &FEATURE_SCHEMA).unwrap();
        let b = trainer().fit(x.view(), &y, &FEATURE_SCHEMA).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn probability_is_monotone_in_positive_weight() {
        let mut weights = vec![0.0; FEATURE_SCHEMA.len()];
        weights[0] = 1.2;
        let model = LogisticClassifier::new(weights, -0.1, &FEATURE_SCHEMA);
        let mut x = Array2::zeros((2, FEATURE_SCHEMA.len()));
        x[[0, 0]] = 1.0;
        x[[1, 0]] = -1.0;
        let p = model.predict(x.view()).unwrap();
        assert!(p.probabilities[0] > p.probabilities[1]);
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn rejects_wrong_width() {
        let model = LogisticClassifier::new(vec![0.0; FEATURE_SCHEMA.len()], 0.0, &FEATURE_SCHEMA);
        let x = Array2::<f64>::zeros((1, 3));
        assert!(matches!(model.predict(x.view()), Err(InsightError::Schema(_))));
    }

    #[test]
    fn save_and_load_preserve_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = LogisticClassifier::new(vec![0.25; FEATURE_SCHEMA.len()], -1.5, &FEATURE_SCHEMA);
        model.save(&path).unwrap();
        assert_eq!(LogisticClassifier::load(&path).unwrap(), model);
    }

    #[test]
    fn load_rejects_foreign_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut model = LogisticClassifier::new(vec![0.0; FEATURE_SCHEMA.len()], 0.0, &FEATURE_SCHEMA);
        model.schema_fingerprint = "0000".into();
        model.save(&path).unwrap();
        assert!(matches!(
            LogisticClassifier::load(&path),
            Err(InsightError::ModelUnavailable { .. })
        ));
    }
}
