//! Accuracy and per-class precision / recall / f1.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatedOn {
    /// Held-out rows
    Test,
    /// No rows were held out; metrics are optimistic
    Train,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub evaluated_on: EvaluatedOn,
    pub accuracy: f64,
    pub classes: Vec<ClassMetrics>,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn class_metrics(label: &str, positive: bool, truth: &[bool], predicted: &[bool]) -> ClassMetrics {
    let tp = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| **t == positive && **p == positive)
        .count();
    let predicted_pos = predicted.iter().filter(|&&p| p == positive).count();
    let support = truth.iter().filter(|&&t| t == positive).count();
    let precision = ratio(tp, predicted_pos);
    let recall = ratio(tp, support);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    ClassMetrics {
        label: label.to_string(),
        precision,
        recall,
        f1,
        support,
    }
}

/// Undefined ratios (no predicted or no actual members) report 0.0.
pub fn evaluate(truth: &[bool], predicted: &[bool], evaluated_on: EvaluatedOn) -> EvaluationReport {
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    EvaluationReport {
        evaluated_on,
        accuracy: ratio(correct, truth.len()),
        classes: vec![
            class_metrics("not_completed", false, truth, predicted),
            class_metrics("completed", true, truth, predicted),
        ],
    }
}
