//! Fixed tiers: p < 0.30 is High, 0.30 <= p < 0.70 is Medium, p >= 0.70 is Low.

use serde::{Deserialize, Serialize};

/// Below this probability a student is high risk.
pub const HIGH_RISK_BELOW: f64 = 0.30;
/// Below this (and at or above [`HIGH_RISK_BELOW`]) a student is medium risk.
pub const MEDIUM_RISK_BELOW: f64 = 0.70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_probability(probability: f64) -> Self {
        if probability < HIGH_RISK_BELOW {
            RiskLevel::High
        } else if probability < MEDIUM_RISK_BELOW {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Two-decimal rounding applied to reported probabilities only.
///
/// Rounds the exact binary value, exact ties to even: 0.125 -> 0.12, 0.015 -> 0.01.
pub fn round_probability(p: f64) -> f64 {
    format!("{:.2}", p).parse().unwrap_or(p)
}

/// Per-student inference result; recomputed per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub student_id: i64,
    pub completion_probability: f64,
    pub predicted_completion: bool,
    pub risk_level: RiskLevel,
}

pub struct RiskEngine;

impl RiskEngine {
    /// Tier on the raw probability, report it rounded.
    pub fn assess(student_id: i64, probability: f64, predicted_completion: bool) -> PredictionResult {
        PredictionResult {
            student_id,
            completion_probability: round_probability(probability),
            predicted_completion,
            risk_level: RiskLevel::from_probability(probability),
        }
    }
}
