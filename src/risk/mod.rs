//! Completion probability → risk tier and per-student results.

mod engine;

pub use engine::{round_probability, PredictionResult, RiskEngine, RiskLevel};
