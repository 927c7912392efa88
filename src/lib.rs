//! Learning intelligence: completion-risk prediction and chapter difficulty insights.
//!
//! Modular structure:
//! - [`events`] — Event type, CSV ingestion, synthetic cohort generator
//! - [`features`] — Versioned feature schema and per-student aggregation
//! - [`scaler`] — Standardization fit at training, replayed at inference
//! - [`model`] — Completion classifier contract and backends
//! - [`risk`] — Probability → risk tier
//! - [`difficulty`] — Batch-relative chapter difficulty scoring
//! - [`artifacts`] — Persisted artifacts with readiness checks
//! - [`training`] — Offline training pipeline
//! - [`service`] — Predict / difficulty / insights operations
//! - [`logging`] — Structured JSON logging

pub mod artifacts;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod events;
pub mod features;
pub mod logging;
pub mod model;
pub mod risk;
pub mod scaler;
pub mod service;
pub mod training;

pub use artifacts::{Artifact, ArtifactSet};
pub use config::AppConfig;
pub use difficulty::DifficultyRecord;
pub use error::{InsightError, Result};
pub use events::Event;
pub use features::{aggregate, FeatureMatrix, StudentFeatureVector, FEATURE_SCHEMA};
pub use logging::StructuredLogger;
pub use model::CompletionClassifier;
pub use risk::{PredictionResult, RiskLevel};
pub use scaler::{ScalerParams, StandardScaler};
pub use service::InsightService;
