//! Offline training: aggregate labelled events, fit scaler and classifier,
//! evaluate, score chapter difficulty, and persist the artifacts.

mod metrics;
mod pipeline;
mod split;

pub use metrics::{evaluate, ClassMetrics, EvaluatedOn, EvaluationReport};
pub use pipeline::{persist, train, TrainedArtifacts, TrainingReport};
pub use split::train_test_split;
