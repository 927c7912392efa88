//! Student-level feature extraction from raw events.
//!
//! Column order is defined once, by [`FEATURE_SCHEMA`]. Training and inference both
//! build their matrices through it, and persisted artifacts record its fingerprint.

mod aggregate;
mod matrix;

pub use aggregate::{aggregate, sample_std};
pub use matrix::FeatureMatrix;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One named aggregate computation over a student's events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    ScoreMean,
    ScoreMin,
    ScoreMax,
    ScoreStd,
    TimeSum,
    TimeMean,
    TimeStd,
    ChapterMax,
}

impl Feature {
    pub fn name(self) -> &'static str {
        match self {
            Feature::ScoreMean => "score_mean",
            Feature::ScoreMin => "score_min",
            Feature::ScoreMax => "score_max",
            Feature::ScoreStd => "score_std",
            Feature::TimeSum => "time_sum",
            Feature::TimeMean => "time_mean",
            Feature::TimeStd => "time_std",
            Feature::ChapterMax => "chapter_max",
        }
    }
}

/// Versioned, ordered list of features.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSchema {
    pub version: u32,
    pub features: &'static [Feature],
}

pub const FEATURE_SCHEMA: FeatureSchema = FeatureSchema {
    version: 1,
    features: &[
        Feature::ScoreMean,
        Feature::ScoreMin,
        Feature::ScoreMax,
        Feature::ScoreStd,
        Feature::TimeSum,
        Feature::TimeMean,
        Feature::TimeStd,
        Feature::ChapterMax,
    ],
};

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.features.iter().map(|f| f.name()).collect()
    }

    /// SHA-256 over version and ordered names, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("v{}", self.version).as_bytes());
        for name in self.names() {
            hasher.update(b"|");
            hasher.update(name.as_bytes());
        }
        hex(&hasher.finalize())
    }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Aggregates over one student's full event set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentFeatureVector {
    pub student_id: i64,
    pub score_mean: f64,
    pub score_min: f64,
    pub score_max: f64,
    /// Sample std (n-1); 0.0 for a single event
    pub score_std: f64,
    pub time_sum: f64,
    pub time_mean: f64,
    /// Sample std (n-1); 0.0 for a single event
    pub time_std: f64,
    pub chapter_max: i64,
}

impl StudentFeatureVector {
    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::ScoreMean => self.score_mean,
            Feature::ScoreMin => self.score_min,
            Feature::ScoreMax => self.score_max,
            Feature::ScoreStd => self.score_std,
            Feature::TimeSum => self.time_sum,
            Feature::TimeMean => self.time_mean,
            Feature::TimeStd => self.time_std,
            Feature::ChapterMax => self.chapter_max as f64,
        }
    }

    /// Values in schema order.
    pub fn to_row(&self, schema: &FeatureSchema) -> Vec<f64> {
        schema.features.iter().map(|&f| self.value(f)).collect()
    }
}
