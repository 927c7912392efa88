//! Per-chapter interaction events: the atomic, immutable unit of input.
//! CSV ingestion with whole-batch schema validation, plus a seeded synthetic generator.

mod reader;
mod synthetic;

pub use reader::{read_events, read_events_path, read_labelled, read_labelled_path, write_labelled};
pub use synthetic::generate;

use crate::error::{InsightError, Result};
use serde::{Deserialize, Serialize};

/// One recorded (student, chapter) interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub student_id: i64,
    pub course_id: String,
    pub chapter_id: i64,
    /// Minutes spent, non-negative
    pub time_spent: f64,
    /// Score in [0, 100]
    pub score: f64,
}

impl Event {
    pub fn new(
        student_id: i64,
        course_id: impl Into<String>,
        chapter_id: i64,
        time_spent: f64,
        score: f64,
    ) -> Self {
        Self {
            student_id,
            course_id: course_id.into(),
            chapter_id,
            time_spent,
            score,
        }
    }

    /// Numeric invariants for events built outside the CSV reader.
    pub fn validate(&self) -> Result<()> {
        if self.course_id.trim().is_empty() {
            return Err(InsightError::schema(format!(
                "student {}: course_id is empty",
                self.student_id
            )));
        }
        if !self.time_spent.is_finite() || self.time_spent < 0.0 {
            return Err(InsightError::schema(format!(
                "student {}: time_spent {} is not a non-negative number",
                self.student_id, self.time_spent
            )));
        }
        if !(0.0..=100.0).contains(&self.score) {
            return Err(InsightError::schema(format!(
                "student {}: score {} is outside [0, 100]",
                self.student_id, self.score
            )));
        }
        Ok(())
    }
}

/// Training row: an event plus the student's completion outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledEvent {
    pub event: Event,
    pub completed: bool,
}
