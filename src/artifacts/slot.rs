//! Optional state with a readiness check.

use crate::error::{InsightError, Result};

#[derive(Debug)]
enum State<T> {
    Ready(T),
    Unavailable(String),
}

/// A named artifact that is either loaded or carries the reason it is not.
#[derive(Debug)]
pub struct Artifact<T> {
    name: &'static str,
    state: State<T>,
}

impl<T> Artifact<T> {
    pub fn ready(name: &'static str, value: T) -> Self {
        Self {
            name,
            state: State::Ready(value),
        }
    }

    pub fn unavailable(name: &'static str, reason: impl Into<String>) -> Self {
        Self {
            name,
            state: State::Unavailable(reason.into()),
        }
    }

    /// Wrap a load attempt, logging the outcome.
    pub fn from_result(name: &'static str, result: Result<T>) -> Self {
        match result {
            Ok(value) => {
                tracing::info!(artifact = name, "artifact loaded");
                Self::ready(name, value)
            }
            Err(e) => {
                let reason = match e {
                    InsightError::ModelUnavailable { reason, .. } => reason,
                    other => other.to_string(),
                };
                tracing::warn!(artifact = name, %reason, "artifact unavailable; dependent operations disabled");
                Self::unavailable(name, reason)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    pub fn get_or_fail(&self) -> Result<&T> {
        match &self.state {
            State::Ready(value) => Ok(value),
            State::Unavailable(reason) => Err(InsightError::unavailable(self.name, reason.clone())),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match &self.state {
            State::Ready(_) => None,
            State::Unavailable(reason) => Some(reason),
        }
    }
}
