//! Structured logging: diagnostics to stderr via `tracing`, results to stdout as JSON lines.

mod format;

pub use format::{ErrorLine, StructuredLogger};
