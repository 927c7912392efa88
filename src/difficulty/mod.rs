//! Chapter difficulty insights, computed independently of the classifier.

mod scorer;

pub use scorer::{read_table, score, write_table, DifficultyRecord};
