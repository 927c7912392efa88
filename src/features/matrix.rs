//! Ordered feature matrix: events → aggregates → rows in schema order.

use super::{aggregate, FeatureSchema, StudentFeatureVector};
use crate::error::Result;
use crate::events::Event;
use ndarray::{Array2, Axis};

/// One row per student (ascending `student_id`), one column per schema feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub student_ids: Vec<i64>,
    pub values: Array2<f64>,
}

impl FeatureMatrix {
    pub fn from_vectors<'a>(
        vectors: impl IntoIterator<Item = &'a StudentFeatureVector>,
        schema: &FeatureSchema,
    ) -> Self {
        let vectors: Vec<&StudentFeatureVector> = vectors.into_iter().collect();
        let mut values = Array2::zeros((vectors.len(), schema.len()));
        for (mut row, v) in values.axis_iter_mut(Axis(0)).zip(&vectors) {
            for (cell, &feature) in row.iter_mut().zip(schema.features) {
                *cell = v.value(feature);
            }
        }
        Self {
            student_ids: vectors.iter().map(|v| v.student_id).collect(),
            values,
        }
    }

    pub fn from_events(events: &[Event], schema: &FeatureSchema) -> Result<Self> {
        let vectors = aggregate(events)?;
        Ok(Self::from_vectors(vectors.values(), schema))
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    /// Subset of rows, in the order given.
    pub fn select(&self, rows: &[usize]) -> Self {
        Self {
            student_ids: rows.iter().map(|&r| self.student_ids[r]).collect(),
            values: self.values.select(Axis(0), rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_SCHEMA;

    #[test]
    fn rows_are_sorted_by_student_and_columns_by_schema() {
        let events = vec![
            Event::new(20, "C101", 4, 8.0, 60.0),
            Event::new(3, "C101", 1, 10.0, 80.0),
        ];
        let m = FeatureMatrix::from_events(&events, &FEATURE_SCHEMA).unwrap();
        assert_eq!(m.student_ids, vec![3, 20]);
        assert_eq!(m.values.dim(), (2, 8));
        assert_eq!(m.values.row(0).to_vec(), vec![80.0, 80.0, 80.0, 0.0, 10.0, 10.0, 0.0, 1.0]);
        assert_eq!(m.values[[1, 7]], 4.0);
    }

    #[test]
    fn select_keeps_ids_aligned() {
        let events = vec![
            Event::new(1, "C101", 1, 1.0, 10.0),
            Event::new(2, "C101", 1, 2.0, 20.0),
            Event::new(3, "C101", 1, 3.0, 30.0),
        ];
        let m = FeatureMatrix::from_events(&events, &FEATURE_SCHEMA).unwrap();
        let s = m.select(&[2, 0]);
        assert_eq!(s.student_ids, vec![3, 1]);
        assert_eq!(s.values[[0, 0]], 30.0);
        assert_eq!(s.values[[1, 0]], 10.0);
    }
}
