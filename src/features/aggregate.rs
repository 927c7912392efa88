//! Collapse row-level events into one feature vector per student.

use super::StudentFeatureVector;
use crate::error::Result;
use crate::events::Event;
use std::collections::BTreeMap;

/// Sample standard deviation (n-1 denominator). Groups of fewer than two
/// values yield 0.0, never NaN.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    (ss / (n - 1.0)).sqrt()
}

#[derive(Default)]
struct StudentEvents {
    scores: Vec<f64>,
    times: Vec<f64>,
    chapter_max: i64,
}

impl StudentEvents {
    fn push(&mut self, e: &Event) {
        if self.scores.is_empty() || e.chapter_id > self.chapter_max {
            self.chapter_max = e.chapter_id;
        }
        self.scores.push(e.score);
        self.times.push(e.time_spent);
    }

    fn finish(self, student_id: i64) -> StudentFeatureVector {
        let n = self.scores.len() as f64;
        let score_sum: f64 = self.scores.iter().sum();
        let time_sum: f64 = self.times.iter().sum();
        StudentFeatureVector {
            student_id,
            score_mean: score_sum / n,
            score_min: self.scores.iter().copied().fold(f64::INFINITY, f64::min),
            score_max: self.scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            score_std: sample_std(&self.scores),
            time_sum,
            time_mean: time_sum / n,
            time_std: sample_std(&self.times),
            chapter_max: self.chapter_max,
        }
    }
}

/// Group events by `student_id` and compute each student's aggregates.
/// Keys iterate in ascending student order.
pub fn aggregate(events: &[Event]) -> Result<BTreeMap<i64, StudentFeatureVector>> {
    let mut groups: BTreeMap<i64, StudentEvents> = BTreeMap::new();
    for e in events {
        e.validate()?;
        groups.entry(e.student_id).or_default().push(e);
    }
    Ok(groups
        .into_iter()
        .map(|(id, group)| (id, group.finish(id)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InsightError;

    fn scenario() -> Vec<Event> {
        vec![
            Event::new(1, "C101", 1, 10.0, 80.0),
            Event::new(2, "C101", 1, 5.0, 40.0),
            Event::new(1, "C101", 2, 12.0, 85.0),
            Event::new(1, "C101", 3, 11.0, 90.0),
        ]
    }

    #[test]
    fn one_vector_per_distinct_student() {
        let out = aggregate(&scenario()).unwrap();
        assert_eq!(out.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn multi_event_student_aggregates() {
        let a = &aggregate(&scenario()).unwrap()[&1];
        assert_eq!(a.score_mean, 85.0);
        assert_eq!(a.score_min, 80.0);
        assert_eq!(a.score_max, 90.0);
        assert!((a.score_std - 5.0).abs() < 1e-12);
        assert_eq!(a.time_sum, 33.0);
        assert_eq!(a.time_mean, 11.0);
        assert!((a.time_std - 1.0).abs() < 1e-12);
        assert_eq!(a.chapter_max, 3);
    }

    #[test]
    fn single_event_student_has_zero_std() {
        let b = &aggregate(&scenario()).unwrap()[&2];
        assert_eq!(b.score_mean, 40.0);
        assert_eq!(b.score_std, 0.0);
        assert_eq!(b.time_std, 0.0);
        assert_eq!(b.time_sum, 5.0);
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        // population std of [2, 4] is 1.0; sample std is sqrt(2)
        assert!((sample_std(&[2.0, 4.0]) - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(sample_std(&[7.0]), 0.0);
        assert_eq!(sample_std(&[]), 0.0);
    }

    #[test]
    fn chapter_max_handles_out_of_order_rows() {
        let events = vec![
            Event::new(9, "C102", 5, 1.0, 50.0),
            Event::new(9, "C102", 2, 1.0, 50.0),
        ];
        assert_eq!(aggregate(&events).unwrap()[&9].chapter_max, 5);
    }

    #[test]
    fn invalid_event_is_schema_error() {
        let events = vec![Event::new(1, "C101", 1, f64::NAN, 50.0)];
        assert!(matches!(aggregate(&events), Err(InsightError::Schema(_))));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(aggregate(&[]).unwrap().is_empty());
    }
}
