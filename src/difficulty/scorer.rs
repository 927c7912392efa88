//! difficulty = (100 - avg_score) + avg_time / max_avg_time * 50
//!
//! `max_avg_time` is the largest group average in the batch being scored, so the
//! score is relative to the loaded dataset rather than an absolute scale.

use crate::error::{InsightError, Result};
use crate::events::Event;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};

const TIME_WEIGHT: f64 = 50.0;
const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyRecord {
    pub course_id: String,
    pub chapter_id: i64,
    pub avg_score: f64,
    pub avg_time: f64,
    pub difficulty_score: f64,
}

/// One record per observed (course_id, chapter_id), ordered by course then chapter.
/// If every group has zero average time the time term is 0.
pub fn score(events: &[Event]) -> Vec<DifficultyRecord> {
    let mut groups: BTreeMap<(&str, i64), (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for e in events {
        let g = groups.entry((e.course_id.as_str(), e.chapter_id)).or_default();
        g.0.push(e.score);
        g.1.push(e.time_spent);
    }

    let averaged: Vec<((&str, i64), f64, f64)> = groups
        .into_iter()
        .map(|(key, (scores, times))| (key, order_free_mean(scores), order_free_mean(times)))
        .collect();
    let max_avg_time = averaged
        .iter()
        .map(|&(_, _, t)| t)
        .fold(0.0_f64, f64::max);

    averaged
        .into_iter()
        .map(|((course_id, chapter_id), avg_score, avg_time)| {
            let time_term = if max_avg_time > 0.0 {
                avg_time / max_avg_time * TIME_WEIGHT
            } else {
                0.0
            };
            DifficultyRecord {
                course_id: course_id.to_string(),
                chapter_id,
                avg_score,
                avg_time,
                difficulty_score: (MAX_SCORE - avg_score) + time_term,
            }
        })
        .collect()
}

/// Mean summed in sorted order, so row order in the batch cannot change the bits.
fn order_free_mean(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.iter().sum::<f64>() / values.len() as f64
}

/// Persist the lookup table as CSV.
pub fn write_table<W: Write>(records: &[DifficultyRecord], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for r in records {
        csv.serialize(r)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn read_table<R: Read>(reader: R) -> Result<Vec<DifficultyRecord>> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for row in csv.deserialize::<DifficultyRecord>() {
        let r = row?;
        if !r.difficulty_score.is_finite() {
            return Err(InsightError::computation(format!(
                "non-finite difficulty for {}/{}",
                r.course_id, r.chapter_id
            )));
        }
        out.push(r);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_chapter(records: &[DifficultyRecord], chapter: i64) -> &DifficultyRecord {
        records.iter().find(|r| r.chapter_id == chapter).unwrap()
    }

    #[test]
    fn empty_input_yields_empty_table() {
        assert!(score(&[]).is_empty());
    }

    #[test]
    fn formula_normalizes_by_batch_max_avg_time() {
        let events = vec![
            Event::new(1, "C101", 1, 10.0, 90.0),
            Event::new(2, "C101", 1, 30.0, 70.0),
            Event::new(1, "C101", 2, 40.0, 60.0),
        ];
        let r = score(&events);
        assert_eq!(r.len(), 2);
        let ch1 = by_chapter(&r, 1);
        assert_eq!(ch1.avg_score, 80.0);
        assert_eq!(ch1.avg_time, 20.0);
        // max avg time is 40 (chapter 2)
        assert!((ch1.difficulty_score - (20.0 + 25.0)).abs() < 1e-12);
        let ch2 = by_chapter(&r, 2);
        assert!((ch2.difficulty_score - (40.0 + 50.0)).abs() < 1e-12);
    }

    #[test]
    fn same_chapter_scores_shift_when_batch_changes() {
        let base = vec![Event::new(1, "C101", 1, 10.0, 50.0)];
        let alone = score(&base)[0].difficulty_score;
        let mut wider = base.clone();
        wider.push(Event::new(1, "C101", 2, 20.0, 50.0));
        let relative = by_chapter(&score(&wider), 1).difficulty_score;
        assert_eq!(alone, 100.0);
        assert_eq!(relative, 75.0);
    }

    #[test]
    fn low_scoring_chapter_is_harder() {
        let events = vec![
            Event::new(1, "C101", 1, 20.0, 90.0),
            Event::new(2, "C101", 1, 20.0, 90.0),
            Event::new(1, "C101", 3, 20.0, 50.0),
            Event::new(2, "C101", 3, 20.0, 50.0),
        ];
        let r = score(&events);
        assert!(by_chapter(&r, 3).difficulty_score > by_chapter(&r, 1).difficulty_score);
    }

    #[test]
    fn invariant_under_row_reordering() {
        let mut events = vec![
            Event::new(1, "C101", 1, 12.0, 71.5),
            Event::new(2, "C102", 1, 33.0, 40.0),
            Event::new(3, "C101", 2, 7.25, 88.0),
            Event::new(4, "C101", 1, 19.0, 64.0),
            Event::new(5, "C102", 1, 21.0, 55.5),
        ];
        let forward = score(&events);
        events.reverse();
        events.swap(0, 2);
        assert_eq!(score(&events), forward);
    }

    #[test]
    fn courses_are_grouped_separately() {
        let events = vec![
            Event::new(1, "C101", 1, 10.0, 50.0),
            Event::new(2, "C102", 1, 10.0, 50.0),
        ];
        let r = score(&events);
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].course_id, "C101");
        assert_eq!(r[1].course_id, "C102");
    }

    #[test]
    fn zero_time_batch_has_no_time_term() {
        let r = score(&[Event::new(1, "C101", 1, 0.0, 70.0)]);
        assert_eq!(r[0].difficulty_score, 30.0);
    }

    #[test]
    fn table_round_trips_through_csv() {
        let records = score(&[
            Event::new(1, "C101", 1, 10.0, 50.0),
            Event::new(1, "C101", 2, 15.5, 75.25),
        ]);
        let mut buf = Vec::new();
        write_table(&records, &mut buf).unwrap();
        assert_eq!(read_table(buf.as_slice()).unwrap(), records);
    }
}
