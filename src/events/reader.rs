//! CSV batch reader. A single malformed row fails the whole batch.

use super::{Event, LabelledEvent};
use crate::error::{InsightError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;

const STUDENT_ID: &str = "student_id";
const COURSE_ID: &str = "course_id";
const CHAPTER_ID: &str = "chapter_id";
const TIME_SPENT: &str = "time_spent";
const SCORE: &str = "score";
const COMPLETED: &str = "completed";

/// Positions of the required columns in the header row.
struct Columns {
    student_id: usize,
    course_id: usize,
    chapter_id: usize,
    time_spent: usize,
    score: usize,
    completed: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord, with_label: bool) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| InsightError::schema(format!("missing required column '{}'", name)))
        };
        Ok(Self {
            student_id: find(STUDENT_ID)?,
            course_id: find(COURSE_ID)?,
            chapter_id: find(CHAPTER_ID)?,
            time_spent: find(TIME_SPENT)?,
            score: find(SCORE)?,
            completed: if with_label { Some(find(COMPLETED)?) } else { None },
        })
    }
}

struct Row<'r> {
    record: &'r StringRecord,
    line: usize,
}

impl<'r> Row<'r> {
    fn raw(&self, idx: usize, column: &str) -> Result<&'r str> {
        self.record.get(idx).ok_or_else(|| {
            InsightError::schema(format!("row {}: missing value for '{}'", self.line, column))
        })
    }

    fn int(&self, idx: usize, column: &str) -> Result<i64> {
        let raw = self.raw(idx, column)?;
        raw.parse::<i64>().map_err(|_| self.invalid(column, raw, "an integer"))
    }

    fn float(&self, idx: usize, column: &str) -> Result<f64> {
        let raw = self.raw(idx, column)?;
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(self.invalid(column, raw, "a finite number")),
        }
    }

    fn flag(&self, idx: usize, column: &str) -> Result<bool> {
        match self.raw(idx, column)? {
            "1" | "true" | "True" => Ok(true),
            "0" | "false" | "False" => Ok(false),
            other => Err(self.invalid(column, other, "0/1")),
        }
    }

    fn invalid(&self, column: &str, raw: &str, expected: &str) -> InsightError {
        InsightError::schema(format!(
            "row {}: '{}' value {:?} is not {}",
            self.line, column, raw, expected
        ))
    }

    fn event(&self, cols: &Columns) -> Result<Event> {
        let course_id = self.raw(cols.course_id, COURSE_ID)?;
        if course_id.is_empty() {
            return Err(self.invalid(COURSE_ID, course_id, "a non-empty string"));
        }
        let time_spent = self.float(cols.time_spent, TIME_SPENT)?;
        if time_spent < 0.0 {
            return Err(self.invalid(TIME_SPENT, &time_spent.to_string(), "non-negative"));
        }
        let score = self.float(cols.score, SCORE)?;
        if !(0.0..=100.0).contains(&score) {
            return Err(self.invalid(SCORE, &score.to_string(), "within [0, 100]"));
        }
        Ok(Event {
            student_id: self.int(cols.student_id, STUDENT_ID)?,
            course_id: course_id.to_string(),
            chapter_id: self.int(cols.chapter_id, CHAPTER_ID)?,
            time_spent,
            score,
        })
    }
}

fn for_each_row<R: Read>(
    reader: R,
    with_label: bool,
    mut visit: impl FnMut(&Row<'_>, &Columns) -> Result<()>,
) -> Result<()> {
    let mut csv = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = csv
        .headers()
        .map_err(|e| InsightError::schema(format!("unreadable header: {}", e)))?
        .clone();
    let cols = Columns::locate(&headers, with_label)?;

    let mut record = StringRecord::new();
    let mut line = 0usize;
    loop {
        let more = csv
            .read_record(&mut record)
            .map_err(|e| InsightError::schema(format!("row {}: {}", line + 1, e)))?;
        if !more {
            break;
        }
        line += 1;
        visit(&Row { record: &record, line }, &cols)?;
    }
    Ok(())
}

/// Read an inference batch.
pub fn read_events<R: Read>(reader: R) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for_each_row(reader, false, |row, cols| {
        events.push(row.event(cols)?);
        Ok(())
    })?;
    Ok(events)
}

pub fn read_events_path(path: &Path) -> Result<Vec<Event>> {
    read_events(std::fs::File::open(path)?)
}

/// Read a training batch; every row must carry a `completed` flag.
pub fn read_labelled<R: Read>(reader: R) -> Result<Vec<LabelledEvent>> {
    let mut rows = Vec::new();
    for_each_row(reader, true, |row, cols| {
        let completed = match cols.completed {
            Some(idx) => row.flag(idx, COMPLETED)?,
            None => return Err(InsightError::schema("missing required column 'completed'")),
        };
        rows.push(LabelledEvent {
            event: row.event(cols)?,
            completed,
        });
        Ok(())
    })?;
    Ok(rows)
}

pub fn read_labelled_path(path: &Path) -> Result<Vec<LabelledEvent>> {
    read_labelled(std::fs::File::open(path)?)
}

#[derive(Serialize)]
struct LabelledRecord<'a> {
    student_id: i64,
    course_id: &'a str,
    chapter_id: i64,
    time_spent: f64,
    score: f64,
    completed: u8,
}

/// Write labelled rows with the same header `read_labelled` expects.
pub fn write_labelled<W: Write>(rows: &[LabelledEvent], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(LabelledRecord {
            student_id: row.event.student_id,
            course_id: &row.event.course_id,
            chapter_id: row.event.chapter_id,
            time_spent: row.event.time_spent,
            score: row.event.score,
            completed: u8::from(row.completed),
        })?;
    }
    csv.flush()?;
    Ok(())
}
