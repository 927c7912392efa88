//! Seeded synthetic cohort: latent capability drives both time and score,
//! chapters 3 and 7 are harder than the rest.

use super::{Event, LabelledEvent};
use crate::config::SyntheticConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const COURSES: [(&str, i64); 3] = [("C101", 10), ("C102", 12), ("C103", 8)];
const HARD_CHAPTERS: [i64; 2] = [3, 7];

/// Box-Muller draw from N(mean, std_dev).
fn normal(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    mean + std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Generate labelled events for `config.students` students.
pub fn generate(config: &SyntheticConfig) -> Vec<LabelledEvent> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut rows = Vec::new();

    for student_id in 1..=i64::from(config.students) {
        let (course_id, chapters) = COURSES[rng.gen_range(0..COURSES.len())];
        let capability = normal(&mut rng, 0.6, 0.2).clamp(0.1, 0.95);

        let mut events = Vec::with_capacity(chapters as usize);
        for chapter_id in 1..=chapters {
            let difficulty = if HARD_CHAPTERS.contains(&chapter_id) { 1.5 } else { 1.0 };
            let time_spent = (normal(&mut rng, 30.0 * difficulty, 10.0) * (1.5 - capability)).max(5.0);
            let score = (normal(&mut rng, 70.0 * capability, 15.0) / difficulty).clamp(0.0, 100.0);
            events.push(Event::new(
                student_id,
                course_id,
                chapter_id,
                round2(time_spent),
                round2(score),
            ));
        }

        let mean_score = events.iter().map(|e| e.score).sum::<f64>() / events.len() as f64;
        let completed = mean_score > 55.0 && capability > 0.4;
        rows.extend(events.into_iter().map(|event| LabelledEvent { event, completed }));
    }
    rows
}
