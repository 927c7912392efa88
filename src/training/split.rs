//! Seeded shuffle split over student rows.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Returns (train, test) row indices. The test share is rounded up, but at
/// least one row is always kept for training.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut idx: Vec<usize> = (0..n).collect();
    idx.shuffle(&mut StdRng::seed_from_u64(seed));
    let n_test = ((n as f64 * test_fraction).ceil() as usize).min(n.saturating_sub(1));
    let train = idx.split_off(n_test);
    (train, idx)
}
