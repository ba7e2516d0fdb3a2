// ============================================================
// Layer 4 — Hold-out Splitter
// ============================================================
// Shuffles samples with a seeded RNG and moves a percentage of
// them into a held-out set. Used twice per run:
//
//   labeled → (train, test)       with test_percent
//   train   → (train, validate)   with validate_percent
//
// Rounding: the held-out count is ceil(n * percent / 100),
// computed in integer arithmetic and clamped to n. The held-out
// samples are the first ones after shuffling; the rest stay in
// the training part. For 2 samples at 20% that is 1 held out.
//
// Same seed + same input order ⇒ same split.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom
// over a StdRng seeded from a u64.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Number of samples held out from `total` at `percent`, rounded up.
pub fn holdout_count(total: usize, percent: u8) -> usize {
    let percent = usize::from(percent.min(100));
    ((total * percent + 99) / 100).min(total)
}

/// Shuffle `samples` and split into (remaining, held_out).
///
/// # Arguments
/// * `samples`         - All available samples (consumed by this function)
/// * `holdout_percent` - Share moved to the held-out set, 0..=100
/// * `seed`            - RNG seed for the shuffle
///
/// # Example
/// ```ignore
/// let (train, test) = split_holdout(all_samples, 20, 42);
/// ```
pub fn split_holdout<T>(mut samples: Vec<T>, holdout_percent: u8, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let held_out = holdout_count(total, holdout_percent);

    // split_off(n) keeps [0..n] in `samples` and returns [n..total]
    let remaining = samples.split_off(held_out);

    tracing::debug!(
        "Hold-out split: {} remaining, {} held out ({}% requested)",
        remaining.len(),
        samples.len(),
        holdout_percent,
    );

    (remaining, samples)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, test)     = split_holdout(items, 20, 7);
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(),  20);
    }

    #[test]
    fn test_holdout_rounds_up() {
        assert_eq!(holdout_count(2, 20), 1);
        assert_eq!(holdout_count(1, 20), 1);
        assert_eq!(holdout_count(11, 20), 3);
        assert_eq!(holdout_count(10, 20), 2);
        assert_eq!(holdout_count(0, 20), 0);
        assert_eq!(holdout_count(5, 0), 0);
        assert_eq!(holdout_count(5, 100), 5);
    }

    #[test]
    fn test_all_items_preserved_and_disjoint() {
        let items: Vec<usize> = (0..50).collect();
        let (train, test)     = split_holdout(items, 30, 1);
        assert_eq!(train.len() + test.len(), 50);

        let a: HashSet<_> = train.iter().collect();
        let b: HashSet<_> = test.iter().collect();
        assert!(a.is_disjoint(&b));
        assert_eq!(a.len() + b.len(), 50);
    }

    #[test]
    fn test_same_seed_same_split() {
        let items: Vec<usize> = (0..40).collect();
        let first  = split_holdout(items.clone(), 20, 99);
        let second = split_holdout(items, 20, 99);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, test)     = split_holdout(items, 20, 0);
        assert!(train.is_empty());
        assert!(test.is_empty());
    }
}
