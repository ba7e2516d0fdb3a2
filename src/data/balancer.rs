// ============================================================
// Layer 4 — Class Balancer
// ============================================================
// Downsamples the majority label to the size of the minority
// label:
//
//   minority = the label with fewer records
//   keep every minority record
//   draw `minority.len()` majority records without replacement
//
// The balanced set is the minority records in input order,
// followed by the sampled majority records in input order.
// The sample is drawn with a StdRng seeded from `seed`, so the
// same seed and input order always select the same records.
// With equal counts nothing is sampled and the result is the
// negatives followed by the positives.
//
// Reference: rand crate documentation (rand::seq::index::sample)

use rand::{rngs::StdRng, seq::index, SeedableRng};

use crate::domain::review::Label;

/// Balance `items` by label. `label_of` reads an item's label.
pub fn balance_by<T, F>(items: Vec<T>, label_of: F, seed: u64) -> Vec<T>
where
    F: Fn(&T) -> Label,
{
    let (positives, negatives): (Vec<T>, Vec<T>) =
        items.into_iter().partition(|item| label_of(item) == Label::Positive);

    let (minority, majority) = if positives.len() < negatives.len() {
        (positives, negatives)
    } else {
        (negatives, positives)
    };

    let target = minority.len();
    let majority_total = majority.len();

    let sampled: Vec<T> = if majority_total == target {
        majority
    } else {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut picked = index::sample(&mut rng, majority_total, target).into_vec();
        picked.sort_unstable();

        let mut picked = picked.into_iter().peekable();
        majority
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| {
                if picked.peek() == Some(&i) {
                    picked.next();
                    Some(item)
                } else {
                    None
                }
            })
            .collect()
    };

    tracing::debug!(
        "Balanced classes: kept {} minority, sampled {} of {} majority",
        target,
        sampled.len(),
        majority_total,
    );

    let mut balanced = minority;
    balanced.extend(sampled);
    balanced
}
