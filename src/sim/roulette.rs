//! Weighted roulette selection
//!
//! Draw `r` uniformly in `[1, total]`, walk the buckets subtracting each
//! weight, and take the first bucket where `r` drops to zero or below.

use rand::Rng;

/// Pick a bucket index from integer weights.
///
/// Returns `None` when the weights sum to zero (nothing to pick).
/// Zero-weight buckets are never chosen. Falls back to the last bucket if the
/// walk is exhausted.
pub fn pick_weighted<R: Rng>(rng: &mut R, weights: &[u32]) -> Option<usize> {
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return None;
    }

    let mut r = rng.random_range(1..=total) as i64;
    for (i, &w) in weights.iter().enumerate() {
        r -= w as i64;
        if r <= 0 {
            return Some(i);
        }
    }
    Some(weights.len() - 1)
}

/// Level weights: the top tier (index 0) is heaviest, the bottom tier weighs 1
pub fn level_weights(levels_count: usize) -> Vec<u32> {
    (0..levels_count)
        .map(|i| (levels_count - 1 - i) as u32 + 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_level_weights() {
        assert_eq!(level_weights(5), vec![5, 4, 3, 2, 1]);
        assert_eq!(level_weights(1), vec![1]);
        assert!(level_weights(0).is_empty());
    }

    #[test]
    fn test_empty_or_zero_weights() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(pick_weighted(&mut rng, &[]), None);
        assert_eq!(pick_weighted(&mut rng, &[0, 0]), None);
    }

    #[test]
    fn test_frequencies_converge() {
        let mut rng = Pcg32::seed_from_u64(0xC0FFEE);
        let weights = level_weights(5);
        let total: u32 = weights.iter().sum();
        let draws = 20_000;

        let mut counts = [0u32; 5];
        for _ in 0..draws {
            counts[pick_weighted(&mut rng, &weights).unwrap()] += 1;
        }

        for (i, &count) in counts.iter().enumerate() {
            let expected = weights[i] as f64 / total as f64;
            let observed = count as f64 / draws as f64;
            assert!(
                (expected - observed).abs() < 0.02,
                "bucket {i}: expected {expected:.3}, observed {observed:.3}"
            );
        }
        assert!(counts[0] > counts[4]);
    }

    #[test]
    fn test_top_beats_bottom_at_one_thousand_draws() {
        let mut rng = Pcg32::seed_from_u64(7);
        let weights = level_weights(5);
        let mut top = 0;
        let mut bottom = 0;
        for _ in 0..1000 {
            match pick_weighted(&mut rng, &weights) {
                Some(0) => top += 1,
                Some(4) => bottom += 1,
                _ => {}
            }
        }
        assert!(top > bottom);
    }

    proptest! {
        #[test]
        fn prop_never_picks_zero_weight(
            weights in proptest::collection::vec(0u32..5, 1..8),
            seed in any::<u64>(),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let picked = pick_weighted(&mut rng, &weights);
            if weights.iter().all(|&w| w == 0) {
                prop_assert!(picked.is_none());
            } else {
                let i = picked.unwrap();
                prop_assert!(i < weights.len());
                prop_assert!(weights[i] > 0);
            }
        }
    }
}
