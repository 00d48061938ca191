// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Categorical action sampling by inverse CDF

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Smallest index whose cumulative weight exceeds `r`
///
/// The distribution need not be normalized. When `r` is never below the
/// running sum (all-zero weights, or a sum below `r`), the last index is
/// returned. The running sum is accumulated in `f32`, index by index, so it
/// matches a prefix-sum-then-scan bit for bit.
pub fn sample_with(distribution: &[f32], r: f32) -> usize {
    debug_assert!(!distribution.is_empty(), "cannot sample an empty distribution");

    let mut cumulative = 0.0f32;
    for (index, &weight) in distribution.iter().enumerate() {
        cumulative += weight;
        if r < cumulative {
            return index;
        }
    }
    distribution.len().saturating_sub(1)
}

/// Draws action indices with its own random source
#[derive(Debug, Clone)]
pub struct Sampler<R = StdRng> {
    rng: R,
}

impl Sampler<StdRng> {
    /// Seeded for reproducible runs, or from OS entropy
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl<R: Rng> Sampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw `r` uniformly from [0, 1) and sample `distribution`
    pub fn sample(&mut self, distribution: &[f32]) -> usize {
        let r: f32 = self.rng.gen();
        sample_with(distribution, r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;

    const R_MAX: f32 = 0.999_999_94;

    #[test]
    fn test_all_zero_falls_back_to_last() {
        assert_eq!(sample_with(&[0.0, 0.0, 0.0], 0.0), 2);
        assert_eq!(sample_with(&[0.0, 0.0, 0.0], 0.5), 2);
    }

    #[test]
    fn test_first_class_certain() {
        for r in [0.0, 0.3, 0.5, R_MAX] {
            assert_eq!(sample_with(&[1.0, 0.0, 0.0], r), 0);
        }
    }

    #[test]
    fn test_middle_class_certain() {
        for r in [0.0, 0.3, 0.5, R_MAX] {
            assert_eq!(sample_with(&[0.0, 1.0, 0.0], r), 1);
        }
    }

    #[test]
    fn test_boundary_goes_to_next_class() {
        // r equal to a cumulative bound is not below it
        assert_eq!(sample_with(&[0.25, 0.25, 0.5], 0.25), 1);
        assert_eq!(sample_with(&[0.25, 0.25, 0.5], 0.249), 0);
        assert_eq!(sample_with(&[0.25, 0.25, 0.5], 0.5), 2);
    }

    #[test]
    fn test_sum_below_one_falls_back() {
        assert_eq!(sample_with(&[0.3, 0.3, 0.3], 0.95), 2);
    }

    #[test]
    fn test_sum_above_one_tolerated() {
        assert_eq!(sample_with(&[0.6, 0.6, 0.6], R_MAX), 1);
    }

    #[test]
    fn test_sampler_uses_rng_draw() {
        let mut low = Sampler::new(StepRng::new(0, 0));
        assert_eq!(low.sample(&[0.2, 0.3, 0.5]), 0);

        let mut high = Sampler::new(StepRng::new(u64::MAX, 0));
        assert_eq!(high.sample(&[0.2, 0.3, 0.5]), 2);
    }

    #[test]
    fn test_seeded_sampler_is_reproducible() {
        let dist = [0.3, 0.4, 0.3];
        let mut a = Sampler::from_seed(Some(7));
        let mut b = Sampler::from_seed(Some(7));
        let draws_a: Vec<usize> = (0..64).map(|_| a.sample(&dist)).collect();
        let draws_b: Vec<usize> = (0..64).map(|_| b.sample(&dist)).collect();
        assert_eq!(draws_a, draws_b);
    }

    proptest! {
        #[test]
        fn prop_index_in_range(
            weights in prop::collection::vec(0.0f32..10.0, 1..16),
            r in 0.0f32..1.0,
        ) {
            let index = sample_with(&weights, r);
            prop_assert!(index < weights.len());
        }

        #[test]
        fn prop_seeded_draws_in_range(
            weights in prop::collection::vec(0.0f32..1.0, 1..8),
            seed in any::<u64>(),
        ) {
            let mut sampler = Sampler::from_seed(Some(seed));
            for _ in 0..8 {
                prop_assert!(sampler.sample(&weights) < weights.len());
            }
        }
    }
}
