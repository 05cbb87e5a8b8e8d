//! Seeded question selection shared by the content adapters.
//!
//! Both pickers take candidates in a stable order (sorted by id) and drive a
//! `ChaCha8Rng` from the seed, so every node picks the same questions.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn rng_for(seed: i64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed as u64)
}

/// Index of the candidate chosen for `seed`, or `None` when there are none.
pub fn pick_index(candidates: usize, seed: i64) -> Option<usize> {
    if candidates == 0 {
        return None;
    }
    Some(rng_for(seed).gen_range(0..candidates))
}

/// Up to `limit` items from `pool`, chosen and ordered by `seed`.
pub fn pick_many<T: Clone>(pool: &[T], limit: usize, seed: i64) -> Vec<T> {
    let mut items = pool.to_vec();
    let take = limit.min(items.len());
    let (chosen, _) = items.partial_shuffle(&mut rng_for(seed), take);
    chosen.to_vec()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn empty_pool_picks_nothing() {
        assert_eq!(pick_index(0, 20260101), None);
        assert!(pick_many::<u32>(&[], 10, 20260101).is_empty());
    }

    #[test]
    fn limit_larger_than_pool_returns_everything() {
        let mut picked = pick_many(&[1, 2, 3], 10, 99);
        picked.sort_unstable();
        assert_eq!(picked, vec![1, 2, 3]);
    }

    #[test]
    fn different_seeds_usually_differ() {
        let pool: Vec<u32> = (0..100).collect();
        assert_ne!(pick_many(&pool, 10, 20260101), pick_many(&pool, 10, 20260102));
    }

    proptest! {
        #[test]
        fn same_seed_same_selection(seed in any::<i64>(), size in 1usize..200, limit in 0usize..20) {
            let pool: Vec<usize> = (0..size).collect();
            prop_assert_eq!(pick_many(&pool, limit, seed), pick_many(&pool, limit, seed));
            prop_assert_eq!(pick_index(size, seed), pick_index(size, seed));
        }

        #[test]
        fn selection_is_distinct_and_bounded(seed in any::<i64>(), size in 1usize..200, limit in 0usize..20) {
            let pool: Vec<usize> = (0..size).collect();
            let picked = pick_many(&pool, limit, seed);
            prop_assert_eq!(picked.len(), limit.min(size));
            let mut dedup = picked.clone();
            dedup.sort_unstable();
            dedup.dedup();
            prop_assert_eq!(dedup.len(), picked.len());
            prop_assert!(pick_index(size, seed).is_some_and(|i| i < size));
        }
    }
}
