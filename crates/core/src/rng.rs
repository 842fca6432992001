//! The single seeded random stream of a generation run.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

pub struct GenRng {
    inner: ChaCha8Rng,
}

impl GenRng {
    pub fn from_seed(seed: u64) -> Self {
        Self { inner: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Uniform float in `[0, 1)` built from the top 24 bits of one draw.
    pub fn unit_f32(&mut self) -> f32 {
        (self.inner.next_u32() >> 8) as f32 / (1_u32 << 24) as f32
    }

    /// Uniform integer in the inclusive range `min_value..=max_value`.
    pub fn range_usize(&mut self, min_value: usize, max_value: usize) -> usize {
        debug_assert!(min_value <= max_value);
        let range_size = (max_value - min_value) as u64 + 1;
        min_value + (self.inner.next_u64() % range_size) as usize
    }

    pub fn shuffle<T>(&mut self, values: &mut [T]) {
        for index in (1..values.len()).rev() {
            let swap_with = self.range_usize(0, index);
            values.swap(index, swap_with);
        }
    }

    /// Picks an index with probability proportional to its weight.
    /// Returns `None` when the slice is empty or every weight is zero.
    pub fn weighted_index(&mut self, weights: &[f32]) -> Option<usize> {
        let total: f32 = weights.iter().copied().filter(|weight| *weight > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let mut remaining = self.unit_f32() * total;
        let mut last_positive = None;
        for (index, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            if remaining < weight {
                return Some(index);
            }
            remaining -= weight;
            last_positive = Some(index);
        }
        last_positive
    }
}
