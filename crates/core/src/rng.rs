//! Seeded random stream shared by every draw of a generation run.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

/// Single generator for a run. Cloning it yields an independent copy that
/// replays the same sequence, which is what read-only previews rely on.
#[derive(Clone, Debug)]
pub struct GenRng {
    inner: ChaCha8Rng,
}

impl GenRng {
    pub fn from_seed(seed: u64) -> Self {
        Self { inner: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Uniform in `[0, 1)` with 24 bits of precision.
    pub fn unit_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1_u64 << 24) as f32
    }

    /// Uniform in `[0, upper)`.
    pub fn below_f32(&mut self, upper: f32) -> f32 {
        self.unit_f32() * upper
    }

    /// Uniform integer in `[min_value, max_value]`.
    pub fn range_inclusive(&mut self, min_value: u32, max_value: u32) -> u32 {
        debug_assert!(min_value <= max_value);
        let range_size = u64::from(max_value - min_value) + 1;
        min_value + (self.next_u64() % range_size) as u32
    }

    /// Uniform index into a slice of length `len`; `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u64() % len as u64) as usize
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.index(items.len());
        items.get(index)
    }

    /// Rolls against a percentage in `[0, 100]`.
    pub fn chance_percent(&mut self, percent: f32) -> bool {
        self.below_f32(100.0) < percent
    }

    pub fn coin_flip(&mut self) -> bool {
        self.next_u64() & 1 == 1
    }
}

pub(crate) fn mix_seed_stream(seed: u64, stream: u64) -> u64 {
    let mut mixed = seed ^ stream.wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    mixed ^ (mixed >> 33)
}
