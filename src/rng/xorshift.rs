//! xorshift64* random number generator
//!
//! Fast, high-quality PRNG that is deterministic and suitable for
//! simulation purposes.
//!
//! # Determinism
//!
//! Same seed → same sequence. The engine reseeds the tick-scoped generator
//! from `(base_seed, tick, phase)` via [`mix_seed`], so every phase owns an
//! independent reproducible stream and RNG-consuming code can be relocated
//! across phases without perturbing the others.

use serde::{Deserialize, Serialize};

/// Simulation phases with independent RNG streams.
///
/// Adding a new phase at the end never perturbs existing streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RngPhase {
    TickStart = 0,
    Production = 1,
    Trade = 2,
    Labor = 3,
    Price = 4,
    Fiscal = 5,
    Political = 6,
    Military = 7,
}

/// Deterministic random number generator using xorshift64*.
///
/// # Example
/// ```
/// use economy_simulator_core_rs::rng::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let a = rng.next_u64();
/// let f = rng.next_f64();
/// assert!((0.0..1.0).contains(&f));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

/// Mix `(base_seed, tick, phase)` into a stream seed.
///
/// SplitMix64 finalizer over the xor of the inputs spread across distinct
/// odd multipliers. Documented so hosts can reproduce any phase stream out
/// of process.
pub fn mix_seed(base_seed: u64, tick: u64, phase: RngPhase) -> u64 {
    let mut z = base_seed
        ^ tick.wrapping_mul(0x9E3779B97F4A7C15)
        ^ (phase as u64).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

impl RngManager {
    /// Create a new RNG with the given seed.
    ///
    /// A zero seed is remapped to 1 (xorshift requirement).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create the generator for a `(base_seed, tick, phase)` stream.
    pub fn for_phase(base_seed: u64, tick: u64, phase: RngPhase) -> Self {
        Self::new(mix_seed(base_seed, tick, phase))
    }

    /// Generate the next random u64, advancing the state.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate a random f64 in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Generate a random value in `[min, max)`.
    ///
    /// # Panics
    /// Panics if `min >= max`.
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");
        let value = self.next_u64();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Current internal state (for checkpointing/replay).
    pub fn state(&self) -> u64 {
        self.state
    }
}
