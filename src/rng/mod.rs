//! Deterministic random number generation

mod xorshift;

pub use xorshift::{mix_seed, RngManager, RngPhase};
