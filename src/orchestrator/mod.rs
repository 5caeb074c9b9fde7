//! Orchestrator - main simulation loop
//!
//! Implements the fixed per-tick pipeline over the seven subsystems.
//!
//! See `engine.rs` for the tick loop and `checkpoint.rs` for snapshots.

pub mod checkpoint;
pub mod engine;

pub use checkpoint::{capture, compute_config_hash, restore, StateSnapshot};
pub use engine::{Simulation, SimulationError, TickResult};
