//! Economy Simulator Core - Rust Engine
//!
//! Deterministic, tick-driven simulation of interconnected national
//! economies on Leontief input-output foundations.
//!
//! # Architecture
//!
//! - **core**: time management (weekly ticks, 52 per year)
//! - **models**: domain types (countries, regions, factions, trade
//!   relations, deposits, facilities, cohorts, formations) and the
//!   arena-backed `SimulationState`
//! - **systems**: the seven subsystems (production, price, trade, labor,
//!   fiscal, political, military placeholder)
//! - **orchestrator**: the tick pipeline, `advance`, checkpoints
//! - **scenario**: JSON scenario loading and MRIO (ICIO) ingestion
//! - **rng**: deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. Monetary stocks are i64 (cents); per-tick flows are f64 cents
//!    committed with deterministic rounding
//! 2. All randomness is deterministic (seeded, per-phase streams)
//! 3. One tick is one atomic operation with a fixed subsystem order;
//!    iteration is always in ascending dense-id order

pub mod core;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod scenario;
pub mod systems;

// Re-exports for convenience
pub use models::commodity::{Commodity, COMMODITY_COUNT};
pub use models::diagnostics::{Diagnostic, DiagnosticsLog};
pub use models::params::SimulationParams;
pub use models::state::SimulationState;
pub use orchestrator::{Simulation, SimulationError, StateSnapshot, TickResult};
pub use rng::RngManager;
pub use scenario::{load_scenario, load_state, ScenarioError};
