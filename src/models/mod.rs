//! Domain models
//!
//! Entity records and the arena-backed state container. Entities reference
//! each other by dense integer id only; the arenas live on
//! [`state::SimulationState`].

pub mod cohort;
pub mod coefficients;
pub mod commodity;
pub mod country;
pub mod deposit;
pub mod diagnostics;
pub mod facility;
pub mod faction;
pub mod military;
pub mod params;
pub mod region;
pub mod state;
pub mod trade;
