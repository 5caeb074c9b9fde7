//! Simulation engine
//!
//! Main tick loop integrating the seven subsystems over the shared state:
//!
//! ```text
//! For each tick t:
//! 1. Production (all countries, id order)
//! 2. Trade (all directed relations, insertion order)
//! 3. Labor (all countries, id order)
//! 4. Price aggregation, adjustment, CPI (all countries, id order)
//! 5. If t % 4 == 0: Fiscal, then Political, then Military (id order)
//! 6. Spoilage (non-stockpileables zeroed)
//! 7. Facility condition decay + military equipment aging
//! 8. CPI history rotation if t % 52 == 0
//! 9. Invariant repair, numeric check, tick += 1, RNG reseed
//! ```
//!
//! The ordering is fixed; within every step, iteration runs in ascending
//! dense-id order, which is the documented deterministic reduction order.
//! One tick is one atomic logical operation: no suspension, no I/O.

use crate::models::params::ParamsError;
use crate::models::state::SimulationState;
use crate::systems::{fiscal, labor, military, political, price, production, trade};
use thiserror::Error;

/// Errors surfaced by the engine. Numeric and lookup failures indicate a
/// programmer bug and abort the tick; everything else is reported at the
/// API boundary without touching a running tick.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A numeric operation produced NaN or ±inf. Fatal.
    #[error("non-finite value produced at {context}")]
    NonFinite { context: String },

    /// An entity id was out of range. Fatal.
    #[error("{entity} id {id} out of range (arena holds {len})")]
    IdOutOfRange {
        entity: &'static str,
        id: usize,
        len: usize,
    },

    /// Parameter outside its documented range.
    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] ParamsError),

    /// Snapshot serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Snapshot deserialization failed.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// Snapshot was captured under a different configuration.
    #[error("config hash mismatch: snapshot {snapshot}, state {state}")]
    ConfigMismatch { snapshot: String, state: String },
}

/// Summary of one executed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    /// Tick that was executed (pre-increment numbering).
    pub tick: u64,
    /// Whether the fiscal/political/military gate ran.
    pub fiscal_ran: bool,
    /// Diagnostics emitted during this tick.
    pub diagnostics_emitted: usize,
    /// Sum of country GDPs after the tick, i64 cents.
    pub world_gdp: i64,
}

/// The simulation engine: owns the state and advances it tick by tick.
///
/// # Example
/// ```
/// use economy_simulator_core_rs::models::state::SimulationState;
/// use economy_simulator_core_rs::orchestrator::Simulation;
///
/// let state = SimulationState::new(1990, 42);
/// let mut sim = Simulation::new(state).unwrap();
/// let result = sim.tick().unwrap();
/// assert_eq!(result.tick, 0);
/// assert_eq!(sim.state().tick(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    state: SimulationState,
}

impl Simulation {
    /// Wrap a loaded state, validating its parameters.
    pub fn new(state: SimulationState) -> Result<Self, SimulationError> {
        state.params.validate()?;
        Ok(Self { state })
    }

    /// Read-only view of the world.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Mutable access between ticks (policy changes, sanctions, shocks).
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    /// Consume the engine and return the state.
    pub fn into_state(self) -> SimulationState {
        self.state
    }

    /// Execute one tick.
    pub fn tick(&mut self) -> Result<TickResult, SimulationError> {
        let state = &mut self.state;
        let tick = state.time.current_tick();
        let diagnostics_before = state.diagnostics.len();
        let fiscal_ran = state.time.is_fiscal_tick();
        let country_count = state.countries.len();

        // STEP 1: PRODUCTION
        for country_id in 0..country_count {
            production::run_production(state, country_id);
        }

        // STEP 2: TRADE
        trade::run_trade(state);

        // STEP 3: LABOR
        for country_id in 0..country_count {
            labor::run_labor(state, country_id);
        }

        // STEP 4: PRICES AND CPI
        for country_id in 0..country_count {
            price::run_prices(state, country_id);
        }

        // STEP 5: MONTHLY GATE (fiscal, political, military)
        if fiscal_ran {
            for country_id in 0..country_count {
                fiscal::run_fiscal(state, country_id);
            }
            for country_id in 0..country_count {
                political::run_politics(state, country_id);
            }
            for country_id in 0..country_count {
                military::run_military(state, country_id);
            }
        }

        // STEP 6: SPOILAGE
        production::apply_spoilage(state);

        // STEP 7: DECAY AND AGING
        production::decay_facilities(state);
        military::age_military_equipment(state);

        // STEP 8: CPI HISTORY ROTATION
        if state.time.is_year_boundary() {
            for country in &mut state.countries {
                country.cpi_year_ago = country.cpi;
            }
        }

        // STEP 9: INVARIANT SWEEP, ADVANCE, RESEED
        state.repair_invariants();
        if let Some(context) = state.find_non_finite() {
            return Err(SimulationError::NonFinite { context });
        }
        state.time.advance_tick();
        state.reseed_rng();

        let world_gdp = state.countries.iter().map(|c| c.gdp).sum();
        Ok(TickResult {
            tick,
            fiscal_ran,
            diagnostics_emitted: state.diagnostics.len() - diagnostics_before,
            world_gdp,
        })
    }

    /// Execute `n` ticks, returning the per-tick summaries.
    pub fn advance(&mut self, n: u64) -> Result<Vec<TickResult>, SimulationError> {
        let mut results = Vec::with_capacity(n as usize);
        for _ in 0..n {
            results.push(self.tick()?);
        }
        Ok(results)
    }

    // =========================================================================
    // Checked accessors (id out of range is fatal)
    // =========================================================================

    pub fn country(
        &self,
        id: usize,
    ) -> Result<&crate::models::country::Country, SimulationError> {
        self.state
            .country(id)
            .ok_or(SimulationError::IdOutOfRange {
                entity: "country",
                id,
                len: self.state.countries.len(),
            })
    }

    pub fn region(
        &self,
        id: usize,
    ) -> Result<&crate::models::region::Region, SimulationError> {
        self.state.region(id).ok_or(SimulationError::IdOutOfRange {
            entity: "region",
            id,
            len: self.state.regions.len(),
        })
    }

    pub fn faction(
        &self,
        id: usize,
    ) -> Result<&crate::models::faction::Faction, SimulationError> {
        self.state
            .faction(id)
            .ok_or(SimulationError::IdOutOfRange {
                entity: "faction",
                id,
                len: self.state.factions.len(),
            })
    }

    pub fn trade_relation(
        &self,
        id: usize,
    ) -> Result<&crate::models::trade::TradeRelation, SimulationError> {
        self.state
            .trade_relation(id)
            .ok_or(SimulationError::IdOutOfRange {
                entity: "trade relation",
                id,
                len: self.state.trade_relations.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::coefficients::TechnicalCoefficientMatrix;
    use crate::models::country::Country;
    use crate::models::region::Region;

    fn small_world() -> SimulationState {
        let mut state = SimulationState::new(2000, 7);
        let mut country = Country::new(0, "AAA".to_string(), "Aland".to_string());
        country.region_ids.push(0);
        country.gdp = 52_000_000;
        state.countries.push(country);
        state.coefficients.push(TechnicalCoefficientMatrix::zero());
        let mut region = Region::new(0, 0, "Core".to_string());
        region.labor_force = 100.0;
        region.sectors[0].capacity = 50.0;
        region.sectors[0].labor_coefficient = 1.0;
        state.regions.push(region);
        state
    }

    #[test]
    fn test_tick_advances_counter() {
        let mut sim = Simulation::new(small_world()).unwrap();
        let result = sim.tick().unwrap();
        assert_eq!(result.tick, 0);
        assert!(result.fiscal_ran);
        assert_eq!(sim.state().tick(), 1);
        let result = sim.tick().unwrap();
        assert_eq!(result.tick, 1);
        assert!(!result.fiscal_ran);
    }

    #[test]
    fn test_advance_runs_n_ticks() {
        let mut sim = Simulation::new(small_world()).unwrap();
        let results = sim.advance(8).unwrap();
        assert_eq!(results.len(), 8);
        assert_eq!(sim.state().tick(), 8);
        let fiscal_count = results.iter().filter(|r| r.fiscal_ran).count();
        assert_eq!(fiscal_count, 2); // ticks 0 and 4
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut state = small_world();
        state.params.legitimacy_rate = 0.9;
        assert!(matches!(
            Simulation::new(state),
            Err(SimulationError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_lookup_out_of_range_is_error() {
        let sim = Simulation::new(small_world()).unwrap();
        assert!(sim.country(0).is_ok());
        assert!(matches!(
            sim.country(5),
            Err(SimulationError::IdOutOfRange {
                entity: "country",
                id: 5,
                ..
            })
        ));
    }

    #[test]
    fn test_nan_price_is_fatal() {
        let mut sim = Simulation::new(small_world()).unwrap();
        sim.state_mut().countries[0].prices[0] = f64::NAN;
        assert!(matches!(
            sim.tick(),
            Err(SimulationError::NonFinite { .. })
        ));
    }
}
