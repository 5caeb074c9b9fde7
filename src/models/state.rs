//! Simulation State
//!
//! The single mutable world. Every entity kind lives in a dense arena
//! indexed by its id; all cross-references are ids. Subsystems borrow the
//! state exclusively for their phase, which resolves the cyclic
//! country ↔ region ↔ faction ↔ trade-relation ownership without pointers
//! and keeps hot-loop lookups O(1).
//!
//! # Critical Invariants
//!
//! 1. Arena ids are stable: no entity is added or removed after load
//! 2. `coefficients[i]` is the technical coefficient matrix of
//!    `countries[i]`
//! 3. Iteration in ascending id order is the documented deterministic
//!    reduction order
//! 4. Inventories and remaining reserves are never negative; prices stay
//!    within `[0.1, 10] × initial`

use crate::core::time::TimeManager;
use crate::models::cohort::PopulationCohort;
use crate::models::coefficients::TechnicalCoefficientMatrix;
use crate::models::commodity::COMMODITY_COUNT;
use crate::models::country::Country;
use crate::models::deposit::ResourceDeposit;
use crate::models::diagnostics::{Diagnostic, DiagnosticsLog};
use crate::models::facility::{ExtractionFacility, ManufacturingFacility};
use crate::models::faction::Faction;
use crate::models::military::MilitaryFormation;
use crate::models::params::SimulationParams;
use crate::models::region::Region;
use crate::models::trade::TradeRelation;
use crate::rng::{RngManager, RngPhase};
use serde::{Deserialize, Serialize};

/// Complete simulation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    /// Tick counter and calendar.
    pub time: TimeManager,
    /// Seed the run was started with; every per-tick stream derives from it.
    base_seed: u64,
    /// Tick-scoped generator, reseeded deterministically at each tick
    /// boundary.
    pub rng: RngManager,
    pub params: SimulationParams,

    // Entity arenas, indexed by dense id
    pub countries: Vec<Country>,
    /// Technical coefficient matrices, parallel to `countries`.
    pub coefficients: Vec<TechnicalCoefficientMatrix>,
    pub regions: Vec<Region>,
    pub factions: Vec<Faction>,
    pub trade_relations: Vec<TradeRelation>,
    pub deposits: Vec<ResourceDeposit>,
    pub extraction_facilities: Vec<ExtractionFacility>,
    pub manufacturing_facilities: Vec<ManufacturingFacility>,
    pub cohorts: Vec<PopulationCohort>,
    pub formations: Vec<MilitaryFormation>,

    // Process-wide per-commodity parameters
    pub labor_coefficients: [f64; COMMODITY_COUNT],
    pub price_sensitivities: [f64; COMMODITY_COUNT],
    pub spoilage_rates: [f64; COMMODITY_COUNT],

    pub diagnostics: DiagnosticsLog,
}

impl SimulationState {
    /// Create an empty state at tick 0. Scenario loading populates the
    /// arenas; tests build entities directly.
    pub fn new(start_year: i32, seed: u64) -> Self {
        Self {
            time: TimeManager::new(start_year),
            base_seed: seed,
            rng: RngManager::for_phase(seed, 0, RngPhase::TickStart),
            params: SimulationParams::default(),
            countries: Vec::new(),
            coefficients: Vec::new(),
            regions: Vec::new(),
            factions: Vec::new(),
            trade_relations: Vec::new(),
            deposits: Vec::new(),
            extraction_facilities: Vec::new(),
            manufacturing_facilities: Vec::new(),
            cohorts: Vec::new(),
            formations: Vec::new(),
            labor_coefficients: [0.0; COMMODITY_COUNT],
            price_sensitivities: [0.1; COMMODITY_COUNT],
            spoilage_rates: [0.0; COMMODITY_COUNT],
            diagnostics: DiagnosticsLog::new(),
        }
    }

    /// Base seed of the run.
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Current tick.
    pub fn tick(&self) -> u64 {
        self.time.current_tick()
    }

    // =========================================================================
    // Accessors by id
    // =========================================================================

    pub fn country(&self, id: usize) -> Option<&Country> {
        self.countries.get(id)
    }

    pub fn country_mut(&mut self, id: usize) -> Option<&mut Country> {
        self.countries.get_mut(id)
    }

    pub fn region(&self, id: usize) -> Option<&Region> {
        self.regions.get(id)
    }

    pub fn region_mut(&mut self, id: usize) -> Option<&mut Region> {
        self.regions.get_mut(id)
    }

    pub fn faction(&self, id: usize) -> Option<&Faction> {
        self.factions.get(id)
    }

    pub fn trade_relation(&self, id: usize) -> Option<&TradeRelation> {
        self.trade_relations.get(id)
    }

    pub fn deposit(&self, id: usize) -> Option<&ResourceDeposit> {
        self.deposits.get(id)
    }

    pub fn cohort(&self, id: usize) -> Option<&PopulationCohort> {
        self.cohorts.get(id)
    }

    pub fn formation(&self, id: usize) -> Option<&MilitaryFormation> {
        self.formations.get(id)
    }

    /// Region ids belonging to a country, in ascending id order.
    ///
    /// Countries carry their `region_ids` in load order, which is ascending
    /// by construction; this is the documented iteration order for
    /// per-country region loops.
    pub fn region_ids_of(&self, country_id: usize) -> &[usize] {
        self.countries
            .get(country_id)
            .map(|c| c.region_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Cohort ids in a region, ascending.
    pub fn cohort_ids_in_region(&self, region_id: usize) -> Vec<usize> {
        self.cohorts
            .iter()
            .filter(|c| c.region_id == region_id)
            .map(|c| c.id)
            .collect()
    }

    // =========================================================================
    // Determinism plumbing
    // =========================================================================

    /// Reseed the tick-scoped RNG for the coming tick. Called by the engine
    /// at the end of every tick.
    pub fn reseed_rng(&mut self) {
        self.rng = RngManager::for_phase(
            self.base_seed,
            self.time.current_tick(),
            RngPhase::TickStart,
        );
    }

    // =========================================================================
    // Invariant repair and numeric checks
    // =========================================================================

    /// Repair the clampable global invariants in place, recording a
    /// diagnostic for each repair. Debug builds assert instead of silently
    /// repairing.
    ///
    /// Covers: non-negative inventories and reserves, price bounds,
    /// bounded political scalars, non-negative debt.
    pub fn repair_invariants(&mut self) {
        let tick = self.time.current_tick();
        let mut repairs: Vec<Diagnostic> = Vec::new();

        for region in &mut self.regions {
            for c in 0..COMMODITY_COUNT {
                if region.inventory[c] < 0.0 {
                    debug_assert!(
                        region.inventory[c] > -1e-6,
                        "inventory materially negative: {}",
                        region.inventory[c]
                    );
                    repairs.push(Diagnostic::InvariantRepaired {
                        tick,
                        context: format!("region {} inventory[{}]", region.id, c),
                        value: region.inventory[c],
                        clamped_to: 0.0,
                    });
                    region.inventory[c] = 0.0;
                }
            }
            region.unrest = region.unrest.clamp(0.0, 100.0);
            region.food_insecurity = region.food_insecurity.clamp(0.0, 1.0);
        }

        for deposit in &mut self.deposits {
            if deposit.remaining_reserves < 0.0 {
                repairs.push(Diagnostic::InvariantRepaired {
                    tick,
                    context: format!("deposit {} remaining_reserves", deposit.id),
                    value: deposit.remaining_reserves,
                    clamped_to: 0.0,
                });
                deposit.remaining_reserves = 0.0;
            }
        }

        for country in &mut self.countries {
            for c in 0..COMMODITY_COUNT {
                let floor = 0.1 * country.initial_prices[c];
                let ceiling = 10.0 * country.initial_prices[c];
                if country.prices[c] < floor || country.prices[c] > ceiling {
                    let clamped = country.prices[c].clamp(floor, ceiling);
                    repairs.push(Diagnostic::InvariantRepaired {
                        tick,
                        context: format!("country {} price[{}]", country.id, c),
                        value: country.prices[c],
                        clamped_to: clamped,
                    });
                    country.prices[c] = clamped;
                }
            }
            if country.debt < 0 {
                repairs.push(Diagnostic::InvariantRepaired {
                    tick,
                    context: format!("country {} debt", country.id),
                    value: country.debt as f64,
                    clamped_to: 0.0,
                });
                country.debt = 0;
            }
            country.legitimacy = country.legitimacy.clamp(0.0, 100.0);
            country.corruption = country.corruption.clamp(0.0, 1.0);
            country.average_unrest = country.average_unrest.clamp(0.0, 100.0);
            country.procurement_satisfaction =
                country.procurement_satisfaction.clamp(0.0, 1.0);
        }

        for faction in &mut self.factions {
            faction.satisfaction = faction.satisfaction.clamp(0.0, 100.0);
            faction.power = faction.power.clamp(0.01, 1.0);
        }

        for relation in &mut self.trade_relations {
            relation.sanction_severity = relation.sanction_severity.clamp(0.0, 1.0);
            for c in 0..COMMODITY_COUNT {
                relation.tariff_rates[c] = relation.tariff_rates[c].clamp(0.0, 1.0);
            }
        }

        for facility in &mut self.extraction_facilities {
            facility.core.condition = facility.core.condition.clamp(0.0, 1.0);
        }
        for facility in &mut self.manufacturing_facilities {
            facility.core.condition = facility.core.condition.clamp(0.0, 1.0);
        }
        for formation in &mut self.formations {
            formation.supply_status = formation.supply_status.clamp(0.0, 1.0);
            formation.readiness = formation.readiness.clamp(0.0, 1.0);
            formation.morale = formation.morale.clamp(0.0, 1.0);
        }

        for diagnostic in repairs {
            self.diagnostics.record(diagnostic);
        }
    }

    /// Scan for non-finite values in the numeric hot paths. Returns the
    /// first offending location. Non-finite state is a programmer bug and
    /// the engine treats it as fatal.
    pub fn find_non_finite(&self) -> Option<String> {
        for country in &self.countries {
            for c in 0..COMMODITY_COUNT {
                if !country.prices[c].is_finite() {
                    return Some(format!("country {} price[{}]", country.id, c));
                }
            }
            if !country.cpi.is_finite() {
                return Some(format!("country {} cpi", country.id));
            }
            if !country.trade_balance.is_finite() {
                return Some(format!("country {} trade_balance", country.id));
            }
            if !country.tax_revenue.is_finite() {
                return Some(format!("country {} tax_revenue", country.id));
            }
        }
        for region in &self.regions {
            for c in 0..COMMODITY_COUNT {
                if !region.inventory[c].is_finite()
                    || !region.supply[c].is_finite()
                    || !region.demand[c].is_finite()
                {
                    return Some(format!("region {} arrays[{}]", region.id, c));
                }
                if !region.sectors[c].output.is_finite()
                    || !region.sectors[c].wage.is_finite()
                {
                    return Some(format!("region {} sector[{}]", region.id, c));
                }
            }
        }
        for faction in &self.factions {
            if !faction.satisfaction.is_finite() || !faction.power.is_finite() {
                return Some(format!("faction {}", faction.id));
            }
        }
        None
    }
}
