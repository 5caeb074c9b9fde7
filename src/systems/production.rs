//! Production subsystem
//!
//! Soft-Leontief sector production, extraction and manufacturing facility
//! output, input consumption, value added, and supply aggregation for one
//! country.
//!
//! # Phase discipline
//!
//! All sector outputs in a region are computed from the inventory as it
//! stood at the start of the phase, and only then are inputs consumed, in
//! commodity index order. A single compute-then-consume pass keeps results
//! independent of sector ordering within the tick.
//!
//! # Failure semantics
//!
//! Nothing here returns an error. Zero labor, zero inventory, and exhausted
//! deposits all propagate as numeric zeros; divisors of zero are treated as
//! "no constraint" where the quantity is a requirement, or guarded by an
//! epsilon clamp where it is a denominator.

use crate::models::coefficients::TechnicalCoefficientMatrix;
use crate::models::commodity::{Commodity, COMMODITY_COUNT};
use crate::models::diagnostics::Diagnostic;
use crate::models::state::SimulationState;

/// Input satisfaction blend for one output commodity: σ_min and σ_avg over
/// the required inputs, combined as `α·σ_min + (1−α)·σ_avg`.
///
/// `reference_scale` is the output level the requirement is sized against
/// (sector capacity, or facility nominal output). With no required inputs
/// the satisfaction is 1.
fn input_satisfaction(
    matrix: &TechnicalCoefficientMatrix,
    inventory: &[f64; COMMODITY_COUNT],
    output: usize,
    reference_scale: f64,
    alpha: f64,
) -> f64 {
    let mut min_sat = f64::INFINITY;
    let mut sum_sat = 0.0;
    let mut count = 0u32;
    for (input, coefficient) in matrix.required_inputs(output) {
        let required = coefficient * reference_scale;
        let satisfaction = if required <= 0.0 {
            1.0
        } else {
            (inventory[input] / required).min(1.0)
        };
        min_sat = min_sat.min(satisfaction);
        sum_sat += satisfaction;
        count += 1;
    }
    if count == 0 {
        return 1.0;
    }
    let avg_sat = sum_sat / count as f64;
    alpha * min_sat + (1.0 - alpha) * avg_sat
}

/// Run production for every region of one country.
///
/// Sets `sector.output` and `sector.value_added`, mutates region
/// inventories (input consumption, output accrual), runs extraction and
/// manufacturing facilities, and sets `region.supply`.
pub fn run_production(state: &mut SimulationState, country_id: usize) {
    let tick = state.time.current_tick();
    let alpha = state.params.input_blend_alpha;

    for region_idx in 0..state.countries[country_id].region_ids.len() {
        let region_id = state.countries[country_id].region_ids[region_idx];
        // Field-level borrows: matrix and prices shared, region exclusive.
        let matrix = &state.coefficients[country_id];
        let prices = &state.countries[country_id].prices;
        let region = &mut state.regions[region_id];
        let infrastructure = region.infrastructure;

        // Inventory carried over from the previous tick, before any of
        // this tick's production lands in it.
        let carried = region.inventory;

        // Pass 1: outputs for all sectors from the carried inventory.
        let mut outputs = [0.0f64; COMMODITY_COUNT];
        for s in 0..COMMODITY_COUNT {
            let sector = &region.sectors[s];
            let capacity = sector.capacity;
            if capacity <= 0.0 {
                continue;
            }
            let q_cap = capacity;
            // Zero labor coefficient means labor does not constrain.
            let q_lab = if sector.labor_coefficient > 0.0 {
                sector.labor_employed / sector.labor_coefficient
            } else {
                f64::INFINITY
            };
            let q_in = capacity * input_satisfaction(matrix, &carried, s, capacity, alpha);
            let q = q_cap.min(q_lab).min(q_in);
            outputs[s] = (q * infrastructure * sector.efficiency).max(0.0);
        }

        // Pass 2: consume inputs in commodity index order.
        for s in 0..COMMODITY_COUNT {
            if outputs[s] <= 0.0 {
                continue;
            }
            for (input, coefficient) in matrix.required_inputs(s) {
                let used = (coefficient * outputs[s]).min(region.inventory[input]);
                region.inventory[input] -= used;
            }
        }

        // Value added at current country prices.
        for s in 0..COMMODITY_COUNT {
            let revenue = outputs[s] * prices[s];
            let input_cost: f64 = matrix
                .required_inputs(s)
                .map(|(input, coefficient)| coefficient * outputs[s] * prices[input])
                .sum();
            let sector = &mut region.sectors[s];
            sector.output = outputs[s];
            sector.value_added = revenue - input_cost;
            region.inventory[s] += outputs[s];
        }

        // Extraction facilities feeding raw-resource supply.
        let mut extraction_outputs = [0.0f64; COMMODITY_COUNT];
        for facility in state
            .extraction_facilities
            .iter_mut()
            .filter(|f| f.region_id == region_id)
        {
            facility.core.output = 0.0;
            if !facility.core.is_operational() {
                continue;
            }
            let deposit = &mut state.deposits[facility.deposit_id];
            if deposit.is_exhausted() {
                continue;
            }
            let nominal = deposit.base_yield
                * facility.core.level as f64
                * facility.core.workforce_factor()
                * facility.core.condition_factor()
                * infrastructure
                * facility.tech_modifier;
            let extracted = deposit.deplete(nominal);
            facility.core.output = extracted;
            extraction_outputs[deposit.resource.index()] += extracted;
            if deposit.is_exhausted() {
                state.diagnostics.record(Diagnostic::DepositExhausted {
                    tick,
                    deposit_id: deposit.id,
                });
            }
        }

        // Manufacturing facilities: same shape, with an input-satisfaction
        // factor from the shared inventory pool. No separate input
        // accounting; the factor alone throttles output.
        let mut manufacturing_outputs = [0.0f64; COMMODITY_COUNT];
        for facility in state
            .manufacturing_facilities
            .iter_mut()
            .filter(|f| f.region_id == region_id)
        {
            facility.core.output = 0.0;
            if !facility.core.is_operational() {
                continue;
            }
            let commodity = facility.output_commodity.index();
            let nominal = facility.base_capacity
                * facility.core.level as f64
                * facility.core.workforce_factor()
                * facility.core.condition_factor()
                * infrastructure
                * facility.tech_modifier;
            let matrix = &state.coefficients[country_id];
            let region_inventory = &state.regions[region_id].inventory;
            let satisfaction =
                input_satisfaction(matrix, region_inventory, commodity, nominal, alpha);
            let produced = (nominal * satisfaction).max(0.0);
            facility.core.output = produced;
            manufacturing_outputs[commodity] += produced;
        }

        // Supply aggregation: this tick's production plus the carryover.
        let region = &mut state.regions[region_id];
        for c in 0..COMMODITY_COUNT {
            region.inventory[c] += extraction_outputs[c] + manufacturing_outputs[c];
            region.supply[c] = region.sectors[c].output
                + extraction_outputs[c]
                + manufacturing_outputs[c]
                + carried[c];
            region.sectors[c].inventory = region.inventory[c];
        }
    }
}

/// Facility condition decay (scheduler step 7). Maintenance is drawn from
/// the facility's region inventory; the satisfied fraction scales the
/// repair term.
pub fn decay_facilities(state: &mut SimulationState) {
    let tick = state.time.current_tick();
    let repair_rate = state.params.facility_repair_rate;
    let mut destroyed: Vec<usize> = Vec::new();

    for facility in &mut state.extraction_facilities {
        let region = &mut state.regions[facility.region_id];
        let satisfaction =
            consume_maintenance(&mut region.inventory, &facility.core.maintenance_cost.quantities);
        if facility.core.decay(satisfaction, repair_rate) {
            destroyed.push(facility.id);
        }
    }
    for facility in &mut state.manufacturing_facilities {
        let region = &mut state.regions[facility.region_id];
        let satisfaction =
            consume_maintenance(&mut region.inventory, &facility.core.maintenance_cost.quantities);
        if facility.core.decay(satisfaction, repair_rate) {
            destroyed.push(facility.id);
        }
    }
    for diag_id in destroyed {
        state.diagnostics.record(Diagnostic::FacilityDestroyed {
            tick,
            facility_id: diag_id,
        });
    }
}

/// Consume as much of a maintenance bundle as the inventory covers.
/// Returns the satisfied fraction in [0, 1] (1 when nothing is required).
fn consume_maintenance(
    inventory: &mut [f64; COMMODITY_COUNT],
    required: &[f64; COMMODITY_COUNT],
) -> f64 {
    let mut min_fraction = 1.0f64;
    for c in 0..COMMODITY_COUNT {
        if required[c] > 0.0 {
            min_fraction = min_fraction.min((inventory[c] / required[c]).min(1.0));
        }
    }
    if min_fraction > 0.0 {
        for c in 0..COMMODITY_COUNT {
            if required[c] > 0.0 {
                inventory[c] = (inventory[c] - required[c] * min_fraction).max(0.0);
            }
        }
    }
    min_fraction
}

/// End-of-tick spoilage (scheduler step 6): stockpileable inventory decays
/// by its spoilage rate; Electricity and Services are discarded entirely.
pub fn apply_spoilage(state: &mut SimulationState) {
    for region in &mut state.regions {
        for commodity in Commodity::ALL {
            let c = commodity.index();
            if commodity.is_stockpileable() {
                region.inventory[c] =
                    (region.inventory[c] * (1.0 - state.spoilage_rates[c])).max(0.0);
            } else {
                region.inventory[c] = 0.0;
            }
            region.sectors[c].inventory = region.inventory[c];
        }
    }
}
