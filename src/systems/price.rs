//! Price subsystem
//!
//! Aggregates per-country supply and demand, adjusts prices from relative
//! excess demand, smooths display prices, and recomputes CPI.
//!
//! Demand has three components per region: household consumption (cohorts),
//! intermediate input demand of this tick's production, and maintenance
//! requirements of operational facilities.

use crate::models::commodity::COMMODITY_COUNT;
use crate::models::diagnostics::Diagnostic;
use crate::models::state::SimulationState;

/// Supply denominator guard for the excess-demand ratio.
const SUPPLY_EPSILON: f64 = 1e-4;

/// Fill `region.demand` for every region of the country.
fn aggregate_demand(state: &mut SimulationState, country_id: usize) {
    for region_idx in 0..state.countries[country_id].region_ids.len() {
        let region_id = state.countries[country_id].region_ids[region_idx];

        let mut demand = [0.0f64; COMMODITY_COUNT];

        // Household demand from cohorts.
        for cohort in state.cohorts.iter().filter(|c| c.region_id == region_id) {
            for commodity in crate::models::commodity::Commodity::ALL {
                demand[commodity.index()] += cohort.weekly_demand(commodity);
            }
        }

        // Intermediate demand of this tick's production.
        let matrix = &state.coefficients[country_id];
        let region = &state.regions[region_id];
        for s in 0..COMMODITY_COUNT {
            let output = region.sectors[s].output;
            if output <= 0.0 {
                continue;
            }
            for (input, coefficient) in matrix.required_inputs(s) {
                demand[input] += coefficient * output;
            }
        }

        // Upkeep of operational facilities.
        for facility in state
            .extraction_facilities
            .iter()
            .filter(|f| f.region_id == region_id && f.core.is_operational())
        {
            for c in 0..COMMODITY_COUNT {
                demand[c] += facility.core.maintenance_cost.quantities[c];
            }
        }
        for facility in state
            .manufacturing_facilities
            .iter()
            .filter(|f| f.region_id == region_id && f.core.is_operational())
        {
            for c in 0..COMMODITY_COUNT {
                demand[c] += facility.core.maintenance_cost.quantities[c];
            }
        }

        state.regions[region_id].demand = demand;
    }
}

/// Price phase for one country: demand aggregation, excess-demand price
/// adjustment with bounds, display smoothing, CPI.
pub fn run_prices(state: &mut SimulationState, country_id: usize) {
    aggregate_demand(state, country_id);

    let tick = state.time.current_tick();
    let max_change = state.params.max_price_change;
    let beta = state.params.price_smoothing;

    // Country-level aggregation over regions, ascending id order.
    let mut total_demand = [0.0f64; COMMODITY_COUNT];
    let mut total_supply = [0.0f64; COMMODITY_COUNT];
    for &region_id in &state.countries[country_id].region_ids {
        let region = &state.regions[region_id];
        for c in 0..COMMODITY_COUNT {
            total_demand[c] += region.demand[c];
            total_supply[c] += region.supply[c];
        }
    }

    let mut bound_hits: Vec<Diagnostic> = Vec::new();
    {
        let country = &mut state.countries[country_id];
        for c in 0..COMMODITY_COUNT {
            let excess = ((total_demand[c] - total_supply[c])
                / total_supply[c].max(SUPPLY_EPSILON))
            .clamp(-max_change, max_change);
            let adjusted = country.prices[c] * (1.0 + state.price_sensitivities[c] * excess);

            let floor = 0.1 * country.initial_prices[c];
            let ceiling = 10.0 * country.initial_prices[c];
            let bounded = adjusted.clamp(floor, ceiling);
            if bounded != adjusted {
                bound_hits.push(Diagnostic::PriceBoundHit {
                    tick,
                    country_id,
                    commodity: c,
                    price: adjusted,
                    bound: bounded,
                });
            }
            country.prices[c] = bounded;
            country.display_prices[c] =
                beta * country.prices[c] + (1.0 - beta) * country.display_prices[c];
        }
        country.cpi = compute_cpi(
            &country.prices,
            &country.initial_prices,
            &country.consumption_weights,
        );
    }
    for diagnostic in bound_hits {
        state.diagnostics.record(diagnostic);
    }

    // Mirror country prices into the region sector records.
    let prices = state.countries[country_id].prices;
    for region_idx in 0..state.countries[country_id].region_ids.len() {
        let region_id = state.countries[country_id].region_ids[region_idx];
        let region = &mut state.regions[region_id];
        for c in 0..COMMODITY_COUNT {
            region.sectors[c].price = prices[c];
        }
    }
}

/// Consumption-weighted index of prices relative to initial prices.
///
/// Commodities with a zero or negative basis price are skipped entirely
/// (their weight drops out). Zero total weight yields CPI = 1.
pub fn compute_cpi(
    prices: &[f64; COMMODITY_COUNT],
    initial_prices: &[f64; COMMODITY_COUNT],
    weights: &[f64; COMMODITY_COUNT],
) -> f64 {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for c in 0..COMMODITY_COUNT {
        if initial_prices[c] <= 0.0 || weights[c] <= 0.0 {
            continue;
        }
        weighted_sum += weights[c] * (prices[c] / initial_prices[c]);
        total_weight += weights[c];
    }
    if total_weight <= 0.0 {
        return 1.0;
    }
    weighted_sum / total_weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cohort::{PopulationCohort, WealthLevel};
    use crate::models::coefficients::TechnicalCoefficientMatrix;
    use crate::models::commodity::Commodity;
    use crate::models::country::Country;
    use crate::models::region::Region;

    fn one_region_state() -> SimulationState {
        let mut state = SimulationState::new(2000, 1);
        let mut country = Country::new(0, "AAA".to_string(), "Aland".to_string());
        country.region_ids.push(0);
        state.countries.push(country);
        state.coefficients.push(TechnicalCoefficientMatrix::zero());
        state.regions.push(Region::new(0, 0, "Core".to_string()));
        state
    }

    #[test]
    fn test_excess_demand_raises_price() {
        // P = 100, D = 150, S = 100, sensitivity 0.15 → 107.5.
        // A Middle cohort of 7800 demands exactly 150 Services per week.
        let mut state = one_region_state();
        let services = Commodity::Services.index();
        state.price_sensitivities = [0.15; COMMODITY_COUNT];
        state.countries[0].prices[services] = 100.0;
        state.countries[0].initial_prices[services] = 100.0;
        state.regions[0].supply[services] = 100.0;
        state.cohorts.push(PopulationCohort::new(
            0,
            0,
            Commodity::Services,
            WealthLevel::Middle,
            7800.0,
        ));
        let mut multipliers = [0.0; COMMODITY_COUNT];
        multipliers[services] = 1.0;
        state.cohorts[0].consumption_multipliers = multipliers;

        run_prices(&mut state, 0);
        assert!((state.regions[0].demand[services] - 150.0).abs() < 1e-9);
        assert!((state.countries[0].prices[services] - 107.5).abs() < 1e-9);
    }

    #[test]
    fn test_equilibrium_leaves_price_unchanged() {
        let mut state = one_region_state();
        state.price_sensitivities = [0.15; COMMODITY_COUNT];
        for c in 0..COMMODITY_COUNT {
            state.countries[0].prices[c] = 100.0;
            state.countries[0].initial_prices[c] = 100.0;
            state.countries[0].display_prices[c] = 100.0;
            state.regions[0].supply[c] = 0.0;
        }
        // No cohorts, no output, no facilities: D = S = 0 for every
        // commodity, excess = 0.
        run_prices(&mut state, 0);
        for c in 0..COMMODITY_COUNT {
            assert!(
                (state.countries[0].prices[c] - 100.0).abs() < 1e-12,
                "price {} moved at equilibrium",
                c
            );
        }
    }

    #[test]
    fn test_cpi_skips_zero_basis() {
        let mut prices = [100.0; COMMODITY_COUNT];
        let mut initial = [100.0; COMMODITY_COUNT];
        let mut weights = [0.0; COMMODITY_COUNT];
        weights[0] = 1.0;
        weights[1] = 1.0;
        prices[0] = 150.0;
        initial[1] = 0.0; // skipped
        let cpi = compute_cpi(&prices, &initial, &weights);
        assert!((cpi - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_cpi_zero_weights_is_one() {
        let prices = [100.0; COMMODITY_COUNT];
        let initial = [100.0; COMMODITY_COUNT];
        let weights = [0.0; COMMODITY_COUNT];
        assert_eq!(compute_cpi(&prices, &initial, &weights), 1.0);
    }

    #[test]
    fn test_price_ceiling_clamped() {
        let mut state = one_region_state();
        let agriculture = Commodity::Agriculture.index();
        state.price_sensitivities = [1.0; COMMODITY_COUNT];
        state.countries[0].prices[agriculture] = 999.0;
        state.countries[0].initial_prices[agriculture] = 100.0;
        // Hungry cohort, zero supply: maximum excess demand.
        state.cohorts.push(PopulationCohort::new(
            0,
            0,
            Commodity::Agriculture,
            WealthLevel::Middle,
            10_000.0,
        ));
        run_prices(&mut state, 0);
        assert_eq!(state.countries[0].prices[agriculture], 1000.0);
        assert_eq!(state.diagnostics.len(), 1);
    }
}
