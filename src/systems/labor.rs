//! Labor subsystem
//!
//! Allocates each region's labor force across sectors in proportion to
//! demand, adjusts wages from market tightness, optionally lets workers
//! drift toward better-paying sectors, and pays the wage bill out to the
//! region's population cohorts.

use crate::models::commodity::{Commodity, COMMODITY_COUNT};
use crate::models::state::SimulationState;

/// Conservation tolerance for the mobility correction, in workers.
const MOBILITY_TOLERANCE: f64 = 0.01;

/// Labor phase for one country.
pub fn run_labor(state: &mut SimulationState, country_id: usize) {
    let wage_sensitivity = state.params.wage_sensitivity;
    let wage_floor = state.params.wage_floor;
    let mobility = state.params.labor_mobility;

    let mut country_employed = 0.0;
    let mut country_wages = 0.0;

    for region_idx in 0..state.countries[country_id].region_ids.len() {
        let region_id = state.countries[country_id].region_ids[region_idx];
        let region = &mut state.regions[region_id];

        // Demand: workers needed to run every sector at capacity.
        let mut demand = [0.0f64; COMMODITY_COUNT];
        let mut total_demand = 0.0;
        for s in 0..COMMODITY_COUNT {
            demand[s] = region.sectors[s].labor_coefficient * region.sectors[s].capacity;
            total_demand += demand[s];
        }

        // Proportional allocation, scaled down when labor is scarce.
        let factor = if total_demand > 0.0 && region.labor_force > 0.0 {
            (region.labor_force / total_demand).min(1.0)
        } else {
            0.0
        };
        for s in 0..COMMODITY_COUNT {
            region.sectors[s].labor_employed = demand[s] * factor;
        }

        // Wages respond to tightness (demand over allocated supply).
        for s in 0..COMMODITY_COUNT {
            let sector = &mut region.sectors[s];
            let employed = sector.labor_employed;
            if employed <= 0.0 && demand[s] > 0.0 {
                // No one to hire at all: extreme tightness.
                sector.wage *= 1.0 + 0.5 * wage_sensitivity;
            } else if employed > 0.0 {
                let tightness = demand[s] / employed;
                let adjustment =
                    (wage_sensitivity * (tightness - 1.0)).clamp(-0.1, 0.1);
                sector.wage = (sector.wage * (1.0 + adjustment)).max(wage_floor);
            } else {
                sector.wage = sector.wage.max(wage_floor);
            }
        }

        if mobility > 0.0 {
            apply_mobility(region, mobility);
        }

        // Regional aggregates.
        let mut employed_total = 0.0;
        let mut wage_bill = 0.0;
        for s in 0..COMMODITY_COUNT {
            employed_total += region.sectors[s].labor_employed;
            wage_bill += region.sectors[s].wage_bill();
        }
        region.employed = employed_total;
        region.average_wage = if employed_total > 0.0 {
            wage_bill / employed_total
        } else {
            wage_floor
        };

        country_employed += employed_total;
        country_wages += wage_bill;

        // Pay the wage bill out to cohorts by population and earning
        // weight, and settle their books for the tick.
        let prices = state.countries[country_id].prices;
        let mut earning_total = 0.0;
        for cohort in state.cohorts.iter().filter(|c| c.region_id == region_id) {
            earning_total += cohort.population * cohort.wealth_level.earning_weight();
        }
        if earning_total > 0.0 {
            for cohort in state
                .cohorts
                .iter_mut()
                .filter(|c| c.region_id == region_id)
            {
                let share =
                    cohort.population * cohort.wealth_level.earning_weight() / earning_total;
                cohort.income = wage_bill * share;
                cohort.wealth += cohort.income * cohort.savings_rate;
                cohort.cost_of_living = if cohort.population > 0.0 {
                    Commodity::ALL
                        .iter()
                        .map(|&c| cohort.weekly_demand(c) * prices[c.index()])
                        .sum::<f64>()
                        / cohort.population
                } else {
                    0.0
                };
            }
        }
    }

    let country = &mut state.countries[country_id];
    country.employed = country_employed;
    country.wages_paid = country_wages;
}

/// Shift workers toward above-average-wage sectors, preserving the total.
fn apply_mobility(region: &mut crate::models::region::Region, rate: f64) {
    let mut employed_total = 0.0;
    let mut wage_weighted = 0.0;
    for s in 0..COMMODITY_COUNT {
        employed_total += region.sectors[s].labor_employed;
        wage_weighted += region.sectors[s].labor_employed * region.sectors[s].wage;
    }
    if employed_total <= 0.0 {
        return;
    }
    let average_wage = wage_weighted / employed_total;
    if average_wage <= 0.0 {
        return;
    }

    let mut shifted_total = 0.0;
    for s in 0..COMMODITY_COUNT {
        let sector = &mut region.sectors[s];
        let drift = rate * sector.labor_employed * (sector.wage - average_wage) / average_wage;
        sector.labor_employed = (sector.labor_employed + drift).max(0.0);
        shifted_total += sector.labor_employed;
    }

    // Conservation correction: redistribute any residual uniformly over
    // staffed sectors.
    let residual = employed_total - shifted_total;
    if residual.abs() > MOBILITY_TOLERANCE {
        let staffed = (0..COMMODITY_COUNT)
            .filter(|&s| region.sectors[s].labor_employed > 0.0)
            .count();
        if staffed > 0 {
            let per_sector = residual / staffed as f64;
            for s in 0..COMMODITY_COUNT {
                if region.sectors[s].labor_employed > 0.0 {
                    region.sectors[s].labor_employed =
                        (region.sectors[s].labor_employed + per_sector).max(0.0);
                }
            }
        }
    }
}
