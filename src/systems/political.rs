//! Political subsystem
//!
//! Runs on the monthly gate, after fiscal: recomputes faction satisfaction
//! from policy outcomes, checks red lines, converges legitimacy toward
//! power-weighted satisfaction, drifts faction power, and refreshes
//! regional unrest.
//!
//! # Critical Invariants
//!
//! - Faction powers of a country sum to exactly 1 after every update
//! - Satisfaction, legitimacy, and unrest stay in [0, 100]
//! - Red line penalties fire on the rising edge only

use crate::models::commodity::Commodity;
use crate::models::country::Country;
use crate::models::diagnostics::Diagnostic;
use crate::models::faction::{Faction, RedLineKind};
use crate::models::state::SimulationState;

/// Country-level observables the faction utilities read.
#[derive(Debug, Clone, Copy)]
struct PolicyOutcomes {
    corporate_tax: f64,
    income_tax: f64,
    welfare_share: f64,
    defense_share: f64,
    unemployment: f64,
    corruption: f64,
    gdp_growth: f64,
    wage_growth: f64,
    trade_openness: f64,
    food_import_share: f64,
    previous_defense_share: f64,
}

impl PolicyOutcomes {
    fn read(state: &SimulationState, country_id: usize) -> Self {
        let country = &state.countries[country_id];

        // Imported food over total food supply (domestic plus imported).
        let food = Commodity::Agriculture.index();
        let domestic_food: f64 = country
            .region_ids
            .iter()
            .map(|&r| state.regions[r].supply[food])
            .sum();
        let imported_food = country.imports_this_tick[food];
        let total_food = domestic_food + imported_food;
        let food_import_share = if total_food > 0.0 {
            imported_food / total_food
        } else {
            0.0
        };

        let wage_growth = if country.previous_average_wage > 0.0 {
            country.average_wage() / country.previous_average_wage - 1.0
        } else {
            0.0
        };

        Self {
            corporate_tax: country.corporate_tax_rate,
            income_tax: country.income_tax_rate,
            welfare_share: country.spending_shares.welfare,
            defense_share: country.spending_shares.defense,
            unemployment: country.unemployment_rate(),
            corruption: country.corruption,
            gdp_growth: country.gdp_growth(),
            wage_growth,
            trade_openness: country.trade_openness(),
            food_import_share,
            previous_defense_share: country.previous_defense_share,
        }
    }
}

/// Weighted utility sum over the preference axes, added to the faction's
/// base satisfaction and clamped to [0, 100].
fn faction_satisfaction(faction: &Faction, outcomes: &PolicyOutcomes) -> f64 {
    let w = &faction.weights;
    let mut satisfaction = faction.base_satisfaction;
    satisfaction += w.corporate_tax * (0.20 - outcomes.corporate_tax) * 100.0;
    satisfaction += w.income_tax * (0.20 - outcomes.income_tax) * 100.0;
    satisfaction += w.welfare_spending * (outcomes.welfare_share - 0.10) * 100.0;
    satisfaction += w.military_spending * (outcomes.defense_share - 0.10) * 100.0;
    satisfaction += w.low_unemployment * (0.05 - outcomes.unemployment) * 200.0;
    satisfaction += w.low_corruption * (0.2 - outcomes.corruption) * 100.0;
    satisfaction += w.gdp_growth * (outcomes.gdp_growth - 0.02) * 200.0;
    satisfaction += w.wage_growth * (outcomes.wage_growth - 0.02) * 200.0;
    satisfaction += w.trade_openness * (outcomes.trade_openness - 0.20) * 100.0;
    satisfaction.clamp(0.0, 100.0)
}

/// Evaluate a faction's red line predicate against current outcomes.
fn red_line_violated(faction: &Faction, outcomes: &PolicyOutcomes) -> bool {
    let threshold = faction.red_line_threshold;
    match faction.red_line {
        RedLineKind::None => false,
        RedLineKind::CorporateTaxAbove => outcomes.corporate_tax > threshold,
        RedLineKind::UnemploymentAbove => outcomes.unemployment > threshold,
        RedLineKind::DefenseSpendingBelow => outcomes.defense_share < threshold,
        RedLineKind::CorruptionAbove => outcomes.corruption > threshold,
        RedLineKind::FoodImportsAbove => outcomes.food_import_share > threshold,
        RedLineKind::DefenseBudgetCutAbove => {
            outcomes.previous_defense_share > 0.0
                && (outcomes.previous_defense_share - outcomes.defense_share)
                    / outcomes.previous_defense_share
                    > threshold
        }
    }
}

/// Legitimacy hit for a tripped red line, scaled by the faction's weight in
/// the power structure.
fn red_line_legitimacy_penalty(power: f64) -> f64 {
    if power >= 0.5 {
        20.0
    } else if power >= 0.3 {
        10.0
    } else {
        0.0
    }
}

/// Political phase for one country.
pub fn run_politics(state: &mut SimulationState, country_id: usize) {
    let tick = state.time.current_tick();
    let legitimacy_rate = state.params.legitimacy_rate;
    let power_shift_rate = state.params.power_shift_rate;

    let outcomes = PolicyOutcomes::read(state, country_id);

    // Satisfaction and red lines.
    let mut legitimacy_hit = 0.0;
    let mut tripped: Vec<Diagnostic> = Vec::new();
    let faction_ids = state.countries[country_id].faction_ids.clone();
    for &faction_id in &faction_ids {
        let faction = &mut state.factions[faction_id];
        faction.satisfaction = faction_satisfaction(faction, &outcomes);

        let violated = red_line_violated(faction, &outcomes);
        if violated && !faction.red_line_violated {
            // Rising edge: satisfaction and legitimacy penalties.
            faction.satisfaction =
                (faction.satisfaction - faction.red_line_penalty).max(0.0);
            let penalty = red_line_legitimacy_penalty(faction.power);
            legitimacy_hit += penalty;
            tripped.push(Diagnostic::RedLineTripped {
                tick,
                country_id,
                faction_id,
                legitimacy_penalty: penalty,
            });
        }
        // Falling edge just clears the bit; there is no reward.
        faction.red_line_violated = violated;
    }
    for diagnostic in tripped {
        state.diagnostics.record(diagnostic);
    }

    // Power-weighted mean satisfaction; 50 when powerless.
    let mut power_total = 0.0;
    let mut weighted_satisfaction = 0.0;
    for &faction_id in &faction_ids {
        let faction = &state.factions[faction_id];
        power_total += faction.power;
        weighted_satisfaction += faction.power * faction.satisfaction;
    }
    let mean_satisfaction = if power_total > 0.0 {
        weighted_satisfaction / power_total
    } else {
        50.0
    };

    // Legitimacy converges toward the weighted mood, then takes the red
    // line shock.
    {
        let country = &mut state.countries[country_id];
        country.legitimacy = (country.legitimacy
            + legitimacy_rate * (mean_satisfaction - country.legitimacy)
            - legitimacy_hit)
            .clamp(0.0, 100.0);
    }

    // Power drifts toward satisfied factions, then renormalizes to sum
    // exactly to 1. Factions the normalization would push under the 0.01
    // floor are pinned there and the rest rescaled, so both the floor and
    // the unit sum hold.
    let mut power_sum = 0.0;
    for &faction_id in &faction_ids {
        let faction = &mut state.factions[faction_id];
        faction.power = (faction.power
            + power_shift_rate * faction.power * (faction.satisfaction - mean_satisfaction)
                / 100.0)
            .max(0.01);
        power_sum += faction.power;
    }
    if power_sum > 0.0 {
        for &faction_id in &faction_ids {
            state.factions[faction_id].power /= power_sum;
        }
        let floored: Vec<usize> = faction_ids
            .iter()
            .copied()
            .filter(|&f| state.factions[f].power < 0.01)
            .collect();
        if !floored.is_empty() && floored.len() < faction_ids.len() {
            let mut rest_sum = 0.0;
            for &faction_id in &faction_ids {
                if floored.contains(&faction_id) {
                    state.factions[faction_id].power = 0.01;
                } else {
                    rest_sum += state.factions[faction_id].power;
                }
            }
            let target = 1.0 - 0.01 * floored.len() as f64;
            if rest_sum > 0.0 && target > 0.0 {
                for &faction_id in &faction_ids {
                    if !floored.contains(&faction_id) {
                        state.factions[faction_id].power *= target / rest_sum;
                    }
                }
            }
        }
    }

    // Regional unrest, with food insecurity refreshed from this tick's
    // agriculture supply against household demand.
    let corruption = state.countries[country_id].corruption;
    let food = Commodity::Agriculture.index();
    let mut unrest_sum = 0.0;
    let region_count = state.countries[country_id].region_ids.len();
    for region_idx in 0..region_count {
        let region_id = state.countries[country_id].region_ids[region_idx];

        let food_need: f64 = state
            .cohorts
            .iter()
            .filter(|c| c.region_id == region_id)
            .map(|c| c.weekly_demand(Commodity::Agriculture))
            .sum();
        let region = &mut state.regions[region_id];
        if food_need > 0.0 {
            region.food_insecurity =
                (1.0 - region.supply[food] / food_need).clamp(0.0, 1.0);
        }

        region.unrest = (100.0 * region.unemployment_rate()
            + 150.0 * region.food_insecurity
            + 50.0 * region.inequality
            + 30.0 * corruption)
            .clamp(0.0, 100.0);
        unrest_sum += region.unrest;
    }

    let country = &mut state.countries[country_id];
    country.average_unrest = if region_count > 0 {
        unrest_sum / region_count as f64
    } else {
        0.0
    };

    // Rotate the baselines the next political tick compares against.
    country.previous_defense_share = country.spending_shares.defense;
    country.previous_average_wage = country.average_wage();
}

/// One legitimacy convergence step, exposed for tests:
/// `L ← clamp(L + λ·(S̄ − L), 0, 100)`.
pub fn legitimacy_step(legitimacy: f64, mean_satisfaction: f64, rate: f64) -> f64 {
    (legitimacy + rate * (mean_satisfaction - legitimacy)).clamp(0.0, 100.0)
}

/// Apply a discrete legitimacy shock to a country.
pub fn apply_legitimacy_shock(country: &mut Country, shock: f64) {
    country.legitimacy = (country.legitimacy - shock).clamp(0.0, 100.0);
}
