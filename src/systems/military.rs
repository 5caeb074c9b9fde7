//! Military subsystem (placeholder)
//!
//! No combat resolution happens in the core. On fiscal ticks the defense
//! budget buys MilitaryGoods procurement for the country's formations;
//! supply status and morale drift toward what was actually procured, and
//! military power aggregates effective formation strength. Equipment ages
//! every tick with the facility decay step.

use crate::models::commodity::Commodity;
use crate::models::state::SimulationState;

/// Supply status convergence per fiscal tick.
const SUPPLY_DRIFT: f64 = 0.5;
/// Morale convergence toward supply status per fiscal tick.
const MORALE_DRIFT: f64 = 0.1;
/// War weariness accrual per fiscal tick at war, and decay at peace.
const WEARINESS_ACCRUAL: f64 = 0.5;
const WEARINESS_DECAY: f64 = 0.25;

/// Military phase for one country (fiscal ticks only).
pub fn run_military(state: &mut SimulationState, country_id: usize) {
    let military_goods = Commodity::MilitaryGoods.index();

    // Demand: maintenance for every formation, combat supplies for the
    // deployed or fighting ones.
    let mut required = 0.0;
    for formation in state
        .formations
        .iter()
        .filter(|f| f.country_id == country_id)
    {
        required += formation.maintenance_cost.quantities[military_goods];
        if formation.deployed || formation.in_combat {
            required += formation.combat_supply_cost.quantities[military_goods];
        }
    }

    let country = &mut state.countries[country_id];
    let defense_budget = country.discretionary_spending * country.spending_shares.defense;
    let price = country.prices[military_goods];
    let affordable = if price > 0.0 { defense_budget / price } else { 0.0 };
    let satisfaction = if required > 0.0 {
        (affordable / required).min(1.0)
    } else {
        1.0
    };
    country.military_goods_required = required;
    country.procurement_satisfaction = satisfaction;

    if country.at_war {
        country.war_weariness += WEARINESS_ACCRUAL;
    } else {
        country.war_weariness = (country.war_weariness - WEARINESS_DECAY).max(0.0);
    }

    // Formations converge toward the procurement level.
    let mut power = 0.0;
    for formation in state
        .formations
        .iter_mut()
        .filter(|f| f.country_id == country_id)
    {
        formation.supply_status = (formation.supply_status
            + SUPPLY_DRIFT * (satisfaction - formation.supply_status))
            .clamp(0.0, 1.0);
        formation.morale = (formation.morale
            + MORALE_DRIFT * (formation.supply_status - formation.morale))
            .clamp(0.0, 1.0);
        formation.readiness = (0.4 * formation.training
            + 0.3 * formation.morale
            + 0.3 * formation.supply_status)
            .clamp(0.0, 1.0);
        formation.strength =
            formation.base_strength * formation.equipment_quality * formation.readiness;
        power += formation.strength;
    }
    state.countries[country_id].military_power = power;
}

/// Equipment aging, every tick (scheduler step 7).
pub fn age_military_equipment(state: &mut SimulationState) {
    for formation in &mut state.formations {
        formation.age_equipment();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::coefficients::TechnicalCoefficientMatrix;
    use crate::models::country::Country;
    use crate::models::military::{FormationType, MilitaryFormation};

    fn state_with_formation() -> SimulationState {
        let mut state = SimulationState::new(2000, 1);
        let mut country = Country::new(0, "AAA".to_string(), "Aland".to_string());
        country.prices[Commodity::MilitaryGoods.index()] = 100.0;
        state.countries.push(country);
        state.coefficients.push(TechnicalCoefficientMatrix::zero());
        let mut formation =
            MilitaryFormation::new(0, 0, FormationType::Infantry, 100.0, 5000.0);
        formation.maintenance_cost.quantities[Commodity::MilitaryGoods.index()] = 10.0;
        state.formations.push(formation);
        state
    }

    #[test]
    fn test_full_budget_full_procurement() {
        let mut state = state_with_formation();
        state.countries[0].discretionary_spending = 10_000.0;
        state.countries[0].spending_shares.defense = 0.5; // buys 50 units

        run_military(&mut state, 0);
        assert_eq!(state.countries[0].procurement_satisfaction, 1.0);
        assert_eq!(state.countries[0].military_goods_required, 10.0);
        assert!(state.countries[0].military_power > 0.0);
    }

    #[test]
    fn test_starved_budget_partial_procurement() {
        let mut state = state_with_formation();
        state.countries[0].discretionary_spending = 1_000.0;
        state.countries[0].spending_shares.defense = 0.5; // buys 5 of 10

        run_military(&mut state, 0);
        assert!((state.countries[0].procurement_satisfaction - 0.5).abs() < 1e-12);
        // Supply drifts half-way toward 0.5 from 1.0.
        assert!((state.formations[0].supply_status - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_combat_supplies_only_when_deployed() {
        let mut state = state_with_formation();
        state.formations[0].combat_supply_cost.quantities
            [Commodity::MilitaryGoods.index()] = 25.0;

        run_military(&mut state, 0);
        assert_eq!(state.countries[0].military_goods_required, 10.0);

        state.formations[0].deployed = true;
        run_military(&mut state, 0);
        assert_eq!(state.countries[0].military_goods_required, 35.0);
    }

    #[test]
    fn test_war_weariness_accrues_and_decays() {
        let mut state = state_with_formation();
        state.countries[0].at_war = true;
        run_military(&mut state, 0);
        run_military(&mut state, 0);
        assert_eq!(state.countries[0].war_weariness, 1.0);
        state.countries[0].at_war = false;
        run_military(&mut state, 0);
        assert_eq!(state.countries[0].war_weariness, 0.75);
    }
}
