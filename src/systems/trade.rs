//! Trade subsystem
//!
//! Computes per-commodity bilateral flows for every directed trade
//! relation, then applies the money effects: exporter trade balance up by
//! the exporter-price value, importer balance down by the tariff-inclusive
//! value, importer tariff revenue up by the tariff take, and FX reserves
//! nudged by the tick's balance.
//!
//! Both ends of a relation are mutated together or not at all; a severed
//! relation (full embargo) produces zero flows regardless of prices. The
//! symmetric policy is the caller's concern: sanctioning one direction
//! leaves the reverse relation untouched.

use crate::core::time::TICK_DT;
use crate::models::commodity::COMMODITY_COUNT;
use crate::models::state::SimulationState;

/// Exporter-price denominator guard.
const PRICE_EPSILON: f64 = 1e-4;

/// Price-ratio multiplier bounds.
const MULTIPLIER_FLOOR: f64 = 0.01;
const MULTIPLIER_CEILING: f64 = 10.0;

/// Flow for one commodity on one relation.
///
/// `base_volume` trades at parity; the importer/exporter price ratio,
/// raised to the elasticity, scales it within [0.01, 10]; sanctions scale
/// the remainder down to zero at full severity.
pub fn commodity_flow(
    base_volume: f64,
    exporter_price: f64,
    importer_price: f64,
    tariff: f64,
    sanction_severity: f64,
    elasticity: f64,
) -> f64 {
    if base_volume <= 0.0 || sanction_severity >= 1.0 {
        return 0.0;
    }
    let effective_exporter = (exporter_price * (1.0 + tariff)).max(PRICE_EPSILON);
    let ratio = importer_price / effective_exporter;
    let multiplier = ratio
        .powf(elasticity)
        .clamp(MULTIPLIER_FLOOR, MULTIPLIER_CEILING);
    base_volume * multiplier * (1.0 - sanction_severity)
}

/// Trade phase: all directed relations in insertion order.
pub fn run_trade(state: &mut SimulationState) {
    let elasticity = state.params.trade_elasticity;

    // Balances and volume trackers reset at the start of every trade tick.
    for country in &mut state.countries {
        country.trade_balance = 0.0;
        country.imports_this_tick = [0.0; COMMODITY_COUNT];
        country.exports_this_tick = [0.0; COMMODITY_COUNT];
    }

    for relation_id in 0..state.trade_relations.len() {
        let (from_id, to_id) = {
            let relation = &state.trade_relations[relation_id];
            (relation.from_country, relation.to_country)
        };
        // Self-trade is meaningless; scenario validation rejects it, and
        // the split borrow below requires distinct countries.
        if from_id == to_id {
            continue;
        }

        for c in 0..COMMODITY_COUNT {
            let relation = &state.trade_relations[relation_id];
            let exporter_price = state.countries[from_id].prices[c];
            let importer_price = state.countries[to_id].prices[c];
            let tariff = relation.tariff_rates[c];
            let flow = commodity_flow(
                relation.base_volumes[c],
                exporter_price,
                importer_price,
                tariff,
                relation.sanction_severity,
                elasticity,
            );
            state.trade_relations[relation_id].current_volumes[c] = flow;
            if flow <= 0.0 {
                continue;
            }

            let export_value = exporter_price * flow;
            let import_cost = exporter_price * (1.0 + tariff) * flow;
            let tariff_take = tariff * exporter_price * flow;

            let exporter = &mut state.countries[from_id];
            exporter.trade_balance += export_value;
            exporter.exports_this_tick[c] += flow;

            let importer = &mut state.countries[to_id];
            importer.trade_balance -= import_cost;
            importer.tariff_revenue += tariff_take;
            importer.imports_this_tick[c] += flow;
        }
    }

    // FX reserves absorb the tick's balance, committed at integer cents.
    for country in &mut state.countries {
        country.fx_reserves += (country.trade_balance * TICK_DT).round() as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::coefficients::TechnicalCoefficientMatrix;
    use crate::models::commodity::Commodity;
    use crate::models::country::Country;
    use crate::models::trade::TradeRelation;

    fn two_country_state() -> SimulationState {
        let mut state = SimulationState::new(2000, 1);
        for (id, code) in [(0usize, "AAA"), (1usize, "BBB")] {
            let mut country = Country::new(id, code.to_string(), code.to_string());
            country.prices = [10.0; COMMODITY_COUNT];
            country.initial_prices = [10.0; COMMODITY_COUNT];
            state.countries.push(country);
            state.coefficients.push(TechnicalCoefficientMatrix::zero());
        }
        state
    }

    #[test]
    fn test_flow_with_tariff() {
        // Base 100, both prices 10, tariff 0.20, elasticity 2:
        // effective exporter price 12, ratio 10/12, multiplier (10/12)^2.
        let flow = commodity_flow(100.0, 10.0, 10.0, 0.20, 0.0, 2.0);
        let expected = 100.0 * (10.0f64 / 12.0).powi(2);
        assert!((flow - expected).abs() < 1e-9);
        assert!((flow - 69.444).abs() < 1e-3);
    }

    #[test]
    fn test_full_embargo_zeroes_flow() {
        let flow = commodity_flow(100.0, 10.0, 1000.0, 0.0, 1.0, 2.0);
        assert_eq!(flow, 0.0);
    }

    #[test]
    fn test_partial_sanction_scales_flow() {
        let open = commodity_flow(100.0, 10.0, 10.0, 0.0, 0.0, 2.0);
        let half = commodity_flow(100.0, 10.0, 10.0, 0.0, 0.5, 2.0);
        assert!((half - open * 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_multiplier_clamped() {
        // Importer price vastly above exporter: multiplier capped at 10.
        let flow = commodity_flow(100.0, 1.0, 1000.0, 0.0, 0.0, 2.0);
        assert_eq!(flow, 1000.0);
        // Reverse: floor at 0.01.
        let trickle = commodity_flow(100.0, 1000.0, 1.0, 0.0, 0.0, 2.0);
        assert_eq!(trickle, 1.0);
    }

    #[test]
    fn test_balance_and_tariff_revenue_effects() {
        let mut state = two_country_state();
        let ore = Commodity::Ore.index();
        let mut relation = TradeRelation::new(0, 0, 1);
        relation.base_volumes[ore] = 100.0;
        relation.tariff_rates[ore] = 0.20;
        state.trade_relations.push(relation);

        run_trade(&mut state);

        let flow = state.trade_relations[0].current_volumes[ore];
        assert!(flow > 0.0);
        let exporter = &state.countries[0];
        let importer = &state.countries[1];
        assert!((exporter.trade_balance - 10.0 * flow).abs() < 1e-9);
        assert!((importer.trade_balance + 12.0 * flow).abs() < 1e-9);
        assert!((importer.tariff_revenue - 0.20 * 10.0 * flow).abs() < 1e-9);
        assert!((importer.imports_this_tick[ore] - flow).abs() < 1e-12);
        assert!((exporter.exports_this_tick[ore] - flow).abs() < 1e-12);
    }

    #[test]
    fn test_balance_resets_each_trade_tick() {
        let mut state = two_country_state();
        state.countries[0].trade_balance = 1e9;
        run_trade(&mut state);
        assert_eq!(state.countries[0].trade_balance, 0.0);
    }
}
