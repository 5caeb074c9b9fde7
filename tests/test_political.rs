//! Political subsystem integration tests
//!
//! Legitimacy convergence through the engine, red lines driven by real
//! economic outcomes, and the power-sum invariant under churn.

use economy_simulator_core_rs::models::coefficients::TechnicalCoefficientMatrix;
use economy_simulator_core_rs::models::country::Country;
use economy_simulator_core_rs::models::faction::{Faction, RedLineKind};
use economy_simulator_core_rs::models::region::Region;
use economy_simulator_core_rs::models::state::SimulationState;
use economy_simulator_core_rs::models::trade::TradeRelation;
use economy_simulator_core_rs::orchestrator::Simulation;
use economy_simulator_core_rs::{Commodity, Diagnostic};

fn political_world(factions: &[(f64, f64)]) -> SimulationState {
    let mut state = SimulationState::new(2000, 37);
    let mut country = Country::new(0, "AAA".to_string(), "Aland".to_string());
    country.region_ids.push(0);
    for (i, &(power, satisfaction)) in factions.iter().enumerate() {
        country.faction_ids.push(i);
        let mut faction = Faction::new(i, 0, format!("F{}", i), power);
        faction.base_satisfaction = satisfaction;
        state.factions.push(faction);
    }
    state.countries.push(country);
    state.coefficients.push(TechnicalCoefficientMatrix::zero());
    state.regions.push(Region::new(0, 0, "Core".to_string()));
    state
}

#[test]
fn test_legitimacy_converges_toward_faction_mood() {
    // Single all-powerful faction at satisfaction 70, legitimacy from 40:
    // the monthly updates walk 43, 45.7, 48.13.
    let mut state = political_world(&[(1.0, 70.0)]);
    state.countries[0].legitimacy = 40.0;

    let mut sim = Simulation::new(state).unwrap();
    let expected = [43.0, 45.7, 48.13];
    for e in expected {
        sim.advance(4).unwrap(); // one political update per month
        assert!((sim.state().countries[0].legitimacy - e).abs() < 1e-9);
    }
}

#[test]
fn test_food_import_red_line_trips_on_real_imports() {
    let agriculture = Commodity::Agriculture.index();
    let mut state = political_world(&[(1.0, 60.0)]);
    state.factions[0].red_line = RedLineKind::FoodImportsAbove;
    state.factions[0].red_line_threshold = 0.5;
    state.factions[0].red_line_penalty = 25.0;
    state.countries[0].legitimacy = 90.0;

    // A second country exporting food into AAA, which grows none itself.
    let mut exporter = Country::new(1, "BBB".to_string(), "Borland".to_string());
    exporter.region_ids.push(1);
    state.countries.push(exporter);
    state.coefficients.push(TechnicalCoefficientMatrix::zero());
    state.regions.push(Region::new(1, 1, "Breadbasket".to_string()));
    let mut relation = TradeRelation::new(0, 1, 0);
    relation.base_volumes[agriculture] = 100.0;
    state.trade_relations.push(relation);

    let mut sim = Simulation::new(state).unwrap();
    sim.tick().unwrap();

    // All food is imported: share 1.0 > 0.5, and the all-powerful
    // faction's trip costs 20 legitimacy on top of convergence.
    assert!(sim.state().factions[0].red_line_violated);
    assert!(sim.state().countries[0].legitimacy < 70.0);
    let trips = sim
        .state()
        .diagnostics
        .records()
        .iter()
        .filter(|d| matches!(d, Diagnostic::RedLineTripped { .. }))
        .count();
    assert_eq!(trips, 1);
}

#[test]
fn test_defense_cut_red_line() {
    let mut state = political_world(&[(1.0, 60.0)]);
    state.factions[0].red_line = RedLineKind::DefenseBudgetCutAbove;
    state.factions[0].red_line_threshold = 0.3;
    state.factions[0].red_line_penalty = 10.0;
    state.countries[0].spending_shares.defense = 0.2;
    state.countries[0].previous_defense_share = 0.2;

    let mut sim = Simulation::new(state).unwrap();
    sim.advance(4).unwrap();
    assert!(!sim.state().factions[0].red_line_violated);

    // Host slashes defense by half between months: a 50% cut > 30%.
    sim.state_mut().countries[0].spending_shares.defense = 0.1;
    sim.advance(4).unwrap();
    assert!(sim.state().factions[0].red_line_violated);
}

#[test]
fn test_power_sum_invariant_under_churn() {
    let mut state = political_world(&[(0.55, 90.0), (0.30, 20.0), (0.15, 50.0)]);
    state.countries[0].legitimacy = 60.0;

    let mut sim = Simulation::new(state).unwrap();
    for _ in 0..40 {
        sim.tick().unwrap();
        let state = sim.state();
        let sum: f64 = state.factions.iter().map(|f| f.power).sum();
        assert!((sum - 1.0).abs() < 1e-9, "powers must sum to 1, got {}", sum);
        for faction in &state.factions {
            assert!(faction.power >= 0.01 - 1e-12);
            assert!((0.0..=100.0).contains(&faction.satisfaction));
        }
    }
    // Sustained satisfaction gap shifts power toward the content faction.
    assert!(sim.state().factions[0].power > 0.55);
    assert!(sim.state().factions[1].power < 0.30);
}

#[test]
fn test_unrest_feeds_country_average_and_risk() {
    let mut state = political_world(&[(1.0, 50.0)]);
    state.countries[0].corruption = 1.0;
    state.regions[0].inequality = 1.0;
    state.regions[0].food_insecurity = 1.0;
    state.countries[0].legitimacy = 80.0;

    let mut sim = Simulation::new(state).unwrap();
    sim.tick().unwrap();
    // 150 + 50 + 30 ≥ 100: clamped.
    assert_eq!(sim.state().regions[0].unrest, 100.0);
    assert_eq!(sim.state().countries[0].average_unrest, 100.0);
    assert!(sim.state().countries[0].at_risk());
}
