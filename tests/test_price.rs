//! Price subsystem integration tests
//!
//! Excess-demand adjustment through the engine, the pure-equilibrium law,
//! CPI history rotation, and annual inflation.

use economy_simulator_core_rs::models::cohort::{PopulationCohort, WealthLevel};
use economy_simulator_core_rs::models::coefficients::TechnicalCoefficientMatrix;
use economy_simulator_core_rs::models::country::Country;
use economy_simulator_core_rs::models::region::Region;
use economy_simulator_core_rs::models::state::SimulationState;
use economy_simulator_core_rs::orchestrator::Simulation;
use economy_simulator_core_rs::{Commodity, COMMODITY_COUNT};

fn quiet_world() -> SimulationState {
    let mut state = SimulationState::new(2000, 3);
    let mut country = Country::new(0, "AAA".to_string(), "Aland".to_string());
    country.region_ids.push(0);
    for c in 0..COMMODITY_COUNT {
        country.prices[c] = 100.0;
        country.initial_prices[c] = 100.0;
        country.display_prices[c] = 100.0;
        country.consumption_weights[c] = 1.0 / COMMODITY_COUNT as f64;
    }
    state.countries.push(country);
    state.coefficients.push(TechnicalCoefficientMatrix::zero());
    state.regions.push(Region::new(0, 0, "Core".to_string()));
    state.price_sensitivities = [0.15; COMMODITY_COUNT];
    state
}

#[test]
fn test_pure_equilibrium_law() {
    // With demand equal to supply on every commodity (both zero here), a
    // tick leaves every price unchanged within 1e-12.
    let mut sim = Simulation::new(quiet_world()).unwrap();
    for _ in 0..10 {
        sim.tick().unwrap();
        for c in 0..COMMODITY_COUNT {
            assert!(
                (sim.state().countries[0].prices[c] - 100.0).abs() < 1e-12,
                "price {} drifted at equilibrium",
                c
            );
        }
        assert!((sim.state().countries[0].cpi - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_shortage_inflates_cpi_and_annual_inflation() {
    let mut state = quiet_world();
    // Persistent household demand with no production behind it.
    state.cohorts.push(PopulationCohort::new(
        0,
        0,
        Commodity::Services,
        WealthLevel::Middle,
        5_000.0,
    ));

    let mut sim = Simulation::new(state).unwrap();
    // Tick 0 rotates CPI history (year boundary) before prices have moved
    // far; run a year out and compare.
    sim.advance(52).unwrap();
    let country = &sim.state().countries[0];
    assert!(country.cpi > 1.0, "scarcity must inflate the index");
    let year_ago = country.cpi_year_ago;

    sim.tick().unwrap();
    let country = &sim.state().countries[0];
    // Tick 52 re-rotated: the stored base is the CPI of week 52.
    assert!(country.cpi_year_ago >= year_ago);
    let inflation = country.annual_inflation();
    assert!((inflation - (country.cpi / country.cpi_year_ago - 1.0)).abs() < 1e-12);
}

#[test]
fn test_display_prices_lag_spot_prices() {
    let mut state = quiet_world();
    state.cohorts.push(PopulationCohort::new(
        0,
        0,
        Commodity::Services,
        WealthLevel::Rich,
        10_000.0,
    ));

    let mut sim = Simulation::new(state).unwrap();
    sim.tick().unwrap();
    let country = &sim.state().countries[0];
    let services = Commodity::Services.index();
    // Spot moved up; the display price follows at β = 0.7.
    assert!(country.prices[services] > 100.0);
    let expected_display = 0.7 * country.prices[services] + 0.3 * 100.0;
    assert!((country.display_prices[services] - expected_display).abs() < 1e-9);
    assert!(country.display_prices[services] < country.prices[services]);
}

#[test]
fn test_price_floor_reached_under_glut() {
    let mut state = quiet_world();
    let ore = Commodity::Ore.index();
    state.regions[0].inventory[ore] = 1e6;

    let mut sim = Simulation::new(state).unwrap();
    // Supply glut with zero demand pushes the price down 1.5% per tick
    // (σ 0.15 × max excess 0.5 at the clamp) until the floor at 10.
    for _ in 0..400 {
        sim.tick().unwrap();
    }
    let price = sim.state().countries[0].prices[ore];
    assert!((price - 10.0).abs() < 1e-9, "price {} should sit on the floor", price);
}
