//! MRIO ingestion integration tests
//!
//! A synthetic ICIO table flows end to end: parse, aggregate to the twelve
//! commodities, overlay onto a loaded scenario, and run.

use economy_simulator_core_rs::models::coefficients::TechnicalCoefficientMatrix;
use economy_simulator_core_rs::orchestrator::Simulation;
use economy_simulator_core_rs::scenario::load_state;
use economy_simulator_core_rs::scenario::mrio::{apply_mrio, parse_icio, MrioError, SectorMap};
use economy_simulator_core_rs::{Commodity, COMMODITY_COUNT};

/// Three sectors per country across two countries, with per-country final
/// demand columns, VA/TLS rows, and an OUT row.
fn synthetic_icio() -> String {
    [
        "V1,AAA_A01_02,AAA_C26,AAA_D,BBB_A01_02,BBB_C26,BBB_D,AAA_HFCE,AAA_GFCF,BBB_HFCE,BBB_GFCF",
        "AAA_A01_02,12,18,2,0,6,0,40,2,10,0",
        "AAA_C26,4,9,1,0,3,0,25,5,8,2",
        "AAA_D,6,12,3,0,0,0,30,0,0,0",
        "BBB_A01_02,0,4,0,10,5,1,0,0,35,1",
        "BBB_C26,0,8,0,3,7,2,0,0,22,6",
        "BBB_D,0,0,0,5,9,4,0,0,28,0",
        "VA,78,49,94,82,70,93,0,0,0,0",
        "TLS,0,0,0,0,0,0,0,0,0,0",
        "OUT,100,100,100,100,100,100,0,0,0,0",
    ]
    .join("\n")
}

fn scenario_with_relations() -> String {
    let zeros = vec![0.0f64; COMMODITY_COUNT];
    let sens = vec![0.1f64; COMMODITY_COUNT];
    let prices = vec![50.0f64; COMMODITY_COUNT];
    let weights = vec![1.0f64; COMMODITY_COUNT];
    let capacities = vec![20.0f64; COMMODITY_COUNT];
    let flat = vec![0.0f64; COMMODITY_COUNT * COMMODITY_COUNT];

    let country = |code: &str| {
        serde_json::json!({
            "code": code,
            "name": code,
            "gdp": 1_000_000_000i64,
            "debt": 0,
            "laborForce": 500.0,
            "population": 2000.0,
            "incomeTaxRate": 0.1,
            "corporateTaxRate": 0.1,
            "vatRate": 0.05,
            "importPropensity": zeros.clone(),
            "exportPropensity": zeros.clone(),
            "initialPrices": prices.clone(),
            "consumptionWeights": weights.clone(),
            "technicalCoefficients": flat.clone(),
            "regions": [{
                "name": format!("{} Core", code),
                "population": 2000.0,
                "laborForce": 500.0,
                "infrastructure": 1.0,
                "sectorCapacities": capacities.clone()
            }],
            "factions": [{
                "name": "Centrists",
                "basePower": 1.0,
                "baseSatisfaction": 55.0,
                "redLine": "None"
            }]
        })
    };

    serde_json::json!({
        "name": "MRIO Overlay",
        "startYear": 2010,
        "randomSeed": 55,
        "priceSensitivities": sens,
        "laborCoefficients": zeros.clone(),
        "spoilageRates": zeros.clone(),
        "baseInterestRate": 0.02,
        "countries": [country("AAA"), country("BBB"), country("CCC")],
        "tradeRelations": [
            { "from": "AAA", "to": "BBB" },
            { "from": "BBB", "to": "AAA" },
            { "from": "AAA", "to": "CCC" }
        ]
    })
    .to_string()
}

#[test]
fn test_overlay_fills_coefficients_and_volumes() {
    let mut state = load_state(&scenario_with_relations()).unwrap();
    let table = parse_icio(&synthetic_icio()).unwrap();
    let map = SectorMap::default_icio();
    apply_mrio(&mut state, &table, &map).unwrap();

    // AAA agriculture column: agri 12, electronics 4, electricity 6 over
    // output 100.
    let a = &state.coefficients[0];
    assert!((a.get(Commodity::Agriculture, Commodity::Agriculture) - 0.12).abs() < 1e-12);
    assert!((a.get(Commodity::Electronics, Commodity::Agriculture) - 0.04).abs() < 1e-12);
    assert!((a.get(Commodity::Electricity, Commodity::Agriculture) - 0.06).abs() < 1e-12);

    // AAA→BBB agriculture: 6 intermediate + 10 HFCE + 0 GFCF = 16.
    let volumes = &state.trade_relations[0].base_volumes;
    assert!((volumes[Commodity::Agriculture.index()] - 16.0).abs() < 1e-12);
    // AAA→BBB electronics: 3 intermediate + 8 + 2 final = 13.
    assert!((volumes[Commodity::Electronics.index()] - 13.0).abs() < 1e-12);

    // CCC is not in the table: its relation keeps scenario data (zeros).
    assert_eq!(state.trade_relations[2].base_volumes, [0.0; COMMODITY_COUNT]);
    assert_eq!(state.coefficients[2], TechnicalCoefficientMatrix::zero());
}

#[test]
fn test_overlaid_world_runs() {
    let mut state = load_state(&scenario_with_relations()).unwrap();
    let table = parse_icio(&synthetic_icio()).unwrap();
    apply_mrio(&mut state, &table, &SectorMap::default_icio()).unwrap();

    let mut sim = Simulation::new(state).unwrap();
    sim.advance(12).unwrap();
    // MRIO volumes made AAA→BBB trade real.
    assert!(sim.state().trade_relations[0].current_volumes[Commodity::Agriculture.index()] > 0.0);
}

#[test]
fn test_unmapped_sector_surfaces_as_error() {
    let csv = synthetic_icio().replace("AAA_D", "AAA_ZZZ");
    let table = parse_icio(&csv).unwrap();
    let mut state = load_state(&scenario_with_relations()).unwrap();
    assert!(matches!(
        apply_mrio(&mut state, &table, &SectorMap::default_icio()),
        Err(MrioError::UnmappedSector(_))
    ));
}

#[test]
fn test_va_and_tls_rows_ignored() {
    let table = parse_icio(&synthetic_icio()).unwrap();
    assert_eq!(table.countries(), vec!["AAA".to_string(), "BBB".to_string()]);
}
