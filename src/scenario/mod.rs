//! Scenario loading
//!
//! Parses and validates the JSON scenario format, then builds the initial
//! `SimulationState`: dense ids are assigned in file order, K-length arrays
//! are enforced, basket weights and faction powers are normalized, and the
//! technical coefficient matrices are checked for profitability.
//!
//! The schema is strict: unknown fields, unknown tags, and duplicate
//! country codes are rejected at load, before tick 0.

pub mod mrio;

use crate::models::cohort::{PopulationCohort, WealthLevel};
use crate::models::coefficients::{CoefficientError, TechnicalCoefficientMatrix};
use crate::models::commodity::{Commodity, COMMODITY_COUNT};
use crate::models::country::{Country, SpendingShares};
use crate::models::deposit::{DiscoveryState, ResourceDeposit};
use crate::models::faction::{Faction, PreferenceWeights, RedLineKind};
use crate::models::region::Region;
use crate::models::state::SimulationState;
use crate::models::trade::TradeRelation;
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while loading a scenario. All of them abort the run
/// before tick 0.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario JSON is invalid: {0}")]
    Json(String),

    #[error("{field} has {len} entries, expected {expected}")]
    WrongArrayLength {
        field: String,
        len: usize,
        expected: usize,
    },

    #[error("unknown commodity tag {0:?}")]
    UnknownCommodity(String),

    #[error("unknown red line tag {0:?}")]
    UnknownRedLine(String),

    #[error("unknown discovery state {0:?}")]
    UnknownDiscoveryState(String),

    #[error("unknown wealth level {0:?}")]
    UnknownWealthLevel(String),

    #[error("duplicate country code {0:?}")]
    DuplicateCountryCode(String),

    #[error("unknown country code {0:?} in trade relation")]
    UnknownCountryCode(String),

    #[error("trade relation from {0:?} to itself")]
    SelfTrade(String),

    #[error("deposit resource {0:?} is not a raw commodity")]
    NotARawResource(String),

    #[error("{field} = {value} is out of range")]
    ValueOutOfRange { field: String, value: f64 },

    #[error("country {code}: {source}")]
    Coefficients {
        code: String,
        source: CoefficientError,
    },
}

// ============================================================================
// JSON schema (strict; field names are camelCase in the file)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ScenarioFile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub version: String,
    pub start_year: i32,
    pub random_seed: u64,
    pub price_sensitivities: Vec<f64>,
    pub labor_coefficients: Vec<f64>,
    pub spoilage_rates: Vec<f64>,
    pub base_interest_rate: f64,
    pub countries: Vec<CountryFile>,
    /// Bilateral relations; base volumes here are overridden when MRIO
    /// data is applied on top.
    #[serde(default)]
    pub trade_relations: Vec<TradeRelationFile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CountryFile {
    pub code: String,
    pub name: String,
    /// Annualized GDP, cents.
    pub gdp: i64,
    pub debt: i64,
    pub labor_force: f64,
    pub population: f64,
    pub income_tax_rate: f64,
    pub corporate_tax_rate: f64,
    pub vat_rate: f64,
    pub import_propensity: Vec<f64>,
    pub export_propensity: Vec<f64>,
    pub initial_prices: Vec<f64>,
    pub consumption_weights: Vec<f64>,
    /// Flattened K×K technical coefficient matrix, row-major.
    pub technical_coefficients: Vec<f64>,
    #[serde(default)]
    pub spending_shares: Option<SpendingSharesFile>,
    pub regions: Vec<RegionFile>,
    pub factions: Vec<FactionFile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SpendingSharesFile {
    #[serde(default)]
    pub welfare: f64,
    #[serde(default)]
    pub education: f64,
    #[serde(default)]
    pub defense: f64,
    #[serde(default)]
    pub infrastructure: f64,
    #[serde(default)]
    pub healthcare: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RegionFile {
    pub name: String,
    pub population: f64,
    pub labor_force: f64,
    pub infrastructure: f64,
    pub sector_capacities: Vec<f64>,
    #[serde(default)]
    pub initial_inventory: Option<Vec<f64>>,
    #[serde(default)]
    pub inequality: f64,
    #[serde(default)]
    pub deposits: Vec<DepositFile>,
    /// Explicit cohorts; absent means the loader synthesizes a default
    /// wealth distribution from the region population.
    #[serde(default)]
    pub cohorts: Vec<CohortFile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DepositFile {
    pub subtype: String,
    pub resource: String,
    pub total_reserves: f64,
    pub base_yield: f64,
    pub difficulty: f64,
    pub discovery: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CohortFile {
    pub wealth_level: String,
    pub population: f64,
    #[serde(default)]
    pub primary_sector: Option<String>,
    #[serde(default = "default_savings_rate")]
    pub savings_rate: f64,
    #[serde(default)]
    pub consumption_multipliers: Option<Vec<f64>>,
}

fn default_savings_rate() -> f64 {
    0.1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct FactionFile {
    pub name: String,
    pub base_power: f64,
    pub base_satisfaction: f64,
    pub red_line: String,
    #[serde(default)]
    pub red_line_threshold: f64,
    #[serde(default)]
    pub red_line_penalty: f64,
    #[serde(default)]
    pub weights: WeightsFile,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct WeightsFile {
    #[serde(default)]
    pub corporate_tax: f64,
    #[serde(default)]
    pub income_tax: f64,
    #[serde(default)]
    pub welfare_spending: f64,
    #[serde(default)]
    pub military_spending: f64,
    #[serde(default)]
    pub trade_openness: f64,
    #[serde(default)]
    pub gdp_growth: f64,
    #[serde(default)]
    pub low_unemployment: f64,
    #[serde(default)]
    pub wage_growth: f64,
    #[serde(default)]
    pub low_corruption: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TradeRelationFile {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub base_volumes: Option<Vec<f64>>,
    #[serde(default)]
    pub tariff_rates: Option<Vec<f64>>,
    #[serde(default)]
    pub sanction_severity: f64,
    #[serde(default)]
    pub transport_cost: f64,
}

// ============================================================================
// Loading
// ============================================================================

/// Parse a scenario from JSON text.
pub fn load_scenario(json: &str) -> Result<ScenarioFile, ScenarioError> {
    serde_json::from_str(json).map_err(|e| ScenarioError::Json(e.to_string()))
}

/// Parse and build in one step.
pub fn load_state(json: &str) -> Result<SimulationState, ScenarioError> {
    build_state(&load_scenario(json)?)
}

fn expect_len(field: &str, len: usize) -> Result<(), ScenarioError> {
    if len != COMMODITY_COUNT {
        return Err(ScenarioError::WrongArrayLength {
            field: field.to_string(),
            len,
            expected: COMMODITY_COUNT,
        });
    }
    Ok(())
}

fn to_array(field: &str, values: &[f64]) -> Result<[f64; COMMODITY_COUNT], ScenarioError> {
    expect_len(field, values.len())?;
    let mut array = [0.0; COMMODITY_COUNT];
    array.copy_from_slice(values);
    Ok(array)
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ScenarioError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ScenarioError::ValueOutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Default wealth distribution when a region declares no cohorts.
const DEFAULT_WEALTH_SPLIT: [(WealthLevel, f64); 5] = [
    (WealthLevel::Subsistence, 0.15),
    (WealthLevel::Poor, 0.35),
    (WealthLevel::Middle, 0.35),
    (WealthLevel::Wealthy, 0.12),
    (WealthLevel::Rich, 0.03),
];

/// Build the initial state from a parsed scenario.
///
/// Ids are assigned densely in file order: countries, then regions within
/// countries, then factions within countries, and so on.
pub fn build_state(scenario: &ScenarioFile) -> Result<SimulationState, ScenarioError> {
    let mut state = SimulationState::new(scenario.start_year, scenario.random_seed);

    state.price_sensitivities =
        to_array("priceSensitivities", &scenario.price_sensitivities)?;
    state.labor_coefficients = to_array("laborCoefficients", &scenario.labor_coefficients)?;
    state.spoilage_rates = to_array("spoilageRates", &scenario.spoilage_rates)?;
    check_range("baseInterestRate", scenario.base_interest_rate, 0.0, 1.0)?;

    let mut seen_codes: HashSet<&str> = HashSet::new();
    for country_file in &scenario.countries {
        if !seen_codes.insert(country_file.code.as_str()) {
            return Err(ScenarioError::DuplicateCountryCode(
                country_file.code.clone(),
            ));
        }
        build_country(&mut state, scenario, country_file)?;
    }

    for relation_file in &scenario.trade_relations {
        build_trade_relation(&mut state, relation_file)?;
    }

    Ok(state)
}

fn build_country(
    state: &mut SimulationState,
    scenario: &ScenarioFile,
    file: &CountryFile,
) -> Result<(), ScenarioError> {
    let country_id = state.countries.len();
    let mut country = Country::new(country_id, file.code.clone(), file.name.clone());

    country.gdp = file.gdp;
    country.previous_gdp = file.gdp;
    country.debt = file.debt.max(0);
    country.labor_force = file.labor_force;
    country.base_interest_rate = scenario.base_interest_rate;
    country.effective_interest_rate = scenario.base_interest_rate;

    check_range("incomeTaxRate", file.income_tax_rate, 0.0, 1.0)?;
    check_range("corporateTaxRate", file.corporate_tax_rate, 0.0, 1.0)?;
    check_range("vatRate", file.vat_rate, 0.0, 1.0)?;
    country.income_tax_rate = file.income_tax_rate;
    country.corporate_tax_rate = file.corporate_tax_rate;
    country.vat_rate = file.vat_rate;

    country.import_propensity = to_array("importPropensity", &file.import_propensity)?;
    country.export_propensity = to_array("exportPropensity", &file.export_propensity)?;

    let initial_prices = to_array("initialPrices", &file.initial_prices)?;
    for (c, &price) in initial_prices.iter().enumerate() {
        check_range(&format!("initialPrices[{}]", c), price, 0.0, f64::MAX)?;
    }
    country.initial_prices = initial_prices;
    country.prices = initial_prices;
    country.display_prices = initial_prices;

    // Basket weights: non-negative, normalized to sum 1 (all-zero stays
    // all-zero and CPI falls back to 1).
    let mut weights = to_array("consumptionWeights", &file.consumption_weights)?;
    let weight_total: f64 = weights.iter().sum();
    for (c, &w) in weights.iter().enumerate() {
        check_range(&format!("consumptionWeights[{}]", c), w, 0.0, f64::MAX)?;
    }
    if weight_total > 0.0 {
        for w in &mut weights {
            *w /= weight_total;
        }
    }
    country.consumption_weights = weights;

    if let Some(shares) = &file.spending_shares {
        for (name, value) in [
            ("welfare", shares.welfare),
            ("education", shares.education),
            ("defense", shares.defense),
            ("infrastructure", shares.infrastructure),
            ("healthcare", shares.healthcare),
        ] {
            check_range(&format!("spendingShares.{}", name), value, 0.0, 1.0)?;
        }
        country.spending_shares = SpendingShares {
            welfare: shares.welfare,
            education: shares.education,
            defense: shares.defense,
            infrastructure: shares.infrastructure,
            healthcare: shares.healthcare,
        };
        country.previous_defense_share = shares.defense;
    }

    let matrix = TechnicalCoefficientMatrix::from_flat(&file.technical_coefficients)
        .map_err(|source| ScenarioError::Coefficients {
            code: file.code.clone(),
            source,
        })?;

    for region_file in &file.regions {
        let region_id =
            build_region(state, country_id, region_file, &initial_prices, scenario)?;
        country.region_ids.push(region_id);
    }

    // Faction powers normalize to sum 1 (the 0.01 floor can leave a small
    // excess, which the first political update pins down exactly).
    let power_total: f64 = file.factions.iter().map(|f| f.base_power.max(0.0)).sum();
    for faction_file in &file.factions {
        let faction_id = state.factions.len();
        let power = if power_total > 0.0 {
            (faction_file.base_power.max(0.0) / power_total).max(0.01)
        } else if !file.factions.is_empty() {
            1.0 / file.factions.len() as f64
        } else {
            0.01
        };
        let mut faction = Faction::new(faction_id, country_id, faction_file.name.clone(), power);
        faction.base_satisfaction = faction_file.base_satisfaction.clamp(0.0, 100.0);
        faction.satisfaction = faction.base_satisfaction;
        faction.red_line = RedLineKind::from_tag(&faction_file.red_line)
            .ok_or_else(|| ScenarioError::UnknownRedLine(faction_file.red_line.clone()))?;
        faction.red_line_threshold = faction_file.red_line_threshold;
        faction.red_line_penalty = faction_file.red_line_penalty.max(0.0);
        faction.weights = PreferenceWeights {
            corporate_tax: faction_file.weights.corporate_tax,
            income_tax: faction_file.weights.income_tax,
            welfare_spending: faction_file.weights.welfare_spending,
            military_spending: faction_file.weights.military_spending,
            trade_openness: faction_file.weights.trade_openness,
            gdp_growth: faction_file.weights.gdp_growth,
            low_unemployment: faction_file.weights.low_unemployment,
            wage_growth: faction_file.weights.wage_growth,
            low_corruption: faction_file.weights.low_corruption,
        };
        country.faction_ids.push(faction_id);
        state.factions.push(faction);
    }

    state.countries.push(country);
    state.coefficients.push(matrix);
    Ok(())
}

fn build_region(
    state: &mut SimulationState,
    country_id: usize,
    file: &RegionFile,
    initial_prices: &[f64; COMMODITY_COUNT],
    scenario: &ScenarioFile,
) -> Result<usize, ScenarioError> {
    check_range("infrastructure", file.infrastructure, 0.5, 1.5)?;
    check_range("inequality", file.inequality, 0.0, 1.0)?;

    let region_id = state.regions.len();
    let mut region = Region::new(region_id, country_id, file.name.clone());
    region.population = file.population;
    region.labor_force = file.labor_force;
    region.infrastructure = file.infrastructure;
    region.inequality = file.inequality;

    let capacities = to_array("sectorCapacities", &file.sector_capacities)?;
    for c in 0..COMMODITY_COUNT {
        let sector = &mut region.sectors[c];
        sector.capacity = capacities[c];
        sector.labor_coefficient = scenario.labor_coefficients[c];
        sector.price = initial_prices[c];
        sector.initial_price = initial_prices[c];
    }

    if let Some(inventory) = &file.initial_inventory {
        let inventory = to_array("initialInventory", inventory)?;
        for (c, &stock) in inventory.iter().enumerate() {
            check_range(&format!("initialInventory[{}]", c), stock, 0.0, f64::MAX)?;
        }
        region.inventory = inventory;
        for c in 0..COMMODITY_COUNT {
            region.sectors[c].inventory = inventory[c];
        }
    }

    for deposit_file in &file.deposits {
        let resource = Commodity::from_tag(&deposit_file.resource)
            .ok_or_else(|| ScenarioError::UnknownCommodity(deposit_file.resource.clone()))?;
        if !resource.is_raw() {
            return Err(ScenarioError::NotARawResource(deposit_file.resource.clone()));
        }
        check_range("difficulty", deposit_file.difficulty, 0.5, 2.0)?;
        let deposit_id = state.deposits.len();
        let mut deposit = ResourceDeposit::new(
            deposit_id,
            region_id,
            resource,
            deposit_file.total_reserves.max(0.0),
            deposit_file.base_yield.max(0.0),
        );
        deposit.subtype = deposit_file.subtype.clone();
        deposit.difficulty = deposit_file.difficulty;
        deposit.discovery = DiscoveryState::from_tag(&deposit_file.discovery).ok_or_else(
            || ScenarioError::UnknownDiscoveryState(deposit_file.discovery.clone()),
        )?;
        // Estimates degrade with ignorance: surveyed deposits are rough,
        // unknown ones invisible.
        deposit.estimated_reserves = match deposit.discovery {
            DiscoveryState::Proven => deposit.total_reserves,
            DiscoveryState::Surveyed => deposit.total_reserves * 0.8,
            DiscoveryState::Unknown => 0.0,
        };
        state.deposits.push(deposit);
    }

    if file.cohorts.is_empty() {
        // Synthesize the default wealth pyramid.
        for (wealth, share) in DEFAULT_WEALTH_SPLIT {
            let cohort_id = state.cohorts.len();
            state.cohorts.push(PopulationCohort::new(
                cohort_id,
                region_id,
                Commodity::Services,
                wealth,
                file.population * share,
            ));
        }
    } else {
        for cohort_file in &file.cohorts {
            let wealth = WealthLevel::from_tag(&cohort_file.wealth_level).ok_or_else(|| {
                ScenarioError::UnknownWealthLevel(cohort_file.wealth_level.clone())
            })?;
            let primary_sector = match &cohort_file.primary_sector {
                Some(tag) => Commodity::from_tag(tag)
                    .ok_or_else(|| ScenarioError::UnknownCommodity(tag.clone()))?,
                None => Commodity::Services,
            };
            check_range("savingsRate", cohort_file.savings_rate, 0.0, 1.0)?;
            let cohort_id = state.cohorts.len();
            let mut cohort = PopulationCohort::new(
                cohort_id,
                region_id,
                primary_sector,
                wealth,
                cohort_file.population.max(0.0),
            );
            cohort.savings_rate = cohort_file.savings_rate;
            if let Some(multipliers) = &cohort_file.consumption_multipliers {
                cohort.consumption_multipliers =
                    to_array("consumptionMultipliers", multipliers)?;
            }
            state.cohorts.push(cohort);
        }
    }

    state.regions.push(region);
    Ok(region_id)
}

fn build_trade_relation(
    state: &mut SimulationState,
    file: &TradeRelationFile,
) -> Result<(), ScenarioError> {
    let from = state
        .countries
        .iter()
        .position(|c| c.code == file.from)
        .ok_or_else(|| ScenarioError::UnknownCountryCode(file.from.clone()))?;
    let to = state
        .countries
        .iter()
        .position(|c| c.code == file.to)
        .ok_or_else(|| ScenarioError::UnknownCountryCode(file.to.clone()))?;
    if from == to {
        return Err(ScenarioError::SelfTrade(file.from.clone()));
    }

    let relation_id = state.trade_relations.len();
    let mut relation = TradeRelation::new(relation_id, from, to);
    if let Some(volumes) = &file.base_volumes {
        relation.base_volumes = to_array("baseVolumes", volumes)?;
    }
    if let Some(tariffs) = &file.tariff_rates {
        let tariffs = to_array("tariffRates", tariffs)?;
        for (c, &rate) in tariffs.iter().enumerate() {
            check_range(&format!("tariffRates[{}]", c), rate, 0.0, 1.0)?;
        }
        relation.tariff_rates = tariffs;
    }
    check_range("sanctionSeverity", file.sanction_severity, 0.0, 1.0)?;
    relation.sanction_severity = file.sanction_severity;
    relation.transport_cost = file.transport_cost.max(0.0);
    state.trade_relations.push(relation);
    Ok(())
}
