//! Country model
//!
//! A country aggregates the economic, fiscal, trade, political, and market
//! state for one national economy. Regions, factions, and trade relations
//! reference countries by dense id only.
//!
//! CRITICAL: monetary stocks (GDP, debt, FX reserves) are i64 cents.
//! Per-tick flows (tax revenue, spending, trade balance, wage bill) are f64
//! cents and are committed to the integer stocks with deterministic
//! rounding by the fiscal subsystem.

use crate::models::commodity::COMMODITY_COUNT;
use serde::{Deserialize, Serialize};

/// Discretionary spending shares by category.
///
/// Shares are policy knobs in [0, 1]; they are not required to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpendingShares {
    pub welfare: f64,
    pub education: f64,
    pub defense: f64,
    pub infrastructure: f64,
    pub healthcare: f64,
}

/// One national economy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    /// Dense id (index into `SimulationState::countries`).
    pub id: usize,
    /// ISO-like code, unique across the scenario (e.g. "DEU").
    pub code: String,
    pub name: String,

    // Economic aggregates
    /// Annualized GDP, i64 cents. Updated on fiscal ticks.
    pub gdp: i64,
    /// GDP at the previous fiscal tick, for growth-rate readers.
    pub previous_gdp: i64,
    /// Consumer price index relative to initial prices (1.0 at start).
    pub cpi: f64,
    /// CPI 52 ticks ago, rotated at year boundaries.
    pub cpi_year_ago: f64,
    pub labor_force: f64,
    pub employed: f64,
    /// Total wages paid this tick, f64 cents.
    pub wages_paid: f64,

    // Fiscal
    /// Sovereign debt, i64 cents. Never negative.
    pub debt: i64,
    pub base_interest_rate: f64,
    /// Base rate plus debt risk premium; set on fiscal ticks.
    pub effective_interest_rate: f64,
    /// Foreign exchange reserves, i64 cents. May go negative (net debtor).
    pub fx_reserves: i64,
    pub income_tax_rate: f64,
    pub corporate_tax_rate: f64,
    pub vat_rate: f64,
    /// Tax revenue collected at the last fiscal tick, f64 cents.
    pub tax_revenue: f64,
    /// Government spending at the last fiscal tick, f64 cents.
    pub government_spending: f64,
    /// Spending net of interest at the last fiscal tick, f64 cents; the
    /// category shares split this.
    pub discretionary_spending: f64,
    pub spending_shares: SpendingShares,
    /// Defense share at the previous fiscal tick (DefenseBudgetCutAbove
    /// red line reads this).
    pub previous_defense_share: f64,
    /// Mean wage at the previous political tick, f64 cents; baseline for
    /// the wage-growth preference axis.
    pub previous_average_wage: f64,

    // Trade
    /// Net trade balance this tick, f64 cents. Reset at the start of every
    /// trade phase.
    pub trade_balance: f64,
    /// Tariff revenue accrued by the trade subsystem since the last fiscal
    /// tick, f64 cents.
    pub tariff_revenue: f64,
    pub import_propensity: [f64; COMMODITY_COUNT],
    pub export_propensity: [f64; COMMODITY_COUNT],
    /// Import volumes by commodity this tick (units, not cents). Feeds the
    /// FoodImportsAbove red line.
    pub imports_this_tick: [f64; COMMODITY_COUNT],
    /// Export volumes by commodity this tick (units).
    pub exports_this_tick: [f64; COMMODITY_COUNT],

    // Political
    /// Government legitimacy in [0, 100].
    pub legitimacy: f64,
    /// Corruption level in [0, 1].
    pub corruption: f64,
    /// Mean regional unrest in [0, 100].
    pub average_unrest: f64,
    pub war_weariness: f64,
    pub at_war: bool,

    // Military
    pub military_power: f64,
    /// MilitaryGoods demand of all formations at the last military update.
    pub military_goods_required: f64,
    /// Fraction of required military goods actually procured, [0, 1].
    pub procurement_satisfaction: f64,

    // Cross-references
    pub region_ids: Vec<usize>,
    pub faction_ids: Vec<usize>,

    // Market state
    pub prices: [f64; COMMODITY_COUNT],
    /// Smoothed display prices (exponential smoothing of `prices`).
    pub display_prices: [f64; COMMODITY_COUNT],
    /// Immutable after load; price bounds and CPI are relative to these.
    pub initial_prices: [f64; COMMODITY_COUNT],
    /// Consumption basket weights, non-negative, normalized at load.
    pub consumption_weights: [f64; COMMODITY_COUNT],
}

impl Country {
    /// Create a country with neutral aggregates. Scenario loading fills in
    /// the economic fields; tests use this directly.
    pub fn new(id: usize, code: String, name: String) -> Self {
        Self {
            id,
            code,
            name,
            gdp: 0,
            previous_gdp: 0,
            cpi: 1.0,
            cpi_year_ago: 1.0,
            labor_force: 0.0,
            employed: 0.0,
            wages_paid: 0.0,
            debt: 0,
            base_interest_rate: 0.02,
            effective_interest_rate: 0.02,
            fx_reserves: 0,
            income_tax_rate: 0.0,
            corporate_tax_rate: 0.0,
            vat_rate: 0.0,
            tax_revenue: 0.0,
            government_spending: 0.0,
            discretionary_spending: 0.0,
            spending_shares: SpendingShares::default(),
            previous_defense_share: 0.0,
            previous_average_wage: 0.0,
            trade_balance: 0.0,
            tariff_revenue: 0.0,
            import_propensity: [0.0; COMMODITY_COUNT],
            export_propensity: [0.0; COMMODITY_COUNT],
            imports_this_tick: [0.0; COMMODITY_COUNT],
            exports_this_tick: [0.0; COMMODITY_COUNT],
            legitimacy: 50.0,
            corruption: 0.0,
            average_unrest: 0.0,
            war_weariness: 0.0,
            at_war: false,
            military_power: 0.0,
            military_goods_required: 0.0,
            procurement_satisfaction: 1.0,
            region_ids: Vec::new(),
            faction_ids: Vec::new(),
            prices: [1.0; COMMODITY_COUNT],
            display_prices: [1.0; COMMODITY_COUNT],
            initial_prices: [1.0; COMMODITY_COUNT],
            consumption_weights: [0.0; COMMODITY_COUNT],
        }
    }

    /// Annualized GDP growth rate versus the previous fiscal tick.
    /// Zero when there is no usable baseline.
    pub fn gdp_growth(&self) -> f64 {
        if self.previous_gdp <= 0 {
            return 0.0;
        }
        (self.gdp - self.previous_gdp) as f64 / self.previous_gdp as f64
    }

    /// Unemployment rate in [0, 1]. Zero when the labor force is empty.
    pub fn unemployment_rate(&self) -> f64 {
        if self.labor_force <= 0.0 {
            return 0.0;
        }
        (1.0 - self.employed / self.labor_force).clamp(0.0, 1.0)
    }

    /// Ceiling on the reported debt-to-GDP ratio. Keeps the risk premium
    /// finite for economies with collapsed or zero GDP.
    pub const DEBT_RATIO_CEILING: f64 = 10.0;

    /// Debt-to-GDP ratio, capped at [`Self::DEBT_RATIO_CEILING`]. Zero GDP
    /// with zero debt reads as 0; zero GDP with debt reads as the ceiling.
    pub fn debt_to_gdp(&self) -> f64 {
        if self.gdp <= 0 {
            return if self.debt == 0 {
                0.0
            } else {
                Self::DEBT_RATIO_CEILING
            };
        }
        (self.debt as f64 / self.gdp as f64).min(Self::DEBT_RATIO_CEILING)
    }

    /// Debt sustainability flag: D/GDP < 1.5.
    pub fn debt_sustainable(&self) -> bool {
        self.debt_to_gdp() < 1.5
    }

    /// Annual inflation: CPI against its value 52 ticks ago.
    pub fn annual_inflation(&self) -> f64 {
        if self.cpi_year_ago <= 0.0 {
            return 0.0;
        }
        self.cpi / self.cpi_year_ago - 1.0
    }

    /// Mean wage this tick, f64 cents; wage floor stands in when nobody is
    /// employed.
    pub fn average_wage(&self) -> f64 {
        if self.employed <= 0.0 {
            return 0.0;
        }
        self.wages_paid / self.employed
    }

    /// Composite stability score in [0, 100].
    pub fn stability(&self) -> f64 {
        0.6 * self.legitimacy + 0.4 * (100.0 - self.average_unrest)
    }

    /// True when the government is at risk of collapse.
    pub fn at_risk(&self) -> bool {
        self.legitimacy < 30.0 || self.average_unrest > 70.0
    }

    /// Trade openness: (exports + imports) / GDP, using this tick's volumes
    /// priced at current prices. Zero when GDP is zero.
    pub fn trade_openness(&self) -> f64 {
        if self.gdp <= 0 {
            return 0.0;
        }
        let traded: f64 = (0..COMMODITY_COUNT)
            .map(|c| (self.imports_this_tick[c] + self.exports_this_tick[c]) * self.prices[c])
            .sum();
        // Volumes are weekly; annualize against the annualized GDP.
        traded * 52.0 / self.gdp as f64
    }
}
