//! Population cohorts
//!
//! Cohorts are the household side of the economy: they earn wages, consume
//! by wealth level, and accumulate savings. Base consumption per capita is
//! a fixed lookup keyed by (wealth level, commodity), in annual units;
//! the demand aggregation divides by 52 per tick.

use crate::models::commodity::{Commodity, COMMODITY_COUNT};
use serde::{Deserialize, Serialize};

/// Household wealth stratum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WealthLevel {
    Subsistence,
    Poor,
    Middle,
    Wealthy,
    Rich,
}

impl WealthLevel {
    pub const ALL: [WealthLevel; 5] = [
        WealthLevel::Subsistence,
        WealthLevel::Poor,
        WealthLevel::Middle,
        WealthLevel::Wealthy,
        WealthLevel::Rich,
    ];

    /// Parse a scenario-file tag (exact variant name).
    pub fn from_tag(tag: &str) -> Option<WealthLevel> {
        match tag {
            "Subsistence" => Some(WealthLevel::Subsistence),
            "Poor" => Some(WealthLevel::Poor),
            "Middle" => Some(WealthLevel::Middle),
            "Wealthy" => Some(WealthLevel::Wealthy),
            "Rich" => Some(WealthLevel::Rich),
            _ => None,
        }
    }

    /// Relative earning weight used to split the regional wage bill.
    pub fn earning_weight(self) -> f64 {
        match self {
            WealthLevel::Subsistence => 0.4,
            WealthLevel::Poor => 0.7,
            WealthLevel::Middle => 1.0,
            WealthLevel::Wealthy => 2.0,
            WealthLevel::Rich => 5.0,
        }
    }
}

/// Base annual consumption per capita, in commodity units.
///
/// Fixed lookup table; cohort `consumption_multipliers` scale these.
pub fn base_consumption_per_capita(wealth: WealthLevel, commodity: Commodity) -> f64 {
    use Commodity::*;
    use WealthLevel::*;
    match (wealth, commodity) {
        // Food is the floor of every basket.
        (Subsistence, Agriculture) => 0.9,
        (Poor, Agriculture) => 1.0,
        (Middle, Agriculture) => 1.1,
        (Wealthy, Agriculture) => 1.2,
        (Rich, Agriculture) => 1.3,

        (Subsistence, Electricity) => 0.1,
        (Poor, Electricity) => 0.3,
        (Middle, Electricity) => 0.8,
        (Wealthy, Electricity) => 1.5,
        (Rich, Electricity) => 2.5,

        (Subsistence, ConsumerGoods) => 0.05,
        (Poor, ConsumerGoods) => 0.2,
        (Middle, ConsumerGoods) => 0.8,
        (Wealthy, ConsumerGoods) => 2.0,
        (Rich, ConsumerGoods) => 4.0,

        (Subsistence, Electronics) => 0.0,
        (Poor, Electronics) => 0.02,
        (Middle, Electronics) => 0.2,
        (Wealthy, Electronics) => 0.6,
        (Rich, Electronics) => 1.5,

        (Subsistence, Services) => 0.05,
        (Poor, Services) => 0.2,
        (Middle, Services) => 1.0,
        (Wealthy, Services) => 3.0,
        (Rich, Services) => 8.0,

        (Subsistence, Coal) => 0.05,
        (Poor, Coal) => 0.08,
        (Middle, Coal) => 0.05,
        // Raw industrial inputs are not consumed directly by households.
        _ => 0.0,
    }
}

/// One population cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationCohort {
    /// Dense id (index into `SimulationState::cohorts`).
    pub id: usize,
    pub region_id: usize,
    /// Sector most of this cohort works in.
    pub primary_sector: Commodity,
    pub wealth_level: WealthLevel,
    pub population: f64,
    /// Accumulated wealth, f64 cents.
    pub wealth: f64,
    /// Income received this tick, f64 cents.
    pub income: f64,
    /// Cost of living per capita this tick, f64 cents.
    pub cost_of_living: f64,
    /// Share of income saved rather than consumed, [0, 1].
    pub savings_rate: f64,
    /// Per-commodity scaling of the base consumption table.
    pub consumption_multipliers: [f64; COMMODITY_COUNT],
}

impl PopulationCohort {
    pub fn new(
        id: usize,
        region_id: usize,
        primary_sector: Commodity,
        wealth_level: WealthLevel,
        population: f64,
    ) -> Self {
        Self {
            id,
            region_id,
            primary_sector,
            wealth_level,
            population,
            wealth: 0.0,
            income: 0.0,
            cost_of_living: 0.0,
            savings_rate: 0.1,
            consumption_multipliers: [1.0; COMMODITY_COUNT],
        }
    }

    /// Demand for a commodity this tick, in units.
    pub fn weekly_demand(&self, commodity: Commodity) -> f64 {
        base_consumption_per_capita(self.wealth_level, commodity)
            * self.consumption_multipliers[commodity.index()]
            * self.population
            / 52.0
    }

    /// Income spent on consumption this tick, f64 cents.
    pub fn consumption_spending(&self) -> f64 {
        self.income * (1.0 - self.savings_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_richer_cohorts_consume_more_services() {
        let poor = base_consumption_per_capita(WealthLevel::Poor, Commodity::Services);
        let rich = base_consumption_per_capita(WealthLevel::Rich, Commodity::Services);
        assert!(rich > poor);
    }

    #[test]
    fn test_weekly_demand_scales_with_population() {
        let mut c = PopulationCohort::new(
            0,
            0,
            Commodity::Agriculture,
            WealthLevel::Middle,
            5200.0,
        );
        let base = base_consumption_per_capita(WealthLevel::Middle, Commodity::Agriculture);
        assert!((c.weekly_demand(Commodity::Agriculture) - base * 100.0).abs() < 1e-9);
        c.consumption_multipliers[Commodity::Agriculture.index()] = 2.0;
        assert!((c.weekly_demand(Commodity::Agriculture) - base * 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_households_do_not_eat_uranium() {
        for wealth in WealthLevel::ALL {
            assert_eq!(base_consumption_per_capita(wealth, Commodity::Uranium), 0.0);
        }
    }
}
