//! Faction model
//!
//! Factions are the political interest blocs inside a country. Each carries
//! a power share, a satisfaction level derived from policy outcomes, signed
//! preference weights over policy axes, and at most one red line whose
//! violation costs the government legitimacy.

use serde::{Deserialize, Serialize};

/// Red line predicate tags. Closed set; dispatch is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedLineKind {
    None,
    /// Corporate tax rate above threshold.
    CorporateTaxAbove,
    /// Unemployment rate above threshold.
    UnemploymentAbove,
    /// Defense spending share below threshold.
    DefenseSpendingBelow,
    /// Corruption above threshold.
    CorruptionAbove,
    /// Imported food share of total food supply above threshold.
    FoodImportsAbove,
    /// Relative cut in defense share versus the previous fiscal tick above
    /// threshold.
    DefenseBudgetCutAbove,
}

impl RedLineKind {
    /// Parse a scenario-file tag (exact variant name).
    pub fn from_tag(tag: &str) -> Option<RedLineKind> {
        match tag {
            "None" => Some(RedLineKind::None),
            "CorporateTaxAbove" => Some(RedLineKind::CorporateTaxAbove),
            "UnemploymentAbove" => Some(RedLineKind::UnemploymentAbove),
            "DefenseSpendingBelow" => Some(RedLineKind::DefenseSpendingBelow),
            "CorruptionAbove" => Some(RedLineKind::CorruptionAbove),
            "FoodImportsAbove" => Some(RedLineKind::FoodImportsAbove),
            "DefenseBudgetCutAbove" => Some(RedLineKind::DefenseBudgetCutAbove),
            _ => None,
        }
    }
}

/// Signed preference weights over policy axes.
///
/// Positive weight = the faction prefers higher utility on that axis; the
/// utilities themselves are defined by the political subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PreferenceWeights {
    pub corporate_tax: f64,
    pub income_tax: f64,
    pub welfare_spending: f64,
    pub military_spending: f64,
    pub trade_openness: f64,
    pub gdp_growth: f64,
    pub low_unemployment: f64,
    pub wage_growth: f64,
    pub low_corruption: f64,
}

/// One political faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    /// Dense id (index into `SimulationState::factions`).
    pub id: usize,
    pub country_id: usize,
    pub name: String,

    /// Power share in [0.01, 1]. All factions of a country are normalized
    /// to sum exactly to 1 after each political update.
    pub power: f64,
    /// Satisfaction baseline the utility contributions are added to.
    pub base_satisfaction: f64,
    /// Current satisfaction in [0, 100].
    pub satisfaction: f64,

    pub weights: PreferenceWeights,

    pub red_line: RedLineKind,
    pub red_line_threshold: f64,
    /// Set while the red line predicate holds; penalties apply only on the
    /// rising edge.
    pub red_line_violated: bool,
    /// Satisfaction penalty applied when the red line trips.
    pub red_line_penalty: f64,
}

impl Faction {
    pub fn new(id: usize, country_id: usize, name: String, power: f64) -> Self {
        Self {
            id,
            country_id,
            name,
            power: power.clamp(0.01, 1.0),
            base_satisfaction: 50.0,
            satisfaction: 50.0,
            weights: PreferenceWeights::default(),
            red_line: RedLineKind::None,
            red_line_threshold: 0.0,
            red_line_violated: false,
            red_line_penalty: 0.0,
        }
    }
}
