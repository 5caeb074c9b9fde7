//! Commodity taxonomy
//!
//! The simulation runs on a closed set of twelve commodities. Indices into
//! every K-sized array (prices, inventories, coefficient matrix axes) are
//! commodity indices, and the ordering is frozen for the lifetime of a run.
//!
//! # Classification
//!
//! - Six extractable raw resources (produced by deposits + extraction)
//! - Five manufactured goods (produced by sectors + manufacturing facilities)
//! - Services
//!
//! Electricity and Services cannot be stockpiled: any positive remainder at
//! the end of a tick is discarded by the spoilage step.

use serde::{Deserialize, Serialize};

/// Number of commodities. All per-commodity arrays have this length.
pub const COMMODITY_COUNT: usize = 12;

/// Shorthand used throughout the hot loops.
pub const K: usize = COMMODITY_COUNT;

/// A commodity tag.
///
/// Discriminant values are the frozen array indices.
///
/// # Example
/// ```
/// use economy_simulator_core_rs::models::commodity::{Commodity, COMMODITY_COUNT};
///
/// assert_eq!(Commodity::Agriculture.index(), 0);
/// assert_eq!(Commodity::ALL.len(), COMMODITY_COUNT);
/// assert!(!Commodity::Electricity.is_stockpileable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Commodity {
    // Raw resources
    Agriculture = 0,
    RareEarths = 1,
    Petroleum = 2,
    Coal = 3,
    Ore = 4,
    Uranium = 5,
    // Manufactured
    Electricity = 6,
    ConsumerGoods = 7,
    IndustrialGoods = 8,
    MilitaryGoods = 9,
    Electronics = 10,
    // Tertiary
    Services = 11,
}

impl Commodity {
    /// All commodities in frozen index order.
    pub const ALL: [Commodity; COMMODITY_COUNT] = [
        Commodity::Agriculture,
        Commodity::RareEarths,
        Commodity::Petroleum,
        Commodity::Coal,
        Commodity::Ore,
        Commodity::Uranium,
        Commodity::Electricity,
        Commodity::ConsumerGoods,
        Commodity::IndustrialGoods,
        Commodity::MilitaryGoods,
        Commodity::Electronics,
        Commodity::Services,
    ];

    /// Dense array index of this commodity.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Commodity for a dense index, or `None` if out of range.
    pub fn from_index(index: usize) -> Option<Commodity> {
        Commodity::ALL.get(index).copied()
    }

    /// Parse a scenario-file tag (exact variant name).
    pub fn from_tag(tag: &str) -> Option<Commodity> {
        match tag {
            "Agriculture" => Some(Commodity::Agriculture),
            "RareEarths" => Some(Commodity::RareEarths),
            "Petroleum" => Some(Commodity::Petroleum),
            "Coal" => Some(Commodity::Coal),
            "Ore" => Some(Commodity::Ore),
            "Uranium" => Some(Commodity::Uranium),
            "Electricity" => Some(Commodity::Electricity),
            "ConsumerGoods" => Some(Commodity::ConsumerGoods),
            "IndustrialGoods" => Some(Commodity::IndustrialGoods),
            "MilitaryGoods" => Some(Commodity::MilitaryGoods),
            "Electronics" => Some(Commodity::Electronics),
            "Services" => Some(Commodity::Services),
            _ => None,
        }
    }

    /// True for the six extractable raw resources (deposit-backed).
    pub fn is_raw(self) -> bool {
        matches!(
            self,
            Commodity::Agriculture
                | Commodity::RareEarths
                | Commodity::Petroleum
                | Commodity::Coal
                | Commodity::Ore
                | Commodity::Uranium
        )
    }

    /// True for goods produced by manufacturing facilities.
    pub fn is_manufactured(self) -> bool {
        matches!(
            self,
            Commodity::Electricity
                | Commodity::ConsumerGoods
                | Commodity::IndustrialGoods
                | Commodity::MilitaryGoods
                | Commodity::Electronics
        )
    }

    /// False for Electricity and Services: unsold remainder is discarded
    /// at the end of every tick.
    pub fn is_stockpileable(self) -> bool {
        !matches!(self, Commodity::Electricity | Commodity::Services)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        for (i, c) in Commodity::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
            assert_eq!(Commodity::from_index(i), Some(*c));
        }
        assert_eq!(Commodity::from_index(COMMODITY_COUNT), None);
    }

    #[test]
    fn test_tag_roundtrip() {
        assert_eq!(Commodity::from_tag("RareEarths"), Some(Commodity::RareEarths));
        assert_eq!(Commodity::from_tag("Widgets"), None);
    }

    #[test]
    fn test_classification_partition() {
        let raw = Commodity::ALL.iter().filter(|c| c.is_raw()).count();
        let manufactured = Commodity::ALL.iter().filter(|c| c.is_manufactured()).count();
        assert_eq!(raw, 6);
        assert_eq!(manufactured, 5);
        assert!(!Commodity::Services.is_raw());
        assert!(!Commodity::Services.is_manufactured());
    }

    #[test]
    fn test_non_stockpileable_set() {
        let perishable: Vec<Commodity> = Commodity::ALL
            .iter()
            .copied()
            .filter(|c| !c.is_stockpileable())
            .collect();
        assert_eq!(perishable, vec![Commodity::Electricity, Commodity::Services]);
    }
}
