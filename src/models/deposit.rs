//! Resource deposit model
//!
//! Deposits back the six raw commodities. Reserves only ever shrink; the
//! extraction subsystem caps facility output at what remains. What the
//! player sees (`estimated_reserves`) depends on the discovery state.

use crate::models::commodity::Commodity;
use serde::{Deserialize, Serialize};

/// How well a deposit is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoveryState {
    Unknown,
    Surveyed,
    Proven,
}

impl DiscoveryState {
    /// Parse a scenario-file tag (exact variant name).
    pub fn from_tag(tag: &str) -> Option<DiscoveryState> {
        match tag {
            "Unknown" => Some(DiscoveryState::Unknown),
            "Surveyed" => Some(DiscoveryState::Surveyed),
            "Proven" => Some(DiscoveryState::Proven),
            _ => None,
        }
    }
}

/// One resource deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDeposit {
    /// Dense id (index into `SimulationState::deposits`).
    pub id: usize,
    /// Map hex the deposit sits on.
    pub hex_id: u32,
    pub region_id: usize,
    /// Must be one of the six raw commodities.
    pub resource: Commodity,
    /// Geological subtype label (e.g. "shale", "open-pit").
    pub subtype: String,

    pub total_reserves: f64,
    /// Monotonically non-increasing; extraction subtracts output.
    pub remaining_reserves: f64,
    /// Units extracted per facility level per tick at full staffing.
    pub base_yield: f64,
    /// Extraction difficulty in [0.5, 2.0].
    pub difficulty: f64,
    pub discovery: DiscoveryState,
    /// Reserve estimate visible to the player; accuracy depends on
    /// `discovery`.
    pub estimated_reserves: f64,
}

impl ResourceDeposit {
    pub fn new(
        id: usize,
        region_id: usize,
        resource: Commodity,
        total_reserves: f64,
        base_yield: f64,
    ) -> Self {
        debug_assert!(resource.is_raw(), "deposit resource must be raw");
        Self {
            id,
            hex_id: 0,
            region_id,
            resource,
            subtype: String::new(),
            total_reserves,
            remaining_reserves: total_reserves,
            base_yield,
            difficulty: 1.0,
            discovery: DiscoveryState::Proven,
            estimated_reserves: total_reserves,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_reserves <= 0.0
    }

    /// Deduct extracted output, clamped so reserves never go negative.
    /// Returns the amount actually deducted.
    pub fn deplete(&mut self, amount: f64) -> f64 {
        let taken = amount.min(self.remaining_reserves).max(0.0);
        self.remaining_reserves -= taken;
        taken
    }
}
