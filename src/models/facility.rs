//! Extraction and manufacturing facilities
//!
//! Facilities are the capital stock sitting outside the sector grid:
//! extraction facilities pump deposits, manufacturing facilities add
//! capacity for one output commodity. Both degrade each tick and are
//! destroyed at condition zero.

use crate::models::commodity::{Commodity, COMMODITY_COUNT};
use serde::{Deserialize, Serialize};

/// Maximum facility level.
pub const MAX_FACILITY_LEVEL: u8 = 5;

/// Per-commodity quantities plus a money cost, used for maintenance and
/// construction bundles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceBundle {
    pub quantities: [f64; COMMODITY_COUNT],
    /// Money component, i64 cents.
    pub money: i64,
}

impl Default for ResourceBundle {
    fn default() -> Self {
        Self {
            quantities: [0.0; COMMODITY_COUNT],
            money: 0,
        }
    }
}

impl ResourceBundle {
    pub fn is_free(&self) -> bool {
        self.money == 0 && self.quantities.iter().all(|&q| q == 0.0)
    }
}

/// State shared by both facility kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityCore {
    /// Level in [0, 5]; 0 = not built.
    pub level: u8,
    /// Condition in [0, 1]; 0 = destroyed (rebuild required).
    pub condition: f64,
    pub workers: f64,
    pub workers_required: f64,
    pub under_construction: bool,
    /// Construction progress in [0, 1].
    pub construction_progress: f64,
    /// Ticks to build one level from scratch.
    pub base_build_time: u32,
    /// Condition lost per tick.
    pub degradation_rate: f64,
    pub maintenance_cost: ResourceBundle,
    pub build_cost: ResourceBundle,
    /// Output produced this tick.
    pub output: f64,
}

impl FacilityCore {
    pub fn new(level: u8, workers_required: f64) -> Self {
        Self {
            level: level.min(MAX_FACILITY_LEVEL),
            condition: 1.0,
            workers: 0.0,
            workers_required,
            under_construction: false,
            construction_progress: 0.0,
            base_build_time: 26,
            degradation_rate: 0.001,
            maintenance_cost: ResourceBundle::default(),
            build_cost: ResourceBundle::default(),
            output: 0.0,
        }
    }

    /// Workforce satisfaction in [0, 1]; 1 when no workers are required.
    pub fn workforce_factor(&self) -> f64 {
        if self.workers_required <= 0.0 {
            return 1.0;
        }
        (self.workers / self.workers_required).min(1.0)
    }

    /// Concave condition penalty: sqrt keeps mid-condition facilities
    /// productive.
    pub fn condition_factor(&self) -> f64 {
        self.condition.max(0.0).sqrt()
    }

    /// True when the facility can produce this tick.
    pub fn is_operational(&self) -> bool {
        self.level > 0 && !self.under_construction && self.condition > 0.0
    }

    /// Apply one tick of wear. `maintenance_satisfaction` in [0, 1] scales
    /// the repair term. Returns true if the facility was destroyed by this
    /// decay step.
    pub fn decay(&mut self, maintenance_satisfaction: f64, repair_rate: f64) -> bool {
        if self.level == 0 {
            return false;
        }
        let was_alive = self.condition > 0.0;
        self.condition = (self.condition - self.degradation_rate
            + maintenance_satisfaction.clamp(0.0, 1.0) * repair_rate)
            .clamp(0.0, 1.0);
        was_alive && self.condition <= 0.0
    }
}

/// Facility extracting a raw commodity from a deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionFacility {
    /// Dense id (index into `SimulationState::extraction_facilities`).
    pub id: usize,
    pub region_id: usize,
    pub deposit_id: usize,
    pub core: FacilityCore,
    /// Technology modifier applied to yield.
    pub tech_modifier: f64,
}

impl ExtractionFacility {
    pub fn new(id: usize, region_id: usize, deposit_id: usize, level: u8) -> Self {
        Self {
            id,
            region_id,
            deposit_id,
            core: FacilityCore::new(level, 0.0),
            tech_modifier: 1.0,
        }
    }
}

/// Facility producing a manufactured commodity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturingFacility {
    /// Dense id (index into `SimulationState::manufacturing_facilities`).
    pub id: usize,
    pub region_id: usize,
    pub core: FacilityCore,
    /// Commodity this facility produces. Must be manufactured.
    pub output_commodity: Commodity,
    /// Output per level per tick at full staffing and condition.
    pub base_capacity: f64,
    pub tech_modifier: f64,
}

impl ManufacturingFacility {
    pub fn new(
        id: usize,
        region_id: usize,
        output_commodity: Commodity,
        level: u8,
        base_capacity: f64,
    ) -> Self {
        debug_assert!(
            output_commodity.is_manufactured(),
            "manufacturing facility output must be a manufactured commodity"
        );
        Self {
            id,
            region_id,
            core: FacilityCore::new(level, 0.0),
            output_commodity,
            base_capacity,
            tech_modifier: 1.0,
        }
    }
}
