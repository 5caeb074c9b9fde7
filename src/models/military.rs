//! Military formations
//!
//! Placeholder military layer: formations carry strength, equipment that
//! ages, and supply requirements procured out of defense spending. No
//! combat resolution happens in the core.

use crate::models::facility::ResourceBundle;
use serde::{Deserialize, Serialize};

/// Formation type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormationType {
    Infantry,
    Armored,
    Artillery,
    AirWing,
    Naval,
}

/// One military formation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilitaryFormation {
    /// Dense id (index into `SimulationState::formations`).
    pub id: usize,
    pub country_id: usize,
    pub formation_type: FormationType,

    pub base_strength: f64,
    /// Effective strength after training/supply/equipment modifiers.
    pub strength: f64,
    pub personnel: f64,
    /// Training level in [0, 1].
    pub training: f64,
    /// Maintenance level in [0, 1].
    pub maintenance: f64,
    /// Morale in [0, 1].
    pub morale: f64,

    /// Quality of equipment as issued (before age depreciation).
    pub base_equipment_quality: f64,
    /// Current equipment quality after age depreciation.
    pub equipment_quality: f64,
    /// Ticks since the equipment was issued.
    pub equipment_age: u32,
    /// Quality lost per tick of age.
    pub depreciation_rate: f64,

    pub maintenance_cost: ResourceBundle,
    pub combat_supply_cost: ResourceBundle,
    /// Supply status in [0, 1]; drifts toward procurement satisfaction.
    pub supply_status: f64,
    /// Readiness in [0, 1]; derived from training, morale, and supply.
    pub readiness: f64,

    pub deployed: bool,
    pub hex_id: u32,
    pub in_combat: bool,
}

impl MilitaryFormation {
    pub fn new(
        id: usize,
        country_id: usize,
        formation_type: FormationType,
        base_strength: f64,
        personnel: f64,
    ) -> Self {
        Self {
            id,
            country_id,
            formation_type,
            base_strength,
            strength: base_strength,
            personnel,
            training: 0.5,
            maintenance: 1.0,
            morale: 0.7,
            base_equipment_quality: 1.0,
            equipment_quality: 1.0,
            equipment_age: 0,
            depreciation_rate: 0.0005,
            maintenance_cost: ResourceBundle::default(),
            combat_supply_cost: ResourceBundle::default(),
            supply_status: 1.0,
            readiness: 0.5,
            deployed: false,
            hex_id: 0,
            in_combat: false,
        }
    }

    /// Age equipment by one tick: quality = base · max(0, 1 − rate · age).
    pub fn age_equipment(&mut self) {
        self.equipment_age += 1;
        self.equipment_quality = self.base_equipment_quality
            * (1.0 - self.depreciation_rate * self.equipment_age as f64).max(0.0);
    }
}
