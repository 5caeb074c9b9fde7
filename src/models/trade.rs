//! Trade relation model
//!
//! A trade relation is a directed ordered pair (from, to): `from` exports,
//! `to` imports. Tariffs are imposed by the importer. The symmetric policy
//! (sanctioning both directions) is the caller's responsibility; the trade
//! subsystem treats directed relations independently.

use crate::models::commodity::COMMODITY_COUNT;
use serde::{Deserialize, Serialize};

/// Directed trade relation between two countries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRelation {
    /// Dense id (index into `SimulationState::trade_relations`).
    pub id: usize,
    /// Exporter country id.
    pub from_country: usize,
    /// Importer country id.
    pub to_country: usize,

    /// Tariff rate per commodity in [0, 1], imposed by `to_country`.
    pub tariff_rates: [f64; COMMODITY_COUNT],
    /// Base trade volume per commodity, loaded from MRIO data.
    pub base_volumes: [f64; COMMODITY_COUNT],
    /// Volumes realized last trade tick.
    pub current_volumes: [f64; COMMODITY_COUNT],

    /// Diplomatic score in [-100, 100].
    pub diplomatic_score: f64,
    /// Reliability in [0, 1].
    pub reliability: f64,
    pub distance_penalty: f64,
    pub treaty_bonus: f64,
    /// Sanction severity in [0, 1]; 1 is a full embargo.
    pub sanction_severity: f64,
    /// Transport cost per unit shipped, f64 cents.
    pub transport_cost: f64,
}

impl TradeRelation {
    pub fn new(id: usize, from_country: usize, to_country: usize) -> Self {
        Self {
            id,
            from_country,
            to_country,
            tariff_rates: [0.0; COMMODITY_COUNT],
            base_volumes: [0.0; COMMODITY_COUNT],
            current_volumes: [0.0; COMMODITY_COUNT],
            diplomatic_score: 0.0,
            reliability: 1.0,
            distance_penalty: 0.0,
            treaty_bonus: 0.0,
            sanction_severity: 0.0,
            transport_cost: 0.0,
        }
    }

    /// Set sanction severity, clamped to [0, 1].
    pub fn set_sanction_severity(&mut self, severity: f64) {
        self.sanction_severity = severity.clamp(0.0, 1.0);
    }

    /// Set a commodity tariff, clamped to [0, 1].
    pub fn set_tariff(&mut self, commodity: usize, rate: f64) {
        self.tariff_rates[commodity] = rate.clamp(0.0, 1.0);
    }

    /// True when the relation is fully embargoed.
    pub fn is_embargoed(&self) -> bool {
        self.sanction_severity >= 1.0
    }
}
