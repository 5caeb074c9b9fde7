//! Diagnostics logging
//!
//! Records clamps, invariant repairs, and notable economic events during a
//! run. Diagnostics never abort a tick; they are the audit trail a host can
//! drain between ticks.
//!
//! In release builds an invariant violation is repaired (value clamped) and
//! recorded here; debug builds additionally `debug_assert!` at the repair
//! site.

use serde::{Deserialize, Serialize};

/// A single diagnostic record. Every variant carries the tick it occurred on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A post-phase invariant failed and the value was clamped back into
    /// range.
    InvariantRepaired {
        tick: u64,
        context: String,
        value: f64,
        clamped_to: f64,
    },

    /// A commodity price hit its floor or ceiling bound this tick.
    PriceBoundHit {
        tick: u64,
        country_id: usize,
        commodity: usize,
        price: f64,
        bound: f64,
    },

    /// A faction red line transitioned from satisfied to violated.
    RedLineTripped {
        tick: u64,
        country_id: usize,
        faction_id: usize,
        legitimacy_penalty: f64,
    },

    /// Debt sustainability flag changed.
    DebtSustainabilityChanged {
        tick: u64,
        country_id: usize,
        sustainable: bool,
        debt_to_gdp: f64,
    },

    /// A deposit was exhausted by extraction.
    DepositExhausted { tick: u64, deposit_id: usize },

    /// A facility's condition reached zero; it is destroyed until rebuilt.
    FacilityDestroyed { tick: u64, facility_id: usize },
}

impl Diagnostic {
    /// Tick this diagnostic was recorded on.
    pub fn tick(&self) -> u64 {
        match self {
            Diagnostic::InvariantRepaired { tick, .. }
            | Diagnostic::PriceBoundHit { tick, .. }
            | Diagnostic::RedLineTripped { tick, .. }
            | Diagnostic::DebtSustainabilityChanged { tick, .. }
            | Diagnostic::DepositExhausted { tick, .. }
            | Diagnostic::FacilityDestroyed { tick, .. } => *tick,
        }
    }
}

/// Append-only diagnostic log attached to the simulation state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticsLog {
    records: Vec<Diagnostic>,
}

impl DiagnosticsLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.records.push(diagnostic);
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drain all records, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.records)
    }

    /// Records for a specific tick.
    pub fn for_tick(&self, tick: u64) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter().filter(move |d| d.tick() == tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_drain() {
        let mut log = DiagnosticsLog::new();
        log.record(Diagnostic::DepositExhausted {
            tick: 3,
            deposit_id: 0,
        });
        log.record(Diagnostic::FacilityDestroyed {
            tick: 4,
            facility_id: 1,
        });
        assert_eq!(log.len(), 2);
        assert_eq!(log.for_tick(3).count(), 1);

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
    }
}
