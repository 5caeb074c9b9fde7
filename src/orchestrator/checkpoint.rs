//! Checkpoint - save/load simulation state
//!
//! Serializes the complete world for pause/resume and for the determinism
//! tests: two runs of the same scenario and seed must produce
//! byte-identical snapshots.
//!
//! # Critical Invariants
//!
//! - **Determinism**: every collection in the state is a dense `Vec`, so
//!   serialization order is the id order and the output is reproducible
//! - **Config matching**: a snapshot can only be restored into a run whose
//!   configuration (parameters, seed, calendar) hashes identically

use crate::models::state::SimulationState;
use crate::orchestrator::SimulationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Configuration identity of a run: everything that must match for a
/// snapshot to be restorable.
#[derive(Debug, Clone, Serialize)]
struct ConfigIdentity<'a> {
    params: &'a crate::models::params::SimulationParams,
    base_seed: u64,
    start_year: i32,
    countries: usize,
    regions: usize,
    factions: usize,
    trade_relations: usize,
}

impl<'a> ConfigIdentity<'a> {
    fn of(state: &'a SimulationState) -> Self {
        Self {
            params: &state.params,
            base_seed: state.base_seed(),
            start_year: state.time.start_year(),
            countries: state.countries.len(),
            regions: state.regions.len(),
            factions: state.factions.len(),
            trade_relations: state.trade_relations.len(),
        }
    }
}

/// Complete state snapshot with its configuration hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Tick the snapshot was taken at.
    pub tick: u64,
    /// SHA-256 over the canonicalized configuration identity.
    pub config_hash: String,
    /// The full world.
    pub state: SimulationState,
}

/// Compute a deterministic SHA-256 hash of any serializable config.
///
/// Canonical JSON with recursively sorted object keys, so the hash does
/// not depend on map iteration order.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config)
        .map_err(|e| SimulationError::Serialization(format!("config hash: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let canonical = canonicalize(value);
    let json = serde_json::to_string(&canonical)
        .map_err(|e| SimulationError::Serialization(format!("config hash: {}", e)))?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Capture a snapshot of the state.
pub fn capture(state: &SimulationState) -> Result<StateSnapshot, SimulationError> {
    let config_hash = compute_config_hash(&ConfigIdentity::of(state))?;
    Ok(StateSnapshot {
        tick: state.tick(),
        config_hash,
        state: state.clone(),
    })
}

/// Restore a snapshot, verifying its configuration hash still matches the
/// state it carries.
pub fn restore(snapshot: StateSnapshot) -> Result<SimulationState, SimulationError> {
    let actual = compute_config_hash(&ConfigIdentity::of(&snapshot.state))?;
    if actual != snapshot.config_hash {
        return Err(SimulationError::ConfigMismatch {
            snapshot: snapshot.config_hash,
            state: actual,
        });
    }
    Ok(snapshot.state)
}

/// Serialize a snapshot to deterministic JSON.
pub fn to_json(snapshot: &StateSnapshot) -> Result<String, SimulationError> {
    serde_json::to_string(snapshot).map_err(|e| SimulationError::Serialization(e.to_string()))
}

/// Parse a snapshot back from JSON.
pub fn from_json(json: &str) -> Result<StateSnapshot, SimulationError> {
    serde_json::from_str(json).map_err(|e| SimulationError::Deserialization(e.to_string()))
}
