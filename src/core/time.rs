//! Time management for the simulation
//!
//! The simulation operates in discrete ticks. The base tick is one week;
//! 52 ticks form a year. Fiscal and political updates run on a monthly gate
//! (every 4 ticks). This module provides deterministic time advancement.

use serde::{Deserialize, Serialize};

/// Ticks per simulated year.
pub const TICKS_PER_YEAR: u64 = 52;

/// Fiscal/political gate: these subsystems run when `tick % 4 == 0`.
pub const TICKS_PER_MONTH: u64 = 4;

/// Fraction of a year covered by one tick.
pub const TICK_DT: f64 = 1.0 / TICKS_PER_YEAR as f64;

/// Manages simulation time in discrete weekly ticks.
///
/// # Example
/// ```
/// use economy_simulator_core_rs::core::time::TimeManager;
///
/// let mut time = TimeManager::new(1990);
/// assert_eq!(time.current_tick(), 0);
/// assert!(time.is_fiscal_tick());
///
/// time.advance_tick();
/// assert_eq!(time.current_tick(), 1);
/// assert!(!time.is_fiscal_tick());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeManager {
    /// Total ticks elapsed since simulation start.
    current_tick: u64,
    /// Calendar year at tick 0.
    start_year: i32,
}

impl TimeManager {
    /// Create a new TimeManager starting at the given calendar year.
    pub fn new(start_year: i32) -> Self {
        Self {
            current_tick: 0,
            start_year,
        }
    }

    /// Restore from a snapshot position.
    pub fn at_tick(start_year: i32, current_tick: u64) -> Self {
        Self {
            current_tick,
            start_year,
        }
    }

    /// Advance time by one tick.
    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }

    /// Total ticks since start.
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Current calendar year.
    pub fn current_year(&self) -> i32 {
        self.start_year + (self.current_tick / TICKS_PER_YEAR) as i32
    }

    /// Week within the current year (0..52).
    pub fn week_of_year(&self) -> u64 {
        self.current_tick % TICKS_PER_YEAR
    }

    /// True when fiscal and political subsystems run this tick.
    pub fn is_fiscal_tick(&self) -> bool {
        self.current_tick % TICKS_PER_MONTH == 0
    }

    /// True on year boundaries, when CPI history rotates.
    pub fn is_year_boundary(&self) -> bool {
        self.current_tick % TICKS_PER_YEAR == 0
    }

    /// Calendar year at tick 0.
    pub fn start_year(&self) -> i32 {
        self.start_year
    }
}
