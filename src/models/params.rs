//! Tunable simulation parameters
//!
//! Every knob the subsystems read lives here, attached to the state, so no
//! process-global configuration exists. Defaults are the reference values;
//! `validate` enforces the documented ranges.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("{name} = {value} outside allowed range [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Simulation-wide tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Soft-Leontief blend between bottleneck and mean input satisfaction,
    /// in [0.6, 0.9].
    pub input_blend_alpha: f64,

    /// Maximum relative excess demand fed into price adjustment per tick.
    /// The reference scenarios assume 0.5; 0.05 is an accepted
    /// configuration.
    pub max_price_change: f64,

    /// Display price smoothing factor.
    pub price_smoothing: f64,

    /// Price-ratio elasticity of trade flows.
    pub trade_elasticity: f64,

    /// Wage response to labor market tightness, in [0.01, 0.05].
    pub wage_sensitivity: f64,

    /// Weekly wage floor, f64 cents.
    pub wage_floor: f64,

    /// Worker mobility toward above-average-wage sectors, in [0, 0.1].
    /// Zero disables mobility.
    pub labor_mobility: f64,

    /// Legitimacy convergence rate toward weighted faction satisfaction,
    /// in [0.05, 0.2].
    pub legitimacy_rate: f64,

    /// Faction power drift rate.
    pub power_shift_rate: f64,

    /// Base government spending as a share of GDP.
    pub base_spending_share: f64,

    /// Debt-to-GDP threshold where the risk premium starts.
    pub debt_threshold: f64,

    /// Risk premium per unit of excess debt ratio.
    pub risk_premium_slope: f64,

    /// Facility condition regained per tick at full maintenance.
    pub facility_repair_rate: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            input_blend_alpha: 0.6,
            max_price_change: 0.5,
            price_smoothing: 0.7,
            trade_elasticity: 2.0,
            wage_sensitivity: 0.02,
            wage_floor: 100.0,
            labor_mobility: 0.0,
            legitimacy_rate: 0.1,
            power_shift_rate: 0.02,
            base_spending_share: 0.35,
            debt_threshold: 0.6,
            risk_premium_slope: 0.02,
            facility_repair_rate: 0.002,
        }
    }
}

impl SimulationParams {
    /// Check every knob against its documented range.
    pub fn validate(&self) -> Result<(), ParamsError> {
        fn check(
            name: &'static str,
            value: f64,
            min: f64,
            max: f64,
        ) -> Result<(), ParamsError> {
            if !value.is_finite() || value < min || value > max {
                return Err(ParamsError::OutOfRange {
                    name,
                    value,
                    min,
                    max,
                });
            }
            Ok(())
        }

        check("input_blend_alpha", self.input_blend_alpha, 0.6, 0.9)?;
        check("max_price_change", self.max_price_change, 0.01, 0.5)?;
        check("price_smoothing", self.price_smoothing, 0.0, 1.0)?;
        check("trade_elasticity", self.trade_elasticity, 0.1, 10.0)?;
        check("wage_sensitivity", self.wage_sensitivity, 0.01, 0.05)?;
        check("wage_floor", self.wage_floor, 0.0, 1.0e9)?;
        check("labor_mobility", self.labor_mobility, 0.0, 0.1)?;
        check("legitimacy_rate", self.legitimacy_rate, 0.05, 0.2)?;
        check("power_shift_rate", self.power_shift_rate, 0.0, 0.2)?;
        check("base_spending_share", self.base_spending_share, 0.0, 1.0)?;
        check("debt_threshold", self.debt_threshold, 0.0, 3.0)?;
        check("risk_premium_slope", self.risk_premium_slope, 0.0, 1.0)?;
        check("facility_repair_rate", self.facility_repair_rate, 0.0, 0.1)?;
        Ok(())
    }
}
