use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanError;

/// Regional minimum living cost added to the first installment when
/// estimating the income needed to service a loan.
pub const SUBSISTENCE_FLOOR: Decimal = dec!(16844);

/// A balance at or below this amount is treated as paid off.
pub const PAYOFF_THRESHOLD: Decimal = dec!(0.01);

/// Longest accepted term (1000 years). Only there to bound the loop.
pub const MAX_TERM_MONTHS: u32 = 12_000;

/// Tunable constants of the schedule engine.
///
/// Every field falls back to its default when absent, so a host can load a
/// partial override such as `{"subsistence_floor": 20000}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Added to the initial installment to produce `required_income`.
    pub subsistence_floor: Decimal,
    /// The loop stops once the outstanding balance drops to this value.
    pub payoff_threshold: Decimal,
    /// Upper bound on `term_months`.
    pub max_term_months: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            subsistence_floor: SUBSISTENCE_FLOOR,
            payoff_threshold: PAYOFF_THRESHOLD,
            max_term_months: MAX_TERM_MONTHS,
        }
    }
}

impl EngineSettings {
    /// Parses settings from JSON, filling omitted fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, LoanError> {
        let settings: EngineSettings = serde_json::from_str(json)?;
        if settings.subsistence_floor < Decimal::ZERO {
            return Err(LoanError::invalid(
                "subsistence_floor",
                "Subsistence floor cannot be negative.",
            ));
        }
        if settings.payoff_threshold < Decimal::ZERO {
            return Err(LoanError::invalid(
                "payoff_threshold",
                "Payoff threshold cannot be negative.",
            ));
        }
        if settings.max_term_months == 0 {
            return Err(LoanError::invalid(
                "max_term_months",
                "Maximum term must be at least one month.",
            ));
        }
        Ok(settings)
    }
}
