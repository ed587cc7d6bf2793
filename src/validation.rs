use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::error::LoanError;
use crate::formulas::monthly_rate;
use crate::settings::EngineSettings;
use crate::types::LoanRequest;

/// Checks a request before any computation starts.
///
/// # Errors
///
/// Returns `LoanError::InvalidInput` naming the first offending field when the
/// principal or term is not positive, the rate is negative, the term exceeds
/// `settings.max_term_months`, the loan is too large to schedule in decimal
/// range, or an early repayment has month zero or a non-positive amount.
pub fn validate(request: &LoanRequest, settings: &EngineSettings) -> Result<(), LoanError> {
    let result = check(request, settings);
    if let Err(LoanError::InvalidInput { field, reason }) = &result {
        warn!(%field, %reason, "rejected loan request");
    }
    result
}

fn check(request: &LoanRequest, settings: &EngineSettings) -> Result<(), LoanError> {
    if request.principal <= Decimal::ZERO {
        return Err(LoanError::invalid("principal", "Principal must be positive."));
    }
    if request.term_months == 0 {
        return Err(LoanError::invalid("term_months", "Term must be positive."));
    }
    if request.term_months > settings.max_term_months {
        return Err(LoanError::invalid(
            "term_months",
            format!("Term cannot exceed {} months.", settings.max_term_months),
        ));
    }
    if request.annual_rate_percent < Decimal::ZERO {
        return Err(LoanError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative.",
        ));
    }
    // No installment exceeds principal * (1 + i), so this bounds every
    // payment, interest figure and total the schedule produces.
    let peak_total = (dec!(1) + monthly_rate(request.annual_rate_percent))
        .checked_mul(request.principal)
        .and_then(|peak| peak.checked_mul(Decimal::from(request.term_months)));
    if peak_total.is_none() {
        return Err(LoanError::invalid(
            "principal",
            "Loan is too large to schedule at this rate and term.",
        ));
    }

    for (index, repayment) in request.early_repayments.iter().enumerate() {
        if repayment.month == 0 {
            return Err(LoanError::invalid(
                format!("early_repayments[{index}].month"),
                "Early repayment month must be at least 1.",
            ));
        }
        if repayment.amount <= Decimal::ZERO {
            return Err(LoanError::invalid(
                format!("early_repayments[{index}].amount"),
                "Early repayment amount must be positive.",
            ));
        }
    }

    Ok(())
}
