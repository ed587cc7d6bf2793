//! `loan_schedule` is a Rust library for computing loan amortization schedules.
//!
//! It produces a month-by-month breakdown of principal, interest and remaining
//! balance for the two common repayment schemes:
//! - **Annuity**: a level installment over the whole term, so the interest
//!   share shrinks and the principal share grows.
//! - **Differentiated**: a fixed principal slice each month plus interest on
//!   the outstanding balance, leading to decreasing total payments over time.
//!
//! Early (extra) repayments can be scheduled on any month. On an annuity loan
//! each one either keeps the installment and shortens the term
//! ([`RepaymentEffect::ReduceTerm`]) or keeps the term and lowers the
//! installment ([`RepaymentEffect::ReducePayment`]).
//!
//! ## Usage
//!
//! ```rust
//! use loan_schedule::{
//!     compute, EarlyRepayment, LoanRequest, PaymentStyle, RepaymentEffect,
//! };
//! use rust_decimal_macros::dec;
//!
//! let request = LoanRequest::new(dec!(1_200_000), 12, dec!(12), PaymentStyle::Annuity)
//!     .with_early_repayments(vec![EarlyRepayment {
//!         month: 6,
//!         amount: dec!(200_000),
//!         effect: RepaymentEffect::ReducePayment,
//!     }]);
//!
//! match compute(&request) {
//!     Ok(result) => {
//!         println!("Rows:        {}", result.rows.len());
//!         println!("Total paid:  {:.2}", result.total_paid);
//!         println!("Overpayment: {:.2}", result.total_overpayment);
//!     }
//!     Err(e) => {
//!         eprintln!("Error calculating schedule: {}", e);
//!     }
//! }
//! ```

pub mod error;
pub mod export;
pub mod formulas;
pub mod payload;
pub mod schedule;
pub mod settings;
pub mod summary;
pub mod types;
pub mod validation;

use tracing::debug;

pub use error::LoanError;
pub use settings::EngineSettings;
pub use types::{
    EarlyRepayment, LoanRequest, PaymentStyle, RepaymentEffect, RepresentativePayment,
    ScheduleEntry, ScheduleResult,
};

/// Computes the amortization schedule with the default [`EngineSettings`].
///
/// This is the main entry point of the library: the request is validated,
/// its early repayments are put in month order, the schedule is built and the
/// summary figures are derived from it.
///
/// # Errors
///
/// Returns `LoanError::InvalidInput` if the principal or term is not positive,
/// the rate is negative, or an early repayment is malformed.
pub fn compute(request: &LoanRequest) -> Result<ScheduleResult, LoanError> {
    compute_with(request, &EngineSettings::default())
}

/// Same as [`compute`], with explicit engine settings.
pub fn compute_with(
    request: &LoanRequest,
    settings: &EngineSettings,
) -> Result<ScheduleResult, LoanError> {
    validation::validate(request, settings)?;

    let mut early_repayments = request.early_repayments.clone();
    types::sort_by_month(&mut early_repayments);

    let schedule = schedule::build_schedule(request, &early_repayments, settings);
    let result = summary::summarize(
        request.principal,
        request.payment_style,
        schedule,
        settings,
    );
    debug!(
        rows = result.rows.len(),
        total_paid = %result.total_paid,
        "loan schedule computed"
    );
    Ok(result)
}
