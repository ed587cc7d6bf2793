use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::formulas::{
    annuity_payment, apply_early_repayments, differentiated_principal, monthly_rate, PeriodState,
};
use crate::settings::EngineSettings;
use crate::types::{EarlyRepayment, LoanRequest, PaymentStyle, ScheduleEntry};

/// Rows of a schedule together with the installment it started from.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    /// Installment computed for the full term, before any recast.
    pub initial_installment: Decimal,
    pub rows: Vec<ScheduleEntry>,
}

/// Runs the amortization loop for a validated request.
///
/// `early_repayments` must be sorted by month (stable). One row is emitted
/// per period until the balance drops to `settings.payoff_threshold` or the
/// term runs out. A period whose early repayments clear the whole balance
/// emits no row.
pub fn build_schedule(
    request: &LoanRequest,
    early_repayments: &[EarlyRepayment],
    settings: &EngineSettings,
) -> Schedule {
    let rate = monthly_rate(request.annual_rate_percent);
    let term = request.term_months;
    let initial_installment = annuity_payment(request.principal, rate, term);
    let principal_slice = differentiated_principal(request.principal, term);

    debug!(
        principal = %request.principal,
        term_months = term,
        monthly_rate = %rate,
        style = ?request.payment_style,
        installment = %initial_installment,
        early_repayments = early_repayments.len(),
        "building amortization schedule"
    );

    let mut state = PeriodState {
        balance: request.principal,
        installment: initial_installment,
    };
    let mut pending = early_repayments;
    let mut rows = Vec::new();

    let mut period = 1;
    while state.balance > settings.payoff_threshold && period <= term {
        // Repayments for months already passed can no longer apply.
        let skip = pending.iter().take_while(|r| r.month < period).count();
        pending = &pending[skip..];
        let due = pending.iter().take_while(|r| r.month == period).count();
        let (events, rest) = pending.split_at(due);
        pending = rest;

        if !events.is_empty() {
            state = apply_early_repayments(
                state,
                events,
                term - period + 1,
                rate,
                request.payment_style,
            );
        }
        if state.balance <= Decimal::ZERO {
            debug!(period, "balance cleared by early repayment");
            break;
        }

        let interest = state.balance * rate;
        let mut principal = match request.payment_style {
            PaymentStyle::Annuity => state.installment - interest,
            PaymentStyle::Differentiated => principal_slice,
        };
        if principal > state.balance {
            principal = state.balance;
        }
        let payment = principal + interest;
        state.balance -= principal;

        let entry = ScheduleEntry {
            period_number: period,
            payment_date: payment_date(request.origination_date, period),
            total_payment: payment.round_dp(2),
            principal_component: principal.round_dp(2),
            interest_component: interest.round_dp(2),
            remaining_balance_after: state.balance.abs().round_dp(2),
        };
        trace!(
            period,
            payment = %entry.total_payment,
            balance = %entry.remaining_balance_after,
            "schedule row"
        );
        rows.push(entry);
        period += 1;
    }

    debug!(rows = rows.len(), "amortization schedule complete");
    Schedule {
        initial_installment,
        rows,
    }
}

/// Origination date shifted by `period` calendar months, clamped to the end
/// of shorter months (Jan 31 + 1 month = Feb 28/29).
pub fn payment_date(origination: NaiveDate, period: u32) -> NaiveDate {
    origination
        .checked_add_months(Months::new(period))
        .unwrap_or(NaiveDate::MAX)
}
