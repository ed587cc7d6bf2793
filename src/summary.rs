use rust_decimal::Decimal;

use crate::schedule::Schedule;
use crate::settings::EngineSettings;
use crate::types::{PaymentStyle, RepresentativePayment, ScheduleResult};

/// Derives the headline figures of a finished schedule.
///
/// `total_paid` adds up the already rounded row payments, so it can differ by
/// a few cents from a sum of unrounded payments. Early repayments are not part
/// of it, which means the overpayment goes negative when large extra payments
/// shortened the loan.
///
/// An empty schedule (the balance was cleared before the first regular
/// payment) reports a zero payment, zero overpayment and zero required income,
/// with `total_paid` equal to the principal.
pub fn summarize(
    principal: Decimal,
    payment_style: PaymentStyle,
    schedule: Schedule,
    settings: &EngineSettings,
) -> ScheduleResult {
    let (first, last) = match (schedule.rows.first(), schedule.rows.last()) {
        (Some(first), Some(last)) => (first.total_payment, last.total_payment),
        _ => {
            return ScheduleResult {
                principal,
                payment_style,
                rows: Vec::new(),
                monthly_payment: RepresentativePayment::Level(Decimal::ZERO),
                total_paid: principal,
                total_overpayment: Decimal::ZERO,
                required_income: Decimal::ZERO,
            };
        }
    };

    let total_paid: Decimal = schedule.rows.iter().map(|row| row.total_payment).sum();
    let monthly_payment = match payment_style {
        PaymentStyle::Annuity => RepresentativePayment::Level(first),
        PaymentStyle::Differentiated => RepresentativePayment::Declining { first, last },
    };

    ScheduleResult {
        principal,
        payment_style,
        rows: schedule.rows,
        monthly_payment,
        total_paid: total_paid.round_dp(2),
        total_overpayment: (total_paid - principal).round_dp(2),
        required_income: (schedule.initial_installment + settings.subsistence_floor).round_dp(2),
    }
}
