//! Payment formulas and the per-period early-repayment decision.
//!
//! These are the pure building blocks of the schedule loop; each one can be
//! checked in isolation from the iteration.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use tracing::debug;

use crate::types::{EarlyRepayment, PaymentStyle, RepaymentEffect};

/// Converts a nominal annual percentage (e.g., 12 for 12%) to a monthly
/// decimal rate (0.01).
pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / dec!(100) / dec!(12)
}

/// Level installment that fully amortizes `balance` over `periods` months.
///
/// The annuity formula is: PMT = P * [i(1 + i)^n] / [(1 + i)^n – 1],
/// evaluated as `P * i / (1 - (1 + i)^-n)` so no intermediate grows past
/// `P * (1 + i)`.
///
/// With a zero rate the balance is split evenly. A zero period count is
/// treated as one. When `(1 + i)^n` leaves the decimal range the formula's
/// limit, interest only (`P * i`), is returned.
pub fn annuity_payment(balance: Decimal, monthly_rate: Decimal, periods: u32) -> Decimal {
    let periods = periods.max(1);
    if monthly_rate <= Decimal::ZERO {
        return balance / Decimal::from(periods);
    }

    let interest = balance * monthly_rate;
    match (dec!(1) + monthly_rate).checked_powu(periods.into()) {
        Some(growth) => {
            let denominator = dec!(1) - dec!(1) / growth;
            if denominator.is_zero() {
                return balance / Decimal::from(periods);
            }
            interest.checked_div(denominator).unwrap_or(interest)
        }
        None => interest,
    }
}

/// Fixed principal slice of a differentiated loan.
pub fn differentiated_principal(principal: Decimal, term_months: u32) -> Decimal {
    principal / Decimal::from(term_months.max(1))
}

/// Balance and installment carried from one period to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodState {
    pub balance: Decimal,
    pub installment: Decimal,
}

/// Applies the early repayments that land on the current period.
///
/// `events` must already be restricted to this period and kept in input
/// order. `periods_left` counts the current period too. Each event reduces
/// the balance; on an annuity loan a `ReducePayment` event then recasts the
/// installment over `periods_left`, while `ReduceTerm` keeps it so the
/// balance simply runs out sooner. Differentiated loans only see the balance
/// reduction.
pub fn apply_early_repayments(
    state: PeriodState,
    events: &[EarlyRepayment],
    periods_left: u32,
    monthly_rate: Decimal,
    style: PaymentStyle,
) -> PeriodState {
    let mut next = state;
    for event in events {
        next.balance = next
            .balance
            .checked_sub(event.amount)
            .unwrap_or(Decimal::MIN);
        if style == PaymentStyle::Annuity && event.effect == RepaymentEffect::ReducePayment {
            next.installment = recast_installment(next.balance, monthly_rate, periods_left);
            debug!(
                month = event.month,
                amount = %event.amount,
                balance = %next.balance,
                installment = %next.installment,
                "installment recast after early repayment"
            );
        }
    }
    next
}

fn recast_installment(balance: Decimal, monthly_rate: Decimal, periods_left: u32) -> Decimal {
    if balance > Decimal::ZERO && monthly_rate > Decimal::ZERO {
        annuity_payment(balance, monthly_rate, periods_left)
    } else {
        (balance / Decimal::from(periods_left.max(1))).max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(amount: Decimal, effect: RepaymentEffect) -> EarlyRepayment {
        EarlyRepayment {
            month: 6,
            amount,
            effect,
        }
    }

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
        assert_eq!(monthly_rate(dec!(10.5)), dec!(0.00875));
        assert_eq!(monthly_rate(dec!(0)), dec!(0));
    }

    #[test]
    fn test_annuity_payment_standard_formula() {
        // 1.2M over 12 months at 1% a month
        let payment = annuity_payment(dec!(1_200_000), dec!(0.01), 12);
        assert_eq!(payment.round_dp(2), dec!(106618.55));

        let payment = annuity_payment(dec!(12000), dec!(0.01), 12);
        assert_eq!(payment.round_dp(2), dec!(1066.19));
    }

    #[test]
    fn test_annuity_payment_zero_rate_is_straight_line() {
        assert_eq!(annuity_payment(dec!(1200), dec!(0), 12), dec!(100));
    }

    #[test]
    fn test_annuity_payment_zero_periods_treated_as_one() {
        assert_eq!(annuity_payment(dec!(500), dec!(0), 0), dec!(500));
        assert_eq!(annuity_payment(dec!(500), dec!(0.01), 0).round_dp(2), dec!(505.00));
    }

    #[test]
    fn test_annuity_payment_overflow_falls_back_to_interest_only() {
        // (1.5)^1200 is far outside the decimal range
        let payment = annuity_payment(dec!(1000), dec!(0.5), 1200);
        assert_eq!(payment, dec!(500));
    }

    #[test]
    fn test_annuity_payment_steep_rate_stays_in_range() {
        // (1.1)^480 fits a Decimal but P * i * (1.1)^480 does not.
        let payment = annuity_payment(dec!(100_000_000_000), dec!(0.1), 480);
        assert!(payment >= dec!(10_000_000_000));
        assert_eq!(payment.round_dp(2), dec!(10_000_000_000.00));
    }

    #[test]
    fn test_differentiated_principal() {
        assert_eq!(differentiated_principal(dec!(12000), 12), dec!(1000));
    }

    #[test]
    fn test_reduce_term_keeps_installment() {
        let state = PeriodState {
            balance: dec!(7173.50),
            installment: dec!(1066.19),
        };
        let next = apply_early_repayments(
            state,
            &[event(dec!(5000), RepaymentEffect::ReduceTerm)],
            7,
            dec!(0.01),
            PaymentStyle::Annuity,
        );
        assert_eq!(next.balance, dec!(2173.50));
        assert_eq!(next.installment, dec!(1066.19));
    }

    #[test]
    fn test_reduce_payment_recasts_over_remaining_periods() {
        let state = PeriodState {
            balance: dec!(7173.50),
            installment: dec!(1066.19),
        };
        let next = apply_early_repayments(
            state,
            &[event(dec!(5000), RepaymentEffect::ReducePayment)],
            7,
            dec!(0.01),
            PaymentStyle::Annuity,
        );
        assert_eq!(next.balance, dec!(2173.50));
        assert_eq!(
            next.installment,
            annuity_payment(dec!(2173.50), dec!(0.01), 7)
        );
        assert!(next.installment < dec!(1066.19));
    }

    #[test]
    fn test_reduce_payment_ignored_for_differentiated() {
        let state = PeriodState {
            balance: dec!(9000),
            installment: dec!(1066.19),
        };
        let next = apply_early_repayments(
            state,
            &[event(dec!(3000), RepaymentEffect::ReducePayment)],
            9,
            dec!(0.01),
            PaymentStyle::Differentiated,
        );
        assert_eq!(next.balance, dec!(6000));
        assert_eq!(next.installment, dec!(1066.19));
    }

    #[test]
    fn test_events_apply_in_order() {
        // The recast happens after the first event only; the second one
        // lowers the balance without touching the installment.
        let state = PeriodState {
            balance: dec!(1000),
            installment: dec!(350),
        };
        let next = apply_early_repayments(
            state,
            &[
                event(dec!(400), RepaymentEffect::ReducePayment),
                event(dec!(100), RepaymentEffect::ReduceTerm),
            ],
            3,
            dec!(0),
            PaymentStyle::Annuity,
        );
        assert_eq!(next.balance, dec!(500));
        assert_eq!(next.installment, dec!(200));
    }

    #[test]
    fn test_overpaying_clamps_installment_to_zero() {
        let state = PeriodState {
            balance: dec!(300),
            installment: dec!(100),
        };
        let next = apply_early_repayments(
            state,
            &[event(dec!(500), RepaymentEffect::ReducePayment)],
            4,
            dec!(0.01),
            PaymentStyle::Annuity,
        );
        assert_eq!(next.balance, dec!(-200));
        assert_eq!(next.installment, dec!(0));
    }
}
