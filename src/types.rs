use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the regular installment is structured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStyle {
    /// Level installment over the whole term.
    #[default]
    Annuity,
    /// Fixed principal slice plus interest on the outstanding balance.
    Differentiated,
}

/// What an early repayment does to the rest of an annuity schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentEffect {
    /// Keep the installment, finish sooner.
    #[default]
    ReduceTerm,
    /// Keep the term, lower the installment.
    ReducePayment,
}

/// An extra, unscheduled payment applied before the regular split of `month`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyRepayment {
    /// 1-based period the payment lands on.
    pub month: u32,
    /// Amount taken straight off the outstanding balance.
    pub amount: Decimal,
    /// Ignored for differentiated loans.
    pub effect: RepaymentEffect,
}

/// Input parameters for a schedule computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    /// The amount borrowed.
    pub principal: Decimal,
    /// Number of scheduled monthly periods.
    pub term_months: u32,
    /// The nominal annual interest rate as a percentage (e.g., 12 for 12%).
    pub annual_rate_percent: Decimal,
    pub payment_style: PaymentStyle,
    /// Early repayments, ordered by month.
    pub early_repayments: Vec<EarlyRepayment>,
    /// Payment dates are counted in months from this date.
    pub origination_date: NaiveDate,
}

impl LoanRequest {
    /// Creates a request without early repayments, originated today.
    pub fn new(
        principal: Decimal,
        term_months: u32,
        annual_rate_percent: Decimal,
        payment_style: PaymentStyle,
    ) -> Self {
        Self {
            principal,
            term_months,
            annual_rate_percent,
            payment_style,
            early_repayments: Vec::new(),
            origination_date: Local::now().date_naive(),
        }
    }

    /// Replaces the early repayments, sorting them by month. Repayments that
    /// share a month keep their relative order.
    pub fn with_early_repayments(mut self, mut repayments: Vec<EarlyRepayment>) -> Self {
        sort_by_month(&mut repayments);
        self.early_repayments = repayments;
        self
    }

    pub fn originated_on(mut self, date: NaiveDate) -> Self {
        self.origination_date = date;
        self
    }
}

/// Stable sort; ties keep their input order.
pub(crate) fn sort_by_month(repayments: &mut [EarlyRepayment]) {
    repayments.sort_by_key(|r| r.month);
}

/// One row of the amortization schedule. Monetary fields are rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub period_number: u32,
    pub payment_date: NaiveDate,
    pub total_payment: Decimal,
    pub principal_component: Decimal,
    pub interest_component: Decimal,
    pub remaining_balance_after: Decimal,
}

/// The headline monthly payment of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentativePayment {
    /// Annuity: the first row's payment.
    Level(Decimal),
    /// Differentiated: the first and last payments of a shrinking series.
    Declining { first: Decimal, last: Decimal },
}

/// Complete output of a schedule computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// The principal the schedule was computed for.
    pub principal: Decimal,
    pub payment_style: PaymentStyle,
    pub rows: Vec<ScheduleEntry>,
    pub monthly_payment: RepresentativePayment,
    /// Sum of the rounded row payments. Early repayments are not included.
    pub total_paid: Decimal,
    pub total_overpayment: Decimal,
    /// Initial installment plus the subsistence floor.
    pub required_income: Decimal,
}

impl ScheduleResult {
    /// Number of the last scheduled period, if any row was emitted.
    pub fn last_period(&self) -> Option<u32> {
        self.rows.last().map(|row| row.period_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn repayment(month: u32, amount: Decimal) -> EarlyRepayment {
        EarlyRepayment {
            month,
            amount,
            effect: RepaymentEffect::ReduceTerm,
        }
    }

    #[test]
    fn test_early_repayments_sorted_stably() {
        let request = LoanRequest::new(dec!(1000), 12, dec!(10), PaymentStyle::Annuity)
            .with_early_repayments(vec![
                repayment(5, dec!(1)),
                repayment(2, dec!(2)),
                repayment(5, dec!(3)),
                repayment(2, dec!(4)),
            ]);

        let order: Vec<(u32, Decimal)> = request
            .early_repayments
            .iter()
            .map(|r| (r.month, r.amount))
            .collect();
        assert_eq!(
            order,
            vec![(2, dec!(2)), (2, dec!(4)), (5, dec!(1)), (5, dec!(3))]
        );
    }

    #[test]
    fn test_style_serde_names() {
        assert_eq!(
            serde_json::to_string(&PaymentStyle::Differentiated).unwrap(),
            "\"differentiated\""
        );
        assert_eq!(
            serde_json::from_str::<RepaymentEffect>("\"reduce_payment\"").unwrap(),
            RepaymentEffect::ReducePayment
        );
    }
}
