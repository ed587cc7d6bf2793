//! Request and response shapes exchanged with the calculator's web front end.
//!
//! The browser client posts every field as a JSON string (`"month": "6"`),
//! so numeric fields accept either JSON numbers or numeric strings. The HTTP transport
//! is left to the host; this module only turns a body into a [`LoanRequest`]
//! and a [`ScheduleResult`] back into the response body.

use std::str::FromStr;

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LoanError;
use crate::types::{
    EarlyRepayment, LoanRequest, PaymentStyle, RepaymentEffect, RepresentativePayment,
    ScheduleResult,
};
use crate::{compute_with, EngineSettings};

/// Payment dates are rendered day first.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Body of a calculation request as posted by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub loan_amount: Option<Value>,
    pub term_years: Option<Value>,
    /// Annual rate in percent.
    pub interest_rate: Option<Value>,
    /// `"annuity"` (the default); any other value means differentiated.
    pub payment_type: Option<String>,
    #[serde(default)]
    pub early_repayments: Vec<EarlyRepaymentPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EarlyRepaymentPayload {
    pub month: Option<Value>,
    pub amount: Option<Value>,
    /// `"reduce_payment"` or `"reduce_term"`. Required for annuity loans;
    /// differentiated loans ignore it.
    pub repayment_type: Option<String>,
}

impl CalculationRequest {
    /// Converts the payload into an engine request, turning the term in years
    /// into months. Range checks are left to the validator.
    ///
    /// # Errors
    ///
    /// Returns `LoanError::InvalidInput` for a missing or non-numeric field, an
    /// unknown `repayment_type`, or a missing one on an annuity loan.
    pub fn into_loan_request(self, origination_date: NaiveDate) -> Result<LoanRequest, LoanError> {
        let principal = decimal_field(self.loan_amount.as_ref(), "loan_amount")?;
        let term_years = whole_number_field(self.term_years.as_ref(), "term_years")?;
        let term_months = term_years
            .checked_mul(12)
            .ok_or_else(|| LoanError::invalid("term_years", "Term is too long."))?;
        let annual_rate_percent = decimal_field(self.interest_rate.as_ref(), "interest_rate")?;
        let payment_style = match self.payment_type.as_deref() {
            None | Some("annuity") => PaymentStyle::Annuity,
            Some(_) => PaymentStyle::Differentiated,
        };

        let early_repayments = self
            .early_repayments
            .into_iter()
            .enumerate()
            .map(|(index, raw)| raw.into_early_repayment(index, payment_style))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(
            LoanRequest::new(principal, term_months, annual_rate_percent, payment_style)
                .originated_on(origination_date)
                .with_early_repayments(early_repayments),
        )
    }
}

impl EarlyRepaymentPayload {
    fn into_early_repayment(
        self,
        index: usize,
        payment_style: PaymentStyle,
    ) -> Result<EarlyRepayment, LoanError> {
        let month = whole_number_field(
            self.month.as_ref(),
            &format!("early_repayments[{index}].month"),
        )?;
        let amount = decimal_field(
            self.amount.as_ref(),
            &format!("early_repayments[{index}].amount"),
        )?;
        let effect = match self.repayment_type.as_deref() {
            None if payment_style == PaymentStyle::Annuity => {
                return Err(LoanError::invalid(
                    format!("early_repayments[{index}].repayment_type"),
                    "Field is required.",
                ));
            }
            None | Some("reduce_term") => RepaymentEffect::ReduceTerm,
            Some("reduce_payment") => RepaymentEffect::ReducePayment,
            Some(other) => {
                return Err(LoanError::invalid(
                    format!("early_repayments[{index}].repayment_type"),
                    format!("Unknown repayment type '{other}'."),
                ));
            }
        };
        Ok(EarlyRepayment {
            month,
            amount,
            effect,
        })
    }
}

fn decimal_field(value: Option<&Value>, field: &str) -> Result<Decimal, LoanError> {
    let text = match value {
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::String(text)) => text.trim().to_string(),
        None | Some(Value::Null) => return Err(LoanError::invalid(field, "Field is required.")),
        Some(_) => return Err(LoanError::invalid(field, "Expected a number.")),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| LoanError::invalid(field, format!("'{text}' is not a number.")))
}

fn whole_number_field(value: Option<&Value>, field: &str) -> Result<u32, LoanError> {
    let parsed = match value {
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= f64::from(u32::MAX))
                    .map(|n| n as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(text)) => text.trim().parse::<u32>().ok(),
        None | Some(Value::Null) => return Err(LoanError::invalid(field, "Field is required.")),
        Some(_) => None,
    };
    parsed.ok_or_else(|| LoanError::invalid(field, "Expected a non-negative whole number."))
}

/// The headline payment: a number for annuity loans, `"first ... last"` for
/// differentiated ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MonthlyPaymentField {
    Amount(Decimal),
    Range(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub payment_number: u32,
    /// `DD.MM.YYYY`
    pub payment_date: String,
    pub monthly_payment: Decimal,
    pub principal_payment: Decimal,
    pub interest_payment: Decimal,
    pub remaining_balance: Decimal,
}

/// Body of a successful calculation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResponse {
    pub monthly_payment: MonthlyPaymentField,
    pub total_overpayment: Decimal,
    pub total_payment: Decimal,
    pub required_income: Decimal,
    pub payment_schedule: Vec<PaymentRow>,
    pub loan_amount: Decimal,
}

impl CalculationResponse {
    pub fn from_result(result: &ScheduleResult) -> Self {
        let monthly_payment = match result.monthly_payment {
            RepresentativePayment::Level(amount) => MonthlyPaymentField::Amount(amount),
            RepresentativePayment::Declining { first, last } => {
                MonthlyPaymentField::Range(format!("{first:.2} ... {last:.2}"))
            }
        };
        let payment_schedule = result
            .rows
            .iter()
            .map(|row| PaymentRow {
                payment_number: row.period_number,
                payment_date: row.payment_date.format(DATE_FORMAT).to_string(),
                monthly_payment: row.total_payment,
                principal_payment: row.principal_component,
                interest_payment: row.interest_component,
                remaining_balance: row.remaining_balance_after,
            })
            .collect();

        Self {
            monthly_payment,
            total_overpayment: result.total_overpayment,
            total_payment: result.total_paid,
            required_income: result.required_income,
            payment_schedule,
            loan_amount: result.principal,
        }
    }
}

/// Body of a rejected request. Hosts answer with a 4xx status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&LoanError> for ErrorResponse {
    fn from(error: &LoanError) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

/// Parses a request body, computes the schedule and renders the response
/// body. Payment dates are counted from `today`.
///
/// A rejected request surfaces as an error whose root cause is a
/// [`LoanError`]; use `downcast_ref` to build an [`ErrorResponse`].
pub fn calculate_json(
    body: &str,
    today: NaiveDate,
    settings: &EngineSettings,
) -> anyhow::Result<String> {
    let payload: CalculationRequest = serde_json::from_str(body)
        .map_err(LoanError::from)
        .context("failed to parse calculation request")?;
    let request = payload
        .into_loan_request(today)
        .context("malformed calculation request")?;
    let result = compute_with(&request, settings).context("loan request rejected")?;
    let response = CalculationResponse::from_result(&result);
    Ok(serde_json::to_string(&response)?)
}
