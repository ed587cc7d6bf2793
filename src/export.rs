//! CSV export of a computed schedule.

use std::io::Write;

use csv::{QuoteStyle, WriterBuilder};

use crate::error::LoanError;
use crate::payload::DATE_FORMAT;
use crate::types::ScheduleResult;

/// UTF-8 byte order mark; spreadsheet applications need it to pick the
/// right encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const HEADERS: [&str; 6] = [
    "Payment number",
    "Date",
    "Payment",
    "Principal",
    "Interest",
    "Remaining balance",
];

/// Writes the schedule rows as CSV, prefixed with a UTF-8 BOM.
///
/// Text fields (headers and dates) are quoted, amounts are written as plain
/// numbers. An empty schedule produces the header row only.
pub fn write_csv<W: Write>(result: &ScheduleResult, mut writer: W) -> Result<(), LoanError> {
    writer.write_all(UTF8_BOM)?;

    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(writer);
    wtr.write_record(HEADERS)?;
    for row in &result.rows {
        wtr.write_record([
            row.period_number.to_string(),
            row.payment_date.format(DATE_FORMAT).to_string(),
            format!("{:.2}", row.total_payment),
            format!("{:.2}", row.principal_component),
            format!("{:.2}", row.interest_component),
            format!("{:.2}", row.remaining_balance_after),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Renders the schedule as a CSV string (BOM included).
pub fn to_csv_string(result: &ScheduleResult) -> Result<String, LoanError> {
    let mut buffer = Vec::new();
    write_csv(result, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| LoanError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LoanRequest, PaymentStyle};
    use crate::compute;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_csv_layout() {
        let request = LoanRequest::new(dec!(300), 3, dec!(0), PaymentStyle::Annuity)
            .originated_on(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        let result = compute(&request).unwrap();

        let csv = to_csv_string(&result).unwrap();
        let expected = "\u{feff}\"Payment number\",\"Date\",\"Payment\",\"Principal\",\"Interest\",\"Remaining balance\"\n\
                        1,\"10.02.2025\",100.00,100.00,0.00,200.00\n\
                        2,\"10.03.2025\",100.00,100.00,0.00,100.00\n\
                        3,\"10.04.2025\",100.00,100.00,0.00,0.00\n";
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_empty_schedule_has_header_only() {
        let request = LoanRequest::new(dec!(0.005), 3, dec!(5), PaymentStyle::Annuity);
        let result = compute(&request).unwrap();
        assert!(result.rows.is_empty());

        let csv = to_csv_string(&result).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with('\u{feff}'));
    }
}
