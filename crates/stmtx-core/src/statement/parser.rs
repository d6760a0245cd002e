//! Layout-driven statement field parser.

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::bank::Issuer;
use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::statement::StatementPeriod;

use super::rules::{
    detect_network, extract_customer_name, extract_last4, extract_statement_dates,
    find_labelled_amount, largest_amount, FieldExtractor, TransactionRowExtractor,
};
use super::{RawStatement, Result, StatementExtractor};

/// Rule-based statement parser.
pub struct StatementParser {
    /// Earliest and latest plausible year for summary dates.
    year_range: (i32, i32),
    /// Bytes searched before and after a label for its value.
    label_window: (usize, usize),
}

impl StatementParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            year_range: (config.min_year, config.max_year),
            label_window: (config.label_window_before, config.label_window_after),
        }
    }

    /// Set the plausible year range for summary dates.
    pub fn with_year_range(mut self, min_year: i32, max_year: i32) -> Self {
        self.year_range = (min_year, max_year);
        self
    }

    /// Set the label search window.
    pub fn with_label_window(mut self, before: usize, after: usize) -> Self {
        self.label_window = (before, after);
        self
    }

    fn extract_amounts(&self, text: &str, issuer: Issuer, raw: &mut RawStatement) {
        let layout = issuer.layout();
        let window = self.label_window;

        raw.total_due = match find_labelled_amount(text, &layout.total_due_labels(), window) {
            Some(found) => Some(found.value),
            None => {
                let largest = largest_amount(text);
                if largest.is_some() {
                    raw.warnings
                        .push("total due not labelled; using the largest amount".to_string());
                }
                largest.map(|m| m.value)
            }
        };
        raw.minimum_due =
            find_labelled_amount(text, &layout.minimum_due_labels(), window).map(|m| m.value);
        raw.credit_limit =
            find_labelled_amount(text, &layout.credit_limit_labels(), window).map(|m| m.value);
        raw.available_credit =
            find_labelled_amount(text, &layout.available_credit_labels(), window).map(|m| m.value);
    }

    fn extract_dates(&self, text: &str, issuer: Issuer, raw: &mut RawStatement) {
        let dates = extract_statement_dates(text, self.label_window, self.year_range);

        raw.statement_date = dates.statement_date.map(|m| m.value);
        raw.payment_due_date = dates.due_date.map(|m| m.value);
        if dates.due_date_guessed {
            raw.warnings
                .push("payment due date not labelled; using the first date".to_string());
        }

        raw.period = dates
            .period
            .map(|(start, end)| StatementPeriod { start, end });

        if raw.period.is_none() {
            if let Some(end) = raw.statement_date {
                let start = end - Duration::days(issuer.cycle_days() - 1);
                warn!(
                    "Statement period missing, derived from statement date and {}-day cycle",
                    issuer.cycle_days()
                );
                raw.warnings.push(format!(
                    "statement period derived from statement date and {}-day cycle",
                    issuer.cycle_days()
                ));
                raw.period = Some(StatementPeriod { start, end });
            }
        }
    }
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementExtractor for StatementParser {
    fn extract(&self, text: &str, issuer: Issuer) -> Result<RawStatement> {
        if text.trim().is_empty() {
            return Err(ExtractionError::NoData);
        }

        info!("Parsing {} statement from {} characters of text", issuer, text.len());

        let mut raw = RawStatement::new(issuer);

        raw.card_last4 = extract_last4(text).map(|m| m.value);
        raw.card_network = detect_network(text);
        raw.customer_name = extract_customer_name(text).map(|m| m.value);

        self.extract_amounts(text, issuer, &mut raw);
        self.extract_dates(text, issuer, &mut raw);

        raw.transactions = TransactionRowExtractor::new(issuer.layout()).extract_all(text);

        debug!(
            "Extracted card {:?}, total due {:?}, due date {:?}, {} rows",
            raw.card_last4,
            raw.total_due,
            raw.payment_due_date,
            raw.transactions.len()
        );

        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const HDFC_STATEMENT: &str = "\
HDFC Bank Credit Card Statement
Name: RAHUL SHARMA
Card No: 4375 XXXX XXXX 1234
Statement Date: 12/03/2024
Billing Period: 13/02/2024 to 12/03/2024
Payment Due Date  Total Dues  Minimum Amount Due  Credit Limit  Available Credit Limit
01/04/2024  12,345.00  620.00  2,00,000.00  1,87,655.00
Domestic Transactions
Date  Transaction Description  Reward Points  Amount (in Rs.)
15/02/2024  SWIGGY BANGALORE  12  450.00
18/02/2024  PAYMENT RECEIVED NETBANKING  5,000.00 Cr
Reward Points Summary";

    #[test]
    fn test_parse_hdfc_statement() {
        let raw = StatementParser::new().extract(HDFC_STATEMENT, Issuer::Hdfc).unwrap();

        assert_eq!(raw.customer_name.as_deref(), Some("RAHUL SHARMA"));
        assert_eq!(raw.card_last4.as_deref(), Some("1234"));
        assert_eq!(raw.card_network, Some(crate::models::statement::CardNetwork::Visa));
        assert_eq!(raw.statement_date, Some(date(2024, 3, 12)));
        assert_eq!(
            raw.period,
            Some(StatementPeriod {
                start: date(2024, 2, 13),
                end: date(2024, 3, 12)
            })
        );
        assert_eq!(raw.payment_due_date, Some(date(2024, 4, 1)));
        assert_eq!(raw.total_due, Some(dec("12345.00")));
        assert_eq!(raw.minimum_due, Some(dec("620.00")));
        assert_eq!(raw.credit_limit, Some(dec("200000.00")));
        assert_eq!(raw.available_credit, Some(dec("187655.00")));
        assert_eq!(raw.transactions.len(), 2);
        assert!(raw.warnings.is_empty());
    }

    #[test]
    fn test_period_derived_from_statement_date() {
        let text = "Axis Bank\nStatement Date: 15/03/2024\nTotal Payment Due: 2,000.00";
        let raw = StatementParser::new().extract(text, Issuer::Axis).unwrap();
        let period = raw.period.unwrap();
        assert_eq!(period.end, date(2024, 3, 15));
        assert_eq!(period.start, date(2024, 1, 31));
        assert!(raw.warnings.iter().any(|w| w.contains("45-day cycle")));
    }

    #[test]
    fn test_total_due_falls_back_to_largest_amount() {
        let text = "Kotak statement\nsomething 150.00\nother 9,999.00";
        let raw = StatementParser::new().extract(text, Issuer::Kotak).unwrap();
        assert_eq!(raw.total_due, Some(dec("9999.00")));
        assert!(raw.warnings.iter().any(|w| w.contains("largest amount")));
    }

    #[test]
    fn test_empty_text_is_no_data() {
        let result = StatementParser::new().extract("  \n ", Issuer::Sbi);
        assert!(matches!(result, Err(ExtractionError::NoData)));
    }

    #[test]
    fn test_year_range_filters_dates() {
        let text = "SBI Card\nPayment Due Date: 05/04/2019";
        let raw = StatementParser::new()
            .with_year_range(2020, 2100)
            .extract(text, Issuer::Sbi)
            .unwrap();
        assert_eq!(raw.payment_due_date, None);

        let raw = StatementParser::new()
            .with_year_range(2015, 2100)
            .extract(text, Issuer::Sbi)
            .unwrap();
        assert_eq!(raw.payment_due_date, Some(date(2019, 4, 5)));
    }
}
