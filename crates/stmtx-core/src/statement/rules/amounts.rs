//! Amount extraction for Indian rupee statements.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::labels::{column_cell, find_labels, line_bounds};
use super::patterns::AMOUNT;
use super::{ExtractionMatch, FieldExtractor};
use crate::bank::layouts::LabelSet;

/// Amount field extractor.
///
/// A candidate must carry a currency marker or two decimal places, and must
/// not be glued to a date, a percentage or a longer number.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in AMOUNT.captures_iter(text) {
            let Some(full) = caps.get(0) else { continue };
            let num = &caps["num"];

            if caps.name("cur").is_none() && !num.contains('.') {
                continue;
            }
            if !is_isolated(text, full.start(), full.end()) {
                continue;
            }

            let Ok(mut amount) = Decimal::from_str(&num.replace(',', "")) else {
                continue;
            };
            let credit_marker = caps
                .name("marker")
                .is_some_and(|m| m.as_str().eq_ignore_ascii_case("cr"));
            if caps.name("sign").is_some_and(|s| s.as_str() == "-") || credit_marker {
                amount = -amount;
            }

            results.push(
                ExtractionMatch::new(amount, 0.8, full.as_str())
                    .with_position(full.start(), full.end()),
            );
        }

        results
    }
}

fn is_isolated(text: &str, start: usize, end: usize) -> bool {
    let mut before = text[..start].chars().rev();
    match (before.next(), before.next()) {
        (Some(c), _) if c.is_ascii_alphanumeric() || c == '/' || c == '.' => return false,
        (Some('-'), Some(d)) if d.is_ascii_digit() => return false,
        _ => {}
    }

    let mut after = text[end..].chars();
    match (after.next(), after.next()) {
        (Some(c), _) if c.is_ascii_alphanumeric() || c == '%' => false,
        (Some('.' | '/' | '-' | ','), Some(d)) if d.is_ascii_digit() => false,
        _ => true,
    }
}

/// Find the amount that belongs to a summary label.
///
/// Each label occurrence is resolved in order: the aligned cell of a label
/// row, the first amount after the label on its line, the first amount
/// within `window.1` bytes after it, the nearest amount within `window.0`
/// bytes before it. Occurrences are tried in label order.
pub fn find_labelled_amount(
    text: &str,
    labels: &LabelSet,
    window: (usize, usize),
) -> Option<ExtractionMatch<Decimal>> {
    let (before, after) = window;
    let candidates = AmountExtractor::new().extract_all(text);
    if candidates.is_empty() {
        return None;
    }

    for hit in find_labels(text, &labels.labels, labels.excluded_prefixes) {
        let (line_start, line_end) = line_bounds(text, hit.start);
        let on_line = candidates
            .iter()
            .any(|c| c.start() >= line_start && c.end() <= line_end);

        if !on_line {
            if let Some((s, e)) = column_cell(text, &hit) {
                if let Some(found) = candidates.iter().find(|c| c.start() >= s && c.end() <= e) {
                    return Some(found.clone().with_confidence(0.95));
                }
            }
        }

        if let Some(found) = candidates
            .iter()
            .find(|c| c.start() >= hit.end && c.end() <= line_end)
        {
            return Some(found.clone().with_confidence(0.95));
        }

        if let Some(found) = candidates
            .iter()
            .find(|c| c.start() >= hit.end && c.start() <= hit.end + after)
        {
            return Some(found.clone().with_confidence(0.8));
        }

        if let Some(found) = candidates
            .iter()
            .rev()
            .find(|c| c.end() <= hit.start && c.end() + before >= hit.start)
        {
            return Some(found.clone().with_confidence(0.7));
        }
    }

    None
}

/// The largest amount anywhere in the text.
pub fn largest_amount(text: &str) -> Option<ExtractionMatch<Decimal>> {
    AmountExtractor::new()
        .extract_all(text)
        .into_iter()
        .max_by(|a, b| a.value.cmp(&b.value))
        .map(|m| m.with_confidence(0.5))
}

/// Parse an Indian-formatted amount (e.g. "₹1,23,456.78", "Rs. 500", "-250.00").
///
/// Parentheses and a trailing minus mark a negative amount.
pub fn parse_inr_amount(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    let negative = trimmed.starts_with('-')
        || trimmed.ends_with('-')
        || (trimmed.starts_with('(') && trimmed.ends_with(')'));

    let body = trimmed
        .trim_start_matches(['-', '+', '('])
        .trim_end_matches(['-', ')'])
        .trim();
    let body = body
        .strip_prefix('₹')
        .or_else(|| body.strip_prefix("Rs."))
        .or_else(|| body.strip_prefix("Rs"))
        .or_else(|| body.strip_prefix("INR"))
        .unwrap_or(body)
        .trim_start_matches(['-', '+']);

    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{00a0}'))
        .collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let amount = Decimal::from_str(&cleaned).ok()?;
    Some(if negative { -amount } else { amount })
}

/// Format an amount with the rupee sign and Indian digit grouping
/// (₹1,23,456.78).
pub fn format_inr(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let digits: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    let len = digits.len();

    for (i, c) in digits.iter().enumerate() {
        let remaining = len - i;
        if i > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}₹{}.{}", sign, formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::Issuer;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_inr_amount() {
        assert_eq!(parse_inr_amount("₹1,23,456.78"), Some(dec("123456.78")));
        assert_eq!(parse_inr_amount("Rs. 5,000"), Some(dec("5000")));
        assert_eq!(parse_inr_amount("INR 12,345.67"), Some(dec("12345.67")));
        assert_eq!(parse_inr_amount("-250.00"), Some(dec("-250.00")));
        assert_eq!(parse_inr_amount("(99.50)"), Some(dec("-99.50")));
        assert_eq!(parse_inr_amount("1,000.00-"), Some(dec("-1000.00")));
        assert_eq!(parse_inr_amount("abc"), None);
        assert_eq!(parse_inr_amount(""), None);
    }

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(dec("123456.78")), "₹1,23,456.78");
        assert_eq!(format_inr(dec("1234567")), "₹12,34,567.00");
        assert_eq!(format_inr(dec("999.5")), "₹999.50");
        assert_eq!(format_inr(dec("-1500")), "-₹1,500.00");
    }

    #[test]
    fn test_extractor_skips_dates_years_and_rates() {
        let text = "12/03/2024 interest 3.50% p.m. year 2024 due 12.03.2024 amount 1,234.00";
        let amounts = AmountExtractor::new().extract_all(text);
        assert_eq!(amounts.len(), 1);
        assert_eq!(amounts[0].value, dec("1234.00"));
    }

    #[test]
    fn test_extractor_accepts_currency_without_decimals() {
        let amounts = AmountExtractor::new().extract_all("Credit Limit Rs. 50,000 and 7 days");
        assert_eq!(amounts.len(), 1);
        assert_eq!(amounts[0].value, dec("50000"));
    }

    #[test]
    fn test_extractor_credit_marker_negates() {
        let amounts = AmountExtractor::new().extract_all("Total Dues 1,500.00 Cr");
        assert_eq!(amounts[0].value, dec("-1500.00"));
    }

    #[test]
    fn test_labelled_amount_inline() {
        let text = "Total Amount Due: ₹12,345.00  Minimum Amount Due: ₹1,234.00";
        let layout = Issuer::Icici.layout();
        let total = find_labelled_amount(text, &layout.total_due_labels(), (100, 250)).unwrap();
        let minimum = find_labelled_amount(text, &layout.minimum_due_labels(), (100, 250)).unwrap();
        assert_eq!(total.value, dec("12345.00"));
        assert_eq!(minimum.value, dec("1234.00"));
    }

    #[test]
    fn test_labelled_amount_total_never_takes_minimum() {
        let text = "Minimum Amount Due  1,234.00\nAmount Due  12,345.00";
        let layout = Issuer::Sbi.layout();
        let total = find_labelled_amount(text, &layout.total_due_labels(), (100, 250)).unwrap();
        assert_eq!(total.value, dec("12345.00"));
    }

    #[test]
    fn test_labelled_amount_column_layout() {
        let text = "Payment Due Date  Total Dues  Minimum Amount Due  Credit Limit\n05/04/2024  12,345.00  1,234.00  2,00,000.00";
        let layout = Issuer::Hdfc.layout();
        let window = (100, 250);
        assert_eq!(
            find_labelled_amount(text, &layout.total_due_labels(), window).unwrap().value,
            dec("12345.00")
        );
        assert_eq!(
            find_labelled_amount(text, &layout.minimum_due_labels(), window).unwrap().value,
            dec("1234.00")
        );
        assert_eq!(
            find_labelled_amount(text, &layout.credit_limit_labels(), window).unwrap().value,
            dec("200000.00")
        );
    }

    #[test]
    fn test_labelled_amount_credit_limit_skips_available() {
        let text = "Available Credit Limit: 80,000.00\nCredit Limit: 1,00,000.00";
        let layout = Issuer::Axis.layout();
        let limit = find_labelled_amount(text, &layout.credit_limit_labels(), (100, 250)).unwrap();
        let available =
            find_labelled_amount(text, &layout.available_credit_labels(), (100, 250)).unwrap();
        assert_eq!(limit.value, dec("100000.00"));
        assert_eq!(available.value, dec("80000.00"));
    }

    #[test]
    fn test_labelled_amount_window_before() {
        let text = "₹ 4,500.00\nTotal Amount Due";
        let layout = Issuer::Kotak.layout();
        let total = find_labelled_amount(text, &layout.total_due_labels(), (100, 250)).unwrap();
        assert_eq!(total.value, dec("4500.00"));
        assert_eq!(total.confidence, 0.7);
    }

    #[test]
    fn test_largest_amount() {
        let text = "a 100.00 b 2,500.00 c 99.99";
        assert_eq!(largest_amount(text).unwrap().value, dec("2500.00"));
        assert!(largest_amount("nothing here").is_none());
    }
}
