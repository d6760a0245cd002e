//! Date extraction for credit card statements.
//!
//! All numeric dates are read day-first. Two-digit years map to 2000-2099.

use chrono::{Datelike, NaiveDate};

use super::labels::{column_cell, find_labels, line_bounds};
use super::patterns::{
    month_number, DATE_DAY_MONTH, DATE_DAY_MONTH_NAME, DATE_ISO, DATE_MONTH_NAME_DAY,
    DATE_NUMERIC,
};
use super::{ExtractionMatch, FieldExtractor};

const STATEMENT_DATE_LABELS: &[&str] = &[
    "statement date",
    "statement generation date",
    "statement dt",
    "bill date",
];

const DUE_DATE_LABELS: &[&str] = &["payment due date", "due date", "pay by", "payment date"];

const PERIOD_LABELS: &[&str] = &[
    "statement period",
    "billing period",
    "billing cycle",
    "statement cycle",
];

/// Bytes after a period label searched for its two dates.
const PERIOD_WINDOW: usize = 120;

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// All dates in text order. Overlapping matches keep the earliest.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in DATE_NUMERIC.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            push_date(&mut results, &caps, parse_year(&caps[3]), month, day, 0.9);
        }

        for caps in DATE_DAY_MONTH_NAME.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month = month_number(&caps[2]).unwrap_or(0);
            push_date(&mut results, &caps, parse_year(&caps[3]), month, day, 0.95);
        }

        for caps in DATE_MONTH_NAME_DAY.captures_iter(text) {
            let month = month_number(&caps[1]).unwrap_or(0);
            let day: u32 = caps[2].parse().unwrap_or(0);
            push_date(&mut results, &caps, parse_year(&caps[3]), month, day, 0.95);
        }

        for caps in DATE_ISO.captures_iter(text) {
            let year: i32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let day: u32 = caps[3].parse().unwrap_or(0);
            push_date(&mut results, &caps, year, month, day, 0.9);
        }

        results.sort_by_key(|m| m.start());

        let mut kept: Vec<Self::Output> = Vec::with_capacity(results.len());
        for m in results {
            if kept.last().is_some_and(|last| m.start() < last.end()) {
                continue;
            }
            kept.push(m);
        }
        kept
    }
}

fn push_date(
    results: &mut Vec<ExtractionMatch<NaiveDate>>,
    caps: &regex::Captures<'_>,
    year: i32,
    month: u32,
    day: u32,
    confidence: f32,
) {
    let Some(full) = caps.get(0) else { return };
    if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
        results.push(
            ExtractionMatch::new(date, confidence, full.as_str())
                .with_position(full.start(), full.end()),
        );
    }
}

/// Parse year, mapping two-digit years to 2000-2099.
fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if s.len() == 2 { 2000 + year } else { year }
}

/// Parse the first date found in a string.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    DateExtractor::new().extract(s).map(|m| m.value)
}

/// Parse a transaction row date.
///
/// Year-less dates (`12 Mar`, `12/03`) take the year of `reference`,
/// stepping back one year when the result would fall after it.
pub fn parse_row_date(s: &str, reference: Option<NaiveDate>) -> Option<NaiveDate> {
    let s = s.trim();
    if let Some(date) = parse_date(s) {
        return Some(date);
    }

    let caps = DATE_DAY_MONTH.captures(s)?;
    let (day, month) = match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
        (Some(d), Some(m), _, _) => (d.as_str().parse().ok()?, month_number(m.as_str())?),
        (_, _, Some(d), Some(m)) => (d.as_str().parse().ok()?, m.as_str().parse().ok()?),
        _ => return None,
    };

    let reference = reference?;
    let date = NaiveDate::from_ymd_opt(reference.year(), month, day)?;
    if date > reference {
        NaiveDate::from_ymd_opt(reference.year() - 1, month, day)
    } else {
        Some(date)
    }
}

/// Dates found in the statement summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementDates {
    pub statement_date: Option<ExtractionMatch<NaiveDate>>,
    pub period: Option<(NaiveDate, NaiveDate)>,
    pub due_date: Option<ExtractionMatch<NaiveDate>>,
    /// The due date was not labelled; the first plausible date was used.
    pub due_date_guessed: bool,
}

/// Extract the statement date, billing period and payment due date.
///
/// Dates outside `years` (inclusive) are ignored.
pub fn extract_statement_dates(
    text: &str,
    window: (usize, usize),
    years: (i32, i32),
) -> StatementDates {
    let plausible = |d: &NaiveDate| d.year() >= years.0 && d.year() <= years.1;
    let candidates: Vec<_> = DateExtractor::new()
        .extract_all(text)
        .into_iter()
        .filter(|m| plausible(&m.value))
        .collect();

    let mut result = StatementDates {
        statement_date: find_labelled_date(text, &candidates, STATEMENT_DATE_LABELS, window),
        period: find_period(text, &candidates),
        due_date: find_labelled_date(text, &candidates, DUE_DATE_LABELS, window),
        due_date_guessed: false,
    };

    if result.due_date.is_none() {
        result.due_date = candidates.first().cloned().map(|m| m.with_confidence(0.4));
        result.due_date_guessed = result.due_date.is_some();
    }

    result
}

fn find_labelled_date(
    text: &str,
    candidates: &[ExtractionMatch<NaiveDate>],
    labels: &[&str],
    window: (usize, usize),
) -> Option<ExtractionMatch<NaiveDate>> {
    let (before, after) = window;

    for hit in find_labels(text, labels, &[]) {
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
            .find(|c| c.start() >= hit.end && c.start() <= hit.end + after)
        {
            let confidence = if found.end() <= line_end { 0.95 } else { 0.8 };
            return Some(found.clone().with_confidence(confidence));
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

/// A labelled period, else the first `DATE to DATE` pair anywhere.
fn find_period(
    text: &str,
    candidates: &[ExtractionMatch<NaiveDate>],
) -> Option<(NaiveDate, NaiveDate)> {
    for hit in find_labels(text, PERIOD_LABELS, &[]) {
        let mut after = candidates
            .iter()
            .filter(|c| c.start() >= hit.end && c.start() <= hit.end + PERIOD_WINDOW);
        if let (Some(start), Some(end)) = (after.next(), after.next()) {
            return Some((start.value, end.value));
        }
    }

    candidates.windows(2).find_map(|pair| {
        let between = text[pair[0].end()..pair[1].start()].trim().to_ascii_lowercase();
        matches!(between.as_str(), "to" | "-" | "–")
            .then(|| (pair[0].value, pair[1].value))
    })
}
