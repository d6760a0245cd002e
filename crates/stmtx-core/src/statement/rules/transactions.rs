//! Transaction table row extraction.

use tracing::trace;

use super::FieldExtractor;
use crate::bank::BankLayout;
use crate::pdf::text::split_cells;
use crate::statement::RawTransaction;

/// Longest reward-points value stripped from the end of a description.
const MAX_POINTS_DIGITS: usize = 6;

/// Shortest numeric token treated as a leading reference number.
const MIN_REFERENCE_DIGITS: usize = 6;

/// Pulls transaction rows out of statement text using an issuer layout.
///
/// Rows are collected between a section header and a section end marker.
/// A statement without any recognizable header is scanned line by line.
pub struct TransactionRowExtractor<'a> {
    layout: &'a BankLayout,
}

impl<'a> TransactionRowExtractor<'a> {
    pub fn new(layout: &'a BankLayout) -> Self {
        Self { layout }
    }

    fn parse_row(&self, line: &str) -> Option<RawTransaction> {
        let caps = self.layout.row.captures(line)?;

        let mut description = caps["desc"].trim().to_string();
        let mut reference = None;

        if self.layout.leading_reference {
            if let Some((first, rest)) = description.split_once(char::is_whitespace) {
                if first.len() >= MIN_REFERENCE_DIGITS
                    && first.chars().all(|c| c.is_ascii_digit())
                {
                    reference = Some(first.to_string());
                    description = rest.trim().to_string();
                }
            }
        }

        if self.layout.trailing_points {
            let cells = split_cells(&description);
            if cells.len() > 1 {
                let last = cells[cells.len() - 1].trim_start_matches('-');
                if !last.is_empty()
                    && last.len() <= MAX_POINTS_DIGITS
                    && last.chars().all(|c| c.is_ascii_digit())
                {
                    description = cells[..cells.len() - 1].join("  ");
                }
            }
        }

        if description.is_empty() {
            return None;
        }

        let sign = caps.name("sign").map(|m| m.as_str()).unwrap_or("");
        Some(RawTransaction {
            date_text: caps["date"].to_string(),
            description,
            amount_text: format!("{}{}", sign, &caps["amount"]),
            marker: caps.name("marker").map(|m| m.as_str().to_string()),
            reference,
        })
    }
}

impl FieldExtractor for TransactionRowExtractor<'_> {
    type Output = RawTransaction;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let has_header = text
            .lines()
            .any(|line| self.layout.section_header.is_match(line.trim()));
        let mut in_section = !has_header;
        let mut rows = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if in_section {
                if let Some(row) = self.parse_row(line) {
                    trace!("row: {:?}", row);
                    rows.push(row);
                    continue;
                }
            }

            if self.layout.section_header.is_match(line) {
                in_section = true;
            } else if in_section && has_header && self.layout.section_end.is_match(line) {
                in_section = false;
            }
        }

        rows
    }
}
