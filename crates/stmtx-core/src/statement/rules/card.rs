//! Card number (last four digits) and card network extraction.

use super::patterns::{BARE_FOUR_DIGITS, CARD_LABELLED, MASKED_CARD};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::statement::CardNetwork;

/// Four-digit values in this range are read as years, not card digits.
const YEAR_RANGE: (u32, u32) = (1900, 2100);

const NETWORK_KEYWORDS: &[(&str, CardNetwork)] = &[
    ("visa", CardNetwork::Visa),
    ("mastercard", CardNetwork::Mastercard),
    ("master card", CardNetwork::Mastercard),
    ("rupay", CardNetwork::Rupay),
    ("american express", CardNetwork::Amex),
    ("amex", CardNetwork::Amex),
    ("diners", CardNetwork::Diners),
];

/// Extracts masked card numbers.
///
/// `extract` returns the last four digits, trying masked numbers, then
/// labelled numbers, then any bare four-digit group that is not a year.
pub struct CardExtractor;

impl CardExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CardExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CardExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        extract_last4(text)
    }

    /// Every masked card number in the text, as last-four matches.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in MASKED_CARD.captures_iter(text) {
            let Some(full) = caps.get(0) else { continue };
            let masked_groups = format!("{}{}{}", &caps["first"], &caps["second"], &caps["third"]);
            if !masked_groups.chars().any(|c| matches!(c, 'x' | 'X' | '*')) {
                continue;
            }
            let glued = text[..full.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_alphanumeric());
            if glued {
                continue;
            }

            results.push(
                ExtractionMatch::new(caps["last"].to_string(), 0.95, full.as_str())
                    .with_position(full.start(), full.end()),
            );
        }

        results
    }
}

/// Last four digits of the card number.
pub fn extract_last4(text: &str) -> Option<ExtractionMatch<String>> {
    if let Some(masked) = CardExtractor::new().extract_all(text).into_iter().next() {
        return Some(masked);
    }

    if let Some(caps) = CARD_LABELLED.captures(text) {
        let full = caps.get(0)?;
        return Some(
            ExtractionMatch::new(caps["last"].to_string(), 0.85, full.as_str())
                .with_position(full.start(), full.end()),
        );
    }

    BARE_FOUR_DIGITS.captures_iter(text).find_map(|caps| {
        let m = caps.get(1)?;
        let value: u32 = m.as_str().parse().ok()?;
        if value >= YEAR_RANGE.0 && value <= YEAR_RANGE.1 {
            return None;
        }
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        let glued = |c: Option<char>| matches!(c, Some('/' | '.' | ',' | '-' | ':'));
        if glued(before) || glued(after) {
            return None;
        }
        Some(
            ExtractionMatch::new(m.as_str().to_string(), 0.4, m.as_str())
                .with_position(m.start(), m.end()),
        )
    })
}

/// Card network from a keyword, else from the leading digits of a masked
/// card number.
pub fn detect_network(text: &str) -> Option<CardNetwork> {
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();

    let by_keyword = NETWORK_KEYWORDS
        .iter()
        .filter_map(|(keyword, network)| {
            lower
                .match_indices(keyword)
                .map(|(pos, _)| pos)
                .find(|&pos| {
                    let end = pos + keyword.len();
                    (pos == 0 || !bytes[pos - 1].is_ascii_alphabetic())
                        && (end >= bytes.len() || !bytes[end].is_ascii_alphabetic())
                })
                .map(|pos| (pos, *network))
        })
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, network)| network);

    by_keyword.or_else(|| {
        let masked = CardExtractor::new().extract_all(text).into_iter().next()?;
        network_from_prefix(&masked.source)
    })
}

fn network_from_prefix(card: &str) -> Option<CardNetwork> {
    let digits: String = card.chars().take_while(|c| c.is_ascii_digit()).collect();
    match (digits.get(..1), digits.get(..2)) {
        (_, Some("34" | "37")) => Some(CardNetwork::Amex),
        (_, Some("36")) => Some(CardNetwork::Diners),
        (Some("4"), _) => Some(CardNetwork::Visa),
        (Some("2" | "5"), _) => Some(CardNetwork::Mastercard),
        (Some("6"), _) => Some(CardNetwork::Rupay),
        _ => None,
    }
}
