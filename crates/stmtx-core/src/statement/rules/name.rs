//! Cardholder name extraction.

use super::patterns::{HONORIFIC_NAME, NAME_LABELS};
use super::ExtractionMatch;

/// Words that trail a captured name when the next field runs into it.
const STOP_WORDS: &[&str] = &[
    "card", "number", "no", "statement", "date", "account", "email", "address", "mobile",
    "period", "credit", "limit", "total", "payment", "due", "the", "of", "for", "month",
];

/// Cardholder name from a labelled field, else from an honorific
/// (`Mr Rahul Sharma`).
pub fn extract_customer_name(text: &str) -> Option<ExtractionMatch<String>> {
    for pattern in NAME_LABELS.iter() {
        for caps in pattern.captures_iter(text) {
            let Some(m) = caps.name("name") else { continue };
            if let Some(name) = clean_name(m.as_str()) {
                return Some(
                    ExtractionMatch::new(name, 0.9, m.as_str()).with_position(m.start(), m.end()),
                );
            }
        }
    }

    HONORIFIC_NAME.find(text).and_then(|m| {
        clean_name(m.as_str()).map(|name| {
            ExtractionMatch::new(name, 0.6, m.as_str()).with_position(m.start(), m.end())
        })
    })
}

/// Cut at the next column, drop trailing stop words, check the length.
fn clean_name(raw: &str) -> Option<String> {
    let cell = raw.split("  ").next().unwrap_or(raw);
    let mut words: Vec<&str> = cell.split_whitespace().collect();

    while let Some(last) = words.last() {
        let bare = last.trim_end_matches(['.', ':']).to_ascii_lowercase();
        if STOP_WORDS.contains(&bare.as_str()) {
            words.pop();
        } else {
            break;
        }
    }

    let name = words.join(" ");
    let len = name.chars().count();
    (len > 2 && len < 60).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_name() {
        let m = extract_customer_name("Customer Name: RAHUL SHARMA  Card No: XXXX").unwrap();
        assert_eq!(m.value, "RAHUL SHARMA");
    }

    #[test]
    fn test_trailing_stop_words_are_removed() {
        let m = extract_customer_name("Statement for Priya Nair Statement Date").unwrap();
        assert_eq!(m.value, "Priya Nair");
    }

    #[test]
    fn test_name_label_order() {
        let text = "Name: Someone Else\nCardholder Name: ANIL KUMAR";
        assert_eq!(extract_customer_name(text).unwrap().value, "ANIL KUMAR");
    }

    #[test]
    fn test_honorific_fallback() {
        let m = extract_customer_name("Dear Mr. Vikram Singh,\nThank you").unwrap();
        assert_eq!(m.value, "Mr. Vikram Singh");
        assert_eq!(m.confidence, 0.6);
    }

    #[test]
    fn test_too_short_names_are_rejected() {
        assert!(extract_customer_name("Name: AB").is_none());
    }
}
