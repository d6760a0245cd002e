//! Keyword-based issuer detection.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::Issuer;

/// Outcome of issuer detection.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Winning issuer, `None` when no keyword matched.
    pub issuer: Option<Issuer>,
    /// Winning score divided by the sum of all scores.
    pub confidence: f32,
    /// Weighted score per issuer, in `Issuer::ALL` order.
    pub scores: Vec<(Issuer, usize)>,
}

impl Classification {
    /// Issuer code, or `UNKNOWN`.
    pub fn label(&self) -> String {
        self.issuer
            .map(|i| i.code().to_string())
            .unwrap_or_else(|| "UNKNOWN".to_string())
    }
}

/// Scores issuer keywords over statement text.
pub struct IssuerClassifier {
    /// Leading share of the text whose hits count double.
    header_share: f32,
}

impl IssuerClassifier {
    pub fn new() -> Self {
        Self { header_share: 0.2 }
    }

    /// Set the leading share of the text treated as letterhead.
    pub fn with_header_share(mut self, share: f32) -> Self {
        self.header_share = share.clamp(0.0, 1.0);
        self
    }

    /// Detect the issuer of a statement.
    pub fn classify(&self, text: &str) -> Classification {
        let lower = text.to_lowercase();
        let header_end = (lower.len() as f32 * self.header_share) as usize;

        let mut scores = Vec::with_capacity(Issuer::ALL.len());
        let mut best: Option<(Issuer, usize, usize)> = None;
        let mut total = 0usize;

        for issuer in Issuer::ALL {
            let hits = keyword_hits(&lower, issuer.keywords());
            let score: usize = hits
                .iter()
                .map(|&pos| if pos < header_end { 2 } else { 1 })
                .sum();
            scores.push((issuer, score));
            total += score;

            if score == 0 {
                continue;
            }
            let first = hits.iter().next().copied().unwrap_or(usize::MAX);
            trace!("{}: score {} (first hit at {})", issuer, score, first);

            let better = match best {
                None => true,
                Some((_, best_score, best_first)) => {
                    score > best_score || (score == best_score && first < best_first)
                }
            };
            if better {
                best = Some((issuer, score, first));
            }
        }

        let (issuer, confidence) = match best {
            Some((issuer, score, _)) => (Some(issuer), score as f32 / total as f32),
            None => (None, 0.0),
        };

        debug!("Issuer detection: {:?} (confidence {:.2})", issuer, confidence);

        Classification {
            issuer,
            confidence,
            scores,
        }
    }
}

impl Default for IssuerClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Start offsets of keyword occurrences not embedded in a longer word.
fn keyword_hits(lower: &str, keywords: &[&str]) -> BTreeSet<usize> {
    let bytes = lower.as_bytes();
    let mut hits = BTreeSet::new();

    for keyword in keywords {
        for (pos, _) in lower.match_indices(keyword) {
            let end = pos + keyword.len();
            let before_ok = pos == 0 || !bytes[pos - 1].is_ascii_alphabetic();
            let after_ok = end >= bytes.len() || !bytes[end].is_ascii_alphabetic();
            if before_ok && after_ok {
                hits.insert(pos);
            }
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detects_each_issuer() {
        let cases = [
            ("HDFC Bank Credit Card Statement", Issuer::Hdfc),
            ("ICICI Bank Limited", Issuer::Icici),
            ("State Bank of India card services", Issuer::Sbi),
            ("Welcome to sbicard.com", Issuer::Sbi),
            ("Axis Bank Ltd. statement", Issuer::Axis),
            ("Kotak Mahindra Bank", Issuer::Kotak),
        ];
        let classifier = IssuerClassifier::new();
        for (text, expected) in cases {
            assert_eq!(classifier.classify(text).issuer, Some(expected), "{}", text);
        }
    }

    #[test]
    fn test_unknown_issuer() {
        let result = IssuerClassifier::new().classify("Citibank statement of account");
        assert_eq!(result.issuer, None);
        assert_eq!(result.label(), "UNKNOWN");
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_embedded_keyword_is_ignored() {
        // "taxis" must not count as Axis
        let result = IssuerClassifier::new().classify("UBER TAXIS MUMBAI");
        assert_eq!(result.issuer, None);
    }

    #[test]
    fn test_letterhead_outweighs_merchant_mentions() {
        let text = format!(
            "HDFC Bank Credit Card Statement\n{}\n12/03/2024  AXIS ATM CASH  500.00\n12/03/2024  AXIS MUTUAL FUND  900.00",
            "filler line\n".repeat(40)
        );
        let result = IssuerClassifier::new().classify(&text);
        assert_eq!(result.issuer, Some(Issuer::Hdfc));
    }

    #[test]
    fn test_shared_start_counts_once() {
        let result = IssuerClassifier::new()
            .with_header_share(0.0)
            .classify("SBI Card");
        assert_eq!(result.scores[2], (Issuer::Sbi, 1));
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_tie_goes_to_first_occurrence() {
        let result = IssuerClassifier::new()
            .with_header_share(0.0)
            .classify("Kotak payment received via ICICI");
        assert_eq!(result.issuer, Some(Issuer::Kotak));
        assert_eq!(result.confidence, 0.5);
    }
}
