//! Conversion of raw statement fields into the canonical schema.

use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use crate::bank::BankLayout;
use crate::models::config::ExtractionConfig;
use crate::models::statement::{Category, Direction, StatementSummary, Transaction};

use super::rules::amounts::parse_inr_amount;
use super::rules::dates::parse_row_date;
use super::{RawStatement, RawTransaction};

/// A statement in canonical form, ready to become a result.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedStatement {
    pub summary: StatementSummary,
    pub transactions: Vec<Transaction>,
    pub warnings: Vec<String>,
    pub missing_fields: Vec<String>,
    /// Overall confidence (0.0 - 1.0).
    pub confidence: f32,
}

/// Normalizes raw statements.
pub struct Normalizer {
    categorize: bool,
    period_tolerance_days: i64,
    currency: String,
}

impl Normalizer {
    /// Create a new normalizer with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            categorize: config.categorize,
            period_tolerance_days: config.period_tolerance_days,
            currency: config.default_currency.clone(),
        }
    }

    /// Enable or disable category assignment.
    pub fn with_categorize(mut self, categorize: bool) -> Self {
        self.categorize = categorize;
        self
    }

    /// Normalize a raw statement.
    ///
    /// Rows whose date or amount cannot be read are dropped with a warning.
    pub fn normalize(&self, raw: RawStatement) -> NormalizedStatement {
        let layout = raw.issuer.layout();
        let mut warnings = raw.warnings;

        let reference = raw
            .period
            .map(|p| p.end)
            .or(raw.statement_date)
            .or(raw.payment_due_date);

        let mut transactions = Vec::with_capacity(raw.transactions.len());
        for row in &raw.transactions {
            match self.normalize_row(row, layout, reference) {
                Ok(txn) => transactions.push(txn),
                Err(reason) => {
                    warn!("Dropping row {:?}: {}", row.description, reason);
                    warnings.push(format!("dropped row '{}': {}", row.description, reason));
                }
            }
        }

        let summary = StatementSummary {
            card_last4: raw.card_last4,
            card_network: raw.card_network,
            customer_name: raw.customer_name,
            statement_date: raw.statement_date,
            period: raw.period,
            payment_due_date: raw.payment_due_date,
            total_due: raw.total_due,
            minimum_due: raw.minimum_due,
            credit_limit: raw.credit_limit,
            available_credit: raw.available_credit,
            currency: self.currency.clone(),
        };

        warnings.extend(self.validate(&summary, &transactions));

        let (confidence, missing_fields) = score(&summary, &transactions);
        debug!(
            "Normalized {} transactions, confidence {:.2}, {} warnings",
            transactions.len(),
            confidence,
            warnings.len()
        );

        NormalizedStatement {
            summary,
            transactions,
            warnings,
            missing_fields,
            confidence,
        }
    }

    fn normalize_row(
        &self,
        row: &RawTransaction,
        layout: &BankLayout,
        reference: Option<NaiveDate>,
    ) -> std::result::Result<Transaction, String> {
        let date = parse_row_date(&row.date_text, reference)
            .ok_or_else(|| format!("unreadable date '{}'", row.date_text))?;
        let amount = parse_inr_amount(&row.amount_text)
            .ok_or_else(|| format!("unreadable amount '{}'", row.amount_text))?;

        let direction = direction_of(row, layout);
        let description = clean_description(&row.description);
        let category = self
            .categorize
            .then(|| categorize(&description, direction));

        Ok(Transaction::new(date, description, amount, direction)
            .with_category(category)
            .with_reference(row.reference.clone()))
    }

    fn validate(&self, summary: &StatementSummary, transactions: &[Transaction]) -> Vec<String> {
        let mut issues = Vec::new();

        if let Some(period) = summary.period {
            if period.start > period.end {
                issues.push("statement period starts after it ends".to_string());
            }
            if let Some(due) = summary.payment_due_date {
                if due < period.end {
                    issues.push("payment due date is before the statement period end".to_string());
                }
            }

            // Saturates at the calendar bounds for huge configured tolerances
            let tolerance =
                Duration::try_days(self.period_tolerance_days.max(0)).unwrap_or(Duration::MAX);
            let earliest = period
                .start
                .checked_sub_signed(tolerance)
                .unwrap_or(NaiveDate::MIN);
            let latest = period
                .end
                .checked_add_signed(tolerance)
                .unwrap_or(NaiveDate::MAX);
            let outside = transactions
                .iter()
                .filter(|t| t.date() < earliest || t.date() > latest)
                .count();
            if outside > 0 {
                issues.push(format!(
                    "{} transaction(s) fall outside the statement period",
                    outside
                ));
            }
        }

        if let (Some(minimum), Some(total)) = (summary.minimum_due, summary.total_due) {
            if minimum > total {
                issues.push("minimum due exceeds total due".to_string());
            }
        }

        issues
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Confidence and missing key fields.
fn score(summary: &StatementSummary, transactions: &[Transaction]) -> (f32, Vec<String>) {
    let checks = [
        (summary.card_last4.is_none(), "card_last4", 0.15),
        (summary.total_due.is_none(), "total_due", 0.25),
        (summary.payment_due_date.is_none(), "payment_due_date", 0.15),
        (summary.period.is_none(), "period", 0.15),
        (transactions.is_empty(), "transactions", 0.2),
    ];

    let mut confidence = 1.0f32;
    let mut missing = Vec::new();
    for (is_missing, field, penalty) in checks {
        if is_missing {
            confidence -= penalty;
            missing.push(field.to_string());
        }
    }

    (confidence.max(0.0), missing)
}

fn direction_of(row: &RawTransaction, layout: &BankLayout) -> Direction {
    if let Some(marker) = row.marker.as_deref() {
        return if layout.is_credit_marker(marker) {
            Direction::Credit
        } else {
            Direction::Debit
        };
    }

    let amount = row.amount_text.trim_start();
    if amount.starts_with('-') || (layout.plus_is_credit && amount.starts_with('+')) {
        Direction::Credit
    } else {
        Direction::Debit
    }
}

/// Collapse whitespace and drop trailing currency markers.
pub fn clean_description(description: &str) -> String {
    let mut words: Vec<&str> = description.split_whitespace().collect();
    while let Some(last) = words.last() {
        if matches!(*last, "₹" | "Rs" | "Rs." | "INR") {
            words.pop();
        } else {
            break;
        }
    }
    words.join(" ")
}

const PAYMENT_KEYWORDS: &[&str] = &[
    "PAYMENT", "THANK YOU", "NEFT", "IMPS", "UPI", "AUTOPAY", "BBPS", "NETBANKING",
];

const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (Category::Emi, &["EMI", "EQUATED"]),
    (
        Category::Fees,
        &[
            "FEE", "CHARGE", "CHARGES", "GST", "IGST", "CGST", "SGST", "INTEREST", "SURCHARGE",
            "FINANCE", "PENALTY", "LATE",
        ],
    ),
    (Category::Cash, &["ATM", "CASH WITHDRAWAL", "CASH ADVANCE"]),
    (
        Category::Food,
        &[
            "SWIGGY", "ZOMATO", "RESTAURANT", "CAFE", "DOMINOS", "MCDONALD", "KFC", "STARBUCKS",
            "PIZZA", "FOOD", "EATS", "BIRYANI",
        ],
    ),
    (
        Category::Groceries,
        &[
            "BIGBASKET", "BLINKIT", "ZEPTO", "DMART", "GROFERS", "GROCERY", "SUPERMARKET",
            "MORE RETAIL", "RELIANCE FRESH", "INSTAMART",
        ],
    ),
    (
        Category::Fuel,
        &[
            "PETROL", "FUEL", "HPCL", "BPCL", "IOCL", "INDIAN OIL", "SHELL", "BHARAT PETROLEUM",
            "FILLING STATION",
        ],
    ),
    (
        Category::Travel,
        &[
            "UBER", "OLA", "IRCTC", "MAKEMYTRIP", "GOIBIBO", "INDIGO", "AIR INDIA", "VISTARA",
            "AIRLINES", "RAILWAY", "HOTEL", "CLEARTRIP", "YATRA", "RAPIDO", "FASTAG",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "NETFLIX", "HOTSTAR", "PRIME VIDEO", "SPOTIFY", "BOOKMYSHOW", "PVR", "INOX", "SONYLIV",
            "ZEE5", "YOUTUBE",
        ],
    ),
    (
        Category::Health,
        &[
            "PHARMACY", "APOLLO", "MEDPLUS", "HOSPITAL", "CLINIC", "1MG", "PHARMEASY", "NETMEDS",
            "DIAGNOSTIC", "MEDICAL",
        ],
    ),
    (
        Category::Utilities,
        &[
            "ELECTRICITY", "AIRTEL", "JIO", "VODAFONE", "BSNL", "BROADBAND", "GAS", "WATER",
            "BESCOM", "TATA POWER", "RECHARGE", "BILLDESK",
        ],
    ),
    (
        Category::Shopping,
        &[
            "AMAZON", "FLIPKART", "MYNTRA", "AJIO", "NYKAA", "MEESHO", "TATA CLIQ",
            "SHOPPERS STOP", "LIFESTYLE", "DECATHLON", "CROMA", "RELIANCE DIGITAL",
        ],
    ),
];

/// Keyword-based category of a transaction description.
///
/// Credits that look like bill payments map to `Payment`. Keywords shorter
/// than five characters must match whole words.
pub fn categorize(description: &str, direction: Direction) -> Category {
    let desc = description.to_uppercase();

    if direction == Direction::Credit && PAYMENT_KEYWORDS.iter().any(|k| has_keyword(&desc, k)) {
        return Category::Payment;
    }

    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| has_keyword(&desc, k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

fn has_keyword(desc: &str, keyword: &str) -> bool {
    if keyword.len() >= 5 {
        return desc.contains(keyword);
    }
    let bytes = desc.as_bytes();
    desc.match_indices(keyword).any(|(pos, _)| {
        let end = pos + keyword.len();
        (pos == 0 || !bytes[pos - 1].is_ascii_alphanumeric())
            && (end >= bytes.len() || !bytes[end].is_ascii_alphanumeric())
    })
}
