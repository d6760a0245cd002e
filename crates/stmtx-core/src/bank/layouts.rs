//! Statement layouts of the supported issuers.
//!
//! A layout describes where the transaction table sits, what a row looks
//! like and which label wording the issuer uses for summary amounts. The
//! field parser is generic; everything issuer-specific lives here.

use lazy_static::lazy_static;
use regex::Regex;

use super::Issuer;

/// `12/03/2024`, `12-03-24`, `12.03.2024`
const DATE_NUMERIC: &str = r"\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}";
/// `12 Mar 24`, `12 Mar 2024`, `12 Mar`
const DATE_SPACED_MONTH: &str = r"\d{1,2}\s[A-Za-z]{3}(?:\s\d{2,4})?";
/// `12-Mar-2024`, `12/Mar/24`
const DATE_DASHED_MONTH: &str = r"\d{1,2}[/\-][A-Za-z]{3}[/\-]\d{2,4}";

/// Generic transaction-table header.
const GENERIC_HEADER: &str = r"^date\b.*\b(?:description|details|particulars|narration)\b";

/// Generic end-of-table markers.
const GENERIC_END: &str = r"^(?:reward points?\s+summary|important\s+(?:information|messages?|notes?)|end of statement|gst\s+summary|finance charges?\s+summary|schedule of charges)";

const GENERIC_TOTAL_DUE: &[&str] = &[
    "total amount due",
    "amount due",
    "total due",
    "new balance",
    "amount payable",
];
const GENERIC_MINIMUM_DUE: &[&str] = &[
    "minimum amount due",
    "minimum due",
    "min. amount due",
    "minimum payment due",
];
const GENERIC_CREDIT_LIMIT: &[&str] = &["credit limit", "total credit limit"];
const GENERIC_AVAILABLE_CREDIT: &[&str] = &[
    "available credit limit",
    "available credit",
    "available limit",
];

/// Parsing rules for one issuer's statement format.
#[derive(Debug)]
pub struct BankLayout {
    pub issuer: Issuer,

    /// Line that opens a transaction table.
    pub section_header: Regex,

    /// Line that closes a transaction table.
    pub section_end: Regex,

    /// Transaction row with named groups `date`, `desc`, `sign`, `amount`, `marker`.
    pub row: Regex,

    /// Markers after the amount that denote a credit (compared case-insensitively).
    pub credit_markers: &'static [&'static str],

    /// A leading `+` on the amount marks a credit.
    pub plus_is_credit: bool,

    /// Rows carry a reference/serial number right after the date.
    pub leading_reference: bool,

    /// Rows carry a reward-points column right before the amount.
    pub trailing_points: bool,

    total_due: &'static [&'static str],
    minimum_due: &'static [&'static str],
    credit_limit: &'static [&'static str],
    available_credit: &'static [&'static str],
}

/// A list of label phrases plus prefixes that disqualify a match.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSet {
    pub labels: Vec<&'static str>,
    pub excluded_prefixes: &'static [&'static str],
}

impl BankLayout {
    /// Labels for the total amount due.
    pub fn total_due_labels(&self) -> LabelSet {
        LabelSet {
            labels: merge(self.total_due, GENERIC_TOTAL_DUE),
            excluded_prefixes: &["minimum", "min.", "min"],
        }
    }

    /// Labels for the minimum amount due.
    pub fn minimum_due_labels(&self) -> LabelSet {
        LabelSet {
            labels: merge(self.minimum_due, GENERIC_MINIMUM_DUE),
            excluded_prefixes: &[],
        }
    }

    /// Labels for the credit limit.
    pub fn credit_limit_labels(&self) -> LabelSet {
        LabelSet {
            labels: merge(self.credit_limit, GENERIC_CREDIT_LIMIT),
            excluded_prefixes: &["available", "cash"],
        }
    }

    /// Labels for the available credit limit.
    pub fn available_credit_labels(&self) -> LabelSet {
        LabelSet {
            labels: merge(self.available_credit, GENERIC_AVAILABLE_CREDIT),
            excluded_prefixes: &["cash"],
        }
    }

    /// Whether a marker token denotes a credit.
    pub fn is_credit_marker(&self, marker: &str) -> bool {
        self.credit_markers
            .iter()
            .any(|m| m.eq_ignore_ascii_case(marker.trim()))
    }
}

/// Issuer-specific labels first, then generic ones, without duplicates.
fn merge(specific: &[&'static str], generic: &[&'static str]) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::with_capacity(specific.len() + generic.len());
    for label in specific.iter().chain(generic) {
        if !out.contains(label) {
            out.push(label);
        }
    }
    out
}

fn header(specific: &str) -> Regex {
    Regex::new(&format!(r"(?i)(?:{}|{})", specific, GENERIC_HEADER)).unwrap()
}

fn end(specific: Option<&str>) -> Regex {
    match specific {
        Some(s) => Regex::new(&format!(r"(?i)(?:{}|{})", s, GENERIC_END)).unwrap(),
        None => Regex::new(&format!(r"(?i){}", GENERIC_END)).unwrap(),
    }
}

fn row(date_tokens: &[&str]) -> Regex {
    Regex::new(&format!(
        concat!(
            r"^\s*(?P<date>{})\s+",
            r"(?P<desc>.+?)\s+",
            r"(?P<sign>[+-])?\s*(?:₹|Rs\.?|INR)?\s*",
            r"(?P<amount>\d{{1,3}}(?:,\d{{2,3}})*\.\d{{2}}|\d+\.\d{{2}})",
            r"\s*(?P<marker>Cr|CR|cr|Dr|DR|dr|C|D)?\s*$"
        ),
        date_tokens.join("|")
    ))
    .unwrap()
}

lazy_static! {
    static ref HDFC: BankLayout = BankLayout {
        issuer: Issuer::Hdfc,
        section_header: header(
            r"(?:domestic|international)\s+transactions|^date\s+transaction\s+description"
        ),
        section_end: end(Some(r"^reward points\b")),
        row: row(&[DATE_NUMERIC]),
        credit_markers: &["cr", "c"],
        plus_is_credit: true,
        leading_reference: false,
        trailing_points: true,
        total_due: &["total dues"],
        minimum_due: &["minimum amount due"],
        credit_limit: &["credit limit"],
        available_credit: &["available credit limit"],
    };

    static ref ICICI: BankLayout = BankLayout {
        issuer: Issuer::Icici,
        section_header: header(r"^date\s+ser\.?\s*no\.?|transaction\s+details\s+reward"),
        section_end: end(Some(r"^(?:earnings|invest\s+in)")),
        row: row(&[DATE_NUMERIC]),
        credit_markers: &["cr"],
        plus_is_credit: false,
        leading_reference: true,
        trailing_points: true,
        total_due: &["total amount due"],
        minimum_due: &["minimum amount due"],
        credit_limit: &["credit limit"],
        available_credit: &["available credit"],
    };

    static ref SBI: BankLayout = BankLayout {
        issuer: Issuer::Sbi,
        section_header: header(
            r"^transactions?\s+(?:for|highlights)|^date\s+transaction\s+details\s+amount"
        ),
        section_end: end(None),
        row: row(&[DATE_SPACED_MONTH, DATE_NUMERIC]),
        credit_markers: &["c", "cr"],
        plus_is_credit: false,
        leading_reference: false,
        trailing_points: false,
        total_due: &["total amount due"],
        minimum_due: &["minimum amount due"],
        credit_limit: &["credit limit"],
        available_credit: &["available credit limit"],
    };

    static ref AXIS: BankLayout = BankLayout {
        issuer: Issuer::Axis,
        section_header: header(
            r"^date\s+transaction\s+details\s+merchant|^account\s+summary\s+transactions"
        ),
        section_end: end(Some(r"^\*+\s*end of")),
        row: row(&[DATE_NUMERIC]),
        credit_markers: &["cr"],
        plus_is_credit: false,
        leading_reference: false,
        trailing_points: false,
        total_due: &["total payment due"],
        minimum_due: &["minimum payment due"],
        credit_limit: &["credit limit"],
        available_credit: &["available credit limit"],
    };

    static ref KOTAK: BankLayout = BankLayout {
        issuer: Issuer::Kotak,
        section_header: header(r"^date\s+transaction\s+details|^transaction\s+details\s+for"),
        section_end: end(Some(r"^(?:my\s+rewards|total\s+purchases)")),
        row: row(&[DATE_DASHED_MONTH, DATE_NUMERIC]),
        credit_markers: &["cr"],
        plus_is_credit: false,
        leading_reference: false,
        trailing_points: false,
        total_due: &["total amount due"],
        minimum_due: &["minimum amount due"],
        credit_limit: &["total credit limit", "credit limit"],
        available_credit: &["available credit limit"],
    };
}

/// Layout for an issuer.
pub fn layout_for(issuer: Issuer) -> &'static BankLayout {
    match issuer {
        Issuer::Hdfc => &HDFC,
        Issuer::Icici => &ICICI,
        Issuer::Sbi => &SBI,
        Issuer::Axis => &AXIS,
        Issuer::Kotak => &KOTAK,
    }
}
