//! Common regex patterns for statement field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Amounts: ₹1,23,456.00, Rs. 500, INR 12,345.67 Cr, -250.00
    pub static ref AMOUNT: Regex = Regex::new(
        r"(?:(?P<cur>₹|Rs\.?|INR)\s*)?(?P<sign>[-+])?(?P<num>\d{1,3}(?:,\d{2,3})+(?:\.\d{2})?|\d+(?:\.\d{2})?)(?:\s*(?P<marker>Cr|CR|Dr|DR)\b)?"
    ).unwrap();

    // Day-first numeric dates: 12/03/2024, 12-03-24, 12.03.2024
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})\b"
    ).unwrap();

    // 12 Mar 2024, 12-Mar-24, 12th March, 2024
    pub static ref DATE_DAY_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?[ /\-,]*(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?[ /\-,]*(\d{4}|\d{2})\b"
    ).unwrap();

    // March 12, 2024
    pub static ref DATE_MONTH_NAME_DAY: Regex = Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.? (\d{1,2})(?:st|nd|rd|th)?,? (\d{4})\b"
    ).unwrap();

    // 2024-03-12
    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b"
    ).unwrap();

    // Year-less row dates: 12 Mar, 12-Mar, 12/03
    pub static ref DATE_DAY_MONTH: Regex = Regex::new(
        r"(?i)^(\d{1,2})[ /\-]([a-z]{3})[a-z]*$|^(\d{1,2})[/\-](\d{1,2})$"
    ).unwrap();

    // Masked card numbers: XXXX XXXX XXXX 1234, 4375 XXXX XXXX 1234, ************1234
    pub static ref MASKED_CARD: Regex = Regex::new(
        r"(?i)(?P<first>[0-9x*]{4})[ \-]?(?P<second>[0-9x*]{4})[ \-]?(?P<third>[0-9x*]{4})[ \-]?(?P<last>\d{4})\b"
    ).unwrap();

    // Card No: xxxx 1234, card ending in 1234
    pub static ref CARD_LABELLED: Regex = Regex::new(
        r"(?i)(?:card\s*(?:no|number|num)\.?|ending\s+(?:in|with))\s*[:\-]?\s*[0-9x* \-]{0,20}?(?P<last>\d{4})\b"
    ).unwrap();

    pub static ref BARE_FOUR_DIGITS: Regex = Regex::new(
        r"\b(\d{4})\b"
    ).unwrap();

    // Customer name labels, tried in order
    pub static ref NAME_LABELS: Vec<Regex> = vec![
        Regex::new(r"(?i)customer\s+name\s*[:\-]?[ \t]*(?P<name>[a-z][a-z .']*)").unwrap(),
        Regex::new(r"(?i)statement\s+for\s*[:\-]?[ \t]*(?P<name>[a-z][a-z .']*)").unwrap(),
        Regex::new(r"(?i)card\s*holder(?:\s+name)?\s*[:\-]?[ \t]*(?P<name>[a-z][a-z .']*)").unwrap(),
        Regex::new(r"(?i)\bname\s*[:\-][ \t]*(?P<name>[a-z][a-z .']*)").unwrap(),
    ];

    pub static ref HONORIFIC_NAME: Regex = Regex::new(
        r"\b(?:Mr|Mrs|Ms|Miss)\.?[ \t]+[A-Z][A-Za-z]+(?:[ \t][A-Z][A-Za-z]+){0,3}"
    ).unwrap();
}

/// Month number from a three-letter (or longer) English month name.
pub fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
