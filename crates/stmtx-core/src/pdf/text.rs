//! Text cleanup and table-cell splitting for extracted statement text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// An amount whose thousands group was pushed onto the next line.
    static ref SPLIT_AMOUNT: Regex = Regex::new(r"(\d+)[ \t]*\n[ \t]*(\d{3}\.\d{2})\b").unwrap();

    static ref WIDE_GAP: Regex = Regex::new(r"[ \t]{2,}|\t").unwrap();

    static ref DOUBLE_RUPEE: Regex = Regex::new(r"₹\s*₹").unwrap();

    /// String operands of text-showing operators in an uncompressed content stream.
    static ref TJ_LITERAL: Regex = Regex::new(r"\(((?:[^()\\]|\\.)*)\)\s*(?:Tj|')").unwrap();

    static ref TJ_ARRAY: Regex = Regex::new(r"\[((?:[^\]\\]|\\.)*)\]\s*TJ").unwrap();

    static ref ARRAY_LITERAL: Regex = Regex::new(r"\(((?:[^()\\]|\\.)*)\)").unwrap();
}

/// Normalize raw extracted text.
///
/// Line structure is kept. Inside a line, any gap of two or more blanks
/// becomes exactly two spaces so column boundaries survive while single
/// spaces between words stay untouched.
pub fn clean_text(raw: &str) -> String {
    let text = raw
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{00a0}', " ");
    let text = SPLIT_AMOUNT.replace_all(&text, "$1,$2");
    let text = DOUBLE_RUPEE.replace_all(&text, "₹");

    text.lines()
        .map(|line| WIDE_GAP.replace_all(line.trim(), "  ").into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a line into table cells on tabs or runs of two or more spaces.
pub fn split_cells(line: &str) -> Vec<String> {
    cell_spans(line)
        .into_iter()
        .map(|(start, end)| line[start..end].to_string())
        .collect()
}

/// Byte ranges of the cells of a line, trimmed, in order.
pub fn cell_spans(line: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    let gaps = WIDE_GAP
        .find_iter(line)
        .map(|m| (m.start(), m.end()))
        .chain(std::iter::once((line.len(), line.len())));

    for (gap_start, gap_end) in gaps {
        let cell = &line[start..gap_start];
        let lead = cell.len() - cell.trim_start().len();
        let trimmed = cell.trim();
        if !trimmed.is_empty() {
            spans.push((start + lead, start + lead + trimmed.len()));
        }
        start = gap_end;
    }

    spans
}

/// Recover text from bytes that could not be processed as a PDF.
///
/// Uncompressed PDF content streams are mined for string operands of the
/// text-showing operators, one output line per operator. Anything else is
/// decoded as lossy UTF-8.
pub fn decode_raw(data: &[u8]) -> String {
    let lossy = String::from_utf8_lossy(data);
    if !data.starts_with(b"%PDF") {
        return lossy.into_owned();
    }

    let mut lines: Vec<(usize, String)> = Vec::new();

    for caps in TJ_LITERAL.captures_iter(&lossy) {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        lines.push((start, unescape_literal(&caps[1])));
    }

    for caps in TJ_ARRAY.captures_iter(&lossy) {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let joined: String = ARRAY_LITERAL
            .captures_iter(&caps[1])
            .map(|c| unescape_literal(&c[1]))
            .collect();
        lines.push((start, joined));
    }

    lines.sort_by_key(|(pos, _)| *pos);
    lines
        .into_iter()
        .map(|(_, line)| line)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn unescape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
