//! Locating summary labels and the values that belong to them.
//!
//! Statements print summary values in three ways: inline after the label,
//! in a column below a row of labels, or somewhere close by. The helpers
//! here find label occurrences and resolve the column cell under a label.

use crate::pdf::text::cell_spans;

/// Lines below a label row searched for the matching value row.
const COLUMN_LOOKAHEAD: usize = 3;

/// One occurrence of a label in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelHit {
    pub start: usize,
    pub end: usize,
}

/// Find whole-word, case-insensitive label occurrences.
///
/// Hits are ordered by label (in the given order), then by position. An
/// occurrence directly preceded on its line by one of `excluded_prefixes`
/// is skipped, so "minimum amount due" does not count as "amount due".
pub fn find_labels(text: &str, labels: &[&str], excluded_prefixes: &[&str]) -> Vec<LabelHit> {
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut hits = Vec::new();

    for label in labels {
        for (start, _) in lower.match_indices(label) {
            let end = start + label.len();
            let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphabetic();
            let after_ok = end >= bytes.len() || !bytes[end].is_ascii_alphabetic();
            if !before_ok || !after_ok {
                continue;
            }

            let (line_start, _) = line_bounds(&lower, start);
            if has_prefix(&lower[line_start..start], excluded_prefixes) {
                continue;
            }

            let hit = LabelHit { start, end };
            if !hits.contains(&hit) {
                hits.push(hit);
            }
        }
    }

    hits
}

fn has_prefix(before: &str, prefixes: &[&str]) -> bool {
    let before = before.trim_end();
    prefixes.iter().any(|prefix| {
        before.ends_with(prefix) && {
            let at = before.len() - prefix.len();
            at == 0 || !before.as_bytes()[at - 1].is_ascii_alphabetic()
        }
    })
}

/// Byte range of the line containing `pos`, without the newline.
pub fn line_bounds(text: &str, pos: usize) -> (usize, usize) {
    let start = text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = text[pos..].find('\n').map(|i| pos + i).unwrap_or(text.len());
    (start, end)
}

/// Byte range of the cell aligned with a label in a row of labels.
///
/// The label's line must hold at least two cells. The first of the next
/// few non-empty lines with the same number of cells is taken as the
/// value row.
pub fn column_cell(text: &str, hit: &LabelHit) -> Option<(usize, usize)> {
    let (line_start, line_end) = line_bounds(text, hit.start);
    let header = cell_spans(&text[line_start..line_end]);
    if header.len() < 2 {
        return None;
    }

    let offset = hit.start - line_start;
    let index = header.iter().position(|&(s, e)| offset >= s && offset < e)?;

    let mut pos = line_end;
    let mut checked = 0;
    while checked < COLUMN_LOOKAHEAD && pos < text.len() {
        let next_start = pos + 1;
        let next_end = text[next_start..]
            .find('\n')
            .map(|i| next_start + i)
            .unwrap_or(text.len());
        pos = next_end;

        let line = &text[next_start..next_end];
        if line.trim().is_empty() {
            continue;
        }
        checked += 1;

        let cells = cell_spans(line);
        if cells.len() == header.len() {
            let (s, e) = cells[index];
            return Some((next_start + s, next_start + e));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_find_labels_is_case_insensitive_and_whole_word() {
        let text = "TOTAL DUES 500.00\nTotal Duesx";
        let hits = find_labels(text, &["total dues"], &[]);
        assert_eq!(hits, vec![LabelHit { start: 0, end: 10 }]);
    }

    #[test]
    fn test_find_labels_skips_excluded_prefix() {
        let text = "Minimum Amount Due 200.00\nAmount Due 900.00";
        let hits = find_labels(text, &["amount due"], &["minimum", "min."]);
        assert_eq!(hits.len(), 1);
        assert_eq!(&text[hits[0].start..hits[0].end], "Amount Due");
    }

    #[test]
    fn test_find_labels_orders_by_label_first() {
        let text = "amount due 1.00  total dues 2.00";
        let hits = find_labels(text, &["total dues", "amount due"], &[]);
        assert_eq!(hits[0].start, 17);
        assert_eq!(hits[1].start, 0);
    }

    #[test]
    fn test_column_cell() {
        let text = "Payment Due Date  Total Dues  Minimum Due\n\n05/04/2024  12,345.00  1,234.00";
        let hit = find_labels(text, &["total dues"], &[])[0];
        let (s, e) = column_cell(text, &hit).unwrap();
        assert_eq!(&text[s..e], "12,345.00");
    }

    #[test]
    fn test_column_cell_needs_matching_row() {
        let text = "Total Dues  Minimum Due\nsomething else entirely";
        let hit = find_labels(text, &["total dues"], &[])[0];
        assert_eq!(column_cell(text, &hit), None);

        let single = "Total Dues\n12,345.00";
        let hit = find_labels(single, &["total dues"], &[])[0];
        assert_eq!(column_cell(single, &hit), None);
    }
}
