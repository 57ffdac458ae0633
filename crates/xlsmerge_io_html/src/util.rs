//! Stateless helpers used by the HTML table reader.

use std::collections::{HashMap, VecDeque};

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use regex::bytes::Regex;

use crate::conf::{N_COLSPAN_MAX, N_LEN_CHARSET_SNIFF, N_ROWSPAN_MAX};

////////////////////////////////////////////////////////////////////////////////
// #region Decoding

/// Decode raw file bytes into text.
///
/// Encoding is resolved in order: byte-order mark, then a `<meta charset>`
/// (or `http-equiv` content type) in the first bytes of the document, then
/// UTF-8. Invalid sequences are replaced.
pub fn decode_html_bytes(v_bytes: &[u8]) -> String {
    if let Some((encoding, n_len_bom)) = Encoding::for_bom(v_bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&v_bytes[n_len_bom..]);
        return text.into_owned();
    }

    let v_bytes_head = &v_bytes[..v_bytes.len().min(N_LEN_CHARSET_SNIFF)];
    let encoding = sniff_meta_charset(v_bytes_head).unwrap_or(UTF_8);
    let (text, _, if_had_errors) = encoding.decode(v_bytes);
    if if_had_errors {
        tracing::debug!("replaced malformed {} sequences", encoding.name());
    }
    text.into_owned()
}

/// Encoding named by a `<meta>` tag in `v_bytes_head`, if any.
///
/// A declared UTF-16 label means UTF-8 here: without a BOM the bytes read so
/// far were ASCII-compatible.
pub fn sniff_meta_charset(v_bytes_head: &[u8]) -> Option<&'static Encoding> {
    let regex_charset =
        Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_.:\-]+)"#).ok()?;
    let caps = regex_charset.captures(v_bytes_head)?;
    let encoding = Encoding::for_label(caps.get(1)?.as_bytes())?;
    if encoding == UTF_16LE || encoding == UTF_16BE {
        return Some(UTF_8);
    }
    Some(encoding)
}

/// Collapse whitespace runs to one space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Spans

/// One raw `<td>`/`<th>` before span expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRawCell {
    pub text: Option<String>,
    pub colspan: usize,
    pub rowspan: usize,
}

impl SpecRawCell {
    pub fn new(text: &str, colspan: Option<&str>, rowspan: Option<&str>) -> Self {
        Self {
            text: Some(text).filter(|v| !v.is_empty()).map(ToString::to_string),
            colspan: parse_span(colspan, N_COLSPAN_MAX),
            rowspan: parse_span(rowspan, N_ROWSPAN_MAX),
        }
    }
}

/// Parse a span attribute; missing, malformed or zero values count as 1.
pub fn parse_span(value: Option<&str>, n_max: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v >= 1)
        .map_or(1, |v| v.min(n_max))
}

/// Expand `colspan`/`rowspan` by repeating the cell text into every
/// covered slot.
///
/// Rows that only exist because of a trailing `rowspan` are appended.
pub fn expand_spans(l_rows_raw: Vec<Vec<SpecRawCell>>) -> Vec<Vec<Option<String>>> {
    // (column index, text, rows still to fill)
    type TypePending = (usize, Option<String>, usize);

    let mut l_rows: Vec<Vec<Option<String>>> = Vec::with_capacity(l_rows_raw.len());
    let mut q_remainder: VecDeque<TypePending> = VecDeque::new();

    for l_cells in l_rows_raw {
        let mut l_texts: Vec<Option<String>> = Vec::new();
        let mut q_remainder_next: VecDeque<TypePending> = VecDeque::new();
        let mut n_idx = 0usize;

        for cell in l_cells {
            while q_remainder
                .front()
                .is_some_and(|(n_idx_prev, _, _)| *n_idx_prev <= n_idx)
            {
                let Some((n_idx_prev, text_prev, n_rowspan_prev)) = q_remainder.pop_front()
                else {
                    break;
                };
                l_texts.push(text_prev.clone());
                if n_rowspan_prev > 1 {
                    q_remainder_next.push_back((n_idx_prev, text_prev, n_rowspan_prev - 1));
                }
                n_idx += 1;
            }

            for _ in 0..cell.colspan {
                l_texts.push(cell.text.clone());
                if cell.rowspan > 1 {
                    q_remainder_next.push_back((n_idx, cell.text.clone(), cell.rowspan - 1));
                }
                n_idx += 1;
            }
        }

        for (n_idx_prev, text_prev, n_rowspan_prev) in q_remainder.drain(..) {
            l_texts.push(text_prev.clone());
            if n_rowspan_prev > 1 {
                q_remainder_next.push_back((n_idx_prev, text_prev, n_rowspan_prev - 1));
            }
        }

        l_rows.push(l_texts);
        q_remainder = q_remainder_next;
    }

    while !q_remainder.is_empty() {
        let mut l_texts: Vec<Option<String>> = Vec::new();
        let mut q_remainder_next: VecDeque<TypePending> = VecDeque::new();
        for (n_idx_prev, text_prev, n_rowspan_prev) in q_remainder.drain(..) {
            l_texts.push(text_prev.clone());
            if n_rowspan_prev > 1 {
                q_remainder_next.push_back((n_idx_prev, text_prev, n_rowspan_prev - 1));
            }
        }
        l_rows.push(l_texts);
        q_remainder = q_remainder_next;
    }

    l_rows
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnNames

/// Build `n_width` header names from a header row.
///
/// Blank cells become `"{prefix}: {idx}"`, then duplicates are mangled.
pub fn derive_header_names(
    row_header: &[Option<String>],
    n_width: usize,
    prefix_unnamed: &str,
) -> Vec<String> {
    let l_names: Vec<String> = (0..n_width)
        .map(|n_idx| match row_header.get(n_idx) {
            Some(Some(text)) => text.clone(),
            _ => format!("{prefix_unnamed}: {n_idx}"),
        })
        .collect();
    mangle_duplicate_names(&l_names)
}

/// Rename repeated names the way pandas does: the second `x` becomes `x.1`,
/// and a generated name that is itself taken gets suffixed again
/// (`x.1` -> `x.1.1`).
pub fn mangle_duplicate_names(l_names: &[String]) -> Vec<String> {
    let mut dict_cnt_seen: HashMap<String, usize> = HashMap::new();
    let mut l_names_out = Vec::with_capacity(l_names.len());

    for name in l_names {
        let mut name_out = name.clone();
        let mut n_cnt = dict_cnt_seen.get(&name_out).copied().unwrap_or(0);
        while n_cnt > 0 {
            dict_cnt_seen.insert(name_out.clone(), n_cnt + 1);
            name_out = format!("{name_out}.{n_cnt}");
            n_cnt = dict_cnt_seen.get(&name_out).copied().unwrap_or(0);
        }
        dict_cnt_seen.insert(name_out.clone(), n_cnt + 1);
        l_names_out.push(name_out);
    }

    l_names_out
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Styles

/// Whether an inline `style` attribute hides the element.
pub fn is_hidden_style(style: &str) -> bool {
    let style_compact: String = style
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    style_compact.contains("display:none")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str, colspan: usize, rowspan: usize) -> SpecRawCell {
        SpecRawCell::new(
            text,
            Some(colspan.to_string().as_str()),
            Some(rowspan.to_string().as_str()),
        )
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<Option<String>>> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|v| Some(v.to_string()).filter(|s| !s.is_empty()))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_decode_html_bytes_boms() {
        assert_eq!(decode_html_bytes(b"\xEF\xBB\xBF<table>"), "<table>");
        assert_eq!(decode_html_bytes(b"\xFF\xFEa\x00b\x00"), "ab");
        assert_eq!(decode_html_bytes(b"\xFE\xFF\x00a\x00b"), "ab");
        assert_eq!(decode_html_bytes(b"plain"), "plain");
    }

    #[test]
    fn test_decode_html_bytes_meta_charset() {
        let v_bytes = b"<html><head><meta http-equiv=Content-Type content=\"text/html; charset=windows-1252\"></head><td>Caf\xE9</td>";
        assert!(decode_html_bytes(v_bytes).ends_with("<td>Caf\u{e9}</td>"));

        let v_bytes = b"<meta charset='ISO-8859-1'><td>\xC4pfel</td>";
        assert!(decode_html_bytes(v_bytes).contains("\u{c4}pfel"));

        let v_bytes = "<meta charset=\"utf-16\"><td>Caf\u{e9}</td>".as_bytes();
        assert!(decode_html_bytes(v_bytes).contains("Caf\u{e9}"));
    }

    #[test]
    fn test_decode_html_bytes_bom_beats_meta() {
        let v_bytes = "\u{feff}<meta charset=windows-1252><td>Caf\u{e9}</td>".as_bytes();
        assert!(decode_html_bytes(v_bytes).contains("Caf\u{e9}"));
    }

    #[test]
    fn test_sniff_meta_charset() {
        assert_eq!(sniff_meta_charset(b"<p>no meta</p>"), None);
        assert_eq!(sniff_meta_charset(b"<META CHARSET=\"bogus\">"), None);
        assert_eq!(
            sniff_meta_charset(b"<meta charset=\"Shift_JIS\">"),
            Some(encoding_rs::SHIFT_JIS)
        );
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace(" \u{a0} "), "");
    }

    #[test]
    fn test_parse_span_bounds() {
        assert_eq!(parse_span(None, 10), 1);
        assert_eq!(parse_span(Some("0"), 10), 1);
        assert_eq!(parse_span(Some("x"), 10), 1);
        assert_eq!(parse_span(Some(" 3 "), 10), 3);
        assert_eq!(parse_span(Some("99"), 10), 10);
    }

    #[test]
    fn test_expand_colspan() {
        let l_rows = expand_spans(vec![
            vec![cell("A", 2, 1), cell("B", 1, 1)],
            vec![cell("1", 1, 1), cell("2", 1, 1), cell("3", 1, 1)],
        ]);
        assert_eq!(l_rows, grid(&[&["A", "A", "B"], &["1", "2", "3"]]));
    }

    #[test]
    fn test_expand_rowspan_in_middle_and_tail() {
        let l_rows = expand_spans(vec![
            vec![cell("A", 1, 1), cell("B", 1, 2), cell("C", 1, 1)],
            vec![cell("1", 1, 1), cell("3", 1, 1)],
        ]);
        assert_eq!(l_rows, grid(&[&["A", "B", "C"], &["1", "B", "3"]]));

        let l_rows = expand_spans(vec![vec![cell("A", 1, 1), cell("Z", 1, 3)]]);
        assert_eq!(l_rows, grid(&[&["A", "Z"], &["Z"], &["Z"]]));
    }

    #[test]
    fn test_expand_rowspan_at_row_end() {
        let l_rows = expand_spans(vec![
            vec![cell("A", 1, 1), cell("B", 1, 2)],
            vec![cell("1", 1, 1)],
        ]);
        assert_eq!(l_rows, grid(&[&["A", "B"], &["1", "B"]]));
    }

    #[test]
    fn test_derive_header_names_unnamed_and_duplicates() {
        let row_header = vec![
            None,
            Some("Qty".to_string()),
            Some("Qty".to_string()),
            Some("Qty.1".to_string()),
        ];
        assert_eq!(
            derive_header_names(&row_header, 5, "Unnamed"),
            vec!["Unnamed: 0", "Qty", "Qty.1", "Qty.1.1", "Unnamed: 4"]
        );
    }

    #[test]
    fn test_mangle_duplicate_names_repeats() {
        let l_names: Vec<String> = ["a", "a", "a", "a.1", "b"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            mangle_duplicate_names(&l_names),
            vec!["a", "a.1", "a.2", "a.1.1", "b"]
        );
    }

    #[test]
    fn test_is_hidden_style() {
        assert!(is_hidden_style("color: red; DISPLAY : none"));
        assert!(!is_hidden_style("display: block"));
    }
}
