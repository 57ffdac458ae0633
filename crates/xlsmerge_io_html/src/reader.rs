//! HTML table extraction, table selection and column normalization.

use std::fs;
use std::path::Path;

use polars::prelude::{Column, DataFrame, PlSmallStr, PolarsResult};
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::spec::{HtmlTableError, SpecHtmlReadOptions, SpecHtmlTable};
use crate::util::{
    SpecRawCell, collapse_whitespace, decode_html_bytes, derive_header_names, expand_spans,
    is_hidden_style, mangle_duplicate_names,
};

////////////////////////////////////////////////////////////////////////////////
// #region Extraction

/// Extract every `<table>` (nested ones included) in document order.
///
/// Row order per table is `thead`, then body rows (`tbody` and bare `tr`),
/// then `tfoot`. Only direct rows/cells of a table belong to it, so a nested
/// table never leaks rows into its parent. Tables whose text does not match
/// `pattern_match` are dropped.
pub fn extract_tables(
    html: &str,
    options: &SpecHtmlReadOptions,
) -> Result<Vec<SpecHtmlTable>, HtmlTableError> {
    let regex_match = Regex::new(&options.pattern_match)
        .map_err(|e| HtmlTableError::InvalidPattern(e.to_string()))?;
    let selector_table =
        Selector::parse("table").map_err(|e| HtmlTableError::InvalidPattern(e.to_string()))?;

    let document = Html::parse_document(html);
    let mut l_tables = Vec::new();

    for el_table in document.select(&selector_table) {
        if options.if_displayed_only && is_hidden_or_in_hidden(el_table) {
            continue;
        }

        let mut text_table = String::new();
        collect_text(el_table, options.if_displayed_only, &mut text_table);
        if !regex_match.is_match(&text_table) {
            continue;
        }

        let l_rows_raw = collect_rows(el_table, options.if_displayed_only)
            .into_iter()
            .map(|el_row| collect_cells(el_row, options.if_displayed_only))
            .collect::<Vec<_>>();
        let mut l_rows = expand_spans(l_rows_raw);
        if options.if_skip_empty_rows {
            l_rows.retain(|row| !row.is_empty());
        }
        l_tables.push(SpecHtmlTable { rows: l_rows });
    }

    tracing::debug!("extracted {} table(s)", l_tables.len());
    Ok(l_tables)
}

fn collect_rows(el_table: ElementRef<'_>, if_displayed_only: bool) -> Vec<ElementRef<'_>> {
    let mut l_rows_head = Vec::new();
    let mut l_rows_body = Vec::new();
    let mut l_rows_foot = Vec::new();

    for el_child in child_elements(el_table, if_displayed_only) {
        match el_child.value().name() {
            "tr" => l_rows_body.push(el_child),
            "thead" => l_rows_head.extend(child_rows(el_child, if_displayed_only)),
            "tbody" => l_rows_body.extend(child_rows(el_child, if_displayed_only)),
            "tfoot" => l_rows_foot.extend(child_rows(el_child, if_displayed_only)),
            _ => {}
        }
    }

    l_rows_head.extend(l_rows_body);
    l_rows_head.extend(l_rows_foot);
    l_rows_head
}

fn child_rows(el_section: ElementRef<'_>, if_displayed_only: bool) -> Vec<ElementRef<'_>> {
    child_elements(el_section, if_displayed_only)
        .filter(|el| el.value().name() == "tr")
        .collect()
}

fn collect_cells(el_row: ElementRef<'_>, if_displayed_only: bool) -> Vec<SpecRawCell> {
    child_elements(el_row, if_displayed_only)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .map(|el_cell| {
            let mut text_cell = String::new();
            collect_text(el_cell, if_displayed_only, &mut text_cell);
            SpecRawCell::new(
                &collapse_whitespace(&text_cell),
                el_cell.value().attr("colspan"),
                el_cell.value().attr("rowspan"),
            )
        })
        .collect()
}

fn child_elements(
    el_parent: ElementRef<'_>,
    if_displayed_only: bool,
) -> impl Iterator<Item = ElementRef<'_>> {
    el_parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| !(if_displayed_only && is_styled_hidden(*el)))
}

fn collect_text(el: ElementRef<'_>, if_displayed_only: bool, text_out: &mut String) {
    for node in el.children() {
        match node.value() {
            Node::Text(text) => text_out.push_str(text),
            Node::Element(_) => {
                let Some(el_child) = ElementRef::wrap(node) else {
                    continue;
                };
                if if_displayed_only && is_styled_hidden(el_child) {
                    continue;
                }
                collect_text(el_child, if_displayed_only, text_out);
            }
            _ => {}
        }
    }
}

fn is_styled_hidden(el: ElementRef<'_>) -> bool {
    el.value().attr("style").is_some_and(is_hidden_style)
}

fn is_hidden_or_in_hidden(el: ElementRef<'_>) -> bool {
    is_styled_hidden(el)
        || el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(is_styled_hidden)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Selection

/// Index of the table with the most data rows; the first one wins ties.
pub fn pick_largest_table(l_tables: &[SpecHtmlTable], idx_header_row: usize) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (n_idx, table) in l_tables.iter().enumerate() {
        let n_height = table.height_data(idx_header_row);
        if best.is_none_or(|(_, n_height_best)| n_height > n_height_best) {
            best = Some((n_idx, n_height));
        }
    }
    best.map(|(n_idx, _)| n_idx)
}

impl SpecHtmlTable {
    /// Convert the grid into a `String`-typed frame.
    ///
    /// Rows before `idx_header_row` are discarded, short rows are padded
    /// with nulls and the width follows the widest remaining row. Data
    /// cells listed in `na_values` become null; header cells are kept.
    pub fn to_dataframe(&self, options: &SpecHtmlReadOptions) -> PolarsResult<DataFrame> {
        let l_rows_tail = self.rows.get(options.idx_header_row..).unwrap_or(&[]);
        let n_width = l_rows_tail.iter().map(Vec::len).max().unwrap_or(0);
        let row_header = l_rows_tail.first().map(Vec::as_slice).unwrap_or(&[]);
        let l_names = derive_header_names(row_header, n_width, &options.prefix_unnamed);
        let l_rows_data = l_rows_tail.get(1..).unwrap_or(&[]);

        let l_columns: Vec<Column> = l_names
            .iter()
            .enumerate()
            .map(|(n_idx_col, name)| {
                let l_values: Vec<Option<String>> = l_rows_data
                    .iter()
                    .map(|row| {
                        row.get(n_idx_col)
                            .cloned()
                            .flatten()
                            .filter(|text| !options.na_values.contains(text))
                    })
                    .collect();
                Column::new(PlSmallStr::from(name.as_str()), l_values)
            })
            .collect();
        DataFrame::new(l_columns)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Normalization

/// Strip column names, drop a mostly-empty leading unnamed column and tag
/// every row with `name_source`.
pub fn normalize_columns(
    mut df: DataFrame,
    name_source: &str,
    options: &SpecHtmlReadOptions,
) -> PolarsResult<DataFrame> {
    let l_names: Vec<String> = df
        .get_column_names_str()
        .into_iter()
        .map(|name| name.trim().to_string())
        .collect();
    let l_names = mangle_duplicate_names(&l_names);
    df.set_column_names(l_names.iter().map(String::as_str))?;

    if let Some(name_first) = l_names.first()
        && name_first.starts_with(&options.prefix_unnamed)
        && df.height() > 0
    {
        let n_missing = df.column(name_first)?.null_count();
        let r_missing = n_missing as f64 / df.height() as f64;
        if r_missing > options.ratio_missing_drop_unnamed {
            tracing::debug!(
                "dropping leading column {name_first:?} ({n_missing}/{} missing)",
                df.height()
            );
            df = df.drop(name_first)?;
        }
    }

    let col_source = Column::new(
        PlSmallStr::from(options.col_source_name.as_str()),
        vec![name_source; df.height()],
    );
    df.with_column(col_source)?;
    Ok(df)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileReader

/// Read one HTML-as-`.xls` file into its largest table, normalized and
/// tagged with the file's base name.
pub fn read_htmlish_xls<P: AsRef<Path>>(
    path_file: P,
    options: &SpecHtmlReadOptions,
) -> Result<DataFrame, HtmlTableError> {
    let path_file = path_file.as_ref();
    let v_bytes = fs::read(path_file).map_err(|source| HtmlTableError::Io {
        path: path_file.to_path_buf(),
        source,
    })?;
    let html = decode_html_bytes(&v_bytes);

    let l_tables = extract_tables(&html, options)?;
    let n_idx_largest =
        pick_largest_table(&l_tables, options.idx_header_row).ok_or(HtmlTableError::NoTables)?;
    tracing::debug!(
        "{}: picked table #{n_idx_largest} of {}",
        path_file.display(),
        l_tables.len()
    );

    let df = l_tables[n_idx_largest].to_dataframe(options)?;
    let name_source = path_file
        .file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(normalize_columns(df, &name_source, options)?)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn col_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .expect("column")
            .as_materialized_series()
            .str()
            .expect("str column")
            .into_iter()
            .map(|v| v.map(ToString::to_string))
            .collect()
    }

    fn some(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| Some(v.to_string()).filter(|s| !s.is_empty()))
            .collect()
    }

    #[test]
    fn test_extract_tables_orders_sections_and_skips_nested_rows() {
        let html = r#"
            <html><body>
            <table>
              <tfoot><tr><td>total</td><td>3</td></tr></tfoot>
              <tbody>
                <tr><td>a</td><td><table><tr><td>inner</td></tr></table></td></tr>
              </tbody>
              <thead><tr><th> Name </th><th>Qty</th></tr></thead>
            </table>
            </body></html>
        "#;
        let l_tables = extract_tables(html, &SpecHtmlReadOptions::default()).expect("extract");
        assert_eq!(l_tables.len(), 2);
        assert_eq!(
            l_tables[0].rows,
            vec![some(&["Name", "Qty"]), some(&["a", "inner"]), some(&["total", "3"])]
        );
        assert_eq!(l_tables[1].rows, vec![some(&["inner"])]);
    }

    #[test]
    fn test_extract_tables_skips_hidden_and_unmatched() {
        let html = r#"
            <table style="display: none"><tr><td>hidden</td></tr></table>
            <table><tr><td>keep <span style="display:none">secret</span></td></tr>
                   <tr style="display:none"><td>gone</td></tr></table>
            <table><tr><td>other</td></tr></table>
        "#;
        let options = SpecHtmlReadOptions {
            pattern_match: "keep".to_string(),
            ..SpecHtmlReadOptions::default()
        };
        let l_tables = extract_tables(html, &options).expect("extract");
        assert_eq!(l_tables.len(), 1);
        assert_eq!(l_tables[0].rows, vec![some(&["keep"])]);
    }

    #[test]
    fn test_extract_tables_rejects_bad_pattern() {
        let options = SpecHtmlReadOptions {
            pattern_match: "(".to_string(),
            ..SpecHtmlReadOptions::default()
        };
        assert!(matches!(
            extract_tables("<table></table>", &options),
            Err(HtmlTableError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_pick_largest_table_first_wins_ties() {
        let t = |n: usize| SpecHtmlTable {
            rows: vec![some(&["x"]); n],
        };
        let l_tables = vec![t(2), t(5), t(5), t(1)];
        assert_eq!(pick_largest_table(&l_tables, 0), Some(1));
        assert_eq!(pick_largest_table(&[], 0), None);
    }

    #[test]
    fn test_to_dataframe_pads_rows_and_names_blank_headers() {
        let table = SpecHtmlTable {
            rows: vec![
                some(&["", "A", "A"]),
                some(&["1", "x"]),
                some(&["2", "y", "z", "extra"]),
            ],
        };
        let df = table
            .to_dataframe(&SpecHtmlReadOptions::default())
            .expect("frame");
        assert_eq!(
            df.get_column_names_str(),
            vec!["Unnamed: 0", "A", "A.1", "Unnamed: 3"]
        );
        assert_eq!(df.height(), 2);
        assert_eq!(col_values(&df, "A.1"), vec![None, Some("z".to_string())]);
        assert_eq!(col_values(&df, "Unnamed: 3"), vec![None, Some("extra".to_string())]);
    }

    #[test]
    fn test_to_dataframe_reads_na_tokens_as_missing() {
        let table = SpecHtmlTable {
            rows: vec![
                some(&["", "V", "NA"]),
                some(&["NaN", "N/A", "1"]),
                some(&["nan", "ok", "None"]),
            ],
        };
        let options = SpecHtmlReadOptions::default();
        let df = table.to_dataframe(&options).expect("frame");
        assert_eq!(df.get_column_names_str(), vec!["Unnamed: 0", "V", "NA"]);
        assert_eq!(df.column("V").expect("column").null_count(), 1);
        assert_eq!(col_values(&df, "NA"), vec![Some("1".to_string()), None]);

        let df = normalize_columns(df, "f.xls", &options).expect("normalize");
        assert_eq!(df.get_column_names_str(), vec!["V", "NA", "SourceFile"]);
    }

    #[test]
    fn test_to_dataframe_custom_na_values() {
        let table = SpecHtmlTable {
            rows: vec![some(&["V"]), some(&["-"]), some(&["NaN"])],
        };
        let options = SpecHtmlReadOptions {
            na_values: ["-".to_string()].into_iter().collect(),
            ..SpecHtmlReadOptions::default()
        };
        let df = table.to_dataframe(&options).expect("frame");
        assert_eq!(col_values(&df, "V"), vec![None, Some("NaN".to_string())]);
    }

    #[test]
    fn test_to_dataframe_header_row_after_title() {
        let table = SpecHtmlTable {
            rows: vec![some(&["Monthly report"]), some(&["A", "B"]), some(&["1", "2"])],
        };
        let options = SpecHtmlReadOptions {
            idx_header_row: 1,
            ..SpecHtmlReadOptions::default()
        };
        assert_eq!(table.height_data(1), 1);
        let df = table.to_dataframe(&options).expect("frame");
        assert_eq!(df.get_column_names_str(), vec!["A", "B"]);
        assert_eq!(df.height(), 1);
        assert_eq!(col_values(&df, "B"), some(&["2"]));
    }

    #[test]
    fn test_extract_tables_blank_rows() {
        let html = r#"<table>
            <tr><th>A</th><th>B</th></tr>
            <tr></tr>
            <tr><td></td><td> </td></tr>
            <tr><td>1</td><td>2</td></tr>
        </table>"#;

        let options = SpecHtmlReadOptions::default();
        let l_tables = extract_tables(html, &options).expect("extract");
        assert_eq!(
            l_tables[0].rows,
            vec![some(&["A", "B"]), vec![None, None], some(&["1", "2"])]
        );
        let df = l_tables[0].to_dataframe(&options).expect("frame");
        assert_eq!(df.height(), 2);
        assert_eq!(col_values(&df, "A"), vec![None, Some("1".to_string())]);

        let options = SpecHtmlReadOptions {
            if_skip_empty_rows: false,
            ..SpecHtmlReadOptions::default()
        };
        let l_tables = extract_tables(html, &options).expect("extract");
        assert_eq!(l_tables[0].rows.len(), 4);
        assert!(l_tables[0].rows[1].is_empty());
        let df = l_tables[0].to_dataframe(&options).expect("frame");
        assert_eq!(df.height(), 3);
        assert_eq!(df.column("B").expect("column").null_count(), 2);
    }

    #[test]
    fn test_normalize_columns_drops_mostly_empty_unnamed() {
        let mut l_rows = vec![some(&["", "Value"])];
        for n_idx in 0..10 {
            l_rows.push(some(&["", &n_idx.to_string()]));
        }
        let options = SpecHtmlReadOptions::default();
        let df = SpecHtmlTable { rows: l_rows }
            .to_dataframe(&options)
            .expect("frame");
        let df = normalize_columns(df, "SDR_676_202509.xls", &options).expect("normalize");

        assert_eq!(df.get_column_names_str(), vec!["Value", "SourceFile"]);
        assert_eq!(
            col_values(&df, "SourceFile"),
            vec![Some("SDR_676_202509.xls".to_string()); 10]
        );
    }

    #[test]
    fn test_normalize_columns_keeps_unnamed_at_threshold() {
        let mut l_rows = vec![some(&["", "Value"]), some(&["idx", "v"])];
        for _ in 0..9 {
            l_rows.push(some(&["", "v"]));
        }
        let options = SpecHtmlReadOptions::default();
        let df = SpecHtmlTable { rows: l_rows }
            .to_dataframe(&options)
            .expect("frame");
        let df = normalize_columns(df, "f.xls", &options).expect("normalize");
        assert_eq!(
            df.get_column_names_str(),
            vec!["Unnamed: 0", "Value", "SourceFile"]
        );
    }

    #[test]
    fn test_normalize_columns_on_empty_frame() {
        let options = SpecHtmlReadOptions::default();
        let df = SpecHtmlTable {
            rows: vec![some(&["", "B"])],
        }
        .to_dataframe(&options)
        .expect("frame");
        let df = normalize_columns(df, "f.xls", &options).expect("normalize");
        assert_eq!(df.height(), 0);
        assert_eq!(
            df.get_column_names_str(),
            vec!["Unnamed: 0", "B", "SourceFile"]
        );
    }

    #[test]
    fn test_read_htmlish_xls_file() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let path_file = tmp.path().join("SDR_676_202509.xls");
        let html = r#"<html><body>
            <table><tr><td>Report</td></tr></table>
            <table>
              <tr><th></th><th>Region</th><th colspan="2">Sales</th></tr>
              <tr><td></td><td rowspan="2">North</td><td>1</td><td>2</td></tr>
              <tr><td></td><td>3</td><td>4</td></tr>
            </table></body></html>"#;
        let mut v_bytes = vec![0xEF, 0xBB, 0xBF];
        v_bytes.extend_from_slice(html.as_bytes());
        std::fs::write(&path_file, v_bytes).expect("write");

        let df = read_htmlish_xls(&path_file, &SpecHtmlReadOptions::default()).expect("read");
        assert_eq!(
            df.get_column_names_str(),
            vec!["Region", "Sales", "Sales.1", "SourceFile"]
        );
        assert_eq!(col_values(&df, "Region"), some(&["North", "North"]));
        assert_eq!(col_values(&df, "Sales.1"), some(&["2", "4"]));
    }

    #[test]
    fn test_read_htmlish_xls_declared_windows_1252() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let path_file = tmp.path().join("SDR_676_cp1252.xls");
        let mut v_bytes = b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\"></head><body><table><tr><th>Name</th></tr><tr><td>Caf".to_vec();
        v_bytes.push(0xE9);
        v_bytes.extend_from_slice(b"</td></tr></table></body></html>");
        std::fs::write(&path_file, v_bytes).expect("write");

        let df = read_htmlish_xls(&path_file, &SpecHtmlReadOptions::default()).expect("read");
        assert_eq!(col_values(&df, "Name"), some(&["Caf\u{e9}"]));
    }

    #[test]
    fn test_read_htmlish_xls_without_tables() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let path_file = tmp.path().join("empty.xls");
        std::fs::write(&path_file, "<html><body><p>nothing</p></body></html>").expect("write");

        let res = read_htmlish_xls(&path_file, &SpecHtmlReadOptions::default());
        assert!(matches!(res, Err(HtmlTableError::NoTables)));

        let res = read_htmlish_xls(tmp.path().join("missing.xls"), &SpecHtmlReadOptions::default());
        assert!(matches!(res, Err(HtmlTableError::Io { .. })));
    }
}
