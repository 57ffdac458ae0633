//! HTML table models, read options and errors.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::conf::{
    C_COL_SOURCE_DEFAULT, C_PATTERN_MATCH_DEFAULT, C_PREFIX_UNNAMED_DEFAULT, L_NA_VALUES_DEFAULT,
    R_MISSING_DROP_UNNAMED_DEFAULT,
};

/// One `<table>` flattened into a rectangular-ish grid.
///
/// Spans are already expanded. `None` marks a cell without text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecHtmlTable {
    pub rows: Vec<Vec<Option<String>>>,
}

impl SpecHtmlTable {
    /// Number of rows after the header row.
    pub fn height_data(&self, idx_header_row: usize) -> usize {
        self.rows.len().saturating_sub(idx_header_row + 1)
    }

    /// Widest row in the grid.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Options for [`crate::read_htmlish_xls`] and its building blocks.
#[derive(Debug, Clone)]
pub struct SpecHtmlReadOptions {
    /// Row used as header; earlier rows are discarded.
    pub idx_header_row: usize,
    /// Regex that a table's text must match to be kept.
    pub pattern_match: String,
    /// Skip elements styled `display: none`.
    pub if_displayed_only: bool,
    /// Skip `<tr>` rows that contain no cells.
    pub if_skip_empty_rows: bool,
    /// Data cell texts treated as missing. Empty cells are always missing.
    pub na_values: HashSet<String>,
    /// Name of the appended source-file column.
    pub col_source_name: String,
    /// Prefix used for header cells without text.
    pub prefix_unnamed: String,
    /// Drop a leading unnamed column when its missing share exceeds this value.
    pub ratio_missing_drop_unnamed: f64,
}

impl Default for SpecHtmlReadOptions {
    fn default() -> Self {
        Self {
            idx_header_row: 0,
            pattern_match: C_PATTERN_MATCH_DEFAULT.to_string(),
            if_displayed_only: true,
            if_skip_empty_rows: true,
            na_values: L_NA_VALUES_DEFAULT.iter().map(ToString::to_string).collect(),
            col_source_name: C_COL_SOURCE_DEFAULT.to_string(),
            prefix_unnamed: C_PREFIX_UNNAMED_DEFAULT.to_string(),
            ratio_missing_drop_unnamed: R_MISSING_DROP_UNNAMED_DEFAULT,
        }
    }
}

/// Per-file read failures.
#[derive(Debug, thiserror::Error)]
pub enum HtmlTableError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid table match pattern: {0}")]
    InvalidPattern(String),
    #[error("No tables found in the file.")]
    NoTables,
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
}
