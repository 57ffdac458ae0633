//! `xlsmerge_io_html` v1:
//! Table extraction for "spreadsheets" that are really HTML documents.
//!
//! - `conf`   : constants and default names
//! - `spec`   : table model, read options, errors
//! - `util`   : byte decoding, span and header helpers
//! - `reader` : table extraction, selection and column normalization

pub mod conf;
pub mod reader;
pub mod spec;
pub mod util;

pub use conf::{
    C_COL_SOURCE_DEFAULT, C_PATTERN_MATCH_DEFAULT, C_PREFIX_UNNAMED_DEFAULT, L_NA_VALUES_DEFAULT,
};
pub use reader::{extract_tables, normalize_columns, pick_largest_table, read_htmlish_xls};
pub use spec::{HtmlTableError, SpecHtmlReadOptions, SpecHtmlTable};
pub use util::{decode_html_bytes, sniff_meta_charset};
