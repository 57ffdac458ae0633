//! HTML-table reader constants.

/// Column appended to every table to record the originating file name.
pub const C_COL_SOURCE_DEFAULT: &str = "SourceFile";
/// Prefix given to header cells that carry no text.
pub const C_PREFIX_UNNAMED_DEFAULT: &str = "Unnamed";
/// Tables whose text does not match this pattern are ignored.
pub const C_PATTERN_MATCH_DEFAULT: &str = ".+";
/// Share of missing values above which a leading unnamed column is dropped.
pub const R_MISSING_DROP_UNNAMED_DEFAULT: f64 = 0.9;

/// Cell texts read as missing values in data rows.
pub const L_NA_VALUES_DEFAULT: [&str; 18] = [
    "-1.#IND", "1.#QNAN", "1.#IND", "-1.#QNAN", "#N/A N/A", "#N/A", "N/A", "n/a", "NA", "<NA>",
    "#NA", "NULL", "null", "NaN", "-NaN", "nan", "-nan", "None",
];

/// Bytes inspected for a `<meta charset>` declaration.
pub const N_LEN_CHARSET_SNIFF: usize = 1_024;

/// Browser limits for span attributes.
pub const N_COLSPAN_MAX: usize = 1_000;
pub const N_ROWSPAN_MAX: usize = 65_534;
