//! Built-in defaults used when neither a config file nor a flag sets a value.

/// Directory scanned for input files.
pub const C_DIR_INPUT_DEFAULT: &str = "data/SDR_data";
/// Basename glob selecting the input files.
pub const C_PATTERN_DEFAULT: &str = "SDR_676_*.xls";
/// Merged output file.
pub const C_FILE_OUTPUT_DEFAULT: &str = "data/processed/SDR_676_all_converted.csv";
/// Worksheet name used for `.xlsx` output.
pub const C_SHEET_NAME_DEFAULT: &str = "merged";
