//! Merge report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// One input file that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMergeFileError {
    /// Failed input path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// Aggregate counters and diagnostics for one `merge_files` run.
#[derive(Debug, Default, Clone)]
pub struct ReportMerge {
    /// Input files selected for reading.
    pub cnt_matched: u64,
    /// Input files read successfully.
    pub cnt_parsed: u64,
    /// Rows in the merged output.
    pub n_rows: u64,
    /// Columns in the merged output.
    pub n_cols: u64,
    /// Written output file.
    pub path_file_out: PathBuf,
    /// Non-fatal warnings (scan issues, fallbacks).
    pub warnings: Vec<String>,
    /// Per-file read failures.
    pub errors: Vec<SpecMergeFileError>,
}

impl ReportMerge {
    /// Number of input files that failed to read.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_matched".to_string(), self.cnt_matched);
        dict_counts.insert("cnt_parsed".to_string(), self.cnt_parsed);
        dict_counts.insert("cnt_failed".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts.insert("n_rows".to_string(), self.n_rows);
        dict_counts.insert("n_cols".to_string(), self.n_cols);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} matched={} parsed={} failed={} rows={} cols={} warnings={}",
            dict_counts["cnt_matched"],
            dict_counts["cnt_parsed"],
            dict_counts["cnt_failed"],
            dict_counts["n_rows"],
            dict_counts["n_cols"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[MERGE]"))
    }
}

/// Mutable accumulator for merge statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportMergeBuilder {
    pub cnt_matched: u64,
    pub cnt_parsed: u64,
    pub warnings: Vec<String>,
    pub errors: Vec<SpecMergeFileError>,
}

impl ReportMergeBuilder {
    pub fn add_parsed(&mut self) {
        self.cnt_parsed += 1;
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        self.errors.push(SpecMergeFileError { path, exception });
    }

    /// Finalize builder with the output shape.
    pub fn build(self, path_file_out: PathBuf, n_rows: usize, n_cols: usize) -> ReportMerge {
        ReportMerge {
            cnt_matched: self.cnt_matched,
            cnt_parsed: self.cnt_parsed,
            n_rows: n_rows as u64,
            n_cols: n_cols as u64,
            path_file_out,
            warnings: self.warnings,
            errors: self.errors,
        }
    }
}
