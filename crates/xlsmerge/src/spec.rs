//! Merge options, output formats and top-level errors.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use xlsmerge_io_fs::{EnumScanPatternMode, ScanFilesError, SpecScanOptions};
use xlsmerge_io_html::SpecHtmlReadOptions;
use xlsmerge_io_xlsx::XlsxWriteError;

use crate::conf::{
    C_DIR_INPUT_DEFAULT, C_FILE_OUTPUT_DEFAULT, C_PATTERN_DEFAULT, C_SHEET_NAME_DEFAULT,
};

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EnumOutputFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// Excel workbook.
    Xlsx,
}

impl EnumOutputFormat {
    /// Guess from the file extension; anything but `.xlsx` is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|v| v.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => Self::Xlsx,
            _ => Self::Csv,
        }
    }
}

impl fmt::Display for EnumOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "CSV"),
            Self::Xlsx => write!(f, "XLSX"),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Resolved options for one [`crate::merge_files`] run.
#[derive(Debug, Clone)]
pub struct SpecMergeOptions {
    /// Directory scanned for input files.
    pub dir_input: PathBuf,
    /// Explicit input files; when non-empty the directory scan is skipped.
    pub files_input: Vec<PathBuf>,
    /// Basename pattern selecting input files.
    pub pattern: String,
    /// Basename patterns excluded from the scan.
    pub patterns_exclude: Vec<String>,
    /// How `pattern`/`patterns_exclude` are interpreted.
    pub rule_pattern: EnumScanPatternMode,
    /// Scan subdirectories too.
    pub if_recursive: bool,
    /// Match patterns ignoring ASCII case.
    pub if_case_insensitive: bool,
    /// Merged output file.
    pub file_output: PathBuf,
    /// Output format; derived from `file_output` when `None`.
    pub format: Option<EnumOutputFormat>,
    /// Prefix the CSV output with a UTF-8 BOM.
    pub if_include_bom: bool,
    /// Worksheet name for XLSX output.
    pub sheet_name: String,
    /// Maximum parse workers.
    pub num_workers_max: Option<usize>,
    /// Per-file read and normalization options.
    pub read_options: SpecHtmlReadOptions,
}

impl Default for SpecMergeOptions {
    fn default() -> Self {
        Self {
            dir_input: PathBuf::from(C_DIR_INPUT_DEFAULT),
            files_input: Vec::new(),
            pattern: C_PATTERN_DEFAULT.to_string(),
            patterns_exclude: Vec::new(),
            rule_pattern: EnumScanPatternMode::Glob,
            if_recursive: false,
            if_case_insensitive: false,
            file_output: PathBuf::from(C_FILE_OUTPUT_DEFAULT),
            format: None,
            if_include_bom: false,
            sheet_name: C_SHEET_NAME_DEFAULT.to_string(),
            num_workers_max: None,
            read_options: SpecHtmlReadOptions::default(),
        }
    }
}

impl SpecMergeOptions {
    /// Output format, falling back to the output file extension.
    pub fn resolve_format(&self) -> EnumOutputFormat {
        self.format
            .unwrap_or_else(|| EnumOutputFormat::from_path(&self.file_output))
    }

    /// Scan options equivalent to these merge options.
    pub fn derive_scan_options(&self) -> SpecScanOptions {
        SpecScanOptions {
            patterns_include_files: Some(vec![self.pattern.clone()]),
            patterns_exclude_files: Some(self.patterns_exclude.clone()),
            rule_pattern: self.rule_pattern,
            depth_limit: if self.if_recursive { None } else { Some(1) },
            if_case_insensitive: self.if_case_insensitive,
            ..SpecScanOptions::default()
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failures that abort a whole run. Per-file read failures are collected in
/// [`crate::ReportMerge`] instead.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error(transparent)]
    Scan(#[from] ScanFilesError),
    #[error("No files found matching {pattern} in {}", .dir.display())]
    NoFilesFound { pattern: String, dir: PathBuf },
    #[error("No parsable files.")]
    NoParsableFiles,
    #[error("Failed to load config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
    #[error(transparent)]
    Xlsx(#[from] XlsxWriteError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
