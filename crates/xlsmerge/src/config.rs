//! Layered run configuration: built-in defaults, then a TOML file, then CLI
//! flags. Every field is optional so each layer only overrides what it sets.
//!
//! ```toml
//! dir_input = "data/SDR_data"
//! pattern = "SDR_676_*.xls"
//! file_output = "data/processed/SDR_676_all_converted.xlsx"
//! recursive = true
//! num_workers_max = 4
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use xlsmerge_io_fs::EnumScanPatternMode;

use crate::spec::{EnumOutputFormat, MergeError, SpecMergeOptions};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecMergeConfig {
    pub dir_input: Option<PathBuf>,
    pub pattern: Option<String>,
    pub patterns_exclude: Option<Vec<String>>,
    /// `glob`, `regex` or `literal`.
    pub rule_pattern: Option<String>,
    pub recursive: Option<bool>,
    pub case_insensitive: Option<bool>,
    pub file_output: Option<PathBuf>,
    pub format: Option<EnumOutputFormat>,
    pub include_bom: Option<bool>,
    pub sheet_name: Option<String>,
    pub num_workers_max: Option<usize>,
    pub col_source: Option<String>,
    pub header_row: Option<usize>,
    #[serde(rename = "match")]
    pub pattern_match: Option<String>,
    pub displayed_only: Option<bool>,
    pub skip_empty_rows: Option<bool>,
    /// Replaces the default missing-value tokens.
    pub na_values: Option<Vec<String>>,
    pub unnamed_drop_ratio: Option<f64>,
}

impl SpecMergeConfig {
    pub fn from_toml_str(txt: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(txt)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self, MergeError> {
        let txt = fs::read_to_string(path).map_err(|e| MergeError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&txt).map_err(|e| MergeError::Config {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Overlay `other` on `self`; fields set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            dir_input: other.dir_input.or(self.dir_input),
            pattern: other.pattern.or(self.pattern),
            patterns_exclude: other.patterns_exclude.or(self.patterns_exclude),
            rule_pattern: other.rule_pattern.or(self.rule_pattern),
            recursive: other.recursive.or(self.recursive),
            case_insensitive: other.case_insensitive.or(self.case_insensitive),
            file_output: other.file_output.or(self.file_output),
            format: other.format.or(self.format),
            include_bom: other.include_bom.or(self.include_bom),
            sheet_name: other.sheet_name.or(self.sheet_name),
            num_workers_max: other.num_workers_max.or(self.num_workers_max),
            col_source: other.col_source.or(self.col_source),
            header_row: other.header_row.or(self.header_row),
            pattern_match: other.pattern_match.or(self.pattern_match),
            displayed_only: other.displayed_only.or(self.displayed_only),
            skip_empty_rows: other.skip_empty_rows.or(self.skip_empty_rows),
            na_values: other.na_values.or(self.na_values),
            unnamed_drop_ratio: other.unnamed_drop_ratio.or(self.unnamed_drop_ratio),
        }
    }

    /// Resolve into run options on top of the built-in defaults.
    ///
    /// `path_config` is only used for error messages.
    pub fn into_options(self, path_config: &Path) -> Result<SpecMergeOptions, MergeError> {
        let mut options = SpecMergeOptions::default();

        if let Some(v) = self.rule_pattern {
            options.rule_pattern = parse_rule_pattern(&v).ok_or_else(|| MergeError::Config {
                path: path_config.to_path_buf(),
                message: format!("unknown rule_pattern `{v}` (expected glob, regex or literal)"),
            })?;
        }
        if let Some(v) = self.unnamed_drop_ratio {
            if !(0.0..=1.0).contains(&v) {
                return Err(MergeError::Config {
                    path: path_config.to_path_buf(),
                    message: format!("unnamed_drop_ratio must be within [0, 1], got {v}"),
                });
            }
            options.read_options.ratio_missing_drop_unnamed = v;
        }

        if let Some(v) = self.dir_input {
            options.dir_input = v;
        }
        if let Some(v) = self.pattern {
            options.pattern = v;
        }
        if let Some(v) = self.patterns_exclude {
            options.patterns_exclude = v;
        }
        if let Some(v) = self.recursive {
            options.if_recursive = v;
        }
        if let Some(v) = self.case_insensitive {
            options.if_case_insensitive = v;
        }
        if let Some(v) = self.file_output {
            options.file_output = v;
        }
        options.format = self.format;
        if let Some(v) = self.include_bom {
            options.if_include_bom = v;
        }
        if let Some(v) = self.sheet_name {
            options.sheet_name = v;
        }
        options.num_workers_max = self.num_workers_max;
        if let Some(v) = self.col_source {
            options.read_options.col_source_name = v;
        }
        if let Some(v) = self.header_row {
            options.read_options.idx_header_row = v;
        }
        if let Some(v) = self.pattern_match {
            if let Err(e) = Regex::new(&v) {
                return Err(MergeError::Config {
                    path: path_config.to_path_buf(),
                    message: format!("invalid match pattern `{v}`: {e}"),
                });
            }
            options.read_options.pattern_match = v;
        }
        if let Some(v) = self.displayed_only {
            options.read_options.if_displayed_only = v;
        }
        if let Some(v) = self.skip_empty_rows {
            options.read_options.if_skip_empty_rows = v;
        }
        if let Some(v) = self.na_values {
            options.read_options.na_values = v.into_iter().collect();
        }

        Ok(options)
    }
}

fn parse_rule_pattern(txt: &str) -> Option<EnumScanPatternMode> {
    match txt.to_ascii_lowercase().as_str() {
        "glob" => Some(EnumScanPatternMode::Glob),
        "regex" => Some(EnumScanPatternMode::Regex),
        "literal" => Some(EnumScanPatternMode::Literal),
        _ => None,
    }
}
