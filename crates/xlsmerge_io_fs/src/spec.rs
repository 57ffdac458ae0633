//! Scan specification models and top-level error types.

use std::path::PathBuf;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Pattern matching mode for include/exclude lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumScanPatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes).
    #[default]
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match.
    Literal,
}

/// Depth filter mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumScanDepthLimitMode {
    /// Include entries with depth `<= depth_limit`.
    #[default]
    AtMost,
    /// Include entries with depth exactly equal to `depth_limit`.
    Exact,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for [`crate::scan_files`].
#[derive(Debug, Clone)]
pub struct SpecScanOptions {
    /// Include patterns applied to file basename. `None`/empty keeps every file.
    pub patterns_include_files: Option<Vec<String>>,
    /// Exclude patterns applied to file basename.
    pub patterns_exclude_files: Option<Vec<String>>,
    /// Exclude patterns applied to directory basename.
    pub patterns_exclude_dirs: Option<Vec<String>>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumScanPatternMode,
    /// Optional maximum/target depth; files directly under the root have depth 1.
    pub depth_limit: Option<usize>,
    /// Depth evaluation mode.
    pub rule_depth_limit: EnumScanDepthLimitMode,
    /// Follow symlinked files and directories.
    pub if_follow_symlinks: bool,
    /// Match patterns ignoring ASCII case.
    pub if_case_insensitive: bool,
}

impl Default for SpecScanOptions {
    fn default() -> Self {
        Self {
            patterns_include_files: None,
            patterns_exclude_files: None,
            patterns_exclude_dirs: None,
            rule_pattern: EnumScanPatternMode::Glob,
            depth_limit: Some(1),
            rule_depth_limit: EnumScanDepthLimitMode::AtMost,
            if_follow_symlinks: true,
            if_case_insensitive: false,
        }
    }
}

impl SpecScanOptions {
    /// Options matching a single glob at the top level of the scanned directory.
    pub fn from_glob(pattern: &str) -> Self {
        Self {
            patterns_include_files: Some(vec![pattern.to_string()]),
            ..Self::default()
        }
    }
}

/// "Top-level call failed" errors (input validation / setup stage).
#[derive(Debug, thiserror::Error)]
pub enum ScanFilesError {
    /// Invalid depth combination or value.
    #[error("{0}")]
    InvalidDepthLimit(String),
    /// Invalid include/exclude pattern.
    #[error("{0}")]
    InvalidPattern(String),
    /// Scan root is not a directory.
    #[error("Source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),
    /// Directory creation failed.
    #[error("Failed to initialize directory {}: {message}", .path.display())]
    DirectoryInitFailed {
        /// Directory that failed initialization.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
