//! `xlsmerge` v1:
//! Merge HTML tables disguised as `.xls` files into one flat output.
//!
//! - `conf`   : built-in defaults
//! - `config` : TOML/CLI option layering
//! - `spec`   : options, output formats, errors
//! - `report` : run report model
//! - `concat` : column union and row concatenation
//! - `writer` : CSV/XLSX output
//! - `merge`  : end-to-end orchestration

pub mod concat;
pub mod conf;
pub mod config;
pub mod merge;
pub mod report;
pub mod spec;
mod util;
pub mod writer;

pub use concat::{align_to_columns, concat_frames, union_columns};
pub use config::SpecMergeConfig;
pub use merge::merge_files;
pub use report::{ReportMerge, ReportMergeBuilder, SpecMergeFileError};
pub use spec::{EnumOutputFormat, MergeError, SpecMergeOptions};
pub use writer::write_output;
