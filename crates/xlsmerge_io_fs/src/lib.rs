//! `xlsmerge_io_fs` v1:
//! Input-file discovery for the merge pipeline.
//!
//! - `scan`   : directory traversal and match collection
//! - `spec`   : enums/options/errors
//! - `report` : scan report model
//! - `util`   : pattern compilation and depth helpers

pub mod report;
pub mod scan;
pub mod spec;
mod util;

pub use report::{ReportScan, ReportScanBuilder};
pub use scan::{ensure_directory, scan_files};
pub use spec::{EnumScanDepthLimitMode, EnumScanPatternMode, ScanFilesError, SpecScanOptions};
