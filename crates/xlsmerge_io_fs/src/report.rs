//! Scan report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counters and diagnostics for one `scan_files` run.
#[derive(Debug, Default, Clone)]
pub struct ReportScan {
    /// Total scanned file entries.
    pub cnt_scanned: u64,
    /// Number of scanned files that matched filters.
    pub cnt_matched: u64,
    /// Non-fatal warnings collected during traversal.
    pub warnings: Vec<String>,
}

impl ReportScan {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_matched".to_string(), self.cnt_matched);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} scanned={} matched={} warnings={}",
            dict_counts["cnt_scanned"], dict_counts["cnt_matched"], dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[SCAN]"))
    }
}

/// Mutable accumulator for scan statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportScanBuilder {
    /// See [`ReportScan::cnt_scanned`].
    pub cnt_scanned: u64,
    /// See [`ReportScan::cnt_matched`].
    pub cnt_matched: u64,
    /// See [`ReportScan::warnings`].
    pub warnings: Vec<String>,
}

impl ReportScanBuilder {
    pub fn add_scanned(&mut self) {
        self.cnt_scanned += 1;
    }

    pub fn add_matched(&mut self) {
        self.cnt_matched += 1;
    }

    /// Add warning message and forward it to the log.
    pub fn add_warning(&mut self, warning: String) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportScan {
        ReportScan {
            cnt_scanned: self.cnt_scanned,
            cnt_matched: self.cnt_matched,
            warnings: self.warnings,
        }
    }
}
