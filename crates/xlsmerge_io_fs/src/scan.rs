//! Directory traversal and input-file collection.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::report::{ReportScan, ReportScanBuilder};
use crate::spec::{ScanFilesError, SpecScanOptions};
use crate::util::{SpecScanPatterns, is_depth_within_limit, should_descend, validate_depth_limit};

#[derive(Debug)]
struct SpecScanContext {
    spec_scan_options: SpecScanOptions,
    spec_scan_pats: SpecScanPatterns,
    builder_scan_report: ReportScanBuilder,
    set_visited_dirs: HashSet<(u64, u64)>,
    l_paths_matched: Vec<PathBuf>,
}

/// Create `dir` (and parents) when missing.
pub fn ensure_directory<P: AsRef<Path>>(dir: P) -> Result<(), ScanFilesError> {
    let path_dir = dir.as_ref();
    fs::create_dir_all(path_dir).map_err(|e| ScanFilesError::DirectoryInitFailed {
        path: path_dir.to_path_buf(),
        message: e.to_string(),
    })
}

/// Collect regular files under `dir_source` whose basename passes the
/// include/exclude filters of [`SpecScanOptions`].
///
/// Files directly under `dir_source` have depth 1. The returned paths are
/// sorted so downstream concatenation order is stable across platforms.
///
/// Unreadable directories or entries are recorded as warnings in
/// [`ReportScan`]; only setup/validation failures return [`ScanFilesError`].
pub fn scan_files<P: AsRef<Path>>(
    dir_source: P,
    spec_scan_options: SpecScanOptions,
) -> Result<(Vec<PathBuf>, ReportScan), ScanFilesError> {
    validate_depth_limit(
        spec_scan_options.depth_limit,
        spec_scan_options.rule_depth_limit,
    )?;

    let path_dir_src = dir_source.as_ref().to_path_buf();
    if !path_dir_src.is_dir() {
        return Err(ScanFilesError::SourceNotDirectory(path_dir_src));
    }

    let spec_scan_pats = SpecScanPatterns::from_raw(
        spec_scan_options.patterns_include_files.as_deref(),
        spec_scan_options.patterns_exclude_files.as_deref(),
        spec_scan_options.patterns_exclude_dirs.as_deref(),
        spec_scan_options.rule_pattern,
        spec_scan_options.if_case_insensitive,
    )?;

    let mut spec_scan_ctx = SpecScanContext {
        spec_scan_options,
        spec_scan_pats,
        builder_scan_report: ReportScanBuilder::default(),
        set_visited_dirs: HashSet::new(),
        l_paths_matched: Vec::new(),
    };

    walk_directory(&path_dir_src, 0, &mut spec_scan_ctx);

    let mut l_paths_matched = spec_scan_ctx.l_paths_matched;
    l_paths_matched.sort();
    let report = spec_scan_ctx.builder_scan_report.build();
    tracing::debug!("{report} root={}", path_dir_src.display());
    Ok((l_paths_matched, report))
}

fn walk_directory(path_root: &Path, n_depth_relative: usize, spec_scan_ctx: &mut SpecScanContext) {
    if spec_scan_ctx.spec_scan_options.if_follow_symlinks
        && !mark_directory_visited(path_root, spec_scan_ctx)
    {
        return;
    }

    let iter_entries = match fs::read_dir(path_root) {
        Ok(iter) => iter,
        Err(e) => {
            spec_scan_ctx.builder_scan_report.add_warning(format!(
                "Failed to read directory {} ({e})",
                path_root.display()
            ));
            return;
        }
    };

    let n_depth_entry = n_depth_relative + 1;
    let mut l_dirs_sub: Vec<PathBuf> = Vec::new();

    for entry_res in iter_entries {
        let entry = match entry_res {
            Ok(v) => v,
            Err(e) => {
                spec_scan_ctx.builder_scan_report.add_warning(format!(
                    "Failed to read directory entry under {} ({e})",
                    path_root.display()
                ));
                continue;
            }
        };

        let path_entry = entry.path();
        let c_name = entry.file_name().to_string_lossy().to_string();
        let cfg_file_type = match entry.file_type() {
            Ok(v) => v,
            Err(e) => {
                spec_scan_ctx
                    .builder_scan_report
                    .add_warning(format!("Failed to inspect {} ({e})", path_entry.display()));
                continue;
            }
        };

        let (if_is_dir, if_is_file) = if cfg_file_type.is_symlink() {
            if !spec_scan_ctx.spec_scan_options.if_follow_symlinks {
                continue;
            }
            match fs::metadata(&path_entry) {
                Ok(meta) => (meta.is_dir(), meta.is_file()),
                Err(_) => {
                    spec_scan_ctx
                        .builder_scan_report
                        .add_warning(format!("Broken symlink: {}", path_entry.display()));
                    continue;
                }
            }
        } else {
            (cfg_file_type.is_dir(), cfg_file_type.is_file())
        };

        if if_is_dir {
            if should_descend(n_depth_entry, spec_scan_ctx.spec_scan_options.depth_limit)
                && !spec_scan_ctx.spec_scan_pats.should_skip_dir(&c_name)
            {
                l_dirs_sub.push(path_entry);
            }
            continue;
        }
        if !if_is_file {
            continue;
        }

        if !is_depth_within_limit(
            n_depth_entry,
            spec_scan_ctx.spec_scan_options.depth_limit,
            spec_scan_ctx.spec_scan_options.rule_depth_limit,
        ) {
            continue;
        }

        spec_scan_ctx.builder_scan_report.add_scanned();
        if spec_scan_ctx.spec_scan_pats.should_keep_file(&c_name) {
            spec_scan_ctx.builder_scan_report.add_matched();
            spec_scan_ctx.l_paths_matched.push(path_entry);
        }
    }

    for path_dir_sub in l_dirs_sub {
        walk_directory(&path_dir_sub, n_depth_entry, spec_scan_ctx);
    }
}

/// Returns `false` when `path_dir` was already visited (symlink loop).
fn mark_directory_visited(path_dir: &Path, spec_scan_ctx: &mut SpecScanContext) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let Ok(stat_dir) = fs::metadata(path_dir) else {
            spec_scan_ctx
                .builder_scan_report
                .add_warning(format!("Failed to stat directory: {}", path_dir.display()));
            return false;
        };
        if !spec_scan_ctx
            .set_visited_dirs
            .insert((stat_dir.dev(), stat_dir.ino()))
        {
            spec_scan_ctx
                .builder_scan_report
                .add_warning(format!("Symlink loop detected: {}", path_dir.display()));
            return false;
        }
    }
    #[cfg(not(unix))]
    {
        let _ = (path_dir, &spec_scan_ctx.set_visited_dirs);
    }
    true
}
