//! End-to-end merge run: locate, read, concatenate, write.

use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use xlsmerge_io_fs::{ensure_directory, scan_files};
use xlsmerge_io_html::{HtmlTableError, SpecHtmlReadOptions, read_htmlish_xls};

use crate::concat::concat_frames;
use crate::report::{ReportMerge, ReportMergeBuilder};
use crate::spec::{MergeError, SpecMergeOptions};
use crate::util::calculate_worker_limit;
use crate::writer::write_output;

type TypeReadResult = (PathBuf, Result<DataFrame, HtmlTableError>);

/// Run the whole pipeline described by `options`.
///
/// 1. Create the output's parent directory (and the input directory when
///    scanning).
/// 2. Select input files (explicit list, or sorted directory scan).
/// 3. Read every file on a rayon pool; results keep input order.
/// 4. Union columns, stack rows and write the output.
///
/// A file that fails to read is logged and recorded in the report; the run
/// only fails when no file matches or none can be read.
pub fn merge_files(options: &SpecMergeOptions) -> Result<ReportMerge, MergeError> {
    let mut builder_merge_report = ReportMergeBuilder::default();
    let path_file_out = options.file_output.clone();
    ensure_parent_directory(&path_file_out)?;

    let l_paths_input = locate_input_files(options, &mut builder_merge_report)?;
    builder_merge_report.cnt_matched = l_paths_input.len() as u64;

    let n_workers_max = calculate_worker_limit(options.num_workers_max);
    let l_results = read_files(
        l_paths_input,
        &options.read_options,
        n_workers_max,
        &mut builder_merge_report,
    );

    let mut l_frames = Vec::with_capacity(l_results.len());
    for (path_file, res_read) in l_results {
        let c_name = derive_file_name(&path_file);
        match res_read {
            Ok(df) => {
                tracing::info!("OK  {c_name}  -> shape=({}, {})", df.height(), df.width());
                builder_merge_report.add_parsed();
                l_frames.push(df);
            }
            Err(e) => {
                tracing::warn!("[WARN] {c_name}: {e}");
                builder_merge_report.add_error(path_file, e.to_string());
            }
        }
    }
    if l_frames.is_empty() {
        return Err(MergeError::NoParsableFiles);
    }

    let mut df_merged = concat_frames(&l_frames, &options.read_options.col_source_name)?;
    drop(l_frames);

    let format = options.resolve_format();
    write_output(&mut df_merged, &path_file_out, format, options)?;
    tracing::info!(
        "Saved combined {format}: {}  rows={} cols={}",
        path_file_out.display(),
        df_merged.height(),
        df_merged.width()
    );

    Ok(builder_merge_report.build(path_file_out, df_merged.height(), df_merged.width()))
}

fn locate_input_files(
    options: &SpecMergeOptions,
    builder_merge_report: &mut ReportMergeBuilder,
) -> Result<Vec<PathBuf>, MergeError> {
    if !options.files_input.is_empty() {
        return Ok(options.files_input.clone());
    }

    ensure_directory(&options.dir_input)?;
    let (l_paths, report_scan) = scan_files(&options.dir_input, options.derive_scan_options())?;
    tracing::debug!("{report_scan}");
    for warning in report_scan.warnings {
        builder_merge_report.add_warning(warning);
    }

    if l_paths.is_empty() {
        let dir_shown =
            fs::canonicalize(&options.dir_input).unwrap_or_else(|_| options.dir_input.clone());
        return Err(MergeError::NoFilesFound {
            pattern: options.pattern.clone(),
            dir: dir_shown,
        });
    }
    Ok(l_paths)
}

fn read_files(
    l_paths: Vec<PathBuf>,
    read_options: &SpecHtmlReadOptions,
    n_workers_max: usize,
    builder_merge_report: &mut ReportMergeBuilder,
) -> Vec<TypeReadResult> {
    let read_one = |path_file: PathBuf| -> TypeReadResult {
        let res_read = read_htmlish_xls(&path_file, read_options);
        (path_file, res_read)
    };

    if n_workers_max <= 1 || l_paths.len() <= 1 {
        return l_paths.into_iter().map(read_one).collect();
    }

    let thread_pool = ThreadPoolBuilder::new()
        .num_threads(n_workers_max)
        .build();
    let Ok(thread_pool) = thread_pool else {
        let warning = format!(
            "Failed to initialize thread pool (workers={n_workers_max}); fallback to serial read."
        );
        tracing::warn!("{warning}");
        builder_merge_report.add_warning(warning);
        return l_paths.into_iter().map(read_one).collect();
    };

    thread_pool.install(|| l_paths.into_par_iter().map(read_one).collect())
}

fn ensure_parent_directory(path_file: &Path) -> Result<(), MergeError> {
    let Some(path_dir_parent) = path_file.parent() else {
        return Ok(());
    };
    if path_dir_parent.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path_dir_parent).map_err(|source| MergeError::Io {
        path: path_dir_parent.to_path_buf(),
        source,
    })
}

fn derive_file_name(path_file: &Path) -> String {
    path_file
        .file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_else(|| path_file.display().to_string())
}
