use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use xlsmerge::{EnumOutputFormat, SpecMergeConfig, merge_files};

/// Merge HTML tables saved as `.xls` files into one CSV or XLSX file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Explicit input files; skips the directory scan when given
    files: Vec<PathBuf>,

    /// Directory scanned for input files
    #[arg(short = 'i', long)]
    dir_input: Option<PathBuf>,

    /// Basename glob selecting input files
    #[arg(short, long)]
    pattern: Option<String>,

    /// Basename pattern to exclude (repeatable)
    #[arg(long = "exclude")]
    patterns_exclude: Vec<String>,

    /// Merged output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format; defaults to the output file extension
    #[arg(short, long, value_enum)]
    format: Option<EnumOutputFormat>,

    /// TOML config file applied before CLI flags
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scan subdirectories too
    #[arg(short, long)]
    recursive: bool,

    /// Match patterns ignoring case
    #[arg(long)]
    case_insensitive: bool,

    /// Name of the appended source-file column
    #[arg(long)]
    col_source: Option<String>,

    /// Regex a table's text must match to be considered
    #[arg(long = "match")]
    pattern_match: Option<String>,

    /// Keep `<tr>` rows without any cells as all-empty rows
    #[arg(long)]
    keep_empty_rows: bool,

    /// Prefix the CSV output with a UTF-8 BOM
    #[arg(long)]
    bom: bool,

    /// Worksheet name for XLSX output
    #[arg(long)]
    sheet_name: Option<String>,

    /// Maximum parse workers
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn to_config(&self) -> SpecMergeConfig {
        SpecMergeConfig {
            dir_input: self.dir_input.clone(),
            pattern: self.pattern.clone(),
            patterns_exclude: (!self.patterns_exclude.is_empty())
                .then(|| self.patterns_exclude.clone()),
            recursive: self.recursive.then_some(true),
            case_insensitive: self.case_insensitive.then_some(true),
            file_output: self.output.clone(),
            format: self.format,
            include_bom: self.bom.then_some(true),
            sheet_name: self.sheet_name.clone(),
            num_workers_max: self.workers,
            col_source: self.col_source.clone(),
            pattern_match: self.pattern_match.clone(),
            skip_empty_rows: self.keep_empty_rows.then_some(false),
            ..SpecMergeConfig::default()
        }
    }

    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let spec_config_file = match &cli.config {
        Some(path_config) => SpecMergeConfig::load(path_config)?,
        None => SpecMergeConfig::default(),
    };
    let path_config = cli
        .config
        .clone()
        .unwrap_or_else(|| Path::new("<cli>").to_path_buf());

    let mut options = spec_config_file
        .merge(cli.to_config())
        .into_options(&path_config)?;
    options.files_input = cli.files;

    let report = merge_files(&options).with_context(|| {
        format!(
            "merge failed (input dir: {}, output: {})",
            options.dir_input.display(),
            options.file_output.display()
        )
    })?;

    if report.error_count() > 0 {
        warn!("{} file(s) could not be read", report.error_count());
    }
    info!("{report}");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
