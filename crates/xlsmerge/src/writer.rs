//! Output of the merged frame.

use std::fs::File;
use std::path::Path;

use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use xlsmerge_io_xlsx::{SpecXlsxWriteOptions, write_dataframe_xlsx};

use crate::spec::{EnumOutputFormat, MergeError, SpecMergeOptions};

/// Write `df` to `path_file_out` in the requested format.
///
/// CSV output has a header row, no index column and empty fields for
/// missing values.
pub fn write_output(
    df: &mut DataFrame,
    path_file_out: &Path,
    format: EnumOutputFormat,
    options: &SpecMergeOptions,
) -> Result<(), MergeError> {
    match format {
        EnumOutputFormat::Csv => {
            let mut file = File::create(path_file_out).map_err(|source| MergeError::Io {
                path: path_file_out.to_path_buf(),
                source,
            })?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .include_bom(options.if_include_bom)
                .with_separator(b',')
                .with_null_value(String::new())
                .finish(df)?;
        }
        EnumOutputFormat::Xlsx => {
            let report = write_dataframe_xlsx(
                df,
                path_file_out,
                &options.sheet_name,
                SpecXlsxWriteOptions::default(),
            )?;
            tracing::debug!("wrote {} worksheet(s)", report.sheets.len());
        }
    }
    Ok(())
}
