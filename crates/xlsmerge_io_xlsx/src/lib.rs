//! `xlsmerge_io_xlsx` v1:
//! Workbook output for merged frames.
//!
//! - `conf`   : Excel limits and default formats
//! - `spec`   : formats, options, reports, errors
//! - `util`   : sheet naming and slicing helpers
//! - `writer` : `rust_xlsxwriter`-backed `write_dataframe_xlsx`
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL};
pub use spec::{
    EnumCellValue, SpecAutofitCellsPolicy, SpecCellFormat, SpecSheetSlice, SpecXlsxReport,
    SpecXlsxWriteOptions, XlsxWriteError,
};
pub use util::{create_sheet_identifier, plan_sheet_slices, sanitize_sheet_name};
pub use writer::write_dataframe_xlsx;
