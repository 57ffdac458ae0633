//! XLSX constants and default format presets.

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Body cell format.
pub fn derive_default_fmt_text() -> SpecCellFormat {
    SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        align: Some("left".to_string()),
        ..Default::default()
    }
}

/// Header cell format: body format plus bold, centered, thin border.
pub fn derive_default_fmt_header() -> SpecCellFormat {
    derive_default_fmt_text().merge(&SpecCellFormat {
        bold: Some(true),
        align: Some("center".to_string()),
        border: Some(1),
        bg_color: Some("#D9E1F2".to_string()),
        ..Default::default()
    })
}
