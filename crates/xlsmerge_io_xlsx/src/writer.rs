//! XLSX output that lays a merged frame out over one or more worksheets.

use std::path::Path;

use polars::prelude::{AnyValue, DataFrame};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::spec::{
    EnumCellValue, SpecCellFormat, SpecSheetSlice, SpecXlsxReport, SpecXlsxWriteOptions,
    XlsxWriteError,
};
use crate::util::{estimate_unicode_string_width, plan_sheet_slices, sanitize_sheet_name};

/// Write `df` into a new workbook at `path_file_out`.
///
/// Frames beyond Excel's row/column limits are split over several sheets
/// named `{sheet_name}_1`, `{sheet_name}_2`, ...; the split is reported as a
/// warning. Each sheet gets a bold, frozen header row and inferred widths.
pub fn write_dataframe_xlsx<P: AsRef<Path>>(
    df: &DataFrame,
    path_file_out: P,
    sheet_name: &str,
    write_options: SpecXlsxWriteOptions,
) -> Result<SpecXlsxReport, XlsxWriteError> {
    let mut report = SpecXlsxReport::default();
    let l_sheet_parts = plan_sheet_slices(
        df.height(),
        df.width(),
        &sanitize_sheet_name(sheet_name, "_"),
        &mut report,
    )?;

    let mut workbook = Workbook::new();
    for sheet_slice in l_sheet_parts {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet_slice.sheet_name)?;
        write_sheet_slice(worksheet, df, &sheet_slice, &write_options)?;
        report.sheets.push(sheet_slice);
    }
    workbook.save(path_file_out.as_ref())?;

    for warning in &report.warnings {
        tracing::warn!("{warning}");
    }
    Ok(report)
}

fn write_sheet_slice(
    worksheet: &mut Worksheet,
    df: &DataFrame,
    sheet_slice: &SpecSheetSlice,
    write_options: &SpecXlsxWriteOptions,
) -> Result<(), XlsxWriteError> {
    let fmt_header = derive_rust_xlsx_format(&write_options.fmt_header);
    let fmt_text = derive_rust_xlsx_format(&write_options.fmt_text);
    let policy_autofit = &write_options.policy_autofit;

    let l_cols =
        &df.get_columns()[sheet_slice.col_start_inclusive..sheet_slice.col_end_exclusive];
    let mut l_width_by_col = vec![0usize; l_cols.len()];

    for (n_idx_col, col) in l_cols.iter().enumerate() {
        let c_name = col.name().as_str();
        worksheet.write_string_with_format(0, cast_col_num(n_idx_col)?, c_name, &fmt_header)?;
        l_width_by_col[n_idx_col] = estimate_unicode_string_width(c_name);
    }
    if write_options.if_freeze_header {
        worksheet.set_freeze_panes(1, 0)?;
    }

    for (n_row_out, n_row_src) in
        (sheet_slice.row_start_inclusive..sheet_slice.row_end_exclusive).enumerate()
    {
        let if_measure = policy_autofit.if_enabled
            && policy_autofit
                .height_body_inferred_max
                .is_none_or(|n_max| n_row_out < n_max);
        let n_row = cast_row_num(n_row_out + 1)?;
        for (n_idx_col, col) in l_cols.iter().enumerate() {
            let value = derive_cell_value_from_any_value(
                col.get(n_row_src)?,
                write_options.if_parse_numeric_text,
            );
            if if_measure {
                l_width_by_col[n_idx_col] =
                    usize::max(l_width_by_col[n_idx_col], estimate_width_len(&value));
            }
            let n_col = cast_col_num(n_idx_col)?;
            match &value {
                EnumCellValue::None => worksheet.write_blank(n_row, n_col, &fmt_text)?,
                EnumCellValue::String(val) => {
                    worksheet.write_string_with_format(n_row, n_col, val, &fmt_text)?
                }
                EnumCellValue::Number(val) => {
                    worksheet.write_number_with_format(n_row, n_col, *val, &fmt_text)?
                }
            };
        }
    }

    if policy_autofit.if_enabled {
        for (n_idx_col, n_width) in l_width_by_col.into_iter().enumerate() {
            let n_width_final = (n_width + policy_autofit.width_cell_padding)
                .clamp(policy_autofit.width_cell_min, policy_autofit.width_cell_max);
            worksheet.set_column_width(cast_col_num(n_idx_col)?, n_width_final as f64)?;
        }
    }
    Ok(())
}

fn estimate_width_len(value: &EnumCellValue) -> usize {
    match value {
        EnumCellValue::None => 0,
        EnumCellValue::String(s) => estimate_unicode_string_width(s),
        EnumCellValue::Number(n) => n.to_string().len(),
    }
}

fn derive_cell_value_from_any_value(
    value: AnyValue<'_>,
    if_parse_numeric_text: bool,
) -> EnumCellValue {
    let derive_text = |s: &str| {
        if if_parse_numeric_text
            && let Ok(n) = s.trim().parse::<f64>()
            && n.is_finite()
        {
            return EnumCellValue::Number(n);
        }
        EnumCellValue::String(s.to_string())
    };

    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => derive_text(val),
        AnyValue::StringOwned(val) => derive_text(val.as_str()),
        AnyValue::Boolean(val) => {
            EnumCellValue::String(if val { "True" } else { "False" }.to_string())
        }
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, XlsxWriteError> {
    u32::try_from(value)
        .map_err(|_| XlsxWriteError::InvalidInput(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, XlsxWriteError> {
    u16::try_from(value)
        .map_err(|_| XlsxWriteError::InvalidInput(format!("column index overflow: {value}")))
}

#[cfg(test)]
mod tests {
    use polars::prelude::{Column, DataFrame};
    use tempfile::TempDir;

    use super::*;

    fn sample_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("Region".into(), vec![Some("North"), None]),
            Column::new("Qty".into(), vec![Some("12"), Some("x")]),
        ])
        .expect("frame")
    }

    #[test]
    fn test_write_dataframe_xlsx_creates_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path_file_out = tmp.path().join("merged.xlsx");

        let report = write_dataframe_xlsx(
            &sample_frame(),
            &path_file_out,
            "SDR/merged",
            SpecXlsxWriteOptions::default(),
        )
        .expect("write");

        assert!(path_file_out.is_file());
        assert_eq!(report.sheets.len(), 1);
        assert_eq!(report.sheets[0].sheet_name, "SDR_merged");
        assert_eq!(report.sheets[0].row_end_exclusive, 2);
    }

    #[test]
    fn test_write_dataframe_xlsx_rejects_frame_without_columns() {
        let tmp = TempDir::new().expect("tempdir");
        let path_file_out = tmp.path().join("empty.xlsx");

        let res = write_dataframe_xlsx(
            &DataFrame::empty(),
            &path_file_out,
            "merged",
            SpecXlsxWriteOptions::default(),
        );
        assert!(matches!(res, Err(XlsxWriteError::InvalidInput(_))));
        assert!(!path_file_out.exists());
    }

    #[test]
    fn test_write_dataframe_xlsx_header_only() {
        let tmp = TempDir::new().expect("tempdir");
        let path_file_out = tmp.path().join("header.xlsx");
        let df = sample_frame().head(Some(0));

        let report = write_dataframe_xlsx(
            &df,
            &path_file_out,
            "merged",
            SpecXlsxWriteOptions::default(),
        )
        .expect("write");
        assert!(path_file_out.is_file());
        assert_eq!(report.sheets[0].row_end_exclusive, 0);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_derive_cell_value_parses_numeric_text() {
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::String(" 12.5 "), true),
            EnumCellValue::Number(12.5)
        );
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::String("12.5"), false),
            EnumCellValue::String("12.5".to_string())
        );
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::String("NaN"), true),
            EnumCellValue::String("NaN".to_string())
        );
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::Null, true),
            EnumCellValue::None
        );
    }
}
