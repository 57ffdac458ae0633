//! Column union and row concatenation across per-file frames.

use std::collections::HashSet;

use polars::prelude::{Column, DataFrame, DataType, PlSmallStr, PolarsResult};

/// Union of column names in first-seen order, with `col_source` moved last.
pub fn union_columns(l_frames: &[DataFrame], col_source: &str) -> Vec<String> {
    let mut set_seen: HashSet<&str> = HashSet::new();
    let mut l_columns: Vec<String> = Vec::new();
    let mut if_has_source = false;

    for df in l_frames {
        for c_name in df.get_column_names_str() {
            if c_name == col_source {
                if_has_source = true;
                continue;
            }
            if set_seen.insert(c_name) {
                l_columns.push(c_name.to_string());
            }
        }
    }

    if if_has_source {
        l_columns.push(col_source.to_string());
    }
    l_columns
}

/// Reindex `df` to `l_columns`: missing names become all-null `String`
/// columns, extra names are dropped.
pub fn align_to_columns(df: &DataFrame, l_columns: &[String]) -> PolarsResult<DataFrame> {
    let mut df_aligned = df.clone();
    let set_existing: HashSet<String> = df
        .get_column_names_str()
        .into_iter()
        .map(ToString::to_string)
        .collect();

    for c_name in l_columns {
        if set_existing.contains(c_name) {
            continue;
        }
        df_aligned.with_column(Column::full_null(
            PlSmallStr::from(c_name.as_str()),
            df.height(),
            &DataType::String,
        ))?;
    }

    df_aligned.select(l_columns.iter().map(String::as_str))
}

/// Stack frames row-wise over the union of their columns, keeping frame order.
pub fn concat_frames(l_frames: &[DataFrame], col_source: &str) -> PolarsResult<DataFrame> {
    let l_columns = union_columns(l_frames, col_source);
    let mut iter_frames = l_frames.iter();
    let Some(df_first) = iter_frames.next() else {
        return Ok(DataFrame::empty());
    };

    let mut df_out = align_to_columns(df_first, &l_columns)?;
    for df in iter_frames {
        df_out.vstack_mut(&align_to_columns(df, &l_columns)?)?;
    }
    Ok(df_out)
}
