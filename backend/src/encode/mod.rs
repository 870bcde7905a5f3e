//! Table encoding: CSV text and styled spreadsheets.
//!
//! Presentation only, no transformation logic.

use rust_xlsxwriter::{Format, Workbook};
use serde_json::Value;

use crate::error::{EncodeError, EncodeResult};
use crate::models::{cell_text, Table};

/// Spreadsheet layout options
#[derive(Debug, Clone)]
pub struct SheetStyle {
    pub sheet_name: String,
    pub first_column_width: f64,
    pub other_column_width: f64,
}

impl Default for SheetStyle {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            first_column_width: 25.0,
            other_column_width: 17.0,
        }
    }
}

/// Rows frozen at the top of the sheet (the header row)
pub const FROZEN_ROWS: u32 = 1;

impl SheetStyle {
    /// Width of each of `column_count` columns, first column first
    pub fn column_widths(&self, column_count: usize) -> Vec<f64> {
        (0..column_count)
            .map(|i| {
                if i == 0 {
                    self.first_column_width
                } else {
                    self.other_column_width
                }
            })
            .collect()
    }
}

/// Last row and column of the autofilter range (header plus every data
/// row), `None` for a table without columns.
pub fn filter_range(table: &Table) -> EncodeResult<Option<(u32, u16)>> {
    let column_count = table.headers().len();
    if column_count == 0 {
        return Ok(None);
    }
    let last_col = u16::try_from(column_count - 1)
        .map_err(|_| EncodeError::TooLarge(format!("{} columns", column_count)))?;
    let last_row = u32::try_from(table.len())
        .map_err(|_| EncodeError::TooLarge(format!("{} rows", table.len())))?;
    Ok(Some((last_row, last_col)))
}

/// Encode a table as comma-separated UTF-8 text with a header row.
pub fn to_csv_bytes(table: &Table) -> EncodeResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.headers())?;

    for row in table.rows() {
        writer.write_record(table.headers().iter().map(|h| cell_text(row.get(h))))?;
    }

    writer.into_inner().map_err(|e| EncodeError::Io(e.into_error()))
}

/// Encode a table as an xlsx workbook.
///
/// Bold header row, frozen below the header, autofilter over all rows, first
/// column wider than the rest.
pub fn to_xlsx_bytes(table: &Table, style: &SheetStyle) -> EncodeResult<Vec<u8>> {
    let range = filter_range(table)?;

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&style.sheet_name)?;

        for (col, header) in (0u16..).zip(table.headers()) {
            worksheet.write_string_with_format(0, col, header, &header_format)?;
        }

        for (row_idx, row) in (1u32..).zip(table.rows()) {
            for (col, header) in (0u16..).zip(table.headers()) {
                match row.get(header) {
                    Some(Value::Number(n)) => match n.as_f64() {
                        Some(f) => {
                            worksheet.write_number(row_idx, col, f)?;
                        }
                        None => {
                            worksheet.write_string(row_idx, col, n.to_string())?;
                        }
                    },
                    Some(Value::Bool(b)) => {
                        worksheet.write_boolean(row_idx, col, *b)?;
                    }
                    Some(Value::String(s)) if !s.is_empty() => {
                        worksheet.write_string(row_idx, col, s)?;
                    }
                    _ => {}
                }
            }
        }

        if let Some((last_row, last_col)) = range {
            worksheet.autofilter(0, 0, last_row, last_col)?;
        }
        for (col, width) in (0u16..).zip(style.column_widths(table.headers().len())) {
            worksheet.set_column_width(col, width)?;
        }
        worksheet.set_freeze_panes(FROZEN_ROWS, 0)?;
    }

    Ok(workbook.save_to_buffer()?)
}
