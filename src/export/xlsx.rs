use crate::errors::{AppError, AppResult};
use crate::export::excel_date::parse_to_excel_date;
use crate::export::model::{get_headers, timesheet_to_row};
use crate::export::{TimesheetExport, notify_export_success};
use crate::ui::messages::info;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

const HEADER_BG: u32 = 0x2F75B5;
const BAND: [u32; 2] = [0xEAF3FB, 0xFFFFFF];
const REVIEW_BG: u32 = 0xFCE4D6;

/// XLSX with a frozen header, banded rows and fitted column widths.
/// Rows flagged for review are highlighted.
pub(crate) fn export_xlsx(rows: &[TimesheetExport], path: &Path) -> AppResult<()> {
    info(format!("Exporting to XLSX: {}", path.display()));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Timesheets").map_err(to_app_error)?;

    let headers = get_headers();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(HEADER_BG))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *header, &header_format)
            .map_err(to_app_error)?;
    }

    worksheet.set_freeze_panes(1, 0).map_err(to_app_error)?;

    let mut col_widths: Vec<usize> = headers.iter().map(|h| UnicodeWidthStr::width(*h)).collect();

    for (row_index, ts) in rows.iter().enumerate() {
        let row = (row_index + 1) as u32;
        let bg = if ts.review_status == "required" {
            Color::RGB(REVIEW_BG)
        } else {
            Color::RGB(BAND[row_index % 2])
        };

        for (col, value) in timesheet_to_row(ts).iter().enumerate() {
            // employee id and job numbers stay text
            let as_text = matches!(headers[col], "employee_id" | "job_no" | "cost_centre");
            write_cell(worksheet, row, col as u16, value, bg, as_text)?;
            col_widths[col] = col_widths[col].max(UnicodeWidthStr::width(value.as_str()));
        }
    }

    for (c, w) in col_widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, *w as f64 + 2.0)
            .map_err(to_app_error)?;
    }

    workbook.save(path).map_err(to_app_error)?;

    notify_export_success("XLSX", path);
    Ok(())
}

/// Write one cell, storing dates, clock times and numbers as Excel values.
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    s: &str,
    bg: Color,
    as_text: bool,
) -> AppResult<()> {
    let base = Format::new()
        .set_background_color(bg)
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    if !as_text {
        if let Some((num_format, serial)) = parse_to_excel_date(s) {
            worksheet
                .write_with_format(row, col, serial, &base.set_num_format(num_format))
                .map_err(to_app_error)?;
            return Ok(());
        }

        if let Ok(num) = s.parse::<f64>() {
            worksheet
                .write_with_format(row, col, num, &base.set_align(FormatAlign::Right))
                .map_err(to_app_error)?;
            return Ok(());
        }
    }

    worksheet
        .write_with_format(row, col, s, &base)
        .map_err(to_app_error)?;
    Ok(())
}

fn to_app_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(e.to_string())
}
