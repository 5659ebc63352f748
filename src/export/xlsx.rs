use crate::error::ExportError;
use crate::export::table::{ExtractedTable, GLOBAL_ID_COLUMN};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};
use std::path::Path;

const SHEET_NAME: &str = "Sheet1";
const FONT_NAME: &str = "Times New Roman";
const HEADER_FILL: Color = Color::RGB(0x00D3_D3D3);
/// GlobalId values are fixed-length 22-character identifiers.
const GLOBAL_ID_WIDTH: f64 = 32.0;
const COLUMN_WIDTH: f64 = 24.0;
const HEADER_HEIGHT: f64 = 32.0;

/// Write the table as a single-sheet formatted workbook.
pub fn write_xlsx(table: &ExtractedTable, path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let header_format = Format::new()
        .set_font_name(FONT_NAME)
        .set_font_size(12)
        .set_bold()
        .set_background_color(HEADER_FILL)
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    let body_format = Format::new()
        .set_font_name(FONT_NAME)
        .set_font_size(11)
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    for (col, name) in table.columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name.as_str(), &header_format)?;
    }
    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            sheet.write_string_with_format(
                row_idx as u32 + 1,
                col as u16,
                cell.as_str(),
                &body_format,
            )?;
        }
    }

    // Dimensions go on after the data pass.
    for (col, name) in table.columns.iter().enumerate() {
        let width = if name == GLOBAL_ID_COLUMN {
            GLOBAL_ID_WIDTH
        } else {
            COLUMN_WIDTH
        };
        sheet.set_column_width(col as u16, width)?;
    }
    sheet.set_row_height(0, HEADER_HEIGHT)?;

    workbook.save(path)?;
    Ok(())
}
