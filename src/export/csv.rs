use crate::error::ExportError;
use crate::export::table::ExtractedTable;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// UTF-8 byte-order mark. Spreadsheet applications use it to pick the right
/// encoding when opening a CSV file.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write the table as UTF-8 CSV with a byte-order mark, header row first.
pub fn write_csv(table: &ExtractedTable, path: &Path) -> Result<(), ExportError> {
    let mut file = File::create(path).map_err(|source| ExportError::FileCreate {
        path: path.to_path_buf(),
        source,
    })?;

    file.write_all(UTF8_BOM).map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })?;

    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer.flush().map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })?;

    Ok(())
}
