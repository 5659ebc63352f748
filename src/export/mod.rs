pub mod csv;
pub mod filename;
pub mod table;
pub mod xlsx;

pub use crate::error::ExportError;
pub use filename::{make_output_filename, sanitize_base_name, DEFAULT_BASE_NAME};
pub use table::{ExtractedTable, GLOBAL_ID_COLUMN, NAME_COLUMN};

use crate::model::OutputFormat;
use std::path::Path;

/// Serialize the table in the requested format.
pub fn write_table(
    table: &ExtractedTable,
    path: &Path,
    format: OutputFormat,
) -> Result<(), ExportError> {
    match format {
        OutputFormat::Excel => xlsx::write_xlsx(table, path),
        OutputFormat::Csv => csv::write_csv(table, path),
    }
}
