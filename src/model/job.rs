use serde::Serialize;
use std::path::PathBuf;

/// Output serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputFormat {
    Excel,
    Csv,
}

impl OutputFormat {
    /// File extension without the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Excel => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }

    /// Human-readable format name for status messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Excel => "Excel",
            OutputFormat::Csv => "CSV",
        }
    }
}

/// Immutable configuration for one extraction run.
///
/// Built once by the shell, handed to the pipeline, never mutated while the
/// run is active.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    /// Path to the IFC model file.
    pub ifc_path: PathBuf,
    /// Requested properties, `Pset.Name` or bare `Name`. The sequence also
    /// fixes the column order of the output, after identity columns.
    pub properties: Vec<String>,
    /// Emit a GlobalId identity column.
    pub include_global_id: bool,
    /// Emit a Name identity column.
    pub include_name: bool,
    /// Directory the output file is written into.
    pub output_dir: PathBuf,
    /// Base name of the output file, date suffix appended.
    pub base_filename: String,
    pub format: OutputFormat,
}
