//! Error types for the IFC property extractor.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when opening an IFC model.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the IFC file from disk.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The STEP format is invalid or malformed.
    #[error("invalid STEP format: {message}")]
    InvalidStep { message: String },
}

/// Errors that can occur when writing the extracted table.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write data to the file.
    #[error("failed to write data: {message}")]
    WriteError { message: String },

    /// Failed to write CSV data.
    #[error("CSV write failed: {source}")]
    CsvWrite {
        #[from]
        source: csv::Error,
    },

    /// Failed to build or save the spreadsheet.
    #[error("spreadsheet write failed: {source}")]
    XlsxWrite {
        #[from]
        source: rust_xlsxwriter::XlsxError,
    },
}

/// Terminal failures of an extraction run.
///
/// Per-element faults are recovered inside the run and never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The model file could not be opened.
    #[error("failed to open model: {source}")]
    Load {
        #[from]
        source: LoadError,
    },

    /// The model opened but holds no product entities.
    #[error("no product entities found in the model")]
    EmptyModel,

    /// The scan finished but no element qualified for output.
    #[error("no valid data extracted")]
    NoData,

    /// Serialization to disk failed.
    #[error("failed to write output file: {source}")]
    Write {
        #[from]
        source: ExportError,
    },
}
