//! # IFC Prop Getter
//!
//! Extracts named property values from IFC building models and exports them
//! as a formatted Excel workbook or CSV table.
//!
//! ## Features
//!
//! - Parse IFC files (IFC2x3 and IFC4 schemas)
//! - Resolve `Pset.Property` and bare property requests against each
//!   element's property and quantity sets
//! - One output row per element with at least one resolved value, with
//!   optional GlobalId and Name identity columns
//! - Progress reporting over a channel, with cooperative cancellation
//!
//! ## Example
//!
//! ```no_run
//! use ifc_prop_getter::extract::pipeline;
//! use ifc_prop_getter::model::{ExtractionJob, OutputFormat};
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! let job = ExtractionJob {
//!     ifc_path: "model.ifc".into(),
//!     properties: vec!["Pset_WallCommon.FireRating".into()],
//!     include_global_id: true,
//!     include_name: true,
//!     output_dir: ".".into(),
//!     base_filename: "walls".into(),
//!     format: OutputFormat::Csv,
//! };
//!
//! let (events, progress) = crossbeam_channel::unbounded();
//! let cancel = Arc::new(AtomicBool::new(false));
//! pipeline::run(&job, &events, &cancel);
//! for event in progress.try_iter() {
//!     println!("{event:?}");
//! }
//! ```

pub mod error;
pub mod export;
pub mod extract;
pub mod model;
pub mod parser;
