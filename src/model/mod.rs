pub mod element;
pub mod job;
pub mod progress;
pub mod value;

pub use element::Element;
pub use job::{ExtractionJob, OutputFormat};
pub use progress::ProgressEvent;
pub use value::{PropertySets, PropertyValue};
