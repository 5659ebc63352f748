pub mod loader;
pub mod step;

pub use crate::error::LoadError;
pub use loader::{open_model, IfcModel};
pub use step::{StepEntity, StepFile, StepValue};
