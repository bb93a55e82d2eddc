//! Adaptadores del pipeline: contratos de herramientas, steps concretos y el
//! ensamblado del flujo. `simulated` ofrece un runner sin Freesurfer ni LayNii
//! para pruebas.
pub mod config;
pub mod pipeline;
pub mod plan;
pub mod simulated;
pub mod steps;
pub mod tools;

pub use config::ToolConfig;
pub use pipeline::build_pipeline;
pub use plan::PipelinePlan;
pub use simulated::{SimVolume, SimulatedToolRunner};
pub use steps::{BoundarySurfacesStep, ComposeRimStep, FillVolumesStep, LayeringStep};
pub use tools::{ToolContracts, SUBJECTS_DIR_ENV};
