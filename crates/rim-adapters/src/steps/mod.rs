//! Etapas del pipeline, en orden de ejecución:
//! fronteras -> llenado -> composición del rim -> capas.

pub mod boundaries;
pub mod compose;
pub mod fill;
pub mod layering;

pub use boundaries::BoundarySurfacesStep;
pub use compose::ComposeRimStep;
pub use fill::FillVolumesStep;
pub use layering::LayeringStep;
