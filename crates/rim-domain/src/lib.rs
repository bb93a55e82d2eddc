//! rim-domain: sujeto, parámetros y geometría de fronteras.
//!
//! Tipos puros, sin invocar herramientas: la capa de adaptación traduce estos
//! planes a invocaciones concretas.
pub mod error;
pub mod label;
pub mod params;
pub mod subject;
pub mod surface;

pub use error::DomainError;
pub use label::{TissueLabel, VoxelExpr, VoxelOp};
pub use params::{BoundaryMetric, LayeringModel, Offset, RawOptions, RunParameters, StopFlag};
pub use subject::{ArtifactLayout, Hemisphere, RimTarget, SubjectContext};
pub use surface::{resolve_pial, BoundaryPlan, BoundarySpec, Derivation, ExpandAmount, PialVariant, SourceSurface,
                  SurfaceRole};
