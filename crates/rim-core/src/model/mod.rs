//! Modelo neutral del motor: artifacts en disco y contexto de ejecución.

pub mod artifact;
pub mod context;

pub use artifact::{Artifact, ArtifactKind, ArtifactOutcome, OutcomeStatus};
pub use context::{ExecutionContext, FailurePolicy, Recipe};
