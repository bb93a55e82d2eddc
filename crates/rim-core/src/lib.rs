//! rim-core: motor de etapas secuencial con cache por existencia de archivos.
//!
//! El core no sabe nada de superficies ni volúmenes: ejecuta `StepDefinition`s
//! en orden, cada una materializa artifacts a través del `ExecutionContext`,
//! que decide entre cache hit, producción atómica o fallo registrado.
pub mod cache;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod step;
pub mod tool;

pub use cache::ArtifactCache;
pub use engine::{FlowEngine, FlowReport};
pub use errors::CoreEngineError;
pub use event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore, JsonlEventStore};
pub use model::{Artifact, ArtifactKind, ArtifactOutcome, ExecutionContext, FailurePolicy, OutcomeStatus, Recipe};
pub use step::{StepDefinition, StepKind, StepRunResult, StepStatus};
pub use tool::{ProcessToolRunner, ToolInvocation, ToolRunner, ToolStatus};
