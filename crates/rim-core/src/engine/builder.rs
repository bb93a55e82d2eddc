//! Builder para `FlowEngine`.
//!
//! `EngineBuilderInit` recibe las piezas obligatorias (event store, runner de
//! herramientas y directorio de cache); `first_step` fija el step inicial y
//! `add_step` encadena los siguientes en orden de ejecución.
//!
//! ```ignore
//! let engine = FlowEngine::builder(InMemoryEventStore::default(), ProcessToolRunner::new(), work_dir)
//!     .policy(FailurePolicy::Strict)
//!     .first_step(BoundarySurfacesStep::new(plan.clone()))
//!     .add_step(FillVolumesStep::new(plan))
//!     .build();
//! ```

use std::path::PathBuf;

use crate::cache::ArtifactCache;
use crate::engine::FlowEngine;
use crate::event::EventStore;
use crate::model::FailurePolicy;
use crate::step::StepDefinition;
use crate::tool::ToolRunner;

pub struct EngineBuilderInit<E: EventStore> {
    pub(crate) event_store: E,
    pub(crate) runner: Box<dyn ToolRunner>,
    pub(crate) cache: ArtifactCache,
    pub(crate) policy: FailurePolicy,
}

impl<E: EventStore> EngineBuilderInit<E> {
    pub fn new(event_store: E, runner: impl ToolRunner + 'static, cache_root: impl Into<PathBuf>) -> Self {
        Self { event_store,
               runner: Box::new(runner),
               cache: ArtifactCache::new(cache_root),
               policy: FailurePolicy::default() }
    }

    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn first_step<S: StepDefinition + 'static>(self, step: S) -> EngineBuilder<E> {
        EngineBuilder { init: self,
                        steps: vec![Box::new(step)] }
    }
}

pub struct EngineBuilder<E: EventStore> {
    init: EngineBuilderInit<E>,
    steps: Vec<Box<dyn StepDefinition>>,
}

impl<E: EventStore> EngineBuilder<E> {
    pub fn add_step<S: StepDefinition + 'static>(mut self, step: S) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Variante para pasos decididos en tiempo de ejecución.
    pub fn add_step_if<S: StepDefinition + 'static>(self, include: bool, step: S) -> Self {
        if include { self.add_step(step) } else { self }
    }

    pub fn build(self) -> FlowEngine<E> {
        let EngineBuilderInit { event_store, runner, cache, policy } = self.init;
        FlowEngine::from_parts(event_store, runner, cache, policy, self.steps)
    }
}
