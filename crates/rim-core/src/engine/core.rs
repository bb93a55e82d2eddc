//! Core FlowEngine implementation

use std::path::PathBuf;

use log::{info, warn};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::cache::ArtifactCache;
use crate::engine::{EngineBuilderInit, FlowReport};
use crate::errors::CoreEngineError;
use crate::event::{EventStore, FlowEvent, FlowEventKind};
use crate::hashing::hash_value;
use crate::model::{ArtifactOutcome, ExecutionContext, FailurePolicy, OutcomeStatus};
use crate::step::{StepDefinition, StepRunResult, StepStatus};
use crate::tool::ToolRunner;

/// Motor de ejecución secuencial.
///
/// Ejecuta los steps en orden, uno a la vez, sin paralelismo. Cada step
/// consulta la cache por artifact; el motor sólo registra los outcomes como
/// eventos y decide, según la `FailurePolicy`, si el flujo continúa.
pub struct FlowEngine<E>
    where E: EventStore
{
    event_store: E,
    runner: Box<dyn ToolRunner>,
    cache: ArtifactCache,
    policy: FailurePolicy,
    steps: Vec<Box<dyn StepDefinition>>,
    definition_hash: String,
    last_flow_id: Option<Uuid>,
}

impl<E> FlowEngine<E>
    where E: EventStore
{
    /// Crea un nuevo builder para configurar el engine
    #[inline]
    pub fn builder(event_store: E,
                   runner: impl ToolRunner + 'static,
                   cache_root: impl Into<PathBuf>)
                   -> EngineBuilderInit<E> {
        EngineBuilderInit::new(event_store, runner, cache_root)
    }

    pub(crate) fn from_parts(event_store: E,
                             runner: Box<dyn ToolRunner>,
                             cache: ArtifactCache,
                             policy: FailurePolicy,
                             steps: Vec<Box<dyn StepDefinition>>)
                             -> Self {
        let definition_hash = definition_hash(&steps);
        Self { event_store,
               runner,
               cache,
               policy,
               steps,
               definition_hash,
               last_flow_id: None }
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id()).collect()
    }

    /// Eventos de la última corrida.
    pub fn events(&self) -> Vec<FlowEvent> {
        self.last_flow_id.map(|fid| self.event_store.list(fid)).unwrap_or_default()
    }

    /// Ejecuta todos los steps. Cada llamada es una corrida nueva con su
    /// propio `flow_id`; lo ya publicado en disco se reutiliza.
    pub fn run(&mut self) -> Result<FlowReport, CoreEngineError> {
        if self.steps.is_empty() {
            return Err(CoreEngineError::EmptyFlow);
        }
        self.cache.ensure_root()?;

        let flow_id = Uuid::new_v4();
        self.last_flow_id = Some(flow_id);
        let invocations_before = self.runner.invocation_count();
        let mut report = FlowReport::new(flow_id);
        let mut step_fps: Vec<String> = Vec::with_capacity(self.steps.len());

        self.event_store.append_kind(flow_id,
                                     FlowEventKind::FlowInitialized { definition_hash: self.definition_hash.clone(),
                                                                      step_count: self.steps.len() });

        let total = self.steps.len();
        for (index, step) in self.steps.iter().enumerate() {
            info!("[{}/{}] {}", index + 1, total, step.name());
            self.event_store.append_kind(flow_id,
                                         FlowEventKind::StepStarted { step_index: index,
                                                                      step_id: step.id().to_string() });

            let params = step.base_params();
            let mut ctx = ExecutionContext::new(self.runner.as_ref(), &self.cache, self.policy);
            let result = step.run(&mut ctx);
            let outcomes = ctx.into_outcomes();

            let mut failed = 0;
            for outcome in &outcomes {
                if outcome.is_failed() {
                    failed += 1;
                }
                tally(&mut report, outcome);
                self.event_store.append_kind(flow_id, outcome_event(step.id(), outcome));
            }
            let fp = step_fingerprint(&self.definition_hash, index, step.id(), &params, &outcomes);

            match result {
                StepRunResult::Success => {
                    let status = if failed == 0 { StepStatus::FinishedOk } else { StepStatus::FinishedWithFailures };
                    report.steps.push((step.id().to_string(), status));
                    self.event_store.append_kind(flow_id,
                                                 FlowEventKind::StepFinished { step_index: index,
                                                                               step_id: step.id().to_string(),
                                                                               fingerprint: fp.clone(),
                                                                               failed });
                    step_fps.push(fp);
                }
                StepRunResult::Failure { error } => {
                    report.steps.push((step.id().to_string(), StepStatus::Failed));
                    self.event_store.append_kind(flow_id,
                                                 FlowEventKind::StepFailed { step_index: index,
                                                                             step_id: step.id().to_string(),
                                                                             error: error.clone(),
                                                                             fingerprint: fp });
                    return Err(CoreEngineError::StepFailed { step_id: step.id().to_string(),
                                                             cause: Box::new(error) });
                }
            }
        }

        let flow_fp = hash_value(&json!({
                                     "engine_version": crate::constants::ENGINE_VERSION,
                                     "definition_hash": self.definition_hash,
                                     "step_fingerprints": step_fps
                                 }));
        self.event_store
            .append_kind(flow_id, FlowEventKind::FlowCompleted { flow_fingerprint: flow_fp.clone() });

        report.flow_fingerprint = Some(flow_fp);
        report.invocations = self.runner.invocation_count() - invocations_before;
        if !report.is_clean() {
            warn!("{} artifact(s) could not be produced; rerun to resume", report.failed.len());
        }
        Ok(report)
    }
}

fn tally(report: &mut FlowReport, outcome: &ArtifactOutcome) {
    match &outcome.status {
        OutcomeStatus::Cached => report.cached += 1,
        OutcomeStatus::Produced => report.produced += 1,
        OutcomeStatus::Failed(e) => report.failed.push((outcome.artifact.path.clone(), e.clone())),
    }
}

fn outcome_event(step_id: &str, outcome: &ArtifactOutcome) -> FlowEventKind {
    let step_id = step_id.to_string();
    let kind = outcome.artifact.kind;
    let path = outcome.artifact.path.clone();
    match &outcome.status {
        OutcomeStatus::Cached => FlowEventKind::ArtifactCached { step_id, kind, path },
        OutcomeStatus::Produced => FlowEventKind::ArtifactProduced { step_id, kind, path },
        OutcomeStatus::Failed(error) => FlowEventKind::ArtifactFailed { step_id,
                                                                        kind,
                                                                        path,
                                                                        error: error.clone() },
    }
}

fn definition_hash(steps: &[Box<dyn StepDefinition>]) -> String {
    let steps: Vec<Value> = steps.iter()
                                 .map(|s| json!({ "id": s.id(), "params": s.base_params() }))
                                 .collect();
    hash_value(&json!({
                   "engine_version": crate::constants::ENGINE_VERSION,
                   "steps": steps
               }))
}

/// El fingerprint depende de parámetros y rutas de salida, no del estado de
/// cache: una corrida que reutiliza todo da el mismo valor que la primera.
fn step_fingerprint(definition_hash: &str,
                    index: usize,
                    step_id: &str,
                    params: &Value,
                    outcomes: &[ArtifactOutcome])
                    -> String {
    let outputs: Vec<String> = outcomes.iter()
                                       .map(|o| o.artifact.path.display().to_string())
                                       .collect();
    hash_value(&json!({
                   "engine_version": crate::constants::ENGINE_VERSION,
                   "definition_hash": definition_hash,
                   "step_index": index,
                   "step_id": step_id,
                   "output_paths": outputs,
                   "params": params
               }))
}
