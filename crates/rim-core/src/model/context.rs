use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::{Artifact, ArtifactOutcome, OutcomeStatus};
use crate::cache::ArtifactCache;
use crate::errors::CoreEngineError;
use crate::tool::{ToolInvocation, ToolRunner};

/// Qué hacer cuando un artifact no se puede producir.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Registrar el fallo y seguir; las etapas siguientes verán la entrada
    /// ausente. Rerun reanuda desde el primer artifact faltante.
    #[default]
    Lenient,
    /// Abortar el flujo en el primer fallo.
    Strict,
}

/// Cómo se produce un artifact.
#[derive(Debug, Clone)]
pub enum Recipe {
    Tool(ToolInvocation),
    /// Copia literal de un archivo existente.
    Copy { source: PathBuf },
}

/// Contexto de ejecución entregado a `StepDefinition::run`.
pub struct ExecutionContext<'a> {
    runner: &'a dyn ToolRunner,
    cache: &'a ArtifactCache,
    policy: FailurePolicy,
    outcomes: Vec<ArtifactOutcome>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(runner: &'a dyn ToolRunner, cache: &'a ArtifactCache, policy: FailurePolicy) -> Self {
        Self { runner,
               cache,
               policy,
               outcomes: Vec::new() }
    }

    /// Produce `artifact` con `recipe` salvo que ya exista. Publica de forma
    /// atómica. En modo estricto un fallo se devuelve como error; en modo
    /// laxo sólo queda registrado.
    pub fn materialize(&mut self, artifact: Artifact, inputs: &[&Path], recipe: Recipe) -> Result<(), CoreEngineError> {
        if let Some(gated) = self.gate(&artifact, inputs) {
            return gated;
        }

        info!("producing {}", artifact.file_name());
        let runner = self.runner;
        let res = self.cache.publish(artifact.path(), |staging| match &recipe {
                                 Recipe::Tool(inv) => run_tool(runner, &inv.redirected(staging)),
                                 Recipe::Copy { source } => {
                                     fs::copy(source, staging).map_err(|e| CoreEngineError::io(source, &e))?;
                                     Ok("copy".to_string())
                                 }
                             });
        self.record(artifact, published(res))
    }

    /// Para herramientas que derivan sus propios nombres de salida: la
    /// herramienta escribe `invocation.output` en su lugar y `marker` es la
    /// entrada de cache. El marcador guarda la línea de comando, así que su
    /// nombre debe cambiar con cualquier parámetro que cambie la salida.
    pub fn materialize_in_place(&mut self,
                                marker: Artifact,
                                inputs: &[&Path],
                                invocation: ToolInvocation)
                                -> Result<(), CoreEngineError> {
        if let Some(gated) = self.gate(&marker, inputs) {
            return gated;
        }

        info!("producing {}", invocation.output.display());
        let runner = self.runner;
        let res = self.cache.publish(marker.path(), |staging| {
                                 // La salida previa pertenece a otra parametrización.
                                 if invocation.output.exists() {
                                     debug!("replacing {}", invocation.output.display());
                                     fs::remove_file(&invocation.output).map_err(|e| {
                                                                            CoreEngineError::io(&invocation.output, &e)
                                                                        })?;
                                 }
                                 let program = run_tool(runner, &invocation)?;
                                 if !invocation.output.is_file() {
                                     return Err(CoreEngineError::OutputNotWritten { program,
                                                                                    output: invocation.output.clone() });
                                 }
                                 fs::write(staging, invocation.display_line()).map_err(|e| CoreEngineError::io(staging, &e))?;
                                 Ok(program)
                             });
        self.record(marker, published(res))
    }

    /// Control común: cache hit o entrada ausente terminan aquí sin invocar
    /// nada. `None` significa que hay que producir el artifact.
    fn gate(&mut self, artifact: &Artifact, inputs: &[&Path]) -> Option<Result<(), CoreEngineError>> {
        if self.cache.is_cached(artifact.path()) {
            debug!("cached: {}", artifact.file_name());
            return Some(self.record(artifact.clone(), OutcomeStatus::Cached));
        }
        let missing = first_missing(inputs)?;
        Some(self.record(artifact.clone(), OutcomeStatus::Failed(CoreEngineError::MissingInput(missing))))
    }

    fn record(&mut self, artifact: Artifact, status: OutcomeStatus) -> Result<(), CoreEngineError> {
        let failure = match &status {
            OutcomeStatus::Failed(e) => {
                warn!("could not produce {}: {}", artifact.file_name(), e);
                Some(e.clone())
            }
            _ => None,
        };
        self.outcomes.push(ArtifactOutcome { artifact, status });
        match (failure, self.policy) {
            (Some(e), FailurePolicy::Strict) => Err(e),
            _ => Ok(()),
        }
    }

    pub fn outcomes(&self) -> &[ArtifactOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<ArtifactOutcome> {
        self.outcomes
    }
}

fn published(res: Result<(), CoreEngineError>) -> OutcomeStatus {
    match res {
        Ok(()) => OutcomeStatus::Produced,
        Err(e) => OutcomeStatus::Failed(e),
    }
}

fn first_missing(inputs: &[&Path]) -> Option<PathBuf> {
    inputs.iter().find(|p| !p.is_file()).map(|p| p.to_path_buf())
}

fn run_tool(runner: &dyn ToolRunner, invocation: &ToolInvocation) -> Result<String, CoreEngineError> {
    let status = runner.run(invocation)?;
    if status.success {
        Ok(invocation.program.clone())
    } else {
        Err(CoreEngineError::ToolFailed { program: invocation.program.clone(),
                                          status: status.code })
    }
}
