//! Una corrida completa: resolver parámetros, armar el pipeline y ejecutarlo.
use std::rc::Rc;

use log::{info, warn};

use rim_adapters::{build_pipeline, PipelinePlan};
use rim_core::{FailurePolicy, FlowReport, InMemoryEventStore, JsonlEventStore, ProcessToolRunner, ToolRunner};
use rim_domain::SubjectContext;

use crate::cli::RunRequest;
use crate::config::AppConfig;
use crate::errors::AppError;

/// Ejecuta el pipeline con las herramientas reales del `PATH`.
pub fn run(request: &RunRequest, config: &AppConfig) -> Result<FlowReport, AppError> {
    run_with(request, config, ProcessToolRunner::new())
}

/// Igual que `run` pero con un runner a elección (p. ej. el simulado).
pub fn run_with<R>(request: &RunRequest, config: &AppConfig, runner: R) -> Result<FlowReport, AppError>
    where R: ToolRunner + 'static
{
    let params = request.raw.resolve()?;
    let subject = SubjectContext::new(&request.subjects_dir, &request.subject)?;
    if !subject.subject_dir().is_dir() {
        warn!("subject directory {} does not exist", subject.subject_dir().display());
    }

    let policy = if request.strict || config.strict { FailurePolicy::Strict } else { FailurePolicy::Lenient };
    info!("subject {} | metric {:?} | resolution {} mm | expand {} | shrink {} | layers {} ({:?}) | {:?}",
          subject.subject(),
          params.metric,
          params.resolution,
          params.expand,
          params.shrink,
          params.layers,
          params.model,
          policy);
    if !params.run_layering {
        info!("layering disabled by stop flag");
    }

    let plan = Rc::new(PipelinePlan::new(subject, params, config.tools.clone()));
    let report = match request.event_log.as_ref().or(config.event_log.as_ref()) {
        Some(path) => {
            let store = JsonlEventStore::open(path)?;
            build_pipeline(plan, store, runner, policy).run()?
        }
        None => build_pipeline(plan, InMemoryEventStore::default(), runner, policy).run()?,
    };

    info!("done: {} produced, {} cached, {} failed, {} tool invocation(s)",
          report.produced,
          report.cached,
          report.failed.len(),
          report.invocations);
    Ok(report)
}
