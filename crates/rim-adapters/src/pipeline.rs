//! Ensamblado del flujo completo sobre un `FlowEngine`.
use std::rc::Rc;

use rim_core::{EventStore, FailurePolicy, FlowEngine, ToolRunner};

use crate::plan::PipelinePlan;
use crate::steps::{BoundarySurfacesStep, ComposeRimStep, FillVolumesStep, LayeringStep};

/// Fronteras, llenado y composición siempre; capas sólo si el stop flag lo
/// permite. La cache vive en el directorio de trabajo del sujeto.
pub fn build_pipeline<E, R>(plan: Rc<PipelinePlan>, event_store: E, runner: R, policy: FailurePolicy) -> FlowEngine<E>
    where E: EventStore,
          R: ToolRunner + 'static
{
    let work_dir = plan.layout.work_dir().to_path_buf();
    let run_layering = plan.params.run_layering;
    FlowEngine::builder(event_store, runner, work_dir).policy(policy)
                                                      .first_step(BoundarySurfacesStep::new(plan.clone()))
                                                      .add_step(FillVolumesStep::new(plan.clone()))
                                                      .add_step(ComposeRimStep::new(plan.clone()))
                                                      .add_step_if(run_layering, LayeringStep::new(plan))
                                                      .build()
}
