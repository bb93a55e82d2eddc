//! LayeringStep (Sink)
//!
//! Pasa cada rim (lh, rh, combinado) al motor de capas, que escribe
//! `<rim>_layers.nii.gz` junto al rim. La cache se controla con un marcador
//! que incluye número de capas y modelo: cambiar cualquiera de los dos vuelve
//! a invocar el motor.

use std::rc::Rc;

use serde_json::{json, Value};

use rim_core::{Artifact, ArtifactKind, CoreEngineError, ExecutionContext, StepDefinition, StepKind, StepRunResult};
use rim_domain::RimTarget;

use crate::plan::PipelinePlan;

#[derive(Debug, Clone)]
pub struct LayeringStep {
    plan: Rc<PipelinePlan>,
}

impl LayeringStep {
    pub fn new(plan: Rc<PipelinePlan>) -> Self {
        Self { plan }
    }

    fn materialize_all(&self, ctx: &mut ExecutionContext<'_>) -> Result<(), CoreEngineError> {
        let layout = &self.plan.layout;
        let tools = self.plan.contracts();
        let params = &self.plan.params;

        for target in RimTarget::ALL {
            let rim = layout.rim(target);
            let invocation = tools.layers(&rim, params.layers, params.model, &layout.layers(target));
            let marker = Artifact::new(ArtifactKind::LayerVolume, layout.layers_marker(target));
            ctx.materialize_in_place(marker, &[rim.as_path()], invocation)?;
        }
        Ok(())
    }
}

impl StepDefinition for LayeringStep {
    fn id(&self) -> &str {
        "layering"
    }

    fn base_params(&self) -> Value {
        json!({
            "plan": self.plan.fingerprint_params(),
            "layers": self.plan.params.layers,
            "model": self.plan.params.model,
        })
    }

    fn run(&self, ctx: &mut ExecutionContext<'_>) -> StepRunResult {
        self.materialize_all(ctx).into()
    }

    fn kind(&self) -> StepKind {
        StepKind::Sink
    }
}
