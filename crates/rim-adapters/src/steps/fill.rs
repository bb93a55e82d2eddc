//! FillVolumesStep (Transform)
//!
//! Crea de forma perezosa el volumen de referencia sobremuestreado y luego
//! rasteriza las ocho superficies (2 hemisferios x 4 roles) usándolo como
//! plantilla espacial.

use std::rc::Rc;

use serde_json::Value;

use rim_core::{Artifact, ArtifactKind, CoreEngineError, ExecutionContext, Recipe, StepDefinition, StepKind,
               StepRunResult};
use rim_domain::{Hemisphere, SurfaceRole};

use crate::plan::PipelinePlan;

#[derive(Debug, Clone)]
pub struct FillVolumesStep {
    plan: Rc<PipelinePlan>,
}

impl FillVolumesStep {
    pub fn new(plan: Rc<PipelinePlan>) -> Self {
        Self { plan }
    }

    fn materialize_all(&self, ctx: &mut ExecutionContext<'_>) -> Result<(), CoreEngineError> {
        let plan = &self.plan;
        let tools = plan.contracts();
        let resolution = plan.params.resolution;

        let brain = plan.subject.brain_volume();
        let reference = plan.layout.reference_volume();
        ctx.materialize(Artifact::new(ArtifactKind::ReferenceVolume, &reference),
                        &[brain.as_path()],
                        Recipe::Tool(tools.resample(&brain, resolution, &reference)))?;

        for hemi in Hemisphere::ALL {
            for role in SurfaceRole::ALL {
                let surface = plan.layout.surface(hemi, role);
                let filled = plan.layout.filled(hemi, role);
                let recipe = Recipe::Tool(tools.fill(&reference, resolution, &surface, &filled));
                ctx.materialize(Artifact::new(ArtifactKind::FilledVolume, filled),
                                &[reference.as_path(), surface.as_path()],
                                recipe)?;
            }
        }
        Ok(())
    }
}

impl StepDefinition for FillVolumesStep {
    fn id(&self) -> &str {
        "fill_volumes"
    }

    fn name(&self) -> &str {
        "surface to volume"
    }

    fn base_params(&self) -> Value {
        self.plan.fingerprint_params()
    }

    fn run(&self, ctx: &mut ExecutionContext<'_>) -> StepRunResult {
        self.materialize_all(ctx).into()
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }
}
