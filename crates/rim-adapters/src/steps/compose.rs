//! ComposeRimStep (Transform)
//!
//! Por hemisferio: tres volúmenes de etiqueta (resta de volúmenes llenos por
//! código), su suma como rim del hemisferio, y finalmente el rim combinado
//! `lh + rh`. Nueve artifacts, cada uno con su propio control de cache.

use std::rc::Rc;

use serde_json::Value;

use rim_core::{Artifact, ArtifactKind, CoreEngineError, ExecutionContext, Recipe, StepDefinition, StepKind,
               StepRunResult};
use rim_domain::{Hemisphere, RimTarget, TissueLabel, VoxelExpr};

use crate::plan::PipelinePlan;

#[derive(Debug, Clone)]
pub struct ComposeRimStep {
    plan: Rc<PipelinePlan>,
}

impl ComposeRimStep {
    pub fn new(plan: Rc<PipelinePlan>) -> Self {
        Self { plan }
    }

    fn materialize_all(&self, ctx: &mut ExecutionContext<'_>) -> Result<(), CoreEngineError> {
        let layout = &self.plan.layout;
        let tools = self.plan.contracts();

        for hemi in Hemisphere::ALL {
            let mut labels = Vec::with_capacity(TissueLabel::ALL.len());
            for label in TissueLabel::ALL {
                let (minuend, subtrahend) = label.operands();
                let a = layout.filled(hemi, minuend);
                let b = layout.filled(hemi, subtrahend);
                let out = layout.label(hemi, label);
                let recipe = Recipe::Tool(tools.calc(&[a.as_path(), b.as_path()], label.expr(), &out));
                ctx.materialize(Artifact::new(ArtifactKind::LabelVolume, &out), &[a.as_path(), b.as_path()], recipe)?;
                labels.push(out);
            }

            let rim = layout.rim(RimTarget::Hemisphere(hemi));
            let inputs: Vec<_> = labels.iter().map(|p| p.as_path()).collect();
            let recipe = Recipe::Tool(tools.calc(&inputs, VoxelExpr::sum(), &rim));
            ctx.materialize(Artifact::new(ArtifactKind::RimVolume, rim), &inputs, recipe)?;
        }

        let lh = layout.rim(RimTarget::Hemisphere(Hemisphere::Left));
        let rh = layout.rim(RimTarget::Hemisphere(Hemisphere::Right));
        let both = layout.rim(RimTarget::Both);
        let recipe = Recipe::Tool(tools.calc(&[lh.as_path(), rh.as_path()], VoxelExpr::sum(), &both));
        ctx.materialize(Artifact::new(ArtifactKind::RimVolume, both), &[lh.as_path(), rh.as_path()], recipe)
    }
}

impl StepDefinition for ComposeRimStep {
    fn id(&self) -> &str {
        "compose_rim"
    }

    fn name(&self) -> &str {
        "rim composition"
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
