//! BoundarySurfacesStep (Source)
//!
//! Por hemisferio genera las cuatro superficies de frontera a partir de la
//! white y de la mejor pial disponible. En modo distancia `gm_outer` y
//! `gm_inner` son copias literales de pial y white.

use std::rc::Rc;

use log::debug;
use serde_json::Value;

use rim_core::{Artifact, ArtifactKind, CoreEngineError, ExecutionContext, Recipe, StepDefinition, StepKind,
               StepRunResult};
use rim_domain::{resolve_pial, Derivation, Hemisphere, SourceSurface};

use crate::plan::PipelinePlan;

#[derive(Debug, Clone)]
pub struct BoundarySurfacesStep {
    plan: Rc<PipelinePlan>,
}

impl BoundarySurfacesStep {
    pub fn new(plan: Rc<PipelinePlan>) -> Self {
        Self { plan }
    }

    fn materialize_all(&self, ctx: &mut ExecutionContext<'_>) -> Result<(), CoreEngineError> {
        let plan = &self.plan;
        let tools = plan.contracts();
        let surf_dir = plan.subject.surf_dir();

        for hemi in Hemisphere::ALL {
            let (variant, pial) = resolve_pial(&surf_dir, hemi);
            debug!("{hemi}: pial source {:?} ({})", variant, pial.display());
            let white = plan.subject.white_surface(hemi);

            for spec in &plan.boundaries.specs {
                let source = match spec.source {
                    SourceSurface::Pial => &pial,
                    SourceSurface::White => &white,
                };
                let target = plan.layout.surface(hemi, spec.role);
                let recipe = match spec.derivation {
                    Derivation::Expand { displacement, thickness } => {
                        Recipe::Tool(tools.expand(source, displacement, thickness, &target))
                    }
                    Derivation::Copy => Recipe::Copy { source: source.clone() },
                };
                ctx.materialize(Artifact::new(ArtifactKind::Surface, target), &[source.as_path()], recipe)?;
            }
        }
        Ok(())
    }
}

impl StepDefinition for BoundarySurfacesStep {
    fn id(&self) -> &str {
        "boundary_surfaces"
    }

    fn name(&self) -> &str {
        "boundary surfaces"
    }

    fn base_params(&self) -> Value {
        self.plan.fingerprint_params()
    }

    fn run(&self, ctx: &mut ExecutionContext<'_>) -> StepRunResult {
        self.materialize_all(ctx).into()
    }

    fn kind(&self) -> StepKind {
        StepKind::Source
    }
}
