//! Plan inmutable compartido por todos los steps de una corrida.
use serde_json::{json, Value};

use rim_domain::{ArtifactLayout, BoundaryPlan, RunParameters, SubjectContext};

use crate::config::ToolConfig;
use crate::tools::ToolContracts;

#[derive(Debug, Clone)]
pub struct PipelinePlan {
    pub subject: SubjectContext,
    pub params: RunParameters,
    pub layout: ArtifactLayout,
    pub boundaries: BoundaryPlan,
    pub tools: ToolConfig,
}

impl PipelinePlan {
    pub fn new(subject: SubjectContext, params: RunParameters, tools: ToolConfig) -> Self {
        let layout = ArtifactLayout::new(&subject, &params);
        let boundaries = BoundaryPlan::for_params(&params);
        Self { subject,
               params,
               layout,
               boundaries,
               tools }
    }

    pub fn contracts(&self) -> ToolContracts<'_> {
        ToolContracts::new(&self.tools, &self.subject)
    }

    /// Parámetros comunes que entran al fingerprint de cada step.
    pub fn fingerprint_params(&self) -> Value {
        json!({
            "subject": self.subject.subject(),
            "params": serde_json::to_value(&self.params).unwrap_or(Value::Null),
            "tools": serde_json::to_value(&self.tools).unwrap_or(Value::Null),
        })
    }
}
