use std::path::PathBuf;

use uuid::Uuid;

use crate::errors::CoreEngineError;
use crate::step::StepStatus;

/// Resumen de una corrida del `FlowEngine`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowReport {
    pub flow_id: Uuid,
    pub cached: usize,
    pub produced: usize,
    pub failed: Vec<(PathBuf, CoreEngineError)>,
    /// Invocaciones de herramientas externas durante la corrida.
    pub invocations: usize,
    pub steps: Vec<(String, StepStatus)>,
    pub flow_fingerprint: Option<String>,
}

impl FlowReport {
    pub(crate) fn new(flow_id: Uuid) -> Self {
        Self { flow_id,
               cached: 0,
               produced: 0,
               failed: Vec::new(),
               invocations: 0,
               steps: Vec::new(),
               flow_fingerprint: None }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
