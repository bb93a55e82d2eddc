//! Engine module: motor secuencial, builder y reporte de corrida.

pub mod builder;
pub mod core;
pub mod report;

pub use builder::{EngineBuilder, EngineBuilderInit};
pub use self::core::FlowEngine;
pub use report::FlowReport;

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};

    use serde_json::{json, Value};

    use super::*;
    use crate::errors::CoreEngineError;
    use crate::event::{FlowEventKind, InMemoryEventStore};
    use crate::model::{Artifact, ArtifactKind, ExecutionContext, FailurePolicy, Recipe};
    use crate::step::{StepDefinition, StepKind, StepRunResult, StepStatus};
    use crate::tool::{ToolInvocation, ToolRunner, ToolStatus};

    /// Runner que escribe el nombre del programa en la salida declarada.
    #[derive(Default)]
    struct EchoRunner {
        calls: RefCell<Vec<String>>,
        fail: Option<&'static str>,
    }

    impl ToolRunner for EchoRunner {
        fn run(&self, inv: &ToolInvocation) -> Result<ToolStatus, CoreEngineError> {
            self.calls.borrow_mut().push(inv.program.clone());
            if self.fail == Some(inv.program.as_str()) {
                return Ok(ToolStatus::failed(Some(1)));
            }
            fs::write(&inv.output, inv.program.as_bytes()).map_err(|e| CoreEngineError::io(&inv.output, &e))?;
            Ok(ToolStatus::ok())
        }
        fn invocation_count(&self) -> usize { self.calls.borrow().len() }
    }

    /// Step que produce `out` a partir de `input` con el programa `program`.
    struct WriteStep {
        id: &'static str,
        program: &'static str,
        input: Option<PathBuf>,
        out: PathBuf,
    }

    impl StepDefinition for WriteStep {
        fn id(&self) -> &str { self.id }
        fn base_params(&self) -> Value { json!({ "program": self.program }) }
        fn run(&self, ctx: &mut ExecutionContext<'_>) -> StepRunResult {
            let inputs: Vec<&Path> = self.input.iter().map(|p| p.as_path()).collect();
            ctx.materialize(Artifact::new(ArtifactKind::Surface, &self.out),
                            &inputs,
                            Recipe::Tool(ToolInvocation::new(self.program, &self.out).arg(&self.out)))
               .into()
        }
        fn kind(&self) -> StepKind { if self.input.is_none() { StepKind::Source } else { StepKind::Transform } }
    }

    fn two_steps(dir: &Path) -> (WriteStep, WriteStep) {
        let a = dir.join("a.out");
        let b = dir.join("b.out");
        (WriteStep { id: "a", program: "tool_a", input: None, out: a.clone() },
         WriteStep { id: "b", program: "tool_b", input: Some(a), out: b })
    }

    #[test]
    fn second_run_is_all_cache_hits() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = two_steps(dir.path());
        let mut engine = FlowEngine::builder(InMemoryEventStore::default(), EchoRunner::default(), dir.path())
            .first_step(a)
            .add_step(b)
            .build();

        let first = engine.run().expect("first run");
        assert_eq!(first.produced, 2);
        assert_eq!(first.invocations, 2);

        let second = engine.run().expect("second run");
        assert_eq!(second.produced, 0);
        assert_eq!(second.cached, 2);
        assert_eq!(second.invocations, 0);
        assert_eq!(first.flow_fingerprint, second.flow_fingerprint);
    }

    #[test]
    fn lenient_failure_propagates_as_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = two_steps(dir.path());
        let runner = EchoRunner { fail: Some("tool_a"), ..Default::default() };
        let mut engine = FlowEngine::builder(InMemoryEventStore::default(), runner, dir.path())
            .first_step(a)
            .add_step(b)
            .build();

        let report = engine.run().expect("lenient run completes");
        assert_eq!(report.failed.len(), 2);
        assert!(matches!(report.failed[0].1, CoreEngineError::ToolFailed { .. }));
        assert!(matches!(report.failed[1].1, CoreEngineError::MissingInput(_)));
        // tool_b nunca se invoca sin su entrada
        assert_eq!(report.invocations, 1);
        assert_eq!(report.steps, vec![("a".to_string(), StepStatus::FinishedWithFailures),
                                      ("b".to_string(), StepStatus::FinishedWithFailures)]);
    }

    #[test]
    fn strict_failure_aborts_flow() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = two_steps(dir.path());
        let runner = EchoRunner { fail: Some("tool_a"), ..Default::default() };
        let mut engine = FlowEngine::builder(InMemoryEventStore::default(), runner, dir.path())
            .policy(FailurePolicy::Strict)
            .first_step(a)
            .add_step(b)
            .build();

        let err = engine.run().unwrap_err();
        assert!(matches!(err, CoreEngineError::StepFailed { ref step_id, .. } if step_id == "a"));
        let kinds: Vec<_> = engine.events().into_iter().map(|e| e.kind).collect();
        assert!(kinds.iter().any(|k| matches!(k, FlowEventKind::StepFailed { .. })));
        assert!(!kinds.iter().any(|k| matches!(k, FlowEventKind::StepStarted { step_id, .. } if step_id == "b")));
        assert!(!kinds.iter().any(|k| matches!(k, FlowEventKind::FlowCompleted { .. })));
    }
}
