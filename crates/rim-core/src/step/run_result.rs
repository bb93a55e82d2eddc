use crate::errors::CoreEngineError;

/// Resultado abstracto de ejecutar un step. Los outcomes por artifact viven en
/// el `ExecutionContext`; aquí sólo se indica si el step abortó.
#[derive(Debug)]
pub enum StepRunResult {
    Success,
    Failure { error: CoreEngineError },
}

impl From<Result<(), CoreEngineError>> for StepRunResult {
    fn from(res: Result<(), CoreEngineError>) -> Self {
        match res {
            Ok(()) => StepRunResult::Success,
            Err(error) => StepRunResult::Failure { error },
        }
    }
}
