use serde_json::Value;

use super::run_result::StepRunResult;
use crate::model::ExecutionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind { Source, Transform, Sink }

/// Trait que define un Step. La salida debe depender sólo de los archivos de
/// entrada y de `base_params`.
pub trait StepDefinition {
    /// Identificador estable y único dentro del Flow.
    fn id(&self) -> &str;

    /// Nombre opcional amigable.
    fn name(&self) -> &str { self.id() }

    /// Parámetros deterministas del step; entran al fingerprint.
    fn base_params(&self) -> Value;

    fn run(&self, ctx: &mut ExecutionContext<'_>) -> StepRunResult;

    fn kind(&self) -> StepKind;
}
