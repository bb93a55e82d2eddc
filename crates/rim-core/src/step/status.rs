/// Estado final de un Step dentro de una corrida.
///
/// - `FinishedOk`: todos sus artifacts están en disco.
/// - `FinishedWithFailures`: terminó en modo laxo con artifacts faltantes.
/// - `Failed`: abortó el flujo (modo estricto).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    FinishedOk,
    /// Terminó, pero algún artifact no se pudo producir.
    FinishedWithFailures,
    Failed,
}
