//! Definiciones relacionadas a Steps.
//!
//! Un Step es una etapa del pipeline que materializa un conjunto fijo de
//! artifacts. Cada artifact se controla de forma independiente contra la
//! cache, así que un step puede terminar con mezcla de hits y producciones.

pub mod definition;
mod run_result;
mod status;

pub use definition::{StepDefinition, StepKind};
pub use run_result::StepRunResult;
pub use status::StepStatus;
