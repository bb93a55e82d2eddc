use thiserror::Error;

use rim_core::CoreEngineError;
use rim_domain::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Parámetros inválidos: {0}")]
    Domain(#[from] DomainError),
    #[error("Error del pipeline: {0}")]
    Engine(#[from] CoreEngineError),
}
