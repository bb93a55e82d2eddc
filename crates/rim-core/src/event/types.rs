//! Tipos de evento del flujo y estructura `FlowEvent`.
//!
//! Cada ejecución del `FlowEngine` emite eventos a un `EventStore`
//! append-only. Sirven como registro de procedencia de una corrida: qué se
//! reutilizó de la cache, qué se produjo y qué falló.
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreEngineError;
use crate::model::ArtifactKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowEventKind {
    /// Primer evento de un `flow_id`.
    FlowInitialized { definition_hash: String, step_count: usize },
    StepStarted { step_index: usize, step_id: String },
    /// El artifact ya existía en disco.
    ArtifactCached { step_id: String, kind: ArtifactKind, path: PathBuf },
    ArtifactProduced { step_id: String, kind: ArtifactKind, path: PathBuf },
    ArtifactFailed {
        step_id: String,
        kind: ArtifactKind,
        path: PathBuf,
        error: CoreEngineError,
    },
    /// El step terminó; `failed` cuenta artifacts no producidos (modo laxo).
    StepFinished {
        step_index: usize,
        step_id: String,
        fingerprint: String,
        failed: usize,
    },
    /// El step abortó el flujo (modo estricto).
    StepFailed {
        step_index: usize,
        step_id: String,
        error: CoreEngineError,
        fingerprint: String,
    },
    /// Cierre con fingerprint agregado de los steps.
    FlowCompleted { flow_fingerprint: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEvent {
    pub seq: u64,
    pub flow_id: Uuid,
    pub kind: FlowEventKind,
    pub ts: DateTime<Utc>, // metadato (no entra en fingerprint)
}
