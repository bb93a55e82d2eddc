//! Artifact neutral del flujo.
//!
//! Un `Artifact` es un archivo con nombre determinista dentro del directorio
//! de trabajo. El motor no interpreta su contenido: la existencia del archivo
//! es la entrada de cache.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::CoreEngineError;

/// Tipos de artifact que circulan por el pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    ReferenceVolume,
    Surface,
    FilledVolume,
    LabelVolume,
    RimVolume,
    LayerVolume,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, path: impl Into<PathBuf>) -> Self {
        Self { kind,
               path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Nombre de archivo, usado como etiqueta en eventos y logs.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Resultado de materializar un artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// El archivo ya existía; no se invocó nada.
    Cached,
    /// El archivo se produjo en esta ejecución.
    Produced,
    Failed(CoreEngineError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOutcome {
    pub artifact: Artifact,
    pub status: OutcomeStatus,
}

impl ArtifactOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed(_))
    }
}
