//! Cache de artifacts basada en existencia de archivos.
//!
//! La existencia del archivo destino ES la entrada de cache: no hay metadata
//! ni checksums. Para que una ejecución interrumpida no deje una entrada falsa,
//! toda producción escribe primero en un archivo de staging del mismo
//! directorio (`.partial.<nombre>`, conserva la extensión que las herramientas
//! usan para elegir formato) y sólo se renombra al destino si el productor
//! terminó bien y el staging existe.
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::constants::STAGING_PREFIX;
use crate::errors::CoreEngineError;

#[derive(Debug, Clone)]
pub struct ArtifactCache {
    root: PathBuf,
}

impl ArtifactCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Crea el directorio de trabajo si no existe.
    pub fn ensure_root(&self) -> Result<(), CoreEngineError> {
        fs::create_dir_all(&self.root).map_err(|e| CoreEngineError::io(&self.root, &e))
    }

    pub fn is_cached(&self, target: &Path) -> bool {
        target.is_file()
    }

    /// Ruta de staging para `target`, en el mismo directorio.
    pub fn staging_path(target: &Path) -> PathBuf {
        let name = target.file_name()
                         .map(|n| n.to_string_lossy().into_owned())
                         .unwrap_or_default();
        target.with_file_name(format!("{STAGING_PREFIX}{name}"))
    }

    /// Ejecuta `produce` sobre la ruta de staging y publica el resultado en
    /// `target` con un rename. `produce` debe devolver el nombre del programa
    /// que escribió el archivo, para reportar salidas ausentes.
    pub fn publish<F>(&self, target: &Path, produce: F) -> Result<(), CoreEngineError>
        where F: FnOnce(&Path) -> Result<String, CoreEngineError>
    {
        let staging = Self::staging_path(target);
        if staging.exists() {
            warn!("removing stale staging file {}", staging.display());
            remove_quietly(&staging);
        }

        let producer = match produce(&staging) {
            Ok(p) => p,
            Err(e) => {
                remove_quietly(&staging);
                return Err(e);
            }
        };

        if !staging.is_file() {
            return Err(CoreEngineError::OutputNotWritten { program: producer,
                                                           output: target.to_path_buf() });
        }
        fs::rename(&staging, target).map_err(|e| {
                                        remove_quietly(&staging);
                                        CoreEngineError::io(target, &e)
                                    })?;
        debug!("published {}", target.display());
        Ok(())
    }
}

fn remove_quietly(path: &Path) {
    if !path.exists() {
        return;
    }
    if let Err(e) = fs::remove_file(path) {
        warn!("could not remove staging file {}: {}", path.display(), e);
    }
}
