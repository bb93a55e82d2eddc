//! Contexto del sujeto y nombres deterministas de artifacts.
//!
//! Todas las rutas del pipeline se derivan de `{subjects_dir, subject}` y, para
//! cada artifact, de `{hemisferio, rol}`. El directorio `laynii/` del sujeto
//! es a la vez el área de trabajo y la cache.
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::label::TissueLabel;
use crate::params::RunParameters;
use crate::surface::SurfaceRole;

pub const WORK_DIR_NAME: &str = "laynii";
pub const BRAIN_VOLUME: &str = "brain.finalsurfs.mgz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    Left,
    Right,
}

impl Hemisphere {
    pub const ALL: [Hemisphere; 2] = [Hemisphere::Left, Hemisphere::Right];

    /// Prefijo Freesurfer (`lh`/`rh`).
    pub fn prefix(self) -> &'static str {
        match self {
            Hemisphere::Left => "lh",
            Hemisphere::Right => "rh",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Volumen rim a capas: uno por hemisferio o el combinado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RimTarget {
    Hemisphere(Hemisphere),
    Both,
}

impl RimTarget {
    pub const ALL: [RimTarget; 3] = [RimTarget::Hemisphere(Hemisphere::Left),
                                     RimTarget::Hemisphere(Hemisphere::Right),
                                     RimTarget::Both];

    pub fn prefix(self) -> &'static str {
        match self {
            RimTarget::Hemisphere(h) => h.prefix(),
            RimTarget::Both => "both",
        }
    }
}

/// Sujeto de una corrida. Inmutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectContext {
    subjects_dir: PathBuf,
    subject: String,
}

impl SubjectContext {
    pub fn new(subjects_dir: impl Into<PathBuf>, subject: impl Into<String>) -> Result<Self, DomainError> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(DomainError::EmptySubject);
        }
        Ok(Self { subjects_dir: subjects_dir.into(),
                  subject })
    }

    pub fn subjects_dir(&self) -> &Path {
        &self.subjects_dir
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn subject_dir(&self) -> PathBuf {
        self.subjects_dir.join(&self.subject)
    }

    pub fn surf_dir(&self) -> PathBuf {
        self.subject_dir().join("surf")
    }

    pub fn mri_dir(&self) -> PathBuf {
        self.subject_dir().join("mri")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.subject_dir().join(WORK_DIR_NAME)
    }

    pub fn brain_volume(&self) -> PathBuf {
        self.mri_dir().join(BRAIN_VOLUME)
    }

    pub fn white_surface(&self, hemi: Hemisphere) -> PathBuf {
        self.surf_dir().join(format!("{}.white", hemi.prefix()))
    }
}

/// Nombres de todos los artifacts dentro de `laynii/`.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    work_dir: PathBuf,
    resolution_tag: String,
    /// `n<capas>.<modelo>`, distingue corridas de capas con otros parámetros.
    layering_tag: String,
}

impl ArtifactLayout {
    pub fn new(subject: &SubjectContext, params: &RunParameters) -> Self {
        Self { work_dir: subject.work_dir(),
               resolution_tag: params.resolution_tag(),
               layering_tag: format!("n{}.{}", params.layers, params.model.tag()) }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Volumen anatómico sobremuestreado que sirve de plantilla.
    pub fn reference_volume(&self) -> PathBuf {
        self.work_dir.join(format!("brain.finalsurfs.{}.mgz", self.resolution_tag))
    }

    pub fn surface(&self, hemi: Hemisphere, role: SurfaceRole) -> PathBuf {
        self.work_dir.join(format!("{}.{}", hemi.prefix(), role.tag()))
    }

    pub fn filled(&self, hemi: Hemisphere, role: SurfaceRole) -> PathBuf {
        self.work_dir.join(format!("{}.{}.filled.mgz", hemi.prefix(), role.tag()))
    }

    pub fn label(&self, hemi: Hemisphere, label: TissueLabel) -> PathBuf {
        self.work_dir.join(format!("{}.label_{}.mgz", hemi.prefix(), label.tag()))
    }

    pub fn rim(&self, target: RimTarget) -> PathBuf {
        self.work_dir.join(format!("{}.rim.nii.gz", target.prefix()))
    }

    /// Salida del motor de capas para un rim (LN2_LAYERS la nombra así).
    pub fn layers(&self, target: RimTarget) -> PathBuf {
        self.work_dir.join(format!("{}.rim_layers.nii.gz", target.prefix()))
    }

    /// Clave de cache del motor de capas: cambia con el número de capas y el
    /// modelo, de modo que otra parametrización vuelve a invocar la herramienta.
    pub fn layers_marker(&self, target: RimTarget) -> PathBuf {
        self.work_dir.join(format!("{}.rim_layers.{}.done", target.prefix(), self.layering_tag))
    }
}
