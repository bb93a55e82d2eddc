//! Superficies de frontera derivadas y selección de la superficie pial.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::params::{BoundaryMetric, Offset, RunParameters};
use crate::subject::Hemisphere;

/// Rol de una superficie derivada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceRole {
    /// Frontera exterior del LCR (fuera de la pial).
    CsfOuter,
    /// Frontera exterior de la sustancia gris.
    GmOuter,
    /// Frontera de sustancia blanca (dentro de la white).
    WmBoundary,
    /// Frontera interior de la sustancia gris.
    GmInner,
}

impl SurfaceRole {
    /// Orden canónico de generación y llenado.
    pub const ALL: [SurfaceRole; 4] =
        [SurfaceRole::CsfOuter, SurfaceRole::GmOuter, SurfaceRole::WmBoundary, SurfaceRole::GmInner];

    pub fn tag(self) -> &'static str {
        match self {
            SurfaceRole::CsfOuter => "csf_outer",
            SurfaceRole::GmOuter => "gm_outer",
            SurfaceRole::WmBoundary => "wm_boundary",
            SurfaceRole::GmInner => "gm_inner",
        }
    }

    /// Inverso de `tag`, tolerando sufijos (`lh.gm_outer.filled.mgz`).
    pub fn from_file_name(name: &str) -> Option<SurfaceRole> {
        let mut parts = name.split('.');
        let _hemi = parts.next()?;
        let tag = parts.next()?;
        Self::ALL.into_iter().find(|r| r.tag() == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceSurface {
    Pial,
    White,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Derivation {
    /// Expansión (o contracción, con signo negativo) de la superficie fuente.
    Expand { displacement: ExpandAmount, thickness: bool },
    /// Copia literal: la frontera coincide con la superficie fuente.
    Copy,
}

/// Magnitud pasada al expansor: fracción de grosor (dos decimales) o mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExpandAmount {
    Offset(Offset),
    Millimetres(f64),
}

impl ExpandAmount {
    pub fn to_arg(self) -> String {
        match self {
            ExpandAmount::Offset(o) => o.to_string(),
            ExpandAmount::Millimetres(mm) => mm.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundarySpec {
    pub role: SurfaceRole,
    pub source: SourceSurface,
    pub derivation: Derivation,
}

/// Las cuatro fronteras de un hemisferio, en el orden de `SurfaceRole::ALL`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPlan {
    pub specs: [BoundarySpec; 4],
}

impl BoundaryPlan {
    pub fn for_params(params: &RunParameters) -> Self {
        let spec = |role, source, derivation| BoundarySpec { role, source, derivation };
        let specs = match params.metric {
            BoundaryMetric::Thickness => {
                let thick = |o: Offset| Derivation::Expand { displacement: ExpandAmount::Offset(o),
                                                             thickness: true };
                let inward_expand = params.inward_expand.unwrap_or(params.expand);
                let inward_shrink = params.inward_shrink.unwrap_or(params.shrink);
                [spec(SurfaceRole::CsfOuter, SourceSurface::Pial, thick(params.expand)),
                 spec(SurfaceRole::GmOuter, SourceSurface::Pial, thick(inward_expand)),
                 spec(SurfaceRole::WmBoundary, SourceSurface::White, thick(params.shrink)),
                 spec(SurfaceRole::GmInner, SourceSurface::White, thick(inward_shrink))]
            }
            BoundaryMetric::Distance => {
                [spec(SurfaceRole::CsfOuter,
                      SourceSurface::Pial,
                      Derivation::Expand { displacement: ExpandAmount::Millimetres(params.resolution),
                                           thickness: false }),
                 spec(SurfaceRole::GmOuter, SourceSurface::Pial, Derivation::Copy),
                 spec(SurfaceRole::WmBoundary,
                      SourceSurface::White,
                      Derivation::Expand { displacement: ExpandAmount::Offset(params.shrink),
                                           thickness: false }),
                 spec(SurfaceRole::GmInner, SourceSurface::White, Derivation::Copy)]
            }
        };
        Self { specs }
    }
}

/// Variantes de la superficie pial, en orden de preferencia.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PialVariant {
    /// Corregida por sesgo con el T2 (`?h.pial.T2`).
    BiasCorrected,
    /// Refinada con el T1 (`?h.pial.T1`).
    Secondary,
    /// `?h.pial`.
    Base,
}

impl PialVariant {
    pub const CHAIN: [PialVariant; 3] = [PialVariant::BiasCorrected, PialVariant::Secondary, PialVariant::Base];

    pub fn file_name(self, hemi: Hemisphere) -> String {
        match self {
            PialVariant::BiasCorrected => format!("{}.pial.T2", hemi.prefix()),
            PialVariant::Secondary => format!("{}.pial.T1", hemi.prefix()),
            PialVariant::Base => format!("{}.pial", hemi.prefix()),
        }
    }
}

/// Primera variante existente de la cadena. Si no existe ninguna devuelve la
/// ruta base: el fallo aparece como entrada ausente en la etapa que la usa.
pub fn resolve_pial(surf_dir: &Path, hemi: Hemisphere) -> (PialVariant, PathBuf) {
    PialVariant::CHAIN.into_iter()
                      .map(|v| (v, surf_dir.join(v.file_name(hemi))))
                      .find(|(_, p)| p.is_file())
                      .unwrap_or_else(|| (PialVariant::Base, surf_dir.join(PialVariant::Base.file_name(hemi))))
}
