//! Resolución de parámetros de corrida.
//!
//! Convierte los valores crudos de la línea de comandos (todos opcionales) en
//! un `RunParameters` completo. No hace I/O.
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const DEFAULT_RESOLUTION_MM: f64 = 0.3;
pub const DEFAULT_EXPAND: Offset = Offset::from_hundredths(30);
pub const DEFAULT_SHRINK: Offset = Offset::from_hundredths(-30);
pub const DEFAULT_LAYERS: u32 = 11;
/// Separación entre la frontera exterior y la interior en modo grosor.
pub const INWARD_STEP: Offset = Offset::from_hundredths(10);
/// Mayor desplazamiento aceptado, en mm.
pub const MAX_OFFSET_MM: f64 = 100.0;

/// Desplazamiento con signo en centésimas de milímetro (aritmética fija de dos
/// decimales).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Offset(i64);

impl Offset {
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Redondea a la centésima más cercana. Rechaza valores no finitos o de
    /// más de `MAX_OFFSET_MM` en valor absoluto.
    pub fn from_mm(mm: f64) -> Result<Self, DomainError> {
        if !mm.is_finite() || mm.abs() > MAX_OFFSET_MM {
            return Err(DomainError::InvalidOffset(mm));
        }
        Ok(Self((mm * 100.0).round() as i64))
    }

    pub fn hundredths(self) -> i64 {
        self.0
    }
}

impl Add for Offset {
    type Output = Offset;
    fn add(self, rhs: Offset) -> Offset {
        Offset(self.0 + rhs.0)
    }
}

impl Sub for Offset {
    type Output = Offset;
    fn sub(self, rhs: Offset) -> Offset {
        Offset(self.0 - rhs.0)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryMetric {
    /// Desplazamiento relativo al grosor cortical local.
    Thickness,
    /// Desplazamiento métrico fijo.
    #[default]
    Distance,
}

impl FromStr for BoundaryMetric {
    type Err = DomainError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "t" | "thickness" => Ok(Self::Thickness),
            "d" | "distance" => Ok(Self::Distance),
            other => Err(DomainError::UnknownMetric(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayeringModel {
    #[default]
    Equivolume,
    Equidistant,
}

impl LayeringModel {
    /// Etiqueta corta para nombres de archivo.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Equivolume => "equivol",
            Self::Equidistant => "equidist",
        }
    }

    /// Flags propios del modelo para el motor de capas.
    pub fn flags(self) -> &'static [&'static str] {
        match self {
            Self::Equivolume => &["-equivol", "-iter_smooth", "0"],
            Self::Equidistant => &[],
        }
    }
}

impl FromStr for LayeringModel {
    type Err = DomainError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v" | "equivolume" => Ok(Self::Equivolume),
            "d" | "equidistant" => Ok(Self::Equidistant),
            other => Err(DomainError::UnknownModel(other.to_string())),
        }
    }
}

/// Valor del flag de parada de capas, en sus tres estados observables.
///
/// `Unset` y `Zero` ejecutan el motor de capas; cualquier otro valor lo omite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopFlag {
    Unset,
    Zero,
    Other(String),
}

impl StopFlag {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => Self::Unset,
            Some("0") => Self::Zero,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    pub fn run_layering(&self) -> bool {
        matches!(self, Self::Unset | Self::Zero)
    }
}

/// Valores crudos tal como llegan de la CLI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOptions {
    pub resolution: Option<f64>,
    pub metric: Option<String>,
    pub expand: Option<f64>,
    pub shrink: Option<f64>,
    pub layers: Option<u32>,
    pub model: Option<String>,
    pub stop: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Tamaño de vóxel isotrópico objetivo, en mm.
    pub resolution: f64,
    pub metric: BoundaryMetric,
    pub expand: Offset,
    pub shrink: Offset,
    /// Sólo en modo grosor: `expand - 0.10`.
    pub inward_expand: Option<Offset>,
    /// Sólo en modo grosor: `shrink + 0.10`.
    pub inward_shrink: Option<Offset>,
    pub layers: u32,
    pub model: LayeringModel,
    pub run_layering: bool,
}

impl RunParameters {
    /// Etiqueta de resolución usada en nombres de archivo (`0.3` -> `0.3mm`).
    pub fn resolution_tag(&self) -> String {
        format!("{}mm", self.resolution)
    }
}

impl RawOptions {
    pub fn resolve(&self) -> Result<RunParameters, DomainError> {
        let resolution = self.resolution.unwrap_or(DEFAULT_RESOLUTION_MM);
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(DomainError::InvalidResolution(resolution));
        }

        let metric = match non_empty(&self.metric) {
            Some(m) => m.parse()?,
            None => BoundaryMetric::default(),
        };
        let model = match non_empty(&self.model) {
            Some(m) => m.parse()?,
            None => LayeringModel::default(),
        };

        let layers = self.layers.unwrap_or(DEFAULT_LAYERS);
        if layers == 0 || layers % 2 == 0 {
            return Err(DomainError::InvalidLayerCount(layers));
        }

        let expand = self.expand.map(Offset::from_mm).transpose()?.unwrap_or(DEFAULT_EXPAND);
        let shrink = self.shrink.map(Offset::from_mm).transpose()?.unwrap_or(DEFAULT_SHRINK);
        if expand.hundredths() <= 0 {
            warn!("expand factor {expand} is not positive; the outer CSF boundary will not lie outside the pial surface");
        }
        if shrink.hundredths() >= 0 {
            warn!("shrink factor {shrink} is not negative; the white-matter boundary will not lie inside the white surface");
        }

        let (inward_expand, inward_shrink) = match metric {
            BoundaryMetric::Thickness => (Some(expand - INWARD_STEP), Some(shrink + INWARD_STEP)),
            BoundaryMetric::Distance => (None, None),
        };

        Ok(RunParameters { resolution,
                           metric,
                           expand,
                           shrink,
                           inward_expand,
                           inward_shrink,
                           layers,
                           model,
                           run_layering: StopFlag::from_raw(self.stop.as_deref()).run_layering() })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
