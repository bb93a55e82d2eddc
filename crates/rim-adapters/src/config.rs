//! Nombres de los programas externos.
//! Por defecto se buscan en el `PATH`; cada uno se puede sobrescribir con una
//! variable de entorno `FS2LAYNII_<PROGRAMA>`.

use std::env;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Remuestreo de volúmenes.
    pub mri_convert: String,
    /// Expansión de superficies.
    pub mris_expand: String,
    /// Superficie a volumen.
    pub mris_fill: String,
    /// Aritmética de vóxeles.
    pub fscalc: String,
    /// Motor de capas (LayNii).
    pub ln2_layers: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self { mri_convert: "mri_convert".into(),
               mris_expand: "mris_expand".into(),
               mris_fill: "mris_fill".into(),
               fscalc: "fscalc".into(),
               ln2_layers: "LN2_LAYERS".into() }
    }
}

impl ToolConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        let var = |key: &str, default: String| env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or(default);
        Self { mri_convert: var("FS2LAYNII_MRI_CONVERT", d.mri_convert),
               mris_expand: var("FS2LAYNII_MRIS_EXPAND", d.mris_expand),
               mris_fill: var("FS2LAYNII_MRIS_FILL", d.mris_fill),
               fscalc: var("FS2LAYNII_FSCALC", d.fscalc),
               ln2_layers: var("FS2LAYNII_LN2_LAYERS", d.ln2_layers) }
    }
}
