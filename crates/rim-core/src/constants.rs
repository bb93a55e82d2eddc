//! Constantes del motor core.
//!
//! `ENGINE_VERSION` participa en el cálculo de fingerprints: un cambio de
//! versión invalida los fingerprints registrados aunque los parámetros y los
//! artifacts no cambien.

/// Versión lógica del motor.
pub const ENGINE_VERSION: &str = "R1.0";

/// Prefijo de los archivos de staging usados por la publicación atómica.
pub const STAGING_PREFIX: &str = ".partial.";
