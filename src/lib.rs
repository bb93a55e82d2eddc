//! fs2laynii
//!
//! Convierte una reconstrucción cortical de Freesurfer en un volumen "rim"
//! para LayNii y opcionalmente invoca el motor de capas:
//! - `cli` parsea los flags cortos.
//! - `config` lee `.env` y variables `FS2LAYNII_*`.
//! - `app` arma y ejecuta el pipeline de `rim-adapters`.

pub mod app;
pub mod cli;
pub mod config;
pub mod errors;

pub use app::{run, run_with};
pub use cli::{parse_args, Invocation, RunRequest};
pub use config::AppConfig;
pub use errors::AppError;
