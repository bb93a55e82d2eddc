//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) una sola vez y expone `AppConfig`. Los
//! flags de la línea de comandos tienen prioridad sobre estos valores.
use std::env;
use std::path::PathBuf;

use once_cell::sync::Lazy;

use rim_adapters::ToolConfig;

/// Carga `.env` si existe; se evalúa una sola vez por proceso.
static DOTENV: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// `FS2LAYNII_STRICT`: abortar en el primer fallo.
    pub strict: bool,
    /// `FS2LAYNII_EVENT_LOG`: archivo JSONL de eventos.
    pub event_log: Option<PathBuf>,
    /// Nombres de los programas externos.
    pub tools: ToolConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV);
        Self { strict: env::var("FS2LAYNII_STRICT").map(|v| parse_flag(&v)).unwrap_or(false),
               event_log: env::var_os("FS2LAYNII_EVENT_LOG").filter(|v| !v.is_empty()).map(PathBuf::from),
               tools: ToolConfig::from_env() }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
