//! Interfaz de línea de comandos.
//!
//! Flags cortos de una letra; `-h` se maneja a mano para poder salir con
//! estado 1 como lo hace una invocación sin argumentos.
use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser};

use rim_domain::RawOptions;

#[derive(Debug, Parser)]
#[command(name = "fs2laynii",
          about = "Convierte una reconstrucción de Freesurfer en un rim compatible con LayNii",
          disable_help_flag = true,
          allow_negative_numbers = true)]
pub struct Cli {
    /// Directorio raíz de sujetos (SUBJECTS_DIR).
    #[arg(short = 'd', value_name = "DIR")]
    pub subjects_dir: Option<PathBuf>,
    /// Identificador del sujeto.
    #[arg(short = 's', value_name = "SUBJECT")]
    pub subject: Option<String>,
    /// Métrica de frontera: t (grosor) o d (distancia).
    #[arg(short = 'm', value_name = "t|d")]
    pub metric: Option<String>,
    /// Resolución isotrópica objetivo en mm [0.3].
    #[arg(short = 'r', value_name = "MM")]
    pub resolution: Option<f64>,
    /// Factor de expansión [0.3].
    #[arg(short = 'p', value_name = "MM")]
    pub expand: Option<f64>,
    /// Factor de contracción [-0.3].
    #[arg(short = 'w', value_name = "MM")]
    pub shrink: Option<f64>,
    /// Número de capas, impar [11].
    #[arg(short = 'n', value_name = "N")]
    pub layers: Option<u32>,
    /// Modelo de capas: v (equivolumen) o d (equidistante).
    #[arg(short = 'x', value_name = "v|d")]
    pub model: Option<String>,
    /// Omitir el motor de capas salvo que el valor sea 0.
    #[arg(short = 'l', value_name = "VALUE")]
    pub stop: Option<String>,
    /// Muestra esta ayuda.
    #[arg(short = 'h', action = ArgAction::SetTrue)]
    pub help: bool,
    /// Aborta en el primer artifact que no se pueda producir.
    #[arg(long)]
    pub strict: bool,
    /// Agrega los eventos de la corrida a un archivo JSONL.
    #[arg(long, value_name = "PATH")]
    pub event_log: Option<PathBuf>,
}

/// Lo que pide una línea de comandos ya parseada.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Help,
    Run(RunRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub subjects_dir: PathBuf,
    pub subject: String,
    pub raw: RawOptions,
    pub strict: bool,
    pub event_log: Option<PathBuf>,
}

impl Cli {
    pub fn into_invocation(self) -> Invocation {
        if self.help {
            return Invocation::Help;
        }
        let (Some(subjects_dir), Some(subject)) = (self.subjects_dir, self.subject) else {
            return Invocation::Help;
        };
        let raw = RawOptions { resolution: self.resolution,
                               metric: self.metric,
                               expand: self.expand,
                               shrink: self.shrink,
                               layers: self.layers,
                               model: self.model,
                               stop: self.stop };
        Invocation::Run(RunRequest { subjects_dir,
                                     subject,
                                     raw,
                                     strict: self.strict,
                                     event_log: self.event_log })
    }
}

/// Parsea argumentos (incluido el nombre del programa). Sin argumentos, con
/// `-h` o sin `-d`/`-s` devuelve `Invocation::Help`.
pub fn parse_args<I, T>(args: I) -> Result<Invocation, clap::Error>
    where I: IntoIterator<Item = T>,
          T: Into<OsString> + Clone
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() <= 1 {
        return Ok(Invocation::Help);
    }
    Ok(Cli::try_parse_from(args)?.into_invocation())
}

pub fn help_text() -> String {
    Cli::command().render_help().to_string()
}
