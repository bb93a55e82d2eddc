//! Invocación de herramientas externas.
//!
//! Las herramientas (Freesurfer, LayNii) son colaboradores opacos: el motor
//! sólo conoce programa, argumentos, variables de entorno y el archivo que la
//! invocación declara producir. Las variables de entorno viajan con cada
//! invocación; el proceso nunca modifica su propio entorno.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::CoreEngineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<OsString>,
    pub envs: Vec<(String, OsString)>,
    /// Archivo que la herramienta debe escribir.
    pub output: PathBuf,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self { program: program.into(),
               args: Vec::new(),
               envs: Vec::new(),
               output: output.into() }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<OsString>
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Copia de la invocación apuntando su salida a otro archivo. Cada
    /// argumento igual a la salida original se reescribe también.
    pub fn redirected(&self, output: &Path) -> Self {
        let original = self.output.as_os_str();
        let args = self.args
                       .iter()
                       .map(|a| if a.as_os_str() == original { output.as_os_str().to_owned() } else { a.clone() })
                       .collect();
        Self { program: self.program.clone(),
               args,
               envs: self.envs.clone(),
               output: output.to_path_buf() }
    }

    /// Línea de comando legible para logs.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for a in &self.args {
            line.push(' ');
            line.push_str(&a.to_string_lossy());
        }
        line
    }
}

/// Estado de salida de una herramienta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    pub success: bool,
    pub code: Option<i32>,
}

impl ToolStatus {
    pub fn ok() -> Self {
        Self { success: true,
               code: Some(0) }
    }

    pub fn failed(code: Option<i32>) -> Self {
        Self { success: false, code }
    }
}

/// Frontera con el mundo exterior. Bloqueante, sin timeout.
pub trait ToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolStatus, CoreEngineError>;

    /// Número de invocaciones realizadas (para reportes).
    fn invocation_count(&self) -> usize;
}

/// Runner real basado en `std::process::Command`.
#[derive(Debug, Default)]
pub struct ProcessToolRunner {
    invocations: std::cell::Cell<usize>,
}

impl ProcessToolRunner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ToolRunner for ProcessToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolStatus, CoreEngineError> {
        debug!("exec: {}", invocation.display_line());
        self.invocations.set(self.invocations.get() + 1);

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
           .envs(invocation.envs.iter().map(|(k, v)| (k, v)))
           .stdin(Stdio::null())
           .stdout(Stdio::piped())
           .stderr(Stdio::piped());

        let output = cmd.output().map_err(|e| CoreEngineError::ToolSpawn { program: invocation.program.clone(),
                                                                            reason: e.to_string() })?;
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("[{}] {}", invocation.program, line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!("[{} stderr] {}", invocation.program, line);
        }

        if output.status.success() {
            Ok(ToolStatus::ok())
        } else {
            Ok(ToolStatus::failed(output.status.code()))
        }
    }

    fn invocation_count(&self) -> usize {
        self.invocations.get()
    }
}
