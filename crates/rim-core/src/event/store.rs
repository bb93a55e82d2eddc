use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::warn;
use uuid::Uuid;

use super::{FlowEvent, FlowEventKind};
use crate::errors::CoreEngineError;

/// Almacenamiento de eventos append-only.
pub trait EventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, flow_id: Uuid, kind: FlowEventKind) -> FlowEvent;
    /// Lista eventos de un flujo (orden ascendente por seq).
    fn list(&self, flow_id: Uuid) -> Vec<FlowEvent>;
}

#[derive(Default)]
pub struct InMemoryEventStore {
    pub inner: HashMap<Uuid, Vec<FlowEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, flow_id: Uuid, kind: FlowEventKind) -> FlowEvent {
        let vec = self.inner.entry(flow_id).or_default();
        let seq = vec.len() as u64;
        let ev = FlowEvent { seq, flow_id, kind, ts: Utc::now() };
        vec.push(ev.clone());
        ev
    }
    fn list(&self, flow_id: Uuid) -> Vec<FlowEvent> { self.inner.get(&flow_id).cloned().unwrap_or_default() }
}

/// Store en memoria que además agrega cada evento como una línea JSON a un
/// archivo. El archivo acumula corridas sucesivas (distintos `flow_id`).
pub struct JsonlEventStore {
    memory: InMemoryEventStore,
    path: PathBuf,
    file: File,
}

impl JsonlEventStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreEngineError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CoreEngineError::io(parent, &e))?;
        }
        let file = OpenOptions::new().create(true)
                                     .append(true)
                                     .open(&path)
                                     .map_err(|e| CoreEngineError::io(&path, &e))?;
        Ok(Self { memory: InMemoryEventStore::default(),
                  path,
                  file })
    }

    /// Lee todos los eventos registrados en un archivo JSONL.
    pub fn read_all(path: &Path) -> Result<Vec<FlowEvent>, CoreEngineError> {
        let file = File::open(path).map_err(|e| CoreEngineError::io(path, &e))?;
        let mut events = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| CoreEngineError::io(path, &e))?;
            if line.trim().is_empty() {
                continue;
            }
            let ev: FlowEvent = serde_json::from_str(&line).map_err(|e| CoreEngineError::Internal(format!("{}: {e}", path.display())))?;
            events.push(ev);
        }
        Ok(events)
    }
}

impl EventStore for JsonlEventStore {
    fn append_kind(&mut self, flow_id: Uuid, kind: FlowEventKind) -> FlowEvent {
        let ev = self.memory.append_kind(flow_id, kind);
        // El log es procedencia, no estado: un fallo de escritura no detiene el flujo.
        let written = serde_json::to_string(&ev).map_err(|e| e.to_string())
                                                .and_then(|line| writeln!(self.file, "{line}").map_err(|e| e.to_string()));
        if let Err(e) = written {
            warn!("event log {}: {}", self.path.display(), e);
        }
        ev
    }

    fn list(&self, flow_id: Uuid) -> Vec<FlowEvent> {
        self.memory.list(flow_id)
    }
}
