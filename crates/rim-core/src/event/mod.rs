//! Eventos del flujo y stores append-only.

pub mod store;
pub mod types;

pub use store::{EventStore, InMemoryEventStore, JsonlEventStore};
pub use types::{FlowEvent, FlowEventKind};
