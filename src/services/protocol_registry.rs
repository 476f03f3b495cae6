//! Protocol registry: name-keyed lookup of handler factories.
//!
//! Mirrors the teacher's adapter registry — a single indexed collection
//! built once at startup, then consulted read-only by the executor. Unlike
//! the teacher's registry, which distinguishes ingestion/egress adapters,
//! every entry here plays the same role, so the map is flat.

use std::collections::HashMap;

use crate::domain::ports::{HandlerFactory, ProtocolHandler};

/// Central registry of protocol handler factories, keyed by protocol name.
///
/// A factory, not a shared instance, is stored per name: handlers must be
/// reentrant but the executor constructs a fresh instance per invocation
/// so no handler can leak state across concurrent tests.
pub struct ProtocolRegistry {
    factories: HashMap<&'static str, HandlerFactory>,
}

impl std::fmt::Debug for ProtocolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolRegistry")
            .field("protocols", &self.protocol_names())
            .finish()
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
}

impl ProtocolRegistry {
    /// Registers `factory` under `name`, overwriting any prior registration.
    pub fn register(&mut self, name: &'static str, factory: HandlerFactory) {
        self.factories.insert(name, factory);
    }

    /// Constructs a fresh handler instance for `name`, if registered.
    pub fn build(&self, name: &str) -> Option<Box<dyn ProtocolHandler>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Returns the names of all registered protocols.
    pub fn protocol_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Whether any protocol is registered.
    pub fn has_protocols(&self) -> bool {
        !self.factories.is_empty()
    }
}
