use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use tracing::debug;

/// In-memory connection-string store keyed by generated ids.
///
/// Constructed once and shared by reference; there is no global instance.
#[derive(Debug, Default)]
pub struct ConnectionStore {
    connections: RwLock<HashMap<String, String>>,
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `dsn` under a fresh `conn_<uuid>` id and returns the id.
    pub fn insert(&self, dsn: impl Into<String>) -> String {
        let id = format!("conn_{}", uuid::Uuid::new_v4().simple());
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), dsn.into());
        debug!(target: "gremlin.pg.store", %id, "connection string stored");
        id
    }

    pub fn get(&self, id: &str) -> Option<String> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every stored connection string.
    pub fn clear(&self) {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
