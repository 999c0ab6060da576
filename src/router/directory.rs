//! Name-to-identifier lookup for clients and warehouses.

use serde::{Deserialize, Serialize};

/// A client or warehouse known to the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub id: u64,
    pub name: String,
}

impl NamedEntity {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The kinds of named entity a question can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Client,
    Warehouse,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Warehouse => "warehouse",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves human-readable names to identifiers.
pub trait EntityDirectory: Send + Sync {
    fn resolve_client_id(&self, name: &str) -> Option<u64>;

    fn resolve_warehouse_id(&self, name: &str) -> Option<u64>;

    /// Look `name` up in the directory for `kind`.
    fn resolve(&self, kind: EntityKind, name: &str) -> Option<u64> {
        match kind {
            EntityKind::Client => self.resolve_client_id(name),
            EntityKind::Warehouse => self.resolve_warehouse_id(name),
        }
    }
}

/// Find `name` among `entities`: case-insensitive exact match first, then the
/// first entity whose name contains it.
pub fn resolve_by_name(entities: &[NamedEntity], name: &str) -> Option<u64> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    entities
        .iter()
        .find(|entity| entity.name.to_lowercase() == needle)
        .or_else(|| {
            entities
                .iter()
                .find(|entity| entity.name.to_lowercase().contains(&needle))
        })
        .map(|entity| entity.id)
}

/// Directory backed by in-memory lists.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    clients: Vec<NamedEntity>,
    warehouses: Vec<NamedEntity>,
}

impl InMemoryDirectory {
    pub fn new(clients: Vec<NamedEntity>, warehouses: Vec<NamedEntity>) -> Self {
        Self {
            clients,
            warehouses,
        }
    }

    pub fn with_client(mut self, id: u64, name: impl Into<String>) -> Self {
        self.clients.push(NamedEntity::new(id, name));
        self
    }

    pub fn with_warehouse(mut self, id: u64, name: impl Into<String>) -> Self {
        self.warehouses.push(NamedEntity::new(id, name));
        self
    }

    pub fn clients(&self) -> &[NamedEntity] {
        &self.clients
    }

    pub fn warehouses(&self) -> &[NamedEntity] {
        &self.warehouses
    }
}

impl EntityDirectory for InMemoryDirectory {
    fn resolve_client_id(&self, name: &str) -> Option<u64> {
        resolve_by_name(&self.clients, name)
    }

    fn resolve_warehouse_id(&self, name: &str) -> Option<u64> {
        resolve_by_name(&self.warehouses, name)
    }
}
