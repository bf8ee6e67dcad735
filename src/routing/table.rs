//! Route table compilation.
//!
//! # Responsibilities
//! - Walk registered module factories in registration order
//! - Emit one entry per declared (method, path) key
//! - Accumulate the known-path set for 405 detection
//!
//! # Design Decisions
//! - Built once at startup, immutable afterwards (shared via Arc, no locks)
//! - Each factory is called once here; that instance is dropped before serving
//! - Duplicate keys across modules are rejected instead of shadowing each other

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CompositionError;
use crate::module::ModuleFactory;
use crate::routing::key::RouteKey;
use crate::routing::known_paths::KnownPaths;

/// One compiled route: a key plus the factory of the module that owns it.
#[derive(Debug)]
pub struct RouteEntry {
    key: RouteKey,
    module: String,
    factory: Arc<ModuleFactory>,
}

impl RouteEntry {
    pub fn key(&self) -> &RouteKey {
        &self.key
    }

    /// Name of the owning module.
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn factory(&self) -> &ModuleFactory {
        &self.factory
    }
}

/// Compiled, immutable route table.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<Arc<RouteEntry>>,
    known_paths: KnownPaths,
}

impl RouteTable {
    /// Compile the table from module factories.
    pub fn build(factories: Vec<ModuleFactory>) -> Result<Self, CompositionError> {
        let mut entries = Vec::new();
        let mut known_paths = KnownPaths::new();
        let mut owners: HashMap<RouteKey, String> = HashMap::new();

        for factory in factories {
            let factory = Arc::new(factory);
            let module = factory.create();

            // Deterministic registration order regardless of map iteration.
            let mut keys: Vec<RouteKey> = module.route_keys().cloned().collect();
            keys.sort_by(|a, b| {
                a.path()
                    .cmp(b.path())
                    .then_with(|| a.method().as_str().cmp(b.method().as_str()))
            });

            if keys.is_empty() {
                tracing::debug!(module = %module.name(), "Module declares no routes");
            }

            for key in keys {
                if let Some(first) = owners.get(&key) {
                    return Err(CompositionError::DuplicateRoute {
                        key,
                        first: first.clone(),
                        second: module.name().to_string(),
                    });
                }
                owners.insert(key.clone(), module.name().to_string());
                known_paths.insert(key.path());

                tracing::debug!(module = %module.name(), route = %key, "Route registered");
                entries.push(Arc::new(RouteEntry {
                    key,
                    module: module.name().to_string(),
                    factory: Arc::clone(&factory),
                }));
            }
        }

        Ok(Self {
            entries,
            known_paths,
        })
    }

    pub fn entries(&self) -> &[Arc<RouteEntry>] {
        &self.entries
    }

    pub fn known_paths(&self) -> &KnownPaths {
        &self.known_paths
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
