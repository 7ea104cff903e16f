//! Interface registry for managing available primitive node types.

use crate::core::node::{Category, InterfaceMetadata, NodeInterface};
use indexmap::IndexMap;
use std::sync::Arc;

/// Factory function for creating interface instances.
pub type InterfaceFactory = Arc<dyn Fn() -> Arc<dyn NodeInterface> + Send + Sync>;

/// Registry entry containing metadata and factory.
#[derive(Clone)]
pub struct RegistryEntry {
    /// Factory function to create instances.
    pub factory: InterfaceFactory,
    /// Cached metadata (avoids creating instance just to get metadata).
    pub metadata: InterfaceMetadata,
}

/// Registry for all available interface types.
///
/// Maps interface ids to factories so serialized workflows can be rebuilt
/// and callers can list what the built-in steps declare.
pub struct InterfaceRegistry {
    /// Interfaces indexed by their unique ID.
    interfaces: IndexMap<String, RegistryEntry>,
    /// Interfaces grouped by category.
    categories: IndexMap<Category, Vec<String>>,
}

impl InterfaceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            interfaces: IndexMap::new(),
            categories: IndexMap::new(),
        }
    }

    /// Create a registry pre-populated with built-in interfaces.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::interfaces::builtin::register_all(&mut registry);
        registry
    }

    /// Register an interface type.
    ///
    /// Registering an id twice replaces the earlier factory.
    pub fn register<F>(&mut self, factory: F)
    where
        F: Fn() -> Arc<dyn NodeInterface> + Send + Sync + 'static,
    {
        let metadata = factory().metadata();
        let id = metadata.id.clone();
        let category = metadata.category;

        let entry = RegistryEntry {
            factory: Arc::new(factory),
            metadata,
        };

        if let Some(previous) = self.interfaces.insert(id.clone(), entry) {
            if let Some(ids) = self.categories.get_mut(&previous.metadata.category) {
                ids.retain(|i| i != &id);
            }
        }

        self.categories.entry(category).or_default().push(id);
    }

    /// Create a new instance of an interface by ID.
    pub fn create(&self, id: &str) -> Option<Arc<dyn NodeInterface>> {
        self.interfaces.get(id).map(|e| (e.factory)())
    }

    /// Get metadata for an interface without creating an instance.
    pub fn get_metadata(&self, id: &str) -> Option<&InterfaceMetadata> {
        self.interfaces.get(id).map(|e| &e.metadata)
    }

    /// Check if an interface is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.interfaces.contains_key(id)
    }

    /// Get all registered interface IDs.
    pub fn interface_ids(&self) -> impl Iterator<Item = &str> {
        self.interfaces.keys().map(|s| s.as_str())
    }

    /// Get interfaces by category.
    pub fn interfaces_by_category(&self, category: &Category) -> Vec<&str> {
        self.categories
            .get(category)
            .map(|ids| ids.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// Search interfaces by id, name, description or tag.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();

        self.interfaces
            .iter()
            .filter(|(_, entry)| {
                let metadata = &entry.metadata;
                metadata.id.to_lowercase().contains(&query)
                    || metadata.name.to_lowercase().contains(&query)
                    || metadata.description.to_lowercase().contains(&query)
                    || metadata.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Get the total number of registered interfaces.
    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Get interfaces grouped by category, each group sorted by name.
    pub fn grouped_by_category(&self) -> IndexMap<Category, Vec<&InterfaceMetadata>> {
        let mut grouped: IndexMap<Category, Vec<&InterfaceMetadata>> = IndexMap::new();

        for entry in self.interfaces.values() {
            grouped
                .entry(entry.metadata.category)
                .or_default()
                .push(&entry.metadata);
        }

        for interfaces in grouped.values_mut() {
            interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        }

        grouped
    }
}

impl Default for InterfaceRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
