use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tessera_common::{Composition, Identifier};
use tessera_ecs::Component;
use tessera_kernel::{System, World};

use crate::error::{LibraryError, TemplateKind};
use crate::library::Library;

/// Owns the loaded libraries, one per namespace, and turns templates into
/// independent instances.
#[derive(Debug, Clone, Default)]
pub struct LibraryManager {
    libraries: BTreeMap<String, Library>,
}

impl LibraryManager {
    /// A manager with no libraries loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a library.
    ///
    /// Fails with [`LibraryError::DuplicateLibrary`] if its namespace is already loaded.
    pub fn load_library(&mut self, library: Library) -> Result<(), LibraryError> {
        let namespace = library.namespace().to_string();
        if self.libraries.contains_key(&namespace) {
            tracing::warn!(op = "load_library", %namespace, "library already loaded");
            return Err(LibraryError::DuplicateLibrary(namespace));
        }
        tracing::info!(
            %namespace,
            components = library.components().len(),
            systems = library.systems().len(),
            "library loaded"
        );
        self.libraries.insert(namespace, library);
        Ok(())
    }

    /// The library loaded for `namespace`.
    pub fn library(&self, namespace: &str) -> Option<&Library> {
        self.libraries.get(namespace)
    }

    /// Loaded libraries, ordered by namespace.
    pub fn libraries(&self) -> impl Iterator<Item = &Library> {
        self.libraries.values()
    }

    /// Every component template across all libraries, in namespace order.
    pub fn components(&self) -> Vec<&Component> {
        self.libraries
            .values()
            .flat_map(|lib| lib.components())
            .collect()
    }

    fn resolve(&self, id: &Identifier) -> Result<&Library, LibraryError> {
        self.libraries
            .get(id.namespace())
            .ok_or_else(|| LibraryError::LibraryNotFound(id.namespace().to_string()))
    }

    /// Resolve a component template: namespace first, then path.
    pub fn component(&self, id: &Identifier) -> Result<&Component, LibraryError> {
        self.resolve(id)?
            .component(id)
            .ok_or_else(|| LibraryError::TemplateNotFound {
                kind: TemplateKind::Component,
                id: id.clone(),
            })
    }

    /// Resolve a system template: namespace first, then path.
    pub fn system(&self, id: &Identifier) -> Result<&dyn System, LibraryError> {
        self.resolve(id)?
            .system(id)
            .ok_or_else(|| LibraryError::TemplateNotFound {
                kind: TemplateKind::System,
                id: id.clone(),
            })
    }

    /// Resolve a composition template: namespace first, then path.
    pub fn composition(&self, id: &Identifier) -> Result<&Composition, LibraryError> {
        self.resolve(id)?
            .composition(id)
            .ok_or_else(|| LibraryError::TemplateNotFound {
                kind: TemplateKind::Composition,
                id: id.clone(),
            })
    }

    /// A fresh component carrying the template's id and the given payload.
    pub fn instantiate_component(
        &self,
        id: &Identifier,
        data: Value,
    ) -> Result<Component, LibraryError> {
        let mut component = self.component(id).inspect_err(log_miss)?.clone();
        component.set_data(data);
        Ok(component)
    }

    /// A deep copy of the system template, bound to `world`.
    ///
    /// The template itself is never bound; each call yields an instance with
    /// its own event table and binding.
    pub fn instantiate_system(
        &self,
        id: &Identifier,
        world: &Arc<World>,
    ) -> Result<Box<dyn System>, LibraryError> {
        let mut system = self.system(id).inspect_err(log_miss)?.clone_box();
        system.bind(world);
        tracing::debug!(system = %id, world = %world.id(), "system instantiated");
        Ok(system)
    }
}

fn log_miss(err: &LibraryError) {
    tracing::warn!(op = "instantiate", error = %err, "template lookup failed");
}
