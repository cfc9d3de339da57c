use std::collections::BTreeMap;
use std::fmt;

use tessera_common::{Composition, Identifier};
use tessera_ecs::Component;
use tessera_kernel::System;

use crate::error::{LibraryError, TemplateKind};

/// Append-only registry of the templates of one namespace.
///
/// Every `register_*` call is all-or-nothing: a batch containing one bad id
/// registers none of its templates.
#[derive(Clone)]
pub struct Library {
    id: Identifier,
    components: Vec<Component>,
    systems: Vec<Box<dyn System>>,
    compositions: BTreeMap<Identifier, Composition>,
}

impl Library {
    /// A library whose namespace is `id.namespace()`.
    pub fn new(id: Identifier) -> Self {
        Self {
            id,
            components: Vec::new(),
            systems: Vec::new(),
            compositions: BTreeMap::new(),
        }
    }

    /// The library identifier; its namespace scopes every template.
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// The namespace all templates of this library must use.
    pub fn namespace(&self) -> &str {
        self.id.namespace()
    }

    /// Component templates, in registration order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// System templates, in registration order. None of them is bound.
    pub fn systems(&self) -> &[Box<dyn System>] {
        &self.systems
    }

    /// Composition templates, ordered by id.
    pub fn compositions(&self) -> impl Iterator<Item = &Composition> {
        self.compositions.values()
    }

    /// The component template with this id.
    pub fn component(&self, id: &Identifier) -> Option<&Component> {
        self.components.iter().find(|c| c.id() == id)
    }

    /// The system template with this id.
    pub fn system(&self, id: &Identifier) -> Option<&dyn System> {
        self.systems
            .iter()
            .find(|s| s.id() == id)
            .map(|s| s.as_ref())
    }

    /// The composition template with this id.
    pub fn composition(&self, id: &Identifier) -> Option<&Composition> {
        self.compositions.get(id)
    }

    fn contains(&self, kind: TemplateKind, id: &Identifier) -> bool {
        match kind {
            TemplateKind::Component => self.component(id).is_some(),
            TemplateKind::System => self.system(id).is_some(),
            TemplateKind::Composition => self.compositions.contains_key(id),
        }
    }

    /// Validate a batch of ids before anything is inserted.
    fn admit(&self, kind: TemplateKind, ids: &[&Identifier]) -> Result<(), LibraryError> {
        for (index, id) in ids.iter().enumerate() {
            if !id.same_namespace(&self.id) {
                tracing::warn!(op = "register", library = %self.id, %kind, template = %id, "namespace mismatch");
                return Err(LibraryError::NamespaceMismatch {
                    kind,
                    id: (*id).clone(),
                    namespace: self.id.namespace().to_string(),
                });
            }
            if self.contains(kind, id) || ids[..index].contains(id) {
                tracing::warn!(op = "register", library = %self.id, %kind, template = %id, "template already exists");
                return Err(LibraryError::DuplicateTemplate {
                    kind,
                    id: (*id).clone(),
                });
            }
        }
        Ok(())
    }

    /// Register one component template.
    pub fn register_component(&mut self, component: Component) -> Result<(), LibraryError> {
        self.register_components(vec![component])
    }

    /// Register a batch of component templates; none is added if any id is rejected.
    pub fn register_components(&mut self, components: Vec<Component>) -> Result<(), LibraryError> {
        let ids: Vec<&Identifier> = components.iter().map(Component::id).collect();
        self.admit(TemplateKind::Component, &ids)?;
        tracing::debug!(library = %self.id, count = components.len(), "component templates registered");
        self.components.extend(components);
        Ok(())
    }

    /// Register one system template.
    pub fn register_system(&mut self, system: Box<dyn System>) -> Result<(), LibraryError> {
        self.register_systems(vec![system])
    }

    /// Register a batch of system templates; none is added if any id is rejected.
    pub fn register_systems(&mut self, systems: Vec<Box<dyn System>>) -> Result<(), LibraryError> {
        let ids: Vec<&Identifier> = systems.iter().map(|s| s.id()).collect();
        self.admit(TemplateKind::System, &ids)?;
        tracing::debug!(library = %self.id, count = systems.len(), "system templates registered");
        self.systems.extend(systems);
        Ok(())
    }

    /// Register one composition template.
    pub fn register_composition(&mut self, composition: Composition) -> Result<(), LibraryError> {
        self.register_compositions(vec![composition])
    }

    /// Register a batch of composition templates; none is added if any id is rejected.
    pub fn register_compositions(
        &mut self,
        compositions: Vec<Composition>,
    ) -> Result<(), LibraryError> {
        let ids: Vec<&Identifier> = compositions.iter().map(|c| &c.id).collect();
        self.admit(TemplateKind::Composition, &ids)?;
        tracing::debug!(library = %self.id, count = compositions.len(), "composition templates registered");
        self.compositions
            .extend(compositions.into_iter().map(|c| (c.id.clone(), c)));
        Ok(())
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("id", &self.id)
            .field(
                "components",
                &self.components.iter().map(Component::id).collect::<Vec<_>>(),
            )
            .field(
                "systems",
                &self.systems.iter().map(|s| s.id()).collect::<Vec<_>>(),
            )
            .field("compositions", &self.compositions.keys().collect::<Vec<_>>())
            .finish()
    }
}
