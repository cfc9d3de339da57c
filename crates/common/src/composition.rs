use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::Identifier;

/// Named set of component ids, used only for matching entities.
///
/// Component ids are stored in their `namespace:path` string form and
/// deduplicated on construction, so two compositions built from the same ids
/// in a different order (or with repeats) hold the same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub id: Identifier,
    value: BTreeSet<String>,
}

impl Composition {
    pub fn new<I, S>(id: Identifier, value: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            value: value.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_identifiers<'a>(
        id: Identifier,
        components: impl IntoIterator<Item = &'a Identifier>,
    ) -> Self {
        Self::new(id, components.into_iter().map(ToString::to_string))
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn contains(&self, component_id: &str) -> bool {
        self.value.contains(component_id)
    }

    pub fn contains_id(&self, component_id: &Identifier) -> bool {
        self.value.contains(&component_id.to_string())
    }

    /// Component ids in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.value.iter().map(String::as_str)
    }

    /// Set equality of the component ids, ignoring the composition's own id.
    pub fn has_same_components(&self, other: &Composition) -> bool {
        self.len() == other.len() && other.iter().all(|c| self.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(path: &str) -> Identifier {
        Identifier::new("test", path)
    }

    #[test]
    fn duplicates_are_collapsed() {
        let comp = Composition::new(id("mobile"), ["core:pos", "core:vel", "core:pos"]);
        assert_eq!(comp.len(), 2);
        assert!(comp.contains("core:pos"));
        assert!(comp.contains("core:vel"));
    }

    #[test]
    fn same_components_ignores_order_and_repeats() {
        let a = Composition::new(id("a"), ["core:pos", "core:vel"]);
        let b = Composition::new(id("b"), ["core:vel", "core:pos", "core:vel"]);
        let c = Composition::new(id("c"), ["core:pos", "core:hp"]);
        assert!(a.has_same_components(&b));
        assert!(!a.has_same_components(&c));
        // Structural equality also compares the composition id.
        assert_ne!(a, b);
    }

    #[test]
    fn built_from_identifiers() {
        let pos = Identifier::new("core", "pos");
        let hp = Identifier::new("core", "hp");
        let comp = Composition::from_identifiers(id("unit"), [&pos, &hp]);
        assert!(comp.contains_id(&pos));
        assert!(comp.contains_id(&hp));
        assert_eq!(comp.iter().collect::<Vec<_>>(), vec!["core:hp", "core:pos"]);
    }

    #[test]
    fn deserialization_dedupes() {
        let json = r#"{"id":{"namespace":"t","path":"x"},"value":["a:b","a:b","a:c"]}"#;
        let comp: Composition = serde_json::from_str(json).unwrap();
        assert_eq!(comp.len(), 2);
    }
}
