use std::fmt;
use tessera_common::Identifier;

/// The three kinds of template a library holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Component,
    System,
    Composition,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TemplateKind::Component => "component",
            TemplateKind::System => "system",
            TemplateKind::Composition => "composition",
        };
        f.write_str(name)
    }
}

/// Errors from template registration, lookup and instantiation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LibraryError {
    #[error("{kind} {id} already exists")]
    DuplicateTemplate { kind: TemplateKind, id: Identifier },
    #[error("{kind} {id} does not belong to library namespace '{namespace}'")]
    NamespaceMismatch {
        kind: TemplateKind,
        id: Identifier,
        namespace: String,
    },
    #[error("a library for namespace '{0}' is already loaded")]
    DuplicateLibrary(String),
    #[error("no library loaded for namespace '{0}'")]
    LibraryNotFound(String),
    #[error("{kind} {id} not found")]
    TemplateNotFound { kind: TemplateKind, id: Identifier },
}

impl LibraryError {
    pub fn label(&self) -> &'static str {
        match self {
            LibraryError::DuplicateTemplate { .. } => "DuplicateTemplate",
            LibraryError::NamespaceMismatch { .. } => "NamespaceMismatch",
            LibraryError::DuplicateLibrary(_) => "DuplicateLibrary",
            LibraryError::LibraryNotFound(_) => "LibraryNotFound",
            LibraryError::TemplateNotFound {
                kind: TemplateKind::Component,
                ..
            } => "ComponentNotFound",
            LibraryError::TemplateNotFound {
                kind: TemplateKind::System,
                ..
            } => "SystemNotFound",
            LibraryError::TemplateNotFound {
                kind: TemplateKind::Composition,
                ..
            } => "CompositionNotFound",
        }
    }
}
