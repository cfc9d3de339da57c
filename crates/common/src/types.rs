use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Errors from parsing an [`Identifier`] out of its `namespace:path` form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("identifier '{0}' has no ':' separator")]
    MissingSeparator(String),
    #[error("identifier '{0}' has an empty namespace")]
    EmptyNamespace(String),
    #[error("identifier '{0}' has an empty path")]
    EmptyPath(String),
}

/// Namespaced name used to tell apart same-named definitions coming from
/// different extensions, e.g. `mymod:position` and `othermod:position`.
///
/// Identity is the `namespace:path` string. Every constructor keeps the
/// namespace free of `:` (anything after the first `:` belongs to the path),
/// so two identifiers compare equal exactly when their string forms do.
/// Ordering is by namespace, then path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawIdentifier")]
pub struct Identifier {
    namespace: String,
    path: String,
}

/// Wire shape of an [`Identifier`], validated on the way in.
#[derive(Deserialize)]
struct RawIdentifier {
    namespace: String,
    path: String,
}

impl TryFrom<RawIdentifier> for Identifier {
    type Error = IdentifierError;

    fn try_from(raw: RawIdentifier) -> Result<Self, Self::Error> {
        Self::try_new(raw.namespace, raw.path)
    }
}

impl Identifier {
    /// Build an identifier from trusted parts, such as literals.
    ///
    /// A `:` inside `namespace` is moved into the path, so `new("a:b", "c")`
    /// is the identifier `a:b:c` with namespace `a`.
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        let mut namespace = namespace.into();
        let mut path = path.into();
        if let Some(at) = namespace.find(':') {
            path = format!("{}:{}", &namespace[at + 1..], path);
            namespace.truncate(at);
        }
        Self { namespace, path }
    }

    /// Build an identifier from untrusted parts, rejecting an empty namespace or path.
    pub fn try_new(
        namespace: impl AsRef<str>,
        path: impl AsRef<str>,
    ) -> Result<Self, IdentifierError> {
        format!("{}:{}", namespace.as_ref(), path.as_ref()).parse()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// True when `other` is the `namespace:path` form of this identifier.
    pub fn matches_str(&self, other: &str) -> bool {
        match other.split_once(':') {
            Some((namespace, path)) => self.namespace == namespace && self.path == path,
            None => false,
        }
    }

    /// True when both identifiers live in the same namespace.
    pub fn same_namespace(&self, other: &Identifier) -> bool {
        self.namespace == other.namespace
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, path) = s
            .split_once(':')
            .ok_or_else(|| IdentifierError::MissingSeparator(s.to_string()))?;
        if namespace.is_empty() {
            return Err(IdentifierError::EmptyNamespace(s.to_string()));
        }
        if path.is_empty() {
            return Err(IdentifierError::EmptyPath(s.to_string()));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }
}

/// Unique identifier for an entity in a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of an external controller, usually a connected client.
///
/// Used for both the permanent owner and the temporary possessor of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Network role a system takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Server,
    Client,
    #[default]
    Hybrid,
}

impl Side {
    /// Whether a system with this side runs during the client pass.
    pub fn runs_client(self) -> bool {
        matches!(self, Side::Client | Side::Hybrid)
    }

    /// Whether a system with this side runs during the server pass.
    pub fn runs_server(self) -> bool {
        matches!(self, Side::Server | Side::Hybrid)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::Server => "server",
            Side::Client => "client",
            Side::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}
