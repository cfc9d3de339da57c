use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Error type returned by event handlers. Propagated to the caller untouched.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A named event handler. Shared so that cloning a table (e.g. when a system
/// template is instantiated) does not require cloning closures.
pub type Handler = Arc<dyn Fn(&[Value]) -> Result<Value, HandlerError> + Send + Sync>;

/// Errors from listening on or calling into an [`EventTable`].
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("a listener named '{0}' already exists")]
    ListenerExists(String),
    #[error("no listener named '{0}'")]
    ListenerNotFound(String),
    #[error("listener '{name}' failed: {source}")]
    Handler {
        name: String,
        #[source]
        source: HandlerError,
    },
}

impl EventError {
    pub fn label(&self) -> &'static str {
        match self {
            EventError::ListenerExists(_) => "ListenerExists",
            EventError::ListenerNotFound(_) => "ListenerNotFound",
            EventError::Handler { .. } => "HandlerFailed",
        }
    }

    /// The error the handler itself returned, if this is a handler failure.
    pub fn into_handler_error(self) -> Option<HandlerError> {
        match self {
            EventError::Handler { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Private mapping of event name to handler, owned by one system instance.
///
/// There is no world-wide bus: to reach another system's events the caller
/// looks that system up and calls into its table directly.
#[derive(Clone, Default)]
pub struct EventTable {
    handlers: BTreeMap<String, Handler>,
}

impl EventTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. An existing handler with the same name is kept.
    pub fn listen<F>(&mut self, name: impl Into<String>, handler: F) -> Result<(), EventError>
    where
        F: Fn(&[Value]) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            tracing::warn!(op = "listen", listener = %name, "listener already registered");
            return Err(EventError::ListenerExists(name));
        }
        tracing::debug!(listener = %name, "listener registered");
        self.handlers.insert(name, Arc::new(handler));
        Ok(())
    }

    /// Invoke a handler synchronously.
    ///
    /// A handler's own error comes back wrapped in [`EventError::Handler`]
    /// with the event name attached; the boxed value is the exact error the
    /// handler returned. Recover it with [`EventError::into_handler_error`]
    /// and downcast it, or read it through [`std::error::Error::source`].
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, EventError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| EventError::ListenerNotFound(name.to_string()))?;
        handler(args).map_err(|source| EventError::Handler {
            name: name.to_string(),
            source,
        })
    }

    pub fn unlisten(&mut self, name: &str) -> Result<(), EventError> {
        match self.handlers.remove(name) {
            Some(_) => Ok(()),
            None => Err(EventError::ListenerNotFound(name.to_string())),
        }
    }

    pub fn has_listener(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered event names in lexical order.
    pub fn listeners(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for EventTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}
