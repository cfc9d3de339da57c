use tessera_kernel::WorldError;

/// Errors from capturing, verifying and loading snapshots.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("snapshot cannot be restored: {0}")]
    World(#[from] WorldError),
}

impl PersistError {
    pub fn label(&self) -> &'static str {
        match self {
            PersistError::Io(_) => "Io",
            PersistError::Json(_) => "Json",
            PersistError::IntegrityMismatch { .. } => "IntegrityMismatch",
            PersistError::SchemaMismatch { .. } => "SchemaMismatch",
            PersistError::World(err) => err.label(),
        }
    }
}
