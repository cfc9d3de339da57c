//! Snapshot files on disk: one pretty-printed JSON document per snapshot.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::PersistError;
use crate::snapshot::{SNAPSHOT_SCHEMA_VERSION, WorldSnapshot};

/// Write a snapshot to `path`, creating parent directories as needed.
pub fn save_json(snapshot: &WorldSnapshot, path: impl AsRef<Path>) -> Result<(), PersistError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), world = %snapshot.world_id, "snapshot written");
    Ok(())
}

/// Read a snapshot back and check its schema version and content hash.
///
/// Fails closed: a file that does not verify is never returned.
pub fn load_json(path: impl AsRef<Path>) -> Result<WorldSnapshot, PersistError> {
    let path = path.as_ref();
    let snapshot: WorldSnapshot = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
        tracing::warn!(op = "load_json", path = %path.display(), version = snapshot.schema_version, "unsupported snapshot schema");
        return Err(PersistError::SchemaMismatch {
            file_version: snapshot.schema_version,
            expected_version: SNAPSHOT_SCHEMA_VERSION,
        });
    }
    snapshot.verify()?;
    tracing::debug!(path = %path.display(), world = %snapshot.world_id, "snapshot loaded");
    Ok(snapshot)
}
