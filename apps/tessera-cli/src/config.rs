use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tessera_kernel::{Identifier, Side};

/// Host process settings, usually read from `host.yaml`.
///
/// Every field is optional in the file; missing ones take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// World identifier in `namespace:path` form.
    pub world: String,
    /// Number of ticks to run.
    pub ticks: u64,
    /// Which update passes each tick drives. `hybrid` runs server then client.
    pub role: Side,
    /// Where to write a snapshot once the loop finishes.
    pub snapshot_out: Option<PathBuf>,
    /// Start from a saved snapshot instead of an empty world.
    pub restore_from: Option<PathBuf>,
    /// Demo entities to spawn into a fresh world.
    pub spawn_demo_entities: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            world: "core:overworld".into(),
            ticks: 10,
            role: Side::Hybrid,
            snapshot_out: None,
            restore_from: None,
            spawn_demo_entities: 4,
        }
    }
}

impl HostConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening config {}", path.display()))?;
        let config = serde_yaml::from_reader(file)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn world_id(&self) -> anyhow::Result<Identifier> {
        self.world
            .parse()
            .with_context(|| format!("invalid world id '{}'", self.world))
    }
}
