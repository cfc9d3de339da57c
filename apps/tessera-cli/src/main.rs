mod config;
mod demo;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tessera_kernel::{Side, World};
use tessera_persist::{WorldSnapshot, load_json, save_json};

use config::HostConfig;

#[derive(Parser)]
#[command(name = "tessera", about = "Host process for tessera worlds")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the templates of the built-in library
    Info,
    /// Build a world from the built-in library and drive its update passes
    Run(RunArgs),
    /// Verify a snapshot file and list its entities
    Inspect {
        /// Snapshot JSON written by `run --snapshot-out`
        path: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// YAML host config; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of ticks to run
    #[arg(short, long)]
    ticks: Option<u64>,
    /// Update passes to drive each tick
    #[arg(short, long, value_enum)]
    role: Option<Role>,
    /// Demo entities to spawn into a fresh world
    #[arg(short, long)]
    entities: Option<usize>,
    /// Start from this snapshot instead of spawning entities
    #[arg(long)]
    restore_from: Option<PathBuf>,
    /// Write a snapshot here after the last tick
    #[arg(long)]
    snapshot_out: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Role {
    Server,
    Client,
    Hybrid,
}

impl From<Role> for Side {
    fn from(role: Role) -> Self {
        match role {
            Role::Server => Side::Server,
            Role::Client => Side::Client,
            Role::Hybrid => Side::Hybrid,
        }
    }
}

impl RunArgs {
    fn into_config(self) -> anyhow::Result<HostConfig> {
        let mut config = match &self.config {
            Some(path) => HostConfig::load(path)?,
            None => HostConfig::default(),
        };
        if let Some(ticks) = self.ticks {
            config.ticks = ticks;
        }
        if let Some(role) = self.role {
            config.role = role.into();
        }
        if let Some(entities) = self.entities {
            config.spawn_demo_entities = entities;
        }
        if self.restore_from.is_some() {
            config.restore_from = self.restore_from;
        }
        if self.snapshot_out.is_some() {
            config.snapshot_out = self.snapshot_out;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Info => info(),
        Commands::Run(args) => run(args.into_config()?),
        Commands::Inspect { path } => inspect(path),
    }
}

fn info() -> anyhow::Result<()> {
    println!("tessera v{}", env!("CARGO_PKG_VERSION"));
    let manager = demo::library_manager()?;
    for library in manager.libraries() {
        println!("library {}", library.namespace());
        for component in library.components() {
            println!("  component   {}", component.id());
        }
        for system in library.systems() {
            println!("  system      {} ({}, {})", system.id(), system.name(), system.side());
        }
        for composition in library.compositions() {
            let members: Vec<&str> = composition.iter().collect();
            println!("  composition {} [{}]", composition.id, members.join(", "));
        }
    }
    Ok(())
}

fn run(config: HostConfig) -> anyhow::Result<()> {
    let manager = demo::library_manager()?;
    let world = match &config.restore_from {
        Some(path) => load_json(path)?.restore()?,
        None => {
            let world = World::new(config.world_id()?);
            demo::spawn_entities(&manager, &world, config.spawn_demo_entities)?;
            world
        }
    };
    demo::install_systems(&manager, &world)?;
    tracing::info!(
        world = %world.id(),
        entities = world.entity_count(),
        systems = world.system_ids().len(),
        role = %config.role,
        ticks = config.ticks,
        "starting"
    );

    for tick in 0..config.ticks {
        let _span = tracing::debug_span!("tick", tick).entered();
        if config.role.runs_server() {
            world.update_server();
        }
        if config.role.runs_client() {
            world.update_client();
        }
    }

    let snapshot = WorldSnapshot::capture(&world)?;
    println!(
        "world {}: ticks={}, entities={}, hash={}",
        world.id(),
        config.ticks,
        snapshot.entity_count(),
        snapshot.hash
    );
    if let Some(path) = &config.snapshot_out {
        save_json(&snapshot, path)?;
        println!("snapshot written to {}", path.display());
    }
    Ok(())
}

fn inspect(path: PathBuf) -> anyhow::Result<()> {
    let snapshot = load_json(&path)?;
    println!(
        "world {} (schema v{}): {} entities, hash={} [verified]",
        snapshot.world_id,
        snapshot.schema_version,
        snapshot.entity_count(),
        snapshot.hash
    );
    for record in &snapshot.entities {
        let components: Vec<String> = record.components.iter().map(|c| c.id().to_string()).collect();
        print!("  {} [{}]", record.id, components.join(", "));
        if let Some(owner) = record.owner_id {
            print!(" owner={owner}");
        }
        if let Some(possessor) = record.possessed_id {
            print!(" possessed_by={possessor}");
        }
        println!();
    }
    Ok(())
}
