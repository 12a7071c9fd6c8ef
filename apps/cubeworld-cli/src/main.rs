use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cubeworld_assets::VoxelCatalog;
use cubeworld_common::VoxelTypeId;
use cubeworld_input::{Action, InputState, Key, LookMode};
use cubeworld_kernel::{ActionOutcome, FrameClock, World, WorldConfig};
use cubeworld_persist::SaveStore;
use cubeworld_tools::WorldInspector;
use glam::{IVec3, Vec2};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubeworld-cli", about = "Drive a cubeworld session from the command line")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML world configuration; omitted fields keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, voxel catalog and effective configuration
    Info,
    /// Run a scripted session: held keys and look motion for a number of ticks
    Simulate {
        /// Number of ticks to run
        #[arg(short, long, default_value = "120")]
        ticks: u64,
        /// Terrain seed for a new world
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Keys held for the whole run (w, a, s, d, up, down, left, right, space)
        #[arg(short, long, value_delimiter = ',')]
        keys: Vec<Key>,
        /// Horizontal look motion per tick, in pixels
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        look_dx: f32,
        /// Vertical look motion per tick, in pixels
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        look_dy: f32,
        /// Simulated frame time in milliseconds; defaults to the ideal frame time
        #[arg(long)]
        frame_ms: Option<f32>,
        /// Request a placement every N ticks
        #[arg(long)]
        place_every: Option<u64>,
        /// Voxel type to place
        #[arg(long)]
        voxel: Option<String>,
        /// Grid size override
        #[arg(long)]
        grid_size: Option<usize>,
        /// Save directory; an existing save there is resumed
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Load a save and print its summary
    Inspect {
        /// Save directory
        dir: PathBuf,
        /// Cell to describe, as x,y,z
        #[arg(long)]
        cell: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info => {
            println!("cubeworld-cli v{}", env!("CARGO_PKG_VERSION"));
            let catalog = VoxelCatalog::standard();
            let types: Vec<&str> = catalog.type_ids().map(VoxelTypeId::as_str).collect();
            println!("voxel types ({}): {}", types.len(), types.join(", "));
            println!("assets: {}", catalog.assets().len());
            print!("{}", serde_yaml::to_string(&config)?);
        }
        Commands::Simulate {
            ticks,
            seed,
            keys,
            look_dx,
            look_dy,
            frame_ms,
            place_every,
            voxel,
            grid_size,
            save,
        } => {
            let mut config = config;
            if let Some(size) = grid_size {
                config.grid_size = size;
                config.validate().context("--grid-size")?;
            }
            let store = save.as_deref().map(SaveStore::open).transpose()?;
            let mut world = open_world(config, seed, store.as_ref())?;
            if let Some(name) = voxel {
                world.select_voxel_type(VoxelTypeId::from(name.as_str()))?;
            }
            world.drain_events();

            let mut clock = FrameClock::from_seconds(world.config().ideal_frame_time, 64)?;
            let frame = match frame_ms {
                Some(ms) => Duration::try_from_secs_f32(ms / 1000.0)
                    .with_context(|| format!("invalid --frame-ms {ms}"))?,
                None => clock.ideal(),
            };

            let mut input = InputState::new();
            for key in &keys {
                input.key_down(*key);
            }
            let look = Vec2::new(look_dx, look_dy);
            if look != Vec2::ZERO {
                input.push_action(Action::SetLookMode(LookMode::LockedPointer));
            }

            let mut placed = 0usize;
            let mut rejected = 0usize;
            for t in 0..ticks {
                if look != Vec2::ZERO {
                    input.pointer_motion(look);
                }
                if place_every.is_some_and(|n| n > 0 && t % n == 0) {
                    input.push_action(Action::PlaceVoxel);
                }
                let ratio = clock.record(frame);
                let report = world.tick(&input.snapshot(), ratio)?;
                for outcome in &report.outcomes {
                    match outcome {
                        ActionOutcome::Placed(cell) => {
                            placed += 1;
                            tracing::debug!(%cell, tick = t, "placed");
                        }
                        ActionOutcome::Rejected(reason) => {
                            rejected += 1;
                            tracing::debug!(%reason, tick = t, "placement rejected");
                        }
                        ActionOutcome::Paused(false) => clock.restart(),
                        _ => {}
                    }
                }
                if report.save_requested {
                    if let Some(store) = &store {
                        store.save_world(&world)?;
                    }
                }
            }

            println!("{}", WorldInspector::summary(&world));
            println!(
                "frames: avg={:?} max={:?} placed={placed} rejected={rejected}",
                clock.average(),
                clock.max()
            );
            if let Some(store) = &store {
                store.save_world(&world)?;
                println!("saved to {}", store.root().display());
            }
        }
        Commands::Inspect { dir, cell } => {
            let store = SaveStore::open(&dir)?;
            let world = store
                .load_world(config, VoxelCatalog::standard())?
                .with_context(|| format!("no complete save in {}", dir.display()))?;
            println!("{}", WorldInspector::summary(&world));
            for (voxel, count) in WorldInspector::voxel_histogram(&world) {
                println!("  {voxel}: {count}");
            }
            if let Some(text) = cell {
                let cell = parse_cell(&text)?;
                match WorldInspector::inspect_cell(&world, cell) {
                    Some(info) => println!("{info}"),
                    None => println!("Cell {cell} is outside the grid"),
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<WorldConfig> {
    let Some(path) = path else {
        return Ok(WorldConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: WorldConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Resume the save in `store` if there is one, otherwise generate terrain.
fn open_world(config: WorldConfig, seed: u64, store: Option<&SaveStore>) -> anyhow::Result<World> {
    if let Some(store) = store {
        if let Some(world) = store.load_world(config.clone(), VoxelCatalog::standard())? {
            tracing::info!(root = %store.root().display(), "resuming save");
            return Ok(world);
        }
    }
    tracing::info!(seed, "generating world");
    Ok(World::generate(config, VoxelCatalog::standard(), seed)?)
}

fn parse_cell(text: &str) -> anyhow::Result<IVec3> {
    let parts = text
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("bad cell {text:?}"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(IVec3::new(*x, *y, *z)),
        _ => anyhow::bail!("cell must be x,y,z, got {text:?}"),
    }
}
