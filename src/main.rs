mod config;
mod terrain;
mod watch;

use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use loam_mesh_cpu::{CpuMeshAdapter, ObjectInstances};
use loam_runtime::{StreamingEngine, ThreadedGenerator, WorldEvent};

use crate::config::DemoConfig;
use crate::terrain::HeightmapTerrain;
use crate::watch::ConfigWatcher;

#[derive(Parser, Debug)]
#[command(name = "loam", about = "Headless voxel streaming demo")]
struct Args {
    /// Demo config (engine and terrain tables)
    #[arg(long, default_value = "assets/voxels/loam.toml")]
    config: PathBuf,

    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Viewer speed in blocks per tick along +X
    #[arg(long, default_value_t = 0.5)]
    speed: f64,

    /// Generator worker threads
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Sleep between ticks, in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Log queue statistics every N ticks
    #[arg(long, default_value_t = 60)]
    report_every: u32,

    /// Reload terrain parameters when the config file changes
    #[arg(long, default_value_t = false)]
    watch: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(args: &Args) -> Result<(), Box<dyn Error>> {
    match &args.log_file {
        Some(path) => {
            simplelog::WriteLogger::init(
                log::LevelFilter::Info,
                simplelog::Config::default(),
                File::create(path)?,
            )?;
        }
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .format_timestamp_millis()
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let cfg = if args.config.exists() {
        DemoConfig::load(&args.config)?
    } else {
        log::warn!("{} not found; running with defaults", args.config.display());
        DemoConfig::default()
    };
    let registry = Arc::new(cfg.registry()?);
    let size = cfg.engine.chunk_size;
    let base_world = cfg.engine.world_name.clone();

    let terrain = HeightmapTerrain::new(cfg.terrain.clone(), &registry);
    let worker = terrain.clone();
    let generator = ThreadedGenerator::new(args.threads, move |c, s| worker.generate(c, s))?;

    let adapter = CpuMeshAdapter::new(Arc::clone(&registry));
    let objects = ObjectInstances::new(Arc::clone(&registry), size);
    let mut engine =
        StreamingEngine::new(cfg.engine.clone(), Arc::clone(&registry), adapter, objects)?;
    engine.register_chunk_generator(Box::new(generator));

    let watcher = if args.watch {
        Some(ConfigWatcher::new(&args.config)?)
    } else {
        None
    };
    let mut generation = 0u32;

    let mut x = 0.0;
    for t in 0..args.ticks {
        engine.set_viewer_position([x, cfg.terrain.base_height as f64, 0.0]);
        engine.tick();
        engine.render();

        for event in engine.drain_events() {
            match event {
                WorldEvent::InitialLoadComplete => {
                    log::info!("initial load complete after {} ticks", t + 1)
                }
                WorldEvent::PlayerEnteredChunk { coord } => log::debug!("viewer entered {}", coord),
                _ => {}
            }
        }

        if let Some(w) = watcher.as_ref().filter(|w| w.changed()) {
            match DemoConfig::load(w.path()) {
                Ok(next) if terrain.replace_params(next.terrain.clone()) => {
                    generation += 1;
                    engine.set_world_name(format!("{base_world}#{generation}"));
                    log::info!(
                        "terrain parameters changed; regenerating as `{}`",
                        engine.world_name()
                    );
                }
                Ok(_) => log::debug!("config touched; terrain unchanged"),
                Err(e) => log::warn!("ignoring bad config {}: {}", w.path().display(), e),
            }
        }

        if args.report_every > 0 && (t + 1) % args.report_every == 0 {
            engine.report();
            let a = engine.adapter();
            log::info!(
                "meshes alive {}, built {}, triangles {}",
                a.live_meshes(),
                a.total_built(),
                a.total_triangles()
            );
        }

        x += args.speed;
        if args.frame_ms > 0 {
            std::thread::sleep(Duration::from_millis(args.frame_ms));
        }
    }

    engine.report();
    Ok(())
}
