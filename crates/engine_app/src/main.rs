//! # engine_app: demo runner
//!
//! Builds a demo world of statically simulated crates with visualised
//! collision meshes and runs it on a fixed-timestep tick loop.
//!
//! ## Startup Sequence
//!
//! 1. Parse arguments and initialise structured logging.
//! 2. Build the scene (managers, objects, source collision meshes).
//! 3. Optionally schedule a background reload of the crate mesh.
//! 4. Run the tick loop, then shut the world down.

mod demo;
mod tick;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use engine_physics::VisColMeshManager;
use engine_resource::ResourceManager;
use engine_world::WorldConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tick::{TickConfig, TickLoop};

#[derive(Debug, Parser)]
#[command(name = "engine_app", about = "Component runtime demo")]
struct Args {
    /// Target ticks per second
    #[arg(long, default_value_t = 60.0)]
    tick_rate: f64,

    /// Number of ticks to run (0 = until interrupted)
    #[arg(long, default_value_t = 120)]
    max_ticks: u64,

    /// Number of crates in the scene
    #[arg(long, default_value_t = 8)]
    objects: usize,

    /// Reload the crate collision mesh after this many milliseconds
    #[arg(long)]
    reload_after_ms: Option<u64>,

    /// Evict unreferenced resources every this many ticks
    #[arg(long, default_value_t = 60)]
    gc_interval_ticks: u64,

    /// Print the final render data as JSON
    #[arg(long)]
    dump_render_data: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let args = Args::parse();
    info!(?args, "engine demo starting");

    let resources = Arc::new(ResourceManager::new());
    let config = WorldConfig::new("demo").with_gc_interval_ticks(args.gc_interval_ticks);
    let scene = demo::build_scene(config, &resources, args.objects)?;
    info!(visualizers = scene.visualizers.len(), "collision visualisation attached");

    let reload = args
        .reload_after_ms
        .map(|ms| demo::spawn_reload(Arc::clone(&resources), Duration::from_millis(ms)));

    let mut tick_loop = TickLoop::new(
        TickConfig {
            tick_rate: args.tick_rate,
            max_ticks: args.max_ticks,
        },
        scene.world,
    );
    tick_loop.run_async().await;
    info!(
        ticks = tick_loop.ticks_run(),
        world_tick = tick_loop.world().tick_id(),
        "simulation finished"
    );

    if let Some(reload) = reload {
        reload.abort();
    }

    let mut world = tick_loop.into_world();
    if let Some(vis) = world.manager::<VisColMeshManager>() {
        let stats = vis.stats();
        info!(
            built = stats.built,
            cache_hits = stats.cache_hits,
            source_missing = stats.source_missing,
            no_geometry = stats.no_geometry,
            "collision visualisation stats"
        );
    }

    if args.dump_render_data {
        let records = demo::extract_render_data(&world);
        println!("{}", serde_json::to_string_pretty(&records)?);
    }

    world.shutdown();
    info!("engine demo shut down");
    Ok(())
}
