use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;
use std::time::Duration;

use grid_traffic::{
    compute::BackendKind,
    config::SimulationConfig,
    simulation::{PerformanceTracker, Simulation},
};

#[derive(Parser)]
#[command(name = "grid-traffic")]
#[command(about = "Headless anchor-grid traffic simulation")]
struct Args {
    /// Simulation compute backend
    #[arg(short, long, value_enum, default_value_t = Backend::Cpu)]
    backend: Backend,

    /// Route configuration file
    #[arg(short, long, default_value = "route.toml")]
    route: String,

    /// Cars configuration file
    #[arg(short, long, default_value = "cars.toml")]
    cars: String,

    /// Random seed for reproducible simulations
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Pace ticks at 60 Hz instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Resize the world half way through, e.g. 1600x900
    #[arg(long, value_parser = parse_size)]
    resize: Option<(f32, f32)>,

    /// Enable verbose logging for detailed simulation progress
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Backend {
    /// Sequential per-car updates
    Cpu,
    /// Per-car updates across the rayon thread pool
    Parallel,
}

impl From<Backend> for BackendKind {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Cpu => BackendKind::Cpu,
            Backend::Parallel => BackendKind::Parallel,
        }
    }
}

fn parse_size(s: &str) -> Result<(f32, f32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w: f32 = w.trim().parse().map_err(|e| format!("bad width {w:?}: {e}"))?;
    let h: f32 = h.trim().parse().map_err(|e| format!("bad height {h:?}: {e}"))?;
    if w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0 {
        Ok((w, h))
    } else {
        Err(format!("size must be positive and finite, got {w}x{h}"))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();
    info!("Starting Grid Traffic Simulator (Console Mode)");

    // Load configuration
    let mut config = SimulationConfig::load_from_files(&args.route, &args.cars)?;
    if let Some(seed) = args.seed {
        config.cars.random.seed = Some(seed);
    }
    let map_text = config.load_map_text()?;
    info!(
        "Loaded configuration: {} cars, route: {} ({:?} layout, cell size {})",
        config.cars.simulation.total_cars,
        config.route.route.name,
        config.route.route.layout,
        config.route.route.cell_size
    );
    if let Some(seed) = config.cars.random.seed {
        info!("Random Seed: {}", seed);
    }

    let mut simulation = Simulation::new(&config, map_text.as_deref(), args.backend.into())?;
    info!(
        "Compute backend: {} ({})",
        simulation.backend_name(),
        if simulation.backend_supports_parallel() { "parallel" } else { "sequential" }
    );

    let mut performance_tracker = PerformanceTracker::new(config.cars.performance.timing_samples as usize);
    let target_frame_time = Duration::from_secs_f64(1.0 / 60.0);
    let resize_at = args.resize.map(|size| (args.ticks / 2, size));

    info!("Running simulation for {} ticks...", args.ticks);

    for tick in 0..args.ticks {
        performance_tracker.start_frame();

        if let Some((at, (width, height))) = resize_at {
            if tick == at {
                simulation.resize(width, height)?;
            }
        }

        performance_tracker.start_simulation();
        simulation.tick()?;
        performance_tracker.end_simulation();

        if args.realtime {
            let elapsed = performance_tracker.average_simulation_time();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }
        }

        performance_tracker.end_frame();

        // Status once per simulated second
        if (tick + 1) % 60 == 0 {
            let counts = simulation.state_counts();
            info!(
                "Tick {}: {} seeking, {} coasting, {} unanchored, {} anchor changes, avg speed {:.2}, avg accel {:.3}, {:.1} FPS, Sim: {:.3}ms",
                tick + 1,
                counts.seeking,
                counts.coasting,
                counts.no_anchor,
                simulation.state().anchor_changes,
                simulation.state().average_speed(),
                simulation.state().average_acceleration(),
                performance_tracker.fps(),
                performance_tracker.average_simulation_time().as_secs_f64() * 1000.0
            );
        }
    }

    let counts = simulation.state_counts();
    info!("Simulation completed!");
    info!("Total ticks: {}", simulation.tick_count());
    info!("Anchor changes: {}", simulation.state().anchor_changes);
    info!(
        "World {:.0}x{:.0}, {} anchors ({} routed)",
        simulation.world().width,
        simulation.world().height,
        simulation.anchors().len(),
        simulation.grid().routed_anchor_count()
    );
    info!(
        "Final cars: {} seeking, {} coasting, {} unanchored",
        counts.seeking, counts.coasting, counts.no_anchor
    );

    Ok(())
}
