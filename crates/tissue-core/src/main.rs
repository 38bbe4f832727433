//! Tissue Seeding Engine
//!
//! Seeds an embedded cell population, then steps the type switch until the
//! configured end time, writing events and population snapshots.

use bevy_ecs::prelude::*;
use clap::{Parser, ValueEnum};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use uuid::Uuid;

use tissue_core::config::DEFAULT_CONFIG_PATH;
use tissue_core::events::EventLogger;
use tissue_core::output::{
    generate_snapshot, write_current_state, write_snapshot_to_dir, SnapshotGenerator,
};
use tissue_core::setup::LayoutKind;
use tissue_core::systems::{
    scale_proliferation_by_oncoprotein, switch_cell_types, PendingSwitches,
};
use tissue_core::{setup_tissue, EcsRuntime, SimClock, TissueConfig};

/// Layout source selectable from the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    Recorded,
    Packed,
}

impl From<LayoutArg> for LayoutKind {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Recorded => LayoutKind::Recorded,
            LayoutArg::Packed => LayoutKind::Packed,
        }
    }
}

/// Command line arguments; each one overrides the config file
#[derive(Parser, Debug)]
#[command(name = "tissue_sim")]
#[command(about = "Seed a 2D tissue and run the embed-to-envelop switch")]
struct Args {
    /// TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Where initial positions come from
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Recorded layout file (`x y z type` rows)
    #[arg(long)]
    cell_file: Option<PathBuf>,

    /// Simulated minutes to run
    #[arg(long)]
    max_time: Option<f64>,

    /// Directory for events and snapshots
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut TissueConfig) {
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        if let Some(layout) = self.layout {
            config.layout.mode = layout.into();
        }
        if let Some(cell_file) = &self.cell_file {
            config.layout.cell_file = cell_file.clone();
        }
        if let Some(max_time) = self.max_time {
            config.simulation.max_time = max_time;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut config = TissueConfig::load_or_default(&args.config)?;
    args.apply(&mut config);

    let run_id = Uuid::new_v4();
    info!("Tissue seeding run {}", run_id);
    info!(
        "Seed: {}, dt: {}, max time: {}, layout: {}",
        config.simulation.seed,
        config.simulation.dt,
        config.simulation.max_time,
        config.layout.mode.as_str()
    );

    let out_dir = config.output.directory.clone();
    fs::create_dir_all(&out_dir)?;

    let mut rng = SmallRng::seed_from_u64(config.simulation.seed);
    let mut runtime = EcsRuntime::new(config.simulation.dt);
    let setup = setup_tissue(&config, &mut runtime, &mut rng)?;

    let mut logger = if config.output.write_events {
        EventLogger::new(out_dir.join("events.jsonl"), run_id)?
    } else {
        EventLogger::null(run_id)
    };
    logger.log_seeding(0.0, &setup.report)?;

    let mut world = runtime.into_world();
    world.insert_resource(setup.registry);
    world.insert_resource(setup.indices);
    world.insert_resource(PendingSwitches::new());
    world.insert_resource(SnapshotGenerator::new(run_id, config.snapshot_steps()));

    let mut schedule = Schedule::default();
    let scale = config.proliferation.scale_by_oncoprotein;
    match setup.switch_rule {
        Some(rule) => {
            world.insert_resource(rule);
            if scale {
                // Scaling reads the phenotype a switch may have replaced
                schedule.add_systems((switch_cell_types, scale_proliferation_by_oncoprotein).chain());
            } else {
                schedule.add_systems(switch_cell_types);
            }
        }
        None if scale => {
            schedule.add_systems(scale_proliferation_by_oncoprotein);
        }
        None => {}
    }

    emit_snapshot(&mut world, "simulation_start", &out_dir);

    let total_steps = config.total_steps();
    let mut switched = 0usize;
    for step in 1..=total_steps {
        world.resource_mut::<SimClock>().set_step(step);
        schedule.run(&mut world);

        let switches = world.resource_mut::<PendingSwitches>().drain();
        if !switches.is_empty() {
            switched += switches.len();
            logger.log_switches(&switches)?;
            info!(
                "[t = {:.2}] {} cells switched type",
                world.resource::<SimClock>().current_time,
                switches.len()
            );
        }

        if world.resource::<SnapshotGenerator>().should_snapshot(step) {
            emit_snapshot(&mut world, "periodic", &out_dir);
        }
    }

    emit_snapshot(&mut world, "simulation_end", &out_dir);
    logger.flush()?;

    info!(
        "Simulation complete. Ran {} steps to t = {}; {} cells switched, {} events, {} snapshots",
        total_steps,
        world.resource::<SimClock>().current_time,
        switched,
        logger.event_count(),
        world.resource::<SnapshotGenerator>().snapshot_count()
    );
    Ok(())
}

fn emit_snapshot(world: &mut World, trigger: &str, dir: &Path) {
    let snapshot = generate_snapshot(world, trigger);
    if let Err(e) = write_snapshot_to_dir(&snapshot, dir) {
        warn!("Could not write snapshot {}: {}", snapshot.snapshot_id, e);
    }
    if let Err(e) = write_current_state(&snapshot, dir) {
        warn!("Could not write current state: {}", e);
    }
}
