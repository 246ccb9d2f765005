use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use road_traffic::simulation::{
    behaviors, scenarios, NullRenderer, SimConfig, SimulationBuilder, SleepPacer,
    TerminalRenderer, TrafficController, DEFAULT_MAX_CATCH_UP, DEFAULT_PHYSICS_RATE,
};

#[derive(Parser)]
#[command(name = "road_traffic")]
#[command(about = "Road traffic simulation with a fixed-rate physics step")]
struct Cli {
    /// Scenario name or index (see --list)
    #[arg(long, default_value = "Trapezoid")]
    scenario: String,

    /// Number of vehicles to place
    #[arg(long, default_value = "10")]
    vehicles: usize,

    /// Behavior every vehicle drives with
    #[arg(long, default_value = "basic")]
    behavior: String,

    /// Real seconds to run before stopping
    #[arg(long, default_value = "5")]
    seconds: f64,

    /// Physics steps per second
    #[arg(long, default_value_t = DEFAULT_PHYSICS_RATE)]
    rate: f64,

    /// Most physics steps run in one frame (0 = no limit)
    #[arg(long, default_value_t = DEFAULT_MAX_CATCH_UP)]
    max_catch_up: u32,

    /// Frames per second requested from the host loop
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Don't draw the map
    #[arg(long)]
    quiet: bool,

    /// List scenarios and behaviors, then exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,road_traffic=info"),
    )
    .init();

    let cli = Cli::parse();

    if cli.list {
        println!("Scenarios:");
        for (index, scenario) in scenarios::SCENARIOS.iter().enumerate() {
            println!("  {}: {}", index, scenario.name);
        }
        println!("Behaviors:");
        for name in behaviors::BEHAVIOR_NAMES {
            println!("  {}", name);
        }
        return Ok(());
    }

    let scenario = scenarios::by_name(&cli.scenario)
        .with_context(|| format!("Unknown scenario '{}'", cli.scenario))?;
    let behavior = behaviors::by_name(&cli.behavior)
        .with_context(|| format!("Unknown behavior '{}'", cli.behavior))?;

    let run_time = Duration::try_from_secs_f64(cli.seconds.max(0.0))
        .with_context(|| format!("Invalid run time '{}' seconds", cli.seconds))?;

    let config = SimConfig {
        physics_rate: cli.rate,
        max_catch_up: (cli.max_catch_up > 0).then_some(cli.max_catch_up),
        seed: cli.seed,
        ..SimConfig::default()
    };

    info!(
        "Running '{}' with {} vehicles ({} behavior) for {:.1}s",
        scenario.name, cli.vehicles, cli.behavior, cli.seconds
    );

    let mut controller = TrafficController::new(SimulationBuilder::new(config));
    let session = if cli.quiet {
        controller.start(&scenario, cli.vehicles, behavior, NullRenderer)?
    } else {
        controller.start(&scenario, cli.vehicles, behavior, TerminalRenderer::default())?
    };

    let mut pacer = SleepPacer::for_duration(cli.fps, run_time);
    session.run(&mut pacer);
    session.log_summary();

    controller.stop();
    Ok(())
}
