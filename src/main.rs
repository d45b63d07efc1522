/* 3rd party libraries */
use clap::Parser;
use log::info;
use std::path::PathBuf;

/* Custom libraries */
use elevator_bank::config;
use elevator_bank::unwrap_or_exit;
use elevator_bank::Simulation;

/* Command line */
#[derive(Parser, Debug)]
#[clap(author, version, about = "Runs a scripted elevator bank simulation")]
struct Args {
    /// Path to the TOML configuration
    #[clap(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Overrides simulation.duration_seconds
    #[clap(short, long)]
    duration: Option<f64>,

    /// Print the final car snapshots as JSON
    #[clap(long)]
    json: bool,
}

/* Main */
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Load the configuration
    let config = unwrap_or_exit!(config::load_config(&args.config));
    let duration = args.duration.unwrap_or(config.simulation.duration_seconds);

    // Run the scenario
    let mut simulation = unwrap_or_exit!(Simulation::new(&config));
    simulation.run_scenario(&config.trips, duration);

    let stats = simulation.stats();
    info!(
        "Finished at {:.1}s: {} trips by car, {} by stairs, {} abandoned calls, {} refusals, mean wait {:.1}s",
        simulation.now(),
        stats.trips_completed,
        stats.stairs_taken,
        stats.abandoned_calls,
        stats.boarding_refusals,
        stats.mean_wait_seconds()
    );

    if args.json {
        let report = serde_json::json!({
            "stats": stats,
            "cars": simulation.snapshots(),
        });
        let output = unwrap_or_exit!(serde_json::to_string_pretty(&report));
        println!("{}", output);
    }
}
