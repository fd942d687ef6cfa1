use std::path::PathBuf;

use backgammon_client::{
    default_scenarios, load_scenarios, parse_speed, render_results, save_results, BatchRunner,
    Preset, DEFAULT_BATCH_SPEED_MS, DEFAULT_MAX_CONCURRENT,
};
use tracing::info;

use super::{require_robots, style, Context};

#[derive(clap::Args)]
pub struct BatchArgs {
    /// Maximum concurrent simulations
    #[arg(short, long, default_value_t = DEFAULT_MAX_CONCURRENT)]
    pub concurrent: usize,

    /// Speed for scenarios that don't set their own, in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SPEED_MS, value_parser = parse_speed)]
    pub speed: u32,

    /// Use preset scenarios (all|difficulty-test|speed-test)
    #[arg(short, long, conflicts_with = "file")]
    pub preset: Option<Preset>,

    /// Load scenarios from a JSON file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Save results to a JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn robot_batch(context: &Context, args: &BatchArgs) -> anyhow::Result<()> {
    let client = context.client()?;
    let robots = require_robots(&client)?;
    println!("Found {} robot users available", robots.len());

    let scenarios = match (&args.preset, &args.file) {
        (Some(preset), _) => preset.scenarios(args.speed),
        (None, Some(path)) => load_scenarios(path)?,
        (None, None) => default_scenarios(args.speed),
    };
    if scenarios.is_empty() {
        anyhow::bail!("No scenarios to run");
    }

    println!(
        "\n{}",
        style::heading(format!("Running {} simulation scenarios...", scenarios.len()))
    );
    println!("Max concurrent: {}", args.concurrent);
    println!("Default speed: {}ms\n", args.speed);

    let results = BatchRunner::new(&client)
        .max_concurrent(args.concurrent)
        .default_speed(args.speed)
        .run(scenarios);
    info!(results = results.len(), "Batch finished");

    print!("{}", render_results(&results, args.speed));

    if let Some(path) = &args.output {
        save_results(path, &results)?;
        println!("{}", style::success(format!("Results saved to {}", path.display())));
    }
    Ok(())
}
