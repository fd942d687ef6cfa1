use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context as _};
use backgammon_client::{
    parse_speed, render_simulation_status, ApiClient, Difficulty, RobotView, SimulationApi,
    SimulationConfig, DEFAULT_SPEED_MS,
};
use tracing::{debug, info};

use super::{parse_game, print_game, style, Context};

#[derive(clap::Args)]
pub struct SimulationArgs {
    /// ID of the simulation
    pub simulation_id: String,
}

#[derive(clap::Args)]
pub struct SimulateArgs {
    /// Delay between moves in milliseconds (100 to 30000)
    #[arg(short, long, default_value_t = DEFAULT_SPEED_MS, value_parser = parse_speed)]
    pub speed: u32,

    /// Robot 1 difficulty (beginner|intermediate|advanced)
    #[arg(long, default_value_t = Difficulty::Beginner)]
    pub robot1_difficulty: Difficulty,

    /// Robot 2 difficulty (beginner|intermediate|advanced)
    #[arg(long, default_value_t = Difficulty::Beginner)]
    pub robot2_difficulty: Difficulty,
}

#[derive(clap::Args)]
pub struct WatchArgs {
    /// ID of the simulation to check
    pub simulation_id: String,

    /// Keep refreshing until the simulation finishes
    #[arg(short, long)]
    pub watch: bool,

    /// Update interval in seconds for watch mode
    #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,
}

#[derive(clap::Args)]
pub struct SpeedArgs {
    /// ID of the simulation
    pub simulation_id: String,

    /// New delay between moves in milliseconds (100 to 30000)
    #[arg(value_parser = parse_speed)]
    pub speed: u32,
}

#[derive(clap::Args)]
pub struct BoardArgs {
    /// ID of the simulation to show the board for
    pub simulation_id: String,

    /// Use this game instead of the simulation's
    #[arg(short, long)]
    pub game_id: Option<String>,

    /// Print the game document as JSON
    #[arg(short, long, conflicts_with = "server_board")]
    pub raw: bool,

    /// Print the board the service rendered instead of the local one
    #[arg(long)]
    pub server_board: bool,
}

/// Fails unless the service has two robots to pit against each other.
pub fn require_robots(client: &ApiClient) -> anyhow::Result<Vec<RobotView>> {
    let robots = client.robots().context("Failed to fetch robots")?;
    if robots.len() < 2 {
        bail!("Need at least 2 robot users to start a simulation");
    }
    info!(robots = robots.len(), "Robot users available");
    Ok(robots)
}

pub fn robot_list(context: &Context) -> anyhow::Result<()> {
    let robots = context
        .client()?
        .robots()
        .context("Failed to fetch robots")?;
    if robots.is_empty() {
        println!("{}", style::warning("No robot users found."));
        println!("Robot users are required to run simulations.");
        return Ok(());
    }

    let plural = if robots.len() == 1 { "" } else { "s" };
    println!(
        "{}\n",
        style::heading(format!("Found {} robot user{}:", robots.len(), plural))
    );
    for (idx, robot) in robots.iter().enumerate() {
        let name = robot
            .name
            .as_deref()
            .or(robot.id.as_deref())
            .unwrap_or("<unnamed>");
        println!("{}. {}", idx + 1, name);
        if let Some(difficulty) = &robot.difficulty {
            println!("   Difficulty: {}", difficulty);
        }
        if let Some(email) = &robot.email {
            println!("   Email: {}", email);
        }
        if let Some(id) = &robot.id {
            println!("   ID: {}", id);
        }
    }
    Ok(())
}

pub fn robot_simulate(context: &Context, args: &SimulateArgs) -> anyhow::Result<()> {
    let client = context.client()?;
    require_robots(&client)?;

    let config = SimulationConfig {
        speed: args.speed,
        robot1_difficulty: args.robot1_difficulty,
        robot2_difficulty: args.robot2_difficulty,
    };
    println!("Starting simulation with configuration:");
    println!("  Robot 1: {}", config.robot1_difficulty);
    println!("  Robot 2: {}", config.robot2_difficulty);
    println!("  Speed: {}ms between moves", config.speed);

    let simulation = client
        .start_simulation(&config)
        .context("Failed to start simulation")?;
    let id = simulation.id.as_deref().unwrap_or("<unknown>");
    println!("{}", style::success("✓ Simulation started successfully!"));
    println!("Simulation ID: {}", id);
    if let Some(game_id) = &simulation.game_id {
        println!("Game ID: {}", game_id);
    }
    println!(
        "\n{}",
        style::heading("Use the following commands to monitor the simulation:")
    );
    println!("  ndbg robot-status {}", id);
    println!("  ndbg robot-pause {}", id);
    println!("  ndbg robot-stop {}", id);
    Ok(())
}

pub fn robot_status(context: &Context, args: &WatchArgs) -> anyhow::Result<()> {
    let client = context.client()?;
    let fetch = || {
        client
            .simulation_status(&args.simulation_id)
            .context("Failed to get simulation status")
    };

    if !args.watch {
        print!("{}", render_simulation_status(&fetch()?));
        return Ok(());
    }

    println!(
        "Watching simulation {} (press Ctrl+C to stop)",
        args.simulation_id
    );
    let interval = Duration::from_secs(args.interval);
    let mut first = true;
    loop {
        let status = fetch()?;
        if !first {
            // Clear the screen and move the cursor home.
            print!("\x1B[2J\x1B[0f");
        }
        first = false;
        print!("{}", render_simulation_status(&status));
        std::io::stdout().flush()?;
        if status.is_finished() {
            println!("\n{}", style::success("Simulation finished. Stopping watch mode."));
            return Ok(());
        }
        debug!(seconds = args.interval, "Waiting for next update");
        thread::sleep(interval);
    }
}

pub fn robot_pause(context: &Context, args: &SimulationArgs) -> anyhow::Result<()> {
    context
        .client()?
        .pause_simulation(&args.simulation_id)
        .context("Failed to pause simulation")?;
    println!("{}", style::success(format!("Simulation {} paused", args.simulation_id)));
    Ok(())
}

pub fn robot_stop(context: &Context, args: &SimulationArgs) -> anyhow::Result<()> {
    context
        .client()?
        .stop_simulation(&args.simulation_id)
        .context("Failed to stop simulation")?;
    println!("{}", style::success(format!("Simulation {} stopped", args.simulation_id)));
    Ok(())
}

pub fn robot_speed(context: &Context, args: &SpeedArgs) -> anyhow::Result<()> {
    context
        .client()?
        .set_simulation_speed(&args.simulation_id, args.speed)
        .context("Failed to change simulation speed")?;
    println!(
        "{}",
        style::success(format!(
            "Simulation {} now waits {}ms between moves",
            args.simulation_id, args.speed
        ))
    );
    Ok(())
}

pub fn robot_board(context: &Context, args: &BoardArgs) -> anyhow::Result<()> {
    let client = context.client()?;
    let simulation = client
        .simulation_status(&args.simulation_id)
        .context("Failed to get simulation status")?;
    let game_id = match (&args.game_id, &simulation.game_id) {
        (Some(game_id), _) | (None, Some(game_id)) => game_id,
        (None, None) => bail!("No game ID found in simulation data"),
    };
    debug!(game = %game_id, "Fetching simulation game");

    let value = client.game_raw(game_id).context("Failed to fetch game")?;
    if args.raw {
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    let game = parse_game(value)?;
    print_game(&game, &context.classifier(&client), args.server_board)?;
    println!();
    print!("{}", render_simulation_status(&simulation));
    Ok(())
}
