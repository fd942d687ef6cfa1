mod commands;

use clap::{Parser, Subcommand};
use commands::{
    BatchArgs, BoardArgs, GameArgs, GlobalArgs, JoinArgs, LoginArgs, MoveArgs, NewArgs,
    SimulateArgs, SimulationArgs, SpeedArgs, StatusArgs, WatchArgs,
};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Command-line client for the Nodots Backgammon service
#[derive(Parser)]
#[command(name = "ndbg", version)]
struct Args {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store credentials for the game service
    Login(LoginArgs),
    /// Forget the stored credentials
    Logout,
    /// Create a game between two users
    New(NewArgs),
    /// Create a game against a robot
    HumanVsRobot,
    /// Join an existing game and show the service's board
    Join(JoinArgs),
    /// Show a game's board and status
    Status(StatusArgs),
    /// Roll dice for the active player
    Roll(GameArgs),
    /// Move a checker of the active player
    Move(MoveArgs),
    /// List available robot users
    #[command(alias = "robots")]
    RobotList,
    /// Start a robot vs robot simulation
    RobotSimulate(SimulateArgs),
    /// Check the status of a robot simulation
    RobotStatus(WatchArgs),
    /// Pause a running simulation
    RobotPause(SimulationArgs),
    /// Stop a simulation
    RobotStop(SimulationArgs),
    /// Change the delay between robot moves
    RobotSpeed(SpeedArgs),
    /// Show the board of a simulation's game
    RobotBoard(BoardArgs),
    /// Run many robot simulations
    RobotBatch(BatchArgs),
}

fn main() {
    let args = Args::parse();

    initialize_logging(args.global.log_level);
    if args.global.no_color {
        owo_colors::set_override(false);
    }

    if let Err(err) = run(args) {
        eprintln!("{} {:#}", commands::style::error_label("Error:"), err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let context = commands::Context::new(&args.global)?;
    match args.command {
        Command::Login(login) => commands::login(&context, &login),
        Command::Logout => commands::logout(&context),
        Command::New(new) => commands::new_game(&context, &new),
        Command::HumanVsRobot => commands::human_vs_robot(&context),
        Command::Join(join) => commands::join(&context, &join),
        Command::Status(status) => commands::status(&context, &status),
        Command::Roll(game) => commands::roll(&context, &game),
        Command::Move(mv) => commands::move_checker(&context, &mv),
        Command::RobotList => commands::robot_list(&context),
        Command::RobotSimulate(simulate) => commands::robot_simulate(&context, &simulate),
        Command::RobotStatus(watch) => commands::robot_status(&context, &watch),
        Command::RobotPause(simulation) => commands::robot_pause(&context, &simulation),
        Command::RobotStop(simulation) => commands::robot_stop(&context, &simulation),
        Command::RobotSpeed(speed) => commands::robot_speed(&context, &speed),
        Command::RobotBoard(board) => commands::robot_board(&context, &board),
        Command::RobotBatch(batch) => commands::robot_batch(&context, &batch),
    }
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn subcommands_use_kebab_case() {
        let args = Args::try_parse_from(["ndbg", "robot-status", "sim-1", "--watch"]).unwrap();
        assert!(matches!(args.command, Command::RobotStatus(WatchArgs { watch: true, .. })));

        let args = Args::try_parse_from(["ndbg", "robots"]).unwrap();
        assert!(matches!(args.command, Command::RobotList));
    }

    #[test]
    fn join_takes_a_game_id() {
        let args = Args::try_parse_from(["ndbg", "join", "game-1"]).unwrap();
        assert!(matches!(
            &args.command,
            Command::Join(JoinArgs { game_id }) if game_id == "game-1"
        ));
        assert!(Args::try_parse_from(["ndbg", "join"]).is_err());
    }

    #[test]
    fn no_color_is_global() {
        let args = Args::try_parse_from(["ndbg", "status", "game-1", "--no-color"]).unwrap();
        assert!(args.global.no_color);
        let args = Args::try_parse_from(["ndbg", "robots"]).unwrap();
        assert!(!args.global.no_color);
    }

    #[test]
    fn login_needs_exactly_one_method() {
        assert!(Args::try_parse_from(["ndbg", "login"]).is_err());
        assert!(Args::try_parse_from(["ndbg", "login", "--token", "t", "--email", "a@b.c"]).is_err());
        assert!(Args::try_parse_from(["ndbg", "login", "--token", "t"]).is_ok());
    }

    #[test]
    fn speeds_are_validated_while_parsing() {
        assert!(Args::try_parse_from(["ndbg", "robot-speed", "sim-1", "50"]).is_err());
        assert!(Args::try_parse_from(["ndbg", "robot-speed", "sim-1", "500"]).is_ok());
        assert!(Args::try_parse_from(["ndbg", "robot-simulate", "--speed", "40000"]).is_err());
    }
}
