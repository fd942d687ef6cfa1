use anyhow::{bail, Context as _};
use backgammon::{
    find_checker_id, render_game, render_point_summary, render_possible_moves, Board24,
    GameDocument, PlayerClassifier,
};
use backgammon_client::ApiError;
use tracing::info;

use super::style;
use super::Context;

#[derive(clap::Args)]
pub struct GameArgs {
    /// Game ID
    pub game_id: String,

    /// Print the board the service rendered instead of the local one
    #[arg(long)]
    pub server_board: bool,
}

#[derive(clap::Args)]
pub struct NewArgs {
    /// User ID of the first player
    pub player1: String,

    /// User ID of the second player
    pub player2: String,
}

#[derive(clap::Args)]
pub struct JoinArgs {
    /// Game ID
    pub game_id: String,
}

#[derive(clap::Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub game: GameArgs,

    /// Print the game document as JSON
    #[arg(long, conflicts_with = "server_board")]
    pub raw: bool,

    /// Also list the checkers on every occupied point
    #[arg(long, conflicts_with = "raw")]
    pub points: bool,
}

#[derive(clap::Args)]
pub struct MoveArgs {
    #[command(flatten)]
    pub game: GameArgs,

    /// The point to move from, in the active player's numbering
    #[arg(value_parser = clap::value_parser!(u8).range(1..=24))]
    pub from: u8,

    /// Destination point; without it the service picks one
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=25))]
    pub to: Option<u8>,
}

/// The service's own rendering, which must be present when asked for.
pub fn server_board(game: &GameDocument) -> Result<&str, ApiError> {
    game.ascii_board
        .as_deref()
        .ok_or(ApiError::MissingField { field: "asciiBoard" })
}

/// Decodes a game fetched as raw JSON, e.g. for `--raw`.
pub fn parse_game(value: serde_json::Value) -> Result<GameDocument, ApiError> {
    GameDocument::from_value(value).map_err(ApiError::Decode)
}

/// Prints the board, the status lines and what to do next.
pub fn print_game(
    game: &GameDocument,
    classifier: &dyn PlayerClassifier,
    use_server_board: bool,
) -> anyhow::Result<()> {
    if use_server_board {
        println!("{}", server_board(game)?);
    } else {
        println!("{}", style::paint_game(&render_game(game, classifier)));
    }

    let Some(state) = &game.state_kind else {
        return Ok(());
    };
    if state.awaits_move() && !game.possible_moves.is_empty() {
        println!("{}", render_possible_moves(&game.possible_moves));
    }
    if let Some(id) = &game.id {
        if state.awaits_roll() {
            println!("{}", style::hint(format!("Next: ndbg roll {}", id)));
        } else if state.awaits_move() {
            println!("{}", style::hint(format!("Next: ndbg move {} <from>", id)));
        }
    }
    Ok(())
}

fn print_players(game: &GameDocument, classifier: &dyn PlayerClassifier) {
    for player in &game.players {
        let kind = classifier.classify(player);
        let color = player
            .color
            .map_or_else(|| String::from("?"), |color| color.as_str().to_uppercase());
        match player.direction {
            Some(direction) => println!("{} {}: {} ({})", kind.icon(), kind.label(), color, direction),
            None => println!("{} {}: {}", kind.icon(), kind.label(), color),
        }
    }
}

pub fn new_game(context: &Context, args: &NewArgs) -> anyhow::Result<()> {
    if args.player1 == args.player2 {
        bail!("Players must be different");
    }
    let client = context.client()?;
    let game = client
        .create_game(&args.player1, &args.player2)
        .context("Failed to create game")?;
    announce_game(&game, &context.classifier(&client));
    Ok(())
}

pub fn human_vs_robot(context: &Context) -> anyhow::Result<()> {
    let client = context.client()?;
    let game = client
        .create_robot_game()
        .context("Failed to create game")?;
    announce_game(&game, &context.classifier(&client));
    Ok(())
}

fn announce_game(game: &GameDocument, classifier: &dyn PlayerClassifier) {
    let id = game.id.as_deref().unwrap_or("<unknown>");
    info!(game = id, "Created game");
    println!("{}", style::success("✅ Game created successfully!"));
    println!("Game ID: {}", id);
    if let Some(state) = game.state_label() {
        println!("State: {}", state);
    }
    if let Some(color) = game.active_color {
        println!("Active Color: {}", color);
    }
    println!();
    print_players(game, classifier);
    println!();
    println!("{}", style::heading("Next steps:"));
    println!("• Check status: ndbg status {}", id);
    println!("• Roll dice: ndbg roll {}", id);
}

/// Shows a game as the service draws it.
pub fn join(context: &Context, args: &JoinArgs) -> anyhow::Result<()> {
    let client = context.client()?;
    let game = client
        .game(&args.game_id)
        .context("Failed to fetch game")?;
    info!(game = %args.game_id, "Joined game");
    println!("{}", style::success("Joined game successfully!"));
    print_game(&game, &context.classifier(&client), true)
}

pub fn status(context: &Context, args: &StatusArgs) -> anyhow::Result<()> {
    let client = context.client()?;
    let value = client
        .game_raw(&args.game.game_id)
        .context("Failed to fetch game")?;
    if args.raw {
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    let game = parse_game(value)?;
    print_game(&game, &context.classifier(&client), args.game.server_board)?;
    if args.points {
        print!("\n{}", render_point_summary(&Board24::normalize(&game.board)));
    }
    Ok(())
}

pub fn roll(context: &Context, args: &GameArgs) -> anyhow::Result<()> {
    let client = context.client()?;
    let game = client
        .roll(&args.game_id)
        .context("Failed to roll dice")?;
    println!("{}", style::success("Dice rolled successfully!"));
    print_game(&game, &context.classifier(&client), args.server_board)
}

pub fn move_checker(context: &Context, args: &MoveArgs) -> anyhow::Result<()> {
    let client = context.client()?;
    let game_id = &args.game.game_id;
    let game = match args.to {
        Some(to) => client.move_from_to(game_id, args.from, to),
        None => {
            let current = client.game(game_id).context("Failed to get game state")?;
            let checker_id = find_checker_id(&current, args.from)?;
            info!(checker = %checker_id, from = args.from, "Found checker");
            client.move_checker(game_id, &checker_id)
        }
    }
    .context("Failed to make move")?;
    println!("{}", style::success("Move made successfully!"));
    print_game(&game, &context.classifier(&client), args.game.server_board)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_server_board_is_an_api_error() {
        let game = GameDocument::from_value(json!({ "id": "g" })).unwrap();
        let err = server_board(&game).unwrap_err();
        assert_eq!(err.to_string(), "API response is missing the 'asciiBoard' field");

        let game = GameDocument::from_value(json!({ "asciiBoard": "  13 14 15" })).unwrap();
        assert_eq!(server_board(&game).unwrap(), "  13 14 15");
    }

    #[test]
    fn raw_games_decode_through_the_api_error() {
        let err = parse_game(json!(["abc-123", "moving"])).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(parse_game(json!({ "id": "g" })).unwrap().id.as_deref(), Some("g"));
    }
}
