use std::collections::HashMap;

use itertools::Itertools;
use serde::Deserialize;

use crate::{lenient, render_board, Board24, Color, GameDocument, PlayerView};

/// The email address the service gives its robot accounts.
pub const ROBOT_SENTINEL_EMAIL: &str = "robot@nodots.com";

const GAME_ID_PREFIX: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerKind {
    Human,
    Robot,
    Unknown,
}

impl PlayerKind {
    pub fn label(self) -> &'static str {
        match self {
            PlayerKind::Human => "Human",
            PlayerKind::Robot => "Robot",
            PlayerKind::Unknown => "Player",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            PlayerKind::Human => "👤",
            PlayerKind::Robot => "🤖",
            PlayerKind::Unknown => "•",
        }
    }

    fn from_flags(user_type: Option<&str>, is_robot: Option<bool>) -> PlayerKind {
        match (user_type, is_robot) {
            (Some("robot"), _) | (_, Some(true)) => PlayerKind::Robot,
            (Some("human"), _) | (_, Some(false)) => PlayerKind::Human,
            _ => PlayerKind::Unknown,
        }
    }
}

/// Decides whether a player is a human or a robot.
pub trait PlayerClassifier {
    fn classify(&self, player: &PlayerView) -> PlayerKind;
}

/// A user as listed by the service's `/users` endpoint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserView {
    #[serde(deserialize_with = "lenient::option")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub user_type: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub is_robot: Option<bool>,
}

#[derive(Deserialize)]
#[serde(transparent)]
struct UserList(#[serde(deserialize_with = "lenient::objects")] Vec<UserView>);

/// The user roster of the service. This is the authoritative classification.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    kinds: HashMap<String, PlayerKind>,
}

impl Roster {
    pub fn new(users: impl IntoIterator<Item = UserView>) -> Self {
        let kinds = users
            .into_iter()
            .filter_map(|user| {
                let kind = PlayerKind::from_flags(user.user_type.as_deref(), user.is_robot);
                Some((user.id?, kind))
            })
            .collect();
        Self { kinds }
    }

    /// Parses the body of `/users`. Entries that are not objects are ignored.
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        let UserList(users) = serde_json::from_value(value)?;
        Ok(Self::new(users))
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl PlayerClassifier for Roster {
    /// Looks the player up by user id, then by player id.
    fn classify(&self, player: &PlayerView) -> PlayerKind {
        [player.user_id.as_ref(), player.id.as_ref()]
            .into_iter()
            .flatten()
            .find_map(|id| self.kinds.get(id).copied())
            .unwrap_or(PlayerKind::Unknown)
    }
}

/// Best-effort guesses from the game document alone.
///
/// Uses the player's own `userType`/`isRobot` fields, then the robot
/// sentinel email. Only for when no roster could be fetched.
#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackClassifier;

impl PlayerClassifier for FallbackClassifier {
    fn classify(&self, player: &PlayerView) -> PlayerKind {
        match PlayerKind::from_flags(player.user_type.as_deref(), player.is_robot) {
            PlayerKind::Unknown => match player.email.as_deref() {
                Some(ROBOT_SENTINEL_EMAIL) => PlayerKind::Robot,
                Some(_) => PlayerKind::Human,
                None => PlayerKind::Unknown,
            },
            kind => kind,
        }
    }
}

/// The roster when there is one, the fallback heuristics otherwise.
#[derive(Clone, Debug, Default)]
pub struct Classifier {
    roster: Option<Roster>,
}

impl Classifier {
    pub fn with_roster(roster: Roster) -> Self {
        Self {
            roster: Some(roster),
        }
    }

    pub fn without_roster() -> Self {
        Self { roster: None }
    }
}

impl PlayerClassifier for Classifier {
    fn classify(&self, player: &PlayerView) -> PlayerKind {
        let from_roster = self
            .roster
            .as_ref()
            .map_or(PlayerKind::Unknown, |roster| roster.classify(player));
        match from_roster {
            PlayerKind::Unknown => FallbackClassifier.classify(player),
            kind => kind,
        }
    }
}

/// Renders the status lines shown under the board.
///
/// Each line is only printed when the document has the data for it.
pub fn render_status(game: &GameDocument, classifier: &dyn PlayerClassifier) -> String {
    let mut output = String::new();

    if let Some(id) = &game.id {
        let prefix: String = id.chars().take(GAME_ID_PREFIX).collect();
        output += &format!("Game: {}\n", prefix);
    }

    let turn = game
        .active_color
        .map(|color| color.as_str().to_uppercase());
    match (game.state_label(), &turn) {
        (Some(state), Some(turn)) => {
            output += &format!("State: {} | Turn: {}\n", state.to_uppercase(), turn)
        }
        (Some(state), None) => output += &format!("State: {}\n", state.to_uppercase()),
        (None, Some(turn)) => output += &format!("Turn: {}\n", turn),
        (None, None) => {}
    }

    if let Some(roll) = game.active_player().and_then(PlayerView::roll) {
        output += &format!("Dice: [{}]\n", roll.iter().join(", "));
    }

    for player in &game.players {
        if let Some(line) = player_line(player, game.active_color, classifier) {
            output += &line;
            output.push('\n');
        }
    }

    output += &format!(
        "{} = Black, {} = White | BAR = Hit | HOME = Borne off\n",
        Color::Black.glyph(),
        Color::White.glyph()
    );
    output
}

fn player_line(
    player: &PlayerView,
    active: Option<Color>,
    classifier: &dyn PlayerClassifier,
) -> Option<String> {
    let color = player.color?;
    let kind = classifier.classify(player);
    let mut line = format!(
        "{} {}: {}",
        kind.icon(),
        kind.label(),
        color.as_str().to_uppercase()
    );
    if let Some(direction) = player.direction {
        line += &format!(" ({})", direction);
    }
    if let Some(name) = &player.name {
        line += &format!(" {}", name);
    }
    if let Some(pips) = player.pip_count {
        line += &format!(" pip {}", pips);
    }
    if active == Some(color) {
        line += " ← ACTIVE";
    }
    Some(line)
}

/// The board followed by the status lines.
pub fn render_game(game: &GameDocument, classifier: &dyn PlayerClassifier) -> String {
    let board = Board24::normalize(&game.board);
    format!("{}\n{}", render_board(&board), render_status(game, classifier))
}
