use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lenient;

/// The color of a checker or player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }

    /// The glyph used for a checker of this color: hollow for white, filled for black.
    pub fn glyph(self) -> char {
        match self {
            Color::White => '○',
            Color::Black => '●',
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The direction a player moves along the 24 points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Clockwise,
    Counterclockwise,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Clockwise => "clockwise",
            Direction::Counterclockwise => "counterclockwise",
        }
    }

    /// Converts a point number between the two numberings.
    ///
    /// The numberings are mirror images, so this is its own inverse.
    /// Returns `None` for anything outside 1..=24.
    pub fn mirror(point: u8) -> Option<u8> {
        (1..=24).contains(&point).then(|| 25 - point)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The state label of a game.
///
/// Labels this client does not know about are kept verbatim in [`StateKind::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StateKind {
    RollingForStart,
    RolledForStart,
    Rolling,
    Rolled,
    PreparingMove,
    Moving,
    Moved,
    Doubled,
    Completed,
    Other(String),
}

impl StateKind {
    pub fn as_str(&self) -> &str {
        match self {
            StateKind::RollingForStart => "rolling-for-start",
            StateKind::RolledForStart => "rolled-for-start",
            StateKind::Rolling => "rolling",
            StateKind::Rolled => "rolled",
            StateKind::PreparingMove => "preparing-move",
            StateKind::Moving => "moving",
            StateKind::Moved => "moved",
            StateKind::Doubled => "doubled",
            StateKind::Completed => "completed",
            StateKind::Other(label) => label,
        }
    }

    /// Whether the active player is expected to roll next.
    pub fn awaits_roll(&self) -> bool {
        matches!(self, StateKind::Rolling | StateKind::RollingForStart)
    }

    /// Whether the active player has rolled and must now move.
    pub fn awaits_move(&self) -> bool {
        matches!(
            self,
            StateKind::Rolled | StateKind::PreparingMove | StateKind::Moving
        )
    }
}

impl From<String> for StateKind {
    fn from(label: String) -> Self {
        match label.as_str() {
            "rolling-for-start" => StateKind::RollingForStart,
            "rolled-for-start" => StateKind::RolledForStart,
            "rolling" => StateKind::Rolling,
            "rolled" => StateKind::Rolled,
            "preparing-move" => StateKind::PreparingMove,
            "moving" => StateKind::Moving,
            "moved" => StateKind::Moved,
            "doubled" => StateKind::Doubled,
            "completed" => StateKind::Completed,
            _ => StateKind::Other(label),
        }
    }
}

impl From<StateKind> for String {
    fn from(kind: StateKind) -> String {
        kind.as_str().to_owned()
    }
}

impl std::fmt::Display for StateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A game as returned by the game service.
///
/// Every field is optional. Fields with an unexpected JSON type are treated
/// as absent, so any JSON object parses.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameDocument {
    #[serde(deserialize_with = "lenient::option")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub state_kind: Option<StateKind>,
    /// Older API versions report the state here instead of in `stateKind`.
    #[serde(deserialize_with = "lenient::option")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub active_color: Option<Color>,
    /// In API order; the service sends exactly two.
    #[serde(deserialize_with = "lenient::objects")]
    pub players: Vec<PlayerView>,
    #[serde(deserialize_with = "lenient::object_or_default")]
    pub board: BoardView,
    /// The board as rendered by the service itself.
    #[serde(deserialize_with = "lenient::option")]
    pub ascii_board: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub last_roll: Option<Vec<u8>>,
    #[serde(deserialize_with = "lenient::object")]
    pub last_move: Option<MoveView>,
    /// Only sent by some endpoints.
    #[serde(deserialize_with = "lenient::objects")]
    pub possible_moves: Vec<PossibleMove>,
}

impl GameDocument {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Fails only when `value` is not a JSON object.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        lenient::from_object(value)
    }

    /// The state label, preferring `stateKind` over the legacy `status`.
    pub fn state_label(&self) -> Option<&str> {
        self.state_kind
            .as_ref()
            .map(StateKind::as_str)
            .or(self.status.as_deref())
    }

    /// The player whose color is the active color.
    pub fn active_player(&self) -> Option<&PlayerView> {
        let active = self.active_color?;
        self.players
            .iter()
            .find(|player| player.color == Some(active))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerView {
    #[serde(deserialize_with = "lenient::option")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub color: Option<Color>,
    #[serde(deserialize_with = "lenient::option")]
    pub direction: Option<Direction>,
    #[serde(deserialize_with = "lenient::object")]
    pub dice: Option<DiceView>,
    #[serde(deserialize_with = "lenient::option")]
    pub pip_count: Option<u32>,
    #[serde(deserialize_with = "lenient::option")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub is_robot: Option<bool>,
    #[serde(deserialize_with = "lenient::option")]
    pub user_type: Option<String>,
}

impl PlayerView {
    /// The player's current roll, if both dice have been rolled.
    pub fn roll(&self) -> Option<[u8; 2]> {
        self.dice.as_ref()?.current_roll
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiceView {
    /// `None` until rolled; the service sends `[null, null]` before that.
    #[serde(deserialize_with = "lenient::option")]
    pub current_roll: Option<[u8; 2]>,
    #[serde(deserialize_with = "lenient::option")]
    pub total: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoardView {
    /// Sparse; points that are not listed are empty.
    #[serde(deserialize_with = "lenient::objects")]
    pub points: Vec<PointView>,
    #[serde(deserialize_with = "lenient::object_or_default")]
    pub bar: RailView,
    #[serde(deserialize_with = "lenient::object_or_default")]
    pub off: RailView,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PointView {
    #[serde(deserialize_with = "lenient::option")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::object_or_default")]
    pub position: Position,
    /// Bottom-to-top stacking order.
    #[serde(deserialize_with = "lenient::objects")]
    pub checkers: Vec<CheckerView>,
}

/// A point number in both numberings. `counterclockwise == 25 - clockwise`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Position {
    #[serde(deserialize_with = "lenient::option")]
    pub clockwise: Option<u8>,
    #[serde(deserialize_with = "lenient::option")]
    pub counterclockwise: Option<u8>,
}

impl Position {
    pub fn from_clockwise(clockwise: u8) -> Self {
        Position {
            clockwise: Some(clockwise),
            counterclockwise: Direction::mirror(clockwise),
        }
    }

    /// The point number as seen by a player moving in `direction`.
    ///
    /// Falls back to mirroring the other numbering when only one is present.
    pub fn in_direction(&self, direction: Direction) -> Option<u8> {
        let (own, other) = match direction {
            Direction::Clockwise => (self.clockwise, self.counterclockwise),
            Direction::Counterclockwise => (self.counterclockwise, self.clockwise),
        };
        own.or_else(|| other.and_then(Direction::mirror))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CheckerView {
    #[serde(deserialize_with = "lenient::option")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub color: Option<Color>,
}

/// The bar or the borne-off area.
///
/// Carries the fields of both shapes the service has used: per-direction
/// checker lists (`clockwise`, `counterclockwise`) and flat per-color
/// counts (`white`, `black`). See [`RailCounts::extract`](crate::RailCounts::extract).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RailView {
    #[serde(deserialize_with = "lenient::object")]
    pub clockwise: Option<RailSide>,
    #[serde(deserialize_with = "lenient::object")]
    pub counterclockwise: Option<RailSide>,
    #[serde(deserialize_with = "lenient::option")]
    pub white: Option<u32>,
    #[serde(deserialize_with = "lenient::option")]
    pub black: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RailSide {
    #[serde(deserialize_with = "lenient::objects")]
    pub checkers: Vec<CheckerView>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MoveView {
    #[serde(deserialize_with = "lenient::option")]
    pub from: Option<u8>,
    #[serde(deserialize_with = "lenient::option")]
    pub to: Option<u8>,
}

/// A move offered by the game service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PossibleMove {
    pub from: u8,
    pub to: u8,
    pub die_value: u8,
}
