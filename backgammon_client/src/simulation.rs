use std::str::FromStr;

use backgammon::lenient;
use serde::{Deserialize, Serialize};

use crate::ApiError;

pub const MIN_SPEED_MS: u32 = 100;
pub const MAX_SPEED_MS: u32 = 30_000;
pub const DEFAULT_SPEED_MS: u32 = 1000;

/// How strong a robot plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|difficulty| difficulty.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Invalid difficulty '{}'. Use: beginner, intermediate, or advanced",
                    s
                )
            })
    }
}

/// Parses a delay between robot moves, in milliseconds.
pub fn parse_speed(s: &str) -> Result<u32, String> {
    let speed: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number of milliseconds", s))?;
    if (MIN_SPEED_MS..=MAX_SPEED_MS).contains(&speed) {
        Ok(speed)
    } else {
        Err(format!(
            "Speed must be between {}ms and {}ms",
            MIN_SPEED_MS, MAX_SPEED_MS
        ))
    }
}

/// The request body that starts a robot-vs-robot simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub speed: u32,
    pub robot1_difficulty: Difficulty,
    pub robot2_difficulty: Difficulty,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED_MS,
            robot1_difficulty: Difficulty::Beginner,
            robot2_difficulty: Difficulty::Beginner,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SimulationState {
    Running,
    Paused,
    Completed,
    Error,
    Other(String),
}

impl SimulationState {
    pub fn as_str(&self) -> &str {
        match self {
            SimulationState::Running => "running",
            SimulationState::Paused => "paused",
            SimulationState::Completed => "completed",
            SimulationState::Error => "error",
            SimulationState::Other(other) => other,
        }
    }

    /// A finished simulation will not change anymore.
    pub fn is_finished(&self) -> bool {
        matches!(self, SimulationState::Completed | SimulationState::Error)
    }
}

impl From<String> for SimulationState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "running" => SimulationState::Running,
            "paused" => SimulationState::Paused,
            "completed" => SimulationState::Completed,
            "error" => SimulationState::Error,
            _ => SimulationState::Other(s),
        }
    }
}

impl From<SimulationState> for String {
    fn from(state: SimulationState) -> Self {
        match state {
            SimulationState::Other(other) => other,
            state => String::from(state.as_str()),
        }
    }
}

/// A simulation as reported by the service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationStatus {
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub status: Option<SimulationState>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub current_turn: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub total_moves: Option<u32>,
    /// Milliseconds since the simulation started.
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub speed: Option<u32>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub robot1_name: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub robot1_difficulty: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub robot2_name: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub robot2_difficulty: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(deserialize_with = "lenient::objects", skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<SimulationLog>,
    #[serde(deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub result: Option<SimulationOutcome>,
}

impl SimulationStatus {
    pub fn is_finished(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(SimulationState::is_finished)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationLog {
    #[serde(deserialize_with = "lenient::option")]
    pub timestamp: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOutcome {
    #[serde(deserialize_with = "lenient::option")]
    pub winner: Option<String>,
    /// The service has sent both strings and numbers here.
    #[serde(deserialize_with = "lenient::option")]
    pub score: Option<serde_json::Value>,
}

/// A robot account, as listed by `/robots`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RobotView {
    #[serde(deserialize_with = "lenient::option")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::option")]
    pub difficulty: Option<String>,
}

/// The simulation endpoints the batch runner needs.
pub trait SimulationApi {
    fn start_simulation(&self, config: &SimulationConfig) -> Result<SimulationStatus, ApiError>;
    fn simulation_status(&self, id: &str) -> Result<SimulationStatus, ApiError>;
}

/// Formats milliseconds as `1m 5s` or `42s`.
pub fn format_duration(millis: u64) -> String {
    let seconds = millis / 1000;
    let minutes = seconds / 60;
    if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}

/// Shown by `robot-status`. The last five log entries are included.
pub fn render_simulation_status(status: &SimulationStatus) -> String {
    let unknown = "Unknown";
    let mut output = String::from("=== Simulation Status ===\n");
    output += &format!(
        "Simulation ID: {}\n",
        status.id.as_deref().unwrap_or(unknown)
    );
    output += &format!("Game ID: {}\n", status.game_id.as_deref().unwrap_or(unknown));
    output += &format!(
        "Status: {}\n",
        status
            .status
            .as_ref()
            .map_or(unknown, SimulationState::as_str)
            .to_uppercase()
    );
    if let Some(turn) = &status.current_turn {
        output += &format!("Current Turn: {}\n", turn);
    }
    if let Some(moves) = status.total_moves {
        output += &format!("Total Moves: {}\n", moves);
    }
    if let Some(duration) = status.duration {
        output += &format!("Duration: {}\n", format_duration(duration));
    }
    if let Some(speed) = status.speed {
        output += &format!("Speed: {}ms between moves\n", speed);
    }
    for (idx, name, difficulty) in [
        (1, &status.robot1_name, &status.robot1_difficulty),
        (2, &status.robot2_name, &status.robot2_difficulty),
    ] {
        if name.is_some() || difficulty.is_some() {
            output += &format!(
                "Robot {}: {} ({})\n",
                idx,
                name.as_deref().unwrap_or(unknown),
                difficulty.as_deref().unwrap_or(unknown)
            );
        }
    }
    if let Some(error) = &status.error {
        output += &format!("Error: {}\n", error);
    }
    if !status.logs.is_empty() {
        output += "\n--- Recent Activity ---\n";
        let skip = status.logs.len().saturating_sub(5);
        for log in status.logs.iter().skip(skip) {
            output += &format!(
                "{}: {}\n",
                log.timestamp.as_deref().unwrap_or(""),
                log.message.as_deref().unwrap_or("")
            );
        }
    }
    if let (Some(SimulationState::Completed), Some(result)) = (&status.status, &status.result) {
        output += "\n--- Final Result ---\n";
        output += &format!("Winner: {}\n", result.winner.as_deref().unwrap_or(unknown));
        if let Some(score) = &result.score {
            match score {
                serde_json::Value::String(score) => output += &format!("Score: {}\n", score),
                score => output += &format!("Score: {}\n", score),
            }
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn difficulty_parsing() {
        assert_eq!("advanced".parse(), Ok(Difficulty::Advanced));
        assert_eq!("Intermediate".parse(), Ok(Difficulty::Intermediate));
        assert!("expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn speed_bounds_are_inclusive() {
        assert_eq!(parse_speed("100"), Ok(100));
        assert_eq!(parse_speed("30000"), Ok(30000));
        assert!(parse_speed("99").is_err());
        assert!(parse_speed("30001").is_err());
        assert!(parse_speed("fast").is_err());
    }

    #[test]
    fn config_wire_format() {
        let config = SimulationConfig {
            speed: 200,
            robot1_difficulty: Difficulty::Beginner,
            robot2_difficulty: Difficulty::Advanced,
        };
        assert_eq!(
            serde_json::to_value(config).unwrap(),
            json!({ "speed": 200, "robot1Difficulty": "beginner", "robot2Difficulty": "advanced" })
        );
    }

    #[test]
    fn status_tolerates_unknown_states_and_bad_fields() {
        let status: SimulationStatus = serde_json::from_value(json!({
            "id": "sim-1",
            "status": "warming-up",
            "totalMoves": "many",
            "logs": "none"
        }))
        .unwrap();
        assert_eq!(
            status.status,
            Some(SimulationState::Other(String::from("warming-up")))
        );
        assert_eq!(status.total_moves, None);
        assert!(status.logs.is_empty());
        assert!(!status.is_finished());
    }

    #[test]
    fn arrays_never_stand_in_for_objects() {
        let status: SimulationStatus = backgammon::lenient::from_object(json!({
            "logs": [["2024-01-01T00:00:00Z", "started"], { "message": "moved" }],
            "result": ["white", 2]
        }))
        .unwrap();
        assert_eq!(status.logs.len(), 1);
        assert_eq!(status.logs[0].message.as_deref(), Some("moved"));
        assert_eq!(status.result, None);

        assert!(backgammon::lenient::from_object::<SimulationStatus>(json!(["sim-1"])).is_err());
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(42_000), "42s");
        assert_eq!(format_duration(65_500), "1m 5s");
    }

    #[test]
    fn status_rendering() {
        let status: SimulationStatus = serde_json::from_value(json!({
            "id": "sim-1",
            "gameId": "game-1",
            "status": "completed",
            "totalMoves": 87,
            "duration": 125000,
            "robot1Difficulty": "beginner",
            "logs": [
                { "timestamp": "t1", "message": "m1" },
                { "timestamp": "t2", "message": "m2" },
                { "timestamp": "t3", "message": "m3" },
                { "timestamp": "t4", "message": "m4" },
                { "timestamp": "t5", "message": "m5" },
                { "timestamp": "t6", "message": "m6" }
            ],
            "result": { "winner": "white", "score": 2 }
        }))
        .unwrap();
        let text = render_simulation_status(&status);
        assert!(text.contains("Status: COMPLETED\n"));
        assert!(text.contains("Duration: 2m 5s\n"));
        assert!(text.contains("Robot 1: Unknown (beginner)\n"));
        assert!(!text.contains("Robot 2:"));
        assert!(!text.contains("t1: m1"));
        assert!(text.contains("t6: m6\n"));
        assert!(text.contains("Winner: white\nScore: 2\n"));
    }
}
