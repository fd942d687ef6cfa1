use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{Difficulty, SimulationApi, SimulationConfig, SimulationState, SimulationStatus};

pub const DEFAULT_MAX_CONCURRENT: usize = 3;
pub const DEFAULT_BATCH_SPEED_MS: u32 = 200;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// One robot-vs-robot matchup to simulate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchScenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub robot1_difficulty: Difficulty,
    pub robot2_difficulty: Difficulty,
    /// Falls back to the runner's default speed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<u32>,
}

impl BatchScenario {
    pub fn new(name: &str, robot1: Difficulty, robot2: Difficulty, speed: u32) -> Self {
        Self {
            name: Some(String::from(name)),
            robot1_difficulty: robot1,
            robot2_difficulty: robot2,
            speed: Some(speed),
        }
    }

    /// The scenario's name, or `Scenario <n>` for the 0-based `idx`.
    pub fn display_name(&self, idx: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Scenario {}", idx + 1))
    }
}

/// Built-in scenario tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// Every pairing of difficulties.
    All,
    /// Beginner against advanced, three times.
    DifficultyTest,
    /// The same pairing at three speeds.
    SpeedTest,
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Preset::All),
            "difficulty-test" => Ok(Preset::DifficultyTest),
            "speed-test" => Ok(Preset::SpeedTest),
            _ => Err(format!(
                "Unknown preset: {}. Available: all, difficulty-test, speed-test",
                s
            )),
        }
    }
}

fn capitalized(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Beginner => "Beginner",
        Difficulty::Intermediate => "Intermediate",
        Difficulty::Advanced => "Advanced",
    }
}

impl Preset {
    pub fn scenarios(self, default_speed: u32) -> Vec<BatchScenario> {
        use Difficulty::*;
        match self {
            Preset::All => {
                let mut scenarios = Vec::new();
                for (idx, robot1) in Difficulty::ALL.into_iter().enumerate() {
                    for robot2 in Difficulty::ALL.into_iter().skip(idx) {
                        let name = format!("{} vs {}", capitalized(robot1), capitalized(robot2));
                        scenarios.push(BatchScenario::new(&name, robot1, robot2, default_speed));
                    }
                }
                scenarios
            }
            Preset::DifficultyTest => {
                vec![
                    BatchScenario::new(
                        "Beginner vs Advanced (3 rounds)",
                        Beginner,
                        Advanced,
                        default_speed
                    );
                    3
                ]
            }
            Preset::SpeedTest => vec![
                BatchScenario::new("Fast Speed Test", Intermediate, Intermediate, 100),
                BatchScenario::new("Normal Speed Test", Intermediate, Intermediate, 1000),
                BatchScenario::new("Slow Speed Test", Intermediate, Intermediate, 3000),
            ],
        }
    }
}

/// The scenario run when neither a preset nor a file is given.
pub fn default_scenarios(speed: u32) -> Vec<BatchScenario> {
    vec![BatchScenario::new(
        "Beginner vs Intermediate",
        Difficulty::Beginner,
        Difficulty::Intermediate,
        speed,
    )]
}

/// Reads a JSON array of scenarios.
pub fn load_scenarios(path: &Path) -> anyhow::Result<Vec<BatchScenario>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to load scenarios from {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse scenarios in {}", path.display()))
}

/// The outcome of one scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub scenario: BatchScenario,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<SimulationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Milliseconds, as reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl BatchResult {
    fn new(scenario: BatchScenario) -> Self {
        Self {
            scenario,
            simulation_id: None,
            result: None,
            error: None,
            duration: None,
        }
    }

    fn failed(scenario: BatchScenario, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(scenario)
        }
    }

    pub fn is_completed(&self) -> bool {
        self.result.is_some() && self.error.is_none()
    }
}

pub fn save_results(path: &Path, results: &[BatchResult]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to save results to {}", path.display()))
}

/// Summary and per-scenario listing of a finished batch.
pub fn render_results(results: &[BatchResult], default_speed: u32) -> String {
    let completed: Vec<&BatchResult> = results.iter().filter(|r| r.is_completed()).collect();
    let failed = results.iter().filter(|r| r.error.is_some()).count();

    let mut output = String::from("=== Batch Simulation Results ===\n");
    output += &format!("Total scenarios: {}\n", results.len());
    output += &format!("Completed: {}\n", completed.len());
    output += &format!("Failed: {}\n", failed);
    if !completed.is_empty() {
        let total: u64 = completed.iter().filter_map(|r| r.duration).sum();
        let average = total / completed.len() as u64;
        output += &format!("Average duration: {}s\n", average / 1000);
    }

    output += "\n--- Individual Results ---\n";
    for (idx, result) in results.iter().enumerate() {
        let scenario = &result.scenario;
        output += &format!("{}. {}\n", idx + 1, scenario.display_name(idx));
        output += &format!(
            "   {} vs {} @ {}ms\n",
            scenario.robot1_difficulty,
            scenario.robot2_difficulty,
            scenario.speed.unwrap_or(default_speed)
        );
        if let Some(error) = &result.error {
            output += &format!("   ❌ Error: {}\n", error);
        } else if let Some(status) = &result.result {
            let state = status.status.as_ref().map_or("unknown", SimulationState::as_str);
            let icon = if status.status == Some(SimulationState::Completed) {
                "✅"
            } else {
                "⚠️"
            };
            output += &format!("   {} {}\n", icon, state);
            if let Some(winner) = status.result.as_ref().and_then(|r| r.winner.as_ref()) {
                output += &format!("   Winner: {}\n", winner);
            }
            if let Some(duration) = result.duration {
                output += &format!("   Duration: {}s\n", duration / 1000);
            }
        }
        output.push('\n');
    }
    output
}

/// Runs scenarios with at most `max_concurrent` simulations in flight,
/// polling the running ones every `poll_interval`.
pub struct BatchRunner<'a, A: SimulationApi> {
    api: &'a A,
    max_concurrent: usize,
    default_speed: u32,
    poll_interval: Duration,
}

impl<'a, A: SimulationApi> BatchRunner<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            default_speed: DEFAULT_BATCH_SPEED_MS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// At least one simulation always runs.
    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn default_speed(mut self, speed: u32) -> Self {
        self.default_speed = speed;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Results are in the order the scenarios finished, not the order given.
    pub fn run(&self, scenarios: Vec<BatchScenario>) -> Vec<BatchResult> {
        let mut queue = VecDeque::from(scenarios);
        let mut running: Vec<(String, BatchResult)> = Vec::new();
        let mut results = Vec::new();

        while !queue.is_empty() || !running.is_empty() {
            while running.len() < self.max_concurrent {
                let Some(scenario) = queue.pop_front() else {
                    break;
                };
                match self.start(scenario) {
                    Ok(started) => running.push(started),
                    Err(failed) => results.push(failed),
                }
            }

            let mut still_running = Vec::with_capacity(running.len());
            for (id, result) in running {
                match self.poll(&id, result) {
                    Ok(result) => results.push(result),
                    Err(result) => still_running.push((id, result)),
                }
            }
            running = still_running;

            if !running.is_empty() {
                thread::sleep(self.poll_interval);
            }
        }
        results
    }

    fn start(&self, scenario: BatchScenario) -> Result<(String, BatchResult), BatchResult> {
        let config = SimulationConfig {
            speed: scenario.speed.unwrap_or(self.default_speed),
            robot1_difficulty: scenario.robot1_difficulty,
            robot2_difficulty: scenario.robot2_difficulty,
        };
        let name = scenario.name.as_deref().unwrap_or("Unnamed scenario");
        match self.api.start_simulation(&config) {
            Ok(SimulationStatus { id: Some(id), .. }) => {
                info!(scenario = name, simulation = %id, "Started");
                let result = BatchResult {
                    simulation_id: Some(id.clone()),
                    ..BatchResult::new(scenario)
                };
                Ok((id, result))
            }
            Ok(_) => Err(BatchResult::failed(
                scenario,
                String::from("Simulation started without an id"),
            )),
            Err(err) => {
                warn!(scenario = name, %err, "Could not start simulation");
                Err(BatchResult::failed(scenario, err.to_string()))
            }
        }
    }

    /// `Ok` with the final result once the simulation is over, `Err` with
    /// the unchanged result while it is still going.
    fn poll(&self, id: &str, mut result: BatchResult) -> Result<BatchResult, BatchResult> {
        match self.api.simulation_status(id) {
            Ok(status) if status.is_finished() => {
                let name = result.scenario.name.as_deref().unwrap_or("Unnamed scenario");
                info!(scenario = name, simulation = id, status = ?status.status, "Finished");
                result.duration = status.duration;
                result.result = Some(status);
                Ok(result)
            }
            Ok(status) => {
                debug!(simulation = id, status = ?status.status, "Still running");
                Err(result)
            }
            Err(err) => {
                warn!(simulation = id, %err, "Status check failed");
                result.error = Some(err.to_string());
                Ok(result)
            }
        }
    }
}
