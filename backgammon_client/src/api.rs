use backgammon::{lenient, GameDocument, Roster};
use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::{ApiError, ClientConfig, RobotView, SimulationApi, SimulationConfig, SimulationStatus};

/// A user record for `POST /users`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub source: String,
    #[serde(rename = "externalId")]
    pub external_id: String,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub locale: String,
    #[serde(rename = "userType")]
    pub user_type: String,
}

/// The part of a created user we keep.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CreatedUser {
    #[serde(deserialize_with = "lenient::option")]
    pub id: Option<String>,
}

/// Blocking client for the game service's HTTP API.
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let request = match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        trace!(status = status.as_u16(), body = %body, "Received response");
        if !status.is_success() {
            return Err(ApiError::from_response(
                status.as_u16(),
                status.canonical_reason(),
                &body,
            ));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn get(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.config.endpoint(path);
        debug!(url = %url, "GET");
        self.send(self.http.get(url))
    }

    fn post(&self, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let url = self.config.endpoint(path);
        debug!(url = %url, "POST");
        let request = self.http.post(url);
        self.send(match body {
            Some(body) => request.json(body),
            None => request,
        })
    }

    fn delete(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.config.endpoint(path);
        debug!(url = %url, "DELETE");
        self.send(self.http.delete(url))
    }

    /// Creates a game between two users.
    pub fn create_game(&self, player1: &str, player2: &str) -> Result<GameDocument, ApiError> {
        let body = json!({
            "player1": { "userId": player1 },
            "player2": { "userId": player2 },
        });
        Ok(GameDocument::from_value(self.post("games", Some(&body))?)?)
    }

    /// Creates a game between the logged-in user and a robot.
    pub fn create_robot_game(&self) -> Result<GameDocument, ApiError> {
        let body = json!({ "opponent": "robot" });
        Ok(GameDocument::from_value(self.post("games", Some(&body))?)?)
    }

    /// The game document exactly as the service sent it.
    pub fn game_raw(&self, game_id: &str) -> Result<Value, ApiError> {
        self.get(&format!("games/{}", game_id))
    }

    pub fn game(&self, game_id: &str) -> Result<GameDocument, ApiError> {
        Ok(GameDocument::from_value(self.game_raw(game_id)?)?)
    }

    pub fn roll(&self, game_id: &str) -> Result<GameDocument, ApiError> {
        let value = self.post(&format!("games/{}/roll", game_id), None)?;
        Ok(GameDocument::from_value(value)?)
    }

    /// Moves a checker; the service picks the destination.
    pub fn move_checker(&self, game_id: &str, checker_id: &str) -> Result<GameDocument, ApiError> {
        let body = json!({ "checkerId": checker_id });
        let value = self.post(&format!("games/{}/move", game_id), Some(&body))?;
        Ok(GameDocument::from_value(value)?)
    }

    pub fn move_from_to(&self, game_id: &str, from: u8, to: u8) -> Result<GameDocument, ApiError> {
        let body = json!({ "from": from, "to": to });
        let value = self.post(&format!("games/{}/move", game_id), Some(&body))?;
        Ok(GameDocument::from_value(value)?)
    }

    pub fn users(&self) -> Result<Value, ApiError> {
        self.get("users")
    }

    /// The user roster, for telling humans and robots apart.
    pub fn roster(&self) -> Result<Roster, ApiError> {
        Ok(Roster::from_value(self.users()?)?)
    }

    pub fn create_or_update_user(&self, user: &NewUser) -> Result<CreatedUser, ApiError> {
        let body = serde_json::to_value(user)?;
        Ok(lenient::from_object(self.post("users", Some(&body))?)?)
    }

    pub fn robots(&self) -> Result<Vec<RobotView>, ApiError> {
        let value = self.get("robots")?;
        Ok(lenient::objects(value)?)
    }

    pub fn pause_simulation(&self, simulation_id: &str) -> Result<Value, ApiError> {
        self.post(&format!("robots/simulations/{}/pause", simulation_id), None)
    }

    pub fn stop_simulation(&self, simulation_id: &str) -> Result<Value, ApiError> {
        self.delete(&format!("robots/simulations/{}", simulation_id))
    }

    pub fn set_simulation_speed(&self, simulation_id: &str, speed: u32) -> Result<Value, ApiError> {
        let body = json!({ "speed": speed });
        self.post(
            &format!("robots/simulations/{}/speed", simulation_id),
            Some(&body),
        )
    }
}

impl SimulationApi for ApiClient {
    fn start_simulation(&self, config: &SimulationConfig) -> Result<SimulationStatus, ApiError> {
        let body = serde_json::to_value(config)?;
        Ok(lenient::from_object(
            self.post("robots/simulations", Some(&body))?,
        )?)
    }

    fn simulation_status(&self, id: &str) -> Result<SimulationStatus, ApiError> {
        Ok(lenient::from_object(
            self.get(&format!("robots/simulations/{}", id))?,
        )?)
    }
}
