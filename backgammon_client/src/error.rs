use std::path::PathBuf;

#[derive(Debug)]
/// Error type for one request to the game service.
pub enum ApiError {
    /// The service rejected our credentials (HTTP 401).
    Unauthorized { message: String },
    NotFound { message: String },
    /// Any other non-2xx response.
    Status { status: u16, message: String },
    /// The request never got a response.
    Transport(reqwest::Error),
    /// The response body was not what the endpoint promises.
    Decode(serde_json::Error),
    MissingField { field: &'static str },
}

impl ApiError {
    /// Maps a non-2xx status and its body to an error.
    ///
    /// The message is the body's `message` field, then its `error` field,
    /// then the status text.
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let message = body_message(body)
            .or_else(|| reason.map(String::from))
            .unwrap_or_else(|| format!("HTTP {}", status));
        match status {
            401 => ApiError::Unauthorized { message },
            404 => ApiError::NotFound { message },
            _ => ApiError::Status { status, message },
        }
    }
}

fn body_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    ["message", "error"]
        .into_iter()
        .find_map(|key| value.get(key)?.as_str().filter(|s| !s.is_empty()))
        .map(String::from)
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            ApiError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Unauthorized { message } => {
                write!(f, "Authentication failed ({}). Run `ndbg login` first", message)
            }
            ApiError::NotFound { message } => write!(f, "Not found: {}", message),
            ApiError::Status { status, message } => {
                write!(f, "Request failed with status {}: {}", status, message)
            }
            ApiError::Transport(_) => write!(f, "Could not reach the game service"),
            ApiError::Decode(_) => write!(f, "The game service sent an unexpected response"),
            ApiError::MissingField { field } => {
                write!(f, "API response is missing the '{}' field", field)
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err)
    }
}

#[derive(Debug)]
/// Error type for the credential cache.
pub enum AuthError {
    /// Neither an explicit config directory nor `$HOME` is available.
    NoConfigDir,
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Encode(serde_json::Error),
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::NoConfigDir => None,
            AuthError::Io { source, .. } => Some(source),
            AuthError::Encode(err) => Some(err),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::NoConfigDir => write!(
                f,
                "Could not determine the config directory, set NODOTS_CONFIG_DIR or HOME"
            ),
            AuthError::Io { path, .. } => {
                write!(f, "Could not access '{}'", path.display())
            }
            AuthError::Encode(_) => write!(f, "Could not encode the user profile"),
        }
    }
}
