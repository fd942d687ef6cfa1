use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use backgammon::lenient;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::AuthError;

pub const CONFIG_DIR_NAME: &str = ".nodots-backgammon";
pub const AUTH_FILE_NAME: &str = "auth.json";
/// A cached login is discarded after this many seconds.
pub const LOGIN_TTL_SECS: u64 = 24 * 60 * 60;

/// What we remember about the logged-in user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub auth_method: Option<String>,
    /// Unix seconds.
    #[serde(deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub login_time: Option<u64>,
}

impl UserProfile {
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.login_time
            .is_some_and(|login_time| now.saturating_sub(login_time) > LOGIN_TTL_SECS)
    }

    pub fn has_credentials(&self) -> bool {
        self.token.is_some() || self.user_id.is_some()
    }
}

/// The user id and bearer token to talk to the API with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: Option<String>,
    pub token: Option<String>,
}

/// `$HOME/.nodots-backgammon`, if there is a home directory.
pub fn default_config_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(CONFIG_DIR_NAME))
}

/// The cached login in `auth.json`.
pub struct AuthStore {
    path: PathBuf,
}

impl AuthStore {
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            path: config_dir.as_ref().join(AUTH_FILE_NAME),
        }
    }

    /// Uses `config_dir` if given, the default directory otherwise.
    pub fn locate(config_dir: Option<PathBuf>) -> Result<Self, AuthError> {
        config_dir
            .or_else(default_config_dir)
            .map(Self::new)
            .ok_or(AuthError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> AuthError {
        AuthError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Reads the stored profile as is. A missing or unreadable file is no profile.
    pub fn load(&self) -> Result<Option<UserProfile>, AuthError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        match serde_json::from_str(&data).and_then(lenient::from_object) {
            Ok(profile) => Ok(Some(profile)),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "Ignoring malformed credentials file");
                Ok(None)
            }
        }
    }

    fn store(&self, profile: &UserProfile) -> Result<(), AuthError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|err| self.io_error(err))?;
        }
        let json = serde_json::to_string_pretty(profile).map_err(AuthError::Encode)?;
        fs::write(&self.path, json).map_err(|err| self.io_error(err))
    }

    /// Stores `profile`, stamped with the current time.
    pub fn login(&self, profile: UserProfile) -> Result<UserProfile, AuthError> {
        self.login_at(profile, unix_now())
    }

    pub fn login_at(&self, profile: UserProfile, now: u64) -> Result<UserProfile, AuthError> {
        let profile = UserProfile {
            login_time: Some(now),
            ..profile
        };
        self.store(&profile)?;
        debug!(path = %self.path.display(), "Stored credentials");
        Ok(profile)
    }

    /// Empties the credentials file but leaves it in place.
    pub fn logout(&self) -> Result<(), AuthError> {
        if self.path.exists() {
            self.store(&UserProfile::default())?;
        }
        Ok(())
    }

    pub fn current_user(&self) -> Result<Option<UserProfile>, AuthError> {
        self.current_user_at(unix_now())
    }

    /// The stored profile, unless it has expired. Expired profiles are cleared.
    pub fn current_user_at(&self, now: u64) -> Result<Option<UserProfile>, AuthError> {
        match self.load()? {
            Some(profile) if profile.is_expired_at(now) => {
                debug!("Cached login expired");
                self.logout()?;
                Ok(None)
            }
            profile => Ok(profile),
        }
    }

    pub fn is_logged_in(&self) -> Result<bool, AuthError> {
        Ok(self
            .current_user()?
            .is_some_and(|profile| profile.has_credentials()))
    }

    pub fn api_credentials(&self) -> Result<Credentials, AuthError> {
        Ok(self
            .current_user()?
            .map(|profile| Credentials {
                user_id: profile.user_id,
                token: profile.token,
            })
            .unwrap_or_default())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn token_profile(token: &str) -> UserProfile {
        UserProfile {
            token: Some(String::from(token)),
            auth_method: Some(String::from("api-token")),
            ..Default::default()
        }
    }

    #[test]
    fn missing_file_means_logged_out() {
        let dir = tempdir().unwrap();
        let store = AuthStore::new(dir.path().join("nested"));
        assert_eq!(store.load().unwrap(), None);
        assert!(!store.is_logged_in().unwrap());
        assert_eq!(store.api_credentials().unwrap(), Credentials::default());
    }

    #[test]
    fn login_round_trips_through_the_file() {
        let dir = tempdir().unwrap();
        let store = AuthStore::new(dir.path());
        let stored = store.login_at(token_profile("abc"), 1_000).unwrap();
        assert_eq!(stored.login_time, Some(1_000));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(AUTH_FILE_NAME)).unwrap())
                .unwrap();
        assert_eq!(raw["token"], "abc");
        assert_eq!(raw["authMethod"], "api-token");
        assert_eq!(raw["loginTime"], 1_000);

        assert_eq!(store.current_user_at(1_000 + LOGIN_TTL_SECS).unwrap(), Some(stored));
    }

    #[test]
    fn expired_logins_are_cleared() {
        let dir = tempdir().unwrap();
        let store = AuthStore::new(dir.path());
        store.login_at(token_profile("abc"), 1_000).unwrap();

        assert_eq!(store.current_user_at(1_001 + LOGIN_TTL_SECS).unwrap(), None);
        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), Some(UserProfile::default()));
    }

    #[test]
    fn logout_keeps_an_empty_file() {
        let dir = tempdir().unwrap();
        let store = AuthStore::new(dir.path().join("config"));
        store.logout().unwrap();
        assert!(!store.path().exists());

        store.login(token_profile("abc")).unwrap();
        assert!(store.is_logged_in().unwrap());
        store.logout().unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap().trim(), "{}");
        assert!(!store.is_logged_in().unwrap());
    }

    #[test]
    fn malformed_files_are_ignored() {
        let dir = tempdir().unwrap();
        let store = AuthStore::new(dir.path());
        fs::write(store.path(), "not json").unwrap();
        assert_eq!(store.load().unwrap(), None);

        fs::write(store.path(), r#"["ada@example.com", "Ada", "Lovelace", "u1", "abc"]"#).unwrap();
        assert_eq!(store.load().unwrap(), None);

        fs::write(store.path(), r#"{"token": 5, "userId": "u1"}"#).unwrap();
        let profile = store.load().unwrap().unwrap();
        assert_eq!(profile.token, None);
        assert_eq!(profile.user_id.as_deref(), Some("u1"));
    }
}
