use std::path::PathBuf;

use backgammon::{Classifier, Roster};
use backgammon_client::{
    ApiClient, AuthStore, ClientConfig, DEFAULT_API_URL, DEFAULT_API_VERSION, DEFAULT_TIMEOUT,
};
use tracing::{debug, warn};
use tracing_subscriber::filter::LevelFilter;

/// Options shared by every subcommand.
#[derive(clap::Args)]
pub struct GlobalArgs {
    /// Base URL of the game service
    #[arg(long, global = true, env = "NODOTS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// API version segment of every endpoint
    #[arg(long, global = true, env = "NODOTS_API_VERSION", default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Directory holding auth.json [default: $HOME/.nodots-backgammon]
    #[arg(long, global = true, env = "NODOTS_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// API token to use instead of the one stored by `login`
    #[arg(long, global = true, env = "NODOTS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Accept invalid TLS certificates, e.g. a self-signed development server
    #[arg(long, global = true, env = "NODOTS_INSECURE")]
    pub insecure: bool,

    /// Print without terminal colors
    #[arg(long, global = true)]
    pub no_color: bool,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, global = true, env = "NDBG_LOG_LEVEL", default_value = "warn")]
    pub log_level: LevelFilter,
}

/// Everything a command needs to reach the service.
pub struct Context {
    pub auth: AuthStore,
    config: ClientConfig,
    api_key: Option<String>,
}

impl Context {
    pub fn new(args: &GlobalArgs) -> anyhow::Result<Self> {
        let auth = AuthStore::locate(args.config_dir.clone())?;
        debug!(path = %auth.path().display(), "Using credentials file");
        Ok(Self {
            auth,
            config: ClientConfig {
                api_url: args.api_url.clone(),
                api_version: args.api_version.clone(),
                token: None,
                insecure: args.insecure,
                timeout: DEFAULT_TIMEOUT,
            },
            api_key: args.api_key.clone(),
        })
    }

    /// A client carrying the API key, or else the cached login token.
    pub fn client(&self) -> anyhow::Result<ApiClient> {
        let token = match &self.api_key {
            Some(key) => Some(key.clone()),
            None => self.auth.api_credentials()?.token,
        };
        if token.is_none() {
            debug!("No credentials, sending anonymous requests");
        }
        Ok(ApiClient::new(self.config.clone().with_token(token))?)
    }

    /// A client that sends no credentials.
    pub fn anonymous_client(&self) -> anyhow::Result<ApiClient> {
        Ok(ApiClient::new(self.config.clone())?)
    }

    /// Classifies players through the roster, falling back to heuristics
    /// when the roster can't be fetched.
    pub fn classifier(&self, client: &ApiClient) -> Classifier {
        match client.roster() {
            Ok(roster) => with_roster(roster),
            Err(err) => {
                warn!(%err, "Could not fetch the user roster, guessing player types");
                Classifier::without_roster()
            }
        }
    }
}

fn with_roster(roster: Roster) -> Classifier {
    debug!(users = roster.len(), "Fetched user roster");
    Classifier::with_roster(roster)
}
