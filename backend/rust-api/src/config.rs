use serde::Deserialize;
use std::env;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";
const DEFAULT_DATA_DIR: &str = "data/progress";
const DEFAULT_ADVISOR_TIMEOUT_MS: u64 = 3000;
const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    /// Directory holding one JSON progress file per player.
    pub data_dir: PathBuf,
    /// Base URL of the difficulty phrasing collaborator. Rules-only when unset.
    pub advisor_url: Option<String>,
    pub advisor_timeout_ms: u64,
    /// Fixed seed for reproducible problem sequences.
    pub rng_seed: Option<u64>,
    /// Sessions without an answer for this long are dropped on the next start.
    pub session_idle_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            advisor_url: None,
            advisor_timeout_ms: DEFAULT_ADVISOR_TIMEOUT_MS,
            rng_seed: None,
            session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first, then the local one
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/*.toml + APP_ overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let data_dir = settings
            .get_string("storage.data_dir")
            .or_else(|_| env::var("PROGRESS_DATA_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

        let advisor_url = settings
            .get_string("advisor.url")
            .or_else(|_| env::var("ADVISOR_API_URL"))
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let advisor_timeout_ms = match settings
            .get_string("advisor.timeout_ms")
            .or_else(|_| env::var("ADVISOR_TIMEOUT_MS"))
        {
            Ok(raw) => parse_number("advisor.timeout_ms", &raw)?,
            Err(_) => DEFAULT_ADVISOR_TIMEOUT_MS,
        };

        let rng_seed = match settings
            .get_string("game.rng_seed")
            .or_else(|_| env::var("GAME_RNG_SEED"))
        {
            Ok(raw) => Some(parse_number("game.rng_seed", &raw)?),
            Err(_) => None,
        };

        let session_idle_secs = match settings
            .get_string("game.session_idle_secs")
            .or_else(|_| env::var("SESSION_IDLE_SECONDS"))
        {
            Ok(raw) => parse_number("game.session_idle_secs", &raw)?,
            Err(_) => DEFAULT_SESSION_IDLE_SECS,
        };

        if advisor_url.is_none() {
            tracing::info!("No difficulty collaborator configured, using rules only");
        }

        Ok(Config {
            bind_addr,
            data_dir,
            advisor_url,
            advisor_timeout_ms,
            rng_seed,
            session_idle_secs,
        })
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64, config::ConfigError> {
    raw.trim().parse().map_err(|_| {
        config::ConfigError::Message(format!("{} must be a number, got {:?}", key, raw))
    })
}
