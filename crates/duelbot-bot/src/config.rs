//! Process configuration: environment variables plus JSON catalog files.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use duelbot_duel::domain::templates::DuelTemplates;
use duelbot_progression::domain::labels::StatLabels;
use duelbot_progression::domain::model::StatType;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;

/// Duel flavor-text catalog file.
pub const DUELS_FILE: &str = "duels.json";
/// Stat display-label file.
pub const STAT_LABELS_FILE: &str = "stat_labels.json";
/// Greeting catalog file.
pub const GREETINGS_FILE: &str = "greetings.json";
/// Participating-streamer list file.
pub const FRIENDS_FILE: &str = "friends.json";

/// Settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// HTTP bridge bind host.
    pub host: String,
    /// HTTP bridge bind port.
    pub port: u16,
    /// Chat channel the bot serves.
    pub channel: String,
    /// The bot's own login name; its own lines are ignored.
    pub bot_username: String,
    /// Directory holding the JSON catalogs.
    pub config_dir: PathBuf,
    /// Deadline for each database operation.
    pub db_timeout: Duration,
    /// Apply pending migrations before serving.
    pub run_migrations: bool,
    /// Stream title reported by `!title`.
    pub stream_title: Option<String>,
    /// Game reported by `!game`.
    pub stream_game: Option<String>,
}

impl BotConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| AppError::Config(format!("{key} environment variable must be set")))
        };
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match optional("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };
        let db_timeout_secs: u64 = match optional("DB_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("DB_TIMEOUT_SECS must be a whole number of seconds: {e}"))
            })?,
            None => 5,
        };
        let run_migrations = match optional("RUN_MIGRATIONS")
            .map(|raw| raw.trim().to_lowercase())
            .as_deref()
        {
            None | Some("0" | "false" | "no") => false,
            Some("1" | "true" | "yes") => true,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "RUN_MIGRATIONS must be true or false, got {other}"
                )));
            }
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port,
            channel: required("BOT_CHANNEL")?.to_lowercase(),
            bot_username: optional("BOT_USERNAME")
                .unwrap_or_else(|| "duelbot".to_owned())
                .to_lowercase(),
            config_dir: optional("CONFIG_DIR").map_or_else(|| PathBuf::from("config"), PathBuf::from),
            db_timeout: Duration::from_secs(db_timeout_secs),
            run_migrations,
            stream_title: optional("STREAM_TITLE"),
            stream_game: optional("STREAM_GAME"),
        })
    }

    /// The socket address the HTTP bridge binds to.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

/// One entry of the greeting catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Greeting {
    /// Language the greeting is in.
    pub language: String,
    /// The greeting itself.
    pub text: String,
}

fn read_config_file(dir: &Path, name: &str) -> Result<(PathBuf, String), AppError> {
    let path = dir.join(name);
    let contents = std::fs::read_to_string(&path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    Ok((path, contents))
}

fn parse_json<T: for<'de> Deserialize<'de>>(path: &Path, contents: &str) -> Result<T, AppError> {
    serde_json::from_str(contents)
        .map_err(|e| AppError::Config(format!("invalid {}: {e}", path.display())))
}

/// Loads `duels.json`.
///
/// # Errors
///
/// Returns `AppError::Config` if the file is missing or malformed.
pub fn load_duel_templates(dir: &Path) -> Result<DuelTemplates, AppError> {
    let (path, contents) = read_config_file(dir, DUELS_FILE)?;
    let templates = DuelTemplates::from_json(&contents)
        .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), count = templates.len(), "duel templates loaded");
    Ok(templates)
}

/// Loads `stat_labels.json` and checks it against the stat catalog.
///
/// # Errors
///
/// Returns `AppError::Config` if the file is missing or malformed, labels
/// a stat the catalog lacks, or leaves a catalog stat unlabeled.
pub fn load_stat_labels(dir: &Path, catalog: &[StatType]) -> Result<StatLabels, AppError> {
    let (path, contents) = read_config_file(dir, STAT_LABELS_FILE)?;
    StatLabels::from_json(&contents, catalog)
        .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
}

/// Loads `greetings.json`.
///
/// # Errors
///
/// Returns `AppError::Config` if the file is missing, malformed or empty.
pub fn load_greetings(dir: &Path) -> Result<Vec<Greeting>, AppError> {
    let (path, contents) = read_config_file(dir, GREETINGS_FILE)?;
    let greetings: Vec<Greeting> = parse_json(&path, &contents)?;
    if greetings.is_empty() {
        return Err(AppError::Config(format!(
            "{} has no greetings",
            path.display()
        )));
    }
    Ok(greetings)
}

/// Loads `friends.json`.
///
/// # Errors
///
/// Returns `AppError::Config` if the file is missing or malformed.
pub fn load_friends(dir: &Path) -> Result<Vec<String>, AppError> {
    let (path, contents) = read_config_file(dir, FRIENDS_FILE)?;
    parse_json(&path, &contents)
}
