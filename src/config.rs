//! Runtime configuration, read from the environment (after `.env` is loaded).

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use poise::serenity_prelude::UserId;
use thiserror::Error;
use tracing::warn;

/// Errors raised while reading configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Where the card renderer finds its assets and writes its output
#[derive(Debug, Clone)]
pub struct CardConfig {
    pub backgrounds_dir: PathBuf,
    pub font: PathBuf,
    pub output: PathBuf,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            backgrounds_dir: PathBuf::from("./assets/backgrounds"),
            font: PathBuf::from("./fonts/Roboto-Bold.ttf"),
            output: PathBuf::from("./musiccard.png"),
        }
    }
}

/// Settings handed to the songbird player backend
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// yt-dlp search provider used for queries that are not URLs
    pub search_prefix: String,
    pub self_deafen: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            search_prefix: "ytsearch".to_string(),
            self_deafen: true,
        }
    }
}

pub struct BotConfig {
    pub token: String,
    pub owners: HashSet<UserId>,
    pub prefix: String,
    pub card: CardConfig,
    pub audio: AudioConfig,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let owners = lookup("OWNERS")
            .map(|raw| parse_owners(&raw))
            .unwrap_or_default();

        let prefix = lookup("COMMAND_PREFIX").unwrap_or_else(|| "-".to_string());
        if prefix.trim().is_empty() {
            return Err(ConfigError::Invalid {
                name: "COMMAND_PREFIX",
                value: prefix,
            });
        }

        let defaults = CardConfig::default();
        let card = CardConfig {
            backgrounds_dir: lookup("CARD_BACKGROUNDS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.backgrounds_dir),
            font: lookup("CARD_FONT").map(PathBuf::from).unwrap_or(defaults.font),
            output: lookup("CARD_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output),
        };

        let defaults = AudioConfig::default();
        let audio = AudioConfig {
            search_prefix: lookup("SEARCH_PREFIX").unwrap_or(defaults.search_prefix),
            self_deafen: match lookup("SELF_DEAFEN") {
                Some(value) => parse_bool("SELF_DEAFEN", &value)?,
                None => defaults.self_deafen,
            },
        };

        Ok(Self {
            token,
            owners,
            prefix,
            card,
            audio,
        })
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owners.contains(&user_id)
    }
}

/// Parse a comma-separated list of user ids. Blank entries are ignored and
/// malformed ones are logged and skipped.
pub fn parse_owners(raw: &str) -> HashSet<UserId> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse::<u64>() {
            Ok(id) if id != 0 => Some(UserId::new(id)),
            _ => {
                warn!("Ignoring invalid owner id in OWNERS: {:?}", entry);
                None
            }
        })
        .collect()
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}
