use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;
use teloxide::types::ChatId;
use url::Url;

/// Path of the bot's configuration file, relative to the working directory.
pub const CONFIG_PATH: &str = "ad_board_bot.json";

/// One entry of the category table as it appears in the config file.
#[derive(Debug, Clone, Deserialize)]
struct CategoryEntry {
    /// Forum topic the category lives under.
    topic_id: i32,
    /// Human-readable category name shown on the board.
    name: String,
}

/// On-disk shape of the config file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    tracked_chat_id: i64,
    backend_url: String,
    optout_path: String,
    categories: Vec<CategoryEntry>,
}

/// Validated bot configuration. Immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// The one chat whose messages are tracked.
    pub tracked_chat: ChatId,
    /// Ingestion endpoint of the backend, e.g. `https://host/ads`.
    pub backend_url: Url,
    /// Where the opt-out set is persisted.
    pub optout_path: String,
    categories: HashMap<i32, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read the config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse the config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid backend URL: {0}")]
    BackendUrl(#[from] url::ParseError),
    #[error("duplicate category entry for topic id {0}")]
    DuplicateCategory(i32),
    #[error("category for topic id {0} has a blank name")]
    BlankCategoryName(i32),
    #[error("the category table is empty")]
    NoCategories,
}

impl BotConfig {
    /// Load and validate the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        if raw.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }

        let backend_url = Url::parse(&raw.backend_url)?;

        let mut categories = HashMap::with_capacity(raw.categories.len());
        for entry in raw.categories {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::BlankCategoryName(entry.topic_id));
            }
            if categories.insert(entry.topic_id, entry.name).is_some() {
                return Err(ConfigError::DuplicateCategory(entry.topic_id));
            }
        }

        Ok(BotConfig {
            tracked_chat: ChatId(raw.tracked_chat_id),
            backend_url,
            optout_path: raw.optout_path,
            categories,
        })
    }

    /// Resolve a topic to its category name, if the table maps it.
    pub fn category_name(&self, topic_id: i32) -> Option<&str> {
        self.categories.get(&topic_id).map(String::as_str)
    }
}

#[cfg(test)]
impl BotConfig {
    /// Hand-built config for tests elsewhere in the crate.
    pub(crate) fn stub(tracked_chat_id: i64, categories: &[(i32, &str)]) -> Self {
        BotConfig {
            tracked_chat: ChatId(tracked_chat_id),
            backend_url: Url::parse("http://localhost:8080/ads").unwrap(),
            optout_path: String::new(),
            categories: categories
                .iter()
                .map(|(id, name)| (*id, (*name).to_owned()))
                .collect(),
        }
    }
}
