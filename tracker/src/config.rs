use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::domain::entities::site::ICON_URL;
use crate::domain::entities::{lookup_topic, DateFormat, DisplayOptions, FeedMode, TopicStream};
use crate::error::ConfigError;

/// Placeholder shipped in the sample config; treated as "not configured"
const WEBHOOK_PLACEHOLDER: &str = "YOUR_WEBHOOK_URL_HERE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Topic names to follow
    pub genres: Vec<String>,
    pub enable_discord: bool,
    pub webhook_url: Option<String>,
    #[serde(rename = "enableRSS")]
    pub enable_rss: bool,
    /// Minutes between poll cycles
    pub refresh_interval: u64,
    pub merge_feeds: bool,
    pub date_format: DateFormat,
    /// How many of the newest entries are compared each cycle
    pub check_limit: usize,
    pub discord_profile_name: String,
    pub discord_avatar_url: String,
    /// Merged document path; per-topic documents are written beside it
    pub feed_path: PathBuf,
    pub known_entries_path: PathBuf,
    pub port: u16,
    pub token_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            genres: vec!["latest".to_string()],
            enable_discord: false,
            webhook_url: None,
            enable_rss: false,
            refresh_interval: 120,
            merge_feeds: true,
            date_format: DateFormat::default(),
            check_limit: 1,
            discord_profile_name: "Rockstar Newswire Tracker".to_string(),
            discord_avatar_url: ICON_URL.to_string(),
            feed_path: PathBuf::from("feed.xml"),
            known_entries_path: PathBuf::from("newswire.json"),
            port: 3000,
            token_timeout_secs: 60,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load the config file named by `CONFIG_PATH` (default `config.yaml`)
    /// and apply environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
        let config = Self::load(Path::new(&path))?;

        config.with_overrides(
            env::var("DISCORD_WEBHOOK_URL").ok(),
            env::var("PORT").ok(),
        )
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_yaml::from_str(yaml)?;
        if config.genres.is_empty() {
            config.genres = Self::default().genres;
        }
        config.validate()?;
        Ok(config)
    }

    /// Apply `DISCORD_WEBHOOK_URL` / `PORT` style overrides
    pub fn with_overrides(
        mut self,
        webhook_url: Option<String>,
        port: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = webhook_url.filter(|u| !u.trim().is_empty()) {
            self.webhook_url = Some(url);
        }
        if let Some(port) = port {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT '{}' is not a port number", port)))?;
        }
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for genre in &self.genres {
            if lookup_topic(genre).is_none() {
                return Err(ConfigError::UnknownGenre(genre.clone()));
            }
            if !seen.insert(genre.as_str()) {
                return Err(ConfigError::Invalid(format!("genre '{}' listed twice", genre)));
            }
        }
        if self.check_limit < 1 {
            return Err(ConfigError::Invalid("checkLimit must be at least 1".to_string()));
        }
        if self.refresh_interval == 0 {
            return Err(ConfigError::Invalid(
                "refreshInterval must be at least 1 minute".to_string(),
            ));
        }
        if self.refresh_interval.checked_mul(60).is_none() {
            return Err(ConfigError::Invalid(format!(
                "refreshInterval {} is too large",
                self.refresh_interval
            )));
        }
        Ok(())
    }

    /// The webhook to deliver to, if Discord is enabled and a real URL is set
    pub fn webhook(&self) -> Option<&str> {
        if !self.enable_discord {
            return None;
        }
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty() && *url != WEBHOOK_PLACEHOLDER)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval * 60)
    }

    pub fn feed_mode(&self) -> FeedMode {
        if self.merge_feeds {
            FeedMode::Merged
        } else {
            FeedMode::PerStream
        }
    }

    /// One stream per configured genre, in configuration order
    pub fn topic_streams(&self) -> Result<Vec<TopicStream>, ConfigError> {
        let display = DisplayOptions {
            date_format: self.date_format,
            profile_name: self.discord_profile_name.clone(),
            avatar_url: self.discord_avatar_url.clone(),
        };

        self.genres
            .iter()
            .map(|genre| {
                let topic_id =
                    lookup_topic(genre).ok_or_else(|| ConfigError::UnknownGenre(genre.clone()))?;
                Ok(TopicStream {
                    name: genre.clone(),
                    topic_id,
                    refresh_interval: self.refresh_interval(),
                    webhook_url: self.webhook().map(str::to_string),
                    display: display.clone(),
                })
            })
            .collect()
    }
}
