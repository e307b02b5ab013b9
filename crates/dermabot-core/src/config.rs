//! Configuration system for Dermabot.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;
use crate::session::UserId;

/// Main configuration struct for Dermabot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bot credentials and access control
    pub bot: BotConfig,
    /// Content storage settings
    pub storage: StorageConfig,
    /// Session lifecycle settings
    pub sessions: SessionsConfig,
    /// Log sink settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Messaging platform access token
    pub token: Option<String>,
    /// Identities allowed into the admin panel
    pub admins: AdminList,
}

/// Static allow-list of administrator identities.
///
/// Deserializes from either a list of ids or a comma-separated string
/// (`"42,17"`); entries that are not plain numbers are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AdminList(BTreeSet<i64>);

impl AdminList {
    /// Parse a comma-separated list, skipping anything non-numeric.
    pub fn parse(s: &str) -> Self {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
            .filter_map(|part| part.parse::<i64>().ok())
            .collect()
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.0.contains(&user.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = UserId> + '_ {
        self.0.iter().copied().map(UserId)
    }
}

impl FromIterator<i64> for AdminList {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        AdminList(iter.into_iter().collect())
    }
}

impl FromIterator<UserId> for AdminList {
    fn from_iter<T: IntoIterator<Item = UserId>>(iter: T) -> Self {
        AdminList(iter.into_iter().map(|user| user.0).collect())
    }
}

impl<'de> Deserialize<'de> for AdminList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Entry {
            Id(i64),
            Text(String),
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<Entry>),
            One(Entry),
        }

        let entries = match Raw::deserialize(deserializer)? {
            Raw::List(entries) => entries,
            Raw::One(entry) => vec![entry],
        };

        let mut ids = BTreeSet::new();
        for entry in entries {
            match entry {
                Entry::Id(id) => {
                    ids.insert(id);
                }
                Entry::Text(text) => ids.extend(AdminList::parse(&text).0),
            }
        }
        Ok(AdminList(ids))
    }
}

/// How new item ids are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// `len(collection) + 1`; compatible with existing data but may reuse ids after a delete
    #[default]
    Length,
    /// Persisted per-section counter that never decreases
    Counter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory the other paths are relative to
    pub root: PathBuf,
    /// Section collections live in `<root>/<data_dir>/<section>/structure.json`
    pub data_dir: PathBuf,
    /// Snapshots live in `<root>/<backup_dir>`
    pub backup_dir: PathBuf,
    /// Snapshots retained per file basename
    pub max_backups: usize,
    /// Id allocation for new items
    pub id_strategy: IdStrategy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            data_dir: PathBuf::from("data"),
            backup_dir: PathBuf::from("backups"),
            max_backups: 10,
            id_strategy: IdStrategy::Length,
        }
    }
}

impl StorageConfig {
    pub fn data_path(&self) -> PathBuf {
        self.root.join(&self.data_dir)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.root.join(&self.backup_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Evict sessions idle this long (0 disables eviction)
    pub idle_timeout_secs: u64,
    /// How often the sweeper looks for idle sessions
    pub sweep_interval_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 24 * 60 * 60,
            sweep_interval_secs: 600,
        }
    }
}

impl SessionsConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory, relative to the working directory or `--root`
    pub dir: PathBuf,
    /// Log file name inside `dir`
    pub file: String,
    /// Default level filter: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file: "bot.log".to_string(),
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Full path of the log file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file)
    }
}

/// Validation result with multiple issues.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation issues
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Check if validation passed (no errors).
    pub fn is_ok(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == IssueSeverity::Error)
    }

    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == IssueSeverity::Error).collect()
    }

    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == IssueSeverity::Warning).collect()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            severity: IssueSeverity::Error,
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            severity: IssueSeverity::Warning,
            field: field.into(),
            message: message.into(),
        });
    }
}

/// A single validation issue.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    /// Field path (e.g., "storage.max_backups")
    pub field: String,
    pub message: String,
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// Warnings don't prevent loading
    Warning,
    /// Errors prevent loading
    Error,
}

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from all sources.
    ///
    /// Later layers win: defaults, user config, `./dermabot.toml`, the
    /// explicit `extra` file, `DERMABOT_*` variables, then the plain
    /// `BOT_TOKEN` / `ADMINS` variables.
    pub fn load(extra: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(Self::config_dir().join("config.toml")))
            .merge(Toml::file("dermabot.toml"));

        if let Some(path) = extra {
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::prefixed("DERMABOT_").split("__"))
            .merge(
                Env::raw()
                    .only(&["BOT_TOKEN", "ADMINS"])
                    .map(|key| {
                        if key.as_str().eq_ignore_ascii_case("bot_token") {
                            "bot.token".into()
                        } else {
                            "bot.admins".into()
                        }
                    }),
            )
            .extract()
    }

    /// Load and validate configuration.
    pub fn load_validated(extra: Option<&Path>) -> Result<Self, Error> {
        let config = Self::load(extra).map_err(|e| Error::Config(e.to_string()))?;
        let result = config.validate();

        if !result.is_ok() {
            let errors: Vec<String> = result
                .errors()
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            return Err(Error::Config(format!(
                "Configuration validation failed:\n  {}",
                errors.join("\n  ")
            )));
        }

        for warning in result.warnings() {
            tracing::warn!("Config warning - {}: {}", warning.field, warning.message);
        }

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        if self.storage.max_backups == 0 {
            result.add_error("storage.max_backups", "max_backups must be greater than 0");
        }

        if self.storage.data_dir == self.storage.backup_dir {
            result.add_error(
                "storage.backup_dir",
                "backup_dir must differ from data_dir",
            );
        }

        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            result.add_error(
                "logging.level",
                format!("Invalid log level '{}'. Valid values: {:?}", self.logging.level, VALID_LEVELS),
            );
        }

        if self.logging.file.is_empty() {
            result.add_error("logging.file", "log file name cannot be empty");
        }

        if self.bot.admins.is_empty() {
            result.add_warning("bot.admins", "No administrators configured; the admin panel is unreachable");
        }

        if self.bot.token.as_deref().is_some_and(str::is_empty) {
            result.add_warning("bot.token", "Token is an empty string");
        }

        result
    }

    /// The access token, required before serving any traffic.
    pub fn require_token(&self) -> Result<&str, Error> {
        self.bot
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::MissingCredential("BOT_TOKEN not set in config or environment".into()))
    }

    /// Get the configuration directory.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("dermabot"))
            .unwrap_or_else(|| PathBuf::from("~/.config/dermabot"))
    }

    /// Move the whole on-disk layout under `root`.
    ///
    /// Data, backups and a relative log directory all resolve against it.
    pub fn rebase(&mut self, root: &Path) {
        self.storage.root = root.to_path_buf();
        if self.logging.dir.is_relative() {
            self.logging.dir = root.join(&self.logging.dir);
        }
    }

    /// Render as TOML with the token masked.
    pub fn to_display_toml(&self) -> Result<String, Error> {
        let mut shown = self.clone();
        if let Some(token) = shown.bot.token.as_mut() {
            *token = "***".to_string();
        }
        toml::to_string_pretty(&shown).map_err(|e| Error::Config(e.to_string()))
    }
}
