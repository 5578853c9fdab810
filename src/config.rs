use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

/// How the multi-group feed is fetched from the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// One concurrent query per status group
    #[default]
    Parallel,
    /// One query per status group, one after another
    Sequential,
    /// A single query over the raw status list, without groups or limits
    Legacy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSettings {
    #[serde(default)]
    pub fetch_mode: FetchMode,
    #[serde(default = "default_profile_fields")]
    pub profile_fields: Vec<String>,
    #[serde(default)]
    pub limits: FeedLimitSettings,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            fetch_mode: FetchMode::default(),
            profile_fields: default_profile_fields(),
            limits: FeedLimitSettings::default(),
        }
    }
}

fn default_profile_fields() -> Vec<String> {
    ["firstName", "age", "city", "stateCode", "country", "gender", "photo"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Page sizes per status group; a missing value means unbounded
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedLimitSettings {
    #[serde(default)]
    pub new: GroupLimitSettings,
    #[serde(default)]
    pub communication: GroupLimitSettings,
    #[serde(default)]
    pub archive: GroupLimitSettings,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct GroupLimitSettings {
    pub default_limit: Option<u32>,
    pub fallback_limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with MATCH_FEED__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g., MATCH_FEED__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("MATCH_FEED")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("MATCH_FEED")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply well-known environment variables that live outside the prefix.
///
/// `DATABASE_URL` wins over every other source when set.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = std::env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }

    builder.build()
}
