//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/sermon/config.toml)
//! 3. Environment variables (SERMON_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::timer::TimeBudget;

/// Environment variable prefix
const ENV_PREFIX: &str = "SERMON";

/// Default supporting-text budget in characters
pub const DEFAULT_MAX_SUPPORTING_CHARS: usize = 20_000;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for local state (theme, presentation log)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log file for the presentation view
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    #[serde(default)]
    pub repository: RepositoryConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub timer: TimerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_file: None,
            repository: RepositoryConfig::default(),
            generation: GenerationConfig::default(),
            timer: TimerConfig::default(),
        }
    }
}

/// Hosted JSON collection holding saved sermons
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_repository_url")]
    pub base_url: String,

    /// Collection (bin) identifier
    #[serde(default)]
    pub collection: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_repository_url(),
            collection: None,
            api_key: None,
        }
    }
}

/// Generative language model endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Supporting text is cut to this many characters before sending
    #[serde(default = "default_max_supporting_chars")]
    pub max_supporting_chars: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_url(),
            model: default_model(),
            api_key: None,
            max_supporting_chars: default_max_supporting_chars(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Speaker timer budget in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_total_minutes")]
    pub total_minutes: u64,
    #[serde(default = "default_introduction_minutes")]
    pub introduction_minutes: u64,
    #[serde(default = "default_point_minutes")]
    pub point_minutes: u64,
    #[serde(default = "default_conclusion_minutes")]
    pub conclusion_minutes: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            total_minutes: default_total_minutes(),
            introduction_minutes: default_introduction_minutes(),
            point_minutes: default_point_minutes(),
            conclusion_minutes: default_conclusion_minutes(),
        }
    }
}

impl TimerConfig {
    pub fn budget(&self) -> TimeBudget {
        TimeBudget::from_minutes(
            self.total_minutes,
            self.introduction_minutes,
            self.point_minutes,
            self.conclusion_minutes,
        )
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (SERMON_DATA_DIR, SERMON_COLLECTION, ...)
    /// 2. Config file (~/.config/sermon/config.toml or SERMON_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load from `--config` when given, otherwise the default location
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Some(val) = env_var("DATA_DIR") {
            self.data_dir = PathBuf::from(val);
        }
        if let Some(val) = env_var("REPOSITORY_URL") {
            if !val.is_empty() {
                self.repository.base_url = val;
            }
        }
        if let Some(val) = env_var("COLLECTION") {
            self.repository.collection = non_empty(val);
        }
        if let Some(val) = env_var("REPOSITORY_KEY") {
            self.repository.api_key = non_empty(val);
        }
        if let Some(val) = env_var("GENERATION_KEY") {
            self.generation.api_key = non_empty(val);
        }
        if let Some(val) = env_var("MODEL") {
            if !val.is_empty() {
                self.generation.model = val;
            }
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Set a value by its dotted key, as used by `sermon config set`
    ///
    /// An empty value or `none` clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "log_file" => self.log_file = non_empty(value.to_string()).map(PathBuf::from),
            "repository.base_url" => self.repository.base_url = value.to_string(),
            "repository.collection" => self.repository.collection = non_empty(value.to_string()),
            "repository.api_key" => self.repository.api_key = non_empty(value.to_string()),
            "generation.base_url" => self.generation.base_url = value.to_string(),
            "generation.model" => self.generation.model = value.to_string(),
            "generation.api_key" => self.generation.api_key = non_empty(value.to_string()),
            "generation.max_supporting_chars" => {
                self.generation.max_supporting_chars = parse_number(key, value)?
            }
            "generation.timeout_secs" => self.generation.timeout_secs = parse_number(key, value)?,
            "timer.total_minutes" => self.timer.total_minutes = parse_number(key, value)?,
            "timer.introduction_minutes" => {
                self.timer.introduction_minutes = parse_number(key, value)?
            }
            "timer.point_minutes" => self.timer.point_minutes = parse_number(key, value)?,
            "timer.conclusion_minutes" => self.timer.conclusion_minutes = parse_number(key, value)?,
            _ => bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                Self::KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Keys accepted by [`Config::set`]
    pub const KEYS: &'static [&'static str] = &[
        "data_dir",
        "log_file",
        "repository.base_url",
        "repository.collection",
        "repository.api_key",
        "generation.base_url",
        "generation.model",
        "generation.api_key",
        "generation.max_supporting_chars",
        "generation.timeout_secs",
        "timer.total_minutes",
        "timer.introduction_minutes",
        "timer.point_minutes",
        "timer.conclusion_minutes",
    ];

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with SERMON_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Some(path) = env_var("CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sermon")
            .join("config.toml")
    }

    /// Log file for the presentation view
    pub fn present_log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("present.log"))
    }
}

fn env_var(suffix: &str) -> Option<String> {
    std::env::var(format!("{}_{}", ENV_PREFIX, suffix)).ok()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid value for {}: expected a number", key))
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sermon")
}

fn default_repository_url() -> String {
    "https://api.jsonbin.io/v3/b".to_string()
}

fn default_generation_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_supporting_chars() -> usize {
    DEFAULT_MAX_SUPPORTING_CHARS
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_total_minutes() -> u64 {
    40
}

fn default_introduction_minutes() -> u64 {
    5
}

fn default_point_minutes() -> u64 {
    10
}

fn default_conclusion_minutes() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "SERMON_CONFIG",
        "SERMON_DATA_DIR",
        "SERMON_REPOSITORY_URL",
        "SERMON_COLLECTION",
        "SERMON_REPOSITORY_KEY",
        "SERMON_GENERATION_KEY",
        "SERMON_MODEL",
    ];

    #[test]
    fn test_default_sections() {
        let _guard = EnvGuard::new(ENV_VARS);
        let config = Config::load_from_str("").unwrap();
        assert!(config.data_dir.ends_with("sermon"));
        assert_eq!(config.generation.max_supporting_chars, 20_000);
        assert_eq!(config.timer, TimerConfig::default());
        assert!(config.repository.collection.is_none());
        assert!(config.repository.base_url.starts_with("https://"));
    }

    #[test]
    fn test_timer_budget() {
        let budget = TimerConfig::default().budget();
        assert_eq!(budget, TimeBudget::default());

        let custom = TimerConfig {
            total_minutes: 30,
            introduction_minutes: 3,
            point_minutes: 7,
            conclusion_minutes: 4,
        };
        assert_eq!(custom.budget().total, Duration::from_secs(30 * 60));
        assert_eq!(custom.budget().point, Duration::from_secs(7 * 60));
    }

    #[test]
    fn test_env_overrides() {
        let _guard = EnvGuard::new(ENV_VARS);
        let mut config = Config::default();

        env::set_var("SERMON_DATA_DIR", "/tmp/sermon-test");
        env::set_var("SERMON_COLLECTION", "bin-1");
        env::set_var("SERMON_REPOSITORY_KEY", "repo-secret");
        env::set_var("SERMON_GENERATION_KEY", "gen-secret");
        env::set_var("SERMON_MODEL", "gemini-pro");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/sermon-test"));
        assert_eq!(config.repository.collection.as_deref(), Some("bin-1"));
        assert_eq!(config.repository.api_key.as_deref(), Some("repo-secret"));
        assert_eq!(config.generation.api_key.as_deref(), Some("gen-secret"));
        assert_eq!(config.generation.model, "gemini-pro");

        // Empty string clears optional values
        env::set_var("SERMON_COLLECTION", "");
        config.apply_env_overrides();
        assert!(config.repository.collection.is_none());
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"

            [repository]
            collection = "abc"
            api_key = "k"

            [generation]
            model = "gemini-1.5-pro"
            max_supporting_chars = 500

            [timer]
            point_minutes = 8
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.repository.collection.as_deref(), Some("abc"));
        assert_eq!(config.generation.model, "gemini-1.5-pro");
        assert_eq!(config.generation.max_supporting_chars, 500);
        assert_eq!(config.timer.point_minutes, 8);
        assert_eq!(config.timer.total_minutes, 40);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let dir = tempfile::tempdir().unwrap();
        env::set_var("SERMON_DATA_DIR", dir.path().join("data"));

        let config = Config::load_from_path(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.generation.max_supporting_chars, 20_000);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_set_and_save_round_trip() {
        let _guard = EnvGuard::new(ENV_VARS);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        config.set("repository.collection", "bin-9").unwrap();
        config.set("timer.total_minutes", "45").unwrap();
        config.set("log_file", "/tmp/present.log").unwrap();
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.repository.collection.as_deref(), Some("bin-9"));
        assert_eq!(loaded.timer.total_minutes, 45);
        assert_eq!(loaded.present_log_path(), PathBuf::from("/tmp/present.log"));

        config.set("log_file", "none").unwrap();
        assert_eq!(config.present_log_path(), dir.path().join("present.log"));
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut config = Config::default();
        assert!(config.set("timer.total_minutes", "forty").is_err());
        let err = config.set("sync_url", "x").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
    }
}
