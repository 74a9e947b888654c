use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "setup.yml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for intermediate files (post records, transcripts, captions)
    pub cache_dir: PathBuf,

    /// Post fetching
    #[serde(default)]
    pub reddit: RedditConfig,

    /// Speech recognition
    #[serde(default)]
    pub audio: AudioConfig,

    /// Caption generation
    #[serde(default)]
    pub captions: CaptionsConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    /// Subreddit used when no post is given
    pub subreddit: String,

    /// User agent sent to Reddit
    pub user_agent: String,

    /// File name of the raw post record (JSON)
    pub record_file_json: String,

    /// File name of the post script text
    pub record_file_txt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// External recognizer program
    pub recognizer_command: String,

    /// Recognition model name
    pub model: String,

    /// Device to run recognition on
    pub device: String,

    /// Batch size for recognition
    pub batch_size: usize,

    /// Compute type ("float16" or "int8")
    pub compute_type: String,

    /// Spoken language
    pub language: String,

    /// File name of the word transcript
    pub transcript_json: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionsConfig {
    /// Drop words with zero start or implausible duration before grouping
    pub filter: bool,

    /// File name of the caption file
    pub captions_file: String,

    /// Caption file format
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log filter when RUST_LOG is not set
    pub level: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            subreddit: "AmItheAsshole".to_string(),
            user_agent: format!("shorts-scribe/{}", env!("CARGO_PKG_VERSION")),
            record_file_json: "reddit_post.json".to_string(),
            record_file_txt: "reddit_post.txt".to_string(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            recognizer_command: "whisperx-bridge".to_string(),
            model: "large-v2".to_string(),
            device: "cuda".to_string(),
            batch_size: 16,
            compute_type: "float16".to_string(),
            language: "en".to_string(),
            transcript_json: "transcript.json".to_string(),
        }
    }
}

impl Default for CaptionsConfig {
    fn default() -> Self {
        Self {
            filter: false,
            captions_file: "captions.yml".to_string(),
            format: OutputFormat::Yaml,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            reddit: RedditConfig::default(),
            audio: AudioConfig::default(),
            captions: CaptionsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, the working directory, or
    /// the user config directory (written with defaults on first use)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save(&config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Load and validate a configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        ) {
            anyhow::bail!("Config file {} is not a yaml file", path.display());
        }

        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Load an explicit or already existing configuration without writing defaults
    pub fn load_existing(explicit: Option<&Path>) -> Result<Option<Self>> {
        if let Some(path) = explicit {
            return Self::load_from(path).map(Some);
        }

        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from(CONFIG_FILE_NAME);
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("shorts-scribe").join(CONFIG_FILE_NAME))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.cache_dir.as_os_str().is_empty() {
            anyhow::bail!("cache_dir must be configured");
        }

        if self.audio.recognizer_command.trim().is_empty() {
            anyhow::bail!("audio.recognizer_command must not be empty");
        }

        if self.audio.batch_size == 0 {
            anyhow::bail!("audio.batch_size must be at least 1");
        }

        Ok(())
    }

    /// Create the cache directory if needed
    pub fn ensure_cache_dir(&self) -> Result<&Path> {
        fs_err::create_dir_all(&self.cache_dir)?;
        Ok(&self.cache_dir)
    }

    pub fn transcript_path(&self) -> PathBuf {
        self.cache_dir.join(&self.audio.transcript_json)
    }

    pub fn captions_path(&self) -> PathBuf {
        self.cache_dir.join(&self.captions.captions_file)
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Cache Dir: {}", self.cache_dir.display());
        println!("  Subreddit: r/{}", self.reddit.subreddit);
        println!("  Recognizer: {} ({}, {})", self.audio.recognizer_command, self.audio.model, self.audio.device);
        println!("  Transcript: {}", self.transcript_path().display());
        println!("  Captions: {} ({})", self.captions_path().display(), self.captions.format);
        println!("  Filter Captions: {}", self.captions.filter);
    }
}
