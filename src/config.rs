//! Configuration management for ttyline.
//!
//! Settings load from `~/.ttyline/config.toml`. Every section is optional
//! and missing keys fall back to their defaults:
//!
//! ```toml
//! [screen]
//! width = 80
//! height = 24
//!
//! [prompt]
//! text = "Opt> "
//! # Prompt residue stripped from submitted lines
//! pattern = '^\[?.*@.*\]?[\$#]\s|mysql>\s'
//!
//! [input]
//! sensitive = false
//! mask_char = "*"
//! recv_size = 1
//!
//! [log]
//! level = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::parser::{PromptPattern, TtyParser, DEFAULT_PROMPT_PATTERN};
use crate::core::reader::{InputReader, ReaderOptions};
use crate::core::screen::{VirtualScreen, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub screen: ScreenConfig,
    pub prompt: PromptConfig,
    pub input: InputConfig,
    pub log: LogConfig,
}

/// Virtual screen size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: u16,
    pub height: u16,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Prompt text and the pattern that strips it from input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub text: String,
    pub pattern: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            text: "Opt> ".to_string(),
            pattern: DEFAULT_PROMPT_PATTERN.to_string(),
        }
    }
}

/// Keystroke handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub sensitive: bool,
    pub mask_char: char,
    pub recv_size: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            sensitive: false,
            mask_char: '*',
            recv_size: 1,
        }
    }
}

/// Log settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String, // "trace", "debug", "info", "warn", "error"
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(config) => return config,
                    Err(e) => warn!("{}, using defaults", e),
                }
            }
        }
        Self::default()
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::get_config_path().ok_or(Error::NoConfigPath)?;
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(Error::ConfigSerialize)?;
        fs::write(path, content).map_err(|source| Error::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Directory holding config and logs (`~/.ttyline`)
    pub fn config_dir() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".ttyline"))
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        let dir = Self::config_dir()?;
        if !dir.exists() {
            let _ = fs::create_dir_all(&dir);
        }
        Some(dir.join("config.toml"))
    }

    /// Reader options for the configured prompt and input settings
    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            prompt: self.prompt.text.clone(),
            sensitive: self.input.sensitive,
            mask_char: self.input.mask_char,
            recv_size: self.input.recv_size.max(1),
            ..ReaderOptions::default()
        }
    }

    /// Parser with the configured screen size and prompt pattern
    pub fn parser(&self) -> Result<TtyParser> {
        let prompt = PromptPattern::new(&self.prompt.pattern)?;
        let screen = VirtualScreen::new(self.screen.width, self.screen.height);
        Ok(TtyParser::new(screen, prompt))
    }

    /// Input reader wired from this configuration
    pub fn input_reader(&self) -> Result<InputReader> {
        Ok(InputReader::with_parser(self.reader_options(), self.parser()?))
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
