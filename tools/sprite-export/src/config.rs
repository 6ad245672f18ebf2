//! sprite-export.toml configuration
//!
//! All keys are optional. Paths are resolved relative to the directory
//! containing the config file.
//!
//! ```toml
//! input_dir = "separated_sprites_input"
//! output_dir = "assets"
//! color_key = [255, 0, 255]
//! alpha_threshold = 128
//! integer_header = "cstdint"
//!
//! [[frames]]
//! frame = 0
//! action = "Idle"
//! index = 0
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::color::{ColorKey, DEFAULT_ALPHA_THRESHOLD};
use crate::header::{HeaderOptions, DEFAULT_INTEGER_HEADER};
use crate::naming::{ActionFrame, AnimationMap, FrameMapping};

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "sprite-export.toml";

/// Config validation failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Frame {0} is mapped more than once")]
    DuplicateFrame(u32),

    #[error("Frame {0} has an empty action name")]
    EmptyAction(u32),

    #[error("Frame {0} has a control character in its action name")]
    ControlCharInAction(u32),

    #[error("integer_header must not be empty")]
    EmptyIntegerHeader,
}

/// Raw config file contents
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,

    /// Transparency key, default magenta
    #[serde(default)]
    pub color_key: ColorKey,

    /// Pixels with alpha strictly below this become the color key
    #[serde(default = "default_alpha_threshold")]
    pub alpha_threshold: u8,

    /// Header included for `uint16_t`
    #[serde(default = "default_integer_header")]
    pub integer_header: String,

    /// Frame number -> action table (mapped mode).
    /// Empty means the built-in ten-frame table.
    #[serde(default)]
    pub frames: Vec<FrameMapping>,
}

fn default_alpha_threshold() -> u8 {
    DEFAULT_ALPHA_THRESHOLD
}

fn default_integer_header() -> String {
    DEFAULT_INTEGER_HEADER.to_string()
}

impl ConfigFile {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Parse config from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse sprite-export.toml")
    }

    /// Build the animation table, rejecting duplicates and empty actions.
    /// Action names end up in a `//` comment, so they must stay on one line.
    pub fn animation_map(&self) -> Result<AnimationMap, ConfigError> {
        if self.frames.is_empty() {
            return Ok(AnimationMap::default());
        }

        let mut map = AnimationMap::new();
        for entry in &self.frames {
            if entry.action.trim().is_empty() {
                return Err(ConfigError::EmptyAction(entry.frame));
            }
            if entry.action.chars().any(char::is_control) {
                return Err(ConfigError::ControlCharInAction(entry.frame));
            }
            let previous = map.insert(entry.frame, ActionFrame::new(&entry.action, entry.index));
            if previous.is_some() {
                return Err(ConfigError::DuplicateFrame(entry.frame));
            }
        }
        Ok(map)
    }

    /// Validate config fields
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.integer_header.trim().is_empty() {
            return Err(ConfigError::EmptyIntegerHeader);
        }
        self.animation_map()?;
        Ok(())
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub header: HeaderOptions,
    pub animations: AnimationMap,
}

/// Values given on the command line. They win over the config file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl ExportConfig {
    /// Resolve a run configuration.
    ///
    /// `config_path` is optional; when absent, defaults apply. Directories
    /// default to the current directory (input) and `<input>/headers` (output).
    pub fn resolve(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let (file, base_dir) = match config_path {
            Some(path) => {
                let file = ConfigFile::load(path)?;
                let base = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                (file, base)
            }
            None => (ConfigFile::default(), PathBuf::new()),
        };

        Self::from_file(file, &base_dir, overrides)
    }

    /// Combine a parsed config file with command line overrides
    pub fn from_file(
        file: ConfigFile,
        base_dir: &Path,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        file.validate().context("Invalid configuration")?;
        let animations = file.animation_map()?;

        let input_dir = overrides
            .input_dir
            .or_else(|| file.input_dir.as_ref().map(|p| base_dir.join(p)))
            .unwrap_or_else(|| PathBuf::from("."));

        let output_dir = overrides
            .output_dir
            .or_else(|| file.output_dir.as_ref().map(|p| base_dir.join(p)))
            .unwrap_or_else(|| input_dir.join("headers"));

        Ok(Self {
            input_dir,
            output_dir,
            header: HeaderOptions {
                color_key: file.color_key,
                alpha_threshold: file.alpha_threshold,
                integer_header: file.integer_header,
            },
            animations,
        })
    }
}

impl Default for ConfigFile {
    /// Same values as an empty config file
    fn default() -> Self {
        Self {
            input_dir: None,
            output_dir: None,
            color_key: ColorKey::default(),
            alpha_threshold: default_alpha_threshold(),
            integer_header: default_integer_header(),
            frames: Vec::new(),
        }
    }
}

/// Default config file contents, written by `sprite-export init`
pub fn default_config_toml() -> String {
    let mut out = String::from(
        "# sprite-export configuration\n\
         \n\
         # Folder with the source PNGs (relative to this file)\n\
         input_dir = \"separated_sprites_input\"\n\
         \n\
         # Folder receiving the generated .h files\n\
         output_dir = \"assets\"\n\
         \n\
         # Transparency key and alpha cutoff\n\
         color_key = [255, 0, 255]\n\
         alpha_threshold = 128\n\
         \n\
         # Header providing uint16_t (use \"stdint.h\" for C)\n\
         integer_header = \"cstdint\"\n\
         \n\
         # Frame number -> animation action (mapped mode)\n",
    );

    for (frame, action) in AnimationMap::default().iter() {
        out.push_str(&format!(
            "\n[[frames]]\nframe = {}\naction = \"{}\"\nindex = {}\n",
            frame, action.action, action.index
        ));
    }

    out
}
