//! Configuration management.

use anyhow::{Context, Result};
use artista_hw::{ARTISTA_PID, ARTISTA_VID};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory image files are resolved against
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// Tick interval in milliseconds
    #[serde(default = "default_tick")]
    pub tick: u64,

    /// Shuffle the image queue before the first fill
    #[serde(default)]
    pub random_start: bool,

    /// Only log screen assignments instead of driving the screens
    #[serde(default)]
    pub debug: bool,

    /// Display ids of the managed screens
    #[serde(default)]
    pub screens: Vec<String>,

    /// Images to rotate, keyed by name (queued in name order)
    #[serde(default)]
    pub images: BTreeMap<String, ImageConfig>,

    /// USB matching
    #[serde(default)]
    pub usb: UsbConfig,
}

/// One rotating image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageConfig {
    /// File name relative to `image_dir`
    pub file: String,

    /// Minimum time on screen, in seconds
    #[serde(default = "default_duration")]
    pub duration: u64,
}

/// USB matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsbConfig {
    #[serde(default = "default_vid")]
    pub vid: u16,

    #[serde(default = "default_pid")]
    pub pid: u16,
}

impl Default for UsbConfig {
    fn default() -> Self {
        Self {
            vid: default_vid(),
            pid: default_pid(),
        }
    }
}

// Default value functions
fn default_image_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_tick() -> u64 {
    1000
}

fn default_duration() -> u64 {
    60
}

fn default_vid() -> u16 {
    ARTISTA_VID
}

fn default_pid() -> u16 {
    ARTISTA_PID
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse configuration")?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
            tick: default_tick(),
            random_start: false,
            debug: false,
            screens: Vec::new(),
            images: BTreeMap::new(),
            usb: UsbConfig::default(),
        }
    }
}
