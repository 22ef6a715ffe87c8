// MOODTUNE Configuration
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE
//
// Static settings loaded once at start-up: built-in defaults, overlaid by an
// optional JSON file, overlaid by environment variables. Catalog credentials
// are never stored here; they come from the environment only.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::agent::emotion::{default_genre_table, GenreTable, MoodCategory};
use crate::agent::mood_loop::LoopSettings;
use crate::agent::selector::SelectorSettings;

pub const CONFIG_FILE: &str = "moodtune.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub market: String,
    /// Results per search page.
    pub limit: u32,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            market: "US".to_string(),
            limit: 20,
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between two recognizer invocations.
    pub detection_interval_secs: f64,
    /// Advisory unless `enforce_confidence` is set.
    pub confidence_threshold: f32,
    pub enforce_confidence: bool,
    pub webcam_resolution: (u32, u32),
    pub camera_device: String,
    pub recognizer_url: String,
    pub recognizer_timeout_secs: u64,
    /// Minimum seconds between track switches.
    pub music_switch_delay_secs: f64,
    pub poll_interval_ms: u64,
    pub catalog: CatalogConfig,
    pub music_directory: PathBuf,
    pub supported_formats: Vec<String>,
    pub genres: GenreTable,
}

fn default_camera_device() -> &'static str {
    match std::env::consts::OS {
        "windows" => "Integrated Camera",
        "macos" => "0",
        _ => "/dev/video0",
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detection_interval_secs: 2.0,
            confidence_threshold: 0.5,
            enforce_confidence: false,
            webcam_resolution: (640, 480),
            camera_device: default_camera_device().to_string(),
            recognizer_url: "http://localhost:5000/detect".to_string(),
            recognizer_timeout_secs: 10,
            music_switch_delay_secs: 5.0,
            poll_interval_ms: 100,
            catalog: CatalogConfig::default(),
            music_directory: PathBuf::from("music"),
            supported_formats: [".mp3", ".wav", ".ogg", ".flac"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            genres: default_genre_table(),
        }
    }
}

impl Config {
    /// Explicit path must exist. Without one, `./moodtune.json` then the
    /// platform config dir are tried; if neither exists defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_locations().into_iter().find(|p| p.is_file()),
        };

        let mut config = match file {
            Some(p) => {
                let cfg = Self::from_file(&p)?;
                info!("[CONFIG] Loaded {:?}", p);
                cfg
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn default_locations() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("moodtune").join(CONFIG_FILE));
        }
        paths
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        Self::from_json(&raw).with_context(|| format!("parsing config {:?}", path))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// `MOODTUNE_RECOGNIZER_URL`, `MOODTUNE_MUSIC_DIR`, `MOODTUNE_CAMERA`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = get("MOODTUNE_RECOGNIZER_URL") {
            self.recognizer_url = url;
        }
        if let Some(dir) = get("MOODTUNE_MUSIC_DIR") {
            self.music_directory = PathBuf::from(dir);
        }
        if let Some(device) = get("MOODTUNE_CAMERA") {
            self.camera_device = device;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.detection_interval_secs.is_finite() && self.detection_interval_secs > 0.0) {
            bail!("detection_interval_secs must be positive");
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            bail!("confidence_threshold must be within 0.0-1.0");
        }
        if !(self.music_switch_delay_secs.is_finite() && self.music_switch_delay_secs >= 0.0) {
            bail!("music_switch_delay_secs must not be negative");
        }
        if self.webcam_resolution.0 == 0 || self.webcam_resolution.1 == 0 {
            bail!("webcam_resolution must be non-zero");
        }
        if !(1..=50).contains(&self.catalog.limit) {
            bail!("catalog.limit must be within 1-50");
        }
        if self.catalog.market.len() != 2 || !self.catalog.market.chars().all(|c| c.is_ascii_alphabetic()) {
            bail!("catalog.market must be a two-letter country code");
        }
        if self.supported_formats.is_empty() {
            bail!("supported_formats must list at least one extension");
        }
        for (category, profile) in &self.genres {
            if profile.genres.is_empty() {
                bail!("genre profile '{}' has no genres", category);
            }
        }
        for category in MoodCategory::ALL {
            if !self.genres.contains_key(&category) {
                warn!("[CONFIG] No genre profile for '{}'; it will always use the local library.", category);
            }
        }
        Ok(())
    }

    pub fn detection_interval(&self) -> Duration {
        Duration::from_secs_f64(self.detection_interval_secs)
    }

    pub fn recognizer_timeout(&self) -> Duration {
        Duration::from_secs(self.recognizer_timeout_secs)
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.timeout_secs)
    }

    pub fn selector_settings(&self) -> SelectorSettings {
        SelectorSettings {
            result_limit: self.catalog.limit,
            market: self.catalog.market.to_uppercase(),
            catalog_timeout: self.catalog_timeout(),
        }
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            switch_delay: Duration::from_secs_f64(self.music_switch_delay_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            enforce_confidence: self.enforce_confidence,
        }
    }
}
