//! Runtime settings: built-in defaults, an optional `config.toml`, and environment overrides.
//!
//! Lookup order (later wins):
//! 1. [`Settings::default`]
//! 2. `config.toml` from `dirs::config_dir()/unirank/`, or an explicit path
//! 3. `UNIRANK_BASE_URL`
//!
//! Front ends apply their own flags on top.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_BASE_URL: &str = "UNIRANK_BASE_URL";

/// Year whose ARWU edition is shown as "not yet published" when the backend has no rows.
pub const DEFAULT_UNPUBLISHED_ARWU_YEAR: i32 = 2025;

pub const MIN_COMPARE_SLOTS: usize = 2;
pub const MAX_COMPARE_SLOTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the ranking backend, without the `/api` suffix.
    pub base_url: String,
    /// Total request timeout. `None` lets a request hang until the server answers.
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: u64,
    pub unpublished_arwu_year: i32,
    /// Number of comparison inputs shown at start-up.
    pub compare_slots: usize,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".into(),
            timeout_secs: None,
            connect_timeout_secs: 10,
            unpublished_arwu_year: DEFAULT_UNPUBLISHED_ARWU_YEAR,
            compare_slots: MIN_COMPARE_SLOTS,
            chart_width: 1000,
            chart_height: 600,
        }
    }
}

impl Settings {
    /// Default location of the settings file, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("unirank").join("config.toml"))
    }

    /// Load settings. An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path() {
                Some(p) if p.is_file() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        if let Ok(url) = std::env::var(ENV_BASE_URL)
            && !url.trim().is_empty()
        {
            settings.base_url = url.trim().to_string();
        }
        Ok(settings.normalized())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        Ok(settings.normalized())
    }

    fn normalized(mut self) -> Self {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        self.compare_slots = self.compare_slots.clamp(MIN_COMPARE_SLOTS, MAX_COMPARE_SLOTS);
        self
    }
}
