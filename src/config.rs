// File: ./src/config.rs
use crate::presenter::{EscapeBehavior, FilterType, PresenterOptions, SortType};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the trip is stored. Defaults to `trip.json` in the data directory.
    pub data_file: Option<PathBuf>,
    pub default_sort: SortType,
    pub default_filter: FilterType,
    pub escape_resets_form: bool,
    pub classify_updates: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            default_sort: SortType::Day,
            default_filter: FilterType::Everything,
            escape_resets_form: true,
            classify_updates: true,
            log_level: "info".to_string(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "tripdeck")
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|d| d.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        project_dirs().map(|d| d.data_dir().to_path_buf())
    }

    /// Loads the config from the platform location, or defaults when there is none yet.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_path().context("Could not determine config directory")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write config {}", path.display()))
    }

    pub fn data_file(&self) -> Result<PathBuf> {
        match &self.data_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()
                .context("Could not determine data directory")?
                .join("trip.json")),
        }
    }

    pub fn presenter_options(&self) -> PresenterOptions {
        PresenterOptions {
            escape: if self.escape_resets_form {
                EscapeBehavior::ResetForm
            } else {
                EscapeBehavior::Immediate
            },
            classify_updates: self.classify_updates,
        }
    }
}
