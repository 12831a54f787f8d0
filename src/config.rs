use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::eyre;
use serde::Deserialize;

/// Upper bound on tracked processes per ranking.
pub const MAX_MONITORED_PROCESS_NUM: usize = 1000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub sampler: SamplerConfig,
    pub output: OutputConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let num = self.general.monitored_process_num;
        if num > MAX_MONITORED_PROCESS_NUM {
            return Err(eyre!(
                "monitored_process_num {num} exceeds the maximum of {MAX_MONITORED_PROCESS_NUM}"
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub refresh_rate_ms: u64,
    pub monitored_process_num: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            refresh_rate_ms: 2000,
            monitored_process_num: 5,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub command: String,
    pub delay: String,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            command: "top".to_string(),
            delay: "0.01".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Log,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "log" => Some(OutputFormat::Log),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// JSON destination; empty means stdout.
    pub path: String,
}

impl OutputConfig {
    pub fn path(&self) -> Option<&Path> {
        let trimmed = self.path.trim();
        (!trimmed.is_empty()).then(|| Path::new(trimmed))
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("procdiag").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "invalid config, using defaults");
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}
