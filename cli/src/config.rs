use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use fitlog_core::aggregate::PlanWindow;
use fitlog_core::models::DATE_FORMAT;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub plan: PlanWindow,
    pub log_level: String,
}

/// Optional `config.toml`. Every section and key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    plan: PlanSection,
    logging: LoggingSection,
}

/// Dates are quoted `"YYYY-MM-DD"` strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlanSection {
    start: Option<String>,
    end: Option<String>,
    sessions_per_week: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoggingSection {
    level: Option<String>,
}

impl FileConfig {
    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    fn plan(&self) -> Result<PlanWindow> {
        let defaults = PlanWindow::default();
        let date = |value: &Option<String>, fallback: NaiveDate, key: &str| -> Result<NaiveDate> {
            value.as_deref().map_or(Ok(fallback), |s| {
                NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                    .with_context(|| format!("Invalid plan.{key} '{s}'. Use YYYY-MM-DD"))
            })
        };
        Ok(PlanWindow {
            start: date(&self.plan.start, defaults.start, "start")?,
            end: date(&self.plan.end, defaults.end, "end")?,
            sessions_per_week: self
                .plan
                .sessions_per_week
                .unwrap_or(defaults.sessions_per_week),
        })
    }
}

impl Config {
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "fitlog").context("Could not determine home directory")?;

        let data_dir = data_dir.unwrap_or_else(|| proj_dirs.data_dir().to_path_buf());
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("fitlog.db");

        let file = FileConfig::read(&proj_dirs.config_dir().join("config.toml"))?;
        let mut config = Config {
            db_path,
            data_dir,
            plan: file.plan()?,
            log_level: file
                .logging
                .level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("FITLOG_LOG_LEVEL") {
            self.log_level = level;
        }
    }
}
