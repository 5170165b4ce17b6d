use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "modledger.sqlite";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "EN")]
    English,
    #[serde(rename = "RU")]
    Russian,
}

impl Language {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "EN" => Some(Language::English),
            "RU" => Some(Language::Russian),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "EN",
            Language::Russian => "RU",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub language: Language,
    pub database_path: PathBuf,
}

impl AppConfig {
    fn defaults_in(dir: &Path) -> Self {
        Self {
            language: Language::default(),
            database_path: dir.join(DATABASE_FILE),
        }
    }

    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_in(&base_data_dir()?)
    }

    pub fn load_or_create_in(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).context("create app data dir")?;
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            let raw = fs::read_to_string(&path).context("read app config")?;
            let config: AppConfig = serde_json::from_str(&raw).context("parse app config")?;
            tracing::debug!(path = %path.display(), "loaded app config");
            return Ok(config);
        }

        let config = Self::defaults_in(dir);
        config.save_in(dir)?;
        tracing::info!(path = %path.display(), "created default app config");
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_in(&base_data_dir()?)
    }

    pub fn save_in(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).context("create app data dir")?;
        let raw = serde_json::to_string_pretty(self).context("serialize app config")?;
        fs::write(dir.join(CONFIG_FILE), raw).context("write app config")?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(base_data_dir()?.join(CONFIG_FILE))
}

pub fn base_data_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().context("resolve home dir")?;
    Ok(base.data_local_dir().join("modledger"))
}
