//! Persistent application configuration.
//!
//! Stored as JSON in a platform-appropriate config directory, or wherever
//! `HUNDO_CONFIG` points. Every field has a default, so a partial file is fine.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// On-disk configuration for both binaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Banner localization heuristics (threshold, minimum area, padding, ...).
    pub banner: ie::BannerConfig,

    /// CP multiplier table (JSON object of level → multiplier).
    ///
    /// `None` uses the table embedded in the `data` crate.
    pub cpm_table: Option<PathBuf>,

    /// Curve store read by `hundo`: a document directory or a JSONL file.
    pub store: PathBuf,

    /// Offline batch settings.
    pub generate: GenerateConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            banner: ie::BannerConfig::default(),
            cpm_table: None,
            store: PathBuf::from("hundo_store"),
            generate: GenerateConfig::default(),
        }
    }
}

/// How the batch input file is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// JSONL of full catalog `pokemon` records (already downloaded).
    Records,
    /// JSON `{"results": [{"name", "url"}]}` listing; each entry is fetched.
    Listing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub input: PathBuf,
    pub input_kind: InputKind,

    /// Hundo CP curves, one JSON record per line.
    pub output: PathBuf,

    /// Main-series stats as read, one JSON record per line.
    pub main_stats_output: Option<PathBuf>,

    /// GO stats after the balance step, one JSON record per line.
    pub base_stats_output: Option<PathBuf>,

    /// Document directory for serving, replaced as a whole.
    pub store_dir: Option<PathBuf>,

    /// Catalog base URL used for `listing` input entries without a URL.
    pub catalog_url: String,

    /// Pause between catalog requests.
    pub fetch_delay_ms: u64,

    /// IV applied to every stat. 15 is a hundo.
    pub bonus: u32,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("1025_pokemon_main.jsonl"),
            input_kind: InputKind::Records,
            output: PathBuf::from("1025_pokemon_go_hundo_cp.jsonl"),
            main_stats_output: Some(PathBuf::from("1025_pokemon_main_stats.jsonl")),
            base_stats_output: Some(PathBuf::from("1025_pokemon_go_base_stats.jsonl")),
            store_dir: Some(PathBuf::from("hundo_store")),
            catalog_url: data::schema::pokeapi::URL.to_string(),
            fetch_delay_ms: 1000,
            bonus: data::HUNDO_BONUS,
        }
    }
}

impl Config {
    /// Path to the config file.
    pub fn path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os("HUNDO_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("hundo.json"))
    }

    /// Load configuration from disk, falling back to defaults on any failure.
    pub fn load_or_default() -> Self {
        match Self::try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load config; using defaults");
                Self::default()
            }
        }
    }

    /// Try to load configuration from disk. A missing file yields defaults.
    pub fn try_load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(&path).with_context(|| format!("read {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("parse {:?}", path))
    }

    /// Parse and validate a config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        if cfg.generate.bonus > data::HUNDO_BONUS {
            bail!("generate.bonus is {}, IVs go up to {}", cfg.generate.bonus, data::HUNDO_BONUS);
        }
        Ok(cfg)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(&path, json).with_context(|| format!("write {:?}", path))?;
        Ok(())
    }

    /// The configured CP multiplier table, or the embedded one.
    pub fn modifier_table(&self) -> Result<data::ModifierTable, data::ConfigError> {
        match &self.cpm_table {
            Some(path) => data::ModifierTable::load(path),
            None => Ok(data::ModifierTable::reference()),
        }
    }
}
