use anyhow::{Context, Result};
use extracto_core::Category;
use extracto_finance::{DateOrdering, RuleSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::extracto_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log: LogSection,
    pub report: ReportSection,
    pub rules: RulesSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Default filter when RUST_LOG is unset
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub date_ordering: DateOrdering,
    pub strict_amounts: bool,
}

/// Extra patterns appended after the built-in ones of each category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesSection {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sale: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payroll: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub raw_material: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overhead: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<String>,
}

impl RulesSection {
    fn by_category(&self) -> [(Category, &[String]); 5] {
        [
            (Category::Sale, self.sale.as_slice()),
            (Category::Payroll, self.payroll.as_slice()),
            (Category::RawMaterial, self.raw_material.as_slice()),
            (Category::Overhead, self.overhead.as_slice()),
            (Category::Other, self.other.as_slice()),
        ]
    }
}

impl Config {
    /// Built-in rules extended with the `[rules]` section.
    pub fn rule_set(&self) -> Result<RuleSet> {
        let mut rules = RuleSet::default();
        for (category, patterns) in self.rules.by_category() {
            if patterns.is_empty() {
                continue;
            }
            rules = rules
                .with_patterns(category, patterns)
                .context("invalid pattern in [rules]")?;
        }
        Ok(rules)
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(extracto_home()?.join("config.toml"))
}

/// `--config` wins over `~/.extracto/config.toml`.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => default_config_path(),
    }
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Write a default config unless one exists. Returns whether a file was written.
pub fn init_config_at(path: &Path) -> Result<bool> {
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(false);
    }
    save_config_to(&Config::default(), path)?;
    println!("Wrote {}", path.display());
    Ok(true)
}
