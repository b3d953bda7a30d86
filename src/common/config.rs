use std::path::{Path, PathBuf};

use anyhow::bail;
use serde::{Deserialize, Serialize};

pub fn data_dir() -> PathBuf { dirs::home_dir().unwrap().join(".accshift") }
pub fn config_file() -> PathBuf {
    dirs::home_dir().unwrap().join(".config").join("accshift").join("config.toml")
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    settings: Settings,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Pointer gesture tuning.
    #[serde(default)]
    pub drag: DragSettings,
    /// Card grid geometry used when laying out item slots.
    #[serde(default)]
    pub grid: GridSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct DragSettings {
    /// Cumulative pointer travel (|dx| + |dy|, in px) before a press turns
    /// into a drag instead of a click.
    #[serde(default = "default_drag_threshold")]
    pub threshold: f64,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            threshold: default_drag_threshold(),
        }
    }
}

impl DragSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.threshold.is_finite() || self.threshold < 0.0 {
            issues.push(format!(
                "drag.threshold must be a non-negative number, got {}",
                self.threshold
            ));
        }

        issues
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct GridSettings {
    /// Width of one card slot in px.
    #[serde(default = "default_card_width")]
    pub card_width: f64,
    /// Horizontal and vertical spacing between card slots in px.
    #[serde(default = "default_card_gap")]
    pub gap: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            card_width: default_card_width(),
            gap: default_card_gap(),
        }
    }
}

impl GridSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.card_width.is_finite() || self.card_width <= 0.0 {
            issues.push(format!(
                "grid.card_width must be a positive number, got {}",
                self.card_width
            ));
        }
        if !self.gap.is_finite() || self.gap < 0.0 {
            issues.push(format!(
                "grid.gap must be non-negative, got {}",
                self.gap
            ));
        }

        issues
    }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        issues.extend(self.drag.validate());
        issues.extend(self.grid.validate());
        issues
    }
}

fn default_drag_threshold() -> f64 { 5.0 }

fn default_card_width() -> f64 { 100.0 }

fn default_card_gap() -> f64 { 10.0 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn default() -> Config {
        Self::parse(include_str!("../../accshift.default.toml")).unwrap()
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }

    /// Render the effective configuration back out as TOML.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        let config_file = ConfigFile {
            settings: self.settings.clone(),
        };
        Ok(toml::to_string_pretty(&config_file)?)
    }

    fn parse(buf: &str) -> anyhow::Result<Config> {
        match toml::from_str::<ConfigFile>(buf) {
            Ok(c) => Ok(Config {
                settings: c.settings,
            }),
            Err(e) => bail!("{e}"),
        }
    }
}
