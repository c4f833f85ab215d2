//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.evaldash.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::models::RatingScale;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data-source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Rating-scale settings.
    #[serde(default)]
    pub scale: ScaleConfig,

    /// Survey form identifiers, one per year group.
    #[serde(default = "default_forms")]
    pub forms: BTreeMap<String, String>,

    /// Color palette for score banding and charts.
    #[serde(default)]
    pub colors: ColorsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            source: SourceConfig::default(),
            scale: ScaleConfig::default(),
            forms: default_forms(),
            colors: ColorsConfig::default(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// School-year label shown on every report.
    #[serde(default = "default_school_year")]
    pub school_year: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            school_year: default_school_year(),
            verbose: false,
        }
    }
}

fn default_school_year() -> String {
    "2025/2026".to_string()
}

/// Data-source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Published sheet feed URL. Optional; without it (and without CLI
    /// overrides) the dashboard runs on the built-in sample dataset.
    #[serde(default)]
    pub sheet_url: Option<String>,

    /// Fetch timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sheet_url: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Rating-scale settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleConfig {
    /// Lowest valid rating.
    #[serde(default = "default_scale_min")]
    pub min: i64,

    /// Highest valid rating.
    #[serde(default = "default_scale_max")]
    pub max: i64,

    /// One label per level, lowest first.
    #[serde(default = "default_scale_labels")]
    pub labels: Vec<String>,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            min: default_scale_min(),
            max: default_scale_max(),
            labels: default_scale_labels(),
        }
    }
}

impl ScaleConfig {
    /// Build the typed scale the aggregator works with.
    pub fn rating_scale(&self) -> RatingScale {
        RatingScale {
            min: self.min,
            max: self.max,
            labels: self.labels.clone(),
        }
    }
}

fn default_scale_min() -> i64 {
    1
}

fn default_scale_max() -> i64 {
    4
}

fn default_scale_labels() -> Vec<String> {
    ["Poor", "Fair", "Good", "Excellent"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_forms() -> BTreeMap<String, String> {
    [
        ("Year 4-5", "14GerLJ3FhRKvYqAE8DZVWboKcjugoHOuzq5iYg_ap5I"),
        ("Year 6", "1CaerPP3noIXpDf2Amk8LXxl3A0YDd4Z7wUus2THUEZ0"),
        ("Year 7", "1Vaf3rP3Ms3vs7Ifd7hGTblxJ9TayBDZYfqxjysqI73E"),
        ("Year 8", "1g3Hdld6UTPJITtEb3bDRXtaNm7AgKCuXQyz_m6UOg7A"),
        ("Year 9", "1ZoLaSPbwHjoFreuEun7I7kw0rsq8LviAQ75z9vJ5CEo"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Color palette for score banding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorsConfig {
    /// Accent color for headers and bar charts.
    #[serde(default = "default_primary")]
    pub primary: String,

    /// Secondary accent color.
    #[serde(default = "default_secondary")]
    pub secondary: String,

    /// One color per rating level, lowest first.
    #[serde(default = "default_rating_colors")]
    pub ratings: Vec<String>,

    /// Color for averages in the high band.
    #[serde(default = "default_band_high")]
    pub band_high: String,

    /// Color for averages in the mid band.
    #[serde(default = "default_band_mid")]
    pub band_mid: String,

    /// Color for averages in the low band.
    #[serde(default = "default_band_low")]
    pub band_low: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
            ratings: default_rating_colors(),
            band_high: default_band_high(),
            band_mid: default_band_mid(),
            band_low: default_band_low(),
        }
    }
}

fn default_primary() -> String {
    "#667eea".to_string()
}

fn default_secondary() -> String {
    "#764ba2".to_string()
}

fn default_rating_colors() -> Vec<String> {
    ["#ff4444", "#ffbb33", "#00C851", "#33b5e5"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_band_high() -> String {
    "#00C851".to_string()
}

fn default_band_mid() -> String {
    "#ffbb33".to_string()
}

fn default_band_low() -> String {
    "#ff4444".to_string()
}

impl ColorsConfig {
    /// Color for a score band.
    pub fn band_color(&self, band: crate::models::ScoreBand) -> &str {
        match band {
            crate::models::ScoreBand::High => &self.band_high,
            crate::models::ScoreBand::Mid => &self.band_mid,
            crate::models::ScoreBand::Low => &self.band_low,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".evaldash.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref sheet) = args.sheet {
            self.source.sheet_url = Some(sheet.clone());
        }

        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check the merged configuration is usable.
    pub fn validate(&self) -> Result<()> {
        self.scale
            .rating_scale()
            .validate()
            .map_err(anyhow::Error::msg)?;

        if self.source.timeout_seconds == 0 {
            anyhow::bail!("source.timeout_seconds must be at least 1");
        }

        if !self.colors.ratings.is_empty()
            && self.colors.ratings.len() != self.scale.rating_scale().span()
        {
            anyhow::bail!(
                "colors.ratings has {} entries but the scale has {} levels",
                self.colors.ratings.len(),
                self.scale.rating_scale().span()
            );
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.school_year, "2025/2026");
        assert_eq!(config.scale.min, 1);
        assert_eq!(config.scale.max, 4);
        assert_eq!(config.source.timeout_seconds, 30);
        assert!(config.forms.contains_key("Year 6"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
school_year = "2026/2027"

[source]
sheet_url = "https://docs.google.com/spreadsheets/d/e/SHEET-ID/pub?output=json"
timeout_seconds = 10

[scale]
min = 1
max = 5
labels = ["Poor", "Fair", "Good", "Very Good", "Excellent"]

[forms]
"Year 6" = "form-id-year-6"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.school_year, "2026/2027");
        assert_eq!(config.source.timeout_seconds, 10);
        assert_eq!(config.scale.max, 5);
        assert_eq!(config.scale.labels.len(), 5);
        assert_eq!(
            config.forms.get("Year 6").map(String::as_str),
            Some("form-id-year-6")
        );
    }

    #[test]
    fn test_validate_rejects_label_mismatch() {
        let toml_content = r#"
[scale]
min = 1
max = 5
"#;
        // Default labels cover four levels, the scale five.
        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_color_mismatch() {
        let mut config = Config::default();
        config.colors.ratings.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[source]"));
        assert!(toml_str.contains("[scale]"));
        assert!(toml_str.contains("[colors]"));
    }
}
