//! Configuration loader - YAML dataset registry + .env settings

use serde::{Deserialize, Serialize};
use std::path::Path;
use anyhow::Result;

use crate::color::{default_palette, Color};
use crate::layout::LayoutConfig;

const FCC_BASE: &str = "https://cdn.freecodecamp.org/testable-projects-fcc/data/tree_map";

/// Main configuration, loaded from datasets.yaml or built in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub datasets: Vec<Dataset>,
    pub default_dataset: String,
    pub canvas: LayoutConfig,
    pub palette: Vec<Color>,
}

/// A single entry of the dataset registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub key: String,
    pub url: String,
}

/// Settings loaded from .env
#[derive(Debug, Clone)]
pub struct Env {
    pub port: u16,
    pub log_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        let dataset = |key: &str, file: &str| Dataset {
            key: key.to_string(),
            url: format!("{}/{}", FCC_BASE, file),
        };

        Self {
            datasets: vec![
                dataset("kickstarter", "kickstarter-funding-data.json"),
                dataset("movies", "movie-data.json"),
                dataset("videogames", "video-game-sales-data.json"),
            ],
            default_dataset: "movies".to_string(),
            canvas: LayoutConfig::default(),
            palette: default_palette(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// The registry must be non-empty and contain the default key
    pub fn validate(&self) -> Result<()> {
        if self.datasets.is_empty() {
            anyhow::bail!("No datasets configured");
        }
        if self.dataset(&self.default_dataset).is_none() {
            anyhow::bail!("Default dataset '{}' is not in the registry", self.default_dataset);
        }
        if self.canvas.width <= 0.0 || self.canvas.height <= 0.0 {
            anyhow::bail!("Canvas must have a positive size");
        }
        Ok(())
    }

    /// Get dataset by key
    pub fn dataset(&self, key: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.key == key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.datasets.iter().map(|d| d.key.as_str()).collect()
    }
}

impl Env {
    /// Load settings from .env file and the process environment
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Env {
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            log_dir: std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let config = Config::default();
        assert_eq!(config.keys(), vec!["kickstarter", "movies", "videogames"]);
        assert_eq!(config.default_dataset, "movies");
        assert!(config.dataset("movies").unwrap().url.ends_with("/movie-data.json"));
        assert_eq!(config.palette.len(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r##"
datasets:
  - key: board-games
    url: https://example.com/board-games.json
default_dataset: board-games
palette: ["#000000", "#ffffff"]
"##;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.canvas, LayoutConfig::default());
        assert_eq!(config.palette[1], Color::rgb(255, 255, 255));
    }

    #[test]
    fn test_missing_default_is_rejected() {
        let config = Config {
            default_dataset: "books".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
