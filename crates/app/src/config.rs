//! Runtime configuration: TOML file, then environment, then flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use services::DEFAULT_AREAS_FILE;

pub const DEFAULT_CONFIG_FILE: &str = "quiz.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuizConfig {
    /// Serve assets over HTTP from here instead of reading `data_dir`.
    pub base_url: Option<String>,
    pub data_dir: PathBuf,
    pub areas_file: String,
    pub db_url: String,
    /// Fixed seed for reproducible orderings.
    pub seed: Option<u64>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            data_dir: PathBuf::from("./public"),
            areas_file: DEFAULT_AREAS_FILE.to_string(),
            db_url: "sqlite://quiz.sqlite3".to_string(),
            seed: None,
        }
    }
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub areas_file: Option<String>,
    pub db_url: Option<String>,
    pub seed: Option<u64>,
}

impl QuizConfig {
    /// Read `path`, or `quiz.toml` in the working directory when no path is
    /// given and that file exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `QUIZ_*` variables as returned by `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("QUIZ_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.base_url = Some(url);
        }
        if let Some(dir) = lookup("QUIZ_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("QUIZ_AREAS_FILE") {
            self.areas_file = file;
        }
        if let Some(url) = lookup("QUIZ_DB_URL") {
            self.db_url = url;
        }
        if let Some(seed) = lookup("QUIZ_SEED") {
            let parsed = seed
                .trim()
                .parse()
                .with_context(|| format!("QUIZ_SEED is not a number: {seed}"))?;
            self.seed = Some(parsed);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if overrides.base_url.is_some() {
            self.base_url = overrides.base_url;
        }
        if let Some(dir) = overrides.data_dir {
            self.data_dir = dir;
        }
        if let Some(file) = overrides.areas_file {
            self.areas_file = file;
        }
        if let Some(url) = overrides.db_url {
            self.db_url = url;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = QuizConfig::from_toml("data_dir = \"assets\"\nseed = 42\n").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("assets"));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.areas_file, "areas.json");
        assert_eq!(config.db_url, "sqlite://quiz.sqlite3");
        assert!(config.base_url.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(QuizConfig::from_toml("colour = \"blue\"").is_err());
    }

    #[test]
    fn env_then_flags_win() {
        let env: HashMap<&str, &str> = [
            ("QUIZ_BASE_URL", "https://quiz.example.org/"),
            ("QUIZ_DB_URL", "sqlite::memory:"),
            ("QUIZ_SEED", "7"),
        ]
        .into_iter()
        .collect();
        let mut config = QuizConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| (*v).to_string()))
            .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://quiz.example.org/"));
        assert_eq!(config.db_url, "sqlite::memory:");
        assert_eq!(config.seed, Some(7));

        config.apply_overrides(Overrides {
            seed: Some(9),
            areas_file: Some("areas-es.json".into()),
            ..Overrides::default()
        });
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.areas_file, "areas-es.json");
        assert_eq!(config.db_url, "sqlite::memory:");
    }

    #[test]
    fn bad_seed_in_env_is_an_error() {
        let mut config = QuizConfig::default();
        let result = config.apply_env(|key| (key == "QUIZ_SEED").then(|| "soon".to_string()));
        assert!(result.is_err());
    }
}
