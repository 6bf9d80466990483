use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{BenchError, Result};
use crate::similarity::MISSING_PRICE_SCORE;

/// Global menubench configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of analyses kept in history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Scoring weights and match thresholds
    #[serde(default)]
    pub scoring: ScoringPolicy,

    /// Bounds on candidate mining
    #[serde(default)]
    pub extraction: ExtractionLimits,

    /// Page download settings
    #[serde(default)]
    pub fetch: FetchSettings,
}

/// Weights of each similarity signal. They must be non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub name_jaccard: f64,
    pub name_dice: f64,
    pub name_edit: f64,
    pub description_jaccard: f64,
    pub cross_signal: f64,
    pub containment: f64,
    pub price: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            name_jaccard: 0.30,
            name_dice: 0.20,
            name_edit: 0.16,
            description_jaccard: 0.12,
            cross_signal: 0.12,
            containment: 0.05,
            price: 0.05,
        }
    }
}

impl Weights {
    fn as_array(&self) -> [(&'static str, f64); 7] {
        [
            ("name_jaccard", self.name_jaccard),
            ("name_dice", self.name_dice),
            ("name_edit", self.name_edit),
            ("description_jaccard", self.description_jaccard),
            ("cross_signal", self.cross_signal),
            ("containment", self.containment),
            ("price", self.price),
        ]
    }

    pub fn total(&self) -> f64 {
        self.as_array().iter().map(|(_, w)| w).sum()
    }
}

/// How pairs are scored and banded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Price similarity used when either price is unknown
    pub missing_price_score: f64,
    /// Minimum score for a Match
    pub match_threshold: f64,
    /// Minimum score for a PartialMatch
    pub partial_threshold: f64,
    pub weights: Weights,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            missing_price_score: MISSING_PRICE_SCORE,
            match_threshold: 0.50,
            partial_threshold: 0.30,
            weights: Weights::default(),
        }
    }
}

/// Caps that bound extraction cost on pathological pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionLimits {
    pub max_candidates: usize,
    pub max_blocks: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_candidates: 80,
            max_blocks: 900,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Pages larger than this are refused
    pub max_body_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: "Atomic Benchmark Bot".to_string(),
            timeout_secs: 30,
            max_body_bytes: 5 * 1024 * 1024,
        }
    }
}

fn default_history_limit() -> usize {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            scoring: ScoringPolicy::default(),
            extraction: ExtractionLimits::default(),
            fetch: FetchSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| BenchError::ConfigError(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Reject policies that would break the score invariants
    pub fn validate(&self) -> Result<()> {
        let weights = &self.scoring.weights;
        for (name, weight) in weights.as_array() {
            if !(weight >= 0.0) {
                return Err(BenchError::ConfigError(format!(
                    "weight '{}' must be non-negative, got {}",
                    name, weight
                )));
            }
        }

        let total = weights.total();
        if (total - 1.0).abs() > 1e-6 {
            return Err(BenchError::ConfigError(format!(
                "scoring weights must sum to 1, got {:.4}",
                total
            )));
        }

        let policy = &self.scoring;
        if !(0.0..=1.0).contains(&policy.missing_price_score) {
            return Err(BenchError::ConfigError(
                "missing_price_score must be between 0 and 1".into(),
            ));
        }
        if policy.partial_threshold > policy.match_threshold {
            return Err(BenchError::ConfigError(format!(
                "partial_threshold ({}) is above match_threshold ({})",
                policy.partial_threshold, policy.match_threshold
            )));
        }

        if self.extraction.max_candidates == 0 {
            return Err(BenchError::ConfigError("max_candidates must be at least 1".into()));
        }

        Ok(())
    }

    /// Get the config file path
    ///
    /// Supports MENUBENCH_CONFIG environment variable override
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("MENUBENCH_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "menubench")
            .ok_or_else(|| BenchError::ConfigError("Could not determine config directory".into()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "menubench")
            .ok_or_else(|| BenchError::ConfigError("Could not determine data directory".into()))?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Get the database path
    ///
    /// Supports MENUBENCH_DB environment variable for test isolation
    pub fn db_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("MENUBENCH_DB") {
            return Ok(PathBuf::from(path));
        }
        Ok(Self::data_dir()?.join("menubench.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.extraction.max_candidates, 80);
        assert_eq!(config.scoring.missing_price_score, 0.25);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((Weights::default().total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [scoring]
            missing_price_score = 0.1

            [extraction]
            max_candidates = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.scoring.missing_price_score, 0.1);
        assert_eq!(config.scoring.match_threshold, 0.5);
        assert_eq!(config.extraction.max_candidates, 20);
        assert_eq!(config.extraction.max_blocks, 900);
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.fetch.user_agent, "Atomic Benchmark Bot");
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_weights() {
        let mut config = Config::default();
        config.scoring.weights.price = 0.5;
        assert!(matches!(config.validate(), Err(BenchError::ConfigError(_))));

        let mut config = Config::default();
        config.scoring.weights.price = -0.05;
        config.scoring.weights.containment = 0.15;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip_keeps_defaults() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.scoring, ScoringPolicy::default());
        assert_eq!(parsed.history_limit, 100);
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut config = Config::default();
        config.scoring.partial_threshold = 0.6;
        assert!(config.validate().is_err());
    }
}
