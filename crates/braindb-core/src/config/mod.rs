//! Configuration system for braindb.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::chunker::ChunkerConfig;
use crate::error::{BrainError, BrainResult};
use crate::graph::GraphConfig;
use crate::recall::RecallConfig;
use crate::retrieval::RetrievalConfig;
use crate::validation::ValidationConfig;

/// Main braindb configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    /// Chunking thresholds.
    pub chunker: ChunkerConfig,
    /// Input limits.
    pub validation: ValidationConfig,
    /// Link behaviour.
    pub graph: GraphConfig,
    /// Relevance weights.
    pub retrieval: RetrievalConfig,
    /// Recall prompts.
    pub recall: RecallConfig,
    /// Path to the SQLite database used by persistent stores.
    pub db_path: PathBuf,
}

impl Default for BrainConfig {
    fn default() -> Self {
        let braindb_dir = dirs::home_dir()
            .map(|h| h.join(".braindb"))
            .unwrap_or_else(|| PathBuf::from(".braindb"));

        Self {
            chunker: ChunkerConfig::default(),
            validation: ValidationConfig::default(),
            graph: GraphConfig::default(),
            retrieval: RetrievalConfig::default(),
            recall: RecallConfig::default(),
            db_path: braindb_dir.join("braindb.db"),
        }
    }
}

impl BrainConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> BrainResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| BrainError::Configuration(e.to_string()))
            }
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| BrainError::Configuration(e.to_string()))
            }
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| BrainError::Configuration(e.to_string()))
            }
            _ => Err(BrainError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `BRAINDB_DB_PATH`, `BRAINDB_MAX_INPUT_LENGTH` and
    /// `BRAINDB_CASCADE_SYMMETRIC_REMOVAL`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("BRAINDB_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Some(value) = lookup("BRAINDB_MAX_INPUT_LENGTH") {
            match value.trim().parse() {
                Ok(max) => config.validation.max_length = max,
                Err(_) => warn!(value = %value, "Ignoring invalid BRAINDB_MAX_INPUT_LENGTH"),
            }
        }

        if let Some(value) = lookup("BRAINDB_CASCADE_SYMMETRIC_REMOVAL") {
            match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => config.graph.cascade_symmetric_removal = true,
                "0" | "false" | "no" => config.graph.cascade_symmetric_removal = false,
                _ => warn!(value = %value, "Ignoring invalid BRAINDB_CASCADE_SYMMETRIC_REMOVAL"),
            }
        }

        config
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> BrainConfigBuilder {
        BrainConfigBuilder::default()
    }
}

/// Builder for BrainConfig.
#[derive(Default)]
pub struct BrainConfigBuilder {
    config: BrainConfig,
}

impl BrainConfigBuilder {
    pub fn chunker(mut self, config: ChunkerConfig) -> Self {
        self.config.chunker = config;
        self
    }

    pub fn validation(mut self, config: ValidationConfig) -> Self {
        self.config.validation = config;
        self
    }

    pub fn graph(mut self, config: GraphConfig) -> Self {
        self.config.graph = config;
        self
    }

    pub fn retrieval(mut self, config: RetrievalConfig) -> Self {
        self.config.retrieval = config;
        self
    }

    pub fn recall(mut self, config: RecallConfig) -> Self {
        self.config.recall = config;
        self
    }

    /// Set database path.
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.db_path = path.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> BrainConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = BrainConfig::default();
        assert_eq!(config.chunker.under_chunk_word_limit, 30);
        assert_eq!(config.chunker.over_chunk_word_limit, 5);
        assert_eq!(config.validation.max_length, 10_000);
        assert!(config.graph.cascade_symmetric_removal);
        assert_eq!(config.retrieval.pin_score, 999);
        assert_eq!(config.recall.default_prompt_count, 3);
        assert!(config.db_path.ends_with(".braindb/braindb.db"));
    }

    #[test]
    fn test_from_toml_file_partial() {
        let file = write_config(
            ".toml",
            "db_path = \"/tmp/brain.db\"\n\n[chunker]\nunder_chunk_word_limit = 40\n",
        );
        let config = BrainConfig::from_file(file.path()).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/brain.db"));
        assert_eq!(config.chunker.under_chunk_word_limit, 40);
        assert_eq!(config.chunker.over_chunk_word_limit, 5);
        assert_eq!(config.retrieval, RetrievalConfig::default());
    }

    #[test]
    fn test_from_json_and_yaml_files() {
        let file = write_config(".json", r#"{"graph": {"cascade_symmetric_removal": false}}"#);
        let config = BrainConfig::from_file(file.path()).unwrap();
        assert!(!config.graph.cascade_symmetric_removal);

        let file = write_config(".yaml", "recall:\n  default_prompt_count: 7\n");
        let config = BrainConfig::from_file(file.path()).unwrap();
        assert_eq!(config.recall.default_prompt_count, 7);
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let file = write_config(".ini", "x=1");
        let err = BrainConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, BrainError::Configuration(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("BRAINDB_DB_PATH", "/data/b.db"),
            ("BRAINDB_MAX_INPUT_LENGTH", "500"),
            ("BRAINDB_CASCADE_SYMMETRIC_REMOVAL", "false"),
        ]);
        let config = BrainConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.db_path, PathBuf::from("/data/b.db"));
        assert_eq!(config.validation.max_length, 500);
        assert!(!config.graph.cascade_symmetric_removal);
    }

    #[test]
    fn test_env_ignores_bad_values() {
        let config = BrainConfig::from_lookup(|k| match k {
            "BRAINDB_MAX_INPUT_LENGTH" => Some("lots".to_string()),
            "BRAINDB_CASCADE_SYMMETRIC_REMOVAL" => Some("maybe".to_string()),
            _ => None,
        });
        assert_eq!(config.validation.max_length, 10_000);
        assert!(config.graph.cascade_symmetric_removal);
    }

    #[test]
    fn test_builder() {
        let config = BrainConfig::builder()
            .db_path("/tmp/x.db")
            .recall(RecallConfig {
                default_prompt_count: 5,
            })
            .build();
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.recall.default_prompt_count, 5);
    }
}
