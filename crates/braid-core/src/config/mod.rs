//! Configuration types for braid.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BraidError, BraidResult};
use crate::parent_child::ResolverConfig;
use crate::retrieval::{FusionConfig, FusionStrategy, HybridConfig, TwoPassConfig};

/// Main configuration for the retrieval core.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BraidConfig {
    /// Score fusion used by two-pass stage 1.
    pub fusion: FusionConfig,
    /// Two-pass retrieval settings.
    pub two_pass: TwoPassConfig,
    /// Parent-child resolution settings.
    pub parent_child: ResolverConfig,
    /// Rank-level hybrid retrieval settings.
    pub hybrid: HybridConfig,
}

impl BraidConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> BraidResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| BraidError::Configuration(e.to_string()))
            }
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| BraidError::Configuration(e.to_string())),
            _ => Err(BraidError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        // Fusion configuration
        if let Some(strategy) = lookup("BRAID_FUSION_STRATEGY") {
            match strategy.to_lowercase().parse::<FusionStrategy>() {
                Ok(strategy) => config.fusion.strategy = strategy,
                Err(_) => warn!(value = %strategy, "ignoring unknown BRAID_FUSION_STRATEGY"),
            }
        }
        if let Some(weights) = lookup("BRAID_LINEAR_WEIGHTS") {
            match parse_weights(&weights) {
                Some(pair) => config.fusion.weights = Some(pair),
                None => warn!(value = %weights, "ignoring malformed BRAID_LINEAR_WEIGHTS"),
            }
        }
        if let Some(k) = parsed(&lookup, "BRAID_RRF_K") {
            config.fusion.rrf_k = Some(k);
            config.hybrid.rrf_k = k;
        }

        // Two-pass configuration
        if let Some(top_n) = parsed(&lookup, "BRAID_TOP_N") {
            config.two_pass.top_n = top_n;
        }

        // Parent-child configuration
        if let Some(threshold) = parsed(&lookup, "BRAID_RELEVANCE_THRESHOLD") {
            config.parent_child.threshold = threshold;
        }
        if let Some(child_k) = parsed(&lookup, "BRAID_CHILD_K") {
            config.parent_child.child_k = child_k;
        }
        if let Some(top_n) = parsed(&lookup, "BRAID_RERANK_TOP_N") {
            config.parent_child.rerank_top_n = top_n;
        }

        config
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> BraidConfigBuilder {
        BraidConfigBuilder::default()
    }

    /// Check every section, naming the section that failed.
    pub fn validate(&self) -> BraidResult<()> {
        let sections = [
            ("fusion", self.fusion.validate()),
            ("two_pass", self.two_pass.validate()),
            ("parent_child", self.parent_child.validate()),
            ("hybrid", self.hybrid.validate()),
        ];
        for (section, result) in sections {
            if let Err(reason) = result {
                return Err(BraidError::Configuration(format!("{section}: {reason}")));
            }
        }
        Ok(())
    }

    /// Two-pass settings with stage 1 using the top-level fusion section.
    pub fn two_pass_config(&self) -> TwoPassConfig {
        self.two_pass.clone().with_fusion(self.fusion.clone())
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment value");
            None
        }
    }
}

/// Parse `"w1,w2"`.
fn parse_weights(raw: &str) -> Option<(f32, f32)> {
    let (lexical, semantic) = raw.split_once(',')?;
    Some((lexical.trim().parse().ok()?, semantic.trim().parse().ok()?))
}

/// Builder for BraidConfig.
#[derive(Default)]
pub struct BraidConfigBuilder {
    config: BraidConfig,
}

impl BraidConfigBuilder {
    /// Set fusion configuration.
    pub fn fusion(mut self, config: FusionConfig) -> Self {
        self.config.fusion = config;
        self
    }

    /// Set two-pass configuration.
    pub fn two_pass(mut self, config: TwoPassConfig) -> Self {
        self.config.two_pass = config;
        self
    }

    /// Set parent-child configuration.
    pub fn parent_child(mut self, config: ResolverConfig) -> Self {
        self.config.parent_child = config;
        self
    }

    /// Set hybrid configuration.
    pub fn hybrid(mut self, config: HybridConfig) -> Self {
        self.config.hybrid = config;
        self
    }

    /// Set the relevance threshold.
    pub fn relevance_threshold(mut self, threshold: f32) -> Self {
        self.config.parent_child.threshold = threshold;
        self
    }

    /// Set the two-pass cut.
    pub fn top_n(mut self, top_n: usize) -> Self {
        self.config.two_pass.top_n = top_n;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> BraidConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> BraidConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BraidConfig::from_lookup(|key| vars.get(key).cloned())
    }

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = BraidConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fusion.strategy, FusionStrategy::Linear);
        assert_eq!(config.two_pass.top_n, 5);
        assert_eq!(config.parent_child.threshold, 1.0);
        assert_eq!(config.parent_child.child_k, 5);
        assert_eq!(config.parent_child.rerank_top_n, 2);
        assert_eq!(config.hybrid.rrf_k, 60);
    }

    #[test]
    fn test_from_toml_file() {
        let file = write_config(
            ".toml",
            r#"
[fusion]
strategy = "rrf"
rrf_k = 30

[two_pass]
top_n = 3

[parent_child]
threshold = 0.8
"#,
        );

        let config = BraidConfig::from_file(file.path()).unwrap();

        assert_eq!(config.fusion.strategy, FusionStrategy::Rrf);
        assert_eq!(config.fusion.rrf_k, Some(30));
        assert_eq!(config.two_pass.top_n, 3);
        assert_eq!(config.parent_child.threshold, 0.8);
        assert_eq!(config.parent_child.child_k, 5);
        assert_eq!(config.two_pass_config().fusion.strategy, FusionStrategy::Rrf);
    }

    #[test]
    fn test_from_json_file() {
        let file = write_config(
            ".json",
            r#"{"fusion": {"strategy": "linear", "weights": [0.3, 0.7]}, "hybrid": {"final_k": 8}}"#,
        );

        let config = BraidConfig::from_file(file.path()).unwrap();

        assert_eq!(config.fusion.weights, Some((0.3, 0.7)));
        assert_eq!(config.hybrid.final_k, 8);
        assert_eq!(config.hybrid.top_k_each, 5);
    }

    #[test]
    fn test_from_yaml_file() {
        let file = write_config(".yml", "fusion:\n  strategy: harmonic\nparent_child:\n  child_k: 10\n");

        let config = BraidConfig::from_file(file.path()).unwrap();

        assert_eq!(config.fusion.strategy, FusionStrategy::Harmonic);
        assert_eq!(config.parent_child.child_k, 10);
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let file = write_config(".json", r#"{"fusion": {"strategy": "#);
        let err = BraidConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, BraidError::Serialization(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_config(".ini", "strategy=rrf");
        let err = BraidConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, BraidError::Configuration(_)));
    }

    #[test]
    fn test_from_env() {
        let config = env(&[
            ("BRAID_FUSION_STRATEGY", "MAX"),
            ("BRAID_LINEAR_WEIGHTS", "0.5, 0.5"),
            ("BRAID_RRF_K", "20"),
            ("BRAID_TOP_N", "7"),
            ("BRAID_RELEVANCE_THRESHOLD", "0.75"),
            ("BRAID_CHILD_K", "12"),
            ("BRAID_RERANK_TOP_N", "3"),
        ]);

        assert_eq!(config.fusion.strategy, FusionStrategy::Max);
        assert_eq!(config.fusion.weights, Some((0.5, 0.5)));
        assert_eq!(config.fusion.rrf_k, Some(20));
        assert_eq!(config.hybrid.rrf_k, 20);
        assert_eq!(config.two_pass.top_n, 7);
        assert_eq!(config.parent_child.threshold, 0.75);
        assert_eq!(config.parent_child.child_k, 12);
        assert_eq!(config.parent_child.rerank_top_n, 3);
    }

    #[test]
    fn test_from_env_ignores_garbage() {
        let config = env(&[
            ("BRAID_FUSION_STRATEGY", "borda"),
            ("BRAID_LINEAR_WEIGHTS", "0.5"),
            ("BRAID_TOP_N", "many"),
        ]);
        assert_eq!(config, BraidConfig::default());
    }

    #[test]
    fn test_validate_names_section() {
        let config = BraidConfig::builder().top_n(0).build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("two_pass"));

        let config = BraidConfig::builder()
            .fusion(FusionConfig::linear_weighted(-1.0, 1.0))
            .build();
        assert!(config.validate().is_err());

        let config = BraidConfig::builder().relevance_threshold(f32::NAN).build();
        assert!(config.validate().is_err());
    }
}
