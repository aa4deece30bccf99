use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::locator::DEFAULT_FALLBACK_PREFIX_CHARS;
use crate::recommendation::RecommendationThresholds;

/// Engine settings. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Characters of an excerpt retried when the whole excerpt is not found
    pub fallback_prefix_chars: usize,
    /// Start comments with a `[Re: '...']` quote of the anchored text
    pub prefix_comments: bool,
    pub thresholds: RecommendationThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fallback_prefix_chars: DEFAULT_FALLBACK_PREFIX_CHARS,
            prefix_comments: true,
            thresholds: RecommendationThresholds::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config =
            EngineConfig::from_json(r#"{"fallback_prefix_chars": 80, "thresholds": {"high_acceptance_rate": 0.6}}"#)
                .unwrap();
        assert_eq!(config.fallback_prefix_chars, 80);
        assert!(config.prefix_comments);
        assert_eq!(config.thresholds.high_acceptance_rate, 0.6);
        assert_eq!(config.thresholds.low_acceptance_rate, 0.30);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }
}
