//! Estimator Configuration - Lumber Catalog and Defaults
//!
//! The lumber catalog is fixed once loaded; sessions never add lumber types.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::model::{CutList, FinancialParameters, LumberCutList, LumberType};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate lumber type: {0}")]
    DuplicateLumber(String),

    #[error("Lumber type key must not be empty")]
    EmptyLumberKey,

    #[error("Config requires engine >= {0}, current is {1}")]
    EngineVersionMismatch(String, String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LumberSpec {
    pub key: LumberType,
    pub description: String,
    #[serde(default)]
    pub unit_price: f64,
}

impl LumberSpec {
    fn stock(key: &str, description: &str, unit_price: f64) -> Self {
        Self {
            key: LumberType::new(key),
            description: description.to_string(),
            unit_price,
        }
    }

    /// An empty cut list priced from this catalog entry.
    pub fn empty_cut_list(&self) -> LumberCutList {
        LumberCutList {
            lumber: self.key.clone(),
            list: CutList {
                description: self.description.clone(),
                unit_price: self.unit_price,
                rows: vec![],
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EstimatorConfig {
    #[serde(default = "default_min_version")]
    pub engine_min_version: String,
    #[serde(default = "default_lumber")]
    pub lumber: Vec<LumberSpec>,
    #[serde(default)]
    pub financials: FinancialParameters,
}

fn default_min_version() -> String {
    crate::MIN_CONFIG_ENGINE_VERSION.to_string()
}

fn default_lumber() -> Vec<LumberSpec> {
    vec![
        LumberSpec::stock("2x4", "2x4 Lumber (8 feet each)", 3.93),
        LumberSpec::stock("1x5", "1x4 Lumber (8 feet each)", 3.58),
        LumberSpec::stock("2x8", "2x8 Lumber (8 feet each)", 5.00),
    ]
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            engine_min_version: default_min_version(),
            lumber: default_lumber(),
            financials: FinancialParameters::default(),
        }
    }
}

impl EstimatorConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), lumber = config.lumber.len(), "loaded estimator config");
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        self.check_engine_version()?;

        let mut seen = HashSet::new();
        for spec in &self.lumber {
            if spec.key.as_str().trim().is_empty() {
                return Err(ConfigError::EmptyLumberKey);
            }
            if !seen.insert(spec.key.as_str()) {
                return Err(ConfigError::DuplicateLumber(spec.key.to_string()));
            }
        }
        Ok(())
    }

    fn check_engine_version(&self) -> Result<(), ConfigError> {
        let engine_ver = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| ConfigError::InvalidVersion(ENGINE_VERSION.to_string()))?;
        let min_ver = semver::Version::parse(&self.engine_min_version)
            .map_err(|_| ConfigError::InvalidVersion(self.engine_min_version.clone()))?;

        if engine_ver < min_ver {
            return Err(ConfigError::EngineVersionMismatch(
                self.engine_min_version.clone(),
                ENGINE_VERSION.to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let config = EstimatorConfig::default();
        let keys: Vec<_> = config.lumber.iter().map(|spec| spec.key.as_str()).collect();
        assert_eq!(keys, vec!["2x4", "1x5", "2x8"]);
        assert_eq!(config.financials.sales_tax_rate, 13.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EstimatorConfig::from_json(r#"{"financials": {"profitMargin": 10, "salesTaxRate": 5, "shippingCost": 0}}"#).unwrap();
        assert_eq!(config.lumber.len(), 3);
        assert_eq!(config.financials.profit_margin, 10.0);
    }

    #[test]
    fn test_partial_financials_keep_defaults() {
        let config = EstimatorConfig::from_json(r#"{"financials": {"profitMargin": 10}}"#).unwrap();
        assert_eq!(config.financials.profit_margin, 10.0);
        assert_eq!(config.financials.sales_tax_rate, 13.0);
        assert_eq!(config.financials.shipping_cost, 5.0);
    }

    #[test]
    fn test_duplicate_lumber_rejected() {
        let json = r#"{"lumber": [
            {"key": "2x4", "description": "a", "unitPrice": 1},
            {"key": "2x4", "description": "b", "unitPrice": 2}
        ]}"#;
        let err = EstimatorConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateLumber(ref k) if k == "2x4"));
    }

    #[test]
    fn test_empty_key_rejected() {
        let json = r#"{"lumber": [{"key": " ", "description": "a"}]}"#;
        assert!(matches!(EstimatorConfig::from_json(json), Err(ConfigError::EmptyLumberKey)));
    }

    #[test]
    fn test_newer_engine_required() {
        let err = EstimatorConfig::from_json(r#"{"engineMinVersion": "99.0.0"}"#).unwrap_err();
        assert!(err.to_string().contains("requires engine >= 99.0.0"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("estimator.json");
        fs::write(&path, r#"{"lumber": [{"key": "4x4", "description": "Posts", "unitPrice": 12.5}]}"#).unwrap();

        let config = EstimatorConfig::load_from_file(&path).unwrap();
        assert_eq!(config.lumber.len(), 1);
        assert_eq!(config.lumber[0].key, LumberType::new("4x4"));
        assert_eq!(config.lumber[0].unit_price, 12.5);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EstimatorConfig::load_from_file(Path::new("/nonexistent/estimator.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
