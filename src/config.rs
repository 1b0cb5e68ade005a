//! Explorer configuration
//!
//! Defaults match the stock explorer: top 10 shareholders, percentage slider
//! capped at 50, top 20 influential shareholders, top 10 holders in details.

use crate::filter::TopN;
use crate::search::HighlightMarker;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {field} = {value} is out of range")]
    OutOfRange { field: &'static str, value: String },
}

/// Explorer configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Top-N applied in automatic mode until the user changes it
    pub default_top_n: TopN,
    /// Upper bound of the minimum-percentage control
    pub min_percentage_ceiling: f64,
    /// Rows in the influential-shareholder ranking
    pub top_influential_limit: usize,
    /// Holders listed in company details
    pub details_holder_limit: usize,
    pub highlight: HighlightMarker,
    /// Select the first company once the dataset is loaded
    pub select_first_company: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            default_top_n: TopN::default(),
            min_percentage_ceiling: 50.0,
            top_influential_limit: 20,
            details_holder_limit: 10,
            highlight: HighlightMarker::default(),
            select_first_company: true,
        }
    }
}

impl ExplorerConfig {
    /// Parse and validate a YAML document; missing keys take their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.min_percentage_ceiling) {
            return Err(ConfigError::OutOfRange {
                field: "min_percentage_ceiling",
                value: self.min_percentage_ceiling.to_string(),
            });
        }
        if self.top_influential_limit == 0 {
            return Err(ConfigError::OutOfRange {
                field: "top_influential_limit",
                value: "0".to_string(),
            });
        }
        if self.details_holder_limit == 0 {
            return Err(ConfigError::OutOfRange {
                field: "details_holder_limit",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExplorerConfig::default();
        assert_eq!(config.default_top_n.limit(), Some(10));
        assert_eq!(config.min_percentage_ceiling, 50.0);
        assert_eq!(config.top_influential_limit, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let config = ExplorerConfig::from_yaml_str(
            "default_top_n: all\nhighlight:\n  open: '**'\n  close: '**'\n",
        )
        .unwrap();

        assert_eq!(config.default_top_n, TopN::Unbounded);
        assert_eq!(config.highlight.open, "**");
        assert_eq!(config.details_holder_limit, 10);
    }

    #[test]
    fn test_out_of_range() {
        let err = ExplorerConfig::from_yaml_str("min_percentage_ceiling: 150").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "min_percentage_ceiling", .. }));

        let err = ExplorerConfig::from_yaml_str("top_influential_limit: 0").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn test_bad_top_n() {
        assert!(matches!(
            ExplorerConfig::from_yaml_str("default_top_n: 0"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
