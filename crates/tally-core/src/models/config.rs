//! Configuration structures for the tally pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the tally pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    /// Currency matching configuration.
    pub currency: CurrencyConfig,

    /// Document conversion configuration.
    pub conversion: ConversionConfig,

    /// Interactive review configuration.
    pub review: ReviewConfig,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyConfig::default(),
            conversion: ConversionConfig::default(),
            review: ReviewConfig::default(),
        }
    }
}

/// Currency indicators an amount must carry to be considered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    /// Currency symbol expected next to amounts.
    pub symbol: String,

    /// ISO currency code accepted as an alternative to the symbol.
    pub code: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: "€".to_string(),
            code: "EUR".to_string(),
        }
    }
}

/// Document conversion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Minimum non-whitespace characters for extracted text to count as readable.
    pub min_text_chars: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self { min_text_chars: 1 }
    }
}

/// Interactive review configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Open documents in the system viewer during review.
    pub open_viewer: bool,

    /// Viewer program to use instead of the platform default.
    pub viewer: Option<String>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            open_viewer: true,
            viewer: None,
        }
    }
}

impl TallyConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = TallyConfig::default();
        assert_eq!(config.currency.symbol, "€");
        assert_eq!(config.currency.code, "EUR");
        assert_eq!(config.conversion.min_text_chars, 1);
        assert!(config.review.open_viewer);
        assert!(config.review.viewer.is_none());
    }

    #[test]
    fn test_config_json_round_trip() {
        let mut config = TallyConfig::default();
        config.currency.symbol = "$".to_string();
        config.currency.code = "USD".to_string();
        config.review.open_viewer = false;

        let json = serde_json::to_string_pretty(&config).unwrap();
        let restored: TallyConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.currency.symbol, "$");
        assert_eq!(restored.currency.code, "USD");
        assert!(!restored.review.open_viewer);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{"currency": {"symbol": "zł"}}"#;
        let config: TallyConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.currency.symbol, "zł");
        // Fields absent from the file fall back to their defaults.
        assert_eq!(config.currency.code, "EUR");
        assert_eq!(config.conversion.min_text_chars, 1);
    }
}
