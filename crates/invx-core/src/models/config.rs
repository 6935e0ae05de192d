//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::invoice::template::KnownTemplate;

/// Main configuration for invx.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvxConfig {
    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Repair common OCR token merges before classifying lines.
    pub apply_ocr_repairs: bool,

    /// Run the known-template override stage. Off unless explicitly enabled.
    pub enable_template_override: bool,

    /// Words that mark a line as an address rather than an item row.
    pub address_keywords: Vec<String>,

    /// Known templates consulted by the override stage.
    pub templates: Vec<KnownTemplate>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            apply_ocr_repairs: true,
            enable_template_override: false,
            address_keywords: default_address_keywords(),
            templates: vec![KnownTemplate::east_repair_sample()],
        }
    }
}

/// Default address denylist used by the line item parser.
pub fn default_address_keywords() -> Vec<String> {
    [
        "street", "st", "avenue", "ave", "road", "rd", "lane", "ln", "drive", "dr", "court",
        "ct", "square", "sq", "boulevard", "blvd", "suite", "apt", "highway", "hwy", "p.o. box",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format name (json, csv, text).
    pub format: String,

    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

impl InvxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: InvxConfig =
            serde_json::from_str(r#"{"extraction": {"enable_template_override": true}}"#).unwrap();
        assert!(config.extraction.enable_template_override);
        assert!(config.extraction.apply_ocr_repairs);
        assert!(config.extraction.address_keywords.iter().any(|k| k == "square"));
        assert_eq!(config.output.format, "json");
    }

    #[test]
    fn test_template_override_off_by_default() {
        let config = InvxConfig::default();
        assert!(!config.extraction.enable_template_override);
        assert_eq!(config.extraction.templates.len(), 1);
    }
}
