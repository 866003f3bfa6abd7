use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::target::SheetTarget;

/// Whether the heading line runs along the first row or the first column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Rows,
    Columns,
}

impl Orientation {
    /// Major-dimension name used by the remote API.
    pub fn api_name(self) -> &'static str {
        match self {
            Orientation::Rows => "ROWS",
            Orientation::Columns => "COLUMNS",
        }
    }
}

/// Transcoding switches for one sync session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncOptions {
    pub orientation: Orientation,
    /// Return each cell's display text instead of its typed value.
    #[serde(alias = "formatted_values")]
    pub render_formatted: bool,
    /// Turn headings into identifier-safe keys. Raw headings are still
    /// restored on write.
    pub transform_headings: bool,
}

impl SyncOptions {
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_render_formatted(mut self, render_formatted: bool) -> Self {
        self.render_formatted = render_formatted;
        self
    }

    pub fn with_transform_headings(mut self, transform_headings: bool) -> Self {
        self.transform_headings = transform_headings;
        self
    }
}

/// Target plus options, as loaded from a configuration document.
///
/// ```yaml
/// target:
///   spreadsheet_id: 1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms
///   sheet: Inventory
/// options:
///   orientation: columns
///   transform_headings: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    pub target: SheetTarget,
    #[serde(default)]
    pub options: SyncOptions,
}

impl SyncConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig = serde_yaml::from_str(yaml)?;
        config.target.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig = serde_json::from_str(json)?;
        config.target.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_config_with_defaults() {
        let config = SyncConfig::from_yaml_str(
            "target:\n  spreadsheet_id: abc123\n  range: B2:D9\n",
        )
        .unwrap();
        assert_eq!(config.target.spreadsheet_id, "abc123");
        assert_eq!(config.target.range.as_deref(), Some("B2:D9"));
        assert_eq!(config.options, SyncOptions::default());
    }

    #[test]
    fn json_config_reads_options() {
        let config = SyncConfig::from_json_str(
            r#"{"target":{"spreadsheet_id":"abc"},"options":{"orientation":"columns","formatted_values":true}}"#,
        )
        .unwrap();
        assert_eq!(config.options.orientation, Orientation::Columns);
        assert!(config.options.render_formatted);
        assert!(!config.options.transform_headings);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = SyncConfig::from_yaml_str(
            "target:\n  spreadsheet_id: abc\noptions:\n  apikey: secret\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn empty_spreadsheet_id_is_rejected() {
        let err = SyncConfig::from_yaml_str("target:\n  spreadsheet_id: \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSpreadsheet));
    }
}
