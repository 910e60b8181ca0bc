//! Startup configuration.
//!
//! Loaded once, before the first frame. Every field has a default, so a config
//! file only needs the keys it changes:
//!
//! ```toml
//! [context]
//! min_batch_size = 32
//!
//! [style]
//! rounding = 0.0
//! spacing = { x = 4.0, y = 4.0 }
//! ```

use crate::error::UiResult;
use crate::style::Style;
use glint_core::state::DEFAULT_MIN_BATCH;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Frame pipeline tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Initial slot count of each state manager buffer.
    pub min_batch_size: usize,
    /// Merge compatible batches before submission.
    pub optimize_commands: bool,
    /// Initial capacity of the per-frame op log.
    pub op_capacity: usize,
    /// Initial capacity of the per-frame command list.
    pub command_capacity: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            min_batch_size: DEFAULT_MIN_BATCH,
            optimize_commands: true,
            op_capacity: 1024,
            command_capacity: 256,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlintConfig {
    /// Pipeline tuning.
    pub context: ContextConfig,
    /// Initial style.
    pub style: Style,
}

impl GlintConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// [`UiError::Config`](crate::UiError::Config) if the document is not
    /// valid TOML or has mistyped keys.
    pub fn from_toml_str(text: &str) -> UiResult<Self> {
        let config: Self = toml::from_str(text)?;
        tracing::debug!(
            min_batch_size = config.context.min_batch_size,
            optimize = config.context.optimize_commands,
            "configuration parsed"
        );
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// [`UiError::Io`](crate::UiError::Io) if the file cannot be read, or
    /// [`UiError::Config`](crate::UiError::Config) if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> UiResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading configuration");
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UiError;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(GlintConfig::from_toml_str("").unwrap(), GlintConfig::default());
    }

    #[test]
    fn test_sections_override_fields() {
        let config = GlintConfig::from_toml_str(
            r#"
            [context]
            min_batch_size = 32
            optimize_commands = false
            command_capacity = 64

            [style]
            rounding = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(config.context.min_batch_size, 32);
        assert!(!config.context.optimize_commands);
        assert_eq!(config.context.command_capacity, 64);
        assert_eq!(config.context.op_capacity, ContextConfig::default().op_capacity);
        assert_eq!(config.style.rounding, 0.0);
        assert_eq!(config.style.spacing, Style::default().spacing);
    }

    #[test]
    fn test_mistyped_value_is_config_error() {
        let err = GlintConfig::from_toml_str("[context]\nmin_batch_size = \"lots\"").unwrap_err();
        assert!(matches!(err, UiError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GlintConfig::load("/nonexistent/glint.toml").unwrap_err();
        assert!(matches!(err, UiError::Io(_)));
    }
}
