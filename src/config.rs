//! Render configuration, loadable from TOML

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Configuration options for render passes
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Outlet filled by `{{outlet}}` without a name
    pub default_outlet: String,

    /// Maximum number of targets an action may bubble through
    pub max_bubble_depth: usize,

    /// Whether `{{property}}` output is HTML-escaped
    pub escape_html: bool,

    /// Tag wrapping every rendered view
    pub view_tag: String,

    /// Class set on view wrapper elements
    pub view_class: Option<String>,

    /// Prefix for view element ids (`view-12`)
    pub element_id_prefix: String,

    /// Attribute carrying action ids on elements bound with `{{action}}`
    pub action_attribute: String,

    /// Event type used for `{{action}}` without an `on=` argument
    pub default_event: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_outlet: "main".to_string(),
            max_bubble_depth: 32,
            escape_html: true,
            view_tag: "div".to_string(),
            view_class: Some("view".to_string()),
            element_id_prefix: "view-".to_string(),
            action_attribute: "data-action-id".to_string(),
            default_event: "click".to_string(),
        }
    }
}

/// TOML layout: settings live under a `[render]` table
#[derive(Deserialize)]
struct TomlConfig {
    #[serde(default)]
    render: RenderConfig,
}

impl RenderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string with a `[render]` table
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        Ok(parsed.render)
    }

    pub fn with_default_outlet(mut self, outlet: impl Into<String>) -> Self {
        self.default_outlet = outlet.into();
        self
    }

    pub fn with_max_bubble_depth(mut self, depth: usize) -> Self {
        self.max_bubble_depth = depth;
        self
    }

    pub fn with_escape_html(mut self, escape: bool) -> Self {
        self.escape_html = escape;
        self
    }

    pub fn with_view_class(mut self, class: impl Into<String>) -> Self {
        self.view_class = Some(class.into());
        self
    }

    /// Render view wrappers without a class attribute
    pub fn without_view_class(mut self) -> Self {
        self.view_class = None;
        self
    }

    pub fn with_action_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.action_attribute = attribute.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.default_outlet, "main");
        assert_eq!(config.max_bubble_depth, 32);
        assert!(config.escape_html);
        assert_eq!(config.view_class, Some("view".to_string()));
    }

    #[test]
    fn test_builder_pattern() {
        let config = RenderConfig::new()
            .with_default_outlet("body")
            .with_max_bubble_depth(4)
            .with_escape_html(false)
            .without_view_class();

        assert_eq!(config.default_outlet, "body");
        assert_eq!(config.max_bubble_depth, 4);
        assert!(!config.escape_html);
        assert_eq!(config.view_class, None);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = RenderConfig::from_toml(
            r#"
            [render]
            default_outlet = "content"
            max_bubble_depth = 8
            "#,
        )
        .expect("Should parse");

        assert_eq!(config.default_outlet, "content");
        assert_eq!(config.max_bubble_depth, 8);
        assert_eq!(config.action_attribute, "data-action-id");
    }

    #[test]
    fn test_from_toml_empty() {
        let config = RenderConfig::from_toml("").expect("Should parse");
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_from_toml_invalid() {
        let result = RenderConfig::from_toml("[render]\nmax_bubble_depth = \"deep\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
