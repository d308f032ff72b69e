//! Configuration for sequence diagram layout

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Width of every span box, whatever its depth or label
pub const SPAN_BASE_WIDTH: f64 = 12.0;

/// Vertical padding above the first and below the last message touching a span
pub const SPAN_MESSAGE_PAD: f64 = 16.0;

/// Errors that can occur when loading a layout configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read layout config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse layout config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("invalid layout config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Spacing options for sequence diagram layout
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SequenceConfig {
    /// Horizontal gap between neighbouring actor boxes
    pub actor_spacing: f64,

    /// Vertical distance between consecutive messages, and from the actor
    /// bottoms to the first message
    pub message_spacing: f64,

    /// How far a lifeline extends past the last message touching its actor
    pub lifeline_margin: f64,

    /// Padding around a diagram's content and around nested diagrams
    pub container_padding: f64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            actor_spacing: 100.0,
            message_spacing: 80.0,
            lifeline_margin: 40.0,
            container_padding: 25.0,
        }
    }
}

impl SequenceConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gap between actors
    pub fn with_actor_spacing(mut self, spacing: f64) -> Self {
        self.actor_spacing = spacing;
        self
    }

    /// Set the gap between messages
    pub fn with_message_spacing(mut self, spacing: f64) -> Self {
        self.message_spacing = spacing;
        self
    }

    /// Set the lifeline margin below the last message
    pub fn with_lifeline_margin(mut self, margin: f64) -> Self {
        self.lifeline_margin = margin;
        self
    }

    /// Set the container padding
    pub fn with_container_padding(mut self, padding: f64) -> Self {
        self.container_padding = padding;
        self
    }

    /// Load a configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SequenceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that spans and lifelines fit in the configured spacing
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("actor_spacing", self.actor_spacing),
            ("message_spacing", self.message_spacing),
            ("lifeline_margin", self.lifeline_margin),
            ("container_padding", self.container_padding),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a finite non-negative number, got {}", value),
                });
            }
        }
        if self.message_spacing <= 2.0 * SPAN_MESSAGE_PAD {
            return Err(ConfigError::Invalid {
                field: "message_spacing",
                reason: format!("must exceed {}", 2.0 * SPAN_MESSAGE_PAD),
            });
        }
        if self.lifeline_margin < SPAN_MESSAGE_PAD {
            return Err(ConfigError::Invalid {
                field: "lifeline_margin",
                reason: format!("must be at least {}", SPAN_MESSAGE_PAD),
            });
        }
        Ok(())
    }
}
