//! Kernel runtime configuration.
//!
//! # Responsibility
//! - Decide whether diagnostics (component-name validation) run.
//! - Carry extra reserved tag names for the default name validator.
//!
//! # Invariants
//! - Missing fields fall back to build-mode defaults.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Whether diagnostics-only checks run during extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticsMode {
    Enabled,
    Disabled,
}

impl DiagnosticsMode {
    /// `Enabled` in debug builds, `Disabled` in release builds.
    pub fn for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }

    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

impl Default for DiagnosticsMode {
    fn default() -> Self {
        Self::for_build()
    }
}

/// Runtime configuration for one extension kernel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub diagnostics: DiagnosticsMode,
    /// Names rejected in addition to the built-in reserved tags.
    #[serde(default)]
    pub reserved_tags: Vec<String>,
}

impl RuntimeConfig {
    pub fn with_diagnostics(diagnostics: DiagnosticsMode) -> Self {
        Self {
            diagnostics,
            ..Self::default()
        }
    }

    /// Parses runtime configuration from JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(ConfigError::Parse)
    }
}

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagnosticsMode, RuntimeConfig};

    #[test]
    fn empty_config_uses_build_defaults() {
        let config = RuntimeConfig::from_json_str("{}").expect("empty config should parse");
        assert_eq!(config.diagnostics, DiagnosticsMode::for_build());
        assert!(config.reserved_tags.is_empty());
    }

    #[test]
    fn parses_explicit_values() {
        let config = RuntimeConfig::from_json_str(
            r#"{ "diagnostics": "disabled", "reserved_tags": ["app-shell"] }"#,
        )
        .expect("config should parse");
        assert_eq!(config.diagnostics, DiagnosticsMode::Disabled);
        assert_eq!(config.reserved_tags, vec!["app-shell".to_string()]);
    }

    #[test]
    fn rejects_unknown_diagnostics_mode() {
        let err = RuntimeConfig::from_json_str(r#"{ "diagnostics": "verbose" }"#)
            .expect_err("unknown mode must fail");
        assert!(err.to_string().contains("invalid configuration"));
    }
}
