//! Plugin installation contract.
//!
//! Plugins receive the definition they are installed on and may register
//! assets, apply mixins or extend it further.

use crate::definition::Definition;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Installable capability bundle.
pub trait Plugin: Send + Sync {
    /// Stable id used to install each plugin at most once per definition.
    fn plugin_id(&self) -> &str;

    fn install(&self, target: &Arc<Definition>) -> Result<(), PluginError>;
}

type InstallFn = dyn Fn(&Arc<Definition>) -> Result<(), PluginError> + Send + Sync;

/// Plugin backed by a closure.
pub struct FnPlugin {
    plugin_id: String,
    install: Box<InstallFn>,
}

impl FnPlugin {
    pub fn new(
        plugin_id: impl Into<String>,
        install: impl Fn(&Arc<Definition>) -> Result<(), PluginError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            install: Box::new(install),
        }
    }
}

impl Plugin for FnPlugin {
    fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    fn install(&self, target: &Arc<Definition>) -> Result<(), PluginError> {
        (self.install)(target)
    }
}

/// Plugin installation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginError {
    pub plugin_id: String,
    pub message: String,
}

impl PluginError {
    pub fn new(plugin_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            message: message.into(),
        }
    }
}

impl Display for PluginError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "plugin `{}` failed to install: {}", self.plugin_id, self.message)
    }
}

impl Error for PluginError {}
