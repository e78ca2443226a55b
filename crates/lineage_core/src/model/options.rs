//! Component configuration model.
//!
//! # Responsibility
//! - Define merged options carried by a definition.
//! - Define the partial configuration a caller passes to one extension call.
//!
//! # Invariants
//! - Function-like entries (computed getters, methods, hooks) are declared by
//!   handler id only; resolution belongs to collaborators.
//! - Unknown top-level keys are kept verbatim in `extra`.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declared runtime type of one prop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropType {
    #[default]
    Any,
    String,
    Number,
    Boolean,
    Array,
    Object,
}

/// Declaration of one input property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropSpec {
    #[serde(rename = "type", default)]
    pub kind: PropType,
    #[serde(default)]
    pub required: bool,
    /// Initial backing value for new instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl PropSpec {
    pub fn of(kind: PropType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }
}

/// Declaration of one computed property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedSpec {
    /// Getter handler id.
    pub get: String,
    /// Optional setter handler id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    /// Hint for the evaluator; caching itself is not done here.
    #[serde(default = "default_cache")]
    pub cache: bool,
}

impl ComputedSpec {
    pub fn getter(handler: impl Into<String>) -> Self {
        Self {
            get: handler.into(),
            set: None,
            cache: true,
        }
    }

    pub fn with_setter(mut self, handler: impl Into<String>) -> Self {
        self.set = Some(handler.into());
        self
    }
}

fn default_cache() -> bool {
    true
}

/// Fully merged options of one definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub props: BTreeMap<String, PropSpec>,
    #[serde(default)]
    pub computed: BTreeMap<String, ComputedSpec>,
    /// Method name -> handler id.
    #[serde(default)]
    pub methods: BTreeMap<String, String>,
    /// Lifecycle hook name -> handler ids, in call order.
    #[serde(default)]
    pub hooks: BTreeMap<String, Vec<String>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ComponentOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Caller-supplied overrides for one extension call.
///
/// Wrap it in a [`crate::ConfigHandle`] to give it a cache scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub props: BTreeMap<String, PropSpec>,
    #[serde(default)]
    pub computed: BTreeMap<String, ComputedSpec>,
    #[serde(default)]
    pub methods: BTreeMap<String, String>,
    #[serde(default)]
    pub hooks: BTreeMap<String, Vec<String>>,
    /// Local component declarations shadowing inherited entries.
    #[serde(default)]
    pub components: BTreeMap<String, Value>,
    #[serde(default)]
    pub directives: BTreeMap<String, Value>,
    #[serde(default)]
    pub filters: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PartialConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one partial configuration from JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(ConfigError::Parse)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, spec: PropSpec) -> Self {
        self.props.insert(key.into(), spec);
        self
    }

    pub fn with_computed(mut self, key: impl Into<String>, spec: ComputedSpec) -> Self {
        self.computed.insert(key.into(), spec);
        self
    }

    pub fn with_hook(mut self, hook: impl Into<String>, handler: impl Into<String>) -> Self {
        self.hooks.entry(hook.into()).or_default().push(handler.into());
        self
    }
}
