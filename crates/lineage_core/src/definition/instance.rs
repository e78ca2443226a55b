//! Minimal instance shell over a definition's accessor table.
//!
//! # Responsibility
//! - Own the per-instance backing props container and plain state.
//! - Route reads and writes through the definition's shared template.
//!
//! # Invariants
//! - Constructing an instance never installs accessors.
//! - Prop writes land in the backing props container at the same key.

use crate::definition::template::{Accessor, ComputedAccessor};
use crate::definition::Definition;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Errors from instance reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    /// Key is neither an accessor, a declared prop, nor plain state.
    UnknownKey(String),
    /// Computed key has no setter.
    ReadOnlyComputed(String),
    /// Computed key has no resolvable getter.
    MissingGetter(String),
}

impl Display for InstanceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownKey(key) => write!(f, "unknown instance key: {key}"),
            Self::ReadOnlyComputed(key) => {
                write!(f, "computed property has no setter: {key}")
            }
            Self::MissingGetter(key) => write!(f, "computed property has no getter: {key}"),
        }
    }
}

impl Error for InstanceError {}

/// One instance built from a definition.
#[derive(Debug, Clone)]
pub struct ComponentInstance {
    definition: Arc<Definition>,
    props: BTreeMap<String, Value>,
    state: BTreeMap<String, Value>,
}

impl ComponentInstance {
    /// Creates an instance with prop defaults copied into its backing container.
    pub fn new(definition: Arc<Definition>) -> Self {
        let props = definition
            .options()
            .props
            .iter()
            .filter_map(|(key, spec)| spec.default.clone().map(|value| (key.clone(), value)))
            .collect();
        Self {
            definition,
            props,
            state: BTreeMap::new(),
        }
    }

    pub fn definition(&self) -> &Arc<Definition> {
        &self.definition
    }

    /// Backing props container.
    pub fn props(&self) -> &BTreeMap<String, Value> {
        &self.props
    }

    /// Plain (non-accessor) state.
    pub fn state(&self) -> &BTreeMap<String, Value> {
        &self.state
    }

    /// Returns whether this instance's definition chain includes `definition`.
    pub fn is_instance_of(&self, definition: &Definition) -> bool {
        self.definition.template().inherits_from(definition.id())
    }

    /// Reads one key through the accessor table.
    pub fn get(&self, key: &str) -> Result<Value, InstanceError> {
        match self.definition.template().accessor(key) {
            Some(Accessor::Prop) => Ok(self.read_prop(key)),
            Some(Accessor::Computed(computed)) => self.read_computed(key, computed),
            None if self.declares_prop(key) => Ok(self.read_prop(key)),
            None => match self.mixin_computed(key) {
                Some(computed) => self.read_computed(key, &computed),
                None => self
                    .state
                    .get(key)
                    .cloned()
                    .ok_or_else(|| InstanceError::UnknownKey(key.to_string())),
            },
        }
    }

    /// Writes one key through the accessor table.
    ///
    /// Keys without an accessor or prop declaration become plain state.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), InstanceError> {
        let definition = Arc::clone(&self.definition);
        match definition.template().accessor(key) {
            Some(Accessor::Prop) => {
                self.props.insert(key.to_string(), value);
                Ok(())
            }
            Some(Accessor::Computed(computed)) => self.write_computed(key, computed, value),
            None if self.declares_prop(key) => {
                self.props.insert(key.to_string(), value);
                Ok(())
            }
            None => match self.mixin_computed(key) {
                Some(computed) => self.write_computed(key, &computed, value),
                None => {
                    self.state.insert(key.to_string(), value);
                    Ok(())
                }
            },
        }
    }

    fn read_prop(&self, key: &str) -> Value {
        self.props.get(key).cloned().unwrap_or(Value::Null)
    }

    fn read_computed(&self, key: &str, computed: &ComputedAccessor) -> Result<Value, InstanceError> {
        match computed.getter() {
            Some(getter) => Ok(getter(self)),
            None => Err(InstanceError::MissingGetter(key.to_string())),
        }
    }

    fn write_computed(
        &mut self,
        key: &str,
        computed: &ComputedAccessor,
        value: Value,
    ) -> Result<(), InstanceError> {
        match computed.setter() {
            Some(setter) => {
                setter(self, value);
                Ok(())
            }
            None => Err(InstanceError::ReadOnlyComputed(key.to_string())),
        }
    }

    // Props and computed keys merged in after the template was built (mixins)
    // are not on the template; they are resolved per access instead.
    fn declares_prop(&self, key: &str) -> bool {
        self.definition.options().props.contains_key(key)
    }

    fn mixin_computed(&self, key: &str) -> Option<ComputedAccessor> {
        let options = self.definition.options();
        let spec = options.computed.get(key)?;
        Some(
            self.definition
                .kernel()
                .evaluator()
                .computed_accessor(key, spec),
        )
    }
}
