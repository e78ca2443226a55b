//! Options merging collaborator.
//!
//! # Responsibility
//! - Combine base options with one partial configuration.
//!
//! # Invariants
//! - Merging never mutates its inputs.
//! - The default strategy lets child declarations win over parent ones.

use crate::model::options::{ComponentOptions, PartialConfig};
use serde_json::Value;
use std::collections::BTreeMap;

/// Merges base options with a partial configuration.
pub trait OptionsMerger: Send + Sync {
    fn merge(&self, parent: &ComponentOptions, child: &PartialConfig) -> ComponentOptions;
}

/// Default merge strategy.
///
/// - `name`: child, else parent.
/// - `props`, `computed`, `methods`: parent entries overlaid by child entries.
/// - `hooks`: parent handlers followed by child handlers, duplicates dropped.
/// - `extra`: JSON objects merged recursively, any other child value wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOptionsMerger;

impl OptionsMerger for DefaultOptionsMerger {
    fn merge(&self, parent: &ComponentOptions, child: &PartialConfig) -> ComponentOptions {
        let mut hooks = parent.hooks.clone();
        for (hook, handlers) in &child.hooks {
            let merged = hooks.entry(hook.clone()).or_default();
            for handler in handlers {
                if !merged.contains(handler) {
                    merged.push(handler.clone());
                }
            }
        }

        let mut extra = parent.extra.clone();
        for (key, value) in &child.extra {
            match extra.get_mut(key) {
                Some(existing) => merge_value(existing, value),
                None => {
                    extra.insert(key.clone(), value.clone());
                }
            }
        }

        ComponentOptions {
            name: child.name.clone().or_else(|| parent.name.clone()),
            props: overlay(&parent.props, &child.props),
            computed: overlay(&parent.computed, &child.computed),
            methods: overlay(&parent.methods, &child.methods),
            hooks,
            extra,
        }
    }
}

fn overlay<V: Clone>(parent: &BTreeMap<String, V>, child: &BTreeMap<String, V>) -> BTreeMap<String, V> {
    let mut merged = parent.clone();
    merged.extend(child.iter().map(|(key, value)| (key.clone(), value.clone())));
    merged
}

fn merge_value(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match target.get_mut(key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, incoming) => *target = incoming.clone(),
    }
}
