//! Instance-behavior templates.
//!
//! # Responsibility
//! - Hold the accessor table shared by every instance of one definition.
//! - Chain each template to exactly one parent template.
//!
//! # Invariants
//! - The resolved table is computed once, when the template is built.
//! - Own entries shadow parent entries with the same key.
//! - A derived template always reaches its base template through `parent`.

use crate::definition::instance::ComponentInstance;
use crate::model::identity::DefinitionId;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Computed getter produced by a reactive evaluator.
pub type ComputedGetter = Arc<dyn Fn(&ComponentInstance) -> Value + Send + Sync>;
/// Computed setter produced by a reactive evaluator.
pub type ComputedSetter = Arc<dyn Fn(&mut ComponentInstance, Value) + Send + Sync>;

/// Accessor for one computed key.
#[derive(Clone)]
pub struct ComputedAccessor {
    getter: Option<ComputedGetter>,
    setter: Option<ComputedSetter>,
    cached: bool,
}

impl ComputedAccessor {
    pub fn new(getter: Option<ComputedGetter>, setter: Option<ComputedSetter>, cached: bool) -> Self {
        Self {
            getter,
            setter,
            cached,
        }
    }

    pub fn getter(&self) -> Option<&ComputedGetter> {
        self.getter.as_ref()
    }

    pub fn setter(&self) -> Option<&ComputedSetter> {
        self.setter.as_ref()
    }

    pub fn is_cached(&self) -> bool {
        self.cached
    }
}

impl Debug for ComputedAccessor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputedAccessor")
            .field("has_getter", &self.getter.is_some())
            .field("has_setter", &self.setter.is_some())
            .field("cached", &self.cached)
            .finish()
    }
}

/// One entry of a template's accessor table.
#[derive(Debug, Clone)]
pub enum Accessor {
    /// Forwards reads and writes to the instance's backing props container.
    Prop,
    Computed(ComputedAccessor),
}

impl Accessor {
    pub fn is_prop(&self) -> bool {
        matches!(self, Self::Prop)
    }
}

/// Accessor table of one definition, chained to its parent's.
#[derive(Debug)]
pub struct BehaviorTemplate {
    owner: DefinitionId,
    parent: Option<Arc<BehaviorTemplate>>,
    own: BTreeMap<String, Accessor>,
    resolved: BTreeMap<String, Accessor>,
}

impl BehaviorTemplate {
    /// Starts a template owned by `owner`, chained to `parent` when given.
    pub fn builder(owner: DefinitionId, parent: Option<Arc<BehaviorTemplate>>) -> TemplateBuilder {
        TemplateBuilder {
            owner,
            parent,
            own: BTreeMap::new(),
        }
    }

    pub fn owner(&self) -> DefinitionId {
        self.owner
    }

    pub fn parent(&self) -> Option<&Arc<BehaviorTemplate>> {
        self.parent.as_ref()
    }

    /// Looks up one key in the resolved table.
    pub fn accessor(&self, key: &str) -> Option<&Accessor> {
        self.resolved.get(key)
    }

    /// Looks up one key installed on this template itself.
    pub fn own_accessor(&self, key: &str) -> Option<&Accessor> {
        self.own.get(key)
    }

    /// Keys installed on this template itself.
    pub fn own_keys(&self) -> impl Iterator<Item = &str> {
        self.own.keys().map(String::as_str)
    }

    /// Keys visible through the whole chain.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.resolved.keys().map(String::as_str)
    }

    /// Iterates this template followed by every ancestor.
    pub fn chain(&self) -> TemplateChain<'_> {
        TemplateChain {
            current: Some(self),
        }
    }

    /// Returns whether `owner` appears anywhere in this chain.
    pub fn inherits_from(&self, owner: DefinitionId) -> bool {
        self.chain().any(|template| template.owner == owner)
    }
}

/// Collects own accessors before the resolved table is frozen.
pub struct TemplateBuilder {
    owner: DefinitionId,
    parent: Option<Arc<BehaviorTemplate>>,
    own: BTreeMap<String, Accessor>,
}

impl TemplateBuilder {
    pub fn install(&mut self, key: impl Into<String>, accessor: Accessor) {
        self.own.insert(key.into(), accessor);
    }

    pub fn build(self) -> BehaviorTemplate {
        let mut resolved = self
            .parent
            .as_ref()
            .map(|parent| parent.resolved.clone())
            .unwrap_or_default();
        for (key, accessor) in &self.own {
            resolved.insert(key.clone(), accessor.clone());
        }
        BehaviorTemplate {
            owner: self.owner,
            parent: self.parent,
            own: self.own,
            resolved,
        }
    }
}

/// Iterator over a template and its ancestors.
pub struct TemplateChain<'a> {
    current: Option<&'a BehaviorTemplate>,
}

impl<'a> Iterator for TemplateChain<'a> {
    type Item = &'a BehaviorTemplate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = current.parent.as_deref();
        Some(current)
    }
}
