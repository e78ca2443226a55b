//! Asset registries attached to definitions.
//!
//! # Responsibility
//! - Hold named reusable sub-resources per fixed asset kind.
//! - Share base registries with derived definitions by reference.
//!
//! # Invariants
//! - Every table carries one registry per `AssetKind`.
//! - Local entries shadow inherited entries with the same name.
//! - Inserting into a registry that is shared copies it first, so holders of
//!   the old handle keep seeing the old contents.

use crate::definition::Definition;
use crate::model::options::PartialConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Weak};

/// Fixed set of registry kinds propagated from base to derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Component,
    Directive,
    Filter,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [Self::Component, Self::Directive, Self::Filter];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Directive => "directive",
            Self::Filter => "filter",
        }
    }
}

/// One registered asset.
#[derive(Clone)]
pub enum AssetEntry {
    /// A built definition.
    Definition(Arc<Definition>),
    /// A definition registered inside its own registry.
    Recursive(Weak<Definition>),
    /// Declared, not yet built, asset data.
    Declared(Value),
}

impl AssetEntry {
    /// Returns the referenced definition, if this entry is one and it is alive.
    pub fn definition(&self) -> Option<Arc<Definition>> {
        match self {
            Self::Definition(definition) => Some(Arc::clone(definition)),
            Self::Recursive(weak) => weak.upgrade(),
            Self::Declared(_) => None,
        }
    }

    pub fn declared(&self) -> Option<&Value> {
        match self {
            Self::Declared(value) => Some(value),
            _ => None,
        }
    }
}

impl Debug for AssetEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Definition(definition) => write!(f, "Definition(cid={})", definition.id()),
            Self::Recursive(weak) => match weak.upgrade() {
                Some(definition) => write!(f, "Recursive(cid={})", definition.id()),
                None => write!(f, "Recursive(dropped)"),
            },
            Self::Declared(value) => write!(f, "Declared({value})"),
        }
    }
}

/// Registry of one asset kind: local entries over an inherited registry.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    local: BTreeMap<String, AssetEntry>,
    parent: Option<Arc<AssetRegistry>>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry layered over `parent`.
    pub fn inherit(parent: Arc<AssetRegistry>) -> Self {
        Self {
            local: BTreeMap::new(),
            parent: Some(parent),
        }
    }

    pub fn parent(&self) -> Option<&Arc<AssetRegistry>> {
        self.parent.as_ref()
    }

    /// Resolves `name` through local entries, then the inherited chain.
    pub fn resolve(&self, name: &str) -> Option<&AssetEntry> {
        let mut current = Some(self);
        while let Some(registry) = current {
            if let Some(entry) = registry.local.get(name) {
                return Some(entry);
            }
            current = registry.parent.as_deref();
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn local(&self, name: &str) -> Option<&AssetEntry> {
        self.local.get(name)
    }

    pub fn local_names(&self) -> impl Iterator<Item = &str> {
        self.local.keys().map(String::as_str)
    }

    /// Every name visible through this registry.
    pub fn visible_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let mut current = Some(self);
        while let Some(registry) = current {
            names.extend(registry.local.keys().cloned());
            current = registry.parent.as_deref();
        }
        names
    }

    /// Inserts a local entry, returning the previous local entry.
    pub fn insert(&mut self, name: impl Into<String>, entry: AssetEntry) -> Option<AssetEntry> {
        self.local.insert(name.into(), entry)
    }
}

/// One registry handle per asset kind.
#[derive(Debug, Clone)]
pub struct AssetTable {
    registries: BTreeMap<AssetKind, Arc<AssetRegistry>>,
}

impl AssetTable {
    pub fn empty() -> Self {
        Self {
            registries: AssetKind::ALL
                .iter()
                .map(|kind| (*kind, Arc::new(AssetRegistry::new())))
                .collect(),
        }
    }

    /// Builds a table whose registries are layered over this table's handles.
    pub fn inherit(&self) -> Self {
        Self {
            registries: AssetKind::ALL
                .iter()
                .map(|kind| {
                    let parent = self.registry(*kind);
                    (*kind, Arc::new(AssetRegistry::inherit(parent)))
                })
                .collect(),
        }
    }

    /// Returns the shared handle for `kind`.
    pub fn registry(&self, kind: AssetKind) -> Arc<AssetRegistry> {
        self.registries
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| Arc::new(AssetRegistry::new()))
    }

    pub fn resolve(&self, kind: AssetKind, name: &str) -> Option<AssetEntry> {
        self.registries
            .get(&kind)
            .and_then(|registry| registry.resolve(name))
            .cloned()
    }

    /// Inserts a local entry, copying the registry first if it is shared.
    pub fn insert(
        &mut self,
        kind: AssetKind,
        name: impl Into<String>,
        entry: AssetEntry,
    ) -> Option<AssetEntry> {
        let registry = self
            .registries
            .entry(kind)
            .or_insert_with(|| Arc::new(AssetRegistry::new()));
        Arc::make_mut(registry).insert(name, entry)
    }

    /// Inserts every asset declared by `partial` as a local entry.
    pub fn declare(&mut self, partial: &PartialConfig) {
        let declared = [
            (AssetKind::Component, &partial.components),
            (AssetKind::Directive, &partial.directives),
            (AssetKind::Filter, &partial.filters),
        ];
        for (kind, entries) in declared {
            for (name, value) in entries {
                self.insert(kind, name.clone(), AssetEntry::Declared(value.clone()));
            }
        }
    }
}

impl Default for AssetTable {
    fn default() -> Self {
        Self::empty()
    }
}
