//! Prop forwarding and computed accessor wiring.
//!
//! # Responsibility
//! - Install one forwarding accessor per declared prop on a template.
//! - Bind each declared computed key to the reactive evaluator's accessor.
//!
//! # Invariants
//! - Wiring runs once per definition, while its template is built.
//! - Evaluation and caching of computed values belong to the evaluator.

use crate::definition::instance::ComponentInstance;
use crate::definition::template::{
    Accessor, ComputedAccessor, ComputedGetter, ComputedSetter, TemplateBuilder,
};
use crate::model::options::{ComponentOptions, ComputedSpec};
use log::warn;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Reactive evaluation collaborator producing computed accessors.
pub trait ReactiveEvaluator: Send + Sync {
    fn computed_accessor(&self, key: &str, spec: &ComputedSpec) -> ComputedAccessor;
}

/// Evaluator resolving computed handler ids against registered closures.
#[derive(Default)]
pub struct HandlerEvaluator {
    getters: BTreeMap<String, ComputedGetter>,
    setters: BTreeMap<String, ComputedSetter>,
}

impl HandlerEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn getter(
        mut self,
        handler: impl Into<String>,
        getter: impl Fn(&ComponentInstance) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.getters.insert(handler.into(), Arc::new(getter));
        self
    }

    pub fn setter(
        mut self,
        handler: impl Into<String>,
        setter: impl Fn(&mut ComponentInstance, Value) + Send + Sync + 'static,
    ) -> Self {
        self.setters.insert(handler.into(), Arc::new(setter));
        self
    }
}

impl ReactiveEvaluator for HandlerEvaluator {
    fn computed_accessor(&self, key: &str, spec: &ComputedSpec) -> ComputedAccessor {
        let getter = self.getters.get(&spec.get).cloned();
        if getter.is_none() {
            warn!(
                "event=computed_getter_missing module=extension status=error key={} handler={}",
                key, spec.get
            );
        }
        let setter = spec
            .set
            .as_ref()
            .and_then(|handler| self.setters.get(handler).cloned());
        ComputedAccessor::new(getter, setter, spec.cache)
    }
}

/// Installs prop and computed accessors for every key in `options`.
pub(crate) fn install_accessors(
    template: &mut TemplateBuilder,
    options: &ComponentOptions,
    evaluator: &dyn ReactiveEvaluator,
) {
    for key in options.props.keys() {
        template.install(key.clone(), Accessor::Prop);
    }
    for (key, spec) in &options.computed {
        template.install(
            key.clone(),
            Accessor::Computed(evaluator.computed_accessor(key, spec)),
        );
    }
}
