//! Extension kernel: the orchestrator behind `Definition::extend`.
//!
//! # Responsibility
//! - Own the collaborators, runtime config and diagnostics buffer.
//! - Build derived definitions: merge, wire accessors, propagate registries,
//!   self-register, record bookkeeping, cache on the caller's handle.
//!
//! # Invariants
//! - A cache hit returns before any merge, validation or allocation.
//! - One process-wide identity is allocated per newly built definition.
//! - The kernel never holds definitions, so dropping them releases it.
//! - Name validation runs only with diagnostics enabled and never aborts.
//! - Every definition built here shares this kernel by reference.

use crate::config::RuntimeConfig;
use crate::definition::assets::{AssetEntry, AssetKind, AssetTable};
use crate::definition::template::BehaviorTemplate;
use crate::definition::{Definition, ExtensionSnapshot};
use crate::extension::accessors::{install_accessors, HandlerEvaluator, ReactiveEvaluator};
use crate::extension::cache::ConfigHandle;
use crate::extension::merge::{DefaultOptionsMerger, OptionsMerger};
use crate::extension::naming::{DefaultNameValidator, NameDiagnostic, NameValidator};
use crate::model::identity::{DefinitionId, IdentityAllocator};
use crate::model::options::{ComponentOptions, PartialConfig};
use log::{debug, info, warn};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared extension state and collaborators.
pub struct ExtensionKernel {
    config: RuntimeConfig,
    built: AtomicU64,
    merger: Arc<dyn OptionsMerger>,
    validator: Arc<dyn NameValidator>,
    evaluator: Arc<dyn ReactiveEvaluator>,
    diagnostics: Mutex<Vec<NameDiagnostic>>,
}

impl ExtensionKernel {
    pub fn builder() -> KernelBuilder {
        KernelBuilder::default()
    }

    /// Builds a kernel with default collaborators and returns its root.
    pub fn bootstrap(config: RuntimeConfig, root_options: ComponentOptions) -> Arc<Definition> {
        Self::builder().config(config).build().root(root_options)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn merger(&self) -> &dyn OptionsMerger {
        self.merger.as_ref()
    }

    pub(crate) fn evaluator(&self) -> &dyn ReactiveEvaluator {
        self.evaluator.as_ref()
    }

    /// Number of definitions built by this kernel, roots included.
    pub fn definitions_built(&self) -> u64 {
        self.built.load(Ordering::SeqCst)
    }

    /// Diagnostics recorded so far, oldest first.
    pub fn diagnostics(&self) -> Vec<NameDiagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns and clears recorded diagnostics.
    pub fn take_diagnostics(&self) -> Vec<NameDiagnostic> {
        std::mem::take(
            &mut *self
                .diagnostics
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Builds a root definition with no base.
    pub fn root(self: &Arc<Self>, options: ComponentOptions) -> Arc<Definition> {
        let id = self.allocate();
        let options = Arc::new(options);
        let mut template = BehaviorTemplate::builder(id, None);
        install_accessors(&mut template, &options, self.evaluator.as_ref());
        info!(
            "event=definition_root module=extension status=ok cid={} name={}",
            id,
            options.name.as_deref().unwrap_or("-")
        );
        Arc::new(Definition::new(
            id,
            options,
            None,
            Arc::new(template.build()),
            AssetTable::empty(),
            Arc::clone(self),
            None,
        ))
    }

    /// Derives a definition from `base`; see `Definition::extend`.
    pub fn extend(
        self: &Arc<Self>,
        base: &Arc<Definition>,
        config: Option<&ConfigHandle>,
    ) -> Arc<Definition> {
        let Some(handle) = config else {
            return self.build_derived(base, &ConfigHandle::new(PartialConfig::default()));
        };

        let (derived, built) = handle
            .cache()
            .get_or_build(base.id(), || self.build_derived(base, handle));
        if !built {
            debug!(
                "event=extend_cache_hit module=extension status=ok base_cid={} cid={}",
                base.id(),
                derived.id()
            );
        }
        derived
    }

    fn build_derived(
        self: &Arc<Self>,
        base: &Arc<Definition>,
        handle: &ConfigHandle,
    ) -> Arc<Definition> {
        let partial = handle.config();
        let base_options = base.options();
        let name = partial.name.clone().or_else(|| base_options.name.clone());
        if let Some(name) = name.as_deref() {
            self.check_component_name(name);
        }

        let id = self.allocate();
        let merged = Arc::new(self.merger.merge(&base_options, partial));

        let mut template = BehaviorTemplate::builder(id, Some(Arc::clone(base.template())));
        install_accessors(&mut template, &merged, self.evaluator.as_ref());
        let template = Arc::new(template.build());

        let mut assets = base.asset_table().inherit();
        assets.declare(partial);

        let snapshot = ExtensionSnapshot::new(
            Arc::clone(&base_options),
            handle.id(),
            Arc::clone(handle.shared_config()),
            Arc::new(merged.as_ref().clone()),
        );

        let prop_count = merged.props.len();
        let computed_count = merged.computed.len();
        let derived = Arc::new_cyclic(|this| {
            if let Some(name) = name.as_ref() {
                assets.insert(
                    AssetKind::Component,
                    name.clone(),
                    AssetEntry::Recursive(this.clone()),
                );
            }
            Definition::new(
                id,
                merged,
                Some(Arc::clone(base)),
                template,
                assets,
                Arc::clone(self),
                Some(snapshot),
            )
        });

        info!(
            "event=definition_extend module=extension status=ok cid={} base_cid={} name={} props={} computed={}",
            id,
            base.id(),
            name.as_deref().unwrap_or("-"),
            prop_count,
            computed_count
        );
        derived
    }

    fn allocate(&self) -> DefinitionId {
        self.built.fetch_add(1, Ordering::SeqCst);
        IdentityAllocator::global().allocate()
    }

    /// Validates a component name when diagnostics are enabled.
    ///
    /// Invalid names are logged and recorded, never rejected.
    pub(crate) fn check_component_name(&self, name: &str) {
        if !self.config.diagnostics.is_enabled() {
            return;
        }
        if let Some(diagnostic) = self.validator.validate(name) {
            warn!(
                "event=component_name_invalid module=extension status=error name={} reason={}",
                name, diagnostic
            );
            self.diagnostics
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(diagnostic);
        }
    }
}

impl Debug for ExtensionKernel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionKernel")
            .field("config", &self.config)
            .field("definitions_built", &self.definitions_built())
            .finish()
    }
}

/// Assembles an `ExtensionKernel`.
#[derive(Default)]
pub struct KernelBuilder {
    config: RuntimeConfig,
    merger: Option<Arc<dyn OptionsMerger>>,
    validator: Option<Arc<dyn NameValidator>>,
    evaluator: Option<Arc<dyn ReactiveEvaluator>>,
}

impl KernelBuilder {
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn merger(mut self, merger: Arc<dyn OptionsMerger>) -> Self {
        self.merger = Some(merger);
        self
    }

    pub fn validator(mut self, validator: Arc<dyn NameValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn evaluator(mut self, evaluator: Arc<dyn ReactiveEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn build(self) -> Arc<ExtensionKernel> {
        let validator = self.validator.unwrap_or_else(|| {
            Arc::new(DefaultNameValidator::with_reserved(
                self.config.reserved_tags.iter().cloned(),
            )) as Arc<dyn NameValidator>
        });
        Arc::new(ExtensionKernel {
            built: AtomicU64::new(0),
            merger: self
                .merger
                .unwrap_or_else(|| Arc::new(DefaultOptionsMerger) as Arc<dyn OptionsMerger>),
            validator,
            evaluator: self
                .evaluator
                .unwrap_or_else(|| Arc::new(HandlerEvaluator::new()) as Arc<dyn ReactiveEvaluator>),
            diagnostics: Mutex::new(Vec::new()),
            config: self.config,
        })
    }
}
