//! Component definitions.
//!
//! # Responsibility
//! - Hold one blueprint: identity, merged options, template, asset registries.
//! - Expose the capabilities shared with every derived definition
//!   (extension, mixin, plugin installation, asset registration).
//!
//! # Invariants
//! - `id`, `parent`, `template` and `snapshot` never change after build.
//! - Options change only through `mixin`, which swaps in a new `Arc`.
//! - Registries change only through registration on this definition.

pub mod assets;
pub mod instance;
pub mod template;

use crate::definition::assets::{AssetEntry, AssetKind, AssetRegistry, AssetTable};
use crate::definition::template::BehaviorTemplate;
use crate::extension::cache::{ConfigHandle, HandleId};
use crate::extension::capability::{Plugin, PluginError};
use crate::extension::kernel::ExtensionKernel;
use crate::model::identity::DefinitionId;
use crate::model::options::{ComponentOptions, PartialConfig};
use log::{debug, info};
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// State recorded when a derived definition was built.
///
/// Holds the handle's id and configuration, not the handle itself, so a
/// cached definition never keeps its own cache alive.
#[derive(Debug, Clone)]
pub struct ExtensionSnapshot {
    super_options: Arc<ComponentOptions>,
    extension_handle: HandleId,
    extension_input: Arc<PartialConfig>,
    sealed_options: Arc<ComponentOptions>,
}

impl ExtensionSnapshot {
    pub(crate) fn new(
        super_options: Arc<ComponentOptions>,
        extension_handle: HandleId,
        extension_input: Arc<PartialConfig>,
        sealed_options: Arc<ComponentOptions>,
    ) -> Self {
        Self {
            super_options,
            extension_handle,
            extension_input,
            sealed_options,
        }
    }

    /// Base options reference at extension time.
    pub fn super_options(&self) -> &Arc<ComponentOptions> {
        &self.super_options
    }

    /// Handle the extension call was scoped to.
    pub fn extension_handle(&self) -> HandleId {
        self.extension_handle
    }

    /// Raw partial configuration passed to the extension call.
    pub fn extension_input(&self) -> &Arc<PartialConfig> {
        &self.extension_input
    }

    /// Copy of the merged options taken at extension time.
    pub fn sealed_options(&self) -> &Arc<ComponentOptions> {
        &self.sealed_options
    }
}

/// One reusable component blueprint.
pub struct Definition {
    id: DefinitionId,
    options: RwLock<Arc<ComponentOptions>>,
    parent: Option<Arc<Definition>>,
    template: Arc<BehaviorTemplate>,
    assets: RwLock<AssetTable>,
    kernel: Arc<ExtensionKernel>,
    snapshot: Option<ExtensionSnapshot>,
    installed_plugins: Mutex<BTreeSet<String>>,
}

impl Definition {
    pub(crate) fn new(
        id: DefinitionId,
        options: Arc<ComponentOptions>,
        parent: Option<Arc<Definition>>,
        template: Arc<BehaviorTemplate>,
        assets: AssetTable,
        kernel: Arc<ExtensionKernel>,
        snapshot: Option<ExtensionSnapshot>,
    ) -> Self {
        Self {
            id,
            options: RwLock::new(options),
            parent,
            template,
            assets: RwLock::new(assets),
            kernel,
            snapshot,
            installed_plugins: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn id(&self) -> DefinitionId {
        self.id
    }

    /// Current merged options.
    pub fn options(&self) -> Arc<ComponentOptions> {
        Arc::clone(&self.options.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn name(&self) -> Option<String> {
        self.options().name.clone()
    }

    /// Base definition, `None` for a root.
    pub fn parent(&self) -> Option<&Arc<Definition>> {
        self.parent.as_ref()
    }

    pub fn template(&self) -> &Arc<BehaviorTemplate> {
        &self.template
    }

    pub fn kernel(&self) -> &Arc<ExtensionKernel> {
        &self.kernel
    }

    /// Bookkeeping recorded at extension time, `None` for a root.
    pub fn snapshot(&self) -> Option<&ExtensionSnapshot> {
        self.snapshot.as_ref()
    }

    /// Returns whether `ancestor` is this definition or one of its bases.
    pub fn is_derived_from(&self, ancestor: &Definition) -> bool {
        let mut current = Some(self);
        while let Some(definition) = current {
            if std::ptr::eq(definition, ancestor) {
                return true;
            }
            current = definition.parent.as_deref();
        }
        false
    }

    /// Extends this definition with `config`.
    ///
    /// Repeated calls with the same handle return the same definition.
    pub fn extend(self: &Arc<Self>, config: &ConfigHandle) -> Arc<Definition> {
        self.kernel.extend(self, Some(config))
    }

    /// Extends this definition with an empty configuration.
    ///
    /// Each call builds a new definition.
    pub fn extend_default(self: &Arc<Self>) -> Arc<Definition> {
        self.kernel.extend(self, None)
    }

    /// Merges `config` into this definition's own options and registers the
    /// assets it declares.
    ///
    /// Already derived definitions keep the options and registries they were
    /// built from; `base_options_changed` reports the difference.
    pub fn mixin(&self, config: &PartialConfig) {
        let merged = Arc::new(self.kernel.merger().merge(&self.options(), config));
        info!(
            "event=mixin_applied module=definition status=ok cid={} props={} computed={}",
            self.id,
            merged.props.len(),
            merged.computed.len()
        );
        *self.options.write().unwrap_or_else(PoisonError::into_inner) = merged;
        self.assets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .declare(config);
    }

    /// Installs `plugin` unless a plugin with the same id is already installed.
    ///
    /// Returns `Ok(false)` when the plugin was skipped.
    pub fn use_plugin(self: &Arc<Self>, plugin: &dyn Plugin) -> Result<bool, PluginError> {
        let plugin_id = plugin.plugin_id().to_string();
        {
            let installed = self
                .installed_plugins
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if installed.contains(&plugin_id) {
                debug!(
                    "event=plugin_install module=definition status=skipped cid={} plugin={}",
                    self.id, plugin_id
                );
                return Ok(false);
            }
        }

        plugin.install(self)?;
        self.installed_plugins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(plugin_id.clone());
        info!(
            "event=plugin_install module=definition status=ok cid={} plugin={}",
            self.id, plugin_id
        );
        Ok(true)
    }

    pub fn has_plugin(&self, plugin_id: &str) -> bool {
        self.installed_plugins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(plugin_id)
    }

    /// Registers one asset locally on this definition.
    ///
    /// Definitions derived before this call do not see the new entry.
    pub fn register_asset(&self, kind: AssetKind, name: impl Into<String>, entry: AssetEntry) {
        let name = name.into();
        if kind == AssetKind::Component {
            self.kernel.check_component_name(&name);
        }
        self.assets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, name, entry);
    }

    /// Registers a built definition as a component of this definition.
    pub fn register_component(&self, name: impl Into<String>, definition: Arc<Definition>) {
        self.register_asset(AssetKind::Component, name, AssetEntry::Definition(definition));
    }

    /// Shared handle to this definition's registry of `kind`.
    pub fn assets(&self, kind: AssetKind) -> Arc<AssetRegistry> {
        self.assets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .registry(kind)
    }

    pub fn resolve_asset(&self, kind: AssetKind, name: &str) -> Option<AssetEntry> {
        self.assets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(kind, name)
    }

    /// Resolves a component by name to a live definition.
    pub fn resolve_component(&self, name: &str) -> Option<Arc<Definition>> {
        self.resolve_asset(AssetKind::Component, name)
            .and_then(|entry| entry.definition())
    }

    pub(crate) fn asset_table(&self) -> AssetTable {
        self.assets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns whether the base's options were replaced after this definition
    /// was built. Always `false` for a root.
    pub fn base_options_changed(&self) -> bool {
        match (&self.parent, &self.snapshot) {
            (Some(parent), Some(snapshot)) => {
                !Arc::ptr_eq(snapshot.super_options(), &parent.options())
            }
            _ => false,
        }
    }

    /// Returns whether current options differ from the sealed copy.
    pub fn modified_since_seal(&self) -> bool {
        match &self.snapshot {
            Some(snapshot) => *self.options() != **snapshot.sealed_options(),
            None => false,
        }
    }
}

impl Debug for Definition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Definition")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("parent", &self.parent.as_ref().map(|parent| parent.id))
            .finish()
    }
}
