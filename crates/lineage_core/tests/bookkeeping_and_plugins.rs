use lineage_core::{
    AssetEntry, AssetKind, ComponentOptions, ConfigHandle, DiagnosticsMode, ExtensionKernel,
    FnPlugin, PartialConfig, PluginError, PropSpec, RuntimeConfig,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn root() -> Arc<lineage_core::Definition> {
    ExtensionKernel::bootstrap(
        RuntimeConfig::with_diagnostics(DiagnosticsMode::Disabled),
        ComponentOptions::named("Root"),
    )
}

#[test]
fn snapshot_records_base_options_input_and_sealed_copy() {
    let base = root();
    let handle = ConfigHandle::new(PartialConfig::named("Card").with_prop("title", PropSpec::default()));
    let card = base.extend(&handle);

    let snapshot = card.snapshot().expect("derived definitions carry a snapshot");
    assert!(Arc::ptr_eq(snapshot.super_options(), &base.options()));
    assert_eq!(snapshot.extension_handle(), handle.id());
    assert!(Arc::ptr_eq(snapshot.extension_input(), handle.shared_config()));
    assert_eq!(**snapshot.sealed_options(), *card.options());
    assert!(!Arc::ptr_eq(snapshot.sealed_options(), &card.options()));
    assert!(base.snapshot().is_none());
}

#[test]
fn base_mixin_after_extension_is_detected() {
    let base = root();
    let card = base.extend(&ConfigHandle::new(PartialConfig::named("Card")));
    assert!(!card.base_options_changed());

    base.mixin(&PartialConfig::new().with_prop("theme", PropSpec::default()));

    assert!(card.base_options_changed());
    assert!(!card.options().props.contains_key("theme"));
    assert!(base.options().props.contains_key("theme"));
}

#[test]
fn own_mixin_is_detected_against_sealed_options() {
    let base = root();
    let card = base.extend(&ConfigHandle::new(PartialConfig::named("Card")));
    assert!(!card.modified_since_seal());

    card.mixin(&PartialConfig::new().with_hook("created", "card.track"));

    assert!(card.modified_since_seal());
    assert!(!card.base_options_changed());
    assert_eq!(card.options().hooks["created"], vec!["card.track".to_string()]);
}

#[test]
fn plugin_installs_once_per_definition() {
    let installs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&installs);
    let plugin = FnPlugin::new("icons", move |target| {
        counter.fetch_add(1, Ordering::SeqCst);
        target.register_asset(AssetKind::Directive, "icon", AssetEntry::Declared(json!("svg")));
        Ok(())
    });

    let base = root();
    assert!(base.use_plugin(&plugin).expect("first install"));
    assert!(!base.use_plugin(&plugin).expect("second install is skipped"));
    assert_eq!(installs.load(Ordering::SeqCst), 1);
    assert!(base.has_plugin("icons"));

    let derived = base.extend_default();
    assert!(derived.resolve_asset(AssetKind::Directive, "icon").is_some());
    assert!(derived.use_plugin(&plugin).expect("derived definitions can install plugins"));
    assert_eq!(installs.load(Ordering::SeqCst), 2);
}

#[test]
fn failed_plugin_is_not_marked_installed() {
    let plugin = FnPlugin::new("broken", |_| Err(PluginError::new("broken", "missing peer")));
    let base = root();

    let err = base.use_plugin(&plugin).expect_err("install should fail");
    assert_eq!(err.plugin_id, "broken");
    assert!(err.to_string().contains("missing peer"));
    assert!(!base.has_plugin("broken"));
}

#[test]
fn plugin_can_extend_its_target() {
    let base = root();
    let handle = ConfigHandle::new(PartialConfig::named("Toast"));
    let plugin_handle = handle.clone();
    let plugin = FnPlugin::new("toast", move |target| {
        let toast = target.extend(&plugin_handle);
        target.register_component("Toast", toast);
        Ok(())
    });

    base.use_plugin(&plugin).expect("plugin install");

    let registered = base.resolve_component("Toast").expect("toast registered");
    assert!(Arc::ptr_eq(&registered, &base.extend(&handle)));
}
