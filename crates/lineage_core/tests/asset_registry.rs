use lineage_core::{
    AssetEntry, AssetKind, ComponentOptions, ConfigHandle, DiagnosticsMode, ExtensionKernel,
    PartialConfig, RuntimeConfig,
};
use serde_json::json;
use std::sync::Arc;

fn root() -> Arc<lineage_core::Definition> {
    ExtensionKernel::bootstrap(
        RuntimeConfig::with_diagnostics(DiagnosticsMode::Disabled),
        ComponentOptions::default(),
    )
}

#[test]
fn named_definition_resolves_itself() {
    let base = root();
    let greeter = base.extend(&ConfigHandle::new(PartialConfig::named("Greeter")));

    let found = greeter
        .resolve_component("Greeter")
        .expect("self-registration should be visible");
    assert!(Arc::ptr_eq(&found, &greeter));
    assert!(matches!(
        greeter.assets(AssetKind::Component).local("Greeter"),
        Some(AssetEntry::Recursive(_))
    ));
    assert!(base.resolve_component("Greeter").is_none());
}

#[test]
fn unnamed_definition_inherits_base_name_for_self_lookup() {
    let base = root();
    let tree = base.extend(&ConfigHandle::new(PartialConfig::named("TreeNode")));
    let styled = tree.extend_default();

    assert_eq!(styled.name().as_deref(), Some("TreeNode"));
    let found = styled
        .resolve_component("TreeNode")
        .expect("derived registers under inherited name");
    assert!(Arc::ptr_eq(&found, &styled));
}

#[test]
fn self_reference_does_not_keep_definition_alive() {
    let base = root();
    let handle = ConfigHandle::new(PartialConfig::named("Leaf"));
    let leaf = base.extend(&handle);
    let entry = leaf
        .resolve_asset(AssetKind::Component, "Leaf")
        .expect("self entry");

    drop(handle);
    drop(leaf);

    assert!(entry.definition().is_none());
}

#[test]
fn base_registry_entries_stay_visible_on_derived() {
    let base = root();
    base.register_asset(AssetKind::Directive, "a", AssetEntry::Declared(json!({ "bind": "a" })));
    base.register_asset(AssetKind::Directive, "b", AssetEntry::Declared(json!({ "bind": "b" })));

    let derived = base.extend(&ConfigHandle::new(PartialConfig::named("Panel")));

    let registry = derived.assets(AssetKind::Directive);
    assert_eq!(registry.local_names().count(), 0);
    let a = registry.resolve("a").expect("a is inherited");
    let b = registry.resolve("b").expect("b is inherited");
    assert_eq!(a.declared(), Some(&json!({ "bind": "a" })));
    assert_eq!(b.declared(), Some(&json!({ "bind": "b" })));
}

#[test]
fn derived_registry_shares_base_registry_by_reference() {
    let base = root();
    base.register_asset(AssetKind::Filter, "upper", AssetEntry::Declared(json!("upper")));
    let derived = base.extend_default();

    let base_registry = base.assets(AssetKind::Filter);
    let derived_registry = derived.assets(AssetKind::Filter);
    let inherited = derived_registry.parent().expect("derived registry has parent");
    assert!(Arc::ptr_eq(inherited, &base_registry));
}

#[test]
fn local_declarations_shadow_inherited_entries() {
    let base = root();
    base.register_asset(AssetKind::Directive, "focus", AssetEntry::Declared(json!("base")));

    let mut partial = PartialConfig::named("Form");
    partial
        .directives
        .insert("focus".to_string(), json!("local"));
    let derived = base.extend(&ConfigHandle::new(partial));

    let local = derived
        .resolve_asset(AssetKind::Directive, "focus")
        .expect("focus resolves");
    assert_eq!(local.declared(), Some(&json!("local")));
    let original = base
        .resolve_asset(AssetKind::Directive, "focus")
        .expect("base focus resolves");
    assert_eq!(original.declared(), Some(&json!("base")));
}

#[test]
fn registrations_on_base_after_extension_are_not_seen_by_derived() {
    let base = root();
    base.register_asset(AssetKind::Directive, "early", AssetEntry::Declared(json!(1)));
    let derived = base.extend_default();

    base.register_asset(AssetKind::Directive, "late", AssetEntry::Declared(json!(2)));

    assert!(base.resolve_asset(AssetKind::Directive, "late").is_some());
    assert!(derived.resolve_asset(AssetKind::Directive, "late").is_none());
    assert!(derived.resolve_asset(AssetKind::Directive, "early").is_some());
}

#[test]
fn registered_components_resolve_through_descendants() {
    let base = root();
    let button = base.extend(&ConfigHandle::new(PartialConfig::named("AppButton")));
    base.register_component("AppButton", Arc::clone(&button));

    let page = base.extend(&ConfigHandle::new(PartialConfig::named("Page")));
    let resolved = page
        .resolve_component("AppButton")
        .expect("component registered on base");
    assert!(Arc::ptr_eq(&resolved, &button));
}

#[test]
fn every_asset_kind_is_propagated() {
    let base = root();
    for kind in AssetKind::ALL {
        base.register_asset(kind, format!("{}-entry", kind.as_str()), AssetEntry::Declared(json!(kind.as_str())));
    }
    let derived = base.extend_default();

    for kind in AssetKind::ALL {
        let name = format!("{}-entry", kind.as_str());
        assert!(
            derived.resolve_asset(kind, &name).is_some(),
            "{} registry should be inherited",
            kind.as_str()
        );
    }
}

#[test]
fn mixin_registers_declared_assets() {
    let base = root();
    let mut partial = PartialConfig::new();
    partial.directives.insert("focus".to_string(), json!("focus"));
    partial.components.insert("Btn".to_string(), json!({ "template": "<button/>" }));
    partial.filters.insert("upper".to_string(), json!("upper"));

    base.mixin(&partial);

    let focus = base
        .resolve_asset(AssetKind::Directive, "focus")
        .expect("mixin directive registered");
    assert_eq!(focus.declared(), Some(&json!("focus")));
    assert!(base.resolve_asset(AssetKind::Component, "Btn").is_some());
    assert!(base.resolve_asset(AssetKind::Filter, "upper").is_some());

    let derived = base.extend_default();
    assert!(derived.resolve_asset(AssetKind::Directive, "focus").is_some());
}
