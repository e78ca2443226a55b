use lineage_core::{
    ComponentOptions, ConfigHandle, DiagnosticsMode, ExtensionKernel, NameDiagnostic,
    NameValidator, PartialConfig, RuntimeConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct CountingValidator {
    calls: AtomicUsize,
}

impl NameValidator for CountingValidator {
    fn validate(&self, _name: &str) -> Option<NameDiagnostic> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        None
    }
}

#[test]
fn invalid_name_raises_diagnostic_when_enabled_but_still_extends() {
    let root = ExtensionKernel::bootstrap(
        RuntimeConfig::with_diagnostics(DiagnosticsMode::Enabled),
        ComponentOptions::default(),
    );

    let derived = root.extend(&ConfigHandle::new(PartialConfig::named("123invalid")));

    assert_eq!(derived.name().as_deref(), Some("123invalid"));
    assert_eq!(
        root.kernel().diagnostics(),
        vec![NameDiagnostic::InvalidFormat("123invalid".to_string())]
    );
}

#[test]
fn invalid_name_is_accepted_silently_when_disabled() {
    let root = ExtensionKernel::bootstrap(
        RuntimeConfig::with_diagnostics(DiagnosticsMode::Disabled),
        ComponentOptions::default(),
    );

    let derived = root.extend(&ConfigHandle::new(PartialConfig::named("123invalid")));

    assert_eq!(derived.name().as_deref(), Some("123invalid"));
    assert!(root.kernel().diagnostics().is_empty());
    assert!(derived.resolve_component("123invalid").is_some());
}

#[test]
fn reserved_names_are_reported() {
    let root = ExtensionKernel::bootstrap(
        RuntimeConfig {
            diagnostics: DiagnosticsMode::Enabled,
            reserved_tags: vec!["app-shell".to_string()],
        },
        ComponentOptions::default(),
    );

    root.extend(&ConfigHandle::new(PartialConfig::named("slot")));
    root.extend(&ConfigHandle::new(PartialConfig::named("app-shell")));

    let diagnostics = root.kernel().take_diagnostics();
    assert_eq!(
        diagnostics,
        vec![
            NameDiagnostic::Reserved("slot".to_string()),
            NameDiagnostic::Reserved("app-shell".to_string()),
        ]
    );
    assert!(root.kernel().diagnostics().is_empty());
}

#[test]
fn validator_skipped_for_unnamed_extensions_and_cache_hits() {
    let validator = Arc::new(CountingValidator::default());
    let kernel = ExtensionKernel::builder()
        .config(RuntimeConfig::with_diagnostics(DiagnosticsMode::Enabled))
        .validator(validator.clone())
        .build();
    let root = kernel.root(ComponentOptions::default());

    root.extend_default();
    assert_eq!(validator.calls.load(Ordering::SeqCst), 0);

    let handle = ConfigHandle::new(PartialConfig::named("Card"));
    root.extend(&handle);
    root.extend(&handle);
    assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn validator_is_never_consulted_when_disabled() {
    let validator = Arc::new(CountingValidator::default());
    let kernel = ExtensionKernel::builder()
        .config(RuntimeConfig::with_diagnostics(DiagnosticsMode::Disabled))
        .validator(validator.clone())
        .build();
    let root = kernel.root(ComponentOptions::default());

    root.extend(&ConfigHandle::new(PartialConfig::named("Card")));
    root.register_component("Other", root.extend_default());

    assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn base_name_fallback_is_validated() {
    let root = ExtensionKernel::bootstrap(
        RuntimeConfig::with_diagnostics(DiagnosticsMode::Enabled),
        ComponentOptions::named("9lives"),
    );

    let derived = root.extend_default();

    assert_eq!(derived.name().as_deref(), Some("9lives"));
    assert_eq!(root.kernel().diagnostics().len(), 1);
}

#[test]
fn component_registration_is_validated() {
    let root = ExtensionKernel::bootstrap(
        RuntimeConfig::with_diagnostics(DiagnosticsMode::Enabled),
        ComponentOptions::default(),
    );
    let child = root.extend_default();

    root.register_component("div", child);

    assert_eq!(
        root.kernel().diagnostics(),
        vec![NameDiagnostic::Reserved("div".to_string())]
    );
    assert!(root.resolve_component("div").is_some());
}
