//! Component-definition extension core.
//!
//! # Responsibility
//! - Derive component definitions from a base with memoized reuse.
//! - Expose the public model, kernel and logging entry points.
//!
//! # Invariants
//! - Definition identities are unique across the whole process.
//! - Accessor tables are built once per definition, never per instance.

pub mod config;
pub mod definition;
pub mod extension;
pub mod logging;
pub mod model;

pub use config::{ConfigError, DiagnosticsMode, RuntimeConfig};
pub use definition::assets::{AssetEntry, AssetKind, AssetRegistry, AssetTable};
pub use definition::instance::{ComponentInstance, InstanceError};
pub use definition::template::{
    Accessor, BehaviorTemplate, ComputedAccessor, ComputedGetter, ComputedSetter,
};
pub use definition::{Definition, ExtensionSnapshot};
pub use extension::accessors::{HandlerEvaluator, ReactiveEvaluator};
pub use extension::cache::{ConfigHandle, ExtensionCache, HandleId};
pub use extension::capability::{FnPlugin, Plugin, PluginError};
pub use extension::kernel::{ExtensionKernel, KernelBuilder};
pub use extension::merge::{DefaultOptionsMerger, OptionsMerger};
pub use extension::naming::{DefaultNameValidator, NameDiagnostic, NameValidator};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::identity::{DefinitionId, IdentityAllocator};
pub use model::options::{ComponentOptions, ComputedSpec, PartialConfig, PropSpec, PropType};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
