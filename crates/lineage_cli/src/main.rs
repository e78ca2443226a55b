//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `lineage_core` linkage.
//! - Optionally extend a chain of partial configurations read from a JSON
//!   file (`{"root": {...}, "chain": [{...}, ...]}`) and print each level.

use lineage_core::{
    default_log_level, init_logging, ComponentOptions, ConfigHandle, Definition,
    ExtensionKernel, LogTarget, PartialConfig, RuntimeConfig,
};
use serde_json::Value;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    println!("lineage_core ping={}", lineage_core::ping());
    println!("lineage_core version={}", lineage_core::core_version());

    let Some(path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    if let Err(err) = init_logging(default_log_level(), LogTarget::Stderr) {
        eprintln!("logging disabled: {err}");
    }

    match run_chain(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_chain module=cli status=error path={path}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_chain(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&raw)?;

    let config = match document.get("runtime") {
        Some(runtime) => serde_json::from_value::<RuntimeConfig>(runtime.clone())?,
        None => RuntimeConfig::default(),
    };
    let root_options = match document.get("root") {
        Some(root) => serde_json::from_value::<ComponentOptions>(root.clone())?,
        None => ComponentOptions::default(),
    };
    let chain = match document.get("chain") {
        Some(chain) => serde_json::from_value::<Vec<PartialConfig>>(chain.clone())?,
        None => Vec::new(),
    };

    let mut current = ExtensionKernel::bootstrap(config, root_options);
    print_level(&current);
    for partial in chain {
        current = current.extend(&ConfigHandle::new(partial));
        print_level(&current);
    }

    for diagnostic in current.kernel().diagnostics() {
        println!("diagnostic: {diagnostic}");
    }
    Ok(())
}

fn print_level(definition: &Arc<Definition>) {
    let options = definition.options();
    println!(
        "cid={} parent={} name={} props=[{}] computed=[{}]",
        definition.id(),
        definition
            .parent()
            .map(|parent| parent.id().to_string())
            .unwrap_or_else(|| "-".to_string()),
        options.name.as_deref().unwrap_or("-"),
        options.props.keys().cloned().collect::<Vec<_>>().join(","),
        options.computed.keys().cloned().collect::<Vec<_>>().join(","),
    );
}
