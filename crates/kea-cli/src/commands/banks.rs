//! Bank format listing command

use std::path::Path;

use anyhow::Result;

use super::build_registry;

pub fn cmd_banks(bank_configs: Option<&Path>) -> Result<()> {
    let registry = build_registry(bank_configs)?;

    println!("🏦 Registered bank formats:");
    for config in registry.configs() {
        let identifiers: Vec<&str> = config
            .filename_patterns
            .iter()
            .chain(config.header_patterns.iter())
            .map(|s| s.as_str())
            .collect();
        println!("   {:<10} matched by: {}", config.name, identifiers.join(", "));
    }

    Ok(())
}
