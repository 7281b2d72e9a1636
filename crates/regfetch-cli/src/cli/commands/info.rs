//! `regfetch info` – resolve the alias and show what it points at.

use anyhow::{Context, Result};
use regfetch_core::config::FetchConfig;
use regfetch_core::RegistryClient;

pub fn run_info(cfg: &FetchConfig) -> Result<()> {
    let reference = cfg.reference();
    let client = RegistryClient::from_config(cfg)?;
    let artifact = client
        .artifact(&reference)
        .with_context(|| format!("failed to resolve {}", reference))?;

    let dash = || "-".to_string();
    println!("{:<10} {}", "REFERENCE", reference);
    println!("{:<10} {}", "NAME", artifact.name);
    println!("{:<10} {}", "ID", artifact.id);
    println!("{:<10} {}", "VERSION", artifact.version().unwrap_or_else(dash));
    println!(
        "{:<10} {}",
        "TYPE",
        artifact.type_name.clone().unwrap_or_else(dash)
    );
    println!("{:<10} {}", "STATE", artifact.state.clone().unwrap_or_else(dash));
    println!(
        "{:<10} {}",
        "SIZE",
        artifact.size.map(|s| s.to_string()).unwrap_or_else(dash)
    );
    println!("{:<10} {}", "DIGEST", artifact.digest.clone().unwrap_or_else(dash));
    println!("{:<10} {}", "ALIASES", artifact.aliases.join(", "));
    Ok(())
}
