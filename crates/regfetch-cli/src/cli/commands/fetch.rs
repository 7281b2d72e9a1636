//! `regfetch fetch` – download the aliased artifact file.

use anyhow::{Context, Result};
use regfetch_core::config::FetchConfig;
use regfetch_core::{fetch, FetchEvent, FetchRequest, RegistryClient};

pub fn run_fetch(cfg: &FetchConfig) -> Result<()> {
    let req = FetchRequest::from_config(cfg);
    let outcome = RegistryClient::from_config(cfg)
        .and_then(|client| fetch(&client, &req, print_event))
        .context("failed to download model")?;

    println!("SHA-256: {}", outcome.sha256);
    if let Some(meta) = &outcome.metadata_path {
        println!("Metadata written to: {}", meta.display());
    }
    Ok(())
}

fn print_event(event: FetchEvent<'_>) {
    match event {
        FetchEvent::Resolving { reference } => {
            println!("Fetching {} model from registry ({})...", reference.alias, reference)
        }
        FetchEvent::Found { artifact } => {
            println!("Found artifact: {} (ID: {})", artifact.name, artifact.id)
        }
        FetchEvent::Downloading { filename, .. } => println!("Downloading {}...", filename),
        FetchEvent::Saved { path, bytes } => {
            println!("Model saved to: {} ({} bytes)", path.display(), bytes)
        }
    }
}
