//! CLI for regfetch.

mod commands;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use regfetch_core::config::{self, FetchConfig};
use regfetch_core::ArtifactRef;
use std::path::{Path, PathBuf};

use commands::{run_checksum, run_completions, run_fetch, run_info, run_man};

/// Top-level CLI. With no subcommand, `fetch` runs with its defaults.
#[derive(Debug, Parser)]
#[command(name = "regfetch", version)]
#[command(about = "Download the production model file from the model registry", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/regfetch/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download the aliased artifact file into the output directory.
    Fetch(FetchArgs),

    /// Resolve the alias and print artifact metadata without downloading.
    Info {
        /// Alias (or vN version) to resolve instead of the configured one.
        #[arg(long)]
        alias: Option<String>,
    },

    /// Compute SHA-256 of a file (e.g. after download).
    Checksum {
        /// Path to the file.
        path: String,
    },

    /// Print shell completions to stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

#[derive(Debug, Default, Args)]
pub struct FetchArgs {
    /// Full reference `entity/project/collection:alias`, replacing the configured one.
    #[arg(long, value_name = "REF")]
    pub artifact: Option<ArtifactRef>,

    /// Alias (or vN version) to fetch.
    #[arg(long)]
    pub alias: Option<String>,

    /// Member file to download from the artifact.
    #[arg(long, value_name = "NAME")]
    pub file: Option<String>,

    /// Directory to write into (default: <workspace>/assets).
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also write model_metadata.json next to the file.
    #[arg(long)]
    pub metadata: bool,
}

impl FetchArgs {
    /// Layer command-line overrides on top of the loaded config.
    pub fn apply(&self, cfg: &mut FetchConfig) {
        if let Some(r) = &self.artifact {
            cfg.entity = r.entity.clone();
            cfg.project = r.project.clone();
            cfg.collection = r.collection.clone();
            cfg.alias = r.alias.clone();
        }
        if let Some(alias) = &self.alias {
            cfg.alias = alias.clone();
        }
        if let Some(file) = &self.file {
            cfg.filename = file.clone();
        }
        if let Some(dir) = &self.output_dir {
            cfg.output_dir = Some(dir.clone());
        }
        if self.metadata {
            cfg.write_metadata = true;
        }
    }
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Commands that need neither config nor credentials.
        match &cli.command {
            Some(CliCommand::Completions { shell }) => {
                return run_completions(*shell, &mut Cli::command())
            }
            Some(CliCommand::Man) => return run_man(Cli::command()),
            Some(CliCommand::Checksum { path }) => return run_checksum(Path::new(path)),
            _ => {}
        }

        let mut cfg = load_config(cli.config.as_deref())?;
        match cli.command {
            None => run_fetch(&cfg)?,
            Some(CliCommand::Fetch(args)) => {
                args.apply(&mut cfg);
                tracing::debug!("effective config: {:?}", cfg);
                run_fetch(&cfg)?;
            }
            Some(CliCommand::Info { alias }) => {
                if let Some(alias) = alias {
                    cfg.alias = alias;
                }
                run_info(&cfg)?;
            }
            Some(CliCommand::Checksum { .. } | CliCommand::Completions { .. } | CliCommand::Man) => {}
        }

        Ok(())
    }
}

fn load_config(path: Option<&Path>) -> Result<FetchConfig> {
    let Some(path) = path else {
        return config::load_or_default();
    };
    let mut cfg = config::load_from_path(path)?
        .with_context(|| format!("config file {} not found", path.display()))?;
    cfg.apply_env_overrides(std::env::var(config::BASE_URL_ENV).ok());
    Ok(cfg)
}

#[cfg(test)]
mod tests;
