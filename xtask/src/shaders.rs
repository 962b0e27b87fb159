//! Compute shader packing commands

use anyhow::{Context, Result};
use clap::Subcommand;
use shader_pack::{BuildConfig, PackConfig};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum ShadersCommand {
    /// Regenerate shader sources from the compiled shaders
    Generate {
        /// Build configuration (default: all)
        #[arg(short, long, value_enum)]
        config: Option<BuildConfig>,

        /// Manifest overriding the default layout
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Check that generated shader sources are in sync
    Check {
        /// Build configuration (default: all)
        #[arg(short, long, value_enum)]
        config: Option<BuildConfig>,

        /// Manifest overriding the default layout
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
}

pub fn execute(command: ShadersCommand, root: &Path) -> Result<()> {
    match command {
        ShadersCommand::Generate { config, manifest } => generate(root, config, manifest),
        ShadersCommand::Check { config, manifest } => check(root, config, manifest),
    }
}

fn configs(
    root: &Path,
    build: Option<BuildConfig>,
    manifest: Option<PathBuf>,
) -> Result<Vec<PackConfig>> {
    let builds = match build {
        Some(b) => vec![b],
        None => vec![BuildConfig::Debug, BuildConfig::Release],
    };

    builds
        .into_iter()
        .map(|b| {
            let config = PackConfig::new(root, b);
            match &manifest {
                Some(path) => config
                    .with_manifest(path)
                    .with_context(|| format!("Failed to load {}", path.display())),
                None => Ok(config),
            }
        })
        .collect()
}

fn generate(root: &Path, build: Option<BuildConfig>, manifest: Option<PathBuf>) -> Result<()> {
    println!("Generating shader sources...");

    for config in configs(root, build, manifest)? {
        let summary = shader_pack::generate(&config)
            .with_context(|| format!("{} shaders", config.build.name()))?;
        println!("{}: {}", config.build.name(), summary);
    }

    println!("✓ Done!");
    Ok(())
}

fn check(root: &Path, build: Option<BuildConfig>, manifest: Option<PathBuf>) -> Result<()> {
    println!("Checking shader sources are in sync...");

    let mut all_in_sync = true;
    for config in configs(root, build, manifest)? {
        if !shader_pack::check(&config)? {
            all_in_sync = false;
        }
    }

    if all_in_sync {
        println!("\n✓ All shader sources are in sync!");
        Ok(())
    } else {
        anyhow::bail!("Shader sources are out of sync. Run 'cargo xtask shaders generate' to regenerate.")
    }
}
