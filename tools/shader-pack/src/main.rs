//! shader-pack - compute shader packer
//!
//! Converts the compiled compute shaders of one build configuration into the
//! generated C++ sources embedded by the renderer.
//!
//! ```bash
//! # Regenerate sources from the Release shader build
//! shader-pack generate --root path/to/solution
//!
//! # Fail if committed sources are stale
//! shader-pack check --root path/to/solution --config debug
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use shader_pack::{BuildConfig, PackConfig, ShaderPackError};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "shader-pack")]
#[command(about = "Pack compiled compute shaders into generated C++ sources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the shader enum, name table and data file
    Generate(PackArgs),

    /// Check that generated sources are in sync with the compiled shaders
    Check(PackArgs),
}

#[derive(Args)]
struct PackArgs {
    /// Solution root containing the shader build and renderer sources
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Shader build configuration
    #[arg(short, long, value_enum, default_value_t = BuildConfig::Release)]
    config: BuildConfig,

    /// Optional TOML manifest overriding paths and generated identifiers
    #[arg(short, long)]
    manifest: Option<PathBuf>,
}

impl PackArgs {
    fn into_config(self) -> Result<PackConfig> {
        let config = PackConfig::new(self.root, self.config);
        match self.manifest {
            Some(path) => config
                .with_manifest(&path)
                .with_context(|| format!("Failed to load manifest {}", path.display())),
            None => Ok(config),
        }
    }
}

fn main() -> ExitCode {
    // Logs go to stderr, stdout carries the summary or the error line
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            println!("{:#}", err);
            let code = err
                .chain()
                .find_map(|e| e.downcast_ref::<ShaderPackError>())
                .map_or(1, ShaderPackError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Generate(args) => {
            let config = args.into_config()?;
            let summary = shader_pack::generate(&config)?;
            println!("{}", summary);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check(args) => {
            let config = args.into_config()?;
            if shader_pack::check(&config)? {
                println!("✓ Generated shader sources are in sync");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("Generated shader sources are out of sync. Run 'shader-pack generate' to regenerate.");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
