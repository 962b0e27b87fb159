//! Compute shader packer
//!
//! Collects compiled compute shader binaries, pairs the Wave32 and Wave64
//! builds of each shader, and generates the C++ sources the renderer embeds:
//! an enum of shader names, a name lookup table, and a data file with the
//! compressed binaries and their index tables.
//!
//! Stages run strictly in order and every output is rendered in memory
//! before the first file is written. Files are staged next to their
//! destinations and moved into place together, so a failed run leaves the
//! previous generated files untouched.

pub mod catalog;
pub mod codegen;
pub mod compress;
pub mod config;
pub mod dxbc;
pub mod error;
pub mod payload;
pub mod source;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use catalog::Catalog;
pub use compress::{Compressor, Lz4Compressor};
pub use config::{BuildConfig, CppNames, PackConfig};
pub use dxbc::{DxbcFp64Detector, Fp64Detector};
pub use error::{Result, ShaderPackError};
pub use payload::{Fp64Bitmap, Payload};
pub use source::ShaderBinary;

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

/// Statistics of a pack run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackSummary {
    pub binaries: usize,
    pub shaders: usize,
    pub source_bytes: usize,
    pub compressed_bytes: usize,
    pub fp64_binaries: usize,
}

impl fmt::Display for PackSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Compressed {} compute shaders, {:.1} kb -> {:.1} kb",
            self.binaries,
            self.source_bytes as f64 / 1024.0,
            self.compressed_bytes as f64 / 1024.0
        )
    }
}

/// All outputs of a run, not yet written
#[derive(Debug, Clone)]
pub struct Rendered {
    pub artifacts: Vec<Artifact>,
    pub summary: PackSummary,
}

/// Render with the default LZ4 compressor and DXBC FP64 detection
pub fn render(config: &PackConfig) -> Result<Rendered> {
    render_with(config, &Lz4Compressor, &DxbcFp64Detector)
}

/// Load, reconcile, encode and render every output in memory
pub fn render_with(
    config: &PackConfig,
    compressor: &dyn Compressor,
    detector: &dyn Fp64Detector,
) -> Result<Rendered> {
    let input_dir = config.input_dir();
    info!("Reading compiled shaders from {}", input_dir.display());

    let binaries = source::load_directory(&input_dir, &config.extension)?;
    let catalog = Catalog::build(binaries)?;
    info!(
        "Catalog: {} shaders, {} binaries",
        catalog.names().len(),
        catalog.binaries().len()
    );

    let payload = Payload::encode(&catalog, compressor, detector)?;
    payload.verify(compressor, &catalog)?;

    let header_path = config.header_path();
    let header_file = header_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let artifacts = vec![
        Artifact {
            contents: codegen::header::generate_header(catalog.names(), &config.cpp)?,
            path: header_path,
        },
        Artifact {
            path: config.names_path(),
            contents: codegen::names::generate_names(catalog.names(), &config.cpp, &header_file)?,
        },
        Artifact {
            path: config.data_path(),
            contents: codegen::data::generate_data(&payload, compressor.name())?,
        },
    ];

    let summary = PackSummary {
        binaries: catalog.binaries().len(),
        shaders: catalog.names().len(),
        source_bytes: payload.concatenated.len(),
        compressed_bytes: payload.compressed.len(),
        fp64_binaries: payload.fp64.count(),
    };

    Ok(Rendered { artifacts, summary })
}

/// Generate and write all sources
pub fn generate(config: &PackConfig) -> Result<PackSummary> {
    let rendered = render(config)?;
    write_artifacts(&rendered.artifacts)?;
    Ok(rendered.summary)
}

/// Write rendered sources, creating their directories.
///
/// Every file is first written next to its destination as `<name>.tmp`;
/// the destinations are replaced only once all of them were staged.
pub fn write_artifacts(artifacts: &[Artifact]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(artifacts.len());
    let result = stage_artifacts(artifacts, &mut staged).and_then(|()| {
        match staged.iter().find(|(_, dest)| dest.is_dir()) {
            Some((_, dest)) => Err(ShaderPackError::io(
                *dest,
                io::Error::other("destination is a directory"),
            )),
            None => Ok(()),
        }
    });
    if let Err(e) = result {
        discard_staged(&staged);
        return Err(e);
    }

    for (tmp, dest) in &staged {
        std::fs::rename(tmp, dest).map_err(|e| ShaderPackError::io(*dest, e))?;
        info!("Generated {}", dest.display());
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn stage_artifacts<'a>(
    artifacts: &'a [Artifact],
    staged: &mut Vec<(PathBuf, &'a Path)>,
) -> Result<()> {
    for artifact in artifacts {
        if let Some(dir) = artifact.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| ShaderPackError::io(dir, e))?;
        }
        let tmp = staging_path(&artifact.path);
        std::fs::write(&tmp, &artifact.contents).map_err(|e| ShaderPackError::io(&tmp, e))?;
        staged.push((tmp, &artifact.path));
    }
    Ok(())
}

fn discard_staged(staged: &[(PathBuf, &Path)]) {
    for (tmp, _) in staged {
        if let Err(e) = std::fs::remove_file(tmp) {
            warn!("Failed to remove {}: {}", tmp.display(), e);
        }
    }
}

/// Check that the generated sources on disk match the compiled shaders
pub fn check(config: &PackConfig) -> Result<bool> {
    let rendered = render(config)?;

    let mut in_sync = true;
    for artifact in &rendered.artifacts {
        let existing = match std::fs::read_to_string(&artifact.path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(ShaderPackError::io(&artifact.path, e)),
        };

        if existing.as_deref() == Some(artifact.contents.as_str()) {
            println!("✓ In sync: {}", artifact.path.display());
        } else {
            println!("✗ Out of sync: {}", artifact.path.display());
            in_sync = false;
        }
    }

    Ok(in_sync)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        let summary = PackSummary {
            binaries: 3,
            shaders: 2,
            source_bytes: 2048,
            compressed_bytes: 512,
            fp64_binaries: 0,
        };
        assert_eq!(
            summary.to_string(),
            "Compressed 3 compute shaders, 2.0 kb -> 0.5 kb"
        );
    }
}
