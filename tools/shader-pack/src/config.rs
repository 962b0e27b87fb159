//! Pipeline configuration
//!
//! The build configuration selects which compiled shader directory is read
//! and which data file is written. Everything else defaults to the renderer's
//! source layout and can be overridden from a TOML manifest:
//!
//! ```toml
//! [input]
//! dir = "ComputeShaders/x64"
//! extension = "cso"
//!
//! [output]
//! dir = "Whisper/D3D"
//! namespace = "DirectCompute"
//! enum_name = "eComputeShader"
//! lookup_fn = "computeShaderName"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::codegen::check_identifier;
use crate::error::{Result, ShaderPackError};

/// Build configuration of the shader project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BuildConfig {
    Debug,
    #[default]
    Release,
}

impl BuildConfig {
    /// Directory / file suffix used by the shader build ("Debug", "Release")
    pub fn name(self) -> &'static str {
        match self {
            BuildConfig::Debug => "Debug",
            BuildConfig::Release => "Release",
        }
    }
}

/// Identifiers used in the generated C++ sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CppNames {
    pub namespace: String,
    pub enum_name: String,
    pub lookup_fn: String,
}

impl Default for CppNames {
    fn default() -> Self {
        Self {
            namespace: "DirectCompute".to_string(),
            enum_name: "eComputeShader".to_string(),
            lookup_fn: "computeShaderName".to_string(),
        }
    }
}

impl CppNames {
    /// Every identifier must be usable verbatim in the generated sources
    pub fn validate(&self) -> Result<()> {
        check_identifier(&self.namespace)?;
        check_identifier(&self.enum_name)?;
        check_identifier(&self.lookup_fn)
    }
}

/// Everything the pipeline needs to locate inputs and outputs
#[derive(Debug, Clone)]
pub struct PackConfig {
    pub root: PathBuf,
    pub build: BuildConfig,
    /// Compiled shaders live in `<root>/<shaders_dir>/<build>`
    pub shaders_dir: PathBuf,
    pub extension: String,
    /// Generated sources are written to `<root>/<output_dir>`
    pub output_dir: PathBuf,
    pub cpp: CppNames,
}

impl PackConfig {
    pub fn new(root: impl Into<PathBuf>, build: BuildConfig) -> Self {
        Self {
            root: root.into(),
            build,
            shaders_dir: PathBuf::from("ComputeShaders").join("x64"),
            extension: "cso".to_string(),
            output_dir: PathBuf::from("Whisper").join("D3D"),
            cpp: CppNames::default(),
        }
    }

    /// Load a manifest file and apply it on top of the defaults
    pub fn with_manifest(mut self, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ShaderPackError::io(path, e))?;
        let manifest: Manifest = toml::from_str(&text).map_err(|source| ShaderPackError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        self.apply(manifest)?;
        Ok(self)
    }

    fn apply(&mut self, manifest: Manifest) -> Result<()> {
        if let Some(input) = manifest.input {
            if let Some(dir) = input.dir {
                self.shaders_dir = dir;
            }
            if let Some(ext) = input.extension {
                self.extension = ext.trim_start_matches('.').to_string();
            }
        }
        if let Some(output) = manifest.output {
            if let Some(dir) = output.dir {
                self.output_dir = dir;
            }
            if let Some(ns) = output.namespace {
                self.cpp.namespace = ns;
            }
            if let Some(name) = output.enum_name {
                self.cpp.enum_name = name;
            }
            if let Some(name) = output.lookup_fn {
                self.cpp.lookup_fn = name;
            }
        }
        self.cpp.validate()
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join(&self.shaders_dir).join(self.build.name())
    }

    pub fn header_path(&self) -> PathBuf {
        self.root.join(&self.output_dir).join("shaderNames.h")
    }

    pub fn names_path(&self) -> PathBuf {
        self.root.join(&self.output_dir).join("shaderNames.cpp")
    }

    pub fn data_path(&self) -> PathBuf {
        self.root
            .join(&self.output_dir)
            .join(format!("shaderData-{}.inl", self.build.name()))
    }
}

/// On-disk manifest, every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    input: Option<InputSection>,
    output: Option<OutputSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct InputSection {
    dir: Option<PathBuf>,
    extension: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputSection {
    dir: Option<PathBuf>,
    namespace: Option<String>,
    enum_name: Option<String>,
    lookup_fn: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_follow_build_config() {
        let config = PackConfig::new("/src", BuildConfig::Debug);
        assert_eq!(
            config.input_dir(),
            PathBuf::from("/src/ComputeShaders/x64/Debug")
        );
        assert_eq!(
            config.data_path(),
            PathBuf::from("/src/Whisper/D3D/shaderData-Debug.inl")
        );

        let release = PackConfig::new("/src", BuildConfig::Release);
        assert!(release.data_path().ends_with("shaderData-Release.inl"));
        assert_eq!(release.header_path(), release.root.join("Whisper/D3D/shaderNames.h"));
    }

    #[test]
    fn test_manifest_overrides() {
        let manifest: Manifest = toml::from_str(
            r#"
            [input]
            dir = "bin/shaders"
            extension = ".dxbc"

            [output]
            namespace = "Gpu"
            "#,
        )
        .unwrap();

        let mut config = PackConfig::new("root", BuildConfig::Release);
        config.apply(manifest).unwrap();

        assert_eq!(config.input_dir(), PathBuf::from("root/bin/shaders/Release"));
        assert_eq!(config.extension, "dxbc");
        assert_eq!(config.cpp.namespace, "Gpu");
        assert_eq!(config.cpp.enum_name, "eComputeShader");
        assert_eq!(config.output_dir, PathBuf::from("Whisper").join("D3D"));
    }

    #[test]
    fn test_manifest_rejects_invalid_identifiers() {
        for output in [
            "namespace = \"Direct Compute\"",
            "enum_name = \"2shaders\"",
            "lookup_fn = \"name(\"",
        ] {
            let manifest: Manifest = toml::from_str(&format!("[output]\n{output}\n")).unwrap();
            let mut config = PackConfig::new("root", BuildConfig::Release);
            let err = config.apply(manifest).unwrap_err();
            assert!(matches!(err, ShaderPackError::InvalidIdentifier(_)), "{output}");
        }
    }

    #[test]
    fn test_manifest_rejects_unknown_keys() {
        let result: std::result::Result<Manifest, _> = toml::from_str("[input]\nfolder = \"x\"\n");
        assert!(result.is_err());
    }
}
