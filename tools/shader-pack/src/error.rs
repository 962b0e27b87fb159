//! Error type for the shader packing pipeline

use std::path::PathBuf;

/// Everything that can abort a shader pack run
#[derive(Debug, thiserror::Error)]
pub enum ShaderPackError {
    /// A Wave64 binary exists without its Wave32 baseline
    #[error("Wave64 shader {0} doesn't have the corresponding Wave32 one")]
    InconsistentCatalog(String),

    /// Two binaries claim the same logical name and wave width
    #[error("shader {name} has more than one {width} binary")]
    DuplicateShader { name: String, width: &'static str },

    /// File stem is empty once the wave-width suffix is stripped
    #[error("invalid shader file name {0:?}")]
    InvalidFileName(PathBuf),

    /// Logical name cannot be used as a C++ enumerator
    #[error("shader name {0:?} is not a valid C++ identifier")]
    InvalidIdentifier(String),

    /// Catalog built from an empty set of binaries
    #[error("no compiled shaders to pack")]
    EmptyCatalog,

    /// Input directory contained no shader binaries
    #[error("no compiled shaders found in {0}")]
    NoShaders(PathBuf),

    /// Index tables are `uint8_t` arrays
    #[error("{0} shader binaries found, the index tables support at most 256")]
    TooManyBinaries(usize),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compression failed: {0}")]
    Compression(String),

    /// Concatenated payload exceeds the `uint32_t` offset table
    #[error("concatenated shaders are {0} bytes, offsets must fit in 32 bits")]
    PayloadTooLarge(usize),

    /// Malformed DXBC container
    #[error("shader {name}: {reason}")]
    Dxbc { name: String, reason: String },

    #[error("failed to parse manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to format generated source: {0}")]
    Format(#[from] std::fmt::Error),
}

impl ShaderPackError {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit status reported by the CLI
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InconsistentCatalog(_)
            | Self::DuplicateShader { .. }
            | Self::InvalidFileName(_)
            | Self::InvalidIdentifier(_)
            | Self::NoShaders(_)
            | Self::EmptyCatalog
            | Self::TooManyBinaries(_)
            | Self::Dxbc { .. }
            | Self::Manifest { .. } => 2,
            Self::Io { .. } => 3,
            Self::Compression(_) | Self::PayloadTooLarge(_) => 4,
            Self::Format(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShaderPackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inconsistent_catalog_message_names_shader() {
        let err = ShaderPackError::InconsistentCatalog("onlyX".to_string());
        assert_eq!(
            err.to_string(),
            "Wave64 shader onlyX doesn't have the corresponding Wave32 one"
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_io_error_includes_path() {
        let err = ShaderPackError::io(
            "shaders/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.to_string().starts_with("shaders/missing"));
        assert_eq!(err.exit_code(), 3);
    }
}
