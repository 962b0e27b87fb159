//! Loading compiled shader binaries from disk
//!
//! Each file is named `<logical name>[64].<ext>`; the optional `64` suffix
//! marks the Wave64 build of the same compute shader.

use std::path::Path;
use tracing::debug;

use crate::error::{Result, ShaderPackError};

/// Suffix of the file stem that marks a Wave64 binary
pub const WAVE64_SUFFIX: &str = "64";

/// One compiled shader binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBinary {
    /// File stem, the sort key of the catalog
    pub name: String,
    /// Stem without the wave-width suffix
    pub logical_name: String,
    pub is_wave64: bool,
    pub bytes: Vec<u8>,
}

impl ShaderBinary {
    /// Build a binary from its file stem, or `None` when the stem has no logical name
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Option<Self> {
        let name = name.into();
        let (logical_name, is_wave64) = parse_file_name(&name)?;
        Some(Self {
            logical_name: logical_name.to_string(),
            is_wave64,
            name,
            bytes,
        })
    }

    /// Human readable wave width
    pub fn width(&self) -> &'static str {
        if self.is_wave64 { "Wave64" } else { "Wave32" }
    }
}

/// Split a file stem into `(logical name, is_wave64)`.
///
/// Returns `None` when nothing is left of the name after removing the suffix.
pub fn parse_file_name(stem: &str) -> Option<(&str, bool)> {
    let (logical, wave64) = match stem.strip_suffix(WAVE64_SUFFIX) {
        Some(base) => (base, true),
        None => (stem, false),
    };
    if logical.is_empty() {
        None
    } else {
        Some((logical, wave64))
    }
}

/// Read every `*.<extension>` file of a directory (non-recursive)
pub fn load_directory(dir: &Path, extension: &str) -> Result<Vec<ShaderBinary>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ShaderPackError::io(dir, e))?;

    let mut binaries = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ShaderPackError::io(dir, e))?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if !matches_ext {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            return Err(ShaderPackError::InvalidFileName(path));
        };
        let bytes = std::fs::read(&path).map_err(|e| ShaderPackError::io(&path, e))?;

        let Some(binary) = ShaderBinary::new(stem, bytes) else {
            return Err(ShaderPackError::InvalidFileName(path));
        };
        debug!(
            "Loaded {} ({}, {} bytes)",
            binary.name,
            binary.width(),
            binary.bytes.len()
        );
        binaries.push(binary);
    }

    if binaries.is_empty() {
        return Err(ShaderPackError::NoShaders(dir.to_path_buf()));
    }

    Ok(binaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_file_name() {
        assert_eq!(parse_file_name("fooA"), Some(("fooA", false)));
        assert_eq!(parse_file_name("fooA64"), Some(("fooA", true)));
        assert_eq!(parse_file_name("mulMat64x32"), Some(("mulMat64x32", false)));
        assert_eq!(parse_file_name("mulMat64x64"), Some(("mulMat64x", true)));
        assert_eq!(parse_file_name("64"), None);
        assert_eq!(parse_file_name(""), None);
    }

    #[test]
    fn test_load_directory_filters_extension() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("add.cso"), [1, 2, 3]).unwrap();
        std::fs::write(dir.path().join("add64.cso"), [4, 5]).unwrap();
        std::fs::write(dir.path().join("add.pdb"), [9]).unwrap();
        std::fs::create_dir(dir.path().join("nested.cso")).unwrap();

        let mut binaries = load_directory(dir.path(), "cso").unwrap();
        binaries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(binaries.len(), 2);
        assert_eq!(binaries[0].name, "add");
        assert!(!binaries[0].is_wave64);
        assert_eq!(binaries[0].bytes, vec![1, 2, 3]);
        assert_eq!(binaries[1].logical_name, "add");
        assert!(binaries[1].is_wave64);
    }

    #[test]
    fn test_load_directory_rejects_bare_suffix() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("64.cso"), [0]).unwrap();

        let err = load_directory(dir.path(), "cso").unwrap_err();
        assert!(matches!(err, ShaderPackError::InvalidFileName(_)));
    }

    #[test]
    fn test_load_directory_errors() {
        let dir = tempdir().unwrap();
        let err = load_directory(dir.path(), "cso").unwrap_err();
        assert!(matches!(err, ShaderPackError::NoShaders(_)));

        let err = load_directory(&dir.path().join("missing"), "cso").unwrap_err();
        assert!(matches!(err, ShaderPackError::Io { .. }));
    }
}
