//! Shader catalog: reconciles Wave32 and Wave64 builds of each shader
//!
//! Binaries are ordered by file stem, which fixes the physical index of every
//! binary in the payload. Logical names keep the order of their first
//! appearance in that sequence and become the generated enum, so the order is
//! part of the contract with the native renderer.

use hashbrown::HashMap;
use tracing::debug;

use crate::error::{Result, ShaderPackError};
use crate::source::ShaderBinary;

/// Physical indices are stored in `uint8_t` tables
pub const MAX_BINARIES: usize = 256;

/// Reconciled, ordered set of shaders. Immutable once built.
#[derive(Debug, Clone)]
pub struct Catalog {
    binaries: Vec<ShaderBinary>,
    names: Vec<String>,
    wave32: Vec<usize>,
    wave64: Vec<usize>,
}

impl Catalog {
    /// Sort, deduplicate and pair the binaries.
    ///
    /// Wave32 is the mandatory baseline: a name with only a Wave64 binary is
    /// rejected, a name with only a Wave32 binary uses it for both widths.
    pub fn build(mut binaries: Vec<ShaderBinary>) -> Result<Self> {
        if binaries.is_empty() {
            return Err(ShaderPackError::EmptyCatalog);
        }
        if binaries.len() > MAX_BINARIES {
            return Err(ShaderPackError::TooManyBinaries(binaries.len()));
        }

        binaries.sort_by(|a, b| a.name.cmp(&b.name));
        let (names, wave32, wave64) = pair_variants(&binaries)?;

        Ok(Self {
            binaries,
            names,
            wave32,
            wave64,
        })
    }

    /// Binaries in physical index order
    pub fn binaries(&self) -> &[ShaderBinary] {
        &self.binaries
    }

    /// Logical names in enum order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Physical index of the Wave32 binary, per enum ordinal
    pub fn wave32(&self) -> &[usize] {
        &self.wave32
    }

    /// Physical index of the binary preferred on Wave64 hardware, per enum ordinal
    pub fn wave64(&self) -> &[usize] {
        &self.wave64
    }

    /// Enum ordinal of a logical name
    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

type Pairing = (Vec<String>, Vec<usize>, Vec<usize>);

/// Derive the name order and both index tables from sorted binaries
fn pair_variants(binaries: &[ShaderBinary]) -> Result<Pairing> {
    // (logical name, is_wave64) -> physical index
    let mut lookup: HashMap<(&str, bool), usize> = HashMap::with_capacity(binaries.len());
    let mut names: Vec<String> = Vec::new();
    for (index, binary) in binaries.iter().enumerate() {
        let key = (binary.logical_name.as_str(), binary.is_wave64);
        if lookup.insert(key, index).is_some() {
            return Err(ShaderPackError::DuplicateShader {
                name: binary.logical_name.clone(),
                width: binary.width(),
            });
        }
        if !lookup.contains_key(&(key.0, !key.1)) {
            names.push(binary.logical_name.clone());
        }
    }

    let mut wave32 = Vec::with_capacity(names.len());
    let mut wave64 = Vec::with_capacity(names.len());
    for (ordinal, name) in names.iter().enumerate() {
        let w32 = lookup.get(&(name.as_str(), false)).copied();
        let w64 = lookup.get(&(name.as_str(), true)).copied();
        let (w32, w64) = match (w32, w64) {
            (Some(w32), Some(w64)) => (w32, w64),
            (Some(w32), None) => (w32, w32),
            _ => return Err(ShaderPackError::InconsistentCatalog(name.clone())),
        };
        debug!("{} = {}: wave32 #{}, wave64 #{}", name, ordinal, w32, w64);
        wave32.push(w32);
        wave64.push(w64);
    }

    Ok((names, wave32, wave64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(name: &str) -> ShaderBinary {
        ShaderBinary::new(name, name.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_pairs_variants_in_file_order() {
        let catalog = Catalog::build(vec![bin("fooA"), bin("fooA64"), bin("barB")]).unwrap();

        let order: Vec<_> = catalog.binaries().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(order, ["barB", "fooA", "fooA64"]);
        assert_eq!(catalog.names(), ["barB", "fooA"]);

        let bar = catalog.ordinal("barB").unwrap();
        assert_eq!(catalog.wave32()[bar], 0);
        assert_eq!(catalog.wave64()[bar], 0);

        let foo = catalog.ordinal("fooA").unwrap();
        assert_eq!(catalog.wave32()[foo], 1);
        assert_eq!(catalog.wave64()[foo], 2);
    }

    #[test]
    fn test_indices_point_at_matching_binaries() {
        let catalog = Catalog::build(vec![
            bin("mulMat64"),
            bin("add"),
            bin("mulMat"),
            bin("softMax"),
            bin("softMax64"),
        ])
        .unwrap();

        for (ordinal, name) in catalog.names().iter().enumerate() {
            let b32 = &catalog.binaries()[catalog.wave32()[ordinal]];
            let b64 = &catalog.binaries()[catalog.wave64()[ordinal]];
            assert_eq!(&b32.logical_name, name);
            assert_eq!(&b64.logical_name, name);
            assert!(!b32.is_wave64);
            if name == "add" {
                assert_eq!(catalog.wave32()[ordinal], catalog.wave64()[ordinal]);
            } else {
                assert!(b64.is_wave64);
                assert_ne!(catalog.wave32()[ordinal], catalog.wave64()[ordinal]);
            }
        }
        assert_eq!(catalog.names(), ["add", "mulMat", "softMax"]);
    }

    #[test]
    fn test_wave64_only_is_fatal() {
        let err = Catalog::build(vec![bin("onlyX64")]).unwrap_err();
        assert!(matches!(err, ShaderPackError::InconsistentCatalog(ref n) if n == "onlyX"));
        assert!(err.to_string().contains("onlyX"));

        let err = Catalog::build(vec![bin("a"), bin("b64")]).unwrap_err();
        assert!(matches!(err, ShaderPackError::InconsistentCatalog(ref n) if n == "b"));
    }

    #[test]
    fn test_name_count_matches_distinct_logical_names() {
        let catalog =
            Catalog::build(vec![bin("c"), bin("a64"), bin("b"), bin("a"), bin("c64")]).unwrap();
        assert_eq!(catalog.names().len(), 3);
        assert_eq!(catalog.wave32().len(), 3);
        assert_eq!(catalog.wave64().len(), 3);
        assert_eq!(catalog.binaries().len(), 5);
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = Catalog::build(Vec::new()).unwrap_err();
        assert!(matches!(err, ShaderPackError::EmptyCatalog));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_duplicate_variant_rejected() {
        let err = Catalog::build(vec![bin("a"), bin("a")]).unwrap_err();
        assert!(matches!(err, ShaderPackError::DuplicateShader { .. }));
    }

    #[test]
    fn test_too_many_binaries() {
        let binaries = (0..=MAX_BINARIES).map(|i| bin(&format!("s{i:03}"))).collect();
        let err = Catalog::build(binaries).unwrap_err();
        assert!(matches!(err, ShaderPackError::TooManyBinaries(257)));
    }
}
