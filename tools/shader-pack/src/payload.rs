//! Encoded shader payload
//!
//! All binaries are laid end to end in physical index order and compressed as
//! one buffer. The offset table has one extra entry holding the total length,
//! so the size of binary `i` is `offsets[i + 1] - offsets[i]`.

use tracing::info;

use crate::catalog::Catalog;
use crate::compress::Compressor;
use crate::dxbc::Fp64Detector;
use crate::error::{Result, ShaderPackError};

/// One bit per physical binary index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fp64Bitmap {
    words: Vec<u64>,
    len: usize,
}

impl Fp64Bitmap {
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64).max(1)],
            len,
        }
    }

    pub fn set(&mut self, index: usize) {
        assert!(index < self.len, "bit {index} out of range ({})", self.len);
        self.words[index / 64] |= 1u64 << (index % 64);
    }

    pub fn get(&self, index: usize) -> bool {
        index < self.len && self.words[index / 64] & (1u64 << (index % 64)) != 0
    }

    /// Number of binaries covered
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Backing words, bit `i` lives in word `i / 64`
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Whole bitmap as one integer, when it fits
    pub fn as_u64(&self) -> Option<u64> {
        (self.len <= 64).then(|| self.words[0])
    }

    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}

/// Concatenated binaries plus every table the renderer indexes into it with
#[derive(Debug, Clone)]
pub struct Payload {
    pub concatenated: Vec<u8>,
    pub offsets: Vec<u32>,
    pub compressed: Vec<u8>,
    pub fp64: Fp64Bitmap,
    /// Physical index per enum ordinal, Wave32-preferring GPUs
    pub wave32_table: Vec<u8>,
    /// Physical index per enum ordinal, Wave64-preferring GPUs
    pub wave64_table: Vec<u8>,
}

impl Payload {
    pub fn encode(
        catalog: &Catalog,
        compressor: &dyn Compressor,
        detector: &dyn Fp64Detector,
    ) -> Result<Self> {
        let binaries = catalog.binaries();

        let total: usize = binaries.iter().map(|b| b.bytes.len()).sum();
        if u32::try_from(total).is_err() {
            return Err(ShaderPackError::PayloadTooLarge(total));
        }

        let mut concatenated = Vec::with_capacity(total);
        let mut offsets = Vec::with_capacity(binaries.len() + 1);
        for binary in binaries {
            offsets.push(concatenated.len() as u32);
            concatenated.extend_from_slice(&binary.bytes);
        }
        offsets.push(concatenated.len() as u32);

        let compressed = compressor.compress(&concatenated)?;

        let mut fp64 = Fp64Bitmap::new(binaries.len());
        for (index, binary) in binaries.iter().enumerate() {
            if detector.uses_fp64(binary)? {
                fp64.set(index);
            }
        }

        let wave32_table = index_table(catalog.wave32())?;
        let wave64_table = index_table(catalog.wave64())?;

        info!(
            "Encoded {} binaries: {} -> {} bytes, {} use FP64",
            binaries.len(),
            concatenated.len(),
            compressed.len(),
            fp64.count()
        );

        Ok(Self {
            concatenated,
            offsets,
            compressed,
            fp64,
            wave32_table,
            wave64_table,
        })
    }

    /// Byte range of a physical binary inside the concatenated buffer
    pub fn range(&self, index: usize) -> std::ops::Range<usize> {
        self.offsets[index] as usize..self.offsets[index + 1] as usize
    }

    /// Decompress the payload and check every binary comes back intact
    pub fn verify(&self, compressor: &dyn Compressor, catalog: &Catalog) -> Result<()> {
        let restored = compressor.decompress(&self.compressed)?;
        if restored != self.concatenated {
            return Err(ShaderPackError::Compression(
                "decompressed payload differs from the input".to_string(),
            ));
        }
        for (index, binary) in catalog.binaries().iter().enumerate() {
            if restored.get(self.range(index)) != Some(binary.bytes.as_slice()) {
                return Err(ShaderPackError::Compression(format!(
                    "binary {} does not round-trip through the offset table",
                    binary.name
                )));
            }
        }
        Ok(())
    }
}

fn index_table(indices: &[usize]) -> Result<Vec<u8>> {
    indices
        .iter()
        .map(|&i| u8::try_from(i).map_err(|_| ShaderPackError::TooManyBinaries(i + 1)))
        .collect()
}
