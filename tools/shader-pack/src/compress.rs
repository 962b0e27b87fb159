//! Payload compression
//!
//! The renderer decompresses the whole blob once at startup, so the payload is
//! compressed as a single buffer. Shared prologues and epilogues between
//! compute shaders are what makes this worthwhile.

use lz4_flex::{compress_prepend_size, decompress_size_prepended};

use crate::error::{Result, ShaderPackError};

/// Whole-buffer byte compressor
pub trait Compressor {
    /// Short identifier written into the generated data file
    fn name(&self) -> &'static str;

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// LZ4 block with the uncompressed size prepended as a little-endian `u32`
#[derive(Debug, Default, Clone, Copy)]
pub struct Lz4Compressor;

impl Compressor for Lz4Compressor {
    fn name(&self) -> &'static str {
        "lz4 block, u32 LE size prefix"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Err(ShaderPackError::Compression(
                "nothing to compress".to_string(),
            ));
        }
        Ok(compress_prepend_size(data))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        decompress_size_prepended(data).map_err(|e| ShaderPackError::Compression(e.to_string()))
    }
}
