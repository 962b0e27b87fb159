//! Build-time DXBC analysis
//!
//! Detects compute shaders that need double-precision support. The renderer
//! skips them on GPUs without FP64, so the generated data file carries a
//! bitmap of those binaries.
//!
//! A DXBC container is laid out as:
//!
//! ```text
//! 0   "DXBC"
//! 4   16-byte checksum
//! 20  u32 version (1)
//! 24  u32 total size
//! 28  u32 chunk count
//! 32  u32 chunk offsets[chunk count]
//! ```
//!
//! Each chunk is a fourcc, a `u32` size and the chunk data. The `SFI0` chunk
//! holds the 64-bit shader feature flags.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;
use tracing::warn;

use crate::error::{Result, ShaderPackError};
use crate::source::ShaderBinary;

const DXBC_MAGIC: &[u8; 4] = b"DXBC";
const HEADER_SIZE: usize = 32;
const SFI0: &[u8; 4] = b"SFI0";

bitflags::bitflags! {
    /// Subset of `D3D_SHADER_REQUIRES_*` flags stored in `SFI0`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShaderFeatures: u64 {
        const DOUBLES = 0x0000_0001;
        const EARLY_DEPTH_STENCIL = 0x0000_0002;
        const UAVS_AT_EVERY_STAGE = 0x0000_0004;
        const UAVS_64 = 0x0000_0008;
        const MINIMUM_PRECISION = 0x0000_0010;
        const DOUBLE_EXTENSIONS_11_1 = 0x0000_0020;
        const SHADER_EXTENSIONS_11_1 = 0x0000_0040;
    }
}

impl ShaderFeatures {
    pub fn uses_fp64(self) -> bool {
        self.intersects(Self::DOUBLES | Self::DOUBLE_EXTENSIONS_11_1)
    }
}

/// Decides whether a binary executes double-precision instructions
pub trait Fp64Detector {
    fn uses_fp64(&self, binary: &ShaderBinary) -> Result<bool>;
}

/// Reads the feature flags chunk of DXBC containers
#[derive(Debug, Default, Clone, Copy)]
pub struct DxbcFp64Detector;

impl Fp64Detector for DxbcFp64Detector {
    fn uses_fp64(&self, binary: &ShaderBinary) -> Result<bool> {
        if binary.bytes.len() < HEADER_SIZE || &binary.bytes[..4] != DXBC_MAGIC {
            warn!("{} is not a DXBC container, assuming no FP64", binary.name);
            return Ok(false);
        }

        let features = read_features(&binary.bytes).map_err(|reason| ShaderPackError::Dxbc {
            name: binary.name.clone(),
            reason,
        })?;
        Ok(features.is_some_and(ShaderFeatures::uses_fp64))
    }
}

/// Feature flags of a DXBC container, `None` when it has no `SFI0` chunk
pub fn read_features(data: &[u8]) -> std::result::Result<Option<ShaderFeatures>, String> {
    let mut cursor = Cursor::new(data);
    cursor.set_position(28);
    let chunk_count = cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| "truncated header".to_string())?;

    for i in 0..chunk_count {
        let offset = cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| format!("chunk table truncated at entry {i}"))? as usize;

        let Some(fourcc) = data.get(offset..offset + 4) else {
            return Err(format!("chunk {i} offset {offset} is out of bounds"));
        };
        if fourcc != SFI0 {
            continue;
        }

        let mut chunk = Cursor::new(&data[offset + 4..]);
        let size = chunk
            .read_u32::<LittleEndian>()
            .map_err(|_| "SFI0 chunk header truncated".to_string())?;
        if size < 8 {
            return Err(format!("SFI0 chunk is {size} bytes, expected 8"));
        }
        let flags = chunk
            .read_u64::<LittleEndian>()
            .map_err(|_| "SFI0 chunk data truncated".to_string())?;
        return Ok(Some(ShaderFeatures::from_bits_retain(flags)));
    }

    Ok(None)
}

/// Assemble a minimal DXBC container from `(fourcc, data)` chunks
#[cfg(test)]
pub(crate) fn build_container(chunks: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
    use byteorder::WriteBytesExt;

    let table_end = HEADER_SIZE + 4 * chunks.len();
    let mut body = Vec::new();
    let mut offsets = Vec::new();
    for (fourcc, payload) in chunks {
        offsets.push((table_end + body.len()) as u32);
        body.extend_from_slice(*fourcc);
        body.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
        body.extend_from_slice(payload);
    }

    let mut out = Vec::new();
    out.extend_from_slice(DXBC_MAGIC);
    out.extend_from_slice(&[0u8; 16]);
    out.write_u32::<LittleEndian>(1).unwrap();
    out.write_u32::<LittleEndian>((table_end + body.len()) as u32).unwrap();
    out.write_u32::<LittleEndian>(chunks.len() as u32).unwrap();
    for offset in offsets {
        out.write_u32::<LittleEndian>(offset).unwrap();
    }
    out.extend_from_slice(&body);
    out
}
