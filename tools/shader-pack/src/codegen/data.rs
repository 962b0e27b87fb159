//! Shader payload data file generator

use std::fmt::Write as FmtWrite;

use super::write_array;
use crate::error::Result;
use crate::payload::{Fp64Bitmap, Payload};

/// Generate the `.inl` file with the compressed blob and its index tables
pub fn generate_data(payload: &Payload, compression: &str) -> Result<String> {
    let mut output = String::new();

    writeln!(output, "// This source file is generated by a tool")?;
    writeln!(output)?;
    writeln!(
        output,
        "// This array contains concatenated and compressed DXBC binaries for all compiled compute shaders"
    )?;
    writeln!(output, "// Compression: {}", compression)?;
    write_array(
        &mut output,
        "uint8_t",
        "s_compressedShaders",
        payload.compressed.iter().map(|b| format!("0x{:02X}", b)),
    )?;
    writeln!(output)?;

    writeln!(
        output,
        "// This array contains start offsets of shader binaries in the decompressed DXBC blob."
    )?;
    writeln!(
        output,
        "// It includes one more entry for the end of the complete decompressed blob."
    )?;
    write_array(&mut output, "uint32_t", "s_shaderOffsets", payload.offsets.iter())?;
    writeln!(output)?;

    writeln!(
        output,
        "// Index = eComputeShader enum value, value = index of the shader binary to use on nVidia and Intel GPUs"
    )?;
    write_array(&mut output, "uint8_t", "s_shaderBlobs32", payload.wave32_table.iter())?;
    writeln!(
        output,
        "// Index = eComputeShader enum value, value = index of the shader binary to use on AMD GPUs"
    )?;
    write_array(&mut output, "uint8_t", "s_shaderBlobs64", payload.wave64_table.iter())?;
    writeln!(output)?;

    write_fp64_bitmap(&mut output, &payload.fp64)?;

    Ok(output)
}

fn write_fp64_bitmap(output: &mut String, bitmap: &Fp64Bitmap) -> Result<()> {
    writeln!(
        output,
        "// Bitmap of the shader binaries which use FP64 arithmetic instructions"
    )?;
    match bitmap.as_u64() {
        Some(bits) => writeln!(output, "constexpr uint64_t fp64ShadersBitmap = 0x{:X}ull;", bits)?,
        None => {
            writeln!(output, "// Bit i is stored in element i / 64")?;
            write_array(
                output,
                "uint64_t",
                "fp64ShadersBitmap",
                bitmap.words().iter().map(|w| format!("0x{:X}ull", w)),
            )?;
        }
    }
    Ok(())
}
