//! C++ source generators
//!
//! Every generator renders into a `String`; nothing touches the filesystem
//! here so the pipeline can validate everything before writing.

pub mod data;
pub mod header;
pub mod names;

use std::fmt::{Display, Write as FmtWrite};

use crate::error::{Result, ShaderPackError};

/// Values per line in generated arrays
const VALUES_PER_LINE: usize = 16;

/// Write `static const std::array<ty, N> name = { ... };`
pub(crate) fn write_array<T: Display>(
    output: &mut String,
    ty: &str,
    name: &str,
    values: impl ExactSizeIterator<Item = T>,
) -> Result<()> {
    write!(output, "static const std::array<{}, {}> {} = {{", ty, values.len(), name)?;
    for (i, value) in values.enumerate() {
        if i % VALUES_PER_LINE == 0 {
            write!(output, "\n\t")?;
        } else {
            write!(output, " ")?;
        }
        write!(output, "{},", value)?;
    }
    writeln!(output, "\n}};")?;
    Ok(())
}

/// Shader names become C++ enumerators
pub(crate) fn check_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ShaderPackError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_array_wraps_lines() {
        let mut out = String::new();
        write_array(&mut out, "uint8_t", "s_test", 0..18u8).unwrap();

        assert_eq!(
            out,
            "static const std::array<uint8_t, 18> s_test = {\n\
             \t0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,\n\
             \t16, 17,\n\
             };\n"
        );
    }

    #[test]
    fn test_identifiers() {
        assert!(check_identifier("mulMatTiled").is_ok());
        assert!(check_identifier("_private2").is_ok());
        assert!(check_identifier("2fast").is_err());
        assert!(check_identifier("copy-convert").is_err());
        assert!(check_identifier("").is_err());
    }
}
