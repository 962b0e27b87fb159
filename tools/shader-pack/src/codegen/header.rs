//! Enum header generator
//!
//! Enumerator values are used directly as indices into the data tables, so
//! they must follow catalog order exactly.

use std::fmt::Write as FmtWrite;

use super::check_identifier;
use crate::config::CppNames;
use crate::error::Result;

/// Generate the `enum struct` header listing every shader
pub fn generate_header(names: &[String], cpp: &CppNames) -> Result<String> {
    cpp.validate()?;
    let mut output = String::new();

    writeln!(output, "// This header is generated by a tool")?;
    writeln!(output, "#pragma once")?;
    writeln!(output, "#include <stdint.h>")?;
    writeln!(output)?;
    writeln!(output, "namespace {}", cpp.namespace)?;
    writeln!(output, "{{")?;
    writeln!(output, "\tenum struct {}: uint16_t", cpp.enum_name)?;
    writeln!(output, "\t{{")?;

    for (id, name) in names.iter().enumerate() {
        check_identifier(name)?;
        writeln!(output, "\t\t{} = {},", name, id)?;
    }

    writeln!(output, "\t}};")?;
    writeln!(output)?;
    writeln!(output, "\tconst char* {}( {} cs );", cpp.lookup_fn, cpp.enum_name)?;
    writeln!(output, "}}")?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_header() {
        let names = vec!["add".to_string(), "mulMat".to_string()];
        let header = generate_header(&names, &CppNames::default()).unwrap();

        assert!(header.starts_with("// This header is generated by a tool\n#pragma once\n"));
        assert!(header.contains("namespace DirectCompute\n{\n"));
        assert!(header.contains("\tenum struct eComputeShader: uint16_t\n"));
        assert!(header.contains("\t\tadd = 0,\n\t\tmulMat = 1,\n\t};"));
        assert!(header.contains("\tconst char* computeShaderName( eComputeShader cs );\n}"));
    }

    #[test]
    fn test_custom_names() {
        let cpp = CppNames {
            namespace: "Gpu".to_string(),
            enum_name: "Kernel".to_string(),
            lookup_fn: "kernelName".to_string(),
        };
        let header = generate_header(&["x".to_string()], &cpp).unwrap();
        assert!(header.contains("namespace Gpu"));
        assert!(header.contains("const char* kernelName( Kernel cs );"));
    }

    #[test]
    fn test_rejects_invalid_enumerator() {
        assert!(generate_header(&["bad name".to_string()], &CppNames::default()).is_err());

        let cpp = CppNames {
            namespace: "Gpu::Detail".to_string(),
            ..CppNames::default()
        };
        assert!(generate_header(&["x".to_string()], &cpp).is_err());
    }
}
