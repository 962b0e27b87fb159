//! Shader name lookup table

use std::fmt::Write as FmtWrite;

use super::{check_identifier, write_array};
use crate::config::CppNames;
use crate::error::Result;

/// Generate the source implementing the name lookup function
pub fn generate_names(names: &[String], cpp: &CppNames, header_file: &str) -> Result<String> {
    let mut output = String::new();

    writeln!(output, "// This source file is generated by a tool")?;
    writeln!(output, "#include \"{}\"", header_file)?;
    writeln!(output, "#include <array>")?;
    writeln!(output)?;
    writeln!(output, "namespace")?;
    writeln!(output, "{{")?;

    for name in names {
        check_identifier(name)?;
    }
    write_array(
        &mut output,
        "const char*",
        "s_shaderNames",
        names.iter().map(|n| format!("\"{}\"", n)),
    )?;

    writeln!(output, "}}")?;
    writeln!(output)?;
    writeln!(
        output,
        "const char* {}::{}( {} cs )",
        cpp.namespace, cpp.lookup_fn, cpp.enum_name
    )?;
    writeln!(output, "{{")?;
    writeln!(output, "\tconst size_t i = (size_t)cs;")?;
    writeln!(output, "\tif( i < s_shaderNames.size() )")?;
    writeln!(output, "\t\treturn s_shaderNames[ i ];")?;
    writeln!(output, "\treturn nullptr;")?;
    writeln!(output, "}}")?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_names() {
        let names = vec!["add".to_string(), "scale".to_string()];
        let source = generate_names(&names, &CppNames::default(), "shaderNames.h").unwrap();

        assert!(source.contains("#include \"shaderNames.h\""));
        assert!(source.contains(
            "static const std::array<const char*, 2> s_shaderNames = {\n\t\"add\", \"scale\",\n};"
        ));
        assert!(source.contains("const char* DirectCompute::computeShaderName( eComputeShader cs )"));
        assert!(source.contains("return nullptr;"));
    }
}
