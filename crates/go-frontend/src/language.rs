use crate::error::{FrontendError, Result};

/// Predeclared Go type identifiers
const PREDECLARED_TYPES: &[&str] = &[
    "any",
    "bool",
    "byte",
    "comparable",
    "complex64",
    "complex128",
    "error",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

/// Get Tree-sitter language instance for Go
pub fn tree_sitter_language() -> tree_sitter::Language {
    tree_sitter_go::LANGUAGE.into()
}

/// Parser configured for Go
pub fn go_parser() -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_language())
        .map_err(|e| FrontendError::tree_sitter(format!("Failed to set language: {e}")))?;
    Ok(parser)
}

/// Check if an identifier names a predeclared type
pub fn is_predeclared(name: &str) -> bool {
    PREDECLARED_TYPES.contains(&name)
}

/// Check if a path looks like a Go source file
pub fn is_go_source(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("go"))
}

/// Strip comment markers from a `//` or `/* */` comment
pub fn strip_comment(text: &str) -> String {
    if let Some(line) = text.strip_prefix("//") {
        return line.strip_prefix(' ').unwrap_or(line).trim_end().to_string();
    }

    let inner = text
        .strip_prefix("/*")
        .and_then(|t| t.strip_suffix("*/"))
        .unwrap_or(text);
    inner
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
