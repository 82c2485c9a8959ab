use thiserror::Error;

/// Result type for frontend operations
pub type Result<T> = std::result::Result<T, FrontendError>;

/// Errors that stop a unit from being parsed at all
///
/// Syntax errors are not among them: tree-sitter recovers and the
/// damaged declarations surface later as diagnostics.
#[derive(Error, Debug)]
pub enum FrontendError {
    /// Tree-sitter rejected the Go grammar
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    /// Parser produced no tree (cancelled or timed out)
    #[error("Parse error: {0}")]
    ParseError(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FrontendError {
    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
