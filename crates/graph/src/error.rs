use crate::diagnostics::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Type not found: {0}")]
    NotFound(String),

    #[error("Type {0} is not a struct")]
    NotAStruct(String),

    #[error("Type {0} is not an interface")]
    NotAnInterface(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GraphError {
    /// Diagnostic form of a failed query, if it has one
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        match self {
            Self::NotFound(name) => Some(Diagnostic::not_found(name)),
            _ => None,
        }
    }
}
