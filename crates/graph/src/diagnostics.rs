use crate::syntax::SourcePosition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of non-fatal problem found during extraction or querying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Structurally incomplete declaration node; skipped
    MalformedDeclaration,

    /// Second (or later) declaration of a name; first one wins
    DuplicateTypeName,

    /// Types embed each other in a loop
    EmbeddingCycle,

    /// Query against an unknown name
    NotFound,
}

impl DiagnosticKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedDeclaration => "MalformedDeclaration",
            Self::DuplicateTypeName => "DuplicateTypeName",
            Self::EmbeddingCycle => "EmbeddingCycle",
            Self::NotFound => "NotFound",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,

    /// Type name the diagnostic is about, when known
    pub subject: Option<String>,

    pub position: Option<SourcePosition>,

    /// Other names involved (cycle members, first declaration site, ...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
}

impl Diagnostic {
    pub fn malformed(position: SourcePosition, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::MalformedDeclaration,
            message: message.into(),
            subject: None,
            position: Some(position),
            related: Vec::new(),
        }
    }

    pub fn duplicate(name: &str, position: SourcePosition, first: &SourcePosition) -> Self {
        Self {
            kind: DiagnosticKind::DuplicateTypeName,
            message: format!("type {name} already declared at {first}"),
            subject: Some(name.to_string()),
            position: Some(position),
            related: vec![first.to_string()],
        }
    }

    /// `members` is the cycle in traversal order
    pub fn embedding_cycle(members: Vec<String>, position: Option<SourcePosition>) -> Self {
        Self {
            kind: DiagnosticKind::EmbeddingCycle,
            message: format!("embedding cycle: {}", members.join(" -> ")),
            subject: members.first().cloned(),
            position,
            related: members,
        }
    }

    pub fn not_found(name: &str) -> Self {
        Self {
            kind: DiagnosticKind::NotFound,
            message: format!("no type named {name}"),
            subject: Some(name.to_string()),
            position: None,
            related: Vec::new(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.position {
            Some(pos) => write!(f, "{pos}: {}: {}", self.kind.as_str(), self.message),
            None => write!(f, "{}: {}", self.kind.as_str(), self.message),
        }
    }
}

/// Ordered, append-only diagnostic list for one pass
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    /// Append an already-logged list
    pub fn absorb(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
