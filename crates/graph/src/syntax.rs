use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of a declaration inside a compilation unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    /// Unit identifier (usually the file path)
    pub unit: String,

    /// Line (1-indexed)
    pub line: usize,

    /// Column (1-indexed)
    pub column: usize,
}

impl SourcePosition {
    pub fn new(unit: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            unit: unit.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.unit, self.line, self.column)
    }
}

/// Declarations of one compilation unit, in source order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedUnit {
    /// Unit identifier (usually the file path)
    pub unit: String,
    pub items: Vec<DeclItem>,
}

/// Top-level declaration item as produced by the source parser
///
/// Grouping (`type ( ... )`) only exists here; the collector erases it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclItem {
    Single(DeclNode),
    Group {
        position: SourcePosition,
        members: Vec<DeclNode>,
    },
}

/// One type declaration node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclNode {
    /// Declared name; `None` or empty marks a malformed node
    pub name: Option<String>,

    /// Doc comment text with comment markers stripped
    pub doc: Option<String>,

    /// Raw type parameter list (e.g. `[T any]`), never resolved
    pub type_params: Option<String>,

    /// `type A = B` rather than `type A B`
    pub alias_syntax: bool,

    /// Underlying type expression; `None` marks a malformed node
    pub underlying: Option<TypeExpr>,

    pub position: SourcePosition,
}

impl DeclNode {
    /// Convenience constructor for a well-formed node
    pub fn new(name: impl Into<String>, underlying: TypeExpr, position: SourcePosition) -> Self {
        Self {
            name: Some(name.into()),
            doc: None,
            type_params: None,
            alias_syntax: false,
            underlying: Some(underlying),
            position,
        }
    }

    /// Builder: set doc comment
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Builder: mark as `type A = B`
    #[must_use]
    pub const fn alias_syntax(mut self) -> Self {
        self.alias_syntax = true;
        self
    }
}

/// Type expression as written in source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// Reference to a named type, optionally package-qualified
    Named {
        package: Option<String>,
        name: String,
    },

    /// Predeclared type (`int`, `string`, `error`, ...)
    Primitive(String),

    /// `*T`
    Pointer(Box<TypeExpr>),

    /// Inline struct literal
    Struct(Vec<RawField>),

    /// Inline interface literal
    Interface(Vec<RawInterfaceElem>),

    /// Anything else, kept as raw source text (maps, slices, funcs, channels, instantiations)
    Other(String),

    /// Type absent from the source (syntax error)
    Missing,
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            package: None,
            name: name.into(),
        }
    }

    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            package: Some(package.into()),
            name: name.into(),
        }
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Self::Primitive(name.into())
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        Self::Pointer(Box::new(inner))
    }

    /// Render back to source-like text
    pub fn render(&self) -> String {
        match self {
            Self::Named {
                package: Some(pkg),
                name,
            } => format!("{pkg}.{name}"),
            Self::Named {
                package: None,
                name,
            } => name.clone(),
            Self::Primitive(name) => name.clone(),
            Self::Pointer(inner) => format!("*{}", inner.render()),
            Self::Struct(_) => "struct{...}".to_string(),
            Self::Interface(_) => "interface{...}".to_string(),
            Self::Other(text) => text.clone(),
            Self::Missing => String::new(),
        }
    }
}

/// Raw struct field as written; empty `names` means an embedded field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawField {
    pub names: Vec<String>,
    pub ty: TypeExpr,
    pub tag: Option<String>,
    pub position: SourcePosition,
}

impl RawField {
    pub fn named(name: impl Into<String>, ty: TypeExpr, position: SourcePosition) -> Self {
        Self {
            names: vec![name.into()],
            ty,
            tag: None,
            position,
        }
    }

    pub fn embedded(ty: TypeExpr, position: SourcePosition) -> Self {
        Self {
            names: Vec::new(),
            ty,
            tag: None,
            position,
        }
    }
}

/// Raw element of an interface literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawInterfaceElem {
    Method {
        name: String,
        params: Vec<RawParam>,
        results: Vec<RawParam>,
        position: SourcePosition,
    },

    /// Embedded interface name
    Embed(TypeExpr),

    /// Type-set element such as `~int | ~string`
    Constraint(String),
}

/// Parameter group (`a, b int` is one group with two names)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawParam {
    pub names: Vec<String>,
    pub ty: TypeExpr,
    pub variadic: bool,
}

impl RawParam {
    pub fn unnamed(ty: TypeExpr) -> Self {
        Self {
            names: Vec::new(),
            ty,
            variadic: false,
        }
    }
}
