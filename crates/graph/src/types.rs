use crate::syntax::{SourcePosition, TypeExpr};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Reference to another type; never owns the referenced declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeReference {
    /// Named type, resolved lazily against the graph
    Named {
        package: Option<String>,
        name: String,
        pointer: bool,
    },

    /// Predeclared type
    Primitive(String),

    /// Unnamed `struct { ... }`; its fields hang off the owning FieldEntry
    InlineStruct,

    /// Unnamed `interface { ... }`
    InlineInterface,

    /// Raw text for shapes we do not model (maps, funcs, channels, instantiations)
    Opaque(String),
}

impl TypeReference {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            package: None,
            name: name.into(),
            pointer: false,
        }
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Self::Primitive(name.into())
    }

    /// Build a reference from a syntactic type expression
    pub fn from_expr(expr: &TypeExpr) -> Self {
        match expr {
            TypeExpr::Named { package, name } => Self::Named {
                package: package.clone(),
                name: name.clone(),
                pointer: false,
            },
            TypeExpr::Primitive(name) => Self::Primitive(name.clone()),
            TypeExpr::Pointer(inner) => match inner.as_ref() {
                TypeExpr::Named { package, name } => Self::Named {
                    package: package.clone(),
                    name: name.clone(),
                    pointer: true,
                },
                other => Self::Opaque(format!("*{}", other.render())),
            },
            TypeExpr::Struct(_) => Self::InlineStruct,
            TypeExpr::Interface(_) => Self::InlineInterface,
            TypeExpr::Other(text) => Self::Opaque(text.clone()),
            TypeExpr::Missing => Self::Opaque(String::new()),
        }
    }

    /// Unqualified name for named and primitive references
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            Self::Named { name, .. } | Self::Primitive(name) => Some(name),
            _ => None,
        }
    }

    /// Package-qualified references can never resolve inside one graph
    pub const fn is_qualified(&self) -> bool {
        matches!(self, Self::Named { package: Some(_), .. })
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named {
                package,
                name,
                pointer,
            } => {
                if *pointer {
                    f.write_str("*")?;
                }
                if let Some(pkg) = package {
                    write!(f, "{pkg}.")?;
                }
                f.write_str(name)
            }
            Self::Primitive(name) => f.write_str(name),
            Self::InlineStruct => f.write_str("struct{...}"),
            Self::InlineInterface => f.write_str("interface{...}"),
            Self::Opaque(text) => f.write_str(text),
        }
    }
}

/// Resolved struct field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Declared name, or the embedded type's simple name when `embedded`
    pub name: String,

    pub type_ref: TypeReference,

    /// Field was declared by naming only a type
    pub embedded: bool,

    /// 0 = direct field of the declaration; >0 = inside an inline struct
    pub depth: usize,

    /// Raw tag literal
    pub tag: Option<String>,

    pub position: SourcePosition,

    /// Fields of an inline struct type, one level deeper
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldEntry>,
}

/// Interface method signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<TypeReference>,
    pub results: Vec<TypeReference>,
    pub position: SourcePosition,
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |refs: &[TypeReference]| {
            refs.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(f, "{}({})", self.name, join(&self.params))?;
        match self.results.len() {
            0 => Ok(()),
            1 => write!(f, " {}", self.results[0]),
            _ => write!(f, " ({})", join(&self.results)),
        }
    }
}

/// Shape-specific payload of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    /// Named/primitive alias, or an opaque alias for unrecognised shapes
    Alias { target: TypeReference },

    Struct { fields: Vec<FieldEntry> },

    Interface {
        methods: Vec<MethodSignature>,
        /// Embedded interfaces listed in the body
        embeds: Vec<TypeReference>,
        /// Type-set elements kept as raw text
        constraints: Vec<String>,
    },
}

impl Shape {
    pub const fn tag(&self) -> ShapeTag {
        match self {
            Self::Alias { .. } => ShapeTag::Alias,
            Self::Struct { .. } => ShapeTag::Struct,
            Self::Interface { .. } => ShapeTag::Interface,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeTag {
    Alias,
    Struct,
    Interface,
}

/// A named type declaration; immutable once the graph is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,
    pub doc: Option<String>,
    pub type_params: Option<String>,
    /// Declared as `type A = B`
    pub alias_syntax: bool,
    pub position: SourcePosition,
    pub shape: Shape,
}

impl TypeDeclaration {
    pub const fn shape_tag(&self) -> ShapeTag {
        self.shape.tag()
    }

    /// Direct fields, empty for non-struct shapes
    pub fn fields(&self) -> &[FieldEntry] {
        match &self.shape {
            Shape::Struct { fields } => fields,
            _ => &[],
        }
    }
}

/// Directed embedding edge; the target is resolved at query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingEdge {
    /// Owning struct
    pub from: String,

    /// Embedded type as written
    pub target: TypeReference,

    pub position: SourcePosition,
}

impl EmbeddingEdge {
    /// Name the edge would resolve to inside the graph
    pub fn target_name(&self) -> Option<&str> {
        match &self.target {
            TypeReference::Named {
                package: None,
                name,
                ..
            } => Some(name),
            _ => None,
        }
    }
}

/// Normalised type graph keyed by name, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GraphRepr", into = "GraphRepr")]
pub struct TypeGraph {
    pub(crate) declarations: Vec<TypeDeclaration>,

    /// Name -> position in `declarations`
    pub(crate) index: HashMap<String, usize>,

    pub(crate) embeddings: Vec<EmbeddingEdge>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self {
            declarations: Vec::new(),
            index: HashMap::new(),
            embeddings: Vec::new(),
        }
    }

    /// Insert a declaration; hands it back if the name is taken
    pub(crate) fn insert(&mut self, decl: TypeDeclaration) -> Result<(), TypeDeclaration> {
        if self.index.contains_key(&decl.name) {
            return Err(decl);
        }

        self.index
            .insert(decl.name.clone(), self.declarations.len());
        self.declarations.push(decl);
        Ok(())
    }

    pub(crate) fn add_embedding(&mut self, edge: EmbeddingEdge) {
        self.embeddings.push(edge);
    }

    /// Find declaration by name
    pub fn get(&self, name: &str) -> Option<&TypeDeclaration> {
        self.index.get(name).map(|&idx| &self.declarations[idx])
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All declarations in insertion order
    pub fn declarations(&self) -> impl Iterator<Item = &TypeDeclaration> {
        self.declarations.iter()
    }

    /// Declared names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().map(|decl| decl.name.as_str())
    }

    /// All embedding edges in insertion order
    pub fn embeddings(&self) -> &[EmbeddingEdge] {
        &self.embeddings
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize)]
struct GraphRepr {
    declarations: Vec<TypeDeclaration>,
    embeddings: Vec<EmbeddingEdge>,
}

impl From<GraphRepr> for TypeGraph {
    fn from(repr: GraphRepr) -> Self {
        let mut graph = Self::new();
        for decl in repr.declarations {
            if let Err(dup) = graph.insert(decl) {
                log::warn!(
                    "{}: duplicate declaration of {} in serialized graph, keeping the first",
                    dup.position,
                    dup.name
                );
            }
        }
        graph.embeddings = repr.embeddings;
        graph
    }
}

impl From<TypeGraph> for GraphRepr {
    fn from(graph: TypeGraph) -> Self {
        Self {
            declarations: graph.declarations,
            embeddings: graph.embeddings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: usize) -> SourcePosition {
        SourcePosition::new("a.go", line, 1)
    }

    fn alias(name: &str, target: &str, line: usize) -> TypeDeclaration {
        TypeDeclaration {
            name: name.to_string(),
            doc: None,
            type_params: None,
            alias_syntax: false,
            position: pos(line),
            shape: Shape::Alias {
                target: TypeReference::primitive(target),
            },
        }
    }

    #[test]
    fn test_insert_keeps_first() {
        let mut graph = TypeGraph::new();
        assert!(graph.insert(alias("MyInt", "int", 1)).is_ok());

        let rejected = graph.insert(alias("MyInt", "string", 2)).unwrap_err();
        assert_eq!(rejected.position.line, 2);
        assert_eq!(graph.len(), 1);
        assert_eq!(
            graph.get("MyInt").map(|d| &d.shape),
            Some(&Shape::Alias {
                target: TypeReference::primitive("int")
            })
        );
    }

    #[test]
    fn test_insertion_order() {
        let mut graph = TypeGraph::new();
        for (i, name) in ["Zeta", "Alpha", "Mid"].iter().enumerate() {
            graph.insert(alias(name, "int", i + 1)).unwrap();
        }
        let names: Vec<_> = graph.names().collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_reference_from_pointer_expr() {
        let expr = TypeExpr::pointer(TypeExpr::qualified("log", "Logger"));
        let reference = TypeReference::from_expr(&expr);
        assert_eq!(reference.to_string(), "*log.Logger");
        assert!(reference.is_qualified());
        assert_eq!(reference.simple_name(), Some("Logger"));

        let opaque = TypeReference::from_expr(&TypeExpr::pointer(TypeExpr::primitive("int")));
        assert_eq!(opaque, TypeReference::Opaque("*int".to_string()));
    }

    #[test]
    fn test_method_signature_display() {
        let sig = MethodSignature {
            name: "Read".to_string(),
            params: vec![TypeReference::Opaque("[]byte".to_string())],
            results: vec![TypeReference::primitive("int"), TypeReference::primitive("error")],
            position: pos(3),
        };
        assert_eq!(sig.to_string(), "Read([]byte) (int, error)");
    }

    #[test]
    fn test_json_roundtrip_rebuilds_index() {
        let mut graph = TypeGraph::new();
        graph.insert(alias("MyInt", "int", 1)).unwrap();

        let json = serde_json::to_string(&graph).unwrap();
        let back: TypeGraph = serde_json::from_str(&json).unwrap();
        assert!(back.contains("MyInt"));
        assert_eq!(back, graph);
    }

    #[test]
    fn test_deserialized_duplicate_keeps_first() {
        let json = serde_json::json!({
            "declarations": [alias("MyInt", "int", 1), alias("MyInt", "string", 2)],
            "embeddings": [],
        });
        let graph: TypeGraph = serde_json::from_value(json).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.get("MyInt").unwrap().position.line, 1);
    }
}
