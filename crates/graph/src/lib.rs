//! # Typex Graph
//!
//! Static extraction of type declarations into a normalised, queryable graph.
//!
//! ## Features
//!
//! - **Declaration collection** - grouped and standalone declarations become one stream
//! - **Shape classification** - alias, struct or interface, never fails
//! - **Field resolution** - named, embedded and inline nested fields, order preserved
//! - **Type graph** - keyed by name, first declaration wins, lazy embedding edges
//! - **Queries** - lookup, flattened field view, field paths, method sets
//!
//! ## Architecture
//!
//! ```text
//! ParsedUnit[] (from a source parser)
//!     │
//!     ├──> Declaration Collector
//!     │      └─ Flatten `type ( ... )` groups, skip malformed nodes
//!     │
//!     ├──> Shape Classifier
//!     │      ├─ Alias (named / primitive / opaque)
//!     │      ├─ Struct ──> Field Resolver (recursive for inline structs)
//!     │      └─ Interface (methods, embeds, constraints)
//!     │
//!     ├──> Graph Builder
//!     │      ├─ Name index (first wins)
//!     │      └─ Embedding edges (resolved at query time)
//!     │
//!     └──> Query Facade
//!            ├─ Flattened fields with shadowing + cycle marker
//!            └─ Method sets (one embedding level)
//! ```
//!
//! Every problem along the way is a [`Diagnostic`]; extraction always
//! returns a best-effort graph.
//!
//! ## Example
//!
//! ```rust
//! use typex_graph::{
//!     DeclItem, DeclNode, Extractor, ExtractorConfig, ParsedUnit, SourcePosition, TypeExpr,
//! };
//!
//! let unit = ParsedUnit {
//!     unit: "main.go".to_string(),
//!     items: vec![DeclItem::Single(DeclNode::new(
//!         "MyInt",
//!         TypeExpr::primitive("int"),
//!         SourcePosition::new("main.go", 1, 6),
//!     ))],
//! };
//!
//! let extractor = Extractor::new(ExtractorConfig::default()).unwrap();
//! let extraction = extractor.extract(unit);
//! assert!(extraction.diagnostics.is_empty());
//! assert!(extraction.graph.contains("MyInt"));
//! ```

mod builder;
mod classifier;
mod collector;
mod config;
mod diagnostics;
mod error;
mod graph;
mod pipeline;
mod query;
mod resolver;
mod syntax;
mod types;

pub use builder::GraphBuilder;
pub use classifier::ShapeClassifier;
pub use collector::{collect_declarations, CollectedDecl};
pub use config::ExtractorConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{GraphError, Result};
pub use graph::{EdgeResolution, ExternalReason, GraphStats};
pub use pipeline::{Extraction, Extractor};
pub use query::{
    EmbeddedInterface, FieldPath, FlattenedFields, MethodEntry, MethodSet, PromotedField,
    TypeQuery,
};
pub use resolver::FieldResolver;
pub use syntax::{
    DeclItem, DeclNode, ParsedUnit, RawField, RawInterfaceElem, RawParam, SourcePosition,
    TypeExpr,
};
pub use types::{
    EmbeddingEdge, FieldEntry, MethodSignature, Shape, ShapeTag, TypeDeclaration, TypeGraph,
    TypeReference,
};
