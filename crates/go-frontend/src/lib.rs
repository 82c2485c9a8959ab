//! # Typex Go Frontend
//!
//! Tree-sitter based lowering of Go source into the syntax records
//! consumed by `typex-graph`.
//!
//! Only `type` declarations are read. Grouping, doc comments, struct tags,
//! type parameters and interface elements are preserved; expressions the
//! graph does not model (maps, slices, funcs, channels) are kept as raw text.
//!
//! ## Example
//!
//! ```rust
//! use typex_go_frontend::GoParser;
//! use typex_graph::{Extractor, ExtractorConfig};
//!
//! let mut parser = GoParser::new().unwrap();
//! let unit = parser
//!     .parse_unit("main.go", "package main\n\ntype MyInt int\n")
//!     .unwrap();
//!
//! let extraction = Extractor::new(ExtractorConfig::default())
//!     .unwrap()
//!     .extract(unit);
//! assert!(extraction.graph.contains("MyInt"));
//! ```

mod error;
mod language;
mod parser;

pub use error::{FrontendError, Result};
pub use language::{is_go_source, is_predeclared};
pub use parser::GoParser;
