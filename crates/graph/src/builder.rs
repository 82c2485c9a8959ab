use crate::classifier::ShapeClassifier;
use crate::collector::CollectedDecl;
use crate::config::ExtractorConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{GraphError, Result};
use crate::types::{EmbeddingEdge, Shape, TypeDeclaration, TypeGraph};

/// Build a type graph from collected declarations
pub struct GraphBuilder {
    config: ExtractorConfig,
}

impl GraphBuilder {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate().map_err(GraphError::InvalidConfig)?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Classify, resolve and insert every declaration
    ///
    /// Duplicate names keep the first declaration. Embedding edges are
    /// recorded by name only; resolution happens at query time.
    pub fn build(&self, decls: Vec<CollectedDecl>, diagnostics: &mut Diagnostics) -> TypeGraph {
        let mut graph = TypeGraph::new();
        let classifier = ShapeClassifier::new(&self.config);

        // Phase 1: classify and insert declarations
        for decl in decls {
            let shape = classifier.classify(&decl, diagnostics);
            let doc = if self.config.keep_doc_comments {
                decl.doc
            } else {
                None
            };

            let declaration = TypeDeclaration {
                name: decl.name,
                doc,
                type_params: decl.type_params,
                alias_syntax: decl.alias_syntax,
                position: decl.position,
                shape,
            };

            if let Err(rejected) = graph.insert(declaration) {
                let first = graph
                    .get(&rejected.name)
                    .map(|d| d.position.clone())
                    .unwrap_or_else(|| rejected.position.clone());
                diagnostics.push(Diagnostic::duplicate(
                    &rejected.name,
                    rejected.position,
                    &first,
                ));
            }
        }

        // Phase 2: embedding edges from direct embedded fields
        let edges: Vec<EmbeddingEdge> = graph
            .declarations()
            .flat_map(|decl| match &decl.shape {
                Shape::Struct { fields } => fields
                    .iter()
                    .filter(|field| field.embedded)
                    .map(|field| EmbeddingEdge {
                        from: decl.name.clone(),
                        target: field.type_ref.clone(),
                        position: field.position.clone(),
                    })
                    .collect::<Vec<_>>(),
                _ => Vec::new(),
            })
            .collect();
        for edge in edges {
            graph.add_embedding(edge);
        }

        log::info!(
            "Built type graph: {} declarations, {} embedding edges",
            graph.len(),
            graph.embeddings().len()
        );

        graph
    }
}
