use crate::builder::GraphBuilder;
use crate::collector::collect_declarations;
use crate::config::ExtractorConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Result;
use crate::graph::GraphStats;
use crate::query::TypeQuery;
use crate::syntax::ParsedUnit;
use crate::types::TypeGraph;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Best-effort graph plus every diagnostic raised while building it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub graph: TypeGraph,
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    pub fn stats(&self) -> GraphStats {
        self.graph.stats()
    }
}

/// Collector -> classifier -> resolver -> builder pipeline
pub struct Extractor {
    builder: GraphBuilder,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        Ok(Self {
            builder: GraphBuilder::new(config)?,
        })
    }

    pub const fn config(&self) -> &ExtractorConfig {
        self.builder.config()
    }

    /// Query facade configured like this extractor
    pub fn query<'g>(&self, graph: &'g TypeGraph) -> TypeQuery<'g> {
        TypeQuery::new(graph).with_interface_embeds(self.config().resolve_interface_embeds)
    }

    /// Extract one compilation unit
    pub fn extract(&self, unit: ParsedUnit) -> Extraction {
        let mut diagnostics = Diagnostics::default();
        let graph = self.unit_pass(unit, &mut diagnostics);
        self.finish(graph, diagnostics)
    }

    /// Extract several independent units and merge them into one graph
    ///
    /// Per-unit passes run in parallel; the merge is a single-threaded
    /// reduction in input order, so output does not depend on scheduling.
    pub fn extract_units(&self, units: Vec<ParsedUnit>) -> Extraction {
        let passes: Vec<(TypeGraph, Diagnostics)> = units
            .into_par_iter()
            .map(|unit| {
                let mut diagnostics = Diagnostics::default();
                let graph = self.unit_pass(unit, &mut diagnostics);
                (graph, diagnostics)
            })
            .collect();

        let mut merged = TypeGraph::new();
        let mut diagnostics = Diagnostics::default();
        for (graph, unit_diagnostics) in passes {
            diagnostics.absorb(unit_diagnostics);
            merged.merge(graph, &mut diagnostics);
        }

        self.finish(merged, diagnostics)
    }

    fn unit_pass(&self, unit: ParsedUnit, diagnostics: &mut Diagnostics) -> TypeGraph {
        log::debug!("Extracting unit {} ({} items)", unit.unit, unit.items.len());
        let decls = collect_declarations(unit.items, diagnostics);
        self.builder.build(decls, diagnostics)
    }

    fn finish(&self, graph: TypeGraph, mut diagnostics: Diagnostics) -> Extraction {
        if self.config().detect_cycles {
            diagnostics.extend(graph.cycle_diagnostics());
        }

        let diagnostics = diagnostics.into_vec();
        log::info!(
            "Extraction complete: {} types, {} diagnostics",
            graph.len(),
            diagnostics.len()
        );

        Extraction { graph, diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::syntax::{DeclItem, DeclNode, RawField, SourcePosition, TypeExpr};
    use pretty_assertions::assert_eq;

    fn unit(name: &str, decls: Vec<(&str, TypeExpr)>) -> ParsedUnit {
        let items = decls
            .into_iter()
            .enumerate()
            .map(|(i, (n, ty))| {
                DeclItem::Single(DeclNode::new(n, ty, SourcePosition::new(name, i + 1, 6)))
            })
            .collect();
        ParsedUnit {
            unit: name.to_string(),
            items,
        }
    }

    fn embeds(target: &str) -> TypeExpr {
        TypeExpr::Struct(vec![RawField::embedded(
            TypeExpr::named(target),
            SourcePosition::new("x.go", 1, 2),
        )])
    }

    #[test]
    fn test_mutual_embedding_one_diagnostic() {
        let extractor = Extractor::new(ExtractorConfig::default()).unwrap();
        let out = extractor.extract(unit("a.go", vec![("A", embeds("B")), ("B", embeds("A"))]));

        let cycles: Vec<_> = out
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::EmbeddingCycle)
            .collect();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].related, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_cross_unit_embedding_resolves_after_merge() {
        let extractor = Extractor::new(ExtractorConfig::default()).unwrap();
        let out = extractor.extract_units(vec![
            unit("a.go", vec![("Outer", embeds("Base"))]),
            unit(
                "b.go",
                vec![(
                    "Base",
                    TypeExpr::Struct(vec![RawField::named(
                        "ID",
                        TypeExpr::primitive("int"),
                        SourcePosition::new("b.go", 2, 2),
                    )]),
                )],
            ),
        ]);

        assert!(out.diagnostics.is_empty());
        assert_eq!(out.stats().unresolved_embeddings, 0);
        let view = extractor.query(&out.graph).flattened_fields("Outer").unwrap();
        assert_eq!(view.names(), vec!["Base", "ID"]);
    }

    #[test]
    fn test_cross_unit_cycle_reported_once() {
        let extractor = Extractor::new(ExtractorConfig::default()).unwrap();
        let out = extractor.extract_units(vec![
            unit("a.go", vec![("A", embeds("B"))]),
            unit("b.go", vec![("B", embeds("A"))]),
        ]);
        let kinds: Vec<_> = out.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::EmbeddingCycle]);
    }

    #[test]
    fn test_cross_unit_duplicates_follow_unit_order() {
        let extractor = Extractor::new(ExtractorConfig::default()).unwrap();
        let units = vec![
            unit("a.go", vec![("T", TypeExpr::primitive("int"))]),
            unit("b.go", vec![("T", TypeExpr::primitive("string"))]),
            unit("c.go", vec![("T", TypeExpr::primitive("bool"))]),
        ];
        let out = extractor.extract_units(units);

        assert_eq!(out.graph.get("T").unwrap().position.unit, "a.go");
        let dup_units: Vec<_> = out
            .diagnostics
            .iter()
            .map(|d| d.position.as_ref().unwrap().unit.as_str())
            .collect();
        assert_eq!(dup_units, vec!["b.go", "c.go"]);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = Extractor::new(ExtractorConfig::default()).unwrap();
        let make = || {
            vec![
                unit("a.go", vec![("A", embeds("B")), ("A", TypeExpr::primitive("int"))]),
                unit("b.go", vec![("B", embeds("A")), ("C", TypeExpr::Other("[]int".into()))]),
            ]
        };
        assert_eq!(extractor.extract_units(make()), extractor.extract_units(make()));
    }

    #[test]
    fn test_cycle_check_can_be_disabled() {
        let extractor = Extractor::new(ExtractorConfig::minimal()).unwrap();
        let out = extractor.extract(unit("a.go", vec![("A", embeds("A"))]));
        assert!(out.diagnostics.is_empty());
    }
}
