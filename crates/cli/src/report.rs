use anyhow::{Context, Result};
use serde::Serialize;
use typex_graph::{Diagnostic, Extraction, GraphStats, TypeGraph};

/// JSON document printed by `typex extract`
#[derive(Serialize)]
pub struct ExtractReport<'a> {
    pub graph: &'a TypeGraph,
    pub diagnostics: &'a [Diagnostic],
    pub stats: GraphStats,
}

impl<'a> ExtractReport<'a> {
    pub fn new(extraction: &'a Extraction) -> Self {
        Self {
            graph: &extraction.graph,
            diagnostics: &extraction.diagnostics,
            stats: extraction.stats(),
        }
    }
}

/// Pretty-print a value to stdout; stdout carries nothing but JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

/// Human summary for the log
pub fn summary_line(stats: &GraphStats, diagnostics: usize) -> String {
    format!(
        "{} types ({} structs, {} interfaces, {} aliases, {} unresolved), {} embeddings ({} unresolved), {} diagnostics",
        stats.declarations,
        stats.structs,
        stats.interfaces,
        stats.aliases,
        stats.unresolved_aliases,
        stats.embeddings,
        stats.unresolved_embeddings,
        diagnostics
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        let stats = GraphStats {
            declarations: 5,
            aliases: 1,
            structs: 3,
            interfaces: 1,
            embeddings: 1,
            unresolved_embeddings: 0,
            unresolved_aliases: 0,
        };
        assert_eq!(
            summary_line(&stats, 2),
            "5 types (3 structs, 1 interfaces, 1 aliases, 0 unresolved), 1 embeddings (0 unresolved), 2 diagnostics"
        );
    }

    #[test]
    fn test_extract_report_shape() {
        let extraction = Extraction {
            graph: TypeGraph::new(),
            diagnostics: Vec::new(),
        };
        let value = serde_json::to_value(ExtractReport::new(&extraction)).unwrap();
        assert!(value.get("graph").is_some());
        assert_eq!(value["diagnostics"], serde_json::json!([]));
        assert_eq!(value["stats"]["declarations"], 0);
    }
}
