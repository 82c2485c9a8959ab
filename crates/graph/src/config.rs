use serde::{Deserialize, Serialize};

/// Configuration for an extraction pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Deepest inline struct nesting that is expanded into child fields
    pub max_inline_depth: usize,

    /// Keep doc comments on declarations
    pub keep_doc_comments: bool,

    /// Pull embedded interfaces' methods into the method-set view (one level)
    pub resolve_interface_embeds: bool,

    /// Run embedding cycle detection after the graph is built
    pub detect_cycles: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_inline_depth: 32,
            keep_doc_comments: true,
            resolve_interface_embeds: true,
            detect_cycles: true,
        }
    }
}

impl ExtractorConfig {
    /// Shallow nesting limit, everything else on
    pub fn strict() -> Self {
        Self {
            max_inline_depth: 8,
            ..Default::default()
        }
    }

    /// Structure only: no docs, no cycle check
    pub fn minimal() -> Self {
        Self {
            keep_doc_comments: false,
            detect_cycles: false,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_inline_depth == 0 {
            return Err("max_inline_depth must be > 0".to_string());
        }

        Ok(())
    }
}
