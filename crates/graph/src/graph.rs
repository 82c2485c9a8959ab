use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::types::{EmbeddingEdge, Shape, ShapeTag, TypeDeclaration, TypeGraph, TypeReference};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outcome of resolving an embedding edge against the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeResolution {
    /// Target declared in this graph
    Resolved(String),

    /// Target lives outside the graph
    External(ExternalReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExternalReason {
    /// `pkg.T`, another package
    Qualified { package: String, name: String },

    /// Predeclared type such as `error`
    Predeclared(String),

    /// Plain name with no declaration in this graph
    Undeclared(String),

    /// Embedded expression with no usable name
    Unnamed(String),
}

/// Summary counters for a graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub declarations: usize,
    pub aliases: usize,
    pub structs: usize,
    pub interfaces: usize,
    pub embeddings: usize,
    pub unresolved_embeddings: usize,
    /// Aliases naming a type that is not declared in this graph
    pub unresolved_aliases: usize,
}

impl TypeGraph {
    /// Resolve an embedding edge by name lookup
    pub fn resolve(&self, edge: &EmbeddingEdge) -> EdgeResolution {
        self.resolve_reference(&edge.target)
    }

    /// Resolve the target of an alias declaration; `None` for other shapes
    pub fn resolve_alias(&self, decl: &TypeDeclaration) -> Option<EdgeResolution> {
        match &decl.shape {
            Shape::Alias { target } => Some(self.resolve_reference(target)),
            _ => None,
        }
    }

    /// Resolve any type reference against the declared names
    pub fn resolve_reference(&self, target: &TypeReference) -> EdgeResolution {
        match target {
            TypeReference::Named {
                package: Some(package),
                name,
                ..
            } => EdgeResolution::External(ExternalReason::Qualified {
                package: package.clone(),
                name: name.clone(),
            }),
            TypeReference::Named { name, .. } if self.contains(name) => {
                EdgeResolution::Resolved(name.clone())
            }
            TypeReference::Named { name, .. } => {
                EdgeResolution::External(ExternalReason::Undeclared(name.clone()))
            }
            TypeReference::Primitive(name) => {
                EdgeResolution::External(ExternalReason::Predeclared(name.clone()))
            }
            other => EdgeResolution::External(ExternalReason::Unnamed(other.to_string())),
        }
    }

    /// Follow alias declarations from `name` to the first non-alias declaration
    ///
    /// Returns the final declared name, or the reference that could not be
    /// followed (external target or an alias loop).
    pub fn follow_aliases(&self, name: &str) -> Result<String, String> {
        let mut current = name.to_string();
        let mut seen = HashSet::new();

        loop {
            if !seen.insert(current.clone()) {
                return Err(current);
            }
            let Some(decl) = self.get(&current) else {
                return Err(current);
            };
            match self.resolve_alias(decl) {
                None => return Ok(current),
                Some(EdgeResolution::Resolved(next)) => current = next,
                Some(EdgeResolution::External(_)) => {
                    if let Shape::Alias { target } = &decl.shape {
                        return Err(target.to_string());
                    }
                    return Err(current);
                }
            }
        }
    }

    /// Embedding edges owned by `name`, in field order
    pub fn embeddings_from<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a EmbeddingEdge> {
        self.embeddings.iter().filter(move |edge| edge.from == name)
    }

    /// Resolved embedding targets of `name`, in field order
    pub(crate) fn resolved_targets(&self, name: &str) -> Vec<usize> {
        self.embeddings_from(name)
            .filter_map(|edge| edge.target_name())
            .filter_map(|target| self.index_of(target))
            .collect()
    }

    /// Directed graph of resolved embeddings; node weights are declaration indices
    pub fn embedding_graph(&self) -> DiGraph<usize, ()> {
        let mut graph = DiGraph::with_capacity(self.declarations.len(), self.embeddings.len());
        let nodes: Vec<NodeIndex> = (0..self.declarations.len())
            .map(|idx| graph.add_node(idx))
            .collect();

        for edge in &self.embeddings {
            let (Some(from), Some(to)) = (
                self.index_of(&edge.from),
                edge.target_name().and_then(|t| self.index_of(t)),
            ) else {
                continue;
            };
            graph.add_edge(nodes[from], nodes[to], ());
        }

        graph
    }

    /// Every embedding cycle, each as a closed path starting at its earliest declaration
    ///
    /// Cycles are ordered by their first member's declaration order.
    pub fn embedding_cycles(&self) -> Vec<Vec<String>> {
        let graph = self.embedding_graph();
        let mut cycles: Vec<(usize, Vec<String>)> = Vec::new();

        for component in tarjan_scc(&graph) {
            let members: HashSet<usize> = component.iter().map(|&n| graph[n]).collect();
            let Some(&start) = members.iter().min() else {
                continue;
            };

            let is_cycle = members.len() > 1
                || self
                    .resolved_targets(self.name_at(start))
                    .contains(&start);
            if !is_cycle {
                continue;
            }

            let path = self.cycle_path(start, &members);
            cycles.push((start, path));
        }

        cycles.sort_by_key(|(start, _)| *start);
        cycles.into_iter().map(|(_, path)| path).collect()
    }

    /// One `EmbeddingCycle` diagnostic per cycle
    pub fn cycle_diagnostics(&self) -> Vec<Diagnostic> {
        self.embedding_cycles()
            .into_iter()
            .map(|path| {
                let position = path
                    .first()
                    .and_then(|name| self.get(name))
                    .map(|decl| decl.position.clone());
                Diagnostic::embedding_cycle(path, position)
            })
            .collect()
    }

    /// Walk from `start` back to itself inside one strongly connected component
    fn cycle_path(&self, start: usize, members: &HashSet<usize>) -> Vec<String> {
        let mut path = vec![start];
        let mut visited = HashSet::from([start]);

        if !self.extend_cycle(start, start, members, &mut visited, &mut path) {
            // Unreachable for a real SCC; fall back to the member list
            let mut sorted: Vec<_> = members.iter().copied().collect();
            sorted.sort_unstable();
            path = sorted;
            path.push(start);
        }

        path.into_iter()
            .map(|idx| self.name_at(idx).to_string())
            .collect()
    }

    fn extend_cycle(
        &self,
        current: usize,
        start: usize,
        members: &HashSet<usize>,
        visited: &mut HashSet<usize>,
        path: &mut Vec<usize>,
    ) -> bool {
        for next in self.resolved_targets(self.name_at(current)) {
            if next == start {
                path.push(start);
                return true;
            }
            if !members.contains(&next) || !visited.insert(next) {
                continue;
            }
            path.push(next);
            if self.extend_cycle(next, start, members, visited, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    fn name_at(&self, idx: usize) -> &str {
        &self.declarations[idx].name
    }

    /// Union another graph into this one; first declaration of a name wins
    ///
    /// Edges owned by a rejected declaration are dropped with it.
    pub fn merge(&mut self, other: TypeGraph, diagnostics: &mut Diagnostics) {
        let mut rejected = HashSet::new();

        for decl in other.declarations {
            if let Err(dup) = self.insert(decl) {
                if let Some(first) = self.get(&dup.name).map(|d| d.position.clone()) {
                    diagnostics.push(Diagnostic::duplicate(&dup.name, dup.position, &first));
                }
                rejected.insert(dup.name);
            }
        }

        for edge in other.embeddings {
            if !rejected.contains(&edge.from) {
                self.add_embedding(edge);
            }
        }
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            declarations: self.declarations.len(),
            embeddings: self.embeddings.len(),
            ..Default::default()
        };

        for decl in &self.declarations {
            match decl.shape_tag() {
                ShapeTag::Alias => stats.aliases += 1,
                ShapeTag::Struct => stats.structs += 1,
                ShapeTag::Interface => stats.interfaces += 1,
            }
        }

        stats.unresolved_embeddings = self
            .embeddings
            .iter()
            .filter(|edge| matches!(self.resolve(edge), EdgeResolution::External(_)))
            .count();

        stats.unresolved_aliases = self
            .declarations
            .iter()
            .filter(|decl| {
                matches!(
                    self.resolve_alias(decl),
                    Some(EdgeResolution::External(
                        ExternalReason::Qualified { .. } | ExternalReason::Undeclared(_)
                    ))
                )
            })
            .count();

        stats
    }
}
