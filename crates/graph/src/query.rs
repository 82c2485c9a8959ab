use crate::diagnostics::Diagnostic;
use crate::error::{GraphError, Result};
use crate::graph::EdgeResolution;
use crate::types::{
    FieldEntry, MethodSignature, Shape, ShapeTag, TypeDeclaration, TypeGraph, TypeReference,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Read-only queries over a completed [`TypeGraph`]
///
/// Holds only a shared borrow, so any number of queries may run
/// concurrently against the same graph.
pub struct TypeQuery<'g> {
    graph: &'g TypeGraph,
    resolve_interface_embeds: bool,
}

/// Field reachable from a struct, directly or through embedding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotedField {
    pub field: FieldEntry,

    /// Type that declares the field
    pub owner: String,

    /// Embedded field names walked to reach it; empty for direct fields
    pub via: Vec<String>,

    /// Embedding depth: 0 = declared on the queried type
    pub level: usize,
}

/// Flattened field view of a struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenedFields {
    pub type_name: String,
    pub fields: Vec<PromotedField>,

    /// Set when the queried type is on an embedding cycle; `fields` then holds direct fields only
    pub cycle: Option<Vec<String>>,

    /// Embedded types that could not be expanded, as written
    pub unresolved: Vec<String>,
}

impl FlattenedFields {
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field.name.as_str()).collect()
    }

    /// `EmbeddingCycle` diagnostic for a truncated view
    pub fn cycle_diagnostic(&self) -> Option<Diagnostic> {
        self.cycle
            .clone()
            .map(|path| Diagnostic::embedding_cycle(path, None))
    }
}

/// Access path to a field, including fields of inline nested structs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPath {
    /// Dotted path, e.g. `Other.Val`
    pub path: String,
    pub type_ref: TypeReference,
    pub depth: usize,
    pub embedded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodEntry {
    pub signature: MethodSignature,

    /// Interface that declares the method
    pub origin: String,
}

/// Embedded interface listed in an interface body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedInterface {
    pub reference: TypeReference,

    /// Expanded into the method set
    pub expanded: bool,
}

/// Method-set view of an interface
///
/// Embedded interfaces are expanded one level only. Their own embeds are
/// listed in `not_expanded` rather than followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSet {
    pub interface: String,
    pub methods: Vec<MethodEntry>,
    pub embedded: Vec<EmbeddedInterface>,
    pub not_expanded: Vec<String>,
}

impl MethodSet {
    pub fn names(&self) -> Vec<&str> {
        self.methods
            .iter()
            .map(|m| m.signature.name.as_str())
            .collect()
    }
}

impl<'g> TypeQuery<'g> {
    pub const fn new(graph: &'g TypeGraph) -> Self {
        Self {
            graph,
            resolve_interface_embeds: true,
        }
    }

    /// Toggle one-level expansion of embedded interfaces
    #[must_use]
    pub const fn with_interface_embeds(mut self, enabled: bool) -> Self {
        self.resolve_interface_embeds = enabled;
        self
    }

    pub const fn graph(&self) -> &'g TypeGraph {
        self.graph
    }

    /// Lookup by name
    pub fn lookup(&self, name: &str) -> Result<&'g TypeDeclaration> {
        self.graph
            .get(name)
            .ok_or_else(|| GraphError::NotFound(name.to_string()))
    }

    fn lookup_struct(&self, name: &str) -> Result<&'g TypeDeclaration> {
        let decl = self.lookup(name)?;
        if decl.shape_tag() != ShapeTag::Struct {
            return Err(GraphError::NotAStruct(name.to_string()));
        }
        Ok(decl)
    }

    /// All fields reachable from struct `name`, with shadowing applied
    ///
    /// Direct fields come first and shadow anything promoted. Promoted
    /// fields are gathered level by level; within a level the first
    /// declared embedding wins a name clash. Embedded aliases are followed
    /// to the struct they name.
    pub fn flattened_fields(&self, name: &str) -> Result<FlattenedFields> {
        let root = self.lookup_struct(name)?;

        let direct: Vec<PromotedField> = root
            .fields()
            .iter()
            .map(|field| PromotedField {
                field: field.clone(),
                owner: root.name.clone(),
                via: Vec::new(),
                level: 0,
            })
            .collect();

        if let Some(cycle) = self.cycle_through(&root.name) {
            log::debug!("{name}: embedding cycle {cycle:?}, returning direct fields only");
            let mut unresolved = Vec::new();
            self.embedded_targets(&root.name, &[], &mut unresolved);
            return Ok(FlattenedFields {
                type_name: root.name.clone(),
                fields: direct,
                cycle: Some(cycle),
                unresolved,
            });
        }

        let mut seen: HashSet<String> = direct.iter().map(|f| f.field.name.clone()).collect();
        let mut fields = direct;
        let mut unresolved = Vec::new();
        let mut visited = HashSet::from([root.name.clone()]);

        let mut current = self.embedded_targets(&root.name, &[], &mut unresolved);
        let mut level = 1;

        while !current.is_empty() {
            let mut next = Vec::new();

            for (target, via) in current {
                if !visited.insert(target.clone()) {
                    continue;
                }
                let Some(decl) = self.graph.get(&target) else {
                    continue;
                };

                for field in decl.fields() {
                    if seen.insert(field.name.clone()) {
                        fields.push(PromotedField {
                            field: field.clone(),
                            owner: decl.name.clone(),
                            via: via.clone(),
                            level,
                        });
                    }
                }

                next.extend(self.embedded_targets(&decl.name, &via, &mut unresolved));
            }

            current = next;
            level += 1;
        }

        Ok(FlattenedFields {
            type_name: root.name.clone(),
            fields,
            cycle: None,
            unresolved,
        })
    }

    /// Resolved embedding targets of `owner` with the path used to reach them
    ///
    /// Embedded aliases are followed to the declaration they name.
    fn embedded_targets(
        &self,
        owner: &str,
        via: &[String],
        unresolved: &mut Vec<String>,
    ) -> Vec<(String, Vec<String>)> {
        let mut targets = Vec::new();
        for edge in self.graph.embeddings_from(owner) {
            let EdgeResolution::Resolved(target) = self.graph.resolve(edge) else {
                unresolved.push(edge.target.to_string());
                continue;
            };
            match self.graph.follow_aliases(&target) {
                Ok(declared) => {
                    let mut path = via.to_vec();
                    path.push(target);
                    targets.push((declared, path));
                }
                Err(lost) => {
                    log::debug!("{owner}: embedded alias {target} ends at {lost}");
                    unresolved.push(edge.target.to_string());
                }
            }
        }
        targets
    }

    /// Embedding cycle that passes through `start`, as a closed path
    fn cycle_through(&self, start: &str) -> Option<Vec<String>> {
        let mut stack = vec![start.to_string()];
        let mut done = HashSet::new();
        self.cycle_dfs(start, start, &mut stack, &mut done)
    }

    fn cycle_dfs(
        &self,
        current: &str,
        start: &str,
        stack: &mut Vec<String>,
        done: &mut HashSet<String>,
    ) -> Option<Vec<String>> {
        for edge in self.graph.embeddings_from(current) {
            let Some(next) = edge.target_name().filter(|n| self.graph.contains(n)) else {
                continue;
            };

            if next == start {
                let mut cycle = stack.clone();
                cycle.push(start.to_string());
                return Some(cycle);
            }
            if done.contains(next) || stack.iter().any(|s| s == next) {
                continue;
            }

            stack.push(next.to_string());
            if let Some(cycle) = self.cycle_dfs(next, start, stack, done) {
                return Some(cycle);
            }
            stack.pop();
            done.insert(next.to_string());
        }
        None
    }

    /// Access paths for every field declared by struct `name`
    ///
    /// Walks inline nested structs (`Other.Val`); does not follow embedding.
    pub fn field_paths(&self, name: &str) -> Result<Vec<FieldPath>> {
        let decl = self.lookup_struct(name)?;
        let mut paths = Vec::new();
        collect_paths(decl.fields(), "", &mut paths);
        Ok(paths)
    }

    /// Declared methods of interface `name`, plus one level of embedded interfaces
    pub fn method_set(&self, name: &str) -> Result<MethodSet> {
        let decl = self.lookup(name)?;
        let Shape::Interface {
            methods, embeds, ..
        } = &decl.shape
        else {
            return Err(GraphError::NotAnInterface(name.to_string()));
        };

        let mut entries: Vec<MethodEntry> = methods
            .iter()
            .map(|sig| MethodEntry {
                signature: sig.clone(),
                origin: decl.name.clone(),
            })
            .collect();
        let mut seen: HashSet<String> = methods.iter().map(|m| m.name.clone()).collect();
        let mut embedded = Vec::new();
        let mut not_expanded = Vec::new();

        for reference in embeds {
            let target = match reference {
                TypeReference::Named {
                    package: None,
                    name,
                    ..
                } if self.resolve_interface_embeds => self.graph.get(name),
                _ => None,
            };

            let Some(Shape::Interface {
                methods: inner_methods,
                embeds: inner_embeds,
                ..
            }) = target.map(|t| &t.shape)
            else {
                embedded.push(EmbeddedInterface {
                    reference: reference.clone(),
                    expanded: false,
                });
                continue;
            };

            let origin = reference.simple_name().unwrap_or_default().to_string();
            for sig in inner_methods {
                if seen.insert(sig.name.clone()) {
                    entries.push(MethodEntry {
                        signature: sig.clone(),
                        origin: origin.clone(),
                    });
                }
            }
            not_expanded.extend(inner_embeds.iter().map(ToString::to_string));
            embedded.push(EmbeddedInterface {
                reference: reference.clone(),
                expanded: true,
            });
        }

        Ok(MethodSet {
            interface: decl.name.clone(),
            methods: entries,
            embedded,
            not_expanded,
        })
    }
}

fn collect_paths(fields: &[FieldEntry], prefix: &str, out: &mut Vec<FieldPath>) {
    for field in fields {
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{prefix}.{}", field.name)
        };
        out.push(FieldPath {
            path: path.clone(),
            type_ref: field.type_ref.clone(),
            depth: field.depth,
            embedded: field.embedded,
        });
        collect_paths(&field.children, &path, out);
    }
}
