use crate::error::{FrontendError, Result};
use crate::language::{go_parser, is_predeclared, strip_comment};
use std::path::Path;
use tree_sitter::{Node, Parser};
use typex_graph::{
    DeclItem, DeclNode, ParsedUnit, RawField, RawInterfaceElem, RawParam, SourcePosition,
    TypeExpr,
};

/// Go source parser producing [`ParsedUnit`]s for the type graph
///
/// Only `type` declarations are lowered; everything else in the file is
/// skipped. Syntax errors never fail the parse: tree-sitter recovers and
/// broken declarations come out as nodes without a name or type.
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    /// Create a parser with the Go grammar loaded
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: go_parser()?,
        })
    }

    /// Parse one compilation unit from memory
    pub fn parse_unit(&mut self, unit: &str, source: &str) -> Result<ParsedUnit> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| FrontendError::parse(format!("No syntax tree produced for {unit}")))?;

        let root = tree.root_node();
        if root.has_error() {
            log::warn!("{unit}: syntax errors present, extracting what survived");
        }

        let lowering = Lowering { source, unit };
        let items = lowering.items(root);
        log::debug!("{unit}: {} type declaration items", items.len());

        Ok(ParsedUnit {
            unit: unit.to_string(),
            items,
        })
    }

    /// Read and parse a file; the unit is named after the path
    pub fn parse_file(&mut self, path: &Path) -> Result<ParsedUnit> {
        let source = std::fs::read_to_string(path)?;
        self.parse_unit(&path.display().to_string(), &source)
    }
}

/// Lowers tree-sitter nodes of one unit into syntax records
struct Lowering<'s> {
    source: &'s str,
    unit: &'s str,
}

impl<'s> Lowering<'s> {
    fn text(&self, node: Node) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn position(&self, node: Node) -> SourcePosition {
        let start = node.start_position();
        SourcePosition::new(self.unit, start.row + 1, start.column + 1)
    }

    fn items(&self, root: Node) -> Vec<DeclItem> {
        let mut items = Vec::new();
        let mut cursor = root.walk();

        for child in root.children(&mut cursor) {
            match child.kind() {
                "type_declaration" => items.extend(self.declaration(child)),
                "ERROR" if self.text(child).trim_start().starts_with("type") => {
                    // Unrecoverable declaration: keep it so it is reported
                    items.push(DeclItem::Single(DeclNode {
                        name: None,
                        doc: None,
                        type_params: None,
                        alias_syntax: false,
                        underlying: None,
                        position: self.position(child),
                    }));
                }
                _ => {}
            }
        }

        items
    }

    fn declaration(&self, node: Node) -> Option<DeclItem> {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        let grouped = children.iter().any(|c| c.kind() == "(");

        if grouped {
            let members = children
                .iter()
                .filter(|c| is_spec(c.kind()))
                .map(|spec| self.spec(*spec, self.doc_above(*spec)))
                .collect();
            return Some(DeclItem::Group {
                position: self.position(node),
                members,
            });
        }

        let spec = children.iter().find(|c| is_spec(c.kind()))?;
        Some(DeclItem::Single(self.spec(*spec, self.doc_above(node))))
    }

    fn spec(&self, node: Node, doc: Option<String>) -> DeclNode {
        let name = node
            .child_by_field_name("name")
            .filter(|n| !n.is_missing())
            .map(|n| self.text(n).to_string())
            .filter(|n| !n.is_empty());

        let underlying = node
            .child_by_field_name("type")
            .filter(|t| !t.is_missing() && !t.is_error())
            .map(|t| self.type_expr(t));

        DeclNode {
            name,
            doc,
            type_params: node
                .child_by_field_name("type_parameters")
                .map(|p| self.text(p).to_string()),
            alias_syntax: node.kind() == "type_alias",
            underlying,
            position: self.position(node),
        }
    }

    /// Contiguous comments directly above `node`
    fn doc_above(&self, node: Node) -> Option<String> {
        let mut lines = Vec::new();
        let mut expected_row = node.start_position().row;
        let mut current = node.prev_sibling();

        while let Some(prev) = current {
            if prev.kind() != "comment" || prev.end_position().row + 1 != expected_row {
                break;
            }
            // A trailing comment belongs to whatever ends on its line
            if prev
                .prev_named_sibling()
                .is_some_and(|p| p.end_position().row == prev.start_position().row)
            {
                break;
            }
            lines.push(strip_comment(self.text(prev)));
            expected_row = prev.start_position().row;
            current = prev.prev_sibling();
        }

        if lines.is_empty() {
            return None;
        }
        lines.reverse();
        Some(lines.join("\n"))
    }

    fn type_expr(&self, node: Node) -> TypeExpr {
        match node.kind() {
            "type_identifier" => {
                let name = self.text(node);
                if is_predeclared(name) {
                    TypeExpr::primitive(name)
                } else {
                    TypeExpr::named(name)
                }
            }
            "qualified_type" => {
                match (
                    node.child_by_field_name("package"),
                    node.child_by_field_name("name"),
                ) {
                    (Some(pkg), Some(name)) => TypeExpr::qualified(self.text(pkg), self.text(name)),
                    _ => TypeExpr::Other(self.text(node).to_string()),
                }
            }
            // Only pointers to named types are structured; the rest stay raw
            "pointer_type" => match node.named_child(0) {
                Some(inner) if is_named_type(inner.kind()) => {
                    TypeExpr::pointer(self.type_expr(inner))
                }
                _ => TypeExpr::Other(self.text(node).to_string()),
            },
            "parenthesized_type" => match node.named_child(0) {
                Some(inner) => self.type_expr(inner),
                None => TypeExpr::Other(self.text(node).to_string()),
            },
            "struct_type" => TypeExpr::Struct(self.struct_fields(node)),
            "interface_type" => TypeExpr::Interface(self.interface_elems(node)),
            _ => TypeExpr::Other(self.text(node).to_string()),
        }
    }

    fn struct_fields(&self, node: Node) -> Vec<RawField> {
        let mut cursor = node.walk();
        let Some(list) = node
            .children(&mut cursor)
            .find(|c| c.kind() == "field_declaration_list")
        else {
            return Vec::new();
        };

        let mut cursor = list.walk();
        list.children(&mut cursor)
            .filter(|c| c.kind() == "field_declaration")
            .map(|field| self.field(field))
            .collect()
    }

    /// A field whose type did not parse keeps `TypeExpr::Missing` so it is reported
    fn field(&self, node: Node) -> RawField {
        let mut ty = node
            .child_by_field_name("type")
            .filter(|t| !t.is_missing())
            .map_or(TypeExpr::Missing, |t| self.type_expr(t));

        let mut cursor = node.walk();
        let names: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .map(|n| self.text(n).to_string())
            .collect();

        if names.is_empty() {
            let mut cursor = node.walk();
            let pointer = node.children(&mut cursor).any(|c| c.kind() == "*");
            if pointer {
                ty = TypeExpr::pointer(ty);
            }
        }

        RawField {
            names,
            ty,
            tag: node
                .child_by_field_name("tag")
                .map(|t| self.text(t).to_string()),
            position: self.position(node),
        }
    }

    fn interface_elems(&self, node: Node) -> Vec<RawInterfaceElem> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter_map(|elem| match elem.kind() {
                "method_elem" | "method_spec" => self.method(elem),
                "type_elem" | "constraint_elem" => Some(self.type_elem(elem)),
                "interface_type_name" => Some(RawInterfaceElem::Embed(
                    elem.named_child(0)
                        .map_or_else(|| TypeExpr::named(self.text(elem)), |t| self.type_expr(t)),
                )),
                _ => None,
            })
            .collect()
    }

    fn method(&self, node: Node) -> Option<RawInterfaceElem> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.params(p))
            .unwrap_or_default();
        let results = match node.child_by_field_name("result") {
            Some(r) if r.kind() == "parameter_list" => self.params(r),
            Some(r) => vec![RawParam::unnamed(self.type_expr(r))],
            None => Vec::new(),
        };

        Some(RawInterfaceElem::Method {
            name,
            params,
            results,
            position: self.position(node),
        })
    }

    /// A lone named type is an embedded interface, anything else a type set
    fn type_elem(&self, node: Node) -> RawInterfaceElem {
        let mut cursor = node.walk();
        let terms: Vec<Node> = node.named_children(&mut cursor).collect();

        if let [term] = terms.as_slice() {
            match self.type_expr(*term) {
                expr @ TypeExpr::Named { .. } => return RawInterfaceElem::Embed(expr),
                TypeExpr::Other(text) if term.kind() == "generic_type" => {
                    return RawInterfaceElem::Embed(TypeExpr::Other(text));
                }
                _ => {}
            }
        }

        RawInterfaceElem::Constraint(self.text(node).to_string())
    }

    fn params(&self, list: Node) -> Vec<RawParam> {
        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .filter_map(|param| {
                let variadic = match param.kind() {
                    "parameter_declaration" => false,
                    "variadic_parameter_declaration" => true,
                    _ => return None,
                };
                let ty = param.child_by_field_name("type")?;
                let mut cursor = param.walk();
                let names = param
                    .children_by_field_name("name", &mut cursor)
                    .map(|n| self.text(n).to_string())
                    .collect();
                Some(RawParam {
                    names,
                    ty: self.type_expr(ty),
                    variadic,
                })
            })
            .collect()
    }
}

fn is_spec(kind: &str) -> bool {
    matches!(kind, "type_spec" | "type_alias")
}

fn is_named_type(kind: &str) -> bool {
    matches!(kind, "type_identifier" | "qualified_type" | "generic_type")
}
