use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::syntax::{DeclItem, DeclNode, SourcePosition, TypeExpr};

/// Well-formed declaration with grouping erased
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedDecl {
    pub name: String,
    pub doc: Option<String>,
    pub type_params: Option<String>,
    pub alias_syntax: bool,
    pub underlying: TypeExpr,
    pub position: SourcePosition,
}

/// Flatten top-level items into one declaration stream, in source order
///
/// A group of N members yields N entries; an empty group yields none.
/// Nodes without a name or underlying type are reported and skipped.
pub fn collect_declarations(
    items: impl IntoIterator<Item = DeclItem>,
    diagnostics: &mut Diagnostics,
) -> Vec<CollectedDecl> {
    let mut collected = Vec::new();

    for item in items {
        match item {
            DeclItem::Single(node) => push_node(node, &mut collected, diagnostics),
            DeclItem::Group { position, members } => {
                log::debug!("Flattening group at {position} ({} members)", members.len());
                for node in members {
                    push_node(node, &mut collected, diagnostics);
                }
            }
        }
    }

    collected
}

fn push_node(node: DeclNode, out: &mut Vec<CollectedDecl>, diagnostics: &mut Diagnostics) {
    let DeclNode {
        name,
        doc,
        type_params,
        alias_syntax,
        underlying,
        position,
    } = node;

    let name = match name.map(|n| n.trim().to_string()) {
        Some(n) if !n.is_empty() => n,
        _ => {
            diagnostics.push(Diagnostic::malformed(
                position,
                "type declaration has no name",
            ));
            return;
        }
    };

    let Some(underlying) = underlying.filter(|ty| *ty != TypeExpr::Missing) else {
        let mut diag = Diagnostic::malformed(
            position,
            format!("type declaration {name} has no underlying type"),
        );
        diag.subject = Some(name);
        diagnostics.push(diag);
        return;
    };

    out.push(CollectedDecl {
        name,
        doc,
        type_params,
        alias_syntax,
        underlying,
        position,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::syntax::RawField;

    fn pos(line: usize) -> SourcePosition {
        SourcePosition::new("test.go", line, 1)
    }

    fn grouped_struct() -> DeclNode {
        DeclNode::new(
            "GroupedStruct",
            TypeExpr::Struct(vec![RawField::named(
                "Name",
                TypeExpr::primitive("string"),
                pos(11),
            )]),
            pos(10),
        )
        .with_doc("GroupedStruct is inside a type block")
    }

    #[test]
    fn test_group_is_erased() {
        let mut diags = Diagnostics::default();
        let grouped = collect_declarations(
            vec![DeclItem::Group {
                position: pos(8),
                members: vec![grouped_struct()],
            }],
            &mut diags,
        );
        let standalone = collect_declarations(vec![DeclItem::Single(grouped_struct())], &mut diags);

        assert_eq!(grouped, standalone);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_group_of_n_yields_n() {
        let members: Vec<_> = (0..3)
            .map(|i| DeclNode::new(format!("T{i}"), TypeExpr::primitive("int"), pos(i + 2)))
            .collect();
        let mut diags = Diagnostics::default();
        let out = collect_declarations(
            vec![
                DeclItem::Group {
                    position: pos(1),
                    members,
                },
                DeclItem::Group {
                    position: pos(9),
                    members: vec![],
                },
            ],
            &mut diags,
        );

        let names: Vec<_> = out.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["T0", "T1", "T2"]);
    }

    #[test]
    fn test_malformed_skipped_and_reported() {
        let mut nameless = DeclNode::new("", TypeExpr::primitive("int"), pos(3));
        nameless.name = None;
        let mut typeless = DeclNode::new("Broken", TypeExpr::primitive("int"), pos(4));
        typeless.underlying = None;

        let mut diags = Diagnostics::default();
        let out = collect_declarations(
            vec![
                DeclItem::Single(nameless),
                DeclItem::Single(typeless),
                DeclItem::Single(DeclNode::new("Ok", TypeExpr::primitive("int"), pos(5))),
            ],
            &mut diags,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Ok");
        let kinds: Vec<_> = diags.iter().map(|d| (d.kind, d.position.clone())).collect();
        assert_eq!(
            kinds,
            vec![
                (DiagnosticKind::MalformedDeclaration, Some(pos(3))),
                (DiagnosticKind::MalformedDeclaration, Some(pos(4))),
            ]
        );
    }
}
