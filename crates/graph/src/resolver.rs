use crate::config::ExtractorConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::syntax::{RawField, TypeExpr};
use crate::types::{FieldEntry, TypeReference};

/// Resolves raw struct field lists into ordered [`FieldEntry`] trees
pub struct FieldResolver<'a> {
    config: &'a ExtractorConfig,
}

impl<'a> FieldResolver<'a> {
    pub const fn new(config: &'a ExtractorConfig) -> Self {
        Self { config }
    }

    /// Resolve the direct fields of struct `owner`
    ///
    /// Declaration order is kept and nothing is deduplicated. Inline struct
    /// types become children of their field, one level deeper.
    pub fn resolve(
        &self,
        owner: &str,
        fields: &[RawField],
        diagnostics: &mut Diagnostics,
    ) -> Vec<FieldEntry> {
        self.resolve_at(owner, fields, 0, diagnostics)
    }

    fn resolve_at(
        &self,
        owner: &str,
        fields: &[RawField],
        depth: usize,
        diagnostics: &mut Diagnostics,
    ) -> Vec<FieldEntry> {
        let mut entries = Vec::with_capacity(fields.len());

        for raw in fields {
            if raw.ty == TypeExpr::Missing {
                let mut diag = Diagnostic::malformed(
                    raw.position.clone(),
                    format!("field {} of {owner} has no type", raw.names.join(", ")),
                );
                diag.subject = Some(owner.to_string());
                diagnostics.push(diag);
                continue;
            }

            if raw.names.is_empty() {
                entries.push(Self::embedded_entry(raw, depth));
                continue;
            }

            for name in &raw.names {
                let (type_ref, children) = match &raw.ty {
                    TypeExpr::Struct(inner) if depth + 1 > self.config.max_inline_depth => {
                        let mut diag = Diagnostic::malformed(
                            raw.position.clone(),
                            format!(
                                "inline struct in {owner}.{name} nested deeper than {}; not expanded",
                                self.config.max_inline_depth
                            ),
                        );
                        diag.subject = Some(owner.to_string());
                        diagnostics.push(diag);
                        log::debug!("{owner}.{name}: dropping {} nested fields", inner.len());
                        (TypeReference::Opaque(raw.ty.render()), Vec::new())
                    }
                    TypeExpr::Struct(inner) => (
                        TypeReference::InlineStruct,
                        self.resolve_at(owner, inner, depth + 1, diagnostics),
                    ),
                    other => (TypeReference::from_expr(other), Vec::new()),
                };

                entries.push(FieldEntry {
                    name: name.clone(),
                    type_ref,
                    embedded: false,
                    depth,
                    tag: raw.tag.clone(),
                    position: raw.position.clone(),
                    children,
                });
            }
        }

        entries
    }

    fn embedded_entry(raw: &RawField, depth: usize) -> FieldEntry {
        let type_ref = embedded_reference(&raw.ty);
        let name = type_ref
            .simple_name()
            .map(str::to_string)
            .unwrap_or_else(|| raw.ty.render());

        FieldEntry {
            name,
            type_ref,
            embedded: true,
            depth,
            tag: raw.tag.clone(),
            position: raw.position.clone(),
            children: Vec::new(),
        }
    }
}

/// Reference for an embedded type expression
///
/// Generic instantiations (`List[int]`) arrive as raw text; they are reduced
/// to their base name so the embedding can still be resolved.
pub(crate) fn embedded_reference(expr: &TypeExpr) -> TypeReference {
    match expr {
        TypeExpr::Other(text) => parse_embedded_text(text)
            .unwrap_or_else(|| TypeReference::Opaque(text.clone())),
        TypeExpr::Pointer(inner) => match inner.as_ref() {
            TypeExpr::Other(text) => parse_embedded_text(&format!("*{text}"))
                .unwrap_or_else(|| TypeReference::from_expr(expr)),
            _ => TypeReference::from_expr(expr),
        },
        _ => TypeReference::from_expr(expr),
    }
}

fn parse_embedded_text(text: &str) -> Option<TypeReference> {
    let trimmed = text.trim();
    let (pointer, rest) = match trimmed.strip_prefix('*') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let base = rest.split('[').next().unwrap_or(rest).trim();
    if base.is_empty() {
        return None;
    }

    let (package, name) = match base.rsplit_once('.') {
        Some((pkg, name)) => (Some(pkg.to_string()), name),
        None => (None, base),
    };
    let is_ident = name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_');
    if name.is_empty() || !is_ident {
        return None;
    }

    Some(TypeReference::Named {
        package,
        name: name.to_string(),
        pointer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::syntax::SourcePosition;
    use pretty_assertions::assert_eq;

    fn pos(line: usize) -> SourcePosition {
        SourcePosition::new("test.go", line, 2)
    }

    fn resolve(fields: &[RawField]) -> (Vec<FieldEntry>, Diagnostics) {
        let config = ExtractorConfig::default();
        let mut diags = Diagnostics::default();
        let out = FieldResolver::new(&config).resolve("Owner", fields, &mut diags);
        (out, diags)
    }

    #[test]
    fn test_nested_struct_fields() {
        // SimpleStruct; Other struct { Val float64 }
        let fields = vec![
            RawField::embedded(TypeExpr::named("SimpleStruct"), pos(18)),
            RawField::named(
                "Other",
                TypeExpr::Struct(vec![RawField::named(
                    "Val",
                    TypeExpr::primitive("float64"),
                    pos(20),
                )]),
                pos(19),
            ),
        ];
        let (out, diags) = resolve(&fields);
        assert!(diags.is_empty());

        assert_eq!(out.len(), 2);
        assert!(out[0].embedded);
        assert_eq!(out[0].name, "SimpleStruct");
        assert_eq!(out[0].type_ref, TypeReference::named("SimpleStruct"));

        let other = &out[1];
        assert_eq!(other.name, "Other");
        assert!(!other.embedded);
        assert_eq!(other.depth, 0);
        assert_eq!(other.type_ref, TypeReference::InlineStruct);
        assert_eq!(other.children.len(), 1);
        assert_eq!(other.children[0].name, "Val");
        assert_eq!(other.children[0].depth, 1);
        assert_eq!(other.children[0].type_ref, TypeReference::primitive("float64"));
    }

    #[test]
    fn test_duplicate_names_kept_in_order() {
        let fields = vec![
            RawField::named("X", TypeExpr::primitive("int"), pos(1)),
            RawField::named("X", TypeExpr::primitive("string"), pos(2)),
        ];
        let (out, _) = resolve(&fields);
        let refs: Vec<_> = out.iter().map(|f| f.type_ref.to_string()).collect();
        assert_eq!(refs, vec!["int", "string"]);
    }

    #[test]
    fn test_multi_name_field_expands() {
        let fields = vec![RawField {
            names: vec!["A".into(), "B".into()],
            ty: TypeExpr::primitive("int"),
            tag: Some("`json:\"x\"`".into()),
            position: pos(4),
        }];
        let (out, _) = resolve(&fields);
        let names: Vec<_> = out.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(out.iter().all(|f| f.tag.is_some()));
    }

    #[test]
    fn test_embedded_pointer_and_qualified() {
        let fields = vec![
            RawField::embedded(TypeExpr::pointer(TypeExpr::named("Logger")), pos(1)),
            RawField::embedded(TypeExpr::qualified("sync", "Mutex"), pos(2)),
            RawField::embedded(TypeExpr::Other("List[int]".into()), pos(3)),
        ];
        let (out, _) = resolve(&fields);
        let names: Vec<_> = out.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Logger", "Mutex", "List"]);
        assert_eq!(out[0].type_ref.to_string(), "*Logger");
        assert!(out[1].type_ref.is_qualified());
    }

    #[test]
    fn test_depth_limit_truncates() {
        let config = ExtractorConfig {
            max_inline_depth: 1,
            ..Default::default()
        };
        let deep = RawField::named(
            "Outer",
            TypeExpr::Struct(vec![RawField::named(
                "Inner",
                TypeExpr::Struct(vec![RawField::named(
                    "Leaf",
                    TypeExpr::primitive("int"),
                    pos(3),
                )]),
                pos(2),
            )]),
            pos(1),
        );

        let mut diags = Diagnostics::default();
        let out = FieldResolver::new(&config).resolve("Owner", &[deep], &mut diags);
        let inner = &out[0].children[0];
        assert!(inner.children.is_empty());
        assert!(matches!(inner.type_ref, TypeReference::Opaque(_)));
        assert_eq!(
            diags.iter().map(|d| d.kind).collect::<Vec<_>>(),
            vec![DiagnosticKind::MalformedDeclaration]
        );
    }

    #[test]
    fn test_untyped_field_reported_and_skipped() {
        let (out, diags) = resolve(&[
            RawField::named("Broken", TypeExpr::Missing, pos(1)),
            RawField::named("Ok", TypeExpr::primitive("int"), pos(2)),
        ]);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Ok");
        let reported: Vec<_> = diags
            .iter()
            .map(|d| (d.kind, d.position.clone(), d.subject.clone()))
            .collect();
        assert_eq!(
            reported,
            vec![(
                DiagnosticKind::MalformedDeclaration,
                Some(pos(1)),
                Some("Owner".to_string())
            )]
        );
    }
}
