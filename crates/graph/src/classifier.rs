use crate::collector::CollectedDecl;
use crate::config::ExtractorConfig;
use crate::diagnostics::Diagnostics;
use crate::resolver::{embedded_reference, FieldResolver};
use crate::syntax::{RawInterfaceElem, RawParam, TypeExpr};
use crate::types::{MethodSignature, Shape, TypeReference};

/// Syntactic shape classification of a declaration
///
/// Every declaration gets exactly one shape. Anything that is not a named
/// or primitive reference, a struct or an interface degrades to an opaque
/// alias carrying the raw underlying text.
pub struct ShapeClassifier<'a> {
    resolver: FieldResolver<'a>,
}

impl<'a> ShapeClassifier<'a> {
    pub const fn new(config: &'a ExtractorConfig) -> Self {
        Self {
            resolver: FieldResolver::new(config),
        }
    }

    pub fn classify(&self, decl: &CollectedDecl, diagnostics: &mut Diagnostics) -> Shape {
        match &decl.underlying {
            expr @ (TypeExpr::Named { .. } | TypeExpr::Primitive(_)) => Shape::Alias {
                target: TypeReference::from_expr(expr),
            },
            TypeExpr::Struct(fields) => Shape::Struct {
                fields: self.resolver.resolve(&decl.name, fields, diagnostics),
            },
            TypeExpr::Interface(elems) => classify_interface(elems),
            other => {
                log::debug!("{}: opaque alias for `{}`", decl.name, other.render());
                Shape::Alias {
                    target: TypeReference::Opaque(other.render()),
                }
            }
        }
    }
}

fn classify_interface(elems: &[RawInterfaceElem]) -> Shape {
    let mut methods = Vec::new();
    let mut embeds = Vec::new();
    let mut constraints = Vec::new();

    for elem in elems {
        match elem {
            RawInterfaceElem::Method {
                name,
                params,
                results,
                position,
            } => methods.push(MethodSignature {
                name: name.clone(),
                params: flatten_params(params),
                results: flatten_params(results),
                position: position.clone(),
            }),
            RawInterfaceElem::Embed(expr) => embeds.push(embedded_reference(expr)),
            RawInterfaceElem::Constraint(text) => constraints.push(text.clone()),
        }
    }

    Shape::Interface {
        methods,
        embeds,
        constraints,
    }
}

/// One reference per declared name; an unnamed group still counts once
fn flatten_params(params: &[RawParam]) -> Vec<TypeReference> {
    let mut refs = Vec::new();
    for param in params {
        let reference = if param.variadic {
            TypeReference::Opaque(format!("...{}", param.ty.render()))
        } else {
            TypeReference::from_expr(&param.ty)
        };
        let count = param.names.len().max(1);
        refs.extend(std::iter::repeat(reference).take(count));
    }
    refs
}
