//! The streaming alternative to building an [`crate::ast::Ast`] (spec
//! §2 item 6, §4.4).
//!
//! The Declaration Parser calls these events in source order as it
//! completes each declaration, in addition to returning the built AST
//! directly. A caller that only needs to react to declarations as they are
//! found (without paying for the full tree) can supply a [`Visitor`]
//! instead of inspecting the returned [`crate::ast::Ast`].

use crate::ast::{Declaration, Enumerator, FunctionDecl, VariableDecl};

pub trait Visitor {
    fn enter_namespace(&mut self, _name: Option<&str>) {}
    fn exit_namespace(&mut self) {}
    fn enter_class(&mut self, _name: Option<&str>) {}
    fn exit_class(&mut self) {}
    fn on_function(&mut self, _decl: &FunctionDecl) {}
    fn on_variable(&mut self, _decl: &VariableDecl) {}
    fn on_typedef(&mut self, _decl: &Declaration) {}
    fn on_using(&mut self, _decl: &Declaration) {}
    fn on_friend(&mut self, _decl: &Declaration) {}
    fn on_enum(&mut self, _name: Option<&str>, _enumerators: &[Enumerator]) {}
    fn on_static_assert(&mut self, _decl: &Declaration) {}
    fn on_pragma(&mut self, _raw: &str) {}
}

/// A [`Visitor`] that does nothing — the default when a caller only wants
/// the returned AST and has no use for the streaming events.
#[derive(Debug, Default)]
pub struct NullVisitor;

impl Visitor for NullVisitor {}

/// Dispatches a single completed top-level declaration to the matching
/// [`Visitor`] event(s), recursing into namespace/class bodies. Called by
/// the Declaration Parser once per declaration it finishes building.
pub fn dispatch(visitor: &mut dyn Visitor, decl: &Declaration) {
    match decl {
        Declaration::Namespace { name, body, .. } => {
            visitor.enter_namespace(name.as_ref().and_then(|n| n.last_identifier()));
            for child in body {
                dispatch(visitor, child);
            }
            visitor.exit_namespace();
        }
        Declaration::Class { name, body, .. } => {
            visitor.enter_class(name.as_ref().and_then(|n| n.last_identifier()));
            for child in body {
                dispatch(visitor, child);
            }
            visitor.exit_class();
        }
        Declaration::ExternBlock { body, .. } => {
            for child in body {
                dispatch(visitor, child);
            }
        }
        Declaration::Function(f) => visitor.on_function(f),
        Declaration::Variable(v) => visitor.on_variable(v),
        Declaration::Typedef { .. } | Declaration::Using { .. } => visitor.on_typedef(decl),
        Declaration::UsingDeclaration { .. }
        | Declaration::UsingDirective { .. }
        | Declaration::UsingEnum { .. } => visitor.on_using(decl),
        Declaration::Friend { .. } => visitor.on_friend(decl),
        Declaration::Enum { name, enumerators, .. } => {
            visitor.on_enum(name.as_ref().and_then(|n| n.last_identifier()), enumerators)
        }
        Declaration::StaticAssert { .. } => visitor.on_static_assert(decl),
        Declaration::PragmaOrIncludeLine { raw, .. } => visitor.on_pragma(raw),
        Declaration::NamespaceAlias { .. } => {}
    }
}
