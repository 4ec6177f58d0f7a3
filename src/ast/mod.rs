//! The public data model: a tagged, serializable AST (spec §3, §6).

pub mod attributes;
pub mod declarations;
pub mod qualified_name;
pub mod types;

pub use attributes::{Attribute, AttributeForm};
pub use declarations::{
    AccessSpecifier, BaseSpecifier, ClassKey, Declaration, Enumerator, FriendTarget, FunctionDecl,
    FunctionKind, MemberInitializer, Parameter, TemplateParameter, TemplateParameterKind,
    TemplateParameterList, VariableDecl,
};
pub use qualified_name::{NameSegment, QualifiedName, TemplateArgument};
pub use types::{CvQualifiers, ElaboratedKey, FunctionType, NoexceptSpec, RefKind, Type, TypeKind};

use serde::Serialize;

/// The root of a completed parse: the ordered top-level declarations of a
/// single translation unit, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ast {
    pub declarations: Vec<Declaration>,
}
