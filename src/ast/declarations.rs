//! `Declaration` and its supporting types (spec §3, §4.3).

use crate::location::Location;
use crate::token::Token;
use serde::Serialize;

use super::attributes::Attribute;
use super::qualified_name::QualifiedName;
use super::types::{CvQualifiers, NoexceptSpec, RefKind, Type};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub type_: Type,
    pub name: Option<String>,
    pub default_value_tokens: Option<Vec<Token>>,
    pub attributes: Vec<Attribute>,
    pub is_pack: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TemplateParameterKind {
    /// `typename T = Default` / `class T = Default`.
    Type {
        /// `true` for the `typename` spelling, `false` for `class`.
        used_typename_keyword: bool,
        name: Option<String>,
        default: Option<Box<Type>>,
    },
    /// `template<...> typename Name = Default` — a template template
    /// parameter, carrying its own inner parameter list.
    Template {
        inner: Box<TemplateParameterList>,
        name: Option<String>,
        default: Option<QualifiedName>,
    },
    /// `int N = 4` — a non-type template parameter.
    NonType {
        type_: Box<Type>,
        name: Option<String>,
        default: Option<Vec<Token>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateParameter {
    pub kind: TemplateParameterKind,
    pub is_pack: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateParameterList {
    pub parameters: Vec<TemplateParameter>,
    /// Trailing `requires(...)` clause on the template head, if present.
    pub requires_clause: Option<Vec<Token>>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassKey {
    Class,
    Struct,
    Union,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessSpecifier {
    Public,
    Protected,
    Private,
}

impl ClassKey {
    /// Default member access for a class body with no access-specifier
    /// label yet seen (spec §3 invariant).
    pub fn default_access(self) -> AccessSpecifier {
        match self {
            ClassKey::Struct | ClassKey::Union => AccessSpecifier::Public,
            ClassKey::Class => AccessSpecifier::Private,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseSpecifier {
    pub access: AccessSpecifier,
    pub is_virtual: bool,
    pub type_: Type,
    pub is_pack: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enumerator {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub value_tokens: Option<Vec<Token>>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberInitializer {
    pub target: QualifiedName,
    /// Tokens between the opening and closing delimiter, exclusive — the
    /// delimiter itself (`(...)` or `{...}`) is not recorded since it
    /// carries no information beyond the opaque argument run.
    pub args_tokens: Vec<Token>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FunctionKind {
    Ordinary,
    Constructor,
    Destructor,
    ConversionOperator,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: QualifiedName,
    pub kind: FunctionKind,
    /// `None` for constructors/destructors, `Some` otherwise (including
    /// conversion operators, whose target type is also reachable via the
    /// `operator T` name segment).
    pub return_type: Option<Type>,
    pub parameters: Vec<Parameter>,
    pub is_variadic: bool,
    pub cv: CvQualifiers,
    pub ref_qual: Option<RefKind>,
    pub noexcept: NoexceptSpec,
    pub is_virtual: bool,
    pub is_explicit: bool,
    pub is_constexpr: bool,
    pub is_consteval: bool,
    pub is_constinit: bool,
    pub is_static: bool,
    pub is_friend: bool,
    pub is_inline: bool,
    pub is_pure: bool,
    pub is_default: bool,
    pub is_deleted: bool,
    pub is_override: bool,
    pub is_final: bool,
    pub trailing_return: Option<Type>,
    pub member_initializers: Vec<MemberInitializer>,
    pub body_tokens: Option<Vec<Token>>,
    pub template: Option<TemplateParameterList>,
    pub requires_clause: Option<Vec<Token>>,
    pub attributes: Vec<Attribute>,
    /// The access specifier in effect where this function was declared, if
    /// it's a class member (spec §3).
    pub access: Option<AccessSpecifier>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDecl {
    pub type_: Type,
    pub name: String,
    pub initializer_tokens: Option<Vec<Token>>,
    pub is_static: bool,
    pub is_extern: bool,
    pub is_constexpr: bool,
    pub is_inline: bool,
    pub is_thread_local: bool,
    pub bitfield_width: Option<Vec<Token>>,
    pub template: Option<TemplateParameterList>,
    pub attributes: Vec<Attribute>,
    /// The access specifier in effect where this variable was declared, if
    /// it's a class member (spec §3).
    pub access: Option<AccessSpecifier>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FriendTarget {
    Class(Box<Declaration>),
    Function(Box<FunctionDecl>),
    Type(Type),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Declaration {
    Namespace {
        name: Option<QualifiedName>,
        is_inline: bool,
        body: Vec<Declaration>,
        location: Location,
    },
    /// `namespace Alias = Target;`
    NamespaceAlias {
        name: String,
        target: QualifiedName,
        location: Location,
    },
    Class {
        key: ClassKey,
        name: Option<QualifiedName>,
        bases: Vec<BaseSpecifier>,
        is_final: bool,
        body: Vec<Declaration>,
        is_forward: bool,
        template: Option<TemplateParameterList>,
        attributes: Vec<Attribute>,
        access: Option<AccessSpecifier>,
        location: Location,
    },
    Enum {
        name: Option<QualifiedName>,
        is_scoped: bool,
        underlying_type: Option<Type>,
        enumerators: Vec<Enumerator>,
        is_forward: bool,
        attributes: Vec<Attribute>,
        access: Option<AccessSpecifier>,
        location: Location,
    },
    Function(FunctionDecl),
    Variable(VariableDecl),
    Typedef {
        name: String,
        type_: Type,
        access: Option<AccessSpecifier>,
        location: Location,
    },
    /// `using Name = Type;`, optionally an alias template.
    Using {
        name: String,
        type_: Type,
        template: Option<TemplateParameterList>,
        access: Option<AccessSpecifier>,
        location: Location,
    },
    UsingDeclaration {
        name: QualifiedName,
        access: Option<AccessSpecifier>,
        location: Location,
    },
    UsingDirective {
        name: QualifiedName,
        access: Option<AccessSpecifier>,
        location: Location,
    },
    UsingEnum {
        name: QualifiedName,
        access: Option<AccessSpecifier>,
        location: Location,
    },
    Friend {
        target: FriendTarget,
        access: Option<AccessSpecifier>,
        location: Location,
    },
    StaticAssert {
        expression_tokens: Vec<Token>,
        message_tokens: Option<Vec<Token>>,
        access: Option<AccessSpecifier>,
        location: Location,
    },
    ExternBlock {
        linkage: String,
        body: Vec<Declaration>,
        location: Location,
    },
    PragmaOrIncludeLine {
        raw: String,
        location: Location,
    },
}

impl Declaration {
    pub fn location(&self) -> &Location {
        match self {
            Declaration::Namespace { location, .. }
            | Declaration::NamespaceAlias { location, .. }
            | Declaration::Class { location, .. }
            | Declaration::Enum { location, .. }
            | Declaration::Typedef { location, .. }
            | Declaration::Using { location, .. }
            | Declaration::UsingDeclaration { location, .. }
            | Declaration::UsingDirective { location, .. }
            | Declaration::UsingEnum { location, .. }
            | Declaration::Friend { location, .. }
            | Declaration::StaticAssert { location, .. }
            | Declaration::ExternBlock { location, .. }
            | Declaration::PragmaOrIncludeLine { location, .. } => location,
            Declaration::Function(f) => &f.location,
            Declaration::Variable(v) => &v.location,
        }
    }

    /// The access specifier in effect where this declaration appeared, if
    /// it's a class member. `None` both for non-members and for members of
    /// a `union`/`struct`/`class` body position that grammatically can't
    /// carry one (namespaces, `extern` blocks, `#`-lines never nest inside
    /// a class body in a way that matters here).
    pub fn access(&self) -> Option<AccessSpecifier> {
        match self {
            Declaration::Class { access, .. }
            | Declaration::Enum { access, .. }
            | Declaration::Typedef { access, .. }
            | Declaration::Using { access, .. }
            | Declaration::UsingDeclaration { access, .. }
            | Declaration::UsingDirective { access, .. }
            | Declaration::UsingEnum { access, .. }
            | Declaration::Friend { access, .. }
            | Declaration::StaticAssert { access, .. } => *access,
            Declaration::Function(f) => f.access,
            Declaration::Variable(v) => v.access,
            Declaration::Namespace { .. }
            | Declaration::NamespaceAlias { .. }
            | Declaration::ExternBlock { .. }
            | Declaration::PragmaOrIncludeLine { .. } => None,
        }
    }

    /// Stamp the access specifier in effect at the point this member was
    /// parsed. Called once, right after a member declaration completes,
    /// from the member-sequence loop; a no-op for variants that can't carry
    /// one.
    pub(crate) fn set_access(&mut self, new_access: Option<AccessSpecifier>) {
        match self {
            Declaration::Class { access, .. }
            | Declaration::Enum { access, .. }
            | Declaration::Typedef { access, .. }
            | Declaration::Using { access, .. }
            | Declaration::UsingDeclaration { access, .. }
            | Declaration::UsingDirective { access, .. }
            | Declaration::UsingEnum { access, .. }
            | Declaration::Friend { access, .. }
            | Declaration::StaticAssert { access, .. } => *access = new_access,
            Declaration::Function(f) => f.access = new_access,
            Declaration::Variable(v) => v.access = new_access,
            Declaration::Namespace { .. }
            | Declaration::NamespaceAlias { .. }
            | Declaration::ExternBlock { .. }
            | Declaration::PragmaOrIncludeLine { .. } => {}
        }
    }
}
