//! `Type`: the tagged type-expression tree produced by the Type Parser
//! (spec §3, §4.2).

use crate::location::Location;
use crate::token::Token;
use serde::Serialize;

use super::attributes::Attribute;
use super::qualified_name::QualifiedName;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CvQualifiers {
    pub is_const: bool,
    pub is_volatile: bool,
}

impl CvQualifiers {
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RefKind {
    Lvalue,
    Rvalue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElaboratedKey {
    Class,
    Struct,
    Union,
    Enum,
}

/// `noexcept`, `noexcept(expr)`, or absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NoexceptSpec {
    None,
    Bare,
    Condition(Vec<Token>),
}

impl Default for NoexceptSpec {
    fn default() -> Self {
        NoexceptSpec::None
    }
}

/// A function type as it appears inside a function-pointer declarator or a
/// function declaration's signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionType {
    pub return_type: Box<Type>,
    pub parameters: Vec<super::declarations::Parameter>,
    pub is_variadic: bool,
    pub cv: CvQualifiers,
    pub ref_qual: Option<RefKind>,
    pub noexcept: NoexceptSpec,
    pub trailing_return: Option<Box<Type>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeKind {
    /// Canonical, space-separated fundamental-type spelling, e.g.
    /// `"unsigned long long"`.
    Fundamental(String),
    Named {
        name: QualifiedName,
        is_typename: bool,
        elaborated: Option<ElaboratedKey>,
    },
    Auto,
    DecltypeAuto,
    Decltype(Vec<Token>),
    Pointer(Box<Type>),
    Reference {
        inner: Box<Type>,
        kind: RefKind,
    },
    Array {
        inner: Box<Type>,
        size_tokens: Option<Vec<Token>>,
    },
    Function(Box<FunctionType>),
    MemberPointer {
        class_type: Box<Type>,
        inner: Box<Type>,
    },
    /// `T...` — a parameter-pack expansion of `inner`.
    Pack(Box<Type>),
}

/// A fully formed type expression: the tagged [`TypeKind`] plus the CV
/// qualification and attributes that apply to this level of the type
/// (spec §3: "A `Type` carries CV qualifiers ... and arbitrary attribute
/// sequences captured positionally").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Type {
    pub kind: TypeKind,
    pub cv: CvQualifiers,
    pub attributes: Vec<Attribute>,
    pub location: Location,
}

impl Type {
    pub fn new(kind: TypeKind, location: Location) -> Self {
        Self {
            kind,
            cv: CvQualifiers::none(),
            attributes: Vec::new(),
            location,
        }
    }

    pub fn with_cv(mut self, cv: CvQualifiers) -> Self {
        self.cv = cv;
        self
    }

    pub fn with_attributes(mut self, attrs: Vec<Attribute>) -> Self {
        self.attributes = attrs;
        self
    }
}
