//! `QualifiedName`: the `A::B<T>::~C` family of names (spec §3).

use crate::location::Location;
use crate::token::Token;
use serde::Serialize;

use super::types::Type;

/// An argument in a template-id's argument list. Spec §3 models `Type` and
/// opaque expression runs as the two shapes a template argument can take;
/// the parser picks one by first attempting a type parse and falling back
/// to an opaque token run (see spec §4.2 disambiguation).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TemplateArgument {
    Type(Box<Type>),
    Expression(Vec<Token>),
}

/// One segment of a qualified name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NameSegment {
    Identifier(String),
    TemplateId {
        name: String,
        arguments: Vec<TemplateArgument>,
    },
    /// `~identifier` or `~type` (a destructor name).
    Destructor(String),
    /// `operator+`, `operator[]`, `operator""_x`, etc. — the spelling of
    /// the operator itself, without the `operator` keyword.
    Operator(String),
    /// `operator T` — a user-defined conversion function name.
    ConversionOperator(Box<Type>),
}

/// An ordered sequence of name segments, e.g. `std::vector<int>::iterator`.
///
/// A leading empty segment list combined with `leading_global = true`
/// denotes the global-scope qualifier (`::X`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualifiedName {
    pub leading_global: bool,
    pub segments: Vec<NameSegment>,
    pub location: Location,
}

impl QualifiedName {
    pub fn simple(name: impl Into<String>, location: Location) -> Self {
        Self {
            leading_global: false,
            segments: vec![NameSegment::Identifier(name.into())],
            location,
        }
    }

    /// The final segment's plain identifier spelling, if it has one —
    /// `A::B<int>` yields `"B"`, `A::operator+` yields `None`.
    pub fn last_identifier(&self) -> Option<&str> {
        match self.segments.last()? {
            NameSegment::Identifier(s) => Some(s),
            NameSegment::TemplateId { name, .. } => Some(name),
            _ => None,
        }
    }
}
