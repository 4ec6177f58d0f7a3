//! Parser configuration (spec §6).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What to do with `#`-prefixed lines encountered between declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PreprocessorLines {
    /// Drop them entirely; they do not appear in the AST.
    Ignore,
    /// Surface them as `Declaration::PragmaOrIncludeLine`.
    #[default]
    Retain,
}

/// What to do with a function/method body once the opening `{` is seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MethodBody {
    /// Consume and discard the balanced `{ ... }` run.
    #[default]
    Skip,
    /// Keep the body as an opaque token vector on the declaration.
    RetainTokens,
}

/// What to do with `extern template` declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExternTemplateHandling {
    /// Record as an ordinary (templated) declaration.
    #[default]
    Record,
    /// Skip to the terminating `;` without producing a declaration.
    Skip,
}

/// Configuration knobs threaded through a single parse.
///
/// Passed by value into [`crate::parse`] — see spec §5 for why this is the
/// only ambient configuration a parse needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub preprocessor_lines: PreprocessorLines,
    pub retain_doxygen_comments: bool,
    pub method_body: MethodBody,
    pub extern_template_handling: ExternTemplateHandling,
    /// Identifiers seeded into the global scope's type table, for headers
    /// that reference types declared in a translation unit the parser never
    /// sees (e.g. forward-declared library types).
    pub known_type_names: HashSet<String>,
    /// When true, refuse to silently accept vendor extensions the parser
    /// does not recognize (surfaces `ParseError::Unsupported` instead of
    /// best-effort skipping).
    pub strict: bool,
    pub gnu_attributes: bool,
    pub msvc_attributes: bool,
    pub concepts: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            preprocessor_lines: PreprocessorLines::default(),
            retain_doxygen_comments: true,
            method_body: MethodBody::default(),
            extern_template_handling: ExternTemplateHandling::default(),
            known_type_names: HashSet::new(),
            strict: false,
            gnu_attributes: true,
            msvc_attributes: true,
            concepts: true,
        }
    }
}
