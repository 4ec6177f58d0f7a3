//! # cxxhdr
//!
//! A recursive-descent parser for preprocessed C++ header sources: text that
//! already went through a C preprocessor (or never had directives beyond
//! `#pragma`/`#include`) in, a typed AST out.
//!
//! The front end is two stages — [`lexer`] turns source text into a
//! [`token_stream`] of [`token::Token`]s, and [`parse`] walks that stream
//! recursively, consulting a [`scope`] stack to disambiguate types from
//! expressions, to build an [`ast::Ast`]. A [`visitor::Visitor`] can observe
//! declarations as they complete without paying for the full tree.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cxxhdr::{parse, Options};
//!
//! let source = "namespace ns { struct Point { int x, y; }; }";
//! let (ast, diagnostics) = parse("point.h", source, Options::default())
//!     .map_err(|failure| failure.error)?;
//! println!("{} top-level declarations, {} diagnostics", ast.declarations.len(), diagnostics.len());
//! # Ok::<(), cxxhdr::ParseError>(())
//! ```
//!
// Public library API modules
pub mod ast;
pub mod error;
pub mod lexer;
pub mod location;
pub mod options;
pub mod parse;
pub mod scope;
pub mod token;
pub mod token_stream;
pub mod visitor;

pub use ast::Ast;
pub use error::{Diagnostic, Error, ParseError};
pub use options::{ExternTemplateHandling, MethodBody, Options, PreprocessorLines};
pub use parse::{ParseFailure, Parser};
pub use visitor::{NullVisitor, Visitor};

/// Parse `source_text` (already read into memory) as a single translation
/// unit, driving `visitor` with declaration events as they complete.
///
/// `filename` is attached to every [`location::Location`] produced and does
/// not need to name a real file — it only shows up in diagnostics and error
/// messages. On success, returns the built [`Ast`] together with any
/// recoverable diagnostics collected along the way (spec §7). A fatal error
/// aborts with the partial AST built so far.
pub fn parse_with_visitor(
    filename: &str,
    source_text: &str,
    options: Options,
    visitor: &mut dyn Visitor,
) -> Result<(Ast, Vec<Diagnostic>), ParseFailure> {
    Parser::new(filename, source_text, options, visitor).parse_translation_unit()
}

/// Parse `source_text` as a single translation unit, discarding streaming
/// visitor events. The common entry point when only the returned [`Ast`]
/// matters.
pub fn parse(
    filename: &str,
    source_text: &str,
    options: Options,
) -> Result<(Ast, Vec<Diagnostic>), ParseFailure> {
    let mut visitor = NullVisitor;
    parse_with_visitor(filename, source_text, options, &mut visitor)
}

/// Read `path` from disk and parse it as a single translation unit.
///
/// Wraps filesystem failures in [`Error::Io`]; a parse failure is
/// propagated as [`Error::Parse`] of the [`ParseFailure`]'s error, with the
/// partial AST and diagnostics discarded. Callers that need the partial
/// result on a fatal error should read the file themselves and call
/// [`parse`] directly.
pub fn parse_file(path: &std::path::Path, options: Options) -> Result<(Ast, Vec<Diagnostic>), Error> {
    let source_text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;
    let filename = path.display().to_string();
    parse(&filename, &source_text, options).map_err(|failure| Error::Parse(failure.error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_source_yields_no_declarations() {
        let (ast, diagnostics) = parse("empty.h", "", Options::default()).unwrap();
        assert!(ast.declarations.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn parse_two_declarations_in_sequence() {
        let (ast, diagnostics) = parse("two.h", "int x; int y;", Options::default()).unwrap();
        assert_eq!(ast.declarations.len(), 2);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn parse_file_wraps_missing_file_as_io_error() {
        let path = std::path::Path::new("/nonexistent/path/does-not-exist.h");
        let err = parse_file(path, Options::default()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
