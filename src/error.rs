//! Error taxonomy for the lexer and parser (spec §7).

use crate::location::Location;
use thiserror::Error;

/// Everything that can go wrong while turning header text into an AST.
///
/// The first three variants are fatal: the parser aborts the current parse
/// and returns the partial AST built up to the enclosing top-level
/// declaration alongside the error. `Unsupported` is recoverable — callers
/// get a [`Diagnostic`] instead of an `Err`, and the parser skips to the next
/// `;` or matching `}` at the outer depth. `InternalInvariantBroken` is
/// always fatal and indicates a parser bug, not malformed input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{location}: lexical error: {message}")]
    LexicalError { message: String, location: Location },

    #[error("{location}: unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: Location,
    },

    #[error("{location}: unbalanced delimiter: {message}")]
    UnbalancedDelimiter { message: String, location: Location },

    #[error("{location}: ambiguous declaration while parsing {context}")]
    AmbiguousDeclaration { context: String, location: Location },

    #[error("{location}: unsupported construct: {construct}")]
    Unsupported {
        construct: String,
        location: Location,
    },

    #[error("{location}: internal invariant broken: {message}")]
    InternalInvariantBroken { message: String, location: Location },
}

impl ParseError {
    pub fn location(&self) -> &Location {
        match self {
            ParseError::LexicalError { location, .. }
            | ParseError::UnexpectedToken { location, .. }
            | ParseError::UnbalancedDelimiter { location, .. }
            | ParseError::AmbiguousDeclaration { location, .. }
            | ParseError::Unsupported { location, .. }
            | ParseError::InternalInvariantBroken { location, .. } => location,
        }
    }

    /// Whether this error kind is recoverable (see §7 policy).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ParseError::Unsupported { .. })
    }
}

/// A non-fatal finding surfaced alongside a successful (or partially
/// successful) parse — today this is always an `Unsupported` construct that
/// was skipped rather than aborting the whole parse.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub location: Location,
}

impl From<&ParseError> for Diagnostic {
    fn from(err: &ParseError) -> Self {
        Diagnostic {
            message: err.to_string(),
            location: err.location().clone(),
        }
    }
}

/// Top-level crate error, adding I/O failures to [`ParseError`] for the
/// convenience `parse_file` entry point.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    fn loc() -> Location {
        Location::new(std::rc::Rc::from("t.h"), 1, 1)
    }

    #[test]
    fn only_unsupported_is_recoverable() {
        assert!(ParseError::Unsupported { construct: "module".into(), location: loc() }.is_recoverable());
        assert!(!ParseError::LexicalError { message: "x".into(), location: loc() }.is_recoverable());
        assert!(!ParseError::InternalInvariantBroken { message: "x".into(), location: loc() }.is_recoverable());
    }

    #[test]
    fn diagnostic_captures_message_and_location() {
        let err = ParseError::Unsupported { construct: "asm block".into(), location: loc() };
        let diag = Diagnostic::from(&err);
        assert_eq!(diag.location, loc());
        assert!(diag.message.contains("asm block"));
    }

    #[test]
    fn error_display_distinguishes_parse_and_io() {
        let parse_err = Error::from(ParseError::LexicalError { message: "bad".into(), location: loc() });
        assert!(parse_err.to_string().contains("bad"));

        let io_err = Error::Io {
            path: "missing.h".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(io_err.to_string().contains("missing.h"));
    }
}
