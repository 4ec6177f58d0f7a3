//! Recursive-descent Declaration Parser and Type Parser (spec §4.2, §4.3).

pub mod declarations;
pub mod types;

use std::rc::Rc;

use crate::ast::{Ast, Attribute, AttributeForm, Declaration};
use crate::error::{Diagnostic, ParseError};
use crate::lexer::Lexer;
use crate::options::Options;
use crate::scope::ScopeStack;
use crate::token::{Punct, Token, TokenKind};
use crate::token_stream::TokenStream;
use crate::visitor::{dispatch, Visitor};

/// Failure returned when a fatal error aborts a parse partway through: the
/// error itself, plus the top-level declarations successfully built before
/// it, plus any diagnostics accumulated along the way (spec §7 policy).
#[derive(Debug)]
pub struct ParseFailure {
    pub error: ParseError,
    pub partial: Ast,
    pub diagnostics: Vec<Diagnostic>,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ParseFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// The context a type expression is being parsed in (spec §4.2): governs
/// which disambiguation heuristics apply and whether a name is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeContext {
    TopLevel,
    Parameter,
    TemplateArgument,
    TrailingReturn,
    NewExpression,
}

pub struct Parser<'v> {
    pub(crate) tokens: TokenStream,
    pub(crate) scope: ScopeStack,
    pub(crate) options: Options,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) visitor: &'v mut dyn Visitor,
}

impl<'v> Parser<'v> {
    pub fn new(filename: &str, source_text: &str, options: Options, visitor: &'v mut dyn Visitor) -> Self {
        let lexer = Lexer::new(Rc::<str>::from(filename), source_text, options.retain_doxygen_comments);
        let tokens = TokenStream::new(lexer);
        let mut scope = ScopeStack::new();
        scope.seed_known_types(options.known_type_names.iter().cloned());
        Self {
            tokens,
            scope,
            options,
            diagnostics: Vec::new(),
            visitor,
        }
    }

    /// Parse the whole input as a sequence of top-level declarations.
    /// Recoverable (`Unsupported`) errors are recorded as diagnostics and
    /// skipped over; the first fatal error aborts with the partial AST
    /// built so far (spec §7).
    pub fn parse_translation_unit(mut self) -> Result<(Ast, Vec<Diagnostic>), ParseFailure> {
        let mut declarations = Vec::new();
        loop {
            match self.tokens.at_eof() {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => {
                    return Err(ParseFailure {
                        error: e,
                        partial: Ast { declarations },
                        diagnostics: self.diagnostics,
                    })
                }
            }
            match self.parse_top_level_declaration() {
                Ok(Some(decl)) => {
                    dispatch(self.visitor, &decl);
                    declarations.push(decl);
                }
                Ok(None) => {}
                Err(e) if e.is_recoverable() => {
                    self.diagnostics.push(Diagnostic::from(&e));
                    if let Err(fatal) = self.tokens.recover_to_next_declaration() {
                        return Err(ParseFailure {
                            error: fatal,
                            partial: Ast { declarations },
                            diagnostics: self.diagnostics,
                        });
                    }
                }
                Err(e) => {
                    return Err(ParseFailure {
                        error: e,
                        partial: Ast { declarations },
                        diagnostics: self.diagnostics,
                    })
                }
            }
        }
        Ok((Ast { declarations }, self.diagnostics))
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        let tok = self.tokens.peek0()?.clone();
        if tok.is_identifier() {
            self.tokens.bump()?;
            Ok(tok.spelling)
        } else {
            Err(ParseError::UnexpectedToken {
                expected: "identifier".into(),
                found: tok.describe(),
                location: tok.location,
            })
        }
    }

    /// Read tokens until one of `terminators` appears at bracket depth 0,
    /// without consuming the terminator. The shared engine behind every
    /// opaque balanced-token capture named in spec §9 (default arguments,
    /// initializers, array sizes, bit-field widths, enumerator values,
    /// `static_assert` predicates).
    pub(crate) fn collect_until_top_level(&mut self, terminators: &[Punct]) -> Result<Vec<Token>, ParseError> {
        let mut depth = 0i32;
        let mut out = Vec::new();
        loop {
            let tok = self.tokens.peek0()?.clone();
            if tok.is_eof() {
                return Err(ParseError::UnbalancedDelimiter {
                    message: "unexpected end of file".into(),
                    location: tok.location,
                });
            }
            if depth == 0 && terminators.iter().any(|p| tok.is_punct(*p)) {
                return Ok(out);
            }
            match &tok.kind {
                TokenKind::Punct(Punct::LParen)
                | TokenKind::Punct(Punct::LBrace)
                | TokenKind::Punct(Punct::LBracket) => depth += 1,
                TokenKind::Punct(Punct::RParen)
                | TokenKind::Punct(Punct::RBrace)
                | TokenKind::Punct(Punct::RBracket) => depth -= 1,
                _ => {}
            }
            self.tokens.bump()?;
            out.push(tok);
        }
    }

    /// Leading attribute sequences: `[[...]]`, `__attribute__((...))` (if
    /// `Options::gnu_attributes`), `__declspec(...)` (if
    /// `Options::msvc_attributes`) — spec §4.3 step 1.
    pub(crate) fn parse_attribute_seq(&mut self) -> Result<Vec<Attribute>, ParseError> {
        let mut out = Vec::new();
        loop {
            let tok = self.tokens.peek0()?.clone();
            if tok.is_punct(Punct::LBracket) && self.tokens.peek(1)?.is_punct(Punct::LBracket) {
                self.tokens.bump()?;
                self.tokens.bump()?;
                let mut body = self.tokens.collect_balanced(Punct::LBracket, Punct::RBracket)?;
                body.pop();
                self.tokens.expect_punct(Punct::RBracket)?;
                out.push(Attribute {
                    form: AttributeForm::Standard,
                    raw: spell(&body),
                    location: tok.location,
                });
                continue;
            }
            if tok.is_keyword(crate::token::Keyword::Alignas) {
                self.tokens.bump()?;
                self.tokens.expect_punct(Punct::LParen)?;
                let mut body = self.tokens.collect_balanced(Punct::LParen, Punct::RParen)?;
                body.pop();
                out.push(Attribute {
                    form: AttributeForm::Standard,
                    raw: format!("alignas({})", spell(&body)),
                    location: tok.location,
                });
                continue;
            }
            if tok.is_identifier() && tok.spelling == "__attribute__" {
                if !self.options.gnu_attributes {
                    self.reject_or_skip_vendor_extension(&tok, "__attribute__")?;
                    continue;
                }
                self.tokens.bump()?;
                self.tokens.expect_punct(Punct::LParen)?;
                self.tokens.expect_punct(Punct::LParen)?;
                let mut body = self.tokens.collect_balanced(Punct::LParen, Punct::RParen)?;
                body.pop();
                self.tokens.expect_punct(Punct::RParen)?;
                out.push(Attribute {
                    form: AttributeForm::Gnu,
                    raw: spell(&body),
                    location: tok.location,
                });
                continue;
            }
            if tok.is_identifier() && tok.spelling == "__declspec" {
                if !self.options.msvc_attributes {
                    self.reject_or_skip_vendor_extension(&tok, "__declspec")?;
                    continue;
                }
                self.tokens.bump()?;
                self.tokens.expect_punct(Punct::LParen)?;
                let mut body = self.tokens.collect_balanced(Punct::LParen, Punct::RParen)?;
                body.pop();
                out.push(Attribute {
                    form: AttributeForm::Declspec,
                    raw: spell(&body),
                    location: tok.location,
                });
                continue;
            }
            if tok.is_identifier() && matches!(tok.spelling.as_str(), "__cdecl" | "__stdcall" | "__fastcall") {
                if !self.options.msvc_attributes {
                    self.reject_or_skip_vendor_extension(&tok, tok.spelling.as_str())?;
                    continue;
                }
                self.tokens.bump()?;
                out.push(Attribute {
                    form: AttributeForm::Declspec,
                    raw: tok.spelling.clone(),
                    location: tok.location,
                });
                continue;
            }
            break;
        }
        Ok(out)
    }

    /// A vendor-extension token whose corresponding option flag is off.
    /// `Options::strict` decides whether this is a recoverable
    /// `Unsupported` error (token left unconsumed; the caller's recovery
    /// skip handles cleanup) or a silent best-effort skip of the token and
    /// its parenthesized argument list, if any.
    fn reject_or_skip_vendor_extension(&mut self, tok: &Token, construct: &str) -> Result<(), ParseError> {
        if self.options.strict {
            return Err(ParseError::Unsupported {
                construct: construct.to_string(),
                location: tok.location.clone(),
            });
        }
        self.tokens.bump()?;
        if self.tokens.peek0()?.is_punct(Punct::LParen) {
            self.tokens.bump()?;
            self.tokens.collect_balanced(Punct::LParen, Punct::RParen)?;
        }
        Ok(())
    }
}

fn spell(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.spelling.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
