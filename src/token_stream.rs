//! Buffered token stream with arbitrary-lookahead peek and checkpoint/
//! rewind, sitting between the [`crate::lexer::Lexer`] and the parser
//! (spec §2, "Token Stream").

use crate::error::ParseError;
use crate::lexer::{DocComment, Lexer};
use crate::token::{Keyword, Punct, Token, TokenKind};

/// A rewind point produced by [`TokenStream::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

pub struct TokenStream {
    lexer: Lexer,
    /// All tokens lexed so far, including EOF once reached. Rewinding never
    /// discards entries, only the cursor moves backwards.
    tokens: Vec<Token>,
    /// Doc comments that preceded `tokens[i]`, indexed in parallel.
    docs: Vec<Vec<DocComment>>,
    /// Index into `tokens` of the next token [`Self::peek`] returns.
    cursor: usize,
    exhausted: bool,
}

impl TokenStream {
    pub fn new(lexer: Lexer) -> Self {
        Self {
            lexer,
            tokens: Vec::new(),
            docs: Vec::new(),
            cursor: 0,
            exhausted: false,
        }
    }

    fn ensure(&mut self, upto: usize) -> Result<(), ParseError> {
        while self.tokens.len() <= upto && !self.exhausted {
            let tok = self.lexer.next_token()?;
            let docs = self.lexer.take_pending_docs();
            let is_eof = tok.is_eof();
            self.tokens.push(tok);
            self.docs.push(docs);
            if is_eof {
                self.exhausted = true;
            }
        }
        Ok(())
    }

    /// Look `k` tokens ahead of the cursor (`k = 0` is the next token to be
    /// consumed). Past EOF this keeps returning the EOF token.
    pub fn peek(&mut self, k: usize) -> Result<&Token, ParseError> {
        let idx = self.cursor + k;
        self.ensure(idx)?;
        let last = self.tokens.len() - 1;
        Ok(&self.tokens[idx.min(last)])
    }

    pub fn peek0(&mut self) -> Result<&Token, ParseError> {
        self.peek(0)
    }

    /// Doc comments that immediately preceded the next token.
    pub fn pending_docs(&mut self) -> Result<&[DocComment], ParseError> {
        self.ensure(self.cursor)?;
        let last = self.tokens.len() - 1;
        Ok(&self.docs[self.cursor.min(last)])
    }

    /// Consume and return the next token, advancing the cursor.
    pub fn bump(&mut self) -> Result<Token, ParseError> {
        self.ensure(self.cursor)?;
        let last = self.tokens.len() - 1;
        let idx = self.cursor.min(last);
        let tok = self.tokens[idx].clone();
        if idx == self.cursor {
            self.cursor += 1;
        }
        Ok(tok)
    }

    pub fn mark(&self) -> Mark {
        Mark(self.cursor)
    }

    pub fn rewind(&mut self, mark: Mark) {
        tracing::trace!(from = self.cursor, to = mark.0, "rewinding token stream to checkpoint");
        self.cursor = mark.0;
    }

    pub fn at_eof(&mut self) -> Result<bool, ParseError> {
        Ok(self.peek0()?.is_eof())
    }

    /// Consume and return a token matching `punct`, else a fatal
    /// `UnexpectedToken`.
    pub fn expect_punct(&mut self, punct: Punct) -> Result<Token, ParseError> {
        let found = self.peek0()?.clone();
        if found.is_punct(punct) {
            self.bump()
        } else {
            Err(ParseError::UnexpectedToken {
                expected: format!("'{punct}'"),
                found: found.describe(),
                location: found.location,
            })
        }
    }

    pub fn eat_punct(&mut self, punct: Punct) -> Result<bool, ParseError> {
        if self.peek0()?.is_punct(punct) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn eat_keyword(&mut self, kw: Keyword) -> Result<bool, ParseError> {
        if self.peek0()?.is_keyword(kw) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume an identifier with exactly this spelling. Used for
    /// context-sensitive pseudo-keywords (`override`, `final`) that lex as
    /// plain identifiers rather than reserved words.
    pub fn eat_identifier_spelled(&mut self, spelling: &str) -> Result<bool, ParseError> {
        let tok = self.peek0()?;
        if tok.is_identifier() && tok.spelling == spelling {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// If the token at the cursor is `>>`, split it in place into two `>`
    /// tokens of the same location (second shifted one column over) so a
    /// nested template-argument list can close without consuming its
    /// enclosing list's closing `>` too (spec §4.2, §8 property 6). A
    /// no-op when the current token isn't `>>`.
    pub fn split_gtgt_if_needed(&mut self) -> Result<(), ParseError> {
        self.ensure(self.cursor)?;
        let idx = self.cursor.min(self.tokens.len() - 1);
        if self.tokens[idx].is_punct(Punct::GtGt) {
            let loc1 = self.tokens[idx].location.clone();
            let mut loc2 = loc1.clone();
            loc2.column += 1;
            let first = Token {
                kind: TokenKind::Punct(Punct::Gt),
                spelling: ">".to_string(),
                location: loc1,
            };
            let second = Token {
                kind: TokenKind::Punct(Punct::Gt),
                spelling: ">".to_string(),
                location: loc2,
            };
            self.tokens[idx] = first;
            self.tokens.insert(idx + 1, second);
            self.docs.insert(idx + 1, Vec::new());
        }
        Ok(())
    }

    /// Collect every token from the current position (inclusive) up to and
    /// including the token that closes the delimiter at depth 0, where
    /// `open`/`close` nest (e.g. `(`/`)`, `{`/`}`, `[`/`]`). The opening
    /// token must already have been consumed by the caller; this reads
    /// until, and consumes, the matching close. Used for the opaque
    /// balanced-token capture described in spec §9 (default arguments,
    /// initializers, bit-field widths, bodies, `static_assert` predicates).
    pub fn collect_balanced(&mut self, open: Punct, close: Punct) -> Result<Vec<Token>, ParseError> {
        let mut depth = 1u32;
        let mut out = Vec::new();
        loop {
            let tok = self.peek0()?.clone();
            if tok.is_eof() {
                return Err(ParseError::UnbalancedDelimiter {
                    message: format!("unterminated '{open}' ... '{close}'"),
                    location: tok.location,
                });
            }
            self.bump()?;
            if tok.is_punct(open) {
                depth += 1;
            } else if tok.is_punct(close) {
                depth -= 1;
                if depth == 0 {
                    out.push(tok);
                    return Ok(out);
                }
            }
            out.push(tok);
        }
    }

    /// Error-recovery skip for `ParseError::Unsupported`: advance to just
    /// past the next top-level `;`, or past the matching `}` if a `{` is
    /// seen first, whichever comes first — spec §7's recovery policy.
    pub fn recover_to_next_declaration(&mut self) -> Result<(), ParseError> {
        let mut depth = 0i32;
        loop {
            let tok = self.peek0()?.clone();
            if tok.is_eof() {
                return Ok(());
            }
            self.bump()?;
            match &tok.kind {
                TokenKind::Punct(Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RBrace) => {
                    depth -= 1;
                    if depth <= 0 {
                        return Ok(());
                    }
                }
                TokenKind::Punct(Punct::Semi) if depth == 0 => return Ok(()),
                _ => {}
            }
        }
    }
}
