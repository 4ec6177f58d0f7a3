//! Lexer: turns normalized source characters into a stream of [`Token`]s
//! (spec §4.1).

pub mod reader;

use crate::error::ParseError;
use crate::location::Location;
use crate::token::{Keyword, Punct, Token, TokenKind};
use reader::{normalize, NormChar};
use std::rc::Rc;

/// A doxygen-style comment (`///`, `/**`, `//!`, `/*!`) captured while
/// skipping trivia, pending attachment to whatever declaration follows it.
#[derive(Debug, Clone)]
pub struct DocComment {
    pub text: String,
    pub location: Location,
}

/// A lightweight, copyable snapshot of lexer position, restorable with
/// [`Lexer::restore`]. Used for the speculative declaration-vs-expression
/// lookahead described in spec §4.2.
#[derive(Debug, Clone, Copy)]
pub struct LexerCheckpoint {
    idx: usize,
    start_of_line: bool,
    pending_docs_len: usize,
}

const STRING_PREFIXES: &[&str] = &["u8", "u", "U", "L", "R", "u8R", "uR", "UR", "LR"];

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic() || (!c.is_ascii() && c.is_alphabetic())
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric() || (!c.is_ascii() && c.is_alphanumeric())
}

pub struct Lexer {
    buf: Vec<NormChar>,
    idx: usize,
    start_of_line: bool,
    retain_doxygen: bool,
    pending_docs: Vec<DocComment>,
}

impl Lexer {
    pub fn new(filename: impl Into<Rc<str>>, src: &str, retain_doxygen: bool) -> Self {
        Self {
            buf: normalize(filename.into(), src),
            idx: 0,
            start_of_line: true,
            retain_doxygen,
            pending_docs: Vec::new(),
        }
    }

    pub fn checkpoint(&self) -> LexerCheckpoint {
        LexerCheckpoint {
            idx: self.idx,
            start_of_line: self.start_of_line,
            pending_docs_len: self.pending_docs.len(),
        }
    }

    pub fn restore(&mut self, cp: LexerCheckpoint) {
        self.idx = cp.idx;
        self.start_of_line = cp.start_of_line;
        self.pending_docs.truncate(cp.pending_docs_len);
    }

    /// Drain any doc comments captured since the last call. The parser
    /// calls this right after lexing the token a comment should attach to.
    pub fn take_pending_docs(&mut self) -> Vec<DocComment> {
        std::mem::take(&mut self.pending_docs)
    }

    fn at(&self, i: usize) -> char {
        self.buf.get(i).map(|c| c.ch).unwrap_or('\0')
    }

    fn cur(&self) -> char {
        self.at(self.idx)
    }

    fn cur_loc(&self) -> Location {
        self.buf[self.idx].location.clone()
    }

    fn bump(&mut self) -> char {
        let c = self.cur();
        if c != '\0' {
            self.idx += 1;
        }
        c
    }

    fn slice_to_string(&self, start: usize, end: usize) -> String {
        self.buf[start..end].iter().map(|c| c.ch).collect()
    }

    /// Skip whitespace and comments, capturing doxygen comments. Returns
    /// `Ok(())`; a fatal `LexicalError` is returned for unterminated block
    /// comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.cur() {
                ' ' | '\t' | '\x0b' | '\x0c' => {
                    self.idx += 1;
                }
                '\n' => {
                    self.idx += 1;
                    self.start_of_line = true;
                }
                '/' if self.at(self.idx + 1) == '/' => {
                    let loc = self.cur_loc();
                    let start = self.idx;
                    let is_doc = self.at(self.idx + 2) == '!'
                        || (self.at(self.idx + 2) == '/' && self.at(self.idx + 3) != '/');
                    while self.cur() != '\n' && self.cur() != '\0' {
                        self.idx += 1;
                    }
                    if is_doc && self.retain_doxygen {
                        self.pending_docs.push(DocComment {
                            text: self.slice_to_string(start, self.idx),
                            location: loc,
                        });
                    }
                }
                '/' if self.at(self.idx + 1) == '*' => {
                    let loc = self.cur_loc();
                    let start = self.idx;
                    let is_doc = self.at(self.idx + 2) == '!'
                        || (self.at(self.idx + 2) == '*' && self.at(self.idx + 3) != '/');
                    self.idx += 2;
                    let mut closed = false;
                    while self.cur() != '\0' {
                        if self.cur() == '*' && self.at(self.idx + 1) == '/' {
                            self.idx += 2;
                            closed = true;
                            break;
                        }
                        self.idx += 1;
                    }
                    if !closed {
                        return Err(ParseError::LexicalError {
                            message: "unterminated block comment".into(),
                            location: loc,
                        });
                    }
                    if is_doc && self.retain_doxygen {
                        self.pending_docs.push(DocComment {
                            text: self.slice_to_string(start, self.idx),
                            location: loc,
                        });
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Non-mutating lookahead past trivia starting at byte index `from`,
    /// used to decide whether two string literals are adjacent.
    fn skip_trivia_at(&self, mut i: usize) -> usize {
        loop {
            match self.at(i) {
                ' ' | '\t' | '\n' | '\x0b' | '\x0c' => i += 1,
                '/' if self.at(i + 1) == '/' => {
                    while self.at(i) != '\n' && self.at(i) != '\0' {
                        i += 1;
                    }
                }
                '/' if self.at(i + 1) == '*' => {
                    i += 2;
                    while !(self.at(i) == '*' && self.at(i + 1) == '/') && self.at(i) != '\0' {
                        i += 1;
                    }
                    if self.at(i) != '\0' {
                        i += 2;
                    }
                }
                _ => break,
            }
        }
        i
    }

    /// If `buf[at..]` begins with an optional encoding/raw-string prefix
    /// immediately followed by a quote character, return the prefix text.
    fn classify_literal_prefix(&self, at: usize) -> Option<String> {
        let mut i = at;
        let mut prefix = String::new();
        if is_ident_start(self.at(i)) {
            let start = i;
            while is_ident_continue(self.at(i)) {
                i += 1;
            }
            let candidate = self.slice_to_string(start, i);
            if STRING_PREFIXES.contains(&candidate.as_str()) {
                prefix = candidate;
            } else {
                return None;
            }
        }
        let q = self.at(i);
        if q == '"' || (q == '\'' && !prefix.ends_with('R')) {
            Some(prefix)
        } else {
            None
        }
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia()?;
        let loc = self.cur_loc();

        if self.start_of_line && self.cur() == '#' {
            self.start_of_line = false;
            return Ok(self.lex_pp_line(loc));
        }
        self.start_of_line = false;

        match self.cur() {
            '\0' => Ok(Token {
                kind: TokenKind::Eof,
                spelling: String::new(),
                location: loc,
            }),
            '"' | '\'' => self.lex_string_or_char(loc),
            c if c.is_ascii_digit() || (c == '.' && self.at(self.idx + 1).is_ascii_digit()) => {
                self.lex_number(loc)
            }
            c if is_ident_start(c) => {
                if self.classify_literal_prefix(self.idx).is_some() {
                    self.lex_string_or_char(loc)
                } else {
                    self.lex_identifier(loc)
                }
            }
            _ => self.lex_punct(loc),
        }
    }

    fn lex_pp_line(&mut self, loc: Location) -> Token {
        let start = self.idx;
        while self.cur() != '\n' && self.cur() != '\0' {
            self.idx += 1;
        }
        Token {
            kind: TokenKind::PPLine,
            spelling: self.slice_to_string(start, self.idx),
            location: loc,
        }
    }

    fn lex_identifier(&mut self, loc: Location) -> Token {
        let start = self.idx;
        while is_ident_continue(self.cur()) {
            self.idx += 1;
        }
        let spelling = self.slice_to_string(start, self.idx);
        match Keyword::from_str(&spelling) {
            Some(kw) => Token {
                kind: TokenKind::Keyword(kw),
                spelling,
                location: loc,
            },
            None => Token {
                kind: TokenKind::Identifier,
                spelling,
                location: loc,
            },
        }
    }

    fn lex_number(&mut self, loc: Location) -> Result<Token, ParseError> {
        let start = self.idx;
        // hex/binary prefix
        if self.cur() == '0' && matches!(self.at(self.idx + 1), 'x' | 'X' | 'b' | 'B') {
            self.idx += 2;
        }
        loop {
            match self.cur() {
                c if c.is_ascii_alphanumeric() || c == '_' || c == '\'' => self.idx += 1,
                '.' => self.idx += 1,
                '+' | '-'
                    if matches!(self.at(self.idx - 1), 'e' | 'E' | 'p' | 'P') =>
                {
                    self.idx += 1
                }
                _ => break,
            }
        }
        Ok(Token {
            kind: TokenKind::NumberLit,
            spelling: self.slice_to_string(start, self.idx),
            location: loc,
        })
    }

    fn lex_string_or_char(&mut self, loc: Location) -> Result<Token, ParseError> {
        let (mut spelling, is_char) = self.lex_literal_piece()?;
        // C++ only concatenates adjacent *string* literals; a char literal
        // never joins with what follows it.
        if !is_char {
            loop {
                let next = self.skip_trivia_at(self.idx);
                let prefix = match self.classify_literal_prefix(next) {
                    Some(p) => p,
                    None => break,
                };
                if self.at(next + prefix.chars().count()) == '\'' {
                    // A char literal never joins with a preceding string.
                    break;
                }
                self.idx = next;
                let (piece, _) = self.lex_literal_piece()?;
                spelling.push(' ');
                spelling.push_str(&piece);
            }
        }
        Ok(Token {
            kind: if is_char { TokenKind::CharLit } else { TokenKind::StringLit },
            spelling,
            location: loc,
        })
    }

    /// Lex exactly one (possibly prefixed, possibly raw) string or char
    /// literal at the current position, including its user-defined-literal
    /// suffix, without checking for adjacent concatenation. Returns the
    /// spelling together with whether it was a char literal (delimited by
    /// `'`) rather than a string literal (delimited by `"`).
    fn lex_literal_piece(&mut self) -> Result<(String, bool), ParseError> {
        let loc = self.cur_loc();
        let mut spelling = String::new();
        if is_ident_start(self.cur()) {
            let start = self.idx;
            while is_ident_continue(self.cur()) {
                self.idx += 1;
            }
            spelling.push_str(&self.slice_to_string(start, self.idx));
        }

        let mut is_char = false;
        if spelling.ends_with('R') {
            self.lex_raw_string_body(&mut spelling, &loc)?;
        } else if self.cur() == '"' {
            spelling.push(self.bump());
            loop {
                match self.cur() {
                    '"' => {
                        spelling.push(self.bump());
                        break;
                    }
                    '\0' | '\n' => {
                        return Err(ParseError::LexicalError {
                            message: "unterminated string literal".into(),
                            location: loc,
                        })
                    }
                    '\\' => {
                        spelling.push(self.bump());
                        if self.cur() != '\0' {
                            spelling.push(self.bump());
                        }
                    }
                    _ => spelling.push(self.bump()),
                }
            }
        } else if self.cur() == '\'' {
            is_char = true;
            spelling.push(self.bump());
            loop {
                match self.cur() {
                    '\'' => {
                        spelling.push(self.bump());
                        break;
                    }
                    '\0' | '\n' => {
                        return Err(ParseError::LexicalError {
                            message: "unterminated character literal".into(),
                            location: loc,
                        })
                    }
                    '\\' => {
                        spelling.push(self.bump());
                        if self.cur() != '\0' {
                            spelling.push(self.bump());
                        }
                    }
                    _ => spelling.push(self.bump()),
                }
            }
        } else {
            return Err(ParseError::InternalInvariantBroken {
                message: "lex_literal_piece called without a literal at the cursor".into(),
                location: loc,
            });
        }

        while is_ident_continue(self.cur()) {
            spelling.push(self.bump());
        }
        Ok((spelling, is_char))
    }

    /// Raw string body: `"delim(...)delim"`. `spelling` already holds the
    /// prefix (ending in `R`); this appends the rest.
    fn lex_raw_string_body(&mut self, spelling: &mut String, loc: &Location) -> Result<(), ParseError> {
        spelling.push(self.bump()); // opening quote
        let delim_start = self.idx;
        while self.cur() != '(' && self.cur() != '\0' && self.cur() != '"' {
            self.idx += 1;
        }
        if self.cur() != '(' {
            return Err(ParseError::LexicalError {
                message: "malformed raw string delimiter".into(),
                location: loc.clone(),
            });
        }
        let delim: Vec<char> = self.buf[delim_start..self.idx].iter().map(|c| c.ch).collect();
        spelling.push_str(&self.slice_to_string(delim_start, self.idx));
        spelling.push(self.bump()); // '('

        let terminator: Vec<char> = std::iter::once(')')
            .chain(delim.iter().copied())
            .chain(std::iter::once('"'))
            .collect();
        loop {
            if self.cur() == '\0' {
                return Err(ParseError::LexicalError {
                    message: "unterminated raw string literal".into(),
                    location: loc.clone(),
                });
            }
            let matches_terminator = terminator
                .iter()
                .enumerate()
                .all(|(off, c)| self.at(self.idx + off) == *c);
            if matches_terminator {
                for _ in 0..terminator.len() {
                    spelling.push(self.bump());
                }
                break;
            }
            spelling.push(self.bump());
        }
        Ok(())
    }

    fn lex_punct(&mut self, loc: Location) -> Result<Token, ParseError> {
        let c0 = self.cur();
        let c1 = self.at(self.idx + 1);
        let c2 = self.at(self.idx + 2);

        macro_rules! tok {
            ($n:expr, $p:expr) => {{
                let spelling = self.slice_to_string(self.idx, self.idx + $n);
                self.idx += $n;
                return Ok(Token {
                    kind: TokenKind::Punct($p),
                    spelling,
                    location: loc,
                });
            }};
        }

        use Punct::*;
        match (c0, c1, c2) {
            ('.', '.', '.') => tok!(3, Ellipsis),
            ('<', '<', '=') => tok!(3, LtLtEq),
            ('>', '>', '=') => tok!(3, GtGtEq),
            ('<', '=', '>') => tok!(3, LtEqGt),
            ('%', ':', '%') if self.at(self.idx + 3) == ':' => tok!(4, HashHash),
            ('-', '>', '*') => tok!(3, ArrowStar),
            ('.', '*', _) => tok!(2, DotStar),
            ('-', '>', _) => tok!(2, Arrow),
            ('+', '+', _) => tok!(2, PlusPlus),
            ('-', '-', _) => tok!(2, MinusMinus),
            (':', ':', _) => tok!(2, ColonColon),
            ('&', '&', _) => tok!(2, AmpAmp),
            ('|', '|', _) => tok!(2, PipePipe),
            ('<', '<', _) => tok!(2, LtLt),
            ('>', '>', _) => tok!(2, GtGt),
            ('<', '=', _) => tok!(2, LtEq),
            ('>', '=', _) => tok!(2, GtEq),
            ('=', '=', _) => tok!(2, EqEq),
            ('!', '=', _) => tok!(2, NotEq),
            ('+', '=', _) => tok!(2, PlusEq),
            ('-', '=', _) => tok!(2, MinusEq),
            ('*', '=', _) => tok!(2, StarEq),
            ('/', '=', _) => tok!(2, SlashEq),
            ('%', '=', _) => tok!(2, PercentEq),
            ('&', '=', _) => tok!(2, AmpEq),
            ('|', '=', _) => tok!(2, PipeEq),
            ('^', '=', _) => tok!(2, CaretEq),
            ('#', '#', _) => tok!(2, HashHash),
            ('<', ':', _) => tok!(2, LBracket),
            (':', '>', _) => tok!(2, RBracket),
            ('<', '%', _) => tok!(2, LBrace),
            ('%', '>', _) => tok!(2, RBrace),
            ('%', ':', _) => tok!(2, Hash),
            ('{', _, _) => tok!(1, LBrace),
            ('}', _, _) => tok!(1, RBrace),
            ('(', _, _) => tok!(1, LParen),
            (')', _, _) => tok!(1, RParen),
            ('[', _, _) => tok!(1, LBracket),
            (']', _, _) => tok!(1, RBracket),
            (';', _, _) => tok!(1, Semi),
            (':', _, _) => tok!(1, Colon),
            (',', _, _) => tok!(1, Comma),
            ('.', _, _) => tok!(1, Dot),
            ('~', _, _) => tok!(1, Tilde),
            ('?', _, _) => tok!(1, Question),
            ('&', _, _) => tok!(1, Amp),
            ('|', _, _) => tok!(1, Pipe),
            ('^', _, _) => tok!(1, Caret),
            ('*', _, _) => tok!(1, Star),
            ('/', _, _) => tok!(1, Slash),
            ('%', _, _) => tok!(1, Percent),
            ('+', _, _) => tok!(1, Plus),
            ('-', _, _) => tok!(1, Minus),
            ('=', _, _) => tok!(1, Eq),
            ('!', _, _) => tok!(1, Not),
            ('<', _, _) => tok!(1, Lt),
            ('>', _, _) => tok!(1, Gt),
            ('@', _, _) => tok!(1, At),
            ('#', _, _) => tok!(1, Hash),
            _ => Err(ParseError::LexicalError {
                message: format!("invalid character '{c0}'"),
                location: loc,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(src: &str) -> Vec<Token> {
        let mut lexer = Lexer::new("t.h", src, true);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().expect("lex error");
            let eof = tok.is_eof();
            out.push(tok);
            if eof {
                break;
            }
        }
        out
    }

    #[test]
    fn spelling_round_trips_for_simple_tokens() {
        let toks = lex_all("int x = 3;");
        let spellings: Vec<_> = toks.iter().map(|t| t.spelling.as_str()).collect();
        assert_eq!(spellings, ["int", "x", "=", "3", ";", ""]);
    }

    #[test]
    fn splits_right_shift_only_lexically_as_one_token() {
        // The lexer always produces a single `>>`; splitting into two `>`
        // for nested template-argument lists is the parser's job (spec
        // §4.2), not the lexer's.
        let toks = lex_all("a >> b;");
        assert!(toks[1].is_punct(Punct::GtGt));
    }

    #[test]
    fn raw_string_literal_preserves_body_verbatim() {
        let toks = lex_all(r##"R"(a)b)""##);
        assert_eq!(toks[0].spelling, r##"R"(a)b)""##);
    }

    #[test]
    fn adjacent_string_literals_concatenate() {
        let toks = lex_all(r#""a" "b""#);
        assert_eq!(toks[0].kind, TokenKind::StringLit);
        assert_eq!(toks[0].spelling, "\"a\" \"b\"");
    }

    #[test]
    fn char_literal_tagged_distinctly_from_string_literal() {
        let toks = lex_all("'x';");
        assert_eq!(toks[0].kind, TokenKind::CharLit);
        assert_eq!(toks[0].spelling, "'x'");
    }

    #[test]
    fn char_literal_does_not_join_following_string_literal() {
        let toks = lex_all(r#"'a' "b""#);
        assert_eq!(toks[0].kind, TokenKind::CharLit);
        assert_eq!(toks[0].spelling, "'a'");
        assert_eq!(toks[1].kind, TokenKind::StringLit);
        assert_eq!(toks[1].spelling, "\"b\"");
    }

    #[test]
    fn user_defined_literal_suffix_preserved() {
        let toks = lex_all("1.5_km;");
        assert_eq!(toks[0].spelling, "1.5_km");
    }

    #[test]
    fn digit_separators_preserved() {
        let toks = lex_all("1'000'000;");
        assert_eq!(toks[0].spelling, "1'000'000");
    }

    #[test]
    fn preprocessor_line_captured_whole() {
        let toks = lex_all("#include <vector>\nint x;");
        assert_eq!(toks[0].kind, TokenKind::PPLine);
        assert_eq!(toks[0].spelling, "#include <vector>");
    }

    #[test]
    fn doxygen_comment_is_retained() {
        let mut lexer = Lexer::new("t.h", "/// does a thing\nvoid f();", true);
        let _ = lexer.next_token().unwrap();
        let docs = lexer.take_pending_docs();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "/// does a thing");
    }

    #[test]
    fn plain_comment_is_not_retained_as_doc() {
        let mut lexer = Lexer::new("t.h", "// just a comment\nvoid f();", true);
        let _ = lexer.next_token().unwrap();
        assert!(lexer.take_pending_docs().is_empty());
    }

    #[test]
    fn digraphs_normalize_to_canonical_punct() {
        let toks = lex_all("vector<:0:>");
        assert!(toks[1].is_punct(Punct::LBracket));
        assert!(toks[3].is_punct(Punct::RBracket));
    }

    #[test]
    fn checkpoint_restores_position() {
        let mut lexer = Lexer::new("t.h", "a b c;", true);
        let _ = lexer.next_token().unwrap();
        let cp = lexer.checkpoint();
        let _ = lexer.next_token().unwrap();
        lexer.restore(cp);
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.spelling, "b");
    }
}
