//! Source Reader: normalizes raw header text into a flat buffer of
//! characters with locations, ready for the [`super::Lexer`] to scan.
//!
//! Three things happen here, once, up front, rather than being
//! re-derived by the lexer on every character:
//! - CRLF/CR line endings are normalized to `\n`.
//! - Line continuations (`\` immediately followed by a newline) are
//!   spliced away — the backslash and newline vanish and the following
//!   physical line becomes part of the current logical line.
//! - A sentinel NUL character is appended so the lexer never needs to
//!   bounds-check its own cursor.

use crate::location::Location;
use std::rc::Rc;

/// A single normalized source character and the location it came from.
#[derive(Debug, Clone, Copy)]
pub struct NormChar {
    pub ch: char,
    pub location: Location,
}

/// Normalize `src` (from file `filename`) into a flat, splice-free buffer.
pub fn normalize(filename: Rc<str>, src: &str) -> Vec<NormChar> {
    let mut out = Vec::with_capacity(src.len() + 1);
    let mut chars = src.chars().peekable();
    let mut line: u32 = 1;
    let mut column: u32 = 1;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let mut lookahead = chars.clone();
                let had_cr = lookahead.peek() == Some(&'\r');
                if had_cr {
                    lookahead.next();
                }
                if lookahead.peek() == Some(&'\n') {
                    if had_cr {
                        chars.next();
                    }
                    chars.next();
                    line += 1;
                    column = 1;
                    continue;
                }
                out.push(NormChar {
                    ch: '\\',
                    location: Location::new(filename.clone(), line, column),
                });
                column += 1;
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push(NormChar {
                    ch: '\n',
                    location: Location::new(filename.clone(), line, column),
                });
                line += 1;
                column = 1;
            }
            '\n' => {
                out.push(NormChar {
                    ch: '\n',
                    location: Location::new(filename.clone(), line, column),
                });
                line += 1;
                column = 1;
            }
            other => {
                out.push(NormChar {
                    ch: other,
                    location: Location::new(filename.clone(), line, column),
                });
                column += 1;
            }
        }
    }

    out.push(NormChar {
        ch: '\0',
        location: Location::new(filename, line, column),
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spelling(chars: &[NormChar]) -> String {
        chars.iter().map(|c| c.ch).collect()
    }

    #[test]
    fn strips_line_continuation() {
        let buf = normalize(Rc::from("t.h"), "int x\\\n = 3;");
        assert_eq!(spelling(&buf), "int x = 3;\0");
    }

    #[test]
    fn normalizes_crlf() {
        let buf = normalize(Rc::from("t.h"), "a;\r\nb;\r\n");
        assert_eq!(spelling(&buf), "a;\nb;\n\0");
        // `b` starts on line 2
        let b_idx = buf.iter().position(|c| c.ch == 'b').unwrap();
        assert_eq!(buf[b_idx].location.line, 2);
    }

    #[test]
    fn continuation_keeps_single_logical_line() {
        let buf = normalize(Rc::from("t.h"), "#define X \\\n  1\n");
        // after splicing, '1' is still reachable without an intervening '\n'
        let hash_idx = buf.iter().position(|c| c.ch == '#').unwrap();
        let newline_after = buf[hash_idx..].iter().position(|c| c.ch == '\n').unwrap();
        let one_idx = buf.iter().position(|c| c.ch == '1').unwrap();
        assert!(one_idx < hash_idx + newline_after);
    }
}
