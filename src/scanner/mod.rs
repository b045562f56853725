/*
 * Copyright Cedar Contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Converts Cedar schema source text into a sequence of [`Token`]s, per
//! spec.md §4.1. One [`Scanner`] consumes the whole input eagerly into a
//! `Vec<Token>`, since schema documents are small and the downstream parser
//! wants random lookahead.

pub mod err;

use crate::parser::{Loc, MaybeLoc, Position};
use err::ScanError;
use smol_str::SmolStr;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Str,
    /// One of the fixed operators in spec.md §4.1: `@ . , ; ( ) { } [ ] < > = ? :` or `::`.
    Op,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: SmolStr,
    pub loc: MaybeLoc,
}

impl Token {
    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Op && self.text == op
    }

    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == text
    }
}

pub struct Scanner<'a> {
    filename: Option<Arc<str>>,
    chars: Vec<(usize, char)>,
    src: &'a str,
    idx: usize,
    line: usize,
    column: usize,
}

const SINGLE_CHAR_OPS: &[char] = &['@', '.', ',', ';', '(', ')', '{', '}', '[', ']', '<', '>', '=', '?', ':'];

impl<'a> Scanner<'a> {
    /// Validate the input is UTF-8 and free of embedded NULs, then build a
    /// scanner over it. `filename` decorates every position this scanner
    /// produces.
    pub fn new(bytes: &'a [u8], filename: Option<Arc<str>>) -> Result<Self, ScanError> {
        let src = std::str::from_utf8(bytes).map_err(|_| ScanError::InvalidUtf8 {
            loc: err::loc_at(filename.clone(), Position::start(), 0),
        })?;
        if let Some(off) = src.find('\0') {
            let pos = position_at(src, off);
            return Err(ScanError::EmbeddedNul {
                loc: err::loc_at(filename, pos, off),
            });
        }
        Ok(Self {
            filename,
            chars: src.char_indices().collect(),
            src,
            idx: 0,
            line: 1,
            column: 1,
        })
    }

    /// Tokenize the whole input, returning tokens terminated by one `Eof`
    /// token, or the first scan error encountered.
    pub fn tokenize(mut self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let (start_off, start_pos) = self.pos();
            let Some((_, c)) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: SmolStr::new_static(""),
                    loc: self.loc_at(start_pos, start_off),
                });
                break;
            };
            if c == '"' {
                let text = self.scan_string()?;
                tokens.push(Token {
                    kind: TokenKind::Str,
                    text,
                    loc: self.loc_at(start_pos, start_off),
                });
            } else if c.is_ascii_alphabetic() || c == '_' {
                let text = self.scan_ident();
                tokens.push(Token {
                    kind: TokenKind::Ident,
                    text,
                    loc: self.loc_at(start_pos, start_off),
                });
            } else if c == ':' {
                self.advance();
                let text = if self.peek().map(|(_, c)| c) == Some(':') {
                    self.advance();
                    "::"
                } else {
                    ":"
                };
                tokens.push(Token {
                    kind: TokenKind::Op,
                    text: SmolStr::new(text),
                    loc: self.loc_at(start_pos, start_off),
                });
            } else if SINGLE_CHAR_OPS.contains(&c) {
                self.advance();
                tokens.push(Token {
                    kind: TokenKind::Op,
                    text: SmolStr::new(c.to_string()),
                    loc: self.loc_at(start_pos, start_off),
                });
            } else {
                return Err(ScanError::InvalidChar {
                    ch: c,
                    loc: self.loc_at(start_pos, start_off),
                });
            }
        }
        Ok(tokens)
    }

    fn loc_at(&self, pos: Position, off: usize) -> MaybeLoc {
        Some(Arc::new(Loc::new(self.filename.clone(), pos, off)))
    }

    fn pos(&self) -> (usize, Position) {
        let off = self.chars.get(self.idx).map(|(o, _)| *o).unwrap_or(self.src.len());
        (off, Position { line: self.line, column: self.column })
    }

    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.idx).copied()
    }

    fn peek2(&self) -> Option<(usize, char)> {
        self.chars.get(self.idx + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let (_, c) = self.chars.get(self.idx).copied()?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) -> Result<(), ScanError> {
        loop {
            match self.peek().map(|(_, c)| c) {
                Some(c) if c.is_whitespace() && "\t\n\r ".contains(c) => {
                    self.advance();
                }
                Some('/') if self.peek2().map(|(_, c)| c) == Some('/') => {
                    while let Some((_, c)) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek2().map(|(_, c)| c) == Some('*') => {
                    let (start_off, start_pos) = self.pos();
                    self.advance();
                    self.advance();
                    let mut closed = false;
                    while let Some((_, c)) = self.peek() {
                        if c == '*' && self.peek2().map(|(_, c)| c) == Some('/') {
                            self.advance();
                            self.advance();
                            closed = true;
                            break;
                        }
                        self.advance();
                    }
                    if !closed {
                        return Err(ScanError::UnterminatedBlockComment {
                            loc: self.loc_at(start_pos, start_off),
                        });
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn scan_ident(&mut self) -> SmolStr {
        let (start_off, _) = self.pos();
        while let Some((_, c)) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let (end_off, _) = self.pos();
        SmolStr::new(&self.src[start_off..end_off])
    }

    fn scan_string(&mut self) -> Result<SmolStr, ScanError> {
        let (open_off, open_pos) = self.pos();
        self.advance(); // opening quote
        let mut out = String::new();
        loop {
            let Some((off, c)) = self.peek() else {
                return Err(ScanError::UnterminatedString {
                    loc: self.loc_at(open_pos, open_off),
                });
            };
            match c {
                '"' => {
                    self.advance();
                    break;
                }
                '\n' => {
                    return Err(ScanError::UnterminatedString {
                        loc: self.loc_at(open_pos, open_off),
                    });
                }
                '\\' => {
                    let (esc_off, esc_pos) = self.pos();
                    self.advance();
                    let Some((_, esc)) = self.peek() else {
                        return Err(ScanError::UnterminatedString {
                            loc: self.loc_at(open_pos, open_off),
                        });
                    };
                    match esc {
                        'n' => {
                            out.push('\n');
                            self.advance();
                        }
                        'r' => {
                            out.push('\r');
                            self.advance();
                        }
                        't' => {
                            out.push('\t');
                            self.advance();
                        }
                        '\\' => {
                            out.push('\\');
                            self.advance();
                        }
                        '\'' => {
                            out.push('\'');
                            self.advance();
                        }
                        '"' => {
                            out.push('"');
                            self.advance();
                        }
                        '0' => {
                            out.push('\0');
                            self.advance();
                        }
                        'x' => {
                            self.advance();
                            let mut hex = String::new();
                            for _ in 0..2 {
                                match self.peek() {
                                    Some((_, h)) if h.is_ascii_hexdigit() => {
                                        hex.push(h);
                                        self.advance();
                                    }
                                    _ => {
                                        return Err(ScanError::InvalidHexEscape {
                                            loc: self.loc_at(esc_pos, esc_off),
                                        });
                                    }
                                }
                            }
                            let byte = u8::from_str_radix(&hex, 16)
                                .map_err(|_| ScanError::InvalidHexEscape { loc: self.loc_at(esc_pos, esc_off) })?;
                            // A `\xNN` escape denotes one raw byte; push it as
                            // a `char` via its Latin-1 codepoint so the
                            // resulting `String` stays valid UTF-8 even for
                            // bytes above 0x7F (unlike Rust's own `\x` escape,
                            // which rejects those in `str` literals).
                            out.push(byte as char);
                        }
                        other => {
                            return Err(ScanError::InvalidEscape {
                                ch: other,
                                loc: self.loc_at(esc_pos, esc_off),
                            });
                        }
                    }
                }
                _ => {
                    out.push(c);
                    self.advance();
                    let _ = off;
                }
            }
        }
        Ok(SmolStr::new(&out))
    }
}

fn position_at(src: &str, byte_off: usize) -> Position {
    let mut line = 1;
    let mut column = 1;
    for (off, c) in src.char_indices() {
        if off >= byte_off {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    Position { line, column }
}

#[cfg(test)]
mod test {
    use super::*;

    fn toks(src: &str) -> Vec<Token> {
        Scanner::new(src.as_bytes(), None).unwrap().tokenize().unwrap()
    }

    #[test]
    fn scans_entity_decl() {
        let ts = toks("entity User;");
        let kinds: Vec<_> = ts.iter().map(|t| (t.kind.clone(), t.text.clone())).collect();
        assert_eq!(
            kinds,
            vec![
                (TokenKind::Ident, "entity".into()),
                (TokenKind::Ident, "User".into()),
                (TokenKind::Op, ";".into()),
                (TokenKind::Eof, "".into()),
            ]
        );
    }

    #[test]
    fn scans_double_colon() {
        let ts = toks("Foo::Bar");
        assert!(ts.iter().any(|t| t.is_op("::")));
        assert!(!ts.iter().any(|t| t.text == ":" && t.kind == TokenKind::Op));
    }

    #[test]
    fn lone_colon_is_its_own_op() {
        let ts = toks("principal :");
        assert!(ts.iter().any(|t| t.is_op(":")));
    }

    #[test]
    fn string_escapes() {
        let ts = toks(r#""a\nb\t\x41""#);
        assert_eq!(ts[0].text, "a\nb\tA");
    }

    #[test]
    fn unterminated_string_errors() {
        let res = Scanner::new(b"\"abc", None).unwrap().tokenize();
        assert!(matches!(res, Err(ScanError::UnterminatedString { .. })));
    }

    #[test]
    fn newline_in_string_errors() {
        let res = Scanner::new(b"\"abc\ndef\"", None).unwrap().tokenize();
        assert!(matches!(res, Err(ScanError::UnterminatedString { .. })));
    }

    #[test]
    fn unterminated_block_comment_errors() {
        let res = Scanner::new(b"/* abc", None).unwrap().tokenize();
        assert!(matches!(res, Err(ScanError::UnterminatedBlockComment { .. })));
    }

    #[test]
    fn embedded_nul_errors() {
        let res = Scanner::new(b"entity\0User;", None);
        assert!(matches!(res, Err(ScanError::EmbeddedNul { .. })));
    }

    #[test]
    fn line_comment_to_eol() {
        let ts = toks("entity User; // comment\nentity Group;");
        assert_eq!(ts.iter().filter(|t| t.is_ident("entity")).count(), 2);
    }

    #[test]
    fn invalid_char_errors() {
        let res = Scanner::new("entity User % ;".as_bytes(), None).unwrap().tokenize();
        assert!(matches!(res, Err(ScanError::InvalidChar { ch: '%', .. })));
    }
}
