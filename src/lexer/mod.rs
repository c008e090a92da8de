use std::borrow::Cow;
use std::fmt;

use miette::Result;

use crate::error;
use crate::lexer::cursor::Cursor;
use crate::span::{Idx, Span};

pub mod cursor;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TokenKind {
    /// Mnemonics, registers, labels and base selectors
    Ident,
    /// Numeric literal, already converted
    Num(i64),
    /// String literal with escapes resolved, quotes removed
    Str(String),
    Colon,
    Newline,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Ident => "identifier",
            TokenKind::Num(_) => "numeric literal",
            TokenKind::Str(_) => "string literal",
            TokenKind::Colon => "colon",
            TokenKind::Newline => "newline",
            TokenKind::Eof => "end of file",
        };
        f.write_str(name)
    }
}

/// Test if a character is considered to be whitespace.
pub(crate) fn is_whitespace(c: char) -> bool {
    // Commas are only separators, same as spaces
    matches!(c, ' ' | '\t' | '\r' | ',')
}

/// Test if a character can start an identifier.
pub(crate) fn is_id_start(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_' | '.')
}

/// Test if a character can continue an identifier.
pub(crate) fn is_id(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '.')
}

/// Turn source text into a token stream ending with exactly one [`TokenKind::Eof`].
///
/// Whitespace and comments are dropped here; newlines are kept since they end commands.
pub fn tokenize(src: &str) -> Result<Vec<Token>> {
    let mut cursor = Cursor::new(src);
    let mut toks = Vec::new();
    loop {
        let tok = cursor.advance_token(src)?;
        match tok {
            Some(tok) if tok.kind == TokenKind::Eof => {
                toks.push(tok);
                break;
            }
            Some(tok) => toks.push(tok),
            None => continue,
        }
    }
    Ok(toks)
}

impl Cursor<'_> {
    /// Lex one token. Returns `None` for whitespace and comments.
    pub fn advance_token(&mut self, src: &str) -> Result<Option<Token>> {
        let first_char = match self.bump() {
            Some(c) => c,
            None => {
                return Ok(Some(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(Idx(src.len() as u32), 0),
                }))
            }
        };
        let kind = match first_char {
            ';' => {
                self.take_while(|c| c != '\n');
                None
            }
            '\n' => Some(TokenKind::Newline),
            c if is_whitespace(c) => {
                self.take_while(is_whitespace);
                None
            }
            ':' => Some(TokenKind::Colon),
            '"' => Some(self.string_literal(src)?),
            '-' if self.first().is_ascii_digit() => Some(self.number(src)?),
            c if c.is_ascii_digit() => Some(self.number(src)?),
            c if is_id_start(c) => {
                self.take_while(is_id);
                Some(TokenKind::Ident)
            }
            _ => return Err(error::lex_unknown(self.span(), src)),
        };
        let tok = kind.map(|kind| Token {
            kind,
            span: self.span(),
        });
        self.reset_pos();
        Ok(tok)
    }

    fn span(&self) -> Span {
        Span::new(Idx(self.token_start() as u32), self.pos_in_token())
    }

    fn number(&mut self, src: &str) -> Result<TokenKind> {
        self.take_while(is_id);
        let text = self.token_str();
        let parsed = if let Some(hex) = text.strip_prefix("0x") {
            u64::from_str_radix(hex, 16).map(|val| val as i64)
        } else if let Some(bin) = text.strip_prefix("0b") {
            u64::from_str_radix(bin, 2).map(|val| val as i64)
        } else {
            text.parse::<i64>()
        };
        match parsed {
            Ok(val) => Ok(TokenKind::Num(val)),
            Err(e) => Err(error::lex_invalid_lit(self.span(), src, e)),
        }
    }

    fn string_literal(&mut self, src: &str) -> Result<TokenKind> {
        loop {
            match self.first() {
                '"' => {
                    self.bump();
                    break;
                }
                '\\' => {
                    self.bump();
                    if self.first() != '\n' {
                        self.bump();
                    }
                }
                '\n' => return Err(error::lex_unclosed_str(self.span(), src)),
                _ if self.is_eof() => return Err(error::lex_unclosed_str(self.span(), src)),
                _ => {
                    self.bump();
                }
            }
        }
        let raw = self.token_str();
        Ok(TokenKind::Str(unescape(&raw[1..raw.len() - 1]).into_owned()))
    }
}

fn unescape(s: &str) -> Cow<str> {
    if !s.contains('\\') {
        return Cow::Borrowed(s);
    }
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some(c) => {
                result.push('\\');
                result.push(c);
            }
            // Trailing backslash; include it as is
            None => result.push('\\'),
        }
    }
    Cow::Owned(result)
}
