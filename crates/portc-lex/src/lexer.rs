//! Lexical analyzer: UTF-8 source text to a stream of `Lexeme`s.

use crate::cursor::Cursor;
use crate::token::{LexValue, Lexeme, TokenKind};
use portc_util::{Diagnostic, DiagnosticCode, Position, Range};

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

/// Scans a source file into lexemes on demand.
///
/// Supports one token of lookahead: `peek` followed by `next` returns the
/// same lexeme without re-scanning.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    file: String,
    peeked: Option<Result<Lexeme, Diagnostic>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: impl Into<String>) -> Self {
        Self { cursor: Cursor::new(source), file: file.into(), peeked: None }
    }

    /// Consume and return the next lexeme.
    pub fn next(&mut self) -> Result<Lexeme, Diagnostic> {
        if let Some(tok) = self.peeked.take() {
            return tok;
        }
        self.scan()
    }

    /// Return the next lexeme without consuming it.
    pub fn peek(&mut self) -> Result<Lexeme, Diagnostic> {
        if self.peeked.is_none() {
            self.peeked = Some(self.scan());
        }
        self.peeked.clone().unwrap()
    }

    fn err(&self, message: impl Into<String>, begin: Position, end: Position) -> Diagnostic {
        Diagnostic::at(DiagnosticCode::InvalidSymbol, message, self.file.clone(), Range::new(begin, end))
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.peek() {
                Some(' ') | Some('\t') | Some('\n') | Some('\r') => {
                    self.cursor.bump();
                }
                Some('#') => {
                    while !matches!(self.cursor.peek(), None | Some('\n')) {
                        self.cursor.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn scan(&mut self) -> Result<Lexeme, Diagnostic> {
        self.skip_trivia();
        let start_pos = self.cursor.position();

        let Some(c) = self.cursor.peek() else {
            return Ok(Lexeme::new("", TokenKind::Eof, Range::point(start_pos)));
        };

        if is_ident_start(c) {
            return Ok(self.scan_ident());
        }
        if c.is_ascii_digit() {
            return self.scan_number();
        }
        if c == '\'' {
            return self.scan_char();
        }
        if c == '"' {
            return self.scan_string();
        }
        self.scan_operator()
    }

    fn scan_ident(&mut self) -> Lexeme {
        let start_byte = self.cursor.byte_pos();
        let start_pos = self.cursor.position();
        while matches!(self.cursor.peek(), Some(c) if is_ident_continue(c)) {
            self.cursor.bump();
        }
        let text = self.cursor.slice_from(start_byte);
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Ident);
        Lexeme::new(text, kind, Range::new(start_pos, self.cursor.position()))
    }

    fn scan_number(&mut self) -> Result<Lexeme, Diagnostic> {
        let start_byte = self.cursor.byte_pos();
        let start_pos = self.cursor.position();
        let first = self.cursor.bump().expect("caller checked a digit is present");

        if first == '0' && matches!(self.cursor.peek(), Some('x')) {
            self.cursor.bump();
            while matches!(self.cursor.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.cursor.bump();
            }
            let text = self.cursor.slice_from(start_byte);
            let end = self.cursor.position();
            let value = i64::from_str_radix(&text[2..], 16)
                .map_err(|_| self.err("invalid hexadecimal literal", start_pos, end))?;
            return Ok(Lexeme::new(text, TokenKind::IntLit, Range::new(start_pos, end)).with_value(LexValue::Int(value)));
        }
        if first == '0' && matches!(self.cursor.peek(), Some('b')) {
            self.cursor.bump();
            while matches!(self.cursor.peek(), Some('0') | Some('1')) {
                self.cursor.bump();
            }
            let text = self.cursor.slice_from(start_byte);
            let end = self.cursor.position();
            let value = i64::from_str_radix(&text[2..], 2)
                .map_err(|_| self.err("invalid binary literal", start_pos, end))?;
            return Ok(Lexeme::new(text, TokenKind::IntLit, Range::new(start_pos, end)).with_value(LexValue::Int(value)));
        }

        while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
            self.cursor.bump();
        }

        let mut is_real = false;
        if self.cursor.peek() == Some('.') {
            is_real = true;
            self.cursor.bump();
            while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                self.cursor.bump();
            }
            if self.cursor.peek() == Some('e') {
                self.cursor.bump();
                while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                    self.cursor.bump();
                }
            }
        }

        let text = self.cursor.slice_from(start_byte);
        let end = self.cursor.position();
        let range = Range::new(start_pos, end);
        if is_real {
            let value = text
                .parse::<f64>()
                .map_err(|_| self.err(format!("invalid real literal '{text}'"), start_pos, end))?;
            Ok(Lexeme::new(text, TokenKind::RealLit, range).with_value(LexValue::Real(value)))
        } else {
            let value = text
                .parse::<i64>()
                .map_err(|_| self.err(format!("invalid integer literal '{text}'"), start_pos, end))?;
            Ok(Lexeme::new(text, TokenKind::IntLit, range).with_value(LexValue::Int(value)))
        }
    }

    fn escape(&self, c: char, begin: Position, end: Position) -> Result<char, Diagnostic> {
        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '\'' => '\'',
            '"' => '"',
            '\\' => '\\',
            other => return Err(self.err(format!("unknown escape '\\{other}'"), begin, end)),
        })
    }

    fn scan_char(&mut self) -> Result<Lexeme, Diagnostic> {
        let start_byte = self.cursor.byte_pos();
        let start_pos = self.cursor.position();
        self.cursor.bump();

        let value = match self.cursor.peek() {
            Some('\\') => {
                let esc_begin = self.cursor.position();
                self.cursor.bump();
                let Some(body) = self.cursor.bump() else {
                    return Err(self.err("unterminated character literal", start_pos, self.cursor.position()));
                };
                self.escape(body, esc_begin, self.cursor.position())? as i64
            }
            Some('\'') => {
                return Err(self.err("empty character literal", start_pos, self.cursor.position()));
            }
            Some(body) => {
                self.cursor.bump();
                body as i64
            }
            None => return Err(self.err("unterminated character literal", start_pos, self.cursor.position())),
        };

        if self.cursor.peek() != Some('\'') {
            return Err(self.err("character literal must contain exactly one character", start_pos, self.cursor.position()));
        }
        self.cursor.bump();

        let text = self.cursor.slice_from(start_byte);
        let range = Range::new(start_pos, self.cursor.position());
        Ok(Lexeme::new(text, TokenKind::CharLit, range).with_value(LexValue::Int(value)))
    }

    fn scan_string(&mut self) -> Result<Lexeme, Diagnostic> {
        let start_byte = self.cursor.byte_pos();
        let start_pos = self.cursor.position();
        self.cursor.bump();

        loop {
            match self.cursor.peek() {
                None => return Err(self.err("unterminated string literal", start_pos, self.cursor.position())),
                Some('"') => {
                    self.cursor.bump();
                    break;
                }
                Some('\\') => {
                    let esc_begin = self.cursor.position();
                    self.cursor.bump();
                    let Some(body) = self.cursor.bump() else {
                        return Err(self.err("unterminated string literal", start_pos, self.cursor.position()));
                    };
                    self.escape(body, esc_begin, self.cursor.position())?;
                }
                Some(_) => {
                    self.cursor.bump();
                }
            }
        }

        let text = self.cursor.slice_from(start_byte);
        let range = Range::new(start_pos, self.cursor.position());
        Ok(Lexeme::new(text, TokenKind::StringLit, range))
    }

    fn scan_operator(&mut self) -> Result<Lexeme, Diagnostic> {
        use TokenKind::*;
        let start_byte = self.cursor.byte_pos();
        let start_pos = self.cursor.position();
        let c = self.cursor.bump().expect("caller checked a character is present");

        let kind = match c {
            '+' => Plus,
            '-' => Minus,
            '*' => Star,
            '/' => Slash,
            '%' => Percent,
            '(' => LParen,
            ')' => RParen,
            '{' => LBrace,
            '}' => RBrace,
            ',' => Comma,
            ';' => Semi,
            '=' => {
                if self.cursor.peek() == Some('=') {
                    self.cursor.bump();
                    EqEq
                } else {
                    Eq
                }
            }
            '<' => {
                if self.cursor.peek() == Some('=') {
                    self.cursor.bump();
                    LtEq
                } else {
                    Lt
                }
            }
            '>' => {
                if self.cursor.peek() == Some('=') {
                    self.cursor.bump();
                    GtEq
                } else {
                    Gt
                }
            }
            '!' => {
                if self.cursor.peek() == Some('=') {
                    self.cursor.bump();
                    BangEq
                } else {
                    return Err(self.err("'!' is not a valid operator on its own", start_pos, self.cursor.position()));
                }
            }
            other => {
                return Err(self.err(format!("unexpected character '{other}'"), start_pos, self.cursor.position()));
            }
        };

        let text = self.cursor.slice_from(start_byte);
        Ok(Lexeme::new(text, kind, Range::new(start_pos, self.cursor.position())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> Vec<Lexeme> {
        let mut lexer = Lexer::new(source, "t.por");
        let mut out = Vec::new();
        loop {
            let tok = lexer.next().expect("lexing should succeed");
            let done = tok.kind == TokenKind::Eof;
            out.push(tok);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn keywords_are_not_identifiers() {
        let toks = lex_all("se senao entrada");
        assert_eq!(toks[0].kind, TokenKind::Se);
        assert_eq!(toks[1].kind, TokenKind::Senao);
        assert_eq!(toks[2].kind, TokenKind::Ident);
    }

    #[test]
    fn comment_is_skipped_to_end_of_line() {
        let toks = lex_all("x # comment here\ny");
        assert_eq!(toks[0].text, "x");
        assert_eq!(toks[1].text, "y");
    }

    #[test]
    fn decimal_integer_decodes() {
        let toks = lex_all("42");
        assert_eq!(toks[0].kind, TokenKind::IntLit);
        assert_eq!(toks[0].value, Some(LexValue::Int(42)));
    }

    #[test]
    fn hex_and_binary_integers_decode() {
        let toks = lex_all("0xFF 0b1010");
        assert_eq!(toks[0].value, Some(LexValue::Int(255)));
        assert_eq!(toks[1].value, Some(LexValue::Int(10)));
    }

    #[test]
    fn real_literal_with_exponent_decodes() {
        let toks = lex_all("2.5e3");
        assert_eq!(toks[0].kind, TokenKind::RealLit);
        assert_eq!(toks[0].value, Some(LexValue::Real(2500.0)));
    }

    #[test]
    fn char_literal_decodes_escape() {
        let toks = lex_all(r"'\n'");
        assert_eq!(toks[0].kind, TokenKind::CharLit);
        assert_eq!(toks[0].value, Some(LexValue::Int(10)));
    }

    #[test]
    fn multi_character_body_is_a_lexical_error() {
        let mut lexer = Lexer::new("'ab'", "t.por");
        assert!(lexer.next().is_err());
    }

    #[test]
    fn string_literal_preserves_raw_quoted_text() {
        let toks = lex_all(r#""ola \n mundo""#);
        assert_eq!(toks[0].kind, TokenKind::StringLit);
        assert_eq!(toks[0].text, r#""ola \n mundo""#);
        assert_eq!(toks[0].value, None);
    }

    #[test]
    fn bare_bang_is_a_lexical_error() {
        let mut lexer = Lexer::new("!", "t.por");
        assert!(lexer.next().is_err());
    }

    #[test]
    fn two_char_operators_fall_back_to_one_char() {
        let toks = lex_all("< <= > >= = ==");
        assert_eq!(
            toks.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Eq,
                TokenKind::EqEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn peek_then_next_returns_same_lexeme() {
        let mut lexer = Lexer::new("abc", "t.por");
        let peeked = lexer.peek().unwrap();
        let next = lexer.next().unwrap();
        assert_eq!(peeked, next);
    }

    #[test]
    fn empty_source_yields_only_eof() {
        let toks = lex_all("");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::Eof);
    }
}
