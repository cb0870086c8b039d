//! Lexeme and token kind definitions.

use portc_util::Range;

/// One of the reserved words, operators, literal categories, or structural
/// punctuators the lexer can produce, plus `Eof`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    IntLit,
    RealLit,
    CharLit,
    StringLit,
    Ident,

    Para,
    Enquanto,
    Se,
    Senao,
    Real,
    Inteiro,
    Caractere,
    Imprima,
    Leia,
    Ou,
    E,
    Nao,
    Retorne,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Eq,
    EqEq,
    BangEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    Eof,
}

impl TokenKind {
    /// The keyword this identifier text names, if any.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        use TokenKind::*;
        Some(match ident {
            "para" => Para,
            "enquanto" => Enquanto,
            "se" => Se,
            "senao" => Senao,
            "real" => Real,
            "inteiro" => Inteiro,
            "caractere" => Caractere,
            "imprima" => Imprima,
            "leia" => Leia,
            "ou" => Ou,
            "e" => E,
            "nao" => Nao,
            "retorne" => Retorne,
            _ => return None,
        })
    }
}

/// A decoded literal value. Present only on `IntLit`, `RealLit`, and
/// `CharLit` lexemes — `CharLit` decodes to the byte value of its body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LexValue {
    Int(i64),
    Real(f64),
}

/// One scanned unit of source text.
#[derive(Clone, Debug, PartialEq)]
pub struct Lexeme {
    pub text: String,
    pub kind: TokenKind,
    pub value: Option<LexValue>,
    pub range: Range,
}

impl Lexeme {
    pub fn new(text: impl Into<String>, kind: TokenKind, range: Range) -> Self {
        Self { text: text.into(), kind, value: None, range }
    }

    pub fn with_value(mut self, value: LexValue) -> Self {
        self.value = Some(value);
        self
    }
}
