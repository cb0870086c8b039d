//! portc-lex - lexical analysis for Portugol source files.
//!
//! Turns UTF-8 source text into a forward stream of [`Lexeme`]s with one
//! token of lookahead. The lexer never buffers more than the current and
//! next lexeme; every other stage consumes it strictly in order.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{LexValue, Lexeme, TokenKind};
