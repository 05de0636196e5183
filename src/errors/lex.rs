// src/errors/lex.rs
//! Lexer errors (E0xxx).

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum LexError {
    #[error("unexpected character '{ch}'")]
    #[diagnostic(code(E0001))]
    UnexpectedCharacter {
        ch: char,
        #[label("not a valid token")]
        span: SourceSpan,
    },

    #[error("unterminated string literal")]
    #[diagnostic(code(E0002), help("add a closing '\"' to terminate the string"))]
    UnterminatedString {
        #[label("string starts here")]
        span: SourceSpan,
    },

    #[error("unterminated character literal")]
    #[diagnostic(code(E0003), help("add a closing '\'' to terminate the character"))]
    UnterminatedChar {
        #[label("character starts here")]
        span: SourceSpan,
    },

    #[error("character literal must contain exactly one character")]
    #[diagnostic(code(E0004))]
    InvalidCharLiteral {
        #[label("invalid character literal")]
        span: SourceSpan,
    },

    #[error("invalid number literal '{text}'")]
    #[diagnostic(code(E0005))]
    InvalidNumber {
        text: String,
        #[label("cannot be parsed as a number")]
        span: SourceSpan,
    },
}
