// src/errors/parse.rs
//! Parser errors (E1xxx) and parser-side warnings (W31xx).

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParseError {
    #[error("empty source")]
    #[diagnostic(code(E1000))]
    EmptySource,

    #[error("expected {expected}, found '{found}'")]
    #[diagnostic(code(E1001))]
    ExpectedToken {
        expected: String,
        found: String,
        #[label("unexpected token")]
        span: SourceSpan,
    },

    #[error("expected expression, found '{found}'")]
    #[diagnostic(code(E1002))]
    ExpectedExpression {
        found: String,
        #[label("expected expression")]
        span: SourceSpan,
    },

    #[error("unexpected token '{token}'")]
    #[diagnostic(code(E1003))]
    UnexpectedToken {
        token: String,
        #[label("skipped")]
        span: SourceSpan,
    },

    #[error("expected identifier, found '{found}'")]
    #[diagnostic(code(E1004))]
    ExpectedIdentifier {
        found: String,
        #[label("expected identifier")]
        span: SourceSpan,
    },

    #[error("expected a type name, found '{found}'")]
    #[diagnostic(code(E1005))]
    ExpectedTypeName {
        found: String,
        #[label("expected type")]
        span: SourceSpan,
    },

    #[error("unexpected end of input, expected {expected}")]
    #[diagnostic(code(E1006))]
    UnexpectedEnd {
        expected: String,
        #[label("input ends here")]
        span: SourceSpan,
    },

    #[error("'{word}' is a reserved word and cannot be used as a name")]
    #[diagnostic(code(E1007))]
    ReservedWord {
        word: String,
        #[label("reserved word")]
        span: SourceSpan,
    },

    #[error("duplicate access block")]
    #[diagnostic(
        code(E1101),
        help("merge these fields into the earlier block with the same access and mutability")
    )]
    DuplicateAccessBlock {
        #[label("this combination already has a block")]
        span: SourceSpan,
    },

    #[error("companion blocks cannot nest")]
    #[diagnostic(code(E1102))]
    NestedCompanion {
        #[label("already inside a companion block")]
        span: SourceSpan,
    },

    #[error("constructors are not allowed in companion blocks")]
    #[diagnostic(code(E1103))]
    ConstructorInCompanion {
        #[label("constructor declared here")]
        span: SourceSpan,
    },

    #[error("constructors cannot be declared 'mut'")]
    #[diagnostic(code(E1104))]
    MutableConstructor {
        #[label("'mut' is not valid here")]
        span: SourceSpan,
    },

    #[error("access modifier must come before 'mut'")]
    #[diagnostic(code(E1105))]
    ModifierOrder {
        #[label("move this before 'mut'")]
        span: SourceSpan,
    },

    #[error("duplicate modifier '{token}'")]
    #[diagnostic(code(E1106))]
    DuplicateModifier {
        token: String,
        #[label("already given")]
        span: SourceSpan,
    },

    #[error("impl block targets '{name}' but this file declares class '{class}'")]
    #[diagnostic(code(E1107))]
    ImplTargetMismatch {
        name: String,
        class: String,
        #[label("unknown impl target")]
        span: SourceSpan,
    },

    #[error("a file may declare at most one impl block")]
    #[diagnostic(
        code(E1108),
        help("merge these members into the impl block above")
    )]
    DuplicateImplBlock {
        #[label("second impl block")]
        span: SourceSpan,
    },

    #[error("redundant 'pub' modifier")]
    #[diagnostic(
        code(W3101),
        severity(Warning),
        help("declarations are public by default")
    )]
    RedundantPub {
        #[label("'pub' has no effect")]
        span: SourceSpan,
    },

    #[error("duplicate companion block")]
    #[diagnostic(
        code(W3102),
        severity(Warning),
        help("merge with the earlier companion block")
    )]
    DuplicateCompanionBlock {
        #[label("companion block already opened above")]
        span: SourceSpan,
    },
}
