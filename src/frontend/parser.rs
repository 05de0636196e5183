// src/frontend/parser.rs

use crate::errors::{ParseError, Reports};
use crate::frontend::ast::*;
use crate::frontend::intern::Interner;
use crate::frontend::{Span, Token, TokenKind};

/// Recursive-descent parser over a finite token sequence.
///
/// The parser never aborts on malformed input. [`Parser::expect`] reports a
/// diagnostic and skips the offending token on a mismatch; block loops skip
/// tokens they cannot place. The result is always a [`File`], possibly with
/// holes where recovery dropped a node.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pub(crate) pos: usize,
    path: String,
    pub(crate) interner: &'a mut Interner,
    pub(crate) reports: &'a mut Reports,
    next_node: u32,
}

impl<'a> Parser<'a> {
    pub fn new(
        path: impl Into<String>,
        tokens: Vec<Token>,
        interner: &'a mut Interner,
        reports: &'a mut Reports,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            path: path.into(),
            interner,
            reports,
            next_node: 0,
        }
    }

    /// Parse the whole token sequence into a file.
    pub fn parse(mut self) -> File {
        if self.tokens.is_empty() {
            self.reports.push(ParseError::EmptySource, None);
            return File {
                path: self.path,
                clazz: None,
            };
        }

        let package = if self.match_word("mod").is_some() {
            self.parse_package()
        } else {
            None
        };

        let mut usages = Vec::new();
        while self.check_word("use") {
            self.advance();
            self.parse_usage(&mut usages);
            self.match_kind(TokenKind::Semicolon);
        }

        let mut clazz = self.parse_class(package, usages);
        let mut impl_seen = false;

        while !self.at_end() {
            if self.check_word("impl") {
                match clazz.as_mut() {
                    Some(clazz) => {
                        // The grammar allows a single impl block per file;
                        // later ones are reported but still parsed so their
                        // members keep producing useful diagnostics.
                        if impl_seen {
                            let span = self.peek().map(|t| t.span).unwrap_or_default();
                            self.reports.push(
                                ParseError::DuplicateImplBlock { span: span.into() },
                                Some(span),
                            );
                        }
                        impl_seen = true;
                        self.parse_impl(clazz);
                    }
                    None => {
                        // No class to attach to; consume the block to keep going.
                        self.skip_unexpected();
                    }
                }
            } else {
                self.skip_unexpected();
            }
        }

        File {
            path: self.path,
            clazz,
        }
    }

    /// `mod a.b` — dotted package reference.
    fn parse_package(&mut self) -> Option<Reference> {
        let (first, mut span) = self.expect_name("package name")?;
        let mut segments = smallvec::SmallVec::new();
        segments.push(first);
        while self.match_kind(TokenKind::Dot).is_some() {
            let Some((seg, seg_span)) = self.expect_name("package segment") else {
                break;
            };
            segments.push(seg);
            span = span.extend(seg_span);
        }
        Some(Reference::new(segments, span))
    }

    // -----------------------------------------------------------------------
    // Cursor primitives
    // -----------------------------------------------------------------------

    pub(crate) fn node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn peek_at(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    pub(crate) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().map(|t| t.kind == kind).unwrap_or(false)
    }

    pub(crate) fn check_at(&self, n: usize, kind: TokenKind) -> bool {
        self.peek_at(n).map(|t| t.kind == kind).unwrap_or(false)
    }

    pub(crate) fn check_word(&self, word: &str) -> bool {
        self.peek().map(|t| t.is_word(word)).unwrap_or(false)
    }

    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            self.advance()
        } else {
            None
        }
    }

    pub(crate) fn match_word(&mut self, word: &str) -> Option<Token> {
        if self.check_word(word) {
            self.advance()
        } else {
            None
        }
    }

    /// Span of the most recently consumed token, or the default span when
    /// nothing was consumed yet.
    pub(crate) fn last_span(&self) -> Span {
        if self.pos == 0 {
            self.peek().map(|t| t.span).unwrap_or_default()
        } else {
            self.tokens[self.pos - 1].span
        }
    }

    /// Expect a token of `kind`. On a mismatch, report, skip the offending
    /// token, and return `None`; the caller continues with peek guards.
    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> Option<Token> {
        match self.peek() {
            Some(token) if token.kind == kind => self.advance(),
            Some(token) => {
                let (found, span) = (token.describe().to_string(), token.span);
                self.reports.push(
                    ParseError::ExpectedToken {
                        expected: what.to_string(),
                        found,
                        span: span.into(),
                    },
                    Some(span),
                );
                self.advance();
                None
            }
            None => {
                self.report_unexpected_end(what);
                None
            }
        }
    }

    /// Expect an identifier usable as a fresh name; reserved words are
    /// reported and consumed.
    pub(crate) fn expect_name(&mut self, what: &str) -> Option<(Symbol, Span)> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Identifier => {
                if crate::frontend::token::is_reserved(&token.literal) {
                    let (word, span) = (token.literal.clone(), token.span);
                    self.reports.push(
                        ParseError::ReservedWord {
                            word,
                            span: span.into(),
                        },
                        Some(span),
                    );
                    self.advance();
                    None
                } else {
                    let token = self.advance().expect("peeked token");
                    let sym = self.interner.intern(&token.literal);
                    Some((sym, token.span))
                }
            }
            Some(token) => {
                let (found, span) = (token.describe().to_string(), token.span);
                self.reports.push(
                    ParseError::ExpectedIdentifier {
                        found,
                        span: span.into(),
                    },
                    Some(span),
                );
                self.advance();
                None
            }
            None => {
                self.report_unexpected_end(what);
                None
            }
        }
    }

    pub(crate) fn report_unexpected_end(&mut self, expected: &str) {
        let span = self.last_span();
        self.reports.push(
            ParseError::UnexpectedEnd {
                expected: expected.to_string(),
                span: span.into(),
            },
            Some(span),
        );
    }

    /// Report the current token as unexpected and skip it.
    pub(crate) fn skip_unexpected(&mut self) {
        if let Some(token) = self.advance() {
            self.reports.push(
                ParseError::UnexpectedToken {
                    token: token.describe().to_string(),
                    span: token.span.into(),
                },
                Some(token.span),
            );
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::errors::Reports;
    use crate::frontend::ast::*;
    use crate::frontend::{Interner, Lexer, Parser};

    pub(crate) fn parse_source(src: &str) -> (File, Interner, Reports) {
        let mut reports = Reports::new();
        let tokens = Lexer::new(src).tokenize(&mut reports);
        let mut interner = Interner::new();
        let file = Parser::new("test.mar", tokens, &mut interner, &mut reports).parse();
        (file, interner, reports)
    }

    #[test]
    fn empty_source_reports_and_returns_a_file() {
        let (file, _, reports) = parse_source("");
        assert!(file.clazz.is_none());
        assert_eq!(reports.error_count(), 1);
        assert!(reports.messages()[0].contains("empty source"));
    }

    #[test]
    fn package_usages_and_class() {
        let (file, interner, reports) = parse_source("mod a.b use c::{D, E as F} class G");
        assert!(reports.is_empty(), "unexpected: {:?}", reports.messages());
        let clazz = file.clazz.expect("class");
        assert_eq!(clazz.qualified_name(&interner), "a/b/G");
        assert_eq!(clazz.usages.len(), 2);
        assert_eq!(clazz.usages[0].reference.qualified(&interner), "c/D");
        assert!(clazz.usages[0].alias.is_none());
        assert_eq!(clazz.usages[1].reference.qualified(&interner), "c/E");
        assert_eq!(
            clazz.usages[1].alias.map(|a| interner.resolve(a).to_string()),
            Some("F".to_string())
        );
        assert!(clazz.fields.is_empty());
        assert!(clazz.functions.is_empty());
    }

    #[test]
    fn trailing_garbage_is_skipped_with_reports() {
        let (file, _, reports) = parse_source("class G ) )");
        assert!(file.clazz.is_some());
        assert_eq!(reports.error_count(), 2);
    }

    #[test]
    fn missing_class_keyword_recovers() {
        let (file, _, reports) = parse_source("widget");
        assert!(file.clazz.is_none());
        assert!(reports.has_errors());
    }
}
