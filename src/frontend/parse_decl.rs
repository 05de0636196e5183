// src/frontend/parse_decl.rs
//! Declaration parsing: usages, class headers, field blocks, impl members.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::errors::ParseError;
use crate::frontend::ast::*;
use crate::frontend::{Parser, TokenKind};

const ACCESSOR_WORDS: [&str; 4] = ["pub", "prot", "intl", "priv"];

fn accessor_for(word: &str) -> Option<Accessor> {
    match word {
        "pub" => Some(Accessor::Pub),
        "prot" => Some(Accessor::Prot),
        "intl" => Some(Accessor::Intl),
        "priv" => Some(Accessor::Priv),
        _ => None,
    }
}

impl Parser<'_> {
    /// `use a::b::{C, D as E}` — flattens nested groups into usages.
    pub(crate) fn parse_usage(&mut self, out: &mut Vec<Usage>) {
        let prefix = SmallVec::new();
        self.parse_usage_tree(prefix, out);
    }

    fn parse_usage_tree(&mut self, prefix: SmallVec<[Symbol; 4]>, out: &mut Vec<Usage>) {
        let mut segments = prefix;
        let Some((first, first_span)) = self.expect_name("usage path") else {
            return;
        };
        segments.push(first);
        let mut span = first_span;

        while self.match_kind(TokenKind::PathSep).is_some() {
            if self.match_kind(TokenKind::LBrace).is_some() {
                // Group: a::{b, c::d}
                loop {
                    self.parse_usage_tree(segments.clone(), out);
                    if self.match_kind(TokenKind::Comma).is_none() {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace, "'}' to close the usage group");
                return;
            }
            let Some((seg, seg_span)) = self.expect_name("usage segment") else {
                break;
            };
            segments.push(seg);
            span = span.extend(seg_span);
        }

        let alias = if self.match_word("as").is_some() {
            self.expect_name("usage alias").map(|(sym, alias_span)| {
                span = span.extend(alias_span);
                sym
            })
        } else {
            None
        };

        out.push(Usage {
            reference: Reference::new(segments, span),
            alias,
            span,
        });
    }

    /// `[accessor] class Name [ { field blocks } ]`
    pub(crate) fn parse_class(
        &mut self,
        package: Option<Reference>,
        usages: Vec<Usage>,
    ) -> Option<Class> {
        let mut accessor = Accessor::Pub;
        if let Some(word) = self.peek().map(|t| t.literal.clone()) {
            if let Some(parsed) = accessor_for(&word) {
                let token = self.advance().expect("peeked token");
                if parsed == Accessor::Pub {
                    self.reports.push(
                        ParseError::RedundantPub {
                            span: token.span.into(),
                        },
                        Some(token.span),
                    );
                }
                accessor = parsed;
            }
        }

        let class_token = self.peek().map(|t| t.span);
        if self.match_word("class").is_none() {
            let found = self
                .peek()
                .map(|t| t.describe().to_string())
                .unwrap_or_else(|| "end of input".to_string());
            let span = self.peek().map(|t| t.span).unwrap_or(self.last_span());
            self.reports.push(
                ParseError::ExpectedToken {
                    expected: "'class'".to_string(),
                    found,
                    span: span.into(),
                },
                Some(span),
            );
            return None;
        }
        let start_span = class_token.unwrap_or_default();

        let (name, name_span) = self.expect_name("class name")?;
        let mut clazz = Class {
            package,
            usages,
            accessor,
            name,
            fields: vec![],
            constructors: vec![],
            functions: vec![],
            span: start_span.extend(name_span),
        };

        if self.match_kind(TokenKind::LBrace).is_some() {
            self.parse_field_group(&mut clazz, false);
            clazz.span = start_span.extend(self.last_span());
        }

        Some(clazz)
    }

    /// One brace group of field blocks. `companion` is true inside `comp { }`.
    /// Consumes through the closing brace.
    fn parse_field_group(&mut self, clazz: &mut Class, companion: bool) {
        let mut accessor = Accessor::Pub;
        let mut mutable = false;
        let mut seen_headers: FxHashSet<(Accessor, bool)> = FxHashSet::default();
        let mut comp_blocks = 0usize;

        loop {
            let Some(token) = self.peek() else {
                self.report_unexpected_end("'}' to close the class body");
                return;
            };

            if token.kind == TokenKind::RBrace {
                self.advance();
                return;
            }

            if token.is_word("comp") {
                let comp_token = self.advance().expect("peeked token");
                if companion {
                    self.reports.push(
                        ParseError::NestedCompanion {
                            span: comp_token.span.into(),
                        },
                        Some(comp_token.span),
                    );
                } else if comp_blocks > 0 {
                    self.reports.push(
                        ParseError::DuplicateCompanionBlock {
                            span: comp_token.span.into(),
                        },
                        Some(comp_token.span),
                    );
                }
                comp_blocks += 1;
                if self.expect(TokenKind::LBrace, "'{' after 'comp'").is_some() {
                    self.parse_field_group(clazz, true);
                }
                continue;
            }

            if token.kind == TokenKind::Identifier
                && (ACCESSOR_WORDS.contains(&token.literal.as_str()) || token.is_word("mut"))
            {
                self.parse_field_header(&mut accessor, &mut mutable, &mut seen_headers);
                continue;
            }

            if token.kind == TokenKind::Identifier {
                self.parse_field(clazz, accessor, mutable, companion);
                self.match_kind(TokenKind::Comma);
                continue;
            }

            self.skip_unexpected();
        }
    }

    /// `[accessor] [mut] ':'` (in either order) opening an access block.
    fn parse_field_header(
        &mut self,
        accessor: &mut Accessor,
        mutable: &mut bool,
        seen: &mut FxHashSet<(Accessor, bool)>,
    ) {
        let mut header_accessor: Option<Accessor> = None;
        let mut header_mut = false;

        loop {
            let Some(token) = self.peek() else { break };
            if let Some(parsed) = accessor_for(&token.literal) {
                let token = self.advance().expect("peeked token");
                if header_accessor.is_some() {
                    self.reports.push(
                        ParseError::DuplicateModifier {
                            token: token.literal.clone(),
                            span: token.span.into(),
                        },
                        Some(token.span),
                    );
                }
                if parsed == Accessor::Pub {
                    self.reports.push(
                        ParseError::RedundantPub {
                            span: token.span.into(),
                        },
                        Some(token.span),
                    );
                }
                header_accessor = Some(parsed);
            } else if token.is_word("mut") {
                let token = self.advance().expect("peeked token");
                if header_mut {
                    self.reports.push(
                        ParseError::DuplicateModifier {
                            token: "mut".to_string(),
                            span: token.span.into(),
                        },
                        Some(token.span),
                    );
                }
                header_mut = true;
            } else {
                break;
            }
        }

        *accessor = header_accessor.unwrap_or(Accessor::Pub);
        *mutable = header_mut;
        if !seen.insert((*accessor, *mutable)) {
            let span = self.last_span();
            self.reports.push(
                ParseError::DuplicateAccessBlock { span: span.into() },
                Some(span),
            );
        }

        self.expect(TokenKind::Colon, "':' after the access block header");
    }

    /// `name ':' TypeRef`
    fn parse_field(&mut self, clazz: &mut Class, accessor: Accessor, mutable: bool, companion: bool) {
        let Some((name, name_span)) = self.expect_name("field name") else {
            return;
        };
        if self.expect(TokenKind::Colon, "':' after the field name").is_none() {
            return;
        }
        let Some(type_ref) = self.parse_type_ref() else {
            return;
        };
        let span = name_span.extend(type_ref.span);
        let id = self.node_id();
        clazz.fields.push(Field {
            id,
            accessor,
            mutable,
            companion,
            name,
            type_ref,
            span,
        });
    }

    /// `Name { '::' Name } { '[' ']' }` — a declared type.
    pub(crate) fn parse_type_ref(&mut self) -> Option<TypeRef> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Identifier => {}
            Some(token) => {
                let (found, span) = (token.describe().to_string(), token.span);
                self.reports.push(
                    ParseError::ExpectedTypeName {
                        found,
                        span: span.into(),
                    },
                    Some(span),
                );
                self.advance();
                return None;
            }
            None => {
                self.report_unexpected_end("a type name");
                return None;
            }
        }

        let token = self.advance().expect("peeked token");
        let mut segments: SmallVec<[Symbol; 4]> = SmallVec::new();
        segments.push(self.interner.intern(&token.literal));
        let mut span = token.span;

        while self.check(TokenKind::PathSep) && self.check_at(1, TokenKind::Identifier) {
            self.advance();
            let seg = self.advance().expect("peeked token");
            segments.push(self.interner.intern(&seg.literal));
            span = span.extend(seg.span);
        }

        let mut dims = 0u8;
        while self.check(TokenKind::LBracket) && self.check_at(1, TokenKind::RBracket) {
            self.advance();
            let close = self.advance().expect("peeked token");
            span = span.extend(close.span);
            dims = dims.saturating_add(1);
        }

        Some(TypeRef {
            reference: Reference::new(segments, span),
            dims,
            span,
        })
    }

    /// `impl Name { members }` — attaches constructors and functions to the
    /// file's class.
    pub(crate) fn parse_impl(&mut self, clazz: &mut Class) {
        self.advance(); // 'impl'
        if let Some((name, name_span)) = self.expect_name("impl target") {
            if name != clazz.name {
                let name = self.interner.resolve(name).to_string();
                let class = self.interner.resolve(clazz.name).to_string();
                self.reports.push(
                    ParseError::ImplTargetMismatch {
                        name,
                        class,
                        span: name_span.into(),
                    },
                    Some(name_span),
                );
            }
        }
        if self.expect(TokenKind::LBrace, "'{' to open the impl block").is_some() {
            self.parse_member_group(clazz, false);
        }
    }

    /// One brace group of member declarations. Consumes through the closing
    /// brace. Modifier state resets after each declaration.
    fn parse_member_group(&mut self, clazz: &mut Class, companion: bool) {
        let mut comp_blocks = 0usize;

        'members: loop {
            let mut accessor = Accessor::Pub;
            let mut has_accessor = false;
            let mut mutable = false;

            loop {
                let Some(token) = self.peek() else {
                    self.report_unexpected_end("'}' to close the impl block");
                    return;
                };

                if token.kind == TokenKind::RBrace {
                    self.advance();
                    return;
                }

                if let Some(parsed) = accessor_for(&token.literal) {
                    let token = self.advance().expect("peeked token");
                    if has_accessor {
                        self.reports.push(
                            ParseError::DuplicateModifier {
                                token: token.literal.clone(),
                                span: token.span.into(),
                            },
                            Some(token.span),
                        );
                    }
                    if mutable {
                        self.reports.push(
                            ParseError::ModifierOrder {
                                span: token.span.into(),
                            },
                            Some(token.span),
                        );
                    }
                    if parsed == Accessor::Pub {
                        self.reports.push(
                            ParseError::RedundantPub {
                                span: token.span.into(),
                            },
                            Some(token.span),
                        );
                    }
                    accessor = parsed;
                    has_accessor = true;
                    continue;
                }

                if token.is_word("mut") {
                    let token = self.advance().expect("peeked token");
                    if mutable {
                        self.reports.push(
                            ParseError::DuplicateModifier {
                                token: "mut".to_string(),
                                span: token.span.into(),
                            },
                            Some(token.span),
                        );
                    }
                    mutable = true;
                    continue;
                }

                if token.is_word("comp") {
                    let comp_token = self.advance().expect("peeked token");
                    if companion {
                        self.reports.push(
                            ParseError::NestedCompanion {
                                span: comp_token.span.into(),
                            },
                            Some(comp_token.span),
                        );
                    } else if comp_blocks > 0 {
                        self.reports.push(
                            ParseError::DuplicateCompanionBlock {
                                span: comp_token.span.into(),
                            },
                            Some(comp_token.span),
                        );
                    }
                    comp_blocks += 1;
                    if self.expect(TokenKind::LBrace, "'{' after 'comp'").is_some() {
                        self.parse_member_group(clazz, true);
                    }
                    continue 'members;
                }

                if token.is_word("new") {
                    let new_token = self.advance().expect("peeked token");
                    if companion {
                        self.reports.push(
                            ParseError::ConstructorInCompanion {
                                span: new_token.span.into(),
                            },
                            Some(new_token.span),
                        );
                    }
                    if mutable {
                        self.reports.push(
                            ParseError::MutableConstructor {
                                span: new_token.span.into(),
                            },
                            Some(new_token.span),
                        );
                    }
                    let params = self.parse_params();
                    let body = self.parse_body();
                    let span = new_token.span.extend(self.last_span());
                    let id = self.node_id();
                    clazz.constructors.push(Constructor {
                        id,
                        accessor,
                        parent_ref: None,
                        params,
                        body,
                        span,
                    });
                    continue 'members;
                }

                if token.is_word("fn") {
                    let fn_token = self.advance().expect("peeked token");
                    let Some((name, _)) = self.expect_name("function name") else {
                        continue 'members;
                    };
                    let params = self.parse_params();
                    let return_type_ref = if self.match_kind(TokenKind::Colon).is_some() {
                        self.parse_type_ref()
                    } else {
                        None
                    };
                    let body = self.parse_body();
                    let span = fn_token.span.extend(self.last_span());
                    let id = self.node_id();
                    clazz.functions.push(Function {
                        id,
                        accessor,
                        mutable,
                        companion,
                        name,
                        params,
                        return_type_ref,
                        body,
                        span,
                    });
                    continue 'members;
                }

                self.skip_unexpected();
                continue 'members;
            }
        }
    }

    /// `'(' [ [mut] name ':' TypeRef {',' ...} ] ')'`
    pub(crate) fn parse_params(&mut self) -> Vec<Parameter> {
        let mut params = Vec::new();
        if self.expect(TokenKind::LParen, "'(' before the parameter list").is_none() {
            return params;
        }
        if !self.check(TokenKind::RParen) {
            loop {
                let mutable = self.match_word("mut").is_some();
                let Some((name, name_span)) = self.expect_name("parameter name") else {
                    break;
                };
                if self
                    .expect(TokenKind::Colon, "':' after the parameter name")
                    .is_none()
                {
                    break;
                }
                let Some(type_ref) = self.parse_type_ref() else {
                    break;
                };
                let span = name_span.extend(type_ref.span);
                let id = self.node_id();
                params.push(Parameter {
                    id,
                    mutable,
                    name,
                    type_ref,
                    span,
                });
                if self.match_kind(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')' after the parameter list");
        params
    }

    /// `'{' Stmt* '}'` — a function or constructor body.
    pub(crate) fn parse_body(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        if self.expect(TokenKind::LBrace, "'{' to open the body").is_none() {
            return statements;
        }
        self.parse_statements_until_brace(&mut statements);
        statements
    }

    /// Parse statements until a closing brace, skipping what cannot start a
    /// statement. Every iteration makes progress.
    pub(crate) fn parse_statements_until_brace(&mut self, out: &mut Vec<Stmt>) {
        loop {
            let Some(token) = self.peek() else {
                self.report_unexpected_end("'}' to close the block");
                return;
            };
            if token.kind == TokenKind::RBrace {
                self.advance();
                return;
            }
            let before = self.pos();
            if let Some(stmt) = self.parse_stmt() {
                out.push(stmt);
            }
            if self.pos() == before {
                self.skip_unexpected();
            }
        }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }
}
