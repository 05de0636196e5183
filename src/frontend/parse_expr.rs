// src/frontend/parse_expr.rs
//! Expression parsing: precedence climbing, member chains, array forms.

use smallvec::SmallVec;

use crate::errors::{LexError, ParseError};
use crate::frontend::ast::*;
use crate::frontend::token::is_reserved;
use crate::frontend::{Parser, Span, TokenKind};

/// Reserved words that are valid at the head of an expression.
const EXPR_WORDS: [&str; 5] = ["true", "false", "null", "self", "new"];

fn binary_op_for(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::BangEq => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::LtEq => BinaryOp::Le,
        TokenKind::GtEq => BinaryOp::Ge,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::PipePipe => BinaryOp::Or,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::UShr => BinaryOp::UShr,
        _ => return None,
    })
}

impl Parser<'_> {
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.expression(0)
    }

    /// Precedence climbing over the binary operator table. Assignment is
    /// right-associative and handled as a special case.
    fn expression(&mut self, min_prec: u8) -> Option<Expr> {
        let mut left = self.unary()?;

        while let Some(token) = self.peek() {
            let prec = token.kind.precedence();
            if prec == 0 || prec <= min_prec {
                break;
            }

            if token.kind == TokenKind::Assign {
                self.advance();
                let value = self.expression(0)?;
                let span = left.span.extend(value.span);
                let id = self.node_id();
                return Some(Expr {
                    id,
                    kind: ExprKind::Assign(Box::new(AssignExpr {
                        target: left,
                        op: TokenKind::Assign,
                        value,
                    })),
                    span,
                });
            }

            let Some(op) = binary_op_for(token.kind) else {
                break;
            };
            self.advance();
            let right = self.expression(prec)?;
            let span = left.span.extend(right.span);
            let id = self.node_id();
            left = Expr {
                id,
                kind: ExprKind::Binary(Box::new(BinaryExpr { left, op, right })),
                span,
            };
        }

        Some(left)
    }

    fn unary(&mut self) -> Option<Expr> {
        let op = match self.peek().map(|t| t.kind) {
            Some(TokenKind::Plus) => Some(UnaryOp::Plus),
            Some(TokenKind::Minus) => Some(UnaryOp::Neg),
            Some(TokenKind::Bang) => Some(UnaryOp::Not),
            Some(TokenKind::Tilde) => Some(UnaryOp::BitNot),
            Some(TokenKind::PlusPlus) => Some(UnaryOp::Inc),
            Some(TokenKind::MinusMinus) => Some(UnaryOp::Dec),
            _ => None,
        };
        if let Some(op) = op {
            let token = self.advance().expect("peeked token");
            let operand = self.unary()?;
            let span = token.span.extend(operand.span);
            let id = self.node_id();
            return Some(Expr {
                id,
                kind: ExprKind::Unary(Box::new(UnaryExpr {
                    op,
                    operand,
                    postfix: false,
                })),
                span,
            });
        }
        self.postfix()
    }

    /// Postfix `++`/`--`, valid on identifier targets only.
    fn postfix(&mut self) -> Option<Expr> {
        let expr = self.chain()?;
        let op = match self.peek().map(|t| t.kind) {
            Some(TokenKind::PlusPlus) => Some(UnaryOp::Inc),
            Some(TokenKind::MinusMinus) => Some(UnaryOp::Dec),
            _ => None,
        };
        if let Some(op) = op {
            if matches!(expr.kind, ExprKind::Identifier(_)) {
                let token = self.advance().expect("peeked token");
                let span = expr.span.extend(token.span);
                let id = self.node_id();
                return Some(Expr {
                    id,
                    kind: ExprKind::Unary(Box::new(UnaryExpr {
                        op,
                        operand: expr,
                        postfix: true,
                    })),
                    span,
                });
            }
        }
        Some(expr)
    }

    /// Left-leaning `.name`, `.name(args)` and `[expr]` chains: each suffix
    /// node takes the one before it as `previous`.
    fn chain(&mut self) -> Option<Expr> {
        let mut expr = self.primary()?;

        loop {
            match self.peek().map(|t| t.kind) {
                Some(TokenKind::Dot) => {
                    self.advance();
                    let (name, name_span) = self.expect_name("member name")?;
                    if self.match_kind(TokenKind::LParen).is_some() {
                        let args = self.parse_args();
                        let span = expr.span.extend(self.last_span());
                        let id = self.node_id();
                        expr = Expr {
                            id,
                            kind: ExprKind::Call(Box::new(CallExpr {
                                owner: None,
                                previous: Some(expr),
                                name,
                                name_span,
                                args,
                            })),
                            span,
                        };
                    } else {
                        let span = expr.span.extend(name_span);
                        let id = self.node_id();
                        expr = Expr {
                            id,
                            kind: ExprKind::Identifier(Box::new(IdentifierExpr {
                                owner: None,
                                previous: Some(expr),
                                name,
                                name_span,
                            })),
                            span,
                        };
                    }
                }
                Some(TokenKind::LBracket) => {
                    self.advance();
                    let index = self.expression(0)?;
                    self.expect(TokenKind::RBracket, "']' to close the index");
                    let span = expr.span.extend(self.last_span());
                    let id = self.node_id();
                    expr = Expr {
                        id,
                        kind: ExprKind::Index(Box::new(IndexExpr {
                            previous: expr,
                            index,
                        })),
                        span,
                    };
                }
                _ => break,
            }
        }

        Some(expr)
    }

    fn primary(&mut self) -> Option<Expr> {
        let Some(token) = self.peek().cloned() else {
            self.report_unexpected_end("an expression");
            return None;
        };

        match token.kind {
            TokenKind::Int => {
                self.advance();
                let value = token.literal.parse::<i64>().unwrap_or_else(|_| {
                    self.reports.push(
                        LexError::InvalidNumber {
                            text: token.literal.clone(),
                            span: token.span.into(),
                        },
                        Some(token.span),
                    );
                    0
                });
                Some(self.literal(ExprKind::Int(value), token.span))
            }
            TokenKind::Float => {
                self.advance();
                let wide = token.literal.ends_with('D');
                let digits = token.literal.trim_end_matches('D');
                let value = digits.parse::<f64>().unwrap_or_else(|_| {
                    self.reports.push(
                        LexError::InvalidNumber {
                            text: token.literal.clone(),
                            span: token.span.into(),
                        },
                        Some(token.span),
                    );
                    0.0
                });
                Some(self.literal(ExprKind::Float { value, wide }, token.span))
            }
            TokenKind::Str => {
                self.advance();
                let inner = &token.literal[1..token.literal.len() - 1];
                Some(self.literal(ExprKind::Str(unescape(inner)), token.span))
            }
            TokenKind::Char => {
                self.advance();
                let inner = &token.literal[1..token.literal.len() - 1];
                let c = unescape(inner).chars().next().unwrap_or('\0');
                Some(self.literal(ExprKind::Char(c), token.span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression(0)?;
                self.expect(TokenKind::RParen, "')' to close the group");
                let span = token.span.extend(self.last_span());
                let id = self.node_id();
                Some(Expr {
                    id,
                    kind: ExprKind::Paren(Box::new(inner)),
                    span,
                })
            }
            // `:{e1, e2}` (or `:[e1, e2]`) — array literal with inferred
            // element type.
            TokenKind::Colon
                if self.check_at(1, TokenKind::LBrace) || self.check_at(1, TokenKind::LBracket) =>
            {
                self.advance();
                let open = self.advance().expect("peeked token");
                let close = if open.kind == TokenKind::LBrace {
                    TokenKind::RBrace
                } else {
                    TokenKind::RBracket
                };
                let elements = self.parse_array_elements_until(close);
                let span = token.span.extend(self.last_span());
                let id = self.node_id();
                Some(Expr {
                    id,
                    kind: ExprKind::ArrayLiteral(Box::new(ArrayLiteralExpr {
                        declared: None,
                        elements,
                    })),
                    span,
                })
            }
            TokenKind::Identifier => {
                if token.is_word("true") || token.is_word("false") {
                    self.advance();
                    Some(self.literal(ExprKind::Bool(token.is_word("true")), token.span))
                } else if token.is_word("null") {
                    self.advance();
                    Some(self.literal(ExprKind::Null, token.span))
                } else if token.is_word("self") {
                    self.advance();
                    Some(self.literal(ExprKind::SelfRef, token.span))
                } else if token.is_word("new") {
                    self.parse_new()
                } else if is_reserved(&token.literal) && !EXPR_WORDS.contains(&token.literal.as_str())
                {
                    self.reports.push(
                        ParseError::ExpectedExpression {
                            found: token.literal.clone(),
                            span: token.span.into(),
                        },
                        Some(token.span),
                    );
                    self.advance();
                    None
                } else {
                    self.parse_path_head()
                }
            }
            _ => {
                self.reports.push(
                    ParseError::ExpectedExpression {
                        found: token.describe().to_string(),
                        span: token.span.into(),
                    },
                    Some(token.span),
                );
                self.advance();
                None
            }
        }
    }

    fn literal(&mut self, kind: ExprKind, span: Span) -> Expr {
        let id = self.node_id();
        Expr { id, kind, span }
    }

    /// `new Owner::Class(args)`
    fn parse_new(&mut self) -> Option<Expr> {
        let new_token = self.advance().expect("peeked token");
        let class_ref = self.parse_path_reference()?;
        self.expect(TokenKind::LParen, "'(' after the constructor target")?;
        let args = self.parse_args();
        let span = new_token.span.extend(self.last_span());
        let id = self.node_id();
        Some(Expr {
            id,
            kind: ExprKind::New(Box::new(NewExpr { class_ref, args })),
            span,
        })
    }

    fn parse_path_reference(&mut self) -> Option<Reference> {
        let (first, mut span) = self.expect_name("a class name")?;
        let mut segments: SmallVec<[Symbol; 4]> = SmallVec::new();
        segments.push(first);
        while self.check(TokenKind::PathSep) {
            self.advance();
            let Some((seg, seg_span)) = self.expect_name("a path segment") else {
                break;
            };
            segments.push(seg);
            span = span.extend(seg_span);
        }
        Some(Reference::new(segments, span))
    }

    /// An identifier at expression head: a `a::b::c` companion path, the
    /// start of one of the array forms (`T:[...]{...}`), a call, or a plain
    /// name.
    fn parse_path_head(&mut self) -> Option<Expr> {
        let start_span = self.peek().map(|t| t.span).unwrap_or_default();
        let reference = self.parse_path_reference()?;
        let span = start_span.extend(self.last_span());

        // `T:[...]` — array literal with declared type, or sized declaration.
        if self.check(TokenKind::Colon) && self.check_at(1, TokenKind::LBracket) {
            return self.parse_array_form(reference, start_span);
        }

        let name = reference.name();
        let name_span = self.last_span();
        let owner = if reference.segments.len() > 1 {
            let mut owner_segments = reference.segments.clone();
            owner_segments.pop();
            Some(Reference::new(owner_segments, reference.span))
        } else {
            None
        };

        if self.match_kind(TokenKind::LParen).is_some() {
            let args = self.parse_args();
            let span = start_span.extend(self.last_span());
            let id = self.node_id();
            return Some(Expr {
                id,
                kind: ExprKind::Call(Box::new(CallExpr {
                    owner,
                    previous: None,
                    name,
                    name_span,
                    args,
                })),
                span,
            });
        }

        let id = self.node_id();
        Some(Expr {
            id,
            kind: ExprKind::Identifier(Box::new(IdentifierExpr {
                owner,
                previous: None,
                name,
                name_span,
            })),
            span,
        })
    }

    /// After `T` with `:[ ` ahead: either a typed array literal
    /// (`T:[]{e1, e2}`, all dimensions empty) or a sized declaration
    /// (`T:[d1][d2]{}`).
    fn parse_array_form(&mut self, reference: Reference, start_span: Span) -> Option<Expr> {
        self.advance(); // ':'

        let mut dims: Vec<Option<Expr>> = Vec::new();
        while self.match_kind(TokenKind::LBracket).is_some() {
            if self.check(TokenKind::RBracket) {
                self.advance();
                dims.push(None);
            } else {
                let dim = self.expression(0);
                self.expect(TokenKind::RBracket, "']' to close the dimension");
                dims.push(dim);
            }
        }

        self.expect(TokenKind::LBrace, "'{' to open the element list")?;

        let sized = dims.iter().any(Option::is_some);
        if sized {
            // Sized declaration: every dimension needs an extent, and the
            // trailing braces stay empty.
            let mut extents = Vec::new();
            for dim in dims {
                match dim {
                    Some(expr) => extents.push(expr),
                    None => {
                        let span = self.last_span();
                        self.reports.push(
                            ParseError::ExpectedExpression {
                                found: "]".to_string(),
                                span: span.into(),
                            },
                            Some(span),
                        );
                    }
                }
            }
            self.expect(TokenKind::RBrace, "'}' after a sized array declaration");
            let type_span = reference.span;
            let span = start_span.extend(self.last_span());
            let id = self.node_id();
            return Some(Expr {
                id,
                kind: ExprKind::ArrayDecl(Box::new(ArrayDeclExpr {
                    base: TypeRef {
                        reference,
                        dims: 0,
                        span: type_span,
                    },
                    dims: extents,
                })),
                span,
            });
        }

        // Typed literal: the literal itself supplies the outermost dimension;
        // extra empty pairs deepen the declared element type.
        let elements = self.parse_array_elements();
        let declared_dims = dims.len().saturating_sub(1) as u8;
        let type_span = reference.span;
        let span = start_span.extend(self.last_span());
        let id = self.node_id();
        Some(Expr {
            id,
            kind: ExprKind::ArrayLiteral(Box::new(ArrayLiteralExpr {
                declared: Some(TypeRef {
                    reference,
                    dims: declared_dims,
                    span: type_span,
                }),
                elements,
            })),
            span,
        })
    }

    /// Elements up to the closing brace. The opening brace is consumed.
    fn parse_array_elements(&mut self) -> Vec<Expr> {
        self.parse_array_elements_until(TokenKind::RBrace)
    }

    /// Elements up to `close`; the opening delimiter is already consumed.
    fn parse_array_elements_until(&mut self, close: TokenKind) -> Vec<Expr> {
        let mut elements = Vec::new();
        if !self.check(close) {
            loop {
                match self.parse_expression() {
                    Some(expr) => elements.push(expr),
                    None => break,
                }
                if self.match_kind(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let what = if close == TokenKind::RBrace {
            "'}' to close the element list"
        } else {
            "']' to close the element list"
        };
        self.expect(close, what);
        elements
    }

    /// Call arguments up to the closing paren. The opening paren is consumed.
    pub(crate) fn parse_args(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                match self.parse_expression() {
                    Some(expr) => args.push(expr),
                    None => break,
                }
                if self.match_kind(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')' to close the arguments");
        args
    }
}

fn unescape(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('0') => result.push('\0'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use crate::frontend::ast::*;
    use crate::frontend::parser::tests::parse_source;

    fn first_expr(src: &str) -> Expr {
        let (file, _, reports) =
            parse_source(&format!("class X impl X {{ fn f() {{ y := {} }} }}", src));
        assert_eq!(reports.error_count(), 0, "{:?}", reports.messages());
        let mut functions = file.clazz.expect("class").functions;
        match functions.remove(0).body.remove(0) {
            Stmt::VarDecl(decl) => decl.init,
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn precedence_multiplication_binds_tighter() {
        let expr = first_expr("1 + 2 * 3");
        match expr.kind {
            ExprKind::Binary(bin) => {
                assert_eq!(bin.op, BinaryOp::Add);
                assert!(matches!(
                    bin.right.kind,
                    ExprKind::Binary(ref inner) if inner.op == BinaryOp::Mul
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn left_associative_subtraction() {
        let expr = first_expr("1 - 2 - 3");
        match expr.kind {
            ExprKind::Binary(outer) => {
                assert_eq!(outer.op, BinaryOp::Sub);
                assert!(matches!(outer.right.kind, ExprKind::Int(3)));
                assert!(matches!(
                    outer.left.kind,
                    ExprKind::Binary(ref inner) if inner.op == BinaryOp::Sub
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn logical_or_binds_loosest() {
        let expr = first_expr("a == 1 || b && c");
        match expr.kind {
            ExprKind::Binary(bin) => {
                assert_eq!(bin.op, BinaryOp::Or);
                assert!(matches!(
                    bin.right.kind,
                    ExprKind::Binary(ref inner) if inner.op == BinaryOp::And
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn bitwise_sits_between_relational_and_shift() {
        // a < b | c  parses as  a < (b | c)
        let expr = first_expr("a < b | c");
        match expr.kind {
            ExprKind::Binary(bin) => {
                assert_eq!(bin.op, BinaryOp::Lt);
                assert!(matches!(
                    bin.right.kind,
                    ExprKind::Binary(ref inner) if inner.op == BinaryOp::BitOr
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn chain_links_through_previous() {
        let expr = first_expr("a.b.c(1)[2]");
        match expr.kind {
            ExprKind::Index(index) => match index.previous.kind {
                ExprKind::Call(call) => {
                    assert_eq!(call.args.len(), 1);
                    assert!(matches!(
                        call.previous.as_ref().unwrap().kind,
                        ExprKind::Identifier(_)
                    ));
                }
                other => panic!("expected call before index, got {:?}", other),
            },
            other => panic!("expected index, got {:?}", other),
        }
    }

    #[test]
    fn companion_path_becomes_owner() {
        let (file, interner, reports) = parse_source(
            "class X impl X { fn f() { y := c::D::g(1) } }",
        );
        assert_eq!(reports.error_count(), 0, "{:?}", reports.messages());
        let mut functions = file.clazz.expect("class").functions;
        let init = match functions.remove(0).body.remove(0) {
            Stmt::VarDecl(decl) => decl.init,
            other => panic!("expected declaration, got {:?}", other),
        };
        match init.kind {
            ExprKind::Call(call) => {
                assert_eq!(interner.resolve(call.name), "g");
                assert_eq!(
                    call.owner.expect("owner").qualified(&interner),
                    "c/D"
                );
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn new_expression() {
        let expr = first_expr("new c::D(1, 2)");
        match expr.kind {
            ExprKind::New(new) => {
                assert_eq!(new.args.len(), 2);
                assert_eq!(new.class_ref.segments.len(), 2);
            }
            other => panic!("expected constructor call, got {:?}", other),
        }
    }

    #[test]
    fn postfix_increment_only_on_identifiers() {
        let expr = first_expr("i++");
        assert!(matches!(
            expr.kind,
            ExprKind::Unary(ref u) if u.op == UnaryOp::Inc && u.postfix
        ));
    }

    #[test]
    fn prefix_unary_nests() {
        let expr = first_expr("-~x");
        match expr.kind {
            ExprKind::Unary(outer) => {
                assert_eq!(outer.op, UnaryOp::Neg);
                assert!(matches!(
                    outer.operand.kind,
                    ExprKind::Unary(ref inner) if inner.op == UnaryOp::BitNot
                ));
            }
            other => panic!("expected unary, got {:?}", other),
        }
    }

    #[test]
    fn inferred_array_literal() {
        let expr = first_expr(":{1, 2, 3}");
        match expr.kind {
            ExprKind::ArrayLiteral(lit) => {
                assert!(lit.declared.is_none());
                assert_eq!(lit.elements.len(), 3);
            }
            other => panic!("expected array literal, got {:?}", other),
        }
    }

    #[test]
    fn typed_array_literal() {
        let expr = first_expr("i32:[]{1, 2}");
        match expr.kind {
            ExprKind::ArrayLiteral(lit) => {
                let declared = lit.declared.expect("declared type");
                assert_eq!(declared.dims, 0);
                assert_eq!(lit.elements.len(), 2);
            }
            other => panic!("expected array literal, got {:?}", other),
        }
    }

    #[test]
    fn sized_array_declaration() {
        let expr = first_expr("i64:[3][4]{}");
        match expr.kind {
            ExprKind::ArrayDecl(decl) => {
                assert_eq!(decl.dims.len(), 2);
            }
            other => panic!("expected array declaration, got {:?}", other),
        }
    }

    #[test]
    fn assignment_is_right_associative() {
        let (file, _, reports) = parse_source(
            "class X impl X { fn f() { a = b = 1 } }",
        );
        assert_eq!(reports.error_count(), 0, "{:?}", reports.messages());
        let mut functions = file.clazz.expect("class").functions;
        let expr = match functions.remove(0).body.remove(0) {
            Stmt::Expr(stmt) => stmt.expr,
            other => panic!("expected expression statement, got {:?}", other),
        };
        match expr.kind {
            ExprKind::Assign(outer) => {
                assert!(matches!(outer.value.kind, ExprKind::Assign(_)));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn float_literals_and_wide_suffix() {
        assert!(matches!(
            first_expr("2.5").kind,
            ExprKind::Float { wide: false, .. }
        ));
        assert!(matches!(
            first_expr("2.5D").kind,
            ExprKind::Float { wide: true, .. }
        ));
    }

    #[test]
    fn string_escapes_are_processed() {
        match first_expr("\"a\\nb\"").kind {
            ExprKind::Str(s) => assert_eq!(s, "a\nb"),
            other => panic!("expected string, got {:?}", other),
        }
    }
}
