// src/frontend/parse_stmt.rs
//! Statement parsing.

use crate::frontend::ast::*;
use crate::frontend::{Parser, TokenKind};

impl Parser<'_> {
    pub(crate) fn parse_stmt(&mut self) -> Option<Stmt> {
        let token = self.peek()?;

        if token.is_word("return") {
            return self.parse_return();
        }
        if token.is_word("if") {
            return self.parse_if();
        }
        if token.is_word("for") {
            return self.parse_for();
        }
        if token.kind == TokenKind::LBrace {
            return self.parse_block_stmt();
        }

        // `[mut] name := expr` — a declaration; anything else is an
        // expression statement.
        let is_decl = (token.is_word("mut")
            && self.check_at(1, TokenKind::Identifier)
            && self.check_at(2, TokenKind::Define))
            || (token.kind == TokenKind::Identifier && self.check_at(1, TokenKind::Define));
        if is_decl {
            return self.parse_var_decl();
        }

        let expr = self.parse_expression()?;
        let span = expr.span;
        let id = self.node_id();
        Some(Stmt::Expr(ExprStmt { id, expr, span }))
    }

    fn parse_var_decl(&mut self) -> Option<Stmt> {
        let start = self.peek().map(|t| t.span).unwrap_or_default();
        let mutable = self.match_word("mut").is_some();
        let (name, _) = self.expect_name("variable name")?;
        self.expect(TokenKind::Define, "':=' in the declaration")?;
        let init = self.parse_expression()?;
        let span = start.extend(init.span);
        let id = self.node_id();
        Some(Stmt::VarDecl(VarDeclStmt {
            id,
            mutable,
            name,
            init,
            span,
        }))
    }

    fn parse_return(&mut self) -> Option<Stmt> {
        let token = self.advance().expect("peeked token");
        let value = if self.at_end() || self.check(TokenKind::RBrace) {
            None
        } else {
            self.parse_expression()
        };
        let span = value
            .as_ref()
            .map(|e| token.span.extend(e.span))
            .unwrap_or(token.span);
        let id = self.node_id();
        Some(Stmt::Return(ReturnStmt { id, value, span }))
    }

    fn parse_if(&mut self) -> Option<Stmt> {
        let token = self.advance().expect("peeked token");
        let condition = self.parse_expression()?;
        let then_branch = self.parse_stmt()?;
        let else_branch = if self.match_word("else").is_some() {
            self.parse_stmt()
        } else {
            None
        };
        let span = token.span.extend(
            else_branch
                .as_ref()
                .map(Stmt::span)
                .unwrap_or(then_branch.span()),
        );
        let id = self.node_id();
        Some(Stmt::If(Box::new(IfStmt {
            id,
            condition,
            then_branch,
            else_branch,
            span,
        })))
    }

    /// `for init; cond?; post body`
    fn parse_for(&mut self) -> Option<Stmt> {
        let token = self.advance().expect("peeked token");
        let init = self.parse_stmt()?;
        self.expect(TokenKind::Semicolon, "';' after the loop initializer");
        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            self.parse_expression()
        };
        self.expect(TokenKind::Semicolon, "';' after the loop condition");
        let post = self.parse_expression()?;
        let body = self.parse_stmt()?;
        let span = token.span.extend(body.span());
        let id = self.node_id();
        Some(Stmt::For(Box::new(ForStmt {
            id,
            init,
            condition,
            post,
            body,
            span,
        })))
    }

    fn parse_block_stmt(&mut self) -> Option<Stmt> {
        let token = self.advance().expect("peeked token");
        let mut statements = Vec::new();
        self.parse_statements_until_brace(&mut statements);
        let span = token.span.extend(self.last_span());
        let id = self.node_id();
        Some(Stmt::Block(BlockStmt {
            id,
            statements,
            span,
        }))
    }
}
