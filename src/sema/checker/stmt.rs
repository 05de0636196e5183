// src/sema/checker/stmt.rs
//! Statement checking.

use crate::errors::SemaError;
use crate::frontend::ast::*;
use crate::sema::checker::Checker;
use crate::sema::types::Type;

impl Checker<'_> {
    pub(crate) fn check_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.check_stmt(stmt);
        }
    }

    pub(crate) fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl(decl) => self.check_var_decl(decl),
            Stmt::Expr(stmt) => {
                self.check_expr(&stmt.expr);
                self.analysis.mark_discarded(stmt.expr.id);
                if !expression_has_effect(&stmt.expr) {
                    self.reports.push(
                        SemaError::UnusedExpression {
                            span: stmt.span.into(),
                        },
                        Some(stmt.span),
                    );
                }
            }
            Stmt::Return(ret) => self.check_return(ret),
            Stmt::If(stmt) => {
                self.check_condition(&stmt.condition);
                self.check_branch(&stmt.then_branch);
                if let Some(else_branch) = &stmt.else_branch {
                    self.check_branch(else_branch);
                }
            }
            Stmt::For(stmt) => {
                // One scope wraps header locals and the body.
                self.scope.enter();
                self.check_stmt(&stmt.init);
                if let Some(condition) = &stmt.condition {
                    self.check_condition(condition);
                }
                self.check_expr(&stmt.post);
                match &stmt.body {
                    Stmt::Block(block) => self.check_stmts(&block.statements),
                    other => self.check_stmt(other),
                }
                self.scope.exit();
            }
            Stmt::Block(block) => {
                self.scope.enter();
                self.check_stmts(&block.statements);
                self.scope.exit();
            }
        }
    }

    fn check_var_decl(&mut self, decl: &VarDeclStmt) {
        let init_ty = self.check_expr(&decl.init);
        let var_ty = if init_ty == Type::Unit {
            let name = self.interner.resolve(decl.name).to_string();
            self.reports.push(
                SemaError::UnitVariable {
                    name,
                    span: decl.init.span.into(),
                },
                Some(decl.init.span),
            );
            Type::Error
        } else {
            init_ty
        };

        match self.scope.declare(decl.name, decl.mutable, var_ty) {
            Some(slot) => self.analysis.record_slot(decl.id, slot),
            None => {
                let name = self.interner.resolve(decl.name).to_string();
                self.reports.push(
                    SemaError::DuplicateVariable {
                        name,
                        span: decl.span.into(),
                    },
                    Some(decl.span),
                );
            }
        }
    }

    fn check_return(&mut self, ret: &ReturnStmt) {
        let expected = self.current_return.clone();
        match &ret.value {
            Some(value) => {
                let found = self.check_expr(value);
                if found.can_cast(&expected) {
                    if found != expected {
                        self.analysis.record_cast(value.id, expected.clone());
                    }
                } else {
                    self.reports.push(
                        SemaError::TypeMismatch {
                            expected: expected.to_string(),
                            found: found.to_string(),
                            span: value.span.into(),
                        },
                        Some(value.span),
                    );
                }
            }
            None => {
                if expected != Type::Unit && expected != Type::Error {
                    self.reports.push(
                        SemaError::TypeMismatch {
                            expected: expected.to_string(),
                            found: Type::Unit.to_string(),
                            span: ret.span.into(),
                        },
                        Some(ret.span),
                    );
                }
            }
        }
        self.analysis.record_return_type(ret.id, expected);
    }

    /// A branch runs in its own sub-scope. Block branches open exactly one.
    fn check_branch(&mut self, stmt: &Stmt) {
        self.scope.enter();
        match stmt {
            Stmt::Block(block) => self.check_stmts(&block.statements),
            other => self.check_stmt(other),
        }
        self.scope.exit();
    }

    pub(crate) fn check_condition(&mut self, condition: &Expr) {
        let ty = self.check_expr(condition);
        if ty.can_cast(&Type::Bool) {
            self.analysis.record_cast(condition.id, Type::Bool);
        } else {
            self.reports.push(
                SemaError::ConditionNotBool {
                    found: ty.to_string(),
                    span: condition.span.into(),
                },
                Some(condition.span),
            );
        }
    }
}

/// Expression statements keep their value drop silent only for forms with a
/// side effect: assignments, calls, constructor calls, increment/decrement.
fn expression_has_effect(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Assign(_) | ExprKind::Call(_) | ExprKind::New(_) => true,
        ExprKind::Unary(unary) => matches!(unary.op, UnaryOp::Inc | UnaryOp::Dec),
        ExprKind::Paren(inner) => expression_has_effect(inner),
        _ => false,
    }
}
