// src/sema/checker/expr.rs
//! Expression checking. Each check returns the node's semantic type and
//! records derived information (types, casts, slots, signatures, owners)
//! into the analysis side tables.

use crate::errors::SemaError;
use crate::frontend::ast::*;
use crate::frontend::{Span, TokenKind};
use crate::sema::checker::Checker;
use crate::sema::registry::{Lookup, Signature, CTOR_NAME};
use crate::sema::types::{ClassKey, Type};

impl Checker<'_> {
    pub(crate) fn check_expr(&mut self, expr: &Expr) -> Type {
        let ty = self.check_expr_inner(expr);
        self.analysis.record_type(expr.id, ty.clone());
        ty
    }

    fn check_expr_inner(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::Int(value) => Type::fit_integer(*value),
            ExprKind::Float { wide, .. } => {
                if *wide {
                    Type::F64
                } else {
                    Type::F32
                }
            }
            ExprKind::Char(_) => Type::Char,
            ExprKind::Str(_) => Type::Str,
            ExprKind::Bool(_) => Type::Bool,
            ExprKind::Null => Type::Null,
            ExprKind::SelfRef => {
                if self.scope.in_companion() {
                    self.reports.push(
                        SemaError::SelfInCompanion {
                            span: expr.span.into(),
                        },
                        Some(expr.span),
                    );
                    Type::Error
                } else {
                    self.analysis.record_slot(expr.id, 0);
                    Type::Class(self.current_class.clone())
                }
            }
            ExprKind::Paren(inner) => self.check_expr(inner),
            ExprKind::Identifier(ident) => self.check_identifier(expr.id, ident),
            ExprKind::Call(call) => self.check_call(expr.id, call),
            ExprKind::New(new) => self.check_new(expr.id, new, expr.span),
            ExprKind::Index(index) => self.check_index(index),
            ExprKind::Unary(unary) => self.check_unary(unary),
            ExprKind::Binary(binary) => self.check_binary(binary, expr.span),
            ExprKind::Assign(assign) => self.check_assign(assign, expr.span),
            ExprKind::ArrayLiteral(literal) => self.check_array_literal(literal, expr.span),
            ExprKind::ArrayDecl(decl) => self.check_array_decl(decl),
        }
    }

    /// Identifier resolution order: explicit owner, chain previous, then
    /// local variable → type name → current-class field.
    fn check_identifier(&mut self, id: NodeId, ident: &IdentifierExpr) -> Type {
        if let Some(owner_ref) = &ident.owner {
            let Some(owner) = self.resolve_owner(owner_ref) else {
                self.report_unknown_owner(owner_ref);
                return Type::Error;
            };
            return self.companion_field_access(id, &owner, ident.name, ident.name_span);
        }

        if let Some(previous) = &ident.previous {
            let previous_ty = self.check_expr(previous);
            return match previous_ty {
                Type::Class(owner) => {
                    if self.analysis.is_companion_target(previous.id) {
                        self.companion_field_access(id, &owner, ident.name, ident.name_span)
                    } else {
                        self.instance_field_access(id, &owner, ident.name, ident.name_span)
                    }
                }
                Type::Error => Type::Error,
                other => {
                    self.reports.push(
                        SemaError::NotAClass {
                            name: other.to_string(),
                            span: previous.span.into(),
                        },
                        Some(previous.span),
                    );
                    Type::Error
                }
            };
        }

        // Bare name: local variable first.
        if let Some(variable) = self.scope.lookup(ident.name) {
            let (ty, slot) = (variable.ty.clone(), variable.slot);
            self.analysis.record_slot(id, slot);
            return ty;
        }

        // Then a type name, making this a companion target for the chain.
        if let Some(key) = self.usages.get(&ident.name).cloned() {
            self.analysis.mark_companion_target(id);
            return Type::Class(key);
        }

        // Then a field of the current class.
        let current = self.current_class.clone();
        if self
            .registry
            .find_field(&current, self.interner.resolve(ident.name))
            .is_some()
        {
            return self.own_field_access(id, ident.name, ident.name_span);
        }

        let name = self.interner.resolve(ident.name).to_string();
        self.reports.push(
            SemaError::UnknownIdentifier {
                name,
                span: ident.name_span.into(),
            },
            Some(ident.name_span),
        );
        Type::Error
    }

    /// `Owner::field` — the field must be a companion member.
    fn companion_field_access(
        &mut self,
        id: NodeId,
        owner: &ClassKey,
        name: Symbol,
        span: Span,
    ) -> Type {
        let text = self.interner.resolve(name).to_string();
        let Some(field) = self.registry.find_field(owner, &text).cloned() else {
            self.reports.push(
                SemaError::UnknownField {
                    name: text,
                    owner: owner.to_string(),
                    span: span.into(),
                },
                Some(span),
            );
            return Type::Error;
        };
        if !field.companion {
            self.reports.push(
                SemaError::NotCompanionField {
                    name: text,
                    owner: owner.to_string(),
                    span: span.into(),
                },
                Some(span),
            );
        } else {
            self.analysis.mark_companion_field(id);
        }
        self.analysis.record_owner(id, owner.clone());
        field.ty
    }

    /// `expr.field` — instance access through a value of class type.
    fn instance_field_access(
        &mut self,
        id: NodeId,
        owner: &ClassKey,
        name: Symbol,
        span: Span,
    ) -> Type {
        let text = self.interner.resolve(name).to_string();
        let Some(field) = self.registry.find_field(owner, &text).cloned() else {
            self.reports.push(
                SemaError::UnknownField {
                    name: text,
                    owner: owner.to_string(),
                    span: span.into(),
                },
                Some(span),
            );
            return Type::Error;
        };
        if field.companion {
            self.analysis.mark_companion_field(id);
        }
        self.analysis.record_owner(id, owner.clone());
        field.ty
    }

    /// A bare name that resolved to a field of the current class. Inside a
    /// companion scope only companion fields are reachable.
    fn own_field_access(&mut self, id: NodeId, name: Symbol, span: Span) -> Type {
        let owner = self.current_class.clone();
        let text = self.interner.resolve(name).to_string();
        let Some(field) = self.registry.find_field(&owner, &text).cloned() else {
            self.internal_error("field vanished between lookup and access", span);
            return Type::Error;
        };
        if self.scope.in_companion() && !field.companion {
            self.reports.push(
                SemaError::NotCompanionField {
                    name: text,
                    owner: owner.to_string(),
                    span: span.into(),
                },
                Some(span),
            );
        }
        if field.companion {
            self.analysis.mark_companion_field(id);
        }
        self.analysis.record_owner(id, owner);
        field.ty
    }

    fn check_call(&mut self, id: NodeId, call: &CallExpr) -> Type {
        let arg_types: Vec<Type> = call.args.iter().map(|a| self.check_expr(a)).collect();

        // Resolve the owner class and whether the call is companion-form.
        let (owner, companion_call, bare) = if let Some(owner_ref) = &call.owner {
            match self.resolve_owner(owner_ref) {
                Some(owner) => (owner, true, false),
                None => {
                    self.report_unknown_owner(owner_ref);
                    return Type::Error;
                }
            }
        } else if let Some(previous) = &call.previous {
            match self.check_expr(previous) {
                Type::Class(owner) => {
                    let companion = self.analysis.is_companion_target(previous.id);
                    (owner, companion, false)
                }
                Type::Error => return Type::Error,
                other => {
                    self.reports.push(
                        SemaError::NotAClass {
                            name: other.to_string(),
                            span: previous.span.into(),
                        },
                        Some(previous.span),
                    );
                    return Type::Error;
                }
            }
        } else {
            (self.current_class.clone(), false, true)
        };

        let name = self.interner.resolve(call.name).to_string();
        let lookup = match self.registry.find_function(&owner, &name, &arg_types) {
            Lookup::Found(signature) => Ok(signature.clone()),
            Lookup::Ambiguous => Err(true),
            Lookup::Missing => Err(false),
        };
        let signature = match lookup {
            Ok(signature) => signature,
            Err(ambiguous) => {
                let error = if ambiguous {
                    SemaError::AmbiguousCall {
                        name,
                        span: call.name_span.into(),
                    }
                } else {
                    SemaError::UnknownFunction {
                        name,
                        owner: owner.to_string(),
                        span: call.name_span.into(),
                    }
                };
                self.reports.push(error, Some(call.name_span));
                return Type::Error;
            }
        };

        // A call reached through a type rather than an instance needs a
        // companion target; a bare call inside a companion scope does too.
        if companion_call && !signature.companion {
            self.reports.push(
                SemaError::NotCompanionFunction {
                    name: signature.name.clone(),
                    span: call.name_span.into(),
                },
                Some(call.name_span),
            );
        } else if bare && self.scope.in_companion() && !signature.companion {
            self.reports.push(
                SemaError::NotCompanionFunction {
                    name: signature.name.clone(),
                    span: call.name_span.into(),
                },
                Some(call.name_span),
            );
        }
        if companion_call {
            self.analysis.mark_companion_call(id);
        }

        self.record_argument_casts(&call.args, &arg_types, &signature);
        let ret = signature.ret.clone();
        self.analysis.record_signature(id, signature);
        ret
    }

    fn check_new(&mut self, id: NodeId, new: &NewExpr, span: Span) -> Type {
        let Some(owner) = self.resolve_owner(&new.class_ref) else {
            self.report_unknown_owner(&new.class_ref);
            return Type::Error;
        };
        let arg_types: Vec<Type> = new.args.iter().map(|a| self.check_expr(a)).collect();

        let lookup = match self.registry.find_function(&owner, CTOR_NAME, &arg_types) {
            Lookup::Found(signature) => Some(signature.clone()),
            Lookup::Ambiguous | Lookup::Missing => None,
        };
        match lookup {
            Some(signature) => {
                self.record_argument_casts(&new.args, &arg_types, &signature);
                self.analysis.record_signature(id, signature);
                Type::Class(owner)
            }
            None => {
                self.reports.push(
                    SemaError::NoMatchingConstructor {
                        owner: owner.to_string(),
                        span: span.into(),
                    },
                    Some(span),
                );
                Type::Error
            }
        }
    }

    fn record_argument_casts(&mut self, args: &[Expr], arg_types: &[Type], signature: &Signature) {
        for ((arg, arg_ty), param) in args.iter().zip(arg_types).zip(signature.params.iter()) {
            if arg_ty != param && arg_ty.can_cast(param) {
                self.analysis.record_cast(arg.id, param.clone());
            }
        }
    }

    fn check_index(&mut self, index: &IndexExpr) -> Type {
        let previous_ty = self.check_expr(&index.previous);
        let element = match previous_ty {
            Type::Array(element) => *element,
            Type::Error => Type::Error,
            other => {
                self.reports.push(
                    SemaError::NotAnArray {
                        found: other.to_string(),
                        span: index.previous.span.into(),
                    },
                    Some(index.previous.span),
                );
                Type::Error
            }
        };

        let index_ty = self.check_expr(&index.index);
        if index_ty.can_cast(&Type::I32) && index_ty.is_numeric() || index_ty == Type::Error {
            self.analysis.record_cast(index.index.id, Type::I32);
        } else {
            self.reports.push(
                SemaError::TypeMismatch {
                    expected: Type::I32.to_string(),
                    found: index_ty.to_string(),
                    span: index.index.span.into(),
                },
                Some(index.index.span),
            );
        }

        element
    }

    fn check_unary(&mut self, unary: &UnaryExpr) -> Type {
        let operand_ty = self.check_expr(&unary.operand);
        if operand_ty == Type::Error {
            return Type::Error;
        }
        match unary.op {
            UnaryOp::Plus | UnaryOp::Neg | UnaryOp::Inc | UnaryOp::Dec => {
                if operand_ty.is_numeric() {
                    operand_ty
                } else {
                    self.reports.push(
                        SemaError::NotNumeric {
                            op: unary.op.as_str().to_string(),
                            found: operand_ty.to_string(),
                            span: unary.operand.span.into(),
                        },
                        Some(unary.operand.span),
                    );
                    Type::Error
                }
            }
            UnaryOp::BitNot => {
                if operand_ty.is_integer() {
                    operand_ty
                } else {
                    self.reports.push(
                        SemaError::NotInteger {
                            op: unary.op.as_str().to_string(),
                            found: operand_ty.to_string(),
                            span: unary.operand.span.into(),
                        },
                        Some(unary.operand.span),
                    );
                    Type::Error
                }
            }
            UnaryOp::Not => {
                if operand_ty == Type::Bool {
                    Type::Bool
                } else {
                    self.reports.push(
                        SemaError::TypeMismatch {
                            expected: Type::Bool.to_string(),
                            found: operand_ty.to_string(),
                            span: unary.operand.span.into(),
                        },
                        Some(unary.operand.span),
                    );
                    Type::Error
                }
            }
        }
    }

    fn check_binary(&mut self, binary: &BinaryExpr, span: Span) -> Type {
        let left_ty = self.check_expr(&binary.left);
        let right_ty = self.check_expr(&binary.right);
        if left_ty == Type::Error || right_ty == Type::Error {
            return Type::Error;
        }
        let op = binary.op;

        if op.is_logical() {
            for (side, ty) in [(&binary.left, &left_ty), (&binary.right, &right_ty)] {
                if *ty != Type::Bool {
                    self.reports.push(
                        SemaError::TypeMismatch {
                            expected: Type::Bool.to_string(),
                            found: ty.to_string(),
                            span: side.span.into(),
                        },
                        Some(side.span),
                    );
                }
            }
            return Type::Bool;
        }

        if op.is_equality() {
            return self.check_equality(binary, &left_ty, &right_ty, span);
        }

        if op.is_relational() || op.is_arithmetic() {
            let mut failed = false;
            for (side, ty) in [(&binary.left, &left_ty), (&binary.right, &right_ty)] {
                if !ty.is_numeric() {
                    self.reports.push(
                        SemaError::NotNumeric {
                            op: op.as_str().to_string(),
                            found: ty.to_string(),
                            span: side.span.into(),
                        },
                        Some(side.span),
                    );
                    failed = true;
                }
            }
            if failed {
                return Type::Error;
            }
            let target = Type::arith_promote(&left_ty, &right_ty);
            self.analysis.record_cast(binary.left.id, target.clone());
            self.analysis.record_cast(binary.right.id, target.clone());
            return if op.is_relational() { Type::Bool } else { target };
        }

        // Bitwise and shifts: integers only.
        let mut failed = false;
        for (side, ty) in [(&binary.left, &left_ty), (&binary.right, &right_ty)] {
            if !ty.is_integer() {
                self.reports.push(
                    SemaError::NotInteger {
                        op: op.as_str().to_string(),
                        found: ty.to_string(),
                        span: side.span.into(),
                    },
                    Some(side.span),
                );
                failed = true;
            }
        }
        if failed {
            return Type::Error;
        }
        let target = Type::arith_promote(&left_ty, &right_ty);
        self.analysis.record_cast(binary.left.id, target.clone());
        self.analysis.record_cast(binary.right.id, target.clone());
        target
    }

    /// `==`/`!=`: any matching pair; `null` only against reference types.
    fn check_equality(
        &mut self,
        binary: &BinaryExpr,
        left_ty: &Type,
        right_ty: &Type,
        span: Span,
    ) -> Type {
        if *left_ty == Type::Null || *right_ty == Type::Null {
            let (other, other_expr) = if *left_ty == Type::Null {
                (right_ty, &binary.right)
            } else {
                (left_ty, &binary.left)
            };
            if !other.is_reference() {
                self.reports.push(
                    SemaError::NullComparison {
                        found: other.to_string(),
                        span: other_expr.span.into(),
                    },
                    Some(other_expr.span),
                );
            }
            return Type::Bool;
        }

        if left_ty.is_numeric() && right_ty.is_numeric() {
            let target = Type::arith_promote(left_ty, right_ty);
            self.analysis.record_cast(binary.left.id, target.clone());
            self.analysis.record_cast(binary.right.id, target);
            return Type::Bool;
        }

        if left_ty != right_ty {
            self.reports.push(
                SemaError::TypeMismatch {
                    expected: left_ty.to_string(),
                    found: right_ty.to_string(),
                    span: span.into(),
                },
                Some(span),
            );
        }
        Type::Bool
    }

    /// Assignment: the target must be a variable, a mutable field, or an
    /// index expression. The value must coerce to the target's type.
    fn check_assign(&mut self, assign: &AssignExpr, span: Span) -> Type {
        debug_assert_eq!(assign.op, TokenKind::Assign);
        match &assign.target.kind {
            ExprKind::Identifier(ident) => self.check_assign_identifier(assign, ident),
            ExprKind::Index(_) => {
                let target_ty = self.check_expr(&assign.target);
                self.analysis.mark_assigned_index(assign.target.id);
                self.check_assigned_value(&assign.value, &target_ty);
                target_ty
            }
            _ => {
                self.reports.push(
                    SemaError::AssignTarget { span: span.into() },
                    Some(span),
                );
                self.check_expr(&assign.value);
                Type::Error
            }
        }
    }

    fn check_assign_identifier(&mut self, assign: &AssignExpr, ident: &IdentifierExpr) -> Type {
        let target = &assign.target;

        // A bare name that is a local variable.
        if ident.owner.is_none() && ident.previous.is_none() {
            if let Some(variable) = self.scope.lookup(ident.name) {
                let (var_ty, slot, mutable) = (variable.ty.clone(), variable.slot, variable.mutable);
                self.analysis.record_type(target.id, var_ty.clone());
                self.analysis.record_slot(target.id, slot);
                if !mutable {
                    let name = self.interner.resolve(ident.name).to_string();
                    self.reports.push(
                        SemaError::ImmutableVariable {
                            name,
                            span: ident.name_span.into(),
                        },
                        Some(ident.name_span),
                    );
                }
                let value_ty = self.check_expr(&assign.value);
                // Assigning null to a variable whose type never resolved
                // refines it to the null type.
                if value_ty == Type::Null && var_ty == Type::Error {
                    self.scope.retype(ident.name, Type::Null);
                    return Type::Null;
                }
                if value_ty.can_cast(&var_ty) {
                    if value_ty != var_ty && var_ty != Type::Error {
                        self.analysis.record_cast(assign.value.id, var_ty.clone());
                    }
                } else {
                    self.reports.push(
                        SemaError::TypeMismatch {
                            expected: var_ty.to_string(),
                            found: value_ty.to_string(),
                            span: assign.value.span.into(),
                        },
                        Some(assign.value.span),
                    );
                }
                return var_ty;
            }
        }

        // Otherwise the target is a field access; resolve it normally, then
        // enforce field mutability and ownership.
        let target_ty = self.check_expr(target);
        if let Some(owner) = self.analysis.owner_of(target.id).cloned() {
            let text = self.interner.resolve(ident.name).to_string();
            if let Some(field) = self.registry.find_field(&owner, &text).cloned() {
                if !field.mutable {
                    self.reports.push(
                        SemaError::ImmutableField {
                            name: text.clone(),
                            span: ident.name_span.into(),
                        },
                        Some(ident.name_span),
                    );
                }
                if !field.companion && owner != self.current_class {
                    self.reports.push(
                        SemaError::ForeignFieldAssignment {
                            name: text,
                            owner: owner.to_string(),
                            span: ident.name_span.into(),
                        },
                        Some(ident.name_span),
                    );
                }
            }
        }
        self.check_assigned_value(&assign.value, &target_ty);
        target_ty
    }

    fn check_assigned_value(&mut self, value: &Expr, target_ty: &Type) {
        let value_ty = self.check_expr(value);
        if value_ty.can_cast(target_ty) {
            if &value_ty != target_ty && *target_ty != Type::Error {
                self.analysis.record_cast(value.id, target_ty.clone());
            }
        } else {
            self.reports.push(
                SemaError::TypeMismatch {
                    expected: target_ty.to_string(),
                    found: value_ty.to_string(),
                    span: value.span.into(),
                },
                Some(value.span),
            );
        }
    }
}
