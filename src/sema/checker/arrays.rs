// src/sema/checker/arrays.rs
//! Array literal inference and sized array declarations.
//!
//! Inferred literals seed the element type from the first element and
//! refine left to right; nested literals must agree on dimension depth and
//! unify their foundation (leaf) types. The final foundation is propagated
//! back down so every scalar leaf carries its cast target and every
//! intermediate literal its rebuilt array type.

use crate::errors::SemaError;
use crate::frontend::ast::*;
use crate::frontend::Span;
use crate::sema::checker::Checker;
use crate::sema::types::Type;

impl Checker<'_> {
    pub(crate) fn check_array_literal(&mut self, literal: &ArrayLiteralExpr, span: Span) -> Type {
        if let Some(declared) = &literal.declared {
            let element_ty = self.resolve_type_ref_or_report(declared);
            for element in &literal.elements {
                let found = self.check_expr(element);
                if found.can_cast(&element_ty) {
                    if found != element_ty && element_ty != Type::Error {
                        self.analysis.record_cast(element.id, element_ty.clone());
                    }
                } else {
                    self.reports.push(
                        SemaError::TypeMismatch {
                            expected: element_ty.to_string(),
                            found: found.to_string(),
                            span: element.span.into(),
                        },
                        Some(element.span),
                    );
                }
            }
            return Type::array(element_ty);
        }

        if literal.elements.is_empty() {
            self.reports.push(
                SemaError::EmptyArrayLiteral { span: span.into() },
                Some(span),
            );
            return Type::array(Type::Error);
        }

        // Inferred: seed from the first element, refine left to right.
        let mut element_ty = self.check_expr(&literal.elements[0]);
        for element in &literal.elements[1..] {
            let found = self.check_expr(element);
            element_ty = self.unify_element(element_ty, found, element);
        }

        for element in &literal.elements {
            self.propagate_element_type(element, &element_ty);
        }
        Type::array(element_ty)
    }

    /// Fold one element type into the running element type.
    fn unify_element(&mut self, seed: Type, found: Type, element: &Expr) -> Type {
        if seed == Type::Error {
            return found;
        }
        if found == Type::Error || seed == found {
            return seed;
        }
        if seed.is_numeric() && found.is_numeric() {
            return Type::promote(&seed, &found);
        }

        if let (Type::Array(_), Type::Array(_)) = (&seed, &found) {
            if seed.array_depth() != found.array_depth() {
                self.reports.push(
                    SemaError::DimensionMismatch {
                        expected: seed.array_depth(),
                        found: found.array_depth(),
                        span: element.span.into(),
                    },
                    Some(element.span),
                );
                return seed;
            }
            let seed_foundation = self.unbox(seed.foundation().clone());
            let found_foundation = self.unbox(found.foundation().clone());
            if seed_foundation == found_foundation {
                return seed.with_foundation(seed_foundation);
            }
            if seed_foundation.is_numeric() && found_foundation.is_numeric() {
                let unified = Type::promote(&seed_foundation, &found_foundation);
                return seed.with_foundation(unified);
            }
            self.reports.push(
                SemaError::TypeMismatch {
                    expected: seed_foundation.to_string(),
                    found: found_foundation.to_string(),
                    span: element.span.into(),
                },
                Some(element.span),
            );
            return seed;
        }

        self.reports.push(
            SemaError::TypeMismatch {
                expected: seed.to_string(),
                found: found.to_string(),
                span: element.span.into(),
            },
            Some(element.span),
        );
        seed
    }

    /// A class registered as the boxed form of a primitive unboxes during
    /// foundation unification.
    fn unbox(&self, ty: Type) -> Type {
        if let Type::Class(key) = &ty {
            if let Some(info) = self.registry.get(key) {
                if let Some(primitive) = &info.boxes {
                    return primitive.clone();
                }
            }
        }
        ty
    }

    /// Push the unified element type back down: nested literals get their
    /// rebuilt array type, scalar leaves a cast target where they widen.
    fn propagate_element_type(&mut self, element: &Expr, target: &Type) {
        if let ExprKind::ArrayLiteral(inner) = &element.kind {
            if let Type::Array(inner_target) = target {
                self.analysis.record_type(element.id, target.clone());
                for nested in &inner.elements {
                    self.propagate_element_type(nested, inner_target);
                }
                return;
            }
        }
        let current = self.analysis.type_of(element.id).cloned();
        if let Some(current) = current {
            if &current != target && current.can_cast(target) && !matches!(target, Type::Error) {
                self.analysis.record_cast(element.id, target.clone());
            }
        }
    }

    /// `T:[d1][d2]{}` — every dimension extent must convert to `i32`.
    pub(crate) fn check_array_decl(&mut self, decl: &ArrayDeclExpr) -> Type {
        let base = self.resolve_type_ref_or_report(&decl.base);
        for dim in &decl.dims {
            let found = self.check_expr(dim);
            if found.can_cast(&Type::I32) && found.is_numeric() || found == Type::Error {
                self.analysis.record_cast(dim.id, Type::I32);
            } else {
                self.reports.push(
                    SemaError::TypeMismatch {
                        expected: Type::I32.to_string(),
                        found: found.to_string(),
                        span: dim.span.into(),
                    },
                    Some(dim.span),
                );
            }
        }
        let mut ty = base;
        for _ in 0..decl.dims.len() {
            ty = Type::array(ty);
        }
        ty
    }
}
