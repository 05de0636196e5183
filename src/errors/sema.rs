// src/errors/sema.rs
//! Semantic analysis errors (E2xxx) and checker warnings (W32xx, W39xx).

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SemaError {
    #[error("unknown type symbol '{name}'")]
    #[diagnostic(code(E2001))]
    UnknownType {
        name: String,
        #[label("cannot resolve this type")]
        span: SourceSpan,
    },

    #[error("unknown identifier '{name}'")]
    #[diagnostic(code(E2002))]
    UnknownIdentifier {
        name: String,
        #[label("not found in scope")]
        span: SourceSpan,
    },

    #[error("type mismatch: expected {expected}, found {found}")]
    #[diagnostic(code(E2003))]
    TypeMismatch {
        expected: String,
        found: String,
        #[label("type mismatch")]
        span: SourceSpan,
    },

    #[error("operator '{op}' requires a numeric operand, found {found}")]
    #[diagnostic(code(E2004))]
    NotNumeric {
        op: String,
        found: String,
        #[label("not numeric")]
        span: SourceSpan,
    },

    #[error("operator '{op}' requires an integer operand, found {found}")]
    #[diagnostic(code(E2005))]
    NotInteger {
        op: String,
        found: String,
        #[label("not an integer")]
        span: SourceSpan,
    },

    #[error("condition must be convertible to bool, found {found}")]
    #[diagnostic(code(E2006))]
    ConditionNotBool {
        found: String,
        #[label("expected bool")]
        span: SourceSpan,
    },

    #[error("cannot index a value of type {found}")]
    #[diagnostic(code(E2007))]
    NotAnArray {
        found: String,
        #[label("not an array")]
        span: SourceSpan,
    },

    #[error("array dimension mismatch: expected depth {expected}, found depth {found}")]
    #[diagnostic(code(E2008))]
    DimensionMismatch {
        expected: usize,
        found: usize,
        #[label("wrong number of dimensions")]
        span: SourceSpan,
    },

    #[error("variable '{name}' is not mutable")]
    #[diagnostic(code(E2009), help("declare it with 'mut' to allow assignment"))]
    ImmutableVariable {
        name: String,
        #[label("cannot assign")]
        span: SourceSpan,
    },

    #[error("field '{name}' is not mutable")]
    #[diagnostic(code(E2010), help("move the field under a 'mut' access block"))]
    ImmutableField {
        name: String,
        #[label("cannot assign")]
        span: SourceSpan,
    },

    #[error("cannot assign to field '{name}' of class {owner} from outside that class")]
    #[diagnostic(code(E2011))]
    ForeignFieldAssignment {
        name: String,
        owner: String,
        #[label("assignment rejected")]
        span: SourceSpan,
    },

    #[error("cannot assign to non-variable")]
    #[diagnostic(code(E2012))]
    AssignTarget {
        #[label("not assignable")]
        span: SourceSpan,
    },

    #[error("'{name}' is not a companion field of {owner}")]
    #[diagnostic(code(E2013), help("companion access requires a companion field"))]
    NotCompanionField {
        name: String,
        owner: String,
        #[label("instance field accessed without an instance")]
        span: SourceSpan,
    },

    #[error("cannot call non-companion function '{name}' from a companion context")]
    #[diagnostic(
        code(E2014),
        help("move the declaration of '{name}' into the companion block, or call it on an instance")
    )]
    NotCompanionFunction {
        name: String,
        #[label("requires an instance")]
        span: SourceSpan,
    },

    #[error("'self' is not available in a companion context")]
    #[diagnostic(code(E2015))]
    SelfInCompanion {
        #[label("no instance here")]
        span: SourceSpan,
    },

    #[error("no function '{name}' on {owner} matches the given arguments")]
    #[diagnostic(code(E2016))]
    UnknownFunction {
        name: String,
        owner: String,
        #[label("no matching signature")]
        span: SourceSpan,
    },

    #[error("call to '{name}' is ambiguous")]
    #[diagnostic(code(E2017), help("add casts to pick one of the matching overloads"))]
    AmbiguousCall {
        name: String,
        #[label("more than one overload matches")]
        span: SourceSpan,
    },

    #[error("unknown field '{name}' on {owner}")]
    #[diagnostic(code(E2018))]
    UnknownField {
        name: String,
        owner: String,
        #[label("no such field")]
        span: SourceSpan,
    },

    #[error("duplicate field '{name}'")]
    #[diagnostic(code(E2019))]
    DuplicateField {
        name: String,
        #[label("already declared in this class")]
        span: SourceSpan,
    },

    #[error("duplicate function '{name}' with the same parameter types")]
    #[diagnostic(code(E2020))]
    DuplicateFunction {
        name: String,
        #[label("already declared in this class")]
        span: SourceSpan,
    },

    #[error("duplicate constructor with the same parameter types")]
    #[diagnostic(code(E2021))]
    DuplicateConstructor {
        #[label("already declared in this class")]
        span: SourceSpan,
    },

    #[error("duplicate parameter '{name}'")]
    #[diagnostic(code(E2022))]
    DuplicateParameter {
        name: String,
        #[label("parameter name reused")]
        span: SourceSpan,
    },

    #[error("cannot bind '{name}' to a value of type unit")]
    #[diagnostic(code(E2023))]
    UnitVariable {
        name: String,
        #[label("initializer produces no value")]
        span: SourceSpan,
    },

    #[error("cannot compare {found} against null")]
    #[diagnostic(
        code(E2024),
        help("a primitive value can never be null; compare reference types only")
    )]
    NullComparison {
        found: String,
        #[label("primitive compared to null")]
        span: SourceSpan,
    },

    #[error("no constructor of {owner} matches the given arguments")]
    #[diagnostic(code(E2025))]
    NoMatchingConstructor {
        owner: String,
        #[label("no matching constructor")]
        span: SourceSpan,
    },

    #[error("variable '{name}' is already declared in this scope")]
    #[diagnostic(code(E2026))]
    DuplicateVariable {
        name: String,
        #[label("redeclared here")]
        span: SourceSpan,
    },

    #[error("cannot infer the type of an empty array literal")]
    #[diagnostic(code(E2027), help("give the array an element type: 'i32:[]{{}}'"))]
    EmptyArrayLiteral {
        #[label("no elements to infer from")]
        span: SourceSpan,
    },

    #[error("a value of type {name} has no members")]
    #[diagnostic(code(E2028))]
    NotAClass {
        name: String,
        #[label("not a class value")]
        span: SourceSpan,
    },

    #[error("unused expression")]
    #[diagnostic(
        code(W3201),
        severity(Warning),
        help("the value of this expression is discarded")
    )]
    UnusedExpression {
        #[label("result is never used")]
        span: SourceSpan,
    },

    #[error("internal compiler error: {detail}")]
    #[diagnostic(code(W3901), severity(Warning))]
    Internal {
        detail: String,
        #[label("while checking this")]
        span: SourceSpan,
    },
}
