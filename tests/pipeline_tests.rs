// tests/pipeline_tests.rs
//! End-to-end scenarios: source text through the whole pipeline, asserting
//! on the reports and the recorded analysis.

use marten::frontend::ast::*;
use marten::sema::types::Type;
use marten::{compile_source, Compilation};

fn compile(src: &str) -> Compilation {
    compile_source("scenario.mar", src)
}

fn assert_clean(c: &Compilation) {
    assert_eq!(c.reports.error_count(), 0, "{:?}", c.reports.messages());
}

#[test]
fn package_usages_and_empty_class() {
    let c = compile("mod a.b use c::{D, E as F} class G");
    assert!(c.reports.is_empty(), "{:?}", c.reports.messages());
    assert!(c.succeeded());

    let clazz = c.file.clazz.as_ref().expect("class");
    assert_eq!(clazz.qualified_name(&c.interner), "a/b/G");
    assert_eq!(clazz.usages.len(), 2);
    assert_eq!(clazz.usages[0].reference.qualified(&c.interner), "c/D");
    assert_eq!(clazz.usages[1].reference.qualified(&c.interner), "c/E");
    assert_eq!(
        clazz.usages[1]
            .alias
            .map(|a| c.interner.resolve(a).to_string())
            .as_deref(),
        Some("F")
    );
    assert!(clazz.fields.is_empty());
    assert!(clazz.constructors.is_empty());
    assert!(clazz.functions.is_empty());
}

#[test]
fn field_blocks_carry_access_and_mutability() {
    let c = compile("class X { pub: a: i32, mut priv: b: i64 }");
    assert_eq!(c.reports.error_count(), 0, "{:?}", c.reports.messages());

    let clazz = c.file.clazz.as_ref().expect("class");
    let a = &clazz.fields[0];
    assert_eq!(c.interner.resolve(a.name), "a");
    assert_eq!(a.accessor, Accessor::Pub);
    assert!(!a.mutable);
    let b = &clazz.fields[1];
    assert_eq!(c.interner.resolve(b.name), "b");
    assert_eq!(b.accessor, Accessor::Priv);
    assert!(b.mutable);
}

#[test]
fn checked_binary_addition_promotes_to_the_return_type() {
    let c = compile("class X impl X { fn f(): i32 { return 1 + 2 } }");
    assert_clean(&c);

    let f = &c.file.clazz.as_ref().expect("class").functions[0];
    let Stmt::Return(ret) = &f.body[0] else {
        panic!("expected return");
    };
    let value = ret.value.as_ref().expect("value");
    let ExprKind::Binary(bin) = &value.kind else {
        panic!("expected binary");
    };
    assert_eq!(c.analysis.cast_of(bin.left.id), Some(&Type::I32));
    assert_eq!(c.analysis.cast_of(bin.right.id), Some(&Type::I32));
    assert_eq!(c.analysis.type_of(value.id), Some(&Type::I32));
}

#[test]
fn immutable_variable_assignment_is_a_single_error() {
    let c = compile("class X impl X { fn f() { x := 1 x = 2 } }");
    assert_eq!(c.reports.error_count(), 1, "{:?}", c.reports.messages());
    assert!(c.reports.messages()[0].contains("'x' is not mutable"));
}

#[test]
fn mixed_bool_and_int_array_literal() {
    let c = compile("class X impl X { fn f() { a := :[true, 1] } }");
    assert_eq!(c.reports.error_count(), 1, "{:?}", c.reports.messages());
    assert!(c.reports.messages()[0].contains("expected bool, found i8"));
}

#[test]
fn companion_calling_instance_function_carries_a_hint() {
    let src = "impl X { comp { fn g() { h() } } fn h() {} }";
    let c = compile(&format!("class X {}", src));
    assert_eq!(c.reports.error_count(), 1, "{:?}", c.reports.messages());
    assert!(c.reports.messages()[0].contains("non-companion function 'h'"));
}

#[test]
fn array_literal_index_assignment_is_clean() {
    let c = compile("class X impl X { fn f() { a := :{1, 2, 3} a[1] = 5 } }");
    assert!(c.succeeded(), "{:?}", c.reports.messages());

    let f = &c.file.clazz.as_ref().expect("class").functions[0];
    let Stmt::VarDecl(decl) = &f.body[0] else {
        panic!("expected declaration");
    };
    assert_eq!(
        c.analysis.type_of(decl.init.id),
        Some(&Type::array(Type::I8))
    );
    let Stmt::Expr(stmt) = &f.body[1] else {
        panic!("expected expression statement");
    };
    let ExprKind::Assign(assign) = &stmt.expr.kind else {
        panic!("expected assignment");
    };
    let ExprKind::Index(index) = &assign.target.kind else {
        panic!("expected index target");
    };
    assert_eq!(c.analysis.cast_of(index.index.id), Some(&Type::I32));
}

#[test]
fn parse_recovers_from_malformed_members() {
    let c = compile("class X impl X { fn f( { return } fn g() { } }");
    assert!(c.reports.has_errors());
    // g still parses despite the broken parameter list before it.
    let clazz = c.file.clazz.as_ref().expect("class");
    assert!(clazz
        .functions
        .iter()
        .any(|f| c.interner.resolve(f.name) == "g"));
}

#[test]
fn lexer_parser_and_checker_reports_accumulate_together() {
    let c = compile("class X impl X { fn f() { a := \"unterminated } }");
    assert!(c.reports.has_errors());
    assert!(!c.succeeded());
}

#[test]
fn exit_code_contract_counts_only_errors() {
    // Redundant 'pub' is a warning; compilation still succeeds.
    let c = compile("pub class X");
    assert_eq!(c.reports.warning_count(), 1, "{:?}", c.reports.messages());
    assert!(c.succeeded());
}

#[test]
fn reports_render_with_codes_and_positions() {
    let src = "class X impl X { fn f() { x := 1 x = 2 } }";
    let c = compile(src);
    let rendered = marten::errors::render_all(&c.reports, "scenario.mar", src);
    assert!(rendered.contains("E2009"));
    assert!(rendered.contains("not mutable"));
}

#[test]
fn deep_member_chains_annotate_every_link() {
    let c = compile(
        "class X { mut: buf: i64[], peer: X } impl X { fn f(): i64 { return self.peer.buf[0] } }",
    );
    assert_clean(&c);
    let f = &c.file.clazz.as_ref().expect("class").functions[0];
    let Stmt::Return(ret) = &f.body[0] else {
        panic!("expected return");
    };
    let value = ret.value.as_ref().expect("value");
    assert_eq!(c.analysis.type_of(value.id), Some(&Type::I64));
}

#[test]
fn every_expression_in_a_clean_program_is_typed() {
    let c = compile(
        "class X { mut: n: i64 } impl X { new(v: i64) { self.n = v } fn f(k: i64): i64 { mut acc := k for i := 0; i < 10; i++ { acc = acc + k } return acc + self.n } }",
    );
    assert_clean(&c);
}
