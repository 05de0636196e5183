// tests/property_tests.rs
//! Property-based invariants over the pipeline.

use proptest::prelude::*;

use marten::compile_source;
use marten::frontend::ast::{ExprKind, Stmt, Symbol};
use marten::sema::scope::Scope;
use marten::sema::types::{ClassKey, Type};

fn rank_type(rank: u8) -> Type {
    match rank {
        0 => Type::I8,
        1 => Type::I16,
        2 => Type::I32,
        3 => Type::I64,
        4 => Type::F32,
        _ => Type::F64,
    }
}

proptest! {
    /// Any input produces a file and a report list; the pipeline neither
    /// panics nor hangs.
    #[test]
    fn parse_totality(src in "[a-zA-Z0-9_{}()\\[\\]:;.,+\\-*/%<>=!&|^~?'\" \n]{0,200}") {
        let c = compile_source("fuzz.mar", &src);
        let _ = (c.file.path.as_str(), c.reports.len());
    }

    /// Diagnostics from every phase come out in non-decreasing source order.
    #[test]
    fn reports_are_ordered(src in "[a-z{}()\\[\\]:;.,+\\-*/<>= \n]{0,160}") {
        let c = compile_source("fuzz.mar", &src);
        let mut last_start = 0usize;
        for report in c.reports.iter() {
            if let Some(span) = report.span {
                prop_assert!(
                    span.start >= last_start,
                    "report at {} after one at {}: {:?}",
                    span.start,
                    last_start,
                    c.reports.messages()
                );
                last_start = span.start;
            }
        }
    }

    /// For any numeric pair, both sides cast into their promotion.
    #[test]
    fn promotion_monotonicity(a in 0u8..6, b in 0u8..6) {
        let (a, b) = (rank_type(a), rank_type(b));
        let wider = Type::promote(&a, &b);
        prop_assert!(a.can_cast(&wider));
        prop_assert!(b.can_cast(&wider));
        prop_assert_eq!(Type::promote(&b, &a), wider);
    }

    /// A uniform small-int literal list infers an i8 array.
    #[test]
    fn uniform_array_literals_keep_the_element_type(values in prop::collection::vec(0i64..=127, 1..8)) {
        let list = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let src = format!("class X impl X {{ fn f() {{ a := :{{{}}} }} }}", list);
        let c = compile_source("prop.mar", &src);
        prop_assert_eq!(c.reports.error_count(), 0, "{:?}", c.reports.messages());
        let init = first_init(&c);
        prop_assert_eq!(c.analysis.type_of(init), Some(&Type::array(Type::I8)));
    }

    /// Mixing in one wider literal widens the whole array.
    #[test]
    fn heterogeneous_numeric_arrays_take_the_widest(values in prop::collection::vec(0i64..=127, 1..6)) {
        let mut parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        parts.push("40000".to_string()); // i32 territory
        let src = format!(
            "class X impl X {{ fn f() {{ a := :{{{}}} }} }}",
            parts.join(", ")
        );
        let c = compile_source("prop.mar", &src);
        prop_assert_eq!(c.reports.error_count(), 0, "{:?}", c.reports.messages());
        let init = first_init(&c);
        prop_assert_eq!(c.analysis.type_of(init), Some(&Type::array(Type::I32)));
    }

    /// Assigning to a literal produces exactly one target diagnostic.
    #[test]
    fn non_variable_assignment_is_one_error(value in 0i64..1000) {
        let src = format!("class X impl X {{ fn f() {{ {} = 2 }} }}", value);
        let c = compile_source("prop.mar", &src);
        let count = c
            .reports
            .messages()
            .iter()
            .filter(|m| m.contains("cannot assign to non-variable"))
            .count();
        prop_assert_eq!(count, 1);
    }

    /// Slot allocation is contiguous in declaration order; wide types take
    /// two slots and no two variables overlap.
    #[test]
    fn variable_slots_are_contiguous(wides in prop::collection::vec(any::<bool>(), 1..12)) {
        let mut scope = Scope::new(ClassKey::new("p/X"));
        scope.enter_function(false);
        let mut expected = 0u16;
        for (i, wide) in wides.iter().enumerate() {
            let ty = if *wide { Type::I64 } else { Type::I32 };
            let width = ty.slot_width();
            let slot = scope.declare(Symbol(i as u32), false, ty);
            prop_assert_eq!(slot, Some(expected));
            expected += width;
        }
    }
}

/// Node id of the first function's first declaration initializer.
fn first_init(c: &marten::Compilation) -> marten::frontend::ast::NodeId {
    let f = &c.file.clazz.as_ref().expect("class").functions[0];
    match &f.body[0] {
        Stmt::VarDecl(decl) => {
            assert!(matches!(decl.init.kind, ExprKind::ArrayLiteral(_)));
            decl.init.id
        }
        other => panic!("expected declaration, got {:?}", other),
    }
}
