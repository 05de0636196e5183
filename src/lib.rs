// src/lib.rs
//! Semantic front-end for the Marten language: a hand-written lexer and
//! recursive-descent parser feeding a two-pass checker. The pipeline never
//! aborts on bad input; diagnostics accumulate in an ordered, deduplicated
//! report list, and the checker's results land in side tables keyed by
//! node id for a downstream code generator.

pub mod errors;
pub mod frontend;
pub mod sema;

use errors::Reports;
use frontend::ast::File;
use frontend::{Interner, Lexer, Parser};
use sema::{Analysis, Checker, TypeRegistry};

/// Everything one compilation produces.
pub struct Compilation {
    pub file: File,
    pub analysis: Analysis,
    pub registry: TypeRegistry,
    pub interner: Interner,
    pub reports: Reports,
}

impl Compilation {
    /// The exit-code contract: success iff no error-severity report.
    pub fn succeeded(&self) -> bool {
        !self.reports.has_errors()
    }
}

/// Lex, parse, and check one source file against an empty registry.
pub fn compile_source(path: &str, source: &str) -> Compilation {
    compile_with_registry(path, source, TypeRegistry::new())
}

/// Lex, parse, and check one source file. `registry` holds the externally
/// known classes and is read-only during checking apart from the class this
/// file declares.
pub fn compile_with_registry(path: &str, source: &str, registry: TypeRegistry) -> Compilation {
    let mut reports = Reports::new();
    let tokens = Lexer::new(source).tokenize(&mut reports);
    let mut interner = Interner::new();
    let file = Parser::new(path, tokens, &mut interner, &mut reports).parse();
    let (analysis, registry) = Checker::new(&interner, registry, &mut reports).check(&file);
    Compilation {
        file,
        analysis,
        registry,
        interner,
        reports,
    }
}
