// src/errors/report.rs
//! The report sink: an ordered, deduplicated collection of diagnostics.
//!
//! Every phase appends into the same [`Reports`] value and keeps going;
//! nothing unwinds. Duplicates are dropped on insert, keyed by
//! (span, rendered message), so recovery paths that revisit a node do not
//! double-report.

use miette::{
    Diagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, Severity, ThemeCharacters,
    ThemeStyles,
};
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::frontend::Span;

use super::{LexError, ParseError, SemaError};

/// Any diagnostic the pipeline can produce.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CompileDiagnostic {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sema(#[from] SemaError),
}

/// One reported diagnostic plus the enclosing node span, when one exists.
#[derive(Debug, Clone)]
pub struct Report {
    pub diagnostic: CompileDiagnostic,
    pub span: Option<Span>,
}

impl Report {
    pub fn severity(&self) -> Severity {
        self.diagnostic.severity().unwrap_or(Severity::Error)
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    /// The diagnostic code ("E2003", "W3201", ...), if any.
    pub fn code(&self) -> Option<String> {
        self.diagnostic.code().map(|c| c.to_string())
    }

    pub fn message(&self) -> String {
        self.diagnostic.to_string()
    }
}

/// Ordered, append-only diagnostic sink with insert-time deduplication.
#[derive(Debug, Default)]
pub struct Reports {
    entries: Vec<Report>,
    seen: FxHashSet<(Option<(usize, usize)>, String)>,
}

impl Reports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic unless an identical (span, message) pair was
    /// already recorded.
    pub fn push(&mut self, diagnostic: impl Into<CompileDiagnostic>, span: Option<Span>) {
        let diagnostic = diagnostic.into();
        let key = (
            span.map(|s| (s.start, s.end)),
            format!("{}: {}", self.code_of(&diagnostic), diagnostic),
        );
        if self.seen.insert(key) {
            self.entries.push(Report { diagnostic, span });
        }
    }

    fn code_of(&self, diagnostic: &CompileDiagnostic) -> String {
        diagnostic
            .code()
            .map(|c| c.to_string())
            .unwrap_or_default()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(Report::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|r| r.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries.iter().filter(|r| !r.is_error()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Report> {
        self.entries.iter()
    }

    /// Rendered one-line messages, in current order. Handy in tests.
    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(Report::message).collect()
    }

    /// Stable-sort the reports by source position. Phases append in their
    /// own order (lexer, parser, checker pass A, pass B); this restores the
    /// per-file position order callers see. Reports at the same position
    /// keep their insertion order; positionless reports sort first.
    pub fn sort_by_position(&mut self) {
        self.entries
            .sort_by_key(|r| r.span.map(|s| (s.start, s.end)).unwrap_or((0, 0)));
    }
}

/// Render a single report against its source (ascii, no colors).
pub fn render_to_string(report: &Report, path: &str, source: &str) -> String {
    let theme = GraphicalTheme {
        characters: ThemeCharacters::ascii(),
        styles: ThemeStyles::none(),
    };
    let handler = GraphicalReportHandler::new_themed(theme);
    let owned = miette::Report::new(report.diagnostic.clone())
        .with_source_code(NamedSource::new(path, source.to_string()));
    let mut output = String::new();
    let _ = handler.render_report(&mut output, owned.as_ref());
    output
}

/// Render every report in order, separated by blank lines.
pub fn render_all(reports: &Reports, path: &str, source: &str) -> String {
    let mut output = String::new();
    for report in reports.iter() {
        output.push_str(&render_to_string(report, path, source));
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span::new(start, end, 1, 1)
    }

    #[test]
    fn push_preserves_insertion_order() {
        let mut reports = Reports::new();
        reports.push(
            SemaError::UnknownIdentifier {
                name: "a".into(),
                span: (0, 1).into(),
            },
            Some(span(0, 1)),
        );
        reports.push(
            SemaError::UnknownIdentifier {
                name: "b".into(),
                span: (2, 3).into(),
            },
            Some(span(2, 3)),
        );
        let messages = reports.messages();
        assert!(messages[0].contains("'a'"));
        assert!(messages[1].contains("'b'"));
    }

    #[test]
    fn duplicate_reports_are_dropped() {
        let mut reports = Reports::new();
        for _ in 0..3 {
            reports.push(
                SemaError::UnknownIdentifier {
                    name: "x".into(),
                    span: (0, 1).into(),
                },
                Some(span(0, 1)),
            );
        }
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn same_message_at_different_spans_is_kept() {
        let mut reports = Reports::new();
        for start in [0usize, 5] {
            reports.push(
                SemaError::UnknownIdentifier {
                    name: "x".into(),
                    span: (start, 1).into(),
                },
                Some(span(start, start + 1)),
            );
        }
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn warnings_do_not_trip_has_errors() {
        let mut reports = Reports::new();
        reports.push(
            SemaError::UnusedExpression {
                span: (0, 1).into(),
            },
            Some(span(0, 1)),
        );
        assert!(!reports.has_errors());
        assert_eq!(reports.warning_count(), 1);

        reports.push(
            SemaError::UnknownIdentifier {
                name: "x".into(),
                span: (2, 1).into(),
            },
            Some(span(2, 3)),
        );
        assert!(reports.has_errors());
        assert_eq!(reports.error_count(), 1);
    }

    #[test]
    fn sort_by_position_is_stable() {
        let mut reports = Reports::new();
        reports.push(
            SemaError::UnknownIdentifier {
                name: "late".into(),
                span: (10, 1).into(),
            },
            Some(span(10, 11)),
        );
        reports.push(
            SemaError::UnknownIdentifier {
                name: "early".into(),
                span: (0, 1).into(),
            },
            Some(span(0, 1)),
        );
        reports.push(
            SemaError::UnusedExpression {
                span: (10, 1).into(),
            },
            Some(span(10, 11)),
        );

        reports.sort_by_position();
        let messages = reports.messages();
        assert!(messages[0].contains("'early'"));
        assert!(messages[1].contains("'late'"));
        // Same position: insertion order is preserved.
        assert!(messages[2].contains("unused expression"));
    }

    #[test]
    fn render_includes_code_and_message() {
        let mut reports = Reports::new();
        reports.push(
            SemaError::UnknownIdentifier {
                name: "x".into(),
                span: (0, 1).into(),
            },
            Some(span(0, 1)),
        );
        let rendered = render_all(&reports, "test.mar", "x");
        assert!(rendered.contains("E2002"));
        assert!(rendered.contains("unknown identifier"));
    }
}
