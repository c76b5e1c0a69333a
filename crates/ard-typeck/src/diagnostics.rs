//! Ariadne-based diagnostic rendering.
//!
//! Renders [`Diagnostic`]s into labeled, source-quoting reports. Output is
//! colorless under [`DiagnosticOptions::colorless`] for deterministic test
//! output. [`render_json`] emits the machine-readable stream.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use crate::error::{Diagnostic, Severity};

/// Rendering options.
#[derive(Clone, Debug)]
pub struct DiagnosticOptions {
    pub color: bool,
}

impl DiagnosticOptions {
    /// Colorless output for snapshots and dumb terminals.
    pub fn colorless() -> Self {
        DiagnosticOptions { color: false }
    }
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        DiagnosticOptions { color: true }
    }
}

/// Render one diagnostic against the source text of its file.
pub fn render_diagnostic(
    diagnostic: &Diagnostic,
    source: &str,
    options: &DiagnosticOptions,
) -> String {
    let config = Config::default().with_color(options.color);
    let source_len = source.len();

    // Clamp to the source bounds; ariadne needs a non-empty span.
    let mut span: Range<usize> = diagnostic.span.into();
    span.start = span.start.min(source_len);
    span.end = span.end.min(source_len).max(span.start);
    if span.start == span.end {
        span.end = span.end.saturating_add(1).min(source_len.max(1));
    }

    let (kind, color) = match diagnostic.severity {
        Severity::Error => (ReportKind::Error, Color::Red),
        Severity::Warn => (ReportKind::Warning, Color::Yellow),
    };

    let report = Report::build(kind, span.clone())
        .with_message(&diagnostic.message)
        .with_config(config)
        .with_label(
            Label::new(span)
                .with_message(&diagnostic.message)
                .with_color(color),
        )
        .finish();

    let mut buf = Vec::new();
    report
        .write(Source::from(source), &mut buf)
        .expect("writing a diagnostic to a buffer cannot fail");
    String::from_utf8(buf).expect("diagnostic output is valid UTF-8")
}

/// Serialize diagnostics as a JSON array for tooling consumers.
pub fn render_json(diagnostics: &[Diagnostic]) -> String {
    serde_json::to_string_pretty(diagnostics).expect("diagnostics serialize without error")
}
