//! Diagnostic stream tests: the normative message texts, severity split,
//! rendering, and the JSON emitter.

mod common;

use ard_common::Span;
use ard_syntax::ast::{Expr, Stmt, StrLit, StrPart, VariableDecl};
use ard_typeck::diagnostics::{render_diagnostic, DiagnosticOptions};
use common::*;

/// Scenario: `let age: Int = "32"` is exactly one error with the
/// canonical message, and the statement is dropped from the IR.
#[test]
fn type_mismatch_scenario() {
    let result = check(vec![let_typed("age", t_int(), str_("32"))]);
    assert_eq!(result.diagnostics.len(), 1);
    insta::assert_snapshot!(
        result.diagnostics[0].message,
        @"Type mismatch: Expected Int, got Str"
    );
    assert!(result.program.statements.is_empty());
}

/// Scenario: `let numbers = [1, "two", false]` is two element-type
/// errors, one per offending element.
#[test]
fn mixed_list_scenario() {
    let result = check(vec![let_(
        "numbers",
        list(vec![int(1), str_("two"), boolean(false)]),
    )]);
    assert_eq!(error_count(&result), 2);
    insta::assert_snapshot!(
        result.diagnostics[0].message,
        @"Type mismatch: A list can only contain values of single type"
    );
}

/// Diagnostics carry the file and a real source span.
#[test]
fn diagnostics_quote_the_source() {
    // let age: Int = "32" -- the literal sits at bytes 15..19.
    let source = "let age: Int = \"32\"";
    let program = ard_syntax::ast::Program {
        imports: vec![],
        statements: vec![Stmt::VariableDecl(VariableDecl {
            mutable: false,
            name: "age".into(),
            ty: Some(t_int()),
            value: Expr::Str(StrLit {
                parts: vec![StrPart::Text("32".into())],
                span: Span::new(15, 19),
            }),
            span: Span::new(0, 19),
        })],
    };
    let result = ard_typeck::check(&program);
    assert_eq!(result.diagnostics.len(), 1);
    let diag = &result.diagnostics[0];
    assert_eq!(diag.file, "main.ard");
    assert_eq!(diag.span, Span::new(15, 19));

    let rendered = render_diagnostic(diag, source, &DiagnosticOptions::colorless());
    assert!(rendered.contains("Type mismatch: Expected Int, got Str"));
    assert!(rendered.contains("\"32\""));
}

/// Warnings and errors travel the same stream, split by severity.
#[test]
fn severity_split() {
    let result = check_with_imports(
        vec![use_("ard/fs"), use_as("ard/io", "fs")],
        vec![let_typed("age", t_int(), str_("32"))],
    );
    assert_eq!(result.warnings().count(), 1);
    assert_eq!(result.errors().count(), 1);
    assert!(result.has_errors());
}

/// The JSON stream is machine-readable and carries severity, file, and
/// span.
#[test]
fn json_stream() {
    let result = check(vec![let_typed("age", t_int(), str_("32"))]);
    let json = result.diagnostics_json();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["severity"], "Error");
    assert_eq!(parsed[0]["message"], "Type mismatch: Expected Int, got Str");
    assert_eq!(parsed[0]["file"], "main.ard");
}

/// Number literals strip underscores; a decimal point makes a Float.
#[test]
fn numeric_literal_resolution() {
    let result = check(vec![
        let_typed("big", t_int(), number("1_000_000")),
        let_typed("pi", t_float(), number("3.14")),
    ]);
    assert_no_diagnostics(&result);

    let result = check(vec![let_typed("bad", t_int(), number("3.14"))]);
    insta::assert_snapshot!(
        result.diagnostics[0].message,
        @"Type mismatch: Expected Int, got Float"
    );
}
