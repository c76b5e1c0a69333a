//! Integration tests for enums, unions, type aliases, traits, and string
//! interpolation.

mod common;

use ard_syntax::ast::{BinaryOp, StrPart};
use ard_typeck::ir;
use common::*;

/// Variant access and Int/enum comparison (enums are integer-tagged).
#[test]
fn enum_variants_and_comparison() {
    let result = check(vec![
        enum_decl("Dir", vec![("up", None), ("down", None)]),
        let_("d", sprop("Dir", "down")),
        expr(binary(BinaryOp::Eq, ident("d"), int(1))),
        expr(binary(BinaryOp::Lt, sprop("Dir", "up"), sprop("Dir", "down"))),
    ]);
    assert_no_diagnostics(&result);
    match &result.program.statements[1] {
        ir::Stmt::VariableDef(def) => match &def.value {
            ir::Expr::EnumVariant { enum_name, discriminant, .. } => {
                assert_eq!(enum_name, "Dir");
                assert_eq!(*discriminant, 1);
            }
            other => panic!("expected an enum variant, got {:?}", other),
        },
        other => panic!("expected a variable def, got {:?}", other),
    }
}

/// Explicit discriminants restart auto-increment from their value.
#[test]
fn discriminants_auto_increment_from_explicit() {
    let result = check(vec![
        enum_decl("Code", vec![("a", None), ("b", Some(5)), ("c", None)]),
        let_("x", sprop("Code", "c")),
    ]);
    assert_no_diagnostics(&result);
    match &result.program.statements[1] {
        ir::Stmt::VariableDef(def) => {
            assert!(matches!(
                &def.value,
                ir::Expr::EnumVariant { discriminant: 6, .. }
            ));
        }
        other => panic!("expected a variable def, got {:?}", other),
    }
}

/// Duplicate discriminants name the first occurrence; empty enums are
/// rejected.
#[test]
fn enum_shape_errors() {
    let result = check(vec![enum_decl(
        "Bad",
        vec![("a", Some(1)), ("b", Some(1))],
    )]);
    assert_error(&result, "Variant 'b' reuses the discriminant of 'a'");

    let result = check(vec![enum_decl("Empty", vec![])]);
    assert_error(&result, "Enum needs at least one variant");

    let result = check(vec![enum_decl(
        "Dup",
        vec![("a", None), ("a", None)],
    )]);
    assert_error(&result, "Duplicate name: a");
}

/// Unknown variants report the enum and name.
#[test]
fn unknown_variant() {
    let result = check(vec![
        enum_decl("Dir", vec![("up", None), ("down", None)]),
        expr(sprop("Dir", "sideways")),
    ]);
    assert_error(&result, "Undefined variant: Dir::sideways");
}

/// A single type declaration is an alias; multiple types form a union a
/// member value flows into.
#[test]
fn aliases_and_unions() {
    let result = check(vec![
        type_decl("Id", vec![t_int()]),
        let_typed("n", t_name("Id"), int(7)),
        expr(binary(BinaryOp::Add, ident("n"), int(1))),
    ]);
    assert_no_diagnostics(&result);

    let result = check(vec![
        type_decl("Value", vec![t_str(), t_int()]),
        let_typed("v", t_name("Value"), str_("hello")),
        let_typed("w", t_name("Value"), int(3)),
    ]);
    assert_no_diagnostics(&result);

    let result = check(vec![
        type_decl("Value", vec![t_str(), t_int()]),
        let_typed("v", t_name("Value"), boolean(true)),
    ]);
    assert_error(&result, "Type mismatch: Expected Value, got Bool");
}

/// Trait declaration and implementation; values flow into trait-typed
/// parameters and dispatch through them.
#[test]
fn trait_impl_and_dispatch() {
    let result = check(vec![
        trait_decl("Greet", vec![trait_method("greet", vec![], Some(t_str()))]),
        struct_decl("Person", vec![("name", t_str())]),
        trait_impl(
            "Greet",
            "Person",
            vec![method_decl("greet", vec![], Some(t_str()), block(vec![expr(str_("hi"))]))],
        ),
        fn_decl(
            "welcome",
            vec![param("g", t_name("Greet"))],
            Some(t_str()),
            block(vec![expr(method(ident("g"), "greet", vec![]))]),
        ),
        let_("p", struct_lit("Person", vec![("name", str_("ada"))])),
        expr(call("welcome", vec![arg(ident("p"))])),
    ]);
    assert_no_diagnostics(&result);
}

/// A trait impl must cover every declared method with the exact
/// signature; extra methods only warn.
#[test]
fn trait_impl_validation() {
    let greet = trait_decl("Greet", vec![trait_method("greet", vec![], Some(t_str()))]);
    let person = struct_decl("Person", vec![("name", t_str())]);

    let result = check(vec![
        greet.clone(),
        person.clone(),
        trait_impl("Greet", "Person", vec![]),
    ]);
    assert_error(&result, "Implementation of Greet is missing method 'greet'");

    let result = check(vec![
        greet.clone(),
        person.clone(),
        trait_impl(
            "Greet",
            "Person",
            vec![method_decl("greet", vec![], Some(t_int()), block(vec![expr(int(1))]))],
        ),
    ]);
    assert_error(&result, "Method 'greet' does not match the signature declared by Greet");

    let result = check(vec![
        greet,
        person,
        trait_impl(
            "Greet",
            "Person",
            vec![
                method_decl("greet", vec![], Some(t_str()), block(vec![expr(str_("hi"))])),
                method_decl("wave", vec![], Some(t_str()), block(vec![expr(str_("o/"))])),
            ],
        ),
    ]);
    assert!(!result.has_errors());
    assert_warning(&result, "Greet does not declare a method 'wave'");
}

/// Implementing something that is not a trait reports.
#[test]
fn impl_non_trait() {
    let result = check(vec![
        struct_decl("Person", vec![("name", t_str())]),
        trait_impl("Widget", "Person", vec![]),
    ]);
    assert_error(&result, "Widget is not a trait");
}

/// Interpolation: string chunks stay, primitives gain to_str() calls,
/// ToString implementors dispatch through their method, everything else
/// reports.
#[test]
fn interpolation_uses_tostring() {
    let result = check(vec![
        let_("n", int(42)),
        let_("s", interp(vec![
            StrPart::Text("n is ".into()),
            StrPart::Interp(ident("n")),
        ])),
    ]);
    assert_no_diagnostics(&result);
    match &result.program.statements[1] {
        ir::Stmt::VariableDef(def) => match &def.value {
            ir::Expr::InterpolatedStr { parts } => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(
                    parts[1],
                    ir::Expr::IntMethod { kind: ir::IntMethodKind::ToStr, .. }
                ));
            }
            other => panic!("expected interpolation, got {:?}", other),
        },
        other => panic!("expected a variable def, got {:?}", other),
    }

    // The ToString trait comes from the prelude's ard/string module.
    let result = check(vec![
        struct_decl("Person", vec![("name", t_str())]),
        trait_impl(
            "ToString",
            "Person",
            vec![method_decl("to_str", vec![], Some(t_str()), block(vec![expr(str_("p"))]))],
        ),
        let_("p", struct_lit("Person", vec![("name", str_("ada"))])),
        let_("s", interp(vec![StrPart::Interp(ident("p"))])),
    ]);
    assert_no_diagnostics(&result);

    let result = check(vec![
        let_("xs", list(vec![int(1)])),
        let_("s", interp(vec![StrPart::Interp(ident("xs"))])),
    ]);
    assert_error(&result, "[Int] does not implement ToString");
}

/// Enum methods may not mutate.
#[test]
fn enum_methods_never_mutate() {
    let result = check(vec![
        enum_decl("Dir", vec![("up", None), ("down", None)]),
        ard_syntax::ast::Stmt::ImplBlock(ard_syntax::ast::ImplBlock {
            target: "Dir".into(),
            methods: vec![ard_syntax::ast::ImplMethod::Instance(mutating_method_decl(
                "flip",
                vec![],
                None,
                block(vec![]),
            ))],
            span: sp(),
        }),
    ]);
    assert_error(&result, "Enum method 'flip' cannot mutate");
}
