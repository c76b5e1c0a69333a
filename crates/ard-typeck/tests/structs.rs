//! Integration tests for struct definition, instantiation, field access,
//! methods, and generic specialization.

mod common;

use ard_syntax::ast::{BinaryOp, ImplMethod};
use ard_typeck::ir;
use ard_typeck::ty::Ty;
use common::*;

fn point_decl() -> ard_syntax::ast::Stmt {
    struct_decl("Point", vec![("x", t_int()), ("y", t_int())])
}

/// Definition, literal construction, and field access.
#[test]
fn struct_literal_and_field_access() {
    let result = check(vec![
        point_decl(),
        let_("p", struct_lit("Point", vec![("x", int(1)), ("y", int(2))])),
        let_typed("x", t_int(), prop(ident("p"), "x")),
    ]);
    assert_no_diagnostics(&result);
}

/// Missing and extra fields report by name.
#[test]
fn struct_literal_field_errors() {
    let result = check(vec![
        point_decl(),
        let_("p", struct_lit("Point", vec![("x", int(1))])),
    ]);
    assert_error(&result, "Missing field 'y' for Point");

    let result = check(vec![
        point_decl(),
        let_("p", struct_lit("Point", vec![("x", int(1)), ("y", int(2)), ("z", int(3))])),
    ]);
    assert_error(&result, "Point has no field 'z'");

    let result = check(vec![
        point_decl(),
        let_("p", struct_lit("Point", vec![("x", str_("one")), ("y", int(2))])),
    ]);
    assert_error(&result, "Type mismatch: Expected Int, got Str");
}

/// Nullable fields may be omitted and default to none.
#[test]
fn nullable_fields_default_to_none() {
    let result = check(vec![
        struct_decl("Person", vec![("name", t_str()), ("nickname", t_maybe(t_str()))]),
        let_("p", struct_lit("Person", vec![("name", str_("ada"))])),
    ]);
    assert_no_diagnostics(&result);
    match &result.program.statements[1] {
        ir::Stmt::VariableDef(def) => match &def.value {
            ir::Expr::StructInit { fields, .. } => {
                assert_eq!(fields.len(), 2);
                let nickname = fields
                    .iter()
                    .find(|(name, _)| name == "nickname")
                    .expect("nickname backfilled");
                assert!(matches!(&nickname.1, ir::Expr::ModuleCall { sig, .. } if sig.name == "none"));
            }
            other => panic!("expected a struct literal, got {:?}", other),
        },
        other => panic!("expected a variable def, got {:?}", other),
    }
}

/// Generic struct instantiation refines the field-type map.
#[test]
fn generic_struct_instantiation() {
    let result = check(vec![
        generic_struct_decl("Box", vec!["T"], vec![("item", t_gen("T"))]),
        let_("b", struct_lit("Box", vec![("item", int(42))])),
        let_typed("n", t_int(), prop(ident("b"), "item")),
    ]);
    assert_no_diagnostics(&result);
    match &result.program.statements[1] {
        ir::Stmt::VariableDef(def) => match &def.value {
            ir::Expr::StructInit { ty, field_tys, .. } => {
                assert_eq!(
                    *ty,
                    Ty::Struct { name: "Box".into(), args: vec![Ty::Int] }
                );
                assert_eq!(field_tys.get("item"), Some(&Ty::Int));
            }
            other => panic!("expected a struct literal, got {:?}", other),
        },
        other => panic!("expected a variable def, got {:?}", other),
    }
}

/// Scenario: a method on a generic struct instance sees the instance's
/// specialization, so `b.put(false)` on a `Box<Int>` is one mismatch.
#[test]
fn generic_method_uses_instance_specialization() {
    let result = check(vec![
        generic_struct_decl("Box", vec!["T"], vec![("item", t_gen("T"))]),
        impl_block(
            "Box",
            vec![ImplMethod::Instance(mutating_method_decl(
                "put",
                vec![param("new", t_gen("T"))],
                None,
                block(vec![assign_prop(ident("@"), "item", ident("new"))]),
            ))],
        ),
        mut_("b", struct_lit("Box", vec![("item", int(42))])),
        expr(method(ident("b"), "put", vec![arg(boolean(false))])),
    ]);
    assert_eq!(error_count(&result), 1);
    assert_error(&result, "Type mismatch: Expected Int, got Bool");
}

/// Instance methods get the implicit `@` receiver; statics do not.
#[test]
fn impl_block_methods_and_statics() {
    let result = check(vec![
        point_decl(),
        impl_block(
            "Point",
            vec![
                ImplMethod::Instance(method_decl(
                    "sum",
                    vec![],
                    Some(t_int()),
                    block(vec![expr(binary(
                        BinaryOp::Add,
                        prop(ident("@"), "x"),
                        prop(ident("@"), "y"),
                    ))]),
                )),
                ImplMethod::Static(method_decl(
                    "origin",
                    vec![],
                    Some(t_name("Point")),
                    block(vec![expr(struct_lit(
                        "Point",
                        vec![("x", int(0)), ("y", int(0))],
                    ))]),
                )),
            ],
        ),
        let_("p", scall("Point", "origin", vec![])),
        let_typed("s", t_int(), method(ident("p"), "sum", vec![])),
    ]);
    assert_no_diagnostics(&result);
    match &result.program.statements[3] {
        ir::Stmt::VariableDef(def) => {
            assert!(matches!(
                &def.value,
                ir::Expr::InstanceMethod { receiver_kind: ir::ReceiverKind::Struct, .. }
            ));
        }
        other => panic!("expected a variable def, got {:?}", other),
    }
}

/// Mutating methods need a mutable receiver; property assignment needs a
/// mutable root.
#[test]
fn receiver_mutability() {
    let setup = vec![
        point_decl(),
        impl_block(
            "Point",
            vec![ImplMethod::Instance(mutating_method_decl(
                "reset",
                vec![],
                None,
                block(vec![assign_prop(ident("@"), "x", int(0))]),
            ))],
        ),
    ];

    let mut stmts = setup.clone();
    stmts.push(let_("p", struct_lit("Point", vec![("x", int(1)), ("y", int(2))])));
    stmts.push(expr(method(ident("p"), "reset", vec![])));
    let result = check(stmts);
    assert_error(&result, "Cannot call mutating method 'reset' on immutable value");

    let mut stmts = setup.clone();
    stmts.push(mut_("p", struct_lit("Point", vec![("x", int(1)), ("y", int(2))])));
    stmts.push(expr(method(ident("p"), "reset", vec![])));
    let result = check(stmts);
    assert_no_diagnostics(&result);

    let mut stmts = setup;
    stmts.push(let_("p", struct_lit("Point", vec![("x", int(1)), ("y", int(2))])));
    stmts.push(assign_prop(ident("p"), "x", int(9)));
    let result = check(stmts);
    assert_error(&result, "Cannot reassign immutable variable: p");
}

/// Built-in collection methods: mutating ones demand a mutable receiver.
#[test]
fn collection_method_mutability() {
    let result = check(vec![
        let_("xs", list(vec![int(1)])),
        expr(method(ident("xs"), "push", vec![arg(int(2))])),
    ]);
    assert_error(&result, "Cannot call mutating method 'push' on immutable value");

    let result = check(vec![
        mut_("xs", list(vec![int(1)])),
        expr(method(ident("xs"), "push", vec![arg(int(2))])),
        let_typed("n", t_int(), method(ident("xs"), "size", vec![])),
        let_typed("first", t_maybe(t_int()), method(ident("xs"), "at", vec![arg(int(0))])),
    ]);
    assert_no_diagnostics(&result);
}

/// `a.b` on a Maybe receiver desugars to an unwrapping OptionMatch that
/// propagates none.
#[test]
fn nullable_accessor_chain() {
    let result = check(vec![
        struct_decl("Person", vec![("name", t_str())]),
        let_typed(
            "p",
            t_maybe(t_name("Person")),
            struct_lit("Person", vec![("name", str_("ada"))]),
        ),
        let_("n", prop(ident("p"), "name")),
    ]);
    assert_no_diagnostics(&result);
    match &result.program.statements[2] {
        ir::Stmt::VariableDef(def) => match &def.value {
            ir::Expr::OptionMatch { ty, inner_ty, .. } => {
                assert_eq!(*ty, Ty::maybe(Ty::Str));
                assert_eq!(*inner_ty, Ty::strukt("Person"));
            }
            other => panic!("expected an unwrapping match, got {:?}", other),
        },
        other => panic!("expected a variable def, got {:?}", other),
    }
}

/// Unknown fields and methods report with the receiver type.
#[test]
fn unknown_member_errors() {
    let result = check(vec![
        point_decl(),
        let_("p", struct_lit("Point", vec![("x", int(1)), ("y", int(2))])),
        expr(prop(ident("p"), "z")),
    ]);
    assert_error(&result, "Point has no field 'z'");

    let result = check(vec![
        point_decl(),
        let_("p", struct_lit("Point", vec![("x", int(1)), ("y", int(2))])),
        expr(method(ident("p"), "area", vec![])),
    ]);
    assert_error(&result, "Point has no method 'area'");
}
