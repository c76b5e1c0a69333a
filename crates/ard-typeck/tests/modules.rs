//! Integration tests for module resolution: the stdlib registry, user
//! modules through a session, caching, cycles, and fibers.

mod common;

use std::collections::HashMap;

use ard_syntax::ast::Program;
use ard_typeck::ir;
use ard_typeck::modules::{ModuleLoadError, ModuleSource};
use ard_typeck::ty::Ty;
use ard_typeck::Session;
use common::*;

/// A module source backed by prebuilt trees.
struct MapSource {
    programs: HashMap<String, Program>,
}

impl MapSource {
    fn new(entries: Vec<(&str, Program)>) -> Self {
        MapSource {
            programs: entries
                .into_iter()
                .map(|(path, program)| (path.to_string(), program))
                .collect(),
        }
    }
}

impl ModuleSource for MapSource {
    fn load(&self, path: &str) -> Result<Program, ModuleLoadError> {
        self.programs.get(path).cloned().ok_or(ModuleLoadError::NotFound)
    }
}

/// Stdlib imports resolve from the built-in registry and calls carry the
/// module path.
#[test]
fn stdlib_module_call() {
    let result = check_with_imports(
        vec![use_("ard/io")],
        vec![expr(scall("io", "println", vec![arg(str_("hello"))]))],
    );
    assert_no_diagnostics(&result);
    match &result.program.statements[0] {
        ir::Stmt::Expr(ir::Expr::ModuleCall { module, sig, .. }) => {
            assert_eq!(module, "ard/io");
            assert_eq!(sig.name, "println");
        }
        other => panic!("expected a module call, got {:?}", other),
    }
}

/// Importing a non-existent stdlib module is exactly one error.
#[test]
fn unknown_stdlib_module() {
    let result = check_with_imports(vec![use_("ard/nope")], vec![]);
    assert_eq!(error_count(&result), 1);
    assert_error(&result, "Undefined module: ard/nope");
}

/// Scenario: importing two modules under one local name warns once.
#[test]
fn duplicate_import_warns() {
    let result = check_with_imports(
        vec![use_("ard/fs"), use_as("ard/io", "fs")],
        vec![],
    );
    assert!(!result.has_errors());
    assert_eq!(result.warnings().count(), 1);
    assert_warning(&result, "Duplicate import: fs");
}

/// Importing the same module twice, even via an alias, warns for the
/// duplicate.
#[test]
fn duplicate_path_warns() {
    let result = check_with_imports(
        vec![use_("ard/io"), use_as("ard/io", "io2")],
        vec![],
    );
    assert_warning(&result, "Duplicate import: io2");
}

/// A user module exposes its public symbols; private and mutable
/// top-level bindings stay hidden.
#[test]
fn user_module_exports() {
    let lib = program(
        vec![],
        vec![
            fn_decl(
                "double",
                vec![param("n", t_int())],
                Some(t_int()),
                block(vec![expr(binary(ard_syntax::ast::BinaryOp::Mul, ident("n"), int(2)))]),
            ),
            ard_syntax::ast::Stmt::FunctionDecl(ard_syntax::ast::FunctionDecl {
                name: "secret".into(),
                generics: Vec::new(),
                params: Vec::new(),
                ret: Some(t_int()),
                body: block(vec![expr(int(7))]),
                mutates: false,
                private: true,
                span: sp(),
            }),
            let_("answer", int(42)),
            mut_("counter", int(0)),
        ],
    );

    let main = program(
        vec![use_("./lib")],
        vec![
            let_typed("x", t_int(), scall("lib", "double", vec![arg(int(21))])),
            let_typed("a", t_int(), sprop("lib", "answer")),
        ],
    );

    let mut session = Session::new(Box::new(MapSource::new(vec![("./lib", lib.clone())])));
    let result = session.check("main.ard", &main);
    assert_no_diagnostics(&result);

    // Private functions and mutable bindings are not visible.
    let bad = program(
        vec![use_("./lib")],
        vec![
            expr(scall("lib", "secret", vec![])),
            expr(sprop("lib", "counter")),
        ],
    );
    let mut session = Session::new(Box::new(MapSource::new(vec![("./lib", lib)])));
    let result = session.check("main.ard", &bad);
    assert_error(&result, "Undefined: lib::secret");
    assert_error(&result, "Undefined: lib::counter");
}

/// Re-importing a module across units hits the session cache.
#[test]
fn module_cache_is_per_session() {
    let lib = program(
        vec![],
        vec![let_("answer", int(42))],
    );
    let source = MapSource::new(vec![("./lib", lib)]);
    let main = program(
        vec![use_("./lib")],
        vec![let_typed("a", t_int(), sprop("lib", "answer"))],
    );

    let mut session = Session::new(Box::new(source));
    let first = session.check("one.ard", &main);
    let second = session.check("two.ard", &main);
    assert_no_diagnostics(&first);
    assert_no_diagnostics(&second);
}

/// Import cycles are detected through the in-progress cache entry.
#[test]
fn import_cycle_detected() {
    let a = program(vec![use_("./b")], vec![]);
    let b = program(vec![use_("./a")], vec![]);
    let main = program(vec![use_("./a")], vec![]);

    let mut session = Session::new(Box::new(MapSource::new(vec![("./a", a), ("./b", b)])));
    let result = session.check("main.ard", &main);
    assert_error(&result, "Import cycle: ./a");
}

/// Errors inside an imported module surface under the import.
#[test]
fn import_with_errors_reports() {
    let lib = program(vec![], vec![let_typed("x", t_int(), str_("no"))]);
    let main = program(vec![use_("./lib")], vec![]);

    let mut session = Session::new(Box::new(MapSource::new(vec![("./lib", lib)])));
    let result = session.check("main.ard", &main);
    assert_error(&result, "Type mismatch: Expected Int, got Str");
    assert_error(&result, "Module './lib' has 1 error(s)");
    // The nested diagnostic is attributed to the imported file.
    assert!(result.diagnostics.iter().any(|d| d.file == "./lib"));
}

/// Prelude modules are auto-imported: maybe/result constructors and the
/// ToString trait need no explicit use.
#[test]
fn prelude_is_auto_imported() {
    let result = check(vec![
        let_typed("m", t_maybe(t_int()), scall("maybe", "some", vec![arg(int(1))])),
        let_typed(
            "r",
            t_result(t_int(), t_str()),
            scall("result", "ok", vec![arg(int(1))]),
        ),
    ]);
    assert_no_diagnostics(&result);
}

/// async::start and async::eval validate the closure and specialize
/// Fiber<T>; awaiting the fiber yields T.
#[test]
fn fibers_specialize() {
    let result = check_with_imports(
        vec![use_("ard/async")],
        vec![
            let_(
                "f",
                scall(
                    "async",
                    "start",
                    vec![arg(anon_fn(vec![], Some(t_int()), block(vec![expr(int(42))])))],
                ),
            ),
            let_typed("n", t_int(), method(ident("f"), "await", vec![])),
        ],
    );
    assert_no_diagnostics(&result);
    match &result.program.statements[0] {
        ir::Stmt::VariableDef(def) => match &def.value {
            ir::Expr::FiberStart { ty, .. } => {
                assert_eq!(
                    *ty,
                    Ty::Struct { name: "Fiber".into(), args: vec![Ty::Int] }
                );
            }
            other => panic!("expected a fiber start, got {:?}", other),
        },
        other => panic!("expected a variable def, got {:?}", other),
    }

    let result = check_with_imports(
        vec![use_("ard/async")],
        vec![expr(scall("async", "eval", vec![arg(int(3))]))],
    );
    assert_error(&result, "Fibers need a function argument, got Int");
}

/// Fiber closures may not capture mutable variables from the defining
/// scope.
#[test]
fn fiber_closures_are_isolated() {
    let result = check_with_imports(
        vec![use_("ard/async")],
        vec![
            mut_("counter", int(0)),
            expr(scall(
                "async",
                "start",
                vec![arg(anon_fn(
                    vec![],
                    Some(t_int()),
                    block(vec![expr(ident("counter"))]),
                ))],
            )),
        ],
    );
    assert_error(&result, "Fiber closure cannot capture mutable variable: counter");

    // Immutable captures are fine.
    let result = check_with_imports(
        vec![use_("ard/async")],
        vec![
            let_("base", int(1)),
            expr(scall(
                "async",
                "start",
                vec![arg(anon_fn(
                    vec![],
                    Some(t_int()),
                    block(vec![expr(ident("base"))]),
                ))],
            )),
        ],
    );
    assert_no_diagnostics(&result);
}
