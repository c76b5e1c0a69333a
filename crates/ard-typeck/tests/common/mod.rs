//! Shared tree-building helpers for the checker's integration tests.
//!
//! The checker consumes parse trees; these builders stand in for the
//! parser so tests can state programs directly. Spans are synthetic --
//! the tests assert on messages and IR shape, not on quoted source.

#![allow(dead_code)]

use ard_common::Span;
use ard_syntax::ast::*;
use ard_typeck::error::Severity;
use ard_typeck::CheckResult;

pub fn sp() -> Span {
    Span::synthetic()
}

// ── Programs ───────────────────────────────────────────────────────────

pub fn program(imports: Vec<UseDecl>, statements: Vec<Stmt>) -> Program {
    Program { imports, statements }
}

pub fn check(statements: Vec<Stmt>) -> CheckResult {
    ard_typeck::check(&program(Vec::new(), statements))
}

pub fn check_with_imports(imports: Vec<UseDecl>, statements: Vec<Stmt>) -> CheckResult {
    ard_typeck::check(&program(imports, statements))
}

pub fn use_(path: &str) -> UseDecl {
    UseDecl { path: path.into(), alias: None, span: sp() }
}

pub fn use_as(path: &str, alias: &str) -> UseDecl {
    UseDecl { path: path.into(), alias: Some(alias.into()), span: sp() }
}

// ── Assertions ─────────────────────────────────────────────────────────

pub fn assert_no_diagnostics(result: &CheckResult) {
    assert!(
        result.diagnostics.is_empty(),
        "expected no diagnostics, got: {:#?}",
        result.diagnostics
    );
}

pub fn assert_error(result: &CheckResult, needle: &str) {
    assert!(
        result
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error && d.message.contains(needle)),
        "expected an error containing {:?}, got: {:#?}",
        needle,
        result.diagnostics
    );
}

pub fn assert_warning(result: &CheckResult, needle: &str) {
    assert!(
        result
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warn && d.message.contains(needle)),
        "expected a warning containing {:?}, got: {:#?}",
        needle,
        result.diagnostics
    );
}

pub fn error_count(result: &CheckResult) -> usize {
    result.errors().count()
}

// ── Expressions ────────────────────────────────────────────────────────

pub fn int(value: i64) -> Expr {
    Expr::Number(NumberLit { text: value.to_string(), span: sp() })
}

pub fn number(text: &str) -> Expr {
    Expr::Number(NumberLit { text: text.into(), span: sp() })
}

pub fn str_(value: &str) -> Expr {
    Expr::Str(StrLit {
        parts: vec![StrPart::Text(value.into())],
        span: sp(),
    })
}

pub fn interp(parts: Vec<StrPart>) -> Expr {
    Expr::Str(StrLit { parts, span: sp() })
}

pub fn boolean(value: bool) -> Expr {
    Expr::Bool(BoolLit { value, span: sp() })
}

pub fn ident(name: &str) -> Expr {
    Expr::Ident(Ident { name: name.into(), span: sp() })
}

pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span: sp(),
    })
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary(UnaryExpr { op, operand: Box::new(operand), span: sp() })
}

pub fn list(elements: Vec<Expr>) -> Expr {
    Expr::List(ListLit { elements, span: sp() })
}

pub fn map(entries: Vec<(Expr, Expr)>) -> Expr {
    Expr::Map(MapLit {
        entries: entries
            .into_iter()
            .map(|(key, value)| MapEntry { key, value, span: sp() })
            .collect(),
        span: sp(),
    })
}

pub fn arg(value: Expr) -> Arg {
    Arg { name: None, mutable: false, value, span: sp() }
}

pub fn named_arg(name: &str, value: Expr) -> Arg {
    Arg { name: Some(name.into()), mutable: false, value, span: sp() }
}

pub fn mut_arg(value: Expr) -> Arg {
    Arg { name: None, mutable: true, value, span: sp() }
}

pub fn call(name: &str, args: Vec<Arg>) -> Expr {
    Expr::Call(CallExpr {
        callee: Box::new(ident(name)),
        type_args: Vec::new(),
        args,
        span: sp(),
    })
}

pub fn call_typed(name: &str, type_args: Vec<TypeExpr>, args: Vec<Arg>) -> Expr {
    Expr::Call(CallExpr {
        callee: Box::new(ident(name)),
        type_args,
        args,
        span: sp(),
    })
}

pub fn scall(parent: &str, name: &str, args: Vec<Arg>) -> Expr {
    Expr::StaticCall(StaticCall {
        parent: parent.into(),
        name: name.into(),
        type_args: Vec::new(),
        args,
        span: sp(),
    })
}

pub fn sprop(parent: &str, name: &str) -> Expr {
    Expr::StaticProperty(StaticProperty {
        parent: parent.into(),
        name: name.into(),
        span: sp(),
    })
}

pub fn prop(object: Expr, name: &str) -> Expr {
    Expr::Property(PropertyExpr {
        object: Box::new(object),
        name: name.into(),
        span: sp(),
    })
}

pub fn method(object: Expr, name: &str, args: Vec<Arg>) -> Expr {
    Expr::MethodCall(MethodCallExpr {
        object: Box::new(object),
        name: name.into(),
        args,
        span: sp(),
    })
}

pub fn struct_lit(name: &str, fields: Vec<(&str, Expr)>) -> Expr {
    Expr::StructLit(StructLit {
        module: None,
        name: name.into(),
        fields: fields
            .into_iter()
            .map(|(name, value)| FieldInit { name: name.into(), value, span: sp() })
            .collect(),
        span: sp(),
    })
}

pub fn anon_fn(params: Vec<(&str, Option<TypeExpr>)>, ret: Option<TypeExpr>, body: Block) -> Expr {
    Expr::AnonFn(AnonFn {
        params: params
            .into_iter()
            .map(|(name, ty)| AnonParam { name: name.into(), ty, span: sp() })
            .collect(),
        ret,
        body,
        span: sp(),
    })
}

pub fn try_(operand: Expr) -> Expr {
    Expr::Try(TryExpr { operand: Box::new(operand), catch: None, span: sp() })
}

pub fn try_catch(operand: Expr, binding: Option<&str>, body: Block) -> Expr {
    Expr::Try(TryExpr {
        operand: Box::new(operand),
        catch: Some(CatchClause {
            binding: binding.map(|b| b.to_string()),
            body,
            span: sp(),
        }),
        span: sp(),
    })
}

pub fn match_(subject: Expr, arms: Vec<MatchArm>) -> Expr {
    Expr::Match(MatchExpr { subject: Box::new(subject), arms, span: sp() })
}

pub fn arm(pattern: Pattern, body: Expr) -> MatchArm {
    MatchArm { pattern, body, span: sp() }
}

pub fn pat_wild() -> Pattern {
    Pattern::Wildcard { span: sp() }
}

pub fn pat_bind(name: &str) -> Pattern {
    Pattern::Binding { name: name.into(), span: sp() }
}

pub fn pat_member(parent: &str, name: &str) -> Pattern {
    Pattern::Member { parent: parent.into(), name: name.into(), span: sp() }
}

pub fn pat_int(value: i64) -> Pattern {
    Pattern::Number {
        text: value.unsigned_abs().to_string(),
        negative: value < 0,
        span: sp(),
    }
}

pub fn pat_range(lo: i64, hi: i64) -> Pattern {
    Pattern::Range {
        lo: Box::new(pat_int(lo)),
        hi: Box::new(pat_int(hi)),
        span: sp(),
    }
}

pub fn pat_bool(value: bool) -> Pattern {
    Pattern::Bool { value, span: sp() }
}

pub fn pat_type(ty: TypeExpr, binding: Option<&str>) -> Pattern {
    Pattern::Type { ty, binding: binding.map(|b| b.to_string()), span: sp() }
}

pub fn pat_ok(binding: &str) -> Pattern {
    Pattern::Ok { binding: binding.into(), span: sp() }
}

pub fn pat_err(binding: &str) -> Pattern {
    Pattern::Err { binding: binding.into(), span: sp() }
}

// ── Statements ─────────────────────────────────────────────────────────

pub fn let_(name: &str, value: Expr) -> Stmt {
    Stmt::VariableDecl(VariableDecl {
        mutable: false,
        name: name.into(),
        ty: None,
        value,
        span: sp(),
    })
}

pub fn let_typed(name: &str, ty: TypeExpr, value: Expr) -> Stmt {
    Stmt::VariableDecl(VariableDecl {
        mutable: false,
        name: name.into(),
        ty: Some(ty),
        value,
        span: sp(),
    })
}

pub fn mut_(name: &str, value: Expr) -> Stmt {
    Stmt::VariableDecl(VariableDecl {
        mutable: true,
        name: name.into(),
        ty: None,
        value,
        span: sp(),
    })
}

pub fn mut_typed(name: &str, ty: TypeExpr, value: Expr) -> Stmt {
    Stmt::VariableDecl(VariableDecl {
        mutable: true,
        name: name.into(),
        ty: Some(ty),
        value,
        span: sp(),
    })
}

pub fn assign(name: &str, value: Expr) -> Stmt {
    Stmt::Assignment(Assignment {
        target: AssignTarget::Name { name: name.into(), span: sp() },
        value,
        span: sp(),
    })
}

pub fn assign_prop(object: Expr, name: &str, value: Expr) -> Stmt {
    Stmt::Assignment(Assignment {
        target: AssignTarget::Property {
            object: Box::new(object),
            name: name.into(),
            span: sp(),
        },
        value,
        span: sp(),
    })
}

pub fn expr(e: Expr) -> Stmt {
    Stmt::Expr(e)
}

pub fn block(statements: Vec<Stmt>) -> Block {
    Block { statements, span: sp() }
}

pub fn param(name: &str, ty: TypeExpr) -> Param {
    Param { name: name.into(), ty, mutable: false, span: sp() }
}

pub fn mut_param(name: &str, ty: TypeExpr) -> Param {
    Param { name: name.into(), ty, mutable: true, span: sp() }
}

pub fn fn_decl(name: &str, params: Vec<Param>, ret: Option<TypeExpr>, body: Block) -> Stmt {
    Stmt::FunctionDecl(FunctionDecl {
        name: name.into(),
        generics: Vec::new(),
        params,
        ret,
        body,
        mutates: false,
        private: false,
        span: sp(),
    })
}

pub fn generic_fn_decl(
    name: &str,
    generics: Vec<&str>,
    params: Vec<Param>,
    ret: Option<TypeExpr>,
    body: Block,
) -> Stmt {
    Stmt::FunctionDecl(FunctionDecl {
        name: name.into(),
        generics: generics.into_iter().map(String::from).collect(),
        params,
        ret,
        body,
        mutates: false,
        private: false,
        span: sp(),
    })
}

pub fn struct_decl(name: &str, fields: Vec<(&str, TypeExpr)>) -> Stmt {
    generic_struct_decl(name, Vec::new(), fields)
}

pub fn generic_struct_decl(
    name: &str,
    generics: Vec<&str>,
    fields: Vec<(&str, TypeExpr)>,
) -> Stmt {
    Stmt::StructDecl(StructDecl {
        name: name.into(),
        generics: generics.into_iter().map(String::from).collect(),
        fields: fields
            .into_iter()
            .map(|(name, ty)| StructField { name: name.into(), ty, span: sp() })
            .collect(),
        private: false,
        span: sp(),
    })
}

pub fn enum_decl(name: &str, variants: Vec<(&str, Option<i64>)>) -> Stmt {
    Stmt::EnumDecl(EnumDecl {
        name: name.into(),
        variants: variants
            .into_iter()
            .map(|(name, value)| EnumVariant { name: name.into(), value, span: sp() })
            .collect(),
        private: false,
        span: sp(),
    })
}

pub fn type_decl(name: &str, types: Vec<TypeExpr>) -> Stmt {
    Stmt::TypeDecl(TypeDecl {
        name: name.into(),
        types,
        private: false,
        span: sp(),
    })
}

pub fn method_decl(name: &str, params: Vec<Param>, ret: Option<TypeExpr>, body: Block) -> FunctionDecl {
    FunctionDecl {
        name: name.into(),
        generics: Vec::new(),
        params,
        ret,
        body,
        mutates: false,
        private: false,
        span: sp(),
    }
}

pub fn mutating_method_decl(
    name: &str,
    params: Vec<Param>,
    ret: Option<TypeExpr>,
    body: Block,
) -> FunctionDecl {
    FunctionDecl {
        mutates: true,
        ..method_decl(name, params, ret, body)
    }
}

pub fn impl_block(target: &str, methods: Vec<ImplMethod>) -> Stmt {
    Stmt::ImplBlock(ImplBlock { target: target.into(), methods, span: sp() })
}

pub fn trait_decl(name: &str, methods: Vec<TraitMethod>) -> Stmt {
    Stmt::TraitDecl(TraitDecl {
        name: name.into(),
        methods,
        private: false,
        span: sp(),
    })
}

pub fn trait_method(name: &str, params: Vec<Param>, ret: Option<TypeExpr>) -> TraitMethod {
    TraitMethod { name: name.into(), params, ret, span: sp() }
}

pub fn trait_impl(trait_name: &str, target: &str, methods: Vec<FunctionDecl>) -> Stmt {
    Stmt::TraitImpl(TraitImpl {
        trait_name: trait_name.into(),
        target: target.into(),
        methods,
        span: sp(),
    })
}

// ── Type annotations ───────────────────────────────────────────────────

pub fn t_int() -> TypeExpr {
    TypeExpr::Name { name: "Int".into(), span: sp() }
}

pub fn t_str() -> TypeExpr {
    TypeExpr::Name { name: "Str".into(), span: sp() }
}

pub fn t_float() -> TypeExpr {
    TypeExpr::Name { name: "Float".into(), span: sp() }
}

pub fn t_bool() -> TypeExpr {
    TypeExpr::Name { name: "Bool".into(), span: sp() }
}

pub fn t_name(name: &str) -> TypeExpr {
    TypeExpr::Name { name: name.into(), span: sp() }
}

pub fn t_gen(name: &str) -> TypeExpr {
    TypeExpr::Generic { name: name.into(), span: sp() }
}

pub fn t_list(of: TypeExpr) -> TypeExpr {
    TypeExpr::List { of: Box::new(of), span: sp() }
}

pub fn t_map(key: TypeExpr, value: TypeExpr) -> TypeExpr {
    TypeExpr::Map { key: Box::new(key), value: Box::new(value), span: sp() }
}

pub fn t_maybe(of: TypeExpr) -> TypeExpr {
    TypeExpr::Maybe { of: Box::new(of), span: sp() }
}

pub fn t_result(val: TypeExpr, err: TypeExpr) -> TypeExpr {
    TypeExpr::Result { val: Box::new(val), err: Box::new(err), span: sp() }
}

pub fn t_fn(params: Vec<TypeExpr>, ret: TypeExpr) -> TypeExpr {
    TypeExpr::Fn { params, ret: Box::new(ret), span: sp() }
}
