//! Match desugaring and exhaustiveness checking.
//!
//! A `match` is desugared into one of several specialized IR nodes picked
//! by the subject's type, each with its own exhaustiveness rule:
//!
//! | subject     | node          | rule                                    |
//! |-------------|---------------|-----------------------------------------|
//! | `Maybe(T)`  | `OptionMatch` | binding case and wildcard both required |
//! | enum        | `EnumMatch`   | every variant, or a catch-all           |
//! | `Bool`      | `BoolMatch`   | both literals; catch-all forbidden      |
//! | union       | `UnionMatch`  | every member, or a catch-all            |
//! | `Result`    | `ResultMatch` | both arms required                      |
//! | `Int`       | `IntMatch`    | catch-all required                      |
//!
//! The surface language has no nested patterns, so exhaustiveness is a
//! per-subject-type rule set rather than a pattern-matrix algorithm.
//! All arms of a match must yield one type; duplicate arms are errors.

use ard_common::Span;
use ard_syntax::ast;

use crate::check::Checker;
use crate::error::TypeError;
use crate::ir;
use crate::ty::Ty;

pub(crate) fn check_match(
    checker: &mut Checker<'_>,
    m: &ast::MatchExpr,
    expected: Option<&Ty>,
) -> Option<ir::Expr> {
    let subject = checker.check_expr(&m.subject, None)?;
    let subject_ty = checker.table.resolve(&subject.ty());

    match subject_ty {
        Ty::Maybe(inner) => check_maybe_match(checker, m, subject, *inner, expected),
        Ty::Enum(name) => check_enum_match(checker, m, subject, &name, expected),
        Ty::Bool => check_bool_match(checker, m, subject, expected),
        Ty::Union(name) => check_union_match(checker, m, subject, &name, expected),
        Ty::Result(val, err) => {
            check_result_match(checker, m, subject, *val, *err, expected)
        }
        Ty::Int => check_int_match(checker, m, subject, expected),
        other => {
            checker.errors.push(TypeError::CannotMatch {
                found: other.to_string(),
                span: m.span,
            });
            None
        }
    }
}

/// Check one arm body against the match's single result type.
fn check_arm_body(
    checker: &mut Checker<'_>,
    body: &ast::Expr,
    expected: Option<&Ty>,
    result_ty: &mut Option<Ty>,
    span: Span,
) -> Option<ir::Expr> {
    let hint = expected.or(result_ty.as_ref()).cloned();
    let checked = checker.check_expr(body, hint.as_ref())?;
    let body_ty = checker.table.resolve(&checked.ty());
    match result_ty {
        None => *result_ty = Some(body_ty),
        Some(first) => {
            let first = first.clone();
            if !checker.table.types_equal(&first, &body_ty) {
                checker.errors.push(TypeError::TypeMismatch {
                    expected: checker.table.display(&first),
                    found: checker.table.display(&body_ty),
                    span,
                });
                return None;
            }
        }
    }
    Some(checked)
}

// ── Maybe ──────────────────────────────────────────────────────────────

fn check_maybe_match(
    checker: &mut Checker<'_>,
    m: &ast::MatchExpr,
    subject: ir::Expr,
    inner: Ty,
    expected: Option<&Ty>,
) -> Option<ir::Expr> {
    let mut result_ty: Option<Ty> = None;
    let mut some_case: Option<(String, ir::Expr)> = None;
    let mut none_case: Option<ir::Expr> = None;

    for arm in &m.arms {
        match &arm.pattern {
            ast::Pattern::Binding { name, span } => {
                if some_case.is_some() {
                    checker.errors.push(TypeError::DuplicateCase {
                        case: name.clone(),
                        span: *span,
                    });
                    continue;
                }
                checker.scope.push();
                let _ = checker.scope.declare(name, inner.clone(), false);
                let body =
                    check_arm_body(checker, &arm.body, expected, &mut result_ty, arm.span);
                checker.scope.pop();
                some_case = Some((name.clone(), body?));
            }
            ast::Pattern::Wildcard { span } => {
                if none_case.is_some() {
                    checker.errors.push(TypeError::DuplicateCase {
                        case: "_".into(),
                        span: *span,
                    });
                    continue;
                }
                none_case =
                    Some(check_arm_body(checker, &arm.body, expected, &mut result_ty, arm.span)?);
            }
            other => {
                checker.errors.push(TypeError::InvalidPattern {
                    subject: format!("{}?", inner),
                    span: other.span(),
                });
            }
        }
    }

    let mut complete = true;
    if some_case.is_none() {
        checker.errors.push(TypeError::MissingArm { arm: "some".into(), span: m.span });
        complete = false;
    }
    if none_case.is_none() {
        checker.errors.push(TypeError::MissingArm { arm: "none".into(), span: m.span });
        complete = false;
    }
    if !complete {
        return None;
    }

    let (binding, some_body) = some_case.expect("checked above");
    Some(ir::Expr::OptionMatch {
        subject: Box::new(subject),
        inner_ty: inner,
        binding,
        some_body: Box::new(some_body),
        none_body: Box::new(none_case.expect("checked above")),
        ty: result_ty.unwrap_or(Ty::Void),
    })
}

// ── Enum ───────────────────────────────────────────────────────────────

fn check_enum_match(
    checker: &mut Checker<'_>,
    m: &ast::MatchExpr,
    subject: ir::Expr,
    enum_name: &str,
    expected: Option<&Ty>,
) -> Option<ir::Expr> {
    let Some(info) = checker.find_enum(enum_name) else {
        checker.errors.push(TypeError::UndefinedType {
            name: enum_name.to_string(),
            span: m.span,
        });
        return None;
    };

    let mut result_ty: Option<Ty> = None;
    let mut cases: Vec<Option<ir::Expr>> = vec![None; info.variants.len()];
    let mut catch_all: Option<ir::Expr> = None;

    for arm in &m.arms {
        match &arm.pattern {
            ast::Pattern::Member { parent, name, span } => {
                if parent != enum_name {
                    checker.errors.push(TypeError::InvalidPattern {
                        subject: enum_name.to_string(),
                        span: *span,
                    });
                    continue;
                }
                let Some(index) = info.variant_index(name) else {
                    checker.errors.push(TypeError::UndefinedVariant {
                        enum_name: enum_name.to_string(),
                        name: name.clone(),
                        span: *span,
                    });
                    continue;
                };
                if cases[index].is_some() {
                    checker.errors.push(TypeError::DuplicateCase {
                        case: format!("{}::{}", enum_name, name),
                        span: *span,
                    });
                    continue;
                }
                let body =
                    check_arm_body(checker, &arm.body, expected, &mut result_ty, arm.span)?;
                cases[index] = Some(body);
            }
            ast::Pattern::Wildcard { span } => {
                if catch_all.is_some() {
                    checker.errors.push(TypeError::DuplicateCase {
                        case: "_".into(),
                        span: *span,
                    });
                    continue;
                }
                catch_all =
                    Some(check_arm_body(checker, &arm.body, expected, &mut result_ty, arm.span)?);
            }
            other => {
                checker.errors.push(TypeError::InvalidPattern {
                    subject: enum_name.to_string(),
                    span: other.span(),
                });
            }
        }
    }

    if catch_all.is_none() {
        for (variant, case) in info.variants.iter().zip(&cases) {
            if case.is_none() {
                checker.errors.push(TypeError::IncompleteMatch {
                    missing: format!("{}::{}", enum_name, variant.name),
                    span: m.span,
                });
            }
        }
        if cases.iter().any(Option::is_none) {
            return None;
        }
    }

    Some(ir::Expr::EnumMatch {
        subject: Box::new(subject),
        enum_name: enum_name.to_string(),
        cases,
        catch_all: catch_all.map(Box::new),
        ty: result_ty.unwrap_or(Ty::Void),
    })
}

// ── Bool ───────────────────────────────────────────────────────────────

fn check_bool_match(
    checker: &mut Checker<'_>,
    m: &ast::MatchExpr,
    subject: ir::Expr,
    expected: Option<&Ty>,
) -> Option<ir::Expr> {
    let mut result_ty: Option<Ty> = None;
    let mut true_body: Option<ir::Expr> = None;
    let mut false_body: Option<ir::Expr> = None;

    for arm in &m.arms {
        match &arm.pattern {
            ast::Pattern::Bool { value, span } => {
                let slot = if *value { &mut true_body } else { &mut false_body };
                if slot.is_some() {
                    checker.errors.push(TypeError::DuplicateCase {
                        case: value.to_string(),
                        span: *span,
                    });
                    continue;
                }
                *slot =
                    Some(check_arm_body(checker, &arm.body, expected, &mut result_ty, arm.span)?);
            }
            // Both literals cover Bool, so a catch-all can never be
            // reached.
            ast::Pattern::Wildcard { span } => {
                checker.errors.push(TypeError::UnreachableCase { span: *span });
            }
            other => {
                checker.errors.push(TypeError::InvalidPattern {
                    subject: "Bool".into(),
                    span: other.span(),
                });
            }
        }
    }

    let mut complete = true;
    if true_body.is_none() {
        checker.errors.push(TypeError::MissingArm { arm: "true".into(), span: m.span });
        complete = false;
    }
    if false_body.is_none() {
        checker.errors.push(TypeError::MissingArm { arm: "false".into(), span: m.span });
        complete = false;
    }
    if !complete {
        return None;
    }

    Some(ir::Expr::BoolMatch {
        subject: Box::new(subject),
        true_body: Box::new(true_body.expect("checked above")),
        false_body: Box::new(false_body.expect("checked above")),
        ty: result_ty.unwrap_or(Ty::Void),
    })
}

// ── Union ──────────────────────────────────────────────────────────────

fn check_union_match(
    checker: &mut Checker<'_>,
    m: &ast::MatchExpr,
    subject: ir::Expr,
    union_name: &str,
    expected: Option<&Ty>,
) -> Option<ir::Expr> {
    let Some(info) = checker.find_union(union_name) else {
        checker.errors.push(TypeError::UndefinedType {
            name: union_name.to_string(),
            span: m.span,
        });
        return None;
    };

    let mut result_ty: Option<Ty> = None;
    let mut cases: Vec<ir::UnionCase> = Vec::new();
    let mut catch_all: Option<ir::Expr> = None;

    for arm in &m.arms {
        match &arm.pattern {
            ast::Pattern::Type { ty, binding, span } => {
                let resolved = checker.resolve_type(ty, &[]);
                let Some(member) = info
                    .members
                    .iter()
                    .find(|member| checker.table.types_equal(member, &resolved))
                    .cloned()
                else {
                    checker.errors.push(TypeError::InvalidPattern {
                        subject: union_name.to_string(),
                        span: *span,
                    });
                    continue;
                };
                if cases.iter().any(|c| c.member == member) {
                    checker.errors.push(TypeError::DuplicateCase {
                        case: member.to_string(),
                        span: *span,
                    });
                    continue;
                }
                checker.scope.push();
                if let Some(binding) = binding {
                    let _ = checker.scope.declare(binding, member.clone(), false);
                }
                let body =
                    check_arm_body(checker, &arm.body, expected, &mut result_ty, arm.span);
                checker.scope.pop();
                cases.push(ir::UnionCase {
                    member,
                    binding: binding.clone(),
                    body: body?,
                });
            }
            ast::Pattern::Wildcard { span } => {
                if catch_all.is_some() {
                    checker.errors.push(TypeError::DuplicateCase {
                        case: "_".into(),
                        span: *span,
                    });
                    continue;
                }
                catch_all =
                    Some(check_arm_body(checker, &arm.body, expected, &mut result_ty, arm.span)?);
            }
            other => {
                checker.errors.push(TypeError::InvalidPattern {
                    subject: union_name.to_string(),
                    span: other.span(),
                });
            }
        }
    }

    if catch_all.is_none() {
        let mut complete = true;
        for member in &info.members {
            if !cases.iter().any(|c| &c.member == member) {
                checker.errors.push(TypeError::IncompleteMatch {
                    missing: member.to_string(),
                    span: m.span,
                });
                complete = false;
            }
        }
        if !complete {
            return None;
        }
    }

    Some(ir::Expr::UnionMatch {
        subject: Box::new(subject),
        cases,
        catch_all: catch_all.map(Box::new),
        ty: result_ty.unwrap_or(Ty::Void),
    })
}

// ── Result ─────────────────────────────────────────────────────────────

fn check_result_match(
    checker: &mut Checker<'_>,
    m: &ast::MatchExpr,
    subject: ir::Expr,
    val: Ty,
    err: Ty,
    expected: Option<&Ty>,
) -> Option<ir::Expr> {
    let mut result_ty: Option<Ty> = None;
    let mut ok_case: Option<(String, ir::Expr)> = None;
    let mut err_case: Option<(String, ir::Expr)> = None;

    for arm in &m.arms {
        let (slot, binding, bound_ty, case_name) = match &arm.pattern {
            ast::Pattern::Ok { binding, .. } => (&mut ok_case, binding, &val, "ok"),
            ast::Pattern::Err { binding, .. } => (&mut err_case, binding, &err, "err"),
            other => {
                checker.errors.push(TypeError::InvalidPattern {
                    subject: format!("{}!{}", val, err),
                    span: other.span(),
                });
                continue;
            }
        };
        if slot.is_some() {
            checker.errors.push(TypeError::DuplicateCase {
                case: case_name.into(),
                span: arm.pattern.span(),
            });
            continue;
        }
        checker.scope.push();
        // `_` opts out of the binding.
        if binding != "_" {
            let _ = checker.scope.declare(binding, bound_ty.clone(), false);
        }
        let body = check_arm_body(checker, &arm.body, expected, &mut result_ty, arm.span);
        checker.scope.pop();
        *slot = Some((binding.clone(), body?));
    }

    let mut complete = true;
    if ok_case.is_none() {
        checker.errors.push(TypeError::MissingArm { arm: "ok".into(), span: m.span });
        complete = false;
    }
    if err_case.is_none() {
        checker.errors.push(TypeError::MissingArm { arm: "err".into(), span: m.span });
        complete = false;
    }
    if !complete {
        return None;
    }

    let (ok_binding, ok_body) = ok_case.expect("checked above");
    let (err_binding, err_body) = err_case.expect("checked above");
    Some(ir::Expr::ResultMatch {
        subject: Box::new(subject),
        ok_binding,
        ok_body: Box::new(ok_body),
        err_binding,
        err_body: Box::new(err_body),
        ty: result_ty.unwrap_or(Ty::Void),
    })
}

// ── Int ────────────────────────────────────────────────────────────────

fn check_int_match(
    checker: &mut Checker<'_>,
    m: &ast::MatchExpr,
    subject: ir::Expr,
    expected: Option<&Ty>,
) -> Option<ir::Expr> {
    let mut result_ty: Option<Ty> = None;
    let mut int_cases: Vec<(i64, ir::Expr)> = Vec::new();
    let mut range_cases: Vec<(i64, i64, ir::Expr)> = Vec::new();
    let mut catch_all: Option<ir::Expr> = None;

    for arm in &m.arms {
        match &arm.pattern {
            ast::Pattern::Number { .. } | ast::Pattern::Member { .. } => {
                let Some(value) = int_pattern_value(checker, &arm.pattern) else {
                    continue;
                };
                if int_cases.iter().any(|(existing, _)| *existing == value) {
                    checker.errors.push(TypeError::DuplicateCase {
                        case: value.to_string(),
                        span: arm.pattern.span(),
                    });
                    continue;
                }
                let body =
                    check_arm_body(checker, &arm.body, expected, &mut result_ty, arm.span)?;
                int_cases.push((value, body));
            }
            ast::Pattern::Range { lo, hi, span } => {
                let lo = int_pattern_value(checker, lo);
                let hi = int_pattern_value(checker, hi);
                let (Some(lo), Some(hi)) = (lo, hi) else { continue };
                if range_cases
                    .iter()
                    .any(|(existing_lo, existing_hi, _)| *existing_lo == lo && *existing_hi == hi)
                {
                    checker.errors.push(TypeError::DuplicateCase {
                        case: format!("{}..{}", lo, hi),
                        span: *span,
                    });
                    continue;
                }
                let body =
                    check_arm_body(checker, &arm.body, expected, &mut result_ty, arm.span)?;
                range_cases.push((lo, hi, body));
            }
            ast::Pattern::Wildcard { span } => {
                if catch_all.is_some() {
                    checker.errors.push(TypeError::DuplicateCase {
                        case: "_".into(),
                        span: *span,
                    });
                    continue;
                }
                catch_all =
                    Some(check_arm_body(checker, &arm.body, expected, &mut result_ty, arm.span)?);
            }
            other => {
                checker.errors.push(TypeError::InvalidPattern {
                    subject: "Int".into(),
                    span: other.span(),
                });
            }
        }
    }

    // Int is not finitely enumerable, so the catch-all is mandatory.
    let Some(catch_all) = catch_all else {
        checker.errors.push(TypeError::MissingCatchAll { span: m.span });
        return None;
    };

    Some(ir::Expr::IntMatch {
        subject: Box::new(subject),
        int_cases,
        range_cases,
        catch_all: Box::new(catch_all),
        ty: result_ty.unwrap_or(Ty::Void),
    })
}

/// The integer value of an Int-match pattern: a number literal (negative
/// via unary minus) or an enum variant's discriminant.
fn int_pattern_value(checker: &mut Checker<'_>, pattern: &ast::Pattern) -> Option<i64> {
    match pattern {
        ast::Pattern::Number { text, negative, span } => {
            let digits: String = text.chars().filter(|c| *c != '_').collect();
            match digits.parse::<i64>() {
                Ok(value) => Some(if *negative { -value } else { value }),
                Err(_) => {
                    checker.errors.push(TypeError::InvalidPattern {
                        subject: "Int".into(),
                        span: *span,
                    });
                    None
                }
            }
        }
        ast::Pattern::Member { parent, name, span } => {
            let Some(info) = checker.find_enum(parent) else {
                checker.errors.push(TypeError::UndefinedType {
                    name: parent.clone(),
                    span: *span,
                });
                return None;
            };
            match info.variant(name) {
                Some(variant) => Some(variant.discriminant),
                None => {
                    checker.errors.push(TypeError::UndefinedVariant {
                        enum_name: parent.clone(),
                        name: name.clone(),
                        span: *span,
                    });
                    None
                }
            }
        }
        other => {
            checker.errors.push(TypeError::InvalidPattern {
                subject: "Int".into(),
                span: other.span(),
            });
            None
        }
    }
}
