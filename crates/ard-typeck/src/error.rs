//! Checker errors and the diagnostic stream.
//!
//! Every rule violation becomes a [`TypeError`] carrying the span it was
//! detected at. Errors are collected, never thrown; the checker keeps
//! going after recoverable ones so a single pass surfaces as much as
//! possible. [`Diagnostic`] is the serialized, file-qualified form handed
//! to consumers.

use std::fmt;

use ard_common::Span;
use serde::Serialize;

/// A checker error or warning.
#[derive(Clone, Debug)]
pub enum TypeError {
    // ── Resolution ──────────────────────────────────────────────────────
    UndefinedName { name: String, span: Span },
    UndefinedType { name: String, span: Span },
    UndefinedModule { name: String, span: Span },
    UndefinedMethod { ty: String, name: String, span: Span },
    UndefinedField { ty: String, name: String, span: Span },
    UndefinedVariant { enum_name: String, name: String, span: Span },
    UndefinedGeneric { name: String, span: Span },

    // ── Mutability ──────────────────────────────────────────────────────
    ReassignImmutable { name: String, span: Span },
    MutatingMethodOnImmutable { method: String, span: Span },
    /// A `mut` parameter given an argument that is neither mutable nor
    /// marked `mut` at the call site.
    MutArgRequired { param: String, span: Span },
    FiberCapturesMutable { name: String, span: Span },

    // ── Type mismatches ─────────────────────────────────────────────────
    TypeMismatch { expected: String, found: String, span: Span },
    ListElementMismatch { span: Span },
    MapValueMismatch { span: Span },
    InvalidOperands { op: String, lhs: String, rhs: String, span: Span },
    ConditionNotBool { found: String, span: Span },
    AssignVoid { span: Span },
    InvalidMapKey { found: String, span: Span },
    NestedMaybe { span: Span },
    ChainedEquality { span: Span },
    NotCallable { found: String, span: Span },
    NotIterable { found: String, span: Span },
    /// An anonymous-function parameter whose type cannot be inferred from
    /// the use site.
    ParamNeedsType { name: String, span: Span },

    // ── Structural ──────────────────────────────────────────────────────
    DuplicateName { name: String, span: Span },
    MissingField { strukt: String, field: String, span: Span },
    ExtraField { strukt: String, field: String, span: Span },
    WrongArgCount { expected: usize, found: usize, span: Span },
    MissingArgument { param: String, span: Span },
    UnknownNamedArg { name: String, span: Span },
    DuplicateArgument { name: String, span: Span },
    EmptyEnum { span: Span },
    DuplicateDiscriminant { variant: String, first: String, span: Span },
    EnumMethodMutates { method: String, span: Span },
    EmptyCollectionNoType { span: Span },

    // ── Exhaustiveness ──────────────────────────────────────────────────
    IncompleteMatch { missing: String, span: Span },
    MissingCatchAll { span: Span },
    DuplicateCase { case: String, span: Span },
    UnreachableCase { span: Span },
    MissingArm { arm: String, span: Span },
    InvalidPattern { subject: String, span: Span },
    CannotMatch { found: String, span: Span },

    // ── Generics ────────────────────────────────────────────────────────
    UnresolvedGeneric { name: String, span: Span },
    WrongTypeArgCount { expected: usize, found: usize, span: Span },

    // ── Control flow ────────────────────────────────────────────────────
    TryOutsideFunction { span: Span },
    BreakOutsideLoop { span: Span },
    TryOperandNotFallible { found: String, span: Span },
    TryReturnMismatch { operand: String, ret: String, span: Span },

    // ── Traits ──────────────────────────────────────────────────────────
    NotATrait { name: String, span: Span },
    MissingTraitMethod { trait_name: String, method: String, span: Span },
    TraitMethodMismatch { trait_name: String, method: String, span: Span },
    /// Warn: an impl block names a method the trait does not declare.
    UnknownTraitMethod { trait_name: String, method: String, span: Span },
    MissingToString { found: String, span: Span },

    // ── Modules ─────────────────────────────────────────────────────────
    ModuleCycle { path: String, span: Span },
    ModuleUnreadable { path: String, reason: String, span: Span },
    ImportHadErrors { path: String, count: usize, span: Span },
    PrivateSymbol { module: String, name: String, span: Span },
    /// Warn: the same module imported twice (possibly via alias).
    DuplicateImport { name: String, span: Span },

    // ── Fibers ──────────────────────────────────────────────────────────
    FiberArgNotFunction { found: String, span: Span },
}

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warn,
}

impl TypeError {
    pub fn severity(&self) -> Severity {
        match self {
            TypeError::UnknownTraitMethod { .. } | TypeError::DuplicateImport { .. } => {
                Severity::Warn
            }
            _ => Severity::Error,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeError::UndefinedName { span, .. }
            | TypeError::UndefinedType { span, .. }
            | TypeError::UndefinedModule { span, .. }
            | TypeError::UndefinedMethod { span, .. }
            | TypeError::UndefinedField { span, .. }
            | TypeError::UndefinedVariant { span, .. }
            | TypeError::UndefinedGeneric { span, .. }
            | TypeError::ReassignImmutable { span, .. }
            | TypeError::MutatingMethodOnImmutable { span, .. }
            | TypeError::MutArgRequired { span, .. }
            | TypeError::FiberCapturesMutable { span, .. }
            | TypeError::TypeMismatch { span, .. }
            | TypeError::ListElementMismatch { span }
            | TypeError::MapValueMismatch { span }
            | TypeError::InvalidOperands { span, .. }
            | TypeError::ConditionNotBool { span, .. }
            | TypeError::AssignVoid { span }
            | TypeError::InvalidMapKey { span, .. }
            | TypeError::NestedMaybe { span }
            | TypeError::ChainedEquality { span }
            | TypeError::NotCallable { span, .. }
            | TypeError::NotIterable { span, .. }
            | TypeError::ParamNeedsType { span, .. }
            | TypeError::DuplicateName { span, .. }
            | TypeError::MissingField { span, .. }
            | TypeError::ExtraField { span, .. }
            | TypeError::WrongArgCount { span, .. }
            | TypeError::MissingArgument { span, .. }
            | TypeError::UnknownNamedArg { span, .. }
            | TypeError::DuplicateArgument { span, .. }
            | TypeError::EmptyEnum { span }
            | TypeError::DuplicateDiscriminant { span, .. }
            | TypeError::EnumMethodMutates { span, .. }
            | TypeError::EmptyCollectionNoType { span }
            | TypeError::IncompleteMatch { span, .. }
            | TypeError::MissingCatchAll { span }
            | TypeError::DuplicateCase { span, .. }
            | TypeError::UnreachableCase { span }
            | TypeError::MissingArm { span, .. }
            | TypeError::InvalidPattern { span, .. }
            | TypeError::CannotMatch { span, .. }
            | TypeError::UnresolvedGeneric { span, .. }
            | TypeError::WrongTypeArgCount { span, .. }
            | TypeError::TryOutsideFunction { span }
            | TypeError::BreakOutsideLoop { span }
            | TypeError::TryOperandNotFallible { span, .. }
            | TypeError::TryReturnMismatch { span, .. }
            | TypeError::NotATrait { span, .. }
            | TypeError::MissingTraitMethod { span, .. }
            | TypeError::TraitMethodMismatch { span, .. }
            | TypeError::UnknownTraitMethod { span, .. }
            | TypeError::MissingToString { span, .. }
            | TypeError::ModuleCycle { span, .. }
            | TypeError::ModuleUnreadable { span, .. }
            | TypeError::ImportHadErrors { span, .. }
            | TypeError::PrivateSymbol { span, .. }
            | TypeError::DuplicateImport { span, .. }
            | TypeError::FiberArgNotFunction { span, .. } => *span,
        }
    }

    /// Build the file-qualified diagnostic for this error.
    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        Diagnostic {
            severity: self.severity(),
            message: self.to_string(),
            file: file.to_string(),
            span: self.span(),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::UndefinedName { name, .. } => {
                write!(f, "Undefined: {}", name)
            }
            TypeError::UndefinedType { name, .. } => {
                write!(f, "Undefined type: {}", name)
            }
            TypeError::UndefinedModule { name, .. } => {
                write!(f, "Undefined module: {}", name)
            }
            TypeError::UndefinedMethod { ty, name, .. } => {
                write!(f, "Undefined method: {} has no method '{}'", ty, name)
            }
            TypeError::UndefinedField { ty, name, .. } => {
                write!(f, "Undefined field: {} has no field '{}'", ty, name)
            }
            TypeError::UndefinedVariant { enum_name, name, .. } => {
                write!(f, "Undefined variant: {}::{}", enum_name, name)
            }
            TypeError::UndefinedGeneric { name, .. } => {
                write!(f, "Undefined generic parameter: ${}", name)
            }
            TypeError::ReassignImmutable { name, .. } => {
                write!(f, "Cannot reassign immutable variable: {}", name)
            }
            TypeError::MutatingMethodOnImmutable { method, .. } => {
                write!(f, "Cannot call mutating method '{}' on immutable value", method)
            }
            TypeError::MutArgRequired { param, .. } => {
                write!(
                    f,
                    "Parameter '{}' mutates its argument; pass a mutable variable or mark the argument 'mut'",
                    param
                )
            }
            TypeError::FiberCapturesMutable { name, .. } => {
                write!(f, "Fiber closure cannot capture mutable variable: {}", name)
            }
            TypeError::TypeMismatch { expected, found, .. } => {
                write!(f, "Type mismatch: Expected {}, got {}", expected, found)
            }
            TypeError::ListElementMismatch { .. } => {
                write!(f, "Type mismatch: A list can only contain values of single type")
            }
            TypeError::MapValueMismatch { .. } => {
                write!(f, "Type mismatch: A map can only contain values of single type")
            }
            TypeError::InvalidOperands { op, lhs, rhs, .. } => {
                write!(f, "Invalid operands for '{}': {} and {}", op, lhs, rhs)
            }
            TypeError::ConditionNotBool { found, .. } => {
                write!(f, "Condition must be Bool, got {}", found)
            }
            TypeError::AssignVoid { .. } => {
                write!(f, "Cannot assign a Void value")
            }
            TypeError::InvalidMapKey { found, .. } => {
                write!(f, "Map keys must be Str or Int, got {}", found)
            }
            TypeError::NestedMaybe { .. } => {
                write!(f, "Nullability does not nest: T?? is not a type")
            }
            TypeError::ChainedEquality { .. } => {
                write!(f, "Equality operators cannot be chained")
            }
            TypeError::NotCallable { found, .. } => {
                write!(f, "{} is not callable", found)
            }
            TypeError::NotIterable { found, .. } => {
                write!(f, "Cannot iterate over {}", found)
            }
            TypeError::ParamNeedsType { name, .. } => {
                write!(f, "Parameter '{}' needs a type annotation", name)
            }
            TypeError::DuplicateName { name, .. } => {
                write!(f, "Duplicate name: {}", name)
            }
            TypeError::MissingField { strukt, field, .. } => {
                write!(f, "Missing field '{}' for {}", field, strukt)
            }
            TypeError::ExtraField { strukt, field, .. } => {
                write!(f, "{} has no field '{}'", strukt, field)
            }
            TypeError::WrongArgCount { expected, found, .. } => {
                write!(f, "Expected {} arguments, got {}", expected, found)
            }
            TypeError::MissingArgument { param, .. } => {
                write!(f, "Missing argument: {}", param)
            }
            TypeError::UnknownNamedArg { name, .. } => {
                write!(f, "Unknown named argument: {}", name)
            }
            TypeError::DuplicateArgument { name, .. } => {
                write!(f, "Argument '{}' given more than once", name)
            }
            TypeError::EmptyEnum { .. } => {
                write!(f, "Enum needs at least one variant")
            }
            TypeError::DuplicateDiscriminant { variant, first, .. } => {
                write!(f, "Variant '{}' reuses the discriminant of '{}'", variant, first)
            }
            TypeError::EnumMethodMutates { method, .. } => {
                write!(f, "Enum method '{}' cannot mutate", method)
            }
            TypeError::EmptyCollectionNoType { .. } => {
                write!(f, "Empty collection literal needs a declared type")
            }
            TypeError::IncompleteMatch { missing, .. } => {
                write!(f, "Incomplete match: missing case for '{}'", missing)
            }
            TypeError::MissingCatchAll { .. } => {
                write!(f, "Incomplete match: an Int match requires a catch-all case")
            }
            TypeError::DuplicateCase { case, .. } => {
                write!(f, "Duplicate case: {}", case)
            }
            TypeError::UnreachableCase { .. } => {
                write!(f, "Unreachable case")
            }
            TypeError::MissingArm { arm, .. } => {
                write!(f, "Incomplete match: missing {} arm", arm)
            }
            TypeError::InvalidPattern { subject, .. } => {
                write!(f, "Pattern does not apply to a {} subject", subject)
            }
            TypeError::CannotMatch { found, .. } => {
                write!(f, "Cannot match on a value of type {}", found)
            }
            TypeError::UnresolvedGeneric { name, .. } => {
                write!(f, "Cannot resolve generic parameter ${} from context", name)
            }
            TypeError::WrongTypeArgCount { expected, found, .. } => {
                write!(f, "Expected {} type arguments, got {}", expected, found)
            }
            TypeError::TryOutsideFunction { .. } => {
                write!(f, "'try' is only allowed inside a function body")
            }
            TypeError::BreakOutsideLoop { .. } => {
                write!(f, "'break' outside of a loop")
            }
            TypeError::TryOperandNotFallible { found, .. } => {
                write!(f, "'try' needs a Result or Maybe operand, got {}", found)
            }
            TypeError::TryReturnMismatch { operand, ret, .. } => {
                write!(
                    f,
                    "'try' on {} cannot propagate from a function returning {}",
                    operand, ret
                )
            }
            TypeError::NotATrait { name, .. } => {
                write!(f, "{} is not a trait", name)
            }
            TypeError::MissingTraitMethod { trait_name, method, .. } => {
                write!(f, "Implementation of {} is missing method '{}'", trait_name, method)
            }
            TypeError::TraitMethodMismatch { trait_name, method, .. } => {
                write!(
                    f,
                    "Method '{}' does not match the signature declared by {}",
                    method, trait_name
                )
            }
            TypeError::UnknownTraitMethod { trait_name, method, .. } => {
                write!(f, "{} does not declare a method '{}'", trait_name, method)
            }
            TypeError::MissingToString { found, .. } => {
                write!(f, "{} does not implement ToString", found)
            }
            TypeError::ModuleCycle { path, .. } => {
                write!(f, "Import cycle: {}", path)
            }
            TypeError::ModuleUnreadable { path, reason, .. } => {
                write!(f, "Cannot load module '{}': {}", path, reason)
            }
            TypeError::ImportHadErrors { path, count, .. } => {
                write!(f, "Module '{}' has {} error(s)", path, count)
            }
            TypeError::PrivateSymbol { module, name, .. } => {
                write!(f, "'{}' is private in module {}", name, module)
            }
            TypeError::DuplicateImport { name, .. } => {
                write!(f, "Duplicate import: {}", name)
            }
            TypeError::FiberArgNotFunction { found, .. } => {
                write!(f, "Fibers need a function argument, got {}", found)
            }
        }
    }
}

/// A file-qualified diagnostic, the shape consumers receive.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub file: String,
    pub span: Span,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.severity {
            Severity::Error => "error",
            Severity::Warn => "warning",
        };
        write!(f, "{}: {} ({}:{})", kind, self.message, self.file, self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_messages() {
        let err = TypeError::TypeMismatch {
            expected: "Int".into(),
            found: "Str".into(),
            span: Span::new(0, 3),
        };
        assert_eq!(err.to_string(), "Type mismatch: Expected Int, got Str");

        let err = TypeError::IncompleteMatch {
            missing: "Dir::down".into(),
            span: Span::new(0, 3),
        };
        assert_eq!(err.to_string(), "Incomplete match: missing case for 'Dir::down'");

        let err = TypeError::ListElementMismatch { span: Span::new(0, 3) };
        assert_eq!(
            err.to_string(),
            "Type mismatch: A list can only contain values of single type"
        );

        let warn = TypeError::DuplicateImport { name: "fs".into(), span: Span::new(0, 3) };
        assert_eq!(warn.to_string(), "Duplicate import: fs");
        assert_eq!(warn.severity(), Severity::Warn);
    }

    #[test]
    fn diagnostic_carries_file_and_span() {
        let err = TypeError::BreakOutsideLoop { span: Span::new(10, 15) };
        let diag = err.to_diagnostic("main.ard");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.file, "main.ard");
        assert_eq!(diag.span, Span::new(10, 15));
        assert_eq!(diag.to_string(), "error: 'break' outside of a loop (main.ard:10..15)");
    }
}
