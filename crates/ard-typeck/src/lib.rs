//! The Ard semantic analyzer.
//!
//! Consumes a parsed syntax tree ([`ard_syntax::Program`]) and produces a
//! fully annotated, desugared checked program ([`ir::Program`]) together
//! with a stream of human-readable diagnostics. The checked program is
//! the canonical input to downstream execution and to module consumers.
//!
//! # Architecture
//!
//! - [`ty`]: type representation (primitives, collections, nominals,
//!   generic cells)
//! - [`unify`]: the unification table -- dereferencing, substitution,
//!   in-place generic binding
//! - [`env`]: lexical scopes, symbols, mutability, generic contexts
//! - [`registry`]: struct/enum/union/trait/alias definitions
//! - [`modules`]: module resolution and the per-session cache
//! - [`builtins`]: the `ard/...` standard library surface
//! - [`check`] + [`matches`]: the statement and expression checkers
//! - [`ir`]: the checked program
//! - [`error`] + [`diagnostics`]: the diagnostic taxonomy and rendering
//!
//! # Sessions
//!
//! A [`Session`] owns the module cache and accumulates diagnostics across
//! every compilation unit it touches; nothing is process-global. The
//! convenience [`check`] entry runs a single unit with no user modules.
//!
//! Note one deliberate looseness, inherited from the language: `try` on a
//! `Maybe` operand without a catch clause only requires the enclosing
//! function to return *some* `Maybe` type -- the inner types are not
//! constrained, and `none` propagates across them.

pub mod builtins;
pub mod check;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod ir;
pub mod matches;
pub mod modules;
pub mod registry;
pub mod ty;
pub mod unify;

use tracing::debug;

use ard_syntax::Program;

use crate::diagnostics::DiagnosticOptions;
use crate::error::{Diagnostic, Severity};
use crate::modules::{ModuleMap, ModuleSource, NoModules};

/// The result of checking a compilation unit.
///
/// The IR may be partial when errors are present: the checker continues
/// past recoverable errors and halts only on structural ones (see
/// [`CheckResult::halted`]).
pub struct CheckResult {
    pub program: ir::Program,
    /// Diagnostics for the checked unit and every module it pulled in.
    pub diagnostics: Vec<Diagnostic>,
    /// A structural error stopped statement-level checking early.
    pub halted: bool,
}

impl CheckResult {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warn)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Render the diagnostics that belong to `file` against its source
    /// text.
    pub fn render_for_file(
        &self,
        file: &str,
        source: &str,
        options: &DiagnosticOptions,
    ) -> Vec<String> {
        self.diagnostics
            .iter()
            .filter(|d| d.file == file)
            .map(|d| diagnostics::render_diagnostic(d, source, options))
            .collect()
    }

    /// The machine-readable diagnostic stream.
    pub fn diagnostics_json(&self) -> String {
        diagnostics::render_json(&self.diagnostics)
    }
}

/// A compilation session: owns the module cache and the module source.
///
/// Sessions are single-threaded; share one across threads only behind a
/// lock.
pub struct Session {
    source: Box<dyn ModuleSource>,
    cache: ModuleMap,
}

impl Session {
    pub fn new(source: Box<dyn ModuleSource>) -> Self {
        Session { source, cache: ModuleMap::new() }
    }

    /// Check one compilation unit. Imported user modules are loaded
    /// through the session's [`ModuleSource`], checked recursively, and
    /// cached for the session's lifetime.
    pub fn check(&mut self, file: &str, program: &Program) -> CheckResult {
        debug!(file, "checking compilation unit");
        let mut sink = Vec::new();
        let outcome =
            check::check_module(program, file, self.source.as_ref(), &mut self.cache, &mut sink);
        CheckResult {
            program: outcome.program,
            diagnostics: sink,
            halted: outcome.halted,
        }
    }
}

/// Check a single compilation unit that imports no user modules.
pub fn check(program: &Program) -> CheckResult {
    Session::new(Box::new(NoModules)).check("main.ard", program)
}
