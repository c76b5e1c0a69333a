//! Module resolution and caching.
//!
//! Two spaces: standard library modules (`ard/...`) come from the built-in
//! registry in [`crate::builtins`]; user modules come from a
//! [`ModuleSource`] the driver supplies, get checked recursively, and are
//! cached by path. A path that is looked up while still being checked is
//! an import cycle.
//!
//! The cache lives on the [`crate::Session`], never in process globals, so
//! concurrent sessions do not share state. A session is single-threaded;
//! wrap it in a lock if compilation units must share one across threads.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use ard_syntax::Program;

use crate::registry::{AliasInfo, EnumInfo, StructInfo, TraitInfo, UnionInfo};
use crate::ty::Ty;

/// Why a user module could not be loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleLoadError {
    NotFound,
    Unreadable(String),
}

/// Maps import paths to parsed trees. Implemented by the driver (reading
/// and parsing files) and by tests (handing back prebuilt trees).
pub trait ModuleSource {
    fn load(&self, path: &str) -> Result<Program, ModuleLoadError>;
}

/// A source that knows no modules; imports of user modules all fail.
pub struct NoModules;

impl ModuleSource for NoModules {
    fn load(&self, _path: &str) -> Result<Program, ModuleLoadError> {
        Err(ModuleLoadError::NotFound)
    }
}

/// The public symbols of a checked module.
#[derive(Debug, Default, Clone)]
pub struct ModuleExports {
    /// Value bindings: public functions plus immutable top-level variables.
    pub symbols: FxHashMap<String, Ty>,
    pub structs: FxHashMap<String, StructInfo>,
    pub enums: FxHashMap<String, EnumInfo>,
    pub unions: FxHashMap<String, UnionInfo>,
    pub traits: FxHashMap<String, TraitInfo>,
    pub aliases: FxHashMap<String, AliasInfo>,
}

/// A resolved compilation unit, cached per session.
#[derive(Debug)]
pub struct Module {
    path: String,
    pub exports: ModuleExports,
    /// Number of errors produced while checking this module.
    pub error_count: usize,
}

impl Module {
    pub fn new(path: impl Into<String>, exports: ModuleExports) -> Self {
        Module { path: path.into(), exports, error_count: 0 }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Look up a public value binding.
    pub fn get(&self, name: &str) -> Option<&Ty> {
        self.exports.symbols.get(name)
    }
}

#[derive(Clone)]
enum ModuleState {
    /// Checking has started but not finished: seeing this is a cycle.
    InProgress,
    Ready(Rc<Module>),
}

/// The per-session module cache.
#[derive(Default)]
pub struct ModuleMap {
    entries: FxHashMap<String, ModuleState>,
}

/// Result of a cache probe.
pub enum CacheLookup {
    Missing,
    InProgress,
    Ready(Rc<Module>),
}

impl ModuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, path: &str) -> CacheLookup {
        match self.entries.get(path) {
            None => CacheLookup::Missing,
            Some(ModuleState::InProgress) => CacheLookup::InProgress,
            Some(ModuleState::Ready(module)) => CacheLookup::Ready(Rc::clone(module)),
        }
    }

    /// Mark a path as being checked, for cycle detection.
    pub fn begin(&mut self, path: &str) {
        self.entries.insert(path.to_string(), ModuleState::InProgress);
    }

    pub fn finish(&mut self, path: &str, module: Module) -> Rc<Module> {
        let module = Rc::new(module);
        self.entries
            .insert(path.to_string(), ModuleState::Ready(Rc::clone(&module)));
        module
    }
}

/// Whether an import path names a standard library module.
pub fn is_stdlib_path(path: &str) -> bool {
    path.starts_with("ard/")
}

/// Stdlib modules auto-imported into every non-stdlib compilation unit.
pub const PRELUDE: &[&str] = &["ard/maybe", "ard/result", "ard/string"];
