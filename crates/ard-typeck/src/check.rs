//! The statement and expression checker.
//!
//! Walks the parse tree top-down through statements, checks expressions
//! bottom-up, and emits the checked IR. Scope and registry state live on
//! [`Checker`]; generic inference goes through the shared [`TypeTable`]
//! cells so left-to-right argument checking propagates bindings.
//!
//! Errors are pushed into the checker's sink and checking continues where
//! recovery is sound; the `halted` flag stops statement-level checking
//! after a structural error (an untyped empty collection literal).

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use ard_common::Span;
use ard_syntax::ast::{self, BinaryOp, UnaryOp};

use crate::builtins;
use crate::env::{ScopeStack, RECEIVER};
use crate::error::{Diagnostic, Severity, TypeError};
use crate::ir;
use crate::matches;
use crate::modules::{
    is_stdlib_path, CacheLookup, Module, ModuleExports, ModuleLoadError, ModuleMap,
    ModuleSource, PRELUDE,
};
use crate::registry::{
    AliasInfo, EnumInfo, EnumVariantInfo, StructInfo, TraitInfo, TypeRegistry, UnionInfo,
};
use crate::ty::{FunSig, ParamSig, Ty};
use crate::unify::TypeTable;

/// Binding name used by desugared nullable accessor chains. Not spellable
/// in source, so it can never collide with a user name.
const UNWRAP_BINDING: &str = "%unwrap";

/// The outcome of checking one compilation unit.
pub(crate) struct ModuleCheck {
    pub program: ir::Program,
    pub exports: ModuleExports,
    pub error_count: usize,
    pub halted: bool,
}

/// Check one compilation unit. Nested imports recurse through `cache`;
/// diagnostics for every visited file accumulate in `sink`.
pub(crate) fn check_module(
    program: &ast::Program,
    file: &str,
    source: &dyn ModuleSource,
    cache: &mut ModuleMap,
    sink: &mut Vec<Diagnostic>,
) -> ModuleCheck {
    let mut checker = Checker {
        table: TypeTable::new(),
        scope: ScopeStack::new(),
        registry: TypeRegistry::new(),
        errors: Vec::new(),
        halted: false,
        loop_depth: 0,
        modules: Vec::new(),
        source,
        cache,
        file: file.to_string(),
    };
    let (ir_program, exports) = checker.run(program, sink);

    let error_count = checker
        .errors
        .iter()
        .filter(|e| e.severity() == Severity::Error)
        .count();
    debug!(file, errors = error_count, "module checked");

    sink.extend(checker.errors.iter().map(|e| e.to_diagnostic(file)));

    ModuleCheck {
        program: ir_program,
        exports,
        error_count,
        halted: checker.halted,
    }
}

pub(crate) struct Checker<'a> {
    pub table: TypeTable,
    pub scope: ScopeStack,
    pub registry: TypeRegistry,
    pub errors: Vec<TypeError>,
    pub halted: bool,
    loop_depth: u32,
    /// Imported modules in import order: local name -> module.
    modules: Vec<(String, Rc<Module>)>,
    source: &'a dyn ModuleSource,
    cache: &'a mut ModuleMap,
    file: String,
}

impl<'a> Checker<'a> {
    // ── Entry ───────────────────────────────────────────────────────────

    fn run(
        &mut self,
        program: &ast::Program,
        sink: &mut Vec<Diagnostic>,
    ) -> (ir::Program, ModuleExports) {
        self.import_prelude();

        let mut imports = Vec::new();
        let mut seen_names: FxHashSet<String> = FxHashSet::default();
        let mut seen_paths: FxHashSet<String> = FxHashSet::default();
        for decl in &program.imports {
            let local = decl.local_name().to_string();
            if seen_names.contains(&local) || seen_paths.contains(&decl.path) {
                self.errors.push(TypeError::DuplicateImport {
                    name: local.clone(),
                    span: decl.span,
                });
                continue;
            }
            if let Some(module) = self.resolve_import(decl, sink) {
                seen_names.insert(local.clone());
                seen_paths.insert(decl.path.clone());
                imports.push((local.clone(), module.path().to_string()));
                self.modules.push((local, module));
            }
        }

        let mut statements = Vec::new();
        for stmt in &program.statements {
            if self.halted {
                break;
            }
            if let Some(checked) = self.check_stmt(stmt) {
                statements.push(checked);
            }
        }

        let exports = self.collect_exports(program);
        (ir::Program { imports, statements }, exports)
    }

    fn import_prelude(&mut self) {
        for path in PRELUDE {
            let module = self
                .lookup_stdlib(path)
                .expect("prelude modules are always registered");
            let local = path
                .rsplit('/')
                .next()
                .expect("prelude path has a segment")
                .to_string();
            self.modules.push((local, module));
        }
    }

    fn lookup_stdlib(&mut self, path: &str) -> Option<Rc<Module>> {
        match self.cache.lookup(path) {
            CacheLookup::Ready(module) => Some(module),
            _ => {
                let module = builtins::stdlib_module(path)?;
                Some(self.cache.finish(path, module))
            }
        }
    }

    fn resolve_import(
        &mut self,
        decl: &ast::UseDecl,
        sink: &mut Vec<Diagnostic>,
    ) -> Option<Rc<Module>> {
        if is_stdlib_path(&decl.path) {
            let found = self.lookup_stdlib(&decl.path);
            if found.is_none() {
                self.errors.push(TypeError::UndefinedModule {
                    name: decl.path.clone(),
                    span: decl.span,
                });
            }
            return found;
        }

        match self.cache.lookup(&decl.path) {
            CacheLookup::Ready(module) => return Some(module),
            CacheLookup::InProgress => {
                self.errors.push(TypeError::ModuleCycle {
                    path: decl.path.clone(),
                    span: decl.span,
                });
                return None;
            }
            CacheLookup::Missing => {}
        }

        let parsed = match self.source.load(&decl.path) {
            Ok(parsed) => parsed,
            Err(ModuleLoadError::NotFound) => {
                self.errors.push(TypeError::UndefinedModule {
                    name: decl.path.clone(),
                    span: decl.span,
                });
                return None;
            }
            Err(ModuleLoadError::Unreadable(reason)) => {
                self.errors.push(TypeError::ModuleUnreadable {
                    path: decl.path.clone(),
                    reason,
                    span: decl.span,
                });
                return None;
            }
        };

        self.cache.begin(&decl.path);
        let nested = check_module(&parsed, &decl.path, self.source, self.cache, sink);
        if nested.error_count > 0 {
            self.errors.push(TypeError::ImportHadErrors {
                path: decl.path.clone(),
                count: nested.error_count,
                span: decl.span,
            });
        }
        let mut module = Module::new(decl.path.clone(), nested.exports);
        module.error_count = nested.error_count;
        Some(self.cache.finish(&decl.path, module))
    }

    /// Public symbols of this unit: non-private top-level definitions plus
    /// immutable top-level variable bindings.
    fn collect_exports(&mut self, program: &ast::Program) -> ModuleExports {
        let mut exports = ModuleExports::default();
        for stmt in &program.statements {
            match stmt {
                ast::Stmt::FunctionDecl(decl) if !decl.private => {
                    if let Some(found) = self.scope.get(&decl.name) {
                        exports.symbols.insert(decl.name.clone(), found.symbol.ty);
                    }
                }
                ast::Stmt::ExternFunction(decl) if !decl.private => {
                    if let Some(found) = self.scope.get(&decl.name) {
                        exports.symbols.insert(decl.name.clone(), found.symbol.ty);
                    }
                }
                ast::Stmt::VariableDecl(decl) if !decl.mutable => {
                    if let Some(found) = self.scope.get(&decl.name) {
                        exports.symbols.insert(decl.name.clone(), found.symbol.ty);
                    }
                }
                ast::Stmt::StructDecl(decl) if !decl.private => {
                    if let Some(info) = self.registry.structs.get(&decl.name) {
                        exports.structs.insert(decl.name.clone(), info.clone());
                    }
                }
                ast::Stmt::EnumDecl(decl) if !decl.private => {
                    if let Some(info) = self.registry.enums.get(&decl.name) {
                        exports.enums.insert(decl.name.clone(), info.clone());
                    }
                }
                ast::Stmt::TraitDecl(decl) if !decl.private => {
                    if let Some(info) = self.registry.traits.get(&decl.name) {
                        exports.traits.insert(decl.name.clone(), info.clone());
                    }
                }
                ast::Stmt::TypeDecl(decl) if !decl.private => {
                    if let Some(info) = self.registry.unions.get(&decl.name) {
                        exports.unions.insert(decl.name.clone(), info.clone());
                    } else if let Some(info) = self.registry.aliases.get(&decl.name) {
                        exports.aliases.insert(decl.name.clone(), info.clone());
                    }
                }
                _ => {}
            }
        }
        // Impl blocks mutate struct/enum definitions after registration, so
        // re-copy the final state.
        for (name, info) in exports.structs.iter_mut() {
            if let Some(current) = self.registry.structs.get(name) {
                *info = current.clone();
            }
        }
        for (name, info) in exports.enums.iter_mut() {
            if let Some(current) = self.registry.enums.get(name) {
                *info = current.clone();
            }
        }
        exports
    }

    // ── Nominal lookups (local first, then imports in order) ────────────

    fn find_module(&self, local: &str) -> Option<Rc<Module>> {
        self.modules
            .iter()
            .rev()
            .find(|(name, _)| name == local)
            .map(|(_, m)| Rc::clone(m))
    }

    pub(crate) fn find_struct(&self, name: &str) -> Option<StructInfo> {
        if let Some(info) = self.registry.structs.get(name) {
            return Some(info.clone());
        }
        self.modules
            .iter()
            .find_map(|(_, m)| m.exports.structs.get(name).cloned())
    }

    pub(crate) fn find_enum(&self, name: &str) -> Option<EnumInfo> {
        if let Some(info) = self.registry.enums.get(name) {
            return Some(info.clone());
        }
        self.modules
            .iter()
            .find_map(|(_, m)| m.exports.enums.get(name).cloned())
    }

    pub(crate) fn find_union(&self, name: &str) -> Option<UnionInfo> {
        if let Some(info) = self.registry.unions.get(name) {
            return Some(info.clone());
        }
        self.modules
            .iter()
            .find_map(|(_, m)| m.exports.unions.get(name).cloned())
    }

    fn find_trait(&self, name: &str) -> Option<TraitInfo> {
        if let Some(info) = self.registry.traits.get(name) {
            return Some(info.clone());
        }
        self.modules
            .iter()
            .find_map(|(_, m)| m.exports.traits.get(name).cloned())
    }

    fn find_alias(&self, name: &str) -> Option<AliasInfo> {
        if let Some(info) = self.registry.aliases.get(name) {
            return Some(info.clone());
        }
        self.modules
            .iter()
            .find_map(|(_, m)| m.exports.aliases.get(name).cloned())
    }

    /// Whether `ty` satisfies `trait_name`, checking local registrations
    /// and the built-in `ToString` coverage of primitives.
    fn satisfies_trait(&self, ty: &Ty, trait_name: &str) -> bool {
        if self.registry.satisfies(ty, trait_name) {
            return true;
        }
        // A struct imported from a module carries its traits with it.
        match ty {
            Ty::Struct { name, .. } => self
                .find_struct(name)
                .map(|s| s.traits.iter().any(|t| t == trait_name))
                .unwrap_or(false),
            Ty::Enum(name) => self
                .find_enum(name)
                .map(|e| e.traits.iter().any(|t| t == trait_name))
                .unwrap_or(false),
            _ => false,
        }
    }

    // ── Type annotation resolution ──────────────────────────────────────

    /// Resolve a source type annotation. `decl_generics` lists the generic
    /// parameter names valid at this declaration site; references to them
    /// become `Ty::Generic`, while names bound in an enclosing generic
    /// scope resolve to that scope's cell.
    pub(crate) fn resolve_type(&mut self, t: &ast::TypeExpr, decl_generics: &[String]) -> Ty {
        match t {
            ast::TypeExpr::Void { .. } => Ty::Void,
            ast::TypeExpr::Name { name, span } => self.resolve_type_name(name, *span),
            ast::TypeExpr::Generic { name, span } => {
                if decl_generics.iter().any(|g| g == name) {
                    Ty::Generic(name.clone())
                } else if let Some(cell) = self.scope.lookup_generic(name) {
                    Ty::Var(cell)
                } else {
                    self.errors.push(TypeError::UndefinedGeneric {
                        name: name.clone(),
                        span: *span,
                    });
                    Ty::Dynamic
                }
            }
            ast::TypeExpr::List { of, .. } => Ty::list(self.resolve_type(of, decl_generics)),
            ast::TypeExpr::Map { key, value, span } => {
                let key_ty = self.resolve_type(key, decl_generics);
                if !key_ty.is_map_key() && key_ty != Ty::Dynamic {
                    self.errors.push(TypeError::InvalidMapKey {
                        found: key_ty.to_string(),
                        span: *span,
                    });
                }
                let value_ty = self.resolve_type(value, decl_generics);
                Ty::map(key_ty, value_ty)
            }
            ast::TypeExpr::Maybe { of, span } => {
                let inner = self.resolve_type(of, decl_generics);
                if matches!(inner, Ty::Maybe(_)) {
                    self.errors.push(TypeError::NestedMaybe { span: *span });
                    return inner;
                }
                Ty::maybe(inner)
            }
            ast::TypeExpr::Result { val, err, .. } => {
                let val = self.resolve_type(val, decl_generics);
                let err = self.resolve_type(err, decl_generics);
                Ty::result(val, err)
            }
            ast::TypeExpr::Fn { params, ret, .. } => {
                let params = params
                    .iter()
                    .enumerate()
                    .map(|(i, p)| ParamSig {
                        name: format!("p{}", i),
                        ty: self.resolve_type(p, decl_generics),
                        mutable: false,
                    })
                    .collect();
                let ret = self.resolve_type(ret, decl_generics);
                Ty::fun(FunSig {
                    name: String::new(),
                    generics: Vec::new(),
                    params,
                    ret,
                    mutates: false,
                    private: false,
                })
            }
            ast::TypeExpr::Qualified { module, name, span } => {
                let Some(module) = self.find_module(module) else {
                    self.errors.push(TypeError::UndefinedModule {
                        name: module.clone(),
                        span: *span,
                    });
                    return Ty::Dynamic;
                };
                self.resolve_exported_type(&module, name, *span)
            }
            ast::TypeExpr::Applied { name, args, span } => {
                let Some(info) = self.find_struct(name) else {
                    self.errors.push(TypeError::UndefinedType {
                        name: name.clone(),
                        span: *span,
                    });
                    return Ty::Dynamic;
                };
                if info.generic_params.len() != args.len() {
                    self.errors.push(TypeError::WrongTypeArgCount {
                        expected: info.generic_params.len(),
                        found: args.len(),
                        span: *span,
                    });
                    return Ty::Dynamic;
                }
                let args = args
                    .iter()
                    .map(|a| self.resolve_type(a, decl_generics))
                    .collect();
                Ty::Struct { name: name.clone(), args }
            }
        }
    }

    fn resolve_type_name(&mut self, name: &str, span: Span) -> Ty {
        match name {
            "Str" => return Ty::Str,
            "Int" => return Ty::Int,
            "Float" => return Ty::Float,
            "Bool" => return Ty::Bool,
            "Void" => return Ty::Void,
            "Dynamic" => return Ty::Dynamic,
            _ => {}
        }
        if let Some(info) = self.find_struct(name) {
            if !info.generic_params.is_empty() {
                self.errors.push(TypeError::WrongTypeArgCount {
                    expected: info.generic_params.len(),
                    found: 0,
                    span,
                });
                return Ty::Dynamic;
            }
            return Ty::strukt(name);
        }
        if self.find_enum(name).is_some() {
            return Ty::Enum(name.to_string());
        }
        if self.find_union(name).is_some() {
            return Ty::Union(name.to_string());
        }
        if self.find_trait(name).is_some() {
            return Ty::Trait(name.to_string());
        }
        if let Some(alias) = self.find_alias(name) {
            return alias.ty;
        }
        self.errors.push(TypeError::UndefinedType {
            name: name.to_string(),
            span,
        });
        Ty::Dynamic
    }

    fn resolve_exported_type(&mut self, module: &Module, name: &str, span: Span) -> Ty {
        let exports = &module.exports;
        if let Some(info) = exports.structs.get(name) {
            if info.generic_params.is_empty() {
                return Ty::strukt(name);
            }
            self.errors.push(TypeError::WrongTypeArgCount {
                expected: info.generic_params.len(),
                found: 0,
                span,
            });
            return Ty::Dynamic;
        }
        if exports.enums.contains_key(name) {
            return Ty::Enum(name.to_string());
        }
        if exports.unions.contains_key(name) {
            return Ty::Union(name.to_string());
        }
        if exports.traits.contains_key(name) {
            return Ty::Trait(name.to_string());
        }
        if let Some(alias) = exports.aliases.get(name) {
            return alias.ty.clone();
        }
        self.errors.push(TypeError::UndefinedType {
            name: name.to_string(),
            span,
        });
        Ty::Dynamic
    }

    // ── Statements ──────────────────────────────────────────────────────

    pub(crate) fn check_stmt(&mut self, stmt: &ast::Stmt) -> Option<ir::Stmt> {
        match stmt {
            ast::Stmt::VariableDecl(decl) => self.check_variable_decl(decl).map(ir::Stmt::VariableDef),
            ast::Stmt::Assignment(assign) => {
                self.check_assignment(assign).map(ir::Stmt::Reassignment)
            }
            ast::Stmt::While(stmt) => self.check_while(stmt),
            ast::Stmt::For(stmt) => self.check_for(stmt),
            ast::Stmt::ForIn(stmt) => self.check_for_in(stmt),
            ast::Stmt::Range(stmt) => self.check_range_loop(stmt),
            ast::Stmt::FunctionDecl(decl) => {
                let checked = self.check_function_decl(decl, None)?;
                Some(ir::Stmt::FunctionDecl(checked))
            }
            ast::Stmt::ExternFunction(decl) => self.check_extern_function(decl),
            ast::Stmt::StructDecl(decl) => self.check_struct_decl(decl),
            ast::Stmt::EnumDecl(decl) => self.check_enum_decl(decl),
            ast::Stmt::TraitDecl(decl) => self.check_trait_decl(decl),
            ast::Stmt::TraitImpl(decl) => self.check_trait_impl(decl),
            ast::Stmt::ImplBlock(decl) => self.check_impl_block(decl),
            ast::Stmt::TypeDecl(decl) => self.check_type_decl(decl),
            ast::Stmt::Break(span) => {
                if self.loop_depth == 0 {
                    self.errors.push(TypeError::BreakOutsideLoop { span: *span });
                    return None;
                }
                Some(ir::Stmt::Break)
            }
            ast::Stmt::Expr(expr) => {
                let checked = self.check_expr(expr, None)?;
                Some(ir::Stmt::Expr(checked))
            }
        }
    }

    fn check_variable_decl(&mut self, decl: &ast::VariableDecl) -> Option<ir::VariableDef> {
        let declared = decl.ty.as_ref().map(|t| self.resolve_type(t, &[]));

        let mut value = self.check_expr(&decl.value, declared.as_ref())?;
        let mut ty = self.table.resolve(&value.ty());

        if let Some(declared) = declared {
            let liftable = match &declared {
                Ty::Maybe(inner) => {
                    !matches!(ty, Ty::Maybe(_)) && self.table.types_equal(inner, &ty)
                }
                _ => false,
            };
            if liftable {
                value = self.lift_to_maybe(value);
                ty = declared;
            } else if self.is_assignable(&declared, &ty) {
                ty = declared;
            } else {
                self.errors.push(TypeError::TypeMismatch {
                    expected: self.table.display(&declared),
                    found: self.table.display(&ty),
                    span: decl.value.span(),
                });
                return None;
            }
        }

        if ty == Ty::Void {
            self.errors.push(TypeError::AssignVoid { span: decl.span });
            return None;
        }

        // Value-semantics binding: mutable structured values get their own
        // copy.
        if decl.mutable && ty.is_copy_on_bind() {
            value = ir::Expr::Copy(Box::new(value));
        }

        if self.scope.declare(&decl.name, ty, decl.mutable).is_err() {
            self.errors.push(TypeError::DuplicateName {
                name: decl.name.clone(),
                span: decl.span,
            });
            return None;
        }

        Some(ir::VariableDef {
            name: decl.name.clone(),
            mutable: decl.mutable,
            value,
        })
    }

    fn check_assignment(&mut self, assign: &ast::Assignment) -> Option<ir::Reassignment> {
        match &assign.target {
            ast::AssignTarget::Name { name, span } => {
                let Some(found) = self.scope.get(name) else {
                    self.errors.push(TypeError::UndefinedName {
                        name: name.clone(),
                        span: *span,
                    });
                    return None;
                };
                if !found.symbol.mutable {
                    self.errors.push(TypeError::ReassignImmutable {
                        name: name.clone(),
                        span: *span,
                    });
                    return None;
                }
                let target_ty = found.symbol.ty;
                let value = self.check_expr(&assign.value, Some(&target_ty))?;
                let value_ty = value.ty();
                if !self.is_assignable(&target_ty, &value_ty) {
                    self.errors.push(TypeError::TypeMismatch {
                        expected: self.table.display(&target_ty),
                        found: self.table.display(&value_ty),
                        span: assign.value.span(),
                    });
                    return None;
                }
                Some(ir::Reassignment {
                    target: ir::AssignTarget::Name(name.clone()),
                    value,
                })
            }
            ast::AssignTarget::Property { object, name, span } => {
                if !self.place_is_mutable(object) {
                    let root = root_place_name(object).unwrap_or_else(|| name.clone());
                    self.errors.push(TypeError::ReassignImmutable {
                        name: root,
                        span: *span,
                    });
                    return None;
                }
                let object_ir = self.check_expr(object, None)?;
                let object_ty = self.table.resolve(&object_ir.ty());
                let field_ty = self.struct_field_ty(&object_ty, name, *span)?;
                let value = self.check_expr(&assign.value, Some(&field_ty))?;
                let value_ty = value.ty();
                if !self.is_assignable(&field_ty, &value_ty) {
                    self.errors.push(TypeError::TypeMismatch {
                        expected: self.table.display(&field_ty),
                        found: self.table.display(&value_ty),
                        span: assign.value.span(),
                    });
                    return None;
                }
                Some(ir::Reassignment {
                    target: ir::AssignTarget::Property {
                        object: Box::new(object_ir),
                        name: name.clone(),
                    },
                    value,
                })
            }
        }
    }

    fn check_while(&mut self, stmt: &ast::WhileLoop) -> Option<ir::Stmt> {
        let condition = self.check_bool_condition(&stmt.condition)?;
        let body = self.check_loop_body(&stmt.body);
        Some(ir::Stmt::WhileLoop { condition, body })
    }

    fn check_for(&mut self, stmt: &ast::ForLoop) -> Option<ir::Stmt> {
        self.scope.push();
        let init = self.check_variable_decl(&stmt.init);
        let condition = self.check_bool_condition(&stmt.condition);
        let update = self.check_assignment(&stmt.update);
        let body = self.check_loop_body_in_current_scope(&stmt.body);
        self.scope.pop();

        Some(ir::Stmt::ForLoop {
            init: Box::new(init?),
            condition: condition?,
            update: Box::new(update?),
            body,
        })
    }

    fn check_range_loop(&mut self, stmt: &ast::RangeLoop) -> Option<ir::Stmt> {
        let (start, end) = match &stmt.end {
            Some(end) => {
                let start = self.check_expr(&stmt.start, Some(&Ty::Int))?;
                let end = self.check_expr(end, Some(&Ty::Int))?;
                (start, end)
            }
            // One-operand form: `for i in n` iterates 0..n.
            None => {
                let end = self.check_expr(&stmt.start, Some(&Ty::Int))?;
                (ir::Expr::IntLiteral(0), end)
            }
        };
        for (expr, span) in [(&start, stmt.start.span()), (&end, stmt.span)] {
            let ty = self.table.resolve(&expr.ty());
            if ty != Ty::Int {
                self.errors.push(TypeError::TypeMismatch {
                    expected: "Int".into(),
                    found: ty.to_string(),
                    span,
                });
                return None;
            }
        }

        self.scope.push();
        let _ = self.scope.declare(&stmt.cursor, Ty::Int, false);
        let body = self.check_loop_body_in_current_scope(&stmt.body);
        self.scope.pop();

        Some(ir::Stmt::ForIntRange {
            cursor: stmt.cursor.clone(),
            start,
            end,
            body,
        })
    }

    fn check_for_in(&mut self, stmt: &ast::ForInLoop) -> Option<ir::Stmt> {
        let subject = self.check_expr(&stmt.iterable, None)?;
        let subject_ty = self.table.resolve(&subject.ty());
        let span = stmt.iterable.span();

        match subject_ty {
            Ty::Str => {
                let cursor = self.single_cursor(stmt)?;
                self.scope.push();
                let _ = self.scope.declare(&cursor, Ty::Str, false);
                let body = self.check_loop_body_in_current_scope(&stmt.body);
                self.scope.pop();
                Some(ir::Stmt::ForInStr { cursor, subject, body })
            }
            Ty::List(elem) => {
                if stmt.cursors.is_empty() || stmt.cursors.len() > 2 {
                    self.errors.push(TypeError::NotIterable {
                        found: "list with these cursors".into(),
                        span,
                    });
                    return None;
                }
                let cursor = stmt.cursors[0].clone();
                let index = stmt.cursors.get(1).cloned();
                self.scope.push();
                let _ = self.scope.declare(&cursor, (*elem).clone(), false);
                if let Some(index) = &index {
                    let _ = self.scope.declare(index, Ty::Int, false);
                }
                let body = self.check_loop_body_in_current_scope(&stmt.body);
                self.scope.pop();
                Some(ir::Stmt::ForInList { cursor, index, subject, body })
            }
            Ty::Map(key, value) => {
                if stmt.cursors.len() != 2 {
                    self.errors.push(TypeError::NotIterable {
                        found: "map without key and value cursors".into(),
                        span,
                    });
                    return None;
                }
                let key_cursor = stmt.cursors[0].clone();
                let value_cursor = stmt.cursors[1].clone();
                self.scope.push();
                let _ = self.scope.declare(&key_cursor, (*key).clone(), false);
                let _ = self.scope.declare(&value_cursor, (*value).clone(), false);
                let body = self.check_loop_body_in_current_scope(&stmt.body);
                self.scope.pop();
                Some(ir::Stmt::ForInMap {
                    key: key_cursor,
                    value: value_cursor,
                    subject,
                    body,
                })
            }
            // `for i in n` sugar, when the parser could not tell the
            // one-operand range form apart from iteration.
            Ty::Int => {
                let cursor = self.single_cursor(stmt)?;
                self.scope.push();
                let _ = self.scope.declare(&cursor, Ty::Int, false);
                let body = self.check_loop_body_in_current_scope(&stmt.body);
                self.scope.pop();
                Some(ir::Stmt::ForIntRange {
                    cursor,
                    start: ir::Expr::IntLiteral(0),
                    end: subject,
                    body,
                })
            }
            other => {
                self.errors.push(TypeError::NotIterable {
                    found: other.to_string(),
                    span,
                });
                None
            }
        }
    }

    fn single_cursor(&mut self, stmt: &ast::ForInLoop) -> Option<String> {
        if stmt.cursors.len() != 1 {
            self.errors.push(TypeError::NotIterable {
                found: "iteration with extra cursors".into(),
                span: stmt.span,
            });
            return None;
        }
        Some(stmt.cursors[0].clone())
    }

    fn check_bool_condition(&mut self, condition: &ast::Expr) -> Option<ir::Expr> {
        let checked = self.check_expr(condition, Some(&Ty::Bool))?;
        let ty = self.table.resolve(&checked.ty());
        if ty != Ty::Bool {
            self.errors.push(TypeError::ConditionNotBool {
                found: ty.to_string(),
                span: condition.span(),
            });
            return None;
        }
        Some(checked)
    }

    fn check_loop_body(&mut self, body: &ast::Block) -> ir::Block {
        self.scope.push();
        let block = self.check_loop_body_in_current_scope(body);
        self.scope.pop();
        block
    }

    fn check_loop_body_in_current_scope(&mut self, body: &ast::Block) -> ir::Block {
        self.loop_depth += 1;
        let block = self.check_block_in_current_scope(body);
        self.loop_depth -= 1;
        block
    }

    // ── Declarations ────────────────────────────────────────────────────

    /// Build the signature of a function declaration without checking its
    /// body.
    fn build_sig(&mut self, decl: &ast::FunctionDecl) -> FunSig {
        let params = decl
            .params
            .iter()
            .map(|p| ParamSig {
                name: p.name.clone(),
                ty: self.resolve_type(&p.ty, &decl.generics),
                mutable: p.mutable,
            })
            .collect();
        let ret = decl
            .ret
            .as_ref()
            .map(|t| self.resolve_type(t, &decl.generics))
            .unwrap_or(Ty::Void);
        FunSig {
            name: decl.name.clone(),
            generics: decl.generics.clone(),
            params,
            ret,
            mutates: decl.mutates,
            private: decl.private,
        }
    }

    /// Check a function declaration. `receiver` carries the `@` type and
    /// mutability for methods.
    fn check_function_decl(
        &mut self,
        decl: &ast::FunctionDecl,
        receiver: Option<(Ty, bool)>,
    ) -> Option<ir::FunctionDecl> {
        let sig = self.build_sig(decl);

        // Install before the body so recursion resolves (free functions
        // only; methods are installed on their type by the impl pass).
        if receiver.is_none() {
            if self
                .scope
                .declare(&decl.name, Ty::fun(sig.clone()), false)
                .is_err()
            {
                self.errors.push(TypeError::DuplicateName {
                    name: decl.name.clone(),
                    span: decl.span,
                });
                return None;
            }
        }

        let body = self.check_function_body(&sig, &decl.body, receiver, decl.span)?;
        Some(ir::FunctionDecl { sig, body })
    }

    fn check_function_body(
        &mut self,
        sig: &FunSig,
        body: &ast::Block,
        receiver: Option<(Ty, bool)>,
        span: Span,
    ) -> Option<ir::Block> {
        self.scope.push_function(sig.ret.clone());
        if let Some((receiver_ty, receiver_mutable)) = receiver {
            let _ = self.scope.declare(RECEIVER, receiver_ty, receiver_mutable);
        }
        for param in &sig.params {
            if self
                .scope
                .declare(&param.name, param.ty.clone(), param.mutable)
                .is_err()
            {
                self.errors.push(TypeError::DuplicateName {
                    name: param.name.clone(),
                    span,
                });
            }
        }
        let saved_depth = self.loop_depth;
        self.loop_depth = 0;
        let mut block = self.check_block_tail(body, Some(&sig.ret));
        self.loop_depth = saved_depth;
        self.scope.pop();

        // Void return permits any body type.
        if sig.ret != Ty::Void {
            self.maybe_lift_block(&mut block, &sig.ret);
            if !self.is_assignable(&sig.ret, &block.ty) {
                self.errors.push(TypeError::TypeMismatch {
                    expected: self.table.display(&sig.ret),
                    found: self.table.display(&block.ty),
                    span,
                });
            }
        }
        Some(block)
    }

    fn check_extern_function(&mut self, decl: &ast::ExternFunction) -> Option<ir::Stmt> {
        let params = decl
            .params
            .iter()
            .map(|p| ParamSig {
                name: p.name.clone(),
                ty: self.resolve_type(&p.ty, &[]),
                mutable: p.mutable,
            })
            .collect();
        let ret = decl
            .ret
            .as_ref()
            .map(|t| self.resolve_type(t, &[]))
            .unwrap_or(Ty::Void);
        let sig = FunSig {
            name: decl.name.clone(),
            generics: Vec::new(),
            params,
            ret,
            mutates: false,
            private: decl.private,
        };
        if self
            .scope
            .declare(&decl.name, Ty::fun(sig.clone()), false)
            .is_err()
        {
            self.errors.push(TypeError::DuplicateName {
                name: decl.name.clone(),
                span: decl.span,
            });
            return None;
        }
        Some(ir::Stmt::ExternFunction { sig })
    }

    fn check_struct_decl(&mut self, decl: &ast::StructDecl) -> Option<ir::Stmt> {
        if self.registry.contains(&decl.name) {
            self.errors.push(TypeError::DuplicateName {
                name: decl.name.clone(),
                span: decl.span,
            });
            return None;
        }

        let mut fields: Vec<(String, Ty)> = Vec::new();
        for field in &decl.fields {
            if fields.iter().any(|(name, _)| name == &field.name) {
                self.errors.push(TypeError::DuplicateName {
                    name: field.name.clone(),
                    span: field.span,
                });
                continue;
            }
            let ty = self.resolve_type(&field.ty, &decl.generics);
            fields.push((field.name.clone(), ty));
        }

        self.registry.register_struct(StructInfo {
            name: decl.name.clone(),
            generic_params: decl.generics.clone(),
            fields,
            methods: FxHashMap::default(),
            statics: FxHashMap::default(),
            traits: Vec::new(),
            private: decl.private,
        });
        Some(ir::Stmt::StructDecl { name: decl.name.clone() })
    }

    fn check_enum_decl(&mut self, decl: &ast::EnumDecl) -> Option<ir::Stmt> {
        if self.registry.contains(&decl.name) {
            self.errors.push(TypeError::DuplicateName {
                name: decl.name.clone(),
                span: decl.span,
            });
            return None;
        }
        if decl.variants.is_empty() {
            self.errors.push(TypeError::EmptyEnum { span: decl.span });
            return None;
        }

        let mut variants: Vec<EnumVariantInfo> = Vec::new();
        let mut next = 0i64;
        for variant in &decl.variants {
            if variants.iter().any(|v| v.name == variant.name) {
                self.errors.push(TypeError::DuplicateName {
                    name: variant.name.clone(),
                    span: variant.span,
                });
                continue;
            }
            let discriminant = variant.value.unwrap_or(next);
            if let Some(first) = variants.iter().find(|v| v.discriminant == discriminant) {
                self.errors.push(TypeError::DuplicateDiscriminant {
                    variant: variant.name.clone(),
                    first: first.name.clone(),
                    span: variant.span,
                });
                continue;
            }
            next = discriminant + 1;
            variants.push(EnumVariantInfo {
                name: variant.name.clone(),
                discriminant,
            });
        }

        self.registry.register_enum(EnumInfo {
            name: decl.name.clone(),
            variants,
            methods: FxHashMap::default(),
            traits: Vec::new(),
            private: decl.private,
        });
        Some(ir::Stmt::EnumDecl { name: decl.name.clone() })
    }

    fn check_trait_decl(&mut self, decl: &ast::TraitDecl) -> Option<ir::Stmt> {
        if self.registry.contains(&decl.name) {
            self.errors.push(TypeError::DuplicateName {
                name: decl.name.clone(),
                span: decl.span,
            });
            return None;
        }
        let mut methods: Vec<FunSig> = Vec::new();
        for method in &decl.methods {
            if methods.iter().any(|m| m.name == method.name) {
                self.errors.push(TypeError::DuplicateName {
                    name: method.name.clone(),
                    span: method.span,
                });
                continue;
            }
            let params = method
                .params
                .iter()
                .map(|p| ParamSig {
                    name: p.name.clone(),
                    ty: self.resolve_type(&p.ty, &[]),
                    mutable: p.mutable,
                })
                .collect();
            let ret = method
                .ret
                .as_ref()
                .map(|t| self.resolve_type(t, &[]))
                .unwrap_or(Ty::Void);
            methods.push(FunSig {
                name: method.name.clone(),
                generics: Vec::new(),
                params,
                ret,
                mutates: false,
                private: false,
            });
        }
        self.registry.register_trait(TraitInfo {
            name: decl.name.clone(),
            methods,
            private: decl.private,
        });
        Some(ir::Stmt::TraitDecl { name: decl.name.clone() })
    }

    /// The receiver type methods of `target` see: generic structs get their
    /// own parameters as the arguments.
    fn receiver_ty(&mut self, target: &str, span: Span) -> Option<Ty> {
        if let Some(info) = self.find_struct(target) {
            let args = info
                .generic_params
                .iter()
                .map(|g| Ty::Generic(g.clone()))
                .collect();
            return Some(Ty::Struct { name: target.to_string(), args });
        }
        if self.find_enum(target).is_some() {
            return Some(Ty::Enum(target.to_string()));
        }
        self.errors.push(TypeError::UndefinedType {
            name: target.to_string(),
            span,
        });
        None
    }

    fn check_impl_block(&mut self, decl: &ast::ImplBlock) -> Option<ir::Stmt> {
        let receiver_ty = self.receiver_ty(&decl.target, decl.span)?;
        let is_enum = matches!(receiver_ty, Ty::Enum(_));
        let generics: Vec<String> = match self.registry.structs.get(&decl.target) {
            Some(info) => info.generic_params.clone(),
            None => Vec::new(),
        };

        // Register signatures first so methods can call each other.
        let mut sigs: Vec<(bool, FunSig, &ast::FunctionDecl)> = Vec::new();
        for method in &decl.methods {
            let (is_static, fn_decl) = match method {
                ast::ImplMethod::Instance(decl) => (false, decl),
                ast::ImplMethod::Static(decl) => (true, decl),
            };
            let mut with_generics = fn_decl.clone();
            with_generics.generics.extend(generics.iter().cloned());
            let sig = self.build_sig(&with_generics);
            if is_enum && sig.mutates {
                self.errors.push(TypeError::EnumMethodMutates {
                    method: sig.name.clone(),
                    span: fn_decl.span,
                });
                continue;
            }
            let duplicate = if let Some(info) = self.registry.structs.get_mut(&decl.target) {
                let map = if is_static { &mut info.statics } else { &mut info.methods };
                map.insert(sig.name.clone(), sig.clone()).is_some()
            } else if let Some(info) = self.registry.enums.get_mut(&decl.target) {
                info.methods.insert(sig.name.clone(), sig.clone()).is_some()
            } else {
                false
            };
            if duplicate {
                self.errors.push(TypeError::DuplicateName {
                    name: sig.name.clone(),
                    span: fn_decl.span,
                });
                continue;
            }
            sigs.push((is_static, sig, fn_decl));
        }

        let mut methods = Vec::new();
        for (is_static, sig, fn_decl) in sigs {
            let receiver = if is_static {
                None
            } else {
                Some((receiver_ty.clone(), sig.mutates))
            };
            if let Some(body) = self.check_function_body(&sig, &fn_decl.body, receiver, fn_decl.span)
            {
                methods.push(ir::FunctionDecl { sig, body });
            }
        }

        Some(ir::Stmt::ImplBlock {
            target: decl.target.clone(),
            methods,
        })
    }

    fn check_trait_impl(&mut self, decl: &ast::TraitImpl) -> Option<ir::Stmt> {
        let Some(trait_info) = self.find_trait(&decl.trait_name) else {
            self.errors.push(TypeError::NotATrait {
                name: decl.trait_name.clone(),
                span: decl.span,
            });
            return None;
        };
        let receiver_ty = self.receiver_ty(&decl.target, decl.span)?;
        let is_enum = matches!(receiver_ty, Ty::Enum(_));

        // Validate the provided method set against the trait.
        let mut provided: FxHashMap<String, FunSig> = FxHashMap::default();
        for method in &decl.methods {
            let sig = self.build_sig(method);
            provided.insert(sig.name.clone(), sig);
        }
        for required in &trait_info.methods {
            match provided.get(&required.name) {
                None => {
                    self.errors.push(TypeError::MissingTraitMethod {
                        trait_name: decl.trait_name.clone(),
                        method: required.name.clone(),
                        span: decl.span,
                    });
                }
                // Signatures must match the trait's exactly.
                Some(given) if given != required => {
                    self.errors.push(TypeError::TraitMethodMismatch {
                        trait_name: decl.trait_name.clone(),
                        method: required.name.clone(),
                        span: decl.span,
                    });
                }
                Some(_) => {}
            }
        }
        for name in provided.keys() {
            if trait_info.method(name).is_none() {
                self.errors.push(TypeError::UnknownTraitMethod {
                    trait_name: decl.trait_name.clone(),
                    method: name.clone(),
                    span: decl.span,
                });
            }
        }

        // Install methods and record the trait on the target.
        for (name, sig) in &provided {
            if is_enum && sig.mutates {
                self.errors.push(TypeError::EnumMethodMutates {
                    method: name.clone(),
                    span: decl.span,
                });
            }
            if let Some(info) = self.registry.structs.get_mut(&decl.target) {
                info.methods.insert(name.clone(), sig.clone());
            } else if let Some(info) = self.registry.enums.get_mut(&decl.target) {
                info.methods.insert(name.clone(), sig.clone());
            }
        }
        if let Some(info) = self.registry.structs.get_mut(&decl.target) {
            if !info.traits.contains(&decl.trait_name) {
                info.traits.push(decl.trait_name.clone());
            }
        } else if let Some(info) = self.registry.enums.get_mut(&decl.target) {
            if !info.traits.contains(&decl.trait_name) {
                info.traits.push(decl.trait_name.clone());
            }
        }

        let mut methods = Vec::new();
        for method in &decl.methods {
            let Some(sig) = provided.get(&method.name).cloned() else { continue };
            let receiver = Some((receiver_ty.clone(), sig.mutates));
            if let Some(body) = self.check_function_body(&sig, &method.body, receiver, method.span)
            {
                methods.push(ir::FunctionDecl { sig, body });
            }
        }

        Some(ir::Stmt::TraitImpl {
            trait_name: decl.trait_name.clone(),
            target: decl.target.clone(),
            methods,
        })
    }

    fn check_type_decl(&mut self, decl: &ast::TypeDecl) -> Option<ir::Stmt> {
        if self.registry.contains(&decl.name) {
            self.errors.push(TypeError::DuplicateName {
                name: decl.name.clone(),
                span: decl.span,
            });
            return None;
        }
        let types: Vec<Ty> = decl.types.iter().map(|t| self.resolve_type(t, &[])).collect();
        match types.as_slice() {
            [] => return None,
            // A single type becomes an alias.
            [only] => {
                self.registry.register_alias(AliasInfo {
                    name: decl.name.clone(),
                    ty: only.clone(),
                    private: decl.private,
                });
            }
            // Multiple types become a nominal union of distinct members.
            members => {
                let mut distinct: Vec<Ty> = Vec::new();
                for member in members {
                    if distinct.contains(member) {
                        self.errors.push(TypeError::DuplicateName {
                            name: member.to_string(),
                            span: decl.span,
                        });
                        continue;
                    }
                    distinct.push(member.clone());
                }
                self.registry.register_union(UnionInfo {
                    name: decl.name.clone(),
                    members: distinct,
                    private: decl.private,
                });
            }
        }
        Some(ir::Stmt::TypeDecl { name: decl.name.clone() })
    }

    // ── Assignability ───────────────────────────────────────────────────

    /// Whether a value of type `actual` may be bound where `expected` is
    /// declared: structural equality, a union member flowing into its
    /// union, or a value flowing into a trait it satisfies.
    fn is_assignable(&mut self, expected: &Ty, actual: &Ty) -> bool {
        if self.table.types_equal(expected, actual) {
            return true;
        }
        match self.table.resolve(expected) {
            Ty::Union(name) => match self.find_union(&name) {
                Some(info) => info
                    .members
                    .iter()
                    .any(|member| self.table.types_equal(member, actual)),
                None => false,
            },
            Ty::Trait(name) => {
                let actual = self.table.resolve(actual);
                self.satisfies_trait(&actual, &name)
            }
            _ => false,
        }
    }

    // ── Blocks ──────────────────────────────────────────────────────────

    pub(crate) fn check_block(&mut self, block: &ast::Block) -> ir::Block {
        self.scope.push();
        let checked = self.check_block_in_current_scope(block);
        self.scope.pop();
        checked
    }

    fn check_block_in_current_scope(&mut self, block: &ast::Block) -> ir::Block {
        self.check_block_tail(block, None)
    }

    /// Check a block, threading `expected` into its trailing expression so
    /// use-site context (a declared return type) can resolve generics.
    fn check_block_tail(&mut self, block: &ast::Block, expected: Option<&Ty>) -> ir::Block {
        let mut statements = Vec::new();
        let count = block.statements.len();
        for (i, stmt) in block.statements.iter().enumerate() {
            if self.halted {
                break;
            }
            let checked = match stmt {
                ast::Stmt::Expr(e) if i + 1 == count => {
                    self.check_expr(e, expected).map(ir::Stmt::Expr)
                }
                other => self.check_stmt(other),
            };
            if let Some(checked) = checked {
                statements.push(checked);
            }
        }
        let ty = match statements.last() {
            Some(ir::Stmt::Expr(expr)) => self.table.resolve(&expr.ty()),
            _ => Ty::Void,
        };
        ir::Block { statements, ty }
    }

    /// Wrap a block's trailing expression in `maybe::some(...)` when a
    /// `Maybe` return expects it.
    fn maybe_lift_block(&mut self, block: &mut ir::Block, ret: &Ty) {
        let Ty::Maybe(inner) = self.table.resolve(ret) else { return };
        if matches!(self.table.resolve(&block.ty), Ty::Maybe(_)) {
            return;
        }
        if !self.table.types_equal(&inner, &block.ty) {
            return;
        }
        if let Some(ir::Stmt::Expr(trailing)) = block.statements.last_mut() {
            let lifted = self.lift_to_maybe(trailing.clone());
            *trailing = lifted;
            block.ty = Ty::maybe((*inner).clone());
        }
    }

    // ── Expressions ─────────────────────────────────────────────────────

    pub(crate) fn check_expr(
        &mut self,
        expr: &ast::Expr,
        expected: Option<&Ty>,
    ) -> Option<ir::Expr> {
        match expr {
            ast::Expr::Number(lit) => Some(self.check_number(lit)),
            ast::Expr::Str(lit) => self.check_str(lit),
            ast::Expr::Bool(lit) => Some(ir::Expr::BoolLiteral(lit.value)),
            ast::Expr::Ident(ident) => self.check_ident(ident),
            ast::Expr::Unary(unary) => self.check_unary(unary),
            ast::Expr::Binary(binary) => self.check_binary(binary),
            ast::Expr::ChainedCmp(chain) => self.check_chained_cmp(chain),
            ast::Expr::Call(call) => self.check_call(call, expected),
            ast::Expr::Property(prop) => self.check_property(prop),
            ast::Expr::MethodCall(call) => self.check_method_call(call),
            ast::Expr::StaticProperty(prop) => self.check_static_property(prop),
            ast::Expr::StaticCall(call) => self.check_static_call(call, expected),
            ast::Expr::StructLit(lit) => self.check_struct_lit(lit, expected),
            ast::Expr::Match(m) => matches::check_match(self, m, expected),
            ast::Expr::CondMatch(m) => self.check_cond_match(m, expected),
            ast::Expr::Try(t) => self.check_try(t),
            ast::Expr::List(lit) => self.check_list_lit(lit, expected),
            ast::Expr::Map(lit) => self.check_map_lit(lit, expected),
            ast::Expr::AnonFn(f) => self.check_anon_fn(f, expected, false),
            ast::Expr::If(stmt) => self.check_if(stmt, expected),
            ast::Expr::Block(block) => Some(ir::Expr::Block(self.check_block(block))),
        }
    }

    fn check_number(&mut self, lit: &ast::NumberLit) -> ir::Expr {
        // Underscores are digit separators.
        let text: String = lit.text.chars().filter(|c| *c != '_').collect();
        if text.contains('.') {
            let value: f64 = text
                .parse()
                .expect("parser only produces well-formed float literals");
            ir::Expr::FloatLiteral(value)
        } else {
            let value: i64 = text
                .parse()
                .expect("parser only produces well-formed int literals");
            ir::Expr::IntLiteral(value)
        }
    }

    fn check_str(&mut self, lit: &ast::StrLit) -> Option<ir::Expr> {
        if lit.parts.len() == 1 {
            if let ast::StrPart::Text(text) = &lit.parts[0] {
                return Some(ir::Expr::StrLiteral(text.clone()));
            }
        }
        if lit.parts.is_empty() {
            return Some(ir::Expr::StrLiteral(String::new()));
        }

        let mut parts = Vec::new();
        for part in &lit.parts {
            match part {
                ast::StrPart::Text(text) => parts.push(ir::Expr::StrLiteral(text.clone())),
                ast::StrPart::Interp(inner) => {
                    let span = inner.span();
                    let checked = self.check_expr(inner, None)?;
                    let part = self.coerce_to_str(checked, span)?;
                    parts.push(part);
                }
            }
        }
        Some(ir::Expr::InterpolatedStr { parts })
    }

    /// Wrap a non-string interpolation chunk in its `to_str()` call; the
    /// chunk must satisfy the `ToString` trait from `ard/string`.
    fn coerce_to_str(&mut self, expr: ir::Expr, span: Span) -> Option<ir::Expr> {
        let ty = self.table.resolve(&expr.ty());
        let receiver = Box::new(expr);
        match &ty {
            Ty::Str => Some(*receiver),
            Ty::Int => Some(ir::Expr::IntMethod {
                kind: ir::IntMethodKind::ToStr,
                receiver,
                args: Vec::new(),
                ty: Ty::Str,
            }),
            Ty::Float => Some(ir::Expr::FloatMethod {
                kind: ir::FloatMethodKind::ToStr,
                receiver,
                args: Vec::new(),
                ty: Ty::Str,
            }),
            Ty::Bool => Some(ir::Expr::BoolMethod {
                kind: ir::BoolMethodKind::ToStr,
                receiver,
                args: Vec::new(),
                ty: Ty::Str,
            }),
            Ty::Struct { name, .. } | Ty::Enum(name) if self.satisfies_trait(&ty, "ToString") => {
                let receiver_kind = if matches!(ty, Ty::Enum(_)) {
                    ir::ReceiverKind::Enum
                } else {
                    ir::ReceiverKind::Struct
                };
                let sig = self
                    .method_sig_of(name, "to_str")
                    .unwrap_or_else(|| FunSig::simple("to_str", vec![], Ty::Str));
                Some(ir::Expr::InstanceMethod {
                    receiver,
                    receiver_kind,
                    sig,
                    args: Vec::new(),
                })
            }
            other => {
                self.errors.push(TypeError::MissingToString {
                    found: other.to_string(),
                    span,
                });
                None
            }
        }
    }

    fn method_sig_of(&self, type_name: &str, method: &str) -> Option<FunSig> {
        if let Some(info) = self.find_struct(type_name) {
            return info.methods.get(method).cloned();
        }
        if let Some(info) = self.find_enum(type_name) {
            return info.methods.get(method).cloned();
        }
        None
    }

    fn check_ident(&mut self, ident: &ast::Ident) -> Option<ir::Expr> {
        let Some(found) = self.scope.get(&ident.name) else {
            self.errors.push(TypeError::UndefinedName {
                name: ident.name.clone(),
                span: ident.span,
            });
            return None;
        };
        if found.crossed_isolation && found.symbol.mutable {
            self.errors.push(TypeError::FiberCapturesMutable {
                name: ident.name.clone(),
                span: ident.span,
            });
            return None;
        }
        Some(ir::Expr::Identifier {
            name: ident.name.clone(),
            ty: found.symbol.ty,
        })
    }

    fn check_unary(&mut self, unary: &ast::UnaryExpr) -> Option<ir::Expr> {
        let operand = self.check_expr(&unary.operand, None)?;
        let ty = self.table.resolve(&operand.ty());
        match (unary.op, &ty) {
            (UnaryOp::Neg, Ty::Int) => Some(ir::Expr::NegateInt(Box::new(operand))),
            (UnaryOp::Neg, Ty::Float) => Some(ir::Expr::NegateFloat(Box::new(operand))),
            (UnaryOp::Not, Ty::Bool) => Some(ir::Expr::Not(Box::new(operand))),
            _ => {
                let op = match unary.op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "not",
                };
                self.errors.push(TypeError::InvalidOperands {
                    op: op.into(),
                    lhs: ty.to_string(),
                    rhs: String::new(),
                    span: unary.span,
                });
                None
            }
        }
    }

    fn check_binary(&mut self, binary: &ast::BinaryExpr) -> Option<ir::Expr> {
        let lhs = self.check_expr(&binary.lhs, None)?;
        let rhs = self.check_expr(&binary.rhs, None)?;
        self.build_binary(binary.op, lhs, rhs, binary.span)
    }

    fn build_binary(
        &mut self,
        op: BinaryOp,
        lhs: ir::Expr,
        rhs: ir::Expr,
        span: Span,
    ) -> Option<ir::Expr> {
        let lhs_ty = self.table.resolve(&lhs.ty());
        let rhs_ty = self.table.resolve(&rhs.ty());
        let lhs = Box::new(lhs);
        let rhs = Box::new(rhs);

        let invalid = |checker: &mut Self| {
            checker.errors.push(TypeError::InvalidOperands {
                op: op_display(op).into(),
                lhs: lhs_ty.to_string(),
                rhs: rhs_ty.to_string(),
                span,
            });
            None
        };

        match op {
            BinaryOp::Add => match (&lhs_ty, &rhs_ty) {
                (Ty::Int, Ty::Int) => Some(ir::Expr::IntArith { op: ir::ArithOp::Add, lhs, rhs }),
                (Ty::Float, Ty::Float) => {
                    Some(ir::Expr::FloatArith { op: ir::ArithOp::Add, lhs, rhs })
                }
                (Ty::Str, Ty::Str) => Some(ir::Expr::StrConcat { lhs, rhs }),
                _ => invalid(self),
            },
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                let arith_op = match op {
                    BinaryOp::Sub => ir::ArithOp::Sub,
                    BinaryOp::Mul => ir::ArithOp::Mul,
                    _ => ir::ArithOp::Div,
                };
                match (&lhs_ty, &rhs_ty) {
                    (Ty::Int, Ty::Int) => Some(ir::Expr::IntArith { op: arith_op, lhs, rhs }),
                    (Ty::Float, Ty::Float) => {
                        Some(ir::Expr::FloatArith { op: arith_op, lhs, rhs })
                    }
                    _ => invalid(self),
                }
            }
            // `%` is Int only.
            BinaryOp::Mod => match (&lhs_ty, &rhs_ty) {
                (Ty::Int, Ty::Int) => Some(ir::Expr::IntArith { op: ir::ArithOp::Mod, lhs, rhs }),
                _ => invalid(self),
            },
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let cmp = cmp_op(op);
                match (&lhs_ty, &rhs_ty) {
                    (Ty::Int, Ty::Int) => Some(ir::Expr::IntCmp { op: cmp, lhs, rhs }),
                    (Ty::Float, Ty::Float) => Some(ir::Expr::FloatCmp { op: cmp, lhs, rhs }),
                    // Enums are integer-tagged; ordering against Int and
                    // within one enum compares discriminants.
                    (Ty::Int, Ty::Enum(_)) | (Ty::Enum(_), Ty::Int) => {
                        Some(ir::Expr::IntCmp { op: cmp, lhs, rhs })
                    }
                    (Ty::Enum(a), Ty::Enum(b)) if a == b => {
                        Some(ir::Expr::IntCmp { op: cmp, lhs, rhs })
                    }
                    _ => invalid(self),
                }
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                let cmp = cmp_op(op);
                let negated = op == BinaryOp::Ne;
                match (&lhs_ty, &rhs_ty) {
                    (Ty::Int, Ty::Int) => Some(ir::Expr::IntCmp { op: cmp, lhs, rhs }),
                    (Ty::Float, Ty::Float) => Some(ir::Expr::FloatCmp { op: cmp, lhs, rhs }),
                    (Ty::Str, Ty::Str) => Some(ir::Expr::StrCmp { op: cmp, lhs, rhs }),
                    (Ty::Bool, Ty::Bool) => Some(ir::Expr::BoolEq { negated, lhs, rhs }),
                    (Ty::Int, Ty::Enum(_)) | (Ty::Enum(_), Ty::Int) => {
                        Some(ir::Expr::IntCmp { op: cmp, lhs, rhs })
                    }
                    (Ty::Enum(a), Ty::Enum(b)) if a == b => {
                        Some(ir::Expr::IntCmp { op: cmp, lhs, rhs })
                    }
                    _ => invalid(self),
                }
            }
            BinaryOp::And | BinaryOp::Or => match (&lhs_ty, &rhs_ty) {
                (Ty::Bool, Ty::Bool) => {
                    if op == BinaryOp::And {
                        Some(ir::Expr::And { lhs, rhs })
                    } else {
                        Some(ir::Expr::Or { lhs, rhs })
                    }
                }
                _ => invalid(self),
            },
        }
    }

    /// `a < b < c` desugars to `(a < b) and (b < c)`. Chaining equality is
    /// a hard error.
    fn check_chained_cmp(&mut self, chain: &ast::ChainedCmp) -> Option<ir::Expr> {
        if chain.ops.iter().any(|op| op.is_equality()) {
            self.errors.push(TypeError::ChainedEquality { span: chain.span });
            return None;
        }

        let mut combined: Option<ir::Expr> = None;
        for (i, op) in chain.ops.iter().enumerate() {
            let lhs = self.check_expr(&chain.operands[i], None)?;
            let rhs = self.check_expr(&chain.operands[i + 1], None)?;
            let pair = self.build_binary(*op, lhs, rhs, chain.span)?;
            combined = Some(match combined {
                None => pair,
                Some(prev) => ir::Expr::And {
                    lhs: Box::new(prev),
                    rhs: Box::new(pair),
                },
            });
        }
        combined
    }

    fn check_if(&mut self, stmt: &ast::IfExpr, expected: Option<&Ty>) -> Option<ir::Expr> {
        let condition = self.check_bool_condition(&stmt.condition)?;
        let then_block = self.check_block(&stmt.then_block);

        let else_block = match &stmt.else_branch {
            None => None,
            Some(ast::ElseBranch::Else(block)) => {
                Some(Box::new(ir::Expr::Block(self.check_block(block))))
            }
            Some(ast::ElseBranch::ElseIf(inner)) => {
                Some(Box::new(self.check_if(inner, expected)?))
            }
        };

        let ty = match &else_block {
            Some(else_expr) => {
                let then_ty = self.table.resolve(&then_block.ty);
                let else_ty = self.table.resolve(&else_expr.ty());
                if self.table.types_equal(&then_ty, &else_ty) {
                    then_ty
                } else if then_ty == Ty::Void || else_ty == Ty::Void {
                    // Statement-position branches may differ; the whole
                    // expression is then a statement.
                    Ty::Void
                } else {
                    self.errors.push(TypeError::TypeMismatch {
                        expected: self.table.display(&then_ty),
                        found: self.table.display(&else_ty),
                        span: stmt.span,
                    });
                    Ty::Void
                }
            }
            None => Ty::Void,
        };

        Some(ir::Expr::If {
            condition: Box::new(condition),
            then_block,
            else_block,
            ty,
        })
    }

    fn check_cond_match(
        &mut self,
        m: &ast::CondMatchExpr,
        expected: Option<&Ty>,
    ) -> Option<ir::Expr> {
        // Desugars to an if/else-if chain, so arm bodies obey the same
        // single-type rule as match arms.
        let mut arm_ty: Option<Ty> = None;
        let mut checked: Vec<(ir::Expr, ir::Expr)> = Vec::new();
        for arm in &m.arms {
            let condition = self.check_bool_condition(&arm.condition)?;
            let body = self.check_expr(&arm.body, expected.or(arm_ty.as_ref()))?;
            let body_ty = self.table.resolve(&body.ty());
            match &arm_ty {
                None => arm_ty = Some(body_ty),
                Some(first) => {
                    if !self.table.types_equal(first, &body_ty) {
                        self.errors.push(TypeError::TypeMismatch {
                            expected: self.table.display(first),
                            found: self.table.display(&body_ty),
                            span: arm.span,
                        });
                    }
                }
            }
            checked.push((condition, body));
        }

        let else_expr = match &m.else_arm {
            Some(else_arm) => {
                let body = self.check_expr(else_arm, expected.or(arm_ty.as_ref()))?;
                let body_ty = self.table.resolve(&body.ty());
                if let Some(first) = &arm_ty {
                    if !self.table.types_equal(first, &body_ty) {
                        self.errors.push(TypeError::TypeMismatch {
                            expected: self.table.display(first),
                            found: self.table.display(&body_ty),
                            span: else_arm.span(),
                        });
                    }
                }
                Some(body)
            }
            None => None,
        };

        let result_ty = match (&else_expr, arm_ty) {
            (Some(_), Some(ty)) => ty,
            _ => Ty::Void,
        };

        // Build the chain back to front.
        let mut chain = else_expr;
        for (condition, body) in checked.into_iter().rev() {
            let body_ty = body.ty();
            chain = Some(ir::Expr::If {
                condition: Box::new(condition),
                then_block: ir::Block { statements: vec![ir::Stmt::Expr(body)], ty: body_ty },
                else_block: chain.map(Box::new),
                ty: result_ty.clone(),
            });
        }
        chain
    }

    // ── Collections ─────────────────────────────────────────────────────

    fn check_list_lit(&mut self, lit: &ast::ListLit, expected: Option<&Ty>) -> Option<ir::Expr> {
        let expected_elem = match expected.map(|t| self.table.resolve(t)) {
            Some(Ty::List(elem)) => Some(*elem),
            _ => None,
        };

        if lit.elements.is_empty() {
            return match expected_elem {
                Some(elem) => Some(ir::Expr::ListLit { elem_ty: elem, elements: Vec::new() }),
                None => {
                    self.errors.push(TypeError::EmptyCollectionNoType { span: lit.span });
                    self.halted = true;
                    None
                }
            };
        }

        let mut elements = Vec::new();
        let mut elem_ty = expected_elem;
        for element in &lit.elements {
            let span = element.span();
            let Some(checked) = self.check_expr(element, elem_ty.as_ref()) else {
                continue;
            };
            let ty = self.table.resolve(&checked.ty());
            match &elem_ty {
                None => elem_ty = Some(ty),
                Some(expected) => {
                    if !self.table.types_equal(expected, &ty) {
                        self.errors.push(TypeError::ListElementMismatch { span });
                        continue;
                    }
                }
            }
            elements.push(checked);
        }

        Some(ir::Expr::ListLit {
            elem_ty: elem_ty.unwrap_or(Ty::Dynamic),
            elements,
        })
    }

    fn check_map_lit(&mut self, lit: &ast::MapLit, expected: Option<&Ty>) -> Option<ir::Expr> {
        let (mut key_ty, mut value_ty) = match expected.map(|t| self.table.resolve(t)) {
            Some(Ty::Map(k, v)) => (Some(*k), Some(*v)),
            _ => (None, None),
        };

        if lit.entries.is_empty() {
            return match (key_ty, value_ty) {
                (Some(k), Some(v)) => Some(ir::Expr::MapLit {
                    key_ty: k,
                    value_ty: v,
                    entries: Vec::new(),
                }),
                _ => {
                    self.errors.push(TypeError::EmptyCollectionNoType { span: lit.span });
                    self.halted = true;
                    None
                }
            };
        }

        let mut entries = Vec::new();
        for entry in &lit.entries {
            let key_span = entry.key.span();
            let Some(key) = self.check_expr(&entry.key, key_ty.as_ref()) else { continue };
            let key_resolved = self.table.resolve(&key.ty());
            match &key_ty {
                None => {
                    if !key_resolved.is_map_key() {
                        self.errors.push(TypeError::InvalidMapKey {
                            found: key_resolved.to_string(),
                            span: key_span,
                        });
                        continue;
                    }
                    key_ty = Some(key_resolved);
                }
                Some(expected) => {
                    if !self.table.types_equal(expected, &key_resolved) {
                        self.errors.push(TypeError::TypeMismatch {
                            expected: self.table.display(expected),
                            found: self.table.display(&key_resolved),
                            span: key_span,
                        });
                        continue;
                    }
                }
            }

            let value_span = entry.value.span();
            let Some(value) = self.check_expr(&entry.value, value_ty.as_ref()) else {
                continue;
            };
            let value_resolved = self.table.resolve(&value.ty());
            match &value_ty {
                None => value_ty = Some(value_resolved),
                Some(expected) => {
                    if !self.table.types_equal(expected, &value_resolved) {
                        self.errors.push(TypeError::MapValueMismatch { span: value_span });
                        continue;
                    }
                }
            }
            entries.push((key, value));
        }

        Some(ir::Expr::MapLit {
            key_ty: key_ty.unwrap_or(Ty::Str),
            value_ty: value_ty.unwrap_or(Ty::Dynamic),
            entries,
        })
    }

    // ── Properties and accessor chains ──────────────────────────────────

    fn struct_field_ty(&mut self, object_ty: &Ty, field: &str, span: Span) -> Option<Ty> {
        match object_ty {
            Ty::Struct { name, args } => {
                let Some(info) = self.find_struct(name) else {
                    self.errors.push(TypeError::UndefinedType {
                        name: name.clone(),
                        span,
                    });
                    return None;
                };
                let Some(field_ty) = info.field_ty(field) else {
                    self.errors.push(TypeError::UndefinedField {
                        ty: object_ty.to_string(),
                        name: field.to_string(),
                        span,
                    });
                    return None;
                };
                let bindings: FxHashMap<String, Ty> = info
                    .generic_params
                    .iter()
                    .cloned()
                    .zip(args.iter().cloned())
                    .collect();
                Some(TypeTable::substitute(field_ty, &bindings))
            }
            other => {
                self.errors.push(TypeError::UndefinedField {
                    ty: other.to_string(),
                    name: field.to_string(),
                    span,
                });
                None
            }
        }
    }

    fn check_property(&mut self, prop: &ast::PropertyExpr) -> Option<ir::Expr> {
        let object = self.check_expr(&prop.object, None)?;
        let object_ty = self.table.resolve(&object.ty());

        // `a.b` with `a: Maybe(T)` unwraps through an OptionMatch and
        // propagates `none`.
        if let Ty::Maybe(inner) = &object_ty {
            let field_ty = self.struct_field_ty(inner, &prop.name, prop.span)?;
            let inner_access = ir::Expr::Property {
                object: Box::new(ir::Expr::Identifier {
                    name: UNWRAP_BINDING.to_string(),
                    ty: (**inner).clone(),
                }),
                name: prop.name.clone(),
                ty: field_ty.clone(),
            };
            let (some_body, result_ty) = match &field_ty {
                Ty::Maybe(_) => (inner_access, field_ty.clone()),
                _ => (
                    self.lift_to_maybe(inner_access),
                    Ty::maybe(field_ty.clone()),
                ),
            };
            let none_inner = match &result_ty {
                Ty::Maybe(inner) => (**inner).clone(),
                _ => field_ty,
            };
            let none_body = self.synthesize_none(none_inner);
            return Some(ir::Expr::OptionMatch {
                subject: Box::new(object),
                inner_ty: (**inner).clone(),
                binding: UNWRAP_BINDING.to_string(),
                some_body: Box::new(some_body),
                none_body: Box::new(none_body),
                ty: result_ty,
            });
        }

        let field_ty = self.struct_field_ty(&object_ty, &prop.name, prop.span)?;
        Some(ir::Expr::Property {
            object: Box::new(object),
            name: prop.name.clone(),
            ty: field_ty,
        })
    }

    fn check_static_property(&mut self, prop: &ast::StaticProperty) -> Option<ir::Expr> {
        if let Some(info) = self.find_enum(&prop.parent) {
            let Some(variant) = info.variant(&prop.name) else {
                self.errors.push(TypeError::UndefinedVariant {
                    enum_name: prop.parent.clone(),
                    name: prop.name.clone(),
                    span: prop.span,
                });
                return None;
            };
            return Some(ir::Expr::EnumVariant {
                enum_name: prop.parent.clone(),
                variant: variant.name.clone(),
                discriminant: variant.discriminant,
            });
        }
        if let Some(module) = self.find_module(&prop.parent) {
            let Some(ty) = module.get(&prop.name) else {
                self.errors.push(TypeError::UndefinedName {
                    name: format!("{}::{}", prop.parent, prop.name),
                    span: prop.span,
                });
                return None;
            };
            return Some(ir::Expr::ModuleSymbol {
                module: module.path().to_string(),
                name: prop.name.clone(),
                ty: ty.clone(),
            });
        }
        self.errors.push(TypeError::UndefinedName {
            name: prop.parent.clone(),
            span: prop.span,
        });
        None
    }

    // ── Mutability of places ────────────────────────────────────────────

    /// Whether an expression names a mutable place: a mutable variable or
    /// a property chain rooted in one.
    fn place_is_mutable(&self, expr: &ast::Expr) -> bool {
        match expr {
            ast::Expr::Ident(ident) => self
                .scope
                .get(&ident.name)
                .map(|l| l.symbol.mutable)
                .unwrap_or(false),
            ast::Expr::Property(prop) => self.place_is_mutable(&prop.object),
            _ => false,
        }
    }

    // ── Synthesis helpers ───────────────────────────────────────────────

    /// `maybe::some(expr)`, specialized to the wrapped type.
    pub(crate) fn lift_to_maybe(&mut self, expr: ir::Expr) -> ir::Expr {
        let inner = expr.ty();
        let sig = FunSig {
            name: "some".into(),
            generics: Vec::new(),
            params: vec![ParamSig { name: "value".into(), ty: inner.clone(), mutable: false }],
            ret: Ty::maybe(inner),
            mutates: false,
            private: false,
        };
        ir::Expr::ModuleCall {
            module: "ard/maybe".into(),
            sig,
            args: vec![expr],
        }
    }

    /// `maybe::none()`, specialized to the expected inner type.
    pub(crate) fn synthesize_none(&mut self, inner: Ty) -> ir::Expr {
        let sig = FunSig {
            name: "none".into(),
            generics: Vec::new(),
            params: Vec::new(),
            ret: Ty::maybe(inner),
            mutates: false,
            private: false,
        };
        ir::Expr::ModuleCall {
            module: "ard/maybe".into(),
            sig,
            args: Vec::new(),
        }
    }
}

// ── Calls, instantiation, try, closures ────────────────────────────────

/// How one parameter slot gets its value.
enum ArgSlot<'x> {
    Given(&'x ast::Arg),
    /// A missing trailing `Maybe` parameter, backfilled with
    /// `maybe::none()`.
    SynthNone,
}

impl<'a> Checker<'a> {
    /// Align the given arguments to the signature's parameter slots:
    /// positional arguments bind in order, named arguments reorder into
    /// their slot, and missing trailing `Maybe` parameters are backfilled.
    fn align_args<'x>(
        &mut self,
        sig: &FunSig,
        args: &'x [ast::Arg],
        span: Span,
    ) -> Option<Vec<ArgSlot<'x>>> {
        let mut slots: Vec<Option<&'x ast::Arg>> = vec![None; sig.params.len()];
        let mut cursor = 0usize;
        for arg in args {
            match &arg.name {
                Some(name) => {
                    let Some(idx) = sig.params.iter().position(|p| &p.name == name) else {
                        self.errors.push(TypeError::UnknownNamedArg {
                            name: name.clone(),
                            span: arg.span,
                        });
                        return None;
                    };
                    if slots[idx].is_some() {
                        self.errors.push(TypeError::DuplicateArgument {
                            name: name.clone(),
                            span: arg.span,
                        });
                        return None;
                    }
                    slots[idx] = Some(arg);
                }
                None => {
                    if cursor >= sig.params.len() {
                        self.errors.push(TypeError::WrongArgCount {
                            expected: sig.params.len(),
                            found: args.len(),
                            span,
                        });
                        return None;
                    }
                    if slots[cursor].is_some() {
                        self.errors.push(TypeError::DuplicateArgument {
                            name: sig.params[cursor].name.clone(),
                            span: arg.span,
                        });
                        return None;
                    }
                    slots[cursor] = Some(arg);
                    cursor += 1;
                }
            }
        }

        let mut aligned = Vec::with_capacity(slots.len());
        let mut complete = true;
        for (idx, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(arg) => aligned.push(ArgSlot::Given(arg)),
                // Absent arguments are allowed only for Maybe parameters.
                None if matches!(sig.params[idx].ty, Ty::Maybe(_)) => {
                    aligned.push(ArgSlot::SynthNone)
                }
                None => {
                    self.errors.push(TypeError::MissingArgument {
                        param: sig.params[idx].name.clone(),
                        span,
                    });
                    complete = false;
                }
            }
        }
        complete.then_some(aligned)
    }

    /// Check a call against a signature. `receiver_generics` pre-binds the
    /// receiver's generic parameters (a method on a generic struct
    /// instance); `type_args` are explicit arguments to the function's own
    /// generics. Returns the specialized signature and the checked
    /// arguments.
    fn check_invocation(
        &mut self,
        sig: &FunSig,
        receiver_generics: &[(String, Ty)],
        type_args: &[ast::TypeExpr],
        args: &[ast::Arg],
        expected_ret: Option<&Ty>,
        span: Span,
    ) -> Option<(FunSig, Vec<ir::Expr>)> {
        let slots = self.align_args(sig, args, span)?;

        let generic = !sig.generics.is_empty() || !receiver_generics.is_empty();
        let cells = if generic {
            let mut names: Vec<String> =
                receiver_generics.iter().map(|(n, _)| n.clone()).collect();
            for g in &sig.generics {
                if !names.contains(g) {
                    names.push(g.clone());
                }
            }
            let cells = self.scope.push_generics(&names, &mut self.table);
            // The receiver's specialization is known before any argument
            // is looked at.
            for (name, ty) in receiver_generics {
                let cell = Ty::Var(cells[name].clone());
                let _ = self.table.unify(&cell, ty);
            }
            if !type_args.is_empty() {
                if type_args.len() != sig.generics.len() {
                    self.errors.push(TypeError::WrongTypeArgCount {
                        expected: sig.generics.len(),
                        found: type_args.len(),
                        span,
                    });
                } else {
                    for (name, type_arg) in sig.generics.iter().zip(type_args) {
                        let resolved = self.resolve_type(type_arg, &[]);
                        let cell = Ty::Var(cells[name].clone());
                        if let Err(err) = self.table.unify(&cell, &resolved) {
                            self.errors.push(TypeError::TypeMismatch {
                                expected: err.expected,
                                found: err.found,
                                span: type_arg.span(),
                            });
                        }
                    }
                }
            }
            Some(cells)
        } else {
            None
        };

        let inst = match &cells {
            Some(cells) => TypeTable::instantiate_sig(sig, cells),
            None => sig.clone(),
        };

        let result = self.check_aligned_args(&inst, &slots, generic);

        let outcome = result.map(|checked_args| {
            if generic {
                if let Some(expected) = expected_ret {
                    // The use-site context may pin generics the arguments
                    // left open.
                    let _ = self.table.unify(&inst.ret, expected);
                }
            }
            let specialized = self.table.resolve_sig(&inst);
            if generic && !self.table.is_fully_bound(&specialized.ret) {
                if let Some(name) = first_unbound_name(&specialized.ret) {
                    self.errors.push(TypeError::UnresolvedGeneric { name, span });
                }
            }
            (specialized, checked_args)
        });

        if cells.is_some() {
            self.scope.pop();
        }
        outcome
    }

    /// Left-to-right argument checking. For generic callees each
    /// unification mutates the shared cells, so later arguments see
    /// earlier bindings; the first failing unification stops binding.
    fn check_aligned_args(
        &mut self,
        inst: &FunSig,
        slots: &[ArgSlot<'_>],
        generic: bool,
    ) -> Option<Vec<ir::Expr>> {
        let mut checked_args = Vec::with_capacity(slots.len());
        let mut ok = true;
        for (param, slot) in inst.params.iter().zip(slots) {
            match slot {
                ArgSlot::SynthNone => {
                    let inner = match self.table.resolve(&param.ty) {
                        Ty::Maybe(inner) => *inner,
                        other => other,
                    };
                    // An absent argument pins nothing; an open cell decays
                    // to Dynamic rather than escaping into the IR.
                    let inner = if matches!(inner, Ty::Var(_)) { Ty::Dynamic } else { inner };
                    checked_args.push(self.synthesize_none(inner));
                }
                ArgSlot::Given(arg) => {
                    let expected_param = self.table.resolve(&param.ty);
                    let Some(mut value) = self.check_expr(&arg.value, Some(&expected_param))
                    else {
                        ok = false;
                        continue;
                    };
                    let mut actual = self.table.resolve(&value.ty());

                    // Implicit lifting: a concrete argument satisfies a
                    // Maybe parameter. An unbound inner cell binds to the
                    // argument first.
                    if let Ty::Maybe(inner) = &expected_param {
                        if !matches!(actual, Ty::Maybe(_)) {
                            let inner_matches = self.table.types_equal(inner, &actual)
                                || (generic && self.table.unify(inner, &actual).is_ok());
                            if inner_matches {
                                value = self.lift_to_maybe(value);
                                actual = self.table.resolve(&value.ty());
                            }
                        }
                    }

                    if generic {
                        if let Err(err) = self.table.unify(&param.ty, &actual) {
                            self.errors.push(TypeError::TypeMismatch {
                                expected: err.expected,
                                found: err.found,
                                span: arg.value.span(),
                            });
                            return None;
                        }
                    } else if !self.is_assignable(&param.ty, &actual) {
                        self.errors.push(TypeError::TypeMismatch {
                            expected: self.table.display(&param.ty),
                            found: self.table.display(&actual),
                            span: arg.value.span(),
                        });
                        ok = false;
                        continue;
                    }

                    // `mut` parameters demand a mutable argument, or an
                    // explicit `mut` marker that hands over a copy.
                    if param.mutable {
                        if arg.mutable {
                            value = ir::Expr::Copy(Box::new(value));
                        } else if !self.place_is_mutable(&arg.value) {
                            self.errors.push(TypeError::MutArgRequired {
                                param: param.name.clone(),
                                span: arg.span,
                            });
                            ok = false;
                            continue;
                        }
                    }
                    checked_args.push(value);
                }
            }
        }
        ok.then_some(checked_args)
    }

    fn check_call(&mut self, call: &ast::CallExpr, expected: Option<&Ty>) -> Option<ir::Expr> {
        // The built-in panic(msg) is not a symbol; user definitions shadow
        // it.
        if let ast::Expr::Ident(ident) = call.callee.as_ref() {
            if ident.name == "panic" && self.scope.get("panic").is_none() {
                return self.check_panic(call);
            }
        }

        let callee = self.check_expr(&call.callee, None)?;
        let callee_ty = self.table.resolve(&callee.ty());
        let Ty::Fun(sig) = callee_ty else {
            self.errors.push(TypeError::NotCallable {
                found: callee_ty.to_string(),
                span: call.span,
            });
            return None;
        };

        let (specialized, args) = self.check_invocation(
            &sig,
            &[],
            &call.type_args,
            &call.args,
            expected,
            call.span,
        )?;
        Some(ir::Expr::Call {
            callee: Box::new(callee),
            sig: specialized,
            args,
        })
    }

    fn check_panic(&mut self, call: &ast::CallExpr) -> Option<ir::Expr> {
        if call.args.len() != 1 {
            self.errors.push(TypeError::WrongArgCount {
                expected: 1,
                found: call.args.len(),
                span: call.span,
            });
            return None;
        }
        let message = self.check_expr(&call.args[0].value, Some(&Ty::Str))?;
        let ty = self.table.resolve(&message.ty());
        if ty != Ty::Str {
            self.errors.push(TypeError::TypeMismatch {
                expected: "Str".into(),
                found: ty.to_string(),
                span: call.args[0].value.span(),
            });
            return None;
        }
        Some(ir::Expr::Panic { message: Box::new(message) })
    }

    fn check_static_call(
        &mut self,
        call: &ast::StaticCall,
        expected: Option<&Ty>,
    ) -> Option<ir::Expr> {
        if let Some(module) = self.find_module(&call.parent) {
            // async::start / async::eval validate their closure argument
            // and produce a specialized Fiber<T>.
            if module.path() == "ard/async" && (call.name == "start" || call.name == "eval") {
                return self.check_fiber_call(call);
            }

            let Some(symbol_ty) = module.get(&call.name).cloned() else {
                self.errors.push(TypeError::UndefinedName {
                    name: format!("{}::{}", call.parent, call.name),
                    span: call.span,
                });
                return None;
            };
            let Ty::Fun(sig) = symbol_ty else {
                self.errors.push(TypeError::NotCallable {
                    found: symbol_ty.to_string(),
                    span: call.span,
                });
                return None;
            };
            let (specialized, args) = self.check_invocation(
                &sig,
                &[],
                &call.type_args,
                &call.args,
                expected,
                call.span,
            )?;
            return Some(ir::Expr::ModuleCall {
                module: module.path().to_string(),
                sig: specialized,
                args,
            });
        }

        if let Some(info) = self.find_struct(&call.parent) {
            let Some(sig) = info.statics.get(&call.name).cloned() else {
                self.errors.push(TypeError::UndefinedMethod {
                    ty: call.parent.clone(),
                    name: call.name.clone(),
                    span: call.span,
                });
                return None;
            };
            let (specialized, args) = self.check_invocation(
                &sig,
                &[],
                &call.type_args,
                &call.args,
                expected,
                call.span,
            )?;
            let callee = ir::Expr::Identifier {
                name: format!("{}::{}", call.parent, call.name),
                ty: Ty::fun(specialized.clone()),
            };
            return Some(ir::Expr::Call {
                callee: Box::new(callee),
                sig: specialized,
                args,
            });
        }

        if self.find_enum(&call.parent).is_some() {
            self.errors.push(TypeError::UndefinedMethod {
                ty: call.parent.clone(),
                name: call.name.clone(),
                span: call.span,
            });
            return None;
        }

        self.errors.push(TypeError::UndefinedName {
            name: call.parent.clone(),
            span: call.span,
        });
        None
    }

    fn check_fiber_call(&mut self, call: &ast::StaticCall) -> Option<ir::Expr> {
        if call.args.len() != 1 {
            self.errors.push(TypeError::WrongArgCount {
                expected: 1,
                found: call.args.len(),
                span: call.span,
            });
            return None;
        }
        let arg = &call.args[0].value;
        // A closure literal is checked with an isolated scope: fibers may
        // not capture mutable variables.
        let closure = match arg {
            ast::Expr::AnonFn(f) => self.check_anon_fn(f, None, true)?,
            other => self.check_expr(other, None)?,
        };
        let closure_ty = self.table.resolve(&closure.ty());
        let Ty::Fun(sig) = &closure_ty else {
            self.errors.push(TypeError::FiberArgNotFunction {
                found: closure_ty.to_string(),
                span: arg.span(),
            });
            return None;
        };
        if !sig.params.is_empty() {
            self.errors.push(TypeError::WrongArgCount {
                expected: 0,
                found: sig.params.len(),
                span: arg.span(),
            });
            return None;
        }

        // Fiber's generic $T is replaced with the closure's return type.
        let ty = Ty::Struct {
            name: "Fiber".into(),
            args: vec![sig.ret.clone()],
        };
        let closure = Box::new(closure);
        Some(if call.name == "start" {
            ir::Expr::FiberStart { closure, ty }
        } else {
            ir::Expr::FiberEval { closure, ty }
        })
    }

    fn check_method_call(&mut self, call: &ast::MethodCallExpr) -> Option<ir::Expr> {
        let receiver = self.check_expr(&call.object, None)?;
        let receiver_ty = self.table.resolve(&receiver.ty());

        // Built-in method families first; user-defined types after.
        match &receiver_ty {
            Ty::Str => {
                let (kind, sig) = self.builtin_method(
                    builtins::str_method(&call.name),
                    &receiver_ty,
                    call,
                )?;
                let (sig, args) = self.check_invocation(
                    &sig, &[], &[], &call.args, None, call.span,
                )?;
                Some(ir::Expr::StrMethod {
                    kind,
                    receiver: Box::new(receiver),
                    args,
                    ty: sig.ret,
                })
            }
            Ty::Int => {
                let (kind, sig) = self.builtin_method(
                    builtins::int_method(&call.name),
                    &receiver_ty,
                    call,
                )?;
                let (sig, args) = self.check_invocation(
                    &sig, &[], &[], &call.args, None, call.span,
                )?;
                Some(ir::Expr::IntMethod {
                    kind,
                    receiver: Box::new(receiver),
                    args,
                    ty: sig.ret,
                })
            }
            Ty::Float => {
                let (kind, sig) = self.builtin_method(
                    builtins::float_method(&call.name),
                    &receiver_ty,
                    call,
                )?;
                let (sig, args) = self.check_invocation(
                    &sig, &[], &[], &call.args, None, call.span,
                )?;
                Some(ir::Expr::FloatMethod {
                    kind,
                    receiver: Box::new(receiver),
                    args,
                    ty: sig.ret,
                })
            }
            Ty::Bool => {
                let (kind, sig) = self.builtin_method(
                    builtins::bool_method(&call.name),
                    &receiver_ty,
                    call,
                )?;
                let (sig, args) = self.check_invocation(
                    &sig, &[], &[], &call.args, None, call.span,
                )?;
                Some(ir::Expr::BoolMethod {
                    kind,
                    receiver: Box::new(receiver),
                    args,
                    ty: sig.ret,
                })
            }
            Ty::List(elem) => {
                let elem = (**elem).clone();
                let (kind, sig) = self.builtin_method(
                    builtins::list_method(&call.name, &elem),
                    &receiver_ty,
                    call,
                )?;
                if kind.mutates() && !self.place_is_mutable(&call.object) {
                    self.errors.push(TypeError::MutatingMethodOnImmutable {
                        method: call.name.clone(),
                        span: call.span,
                    });
                    return None;
                }
                let (sig, args) = self.check_invocation(
                    &sig, &[], &[], &call.args, None, call.span,
                )?;
                Some(ir::Expr::ListMethod {
                    kind,
                    receiver: Box::new(receiver),
                    args,
                    ty: sig.ret,
                })
            }
            Ty::Map(key, value) => {
                let (key, value) = ((**key).clone(), (**value).clone());
                let (kind, sig) = self.builtin_method(
                    builtins::map_method(&call.name, &key, &value),
                    &receiver_ty,
                    call,
                )?;
                if kind.mutates() && !self.place_is_mutable(&call.object) {
                    self.errors.push(TypeError::MutatingMethodOnImmutable {
                        method: call.name.clone(),
                        span: call.span,
                    });
                    return None;
                }
                let (sig, args) = self.check_invocation(
                    &sig, &[], &[], &call.args, None, call.span,
                )?;
                Some(ir::Expr::MapMethod {
                    kind,
                    receiver: Box::new(receiver),
                    args,
                    ty: sig.ret,
                })
            }
            Ty::Maybe(inner) => {
                let inner = (**inner).clone();
                let (kind, sig) = self.builtin_method(
                    builtins::maybe_method(&call.name, &inner),
                    &receiver_ty,
                    call,
                )?;
                let (sig, args) = self.check_invocation(
                    &sig, &[], &[], &call.args, None, call.span,
                )?;
                Some(ir::Expr::MaybeMethod {
                    kind,
                    receiver: Box::new(receiver),
                    args,
                    ty: sig.ret,
                })
            }
            Ty::Result(val, err) => {
                let (val, err) = ((**val).clone(), (**err).clone());
                let (kind, sig) = self.builtin_method(
                    builtins::result_method(&call.name, &val, &err),
                    &receiver_ty,
                    call,
                )?;
                let (sig, args) = self.check_invocation(
                    &sig, &[], &[], &call.args, None, call.span,
                )?;
                Some(ir::Expr::ResultMethod {
                    kind,
                    receiver: Box::new(receiver),
                    args,
                    ty: sig.ret,
                })
            }
            Ty::Struct { name, args } => {
                let Some(info) = self.find_struct(name) else {
                    self.errors.push(TypeError::UndefinedType {
                        name: name.clone(),
                        span: call.span,
                    });
                    return None;
                };
                let Some(sig) = info.methods.get(&call.name).cloned() else {
                    self.errors.push(TypeError::UndefinedMethod {
                        ty: receiver_ty.to_string(),
                        name: call.name.clone(),
                        span: call.span,
                    });
                    return None;
                };
                if sig.mutates && !self.place_is_mutable(&call.object) {
                    self.errors.push(TypeError::MutatingMethodOnImmutable {
                        method: call.name.clone(),
                        span: call.span,
                    });
                    return None;
                }
                // A generic struct instance pre-binds the method's view of
                // the struct's generics before any argument is checked.
                let receiver_generics: Vec<(String, Ty)> = info
                    .generic_params
                    .iter()
                    .cloned()
                    .zip(args.iter().cloned())
                    .collect();
                let (specialized, args) = self.check_invocation(
                    &sig,
                    &receiver_generics,
                    &[],
                    &call.args,
                    None,
                    call.span,
                )?;
                Some(ir::Expr::InstanceMethod {
                    receiver: Box::new(receiver),
                    receiver_kind: ir::ReceiverKind::Struct,
                    sig: specialized,
                    args,
                })
            }
            Ty::Enum(name) => {
                let Some(info) = self.find_enum(name) else {
                    self.errors.push(TypeError::UndefinedType {
                        name: name.clone(),
                        span: call.span,
                    });
                    return None;
                };
                let Some(sig) = info.methods.get(&call.name).cloned() else {
                    self.errors.push(TypeError::UndefinedMethod {
                        ty: receiver_ty.to_string(),
                        name: call.name.clone(),
                        span: call.span,
                    });
                    return None;
                };
                let (specialized, args) = self.check_invocation(
                    &sig, &[], &[], &call.args, None, call.span,
                )?;
                Some(ir::Expr::InstanceMethod {
                    receiver: Box::new(receiver),
                    receiver_kind: ir::ReceiverKind::Enum,
                    sig: specialized,
                    args,
                })
            }
            Ty::Trait(name) => {
                let Some(info) = self.find_trait(name) else {
                    self.errors.push(TypeError::UndefinedType {
                        name: name.clone(),
                        span: call.span,
                    });
                    return None;
                };
                let Some(sig) = info.method(&call.name).cloned() else {
                    self.errors.push(TypeError::UndefinedMethod {
                        ty: receiver_ty.to_string(),
                        name: call.name.clone(),
                        span: call.span,
                    });
                    return None;
                };
                let (specialized, args) = self.check_invocation(
                    &sig, &[], &[], &call.args, None, call.span,
                )?;
                Some(ir::Expr::InstanceMethod {
                    receiver: Box::new(receiver),
                    receiver_kind: ir::ReceiverKind::Trait,
                    sig: specialized,
                    args,
                })
            }
            other => {
                self.errors.push(TypeError::UndefinedMethod {
                    ty: other.to_string(),
                    name: call.name.clone(),
                    span: call.span,
                });
                None
            }
        }
    }

    fn builtin_method<K>(
        &mut self,
        found: Option<(K, FunSig)>,
        receiver_ty: &Ty,
        call: &ast::MethodCallExpr,
    ) -> Option<(K, FunSig)> {
        match found {
            Some(found) => Some(found),
            None => {
                self.errors.push(TypeError::UndefinedMethod {
                    ty: receiver_ty.to_string(),
                    name: call.name.clone(),
                    span: call.span,
                });
                None
            }
        }
    }

    // ── Struct instantiation ────────────────────────────────────────────

    fn check_struct_lit(
        &mut self,
        lit: &ast::StructLit,
        expected: Option<&Ty>,
    ) -> Option<ir::Expr> {
        let info = match &lit.module {
            Some(local) => {
                let Some(module) = self.find_module(local) else {
                    self.errors.push(TypeError::UndefinedModule {
                        name: local.clone(),
                        span: lit.span,
                    });
                    return None;
                };
                let Some(info) = module.exports.structs.get(&lit.name).cloned() else {
                    self.errors.push(TypeError::UndefinedType {
                        name: format!("{}::{}", local, lit.name),
                        span: lit.span,
                    });
                    return None;
                };
                info
            }
            None => {
                let Some(info) = self.find_struct(&lit.name) else {
                    self.errors.push(TypeError::UndefinedType {
                        name: lit.name.clone(),
                        span: lit.span,
                    });
                    return None;
                };
                info
            }
        };

        let generic = !info.generic_params.is_empty();
        let cells = generic
            .then(|| self.scope.push_generics(&info.generic_params, &mut self.table));

        // Field types as this instantiation sees them.
        let inst_fields: Vec<(String, Ty)> = info
            .fields
            .iter()
            .map(|(name, ty)| {
                let ty = match &cells {
                    Some(cells) => TypeTable::instantiate(ty, cells),
                    None => ty.clone(),
                };
                (name.clone(), ty)
            })
            .collect();

        let mut given: Vec<(String, ir::Expr)> = Vec::new();
        let mut ok = true;
        for field in &lit.fields {
            if given.iter().any(|(name, _)| name == &field.name) {
                self.errors.push(TypeError::DuplicateName {
                    name: field.name.clone(),
                    span: field.span,
                });
                ok = false;
                continue;
            }
            let Some((_, field_ty)) =
                inst_fields.iter().find(|(name, _)| name == &field.name)
            else {
                self.errors.push(TypeError::ExtraField {
                    strukt: lit.name.clone(),
                    field: field.name.clone(),
                    span: field.span,
                });
                ok = false;
                continue;
            };
            let expected_field = self.table.resolve(field_ty);
            let Some(mut value) = self.check_expr(&field.value, Some(&expected_field)) else {
                ok = false;
                continue;
            };
            let mut actual = self.table.resolve(&value.ty());
            if let Ty::Maybe(inner) = &expected_field {
                if !matches!(actual, Ty::Maybe(_)) {
                    let inner_matches = self.table.types_equal(inner, &actual)
                        || (cells.is_some() && self.table.unify(inner, &actual).is_ok());
                    if inner_matches {
                        value = self.lift_to_maybe(value);
                        actual = self.table.resolve(&value.ty());
                    }
                }
            }
            // Field types resolve against the provided values; concrete
            // fields fall back to plain assignability.
            if cells.is_some() {
                if let Err(err) = self.table.unify(field_ty, &actual) {
                    self.errors.push(TypeError::TypeMismatch {
                        expected: err.expected,
                        found: err.found,
                        span: field.value.span(),
                    });
                    ok = false;
                    continue;
                }
            } else if !self.is_assignable(field_ty, &actual) {
                self.errors.push(TypeError::TypeMismatch {
                    expected: self.table.display(field_ty),
                    found: self.table.display(&actual),
                    span: field.value.span(),
                });
                ok = false;
                continue;
            }
            given.push((field.name.clone(), value));
        }

        // Missing nullable fields default to none; everything else is
        // required.
        for (name, field_ty) in &inst_fields {
            if given.iter().any(|(given_name, _)| given_name == name) {
                continue;
            }
            match self.table.resolve(field_ty) {
                Ty::Maybe(inner) => {
                    let none = self.synthesize_none(*inner);
                    given.push((name.clone(), none));
                }
                _ => {
                    self.errors.push(TypeError::MissingField {
                        strukt: lit.name.clone(),
                        field: name.clone(),
                        span: lit.span,
                    });
                    ok = false;
                }
            }
        }

        let ty = if let Some(cells) = &cells {
            // The use site may pin parameters no field mentions.
            if let Some(Ty::Struct { name, args }) = expected.map(|t| self.table.resolve(t)) {
                if name == info.name && args.len() == info.generic_params.len() {
                    for (param, arg) in info.generic_params.iter().zip(&args) {
                        let cell = Ty::Var(cells[param].clone());
                        let _ = self.table.unify(&cell, arg);
                    }
                }
            }
            let mut args = Vec::with_capacity(info.generic_params.len());
            for param in &info.generic_params {
                let resolved = self.table.resolve(&Ty::Var(cells[param].clone()));
                if matches!(resolved, Ty::Var(_)) {
                    self.errors.push(TypeError::UnresolvedGeneric {
                        name: param.clone(),
                        span: lit.span,
                    });
                    ok = false;
                }
                args.push(resolved);
            }
            Ty::Struct { name: info.name.clone(), args }
        } else {
            Ty::strukt(&info.name)
        };

        // The refined field-type map downstream dispatch sees.
        let field_tys: FxHashMap<String, Ty> = inst_fields
            .iter()
            .map(|(name, field_ty)| (name.clone(), self.table.resolve(field_ty)))
            .collect();

        if cells.is_some() {
            self.scope.pop();
        }
        if !ok {
            return None;
        }

        Some(match &lit.module {
            Some(local) => {
                let module_path = self
                    .find_module(local)
                    .map(|m| m.path().to_string())
                    .unwrap_or_else(|| local.clone());
                ir::Expr::ModuleStructInit {
                    module: module_path,
                    name: lit.name.clone(),
                    ty,
                    fields: given,
                    field_tys,
                }
            }
            None => ir::Expr::StructInit {
                name: lit.name.clone(),
                ty,
                fields: given,
                field_tys,
            },
        })
    }

    // ── Try expressions ─────────────────────────────────────────────────

    fn check_try(&mut self, t: &ast::TryExpr) -> Option<ir::Expr> {
        if !self.scope.in_function() {
            self.errors.push(TypeError::TryOutsideFunction { span: t.span });
            return None;
        }
        let operand = self.check_expr(&t.operand, None)?;
        let operand_ty = self.table.resolve(&operand.ty());
        let ret = self
            .scope
            .return_ty()
            .cloned()
            .expect("in_function implies a return type");

        let (success_ty, catch) = match &operand_ty {
            Ty::Result(val, err) => {
                let catch = match &t.catch {
                    Some(clause) => {
                        Some(self.check_catch(clause, Some((**err).clone()), &ret))
                    }
                    None => {
                        // Propagation needs the enclosing Result's error
                        // shape to line up.
                        let matches = match &ret {
                            Ty::Result(_, ret_err) => self.table.types_equal(ret_err, err),
                            _ => false,
                        };
                        if !matches {
                            self.errors.push(TypeError::TryReturnMismatch {
                                operand: operand_ty.to_string(),
                                ret: ret.to_string(),
                                span: t.span,
                            });
                            return None;
                        }
                        None
                    }
                };
                ((**val).clone(), catch)
            }
            Ty::Maybe(val) => {
                let catch = match &t.catch {
                    Some(clause) => {
                        if clause.binding.is_some() {
                            self.errors.push(TypeError::InvalidPattern {
                                subject: "Maybe".into(),
                                span: clause.span,
                            });
                        }
                        Some(self.check_catch(clause, None, &ret))
                    }
                    None => {
                        // Any Maybe return shape propagates none; the inner
                        // types are deliberately unconstrained.
                        if !matches!(ret, Ty::Maybe(_)) {
                            self.errors.push(TypeError::TryReturnMismatch {
                                operand: operand_ty.to_string(),
                                ret: ret.to_string(),
                                span: t.span,
                            });
                            return None;
                        }
                        None
                    }
                };
                ((**val).clone(), catch)
            }
            other => {
                self.errors.push(TypeError::TryOperandNotFallible {
                    found: other.to_string(),
                    span: t.span,
                });
                return None;
            }
        };

        Some(ir::Expr::TryOp {
            operand: Box::new(operand),
            catch: catch.flatten(),
            ty: success_ty,
        })
    }

    /// Check a catch handler. Its result early-returns from the enclosing
    /// function, so its type must line up with the declared return; when
    /// both are Results only the error types have to agree.
    fn check_catch(
        &mut self,
        clause: &ast::CatchClause,
        binding_ty: Option<Ty>,
        ret: &Ty,
    ) -> Option<ir::CatchArm> {
        self.scope.push();
        let binding = match (&clause.binding, binding_ty) {
            (Some(name), Some(ty)) => {
                let _ = self.scope.declare(name, ty, false);
                Some(name.clone())
            }
            _ => None,
        };
        let body = self.check_block_tail(&clause.body, Some(ret));
        self.scope.pop();

        let body_ty = self.table.resolve(&body.ty);
        let compatible = match (ret, &body_ty) {
            (Ty::Result(_, ret_err), Ty::Result(_, body_err)) => {
                self.table.types_equal(ret_err, body_err)
            }
            _ => self.table.types_equal(ret, &body_ty),
        };
        if !compatible {
            self.errors.push(TypeError::TypeMismatch {
                expected: self.table.display(ret),
                found: self.table.display(&body_ty),
                span: clause.span,
            });
        }

        Some(ir::CatchArm { binding, body })
    }

    // ── Anonymous functions ─────────────────────────────────────────────

    /// Check a closure literal. Parameter and return types fall back to
    /// the expected function type at the use site. `isolated` is set for
    /// fiber closures, which may not capture mutable variables.
    pub(crate) fn check_anon_fn(
        &mut self,
        f: &ast::AnonFn,
        expected: Option<&Ty>,
        isolated: bool,
    ) -> Option<ir::Expr> {
        let expected_sig = match expected.map(|t| self.table.resolve(t)) {
            Some(Ty::Fun(sig)) => Some(*sig),
            _ => None,
        };

        let mut params = Vec::with_capacity(f.params.len());
        for (i, param) in f.params.iter().enumerate() {
            let ty = match &param.ty {
                Some(annotation) => self.resolve_type(annotation, &[]),
                None => match expected_sig.as_ref().and_then(|s| s.params.get(i)) {
                    Some(expected_param) => self.table.resolve(&expected_param.ty),
                    None => {
                        self.errors.push(TypeError::ParamNeedsType {
                            name: param.name.clone(),
                            span: param.span,
                        });
                        Ty::Dynamic
                    }
                },
            };
            params.push(ParamSig { name: param.name.clone(), ty, mutable: false });
        }

        let ret_hint = f
            .ret
            .as_ref()
            .map(|t| self.resolve_type(t, &[]))
            .or_else(|| expected_sig.as_ref().map(|s| self.table.resolve(&s.ret)));

        let scope_ret = ret_hint.clone().unwrap_or(Ty::Void);
        if isolated {
            self.scope.push_isolated(scope_ret);
        } else {
            self.scope.push_function(scope_ret);
        }
        for param in &params {
            if self
                .scope
                .declare(&param.name, param.ty.clone(), param.mutable)
                .is_err()
            {
                self.errors.push(TypeError::DuplicateName {
                    name: param.name.clone(),
                    span: f.span,
                });
            }
        }
        let saved_depth = self.loop_depth;
        self.loop_depth = 0;
        let body = self.check_block_tail(&f.body, ret_hint.as_ref());
        self.loop_depth = saved_depth;
        self.scope.pop();

        let body_ty = self.table.resolve(&body.ty);
        let ret = match ret_hint {
            Some(hint) => {
                if hint != Ty::Void && !self.table.types_equal(&hint, &body_ty) {
                    self.errors.push(TypeError::TypeMismatch {
                        expected: self.table.display(&hint),
                        found: self.table.display(&body_ty),
                        span: f.span,
                    });
                }
                hint
            }
            None => body_ty,
        };

        let sig = FunSig {
            name: String::new(),
            generics: Vec::new(),
            params,
            ret,
            mutates: false,
            private: false,
        };
        Some(ir::Expr::Closure { sig, body })
    }
}

/// The name of the first unbound cell in a resolved type, if any.
fn first_unbound_name(ty: &Ty) -> Option<String> {
    match ty {
        Ty::Var(v) => Some(v.name.clone()),
        Ty::List(of) | Ty::Maybe(of) => first_unbound_name(of),
        Ty::Map(a, b) | Ty::Result(a, b) => {
            first_unbound_name(a).or_else(|| first_unbound_name(b))
        }
        Ty::Fun(sig) => sig
            .params
            .iter()
            .find_map(|p| first_unbound_name(&p.ty))
            .or_else(|| first_unbound_name(&sig.ret)),
        Ty::Struct { args, .. } => args.iter().find_map(first_unbound_name),
        _ => None,
    }
}

// ── Free helpers ───────────────────────────────────────────────────────

fn root_place_name(expr: &ast::Expr) -> Option<String> {
    match expr {
        ast::Expr::Ident(ident) => Some(ident.name.clone()),
        ast::Expr::Property(prop) => root_place_name(&prop.object),
        _ => None,
    }
}

fn op_display(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::And => "and",
        BinaryOp::Or => "or",
    }
}

fn cmp_op(op: BinaryOp) -> ir::CmpOp {
    match op {
        BinaryOp::Eq => ir::CmpOp::Eq,
        BinaryOp::Ne => ir::CmpOp::Ne,
        BinaryOp::Lt => ir::CmpOp::Lt,
        BinaryOp::Le => ir::CmpOp::Le,
        BinaryOp::Gt => ir::CmpOp::Gt,
        BinaryOp::Ge => ir::CmpOp::Ge,
        _ => unreachable!("not a comparison operator"),
    }
}
