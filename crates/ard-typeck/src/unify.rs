//! Unification over generic type cells.
//!
//! The [`TypeTable`] owns the session's union-find table. Cells are
//! allocated one per generic parameter per call site; binding happens in
//! place, so left-to-right argument checking automatically propagates
//! earlier bindings into later expected types. Binding is monotonic: a
//! bound cell is never rewritten, it is dereferenced and unification
//! recurses into its value.

use ena::unify::InPlaceUnificationTable;
use rustc_hash::FxHashMap;

use crate::ty::{FunSig, GenericVar, ParamSig, Ty, TyVar};

/// A failed unification, carrying the display strings of both sides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnifyError {
    pub expected: String,
    pub found: String,
}

/// The session-wide table of generic type cells.
pub struct TypeTable {
    table: InPlaceUnificationTable<TyVar>,
}

impl TypeTable {
    pub fn new() -> Self {
        TypeTable { table: InPlaceUnificationTable::new() }
    }

    // ── Cell creation ───────────────────────────────────────────────────

    /// Allocate a fresh unbound cell for the generic parameter `name`.
    pub fn fresh(&mut self, name: &str) -> GenericVar {
        let var = self.table.new_key(None);
        GenericVar::new(var, name)
    }

    // ── Dereferencing ───────────────────────────────────────────────────

    /// Shallow deref: follow a chain of bound cells to the first unbound
    /// cell or non-variable type. Compound types are not entered. Unbound
    /// cells normalize to their union-find root so that cells unified
    /// with each other compare equal.
    pub fn shallow_resolve(&mut self, ty: &Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.table.probe_value(v.var) {
                Some(inner) => self.shallow_resolve(&inner),
                None => {
                    let root = self.table.find(v.var);
                    Ty::Var(GenericVar::new(root, v.name.clone()))
                }
            },
            other => other.clone(),
        }
    }

    /// Deep deref: rewrite the type tree so every compound contains only
    /// dereferenced subtypes. Structure is preserved; a type with no bound
    /// cells comes back structurally equal to the input.
    pub fn resolve(&mut self, ty: &Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.table.probe_value(v.var) {
                Some(inner) => self.resolve(&inner),
                None => {
                    let root = self.table.find(v.var);
                    Ty::Var(GenericVar::new(root, v.name.clone()))
                }
            },
            Ty::List(of) => Ty::list(self.resolve(of)),
            Ty::Map(k, v) => {
                let k = self.resolve(k);
                let v = self.resolve(v);
                Ty::map(k, v)
            }
            Ty::Maybe(of) => Ty::maybe(self.resolve(of)),
            Ty::Result(val, err) => {
                let val = self.resolve(val);
                let err = self.resolve(err);
                Ty::result(val, err)
            }
            Ty::Fun(sig) => Ty::fun(self.resolve_sig(sig)),
            Ty::Struct { name, args } => Ty::Struct {
                name: name.clone(),
                args: args.iter().map(|a| self.resolve(a)).collect(),
            },
            other => other.clone(),
        }
    }

    /// Deep-deref every type inside a signature.
    pub fn resolve_sig(&mut self, sig: &FunSig) -> FunSig {
        FunSig {
            name: sig.name.clone(),
            generics: sig.generics.clone(),
            params: sig
                .params
                .iter()
                .map(|p| ParamSig {
                    name: p.name.clone(),
                    ty: self.resolve(&p.ty),
                    mutable: p.mutable,
                })
                .collect(),
            ret: self.resolve(&sig.ret),
            mutates: sig.mutates,
            private: sig.private,
        }
    }

    /// Render a type for diagnostics with all bound cells dereferenced.
    pub fn display(&mut self, ty: &Ty) -> String {
        self.resolve(ty).to_string()
    }

    // ── Occurs check ────────────────────────────────────────────────────

    /// Whether `var` occurs anywhere within `ty`. Prevents a cell from
    /// being bound to a type containing itself.
    fn occurs_in(&mut self, var: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Var(v) => {
                // Compare through the union-find so any cell in the same
                // class as `var` counts as an occurrence.
                if self.table.find(v.var) == var {
                    return true;
                }
                match self.table.probe_value(v.var) {
                    Some(inner) => self.occurs_in(var, &inner),
                    None => false,
                }
            }
            Ty::List(of) | Ty::Maybe(of) => self.occurs_in(var, of),
            Ty::Map(a, b) | Ty::Result(a, b) => {
                self.occurs_in(var, a) || self.occurs_in(var, b)
            }
            Ty::Fun(sig) => {
                sig.params.iter().any(|p| self.occurs_in(var, &p.ty))
                    || self.occurs_in(var, &sig.ret)
            }
            Ty::Struct { args, .. } => args.iter().any(|a| self.occurs_in(var, a)),
            _ => false,
        }
    }

    // ── Unification ─────────────────────────────────────────────────────

    /// Unify two types, binding free cells as needed.
    ///
    /// Both sides are shallow-resolved first, so a bound cell is never
    /// rebound; unification recurses into its value instead.
    pub fn unify(&mut self, expected: &Ty, actual: &Ty) -> Result<(), UnifyError> {
        let expected = self.shallow_resolve(expected);
        let actual = self.shallow_resolve(actual);

        match (&expected, &actual) {
            (Ty::Var(a), Ty::Var(b)) if a.var == b.var => Ok(()),

            (Ty::Var(a), Ty::Var(b)) => {
                self.table
                    .unify_var_var(a.var, b.var)
                    .expect("unifying two unbound cells cannot fail");
                Ok(())
            }

            (Ty::Var(v), ty) | (ty, Ty::Var(v)) => {
                if self.occurs_in(v.var, ty) {
                    return Err(self.mismatch(&expected, &actual));
                }
                self.table
                    .unify_var_value(v.var, Some(ty.clone()))
                    .expect("binding an unbound cell after occurs check cannot fail");
                Ok(())
            }

            (Ty::List(a), Ty::List(b)) => self.unify(a, b),
            (Ty::Maybe(a), Ty::Maybe(b)) => self.unify(a, b),
            (Ty::Map(ak, av), Ty::Map(bk, bv)) => {
                self.unify(ak, bk)?;
                self.unify(av, bv)
            }
            (Ty::Result(av, ae), Ty::Result(bv, be)) => {
                self.unify(av, bv)?;
                self.unify(ae, be)
            }

            (Ty::Fun(a), Ty::Fun(b)) => {
                if a.params.len() != b.params.len() {
                    return Err(self.mismatch(&expected, &actual));
                }
                for (pa, pb) in a.params.iter().zip(&b.params) {
                    self.unify(&pa.ty, &pb.ty)?;
                }
                self.unify(&a.ret, &b.ret)
            }

            (Ty::Struct { name: a, args: aa }, Ty::Struct { name: b, args: ba }) => {
                if a != b || aa.len() != ba.len() {
                    return Err(self.mismatch(&expected, &actual));
                }
                for (x, y) in aa.iter().zip(ba) {
                    self.unify(x, y)?;
                }
                Ok(())
            }

            (Ty::Enum(a), Ty::Enum(b))
            | (Ty::Union(a), Ty::Union(b))
            | (Ty::Trait(a), Ty::Trait(b))
            | (Ty::Generic(a), Ty::Generic(b)) => {
                if a == b {
                    Ok(())
                } else {
                    Err(self.mismatch(&expected, &actual))
                }
            }

            _ => {
                if expected == actual {
                    Ok(())
                } else {
                    Err(self.mismatch(&expected, &actual))
                }
            }
        }
    }

    fn mismatch(&mut self, expected: &Ty, actual: &Ty) -> UnifyError {
        UnifyError {
            expected: self.display(expected),
            found: self.display(actual),
        }
    }

    /// Structural equality after dereferencing both sides.
    pub fn types_equal(&mut self, a: &Ty, b: &Ty) -> bool {
        self.resolve(a) == self.resolve(b)
    }

    /// Whether every cell reachable from `ty` is bound.
    pub fn is_fully_bound(&mut self, ty: &Ty) -> bool {
        let resolved = self.resolve(ty);
        !Self::contains_var(&resolved)
    }

    fn contains_var(ty: &Ty) -> bool {
        match ty {
            Ty::Var(_) => true,
            Ty::List(of) | Ty::Maybe(of) => Self::contains_var(of),
            Ty::Map(a, b) | Ty::Result(a, b) => {
                Self::contains_var(a) || Self::contains_var(b)
            }
            Ty::Fun(sig) => {
                sig.params.iter().any(|p| Self::contains_var(&p.ty)) || Self::contains_var(&sig.ret)
            }
            Ty::Struct { args, .. } => args.iter().any(Self::contains_var),
            _ => false,
        }
    }

    // ── Substitution ────────────────────────────────────────────────────

    /// Replace every generic reference (declaration-site `Generic` or
    /// call-site `Var`) whose name appears in `bindings`. Recurses through
    /// all compound types; idempotent for bound binding maps.
    pub fn substitute(ty: &Ty, bindings: &FxHashMap<String, Ty>) -> Ty {
        match ty {
            Ty::Generic(name) => bindings.get(name).cloned().unwrap_or_else(|| ty.clone()),
            Ty::Var(v) => bindings.get(&v.name).cloned().unwrap_or_else(|| ty.clone()),
            Ty::List(of) => Ty::list(Self::substitute(of, bindings)),
            Ty::Map(k, v) => Ty::map(Self::substitute(k, bindings), Self::substitute(v, bindings)),
            Ty::Maybe(of) => Ty::maybe(Self::substitute(of, bindings)),
            Ty::Result(val, err) => Ty::result(
                Self::substitute(val, bindings),
                Self::substitute(err, bindings),
            ),
            Ty::Fun(sig) => Ty::fun(Self::substitute_sig(sig, bindings)),
            Ty::Struct { name, args } => Ty::Struct {
                name: name.clone(),
                args: args.iter().map(|a| Self::substitute(a, bindings)).collect(),
            },
            other => other.clone(),
        }
    }

    pub fn substitute_sig(sig: &FunSig, bindings: &FxHashMap<String, Ty>) -> FunSig {
        FunSig {
            name: sig.name.clone(),
            generics: sig.generics.clone(),
            params: sig
                .params
                .iter()
                .map(|p| ParamSig {
                    name: p.name.clone(),
                    ty: Self::substitute(&p.ty, bindings),
                    mutable: p.mutable,
                })
                .collect(),
            ret: Self::substitute(&sig.ret, bindings),
            mutates: sig.mutates,
            private: sig.private,
        }
    }

    /// Replace declaration-site `Generic` references with the call site's
    /// fresh cells.
    pub fn instantiate(ty: &Ty, cells: &FxHashMap<String, GenericVar>) -> Ty {
        match ty {
            Ty::Generic(name) => match cells.get(name) {
                Some(cell) => Ty::Var(cell.clone()),
                None => ty.clone(),
            },
            Ty::List(of) => Ty::list(Self::instantiate(of, cells)),
            Ty::Map(k, v) => Ty::map(Self::instantiate(k, cells), Self::instantiate(v, cells)),
            Ty::Maybe(of) => Ty::maybe(Self::instantiate(of, cells)),
            Ty::Result(val, err) => {
                Ty::result(Self::instantiate(val, cells), Self::instantiate(err, cells))
            }
            Ty::Fun(sig) => Ty::fun(Self::instantiate_sig(sig, cells)),
            Ty::Struct { name, args } => Ty::Struct {
                name: name.clone(),
                args: args.iter().map(|a| Self::instantiate(a, cells)).collect(),
            },
            other => other.clone(),
        }
    }

    pub fn instantiate_sig(sig: &FunSig, cells: &FxHashMap<String, GenericVar>) -> FunSig {
        FunSig {
            name: sig.name.clone(),
            generics: sig.generics.clone(),
            params: sig
                .params
                .iter()
                .map(|p| ParamSig {
                    name: p.name.clone(),
                    ty: Self::instantiate(&p.ty, cells),
                    mutable: p.mutable,
                })
                .collect(),
            ret: Self::instantiate(&sig.ret, cells),
            mutates: sig.mutates,
            private: sig.private,
        }
    }

    /// Snapshot the resolved binding of each cell; unbound cells are
    /// omitted.
    pub fn bindings(&mut self, cells: &FxHashMap<String, GenericVar>) -> FxHashMap<String, Ty> {
        let mut out = FxHashMap::default();
        for (name, cell) in cells {
            if let Some(value) = self.table.probe_value(cell.var) {
                let resolved = self.resolve(&value);
                out.insert(name.clone(), resolved);
            }
        }
        out
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_cell_to_concrete() {
        let mut table = TypeTable::new();
        let t = Ty::Var(table.fresh("T"));

        assert!(table.unify(&t, &Ty::Int).is_ok());
        assert_eq!(table.resolve(&t), Ty::Int);
    }

    #[test]
    fn bound_cell_is_never_rewritten() {
        let mut table = TypeTable::new();
        let t = Ty::Var(table.fresh("T"));

        assert!(table.unify(&t, &Ty::Int).is_ok());
        // A conflicting rebind fails instead of overwriting.
        let err = table.unify(&t, &Ty::Str).unwrap_err();
        assert_eq!(err.expected, "Int");
        assert_eq!(err.found, "Str");
        assert_eq!(table.resolve(&t), Ty::Int);
    }

    #[test]
    fn unify_two_cells_then_bind_one() {
        let mut table = TypeTable::new();
        let a = Ty::Var(table.fresh("A"));
        let b = Ty::Var(table.fresh("B"));

        assert!(table.unify(&a, &b).is_ok());
        assert!(table.unify(&b, &Ty::Str).is_ok());
        assert_eq!(table.resolve(&a), Ty::Str);
    }

    #[test]
    fn unify_through_compounds() {
        let mut table = TypeTable::new();
        let t = Ty::Var(table.fresh("T"));

        let expected = Ty::list(t.clone());
        let actual = Ty::list(Ty::Int);
        assert!(table.unify(&expected, &actual).is_ok());
        assert_eq!(table.resolve(&t), Ty::Int);

        let e = Ty::Var(table.fresh("E"));
        assert!(table
            .unify(&Ty::result(Ty::Int, e.clone()), &Ty::result(Ty::Int, Ty::Str))
            .is_ok());
        assert_eq!(table.resolve(&e), Ty::Str);
    }

    #[test]
    fn unify_mismatch_reports_display_strings() {
        let mut table = TypeTable::new();
        let err = table
            .unify(&Ty::map(Ty::Str, Ty::Int), &Ty::map(Ty::Str, Ty::Bool))
            .unwrap_err();
        assert_eq!(err.expected, "Int");
        assert_eq!(err.found, "Bool");
    }

    #[test]
    fn occurs_check_rejects_self_reference() {
        let mut table = TypeTable::new();
        let t = Ty::Var(table.fresh("T"));
        assert!(table.unify(&t, &Ty::list(t.clone())).is_err());
    }

    #[test]
    fn unify_is_order_independent_for_independent_cells() {
        // Binding order among independent cells does not change the final
        // specialized signature.
        let sig = FunSig {
            name: "pair".into(),
            generics: vec!["A".into(), "B".into()],
            params: vec![
                ParamSig { name: "a".into(), ty: Ty::Generic("A".into()), mutable: false },
                ParamSig { name: "b".into(), ty: Ty::Generic("B".into()), mutable: false },
            ],
            ret: Ty::Generic("A".into()),
            mutates: false,
            private: false,
        };

        let specialize = |first_b: bool| {
            let mut table = TypeTable::new();
            let mut cells = FxHashMap::default();
            cells.insert("A".to_string(), table.fresh("A"));
            cells.insert("B".to_string(), table.fresh("B"));
            let inst = TypeTable::instantiate_sig(&sig, &cells);
            if first_b {
                table.unify(&inst.params[1].ty, &Ty::Str).unwrap();
                table.unify(&inst.params[0].ty, &Ty::Int).unwrap();
            } else {
                table.unify(&inst.params[0].ty, &Ty::Int).unwrap();
                table.unify(&inst.params[1].ty, &Ty::Str).unwrap();
            }
            table.resolve_sig(&inst)
        };

        assert_eq!(specialize(false), specialize(true));
    }

    #[test]
    fn substitution_is_idempotent() {
        let mut bindings = FxHashMap::default();
        bindings.insert("T".to_string(), Ty::Int);

        let ty = Ty::list(Ty::maybe(Ty::Generic("T".into())));
        let once = TypeTable::substitute(&ty, &bindings);
        let twice = TypeTable::substitute(&once, &bindings);
        assert_eq!(once, twice);
        assert_eq!(once, Ty::list(Ty::maybe(Ty::Int)));
    }

    #[test]
    fn empty_substitution_is_identity() {
        let bindings = FxHashMap::default();
        let sig = FunSig::simple("f", vec![("x", Ty::Generic("T".into()))], Ty::Bool);
        assert_eq!(TypeTable::substitute_sig(&sig, &bindings), sig);
    }

    #[test]
    fn resolve_preserves_structure_without_bound_cells() {
        let mut table = TypeTable::new();
        let ty = Ty::map(Ty::Str, Ty::list(Ty::result(Ty::Int, Ty::Str)));
        assert_eq!(table.resolve(&ty), ty);
    }

    #[test]
    fn bindings_snapshot_skips_unbound() {
        let mut table = TypeTable::new();
        let mut cells = FxHashMap::default();
        cells.insert("A".to_string(), table.fresh("A"));
        cells.insert("B".to_string(), table.fresh("B"));

        let a = Ty::Var(cells["A"].clone());
        table.unify(&a, &Ty::Int).unwrap();

        let snapshot = table.bindings(&cells);
        assert_eq!(snapshot.get("A"), Some(&Ty::Int));
        assert!(!snapshot.contains_key("B"));
    }
}
