//! Type representation for the Ard type system.
//!
//! Defines the core [`Ty`] enum, generic type variables ([`TyVar`],
//! [`GenericVar`]), and function signatures ([`FunSig`]). Nominal types
//! (structs, enums, unions, traits) are referenced by name here; their
//! definitions live in the [`crate::registry`].

use std::fmt;

/// A type variable cell, identified by a `u32` index into the session's
/// unification table.
///
/// Cells are allocated fresh per call site (one per generic parameter) and
/// bound at most once. The `ena` crate handles the union-find mechanics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyVar(pub u32);

/// A named type variable: a unification cell plus the generic parameter
/// name it was allocated for.
///
/// The `name` field is used ONLY for display in error messages (`$T`).
/// It is intentionally excluded from `PartialEq` and `Hash` so that two
/// references to the same cell compare equal regardless of spelling.
#[derive(Clone, Debug)]
pub struct GenericVar {
    pub var: TyVar,
    /// Generic parameter name, without the `$` sigil. Display only.
    pub name: String,
}

impl GenericVar {
    pub fn new(var: TyVar, name: impl Into<String>) -> Self {
        GenericVar { var, name: name.into() }
    }
}

impl PartialEq for GenericVar {
    fn eq(&self, other: &Self) -> bool {
        self.var == other.var // name intentionally excluded
    }
}

impl Eq for GenericVar {}

impl std::hash::Hash for GenericVar {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.var.hash(state); // name intentionally excluded
    }
}

/// An Ard type.
///
/// Structural types carry their component types inline; nominal types
/// (`Struct`, `Enum`, `Union`, `Trait`) carry a name that keys into the
/// registry, which is what lets method tables reference their enclosing
/// type without a cyclic type tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Str,
    Int,
    Float,
    Bool,
    Void,
    /// An opaque runtime value.
    Dynamic,
    /// `[Int]`.
    List(Box<Ty>),
    /// `[Str:Int]`. Keys are `Str` or `Int`.
    Map(Box<Ty>, Box<Ty>),
    /// `Int?`.
    Maybe(Box<Ty>),
    /// `Int!Str` -- value type, then error type.
    Result(Box<Ty>, Box<Ty>),
    /// A function signature.
    Fun(Box<FunSig>),
    /// A struct instance type; `args` specialize the struct's generic
    /// parameters and are empty for non-generic structs.
    Struct { name: String, args: Vec<Ty> },
    Enum(String),
    Union(String),
    Trait(String),
    /// A declaration-site generic parameter (`$T` in a signature or a
    /// struct field). Replaced by a fresh [`GenericVar`] cell at each
    /// call/instantiation site.
    Generic(String),
    /// A call-site unification cell.
    Var(GenericVar),
}

/// A function parameter: name, type, and whether the callee may mutate it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamSig {
    pub name: String,
    pub ty: Ty,
    pub mutable: bool,
}

/// A function signature -- the *type* of a function value.
///
/// Bodies live on IR nodes, not here; an external/imported function is a
/// `FunSig` that never gains a body. `name`, `mutates`, and `private` are
/// excluded from `PartialEq`/`Hash`: function types compare structurally
/// by parameter and return types.
#[derive(Clone, Debug)]
pub struct FunSig {
    pub name: String,
    /// Generic parameter names, without the `$` sigil.
    pub generics: Vec<String>,
    pub params: Vec<ParamSig>,
    pub ret: Ty,
    /// For methods: mutates the receiver.
    pub mutates: bool,
    pub private: bool,
}

impl PartialEq for FunSig {
    fn eq(&self, other: &Self) -> bool {
        // name/mutates/private intentionally excluded
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty == b.ty && a.mutable == b.mutable)
            && self.ret == other.ret
    }
}

impl Eq for FunSig {}

impl std::hash::Hash for FunSig {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for p in &self.params {
            p.ty.hash(state);
            p.mutable.hash(state);
        }
        self.ret.hash(state);
    }
}

impl FunSig {
    /// A plain signature: positional immutable params, no generics.
    pub fn simple(name: impl Into<String>, params: Vec<(&str, Ty)>, ret: Ty) -> Self {
        FunSig {
            name: name.into(),
            generics: Vec::new(),
            params: params
                .into_iter()
                .map(|(name, ty)| ParamSig { name: name.to_string(), ty, mutable: false })
                .collect(),
            ret,
            mutates: false,
            private: false,
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.generics.is_empty()
    }
}

impl Ty {
    pub fn list(of: Ty) -> Ty {
        Ty::List(Box::new(of))
    }

    pub fn map(key: Ty, value: Ty) -> Ty {
        Ty::Map(Box::new(key), Box::new(value))
    }

    pub fn maybe(of: Ty) -> Ty {
        Ty::Maybe(Box::new(of))
    }

    pub fn result(val: Ty, err: Ty) -> Ty {
        Ty::Result(Box::new(val), Box::new(err))
    }

    pub fn fun(sig: FunSig) -> Ty {
        Ty::Fun(Box::new(sig))
    }

    /// A non-generic struct instance type.
    pub fn strukt(name: impl Into<String>) -> Ty {
        Ty::Struct { name: name.into(), args: Vec::new() }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Ty::Int | Ty::Float)
    }

    /// Valid as a map key.
    pub fn is_map_key(&self) -> bool {
        matches!(self, Ty::Str | Ty::Int)
    }

    /// Structured types with value semantics: copied at mutable bindings
    /// and `mut` call sites.
    pub fn is_copy_on_bind(&self) -> bool {
        matches!(self, Ty::Struct { .. } | Ty::List(_) | Ty::Map(..))
    }

    /// Whether any declaration-site generic or unification variable occurs
    /// in this type (without consulting the unification table).
    pub fn mentions_generics(&self) -> bool {
        match self {
            Ty::Generic(_) | Ty::Var(_) => true,
            Ty::List(of) | Ty::Maybe(of) => of.mentions_generics(),
            Ty::Map(k, v) | Ty::Result(k, v) => k.mentions_generics() || v.mentions_generics(),
            Ty::Fun(sig) => {
                sig.params.iter().any(|p| p.ty.mentions_generics()) || sig.ret.mentions_generics()
            }
            Ty::Struct { args, .. } => args.iter().any(Ty::mentions_generics),
            _ => false,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Str => write!(f, "Str"),
            Ty::Int => write!(f, "Int"),
            Ty::Float => write!(f, "Float"),
            Ty::Bool => write!(f, "Bool"),
            Ty::Void => write!(f, "Void"),
            Ty::Dynamic => write!(f, "Dynamic"),
            Ty::List(of) => write!(f, "[{}]", of),
            Ty::Map(key, value) => write!(f, "[{}:{}]", key, value),
            Ty::Maybe(of) => write!(f, "{}?", of),
            Ty::Result(val, err) => write!(f, "{}!{}", val, err),
            Ty::Fun(sig) => {
                write!(f, "(")?;
                for (i, p) in sig.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p.ty)?;
                }
                write!(f, ") {}", sig.ret)
            }
            Ty::Struct { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, a) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", a)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Ty::Enum(name) | Ty::Union(name) | Ty::Trait(name) => write!(f, "{}", name),
            Ty::Generic(name) => write!(f, "${}", name),
            Ty::Var(v) => write!(f, "${}", v.name),
        }
    }
}

// ── ena trait implementations ──────────────────────────────────────────

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for Ty {}
