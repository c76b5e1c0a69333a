//! Standard library registration and built-in method tables.
//!
//! The stdlib registry maps `ard/...` import paths to their exported
//! symbols and types. The method tables map method names on primitive and
//! collection receivers to their IR kind tag and signature; signatures
//! never include the receiver.

use rustc_hash::FxHashMap;

use crate::ir::{
    BoolMethodKind, FloatMethodKind, IntMethodKind, ListMethodKind, MapMethodKind,
    MaybeMethodKind, ResultMethodKind, StrMethodKind,
};
use crate::modules::{Module, ModuleExports};
use crate::registry::{StructInfo, TraitInfo};
use crate::ty::{FunSig, ParamSig, Ty};

fn generic_sig(
    name: &str,
    generics: &[&str],
    params: Vec<(&str, Ty)>,
    ret: Ty,
) -> FunSig {
    FunSig {
        name: name.to_string(),
        generics: generics.iter().map(|g| g.to_string()).collect(),
        params: params
            .into_iter()
            .map(|(n, ty)| ParamSig { name: n.to_string(), ty, mutable: false })
            .collect(),
        ret,
        mutates: false,
        private: false,
    }
}

fn export_fn(exports: &mut ModuleExports, sig: FunSig) {
    exports.symbols.insert(sig.name.clone(), Ty::fun(sig));
}

/// Look up a standard library module by import path.
pub fn stdlib_module(path: &str) -> Option<Module> {
    let mut exports = ModuleExports::default();
    match path {
        "ard/io" => {
            export_fn(&mut exports, FunSig::simple("print", vec![("msg", Ty::Str)], Ty::Void));
            export_fn(
                &mut exports,
                FunSig::simple("println", vec![("msg", Ty::Str)], Ty::Void),
            );
            export_fn(
                &mut exports,
                FunSig::simple("read_line", vec![], Ty::result(Ty::Str, Ty::Str)),
            );
        }
        "ard/fs" => {
            export_fn(
                &mut exports,
                FunSig::simple("read_file", vec![("path", Ty::Str)], Ty::result(Ty::Str, Ty::Str)),
            );
            export_fn(
                &mut exports,
                FunSig::simple(
                    "write_file",
                    vec![("path", Ty::Str), ("content", Ty::Str)],
                    Ty::result(Ty::Void, Ty::Str),
                ),
            );
            export_fn(&mut exports, FunSig::simple("exists", vec![("path", Ty::Str)], Ty::Bool));
        }
        "ard/maybe" => {
            export_fn(
                &mut exports,
                generic_sig("none", &["T"], vec![], Ty::maybe(Ty::Generic("T".into()))),
            );
            export_fn(
                &mut exports,
                generic_sig(
                    "some",
                    &["T"],
                    vec![("value", Ty::Generic("T".into()))],
                    Ty::maybe(Ty::Generic("T".into())),
                ),
            );
        }
        "ard/result" => {
            export_fn(
                &mut exports,
                generic_sig(
                    "ok",
                    &["V", "E"],
                    vec![("value", Ty::Generic("V".into()))],
                    Ty::result(Ty::Generic("V".into()), Ty::Generic("E".into())),
                ),
            );
            export_fn(
                &mut exports,
                generic_sig(
                    "err",
                    &["V", "E"],
                    vec![("error", Ty::Generic("E".into()))],
                    Ty::result(Ty::Generic("V".into()), Ty::Generic("E".into())),
                ),
            );
        }
        "ard/string" => {
            exports.traits.insert(
                "ToString".into(),
                TraitInfo {
                    name: "ToString".into(),
                    methods: vec![FunSig::simple("to_str", vec![], Ty::Str)],
                    private: false,
                },
            );
            export_fn(
                &mut exports,
                FunSig::simple(
                    "join",
                    vec![("parts", Ty::list(Ty::Str)), ("sep", Ty::Str)],
                    Ty::Str,
                ),
            );
        }
        "ard/async" => {
            let mut fiber_methods = FxHashMap::default();
            fiber_methods.insert(
                "await".to_string(),
                FunSig::simple("await", vec![], Ty::Generic("T".into())),
            );
            exports.structs.insert(
                "Fiber".into(),
                StructInfo {
                    name: "Fiber".into(),
                    generic_params: vec!["T".into()],
                    fields: Vec::new(),
                    methods: fiber_methods,
                    statics: FxHashMap::default(),
                    traits: Vec::new(),
                    private: false,
                },
            );
            // start/eval get dedicated validation in the checker; the
            // registered signatures cover first-class references.
            let fiber_of_t = Ty::Struct {
                name: "Fiber".into(),
                args: vec![Ty::Generic("T".into())],
            };
            let thunk = Ty::fun(generic_sig("", &[], vec![], Ty::Generic("T".into())));
            export_fn(
                &mut exports,
                generic_sig("start", &["T"], vec![("f", thunk.clone())], fiber_of_t.clone()),
            );
            export_fn(&mut exports, generic_sig("eval", &["T"], vec![("f", thunk)], fiber_of_t));
            export_fn(&mut exports, FunSig::simple("sleep", vec![("ms", Ty::Int)], Ty::Void));
        }
        _ => return None,
    }
    Some(Module::new(path, exports))
}

// ── Built-in method tables ─────────────────────────────────────────────

pub fn str_method(name: &str) -> Option<(StrMethodKind, FunSig)> {
    let sig = |params: Vec<(&str, Ty)>, ret: Ty| FunSig::simple(name, params, ret);
    Some(match name {
        "size" => (StrMethodKind::Size, sig(vec![], Ty::Int)),
        "is_empty" => (StrMethodKind::IsEmpty, sig(vec![], Ty::Bool)),
        "contains" => (StrMethodKind::Contains, sig(vec![("needle", Ty::Str)], Ty::Bool)),
        "replace" => (
            StrMethodKind::Replace,
            sig(vec![("old", Ty::Str), ("new", Ty::Str)], Ty::Str),
        ),
        "replace_all" => (
            StrMethodKind::ReplaceAll,
            sig(vec![("old", Ty::Str), ("new", Ty::Str)], Ty::Str),
        ),
        "split" => (StrMethodKind::Split, sig(vec![("sep", Ty::Str)], Ty::list(Ty::Str))),
        "starts_with" => (
            StrMethodKind::StartsWith,
            sig(vec![("prefix", Ty::Str)], Ty::Bool),
        ),
        "to_str" => (StrMethodKind::ToStr, sig(vec![], Ty::Str)),
        "trim" => (StrMethodKind::Trim, sig(vec![], Ty::Str)),
        "to_dyn" => (StrMethodKind::ToDyn, sig(vec![], Ty::Dynamic)),
        _ => return None,
    })
}

pub fn int_method(name: &str) -> Option<(IntMethodKind, FunSig)> {
    let sig = |ret: Ty| FunSig::simple(name, vec![], ret);
    Some(match name {
        "to_str" => (IntMethodKind::ToStr, sig(Ty::Str)),
        "to_float" => (IntMethodKind::ToFloat, sig(Ty::Float)),
        "abs" => (IntMethodKind::Abs, sig(Ty::Int)),
        "to_dyn" => (IntMethodKind::ToDyn, sig(Ty::Dynamic)),
        _ => return None,
    })
}

pub fn float_method(name: &str) -> Option<(FloatMethodKind, FunSig)> {
    let sig = |ret: Ty| FunSig::simple(name, vec![], ret);
    Some(match name {
        "to_str" => (FloatMethodKind::ToStr, sig(Ty::Str)),
        "floor" => (FloatMethodKind::Floor, sig(Ty::Int)),
        "ceil" => (FloatMethodKind::Ceil, sig(Ty::Int)),
        "to_dyn" => (FloatMethodKind::ToDyn, sig(Ty::Dynamic)),
        _ => return None,
    })
}

pub fn bool_method(name: &str) -> Option<(BoolMethodKind, FunSig)> {
    let sig = |ret: Ty| FunSig::simple(name, vec![], ret);
    Some(match name {
        "to_str" => (BoolMethodKind::ToStr, sig(Ty::Str)),
        "to_dyn" => (BoolMethodKind::ToDyn, sig(Ty::Dynamic)),
        _ => return None,
    })
}

pub fn list_method(name: &str, elem: &Ty) -> Option<(ListMethodKind, FunSig)> {
    let sig = |params: Vec<(&str, Ty)>, ret: Ty| FunSig::simple(name, params, ret);
    Some(match name {
        "size" => (ListMethodKind::Size, sig(vec![], Ty::Int)),
        "is_empty" => (ListMethodKind::IsEmpty, sig(vec![], Ty::Bool)),
        "at" => (
            ListMethodKind::At,
            sig(vec![("index", Ty::Int)], Ty::maybe(elem.clone())),
        ),
        "push" => (ListMethodKind::Push, sig(vec![("item", elem.clone())], Ty::Void)),
        "pop" => (ListMethodKind::Pop, sig(vec![], Ty::maybe(elem.clone()))),
        "contains" => (
            ListMethodKind::Contains,
            sig(vec![("item", elem.clone())], Ty::Bool),
        ),
        "to_dyn" => (ListMethodKind::ToDyn, sig(vec![], Ty::Dynamic)),
        _ => return None,
    })
}

pub fn map_method(name: &str, key: &Ty, value: &Ty) -> Option<(MapMethodKind, FunSig)> {
    let sig = |params: Vec<(&str, Ty)>, ret: Ty| FunSig::simple(name, params, ret);
    Some(match name {
        "size" => (MapMethodKind::Size, sig(vec![], Ty::Int)),
        "is_empty" => (MapMethodKind::IsEmpty, sig(vec![], Ty::Bool)),
        "get" => (
            MapMethodKind::Get,
            sig(vec![("key", key.clone())], Ty::maybe(value.clone())),
        ),
        "set" => (
            MapMethodKind::Set,
            sig(vec![("key", key.clone()), ("value", value.clone())], Ty::Void),
        ),
        "delete" => (MapMethodKind::Delete, sig(vec![("key", key.clone())], Ty::Bool)),
        "has" => (MapMethodKind::Has, sig(vec![("key", key.clone())], Ty::Bool)),
        "keys" => (MapMethodKind::Keys, sig(vec![], Ty::list(key.clone()))),
        "values" => (MapMethodKind::Values, sig(vec![], Ty::list(value.clone()))),
        _ => return None,
    })
}

pub fn maybe_method(name: &str, inner: &Ty) -> Option<(MaybeMethodKind, FunSig)> {
    let sig = |params: Vec<(&str, Ty)>, ret: Ty| FunSig::simple(name, params, ret);
    Some(match name {
        "is_some" => (MaybeMethodKind::IsSome, sig(vec![], Ty::Bool)),
        "is_none" => (MaybeMethodKind::IsNone, sig(vec![], Ty::Bool)),
        "or" => (
            MaybeMethodKind::Or,
            sig(vec![("default", inner.clone())], inner.clone()),
        ),
        _ => return None,
    })
}

pub fn result_method(name: &str, val: &Ty, _err: &Ty) -> Option<(ResultMethodKind, FunSig)> {
    let sig = |params: Vec<(&str, Ty)>, ret: Ty| FunSig::simple(name, params, ret);
    Some(match name {
        "is_ok" => (ResultMethodKind::IsOk, sig(vec![], Ty::Bool)),
        "is_err" => (ResultMethodKind::IsErr, sig(vec![], Ty::Bool)),
        "or" => (
            ResultMethodKind::Or,
            sig(vec![("default", val.clone())], val.clone()),
        ),
        _ => return None,
    })
}
