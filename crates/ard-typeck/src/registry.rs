//! Nominal type definitions.
//!
//! The registry is the central store of struct, enum, union, trait, and
//! alias definitions for one compilation unit. Types reference these by
//! name (see [`crate::ty::Ty`]), which is what allows a struct's methods
//! to mention the struct itself without a cyclic type tree.

use rustc_hash::FxHashMap;

use crate::ty::{FunSig, Ty};

/// A registered struct definition.
#[derive(Clone, Debug)]
pub struct StructInfo {
    pub name: String,
    /// Generic parameter names (e.g. `["T"]` for `Box<$T>`).
    pub generic_params: Vec<String>,
    /// Field names and declared types, in declaration order. Types may
    /// reference generic params via `Ty::Generic`.
    pub fields: Vec<(String, Ty)>,
    /// Instance methods; the implicit `@` receiver is not stored here.
    pub methods: FxHashMap<String, FunSig>,
    /// Static functions, called as `Name::fn(...)`.
    pub statics: FxHashMap<String, FunSig>,
    /// Names of traits this struct satisfies.
    pub traits: Vec<String>,
    pub private: bool,
}

impl StructInfo {
    pub fn field_ty(&self, name: &str) -> Option<&Ty> {
        self.fields.iter().find(|(f, _)| f == name).map(|(_, ty)| ty)
    }
}

/// One enum variant with its integer discriminant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumVariantInfo {
    pub name: String,
    pub discriminant: i64,
}

/// A registered enum definition.
#[derive(Clone, Debug)]
pub struct EnumInfo {
    pub name: String,
    pub variants: Vec<EnumVariantInfo>,
    /// Enum methods never mutate.
    pub methods: FxHashMap<String, FunSig>,
    pub traits: Vec<String>,
    pub private: bool,
}

impl EnumInfo {
    pub fn variant(&self, name: &str) -> Option<&EnumVariantInfo> {
        self.variants.iter().find(|v| v.name == name)
    }

    pub fn variant_index(&self, name: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.name == name)
    }
}

/// A registered union: a named sum of distinct member types.
#[derive(Clone, Debug)]
pub struct UnionInfo {
    pub name: String,
    pub members: Vec<Ty>,
    pub private: bool,
}

/// A registered trait: a named method set.
#[derive(Clone, Debug)]
pub struct TraitInfo {
    pub name: String,
    pub methods: Vec<FunSig>,
    pub private: bool,
}

impl TraitInfo {
    pub fn method(&self, name: &str) -> Option<&FunSig> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A registered type alias.
#[derive(Clone, Debug)]
pub struct AliasInfo {
    pub name: String,
    pub ty: Ty,
    pub private: bool,
}

/// All nominal definitions of one compilation unit. Type names share a
/// single namespace.
#[derive(Default)]
pub struct TypeRegistry {
    pub structs: FxHashMap<String, StructInfo>,
    pub enums: FxHashMap<String, EnumInfo>,
    pub unions: FxHashMap<String, UnionInfo>,
    pub traits: FxHashMap<String, TraitInfo>,
    pub aliases: FxHashMap<String, AliasInfo>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any definition already claims `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.structs.contains_key(name)
            || self.enums.contains_key(name)
            || self.unions.contains_key(name)
            || self.traits.contains_key(name)
            || self.aliases.contains_key(name)
    }

    pub fn register_struct(&mut self, info: StructInfo) {
        self.structs.insert(info.name.clone(), info);
    }

    pub fn register_enum(&mut self, info: EnumInfo) {
        self.enums.insert(info.name.clone(), info);
    }

    pub fn register_union(&mut self, info: UnionInfo) {
        self.unions.insert(info.name.clone(), info);
    }

    pub fn register_trait(&mut self, info: TraitInfo) {
        self.traits.insert(info.name.clone(), info);
    }

    pub fn register_alias(&mut self, info: AliasInfo) {
        self.aliases.insert(info.name.clone(), info);
    }

    /// The traits a nominal type satisfies; empty for everything else.
    pub fn traits_of(&self, ty: &Ty) -> &[String] {
        match ty {
            Ty::Struct { name, .. } => {
                self.structs.get(name).map(|s| s.traits.as_slice()).unwrap_or(&[])
            }
            Ty::Enum(name) => {
                self.enums.get(name).map(|e| e.traits.as_slice()).unwrap_or(&[])
            }
            _ => &[],
        }
    }

    /// Whether `ty` satisfies the named trait. Primitives satisfy
    /// `ToString` built in; nominal types by registration.
    pub fn satisfies(&self, ty: &Ty, trait_name: &str) -> bool {
        if trait_name == "ToString"
            && matches!(ty, Ty::Str | Ty::Int | Ty::Float | Ty::Bool)
        {
            return true;
        }
        match ty {
            Ty::Trait(name) => name == trait_name,
            _ => self.traits_of(ty).iter().any(|t| t == trait_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> StructInfo {
        StructInfo {
            name: "Point".into(),
            generic_params: Vec::new(),
            fields: vec![("x".into(), Ty::Int), ("y".into(), Ty::Int)],
            methods: FxHashMap::default(),
            statics: FxHashMap::default(),
            traits: Vec::new(),
            private: false,
        }
    }

    #[test]
    fn struct_field_lookup() {
        let info = point();
        assert_eq!(info.field_ty("x"), Some(&Ty::Int));
        assert_eq!(info.field_ty("z"), None);
    }

    #[test]
    fn single_namespace() {
        let mut registry = TypeRegistry::new();
        registry.register_struct(point());
        assert!(registry.contains("Point"));
        assert!(!registry.contains("Dir"));

        registry.register_enum(EnumInfo {
            name: "Dir".into(),
            variants: vec![
                EnumVariantInfo { name: "up".into(), discriminant: 0 },
                EnumVariantInfo { name: "down".into(), discriminant: 1 },
            ],
            methods: FxHashMap::default(),
            traits: Vec::new(),
            private: false,
        });
        assert!(registry.contains("Dir"));
        let dir = registry.enums.get("Dir").unwrap();
        assert_eq!(dir.variant("down").unwrap().discriminant, 1);
        assert_eq!(dir.variant_index("up"), Some(0));
    }

    #[test]
    fn primitives_satisfy_tostring() {
        let registry = TypeRegistry::new();
        assert!(registry.satisfies(&Ty::Int, "ToString"));
        assert!(registry.satisfies(&Ty::Str, "ToString"));
        assert!(!registry.satisfies(&Ty::list(Ty::Int), "ToString"));
    }

    #[test]
    fn nominal_trait_satisfaction() {
        let mut registry = TypeRegistry::new();
        let mut info = point();
        info.traits.push("ToString".into());
        registry.register_struct(info);

        assert!(registry.satisfies(&Ty::strukt("Point"), "ToString"));
        assert!(!registry.satisfies(&Ty::strukt("Missing"), "ToString"));
    }
}
