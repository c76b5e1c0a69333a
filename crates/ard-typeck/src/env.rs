//! Symbol table with a scope stack.
//!
//! A frame holds the names declared at one nesting level. Frames entered
//! for a function body carry the expected return type; frames entered for
//! a generic call site carry a generic context mapping parameter names to
//! fresh unification cells. Lookups search from the innermost frame
//! outward, implementing lexical scoping.

use rustc_hash::FxHashMap;

use crate::ty::{GenericVar, Ty};
use crate::unify::TypeTable;

/// The name the receiver is bound to inside methods.
pub const RECEIVER: &str = "@";

/// A declared name.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub ty: Ty,
    pub mutable: bool,
}

/// The result of a name lookup.
#[derive(Clone, Debug)]
pub struct Lookup {
    pub symbol: Symbol,
    /// The lookup walked past a fiber-isolation boundary. Mutable symbols
    /// found beyond one may not be captured.
    pub crossed_isolation: bool,
}

#[derive(Default)]
struct Frame {
    symbols: FxHashMap<String, Symbol>,
    /// Expected return type; set on function-body frames.
    return_ty: Option<Ty>,
    /// Generic context; set on per-call generic frames.
    generics: Option<FxHashMap<String, GenericVar>>,
    /// Fiber closure boundary.
    isolated: bool,
}

/// The scope stack. Index 0 is the outermost (module) scope.
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    /// A stack with one empty module-level frame.
    pub fn new() -> Self {
        ScopeStack { frames: vec![Frame::default()] }
    }

    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Enter a function body: a frame carrying the expected return type.
    pub fn push_function(&mut self, return_ty: Ty) {
        self.frames.push(Frame { return_ty: Some(return_ty), ..Frame::default() });
    }

    /// Enter a fiber closure body: names beyond this frame resolve, but
    /// mutable ones are flagged as crossing the isolation boundary.
    pub fn push_isolated(&mut self, return_ty: Ty) {
        self.frames.push(Frame {
            return_ty: Some(return_ty),
            isolated: true,
            ..Frame::default()
        });
    }

    /// Enter a generic call-site scope: one fresh cell per parameter name.
    /// The frame is a child of the current scope, so an enclosing generic
    /// context (a generic method inside a generic struct) stays visible.
    pub fn push_generics(
        &mut self,
        params: &[String],
        table: &mut TypeTable,
    ) -> FxHashMap<String, GenericVar> {
        let mut cells = FxHashMap::default();
        for name in params {
            cells.insert(name.clone(), table.fresh(name));
        }
        self.frames.push(Frame { generics: Some(cells.clone()), ..Frame::default() });
        cells
    }

    /// # Panics
    ///
    /// Panics if called when only the module scope remains.
    pub fn pop(&mut self) {
        assert!(self.frames.len() > 1, "cannot pop the module scope");
        self.frames.pop();
    }

    /// Declare a name in the innermost frame. Redeclaring a name already
    /// present in the same frame fails.
    pub fn declare(&mut self, name: &str, ty: Ty, mutable: bool) -> Result<(), ()> {
        let frame = self.frames.last_mut().expect("scope stack is never empty");
        if frame.symbols.contains_key(name) {
            return Err(());
        }
        frame.symbols.insert(
            name.to_string(),
            Symbol { name: name.to_string(), ty, mutable },
        );
        Ok(())
    }

    /// Look up a name, innermost frame first.
    pub fn get(&self, name: &str) -> Option<Lookup> {
        let mut crossed_isolation = false;
        for frame in self.frames.iter().rev() {
            if let Some(symbol) = frame.symbols.get(name) {
                return Some(Lookup { symbol: symbol.clone(), crossed_isolation });
            }
            if frame.isolated {
                crossed_isolation = true;
            }
        }
        None
    }

    /// The nearest enclosing function's expected return type.
    pub fn return_ty(&self) -> Option<&Ty> {
        self.frames.iter().rev().find_map(|f| f.return_ty.as_ref())
    }

    /// Whether any enclosing frame is a function body.
    pub fn in_function(&self) -> bool {
        self.frames.iter().any(|f| f.return_ty.is_some())
    }

    /// Find the cell for a generic parameter name, walking outward so a
    /// parent generic context stays reachable from a nested one.
    pub fn lookup_generic(&self, name: &str) -> Option<GenericVar> {
        for frame in self.frames.iter().rev() {
            if let Some(generics) = &frame.generics {
                if let Some(cell) = generics.get(name) {
                    return Some(cell.clone());
                }
            }
        }
        None
    }

    /// Every generic cell visible from the innermost frame, nearest
    /// binding winning.
    pub fn visible_generics(&self) -> FxHashMap<String, GenericVar> {
        let mut out = FxHashMap::default();
        for frame in self.frames.iter().rev() {
            if let Some(generics) = &frame.generics {
                for (name, cell) in generics {
                    out.entry(name.clone()).or_insert_with(|| cell.clone());
                }
            }
        }
        out
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward() {
        let mut scope = ScopeStack::new();
        scope.declare("x", Ty::Int, false).unwrap();

        scope.push();
        assert!(scope.get("x").is_some());
        assert!(scope.get("y").is_none());
    }

    #[test]
    fn duplicate_in_same_frame_is_rejected() {
        let mut scope = ScopeStack::new();
        scope.declare("x", Ty::Int, false).unwrap();
        assert!(scope.declare("x", Ty::Str, false).is_err());

        // Shadowing in a nested frame is fine.
        scope.push();
        assert!(scope.declare("x", Ty::Str, false).is_ok());
        assert_eq!(scope.get("x").unwrap().symbol.ty, Ty::Str);

        scope.pop();
        assert_eq!(scope.get("x").unwrap().symbol.ty, Ty::Int);
    }

    #[test]
    fn return_ty_comes_from_nearest_function_frame() {
        let mut scope = ScopeStack::new();
        assert!(scope.return_ty().is_none());
        assert!(!scope.in_function());

        scope.push_function(Ty::Int);
        scope.push();
        assert_eq!(scope.return_ty(), Some(&Ty::Int));
        assert!(scope.in_function());

        scope.push_function(Ty::Str);
        assert_eq!(scope.return_ty(), Some(&Ty::Str));
    }

    #[test]
    fn isolation_flags_mutable_capture() {
        let mut scope = ScopeStack::new();
        scope.declare("counter", Ty::Int, true).unwrap();

        scope.push_isolated(Ty::Int);
        let found = scope.get("counter").unwrap();
        assert!(found.crossed_isolation);
        assert!(found.symbol.mutable);

        // Names declared inside the isolated frame are unaffected.
        scope.declare("local", Ty::Int, true).unwrap();
        assert!(!scope.get("local").unwrap().crossed_isolation);
    }

    #[test]
    fn generic_lookup_walks_to_parent_context() {
        let mut scope = ScopeStack::new();
        let mut table = TypeTable::new();

        let outer = scope.push_generics(&["T".to_string()], &mut table);
        scope.push();
        let _inner = scope.push_generics(&["U".to_string()], &mut table);

        // The parent's cell is visible from the nested generic scope.
        assert_eq!(scope.lookup_generic("T"), Some(outer["T"].clone()));
        assert!(scope.lookup_generic("U").is_some());
        assert!(scope.lookup_generic("V").is_none());

        let visible = scope.visible_generics();
        assert_eq!(visible.len(), 2);
    }
}
