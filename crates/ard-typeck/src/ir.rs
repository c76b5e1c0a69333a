//! The checked program.
//!
//! A desugared mirror of the parse tree whose leaves carry resolved types.
//! Downstream consumers (tree-walking evaluation, bytecode emission) read
//! this and never the parse tree. Arithmetic is split into per-operand-type
//! variants and built-in method calls into per-receiver families so the
//! evaluator can fast-path them without re-inspecting operand types.

use rustc_hash::FxHashMap;

use crate::ty::{FunSig, Ty};

/// A checked compilation unit.
#[derive(Debug, Default)]
pub struct Program {
    /// Local module name -> resolved module path, in import order.
    pub imports: Vec<(String, String)>,
    pub statements: Vec<Stmt>,
}

/// A checked statement.
#[derive(Clone, Debug)]
pub enum Stmt {
    VariableDef(VariableDef),
    Reassignment(Reassignment),
    WhileLoop { condition: Expr, body: Block },
    ForLoop {
        init: Box<VariableDef>,
        condition: Expr,
        update: Box<Reassignment>,
        body: Block,
    },
    /// `for i in a..b` over Int, inclusive start, exclusive end.
    ForIntRange {
        cursor: String,
        start: Expr,
        end: Expr,
        body: Block,
    },
    /// One character per step.
    ForInStr { cursor: String, subject: Expr, body: Block },
    ForInList {
        cursor: String,
        index: Option<String>,
        subject: Expr,
        body: Block,
    },
    ForInMap {
        key: String,
        value: String,
        subject: Expr,
        body: Block,
    },
    Break,
    FunctionDecl(FunctionDecl),
    /// A foreign signature; the body is provided by the host bridge.
    ExternFunction { sig: FunSig },
    /// Definition statements; the definitions themselves live in the
    /// registry, method bodies travel here for the evaluator.
    StructDecl { name: String },
    EnumDecl { name: String },
    TraitDecl { name: String },
    ImplBlock { target: String, methods: Vec<FunctionDecl> },
    TraitImpl {
        trait_name: String,
        target: String,
        methods: Vec<FunctionDecl>,
    },
    TypeDecl { name: String },
    Expr(Expr),
}

/// `let`/`mut` binding. The initializer is already wrapped in
/// [`Expr::Copy`] when value semantics require an independent value.
#[derive(Clone, Debug)]
pub struct VariableDef {
    pub name: String,
    pub mutable: bool,
    pub value: Expr,
}

/// The checked left-hand side of an assignment.
#[derive(Clone, Debug)]
pub enum AssignTarget {
    Name(String),
    Property { object: Box<Expr>, name: String },
}

#[derive(Clone, Debug)]
pub struct Reassignment {
    pub target: AssignTarget,
    pub value: Expr,
}

#[derive(Clone, Debug)]
pub struct FunctionDecl {
    pub sig: FunSig,
    pub body: Block,
}

/// A checked block; its type is the type of its trailing expression, or
/// `Void` when it ends in a non-expression statement.
#[derive(Clone, Debug)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub ty: Ty,
}

// ── Built-in method families ───────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrMethodKind {
    Size,
    IsEmpty,
    Contains,
    Replace,
    ReplaceAll,
    Split,
    StartsWith,
    ToStr,
    Trim,
    ToDyn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntMethodKind {
    ToStr,
    ToFloat,
    Abs,
    ToDyn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloatMethodKind {
    ToStr,
    Floor,
    Ceil,
    ToDyn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoolMethodKind {
    ToStr,
    ToDyn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListMethodKind {
    Size,
    IsEmpty,
    At,
    Push,
    Pop,
    Contains,
    ToDyn,
}

impl ListMethodKind {
    pub fn mutates(self) -> bool {
        matches!(self, ListMethodKind::Push | ListMethodKind::Pop)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapMethodKind {
    Size,
    IsEmpty,
    Get,
    Set,
    Delete,
    Has,
    Keys,
    Values,
}

impl MapMethodKind {
    pub fn mutates(self) -> bool {
        matches!(self, MapMethodKind::Set | MapMethodKind::Delete)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaybeMethodKind {
    IsSome,
    IsNone,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultMethodKind {
    IsOk,
    IsErr,
    Or,
}

/// What a user-defined method's receiver is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiverKind {
    Struct,
    Enum,
    Trait,
}

// ── Operators ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Int only.
    Mod,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

// ── Expressions ────────────────────────────────────────────────────────

/// A checked expression. Every node answers [`Expr::ty`].
#[derive(Clone, Debug)]
pub enum Expr {
    IntLiteral(i64),
    FloatLiteral(f64),
    StrLiteral(String),
    BoolLiteral(bool),
    /// Interpolation after desugaring: every part is `Str`-typed (non-string
    /// chunks were wrapped in their `to_str()` call).
    InterpolatedStr { parts: Vec<Expr> },

    Identifier { name: String, ty: Ty },
    /// A symbol read out of an imported module.
    ModuleSymbol { module: String, name: String, ty: Ty },
    /// `Dir::up` -- the variant's type is the enum itself.
    EnumVariant {
        enum_name: String,
        variant: String,
        discriminant: i64,
    },

    // Typed arithmetic. Operands of `IntArith`/`IntCmp` may also be
    // enum-typed: enums are integer-tagged and compare by discriminant.
    IntArith { op: ArithOp, lhs: Box<Expr>, rhs: Box<Expr> },
    FloatArith { op: ArithOp, lhs: Box<Expr>, rhs: Box<Expr> },
    StrConcat { lhs: Box<Expr>, rhs: Box<Expr> },
    IntCmp { op: CmpOp, lhs: Box<Expr>, rhs: Box<Expr> },
    FloatCmp { op: CmpOp, lhs: Box<Expr>, rhs: Box<Expr> },
    StrCmp { op: CmpOp, lhs: Box<Expr>, rhs: Box<Expr> },
    BoolEq { negated: bool, lhs: Box<Expr>, rhs: Box<Expr> },
    And { lhs: Box<Expr>, rhs: Box<Expr> },
    Or { lhs: Box<Expr>, rhs: Box<Expr> },
    Not(Box<Expr>),
    NegateInt(Box<Expr>),
    NegateFloat(Box<Expr>),

    /// A direct or higher-order call; `sig` is the specialized signature
    /// (generics substituted with the call site's resolved bindings).
    Call {
        callee: Box<Expr>,
        sig: FunSig,
        args: Vec<Expr>,
    },
    /// `module::fn(args)`.
    ModuleCall {
        module: String,
        sig: FunSig,
        args: Vec<Expr>,
    },
    /// The built-in `panic(msg)`.
    Panic { message: Box<Expr> },
    /// `async::start(f)` -- type is the specialized `Fiber<T>`.
    FiberStart { closure: Box<Expr>, ty: Ty },
    /// `async::eval(f)`.
    FiberEval { closure: Box<Expr>, ty: Ty },

    // Built-in method families.
    StrMethod {
        kind: StrMethodKind,
        receiver: Box<Expr>,
        args: Vec<Expr>,
        ty: Ty,
    },
    IntMethod {
        kind: IntMethodKind,
        receiver: Box<Expr>,
        args: Vec<Expr>,
        ty: Ty,
    },
    FloatMethod {
        kind: FloatMethodKind,
        receiver: Box<Expr>,
        args: Vec<Expr>,
        ty: Ty,
    },
    BoolMethod {
        kind: BoolMethodKind,
        receiver: Box<Expr>,
        args: Vec<Expr>,
        ty: Ty,
    },
    ListMethod {
        kind: ListMethodKind,
        receiver: Box<Expr>,
        args: Vec<Expr>,
        ty: Ty,
    },
    MapMethod {
        kind: MapMethodKind,
        receiver: Box<Expr>,
        args: Vec<Expr>,
        ty: Ty,
    },
    MaybeMethod {
        kind: MaybeMethodKind,
        receiver: Box<Expr>,
        args: Vec<Expr>,
        ty: Ty,
    },
    ResultMethod {
        kind: ResultMethodKind,
        receiver: Box<Expr>,
        args: Vec<Expr>,
        ty: Ty,
    },
    /// A user-defined struct/enum/trait method call; `sig` is specialized.
    InstanceMethod {
        receiver: Box<Expr>,
        receiver_kind: ReceiverKind,
        sig: FunSig,
        args: Vec<Expr>,
    },

    /// `a.b` on a struct instance.
    Property {
        object: Box<Expr>,
        name: String,
        ty: Ty,
    },

    /// A struct literal; `field_tys` is the refined (specialized) field
    /// type map the instance was checked against.
    StructInit {
        name: String,
        ty: Ty,
        fields: Vec<(String, Expr)>,
        field_tys: FxHashMap<String, Ty>,
    },
    /// A struct literal for a module-exported struct.
    ModuleStructInit {
        module: String,
        name: String,
        ty: Ty,
        fields: Vec<(String, Expr)>,
        field_tys: FxHashMap<String, Ty>,
    },

    // Desugared matches.
    OptionMatch {
        subject: Box<Expr>,
        inner_ty: Ty,
        binding: String,
        some_body: Box<Expr>,
        none_body: Box<Expr>,
        ty: Ty,
    },
    EnumMatch {
        subject: Box<Expr>,
        enum_name: String,
        /// One slot per variant, in declaration order.
        cases: Vec<Option<Expr>>,
        catch_all: Option<Box<Expr>>,
        ty: Ty,
    },
    BoolMatch {
        subject: Box<Expr>,
        true_body: Box<Expr>,
        false_body: Box<Expr>,
        ty: Ty,
    },
    UnionMatch {
        subject: Box<Expr>,
        cases: Vec<UnionCase>,
        catch_all: Option<Box<Expr>>,
        ty: Ty,
    },
    ResultMatch {
        subject: Box<Expr>,
        ok_binding: String,
        ok_body: Box<Expr>,
        err_binding: String,
        err_body: Box<Expr>,
        ty: Ty,
    },
    IntMatch {
        subject: Box<Expr>,
        int_cases: Vec<(i64, Expr)>,
        /// Inclusive ranges.
        range_cases: Vec<(i64, i64, Expr)>,
        catch_all: Box<Expr>,
        ty: Ty,
    },

    If {
        condition: Box<Expr>,
        then_block: Block,
        else_block: Option<Box<Expr>>,
        ty: Ty,
    },

    /// The value must be cloned at binding or call time (value semantics).
    Copy(Box<Expr>),

    /// `try expr` / `try expr catch (e) { ... }`. Without a catch block,
    /// failure propagates by early-returning the operand; the enclosing
    /// function's `Maybe`/`Result` shape was validated at check time. Note
    /// that `try` on a `Maybe` only constrains the enclosing return to be
    /// *some* `Maybe`; the inner types are deliberately unconstrained.
    TryOp {
        operand: Box<Expr>,
        /// The error binding (`Result` subjects only) and handler body.
        catch: Option<CatchArm>,
        ty: Ty,
    },

    Closure { sig: FunSig, body: Block },

    ListLit { elem_ty: Ty, elements: Vec<Expr> },
    MapLit {
        key_ty: Ty,
        value_ty: Ty,
        entries: Vec<(Expr, Expr)>,
    },
    Block(Block),
}

/// One type arm of a union match.
#[derive(Clone, Debug)]
pub struct UnionCase {
    pub member: Ty,
    pub binding: Option<String>,
    pub body: Expr,
}

/// The catch handler of a [`Expr::TryOp`].
#[derive(Clone, Debug)]
pub struct CatchArm {
    pub binding: Option<String>,
    pub body: Block,
}

impl Expr {
    /// The resolved type of this expression.
    pub fn ty(&self) -> Ty {
        match self {
            Expr::IntLiteral(_) => Ty::Int,
            Expr::FloatLiteral(_) => Ty::Float,
            Expr::StrLiteral(_) | Expr::InterpolatedStr { .. } => Ty::Str,
            Expr::BoolLiteral(_) => Ty::Bool,
            Expr::Identifier { ty, .. } | Expr::ModuleSymbol { ty, .. } => ty.clone(),
            Expr::EnumVariant { enum_name, .. } => Ty::Enum(enum_name.clone()),
            Expr::IntArith { .. } => Ty::Int,
            Expr::FloatArith { .. } => Ty::Float,
            Expr::StrConcat { .. } => Ty::Str,
            Expr::IntCmp { .. }
            | Expr::FloatCmp { .. }
            | Expr::StrCmp { .. }
            | Expr::BoolEq { .. }
            | Expr::And { .. }
            | Expr::Or { .. }
            | Expr::Not(_) => Ty::Bool,
            Expr::NegateInt(_) => Ty::Int,
            Expr::NegateFloat(_) => Ty::Float,
            Expr::Call { sig, .. } | Expr::ModuleCall { sig, .. } => sig.ret.clone(),
            Expr::Panic { .. } => Ty::Void,
            Expr::FiberStart { ty, .. } | Expr::FiberEval { ty, .. } => ty.clone(),
            Expr::StrMethod { ty, .. }
            | Expr::IntMethod { ty, .. }
            | Expr::FloatMethod { ty, .. }
            | Expr::BoolMethod { ty, .. }
            | Expr::ListMethod { ty, .. }
            | Expr::MapMethod { ty, .. }
            | Expr::MaybeMethod { ty, .. }
            | Expr::ResultMethod { ty, .. } => ty.clone(),
            Expr::InstanceMethod { sig, .. } => sig.ret.clone(),
            Expr::Property { ty, .. } => ty.clone(),
            Expr::StructInit { ty, .. } | Expr::ModuleStructInit { ty, .. } => ty.clone(),
            Expr::OptionMatch { ty, .. }
            | Expr::EnumMatch { ty, .. }
            | Expr::BoolMatch { ty, .. }
            | Expr::UnionMatch { ty, .. }
            | Expr::ResultMatch { ty, .. }
            | Expr::IntMatch { ty, .. }
            | Expr::If { ty, .. }
            | Expr::TryOp { ty, .. } => ty.clone(),
            Expr::Copy(inner) => inner.ty(),
            Expr::Closure { sig, .. } => Ty::Fun(Box::new(sig.clone())),
            Expr::ListLit { elem_ty, .. } => Ty::list(elem_ty.clone()),
            Expr::MapLit { key_ty, value_ty, .. } => {
                Ty::map(key_ty.clone(), value_ty.clone())
            }
            Expr::Block(block) => block.ty.clone(),
        }
    }
}
