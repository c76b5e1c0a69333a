//! Expressions and match patterns.

use ard_common::Span;

use super::stmt::Stmt;
use super::types::TypeExpr;

/// An expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A numeric literal, raw text as written (underscores intact).
    Number(NumberLit),
    /// A string literal, possibly interpolated.
    Str(StrLit),
    Bool(BoolLit),
    Ident(Ident),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    /// `a < b < c` -- more than one relational operator in a row.
    ChainedCmp(ChainedCmp),
    Call(CallExpr),
    /// `a.b`.
    Property(PropertyExpr),
    /// `a.b(args)`.
    MethodCall(MethodCallExpr),
    /// `Parent::name` -- enum variant, module symbol.
    StaticProperty(StaticProperty),
    /// `Parent::name(args)` -- module function, static struct function.
    StaticCall(StaticCall),
    StructLit(StructLit),
    Match(MatchExpr),
    /// Subjectless match: every arm is a boolean condition.
    CondMatch(CondMatchExpr),
    Try(TryExpr),
    List(ListLit),
    Map(MapLit),
    AnonFn(AnonFn),
    If(IfExpr),
    Block(Block),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(e) => e.span,
            Expr::Str(e) => e.span,
            Expr::Bool(e) => e.span,
            Expr::Ident(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::ChainedCmp(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Property(e) => e.span,
            Expr::MethodCall(e) => e.span,
            Expr::StaticProperty(e) => e.span,
            Expr::StaticCall(e) => e.span,
            Expr::StructLit(e) => e.span,
            Expr::Match(e) => e.span,
            Expr::CondMatch(e) => e.span,
            Expr::Try(e) => e.span,
            Expr::List(e) => e.span,
            Expr::Map(e) => e.span,
            Expr::AnonFn(e) => e.span,
            Expr::If(e) => e.span,
            Expr::Block(e) => e.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NumberLit {
    pub text: String,
    pub span: Span,
}

/// One chunk of a (possibly interpolated) string literal.
#[derive(Debug, Clone)]
pub enum StrPart {
    Text(String),
    Interp(Expr),
}

#[derive(Debug, Clone)]
pub struct StrLit {
    pub parts: Vec<StrPart>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BoolLit {
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`.
    Neg,
    /// `not x`.
    Not,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    /// `<`, `<=`, `>`, `>=`.
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// `==`, `!=`.
    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

/// `a < b < c`: `operands.len() == ops.len() + 1`.
#[derive(Debug, Clone)]
pub struct ChainedCmp {
    pub operands: Vec<Expr>,
    pub ops: Vec<BinaryOp>,
    pub span: Span,
}

/// A call argument: positional or named, optionally marked `mut`.
#[derive(Debug, Clone)]
pub struct Arg {
    pub name: Option<String>,
    pub mutable: bool,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    /// Explicit type arguments: `id<Int>(1)`.
    pub type_args: Vec<TypeExpr>,
    pub args: Vec<Arg>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct PropertyExpr {
    pub object: Box<Expr>,
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodCallExpr {
    pub object: Box<Expr>,
    pub name: String,
    pub args: Vec<Arg>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StaticProperty {
    pub parent: String,
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StaticCall {
    pub parent: String,
    pub name: String,
    pub type_args: Vec<TypeExpr>,
    pub args: Vec<Arg>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldInit {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StructLit {
    /// Set when the struct type comes from a module: `io::File { ... }`.
    pub module: Option<String>,
    pub name: String,
    pub fields: Vec<FieldInit>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MatchExpr {
    pub subject: Box<Expr>,
    pub arms: Vec<MatchArm>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CondArm {
    pub condition: Expr,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CondMatchExpr {
    pub arms: Vec<CondArm>,
    pub else_arm: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    /// The error binding; absent for `Maybe` subjects.
    pub binding: Option<String>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TryExpr {
    pub operand: Box<Expr>,
    pub catch: Option<CatchClause>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ListLit {
    pub elements: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MapLit {
    pub entries: Vec<MapEntry>,
    pub span: Span,
}

/// An anonymous-function parameter; the type may be inferred from context.
#[derive(Debug, Clone)]
pub struct AnonParam {
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AnonFn {
    pub params: Vec<AnonParam>,
    pub ret: Option<TypeExpr>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfExpr {
    pub condition: Box<Expr>,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ElseBranch {
    ElseIf(Box<IfExpr>),
    Else(Block),
}

#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

// ── Patterns ───────────────────────────────────────────────────────────

/// A match-arm pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// `_`.
    Wildcard { span: Span },
    /// A bare name; binds the (unwrapped) subject in the arm's scope.
    Binding { name: String, span: Span },
    /// `Dir::up`.
    Member {
        parent: String,
        name: String,
        span: Span,
    },
    /// An integer literal, `negative` when written with unary `-`.
    Number {
        text: String,
        negative: bool,
        span: Span,
    },
    /// `a..b`, inclusive on both ends.
    Range {
        lo: Box<Pattern>,
        hi: Box<Pattern>,
        span: Span,
    },
    Bool { value: bool, span: Span },
    /// A union arm: a type name with an optional binding (`Str s`).
    Type {
        ty: TypeExpr,
        binding: Option<String>,
        span: Span,
    },
    /// `ok(x)`; the binding may be `_`.
    Ok { binding: String, span: Span },
    /// `err(e)`.
    Err { binding: String, span: Span },
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Wildcard { span }
            | Pattern::Binding { span, .. }
            | Pattern::Member { span, .. }
            | Pattern::Number { span, .. }
            | Pattern::Range { span, .. }
            | Pattern::Bool { span, .. }
            | Pattern::Type { span, .. }
            | Pattern::Ok { span, .. }
            | Pattern::Err { span, .. } => *span,
        }
    }
}
