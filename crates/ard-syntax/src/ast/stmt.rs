//! Statements and top-level declarations.

use ard_common::Span;

use super::expr::{Block, Expr};
use super::types::TypeExpr;

/// A statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    VariableDecl(VariableDecl),
    Assignment(Assignment),
    While(WhileLoop),
    /// C-style `for mut i = 0; i < n; i = i + 1 { ... }`.
    For(ForLoop),
    /// `for x in xs { ... }` / `for k, v in m { ... }` / `for c in s { ... }`.
    ForIn(ForInLoop),
    /// `for i in a..b { ... }` and the one-operand sugar `for i in n { ... }`.
    Range(RangeLoop),
    FunctionDecl(FunctionDecl),
    /// A foreign signature: body provided by the host bridge.
    ExternFunction(ExternFunction),
    StructDecl(StructDecl),
    EnumDecl(EnumDecl),
    TraitDecl(TraitDecl),
    TraitImpl(TraitImpl),
    ImplBlock(ImplBlock),
    TypeDecl(TypeDecl),
    Break(Span),
    Expr(Expr),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::VariableDecl(s) => s.span,
            Stmt::Assignment(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::ForIn(s) => s.span,
            Stmt::Range(s) => s.span,
            Stmt::FunctionDecl(s) => s.span,
            Stmt::ExternFunction(s) => s.span,
            Stmt::StructDecl(s) => s.span,
            Stmt::EnumDecl(s) => s.span,
            Stmt::TraitDecl(s) => s.span,
            Stmt::TraitImpl(s) => s.span,
            Stmt::ImplBlock(s) => s.span,
            Stmt::TypeDecl(s) => s.span,
            Stmt::Break(span) => *span,
            Stmt::Expr(e) => e.span(),
        }
    }
}

/// `let x: Int = 1` / `mut y = [1, 2]`.
#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub mutable: bool,
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub value: Expr,
    pub span: Span,
}

/// The left-hand side of an assignment.
#[derive(Debug, Clone)]
pub enum AssignTarget {
    Name { name: String, span: Span },
    /// `p.age = ...` -- the object may itself be a property chain.
    Property {
        object: Box<Expr>,
        name: String,
        span: Span,
    },
}

impl AssignTarget {
    pub fn span(&self) -> Span {
        match self {
            AssignTarget::Name { span, .. } | AssignTarget::Property { span, .. } => *span,
        }
    }
}

/// `x = value`.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub target: AssignTarget,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileLoop {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForLoop {
    pub init: Box<VariableDecl>,
    pub condition: Expr,
    pub update: Box<Assignment>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForInLoop {
    /// One cursor for lists/strings, `[value]` or `[value, index]` for
    /// indexed list iteration, `[key, value]` for maps.
    pub cursors: Vec<String>,
    pub iterable: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct RangeLoop {
    pub cursor: String,
    pub start: Expr,
    /// `None` for the one-operand form: `for i in n` iterates `0..n`.
    pub end: Option<Expr>,
    pub body: Block,
    pub span: Span,
}

/// A typed function parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: TypeExpr,
    pub mutable: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    /// Generic parameter names, without the `$` sigil.
    pub generics: Vec<String>,
    pub params: Vec<Param>,
    /// `None` means `Void`.
    pub ret: Option<TypeExpr>,
    pub body: Block,
    /// For methods: declared as mutating the receiver.
    pub mutates: bool,
    pub private: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ExternFunction {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Option<TypeExpr>,
    pub private: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StructField {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: String,
    pub generics: Vec<String>,
    pub fields: Vec<StructField>,
    pub private: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumVariant {
    pub name: String,
    /// Explicit discriminant; auto-assigned from the previous when absent.
    pub value: Option<i64>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub variants: Vec<EnumVariant>,
    pub private: bool,
    pub span: Span,
}

/// A method signature inside a trait declaration.
#[derive(Debug, Clone)]
pub struct TraitMethod {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Option<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TraitDecl {
    pub name: String,
    pub methods: Vec<TraitMethod>,
    pub private: bool,
    pub span: Span,
}

/// `impl ToString for Person { ... }`.
#[derive(Debug, Clone)]
pub struct TraitImpl {
    pub trait_name: String,
    pub target: String,
    pub methods: Vec<FunctionDecl>,
    pub span: Span,
}

/// A method inside an inherent `impl` block.
#[derive(Debug, Clone)]
pub enum ImplMethod {
    /// Receives `@`.
    Instance(FunctionDecl),
    /// No receiver; called as `Type::name(...)`.
    Static(FunctionDecl),
}

/// `impl Person { ... }`.
#[derive(Debug, Clone)]
pub struct ImplBlock {
    pub target: String,
    pub methods: Vec<ImplMethod>,
    pub span: Span,
}

/// `type Id = Int` (alias) or `type Value = Str | Int` (union).
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub types: Vec<TypeExpr>,
    pub private: bool,
    pub span: Span,
}
