//! The Ard parse tree.
//!
//! This crate defines the syntax-tree shape the type checker consumes. The
//! parser that produces these trees is a separate component; anything that
//! can build this tree (a parser, a macro, a test helper) can drive the
//! checker.
//!
//! The tree is a closed sum: every statement, expression, pattern, and type
//! annotation is a variant of one of the enums in [`ast`], and every node
//! carries an [`ard_common::Span`] so diagnostics can quote the source.

pub mod ast;

pub use ast::Program;
