//! Shared plumbing for the Ard compiler.
//!
//! Currently this is just [`Span`]; it lives in its own crate so that the
//! syntax tree and the checker can agree on source locations without either
//! depending on the other.

pub mod span;

pub use span::Span;
