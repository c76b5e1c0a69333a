//! Byte-range source spans.
//!
//! Spans are half-open byte ranges into a single source file. They are
//! file-relative; the file path itself travels on the diagnostic, not on
//! the span.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// A half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Create a new span. `start` must not exceed `end`.
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    /// A zero-width span at offset 0, for synthesized nodes.
    pub fn synthetic() -> Self {
        Self { start: 0, end: 0 }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Length in bytes.
    pub fn len(self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Range<usize> {
        span.start as usize..span.end as usize
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_spans() {
        let a = Span::new(4, 10);
        let b = Span::new(8, 20);
        assert_eq!(a.to(b), Span::new(4, 20));
        assert_eq!(b.to(a), Span::new(4, 20));
    }

    #[test]
    fn range_conversion() {
        let span = Span::new(3, 7);
        let range: Range<usize> = span.into();
        assert_eq!(range, 3..7);
        assert_eq!(span.len(), 4);
        assert!(!span.is_empty());
        assert!(Span::synthetic().is_empty());
    }

    #[test]
    fn display() {
        assert_eq!(Span::new(1, 5).to_string(), "1..5");
    }
}
