//! Attaching source ranges to values.
//!
//! - [`SourceRangeMixin`] wraps a value with the byte range in the source where it came from.
//! - [`SourceRangeMixinExt`] provides `into_wrapper_range` on any value to wrap it.

use std::ops::Range;

/// A value with the byte range in the source where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceRangeMixin<T> {
    content: T,
    range: Range<usize>,
}

impl<T> SourceRangeMixin<T> {
    /// Wraps `content` with `range`.
    pub const fn new(content: T, range: Range<usize>) -> Self {
        Self { content, range }
    }

    /// The wrapped value.
    pub const fn content(&self) -> &T {
        &self.content
    }

    /// Takes the wrapped value out.
    pub fn into_content(self) -> T {
        self.content
    }

    /// The byte range, 0-based and end-exclusive.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }
}

impl<T: std::fmt::Display> std::fmt::Display for SourceRangeMixin<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at bytes [{}, {})",
            self.content, self.range.start, self.range.end
        )
    }
}

impl<T: std::error::Error + 'static> std::error::Error for SourceRangeMixin<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.content)
    }
}

/// Extension methods to wrap any value into [`SourceRangeMixin`].
pub trait SourceRangeMixinExt: Sized {
    /// Wraps this with `range`.
    fn into_wrapper_range(self, range: Range<usize>) -> SourceRangeMixin<Self> {
        SourceRangeMixin::new(self, range)
    }
}

impl<T> SourceRangeMixinExt for T {}
