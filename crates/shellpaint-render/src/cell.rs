//! Offscreen grid cell: one character and its console attribute.
//!
//! This is deliberately smaller than a terminal emulator cell. The grid only
//! composes shell output for later blitting, so there is no width tracking
//! or hyperlink state.

use shellpaint_core::Attribute;

/// A single cell in an [`OffscreenGrid`](crate::OffscreenGrid).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    /// The character content. A space for blank cells.
    pub ch: char,
    pub attr: Attribute,
}

impl Default for GridCell {
    fn default() -> Self {
        Self::blank(Attribute::DEFAULT)
    }
}

impl GridCell {
    #[must_use]
    pub const fn new(ch: char, attr: Attribute) -> Self {
        Self { ch, attr }
    }

    /// A space painted with `attr`.
    #[must_use]
    pub const fn blank(attr: Attribute) -> Self {
        Self { ch: ' ', attr }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.ch == ' '
    }
}
