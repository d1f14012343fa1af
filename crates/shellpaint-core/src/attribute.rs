//! Console attribute model.
//!
//! An [`Attribute`] is the 16-bit value a character-cell console stores next
//! to every character: a foreground nibble, a background nibble, and an
//! underline bit. Each nibble is `blue | green | red | intensity`, which is
//! why ANSI colour numbers need a remap table before they land here.

use bitflags::bitflags;

use crate::error::Result;

/// Packed console attribute.
///
/// | Bits  | Meaning                                   |
/// |-------|-------------------------------------------|
/// | 0-3   | foreground: blue, green, red, intensity   |
/// | 4-7   | background: blue, green, red, intensity   |
/// | 15    | underline                                 |
///
/// Bits 8-14 are never set by this crate; [`Attribute::new`] masks them off
/// so every value stays representable in the fixed-width form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attribute(u16);

impl Default for Attribute {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Attribute {
    pub const FG_BLUE: u16 = 0x0001;
    pub const FG_GREEN: u16 = 0x0002;
    pub const FG_RED: u16 = 0x0004;
    pub const FG_INTENSITY: u16 = 0x0008;
    pub const BG_BLUE: u16 = 0x0010;
    pub const BG_GREEN: u16 = 0x0020;
    pub const BG_RED: u16 = 0x0040;
    pub const BG_INTENSITY: u16 = 0x0080;
    pub const UNDERLINE: u16 = 0x8000;

    const FG_MASK: u16 = 0x000F;
    const BG_MASK: u16 = 0x00F0;
    const VALID_MASK: u16 = Self::FG_MASK | Self::BG_MASK | Self::UNDERLINE;

    /// Light grey on black: what a console shows before anyone styles it.
    pub const DEFAULT: Self = Self(0x0007);

    /// Build an attribute from raw bits, dropping bits outside the model.
    #[must_use]
    pub const fn new(bits: u16) -> Self {
        Self(bits & Self::VALID_MASK)
    }

    /// Build an attribute from foreground and background nibbles.
    #[must_use]
    pub const fn from_colors(fg: u8, bg: u8) -> Self {
        Self::new((fg as u16 & 0x0F) | ((bg as u16 & 0x0F) << 4))
    }

    /// Raw 16-bit value.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Foreground nibble, including the intensity bit.
    #[must_use]
    pub const fn foreground(self) -> u8 {
        (self.0 & Self::FG_MASK) as u8
    }

    /// Background nibble, including the intensity bit.
    #[must_use]
    pub const fn background(self) -> u8 {
        ((self.0 & Self::BG_MASK) >> 4) as u8
    }

    #[must_use]
    pub const fn is_underlined(self) -> bool {
        self.0 & Self::UNDERLINE != 0
    }

    #[must_use]
    pub const fn is_intense(self) -> bool {
        self.0 & Self::FG_INTENSITY != 0
    }

    #[must_use]
    pub const fn with_foreground(self, fg: u8) -> Self {
        Self((self.0 & !Self::FG_MASK) | (fg as u16 & 0x0F))
    }

    #[must_use]
    pub const fn with_background(self, bg: u8) -> Self {
        Self((self.0 & !Self::BG_MASK) | ((bg as u16 & 0x0F) << 4))
    }

    #[must_use]
    pub const fn with_underline(self, on: bool) -> Self {
        if on {
            Self(self.0 | Self::UNDERLINE)
        } else {
            Self(self.0 & !Self::UNDERLINE)
        }
    }

    /// Set the foreground intensity bit.
    #[must_use]
    pub const fn intensified(self) -> Self {
        Self(self.0 | Self::FG_INTENSITY)
    }

    /// Swap the foreground and background nibbles (reverse video).
    #[must_use]
    pub const fn reversed(self) -> Self {
        let fg = self.foreground();
        let bg = self.background();
        self.with_foreground(bg).with_background(fg)
    }
}

impl From<u16> for Attribute {
    fn from(bits: u16) -> Self {
        Self::new(bits)
    }
}

impl From<Attribute> for u16 {
    fn from(attr: Attribute) -> Self {
        attr.0
    }
}

bitflags! {
    /// Components of a resolved attribute that still come from the starting
    /// attribute rather than from the escape itself.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InheritMask: u8 {
        const FOREGROUND = 1 << 0;
        const BACKGROUND = 1 << 1;
        const UNDERLINE  = 1 << 2;
    }
}

impl InheritMask {
    /// Swap the foreground and background bits, mirroring reverse video.
    #[must_use]
    pub fn reversed(self) -> Self {
        let mut out = self & Self::UNDERLINE;
        if self.contains(Self::FOREGROUND) {
            out |= Self::BACKGROUND;
        }
        if self.contains(Self::BACKGROUND) {
            out |= Self::FOREGROUND;
        }
        out
    }
}

impl Default for InheritMask {
    fn default() -> Self {
        Self::all()
    }
}

/// The attribute SGR 0 restores.
///
/// Undefined until first queried or set. The render session owns it and
/// passes it by reference into every backend call, so there is no process
/// global to race on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetAttribute {
    value: Option<Attribute>,
}

impl ResetAttribute {
    /// An unset reset attribute.
    #[must_use]
    pub const fn new() -> Self {
        Self { value: None }
    }

    /// A reset attribute that is already established.
    #[must_use]
    pub const fn with_value(attr: Attribute) -> Self {
        Self { value: Some(attr) }
    }

    #[must_use]
    pub const fn get(&self) -> Option<Attribute> {
        self.value
    }

    /// Current value, or `fallback` if nothing has been established.
    /// Does not seed.
    #[must_use]
    pub fn get_or(&self, fallback: Attribute) -> Attribute {
        self.value.unwrap_or(fallback)
    }

    pub fn set(&mut self, attr: Attribute) {
        self.value = Some(attr);
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Return the established value, seeding it from `query` on first use.
    ///
    /// A failing query leaves the value unset.
    pub fn get_or_seed<F>(&mut self, query: F) -> Result<Attribute>
    where
        F: FnOnce() -> Result<Attribute>,
    {
        if let Some(attr) = self.value {
            return Ok(attr);
        }
        let attr = query()?;
        self.value = Some(attr);
        Ok(attr)
    }
}
