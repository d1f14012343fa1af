//! SGR colour resolution.
//!
//! Pure functions that fold an SGR parameter list into an [`Attribute`].
//!
//! | Code       | Effect                                               |
//! |------------|------------------------------------------------------|
//! | 0          | reset attribute; nothing inherited afterwards        |
//! | 1          | foreground intensity                                 |
//! | 4          | underline, applied after the whole list              |
//! | 7          | reverse video (swap nibbles and their inherit bits)  |
//! | 30-37      | foreground colour, keeps intensity                   |
//! | 39         | reset foreground                                     |
//! | 40-47      | background colour, keeps intensity                   |
//! | 49         | reset background                                     |
//! | 90-97      | bright foreground                                    |
//! | 100-107    | bright background                                    |
//!
//! Everything else is a no-op.

use crate::attribute::{Attribute, InheritMask};
use crate::escape::EscapeSequence;

/// ANSI colour order (black, red, green, yellow, blue, magenta, cyan,
/// white) mapped onto the console's blue/green/red bit order.
pub const ANSI_TO_NATIVE: [u8; 8] = [0, 4, 2, 6, 1, 5, 3, 7];

const INTENSITY: u8 = 0x08;
const COLOR_BITS: u8 = 0x07;

/// Output of [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    /// Final attribute after every parameter was applied.
    pub attribute: Attribute,
    /// Components that still come from the starting attribute.
    pub inherited: InheritMask,
}

impl Resolved {
    /// The escape determined the result without looking at the starting
    /// attribute.
    #[must_use]
    pub fn is_self_contained(&self) -> bool {
        self.inherited.is_empty()
    }
}

fn remap(code: u16, base: u16) -> u8 {
    ANSI_TO_NATIVE[usize::from(code - base) & 7]
}

/// Apply an SGR parameter list to `initial`.
///
/// `reset` is the value SGR 0, 39 and 49 restore.
#[must_use]
pub fn resolve(initial: Attribute, params: &[u16], reset: Attribute) -> Resolved {
    let mut attr = initial;
    let mut inherited = InheritMask::all();
    let mut underline = false;

    for &code in params {
        match code {
            0 => {
                attr = reset;
                inherited = InheritMask::empty();
            }
            1 => attr = attr.intensified(),
            4 => underline = true,
            7 => {
                attr = attr.reversed();
                inherited = inherited.reversed();
            }
            30..=37 => {
                let fg = (attr.foreground() & INTENSITY) | remap(code, 30);
                attr = attr.with_foreground(fg);
                inherited.remove(InheritMask::FOREGROUND);
            }
            39 => {
                attr = attr.with_foreground(reset.foreground());
                inherited.remove(InheritMask::FOREGROUND);
            }
            40..=47 => {
                let bg = (attr.background() & INTENSITY) | remap(code, 40);
                attr = attr.with_background(bg);
                inherited.remove(InheritMask::BACKGROUND);
            }
            49 => {
                attr = attr.with_background(reset.background());
                inherited.remove(InheritMask::BACKGROUND);
            }
            90..=97 => {
                attr = attr.with_foreground(INTENSITY | remap(code, 90));
                inherited.remove(InheritMask::FOREGROUND);
            }
            100..=107 => {
                attr = attr.with_background(INTENSITY | remap(code, 100));
                inherited.remove(InheritMask::BACKGROUND);
            }
            _ => {}
        }
    }

    if underline {
        attr = attr.with_underline(true);
        inherited.remove(InheritMask::UNDERLINE);
    }

    Resolved {
        attribute: attr,
        inherited,
    }
}

/// Resolve a complete escape. Non-SGR sequences leave `initial` and the
/// inherit mask untouched.
#[must_use]
pub fn resolve_sequence(initial: Attribute, seq: &EscapeSequence<'_>, reset: Attribute) -> Resolved {
    if !seq.is_sgr() {
        return Resolved {
            attribute: initial,
            inherited: InheritMask::all(),
        };
    }
    resolve(initial, &seq.params(), reset)
}

/// Whether any parameter reads the reset attribute (0, 39, 49).
#[must_use]
pub fn references_reset(params: &[u16]) -> bool {
    params.iter().any(|&code| matches!(code, 0 | 39 | 49))
}

/// Inverse of [`ANSI_TO_NATIVE`]: native colour bits back to ANSI order.
#[must_use]
pub fn native_to_ansi(native: u8) -> u8 {
    let bits = native & COLOR_BITS;
    ANSI_TO_NATIVE
        .iter()
        .position(|&n| n == bits)
        .map_or(0, |i| i as u8)
}
