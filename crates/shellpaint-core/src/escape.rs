//! Escape sequence units.
//!
//! The only grammar the scanner recognises is `ESC '[' (digit | ';')* t`,
//! where `t` is the first character that is neither a digit nor `;`.
//! Anything else starting with ESC is literal text.

use smallvec::SmallVec;

/// The escape character (0x1B).
pub const ESC: u8 = 0x1b;

/// Parameter list of one escape. Eight inline slots cover every SGR string
/// a shell prompt realistically produces.
pub type Params = SmallVec<[u16; 8]>;

/// A complete escape sequence borrowed from the scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapeSequence<'a> {
    text: &'a str,
}

impl<'a> EscapeSequence<'a> {
    /// Parse one complete sequence from the start of `text`.
    ///
    /// Returns `None` when `text` does not start with `ESC [`, or when the
    /// terminator has not arrived yet. On success the sequence covers
    /// exactly `ESC`, `[`, the parameter bytes, and the terminator.
    #[must_use]
    pub fn parse(text: &'a str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() < 2 || bytes[0] != ESC || bytes[1] != b'[' {
            return None;
        }
        let end = bytes[2..]
            .iter()
            .position(|&b| !(b.is_ascii_digit() || b == b';'))?
            + 2;
        let terminator = text[end..].chars().next()?;
        Some(Self {
            text: &text[..end + terminator.len_utf8()],
        })
    }

    /// Wrap a string the caller already knows is a complete sequence.
    ///
    /// Returns `None` if `text` is not exactly one sequence.
    #[must_use]
    pub fn from_complete(text: &'a str) -> Option<Self> {
        Self::parse(text).filter(|seq| seq.len() == text.len())
    }

    /// The full sequence, ESC through terminator.
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The terminating character.
    #[must_use]
    pub fn terminator(&self) -> char {
        self.text.chars().next_back().unwrap_or('\0')
    }

    /// Raw parameter text between `[` and the terminator.
    #[must_use]
    pub fn raw_params(&self) -> &'a str {
        let end = self.text.len() - self.terminator().len_utf8();
        &self.text[2..end]
    }

    /// Whether this is Select Graphic Rendition (`m`), the only terminator
    /// that carries colour semantics.
    #[must_use]
    pub fn is_sgr(&self) -> bool {
        self.terminator() == 'm'
    }

    /// Parsed parameters. Empty fields count as 0; `ESC [ m` yields `[0]`.
    ///
    /// Values saturate at `u16::MAX`, which no SGR code uses, so an
    /// overlong digit run is ignored instead of wrapping into a real code.
    #[must_use]
    pub fn params(&self) -> Params {
        parse_params(self.raw_params())
    }
}

/// Split a `;`-separated decimal list into saturating integers.
#[must_use]
pub fn parse_params(raw: &str) -> Params {
    raw.split(';')
        .map(|field| {
            field
                .bytes()
                .filter(u8::is_ascii_digit)
                .fold(0u16, |acc, b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}
