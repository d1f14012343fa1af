//! Text encodings for redirected output and captured input.
//!
//! Rust strings are the native representation; these encodings only matter
//! at the byte boundary of a file or pipe.

use std::fmt;

/// Byte encoding used for a text device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// UTF-8 (code page 65001).
    #[default]
    Utf8,
    /// ISO-8859-1: one byte per character, `?` for anything above U+00FF.
    Latin1,
    /// 7-bit ASCII, `?` for anything above U+007F.
    Ascii,
    /// Little-endian UTF-16, the wide-character form written unconverted.
    Utf16Le,
}

/// Substitute for characters the target encoding cannot represent.
const REPLACEMENT: u8 = b'?';

impl Encoding {
    /// Look an encoding up by a user-facing label or code page number.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" | "65001" => Some(Self::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" | "1252" => Some(Self::Latin1),
            "ascii" | "us-ascii" | "20127" => Some(Self::Ascii),
            "utf-16le" | "utf16le" | "utf-16" | "utf16" | "1200" => Some(Self::Utf16Le),
            _ => None,
        }
    }

    /// Canonical label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "iso-8859-1",
            Self::Ascii => "us-ascii",
            Self::Utf16Le => "utf-16le",
        }
    }

    /// Append the encoded form of `text` to `out`.
    pub fn encode_into(self, text: &str, out: &mut Vec<u8>) {
        match self {
            Self::Utf8 => out.extend_from_slice(text.as_bytes()),
            Self::Latin1 => out.extend(
                text.chars()
                    .map(|c| u8::try_from(u32::from(c)).unwrap_or(REPLACEMENT)),
            ),
            Self::Ascii => out.extend(
                text.chars()
                    .map(|c| if c.is_ascii() { c as u8 } else { REPLACEMENT }),
            ),
            Self::Utf16Le => {
                out.reserve(text.len() * 2);
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
            }
        }
    }

    /// Encode `text` into a fresh buffer.
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len());
        self.encode_into(text, &mut out);
        out
    }

    /// Decode input bytes. Invalid sequences become U+FFFD; a dangling odd
    /// byte in UTF-16 input is dropped.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Self::Ascii => bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        char::from(b)
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect(),
            Self::Utf16Le => {
                let units = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
                char::decode_utf16(units)
                    .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect()
            }
        }
    }

    /// Whether every character of this encoding is a single byte.
    #[must_use]
    pub const fn is_single_byte(self) -> bool {
        matches!(self, Self::Latin1 | Self::Ascii)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_is_passthrough() {
        assert_eq!(Encoding::Utf8.encode("héllo"), "héllo".as_bytes());
        assert_eq!(Encoding::Utf8.decode("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn latin1_replaces_wide_chars() {
        assert_eq!(Encoding::Latin1.encode("é中"), vec![0xE9, b'?']);
        assert_eq!(Encoding::Latin1.decode(&[0x41, 0xE9]), "Aé");
    }

    #[test]
    fn ascii_replaces_everything_high() {
        assert_eq!(Encoding::Ascii.encode("a─b"), b"a?b".to_vec());
        assert_eq!(Encoding::Ascii.decode(&[b'a', 0xC3]), "a\u{FFFD}");
    }

    #[test]
    fn utf16le_writes_code_units() {
        assert_eq!(Encoding::Utf16Le.encode("A€"), vec![0x41, 0x00, 0xAC, 0x20]);
        assert_eq!(Encoding::Utf16Le.decode(&[0x41, 0x00, 0xAC, 0x20, 0x7F]), "A€");
    }

    #[test]
    fn utf16le_surrogate_pairs() {
        let bytes = Encoding::Utf16Le.encode("🎉");
        assert_eq!(bytes.len(), 4);
        assert_eq!(Encoding::Utf16Le.decode(&bytes), "🎉");
    }

    #[test]
    fn labels_resolve() {
        assert_eq!(Encoding::from_label("UTF-8"), Some(Encoding::Utf8));
        assert_eq!(Encoding::from_label(" 1252 "), Some(Encoding::Latin1));
        assert_eq!(Encoding::from_label("us-ascii"), Some(Encoding::Ascii));
        assert_eq!(Encoding::from_label("utf16"), Some(Encoding::Utf16Le));
        assert_eq!(Encoding::from_label("ebcdic"), None);
        assert_eq!(Encoding::Latin1.to_string(), "iso-8859-1");
    }

    #[test]
    fn encode_into_appends() {
        let mut out = b"x".to_vec();
        Encoding::Ascii.encode_into("yz", &mut out);
        assert_eq!(out, b"xyz");
    }
}
