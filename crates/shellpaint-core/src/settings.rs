//! Output configuration.
//!
//! Three pieces of process-level configuration feed the engine:
//!
//! - [`OutputSettings`]: encodings and the line ending for text devices.
//! - [`DestinationCaps`]: what a redirected destination claims to support.
//! - [`OutputFlags`]: which stream an output call targets and how escapes
//!   are treated.
//!
//! # Environment
//!
//! | Variable                      | Meaning                                |
//! |-------------------------------|----------------------------------------|
//! | `SHELLPAINT_OUTPUT_ENCODING`  | encoding label for text devices        |
//! | `SHELLPAINT_INPUT_ENCODING`   | encoding label for captured input      |
//! | `SHELLPAINT_LINE_ENDING`      | `crlf`, `lf`, or `cr`                  |
//! | `SHELLPAINT_TERM`             | `;`-separated `color`, `extendedchars`, `autowrap` |
//!
//! Reading the environment is kept apart from interpreting it so the rules
//! can be tested without touching process state.

use std::env;

use bitflags::bitflags;

use crate::encoding::Encoding;

/// Variable holding the output encoding label.
pub const OUTPUT_ENCODING_VAR: &str = "SHELLPAINT_OUTPUT_ENCODING";
/// Variable holding the input encoding label.
pub const INPUT_ENCODING_VAR: &str = "SHELLPAINT_INPUT_ENCODING";
/// Variable holding the line ending name.
pub const LINE_ENDING_VAR: &str = "SHELLPAINT_LINE_ENDING";
/// Variable holding the capability list for redirected destinations.
pub const TERM_VAR: &str = "SHELLPAINT_TERM";

bitflags! {
    /// Destination and escape handling for one output call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OutputFlags: u8 {
        const STDOUT   = 1 << 0;
        const STDERR   = 1 << 1;
        const DEBUGGER = 1 << 2;
        /// Drop escapes instead of acting on them.
        const STRIP_ESCAPES = 1 << 3;
        /// Hand escapes to the device untouched.
        const PASSTHROUGH_ESCAPES = 1 << 4;
    }
}

/// Encodings and line ending used by byte-oriented devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub output_encoding: Encoding,
    pub input_encoding: Encoding,
    pub line_ending: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            output_encoding: Encoding::Utf8,
            input_encoding: Encoding::Utf8,
            line_ending: "\r\n".to_string(),
        }
    }
}

impl OutputSettings {
    #[must_use]
    pub fn with_output_encoding(mut self, encoding: Encoding) -> Self {
        self.output_encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_input_encoding(mut self, encoding: Encoding) -> Self {
        self.input_encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_line_ending(mut self, line_ending: impl Into<String>) -> Self {
        self.line_ending = line_ending.into();
        self
    }

    /// Defaults overridden by whatever the environment sets.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            env::var(OUTPUT_ENCODING_VAR).ok().as_deref(),
            env::var(INPUT_ENCODING_VAR).ok().as_deref(),
            env::var(LINE_ENDING_VAR).ok().as_deref(),
        )
    }

    /// Defaults overridden by the given raw values. Unrecognised values are
    /// ignored.
    #[must_use]
    pub fn from_values(output: Option<&str>, input: Option<&str>, line_ending: Option<&str>) -> Self {
        let mut settings = Self::default();
        if let Some(enc) = output.and_then(Encoding::from_label) {
            settings.output_encoding = enc;
        }
        if let Some(enc) = input.and_then(Encoding::from_label) {
            settings.input_encoding = enc;
        }
        if let Some(le) = line_ending.and_then(parse_line_ending) {
            settings.line_ending = le.to_string();
        }
        settings
    }
}

fn parse_line_ending(name: &str) -> Option<&'static str> {
    match name.trim().to_ascii_lowercase().as_str() {
        "crlf" | "\r\n" => Some("\r\n"),
        "lf" | "\n" => Some("\n"),
        "cr" | "\r" => Some("\r"),
        _ => None,
    }
}

/// Capabilities a redirected destination claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DestinationCaps {
    /// Escapes survive into the output.
    pub color: bool,
    /// Characters outside ASCII may be written.
    pub extended_chars: bool,
    /// The reader wraps long lines itself.
    pub auto_wrap: bool,
}

impl DestinationCaps {
    /// Everything enabled.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            color: true,
            extended_chars: true,
            auto_wrap: true,
        }
    }

    /// Parse a `;`-separated feature list. Tokens are case-insensitive;
    /// unknown tokens are ignored.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut caps = Self::default();
        for token in value.split(';').map(str::trim) {
            if token.eq_ignore_ascii_case("color") || token.eq_ignore_ascii_case("colour") {
                caps.color = true;
            } else if token.eq_ignore_ascii_case("extendedchars") {
                caps.extended_chars = true;
            } else if token.eq_ignore_ascii_case("autowrap") {
                caps.auto_wrap = true;
            }
        }
        caps
    }

    /// Read [`TERM_VAR`]; nothing claimed when it is unset.
    #[must_use]
    pub fn from_env() -> Self {
        env::var(TERM_VAR)
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}
