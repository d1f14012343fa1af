#![forbid(unsafe_code)]

//! Host-agnostic core of the shell output engine.
//!
//! `shellpaint-core` owns everything about shell output that does not touch
//! a device: the console attribute model, SGR colour resolution, the escape
//! scanner that splits text into literal runs and escape units, and the
//! encoding and line-ending rules used by redirected output.
//!
//! # Primary responsibilities
//!
//! - **Attribute**: 16-bit console attribute (fg/bg nibbles + underline).
//! - **Resolver**: applies an SGR parameter list to a starting attribute.
//! - **Scanner**: one forward pass over a buffer, dispatching to a [`Renderer`].
//! - **Encoding**: native text to UTF-8, single-byte, or wide output bytes.
//! - **Settings**: output encoding, line ending, and destination capabilities.
//!
//! # Design principles
//!
//! - **No device I/O**: backends live in `shellpaint-render`; this crate only decides.
//! - **No globals**: the reset attribute is a value owned by the caller.
//! - **`#![forbid(unsafe_code)]`**: safety enforced at compile time.

pub mod attribute;
pub mod encoding;
pub mod error;
pub mod escape;
pub mod line_ending;
pub mod scanner;
pub mod settings;
pub mod sgr;

pub use attribute::{Attribute, InheritMask, ResetAttribute};
pub use encoding::Encoding;
pub use error::{RenderError, Result};
pub use escape::{ESC, EscapeSequence};
pub use line_ending::{LineSegment, LineSegments, normalize_line_endings};
pub use scanner::{Renderer, ScanMode, ScanOutcome, StreamScanner, render, scan};
pub use settings::{DestinationCaps, OutputFlags, OutputSettings};
pub use sgr::{Resolved, resolve, resolve_sequence};
