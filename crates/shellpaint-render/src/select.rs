//! Backend selection for an output call.
//!
//! [`OutputFlags`] name the target stream and the escape policy; the target
//! is then probed to decide whether it is an interactive console or a
//! redirected file/pipe.
//!
//! | Destination  | Flags                   | Backend                |
//! |--------------|-------------------------|------------------------|
//! | console      | `STRIP_ESCAPES`         | [`NoColorConsole`]     |
//! | console      | `PASSTHROUGH_ESCAPES`   | [`PassthroughConsole`] |
//! | console      | neither                 | [`ColorConsole`]       |
//! | redirected   | any                     | [`TextDevice`]         |
//! | debugger     | any                     | [`DebuggerSink`]       |

use std::io::{self, IsTerminal, Write};

use shellpaint_core::{Attribute, DestinationCaps, OutputFlags, OutputSettings, Renderer};
use tracing::debug;

use crate::console::{ColorConsole, NoColorConsole, PassthroughConsole};
use crate::debugger::{DebuggerSink, TracingChannel};
use crate::device::CrosstermConsole;
use crate::text_device::TextDevice;

/// Kind of destination an output call writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Console,
    Redirected,
    Debugger,
}

impl Destination {
    /// Classify the destination named by `flags`. `DEBUGGER` wins over the
    /// stream flags; otherwise the stream is probed for a terminal.
    #[must_use]
    pub fn probe(flags: OutputFlags) -> Self {
        if flags.contains(OutputFlags::DEBUGGER) {
            return Self::Debugger;
        }
        if OutputStream::from_flags(flags).is_terminal() {
            Self::Console
        } else {
            Self::Redirected
        }
    }
}

/// Standard stream named by [`OutputFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    /// `STDERR` selects stderr; anything else is stdout.
    #[must_use]
    pub fn from_flags(flags: OutputFlags) -> Self {
        if flags.contains(OutputFlags::STDERR) {
            Self::Stderr
        } else {
            Self::Stdout
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        match self {
            Self::Stdout => io::stdout().is_terminal(),
            Self::Stderr => io::stderr().is_terminal(),
        }
    }
}

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout => io::stdout().write(buf),
            Self::Stderr => io::stderr().write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Self::Stdout => io::stdout().lock().write_all(buf),
            Self::Stderr => io::stderr().lock().write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout => io::stdout().flush(),
            Self::Stderr => io::stderr().flush(),
        }
    }
}

/// Build the backend for a known destination over `writer`.
///
/// For a redirected destination escapes survive only when not stripped
/// and either passthrough is requested or the destination claims colour.
pub fn build_renderer<'a, W>(
    destination: Destination,
    flags: OutputFlags,
    caps: DestinationCaps,
    settings: &OutputSettings,
    writer: W,
) -> Box<dyn Renderer + 'a>
where
    W: Write + 'a,
{
    let strip = flags.contains(OutputFlags::STRIP_ESCAPES);
    let passthrough = flags.contains(OutputFlags::PASSTHROUGH_ESCAPES);
    match destination {
        Destination::Console => {
            let device = CrosstermConsole::new(writer, Attribute::DEFAULT);
            if strip {
                debug!(backend = "no-color-console", "renderer selected");
                Box::new(NoColorConsole::new(device))
            } else if passthrough {
                debug!(backend = "passthrough-console", "renderer selected");
                Box::new(PassthroughConsole::new(device))
            } else {
                debug!(backend = "color-console", "renderer selected");
                Box::new(ColorConsole::new(device))
            }
        }
        Destination::Redirected => {
            let keep = !strip && (passthrough || caps.color);
            debug!(backend = "text-device", keep_escapes = keep, encoding = %settings.output_encoding, "renderer selected");
            Box::new(TextDevice::for_destination(writer, settings, caps).keep_escapes(keep))
        }
        Destination::Debugger => {
            debug!(backend = "debugger", "renderer selected");
            Box::new(DebuggerSink::new(TracingChannel))
        }
    }
}

/// Probe the destination named by `flags` and build its backend over the
/// matching standard stream.
pub fn select_renderer(
    flags: OutputFlags,
    caps: DestinationCaps,
    settings: &OutputSettings,
) -> Box<dyn Renderer> {
    let destination = Destination::probe(flags);
    let stream = OutputStream::from_flags(flags);
    debug!(?destination, ?stream, ?flags, "probing output destination");
    build_renderer(destination, flags, caps, settings, stream)
}
