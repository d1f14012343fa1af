//! Debugger output backend.
//!
//! Text runs are normalised to LF-only line endings and forwarded whole to
//! a [`DebugChannel`]. Escapes are always ignored. Short runs are staged on
//! the stack; anything longer spills to the heap.

use std::io::{self, Write};

use shellpaint_core::{EscapeSequence, LineSegment, LineSegments, Renderer, ResetAttribute, Result};
use smallvec::SmallVec;

/// `tracing` target used by [`TracingChannel`].
pub const DEBUG_OUTPUT_TARGET: &str = "shellpaint::debug_output";

/// Inline capacity of the staging buffer.
const INLINE_RUN: usize = 256;

/// Where debugger output ends up.
pub trait DebugChannel {
    fn output(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<C: DebugChannel + ?Sized> DebugChannel for &mut C {
    fn output(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).output(bytes)
    }
}

/// Channel that emits each run as a `debug` event on
/// [`DEBUG_OUTPUT_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingChannel;

impl DebugChannel for TracingChannel {
    fn output(&mut self, bytes: &[u8]) -> io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        tracing::debug!(target: DEBUG_OUTPUT_TARGET, output = %text);
        Ok(())
    }
}

/// Channel over any writer, e.g. a log file.
#[derive(Debug)]
pub struct WriterChannel<W: Write>(pub W);

impl<W: Write> DebugChannel for WriterChannel<W> {
    fn output(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.0.write_all(bytes)?;
        self.0.flush()
    }
}

/// Renderer feeding a [`DebugChannel`].
#[derive(Debug, Default)]
pub struct DebuggerSink<C> {
    channel: C,
}

impl<C: DebugChannel> DebuggerSink<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn into_inner(self) -> C {
        self.channel
    }
}

impl<C: DebugChannel> Renderer for DebuggerSink<C> {
    fn begin_stream(&mut self, _reset: &mut ResetAttribute) -> Result<()> {
        Ok(())
    }

    fn end_stream(&mut self, _reset: &mut ResetAttribute) -> Result<()> {
        Ok(())
    }

    fn emit_text(&mut self, text: &str, _reset: &mut ResetAttribute) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let mut staged: SmallVec<[u8; INLINE_RUN]> = SmallVec::with_capacity(text.len());
        for segment in LineSegments::new(text) {
            match segment {
                LineSegment::Text(t) => staged.extend_from_slice(t.as_bytes()),
                LineSegment::Break => staged.push(b'\n'),
            }
        }
        self.channel.output(&staged)?;
        Ok(())
    }

    fn emit_escape(&mut self, _seq: &EscapeSequence<'_>, _reset: &mut ResetAttribute) -> Result<()> {
        Ok(())
    }
}
