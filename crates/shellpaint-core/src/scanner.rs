//! Escape scanner.
//!
//! One forward pass over a buffer that splits it into literal runs and
//! complete escape units and hands each one to a [`Renderer`]. Every byte
//! of the consumed prefix is delivered exactly once. The scanner itself
//! never writes anywhere; all side effects belong to the renderer.
//!
//! # Truncated escapes
//!
//! A buffer can end between `ESC [` and the terminator. What happens then
//! depends on [`ScanMode`]:
//!
//! | Mode        | Nothing emitted yet          | Something emitted         |
//! |-------------|------------------------------|---------------------------|
//! | `Streaming` | stop, tail left unconsumed   | same                      |
//! | `OneShot`   | `RenderError::TruncatedEscape` | tail dropped, reported in [`ScanOutcome::dropped`] |

use memchr::memchr;
use tracing::{trace, warn};

use crate::attribute::ResetAttribute;
use crate::error::{RenderError, Result};
use crate::escape::{ESC, EscapeSequence};

/// The four-operation contract every output backend implements.
///
/// Per-call render state lives inside the backend and is rebuilt by
/// [`begin_stream`](Renderer::begin_stream), so nothing survives from one
/// output call to the next except what the caller keeps in
/// [`ResetAttribute`].
pub trait Renderer {
    /// Start of one output call.
    fn begin_stream(&mut self, reset: &mut ResetAttribute) -> Result<()>;

    /// End of one output call. Also called after a failed scan so
    /// backends can release per-call state.
    fn end_stream(&mut self, reset: &mut ResetAttribute) -> Result<()>;

    /// A run of literal text containing no escape units.
    fn emit_text(&mut self, text: &str, reset: &mut ResetAttribute) -> Result<()>;

    /// One complete escape sequence.
    fn emit_escape(&mut self, seq: &EscapeSequence<'_>, reset: &mut ResetAttribute) -> Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn begin_stream(&mut self, reset: &mut ResetAttribute) -> Result<()> {
        (**self).begin_stream(reset)
    }

    fn end_stream(&mut self, reset: &mut ResetAttribute) -> Result<()> {
        (**self).end_stream(reset)
    }

    fn emit_text(&mut self, text: &str, reset: &mut ResetAttribute) -> Result<()> {
        (**self).emit_text(text, reset)
    }

    fn emit_escape(&mut self, seq: &EscapeSequence<'_>, reset: &mut ResetAttribute) -> Result<()> {
        (**self).emit_escape(seq, reset)
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn begin_stream(&mut self, reset: &mut ResetAttribute) -> Result<()> {
        (**self).begin_stream(reset)
    }

    fn end_stream(&mut self, reset: &mut ResetAttribute) -> Result<()> {
        (**self).end_stream(reset)
    }

    fn emit_text(&mut self, text: &str, reset: &mut ResetAttribute) -> Result<()> {
        (**self).emit_text(text, reset)
    }

    fn emit_escape(&mut self, seq: &EscapeSequence<'_>, reset: &mut ResetAttribute) -> Result<()> {
        (**self).emit_escape(seq, reset)
    }
}

/// How to treat a buffer that ends inside an escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// The whole content is known.
    #[default]
    OneShot,
    /// More data may follow (live child process output).
    Streaming,
}

/// Result of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanOutcome {
    /// Bytes delivered to the renderer.
    pub consumed: usize,
    /// Bytes of a truncated trailing escape discarded in one-shot mode.
    pub dropped: usize,
}

impl ScanOutcome {
    /// Bytes the caller must keep and prepend to the next chunk.
    #[must_use]
    pub fn pending(&self, len: usize) -> usize {
        len - self.consumed - self.dropped
    }
}

/// Scan `text`, dispatching text runs and escapes to `renderer`.
///
/// Does not call `begin_stream`/`end_stream`; see [`render`] for a complete
/// output call. Any renderer failure aborts immediately.
pub fn scan<R>(text: &str, renderer: &mut R, reset: &mut ResetAttribute, mode: ScanMode) -> Result<ScanOutcome>
where
    R: Renderer + ?Sized,
{
    let _span = tracing::trace_span!("scan", len = text.len(), ?mode).entered();

    let bytes = text.as_bytes();
    let mut pos = 0;
    let mut emitted = false;

    while pos < bytes.len() {
        let Some(rel) = memchr(ESC, &bytes[pos..]) else {
            renderer.emit_text(&text[pos..], reset)?;
            pos = bytes.len();
            break;
        };

        if rel > 0 {
            renderer.emit_text(&text[pos..pos + rel], reset)?;
            emitted = true;
            pos += rel;
        }

        // `pos` is at an ESC.
        let rest = &text[pos..];
        if let Some(seq) = EscapeSequence::parse(rest) {
            trace!(seq = ?seq.as_str(), "escape");
            renderer.emit_escape(&seq, reset)?;
            emitted = true;
            pos += seq.len();
            continue;
        }

        let opens_csi = rest.len() >= 2 && rest.as_bytes()[1] == b'[';
        let may_open_csi = rest.len() == 1 && mode == ScanMode::Streaming;
        if !opens_csi && !may_open_csi {
            renderer.emit_text(&rest[..1], reset)?;
            emitted = true;
            pos += 1;
            continue;
        }

        // Ran off the end inside (or possibly at the start of) a sequence.
        match mode {
            ScanMode::Streaming => {
                return Ok(ScanOutcome {
                    consumed: pos,
                    dropped: 0,
                });
            }
            ScanMode::OneShot => {
                if !emitted {
                    return Err(RenderError::TruncatedEscape { offset: pos });
                }
                warn!(
                    offset = pos,
                    dropped = rest.len(),
                    "dropping truncated escape at end of output"
                );
                return Ok(ScanOutcome {
                    consumed: pos,
                    dropped: rest.len(),
                });
            }
        }
    }

    Ok(ScanOutcome {
        consumed: pos,
        dropped: 0,
    })
}

/// One complete output call: begin, scan, end.
///
/// `end_stream` runs even when the scan fails; the scan error wins.
pub fn render<R>(renderer: &mut R, reset: &mut ResetAttribute, text: &str, mode: ScanMode) -> Result<ScanOutcome>
where
    R: Renderer + ?Sized,
{
    renderer.begin_stream(reset)?;
    let scanned = scan(text, renderer, reset, mode);
    let ended = renderer.end_stream(reset);
    let outcome = scanned?;
    ended?;
    Ok(outcome)
}

/// Streaming front end that keeps an incomplete trailing escape between
/// chunks.
///
/// The stream as a whole follows the one-shot truncation rule: a tail still
/// held at [`finish`](StreamScanner::finish) fails the call only if no
/// earlier chunk delivered anything.
#[derive(Debug, Default)]
pub struct StreamScanner {
    pending: String,
    /// Some chunk of this stream already reached the renderer.
    emitted: bool,
}

impl StreamScanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes held back from earlier chunks.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Scan one chunk of live output.
    ///
    /// Returns the number of bytes delivered to the renderer in this call,
    /// counting held-back bytes from earlier chunks.
    pub fn feed<R>(&mut self, chunk: &str, renderer: &mut R, reset: &mut ResetAttribute) -> Result<usize>
    where
        R: Renderer + ?Sized,
    {
        if self.pending.is_empty() {
            let outcome = render(renderer, reset, chunk, ScanMode::Streaming)?;
            self.emitted |= outcome.consumed > 0;
            self.pending.push_str(&chunk[outcome.consumed..]);
            return Ok(outcome.consumed);
        }

        let mut joined = std::mem::take(&mut self.pending);
        joined.push_str(chunk);
        let outcome = render(renderer, reset, &joined, ScanMode::Streaming)?;
        self.emitted |= outcome.consumed > 0;
        joined.drain(..outcome.consumed);
        self.pending = joined;
        Ok(outcome.consumed)
    }

    /// Flush whatever is held back as one-shot input; the stream has ended.
    ///
    /// Leaves the scanner ready for a new stream.
    pub fn finish<R>(&mut self, renderer: &mut R, reset: &mut ResetAttribute) -> Result<ScanOutcome>
    where
        R: Renderer + ?Sized,
    {
        let emitted = std::mem::take(&mut self.emitted);
        let tail = std::mem::take(&mut self.pending);
        if tail.is_empty() {
            return Ok(ScanOutcome::default());
        }
        match render(renderer, reset, &tail, ScanMode::OneShot) {
            Err(RenderError::TruncatedEscape { offset }) if emitted => {
                warn!(
                    offset,
                    dropped = tail.len(),
                    "dropping truncated escape at end of stream"
                );
                Ok(ScanOutcome {
                    consumed: 0,
                    dropped: tail.len(),
                })
            }
            other => other,
        }
    }
}
