//! Byte-oriented text device backend (files and pipes).
//!
//! Runs are split on CR, LF, and CRLF; each separator becomes the configured
//! line ending and everything else goes through the output encoding.
//! Escapes are either dropped or kept as literal bytes.
//!
//! A CR that ends a run is held until the next run of the same output call,
//! so a CRLF split by an escape still counts as one line break. A CR held at
//! the end of the call is written as a break of its own.

use std::io::Write;

use shellpaint_core::{
    DestinationCaps, Encoding, EscapeSequence, LineSegment, LineSegments, OutputSettings, Renderer,
    ResetAttribute, Result,
};

/// Renderer for a redirected destination.
#[derive(Debug)]
pub struct TextDevice<W: Write> {
    writer: W,
    encoding: Encoding,
    line_ending: String,
    keep_escapes: bool,
    /// The previous run ended in CR.
    pending_cr: bool,
    /// Conversion buffer, cleared after every write.
    scratch: Vec<u8>,
}

impl<W: Write> TextDevice<W> {
    /// Text device using `settings`, dropping escapes.
    pub fn new(writer: W, settings: &OutputSettings) -> Self {
        Self {
            writer,
            encoding: settings.output_encoding,
            line_ending: settings.line_ending.clone(),
            keep_escapes: false,
            pending_cr: false,
            scratch: Vec::new(),
        }
    }

    /// Text device configured from what the destination claims to support:
    /// escapes survive only with `color`, and without `extended_chars`
    /// everything above ASCII is downgraded.
    pub fn for_destination(writer: W, settings: &OutputSettings, caps: DestinationCaps) -> Self {
        let mut device = Self::new(writer, settings).keep_escapes(caps.color);
        if !caps.extended_chars && device.encoding != Encoding::Utf16Le {
            device.encoding = Encoding::Ascii;
        }
        device
    }

    /// Write escapes as literal text instead of dropping them.
    #[must_use]
    pub fn keep_escapes(mut self, keep: bool) -> Self {
        self.keep_escapes = keep;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn keeps_escapes(&self) -> bool {
        self.keep_escapes
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_scratch(&mut self) -> Result<()> {
        let result = self.writer.write_all(&self.scratch);
        self.scratch.clear();
        result?;
        Ok(())
    }
}

impl<W: Write> Renderer for TextDevice<W> {
    fn begin_stream(&mut self, _reset: &mut ResetAttribute) -> Result<()> {
        self.pending_cr = false;
        Ok(())
    }

    fn end_stream(&mut self, _reset: &mut ResetAttribute) -> Result<()> {
        if std::mem::take(&mut self.pending_cr) {
            self.encoding.encode_into(&self.line_ending, &mut self.scratch);
            self.write_scratch()?;
        }
        self.scratch = Vec::new();
        self.writer.flush()?;
        Ok(())
    }

    fn emit_text(&mut self, mut text: &str, _reset: &mut ResetAttribute) -> Result<()> {
        if std::mem::take(&mut self.pending_cr) {
            self.encoding.encode_into(&self.line_ending, &mut self.scratch);
            text = text.strip_prefix('\n').unwrap_or(text);
        }
        if let Some(head) = text.strip_suffix('\r') {
            self.pending_cr = true;
            text = head;
        }
        for segment in LineSegments::new(text) {
            match segment {
                LineSegment::Text(t) => self.encoding.encode_into(t, &mut self.scratch),
                LineSegment::Break => self.encoding.encode_into(&self.line_ending, &mut self.scratch),
            }
        }
        self.write_scratch()
    }

    fn emit_escape(&mut self, seq: &EscapeSequence<'_>, _reset: &mut ResetAttribute) -> Result<()> {
        if !self.keep_escapes {
            return Ok(());
        }
        self.encoding.encode_into(seq.as_str(), &mut self.scratch);
        self.write_scratch()
    }
}
