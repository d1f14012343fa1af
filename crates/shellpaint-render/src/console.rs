//! Console backends.
//!
//! Three renderers share one device and differ only in what they do with
//! an escape: resolve it into an attribute change, drop it, or write it
//! unchanged for a device that is itself a VT emulator.

use shellpaint_core::sgr::resolve;
use shellpaint_core::{Attribute, EscapeSequence, Renderer, ResetAttribute, Result};
use tracing::trace;

use crate::device::ConsoleDevice;

/// Console renderer that turns SGR escapes into device attribute changes.
#[derive(Debug)]
pub struct ColorConsole<D> {
    device: D,
    /// Attribute this call last applied. `None` until the first escape of
    /// the call; reset by `begin_stream`.
    cached: Option<Attribute>,
}

impl<D: ConsoleDevice> ColorConsole<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            cached: None,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_inner(self) -> D {
        self.device
    }

    /// Work out the attribute an SGR sequence produces, touching the device
    /// only when the answer depends on its current state.
    ///
    /// An unset reset attribute is seeded from the device before this
    /// console changes anything, so SGR 0 returns to the unstyled state.
    fn attribute_for(&mut self, params: &[u16], reset: &mut ResetAttribute) -> Result<Attribute> {
        if !reset.is_set() {
            let device = &mut self.device;
            let seeded = reset.get_or_seed(|| Ok(device.current_attribute()?))?;
            self.cached.get_or_insert(seeded);
        }
        let reset_value = reset.get_or(Attribute::DEFAULT);

        if let Some(current) = self.cached {
            return Ok(resolve(current, params, reset_value).attribute);
        }
        let speculative = resolve(Attribute::DEFAULT, params, reset_value);
        if speculative.is_self_contained() {
            trace!("escape resolved without querying device");
            return Ok(speculative.attribute);
        }

        let current = self.device.current_attribute()?;
        Ok(resolve(current, params, reset_value).attribute)
    }
}

impl<D: ConsoleDevice> Renderer for ColorConsole<D> {
    fn begin_stream(&mut self, _reset: &mut ResetAttribute) -> Result<()> {
        self.cached = None;
        Ok(())
    }

    fn end_stream(&mut self, _reset: &mut ResetAttribute) -> Result<()> {
        self.cached = None;
        self.device.flush()?;
        Ok(())
    }

    fn emit_text(&mut self, text: &str, _reset: &mut ResetAttribute) -> Result<()> {
        self.device.write_text(text)?;
        Ok(())
    }

    fn emit_escape(&mut self, seq: &EscapeSequence<'_>, reset: &mut ResetAttribute) -> Result<()> {
        if !seq.is_sgr() {
            return Ok(());
        }
        let attr = self.attribute_for(&seq.params(), reset)?;
        self.device.set_attribute(attr)?;
        self.cached = Some(attr);
        Ok(())
    }
}

/// Console renderer that drops every escape.
#[derive(Debug)]
pub struct NoColorConsole<D> {
    device: D,
}

impl<D: ConsoleDevice> NoColorConsole<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn into_inner(self) -> D {
        self.device
    }
}

impl<D: ConsoleDevice> Renderer for NoColorConsole<D> {
    fn begin_stream(&mut self, _reset: &mut ResetAttribute) -> Result<()> {
        Ok(())
    }

    fn end_stream(&mut self, _reset: &mut ResetAttribute) -> Result<()> {
        self.device.flush()?;
        Ok(())
    }

    fn emit_text(&mut self, text: &str, _reset: &mut ResetAttribute) -> Result<()> {
        self.device.write_text(text)?;
        Ok(())
    }

    fn emit_escape(&mut self, _seq: &EscapeSequence<'_>, _reset: &mut ResetAttribute) -> Result<()> {
        Ok(())
    }
}

/// Console renderer that writes escapes to the device as ordinary text.
#[derive(Debug)]
pub struct PassthroughConsole<D> {
    device: D,
}

impl<D: ConsoleDevice> PassthroughConsole<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn into_inner(self) -> D {
        self.device
    }
}

impl<D: ConsoleDevice> Renderer for PassthroughConsole<D> {
    fn begin_stream(&mut self, _reset: &mut ResetAttribute) -> Result<()> {
        Ok(())
    }

    fn end_stream(&mut self, _reset: &mut ResetAttribute) -> Result<()> {
        self.device.flush()?;
        Ok(())
    }

    fn emit_text(&mut self, text: &str, _reset: &mut ResetAttribute) -> Result<()> {
        self.device.write_text(text)?;
        Ok(())
    }

    fn emit_escape(&mut self, seq: &EscapeSequence<'_>, _reset: &mut ResetAttribute) -> Result<()> {
        self.device.write_text(seq.as_str())?;
        Ok(())
    }
}
