//! Live console device abstraction.
//!
//! Backends that target an interactive console talk to a [`ConsoleDevice`]
//! instead of a raw writer, because they need more than bytes: the
//! device's current attribute, a way to change it, and positioned cell
//! writes for blitting an offscreen grid.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{
    Attribute as StyleAttribute, Color, Print, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use shellpaint_core::Attribute;
use shellpaint_core::sgr::native_to_ansi;

use crate::cell::GridCell;

/// An interactive, attribute-capable console.
pub trait ConsoleDevice {
    /// Write text at the cursor with the current attribute.
    fn write_text(&mut self, text: &str) -> io::Result<()>;

    /// The attribute the device will apply to the next write.
    fn current_attribute(&mut self) -> io::Result<Attribute>;

    /// Change the attribute applied to subsequent writes.
    fn set_attribute(&mut self, attr: Attribute) -> io::Result<()>;

    /// Write a row of cells starting at `(column, row)`, each with its own
    /// attribute. The current attribute is unchanged afterwards.
    fn write_cells(&mut self, column: u16, row: u16, cells: &[GridCell]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

impl<D: ConsoleDevice + ?Sized> ConsoleDevice for &mut D {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        (**self).write_text(text)
    }

    fn current_attribute(&mut self) -> io::Result<Attribute> {
        (**self).current_attribute()
    }

    fn set_attribute(&mut self, attr: Attribute) -> io::Result<()> {
        (**self).set_attribute(attr)
    }

    fn write_cells(&mut self, column: u16, row: u16, cells: &[GridCell]) -> io::Result<()> {
        (**self).write_cells(column, row, cells)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Map one attribute nibble to a 16-colour palette entry.
fn palette_color(nibble: u8) -> Color {
    let bright = if nibble & 0x08 != 0 { 8 } else { 0 };
    Color::AnsiValue(native_to_ansi(nibble) + bright)
}

/// [`ConsoleDevice`] over any writer connected to a terminal, driven with
/// crossterm commands.
///
/// Terminals cannot report their colours, so the device keeps a shadow of
/// the last attribute it applied, starting from the value it was created
/// with.
#[derive(Debug)]
pub struct CrosstermConsole<W: Write> {
    writer: W,
    shadow: Attribute,
}

impl<W: Write> CrosstermConsole<W> {
    /// Create a device whose shadow attribute starts at `initial`.
    pub fn new(writer: W, initial: Attribute) -> Self {
        Self {
            writer,
            shadow: initial,
        }
    }

    #[inline]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn apply(&mut self, attr: Attribute) -> io::Result<()> {
        queue!(
            self.writer,
            SetAttribute(StyleAttribute::Reset),
            SetForegroundColor(palette_color(attr.foreground())),
            SetBackgroundColor(palette_color(attr.background()))
        )?;
        if attr.is_underlined() {
            queue!(self.writer, SetAttribute(StyleAttribute::Underlined))?;
        }
        Ok(())
    }
}

impl<W: Write> ConsoleDevice for CrosstermConsole<W> {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        queue!(self.writer, Print(text))
    }

    fn current_attribute(&mut self) -> io::Result<Attribute> {
        Ok(self.shadow)
    }

    fn set_attribute(&mut self, attr: Attribute) -> io::Result<()> {
        if attr != self.shadow {
            self.apply(attr)?;
            self.shadow = attr;
        }
        Ok(())
    }

    fn write_cells(&mut self, column: u16, row: u16, cells: &[GridCell]) -> io::Result<()> {
        queue!(self.writer, MoveTo(column, row))?;
        let mut current = None;
        for cell in cells {
            if current != Some(cell.attr) {
                self.apply(cell.attr)?;
                current = Some(cell.attr);
            }
            queue!(self.writer, Print(cell.ch))?;
        }
        if current.is_some_and(|attr| attr != self.shadow) {
            self.apply(self.shadow)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
