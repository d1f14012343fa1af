//! Offscreen grid: rasterizes shell output into character/attribute cells.
//!
//! The grid is a renderer in its own right. Text lands in cells at the
//! cursor, SGR escapes change the attribute used for later cells, and the
//! finished grid can be copied onto a live console with [`OffscreenGrid::blit`].
//!
//! # Rows
//!
//! Rows are allocated as the cursor reaches them, up to the cap given at
//! construction. Advancing past the cap fails with
//! [`RenderError::GridFull`] rather than truncating.
//!
//! # Invariants
//!
//! - `cursor.column <= columns` (equal means "end of row").
//! - `cursor.row < rows()`.

use shellpaint_core::sgr::resolve_sequence;
use shellpaint_core::{Attribute, EscapeSequence, RenderError, Renderer, ResetAttribute, Result};
use tracing::{debug, trace};

use crate::cell::GridCell;
use crate::device::ConsoleDevice;

/// Cursor position inside an [`OffscreenGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridCursor {
    pub column: u16,
    pub row: u16,
}

/// Growable cell grid with a fixed width and a row cap.
#[derive(Debug, Clone)]
pub struct OffscreenGrid {
    /// Row-major, `columns * rows()` cells.
    cells: Vec<GridCell>,
    columns: u16,
    max_rows: u16,
    wrap: bool,
    /// Attribute new rows are filled with and the reset fallback.
    base: Attribute,
    /// Attribute applied to the next character.
    attr: Attribute,
    cursor: GridCursor,
}

impl OffscreenGrid {
    /// Create a grid `columns` wide with `initial_rows` rows allocated up
    /// front (at least one) and room to grow to `max_rows`.
    ///
    /// Fails with [`RenderError::InvalidGridSize`] when either dimension is
    /// zero or `initial_rows` exceeds `max_rows`.
    pub fn new(columns: u16, initial_rows: u16, max_rows: u16, wrap: bool, attr: Attribute) -> Result<Self> {
        if columns == 0 || max_rows == 0 || initial_rows > max_rows {
            return Err(RenderError::InvalidGridSize {
                columns,
                rows: max_rows,
            });
        }
        let rows = initial_rows.max(1);
        Ok(Self {
            cells: vec![GridCell::blank(attr); usize::from(columns) * usize::from(rows)],
            columns,
            max_rows,
            wrap,
            base: attr,
            attr,
            cursor: GridCursor::default(),
        })
    }

    #[inline]
    pub fn columns(&self) -> u16 {
        self.columns
    }

    /// Rows allocated so far.
    #[inline]
    pub fn rows(&self) -> u16 {
        // Never exceeds `max_rows`, which is a u16.
        u16::try_from(self.cells.len() / usize::from(self.columns)).unwrap_or(self.max_rows)
    }

    #[inline]
    pub fn max_rows(&self) -> u16 {
        self.max_rows
    }

    #[inline]
    pub fn wraps(&self) -> bool {
        self.wrap
    }

    #[inline]
    pub fn cursor(&self) -> GridCursor {
        self.cursor
    }

    /// Attribute the next character will be written with.
    #[inline]
    pub fn attribute(&self) -> Attribute {
        self.attr
    }

    /// Cell at `(column, row)`, or `None` outside the allocated area.
    pub fn cell(&self, column: u16, row: u16) -> Option<&GridCell> {
        if column < self.columns && row < self.rows() {
            self.cells.get(self.index(column, row))
        } else {
            None
        }
    }

    /// All cells of one allocated row.
    pub fn row(&self, row: u16) -> Option<&[GridCell]> {
        if row >= self.rows() {
            return None;
        }
        let start = self.index(0, row);
        self.cells.get(start..start + usize::from(self.columns))
    }

    /// Grid contents as text: one line per allocated row, trailing spaces
    /// trimmed.
    pub fn to_plain_text(&self) -> String {
        self.cells
            .chunks(usize::from(self.columns))
            .map(|row| {
                let line: String = row.iter().map(|c| c.ch).collect();
                line.trim_end_matches(' ').to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Copy every allocated row onto `device` with the top-left cell at
    /// `(origin_column, origin_row)`. Rows that would land past the device
    /// coordinate range are skipped.
    pub fn blit<D: ConsoleDevice + ?Sized>(&self, device: &mut D, origin_column: u16, origin_row: u16) -> Result<()> {
        let _span = tracing::debug_span!("blit", origin_column, origin_row, rows = self.rows()).entered();
        for (offset, row) in self.cells.chunks(usize::from(self.columns)).enumerate() {
            let Some(target) = u16::try_from(offset).ok().and_then(|o| origin_row.checked_add(o)) else {
                break;
            };
            device.write_cells(origin_column, target, row)?;
        }
        device.flush()?;
        Ok(())
    }

    #[inline]
    fn index(&self, column: u16, row: u16) -> usize {
        usize::from(row) * usize::from(self.columns) + usize::from(column)
    }

    /// Pad the rest of the current row with blanks in the current attribute
    /// and move to the start of the next row, allocating it if needed.
    fn advance_row(&mut self) -> Result<()> {
        let start = self.index(self.cursor.column, self.cursor.row);
        let end = self.index(0, self.cursor.row) + usize::from(self.columns);
        let fill = GridCell::blank(self.attr);
        self.cells[start..end].fill(fill);

        let next = self.cursor.row + 1;
        if next >= self.max_rows {
            debug!(max_rows = self.max_rows, "offscreen grid full");
            return Err(RenderError::GridFull { rows: self.max_rows });
        }
        if next >= self.rows() {
            trace!(row = next, "grid row allocated");
            let len = self.cells.len() + usize::from(self.columns);
            self.cells.resize(len, GridCell::blank(self.base));
        }
        self.cursor = GridCursor { column: 0, row: next };
        Ok(())
    }

    fn put(&mut self, ch: char) -> Result<()> {
        if self.cursor.column == self.columns {
            if !self.wrap {
                return Ok(());
            }
            self.advance_row()?;
        }
        let idx = self.index(self.cursor.column, self.cursor.row);
        self.cells[idx] = GridCell::new(ch, self.attr);
        self.cursor.column += 1;
        Ok(())
    }
}

impl Renderer for OffscreenGrid {
    fn begin_stream(&mut self, _reset: &mut ResetAttribute) -> Result<()> {
        Ok(())
    }

    fn end_stream(&mut self, _reset: &mut ResetAttribute) -> Result<()> {
        Ok(())
    }

    fn emit_text(&mut self, text: &str, _reset: &mut ResetAttribute) -> Result<()> {
        for ch in text.chars() {
            match ch {
                '\r' => {}
                '\n' => self.advance_row()?,
                _ => self.put(ch)?,
            }
        }
        Ok(())
    }

    fn emit_escape(&mut self, seq: &EscapeSequence<'_>, reset: &mut ResetAttribute) -> Result<()> {
        self.attr = resolve_sequence(self.attr, seq, reset.get_or(self.base)).attribute;
        Ok(())
    }
}
