//! Error type shared by the scanner and every output backend.

use std::fmt;
use std::io;

/// Errors raised while rendering a buffer.
#[derive(Debug)]
pub enum RenderError {
    /// The underlying device rejected a write (closed pipe, access denied).
    Io(io::Error),
    /// A one-shot buffer ended inside an escape sequence before anything
    /// else had been emitted.
    TruncatedEscape {
        /// Byte offset of the ESC that starts the incomplete sequence.
        offset: usize,
    },
    /// The offscreen grid ran out of rows.
    GridFull {
        /// Row cap the grid was created with.
        rows: u16,
    },
    /// An offscreen grid was requested with unusable dimensions.
    InvalidGridSize {
        /// Requested column count.
        columns: u16,
        /// Requested row cap.
        rows: u16,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "device write failed: {err}"),
            Self::TruncatedEscape { offset } => {
                write!(f, "incomplete escape sequence at byte {offset}")
            }
            Self::GridFull { rows } => write!(f, "offscreen grid is full ({rows} rows)"),
            Self::InvalidGridSize { columns, rows } => {
                write!(f, "invalid offscreen grid size {columns}x{rows}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for RenderError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, RenderError>;
