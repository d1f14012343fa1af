#![forbid(unsafe_code)]

//! Output backends for the shellpaint engine.
//!
//! Every backend implements [`shellpaint_core::Renderer`]; the scanner in
//! `shellpaint-core` drives them. Which one an output call uses depends on
//! where the text is going:
//!
//! | Backend              | Destination                     | Escapes                 |
//! |----------------------|---------------------------------|-------------------------|
//! | [`ColorConsole`]     | interactive console             | resolved to attributes  |
//! | [`NoColorConsole`]   | interactive console             | dropped                 |
//! | [`PassthroughConsole`] | console that is a VT emulator | written unchanged       |
//! | [`TextDevice`]       | file or pipe                    | dropped or kept as text |
//! | [`DebuggerSink`]     | debug output channel            | dropped                 |
//! | [`OffscreenGrid`]    | in-memory cell grid             | resolved to attributes  |
//!
//! [`select_renderer`] picks one by probing the destination.

pub mod cell;
pub mod console;
pub mod debugger;
pub mod device;
pub mod grid;
pub mod select;
pub mod text_device;

pub use cell::GridCell;
pub use console::{ColorConsole, NoColorConsole, PassthroughConsole};
pub use debugger::{DEBUG_OUTPUT_TARGET, DebugChannel, DebuggerSink, TracingChannel, WriterChannel};
pub use device::{ConsoleDevice, CrosstermConsole};
pub use grid::{GridCursor, OffscreenGrid};
pub use select::{Destination, OutputStream, build_renderer, select_renderer};
pub use text_device::TextDevice;
