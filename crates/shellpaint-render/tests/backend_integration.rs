//! End-to-end behaviour of the output backends driven through the scanner.

use std::io;
use std::sync::{Arc, Mutex};

use shellpaint_core::{
    Attribute, DestinationCaps, Encoding, OutputFlags, OutputSettings, RenderError, ResetAttribute,
    ScanMode, render,
};
use shellpaint_render::{
    ColorConsole, ConsoleDevice, DEBUG_OUTPUT_TARGET, DebuggerSink, Destination, GridCell,
    NoColorConsole, OffscreenGrid, PassthroughConsole, TracingChannel, build_renderer,
};

// ── Recording device ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Text(String),
    Set(Attribute),
    Cells { column: u16, row: u16, text: String },
    Flush,
}

struct MockDevice {
    attr: Attribute,
    queries: usize,
    ops: Vec<Op>,
    fail_writes: bool,
}

impl MockDevice {
    fn new(attr: Attribute) -> Self {
        Self {
            attr,
            queries: 0,
            ops: Vec::new(),
            fail_writes: false,
        }
    }

    fn text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl ConsoleDevice for MockDevice {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        }
        self.ops.push(Op::Text(text.to_string()));
        Ok(())
    }

    fn current_attribute(&mut self) -> io::Result<Attribute> {
        self.queries += 1;
        Ok(self.attr)
    }

    fn set_attribute(&mut self, attr: Attribute) -> io::Result<()> {
        self.attr = attr;
        self.ops.push(Op::Set(attr));
        Ok(())
    }

    fn write_cells(&mut self, column: u16, row: u16, cells: &[GridCell]) -> io::Result<()> {
        self.ops.push(Op::Cells {
            column,
            row,
            text: cells.iter().map(|c| c.ch).collect(),
        });
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.ops.push(Op::Flush);
        Ok(())
    }
}

// ── Color console ───────────────────────────────────────────────────────

#[test]
fn bold_yellow_then_reset() {
    let mut console = ColorConsole::new(MockDevice::new(Attribute::DEFAULT));
    let mut reset = ResetAttribute::new();
    render(&mut console, &mut reset, "\x1b[1;33mHello\x1b[0m", ScanMode::OneShot).unwrap();

    let device = console.into_inner();
    assert_eq!(
        device.ops,
        vec![
            Op::Set(Attribute::new(0x0E)),
            Op::Text("Hello".into()),
            Op::Set(Attribute::DEFAULT),
            Op::Flush,
        ]
    );
    assert_eq!(reset.get(), Some(Attribute::DEFAULT));
}

#[test]
fn device_is_queried_at_most_once_per_call() {
    let mut console = ColorConsole::new(MockDevice::new(Attribute::DEFAULT));
    let mut reset = ResetAttribute::new();
    render(
        &mut console,
        &mut reset,
        "\x1b[31ma\x1b[42mb\x1b[4mc\x1b[39md",
        ScanMode::OneShot,
    )
    .unwrap();
    assert_eq!(console.device().queries, 1);

    // A new call starts without a cached attribute.
    render(&mut console, &mut reset, "\x1b[35mx", ScanMode::OneShot).unwrap();
    assert_eq!(console.device().queries, 2);
}

#[test]
fn fully_specified_escape_skips_query() {
    let mut console = ColorConsole::new(MockDevice::new(Attribute::new(0x1F)));
    let mut reset = ResetAttribute::with_value(Attribute::DEFAULT);
    render(&mut console, &mut reset, "\x1b[0;31;40mx", ScanMode::OneShot).unwrap();
    assert_eq!(console.device().queries, 0);
    assert_eq!(console.device().attr, Attribute::new(0x04));
}

#[test]
fn reset_is_seeded_from_device() {
    let mut console = ColorConsole::new(MockDevice::new(Attribute::new(0x1E)));
    let mut reset = ResetAttribute::new();
    render(&mut console, &mut reset, "\x1b[0m", ScanMode::OneShot).unwrap();
    assert_eq!(reset.get(), Some(Attribute::new(0x1E)));
    assert_eq!(console.device().attr, Attribute::new(0x1E));
}

#[test]
fn self_contained_escape_then_reset_restores_unstyled() {
    let mut console = ColorConsole::new(MockDevice::new(Attribute::DEFAULT));
    let mut reset = ResetAttribute::new();
    render(&mut console, &mut reset, "\x1b[4;31;44mX\x1b[0mY", ScanMode::OneShot).unwrap();
    assert_eq!(reset.get(), Some(Attribute::DEFAULT));

    let device = console.into_inner();
    assert_eq!(device.attr, Attribute::DEFAULT);
    assert_eq!(device.queries, 1);
    assert_eq!(
        device.ops,
        vec![
            Op::Set(Attribute::new(0x8014)),
            Op::Text("X".into()),
            Op::Set(Attribute::DEFAULT),
            Op::Text("Y".into()),
            Op::Flush,
        ]
    );
}

#[test]
fn reset_seeded_before_styling_survives_later_calls() {
    let mut console = ColorConsole::new(MockDevice::new(Attribute::new(0x1E)));
    let mut reset = ResetAttribute::new();
    render(&mut console, &mut reset, "\x1b[0;4;31;44mX", ScanMode::OneShot).unwrap();
    assert_eq!(reset.get(), Some(Attribute::new(0x1E)));

    render(&mut console, &mut reset, "\x1b[0mY", ScanMode::OneShot).unwrap();
    assert_eq!(console.device().attr, Attribute::new(0x1E));
}

#[test]
fn non_sgr_escapes_are_ignored() {
    let mut console = ColorConsole::new(MockDevice::new(Attribute::DEFAULT));
    let mut reset = ResetAttribute::new();
    render(&mut console, &mut reset, "a\x1b[2Jb", ScanMode::OneShot).unwrap();
    let device = console.into_inner();
    assert_eq!(device.queries, 0);
    assert_eq!(device.text(), "ab");
    assert!(!device.ops.iter().any(|op| matches!(op, Op::Set(_))));
}

#[test]
fn write_failure_aborts_the_call() {
    let mut device = MockDevice::new(Attribute::DEFAULT);
    device.fail_writes = true;
    let mut console = ColorConsole::new(device);
    let mut reset = ResetAttribute::new();
    let err = render(&mut console, &mut reset, "abc\x1b[31mdef", ScanMode::OneShot).unwrap_err();
    assert!(matches!(err, RenderError::Io(_)));
    let device = console.into_inner();
    assert!(!device.ops.iter().any(|op| matches!(op, Op::Set(_))));
    assert_eq!(device.ops.last(), Some(&Op::Flush));
}

// ── Strip and passthrough ───────────────────────────────────────────────

#[test]
fn no_color_console_drops_escapes() {
    let mut console = NoColorConsole::new(MockDevice::new(Attribute::DEFAULT));
    let mut reset = ResetAttribute::new();
    render(&mut console, &mut reset, "\x1b[1;31mwarn\x1b[0m: x\x1b[K", ScanMode::OneShot).unwrap();
    let device = console.into_inner();
    assert_eq!(device.text(), "warn: x");
    assert_eq!(device.queries, 0);
}

#[test]
fn passthrough_console_writes_escapes() {
    let mut console = PassthroughConsole::new(MockDevice::new(Attribute::DEFAULT));
    let mut reset = ResetAttribute::new();
    let text = "\x1b[1;31mwarn\x1b[0m";
    render(&mut console, &mut reset, text, ScanMode::OneShot).unwrap();
    assert_eq!(console.into_inner().text(), text);
}

// ── Offscreen grid ──────────────────────────────────────────────────────

#[test]
fn grid_blits_rows_at_origin() {
    let mut grid = OffscreenGrid::new(3, 1, 4, true, Attribute::DEFAULT).unwrap();
    let mut reset = ResetAttribute::new();
    render(&mut grid, &mut reset, "abcde", ScanMode::OneShot).unwrap();

    let mut device = MockDevice::new(Attribute::DEFAULT);
    grid.blit(&mut device, 10, 5).unwrap();
    assert_eq!(
        device.ops,
        vec![
            Op::Cells {
                column: 10,
                row: 5,
                text: "abc".into()
            },
            Op::Cells {
                column: 10,
                row: 6,
                text: "de ".into()
            },
            Op::Flush,
        ]
    );
    assert_eq!(device.queries, 0);
}

#[test]
fn grid_never_touches_a_device_while_rendering() {
    let mut grid = OffscreenGrid::new(10, 1, 1, false, Attribute::DEFAULT).unwrap();
    let mut reset = ResetAttribute::new();
    render(&mut grid, &mut reset, "\x1b[0;1;32mok\x1b[0m", ScanMode::OneShot).unwrap();
    assert!(!reset.is_set());
    assert_eq!(grid.cell(0, 0).unwrap().attr, Attribute::new(0x0A));
    assert_eq!(grid.attribute(), Attribute::DEFAULT);
}

// ── Factory ─────────────────────────────────────────────────────────────

fn run_built(destination: Destination, flags: OutputFlags, caps: DestinationCaps, text: &str) -> Vec<u8> {
    let settings = OutputSettings::default().with_line_ending("\n");
    let mut out = Vec::new();
    {
        let mut renderer = build_renderer(destination, flags, caps, &settings, &mut out);
        let mut reset = ResetAttribute::new();
        render(&mut renderer, &mut reset, text, ScanMode::OneShot).unwrap();
    }
    out
}

#[test]
fn redirected_output_strips_escapes_without_color_caps() {
    let out = run_built(
        Destination::Redirected,
        OutputFlags::STDOUT,
        DestinationCaps::default(),
        "\x1b[31mred\x1b[0m\r\n",
    );
    assert_eq!(out, b"red\n");
}

#[test]
fn redirected_output_keeps_escapes_with_color_caps() {
    let caps = DestinationCaps::parse("color;extendedchars");
    let out = run_built(Destination::Redirected, OutputFlags::STDOUT, caps, "\x1b[31mré\x1b[0m");
    assert_eq!(out, "\x1b[31mré\x1b[0m".as_bytes());
}

#[test]
fn strip_flag_beats_color_caps() {
    let out = run_built(
        Destination::Redirected,
        OutputFlags::STDOUT | OutputFlags::STRIP_ESCAPES,
        DestinationCaps::full(),
        "\x1b[31mred",
    );
    assert_eq!(out, b"red");
}

#[test]
fn passthrough_flag_keeps_escapes_in_files() {
    let out = run_built(
        Destination::Redirected,
        OutputFlags::STDOUT | OutputFlags::PASSTHROUGH_ESCAPES,
        DestinationCaps::parse("extendedchars"),
        "\x1b[31mred",
    );
    assert_eq!(out, b"\x1b[31mred");
}

#[test]
fn redirected_without_extended_chars_is_ascii() {
    let out = run_built(
        Destination::Redirected,
        OutputFlags::STDOUT,
        DestinationCaps::default(),
        "naïve",
    );
    assert_eq!(out, b"na?ve");
}

#[test]
fn console_color_emits_terminal_styles() {
    let out = run_built(
        Destination::Console,
        OutputFlags::STDOUT,
        DestinationCaps::default(),
        "\x1b[31mred",
    );
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("\x1b[38;5;1m"));
    assert!(out.ends_with("red"));
}

#[test]
fn console_strip_writes_plain_text() {
    let out = run_built(
        Destination::Console,
        OutputFlags::STDOUT | OutputFlags::STRIP_ESCAPES,
        DestinationCaps::default(),
        "\x1b[31mred\x1b[0m",
    );
    assert_eq!(out, b"red");
}

#[test]
fn console_passthrough_writes_escapes() {
    let out = run_built(
        Destination::Console,
        OutputFlags::STDOUT | OutputFlags::PASSTHROUGH_ESCAPES,
        DestinationCaps::default(),
        "\x1b[31mred",
    );
    assert_eq!(out, b"\x1b[31mred");
}

#[test]
fn utf16_settings_reach_the_file() {
    let settings = OutputSettings::default()
        .with_output_encoding(Encoding::Utf16Le)
        .with_line_ending("\n");
    let mut out = Vec::new();
    {
        let mut renderer = build_renderer(
            Destination::Redirected,
            OutputFlags::STDOUT,
            DestinationCaps::full(),
            &settings,
            &mut out,
        );
        let mut reset = ResetAttribute::new();
        render(&mut renderer, &mut reset, "A\r\n", ScanMode::OneShot).unwrap();
    }
    assert_eq!(out, vec![b'A', 0, b'\n', 0]);
}

// ── Debugger channel ────────────────────────────────────────────────────

mod capture {
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer};

    #[derive(Clone, Default)]
    pub struct Captured(pub Arc<Mutex<Vec<(String, String)>>>);

    struct OutputField(Option<String>);

    impl Visit for OutputField {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "output" {
                self.0 = Some(format!("{value:?}"));
            }
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "output" {
                self.0 = Some(value.to_string());
            }
        }
    }

    impl<S: Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = OutputField(None);
            event.record(&mut visitor);
            if let Some(output) = visitor.0 {
                let target = event.metadata().target().to_string();
                self.0.lock().unwrap().push((target, output));
            }
        }
    }
}

#[test]
fn debugger_sink_emits_tracing_events() {
    use tracing_subscriber::layer::SubscriberExt;

    let captured = capture::Captured::default();
    let events: Arc<Mutex<Vec<(String, String)>>> = Arc::clone(&captured.0);
    let subscriber = tracing_subscriber::registry().with(captured);

    tracing::subscriber::with_default(subscriber, || {
        let mut sink = DebuggerSink::new(TracingChannel);
        let mut reset = ResetAttribute::new();
        render(&mut sink, &mut reset, "one\r\ntwo\x1b[31m", ScanMode::OneShot).unwrap();
    });

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, DEBUG_OUTPUT_TARGET);
    assert_eq!(events[0].1, "one\ntwo");
}
