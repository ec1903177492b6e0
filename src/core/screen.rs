//! Virtual screen
//!
//! A thin facade over the `vt100` emulator. Callers feed raw bytes and read
//! back the rendered rows without touching emulator types. Emulator failures
//! never escape this module: a panic while processing or rendering is logged
//! and the screen falls back to whatever it can still show.

use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

/// Default screen width in columns
pub const DEFAULT_WIDTH: u16 = 80;
/// Default screen height in rows
pub const DEFAULT_HEIGHT: u16 = 24;

/// A fixed-size virtual terminal screen
pub struct VirtualScreen {
    parser: vt100::Parser,
    width: u16,
    height: u16,
}

impl Default for VirtualScreen {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl std::fmt::Debug for VirtualScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualScreen")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl VirtualScreen {
    /// Create a blank screen. Zero dimensions are clamped to one.
    pub fn new(width: u16, height: u16) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            parser: blank_parser(width, height),
            width,
            height,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Feed raw bytes to the emulator.
    ///
    /// Partial or malformed escape sequences are fine; the emulator keeps
    /// its parse state across calls. If processing panics the screen is
    /// rebuilt blank so later feeds start from a sane state.
    pub fn feed(&mut self, bytes: &[u8]) {
        let parser = &mut self.parser;
        let result = panic::catch_unwind(AssertUnwindSafe(|| parser.process(bytes)));
        if result.is_err() {
            warn!(len = bytes.len(), "virtual screen failed to process input, resetting");
            self.reset();
        }
    }

    /// Current screen rows top to bottom, each right-trimmed.
    ///
    /// Rows are collected one at a time so a failure part way through still
    /// returns the rows read before it.
    pub fn rendered_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.height as usize);
        let screen = self.parser.screen();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            for row in screen.rows(0, self.width).take(self.height as usize) {
                lines.push(row.trim_end().to_string());
            }
        }));
        if result.is_err() {
            warn!(rows = lines.len(), "virtual screen render failed, returning partial rows");
        }
        lines
    }

    /// Clear the grid and home the cursor
    pub fn reset(&mut self) {
        self.parser = blank_parser(self.width, self.height);
    }

    /// True when no cell holds visible text
    pub fn is_blank(&self) -> bool {
        self.rendered_lines().iter().all(|line| line.is_empty())
    }

    /// Cursor position as (row, col)
    pub fn cursor_position(&self) -> (u16, u16) {
        self.parser.screen().cursor_position()
    }
}

fn blank_parser(width: u16, height: u16) -> vt100::Parser {
    // Parsed text is read from the visible grid only, no scrollback
    vt100::Parser::new(height, width, 0)
}
