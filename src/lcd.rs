//! # Text frame
//! In-memory model of the 16x2 character display. The controller renders into
//! it, the display task paints it onto the OLED whenever it changed.

use crate::config::{LCD_COLS, LCD_ROWS};
use crate::traits::TextDisplay;
use core::fmt::{self, Write};
use heapless::String;

/// One display row worth of text.
pub type Line = String<LCD_COLS>;

/// Formats into a [`Line`]. A piece that does not fit and everything after
/// it is dropped.
pub fn line(args: fmt::Arguments<'_>) -> Line {
    let mut text = Line::new();
    let _ = text.write_fmt(args);
    text
}

/// Replaces the whole display with two rows of text and hides the cursor.
pub fn show<D: TextDisplay>(display: &mut D, top: &str, bottom: &str) {
    display.clear();
    display.set_cursor_visible(false);
    display.render(0, 0, top);
    display.render(1, 0, bottom);
}

/// Like [`show`], with the cursor shown on the bottom row at `col`.
pub fn show_editing<D: TextDisplay>(display: &mut D, top: &str, bottom: &str, col: usize) {
    show(display, top, bottom);
    display.set_cursor(1, u8::try_from(col).unwrap_or(u8::MAX));
    display.set_cursor_visible(true);
}

/// Characters and cursor of the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcdFrame {
    /// ASCII characters, row major
    cells: [[u8; LCD_COLS]; LCD_ROWS],
    /// Cursor position as (row, col)
    cursor: (u8, u8),
    /// Whether the cursor is shown
    cursor_visible: bool,
    /// Set by every modification, cleared by [`LcdFrame::take_dirty`]
    dirty: bool,
}

impl Default for LcdFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl LcdFrame {
    /// A blank frame with the cursor hidden.
    pub const fn new() -> Self {
        Self {
            cells: [[b' '; LCD_COLS]; LCD_ROWS],
            cursor: (0, 0),
            cursor_visible: false,
            dirty: true,
        }
    }

    /// The full row, padded with spaces. Rows outside the frame read empty.
    pub fn row(&self, row: usize) -> &str {
        self.cells
            .get(row)
            .and_then(|cells| core::str::from_utf8(cells).ok())
            .unwrap_or("")
    }

    /// The row without trailing spaces.
    pub fn line(&self, row: usize) -> &str {
        self.row(row).trim_end()
    }

    /// Cursor position if it is shown.
    pub const fn cursor(&self) -> Option<(u8, u8)> {
        if self.cursor_visible {
            Some(self.cursor)
        } else {
            None
        }
    }

    /// Whether the frame changed since the last call.
    pub const fn take_dirty(&mut self) -> bool {
        let dirty = self.dirty;
        self.dirty = false;
        dirty
    }
}

impl TextDisplay for LcdFrame {
    fn clear(&mut self) {
        self.cells = [[b' '; LCD_COLS]; LCD_ROWS];
        self.dirty = true;
    }

    fn render(&mut self, row: u8, col: u8, text: &str) {
        let Some(cells) = self.cells.get_mut(usize::from(row)) else {
            return;
        };
        let start = usize::from(col);
        for (cell, c) in cells.iter_mut().skip(start).zip(text.chars()) {
            // the display has no glyphs outside printable ASCII
            *cell = if c.is_ascii() && !c.is_ascii_control() {
                c as u8
            } else {
                b'?'
            };
        }
        self.dirty = true;
    }

    fn set_cursor(&mut self, row: u8, col: u8) {
        self.cursor = (row, col);
        self.dirty = true;
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
        self.dirty = true;
    }
}
