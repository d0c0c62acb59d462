// SPDX-License-Identifier: MIT
//
// Console: the boundary between the in-memory screen and a real display.
//
// A session never writes escape sequences itself. It hands the flattened
// frame to a Console and asks it to place the cursor, and the Console decides
// how that reaches the screen. Two implementations:
//
//   AnsiConsole<W>    encodes everything as ANSI/VT sequences into any
//                     `io::Write`. With a `Vec<u8>` it is the test double;
//                     with stdout it is the real thing.
//
//   Terminal          (terminal.rs) AnsiConsole<Stdout> plus raw mode,
//                     panic-safe restore, and size queries.
//
// Every frame is one `blit`: one `write_all`, one `flush`. Row breaks in
// the frame go out as CR LF.

use std::io::{self, Write};

use crate::ansi;
use crate::point::Size;

// ─── Console ─────────────────────────────────────────────────────────────────

/// What a session needs from the display it draws on.
pub trait Console {
    /// Prepare the display for a session of the given size.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying output fails.
    fn enter(&mut self, size: Size) -> io::Result<()>;

    /// Undo [`enter`](Self::enter).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying output fails.
    fn leave(&mut self) -> io::Result<()>;

    /// Write a complete frame in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying output fails.
    fn blit(&mut self, frame: &str) -> io::Result<()>;

    /// Place the display cursor at row `y`, column `x` (0-indexed).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying output fails.
    fn move_cursor(&mut self, y: i32, x: i32) -> io::Result<()>;

    /// Place the display cursor at the top-left corner.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying output fails.
    fn reset_cursor(&mut self) -> io::Result<()> {
        self.move_cursor(0, 0)
    }

    /// Show or hide the display cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying output fails.
    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()>;

    fn cursor_visible(&self) -> bool;

    /// Whether the display renders color escape sequences.
    fn has_color(&self) -> bool;

    /// # Errors
    ///
    /// Returns an error if the underlying output fails.
    fn clear_screen(&mut self) -> io::Result<()>;

    /// # Errors
    ///
    /// Returns an error if the underlying output fails.
    fn set_title(&mut self, title: &str) -> io::Result<()>;

    /// Choose whether [`enter`](Self::enter) switches to an alternate screen.
    /// Displays without one ignore it.
    fn set_alternate_screen(&mut self, _enabled: bool) {}
}

// ─── AnsiConsole ─────────────────────────────────────────────────────────────

/// A [`Console`] that speaks ANSI escape sequences to any writer.
///
/// ```
/// use w_term::console::{AnsiConsole, Console};
///
/// let mut console = AnsiConsole::new(Vec::new());
/// console.move_cursor(2, 4)?;
/// console.blit("hi")?;
/// assert_eq!(console.get_ref().as_slice(), b"\x1b[3;5Hhi");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct AnsiConsole<W: Write> {
    out: W,
    color: bool,
    cursor_visible: bool,
    alternate_screen: bool,
    active: bool,
}

impl<W: Write> AnsiConsole<W> {
    /// A color-capable console with a visible cursor.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            color: true,
            cursor_visible: true,
            alternate_screen: false,
            active: false,
        }
    }

    /// Override color support.
    #[must_use]
    pub const fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    #[inline]
    pub const fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Console for AnsiConsole<W> {
    fn enter(&mut self, size: Size) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        if self.alternate_screen {
            ansi::enter_alt_screen(&mut self.out)?;
        }
        ansi::resize_window(&mut self.out, size.rows, size.cols)?;
        self.out.flush()?;
        self.active = true;
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        ansi::reset(&mut self.out)?;
        ansi::cursor_show(&mut self.out)?;
        if self.alternate_screen {
            ansi::exit_alt_screen(&mut self.out)?;
        }
        self.out.flush()?;
        self.cursor_visible = true;
        self.active = false;
        Ok(())
    }

    fn blit(&mut self, frame: &str) -> io::Result<()> {
        // Raw mode turns off output post-processing, so rows need an
        // explicit carriage return.
        let frame = frame.replace('\n', "\r\n");
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }

    fn move_cursor(&mut self, y: i32, x: i32) -> io::Result<()> {
        ansi::cursor_to(&mut self.out, y, x)?;
        self.out.flush()
    }

    fn reset_cursor(&mut self) -> io::Result<()> {
        ansi::cursor_home(&mut self.out)?;
        self.out.flush()
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        if visible {
            ansi::cursor_show(&mut self.out)?;
        } else {
            ansi::cursor_hide(&mut self.out)?;
        }
        self.out.flush()?;
        self.cursor_visible = visible;
        Ok(())
    }

    fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    fn has_color(&self) -> bool {
        self.color
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        ansi::clear_screen(&mut self.out)?;
        self.out.flush()
    }

    fn set_title(&mut self, title: &str) -> io::Result<()> {
        ansi::set_title(&mut self.out, title)?;
        self.out.flush()
    }

    fn set_alternate_screen(&mut self, enabled: bool) {
        self.alternate_screen = enabled;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
