// SPDX-License-Identifier: MIT
//
// Session: one curses-style drawing context.
//
// A Session ties together a Console (where frames go), a Buffer (where
// drawing happens), and an InputManager (where keys come from). It is an
// ordinary value: create one per program, or one per test with an
// `AnsiConsole<Vec<u8>>` standing in for the screen.
//
// Lifecycle:
//
//   new ──start(size)──▶ started ──end()──▶ ended
//
// Before `start` and after `end` there is no buffer: output is ignored,
// the position reads as the origin, and input yields `Key::Error`. Both
// transitions are idempotent, and dropping a started session ends it.
//
// Only console I/O can fail, and only the calls that touch the console
// (`start`, `end`, `refresh`, `clear`, cursor visibility, title) return
// `io::Result`. Everything else keeps the silent-rejection rules of the
// buffer and color registry.

use std::fmt;
use std::io;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::buffer::Buffer;
use crate::color::{ColorIndex, ColorManager, ColorPair, PairIndex, Rgb};
use crate::console::Console;
use crate::input::{InputManager, Key};
use crate::point::{Point, Size};

// ─── SessionOptions ──────────────────────────────────────────────────────────

/// Behaviour switches fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Window title applied on start.
    pub title: Option<String>,
    /// Hide the display cursor while a frame is written.
    pub hide_cursor_on_refresh: bool,
    /// Start with non-blocking input.
    pub no_delay: bool,
    /// Draw on the terminal's alternate screen.
    pub alternate_screen: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            title: None,
            hide_cursor_on_refresh: true,
            no_delay: false,
            alternate_screen: false,
        }
    }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// A drawing context over a [`Console`].
///
/// ```
/// use w_term::console::AnsiConsole;
/// use w_term::point::{Point, Size};
/// use w_term::session::Session;
///
/// let mut session = Session::new(AnsiConsole::new(Vec::new()));
/// session.start(Size::new(2, 10))?;
/// session.print("score: ").print_value(42);
/// session.refresh()?;
///
/// assert_eq!(session.position(), Point::new(0, 9));
/// session.end()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Session<C: Console> {
    console: C,
    buffer: Option<Buffer>,
    input: InputManager,
    options: SessionOptions,
}

impl<C: Console> Session<C> {
    #[must_use]
    pub fn new(console: C) -> Self {
        Self {
            console,
            buffer: None,
            input: InputManager::new(),
            options: SessionOptions::default(),
        }
    }

    /// Read keys from `input` instead of nowhere.
    #[must_use]
    pub fn with_input(mut self, input: InputManager) -> Self {
        self.input = input;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Prepare the console and draw the first (blank) frame.
    ///
    /// # Errors
    ///
    /// Returns an error if any console output fails.
    pub fn start(&mut self, size: Size) -> io::Result<()> {
        if self.buffer.is_some() {
            return Ok(());
        }

        let size = size.clamped();
        self.console.set_alternate_screen(self.options.alternate_screen);
        self.console.enter(size)?;
        if let Some(title) = &self.options.title {
            self.console.set_title(title)?;
        }

        let buffer = Buffer::new(size);
        log::debug!("session: started at {}", buffer.size());
        self.buffer = Some(buffer);
        self.input.set_no_delay(self.options.no_delay);

        self.console.clear_screen()?;
        self.refresh()
    }

    /// Restore the console and drop the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if any console output fails.
    pub fn end(&mut self) -> io::Result<()> {
        if self.buffer.take().is_none() {
            return Ok(());
        }

        self.console.blit(ColorManager::reset_code())?;
        self.console.set_cursor_visible(true)?;
        self.console.clear_screen()?;
        self.console.leave()?;
        log::debug!("session: ended");
        Ok(())
    }

    #[inline]
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.buffer.is_some()
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    pub const fn console(&self) -> &C {
        &self.console
    }

    #[inline]
    pub const fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    /// The buffer, while started.
    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> Option<&Buffer> {
        self.buffer.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The buffer's size, or `None` before start.
    #[must_use]
    pub fn size(&self) -> Option<Size> {
        self.buffer.as_ref().map(Buffer::size)
    }

    // ─── Output ──────────────────────────────────────────────────────────

    pub fn put(&mut self, ch: char) -> &mut Self {
        if let Some(buffer) = &mut self.buffer {
            buffer.put(ch);
        }
        self
    }

    pub fn print(&mut self, text: &str) -> &mut Self {
        if let Some(buffer) = &mut self.buffer {
            buffer.print(text);
        }
        self
    }

    pub fn print_value(&mut self, value: impl fmt::Display) -> &mut Self {
        if let Some(buffer) = &mut self.buffer {
            buffer.print_value(value);
        }
        self
    }

    /// Flatten the buffer and write it to the console in one blit, then put
    /// the console cursor where the write head is.
    ///
    /// # Errors
    ///
    /// Returns an error if any console output fails.
    pub fn refresh(&mut self) -> io::Result<()> {
        let Some(buffer) = &mut self.buffer else {
            return Ok(());
        };

        buffer.refresh_screen_buffer();

        let hide = self.options.hide_cursor_on_refresh && self.console.cursor_visible();
        if hide {
            self.console.set_cursor_visible(false)?;
        }

        self.console.reset_cursor()?;
        self.console.blit(buffer.screen_buffer())?;
        let position = buffer.cursor_position();
        self.console.move_cursor(position.y, position.x)?;

        if hide {
            self.console.set_cursor_visible(true)?;
        }
        Ok(())
    }

    /// Blank the buffer and show the result.
    ///
    /// # Errors
    ///
    /// Returns an error if any console output fails.
    pub fn clear(&mut self) -> io::Result<()> {
        if let Some(buffer) = &mut self.buffer {
            buffer.clear();
        }
        self.refresh()
    }

    /// Resize the buffer, discarding its content.
    pub fn resize(&mut self, size: Size) {
        if let Some(buffer) = &mut self.buffer {
            buffer.resize(size);
        }
    }

    // ─── Cursor ──────────────────────────────────────────────────────────

    pub fn move_to(&mut self, y: i32, x: i32) -> bool {
        self.buffer.as_mut().is_some_and(|b| b.move_to(y, x))
    }

    pub fn move_by(&mut self, dy: i32, dx: i32) -> bool {
        self.buffer.as_mut().is_some_and(|b| b.move_by(dy, dx))
    }

    /// The write head, or the origin before start.
    #[must_use]
    pub fn position(&self) -> Point {
        self.buffer.as_ref().map_or(Point::ZERO, Buffer::cursor_position)
    }

    /// # Errors
    ///
    /// Returns an error if the console write fails.
    pub fn set_cursor_visibility(&mut self, visible: bool) -> io::Result<()> {
        self.console.set_cursor_visible(visible)
    }

    /// # Errors
    ///
    /// Returns an error if the console write fails.
    pub fn set_title(&mut self, title: &str) -> io::Result<()> {
        self.console.set_title(title)
    }

    // ─── Color ───────────────────────────────────────────────────────────

    /// Whether the console can show color.
    #[must_use]
    pub fn has_color(&self) -> bool {
        self.console.has_color()
    }

    /// The buffer, if it may take color calls.
    fn color_buffer(&mut self) -> Option<&mut Buffer> {
        if self.console.has_color() {
            self.buffer.as_mut()
        } else {
            None
        }
    }

    pub fn start_color(&mut self) {
        if let Some(buffer) = self.color_buffer() {
            buffer.start_color();
        }
    }

    pub fn init_color(&mut self, index: ColorIndex, rgb: Rgb) {
        if let Some(buffer) = self.color_buffer() {
            buffer.init_color(index, rgb);
        }
    }

    pub fn init_pair(&mut self, index: PairIndex, pair: ColorPair) {
        if let Some(buffer) = self.color_buffer() {
            buffer.init_pair(index, pair);
        }
    }

    pub fn init_default_pair(&mut self, index: PairIndex) {
        if let Some(buffer) = self.color_buffer() {
            buffer.init_default_pair(index);
        }
    }

    pub fn set_active_pair(&mut self, index: PairIndex) {
        if let Some(buffer) = self.color_buffer() {
            buffer.set_active_pair(index);
        }
    }

    pub fn reset_to_default_pair(&mut self) {
        if let Some(buffer) = self.color_buffer() {
            buffer.reset_to_default_pair();
        }
    }

    /// The SGR reset sequence.
    #[inline]
    #[must_use]
    pub const fn reset_code(&self) -> &'static str {
        ColorManager::reset_code()
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Next key; [`Key::Error`] before start.
    pub fn get_key(&mut self) -> Key {
        if self.buffer.is_none() {
            return Key::Error;
        }
        self.input.get_key()
    }

    /// Next key as its ncurses integer code.
    pub fn get_ch(&mut self) -> i32 {
        self.get_key().code()
    }

    pub fn set_no_delay(&mut self, enabled: bool) {
        self.input.set_no_delay(enabled);
    }

    pub fn flush_input(&mut self) {
        self.input.flush();
    }

    /// Whether the input source has ended and nothing is left to read.
    #[must_use]
    pub fn input_closed(&self) -> bool {
        self.input.is_closed()
    }

    /// Block the calling thread for `ms` milliseconds.
    pub fn sleep(ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

impl<C: Console> fmt::Write for Session<C> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s);
        Ok(())
    }
}

impl<C: Console> Drop for Session<C> {
    fn drop(&mut self) {
        if let Err(err) = self.end() {
            log::warn!("session: failed to restore console: {err}");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;
    use std::sync::mpsc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::console::AnsiConsole;

    type TestSession = Session<AnsiConsole<Vec<u8>>>;

    fn session() -> TestSession {
        Session::new(AnsiConsole::new(Vec::new()))
    }

    fn started(rows: i32, cols: i32) -> TestSession {
        let mut s = session();
        s.start(Size::new(rows, cols)).unwrap();
        s.console_mut().get_mut().clear();
        s
    }

    fn output(s: &TestSession) -> String {
        String::from_utf8(s.console().get_ref().clone()).unwrap()
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    #[test]
    fn start_enters_clears_and_draws_blank_frame() {
        let mut s = session();
        s.start(Size::new(2, 3)).unwrap();
        assert!(s.is_started());
        assert_eq!(
            output(&s),
            "\x1b[8;2;3t\x1b[2J\x1b[H\x1b[?25l\x1b[H   \r\n   \x1b[1;1H\x1b[?25h"
        );
    }

    #[test]
    fn start_applies_title_and_alternate_screen() {
        let mut s = session().with_options(SessionOptions {
            title: Some("demo".into()),
            alternate_screen: true,
            hide_cursor_on_refresh: false,
            no_delay: false,
        });
        s.start(Size::new(1, 1)).unwrap();
        assert_eq!(
            output(&s),
            "\x1b[?1049h\x1b[8;1;1t\x1b]0;demo\x07\x1b[2J\x1b[H\x1b[H \x1b[1;1H"
        );
    }

    #[test]
    fn start_requests_clamped_window_size() {
        let mut s = session();
        s.start(Size::new(0, -1)).unwrap();
        assert_eq!(s.size(), Some(Size::MIN));
        assert!(output(&s).starts_with("\x1b[8;1;1t"));
    }

    #[test]
    fn start_is_idempotent() {
        let mut s = started(2, 2);
        s.print("ab");
        s.start(Size::new(5, 5)).unwrap();
        assert_eq!(s.size(), Some(Size::new(2, 2)));
        assert!(output(&s).is_empty());
    }

    #[test]
    fn start_clamps_size() {
        let s = started(0, -1);
        assert_eq!(s.size(), Some(Size::MIN));
    }

    #[test]
    fn end_resets_and_restores() {
        let mut s = started(1, 1);
        s.end().unwrap();
        assert!(!s.is_started());
        assert!(!s.console().is_active());
        assert_eq!(output(&s), "\x1b[0m\x1b[?25h\x1b[2J\x1b[H\x1b[0m\x1b[?25h");
    }

    #[test]
    fn end_is_idempotent() {
        let mut s = started(1, 1);
        s.end().unwrap();
        s.console_mut().get_mut().clear();
        s.end().unwrap();
        assert!(output(&s).is_empty());
    }

    #[test]
    fn end_without_start_writes_nothing() {
        let mut s = session();
        s.end().unwrap();
        assert!(output(&s).is_empty());
    }

    // ── Output ──────────────────────────────────────────────────────────

    #[test]
    fn output_before_start_is_ignored() {
        let mut s = session();
        s.print("lost").put('x').print_value(1);
        assert_eq!(s.position(), Point::ZERO);
        assert!(s.buffer().is_none());
        s.refresh().unwrap();
        assert!(output(&s).is_empty());
    }

    #[test]
    fn refresh_blits_and_places_cursor() {
        let mut s = started(2, 4);
        s.print("hi\nyo");
        s.refresh().unwrap();
        assert_eq!(
            output(&s),
            "\x1b[?25l\x1b[Hhi  \r\nyo  \x1b[2;3H\x1b[?25h"
        );
    }

    #[test]
    fn refresh_leaves_hidden_cursor_hidden() {
        let mut s = started(1, 2);
        s.set_cursor_visibility(false).unwrap();
        s.console_mut().get_mut().clear();
        s.refresh().unwrap();
        assert_eq!(output(&s), "\x1b[H  \x1b[1;1H");
        assert!(!s.console().cursor_visible());
    }

    #[test]
    fn fmt_write_draws_into_buffer() {
        let mut s = started(1, 6);
        write!(s, "n={}", 42).unwrap();
        assert_eq!(s.buffer().unwrap().symbol_at(0, 2), Some('4'));
        assert_eq!(s.position(), Point::new(0, 4));
    }

    #[test]
    fn clear_blanks_and_refreshes() {
        let mut s = started(1, 3);
        s.print("abc");
        s.clear().unwrap();
        assert_eq!(s.position(), Point::ZERO);
        assert!(output(&s).contains("\x1b[H   \x1b[1;1H"));
    }

    #[test]
    fn resize_replaces_buffer_content() {
        let mut s = started(2, 2);
        s.print("ab");
        s.resize(Size::new(3, 5));
        assert_eq!(s.size(), Some(Size::new(3, 5)));
        assert_eq!(s.buffer().unwrap().symbol_at(0, 0), Some(' '));
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    #[test]
    fn movement_is_bounded() {
        let mut s = started(3, 3);
        assert!(s.move_to(2, 2));
        assert!(!s.move_by(1, 0));
        assert_eq!(s.position(), Point::new(2, 2));
    }

    #[test]
    fn movement_before_start_fails() {
        let mut s = session();
        assert!(!s.move_to(0, 0));
        assert!(!s.move_by(0, 0));
    }

    // ── Color ───────────────────────────────────────────────────────────

    #[test]
    fn color_frame_diffs_pairs() {
        let mut s = started(1, 3);
        s.start_color();
        s.init_pair(1, ColorPair::new(2, 3));
        s.set_active_pair(1);
        s.move_to(0, 1);
        s.put('A');
        s.refresh().unwrap();
        assert!(output(&s).contains(
            "\x1b[38;5;7m\x1b[48;5;0m \x1b[38;5;2m\x1b[48;5;3mA\x1b[38;5;7m\x1b[48;5;0m "
        ));
    }

    #[test]
    fn color_calls_need_color_console() {
        let mut s = Session::new(AnsiConsole::new(Vec::new()).with_color(false));
        s.start(Size::new(1, 2)).unwrap();
        assert!(!s.has_color());
        s.start_color();
        assert!(!s.buffer().unwrap().is_color());
    }

    #[test]
    fn custom_colors_reach_the_frame() {
        let mut s = started(1, 1);
        s.start_color();
        s.init_color(16, Rgb::new(10, 20, 30));
        s.init_pair(1, ColorPair::new(16, 0));
        s.init_default_pair(1);
        s.refresh().unwrap();
        assert!(output(&s).contains("\x1b[38;2;10;20;30m\x1b[48;5;0m "));
    }

    #[test]
    fn reset_to_default_pair_after_colored_text() {
        let mut s = started(1, 2);
        s.start_color();
        s.init_pair(1, ColorPair::new(1, 0));
        s.set_active_pair(1);
        s.put('r');
        s.reset_to_default_pair();
        s.put('d');
        let buffer = s.buffer().unwrap();
        assert_eq!(buffer.pair_at(0, 0), Some(1));
        assert_eq!(buffer.pair_at(0, 1), Some(0));
        assert_eq!(s.reset_code(), "\x1b[0m");
    }

    // ── Input ───────────────────────────────────────────────────────────

    #[test]
    fn input_before_start_is_error() {
        let (tx, rx) = mpsc::channel();
        tx.send(b"a".to_vec()).unwrap();
        let mut s = session().with_input(InputManager::from_receiver(rx));
        assert_eq!(s.get_key(), Key::Error);
    }

    #[test]
    fn input_routes_to_manager() {
        let (tx, rx) = mpsc::channel();
        let mut s = session().with_input(InputManager::from_receiver(rx));
        s.start(Size::new(1, 1)).unwrap();
        tx.send(vec![224, 72, b'q']).unwrap();
        assert_eq!(s.get_key(), Key::Up);
        assert_eq!(s.get_ch(), i32::from(b'q'));
    }

    #[test]
    fn no_delay_option_applies_on_start() {
        let (_tx, rx) = mpsc::channel::<Vec<u8>>();
        let mut s = session()
            .with_input(InputManager::from_receiver(rx))
            .with_options(SessionOptions {
                no_delay: true,
                ..SessionOptions::default()
            });
        s.start(Size::new(1, 1)).unwrap();
        assert_eq!(s.get_key(), Key::Error);
    }

    #[test]
    fn input_closed_after_source_ends() {
        let (tx, rx) = mpsc::channel();
        let mut s = session().with_input(InputManager::from_receiver(rx));
        s.start(Size::new(1, 1)).unwrap();
        tx.send(b"a".to_vec()).unwrap();
        drop(tx);

        assert_eq!(s.get_key(), Key::Char('a'));
        assert!(!s.input_closed());
        assert_eq!(s.get_key(), Key::Error);
        assert!(s.input_closed());
    }

    #[test]
    fn flush_input_discards_typed_keys() {
        let (tx, rx) = mpsc::channel();
        let mut s = session().with_input(InputManager::from_receiver(rx));
        s.start(Size::new(1, 1)).unwrap();
        tx.send(b"xyz".to_vec()).unwrap();
        s.flush_input();
        s.set_no_delay(true);
        assert_eq!(s.get_key(), Key::Error);
    }

    // ── Options ─────────────────────────────────────────────────────────

    #[test]
    fn default_options() {
        let options = SessionOptions::default();
        assert_eq!(options.title, None);
        assert!(options.hide_cursor_on_refresh);
        assert!(!options.no_delay);
        assert!(!options.alternate_screen);
    }
}
