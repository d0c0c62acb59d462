// SPDX-License-Identifier: MIT
//
// Terminal: the process's own console, with raw mode and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and a raw fd write in the panic
// hook. These are the POSIX interfaces for terminal control; each unsafe
// block is minimal.
#![allow(unsafe_code)]
//
// A Terminal is an AnsiConsole over stdout that additionally:
//
//   - saves the termios state and switches to raw input (no echo, no line
//     buffering) on `enter`, restoring it exactly on `leave`,
//   - installs a once-per-process panic hook that writes a restore sequence
//     straight to fd 1 and puts termios back, so a panic mid-frame leaves a
//     usable shell behind,
//   - reports color support when stdout is a TTY and TERM is not `dumb`.
//
// Dropping an entered Terminal leaves it.

use std::io::{self, Stdout, Write};
use std::sync::{Mutex, Once};

use crate::console::{AnsiConsole, Console};
use crate::point::Size;

// ─── Terminal Queries ────────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size::new(i32::from(ws.ws_row), i32::from(ws.ws_col)))
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

/// Check whether stdout is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn stdout_is_tty() -> bool {
    unsafe { libc::isatty(libc::STDOUT_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn stdout_is_tty() -> bool {
    false
}

/// Whether a terminal with this `TERM` value renders SGR color.
#[must_use]
pub fn term_supports_color(term: Option<&str>) -> bool {
    !matches!(term, Some("dumb" | ""))
}

// ─── Panic-Safe Terminal Restore ─────────────────────────────────────────────

/// Original termios for the panic hook, which cannot reach the struct.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

/// Reset SGR, show the cursor, leave the alternate screen.
///
/// Alternate screen exit is last so the restored shell content appears
/// without leftovers.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[0m\x1b[?25h\x1b[?1049l";

static PANIC_HOOK_INSTALLED: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the restore sequence directly to stdout's file descriptor,
/// bypassing the `io::stdout()` lock in case the panic happened while it
/// was held.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ────────────────────────────────────────────────────────────────

/// The process terminal as a [`Console`].
///
/// ```no_run
/// use w_term::console::Console;
/// use w_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter(term.size())?;
/// term.blit("hello")?;
/// // Restored automatically on drop.
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    console: AnsiConsole<Stdout>,

    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    size: Size,
}

impl Terminal {
    /// A handle on stdout. Does not touch the terminal until
    /// [`enter`](Console::enter).
    ///
    /// Falls back to 24×80 when the size cannot be determined (tests, pipes).
    #[must_use]
    pub fn new() -> Self {
        let term = std::env::var("TERM").ok();
        let color = stdout_is_tty() && term_supports_color(term.as_deref());

        Self {
            console: AnsiConsole::new(io::stdout()).with_color(color),
            #[cfg(unix)]
            original_termios: None,
            size: get_size().unwrap_or_default(),
        }
    }

    /// Cached terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the terminal size from the OS and cache it.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = get_size() {
            self.size = size;
        }
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.console.is_active()
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if !is_tty() {
            return Ok(());
        }

        let fd = io::stdin().as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            // cfmakeraw equivalent.
            termios.c_iflag &= !(libc::IGNBRK
                | libc::BRKINT
                | libc::PARMRK
                | libc::ISTRIP
                | libc::INLCR
                | libc::IGNCR
                | libc::ICRNL
                | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_lflag &=
                !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
            termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
            termios.c_cflag |= libc::CS8;

            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        log::debug!("terminal: raw mode on");
        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            use std::os::unix::io::AsRawFd;
            let fd = io::stdin().as_raw_fd();

            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            self.original_termios = None;
            log::debug!("terminal: raw mode off");
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for Terminal {
    fn enter(&mut self, size: Size) -> io::Result<()> {
        if self.console.is_active() {
            return Ok(());
        }
        install_panic_hook();
        self.enable_raw_mode()?;
        self.console.enter(size)
    }

    fn leave(&mut self) -> io::Result<()> {
        if !self.console.is_active() {
            return Ok(());
        }
        self.console.leave()?;
        self.disable_raw_mode()
    }

    fn blit(&mut self, frame: &str) -> io::Result<()> {
        self.console.blit(frame)
    }

    fn move_cursor(&mut self, y: i32, x: i32) -> io::Result<()> {
        self.console.move_cursor(y, x)
    }

    fn reset_cursor(&mut self) -> io::Result<()> {
        self.console.reset_cursor()
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        self.console.set_cursor_visible(visible)
    }

    fn cursor_visible(&self) -> bool {
        self.console.cursor_visible()
    }

    fn has_color(&self) -> bool {
        self.console.has_color()
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        self.console.clear_screen()
    }

    fn set_title(&mut self, title: &str) -> io::Result<()> {
        self.console.set_title(title)
    }

    fn set_alternate_screen(&mut self, enabled: bool) {
        self.console.set_alternate_screen(enabled);
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.console.is_active() {
            let _ = self.leave();
        }
        let _ = self.console.get_mut().flush();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Queries ─────────────────────────────────────────────────────────

    #[test]
    fn get_size_does_not_panic() {
        let _ = get_size();
    }

    #[test]
    fn is_tty_does_not_panic() {
        let _ = is_tty();
        let _ = stdout_is_tty();
    }

    #[test]
    fn dumb_terminals_have_no_color() {
        assert!(!term_supports_color(Some("dumb")));
        assert!(!term_supports_color(Some("")));
        assert!(term_supports_color(Some("xterm-256color")));
        assert!(term_supports_color(None));
    }

    // ── Emergency restore sequence ──────────────────────────────────────

    #[test]
    fn emergency_restore_exits_alt_screen_last() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.starts_with("\x1b[0m"));
        assert!(s.contains("\x1b[?25h"));
        assert!(s.ends_with("\x1b[?1049l"));
    }

    // ── Terminal struct ─────────────────────────────────────────────────

    #[test]
    fn terminal_new_is_inactive() {
        let term = Terminal::new();
        assert!(!term.is_active());
    }

    #[test]
    fn terminal_has_reasonable_default_size() {
        let mut term = Terminal::new();
        let s = term.refresh_size();
        assert!(s.rows > 0);
        assert!(s.cols > 0);
        assert_eq!(s, term.size());
    }

    #[test]
    fn terminal_leave_without_enter() {
        let mut term = Terminal::new();
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn terminal_drop_without_enter() {
        drop(Terminal::new());
    }
}
