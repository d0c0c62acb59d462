// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions, two flavours:
//
//   - Color codes append to a `String`. The screen flattener builds one
//     string per frame, and formatting into a `String` cannot fail, so these
//     return nothing.
//
//   - Terminal control sequences write to any `impl Write` and propagate
//     `io::Result` from the underlying writer.
//
// Cursor positions are 0-indexed (y, x) in our API and converted to the
// 1-indexed row;column form the terminal expects.

use std::fmt::Write as _;
use std::io::{self, Write};

/// SGR 0: drop every color and attribute back to the terminal default.
pub const RESET: &str = "\x1b[0m";

/// SGR selector for the foreground channel.
const FG: u8 = 38;

/// SGR selector for the background channel.
const BG: u8 = 48;

// ─── Color Codes ─────────────────────────────────────────────────────────────

fn push_palette(out: &mut String, channel: u8, index: i16) {
    // Writing into a String never fails.
    let _ = write!(out, "\x1b[{channel};5;{index}m");
}

fn push_rgb(out: &mut String, channel: u8, red: i16, green: i16, blue: i16) {
    let _ = write!(out, "\x1b[{channel};2;{red};{green};{blue}m");
}

/// Foreground from the 256-color palette: `ESC[38;5;Nm`.
#[inline]
pub fn push_fg_palette(out: &mut String, index: i16) {
    push_palette(out, FG, index);
}

/// Background from the 256-color palette: `ESC[48;5;Nm`.
#[inline]
pub fn push_bg_palette(out: &mut String, index: i16) {
    push_palette(out, BG, index);
}

/// 24-bit foreground: `ESC[38;2;R;G;Bm`.
#[inline]
pub fn push_fg_rgb(out: &mut String, red: i16, green: i16, blue: i16) {
    push_rgb(out, FG, red, green, blue);
}

/// 24-bit background: `ESC[48;2;R;G;Bm`.
#[inline]
pub fn push_bg_rgb(out: &mut String, red: i16, green: i16, blue: i16) {
    push_rgb(out, BG, red, green, blue);
}

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to row `y`, column `x` (CUP).
///
/// Negative coordinates are clamped to the first row/column.
#[inline]
pub fn cursor_to(w: &mut impl Write, y: i32, x: i32) -> io::Result<()> {
    let row = i64::from(y.max(0)) + 1;
    let col = i64::from(x.max(0)) + 1;
    write!(w, "\x1b[{row};{col}H")
}

/// Move the cursor to the top-left corner.
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2) and home the cursor.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J\x1b[H")
}

/// Reset all SGR attributes.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(RESET.as_bytes())
}

/// Set the window title (OSC 0).
pub fn set_title(w: &mut impl Write, title: &str) -> io::Result<()> {
    // Control characters inside OSC would terminate or corrupt the sequence.
    let clean: String = title.chars().filter(|c| !c.is_control()).collect();
    write!(w, "\x1b]0;{clean}\x07")
}

/// Ask the terminal window to resize to `rows × cols` (xterm window ops).
///
/// Terminals that do not implement window manipulation ignore it.
#[inline]
pub fn resize_window(w: &mut impl Write, rows: i32, cols: i32) -> io::Result<()> {
    write!(w, "\x1b[8;{rows};{cols}t")
}

/// Enter the alternate screen buffer (DEC Private Mode 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Leave the alternate screen buffer.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
