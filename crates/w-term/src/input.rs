// SPDX-License-Identifier: MIT
//
// Keyboard input: raw bytes in, curses-style keys out.
//
// Two byte dialects are understood, because the same program may sit on a
// VT terminal or on a Windows console that reports special keys the DOS way:
//
//   - VT/ANSI: printable ASCII, UTF-8, C0 control bytes, and the CSI/SS3
//     escape sequences terminals send for arrows, editing keys, and F-keys.
//
//   - Windows console: special keys arrive as two bytes, a prefix (0 or 224)
//     followed by a scan code. 224 doubles as a UTF-8 lead byte, so it is
//     only read as a prefix when the next byte cannot continue a UTF-8
//     sequence.
//
// Every key has an integer `code()` compatible with ncurses (`KEY_UP` = 259,
// `ERR` = -1, printable characters are themselves), so callers that compare
// against curses constants keep working.
//
// The decoder keeps a small byte buffer because one sequence may span two
// reads. A lone ESC is ambiguous until more bytes arrive or a timeout
// passes; `flush` resolves it as the Escape key.

use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use crate::reader::StdinReader;

/// How long a lone ESC waits for the rest of a sequence.
const ESC_TIMEOUT: Duration = Duration::from_millis(25);

/// Windows console prefix for function keys.
const SCAN_PREFIX_F: u8 = 0;

/// Windows console prefix for arrows and editing keys.
const SCAN_PREFIX_FN: u8 = 224;

const ESC: u8 = 0x1B;

// ─── Key ─────────────────────────────────────────────────────────────────────

/// A decoded keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character.
    Char(char),
    /// Ctrl + letter, carried as the lowercase letter (`Ctrl(b'l')`).
    Ctrl(u8),
    Enter,
    Tab,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Insert,
    Delete,
    /// F1 through F12.
    F(u8),
    /// No key available (no-delay mode), or an unrecognized sequence.
    Error,
}

impl Key {
    /// The ncurses-compatible integer code for this key.
    ///
    /// ```
    /// use w_term::input::Key;
    ///
    /// assert_eq!(Key::Char('a').code(), 97);
    /// assert_eq!(Key::Up.code(), 259);
    /// assert_eq!(Key::F(1).code(), 265);
    /// assert_eq!(Key::Error.code(), -1);
    /// ```
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            // Every char fits: the largest scalar value is 0x10FFFF.
            Self::Char(ch) => i32::try_from(u32::from(ch)).unwrap_or(-1),
            Self::Ctrl(letter) => i32::from(letter & 0x1F),
            Self::Tab => 9,
            Self::Enter => 10,
            Self::Escape => 27,
            Self::Down => 258,
            Self::Up => 259,
            Self::Left => 260,
            Self::Right => 261,
            Self::Backspace => 263,
            Self::F(n @ 1..=12) => 264 + i32::from(n),
            Self::Delete => 330,
            Self::Insert => 331,
            Self::PageDown => 338,
            Self::PageUp => 339,
            Self::F(_) | Self::Error => -1,
        }
    }
}

// ─── KeyDecoder ──────────────────────────────────────────────────────────────

/// Incremental byte-to-key decoder.
///
/// ```
/// use w_term::input::{Key, KeyDecoder};
///
/// let mut decoder = KeyDecoder::new();
/// assert_eq!(decoder.advance(b"a\x1b[A"), vec![Key::Char('a'), Key::Up]);
/// assert_eq!(decoder.advance(&[224, 72]), vec![Key::Up]);
///
/// assert!(decoder.advance(b"\x1b").is_empty());
/// assert_eq!(decoder.flush(), vec![Key::Escape]);
/// ```
#[derive(Debug, Default)]
pub struct KeyDecoder {
    buf: Vec<u8>,
}

impl KeyDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and return every key they complete.
    ///
    /// Trailing bytes of an unfinished sequence stay buffered.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Key> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match decode(&self.buf[pos..]) {
                Decoded::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Decoded::Incomplete => break,
                Decoded::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }
        keys
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve whatever is buffered as literal keys.
    ///
    /// ESC becomes [`Key::Escape`] and printable bytes become characters;
    /// anything else is dropped.
    pub fn flush(&mut self) -> Vec<Key> {
        let keys = self
            .buf
            .iter()
            .filter_map(|&byte| match byte {
                ESC => Some(Key::Escape),
                0x20..=0x7E => Some(Key::Char(char::from(byte))),
                _ => None,
            })
            .collect();
        self.buf.clear();
        keys
    }

    /// Forget buffered bytes.
    pub fn reset(&mut self) {
        self.buf.clear();
    }
}

// ─── Stateless Decoding ──────────────────────────────────────────────────────

enum Decoded {
    Key(Key, usize),
    Incomplete,
    Skip(usize),
}

fn decode(buf: &[u8]) -> Decoded {
    let Some(&lead) = buf.first() else {
        return Decoded::Skip(0);
    };

    match lead {
        ESC => decode_escape(buf),
        SCAN_PREFIX_F => decode_scan(buf),
        SCAN_PREFIX_FN => match buf.get(1) {
            None => Decoded::Incomplete,
            Some(0x80..=0xBF) => decode_utf8(buf),
            Some(_) => decode_scan(buf),
        },
        0x08 | 0x7F => Decoded::Key(Key::Backspace, 1),
        0x09 => Decoded::Key(Key::Tab, 1),
        0x0A | 0x0D => Decoded::Key(Key::Enter, 1),
        b @ 0x01..=0x1A => Decoded::Key(Key::Ctrl(b + b'a' - 1), 1),
        b @ 0x20..=0x7E => Decoded::Key(Key::Char(char::from(b)), 1),
        0xC0..=0xFF => decode_utf8(buf),
        _ => Decoded::Skip(1),
    }
}

/// Windows console two-byte special key.
fn decode_scan(buf: &[u8]) -> Decoded {
    let Some(&scan) = buf.get(1) else {
        return Decoded::Incomplete;
    };
    let key = scan_code_key(scan).unwrap_or_else(|| {
        log::trace!("input: unknown scan code {scan}");
        Key::Error
    });
    Decoded::Key(key, 2)
}

const fn scan_code_key(scan: u8) -> Option<Key> {
    Some(match scan {
        72 => Key::Up,
        80 => Key::Down,
        75 => Key::Left,
        77 => Key::Right,
        73 => Key::PageUp,
        81 => Key::PageDown,
        82 => Key::Insert,
        83 => Key::Delete,
        59..=68 => Key::F(scan - 58),
        133 => Key::F(11),
        134 => Key::F(12),
        _ => return None,
    })
}

fn decode_escape(buf: &[u8]) -> Decoded {
    match buf.get(1) {
        None => Decoded::Incomplete,
        Some(b'[') => decode_csi(buf),
        Some(b'O') => decode_ss3(buf),
        Some(_) => Decoded::Key(Key::Escape, 1),
    }
}

/// `ESC [ params final`.
fn decode_csi(buf: &[u8]) -> Decoded {
    let body = &buf[2..];
    let Some(end) = body.iter().position(|b| (0x40..=0x7E).contains(b)) else {
        return Decoded::Incomplete;
    };
    let consumed = 2 + end + 1;
    let params = &body[..end];
    let first = leading_number(params);

    let key = match body[end] {
        b'A' => Some(Key::Up),
        b'B' => Some(Key::Down),
        b'C' => Some(Key::Right),
        b'D' => Some(Key::Left),
        b'P' => Some(Key::F(1)),
        b'Q' => Some(Key::F(2)),
        b'R' => Some(Key::F(3)),
        b'S' => Some(Key::F(4)),
        b'~' => tilde_key(first),
        _ => None,
    };

    match key {
        Some(key) => Decoded::Key(key, consumed),
        None => {
            log::trace!("input: ignored CSI sequence {:?}", &buf[..consumed]);
            Decoded::Skip(consumed)
        }
    }
}

/// `ESC O final`.
fn decode_ss3(buf: &[u8]) -> Decoded {
    let Some(&last) = buf.get(2) else {
        return Decoded::Incomplete;
    };
    let key = match last {
        b'A' => Key::Up,
        b'B' => Key::Down,
        b'C' => Key::Right,
        b'D' => Key::Left,
        b'P' => Key::F(1),
        b'Q' => Key::F(2),
        b'R' => Key::F(3),
        b'S' => Key::F(4),
        _ => return Decoded::Skip(3),
    };
    Decoded::Key(key, 3)
}

const fn tilde_key(param: u16) -> Option<Key> {
    Some(match param {
        2 => Key::Insert,
        3 => Key::Delete,
        5 => Key::PageUp,
        6 => Key::PageDown,
        11 => Key::F(1),
        12 => Key::F(2),
        13 => Key::F(3),
        14 => Key::F(4),
        15 => Key::F(5),
        17 => Key::F(6),
        18 => Key::F(7),
        19 => Key::F(8),
        20 => Key::F(9),
        21 => Key::F(10),
        23 => Key::F(11),
        24 => Key::F(12),
        _ => return None,
    })
}

fn leading_number(params: &[u8]) -> u16 {
    params
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u16, |n, &b| n.saturating_mul(10).saturating_add(u16::from(b - b'0')))
}

fn decode_utf8(buf: &[u8]) -> Decoded {
    let len = utf8_char_len(buf[0]);
    if len == 0 {
        return Decoded::Skip(1);
    }
    if buf.len() < len {
        return Decoded::Incomplete;
    }
    match std::str::from_utf8(&buf[..len]).ok().and_then(|s| s.chars().next()) {
        Some(ch) => Decoded::Key(Key::Char(ch), len),
        None => Decoded::Skip(1),
    }
}

const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── InputManager ────────────────────────────────────────────────────────────

/// Keyboard front end: byte source, decoder, and a queue of decoded keys.
///
/// Without a byte source every read yields [`Key::Error`].
#[derive(Default)]
pub struct InputManager {
    /// Joined when the manager drops.
    reader: Option<StdinReader>,
    rx: Option<Receiver<Vec<u8>>>,
    decoder: KeyDecoder,
    pending: VecDeque<Key>,
    /// When the decoder's current partial sequence started.
    pending_since: Option<Instant>,
    /// The byte source has disconnected.
    closed: bool,
    no_delay: bool,
}

impl std::fmt::Debug for InputManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputManager")
            .field("stdin", &self.reader.is_some())
            .field("pending", &self.pending)
            .field("no_delay", &self.no_delay)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl InputManager {
    /// A manager with no byte source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager reading the process's stdin on a background thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader thread cannot be spawned.
    pub fn from_stdin() -> io::Result<Self> {
        let (reader, rx) = StdinReader::spawn()?;
        Ok(Self {
            reader: Some(reader),
            rx: Some(rx),
            ..Self::default()
        })
    }

    /// A manager fed from an arbitrary byte channel.
    #[must_use]
    pub fn from_receiver(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            rx: Some(rx),
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub const fn no_delay(&self) -> bool {
        self.no_delay
    }

    /// In no-delay mode reads return [`Key::Error`] instead of waiting.
    pub const fn set_no_delay(&mut self, enabled: bool) {
        self.no_delay = enabled;
    }

    /// Whether the byte source is gone and everything it sent has been read.
    ///
    /// Once true, every read yields [`Key::Error`] without waiting.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        (self.rx.is_none() || self.closed) && self.pending.is_empty() && !self.decoder.has_pending()
    }

    /// Next key, blocking unless no-delay mode is on.
    ///
    /// A partial escape sequence is held for up to `ESC_TIMEOUT` from the
    /// moment its first byte arrived, in both modes, so a sequence split
    /// across reads still decodes as one key.
    pub fn get_key(&mut self) -> Key {
        loop {
            if let Some(key) = self.pending.pop_front() {
                return key;
            }
            if self.closed {
                if !self.decoder.has_pending() {
                    return Key::Error;
                }
                self.flush_decoder();
                continue;
            }

            let Some(rx) = &self.rx else {
                return Key::Error;
            };

            let received = if self.no_delay {
                match rx.try_recv() {
                    Ok(chunk) => Some(chunk),
                    Err(TryRecvError::Empty) => None,
                    Err(TryRecvError::Disconnected) => {
                        self.mark_closed();
                        continue;
                    }
                }
            } else if self.decoder.has_pending() {
                match rx.recv_timeout(self.escape_wait()) {
                    Ok(chunk) => Some(chunk),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => {
                        self.mark_closed();
                        continue;
                    }
                }
            } else if let Ok(chunk) = rx.recv() {
                Some(chunk)
            } else {
                self.mark_closed();
                continue;
            };

            match received {
                Some(chunk) => self.feed(&chunk),
                None if !self.decoder.has_pending() => return Key::Error,
                None if self.no_delay && self.escape_wait() > Duration::ZERO => return Key::Error,
                None => self.flush_decoder(),
            }
        }
    }

    /// Next key as its ncurses integer code.
    pub fn get_ch(&mut self) -> i32 {
        self.get_key().code()
    }

    /// Discard everything typed but not yet read.
    pub fn flush(&mut self) {
        if let Some(rx) = &self.rx {
            loop {
                match rx.try_recv() {
                    Ok(_) => {}
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.closed = true;
                        break;
                    }
                }
            }
        }
        self.decoder.reset();
        self.pending_since = None;
        self.pending.clear();
    }

    fn feed(&mut self, chunk: &[u8]) {
        let was_pending = self.decoder.has_pending();
        self.pending.extend(self.decoder.advance(chunk));
        if !self.decoder.has_pending() {
            self.pending_since = None;
        } else if !was_pending {
            self.pending_since = Some(Instant::now());
        }
    }

    fn flush_decoder(&mut self) {
        self.pending.extend(self.decoder.flush());
        self.pending_since = None;
    }

    fn mark_closed(&mut self) {
        if !self.closed {
            log::debug!("input: byte source closed");
        }
        self.closed = true;
    }

    /// How much longer a partial sequence may wait for its next byte.
    fn escape_wait(&self) -> Duration {
        self.pending_since
            .map_or(Duration::ZERO, |since| ESC_TIMEOUT.saturating_sub(since.elapsed()))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    fn decode_all(data: &[u8]) -> Vec<Key> {
        let mut decoder = KeyDecoder::new();
        let mut keys = decoder.advance(data);
        keys.extend(decoder.flush());
        keys
    }

    fn one(data: &[u8]) -> Key {
        let keys = decode_all(data);
        assert_eq!(keys.len(), 1, "expected one key from {data:?}, got {keys:?}");
        keys[0]
    }

    // ── Codes ───────────────────────────────────────────────────────────

    #[test]
    fn ncurses_codes() {
        assert_eq!(Key::Tab.code(), 9);
        assert_eq!(Key::Enter.code(), 10);
        assert_eq!(Key::Escape.code(), 27);
        assert_eq!(Key::Down.code(), 258);
        assert_eq!(Key::Left.code(), 260);
        assert_eq!(Key::Right.code(), 261);
        assert_eq!(Key::Backspace.code(), 263);
        assert_eq!(Key::F(12).code(), 276);
        assert_eq!(Key::Delete.code(), 330);
        assert_eq!(Key::Insert.code(), 331);
        assert_eq!(Key::PageDown.code(), 338);
        assert_eq!(Key::PageUp.code(), 339);
    }

    #[test]
    fn printable_code_is_ascii_value() {
        assert_eq!(Key::Char(' ').code(), 32);
        assert_eq!(Key::Char('~').code(), 126);
        assert_eq!(Key::Char('é').code(), 0xE9);
    }

    #[test]
    fn ctrl_code_is_control_byte() {
        assert_eq!(Key::Ctrl(b'l').code(), 12);
    }

    #[test]
    fn out_of_range_function_key_is_error() {
        assert_eq!(Key::F(13).code(), -1);
        assert_eq!(Key::F(0).code(), -1);
    }

    // ── ASCII and control bytes ─────────────────────────────────────────

    #[test]
    fn printable_ascii() {
        assert_eq!(decode_all(b"aZ~ "), vec![
            Key::Char('a'),
            Key::Char('Z'),
            Key::Char('~'),
            Key::Char(' '),
        ]);
    }

    #[test]
    fn control_keys() {
        assert_eq!(one(&[8]), Key::Backspace);
        assert_eq!(one(&[127]), Key::Backspace);
        assert_eq!(one(&[9]), Key::Tab);
        assert_eq!(one(&[13]), Key::Enter);
        assert_eq!(one(&[10]), Key::Enter);
        assert_eq!(one(&[12]), Key::Ctrl(b'l'));
    }

    #[test]
    fn utf8_characters() {
        assert_eq!(one("é".as_bytes()), Key::Char('é'));
        assert_eq!(one("€".as_bytes()), Key::Char('€'));
        assert_eq!(one("🦀".as_bytes()), Key::Char('🦀'));
    }

    #[test]
    fn utf8_split_across_reads() {
        let bytes = "€".as_bytes();
        let mut decoder = KeyDecoder::new();
        assert!(decoder.advance(&bytes[..1]).is_empty());
        assert!(decoder.has_pending());
        assert_eq!(decoder.advance(&bytes[1..]), vec![Key::Char('€')]);
    }

    // ── Windows scan codes ──────────────────────────────────────────────

    #[test]
    fn scan_code_arrows() {
        assert_eq!(one(&[224, 72]), Key::Up);
        assert_eq!(one(&[224, 80]), Key::Down);
        assert_eq!(one(&[224, 75]), Key::Left);
        assert_eq!(one(&[224, 77]), Key::Right);
    }

    #[test]
    fn scan_code_editing_keys() {
        assert_eq!(one(&[224, 73]), Key::PageUp);
        assert_eq!(one(&[224, 81]), Key::PageDown);
        assert_eq!(one(&[224, 82]), Key::Insert);
        assert_eq!(one(&[224, 83]), Key::Delete);
    }

    #[test]
    fn scan_code_function_keys() {
        assert_eq!(one(&[0, 59]), Key::F(1));
        assert_eq!(one(&[0, 68]), Key::F(10));
        assert_eq!(one(&[224, 133]), Key::F(11));
        assert_eq!(one(&[224, 134]), Key::F(12));
    }

    #[test]
    fn unknown_scan_code_is_error() {
        assert_eq!(one(&[0, 1]), Key::Error);
    }

    #[test]
    fn lone_prefix_waits_for_scan_code() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.advance(&[224]).is_empty());
        assert_eq!(decoder.advance(&[72]), vec![Key::Up]);
    }

    // ── Escape sequences ────────────────────────────────────────────────

    #[test]
    fn csi_arrows() {
        assert_eq!(one(b"\x1b[A"), Key::Up);
        assert_eq!(one(b"\x1b[B"), Key::Down);
        assert_eq!(one(b"\x1b[C"), Key::Right);
        assert_eq!(one(b"\x1b[D"), Key::Left);
    }

    #[test]
    fn csi_arrows_with_modifiers() {
        assert_eq!(one(b"\x1b[1;5A"), Key::Up);
    }

    #[test]
    fn csi_tilde_keys() {
        assert_eq!(one(b"\x1b[2~"), Key::Insert);
        assert_eq!(one(b"\x1b[3~"), Key::Delete);
        assert_eq!(one(b"\x1b[5~"), Key::PageUp);
        assert_eq!(one(b"\x1b[6~"), Key::PageDown);
        assert_eq!(one(b"\x1b[15~"), Key::F(5));
        assert_eq!(one(b"\x1b[24~"), Key::F(12));
    }

    #[test]
    fn ss3_keys() {
        assert_eq!(one(b"\x1bOP"), Key::F(1));
        assert_eq!(one(b"\x1bOS"), Key::F(4));
        assert_eq!(one(b"\x1bOA"), Key::Up);
    }

    #[test]
    fn unknown_csi_is_skipped() {
        assert_eq!(decode_all(b"\x1b[99zq"), vec![Key::Char('q')]);
    }

    #[test]
    fn lone_escape_resolves_on_flush() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.advance(b"\x1b").is_empty());
        assert_eq!(decoder.flush(), vec![Key::Escape]);
        assert!(!decoder.has_pending());
    }

    #[test]
    fn escape_followed_by_text() {
        assert_eq!(decode_all(b"\x1bx"), vec![Key::Escape, Key::Char('x')]);
    }

    #[test]
    fn csi_split_across_reads() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.advance(b"\x1b[").is_empty());
        assert_eq!(decoder.advance(b"A"), vec![Key::Up]);
    }

    // ── InputManager ────────────────────────────────────────────────────

    #[test]
    fn no_source_yields_error() {
        let mut input = InputManager::new();
        assert_eq!(input.get_key(), Key::Error);
        assert_eq!(input.get_ch(), -1);
    }

    #[test]
    fn reads_keys_in_order() {
        let (tx, rx) = mpsc::channel();
        let mut input = InputManager::from_receiver(rx);
        tx.send(b"ab\x1b[A".to_vec()).unwrap();

        assert_eq!(input.get_key(), Key::Char('a'));
        assert_eq!(input.get_ch(), 98);
        assert_eq!(input.get_key(), Key::Up);
    }

    #[test]
    fn no_delay_returns_error_when_idle() {
        let (_tx, rx) = mpsc::channel::<Vec<u8>>();
        let mut input = InputManager::from_receiver(rx);
        input.set_no_delay(true);
        assert!(input.no_delay());
        assert_eq!(input.get_key(), Key::Error);
    }

    #[test]
    fn blocking_read_resolves_lone_escape_after_timeout() {
        let (tx, rx) = mpsc::channel();
        let mut input = InputManager::from_receiver(rx);
        tx.send(vec![ESC]).unwrap();
        assert_eq!(input.get_key(), Key::Escape);
    }

    #[test]
    fn disconnected_source_yields_error() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        drop(tx);
        let mut input = InputManager::from_receiver(rx);
        assert!(!input.is_closed());
        assert_eq!(input.get_key(), Key::Error);
        assert!(input.is_closed());
    }

    #[test]
    fn closed_source_never_blocks() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        drop(tx);
        let mut input = InputManager::from_receiver(rx);

        let started = Instant::now();
        for _ in 0..10_000 {
            assert_eq!(input.get_key(), Key::Error);
        }
        assert!(input.is_closed());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn bytes_sent_before_close_are_still_read() {
        let (tx, rx) = mpsc::channel();
        let mut input = InputManager::from_receiver(rx);
        tx.send(vec![b'a', ESC]).unwrap();
        drop(tx);

        assert_eq!(input.get_key(), Key::Char('a'));
        assert!(!input.is_closed());
        assert_eq!(input.get_key(), Key::Escape);
        assert_eq!(input.get_key(), Key::Error);
        assert!(input.is_closed());
    }

    #[test]
    fn no_source_counts_as_closed() {
        assert!(InputManager::new().is_closed());
    }

    // ── No-delay escape timing ──────────────────────────────────────────

    #[test]
    fn no_delay_joins_escape_split_across_reads() {
        let (tx, rx) = mpsc::channel();
        let mut input = InputManager::from_receiver(rx);
        input.set_no_delay(true);

        tx.send(vec![ESC]).unwrap();
        assert_eq!(input.get_key(), Key::Error);

        tx.send(b"[A".to_vec()).unwrap();
        assert_eq!(input.get_key(), Key::Up);
        assert_eq!(input.get_key(), Key::Error);
    }

    #[test]
    fn no_delay_resolves_lone_escape_after_timeout() {
        let (tx, rx) = mpsc::channel();
        let mut input = InputManager::from_receiver(rx);
        input.set_no_delay(true);

        tx.send(vec![ESC]).unwrap();
        assert_eq!(input.get_key(), Key::Error);

        std::thread::sleep(ESC_TIMEOUT * 2);
        assert_eq!(input.get_key(), Key::Escape);
        assert_eq!(input.get_key(), Key::Error);
    }

    #[test]
    fn flush_discards_pending_input() {
        let (tx, rx) = mpsc::channel();
        let mut input = InputManager::from_receiver(rx);
        tx.send(b"abc".to_vec()).unwrap();
        assert_eq!(input.get_key(), Key::Char('a'));

        tx.send(b"def".to_vec()).unwrap();
        input.flush();
        input.set_no_delay(true);
        assert_eq!(input.get_key(), Key::Error);
    }
}
