// SPDX-License-Identifier: MIT
//
// Buffer: the one mutable text surface.
//
// Everything a session draws lands here first: characters are written at the
// cursor, the cursor advances and wraps, and on refresh the whole grid is
// flattened into a single string that the console blits in one call.
//
// Two grid representations, never both at once:
//
//   Grid::Plain(Vec<char>)     color system off. One char per cell.
//   Grid::Color(Vec<Cell>)     color system on. Glyph + pair index per cell.
//
// A buffer starts plain. Turning color on migrates the grid exactly once,
// tagging every existing glyph with the default pair. There is no way back:
// the color system cannot be stopped.
//
// Storage is flat and row-major (`index = y * cols + x`), the same layout the
// flattener walks, so a frame is one linear scan.
//
// Flattening:
//
//   plain:  row0 '\n' row1 '\n' ... rowN
//   color:  code(pair of first cell) + for each cell: [diff(prev, cell)] glyph
//           with '\n' between rows
//
// The diff code is emitted only where the pair changes from one cell to the
// next, so a uniformly colored row costs one escape prologue and nothing
// else. Row separators do not reset the tracked pair.
//
// Write boundaries:
//
//   Writing into the last column wraps to the next row. On the last row the
//   wrap is a no-op, so the cursor stays in the bottom-right cell and every
//   further glyph overwrites it. Nothing scrolls.

use std::fmt;

use crate::cell::Cell;
use crate::color::{ColorIndex, ColorManager, ColorPair, DEFAULT_PAIR, PairIndex, Rgb};
use crate::cursor::Cursor;
use crate::point::{Point, Size};

// ─── Grid ────────────────────────────────────────────────────────────────────

/// Cell storage in one of two representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grid {
    /// Bare glyphs; used while the color system is off.
    Plain(Vec<char>),
    /// Glyphs tagged with a color pair.
    Color(Vec<Cell>),
}

impl Grid {
    /// A blank grid of `area` cells in the requested representation.
    #[must_use]
    pub fn blank(area: usize, color: bool) -> Self {
        if color {
            Self::Color(vec![Cell::BLANK; area])
        } else {
            Self::Plain(vec![' '; area])
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_color(&self) -> bool {
        matches!(self, Self::Color(_))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Plain(chars) => chars.len(),
            Self::Color(cells) => cells.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Promote a plain grid to a colored one, tagging every glyph with the
    /// default pair. A colored grid is left as is.
    pub fn migrate_to_color(&mut self) {
        if let Self::Plain(chars) = self {
            let cells = chars.iter().copied().map(Cell::plain).collect();
            *self = Self::Color(cells);
        }
    }

    /// Blank every cell, keeping the representation.
    pub fn clear(&mut self) {
        match self {
            Self::Plain(chars) => chars.fill(' '),
            Self::Color(cells) => cells.fill(Cell::BLANK),
        }
    }

    fn symbol(&self, index: usize) -> Option<char> {
        match self {
            Self::Plain(chars) => chars.get(index).copied(),
            Self::Color(cells) => cells.get(index).map(|cell| cell.symbol),
        }
    }

    fn set(&mut self, index: usize, symbol: char, pair: PairIndex) {
        match self {
            Self::Plain(chars) => {
                if let Some(slot) = chars.get_mut(index) {
                    *slot = symbol;
                }
            }
            Self::Color(cells) => {
                if let Some(slot) = cells.get_mut(index) {
                    *slot = Cell::new(symbol, pair);
                }
            }
        }
    }
}

// ─── Buffer ──────────────────────────────────────────────────────────────────

/// The screen grid, its write cursor, and its color registry.
///
/// ```
/// use w_term::buffer::Buffer;
/// use w_term::point::{Point, Size};
///
/// let mut buf = Buffer::new(Size::new(2, 3));
/// buf.print("hey!");
/// buf.refresh_screen_buffer();
///
/// assert_eq!(buf.screen_buffer(), "hey\n!  ");
/// assert_eq!(buf.cursor_position(), Point::new(1, 1));
/// ```
#[derive(Debug, Clone)]
pub struct Buffer {
    size: Size,
    grid: Grid,
    cursor: Cursor,
    colors: ColorManager,
    screen: String,
}

impl Buffer {
    // ─── Construction ────────────────────────────────────────────────────

    /// A blank plain buffer. Dimensions below 1 are raised to 1.
    #[must_use]
    pub fn new(size: Size) -> Self {
        let mut buffer = Self {
            size: Size::MIN,
            grid: Grid::Plain(Vec::new()),
            cursor: Cursor::new(),
            colors: ColorManager::new(),
            screen: String::new(),
        };
        buffer.resize(size);
        buffer
    }

    #[must_use]
    pub fn with_dimensions(rows: i32, cols: i32) -> Self {
        Self::new(Size::new(rows, cols))
    }

    /// Replace the grid with a blank one of the new size.
    ///
    /// All content is discarded, the flattened string included. The cursor
    /// keeps its position if it still fits, otherwise it returns to the
    /// origin.
    pub fn resize(&mut self, size: Size) {
        let size = size.clamped();
        self.size = size;
        self.grid = Grid::blank(size.area(), self.colors.is_started());
        self.screen.clear();
        self.cursor.set_limit(size.rows, size.cols);
        log::debug!("buffer: resized to {size}");
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn cursor_position(&self) -> Point {
        self.cursor.position()
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    #[must_use]
    pub const fn colors(&self) -> &ColorManager {
        &self.colors
    }

    /// Whether the grid holds colored cells.
    #[inline]
    #[must_use]
    pub const fn is_color(&self) -> bool {
        self.grid.is_color()
    }

    /// The glyph at `(y, x)`, or `None` outside the grid.
    #[must_use]
    pub fn symbol_at(&self, y: i32, x: i32) -> Option<char> {
        self.index(y, x).and_then(|i| self.grid.symbol(i))
    }

    /// The pair at `(y, x)`. `None` outside the grid or while the grid is
    /// plain.
    #[must_use]
    pub fn pair_at(&self, y: i32, x: i32) -> Option<PairIndex> {
        let index = self.index(y, x)?;
        match &self.grid {
            Grid::Plain(_) => None,
            Grid::Color(cells) => cells.get(index).map(|cell| cell.pair),
        }
    }

    /// The string produced by the last [`refresh_screen_buffer`](Self::refresh_screen_buffer).
    #[inline]
    #[must_use]
    pub fn screen_buffer(&self) -> &str {
        &self.screen
    }

    /// The SGR reset sequence.
    #[inline]
    #[must_use]
    pub const fn reset_code(&self) -> &'static str {
        ColorManager::reset_code()
    }

    fn index(&self, y: i32, x: i32) -> Option<usize> {
        if !self.cursor.is_point_in_range(y, x) {
            return None;
        }
        let y = usize::try_from(y).ok()?;
        let x = usize::try_from(x).ok()?;
        Some(y * self.cols() + x)
    }

    fn cols(&self) -> usize {
        usize::try_from(self.size.cols).unwrap_or(1)
    }

    // ─── Writing ─────────────────────────────────────────────────────────

    /// Write one character at the cursor and advance.
    ///
    /// `'\n'` wraps without storing anything. Any other character is stored
    /// with the active pair, then the cursor moves right, or wraps if the
    /// character landed in the last column.
    pub fn put(&mut self, ch: char) -> &mut Self {
        if self.cursor.x() >= self.size.cols {
            self.new_line();
        }

        if ch == '\n' {
            self.new_line();
            return self;
        }

        self.sync_grid();

        let position = self.cursor.position();
        if let Some(index) = self.index(position.y, position.x) {
            self.grid.set(index, ch, self.colors.active_pair());
        }

        if self.cursor.is_at_right() {
            self.new_line();
        } else {
            self.cursor.move_right();
        }
        self
    }

    /// Write every character of `text` in order.
    pub fn print(&mut self, text: &str) -> &mut Self {
        for ch in text.chars() {
            self.put(ch);
        }
        self
    }

    /// Write the `Display` form of a value (numbers, mostly).
    pub fn print_value(&mut self, value: impl fmt::Display) -> &mut Self {
        // `write_str` below never fails.
        let _ = fmt::Write::write_fmt(self, format_args!("{value}"));
        self
    }

    /// Move to column 0 of the next row. No-op on the last row.
    pub fn new_line(&mut self) {
        if !self.cursor.is_at_bottom() {
            self.cursor.move_down();
            self.cursor.reset_x();
        }
    }

    /// Blank every cell and home the cursor.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.cursor.reset();
    }

    /// Promote the grid if color came on since it was allocated.
    fn sync_grid(&mut self) {
        if self.colors.is_started() && !self.grid.is_color() {
            self.grid.migrate_to_color();
            log::debug!("buffer: migrated {} cells to color", self.grid.len());
        }
    }

    // ─── Cursor ──────────────────────────────────────────────────────────

    /// Move the write head. Out-of-range targets leave it where it is.
    pub const fn move_to(&mut self, y: i32, x: i32) -> bool {
        self.cursor.move_to(y, x)
    }

    /// Move the write head relative to where it is.
    pub const fn move_by(&mut self, dy: i32, dx: i32) -> bool {
        self.cursor.move_by(dy, dx)
    }

    // ─── Flattening ──────────────────────────────────────────────────────

    /// Rebuild the flattened frame from the grid.
    pub fn refresh_screen_buffer(&mut self) {
        let cols = self.cols();
        self.screen.clear();

        match &self.grid {
            Grid::Plain(chars) => {
                for (row, glyphs) in chars.chunks(cols).enumerate() {
                    if row > 0 {
                        self.screen.push('\n');
                    }
                    self.screen.extend(glyphs);
                }
            }
            Grid::Color(cells) => {
                let mut current = cells.first().map_or(DEFAULT_PAIR, |cell| cell.pair);
                self.screen.push_str(&self.colors.make_color_code(current));

                for (row, line) in cells.chunks(cols).enumerate() {
                    if row > 0 {
                        self.screen.push('\n');
                    }
                    for cell in line {
                        if cell.pair != current {
                            self.screen
                                .push_str(&self.colors.make_color_diff(current, cell.pair));
                            current = cell.pair;
                        }
                        self.screen.push(cell.symbol);
                    }
                }
            }
        }

        log::trace!("buffer: flattened {} bytes", self.screen.len());
    }

    // ─── Color ───────────────────────────────────────────────────────────

    /// Turn the color system on and promote the grid. No-op once on.
    pub fn start_color(&mut self) {
        if self.colors.is_started() {
            return;
        }
        self.colors.start_color();
        self.sync_grid();
    }

    pub fn init_color(&mut self, index: ColorIndex, rgb: Rgb) {
        self.colors.init_color(index, rgb);
    }

    pub fn init_pair(&mut self, index: PairIndex, pair: ColorPair) {
        self.colors.init_pair(index, pair);
    }

    pub fn init_default_pair(&mut self, index: PairIndex) {
        self.colors.init_default_pair(index);
    }

    pub fn set_active_pair(&mut self, index: PairIndex) {
        self.colors.set_active_pair(index);
    }

    pub fn reset_to_default_pair(&mut self) {
        self.colors.reset_to_default();
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        self.put(c);
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
