// SPDX-License-Identifier: MIT
//
// Point and Size: the two plain value types every other module speaks.
//
// Coordinates are (y, x): row first, column second, both 0-indexed. This
// matches the curses calling convention (`move(y, x)`) rather than the
// (x, y) order used by graphics APIs.
//
// A Point carries no bounds of its own. Whoever owns it (the Cursor) decides
// what is in range. Size, on the other hand, has a hard floor: a grid is
// never smaller than 1×1, and requests below that are raised, not rejected.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

// ─── Point ───────────────────────────────────────────────────────────────────

/// A 2D coordinate: `y` is the row, `x` is the column.
///
/// Unconstrained on its own: negative and huge values are representable.
/// Arithmetic saturates at the ends of the `i32` range.
/// Range checks live in [`Cursor`](crate::cursor::Cursor).
///
/// ```
/// use w_term::point::Point;
///
/// let p = Point::new(2, 5) + Point::new(1, -1);
/// assert_eq!(p, Point::new(3, 4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub y: i32,
    pub x: i32,
}

impl Point {
    /// The origin, `(0, 0)`.
    pub const ZERO: Self = Self { y: 0, x: 0 };

    #[inline]
    #[must_use]
    pub const fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    /// Step both axes forward by one, saturating at `i32::MAX`.
    #[inline]
    pub const fn increment(&mut self) {
        self.y = self.y.saturating_add(1);
        self.x = self.x.saturating_add(1);
    }

    /// Step both axes back by one, saturating at `i32::MIN`.
    #[inline]
    pub const fn decrement(&mut self) {
        self.y = self.y.saturating_sub(1);
        self.x = self.x.saturating_sub(1);
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.y.saturating_add(rhs.y), self.x.saturating_add(rhs.x))
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.y.saturating_sub(rhs.y), self.x.saturating_sub(rhs.x))
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Point {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.y, self.x)
    }
}

// ─── Size ────────────────────────────────────────────────────────────────────

/// Grid dimensions in character cells.
///
/// Fields are signed so that a caller's undersized request (zero, negative)
/// can be expressed and then clamped with [`clamped`](Self::clamped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub rows: i32,
    pub cols: i32,
}

impl Size {
    /// The smallest legal grid.
    pub const MIN: Self = Self { rows: 1, cols: 1 };

    #[inline]
    #[must_use]
    pub const fn new(rows: i32, cols: i32) -> Self {
        Self { rows, cols }
    }

    /// Raise each dimension independently to at least 1.
    ///
    /// ```
    /// use w_term::point::Size;
    ///
    /// assert_eq!(Size::new(0, 40).clamped(), Size::new(1, 40));
    /// assert_eq!(Size::new(-3, -7).clamped(), Size::MIN);
    /// ```
    #[inline]
    #[must_use]
    pub const fn clamped(self) -> Self {
        Self {
            rows: if self.rows < Self::MIN.rows { Self::MIN.rows } else { self.rows },
            cols: if self.cols < Self::MIN.cols { Self::MIN.cols } else { self.cols },
        }
    }

    /// Total number of cells. Zero for degenerate sizes.
    #[must_use]
    pub fn area(self) -> usize {
        let rows = usize::try_from(self.rows).unwrap_or(0);
        let cols = usize::try_from(self.cols).unwrap_or(0);
        rows * cols
    }

    /// The exclusive upper bound a cursor over this grid may reach.
    #[inline]
    #[must_use]
    pub const fn as_limit(self) -> Point {
        Point::new(self.rows, self.cols)
    }
}

impl Default for Size {
    fn default() -> Self {
        Self { rows: 24, cols: 80 }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Point ───────────────────────────────────────────────────────────

    #[test]
    fn point_zero_is_origin() {
        assert_eq!(Point::ZERO, Point::new(0, 0));
        assert_eq!(Point::default(), Point::ZERO);
    }

    #[test]
    fn point_arithmetic() {
        let a = Point::new(3, 4);
        let b = Point::new(1, 2);
        assert_eq!(a + b, Point::new(4, 6));
        assert_eq!(a - b, Point::new(2, 2));

        let mut c = a;
        c += b;
        assert_eq!(c, Point::new(4, 6));
        c -= Point::new(10, 10);
        assert_eq!(c, Point::new(-6, -4));
    }

    #[test]
    fn point_increment_moves_both_axes() {
        let mut p = Point::new(1, 1);
        p.increment();
        assert_eq!(p, Point::new(2, 2));
        p.decrement();
        p.decrement();
        assert_eq!(p, Point::ZERO);
    }

    #[test]
    fn point_arithmetic_saturates() {
        let max = Point::new(i32::MAX, i32::MAX);
        let min = Point::new(i32::MIN, i32::MIN);
        assert_eq!(max + Point::new(1, 5), max);
        assert_eq!(min - Point::new(1, 5), min);
        assert_eq!(min + Point::new(-1, 0), min);

        let mut p = max;
        p.increment();
        assert_eq!(p, max);
        let mut q = min;
        q.decrement();
        assert_eq!(q, min);
    }

    #[test]
    fn point_display_is_y_then_x() {
        assert_eq!(Point::new(7, 2).to_string(), "(7, 2)");
    }

    // ── Size ────────────────────────────────────────────────────────────

    #[test]
    fn clamp_raises_each_axis_independently() {
        assert_eq!(Size::new(0, 0).clamped(), Size::MIN);
        assert_eq!(Size::new(5, 0).clamped(), Size::new(5, 1));
        assert_eq!(Size::new(-1, 9).clamped(), Size::new(1, 9));
        assert_eq!(Size::new(24, 80).clamped(), Size::new(24, 80));
    }

    #[test]
    fn area_of_regular_and_degenerate_sizes() {
        assert_eq!(Size::new(24, 80).area(), 1920);
        assert_eq!(Size::new(0, 80).area(), 0);
        assert_eq!(Size::new(-2, 80).area(), 0);
    }

    #[test]
    fn limit_mirrors_dimensions() {
        assert_eq!(Size::new(10, 20).as_limit(), Point::new(10, 20));
    }

    #[test]
    fn size_display() {
        assert_eq!(Size::new(24, 80).to_string(), "24x80");
    }
}
