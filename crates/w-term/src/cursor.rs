// SPDX-License-Identifier: MIT
//
// Cursor: a write head that can never leave its grid.
//
// The cursor owns a position and an exclusive limit. Every move is checked
// against `[0, limit.y) × [0, limit.x)`; an out-of-range request returns
// `false` and leaves the position untouched. The only way the position
// changes without being asked is when the limit shrinks underneath it, in
// which case the cursor snaps back to the origin.

use crate::point::Point;

/// Smallest legal limit on either axis.
const MIN_LIMIT: i32 = 1;

/// A bounded 2D position tracker.
///
/// ```
/// use w_term::cursor::Cursor;
/// use w_term::point::Point;
///
/// let mut cursor = Cursor::with_limit(Point::new(3, 10));
/// assert!(cursor.move_to(2, 9));
/// assert!(!cursor.move_to(3, 0)); // row 3 is past the last row
/// assert_eq!(cursor.position(), Point::new(2, 9));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    position: Point,
    limit: Point,
}

impl Cursor {
    /// A cursor at the origin with the minimal `(1, 1)` limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            position: Point::ZERO,
            limit: Point::new(MIN_LIMIT, MIN_LIMIT),
        }
    }

    /// A cursor at the origin with the given limit.
    ///
    /// An illegal limit (either axis below 1) is ignored and the default
    /// `(1, 1)` is kept.
    #[must_use]
    pub fn with_limit(limit: Point) -> Self {
        let mut cursor = Self::new();
        cursor.set_limit(limit.y, limit.x);
        cursor
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// The exclusive upper bound on each axis.
    #[inline]
    #[must_use]
    pub const fn limit(&self) -> Point {
        self.limit
    }

    #[inline]
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.position.y
    }

    #[inline]
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.position.x
    }

    /// Whether `(y, x)` lies inside `[0, limit.y) × [0, limit.x)`.
    #[inline]
    #[must_use]
    pub const fn is_point_in_range(&self, y: i32, x: i32) -> bool {
        y >= 0 && y < self.limit.y && x >= 0 && x < self.limit.x
    }

    // ─── Boundary Predicates ─────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn is_at_top(&self) -> bool {
        self.position.y == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_at_bottom(&self) -> bool {
        self.position.y == self.limit.y - 1
    }

    #[inline]
    #[must_use]
    pub const fn is_at_left(&self) -> bool {
        self.position.x == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_at_right(&self) -> bool {
        self.position.x == self.limit.x - 1
    }

    // ─── Movement ────────────────────────────────────────────────────────

    /// Move to `(y, x)` if it is in range.
    ///
    /// Returns `false` and leaves the position unchanged otherwise.
    pub const fn move_to(&mut self, y: i32, x: i32) -> bool {
        if !self.is_point_in_range(y, x) {
            return false;
        }
        self.position = Point::new(y, x);
        true
    }

    /// Move to a [`Point`]. Same rules as [`move_to`](Self::move_to).
    #[inline]
    pub const fn move_to_point(&mut self, target: Point) -> bool {
        self.move_to(target.y, target.x)
    }

    /// Move relative to the current position.
    pub const fn move_by(&mut self, dy: i32, dx: i32) -> bool {
        self.move_to(self.position.y.saturating_add(dy), self.position.x.saturating_add(dx))
    }

    /// Change the row only; the column is held fixed.
    #[inline]
    pub const fn set_y(&mut self, y: i32) -> bool {
        self.move_to(y, self.position.x)
    }

    /// Change the column only; the row is held fixed.
    #[inline]
    pub const fn set_x(&mut self, x: i32) -> bool {
        self.move_to(self.position.y, x)
    }

    #[inline]
    pub const fn move_up(&mut self) -> bool {
        self.set_y(self.position.y - 1)
    }

    #[inline]
    pub const fn move_down(&mut self) -> bool {
        self.set_y(self.position.y + 1)
    }

    #[inline]
    pub const fn move_left(&mut self) -> bool {
        self.set_x(self.position.x - 1)
    }

    #[inline]
    pub const fn move_right(&mut self) -> bool {
        self.set_x(self.position.x + 1)
    }

    /// Return to the origin. Always succeeds: the limit is never below 1.
    pub const fn reset(&mut self) {
        self.position = Point::ZERO;
    }

    /// Return to row 0, keeping the column.
    pub const fn reset_y(&mut self) {
        self.position.y = 0;
    }

    /// Return to column 0, keeping the row.
    pub const fn reset_x(&mut self) {
        self.position.x = 0;
    }

    /// Replace the limit.
    ///
    /// Rejected (returns `false`, nothing changes) if either bound is below
    /// 1. When the new limit no longer contains the current position, the
    /// position is forced back to `(0, 0)`.
    pub fn set_limit(&mut self, max_y: i32, max_x: i32) -> bool {
        if max_y < MIN_LIMIT || max_x < MIN_LIMIT {
            log::trace!("cursor: rejected limit ({max_y}, {max_x})");
            return false;
        }

        self.limit = Point::new(max_y, max_x);

        if !self.is_point_in_range(self.position.y, self.position.x) {
            self.reset();
        }

        true
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(rows: i32, cols: i32) -> Cursor {
        Cursor::with_limit(Point::new(rows, cols))
    }

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn new_cursor_has_minimal_limit() {
        let c = Cursor::new();
        assert_eq!(c.position(), Point::ZERO);
        assert_eq!(c.limit(), Point::new(1, 1));
    }

    #[test]
    fn with_illegal_limit_keeps_default() {
        let c = Cursor::with_limit(Point::new(0, 5));
        assert_eq!(c.limit(), Point::new(1, 1));
    }

    // ── Range ───────────────────────────────────────────────────────────

    #[test]
    fn range_is_half_open() {
        let c = cursor(3, 4);
        assert!(c.is_point_in_range(0, 0));
        assert!(c.is_point_in_range(2, 3));
        assert!(!c.is_point_in_range(3, 0));
        assert!(!c.is_point_in_range(0, 4));
        assert!(!c.is_point_in_range(-1, 0));
        assert!(!c.is_point_in_range(0, -1));
    }

    // ── Movement ────────────────────────────────────────────────────────

    #[test]
    fn move_inside_succeeds() {
        let mut c = cursor(5, 5);
        assert!(c.move_to(4, 4));
        assert_eq!(c.position(), Point::new(4, 4));
    }

    #[test]
    fn move_outside_fails_and_keeps_position() {
        let mut c = cursor(5, 5);
        c.move_to(2, 3);
        assert!(!c.move_to(5, 0));
        assert!(!c.move_to(0, -1));
        assert_eq!(c.position(), Point::new(2, 3));
    }

    #[test]
    fn move_by_is_relative() {
        let mut c = cursor(10, 10);
        c.move_to(5, 5);
        assert!(c.move_by(-2, 3));
        assert_eq!(c.position(), Point::new(3, 8));
        assert!(!c.move_by(0, 2));
        assert_eq!(c.position(), Point::new(3, 8));
    }

    #[test]
    fn move_by_extreme_delta_does_not_overflow() {
        let mut c = cursor(10, 10);
        c.move_to(5, 5);
        assert!(!c.move_by(i32::MAX, i32::MIN));
        assert_eq!(c.position(), Point::new(5, 5));
    }

    #[test]
    fn set_axis_holds_the_other_axis() {
        let mut c = cursor(10, 10);
        c.move_to(4, 6);
        assert!(c.set_y(9));
        assert_eq!(c.position(), Point::new(9, 6));
        assert!(c.set_x(0));
        assert_eq!(c.position(), Point::new(9, 0));
        assert!(!c.set_x(10));
        assert_eq!(c.position(), Point::new(9, 0));
    }

    #[test]
    fn single_steps_respect_edges() {
        let mut c = cursor(2, 2);
        assert!(!c.move_up());
        assert!(!c.move_left());
        assert!(c.move_down());
        assert!(c.move_right());
        assert!(!c.move_down());
        assert!(!c.move_right());
        assert_eq!(c.position(), Point::new(1, 1));
    }

    #[test]
    fn resets() {
        let mut c = cursor(10, 10);
        c.move_to(7, 8);
        c.reset_x();
        assert_eq!(c.position(), Point::new(7, 0));
        c.move_to(7, 8);
        c.reset_y();
        assert_eq!(c.position(), Point::new(0, 8));
        c.reset();
        assert_eq!(c.position(), Point::ZERO);
    }

    // ── Boundaries ──────────────────────────────────────────────────────

    #[test]
    fn boundary_predicates() {
        let mut c = cursor(3, 3);
        assert!(c.is_at_top());
        assert!(c.is_at_left());
        assert!(!c.is_at_bottom());
        assert!(!c.is_at_right());

        c.move_to(2, 2);
        assert!(c.is_at_bottom());
        assert!(c.is_at_right());
        assert!(!c.is_at_top());
        assert!(!c.is_at_left());
    }

    #[test]
    fn single_cell_grid_is_every_edge() {
        let c = cursor(1, 1);
        assert!(c.is_at_top() && c.is_at_bottom() && c.is_at_left() && c.is_at_right());
    }

    // ── Limit ───────────────────────────────────────────────────────────

    #[test]
    fn set_limit_rejects_below_one() {
        let mut c = cursor(5, 5);
        assert!(!c.set_limit(0, 5));
        assert!(!c.set_limit(5, -1));
        assert_eq!(c.limit(), Point::new(5, 5));
    }

    #[test]
    fn growing_limit_keeps_position() {
        let mut c = cursor(5, 5);
        c.move_to(3, 3);
        assert!(c.set_limit(10, 10));
        assert_eq!(c.position(), Point::new(3, 3));
    }

    #[test]
    fn shrinking_limit_below_position_resets_to_origin() {
        let mut c = cursor(10, 10);
        c.move_to(8, 2);
        assert!(c.set_limit(5, 5));
        assert_eq!(c.position(), Point::ZERO);
        assert_eq!(c.limit(), Point::new(5, 5));
    }
}
