// SPDX-License-Identifier: MIT
//
// Cell: one position of a colored grid.
//
// A Cell is a glyph plus the pair it is drawn with. It carries no colors of
// its own: the pair index is resolved through the ColorManager only when the
// grid is flattened, so re-registering a pair recolors every cell that uses
// it on the next refresh.
//
// The plain (color-off) grid stores bare `char`s and never needs this type.

use crate::color::{DEFAULT_PAIR, PairIndex};

/// A glyph and the color pair it renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub symbol: char,
    pub pair: PairIndex,
}

impl Cell {
    /// A space drawn with the default pair.
    pub const BLANK: Self = Self {
        symbol: ' ',
        pair: DEFAULT_PAIR,
    };

    #[inline]
    #[must_use]
    pub const fn new(symbol: char, pair: PairIndex) -> Self {
        Self { symbol, pair }
    }

    /// A glyph drawn with the default pair. Used when a plain grid is
    /// promoted to a colored one.
    #[inline]
    #[must_use]
    pub const fn plain(symbol: char) -> Self {
        Self::new(symbol, DEFAULT_PAIR)
    }

    #[inline]
    #[must_use]
    pub const fn is_blank(self) -> bool {
        self.symbol == ' ' && self.pair == DEFAULT_PAIR
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}
