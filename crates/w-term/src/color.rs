// SPDX-License-Identifier: MIT
//
// Color pairs, custom colors, and the escape codes that select them.
//
// The model is the curses one: text is drawn with a *color pair* (a
// foreground and a background), pairs are registered under small integer
// indices, and pair 0 is the reserved default. A pair's two channels are
// color references; if a reference has been registered as a custom RGB
// color it renders as 24-bit truecolor, otherwise it is taken as an index
// into the terminal's 256-color palette.
//
// Two encoders:
//
//   make_color_code(pair)       : absolute: always emits both channels.
//   make_color_diff(prev, next)    delta: emits only the channels whose
//                                  references differ between the pairs.
//
// The flattener seeds each frame with one absolute code and then walks the
// grid emitting deltas, so a run of same-colored cells costs nothing.
//
// Nothing here reports errors. Until `start_color` is called every mutator
// is a no-op and every encoder returns an empty string; invalid indices and
// out-of-range channels are dropped silently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ansi;

/// Key of a registered color pair. `0` is the reserved default pair.
pub type PairIndex = i16;

/// Key of a custom RGB color, and the type of a pair's channel references.
pub type ColorIndex = i16;

/// The reserved default pair.
pub const DEFAULT_PAIR: PairIndex = 0;

/// Highest pair index accepted by [`ColorManager::init_pair`].
pub const MAX_PAIR: PairIndex = 255;

/// The SGR reset sequence.
pub const RESET_CODE: &str = ansi::RESET;

// ─── Rgb ─────────────────────────────────────────────────────────────────────

/// A custom color. Channels must lie in `0..=255` to be accepted.
///
/// Signed so that out-of-range requests can be expressed and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub red: i16,
    pub green: i16,
    pub blue: i16,
}

impl Rgb {
    #[inline]
    #[must_use]
    pub const fn new(red: i16, green: i16, blue: i16) -> Self {
        Self { red, green, blue }
    }

    /// Whether every channel is within `0..=255`.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        const fn in_range(channel: i16) -> bool {
            channel >= 0 && channel <= 255
        }
        in_range(self.red) && in_range(self.green) && in_range(self.blue)
    }
}

// ─── ColorPair ───────────────────────────────────────────────────────────────

/// A foreground/background combination of color references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorPair {
    pub foreground: ColorIndex,
    pub background: ColorIndex,
}

impl ColorPair {
    /// White on black in the 256-color palette.
    pub const DEFAULT: Self = Self::new(7, 0);

    #[inline]
    #[must_use]
    pub const fn new(foreground: ColorIndex, background: ColorIndex) -> Self {
        Self {
            foreground,
            background,
        }
    }
}

impl Default for ColorPair {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─── ColorManager ────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Channel {
    Foreground,
    Background,
}

/// Registry of color pairs and custom colors, plus the active pair.
///
/// ```
/// use w_term::color::{ColorManager, ColorPair};
///
/// let mut colors = ColorManager::new();
/// colors.start_color();
/// colors.init_pair(1, ColorPair::new(2, 3));
///
/// assert_eq!(colors.make_color_code(1), "\x1b[38;5;2m\x1b[48;5;3m");
/// // Only the background differs between pair 1 and {2, 0}.
/// colors.init_pair(2, ColorPair::new(2, 0));
/// assert_eq!(colors.make_color_diff(1, 2), "\x1b[48;5;0m");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ColorManager {
    pairs: HashMap<PairIndex, ColorPair>,
    custom_colors: HashMap<ColorIndex, Rgb>,
    active_pair: PairIndex,
    started: bool,
}

impl ColorManager {
    /// A manager in the uninitialized state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ─── State ───────────────────────────────────────────────────────────

    /// Enable the color system and (re)seed the default pair.
    ///
    /// Calling it again is harmless but overwrites any customized default
    /// pair with white on black.
    pub fn start_color(&mut self) {
        self.pairs.insert(DEFAULT_PAIR, ColorPair::DEFAULT);
        if !self.started {
            log::debug!("color: started");
        }
        self.started = true;
    }

    #[inline]
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// The pair new glyphs are drawn with.
    #[inline]
    #[must_use]
    pub const fn active_pair(&self) -> PairIndex {
        self.active_pair
    }

    /// Look up a registered pair.
    #[must_use]
    pub fn pair(&self, index: PairIndex) -> Option<ColorPair> {
        self.pairs.get(&index).copied()
    }

    /// Look up a registered custom color.
    #[must_use]
    pub fn custom_color(&self, index: ColorIndex) -> Option<Rgb> {
        self.custom_colors.get(&index).copied()
    }

    // ─── Registration ────────────────────────────────────────────────────

    /// Register a custom RGB color under `index`.
    ///
    /// Dropped if any channel is outside `0..=255`.
    pub fn init_color(&mut self, index: ColorIndex, rgb: Rgb) {
        if !self.started {
            return;
        }
        if !rgb.is_valid() {
            log::trace!("color: dropped custom color {index} with channels {rgb:?}");
            return;
        }
        self.custom_colors.insert(index, rgb);
    }

    /// Register a pair under `index`. Only `1..=255` is accepted; pair 0 is
    /// changed through [`init_default_pair`](Self::init_default_pair).
    pub fn init_pair(&mut self, index: PairIndex, pair: ColorPair) {
        if !self.started {
            return;
        }
        if index <= DEFAULT_PAIR || index > MAX_PAIR {
            log::trace!("color: dropped pair with index {index}");
            return;
        }
        self.pairs.insert(index, pair);
    }

    /// Copy a registered pair onto the default pair.
    pub fn init_default_pair(&mut self, index: PairIndex) {
        if !self.started || index == DEFAULT_PAIR {
            return;
        }
        if let Some(pair) = self.pair(index) {
            self.pairs.insert(DEFAULT_PAIR, pair);
        }
    }

    /// Make `index` the active pair, if it is registered.
    pub fn set_active_pair(&mut self, index: PairIndex) {
        if !self.started {
            return;
        }
        if self.pairs.contains_key(&index) {
            self.active_pair = index;
        } else {
            log::trace!("color: unknown pair {index} left active pair at {}", self.active_pair);
        }
    }

    /// Make the default pair active again.
    pub fn reset_to_default(&mut self) {
        if self.started {
            self.active_pair = DEFAULT_PAIR;
        }
    }

    // ─── Encoding ────────────────────────────────────────────────────────

    /// Escape codes that fully set foreground and background for `index`.
    ///
    /// Empty if the color system is off or the pair is unknown.
    #[must_use]
    pub fn make_color_code(&self, index: PairIndex) -> String {
        let mut code = String::new();
        if let Some(pair) = self.started_pair(index) {
            self.push_channel(&mut code, Channel::Foreground, pair.foreground);
            self.push_channel(&mut code, Channel::Background, pair.background);
        }
        code
    }

    /// Escape codes for only the channels that differ from `prev` to `next`.
    ///
    /// Empty if the color system is off, either pair is unknown, or the two
    /// pairs resolve to the same references.
    #[must_use]
    pub fn make_color_diff(&self, prev: PairIndex, next: PairIndex) -> String {
        let mut code = String::new();
        let (Some(from), Some(to)) = (self.started_pair(prev), self.started_pair(next)) else {
            return code;
        };

        if from.foreground != to.foreground {
            self.push_channel(&mut code, Channel::Foreground, to.foreground);
        }
        if from.background != to.background {
            self.push_channel(&mut code, Channel::Background, to.background);
        }
        code
    }

    /// The SGR reset sequence.
    #[inline]
    #[must_use]
    pub const fn reset_code() -> &'static str {
        RESET_CODE
    }

    fn started_pair(&self, index: PairIndex) -> Option<ColorPair> {
        if self.started { self.pair(index) } else { None }
    }

    /// Truecolor when the reference names a custom color, palette otherwise.
    fn push_channel(&self, out: &mut String, channel: Channel, color: ColorIndex) {
        match (self.custom_colors.get(&color), channel) {
            (Some(rgb), Channel::Foreground) => ansi::push_fg_rgb(out, rgb.red, rgb.green, rgb.blue),
            (Some(rgb), Channel::Background) => ansi::push_bg_rgb(out, rgb.red, rgb.green, rgb.blue),
            (None, Channel::Foreground) => ansi::push_fg_palette(out, color),
            (None, Channel::Background) => ansi::push_bg_palette(out, color),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
