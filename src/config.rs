// SPDX-License-Identifier: MIT
//
// Demo configuration.
//
// Sources, highest priority first:
//
//   1. command line   (--rows, --cols, --title, ...)
//   2. environment    (WCURSES_ROWS, WCURSES_COLS, WCURSES_TITLE)
//   3. config file    (--config FILE, or <config dir>/wcurses/config.toml)
//   4. defaults
//
// The file is TOML:
//
//   rows = 20
//   cols = 60
//   frame_delay_ms = 16
//
//   [session]
//   title = "wcurses demo"
//   alternate_screen = true
//
//   [[colors]]
//   index = 16
//   red = 255
//   green = 128
//   blue = 0
//
//   [[pairs]]
//   index = 1
//   foreground = 16
//   background = 0
//
// The color library itself drops bad indices silently. The demo is stricter
// and refuses to start on them, naming the offending field.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use w_term::color::{ColorIndex, ColorPair, MAX_PAIR, PairIndex, Rgb};
use w_term::point::Size;
use w_term::session::SessionOptions;

// ─── CLI ─────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "wcurses")]
#[command(version)]
#[command(about = "Curses-style drawing demo with diffed ANSI color output", long_about = None)]
pub struct CliArgs {
    /// Path to a TOML config file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Screen rows (defaults to the terminal height).
    #[arg(long, value_name = "ROWS")]
    pub rows: Option<i32>,

    /// Screen columns (defaults to the terminal width).
    #[arg(long, value_name = "COLS")]
    pub cols: Option<i32>,

    /// Window title.
    #[arg(short, long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Draw without color even if the terminal supports it.
    #[arg(long)]
    pub no_color: bool,

    /// Poll for keys instead of waiting for them.
    #[arg(long)]
    pub no_delay: bool,

    /// Draw on the alternate screen.
    #[arg(long)]
    pub alternate_screen: bool,

    /// Delay between polls in no-delay mode, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub frame_delay: Option<u64>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// A custom RGB color registered at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorEntry {
    pub index: ColorIndex,
    pub red: i16,
    pub green: i16,
    pub blue: i16,
}

impl ColorEntry {
    #[must_use]
    pub const fn rgb(self) -> Rgb {
        Rgb::new(self.red, self.green, self.blue)
    }
}

/// A color pair registered at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairEntry {
    pub index: PairIndex,
    pub foreground: ColorIndex,
    pub background: ColorIndex,
}

impl PairEntry {
    #[must_use]
    pub const fn pair(self) -> ColorPair {
        ColorPair::new(self.foreground, self.background)
    }
}

/// Pair used for the title bar.
pub const TITLE_PAIR: PairIndex = 1;

/// Pair used for the help line.
pub const ACCENT_PAIR: PairIndex = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Screen rows; the terminal height when unset.
    pub rows: Option<i32>,
    /// Screen columns; the terminal width when unset.
    pub cols: Option<i32>,
    pub session: SessionOptions,
    /// Use color when the terminal supports it.
    pub color: bool,
    pub colors: Vec<ColorEntry>,
    pub pairs: Vec<PairEntry>,
    pub frame_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: None,
            cols: None,
            session: SessionOptions::default(),
            color: true,
            colors: Vec::new(),
            pairs: vec![
                PairEntry {
                    index: TITLE_PAIR,
                    foreground: 15,
                    background: 4,
                },
                PairEntry {
                    index: ACCENT_PAIR,
                    foreground: 11,
                    background: 0,
                },
            ],
            frame_delay_ms: 16,
        }
    }
}

impl Config {
    /// Load with full precedence: CLI > environment > file > defaults.
    ///
    /// A missing default config file is not an error; a missing `--config`
    /// file is.
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        Self::load_with(args, |key| env::var(key).ok())
    }

    /// [`load_with_args`](Self::load_with_args) with an injectable
    /// environment.
    pub fn load_with(
        args: &CliArgs,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::load_from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(lookup);
        config.apply_cli_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        log::debug!("config: loaded {}", path.display());
        Ok(config)
    }

    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wcurses").join("config.toml"))
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(rows) = lookup("WCURSES_ROWS").and_then(|v| v.parse().ok()) {
            self.rows = Some(rows);
        }
        if let Some(cols) = lookup("WCURSES_COLS").and_then(|v| v.parse().ok()) {
            self.cols = Some(cols);
        }
        if let Some(title) = lookup("WCURSES_TITLE") {
            self.session.title = Some(title);
        }
    }

    fn apply_cli_args(&mut self, args: &CliArgs) {
        if let Some(rows) = args.rows {
            self.rows = Some(rows);
        }
        if let Some(cols) = args.cols {
            self.cols = Some(cols);
        }
        if let Some(title) = &args.title {
            self.session.title = Some(title.clone());
        }
        if args.no_color {
            self.color = false;
        }
        if args.no_delay {
            self.session.no_delay = true;
        }
        if args.alternate_screen {
            self.session.alternate_screen = true;
        }
        if let Some(delay) = args.frame_delay {
            self.frame_delay_ms = delay;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, entry) in self.colors.iter().enumerate() {
            if !(0..=255).contains(&entry.index) {
                return Err(ConfigError::invalid(
                    format!("colors[{i}].index"),
                    format!("{} is outside 0..=255", entry.index),
                ));
            }
            let channels = [("red", entry.red), ("green", entry.green), ("blue", entry.blue)];
            for (name, value) in channels {
                if !(0..=255).contains(&value) {
                    return Err(ConfigError::invalid(
                        format!("colors[{i}].{name}"),
                        format!("{value} is outside 0..=255"),
                    ));
                }
            }
        }

        for (i, entry) in self.pairs.iter().enumerate() {
            if !(1..=MAX_PAIR).contains(&entry.index) {
                return Err(ConfigError::invalid(
                    format!("pairs[{i}].index"),
                    format!("{} is outside 1..={MAX_PAIR}", entry.index),
                ));
            }
        }

        Ok(())
    }

    /// The configured size, with unset dimensions taken from `fallback`.
    #[must_use]
    pub fn size_or(&self, fallback: Size) -> Size {
        Size::new(
            self.rows.unwrap_or(fallback.rows),
            self.cols.unwrap_or(fallback.cols),
        )
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
