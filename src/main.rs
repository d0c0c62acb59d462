// SPDX-License-Identifier: MIT
//
// wcurses: interactive demo of the w-term session.
//
// Draws a title bar, a row of palette swatches, and a help line, then hands
// the rest of the screen to the keyboard:
//
//   ┌──────────────────────────────┐
//   │ title bar (TITLE_PAIR)       │  row 0
//   │                              │
//   │ ██████████████████ swatches  │  row 2
//   │                              │
//   │ help line (ACCENT_PAIR)      │  row 4
//   │                              │
//   │ typing area                  │  row 6 ..
//   └──────────────────────────────┘
//
// Arrows move, printable keys are written at the cursor, Backspace erases,
// Ctrl-L or F5 redraws, Esc or q quits.

mod config;

use std::error::Error;
use std::io;
use std::process;

use clap::Parser;

use w_term::color::{ColorPair, PairIndex};
use w_term::console::Console;
use w_term::input::{InputManager, Key};
use w_term::session::Session;
use w_term::terminal::Terminal;

use config::{ACCENT_PAIR, CliArgs, Config, TITLE_PAIR};

/// First of the eight swatch pairs (one per basic palette color).
const SWATCH_BASE: PairIndex = 100;

const SWATCH_WIDTH: usize = 3;

const HELP: &str = "arrows move | type to write | ^L/F5 redraw | Esc/q quit";

/// Row where typed text starts.
const TYPING_ROW: i32 = 6;

// ─── Flow ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

// ─── Chrome ──────────────────────────────────────────────────────────────────

/// The static parts of the screen.
struct Chrome {
    title: String,
}

impl Chrome {
    fn new(config: &Config) -> Self {
        Self {
            title: config
                .session
                .title
                .clone()
                .unwrap_or_else(|| "wcurses".to_owned()),
        }
    }

    /// Register the configured colors plus the swatch pairs.
    fn init_colors<C: Console>(session: &mut Session<C>, config: &Config) {
        if !config.color || !session.has_color() {
            log::info!("demo: drawing without color");
            return;
        }

        session.start_color();
        for entry in &config.colors {
            session.init_color(entry.index, entry.rgb());
        }
        for entry in &config.pairs {
            session.init_pair(entry.index, entry.pair());
        }
        for color in 0..8 {
            session.init_pair(SWATCH_BASE + color, ColorPair::new(color, color));
        }
    }

    /// Blank the screen, draw the chrome, and park the cursor at the start of
    /// the typing area.
    fn draw<C: Console>(&self, session: &mut Session<C>) -> io::Result<()> {
        session.clear()?;
        let cols = session
            .size()
            .map_or(0, |s| usize::try_from(s.cols).unwrap_or(0));

        // A full row wraps the cursor onto row 1, which is left blank.
        session.move_to(0, 0);
        session.set_active_pair(TITLE_PAIR);
        let bar = format!(" {}", self.title);
        let bar: String = bar.chars().chain(std::iter::repeat(' ')).take(cols).collect();
        session.print(&bar);
        session.reset_to_default_pair();

        session.move_to(2, 0);
        for color in 0..8 {
            session.set_active_pair(SWATCH_BASE + color);
            session.print(&" ".repeat(SWATCH_WIDTH));
        }
        session.reset_to_default_pair();

        session.move_to(4, 0);
        session.set_active_pair(ACCENT_PAIR);
        session.print(HELP);
        session.reset_to_default_pair();

        session.move_to(TYPING_ROW, 0);
        session.refresh()
    }
}

// ─── Keys ────────────────────────────────────────────────────────────────────

fn handle_key<C: Console>(
    session: &mut Session<C>,
    chrome: &Chrome,
    key: Key,
) -> io::Result<Flow> {
    match key {
        Key::Escape | Key::Char('q') => return Ok(Flow::Quit),
        Key::Up => {
            session.move_by(-1, 0);
        }
        Key::Down => {
            session.move_by(1, 0);
        }
        Key::Left => {
            session.move_by(0, -1);
        }
        Key::Right => {
            session.move_by(0, 1);
        }
        Key::Ctrl(b'l') | Key::F(5) => chrome.draw(session)?,
        Key::Enter => {
            session.put('\n');
        }
        Key::Backspace => {
            if session.move_by(0, -1) {
                session.put(' ');
                session.move_by(0, -1);
            }
        }
        Key::Char(ch) => {
            session.put(ch);
        }
        Key::Error => return Ok(Flow::Continue),
        other => log::trace!("demo: ignoring {other:?}"),
    }
    Ok(Flow::Continue)
}

fn run<C: Console>(session: &mut Session<C>, config: &Config) -> io::Result<()> {
    let chrome = Chrome::new(config);
    Chrome::init_colors(session, config);
    chrome.draw(session)?;

    loop {
        let key = session.get_key();
        if key == Key::Error && session.input_closed() {
            log::info!("demo: input closed");
            return Ok(());
        }
        if handle_key(session, &chrome, key)? == Flow::Quit {
            return Ok(());
        }
        session.refresh()?;

        if config.session.no_delay && key == Key::Error {
            Session::<C>::sleep(config.frame_delay_ms);
        }
    }
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse();
    let config = match Config::load_with_args(&args) {
        Ok(config) => config,
        Err(err) => {
            log::error!("failed to load configuration: {err}");
            eprintln!("wcurses: {err}");
            process::exit(1);
        }
    };

    let terminal = Terminal::new();
    let size = config.size_or(terminal.size());
    let input = InputManager::from_stdin()?;

    let mut session = Session::new(terminal)
        .with_input(input)
        .with_options(config.session.clone());
    session.start(size)?;

    let result = run(&mut session, &config);
    session.end()?;
    result?;
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
