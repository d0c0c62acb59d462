// SPDX-License-Identifier: MIT
//
// w-term: the rendering core of wcurses.
//
// A small curses work-alike for consoles that speak ANSI escape sequences.
// Programs write characters into an in-memory grid through a bounded cursor,
// register color pairs the curses way, and call refresh; the grid is then
// flattened into a single string (color escapes emitted only where the pair
// changes) and written to the console in one blit.
//
// Layers, leaf first:
//
//   point, cursor     coordinates and a write head that cannot leave its grid
//   color, cell       pair/custom-color registry and its escape encoder
//   buffer            the grid (plain or colored) and the frame flattener
//   ansi, console     escape sequences and the display boundary
//   terminal          the process console: raw mode, panic-safe restore
//   reader, input     stdin thread and key decoding
//   session           the facade that owns all of the above
//
// Malformed requests (out-of-range moves, bad color indices, undersized
// grids) are absorbed silently so a render loop keeps running. Only console
// I/O reports errors.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod console;
pub mod cursor;
pub mod input;
pub mod point;
pub mod reader;
pub mod session;
pub mod terminal;
