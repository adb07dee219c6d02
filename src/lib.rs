//! Box Runner: a turn-based box-and-goal grid puzzle.
//!
//!   - `domain`: board occupants and the `Map` grid engine (placement,
//!     collision, undo history)
//!   - `sim`: level session, save snapshots, document codec, gameplay
//!   - `ui`: terminal renderer, key mapping, save prompt
//!   - `config`: `config.toml` + `LEVELS_PATH`

pub mod config;
pub mod domain;
pub mod sim;
pub mod ui;
