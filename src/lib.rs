//! CodeUp: a quiz for learning to code.
//!
//! `domain` holds the read-only content catalog, `sim` the progression
//! engine and the per-run session, `ui` the terminal front-end.

pub mod config;
pub mod domain;
pub mod sim;
pub mod ui;
